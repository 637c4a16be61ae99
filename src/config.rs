use crate::user_settings::UserSettings;
use anyhow::{anyhow, Result};
use ethers::providers::{Http, Provider};
use ethers::types::Address;
use serde::{Deserialize, Serialize};
use std::env;
use std::sync::Arc;
use url::Url;

/// A predefined EVM-compatible network with label, chain ID and default RPC.
#[derive(Clone, Debug)]
pub struct EvmNetwork {
    pub label: &'static str,
    pub chain_id: u64,
    pub default_rpc: &'static str,
}

impl EvmNetwork {
    pub const fn new(label: &'static str, chain_id: u64, default_rpc: &'static str) -> Self {
        Self {
            label,
            chain_id,
            default_rpc,
        }
    }
}

/// Networks the sensor contract is known to be deployable on.
pub const NETWORKS: &[EvmNetwork] = &[
    EvmNetwork::new("Sepolia", 11155111, "https://ethereum-sepolia-rpc.publicnode.com"),
    EvmNetwork::new("Localhost", 31337, "http://127.0.0.1:8545"),
    EvmNetwork::new("Ethereum", 1, "https://ethereum-rpc.publicnode.com"),
    EvmNetwork::new("Base", 8453, "https://mainnet.base.org"),
    EvmNetwork::new("Optimism", 10, "https://mainnet.optimism.io"),
    EvmNetwork::new("Polygon", 137, "https://polygon-rpc.com"),
    EvmNetwork::new("Gnosis Chain", 100, "https://rpc.gnosischain.com"),
];

/// Chain used when nothing else is configured
pub const DEFAULT_CHAIN_ID: u64 = 11155111;

/// Delay between the decrypt signature and revealing the value
pub const DEFAULT_REVEAL_DELAY_MS: u64 = 1500;

/// Find a network by chain ID
pub fn find_network_by_chain_id(chain_id: u64) -> Option<&'static EvmNetwork> {
    NETWORKS.iter().find(|n| n.chain_id == chain_id)
}

/// Get the block explorer URL for a given chain ID
pub fn get_block_explorer_url(chain_id: u64) -> Option<&'static str> {
    match chain_id {
        1 => Some("https://etherscan.io"),
        11155111 => Some("https://sepolia.etherscan.io"),
        10 => Some("https://optimistic.etherscan.io"),
        8453 => Some("https://basescan.org"),
        137 => Some("https://polygonscan.com"),
        100 => Some("https://gnosisscan.io"),
        _ => None,
    }
}

/// Get the full URL to view a transaction on the block explorer
pub fn get_tx_explorer_url(chain_id: u64, tx_hash: &str) -> Option<String> {
    get_block_explorer_url(chain_id).map(|base| format!("{}/tx/{}", base, tx_hash))
}

/// Get the full URL to view an address on the block explorer
pub fn get_address_explorer_url(chain_id: u64, address: &str) -> Option<String> {
    get_block_explorer_url(chain_id).map(|base| format!("{}/address/{}", base, address))
}

/// Where signatures come from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SignerKind {
    /// Private key from `PRIVATE_KEY` (or a throwaway key in demo mode)
    #[default]
    LocalKey,
    /// Ledger hardware wallet, Ethereum app, path m/44'/60'/i'/0/0
    Ledger,
}

impl SignerKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            SignerKind::LocalKey => "Local key",
            SignerKind::Ledger => "Ledger",
        }
    }
}

/// Parse a contract address from user or environment input.
/// Empty input means "not configured".
pub fn parse_contract_address(input: &str) -> Result<Option<Address>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<Address>()
        .map(Some)
        .map_err(|e| anyhow!("Invalid contract address '{}': {}", trimmed, e))
}

#[derive(Clone)]
pub struct Config {
    pub rpc_url: String,
    pub chain_id: u64,
    pub contract_address: Option<Address>,
    pub signer_kind: SignerKind,
    pub ledger_index: u32,
    pub private_key: Option<String>,
    pub reveal_delay_ms: u64,
    /// Run against the in-memory store instead of a contract
    pub demo_mode: bool,
}

impl Config {
    pub fn new(rpc_url: String, chain_id: u64) -> Self {
        Self {
            rpc_url,
            chain_id,
            contract_address: None,
            signer_kind: SignerKind::default(),
            ledger_index: 0,
            private_key: None,
            reveal_delay_ms: DEFAULT_REVEAL_DELAY_MS,
            demo_mode: false,
        }
    }

    pub fn from_network(network: &EvmNetwork) -> Self {
        Self::new(network.default_rpc.to_string(), network.chain_id)
    }

    /// Saved settings first, then the process environment (after `.env` is loaded)
    pub fn from_settings_and_env(settings: &UserSettings) -> Self {
        Self::from_settings_with_env(settings, |key| env::var(key).ok())
    }

    pub fn from_settings_with_env<F>(settings: &UserSettings, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        settings.apply_to(&mut config);
        config.apply_env_overrides(lookup);
        config
    }

    /// Apply `CHAIN_ID`, `RPC_URL`, `CONTRACT_ADDRESS`, `PRIVATE_KEY` and
    /// `REVEAL_DELAY_MS` from the given lookup. Invalid values are logged and skipped.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(chain_id) = lookup("CHAIN_ID").and_then(|v| v.trim().parse::<u64>().ok()) {
            if let Some(network) = find_network_by_chain_id(chain_id) {
                self.rpc_url = network.default_rpc.to_string();
            }
            self.chain_id = chain_id;
        }
        if let Some(rpc) = lookup("RPC_URL").filter(|v| !v.trim().is_empty()) {
            self.rpc_url = rpc.trim().to_string();
        }
        if let Some(raw) = lookup("CONTRACT_ADDRESS") {
            match parse_contract_address(&raw) {
                Ok(address) => self.contract_address = address,
                Err(e) => tracing::warn!("Ignoring CONTRACT_ADDRESS: {}", e),
            }
        }
        if let Some(key) = lookup("PRIVATE_KEY").filter(|v| !v.trim().is_empty()) {
            self.private_key = Some(key.trim().to_string());
        }
        if let Some(delay) = lookup("REVEAL_DELAY_MS").and_then(|v| v.trim().parse().ok()) {
            self.reveal_delay_ms = delay;
        }
    }

    pub fn network_label(&self) -> &str {
        find_network_by_chain_id(self.chain_id)
            .map(|n| n.label)
            .unwrap_or("Unknown")
    }

    /// Ledger derivation path for the configured account index
    pub fn ledger_path(&self) -> String {
        format!("m/44'/60'/{}'/0/0", self.ledger_index)
    }

    pub fn contract_address_display(&self) -> String {
        self.contract_address
            .map(|a| format!("{:?}", a))
            .unwrap_or_default()
    }

    pub async fn get_provider(&self) -> Result<Arc<Provider<Http>>> {
        let url = Url::parse(&self.rpc_url)?;
        let provider = Provider::<Http>::try_from(url.as_str())?;
        Ok(Arc::new(provider))
    }
}

impl Default for Config {
    fn default() -> Self {
        if let Some(sepolia) = find_network_by_chain_id(DEFAULT_CHAIN_ID) {
            Self::from_network(sepolia)
        } else {
            Self::new("https://rpc.sepolia.org".to_string(), DEFAULT_CHAIN_ID)
        }
    }
}
