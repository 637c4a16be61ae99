//! Connected wallet: a local key or a Ledger device.
//!
//! The session is what the GUI calls "connected". Writes go through it via
//! `ContractStore`, and the decrypt action asks it to sign an authorization
//! message before revealing a value.

use crate::config::{Config, SignerKind};
use crate::mock_fhe;
use anyhow::{anyhow, Result};
use ethers::prelude::*;
use ethers::signers::{HDPath, Ledger};
use rand::Rng;
use std::sync::OnceLock;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Hex characters in a generated session public key (after `0x`)
const PUBLIC_KEY_HEX_LEN: usize = 2000;

/// Validity window stated in the decrypt authorization
pub const DEFAULT_DURATION_DAYS: u32 = 30;

static DEVICE_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

/// Serializes Ledger HID access; concurrent APDU exchanges fail on some platforms.
pub fn device_lock() -> &'static Mutex<()> {
    DEVICE_LOCK.get_or_init(|| Mutex::new(()))
}

#[derive(Clone, Debug)]
pub enum WalletSigner {
    Local(LocalWallet),
    /// Ledger is reopened per operation, the device may be unplugged in between
    Ledger { hd_path: String, chain_id: u64 },
}

#[derive(Clone, Debug)]
pub struct WalletSession {
    pub address: Address,
    pub signer: WalletSigner,
}

impl WalletSession {
    /// Session around an existing local key
    pub fn from_local(wallet: LocalWallet) -> Self {
        Self {
            address: wallet.address(),
            signer: WalletSigner::Local(wallet),
        }
    }

    /// Lowercase hex address, the form stored in record `owner` fields
    pub fn address_string(&self) -> String {
        format!("{:?}", self.address)
    }

    /// Chain the signer was connected for
    pub fn chain_id(&self) -> u64 {
        match &self.signer {
            WalletSigner::Local(wallet) => wallet.chain_id(),
            WalletSigner::Ledger { chain_id, .. } => *chain_id,
        }
    }

    pub fn signer_label(&self) -> &'static str {
        match self.signer {
            WalletSigner::Local(_) => "Local key",
            WalletSigner::Ledger { .. } => "Ledger",
        }
    }

    pub async fn sign_message(&self, message: &str) -> Result<Signature> {
        match &self.signer {
            WalletSigner::Local(wallet) => wallet
                .sign_message(message)
                .await
                .map_err(|e| anyhow!("Signing failed: {}", e)),
            WalletSigner::Ledger { hd_path, chain_id } => {
                let _lock = device_lock().lock().await;
                let ledger = Ledger::new(HDPath::Other(hd_path.clone()), *chain_id)
                    .await
                    .map_err(|e| anyhow!("Ledger connection failed: {}", e))?;
                ledger
                    .sign_message(message)
                    .await
                    .map_err(|e| anyhow!("Ledger signing failed: {}", e))
            }
        }
    }
}

/// Case-insensitive address match; no viewer owns nothing
pub fn is_owner(viewer: Option<&str>, owner: &str) -> bool {
    viewer.map(|v| v.eq_ignore_ascii_case(owner)).unwrap_or(false)
}

/// Connect the signer selected in `config`
pub async fn connect(config: &Config) -> Result<WalletSession> {
    match config.signer_kind {
        SignerKind::LocalKey => {
            let wallet = match config.private_key.as_deref() {
                Some(key) => key
                    .trim_start_matches("0x")
                    .parse::<LocalWallet>()
                    .map_err(|e| anyhow!("Invalid PRIVATE_KEY: {}", e))?,
                None if config.demo_mode => {
                    warn!("No PRIVATE_KEY set, using a throwaway demo key");
                    LocalWallet::new(&mut rand::thread_rng())
                }
                None => return Err(anyhow!("PRIVATE_KEY is not set; add it to .env or enable demo mode")),
            };
            let session = WalletSession::from_local(wallet.with_chain_id(config.chain_id));
            info!("Connected local key {:?}", session.address);
            Ok(session)
        }
        SignerKind::Ledger => {
            let hd_path = config.ledger_path();
            let _lock = device_lock().lock().await;
            let ledger = Ledger::new(HDPath::Other(hd_path.clone()), config.chain_id)
                .await
                .map_err(|e| anyhow!("Ledger connection failed: {}", e))?;
            let address = ledger.address();
            info!("Connected Ledger {:?} at {}", address, hd_path);
            Ok(WalletSession {
                address,
                signer: WalletSigner::Ledger {
                    hd_path,
                    chain_id: config.chain_id,
                },
            })
        }
    }
}

/// Parameters signed before a value is revealed
#[derive(Clone, Debug, PartialEq)]
pub struct DecryptAuthorization {
    pub public_key: String,
    pub contract_address: String,
    pub chain_id: u64,
    pub start_timestamp: i64,
    pub duration_days: u32,
}

impl DecryptAuthorization {
    pub fn new(config: &Config, start_timestamp: i64) -> Self {
        Self {
            public_key: generate_public_key(&mut rand::thread_rng()),
            contract_address: config.contract_address_display(),
            chain_id: config.chain_id,
            start_timestamp,
            duration_days: DEFAULT_DURATION_DAYS,
        }
    }

    pub fn message(&self) -> String {
        format!(
            "publickey:{}\ncontractAddresses:{}\ncontractsChainId:{}\nstartTimestamp:{}\ndurationDays:{}",
            self.public_key, self.contract_address, self.chain_id, self.start_timestamp, self.duration_days
        )
    }
}

/// `0x` followed by random hex; a session label, not key material
pub fn generate_public_key<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut bytes = vec![0u8; PUBLIC_KEY_HEX_LEN / 2];
    rng.fill_bytes(&mut bytes);
    format!("0x{}", hex::encode(bytes))
}

/// Sign the authorization, wait the reveal delay, then decode the value
pub async fn decrypt_with_signature(
    session: &WalletSession,
    auth: &DecryptAuthorization,
    encrypted: &str,
    reveal_delay: Duration,
) -> Result<f64> {
    let signature = session.sign_message(&auth.message()).await?;
    info!("Decrypt authorization signed ({} bytes)", signature.to_vec().len());
    tokio::time::sleep(reveal_delay).await;
    Ok(mock_fhe::decode(encrypted)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn test_wallet() -> LocalWallet {
        // Well-known throwaway key (anvil account #0)
        "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"
            .parse::<LocalWallet>()
            .unwrap()
    }

    fn sample_auth() -> DecryptAuthorization {
        DecryptAuthorization {
            public_key: "0xabc".to_string(),
            contract_address: "0x00000000000000000000000000000000000000aa".to_string(),
            chain_id: 11155111,
            start_timestamp: 1_700_000_000,
            duration_days: 30,
        }
    }

    // ==================== DecryptAuthorization tests ====================

    #[test]
    fn test_authorization_message_layout() {
        assert_eq!(
            sample_auth().message(),
            "publickey:0xabc\ncontractAddresses:0x00000000000000000000000000000000000000aa\ncontractsChainId:11155111\nstartTimestamp:1700000000\ndurationDays:30"
        );
    }

    #[test]
    fn test_authorization_new_from_config() {
        let config = Config::default();
        let auth = DecryptAuthorization::new(&config, 5);
        assert_eq!(auth.chain_id, config.chain_id);
        assert_eq!(auth.duration_days, DEFAULT_DURATION_DAYS);
        assert_eq!(auth.contract_address, "");
        assert_eq!(auth.start_timestamp, 5);
    }

    #[test]
    fn test_generate_public_key_shape() {
        let mut rng = StdRng::seed_from_u64(3);
        let key = generate_public_key(&mut rng);
        assert!(key.starts_with("0x"));
        assert_eq!(key.len(), 2 + PUBLIC_KEY_HEX_LEN);
        assert!(key[2..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_is_owner() {
        let owner = "0xF39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
        assert!(is_owner(Some("0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"), owner));
        assert!(!is_owner(Some("0x0000000000000000000000000000000000000001"), owner));
        assert!(!is_owner(None, owner));
    }

    // ==================== session tests ====================

    #[test]
    fn test_session_address_string_lowercase() {
        let session = WalletSession::from_local(test_wallet());
        assert_eq!(
            session.address_string(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
        assert_eq!(session.signer_label(), "Local key");
    }

    #[tokio::test]
    async fn test_connect_local_key_from_config() {
        let mut config = Config::default();
        config.private_key =
            Some("0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80".to_string());
        let session = connect(&config).await.unwrap();
        assert_eq!(session.address, test_wallet().address());
    }

    #[tokio::test]
    async fn test_connect_without_key_fails_outside_demo() {
        let config = Config::default();
        let err = connect(&config).await.unwrap_err();
        assert!(err.to_string().contains("PRIVATE_KEY"));
    }

    #[tokio::test]
    async fn test_session_keeps_configured_chain_id() {
        let mut config = Config::default();
        config.chain_id = 31337;
        config.private_key =
            Some("0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80".to_string());
        assert_eq!(connect(&config).await.unwrap().chain_id(), 31337);

        let ledger = WalletSession {
            address: test_wallet().address(),
            signer: WalletSigner::Ledger {
                hd_path: "m/44'/60'/0'/0/0".to_string(),
                chain_id: 11155111,
            },
        };
        assert_eq!(ledger.chain_id(), 11155111);
        assert_eq!(ledger.signer_label(), "Ledger");
    }

    #[test]
    fn test_connect_demo_mode_generates_key() {
        let mut config = Config::default();
        config.demo_mode = true;
        assert!(tokio_test::block_on(connect(&config)).is_ok());
    }

    #[tokio::test]
    async fn test_decrypt_with_signature_reveals_value() {
        let session = WalletSession::from_local(test_wallet());
        let value = decrypt_with_signature(
            &session,
            &sample_auth(),
            &mock_fhe::encode(12.5),
            Duration::from_millis(0),
        )
        .await
        .unwrap();
        assert_eq!(value, 12.5);
    }

    #[tokio::test]
    async fn test_signature_recovers_to_session_address() {
        let session = WalletSession::from_local(test_wallet());
        let message = sample_auth().message();
        let signature = session.sign_message(&message).await.unwrap();
        assert!(signature.verify(message.as_str(), session.address).is_ok());
    }
}
