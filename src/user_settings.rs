use crate::config::{self, Config, SignerKind};
use crate::operation_log::app_data_dir;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

const SETTINGS_FILE: &str = "regen_agri_settings.json";

fn default_show_intro() -> bool {
    true
}

/// User settings that persist between sessions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserSettings {
    /// Selected network chain ID
    pub selected_chain_id: u64,
    /// Custom RPC overrides per chain ID
    #[serde(default)]
    pub custom_rpcs: HashMap<u64, String>,
    /// Sensor contract address per chain ID
    #[serde(default)]
    pub contract_addresses: HashMap<u64, String>,
    #[serde(default)]
    pub signer_kind: SignerKind,
    /// Ledger account index (m/44'/60'/i'/0/0)
    #[serde(default)]
    pub ledger_index: u32,
    /// Show the intro panel above the dashboard
    #[serde(default = "default_show_intro")]
    pub show_intro: bool,
    /// Use the in-memory store instead of a contract
    #[serde(default)]
    pub demo_mode: bool,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            selected_chain_id: config::DEFAULT_CHAIN_ID,
            custom_rpcs: HashMap::new(),
            contract_addresses: HashMap::new(),
            signer_kind: SignerKind::default(),
            ledger_index: 0,
            show_intro: default_show_intro(),
            demo_mode: false,
        }
    }
}

impl UserSettings {
    fn settings_path() -> PathBuf {
        app_data_dir().join(SETTINGS_FILE)
    }

    /// Load settings from disk, or return defaults if not found
    pub fn load() -> Self {
        Self::load_from(&Self::settings_path())
    }

    fn load_from(path: &Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(settings) => {
                        tracing::info!("Loaded settings from {:?}", path);
                        return settings;
                    }
                    Err(e) => tracing::warn!("Failed to parse settings file: {}", e),
                },
                Err(e) => tracing::warn!("Failed to read settings file: {}", e),
            }
        }
        tracing::info!("Using default settings");
        Self::default()
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::settings_path())
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        tracing::info!("Saved settings to {:?}", path);
        Ok(())
    }

    pub fn settings_path_display() -> String {
        Self::settings_path().display().to_string()
    }

    pub fn get_custom_rpc(&self, chain_id: u64) -> Option<&String> {
        self.custom_rpcs.get(&chain_id).filter(|s| !s.is_empty())
    }

    /// Empty string removes the override
    pub fn set_custom_rpc(&mut self, chain_id: u64, rpc: String) {
        if rpc.trim().is_empty() {
            self.custom_rpcs.remove(&chain_id);
        } else {
            self.custom_rpcs.insert(chain_id, rpc.trim().to_string());
        }
    }

    pub fn get_contract_address(&self, chain_id: u64) -> Option<&String> {
        self.contract_addresses.get(&chain_id).filter(|s| !s.is_empty())
    }

    /// Validates before storing; empty string removes the entry
    pub fn set_contract_address(&mut self, chain_id: u64, address: &str) -> Result<()> {
        match config::parse_contract_address(address)? {
            Some(parsed) => {
                self.contract_addresses.insert(chain_id, format!("{:?}", parsed));
            }
            None => {
                self.contract_addresses.remove(&chain_id);
            }
        }
        Ok(())
    }

    /// Build the runtime config for the selected chain
    pub fn apply_to(&self, config: &mut Config) {
        config.chain_id = self.selected_chain_id;
        config.rpc_url = match self.get_custom_rpc(self.selected_chain_id) {
            Some(rpc) => rpc.clone(),
            None => config::find_network_by_chain_id(self.selected_chain_id)
                .map(|n| n.default_rpc.to_string())
                .unwrap_or_else(|| config.rpc_url.clone()),
        };
        config.contract_address = self
            .get_contract_address(self.selected_chain_id)
            .and_then(|raw| match config::parse_contract_address(raw) {
                Ok(address) => address,
                Err(e) => {
                    tracing::warn!("Ignoring saved contract address: {}", e);
                    None
                }
            });
        config.signer_kind = self.signer_kind;
        config.ledger_index = self.ledger_index;
        config.demo_mode = self.demo_mode;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTRACT: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";

    fn temp_settings(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("regen-agri-settings-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir.join(SETTINGS_FILE)
    }

    // ==================== UserSettings::default tests ====================

    #[test]
    fn test_user_settings_default_values() {
        let settings = UserSettings::default();
        assert_eq!(settings.selected_chain_id, 11155111);
        assert!(settings.show_intro);
        assert!(!settings.demo_mode);
        assert_eq!(settings.signer_kind, SignerKind::LocalKey);
        assert!(settings.contract_addresses.is_empty());
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings: UserSettings = serde_json::from_str(r#"{"selected_chain_id":31337}"#).unwrap();
        assert_eq!(settings.selected_chain_id, 31337);
        assert!(settings.show_intro);
        assert_eq!(settings.ledger_index, 0);
    }

    // ==================== get_custom_rpc / set_custom_rpc tests ====================

    #[test]
    fn test_set_custom_rpc_trims_and_removes() {
        let mut settings = UserSettings::default();
        settings.set_custom_rpc(1, "  https://my-eth-node.com  ".to_string());
        assert_eq!(settings.get_custom_rpc(1).unwrap(), "https://my-eth-node.com");

        settings.set_custom_rpc(1, "   ".to_string());
        assert!(settings.get_custom_rpc(1).is_none());
    }

    // ==================== contract address tests ====================

    #[test]
    fn test_set_contract_address_valid() {
        let mut settings = UserSettings::default();
        settings.set_contract_address(31337, CONTRACT).unwrap();
        assert_eq!(
            settings.get_contract_address(31337).unwrap(),
            "0x5fbdb2315678afecb367f032d93f642f64180aa3"
        );
    }

    #[test]
    fn test_set_contract_address_invalid_keeps_previous() {
        let mut settings = UserSettings::default();
        settings.set_contract_address(31337, CONTRACT).unwrap();
        assert!(settings.set_contract_address(31337, "0xnope").is_err());
        assert!(settings.get_contract_address(31337).is_some());

        settings.set_contract_address(31337, "").unwrap();
        assert!(settings.get_contract_address(31337).is_none());
    }

    // ==================== apply_to tests ====================

    #[test]
    fn test_apply_to_uses_network_default_rpc() {
        let mut settings = UserSettings::default();
        settings.selected_chain_id = 31337;
        settings.set_contract_address(31337, CONTRACT).unwrap();
        settings.signer_kind = SignerKind::Ledger;
        settings.ledger_index = 2;

        let mut config = Config::default();
        settings.apply_to(&mut config);
        assert_eq!(config.chain_id, 31337);
        assert_eq!(config.rpc_url, "http://127.0.0.1:8545");
        assert!(config.contract_address.is_some());
        assert_eq!(config.signer_kind, SignerKind::Ledger);
        assert_eq!(config.ledger_path(), "m/44'/60'/2'/0/0");
    }

    #[test]
    fn test_apply_to_custom_rpc_wins() {
        let mut settings = UserSettings::default();
        settings.set_custom_rpc(settings.selected_chain_id, "https://custom.example".to_string());
        settings.demo_mode = true;

        let mut config = Config::default();
        settings.apply_to(&mut config);
        assert_eq!(config.rpc_url, "https://custom.example");
        assert!(config.demo_mode);
        assert!(config.contract_address.is_none());
    }

    // ==================== persistence tests ====================

    #[test]
    fn test_save_then_load() {
        let path = temp_settings("roundtrip");
        let mut settings = UserSettings::default();
        settings.show_intro = false;
        settings.set_contract_address(11155111, CONTRACT).unwrap();
        settings.save_to(&path).unwrap();

        assert_eq!(UserSettings::load_from(&path), settings);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_load_corrupt_file_gives_defaults() {
        let path = temp_settings("corrupt");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{not json").unwrap();
        assert_eq!(UserSettings::load_from(&path), UserSettings::default());
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
