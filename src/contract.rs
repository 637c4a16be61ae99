//! Key/value access to the sensor contract.
//!
//! The contract exposes `getData(string) -> bytes`, `setData(string, bytes)`
//! and `isAvailable() -> bool`. `ContractStore` talks to it over JSON-RPC;
//! `MemoryStore` holds the same keys in memory for demo mode and tests.

use crate::config::Config;
use crate::wallet::{self, WalletSession, WalletSigner};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use ethers::abi::{Function, Param, ParamType, StateMutability, Token};
use ethers::prelude::*;
use ethers::providers::{Http, Provider};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Outcome of a confirmed `setData` write
#[derive(Debug, Clone, PartialEq)]
pub struct TxReceiptInfo {
    pub tx_hash: String,
    pub block_number: Option<u64>,
}

/// Key/value storage as seen by the dashboard.
/// Empty bytes from `get_data` mean "no value".
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn is_available(&self) -> Result<bool>;
    async fn get_data(&self, key: &str) -> Result<Vec<u8>>;
    async fn set_data(&self, key: &str, value: Vec<u8>) -> Result<TxReceiptInfo>;

    /// Short description for the status panel
    fn describe(&self) -> String;
}

#[allow(deprecated)]
fn get_data_function() -> Function {
    Function {
        name: "getData".to_string(),
        inputs: vec![Param {
            name: "key".to_string(),
            kind: ParamType::String,
            internal_type: None,
        }],
        outputs: vec![Param {
            name: "".to_string(),
            kind: ParamType::Bytes,
            internal_type: None,
        }],
        constant: None,
        state_mutability: StateMutability::View,
    }
}

#[allow(deprecated)]
fn set_data_function() -> Function {
    Function {
        name: "setData".to_string(),
        inputs: vec![
            Param {
                name: "key".to_string(),
                kind: ParamType::String,
                internal_type: None,
            },
            Param {
                name: "value".to_string(),
                kind: ParamType::Bytes,
                internal_type: None,
            },
        ],
        outputs: vec![],
        constant: None,
        state_mutability: StateMutability::NonPayable,
    }
}

#[allow(deprecated)]
fn is_available_function() -> Function {
    Function {
        name: "isAvailable".to_string(),
        inputs: vec![],
        outputs: vec![Param {
            name: "".to_string(),
            kind: ParamType::Bool,
            internal_type: None,
        }],
        constant: None,
        state_mutability: StateMutability::View,
    }
}

/// Calldata for `getData(key)`
pub fn encode_get_data(key: &str) -> Result<Vec<u8>> {
    Ok(get_data_function().encode_input(&[Token::String(key.to_string())])?)
}

/// Calldata for `setData(key, value)`
pub fn encode_set_data(key: &str, value: &[u8]) -> Result<Vec<u8>> {
    Ok(set_data_function().encode_input(&[
        Token::String(key.to_string()),
        Token::Bytes(value.to_vec()),
    ])?)
}

/// Decode the `bytes` returned by `getData`
pub fn decode_get_data(output: &[u8]) -> Result<Vec<u8>> {
    match get_data_function().decode_output(output)?.into_iter().next() {
        Some(Token::Bytes(bytes)) => Ok(bytes),
        other => Err(anyhow!("Unexpected getData output: {:?}", other)),
    }
}

/// Decode the `bool` returned by `isAvailable`
pub fn decode_is_available(output: &[u8]) -> Result<bool> {
    match is_available_function().decode_output(output)?.into_iter().next() {
        Some(Token::Bool(flag)) => Ok(flag),
        other => Err(anyhow!("Unexpected isAvailable output: {:?}", other)),
    }
}

/// Store backed by the deployed sensor contract
pub struct ContractStore {
    provider: Arc<Provider<Http>>,
    address: Address,
    chain_id: u64,
    session: Option<WalletSession>,
}

impl ContractStore {
    pub fn new(provider: Arc<Provider<Http>>, address: Address, chain_id: u64) -> Self {
        Self {
            provider,
            address,
            chain_id,
            session: None,
        }
    }

    /// Build a read/write store from config; writes need `session`
    pub async fn from_config(config: &Config, session: Option<WalletSession>) -> Result<Self> {
        let address = config
            .contract_address
            .ok_or_else(|| anyhow!("Contract address is not configured"))?;
        let provider = config.get_provider().await?;
        Ok(Self::new(provider, address, config.chain_id).with_session(session))
    }

    pub fn with_session(mut self, session: Option<WalletSession>) -> Self {
        self.session = session;
        self
    }

    async fn call(&self, calldata: Vec<u8>) -> Result<Bytes> {
        let tx = TransactionRequest::new().to(self.address).data(calldata);
        Ok(self.provider.call(&tx.into(), None).await?)
    }
}

#[async_trait]
impl KvStore for ContractStore {
    async fn is_available(&self) -> Result<bool> {
        let calldata = is_available_function().encode_input(&[])?;
        let output = self.call(calldata).await?;
        decode_is_available(output.as_ref())
    }

    async fn get_data(&self, key: &str) -> Result<Vec<u8>> {
        let output = self.call(encode_get_data(key)?).await?;
        let bytes = decode_get_data(output.as_ref())?;
        debug!("getData({}) -> {} bytes", key, bytes.len());
        Ok(bytes)
    }

    async fn set_data(&self, key: &str, value: Vec<u8>) -> Result<TxReceiptInfo> {
        let session = self
            .session
            .as_ref()
            .ok_or_else(|| anyhow!("Wallet not connected: a signer is required to write"))?;

        let tx = TransactionRequest::new()
            .to(self.address)
            .data(encode_set_data(key, &value)?);
        let provider = (*self.provider).clone();

        info!("Sending setData({}) from {:?}", key, session.address);
        let receipt = match &session.signer {
            WalletSigner::Local(local) => {
                send_signed(provider, local.clone().with_chain_id(self.chain_id), tx).await?
            }
            WalletSigner::Ledger { hd_path, .. } => {
                let _lock = wallet::device_lock().lock().await;
                let ledger = ethers::signers::Ledger::new(
                    ethers::signers::HDPath::Other(hd_path.clone()),
                    self.chain_id,
                )
                .await
                .map_err(|e| anyhow!("Ledger connection failed: {}", e))?;
                send_signed(provider, ledger, tx).await?
            }
        };
        info!("setData({}) confirmed in {}", key, receipt.tx_hash);
        Ok(receipt)
    }

    fn describe(&self) -> String {
        format!("Contract {:?} (chain {})", self.address, self.chain_id)
    }
}

async fn send_signed<S>(provider: Provider<Http>, signer: S, tx: TransactionRequest) -> Result<TxReceiptInfo>
where
    S: Signer + 'static,
{
    let client = SignerMiddleware::new(provider, signer);
    let pending = client
        .send_transaction(tx, None)
        .await
        .map_err(|e| anyhow!("Failed to send transaction: {}", e))?;
    let tx_hash = pending.tx_hash();
    let receipt = pending
        .await
        .map_err(|e| anyhow!("Failed waiting for transaction {:?}: {}", tx_hash, e))?;

    match receipt {
        Some(receipt) => {
            if receipt.status == Some(U64::zero()) {
                return Err(anyhow!("Transaction {:?} reverted", tx_hash));
            }
            Ok(TxReceiptInfo {
                tx_hash: format!("{:?}", tx_hash),
                block_number: receipt.block_number.map(|b| b.as_u64()),
            })
        }
        None => Err(anyhow!("Transaction {:?} was dropped from the mempool", tx_hash)),
    }
}

/// In-memory store with the same key layout as the contract
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    unavailable: Arc<Mutex<bool>>,
    fail_writes: Arc<Mutex<Option<String>>>,
    writes: Arc<AtomicU64>,
    reads: Arc<AtomicU64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate `isAvailable() == false`
    pub async fn set_available(&self, available: bool) {
        *self.unavailable.lock().await = !available;
    }

    /// Make every following write fail with `message` (None to clear)
    pub async fn fail_writes_with(&self, message: Option<&str>) {
        *self.fail_writes.lock().await = message.map(str::to_string);
    }

    pub async fn raw_get(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.lock().await.get(key).cloned()
    }

    pub async fn raw_put(&self, key: &str, value: &[u8]) {
        self.entries.lock().await.insert(key.to_string(), value.to_vec());
    }

    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn read_count(&self) -> u64 {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn is_available(&self) -> Result<bool> {
        Ok(!*self.unavailable.lock().await)
    }

    async fn get_data(&self, key: &str) -> Result<Vec<u8>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.entries.lock().await.get(key).cloned().unwrap_or_default())
    }

    async fn set_data(&self, key: &str, value: Vec<u8>) -> Result<TxReceiptInfo> {
        if let Some(message) = self.fail_writes.lock().await.clone() {
            return Err(anyhow!(message));
        }
        let n = self.writes.fetch_add(1, Ordering::SeqCst) + 1;
        self.entries.lock().await.insert(key.to_string(), value);
        Ok(TxReceiptInfo {
            tx_hash: format!("0x{:064x}", n),
            block_number: Some(n),
        })
    }

    fn describe(&self) -> String {
        "In-memory demo store".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== ABI encoding tests ====================

    #[test]
    fn test_get_data_selector() {
        let calldata = encode_get_data("sensor_keys").unwrap();
        let expected = &ethers::utils::id("getData(string)")[..4];
        assert_eq!(&calldata[..4], expected);
    }

    #[test]
    fn test_set_data_selector() {
        let calldata = encode_set_data("sensor_1", b"{}").unwrap();
        let expected = &ethers::utils::id("setData(string,bytes)")[..4];
        assert_eq!(&calldata[..4], expected);
    }

    #[test]
    fn test_decode_get_data_output() {
        let encoded = ethers::abi::encode(&[Token::Bytes(b"[\"a\"]".to_vec())]);
        assert_eq!(decode_get_data(&encoded).unwrap(), b"[\"a\"]".to_vec());
    }

    #[test]
    fn test_decode_get_data_empty_bytes() {
        let encoded = ethers::abi::encode(&[Token::Bytes(vec![])]);
        assert!(decode_get_data(&encoded).unwrap().is_empty());
    }

    #[test]
    fn test_decode_is_available_output() {
        let encoded = ethers::abi::encode(&[Token::Bool(true)]);
        assert!(decode_is_available(&encoded).unwrap());
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(decode_get_data(&[1, 2, 3]).is_err());
    }

    // ==================== MemoryStore tests ====================

    #[tokio::test]
    async fn test_memory_store_missing_key_is_empty() {
        let store = MemoryStore::new();
        assert!(store.get_data("sensor_keys").await.unwrap().is_empty());
        assert_eq!(store.read_count(), 1);
    }

    #[tokio::test]
    async fn test_memory_store_set_then_get() {
        let store = MemoryStore::new();
        let receipt = store.set_data("k", b"v".to_vec()).await.unwrap();
        assert_eq!(receipt.block_number, Some(1));
        assert_eq!(store.get_data("k").await.unwrap(), b"v".to_vec());
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn test_memory_store_availability_toggle() {
        let store = MemoryStore::new();
        assert!(store.is_available().await.unwrap());
        store.set_available(false).await;
        assert!(!store.is_available().await.unwrap());
    }

    #[tokio::test]
    async fn test_memory_store_failing_writes() {
        let store = MemoryStore::new();
        store.fail_writes_with(Some("user rejected transaction")).await;
        let err = store.set_data("k", b"v".to_vec()).await.unwrap_err();
        assert!(err.to_string().contains("user rejected"));
        assert!(store.raw_get("k").await.is_none());
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_contract_store_requires_session_for_writes() {
        let provider = Arc::new(Provider::<Http>::try_from("http://127.0.0.1:1").unwrap());
        let store = ContractStore::new(provider, Address::zero(), 31337);
        let err = store.set_data("k", vec![1]).await.unwrap_err();
        assert!(err.to_string().contains("Wallet not connected"));
    }
}
