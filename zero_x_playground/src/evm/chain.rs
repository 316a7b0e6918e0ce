use std::future::IntoFuture;
use std::time::Duration;

use alloy::eips::BlockId;
use alloy::network::TransactionBuilder as _;
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::providers::{Provider as _, RootProvider};
use alloy::rpc::types::TransactionRequest;
use alloy::transports::TransportResult;
use async_trait::async_trait;
use error_stack::{ResultExt as _, report};
use reqwest::Url;
use tracing::debug;

use crate::error::{Error, PlaygroundResult};

/// Call used for gas estimation. Mirrors the fields of the fill transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallMessage {
    pub from: Address,
    pub to: Address,
    pub gas_price: U256,
    pub data: Bytes,
    pub value: U256,
}

/// The RPC calls needed to submit a fill.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Transaction count of `address` at the latest block
    async fn nonce_at(&self, address: Address) -> PlaygroundResult<u64>;

    async fn estimate_gas(&self, message: &CallMessage) -> PlaygroundResult<u64>;

    async fn chain_id(&self) -> PlaygroundResult<u64>;

    /// Broadcasts an EIP-2718 encoded signed transaction
    async fn send_raw_transaction(&self, raw: &[u8]) -> PlaygroundResult<TxHash>;
}

/// Legacy transactions carry the gas price as `u128`.
pub fn gas_price_to_u128(gas_price: U256) -> PlaygroundResult<u128> {
    u128::try_from(gas_price).map_err(|_| {
        report!(Error::ChainError("gas price".to_string()))
            .attach_printable(format!("Gas price {gas_price} does not fit in u128"))
    })
}

/// JSON-RPC backed [`ChainClient`]. Every call is bounded by `timeout`.
#[derive(Clone)]
pub struct RpcChainClient {
    provider: RootProvider,
    timeout: Duration,
}

impl RpcChainClient {
    pub fn new(rpc_url: Url, timeout: Duration) -> Self {
        Self {
            provider: RootProvider::new_http(rpc_url),
            timeout,
        }
    }

    async fn with_deadline<T, F>(&self, method: &'static str, call: F) -> PlaygroundResult<T>
    where
        F: IntoFuture<Output = TransportResult<T>>,
    {
        debug!(method, "Sending RPC request");

        tokio::time::timeout(self.timeout, call.into_future())
            .await
            .map_err(|_| report!(Error::Timeout(method.to_string())))?
            .change_context(Error::ChainError(method.to_string()))
    }
}

#[async_trait]
impl ChainClient for RpcChainClient {
    async fn nonce_at(&self, address: Address) -> PlaygroundResult<u64> {
        self.with_deadline(
            "eth_getTransactionCount",
            self.provider
                .get_transaction_count(address)
                .block_id(BlockId::latest()),
        )
        .await
    }

    async fn estimate_gas(&self, message: &CallMessage) -> PlaygroundResult<u64> {
        let request = TransactionRequest::default()
            .with_from(message.from)
            .with_to(message.to)
            .with_gas_price(gas_price_to_u128(message.gas_price)?)
            .with_input(message.data.clone())
            .with_value(message.value);

        self.with_deadline("eth_estimateGas", self.provider.estimate_gas(request))
            .await
    }

    async fn chain_id(&self) -> PlaygroundResult<u64> {
        self.with_deadline("eth_chainId", self.provider.get_chain_id())
            .await
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> PlaygroundResult<TxHash> {
        let pending = self
            .with_deadline(
                "eth_sendRawTransaction",
                self.provider.send_raw_transaction(raw),
            )
            .await?;

        Ok(*pending.tx_hash())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gas_price_to_u128() {
        assert_eq!(
            gas_price_to_u128(U256::from(1_000_000_000u64)).unwrap(),
            1_000_000_000u128
        );
        assert_eq!(gas_price_to_u128(U256::from(u128::MAX)).unwrap(), u128::MAX);

        let err = gas_price_to_u128(U256::from(u128::MAX) + U256::from(1)).unwrap_err();
        assert!(matches!(err.current_context(), Error::ChainError(_)));
    }

    #[tokio::test]
    async fn test_rpc_call_to_closed_port_is_chain_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let url = Url::parse(&format!("http://{addr}")).unwrap();
        let client = RpcChainClient::new(url, Duration::from_secs(5));

        let err = client.chain_id().await.unwrap_err();
        assert_eq!(
            err.current_context(),
            &Error::ChainError("eth_chainId".to_string())
        );
    }
}
