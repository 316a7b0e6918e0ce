use alloy::consensus::{SignableTransaction as _, TxEnvelope, TxLegacy};
use alloy::eips::eip2718::Encodable2718 as _;
use alloy::network::TxSignerSync as _;
use alloy::primitives::{TxHash, TxKind};
use alloy::signers::local::PrivateKeySigner;
use error_stack::ResultExt as _;
use tracing::{info, warn};

use crate::{
    error::{Error, PlaygroundResult},
    evm::chain::{CallMessage, ChainClient, gas_price_to_u128},
    routers::zero_x::quote::Quote,
};

/// Builds the legacy fill transaction for `quote` and signs it for
/// `chain_id` (EIP-155).
pub fn sign_fill_transaction(
    signer: &PrivateKeySigner,
    quote: &Quote,
    nonce: u64,
    gas_limit: u64,
    chain_id: u64,
) -> PlaygroundResult<TxEnvelope> {
    let mut tx = TxLegacy {
        chain_id: Some(chain_id),
        nonce,
        gas_price: gas_price_to_u128(quote.gas_price)?,
        gas_limit,
        to: TxKind::Call(quote.to),
        value: quote.value,
        input: quote.data.clone(),
    };

    let signature = signer
        .sign_transaction_sync(&mut tx)
        .change_context(Error::ChainError("sign transaction".to_string()))?;

    Ok(TxEnvelope::Legacy(tx.into_signed(signature)))
}

/// Submits `quote` from the signer's account and returns the transaction hash.
///
/// The gas limit comes from the node's estimate for the exact call, not from
/// the quote.
pub async fn fill_quote<C>(
    chain: &C,
    signer: &PrivateKeySigner,
    quote: &Quote,
) -> PlaygroundResult<TxHash>
where
    C: ChainClient + ?Sized,
{
    let from = signer.address();

    let nonce = chain.nonce_at(from).await?;

    let gas_limit = chain
        .estimate_gas(&CallMessage {
            from,
            to: quote.to,
            gas_price: quote.gas_price,
            data: quote.data.clone(),
            value: quote.value,
        })
        .await?;

    let chain_id = chain.chain_id().await?;

    let signed = sign_fill_transaction(signer, quote, nonce, gas_limit, chain_id)?;
    let raw = signed.encoded_2718();

    info!(%from, nonce, gas_limit, chain_id, to = %quote.to, "Sending fill transaction");

    let tx_hash = chain.send_raw_transaction(&raw).await?;
    if tx_hash != *signed.tx_hash() {
        warn!(%tx_hash, local = %signed.tx_hash(), "Node returned a different transaction hash");
    }

    Ok(tx_hash)
}
