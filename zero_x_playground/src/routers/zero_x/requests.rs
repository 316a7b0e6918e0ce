use alloy::primitives::U256;
use serde_json::json;
use zero_x_models::network::http::{Args, value_to_args};

use crate::error::{PlaygroundResult, from_models_report};

/// Parameters of `GET /swap/v0/quote`. Exactly one amount is expected to be
/// set; an absent amount is left out of the query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZeroXQuoteRequest {
    /// Ticker or address of the token to sell
    pub sell_token: String,
    /// Ticker or address of the token to buy
    pub buy_token: String,
    /// Size in base units of the sell token
    pub sell_amount: Option<U256>,
    /// Size in base units of the buy token
    pub buy_amount: Option<U256>,
}

impl ZeroXQuoteRequest {
    pub fn to_args(&self) -> PlaygroundResult<Args> {
        let query = json!({
            "sellToken": self.sell_token,
            "buyToken": self.buy_token,
            "sellAmount": self.sell_amount.map(|amount| amount.to_string()),
            "buyAmount": self.buy_amount.map(|amount| amount.to_string()),
        });

        value_to_args(&query).map_err(from_models_report)
    }
}
