use serde::Deserialize;

// https://0x.org/docs/0x-swap-api/api-references/get-swap-v0-quote
//
// Scalars stay optional strings here so a missing key is reported under its
// own name when converting into `Quote`.

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZeroXQuoteResponse {
    pub price: Option<String>,
    pub to: Option<String>,
    pub data: Option<String>,
    pub value: Option<String>,
    pub gas_price: Option<String>,
    pub gas: Option<String>,
    pub protocol_fee: Option<String>,
    pub buy_amount: Option<String>,
    pub sell_amount: Option<String>,
    pub sources: Option<Vec<ZeroXSource>>,
    pub buy_token_address: Option<String>,
    pub sell_token_address: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZeroXSource {
    pub name: Option<String>,
    pub proportion: Option<String>,
}
