use std::time::Duration;

use error_stack::ResultExt as _;
use reqwest::{Client, Url};
use tracing::{debug, info};
use zero_x_models::network::http::{Args, build_url, read_ok_body};

use crate::{
    error::{Error, PlaygroundResult, from_models_report},
    routers::zero_x::{
        QUOTE_ENDPOINT, SWAP_API_VERSION, SWAP_PATH,
        quote::{Quote, decode_quote},
        requests::ZeroXQuoteRequest,
    },
};

/// HTTP client for the 0x API rooted at a base URL.
#[derive(Debug, Clone)]
pub struct ZeroXClient {
    base: Url,
    client: Client,
}

impl ZeroXClient {
    /// `timeout` bounds each request from connect to the end of the body.
    pub fn new(raw_base_url: &str, timeout: Duration) -> PlaygroundResult<Self> {
        let base = Url::parse(raw_base_url)
            .change_context(Error::ParseError)
            .attach_printable_lazy(|| format!("Invalid 0x API URL: {raw_base_url}"))?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .change_context(Error::ReqwestError)
            .attach_printable("Error building 0x HTTP client")?;

        Ok(Self { base, client })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Issues `GET {base}/{path}/v{version}/{endpoint}?{args}` and returns the
    /// body of a `200 OK` response.
    pub async fn get(
        &self,
        path: &str,
        version: u32,
        endpoint: &str,
        args: &Args,
    ) -> PlaygroundResult<Vec<u8>> {
        let version = format!("v{version}");
        let url = build_url(&self.base, &[path, &version, endpoint], args)
            .map_err(from_models_report)?;

        debug!(%url, "Sending 0x request");

        let request = self
            .client
            .get(url)
            .build()
            .change_context(Error::ReqwestError)
            .attach_printable("Error building 0x request")?;

        let response = self
            .client
            .execute(request)
            .await
            .change_context(Error::ReqwestError)
            .attach_printable("Error in 0x request")?;

        read_ok_body(response).await.map_err(from_models_report)
    }

    /// Fetches and decodes `/swap/v0/quote`.
    pub async fn quote(&self, request: &ZeroXQuoteRequest) -> PlaygroundResult<Quote> {
        let args = request.to_args()?;

        let body = self
            .get(SWAP_PATH, SWAP_API_VERSION, QUOTE_ENDPOINT, &args)
            .await
            .attach_printable("Failed to fetch quote")?;

        let quote = decode_quote(&body).attach_printable("Failed to decode quote")?;

        info!(
            price = %quote.price,
            sell_amount = %quote.sell_amount,
            buy_amount = %quote.buy_amount,
            sources = quote.sources.len(),
            "Received 0x quote"
        );

        Ok(quote)
    }
}
