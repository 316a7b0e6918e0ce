use crate::error::{Error, ModelResult};
use error_stack::{ResultExt, report};
use reqwest::{Response, StatusCode, Url};
use serde_json::value::Value;
use std::collections::BTreeMap;
use tracing::{debug, error};

/// Query parameters keyed by name. Inserting an existing key replaces its value.
pub type Args = BTreeMap<String, String>;

/// Converts a JSON object into query [`Args`]
///
/// Takes a JSON object and flattens its members into name/value pairs.
/// `null` members are dropped, which is how optional parameters are left out
/// of a request instead of being sent empty.
///
/// # Arguments
///
/// * `value` - JSON Value object to convert
///
/// # Errors
///
/// Returns `Error::ParseError` if:
/// - Input value is not a JSON object
///
pub fn value_to_args(value: &Value) -> ModelResult<Args> {
    match value {
        Value::Object(map) => Ok(map
            .iter()
            .filter(|(_, v)| !matches!(v, Value::Null))
            .map(|(k, v)| {
                let value_str = match v {
                    Value::String(s) => s.to_string(),
                    _ => v.to_string(),
                };
                (k.clone(), value_str)
            })
            .collect()),
        _ => Err(report!(Error::ParseError)
            .attach_printable(format!("Invalid JSON Object: {value:?}"))),
    }
}

/// Appends `segments` to `base` and encodes `args` as the query string.
///
/// Parameters come out sorted by name, each exactly once. No `?` is added when
/// `args` is empty.
pub fn build_url(base: &Url, segments: &[&str], args: &Args) -> ModelResult<Url> {
    let raw = format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        segments.join("/")
    );

    let mut url = Url::parse(&raw)
        .change_context(Error::ParseError)
        .attach_printable_lazy(|| format!("Invalid request URL: {raw}"))?;

    if !args.is_empty() {
        url.query_pairs_mut().extend_pairs(args.iter());
    }

    Ok(url)
}

/// Returns the body of a `200 OK` response.
///
/// Any other status becomes `Error::ResponseError` with the status code. The
/// body of such a response is logged and never handed to a decoder.
pub async fn read_ok_body(response: Response) -> ModelResult<Vec<u8>> {
    let status = response.status();
    let url = response.url().clone();

    if status != StatusCode::OK {
        let error_body = response.text().await.unwrap_or_default();

        error!(status = status.as_u16(), %url, "Error Body: {}", &error_body);

        return Err(report!(Error::ResponseError(status.as_u16()))
            .attach_printable(format!("Bad status on request to {url}: {status}")));
    }

    let body = response.bytes().await.change_context(Error::ReqwestError(
        "Failed to read response body".to_string(),
    ))?;

    debug!(%url, bytes = body.len(), "Response body received");

    Ok(body.to_vec())
}
