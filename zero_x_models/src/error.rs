use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type ModelResult<T> = error_stack::Result<T, Error>;

#[derive(Error, Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum Error {
    #[error("Parse error")]
    ParseError,

    #[error("Reqwest error: {0}")]
    ReqwestError(String),

    #[error("Bad response status: {0}")]
    ResponseError(u16),
}
