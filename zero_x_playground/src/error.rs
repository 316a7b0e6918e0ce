use error_stack::{AttachmentKind, FrameKind, Report};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zero_x_models::error::Error as ModelsError;

pub type PlaygroundResult<T> = error_stack::Result<T, Error>;

#[derive(Error, Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum Error {
    #[error("Parse error")]
    ParseError,

    #[error("Reqwest error")]
    ReqwestError,

    #[error("Bad response status: {0}")]
    ResponseError(u16),

    /// Carries the wire name of the field that failed to convert.
    #[error("Failed to decode field: {0}")]
    DecodeError(String),

    #[error("Serde deserialize error: {0}")]
    SerdeDeserialize(String),

    #[error("Usage error: {0}")]
    UsageError(String),

    #[error("Chain error: {0}")]
    ChainError(String),

    #[error("Timed out waiting for {0}")]
    Timeout(String),

    #[error("Models error")]
    ModelsError,
}

impl From<&ModelsError> for Error {
    fn from(error: &ModelsError) -> Self {
        match error {
            ModelsError::ParseError => Error::ParseError,
            ModelsError::ReqwestError(_) => Error::ReqwestError,
            ModelsError::ResponseError(status) => Error::ResponseError(*status),
        }
    }
}

/// Lifts a report from the shared HTTP layer, keeping the status/transport
/// distinction in the new context.
pub fn from_models_report(report: Report<ModelsError>) -> Report<Error> {
    let context = Error::from(report.current_context());
    report.change_context(context)
}

pub trait ReportDisplayExt {
    fn format(&self) -> String;
}

impl ReportDisplayExt for Report<Error> {
    fn format(&self) -> String {
        let mut output = String::new();

        let frames = self.current_frames();

        for frame in frames.iter() {
            if let FrameKind::Attachment(AttachmentKind::Printable(attachment)) = frame.kind() {
                output.push_str(&format!(" {attachment} "));
            }
        }

        output.trim().to_string()
    }
}
