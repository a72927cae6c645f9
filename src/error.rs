use thiserror::Error;

use crate::erp::ErpError;
use crate::print::PrintError;

#[derive(Debug, Error)]
pub enum GlasslineError {
    #[error("Job card {0} is not in the current listing")]
    UnknownJobCard(i64),

    #[error(transparent)]
    Erp(#[from] ErpError),

    #[error("Print error: {0}")]
    Print(#[from] PrintError),
}

impl GlasslineError {
    /// Short category shown in front of operator notifications.
    pub fn kind(&self) -> &'static str {
        match self {
            GlasslineError::UnknownJobCard(_) => "not found",
            GlasslineError::Erp(err) => match err {
                ErpError::Network(_) => "network",
                ErpError::Unauthorized(_) | ErpError::Credentials(_) => "auth",
                ErpError::NotFound(_) => "not found",
                ErpError::Validation(_) => "validation",
                ErpError::Service { .. } => "service",
                ErpError::Malformed(_) => "bad response",
                ErpError::InvalidBaseUrl { .. } => "configuration",
            },
            GlasslineError::Print(_) => "print",
        }
    }
}
