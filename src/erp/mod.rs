pub mod client;
pub mod credentials;
pub mod error;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{DEFAULT_BASE_URL, ErpClient, ProductionApi, Timeouts};
pub use credentials::{Anonymous, CredentialProvider, StaticToken, TokenFile};
pub use error::ErpError;
