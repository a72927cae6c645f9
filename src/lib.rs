//! Production-floor client for a glass-manufacturing ERP.
//!
//! Job cards move through a fixed stage pipeline ([`production`]); the
//! backend is reached through a typed client ([`erp`]); QR/barcode tags and
//! batch reports are composed as printable HTML ([`print`]).

pub mod cli;
pub mod config;
pub mod desk;
pub mod erp;
pub mod error;
pub mod print;
pub mod production;
pub mod ui;
