//! Tableau REST API module
//!
//! Provides a typed client for the Tableau Server / Tableau Cloud REST API.

pub mod client;
pub mod types;

pub use client::TableauClient;
pub use types::*;
