//! Client for the hosted tabular-store's document REST API.

pub mod client;
pub mod models;

pub use client::GristClient;
pub use models::StoredRecord;
