pub mod asset_store;
pub mod client;
