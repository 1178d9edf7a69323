//! Adapter for the external market-data service

pub mod messages;
pub mod rest;

pub use rest::FeedRestClient;
