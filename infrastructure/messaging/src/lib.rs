pub mod connection;
pub mod consumer;
pub mod correlation;
pub mod error;
pub mod handlers;
pub mod messages;
pub mod publisher;
pub mod retry;
pub mod topology;
