pub mod dependency_injection;
pub mod server;
pub mod worker;
