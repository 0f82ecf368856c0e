pub mod config;
pub mod model;
pub mod sieve;
pub mod store;
