pub mod batch;
pub mod browser;
pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod identifiers;
pub mod session;

pub use config::Config;
pub use error::DocFetchError;
