//! Data models and structures for ving

pub mod config;

// Re-export main model types
pub use config::Config;
