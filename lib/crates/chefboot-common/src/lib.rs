pub mod config;
pub mod types;

pub use config::{CachePolicy, FailurePolicy, Retention};
pub use types::*;
