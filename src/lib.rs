mod config;
mod error;
pub mod fetch;
mod generic_structs;
pub mod pipeline;
pub mod sink;
pub mod sources;
pub mod table;
#[cfg(test)]
mod testing;
pub mod transform;

pub use config::{Config, CONNECTION_STRING_VAR};
pub use error::{ConfigError, FetchError, SinkError};
pub use generic_structs::*;
