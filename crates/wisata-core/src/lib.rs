pub mod config;
pub mod error;
pub mod text;

pub use config::WisataConfig;
pub use error::{Result, WisataError};
