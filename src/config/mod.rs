//! Configuration module

pub mod loader;
pub mod types;

pub use loader::{load_config, load_with_dotenv};
pub use types::AppConfig;
