pub mod catalog;
pub mod config;
pub mod dispatch;
pub mod errors;
pub mod extract;
pub mod imagegen;
pub mod middleware;
pub mod prompts;
pub mod providers;
pub mod resolver;
pub mod server;
pub mod settings;
pub mod tasks;

// Re-export commonly used types for easier access
pub use catalog::{ModelCatalog, Provider};
pub use config::{load_config, Config, LoggingConfig};
pub use errors::{AppError, AppResult};
pub use server::{create_app, AppState, start_server};
