pub mod model;
pub mod provider;

pub use model::{GeminiRequest, GeminiResponse};
pub use provider::GeminiAdapter;
