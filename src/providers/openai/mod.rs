pub mod model;
pub mod provider;

pub use model::{OpenAIRequest, OpenAIResponse};
pub use provider::OpenAIAdapter;
