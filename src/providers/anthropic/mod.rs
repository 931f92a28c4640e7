pub mod model;
pub mod provider;

pub use model::{AnthropicRequest, AnthropicResponse};
pub use provider::AnthropicAdapter;
