// src/services/mod.rs
pub mod backend;
pub mod encoder;
pub mod fences;
pub mod gateway;
pub mod prompts;

pub use backend::GeminiBackend;
pub use gateway::Gateway;
