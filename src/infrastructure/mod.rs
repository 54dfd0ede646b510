//! 基础设施层
//!
//! 持有稀缺资源（LLM 客户端连接），只暴露能力

pub mod llm_backend;
pub mod openai_backend;

pub use llm_backend::{LlmBackend, LlmRequest};
pub use openai_backend::OpenAiBackend;
