//! 业务能力层
//!
//! 描述"我能做什么"：分配算法、阶段调用、响应处理。不持有流水线状态。

pub mod co_constructor;
pub mod collaborator;
pub mod extractor;
pub mod generator;
pub mod normalizer;
pub mod output_writer;
pub mod qa_audit;
pub mod response;
pub mod rtti_calculator;
pub mod validator;

pub use collaborator::ExamCollaborator;
pub use output_writer::OutputWriter;
pub use rtti_calculator::calculate_rtti_counts;
