//! 流程层
//!
//! 定义"一份试卷"的完整生命周期：哪个阶段何时可以执行，结果如何合并。

pub mod pipeline;
pub mod pipeline_state;

pub use pipeline::ExamPipeline;
pub use pipeline_state::{LifecycleState, PipelineSnapshot, RevisionReview};
