//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量任务处理器
//! - 管理应用生命周期（初始化、运行）
//! - 批量加载任务（Vec<ExamJob>）
//! - 控制并发数量（Semaphore）
//! - 持有共享的协作者
//! - 输出全局统计信息
//!
//! ### `job_processor` - 单个任务处理器
//! - 为任务创建独立的 ExamPipeline
//! - 按顺序执行提取、预检、生成、修订、审计
//! - 写出最终快照
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<ExamJob>)
//!     ↓
//! job_processor (处理单个 ExamJob)
//!     ↓
//! workflow::ExamPipeline (一份试卷的状态机)
//!     ↓
//! services (能力层：分配 / 阶段调用 / 写文件)
//!     ↓
//! infrastructure (基础设施：LlmBackend)
//! ```

pub mod batch_processor;
pub mod job_processor;

// 重新导出主要类型
pub use batch_processor::{App, ProcessingStats};
pub use job_processor::{process_job, JobOutcome};
