//! # Exam Pipeline
//!
//! 围绕一份不断演进的试卷文档，协调提取、规范化、预检、生成、协同修订与审计各阶段
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（LLM 客户端），只暴露能力
//! - `LlmBackend` - 补全能力的抽象，测试时可替换
//! - `OpenAiBackend` - 基于 async-openai 的实现
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，不持有流水线状态
//! - `calculate_rtti_counts` - 最大余数法分配题目数量
//! - `ExamCollaborator` - 六个阶段的请求与响应约定
//! - `OutputWriter` - 写结果文件能力
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一份试卷"的完整生命周期
//! - `ExamPipeline` - 状态机（单飞、互斥、版本号、错误通道）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量任务处理器，管理资源和并发
//! - `orchestrator/job_processor` - 单个任务处理器，按顺序执行各阶段
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{LlmBackend, LlmRequest, OpenAiBackend};
pub use models::{ExamArtifact, ExamJob, GeneratorParams, RttiCounts, RttiWeights, Stage};
pub use orchestrator::{process_job, App};
pub use services::{calculate_rtti_counts, ExamCollaborator};
pub use workflow::{ExamPipeline, LifecycleState, PipelineSnapshot};
