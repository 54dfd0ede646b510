//! LLM 后端抽象 - 基础设施层
//!
//! 流水线与外部生成服务之间唯一的边界：发出一次文本/JSON 补全请求，
//! 拿回原始文本。解析与校验由上层的阶段服务负责。

use async_trait::async_trait;

use crate::error::CollaboratorError;
use crate::models::Stage;

/// 一次补全请求
#[derive(Debug, Clone, PartialEq)]
pub struct LlmRequest {
    /// 发起请求的阶段（用于日志和错误归属）
    pub stage: Stage,
    pub model: String,
    /// 角色设定
    pub system_message: Option<String>,
    /// 任务指令与输入数据
    pub user_message: String,
    /// 图片 URL（可以是 data URL），仅提取阶段使用
    pub images: Vec<String>,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// LLM 后端
///
/// 职责：
/// - 持有唯一的客户端连接
/// - 只暴露"补全"能力
/// - 不认识试卷 / 阶段语义
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// 发送请求并返回原始文本
    async fn complete(&self, request: LlmRequest) -> Result<String, CollaboratorError>;
}
