//! 生成服务协作者 - 业务能力层
//!
//! 把"一次阶段调用"封装为：组装提示词 → 调用后端 → 解析响应。
//! 各阶段的提示词和入参在各自的文件里（extractor / normalizer / validator /
//! generator / co_constructor / qa_audit），都以 `impl ExamCollaborator` 的形式扩展。

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::CollaboratorError;
use crate::infrastructure::{LlmBackend, LlmRequest};
use crate::models::Stage;
use crate::services::response::parse_stage_response;
use crate::utils::logging::truncate_text;

/// 所有阶段共用的硬性规则
pub(crate) const HOUSE_RULES: &str = "\
REGELS (NIET ONDERHANDELBAAR):
1. GEEN KOPPELTEKENS: gebruik nergens een koppelteken of gedachtestreepje. Vervang door een spatie of komma.
2. GESLOTEN SYSTEEM: gebruik uitsluitend de aangeleverde informatie, geen externe kennis.
3. Antwoord met precies één JSON object volgens het gevraagde schema, zonder toelichting eromheen.";

/// 一个阶段的提示词
#[derive(Debug, Clone)]
pub(crate) struct StagePrompt {
    pub system: String,
    pub user: String,
    pub temperature: f32,
}

/// 阶段协作者
///
/// 职责：
/// - 为每个阶段构建请求（角色、指令、输入数据、输出结构）
/// - 选择模型：提取 / 规范化 / 预检用快速模型，其余用强模型
/// - 返回强类型结果，不触碰流水线状态
pub struct ExamCollaborator {
    backend: Arc<dyn LlmBackend>,
    fast_model: String,
    pro_model: String,
    max_tokens: u32,
}

impl ExamCollaborator {
    pub fn new(backend: Arc<dyn LlmBackend>, config: &Config) -> Self {
        Self::with_models(
            backend,
            config.llm_fast_model.clone(),
            config.llm_pro_model.clone(),
            config.llm_max_tokens,
        )
    }

    pub fn with_models(
        backend: Arc<dyn LlmBackend>,
        fast_model: impl Into<String>,
        pro_model: impl Into<String>,
        max_tokens: u32,
    ) -> Self {
        Self {
            backend,
            fast_model: fast_model.into(),
            pro_model: pro_model.into(),
            max_tokens,
        }
    }

    /// 阶段对应的模型
    pub fn model_for(&self, stage: Stage) -> &str {
        match stage {
            Stage::Extract | Stage::Normalize | Stage::Validate => &self.fast_model,
            Stage::Generate | Stage::CoConstruct | Stage::Audit => &self.pro_model,
        }
    }

    /// 发出请求并解析为 `T`
    pub(crate) async fn call<T: DeserializeOwned>(
        &self,
        stage: Stage,
        prompt: StagePrompt,
        images: Vec<String>,
    ) -> Result<T, CollaboratorError> {
        let model = self.model_for(stage).to_string();
        info!("[{}] 🤖 请求生成服务 (模型: {})", stage, model);

        let raw = self
            .backend
            .complete(LlmRequest {
                stage,
                model,
                system_message: Some(prompt.system),
                user_message: prompt.user,
                images,
                temperature: prompt.temperature,
                max_tokens: self.max_tokens,
            })
            .await?;

        debug!("[{}] 原始响应: {}", stage, truncate_text(&raw, 200));
        parse_stage_response(stage, &raw)
    }
}

/// 把输入数据序列化为提示词中的 JSON 文本
pub(crate) fn to_prompt_json<T: Serialize + ?Sized>(
    stage: Stage,
    value: &T,
) -> Result<String, CollaboratorError> {
    serde_json::to_string_pretty(value).map_err(|e| CollaboratorError::RequestBuild {
        stage,
        message: format!("输入数据序列化失败: {}", e),
    })
}
