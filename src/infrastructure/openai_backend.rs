//! OpenAI 兼容后端
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务（如 Gemini 代理、Azure 等）

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImage,
        ChatCompletionRequestMessageContentPartText, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessage, ChatCompletionRequestUserMessageArgs,
        ChatCompletionRequestUserMessageContent, ChatCompletionRequestUserMessageContentPart,
        CreateChatCompletionRequestArgs, ImageDetail, ImageUrl,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::CollaboratorError;
use crate::infrastructure::llm_backend::{LlmBackend, LlmRequest};
use crate::models::Stage;

/// OpenAI 兼容的 LLM 后端
pub struct OpenAiBackend {
    client: Client<OpenAIConfig>,
}

impl OpenAiBackend {
    /// 创建新的后端
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
        }
    }
}

#[async_trait]
impl LlmBackend for OpenAiBackend {
    async fn complete(&self, request: LlmRequest) -> Result<String, CollaboratorError> {
        let stage = request.stage;
        debug!("[{}] 调用 LLM API，模型: {}", stage, request.model);
        debug!(
            "[{}] 用户消息长度: {} 字符, 图片 {} 张",
            stage,
            request.user_message.len(),
            request.images.len()
        );

        let build_err = |e: async_openai::error::OpenAIError| CollaboratorError::RequestBuild {
            stage,
            message: e.to_string(),
        };

        let mut messages = Vec::new();

        if let Some(sys_msg) = &request.system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg.as_str())
                .build()
                .map_err(build_err)?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let user_msg = build_user_message(stage, &request.user_message, &request.images)?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(&request.model)
            .messages(messages)
            .temperature(request.temperature)
            .max_tokens(request.max_tokens)
            .build()
            .map_err(build_err)?;

        let response = self.client.chat().create(chat_request).await.map_err(|e| {
            warn!("[{}] LLM API 调用失败: {}", stage, e);
            CollaboratorError::Unavailable {
                stage,
                model: request.model.clone(),
                message: e.to_string(),
            }
        })?;

        debug!("[{}] LLM API 调用成功", stage);

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| CollaboratorError::EmptyResponse {
                stage,
                model: request.model.clone(),
            })?;

        Ok(content.trim().to_string())
    }
}

/// 构建用户消息，有图片时使用 Vision 多段内容
fn build_user_message(
    stage: Stage,
    text: &str,
    images: &[String],
) -> Result<ChatCompletionRequestUserMessage, CollaboratorError> {
    let build_err = |e: async_openai::error::OpenAIError| CollaboratorError::RequestBuild {
        stage,
        message: e.to_string(),
    };

    if images.is_empty() {
        return ChatCompletionRequestUserMessageArgs::default()
            .content(text)
            .build()
            .map_err(build_err);
    }

    // 图片在前，指令在后
    let mut content_parts: Vec<ChatCompletionRequestUserMessageContentPart> = images
        .iter()
        .map(|url| {
            ChatCompletionRequestUserMessageContentPart::ImageUrl(
                ChatCompletionRequestMessageContentPartImage {
                    image_url: ImageUrl {
                        url: url.clone(),
                        detail: Some(ImageDetail::High),
                    },
                },
            )
        })
        .collect();
    content_parts.push(ChatCompletionRequestUserMessageContentPart::Text(
        ChatCompletionRequestMessageContentPartText {
            text: text.to_string(),
        },
    ));

    debug!("[{}] 使用 Vision API，包含 {} 张图片", stage, images.len());

    ChatCompletionRequestUserMessageArgs::default()
        .content(ChatCompletionRequestUserMessageContent::Array(
            content_parts,
        ))
        .build()
        .map_err(build_err)
}
