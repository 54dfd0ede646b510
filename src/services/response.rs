//! 服务端响应处理
//!
//! 每个阶段的响应都经过同样的三步：
//! 1. 去掉外层的 Markdown 代码块标记
//! 2. 清理字符串值中的连字符（键名不动）
//! 3. 严格反序列化为阶段的类型

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::error::CollaboratorError;
use crate::models::Stage;

static FENCE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^\s*```[A-Za-z]*[ \t]*\r?\n?(.*?)\r?\n?\s*```\s*$")
        .expect("valid fence regex")
});
static HYPHEN_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\-\u{2010}-\u{2014}]").expect("valid hyphen regex"));
static SPACES_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r" {2,}").expect("valid spaces regex"));

/// 去掉包裹整个响应的代码块（```json ... ```），没有则原样返回
pub fn strip_code_fence(raw: &str) -> &str {
    match FENCE_REGEX.captures(raw).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str().trim(),
        None => raw.trim(),
    }
}

/// 把字符串中的连字符和破折号替换为空格，并合并连续空格
pub fn scrub_text(text: &str) -> String {
    if !HYPHEN_REGEX.is_match(text) {
        return text.to_string();
    }
    let replaced = HYPHEN_REGEX.replace_all(text, " ");
    SPACES_REGEX.replace_all(&replaced, " ").into_owned()
}

/// 递归清理 JSON 中所有字符串值，对象的键保持原样
pub fn scrub_hyphens(value: &mut Value) -> usize {
    match value {
        Value::String(s) => {
            let cleaned = scrub_text(s);
            if cleaned != *s {
                *s = cleaned;
                1
            } else {
                0
            }
        }
        Value::Array(items) => items.iter_mut().map(scrub_hyphens).sum(),
        Value::Object(map) => map.values_mut().map(scrub_hyphens).sum(),
        Value::Null | Value::Bool(_) | Value::Number(_) => 0,
    }
}

/// 解析阶段响应
///
/// 响应必须是单个 JSON 对象；解析或结构不符都算该阶段失败
pub fn parse_stage_response<T: DeserializeOwned>(
    stage: Stage,
    raw: &str,
) -> Result<T, CollaboratorError> {
    let body = strip_code_fence(raw);

    let mut value: Value = serde_json::from_str(body)
        .map_err(|source| CollaboratorError::SchemaMismatch { stage, source })?;

    if !value.is_object() {
        return Err(CollaboratorError::InvariantViolation {
            stage,
            reason: "响应不是 JSON 对象".to_string(),
        });
    }

    let scrubbed = scrub_hyphens(&mut value);
    if scrubbed > 0 {
        debug!("[{}] 清理了 {} 个字段中的连字符", stage, scrubbed);
    }

    serde_json::from_value(value).map_err(|source| CollaboratorError::SchemaMismatch { stage, source })
}
