use serde::{Deserialize, Serialize};

use crate::models::params::GeneratorParams;

/// 一轮协同修订指令
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevisionStep {
    /// 教师的自然语言指令
    pub instruction: String,
    /// 额外上下文（可选）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// 试卷任务（一个 TOML 文件）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamJob {
    pub name: String,
    #[serde(default)]
    pub params: GeneratorParams,
    /// 待提取的页面图片 URL（可选）
    #[serde(default)]
    pub image_urls: Vec<String>,
    /// 生成前先做可行性预检
    #[serde(default = "default_true")]
    pub preflight: bool,
    /// 按顺序执行的协同修订
    #[serde(default)]
    pub revisions: Vec<RevisionStep>,
    /// 最后执行质量审计
    #[serde(default = "default_true")]
    pub audit: bool,
    #[serde(skip_serializing, skip_deserializing)]
    pub file_path: Option<String>,
}

fn default_true() -> bool {
    true
}

impl ExamJob {
    /// 是否需要先走图片提取
    pub fn needs_extraction(&self) -> bool {
        !self.image_urls.is_empty()
    }

    pub fn with_file_path(mut self, file_path: String) -> Self {
        self.file_path = Some(file_path);
        self
    }
}
