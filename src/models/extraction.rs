//! 提取与规范化阶段的输出结构
//!
//! 所有字段都是确定的类型，不接受"可能是字符串也可能是对象"的内容

use serde::{Deserialize, Serialize};

/// 识别出的片段标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionLabel {
    Leerdoelen,
    Begrippenlijst,
    Bronnen,
    Leertekst,
    Overig,
}

/// 页面中的一个片段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedSection {
    pub label: SectionLabel,
    pub text: String,
}

/// 单页提取结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedPage {
    pub page_id: String,
    pub raw_text: String,
    pub detected_sections: Vec<DetectedSection>,
    pub warnings: Vec<String>,
}

/// 术语及定义
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub term: String,
    #[serde(rename = "definitie")]
    pub definition: String,
}

/// 提取或规范化后的材料
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceText {
    #[serde(rename = "bron_id")]
    pub id: String,
    #[serde(rename = "titel")]
    pub title: String,
    #[serde(rename = "bron_tekst")]
    pub text: String,
}

/// 图片提取输出
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionOutput {
    pub pages: Vec<ExtractedPage>,
    #[serde(rename = "leerdoelen")]
    pub learning_goals: Vec<String>,
    #[serde(rename = "begrippen")]
    pub terms: Vec<Term>,
    #[serde(rename = "bronnen")]
    pub sources: Vec<SourceText>,
    #[serde(rename = "leertekst", default)]
    pub learning_text: String,
    pub global_warnings: Vec<String>,
}

/// 规范化输出
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedOutput {
    #[serde(rename = "normalized_leerdoelen")]
    pub learning_goals: Vec<String>,
    #[serde(rename = "normalized_begrippen")]
    pub terms: Vec<Term>,
    #[serde(rename = "normalized_bronnen")]
    pub sources: Vec<SourceText>,
    #[serde(rename = "normalized_leertekst", default)]
    pub learning_text: String,
    pub notes: Vec<String>,
}

impl NormalizedOutput {
    /// 学习目标，每行一条
    pub fn goals_text(&self) -> String {
        self.learning_goals.join("\n")
    }

    /// 术语，"术语: 定义" 每行一条
    pub fn terms_text(&self) -> String {
        self.terms
            .iter()
            .map(|t| format!("{}: {}", t.term, t.definition))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// 材料文本，末尾附学习文本
    pub fn sources_text(&self) -> String {
        let mut text = self
            .sources
            .iter()
            .map(|s| format!("BRON {}: {}\n{}", s.id, s.title, s.text))
            .collect::<Vec<_>>()
            .join("\n\n");
        if !self.learning_text.trim().is_empty() {
            text.push_str("\n\nLEERTEKST:\n");
            text.push_str(&self.learning_text);
        }
        text
    }
}
