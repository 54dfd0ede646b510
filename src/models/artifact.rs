//! 试卷文档（Exam Artifact）
//!
//! 字段的线上名称与生成服务约定的 JSON 结构保持一致

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::models::level::LevelProfile;
use crate::models::params::QuestionType;
use crate::models::rtti::{Category, RttiCounts};

/// 试卷元数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMeta {
    #[serde(rename = "titel")]
    pub title: String,
    /// 级别展示名称
    #[serde(rename = "niveau")]
    pub level: String,
    #[serde(rename = "niveauProfiel")]
    pub level_profile: LevelProfile,
    #[serde(rename = "enabledQuestionTypes")]
    pub enabled_question_types: Vec<QuestionType>,
    #[serde(rename = "leerjaar", default, skip_serializing_if = "Option::is_none")]
    pub grade_year: Option<String>,
    #[serde(rename = "onderwerp")]
    pub topic: String,
    /// 考试时长（分钟）
    #[serde(rename = "tijd")]
    pub time_minutes: u32,
    #[serde(rename = "questionCount")]
    pub question_count: u32,
    #[serde(rename = "totalPoints")]
    pub total_points: u32,
    /// 生成时使用的 RTTI 目标，由流水线写入，不信任服务端的值
    #[serde(rename = "rttiCountsTarget")]
    pub rtti_counts_target: RttiCounts,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
}

/// 材料类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Tekst,
    Tabel,
    Kaart,
    Grafiek,
}

/// 参考材料
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: SourceKind,
}

/// 地理维度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dimension {
    #[serde(rename = "fysisch geografisch")]
    FysischGeografisch,
    #[serde(rename = "sociaal economisch")]
    SociaalEconomisch,
    #[serde(rename = "integratief")]
    Integratief,
}

/// 核心概念
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoreConcept {
    #[serde(rename = "verscheidenheid")]
    Verscheidenheid,
    #[serde(rename = "samenhang")]
    Samenhang,
    #[serde(rename = "schaal")]
    Schaal,
    #[serde(rename = "perceptie")]
    Perceptie,
    #[serde(rename = "verandering in tijd")]
    VeranderingInTijd,
}

/// 学生视图中的一道题
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentItem {
    pub id: u32,
    #[serde(rename = "punten")]
    pub points: u32,
    pub rtti: Category,
    /// 引用的材料 ID
    #[serde(rename = "bron_id", default)]
    pub source_ids: Vec<String>,
    #[serde(rename = "dimensie")]
    pub dimension: Dimension,
    #[serde(rename = "kernconcept")]
    pub core_concept: CoreConcept,
    #[serde(rename = "vraag_tekst")]
    pub text: String,
    #[serde(rename = "opties", default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    #[serde(rename = "bronrechtvaardiging")]
    pub source_justification: String,
}

/// 教师视图中的评分项，与学生题目一一对应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeacherItem {
    #[serde(rename = "vraag_id")]
    pub question_id: u32,
    pub rtti: Category,
    #[serde(rename = "motivatie")]
    pub motivation: String,
    #[serde(rename = "punten")]
    pub points: u32,
    #[serde(rename = "antwoord_model")]
    pub model_answer: String,
    #[serde(rename = "beoordelingsregels")]
    pub grading_rules: Vec<String>,
    #[serde(rename = "vereiste_vaktaal")]
    pub required_vocabulary: Vec<String>,
    #[serde(rename = "veelgemaakte_fouten")]
    pub common_mistakes: Vec<String>,
    #[serde(rename = "syllabus_domein")]
    pub syllabus_domain: String,
    #[serde(rename = "tijdsindicatie")]
    pub time_indication: String,
    #[serde(rename = "geografische_schaal")]
    pub geographic_scale: String,
}

/// 质量说明（仅供参考）
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QualityNotes {
    #[serde(rename = "rtti_dekking")]
    pub rtti_coverage: String,
    #[serde(rename = "bron_gebruik")]
    pub source_use: String,
    #[serde(rename = "taal_check")]
    pub language_check: String,
    pub google_proof_check: String,
}

/// 完整的试卷文档
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamArtifact {
    pub meta: ArtifactMeta,
    pub sources: Vec<Source>,
    #[serde(rename = "student_view")]
    pub student_items: Vec<StudentItem>,
    #[serde(rename = "teacher_view")]
    pub teacher_items: Vec<TeacherItem>,
    #[serde(rename = "beeld_prompts", default)]
    pub image_prompts: Vec<String>,
    #[serde(rename = "quality_report")]
    pub quality_notes: QualityNotes,
}

/// 试卷与目标的一致性检查结果（软约束）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactConsistency {
    /// 实际的标签分布
    pub actual: RttiCounts,
    /// 对照的目标
    pub target: RttiCounts,
    /// 标签分布与目标完全一致
    pub rtti_ok: bool,
    /// 题目数量与声明一致
    pub count_ok: bool,
    /// 所有题目的题型都在启用列表内
    pub types_ok: bool,
    /// 声明总分与题目分值之和一致
    pub points_ok: bool,
    /// 没有被任何题目引用的材料
    pub unused_sources: Vec<String>,
}

impl ArtifactConsistency {
    /// 是否视为一致
    pub fn is_consistent(&self) -> bool {
        self.rtti_ok && self.count_ok
    }
}

impl ExamArtifact {
    /// 实际的 RTTI 分布
    pub fn rtti_counts(&self) -> RttiCounts {
        RttiCounts::tally(self.student_items.iter().map(|item| item.rtti))
    }

    /// 题目分值之和（u64，分值来自外部响应）
    pub fn points_total(&self) -> u64 {
        self.student_items
            .iter()
            .map(|item| u64::from(item.points))
            .sum()
    }

    /// 查找题目对应的评分项
    pub fn teacher_item(&self, question_id: u32) -> Option<&TeacherItem> {
        self.teacher_items
            .iter()
            .find(|item| item.question_id == question_id)
    }

    /// 检查结构不变量（硬约束）
    ///
    /// - 学生题目 ID 唯一
    /// - 教师评分项与学生题目按 ID 一一对应
    /// - 材料 ID 唯一
    /// - 题目引用的材料都存在
    pub fn check_structure(&self) -> Result<(), String> {
        let mut student_ids = HashSet::new();
        for item in &self.student_items {
            if !student_ids.insert(item.id) {
                return Err(format!("题目 ID 重复: {}", item.id));
            }
        }

        let mut teacher_ids = HashSet::new();
        for item in &self.teacher_items {
            if !teacher_ids.insert(item.question_id) {
                return Err(format!("评分项 ID 重复: {}", item.question_id));
            }
            if !student_ids.contains(&item.question_id) {
                return Err(format!("评分项 {} 没有对应的题目", item.question_id));
            }
        }
        if let Some(missing) = self
            .student_items
            .iter()
            .find(|item| !teacher_ids.contains(&item.id))
        {
            return Err(format!("题目 {} 缺少评分项", missing.id));
        }

        let mut source_ids = HashSet::new();
        for source in &self.sources {
            if !source_ids.insert(source.id.as_str()) {
                return Err(format!("材料 ID 重复: {}", source.id));
            }
        }
        for item in &self.student_items {
            if let Some(dangling) = item
                .source_ids
                .iter()
                .find(|id| !source_ids.contains(id.as_str()))
            {
                return Err(format!("题目 {} 引用了不存在的材料 {}", item.id, dangling));
            }
        }

        Ok(())
    }

    /// 与目标分布对照（软约束）
    pub fn consistency(&self, target: &RttiCounts) -> ArtifactConsistency {
        let actual = self.rtti_counts();
        let enabled: HashSet<QuestionType> =
            self.meta.enabled_question_types.iter().copied().collect();

        let mut usage: HashMap<&str, usize> =
            self.sources.iter().map(|s| (s.id.as_str(), 0)).collect();
        for id in self.student_items.iter().flat_map(|item| &item.source_ids) {
            if let Some(count) = usage.get_mut(id.as_str()) {
                *count += 1;
            }
        }
        let unused_sources = self
            .sources
            .iter()
            .filter(|s| usage.get(s.id.as_str()).copied().unwrap_or(0) == 0)
            .map(|s| s.id.clone())
            .collect();

        ArtifactConsistency {
            actual,
            target: *target,
            rtti_ok: actual == *target,
            count_ok: self.student_items.len() == self.meta.question_count as usize,
            types_ok: self
                .student_items
                .iter()
                .all(|item| enabled.contains(&item.question_type)),
            points_ok: self.points_total() == u64::from(self.meta.total_points),
            unused_sources,
        }
    }
}
