//! 生成参数（配置面）
//!
//! 由外部（UI / TOML 任务文件）编辑，流水线只读取快照

use serde::{Deserialize, Serialize};

use crate::error::InputError;
use crate::models::level::LevelProfile;
use crate::models::rtti::{Category, RttiWeights};

/// 题目总数允许范围
pub const QUESTION_COUNT_RANGE: (u32, u32) = (1, 40);
/// 考试时长允许范围（分钟）
pub const TIME_RANGE: (u32, u32) = (10, 100);

/// 题型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Open,
    Meerkeuze,
    JuistOnjuist,
    Volgorde,
    Combineer,
    Invul,
    Casus,
    Bronanalyse,
    Stelling,
}

impl QuestionType {
    pub const ALL: [QuestionType; 9] = [
        QuestionType::Open,
        QuestionType::Meerkeuze,
        QuestionType::JuistOnjuist,
        QuestionType::Volgorde,
        QuestionType::Combineer,
        QuestionType::Invul,
        QuestionType::Casus,
        QuestionType::Bronanalyse,
        QuestionType::Stelling,
    ];

    /// 线上格式的名称
    pub fn code(self) -> &'static str {
        match self {
            QuestionType::Open => "open",
            QuestionType::Meerkeuze => "meerkeuze",
            QuestionType::JuistOnjuist => "juist_onjuist",
            QuestionType::Volgorde => "volgorde",
            QuestionType::Combineer => "combineer",
            QuestionType::Invul => "invul",
            QuestionType::Casus => "casus",
            QuestionType::Bronanalyse => "bronanalyse",
            QuestionType::Stelling => "stelling",
        }
    }
}

impl std::fmt::Display for QuestionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// 权重的解释方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RttiMode {
    /// 百分比（0-100）
    #[default]
    Percentages,
    /// 原始数量，按比例缩放到题目总数
    Counts,
}

/// 材料密度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceDensity {
    Laag,
    #[default]
    Middel,
    Hoog,
}

/// 阅读水平
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReadingLevel {
    #[serde(rename = "2F")]
    F2,
    #[default]
    #[serde(rename = "3F")]
    F3,
}

/// 难度分布
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Eenvoudig,
    #[default]
    Gebanceerd,
    Moeilijk,
}

/// 生成参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorParams {
    /// 级别档案（唯一真实来源）
    pub level_profile: LevelProfile,
    /// 启用的题型
    pub question_types: Vec<QuestionType>,
    /// RTTI 权重
    pub weights: RttiWeights,
    /// 权重模式
    pub rtti_mode: RttiMode,
    /// 题目总数
    pub question_count: u32,
    /// 材料密度
    pub source_density: SourceDensity,
    /// 阅读水平
    pub reading_level: ReadingLevel,
    /// 难度分布
    pub difficulty: Difficulty,
    /// 考试时长（分钟）
    pub time_minutes: u32,
    /// 生成后锁定 RTTI（仅提示作用）
    pub lock_rtti: bool,
    /// 学习目标
    pub learning_goals: String,
    /// 术语表
    pub terms: String,
    /// 材料文本
    pub sources: String,
}

impl Default for GeneratorParams {
    fn default() -> Self {
        Self {
            level_profile: LevelProfile::Mh1,
            question_types: vec![
                QuestionType::Open,
                QuestionType::Meerkeuze,
                QuestionType::Bronanalyse,
            ],
            weights: RttiWeights::even(),
            rtti_mode: RttiMode::Percentages,
            question_count: 8,
            source_density: SourceDensity::Middel,
            reading_level: ReadingLevel::F3,
            difficulty: Difficulty::Gebanceerd,
            time_minutes: 50,
            lock_rtti: true,
            learning_goals: String::new(),
            terms: String::new(),
            sources: String::new(),
        }
    }
}

impl GeneratorParams {
    /// 年级展示名称，从级别档案派生
    pub fn year_label(&self) -> &'static str {
        self.level_profile.label()
    }

    /// 是否已有材料文本
    pub fn has_source_text(&self) -> bool {
        !self.sources.trim().is_empty()
    }

    /// 检查参数范围
    pub fn validate(&self) -> Result<(), InputError> {
        check_range(
            "question_count",
            self.question_count,
            QUESTION_COUNT_RANGE,
        )?;
        check_range("time_minutes", self.time_minutes, TIME_RANGE)?;
        if self.question_types.is_empty() {
            return Err(InputError::NoQuestionTypes);
        }
        for category in Category::ALL {
            let value = self.weights.get(category);
            if value < 0 {
                return Err(InputError::NegativeWeight {
                    category: category.label(),
                    value,
                });
            }
        }
        Ok(())
    }
}

fn check_range(field: &'static str, value: u32, (min, max): (u32, u32)) -> Result<(), InputError> {
    if value < min || value > max {
        return Err(InputError::OutOfRange {
            field,
            value: i64::from(value),
            min: i64::from(min),
            max: i64::from(max),
        });
    }
    Ok(())
}
