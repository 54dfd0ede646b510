//! RTTI 分类与题目数量

use serde::{Deserialize, Serialize};

/// RTTI 认知层级分类
///
/// 声明顺序即平局时的优先级：R > T1 > T2 > I
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    /// 复现（Reproductie）
    R,
    /// 熟练应用（Training）
    T1,
    /// 迁移应用（Transfer）
    T2,
    /// 洞察（Inzicht）
    I,
}

impl Category {
    /// 固定的优先级顺序
    pub const ALL: [Category; 4] = [Category::R, Category::T1, Category::T2, Category::I];

    /// 标签文本
    pub fn label(self) -> &'static str {
        match self {
            Category::R => "R",
            Category::T1 => "T1",
            Category::T2 => "T2",
            Category::I => "I",
        }
    }

    /// 从标签解析（精确匹配，忽略大小写与首尾空白）
    pub fn from_label(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "R" => Some(Category::R),
            "T1" => Some(Category::T1),
            "T2" => Some(Category::T2),
            "I" => Some(Category::I),
            _ => None,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// 四个分类的题目数量
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RttiCounts {
    pub r: u32,
    pub t1: u32,
    pub t2: u32,
    pub i: u32,
}

impl RttiCounts {
    pub fn new(r: u32, t1: u32, t2: u32, i: u32) -> Self {
        Self { r, t1, t2, i }
    }

    pub fn get(&self, category: Category) -> u32 {
        match category {
            Category::R => self.r,
            Category::T1 => self.t1,
            Category::T2 => self.t2,
            Category::I => self.i,
        }
    }

    pub fn get_mut(&mut self, category: Category) -> &mut u32 {
        match category {
            Category::R => &mut self.r,
            Category::T1 => &mut self.t1,
            Category::T2 => &mut self.t2,
            Category::I => &mut self.i,
        }
    }

    /// 四类之和，用 u64 承载，不会溢出
    pub fn total(&self) -> u64 {
        u64::from(self.r) + u64::from(self.t1) + u64::from(self.t2) + u64::from(self.i)
    }

    /// 统计一组标签的分布
    pub fn tally<I: IntoIterator<Item = Category>>(labels: I) -> Self {
        let mut counts = Self::default();
        for category in labels {
            *counts.get_mut(category) += 1;
        }
        counts
    }
}

impl std::fmt::Display for RttiCounts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "R={}, T1={}, T2={}, I={}",
            self.r, self.t1, self.t2, self.i
        )
    }
}

/// 四个分类的权重
///
/// 可以是百分比，也可以是原始权重；用有符号整数承载用户输入，
/// 负值由分配算法拒绝而不是静默截断
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RttiWeights {
    pub r: i64,
    pub t1: i64,
    pub t2: i64,
    pub i: i64,
}

impl RttiWeights {
    pub fn new(r: i64, t1: i64, t2: i64, i: i64) -> Self {
        Self { r, t1, t2, i }
    }

    /// 四等分
    pub fn even() -> Self {
        Self::new(25, 25, 25, 25)
    }

    pub fn get(&self, category: Category) -> i64 {
        match category {
            Category::R => self.r,
            Category::T1 => self.t1,
            Category::T2 => self.t2,
            Category::I => self.i,
        }
    }
}
