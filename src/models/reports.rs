//! 各阶段返回的报告结构

use serde::{Deserialize, Serialize};

use crate::models::artifact::ExamArtifact;

/// 可行性判断
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feasibility {
    Ok,
    Risk,
}

/// 预检报告（不持久化，不影响试卷）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub warnings: Vec<String>,
    pub quick_fixes: Vec<String>,
    pub missing_information: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_edits: Option<Vec<String>>,
    pub feasibility: Feasibility,
}

/// 修改对象
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeTarget {
    /// 题目
    Vraag,
    /// 材料
    Bron,
}

/// 修改类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Edit,
    Replace,
    Add,
    Remove,
}

/// 单条修改记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeItem {
    pub target: ChangeTarget,
    pub id: String,
    #[serde(rename = "change_type")]
    pub kind: ChangeKind,
    pub before: String,
    pub after: String,
}

/// 服务端声明的质量变化
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityDelta {
    /// RTTI 数量保持不变
    pub rtti_ok: bool,
    /// 题型集合保持不变
    pub types_ok: bool,
    /// 材料聚类保持不变
    pub clustering_ok: bool,
    pub notes: Vec<String>,
}

/// 协同修订的完整返回
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoConstructResult {
    pub changes: Vec<ChangeItem>,
    pub updated_test: ExamArtifact,
    pub quality_delta: QualityDelta,
}

/// 审计问题严重程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// 审计发现的问题
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditIssue {
    pub severity: Severity,
    /// 问题位置（如 "vraag 3"）
    pub location: String,
    pub problem: String,
    pub suggested_fix: String,
}

/// 审计报告（不持久化，按需重算）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    pub pass: bool,
    pub issues: Vec<AuditIssue>,
    pub suggested_fixes: Vec<String>,
}

impl AuditReport {
    /// 最高严重程度
    pub fn worst_severity(&self) -> Option<Severity> {
        self.issues.iter().map(|issue| issue.severity).max()
    }
}
