//! 流水线状态
//!
//! 一份试卷从配置到审计的全部可变状态。只在 `ExamPipeline` 的互斥锁内修改。

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use crate::models::{
    ArtifactConsistency, AuditReport, ChangeItem, ExamArtifact, ExtractionOutput,
    GeneratorParams, QualityDelta, RttiCounts, Stage, ValidationReport,
};

/// 生命周期
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    /// 还没有材料文本
    Unconfigured,
    /// 有材料文本，尚未生成
    Configured,
    /// 已生成
    Generated,
    /// 至少修订过一次
    Revised,
}

/// 最近一次协同修订的记录
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevisionReview {
    pub changes: Vec<ChangeItem>,
    /// 服务端声称的质量变化
    pub quality_delta: QualityDelta,
    /// 本地对新试卷的复核
    pub verified: ArtifactConsistency,
}

impl RevisionReview {
    /// 服务端声称与本地复核不一致的指标
    pub fn disagreements(&self) -> Vec<&'static str> {
        let mut flags = Vec::new();
        if self.quality_delta.rtti_ok != self.verified.rtti_ok {
            flags.push("rtti_ok");
        }
        if self.quality_delta.types_ok != self.verified.types_ok {
            flags.push("types_ok");
        }
        flags
    }
}

/// 带版本号的审计报告
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct StampedAudit {
    pub version: u64,
    pub report: AuditReport,
}

/// 可序列化的状态快照
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineSnapshot {
    pub state: LifecycleState,
    pub version: u64,
    pub revisions: u32,
    pub params: GeneratorParams,
    pub target: RttiCounts,
    pub artifact: Option<ExamArtifact>,
    /// 试卷与其生成时目标的一致性
    pub consistency: Option<ArtifactConsistency>,
    pub validation: Option<ValidationReport>,
    /// 只包含针对当前版本的审计
    pub audit: Option<AuditReport>,
    pub last_revision: Option<RevisionReview>,
    pub pending_extraction: bool,
    pub in_flight: Vec<Stage>,
    pub errors: BTreeMap<String, String>,
}

#[derive(Debug)]
pub(crate) struct PipelineState {
    pub params: GeneratorParams,
    pub target: RttiCounts,
    pub artifact: Option<ExamArtifact>,
    /// 每次试卷被替换或重置都加一
    pub version: u64,
    pub revisions: u32,
    pub extraction: Option<ExtractionOutput>,
    pub validation: Option<ValidationReport>,
    pub audit: Option<StampedAudit>,
    pub last_revision: Option<RevisionReview>,
    pub in_flight: HashSet<Stage>,
    /// 每个阶段最近一次的错误，阶段成功后清除
    pub errors: HashMap<Stage, String>,
}

impl PipelineState {
    pub fn new(params: GeneratorParams, target: RttiCounts) -> Self {
        Self {
            params,
            target,
            artifact: None,
            version: 0,
            revisions: 0,
            extraction: None,
            validation: None,
            audit: None,
            last_revision: None,
            in_flight: HashSet::new(),
            errors: HashMap::new(),
        }
    }

    pub fn lifecycle(&self) -> LifecycleState {
        match &self.artifact {
            Some(_) if self.revisions > 0 => LifecycleState::Revised,
            Some(_) => LifecycleState::Generated,
            None if self.params.has_source_text() => LifecycleState::Configured,
            None => LifecycleState::Unconfigured,
        }
    }

    /// 正在执行且与 `stage` 冲突的阶段
    pub fn blocking_stage(&self, stage: Stage) -> Option<Stage> {
        Stage::ALL
            .into_iter()
            .find(|other| self.in_flight.contains(other) && stage.conflicts_with(*other))
    }

    /// 当前版本的审计报告，过期的不返回
    pub fn current_audit(&self) -> Option<&AuditReport> {
        match (&self.artifact, &self.audit) {
            (Some(_), Some(stamped)) if stamped.version == self.version => Some(&stamped.report),
            _ => None,
        }
    }

    pub fn consistency(&self) -> Option<ArtifactConsistency> {
        self.artifact
            .as_ref()
            .map(|artifact| artifact.consistency(&artifact.meta.rtti_counts_target))
    }

    pub fn snapshot(&self) -> PipelineSnapshot {
        PipelineSnapshot {
            state: self.lifecycle(),
            version: self.version,
            revisions: self.revisions,
            params: self.params.clone(),
            target: self.target,
            artifact: self.artifact.clone(),
            consistency: self.consistency(),
            validation: self.validation.clone(),
            audit: self.current_audit().cloned(),
            last_revision: self.last_revision.clone(),
            pending_extraction: self.extraction.is_some(),
            in_flight: Stage::ALL
                .into_iter()
                .filter(|s| self.in_flight.contains(s))
                .collect(),
            errors: self
                .errors
                .iter()
                .map(|(stage, message)| (stage.name().to_string(), message.clone()))
                .collect(),
        }
    }
}
