//! 试卷流水线 - 流程层
//!
//! ## 职责
//!
//! 围绕一份试卷协调六个阶段：提取 → 规范化 → 预检 → 生成 → 协同修订 → 审计。
//!
//! - 决定某个阶段在当前状态下能否执行（前置条件、单飞、互斥）
//! - 调用协作者并把结果合并进状态
//! - 预算或权重变化时同步重算 RTTI 目标
//!
//! ## 并发模型
//!
//! 状态放在 `std::sync::Mutex` 里，锁从不跨越 `.await`。
//! 阶段开始时登记到 `in_flight`，由 `FlightGuard` 在任何退出路径上注销，
//! 因此被取消的 future 也不会留下半合并的状态。
//! 协作者调用失败时试卷保持原样。

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{error, info, warn};

use crate::error::{AppError, AppResult, InputError, PipelineError};
use crate::models::{
    ArtifactConsistency, AuditReport, CoConstructResult, Category, ExamArtifact,
    ExtractionOutput, GeneratorParams, RttiCounts, RttiWeights, Stage, ValidationReport,
};
use crate::models::params::QUESTION_COUNT_RANGE;
use crate::services::{calculate_rtti_counts, ExamCollaborator};
use crate::workflow::pipeline_state::{
    LifecycleState, PipelineSnapshot, PipelineState, RevisionReview, StampedAudit,
};

/// 阶段执行登记，离开作用域时自动注销
struct FlightGuard<'a> {
    state: &'a Mutex<PipelineState>,
    stage: Stage,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.in_flight.remove(&self.stage);
    }
}

/// 一份试卷的流水线
///
/// 每个实例独立持有自己的状态，批量处理时每个任务一个实例。
pub struct ExamPipeline {
    name: String,
    collaborator: Arc<ExamCollaborator>,
    state: Mutex<PipelineState>,
}

impl ExamPipeline {
    /// 创建流水线并计算初始 RTTI 目标
    pub fn new(collaborator: Arc<ExamCollaborator>, params: GeneratorParams) -> AppResult<Self> {
        params.validate()?;
        let target = compute_target(&params)?;
        Ok(Self {
            name: "未命名".to_string(),
            collaborator,
            state: Mutex::new(PipelineState::new(params, target)),
        })
    }

    /// 设置日志中使用的试卷名称
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn lock(&self) -> MutexGuard<'_, PipelineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ========== 配置 ==========

    /// 修改参数并重算目标
    ///
    /// 修改在副本上进行，校验失败时原参数不变。
    /// 只影响之后的生成和修订，已有试卷记录的目标不会改变。
    pub fn configure<F>(&self, update: F) -> AppResult<RttiCounts>
    where
        F: FnOnce(&mut GeneratorParams),
    {
        let mut state = self.lock();
        let mut next = state.params.clone();
        update(&mut next);
        next.validate()?;
        let target = compute_target(&next)?;

        if target != state.target && state.params.lock_rtti && state.artifact.is_some() {
            warn!(
                "[试卷 {}] ⚠️ RTTI 已锁定，目标仍从 {} 改为 {}，只影响下一次生成或修订",
                self.name, state.target, target
            );
        }

        state.params = next;
        state.target = target;
        Ok(target)
    }

    /// 修改题目总数
    pub fn set_question_count(&self, count: i64) -> AppResult<RttiCounts> {
        if count < 0 {
            return Err(InputError::NegativeBudget(count).into());
        }
        let count = u32::try_from(count).map_err(|_| InputError::OutOfRange {
            field: "question_count",
            value: count,
            min: i64::from(QUESTION_COUNT_RANGE.0),
            max: i64::from(QUESTION_COUNT_RANGE.1),
        })?;
        self.configure(|params| params.question_count = count)
    }

    /// 修改 RTTI 权重
    pub fn set_weights(&self, weights: RttiWeights) -> AppResult<RttiCounts> {
        self.configure(|params| params.weights = weights)
    }

    // ========== 阶段执行 ==========

    /// 登记阶段开始
    ///
    /// 在同一次加锁内检查冲突和前置条件，并取出本次调用需要的输入
    fn begin<T>(
        &self,
        stage: Stage,
        prepare: impl FnOnce(&PipelineState) -> Result<T, PipelineError>,
    ) -> AppResult<(FlightGuard<'_>, T)> {
        let mut state = self.lock();

        if let Some(blocking) = state.blocking_stage(stage) {
            warn!(
                "[试卷 {}] ⏳ {} 被拒绝: {} 正在执行",
                self.name, stage, blocking
            );
            return Err(PipelineError::StageBusy { stage, blocking }.into());
        }

        let input = match prepare(&state) {
            Ok(input) => input,
            Err(e) => return Err(record_failure(&self.name, &mut state, stage, e.into())),
        };

        state.in_flight.insert(stage);
        Ok((
            FlightGuard {
                state: &self.state,
                stage,
            },
            input,
        ))
    }

    fn fail(&self, stage: Stage, err: AppError) -> AppError {
        let mut state = self.lock();
        record_failure(&self.name, &mut state, stage, err)
    }

    /// 从页面图片中提取结构化输入
    ///
    /// 结果暂存，等待规范化，不直接合并进参数
    pub async fn extract(&self, images: Vec<String>) -> AppResult<ExtractionOutput> {
        let stage = Stage::Extract;
        let images: Vec<String> = images
            .into_iter()
            .filter(|url| !url.trim().is_empty())
            .collect();

        let (_flight, ()) = self.begin(stage, |_| {
            if images.is_empty() {
                return Err(PipelineError::EmptyInput {
                    stage,
                    what: "页面图片",
                });
            }
            Ok(())
        })?;

        info!("[试卷 {}] 📷 提取 {} 张页面图片", self.name, images.len());
        let extraction = match self.collaborator.extract(&images).await {
            Ok(extraction) => extraction,
            Err(e) => return Err(self.fail(stage, e.into())),
        };

        let mut state = self.lock();
        state.extraction = Some(extraction.clone());
        state.errors.remove(&stage);
        info!(
            "[试卷 {}] ✓ 提取完成: {} 页, {} 个学习目标, {} 个术语, {} 份材料",
            self.name,
            extraction.pages.len(),
            extraction.learning_goals.len(),
            extraction.terms.len(),
            extraction.sources.len()
        );
        for warning in &extraction.global_warnings {
            warn!("[试卷 {}] 提取警告: {}", self.name, warning);
        }
        Ok(extraction)
    }

    /// 规范化待处理的提取结果，并追加到学习目标、术语和材料文本
    pub async fn normalize(&self) -> AppResult<()> {
        let stage = Stage::Normalize;
        let (_flight, extraction) = self.begin(stage, |state| {
            state.extraction.clone().ok_or(PipelineError::NoExtraction)
        })?;

        info!("[试卷 {}] 🧹 规范化提取结果", self.name);
        let normalized = match self.collaborator.normalize(&extraction).await {
            Ok(normalized) => normalized,
            Err(e) => return Err(self.fail(stage, e.into())),
        };

        let mut state = self.lock();
        append_block(&mut state.params.learning_goals, "\n", &normalized.goals_text());
        append_block(&mut state.params.terms, "\n", &normalized.terms_text());
        append_block(&mut state.params.sources, "\n\n", &normalized.sources_text());
        // 期间若有新的提取结果，保留它
        if state.extraction.as_ref() == Some(&extraction) {
            state.extraction = None;
        }
        state.errors.remove(&stage);
        info!(
            "[试卷 {}] ✓ 规范化完成: {} 个学习目标, {} 个术语, {} 份材料",
            self.name,
            normalized.learning_goals.len(),
            normalized.terms.len(),
            normalized.sources.len()
        );
        for note in &normalized.notes {
            info!("[试卷 {}] 规范化说明: {}", self.name, note);
        }
        Ok(())
    }

    /// 可行性预检，不修改试卷
    pub async fn validate(&self) -> AppResult<ValidationReport> {
        let stage = Stage::Validate;
        let (_flight, (params, target, expected)) = self.begin(stage, |state| {
            if !state.params.has_source_text() {
                return Err(PipelineError::EmptyInput {
                    stage,
                    what: "材料文本",
                });
            }
            Ok((state.params.clone(), state.target, state.version))
        })?;

        info!("[试卷 {}] 🔍 预检: 目标 {}", self.name, target);
        let report = match self
            .collaborator
            .validate_feasibility(&params, &target)
            .await
        {
            Ok(report) => report,
            Err(e) => return Err(self.fail(stage, e.into())),
        };

        let mut state = self.lock();
        if state.version != expected {
            let actual = state.version;
            return Err(record_failure(
                &self.name,
                &mut state,
                stage,
                PipelineError::StaleResult {
                    stage,
                    expected,
                    actual,
                }
                .into(),
            ));
        }
        state.validation = Some(report.clone());
        state.errors.remove(&stage);
        info!(
            "[试卷 {}] ✓ 预检完成: {:?}, {} 条警告",
            self.name,
            report.feasibility,
            report.warnings.len()
        );
        Ok(report)
    }

    /// 生成试卷
    ///
    /// 成功后替换现有试卷，清除预检和审计报告，并把本次使用的目标写入试卷元数据
    pub async fn generate(&self) -> AppResult<ExamArtifact> {
        let stage = Stage::Generate;
        let (_flight, (params, target, expected)) = self.begin(stage, |state| {
            if !state.params.has_source_text() {
                return Err(PipelineError::EmptyInput {
                    stage,
                    what: "材料文本",
                });
            }
            Ok((state.params.clone(), state.target, state.version))
        })?;

        info!(
            "[试卷 {}] 🚀 开始生成: {} 题, 目标 {}",
            self.name, params.question_count, target
        );
        let mut artifact = match self.collaborator.generate(&params, &target).await {
            Ok(artifact) => artifact,
            Err(e) => return Err(self.fail(stage, e.into())),
        };
        artifact.meta.rtti_counts_target = target;
        self.warn_inconsistent(stage, &artifact.consistency(&target));

        let mut state = self.lock();
        if state.version != expected {
            let actual = state.version;
            return Err(record_failure(
                &self.name,
                &mut state,
                stage,
                PipelineError::StaleResult {
                    stage,
                    expected,
                    actual,
                }
                .into(),
            ));
        }
        state.artifact = Some(artifact.clone());
        state.version += 1;
        state.revisions = 0;
        state.validation = None;
        state.audit = None;
        state.last_revision = None;
        state.errors.remove(&stage);
        info!(
            "[试卷 {}] ✓ 生成完成 (版本 {}): {} 题, 实际分布 {}",
            self.name,
            state.version,
            artifact.student_items.len(),
            artifact.rtti_counts()
        );
        Ok(artifact)
    }

    /// 按指令修订现有试卷
    ///
    /// 成功后整体替换试卷，记录变更与质量变化，使审计报告失效
    pub async fn co_construct(
        &self,
        instruction: &str,
        context: Option<&str>,
    ) -> AppResult<RevisionReview> {
        let stage = Stage::CoConstruct;
        let (_flight, (artifact, target, expected)) = self.begin(stage, |state| {
            let artifact = state
                .artifact
                .clone()
                .ok_or(PipelineError::NoArtifact { stage })?;
            if instruction.trim().is_empty() {
                return Err(PipelineError::EmptyInput {
                    stage,
                    what: "修订指令",
                });
            }
            Ok((artifact, state.target, state.version))
        })?;

        info!("[试卷 {}] ✏️ 协同修订: {}", self.name, instruction);
        let context = context.filter(|c| !c.trim().is_empty());
        let result = match self
            .collaborator
            .co_construct(&artifact, instruction, context, &target)
            .await
        {
            Ok(result) => result,
            Err(e) => return Err(self.fail(stage, e.into())),
        };

        let CoConstructResult {
            changes,
            mut updated_test,
            quality_delta,
        } = result;
        updated_test.meta.rtti_counts_target = target;
        let verified = updated_test.consistency(&target);
        self.warn_inconsistent(stage, &verified);

        let review = RevisionReview {
            changes,
            quality_delta,
            verified,
        };
        for flag in review.disagreements() {
            warn!(
                "[试卷 {}] ⚠️ 修订质量声明与本地复核不一致: {}",
                self.name, flag
            );
        }

        let mut state = self.lock();
        if state.version != expected {
            let actual = state.version;
            return Err(record_failure(
                &self.name,
                &mut state,
                stage,
                PipelineError::StaleResult {
                    stage,
                    expected,
                    actual,
                }
                .into(),
            ));
        }
        state.artifact = Some(updated_test);
        state.version += 1;
        state.revisions += 1;
        state.audit = None;
        state.last_revision = Some(review.clone());
        state.errors.remove(&stage);
        info!(
            "[试卷 {}] ✓ 修订完成 (版本 {}, 第 {} 次): {} 处变更",
            self.name,
            state.version,
            state.revisions,
            review.changes.len()
        );
        Ok(review)
    }

    /// 质量审计，只读；报告绑定被审计的版本
    pub async fn audit(&self) -> AppResult<AuditReport> {
        let stage = Stage::Audit;
        let (_flight, (artifact, target, expected)) = self.begin(stage, |state| {
            let artifact = state
                .artifact
                .clone()
                .ok_or(PipelineError::NoArtifact { stage })?;
            Ok((artifact, state.target, state.version))
        })?;

        info!("[试卷 {}] 🧪 审计版本 {}", self.name, expected);
        let report = match self.collaborator.audit(&artifact, &target).await {
            Ok(report) => report,
            Err(e) => return Err(self.fail(stage, e.into())),
        };

        let mut state = self.lock();
        if state.version != expected {
            let actual = state.version;
            return Err(record_failure(
                &self.name,
                &mut state,
                stage,
                PipelineError::StaleResult {
                    stage,
                    expected,
                    actual,
                }
                .into(),
            ));
        }
        state.audit = Some(StampedAudit {
            version: expected,
            report: report.clone(),
        });
        state.errors.remove(&stage);
        info!(
            "[试卷 {}] ✓ 审计完成: {}, {} 个问题",
            self.name,
            if report.pass { "通过" } else { "未通过" },
            report.issues.len()
        );
        Ok(report)
    }

    /// 清除试卷、报告和待处理的提取结果，保留参数
    ///
    /// 版本号加一，正在执行的阶段返回时会得到 `StaleResult`
    pub fn reset(&self) {
        let mut state = self.lock();
        state.artifact = None;
        state.version += 1;
        state.revisions = 0;
        state.extraction = None;
        state.validation = None;
        state.audit = None;
        state.last_revision = None;
        state.errors.clear();
        info!("[试卷 {}] 🔄 已重置", self.name);
    }

    fn warn_inconsistent(&self, stage: Stage, consistency: &ArtifactConsistency) {
        if !consistency.rtti_ok {
            warn!(
                "[试卷 {}] ⚠️ {} 结果的 RTTI 分布 {} 与目标 {} 不一致",
                self.name, stage, consistency.actual, consistency.target
            );
        }
        if !consistency.count_ok {
            warn!("[试卷 {}] ⚠️ {} 结果的题目数量与声明不一致", self.name, stage);
        }
        if !consistency.types_ok {
            warn!("[试卷 {}] ⚠️ {} 结果包含未启用的题型", self.name, stage);
        }
        if !consistency.unused_sources.is_empty() {
            warn!(
                "[试卷 {}] {} 结果中未被引用的材料: {}",
                self.name,
                stage,
                consistency.unused_sources.join(", ")
            );
        }
    }

    // ========== 查询 ==========

    pub fn state(&self) -> LifecycleState {
        self.lock().lifecycle()
    }

    pub fn version(&self) -> u64 {
        self.lock().version
    }

    pub fn params(&self) -> GeneratorParams {
        self.lock().params.clone()
    }

    /// 当前 RTTI 目标（下一次生成使用）
    pub fn target(&self) -> RttiCounts {
        self.lock().target
    }

    pub fn artifact(&self) -> Option<ExamArtifact> {
        self.lock().artifact.clone()
    }

    pub fn pending_extraction(&self) -> Option<ExtractionOutput> {
        self.lock().extraction.clone()
    }

    pub fn validation_report(&self) -> Option<ValidationReport> {
        self.lock().validation.clone()
    }

    /// 针对当前版本的审计报告
    pub fn audit_report(&self) -> Option<AuditReport> {
        self.lock().current_audit().cloned()
    }

    pub fn last_revision(&self) -> Option<RevisionReview> {
        self.lock().last_revision.clone()
    }

    /// 试卷与其生成时目标的一致性
    pub fn consistency(&self) -> Option<ArtifactConsistency> {
        self.lock().consistency()
    }

    /// 阶段最近一次的错误
    pub fn stage_error(&self, stage: Stage) -> Option<String> {
        self.lock().errors.get(&stage).cloned()
    }

    pub fn is_in_flight(&self, stage: Stage) -> bool {
        self.lock().in_flight.contains(&stage)
    }

    pub fn snapshot(&self) -> PipelineSnapshot {
        self.lock().snapshot()
    }
}

/// 按当前参数计算目标
fn compute_target(params: &GeneratorParams) -> Result<RttiCounts, InputError> {
    let weight_total: i64 = Category::ALL
        .iter()
        .map(|c| params.weights.get(*c).max(0))
        .sum();
    if weight_total == 0 && params.question_count > 0 {
        warn!(
            "⚠️ RTTI 权重总和为 0，{} 道题都不会分配到分类",
            params.question_count
        );
    }
    calculate_rtti_counts(i64::from(params.question_count), &params.weights)
}

/// 记录阶段错误，不影响其他阶段的结果
fn record_failure(name: &str, state: &mut PipelineState, stage: Stage, err: AppError) -> AppError {
    error!("[试卷 {}] ❌ {} 失败: {}", name, stage, err);
    state.errors.insert(stage, err.to_string());
    err
}

/// 追加文本块，原内容非空时先加分隔符
fn append_block(field: &mut String, separator: &str, addition: &str) {
    if addition.is_empty() {
        return;
    }
    if !field.is_empty() {
        field.push_str(separator);
    }
    field.push_str(addition);
}
