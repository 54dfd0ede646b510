//! 单个试卷任务处理器 - 编排层
//!
//! ## 职责
//!
//! 把一个 TOML 任务完整地跑过一条独立的流水线：
//!
//! 1. **提取**：有页面图片时先提取再规范化
//! 2. **预检**：可选，风险只记录不终止
//! 3. **生成**：失败则整个任务失败
//! 4. **修订**：按顺序执行，单轮失败不影响其余轮次
//! 5. **审计**：可选
//! 6. **输出**：把最终快照写入输出目录

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::models::reports::Feasibility;
use crate::models::ExamJob;
use crate::services::{ExamCollaborator, OutputWriter};
use crate::workflow::ExamPipeline;

/// 任务处理结果
#[derive(Debug, Clone, Default)]
pub struct JobOutcome {
    pub name: String,
    pub revisions_applied: usize,
    pub revisions_failed: usize,
    /// 未审计或审计失败时为 None
    pub audit_pass: Option<bool>,
    pub consistent: bool,
    pub output_path: PathBuf,
}

/// 处理单个试卷任务
///
/// # 参数
/// - `collaborator`: 共享的生成服务协作者
/// - `job`: 任务数据
/// - `job_index`: 任务序号（用于日志）
/// - `writer`: 结果写入服务
pub async fn process_job(
    collaborator: Arc<ExamCollaborator>,
    job: ExamJob,
    job_index: usize,
    writer: &OutputWriter,
) -> Result<JobOutcome> {
    log_job_start(job_index, &job);

    let pipeline = ExamPipeline::new(collaborator, job.params.clone())
        .with_context(|| format!("任务参数不合法: {}", job.name))?
        .with_name(job.name.clone());

    // ========== 提取 + 规范化 ==========
    if job.needs_extraction() {
        pipeline
            .extract(job.image_urls.clone())
            .await
            .context("页面提取失败")?;
        pipeline.normalize().await.context("提取结果规范化失败")?;
    }

    // ========== 预检 ==========
    if job.preflight {
        match pipeline.validate().await {
            Ok(report) if report.feasibility == Feasibility::Risk => {
                warn!("[任务 {}] ⚠️ 预检认为存在风险，继续生成", job_index);
                for item in report.missing_information.iter().chain(&report.warnings) {
                    warn!("[任务 {}]   - {}", job_index, item);
                }
            }
            Ok(_) => info!("[任务 {}] ✓ 预检通过", job_index),
            Err(e) => warn!("[任务 {}] 预检失败，跳过: {}", job_index, e),
        }
    }

    // ========== 生成 ==========
    pipeline.generate().await.context("试卷生成失败")?;

    // ========== 修订 ==========
    let mut outcome = JobOutcome {
        name: job.name.clone(),
        ..Default::default()
    };
    for (round, step) in job.revisions.iter().enumerate() {
        info!(
            "[任务 {}] 修订 {}/{}",
            job_index,
            round + 1,
            job.revisions.len()
        );
        match pipeline
            .co_construct(&step.instruction, step.context.as_deref())
            .await
        {
            Ok(review) => {
                outcome.revisions_applied += 1;
                for change in &review.changes {
                    info!(
                        "[任务 {}]   {:?} {:?} {}",
                        job_index, change.kind, change.target, change.id
                    );
                }
            }
            Err(e) => {
                outcome.revisions_failed += 1;
                error!("[任务 {}] 修订失败，保留上一版本: {}", job_index, e);
            }
        }
    }

    // ========== 审计 ==========
    if job.audit {
        match pipeline.audit().await {
            Ok(report) => outcome.audit_pass = Some(report.pass),
            Err(e) => error!("[任务 {}] 审计失败: {}", job_index, e),
        }
    }

    // ========== 输出 ==========
    let snapshot = pipeline.snapshot();
    outcome.consistent = snapshot
        .consistency
        .as_ref()
        .map(|c| c.is_consistent())
        .unwrap_or(false);
    outcome.output_path = writer
        .write_json(&job.name, &snapshot)
        .await
        .context("结果写入失败")?;

    log_job_complete(job_index, &outcome);
    Ok(outcome)
}

// ========== 日志辅助函数 ==========

fn log_job_start(job_index: usize, job: &ExamJob) {
    info!("\n{}", "=".repeat(60));
    info!("[任务 {}] 📄 {}", job_index, job.name);
    info!(
        "[任务 {}] 级别: {}, 题目数: {}, 图片: {}, 修订: {}",
        job_index,
        job.params.level_profile.label(),
        job.params.question_count,
        job.image_urls.len(),
        job.revisions.len()
    );
    info!("{}", "=".repeat(60));
}

fn log_job_complete(job_index: usize, outcome: &JobOutcome) {
    info!("\n{}", "─".repeat(60));
    info!("[任务 {}] ✓ 完成: {}", job_index, outcome.name);
    info!(
        "[任务 {}] 修订: 成功 {}, 失败 {}",
        job_index, outcome.revisions_applied, outcome.revisions_failed
    );
    match outcome.audit_pass {
        Some(true) => info!("[任务 {}] 审计: 通过", job_index),
        Some(false) => warn!("[任务 {}] 审计: 未通过", job_index),
        None => info!("[任务 {}] 审计: 未执行", job_index),
    }
    if !outcome.consistent {
        warn!("[任务 {}] ⚠️ 试卷与 RTTI 目标不一致", job_index);
    }
    info!(
        "[任务 {}] 输出: {}",
        job_index,
        outcome.output_path.display()
    );
    info!("{}", "─".repeat(60));
}
