//! 日志工具模块
//!
//! 提供日志初始化、格式化和输出的辅助函数
use anyhow::Result;
use std::fs;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// 初始化 tracing 订阅器
///
/// `RUST_LOG` 优先；否则 verbose 时为 debug，平时为 info
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // 测试里可能重复初始化，忽略错误
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n试卷生成日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 追加一行到日志文件
pub fn append_log_line(log_file_path: &str, line: &str) -> Result<()> {
    use std::io::Write;

    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)?;
    writeln!(
        file,
        "[{}] {}",
        chrono::Local::now().format("%H:%M:%S"),
        line
    )?;
    Ok(())
}

/// 启动横幅：并发数、两档模型和服务端点
pub fn log_startup(max_concurrent: usize, fast_model: &str, pro_model: &str, base_url: &str) {
    let rule = "=".repeat(60);
    info!("{}", rule);
    info!("🚀 试卷生成流水线启动");
    info!("   并发任务上限: {}", max_concurrent);
    info!("   快速模型: {} / 强模型: {}", fast_model, pro_model);
    info!("   服务端点: {}", base_url);
    info!("{}", rule);
}

/// 记录任务加载信息
pub fn log_jobs_loaded(total: usize, max_concurrent: usize) {
    info!("✓ 共 {} 个试卷任务，最多 {} 个并行\n", total, max_concurrent);
}

/// 批量运行结束时的汇总，同时追加到日志文件
pub fn log_batch_summary(
    success: usize,
    failed: usize,
    total: usize,
    elapsed: Duration,
    log_file_path: &str,
) -> Result<()> {
    let summary = format!(
        "汇总: 成功 {}/{}, 失败 {}, 耗时 {:.1}s",
        success,
        total,
        failed,
        elapsed.as_secs_f64()
    );
    let rule = "─".repeat(60);
    info!("\n{}", rule);
    if failed == 0 {
        info!("📊 {}", summary);
    } else {
        warn!("📊 {}", summary);
    }
    info!("📝 运行日志: {}", log_file_path);
    info!("{}", rule);

    append_log_line(log_file_path, &summary)
}

/// 截断长文本用于日志显示
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("kort", 10), "kort");
        assert_eq!(truncate_text("aardrijkskunde", 4), "aard...");
        // 按字符截断，不会切开多字节字符
        assert_eq!(truncate_text("试卷生成流水线", 2), "试卷...");
    }

    #[test]
    fn test_log_file_header_and_append() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.txt");
        let path = path.to_str().unwrap();

        init_log_file(path).unwrap();
        append_log_line(path, "任务 A 完成").unwrap();

        let content = fs::read_to_string(path).unwrap();
        assert!(content.starts_with(&"=".repeat(60)));
        assert!(content.contains("试卷生成日志"));
        assert!(content.trim_end().ends_with("任务 A 完成"));
    }

    #[test]
    fn test_batch_summary_is_appended() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.txt");
        let path = path.to_str().unwrap();

        init_log_file(path).unwrap();
        log_batch_summary(2, 1, 3, Duration::from_millis(1500), path).unwrap();

        let content = fs::read_to_string(path).unwrap();
        assert!(content.contains("成功 2/3, 失败 1, 耗时 1.5s"));
    }
}
