/// 日志工具模块
///
/// 提供日志初始化和输出的辅助函数
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::models::{DropReason, Exam, Report};

/// 初始化日志
///
/// `RUST_LOG` 优先；否则按 `verbose` 选择 info / debug 级别
pub fn init(verbose: bool) {
    let default_level = if verbose { "exam_review=debug" } else { "exam_review=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // 日志写到 stderr，stdout 只留给报告
    // 测试中可能重复初始化，忽略错误
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// 记录分析开始
pub fn log_review_start(file_name: &str, size: usize) {
    info!("{}", "=".repeat(60));
    info!("📄 开始分析试卷: {} ({} 字节)", file_name, size);
    info!("{}", "=".repeat(60));
}

/// 记录文本提取结果
pub fn log_extracted_text(file_name: &str, text: &str) {
    info!("✓ 文本提取完成: {} ({} 字符)", file_name, text.chars().count());
    debug!("提取文本预览: {}", truncate_text(text, 200));
}

/// 记录分题结果
pub fn log_segmentation(exam: &Exam) {
    info!("✓ 识别到 {} 道题目", exam.len());
    for question in &exam.questions {
        debug!(
            "  题目 {}: {} 个选项 | {}",
            question.ordinal,
            question.alternatives.len(),
            truncate_text(&question.statement, 60)
        );
    }
    for block in &exam.dropped {
        let reason = match block.reason {
            DropReason::NoAlternatives => "没有识别到选项",
            DropReason::EmptyStatement => "题干为空",
        };
        warn!("⚠️ 题块{}，已丢弃: {}", reason, truncate_text(&block.marker_line, 60));
    }
}

/// 记录最终结论
pub fn log_report(file_name: &str, report: &Report) {
    info!("{}", "─".repeat(60));
    info!(
        "📊 {}: {} | 意见 {} 条 | 提示 {} 条",
        file_name,
        report.status.label(),
        report.findings.len(),
        report.advisories.len()
    );
    info!("{}", "─".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（字符数）
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
