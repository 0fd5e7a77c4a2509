use anyhow::Result;
/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use std::fs::{self, OpenOptions};
use std::io::Write;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化 tracing 日志
///
/// 优先使用 `RUST_LOG`，否则按 `verbose` 选择 debug / info
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    // 重复初始化（例如测试中）时忽略
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
        "{}\n题目批量上传日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 向日志文件追加一行
pub fn append_log_line(log_file_path: &str, line: &str) -> Result<()> {
    let mut file = OpenOptions::new()
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

/// 记录程序启动信息
pub fn log_startup(manifest: &str, dry_run: bool) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 题目批量上传");
    info!("📄 上传清单: {}", manifest);
    if dry_run {
        info!("🧪 演练模式: 只写入内存，不访问远端存储");
    }
    info!("{}", "=".repeat(60));
}

/// 记录模块导入信息
///
/// # 参数
/// - `module_number`: 模块编号
/// - `file`: 文件路径
/// - `questions`: 有效题目数
/// - `numeric`: 其中的数值题数
/// - `skipped`: 跳过的行数
pub fn log_module_imported(
    module_number: u8,
    file: &str,
    questions: usize,
    numeric: usize,
    skipped: usize,
) {
    info!("\n{}", "─".repeat(60));
    info!("📦 模块 {}: {}", module_number, file);
    info!(
        "✓ 有效题目 {} 道（数值题 {} 道），跳过 {} 行",
        questions, numeric, skipped
    );
}

/// 打印最终统计信息
///
/// # 参数
/// - `test_id`: 新试卷 id
/// - `total_questions`: 题目总数
/// - `log_file_path`: 日志文件路径
pub fn print_final_stats(test_id: &str, total_questions: usize, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 上传完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("🆔 试卷 id: {}", test_id);
    info!("✅ 题目总数: {}", total_questions);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
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
    fn truncate_text_counts_chars_not_bytes() {
        assert_eq!(truncate_text("短文本", 10), "短文本");
        assert_eq!(truncate_text("一二三四五", 3), "一二三...");
    }
}
