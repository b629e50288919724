/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use crate::models::Subject;
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化日志
///
/// 优先使用 `RUST_LOG`，否则按 `verbose` 选择 debug / info 级别
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
///
/// # 参数
/// - `math`: Math 试卷路径
/// - `reading_writing`: R&W 试卷路径
pub fn log_startup(math: &Path, reading_writing: &Path) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 题目提取");
    info!("📄 Math: {}", math.display());
    info!("📄 R&W: {}", reading_writing.display());
    info!("{}", "=".repeat(60));
}

/// 记录试卷文本加载信息
pub fn log_document_loaded(subject: Subject, chars: usize) {
    info!("[{}] ✓ 文本已加载: {} 个字符", subject.short_name(), chars);
}

/// 记录区块切分信息
///
/// # 参数
/// - `anchors`: 找到的题头数量
/// - `kept`: 去重截取后保留的区块数量
pub fn log_blocks_selected(subject: Subject, anchors: usize, kept: usize) {
    info!(
        "[{}] 🔍 找到 {} 个题头，保留 {} 个区块",
        subject.short_name(),
        anchors,
        kept
    );
}

/// 记录单份试卷完成信息
pub fn log_document_complete(subject: Subject, records: usize, mcq: usize) {
    info!("\n{}", "─".repeat(60));
    info!(
        "[{}] ✓ 处理完成: {} 道题目，其中 {} 道为四选项题",
        subject.short_name(),
        records,
        mcq
    );
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `math`: Math 题目数量
/// - `reading_writing`: R&W 题目数量
/// - `mcq`: 四选项题目数量
/// - `out_path`: 输出文件路径
pub fn print_final_stats(math: usize, reading_writing: usize, mcq: usize, out_path: &Path) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ Math: {}, R&W: {}, Total: {}", math, reading_writing, math + reading_writing);
    info!("🔤 四选项题目: {}", mcq);
    info!("{}", "=".repeat(60));
    info!("\n结果已保存至: {}", out_path.display());
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
    fn test_truncate_text() {
        assert_eq!(truncate_text("短文本", 10), "短文本");
        assert_eq!(truncate_text("abcdef", 3), "abc...");
    }
}
