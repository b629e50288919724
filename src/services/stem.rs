//! 题干确定
//!
//! 题干 = 答案区之前的文本，去掉题头、元数据标签行、图表标题行，
//! 截止到第一个选项标签（没有选项时取全部）。

use crate::services::header_locator::strip_question_number;
use crate::services::normalizer::{normalize_inline, replace_punctuation};
use regex::Regex;
use std::sync::LazyLock;

/// 题干最大字符数
pub const MAX_STEM_CHARS: usize = 2000;

/// 题干为空且没有技能文本时的占位
pub const STEM_PLACEHOLDER: &str = "Problem";

static CAPTION_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:Figure|Table)\b").expect("valid caption regex"));

/// 构建题目区域（题干 + 选项），供选项提取与题干确定共用
///
/// 与题头同行的元数据行按去掉题头后的剩余部分匹配；
/// 题头行中已解析为题号的文本不进入题干。
pub fn question_region(pre_answer: &str, header_len: usize, strip_rows: &[String]) -> String {
    let (header, body) = pre_answer.split_at(header_len.min(pre_answer.len()));
    let header = header.trim();
    let mut text = body.to_string();
    for row in strip_rows {
        let row = match row.strip_prefix(header) {
            Some(rest) if !header.is_empty() => rest.trim(),
            _ => row.as_str(),
        };
        if !row.is_empty() {
            text = text.replacen(row, "\n", 1);
        }
    }
    let text = strip_question_number(&text);

    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !CAPTION_LINE_RE.is_match(line))
        .collect();
    replace_punctuation(&lines.join("\n"))
}

/// 确定题干
///
/// `stem_end` 为第一个选项标签在 `region` 中的位置。
pub fn resolve(region: &str, stem_end: Option<usize>, skill: &str) -> String {
    let body = stem_end
        .and_then(|end| region.get(..end))
        .unwrap_or(region);
    let mut stem = normalize_inline(body);

    if stem.is_empty() {
        stem = skill.trim().to_string();
    }
    if stem.chars().count() > MAX_STEM_CHARS {
        stem = stem.chars().take(MAX_STEM_CHARS).collect::<String>().trim_end().to_string();
    }
    if stem.is_empty() {
        stem = STEM_PLACEHOLDER.to_string();
    }
    stem
}
