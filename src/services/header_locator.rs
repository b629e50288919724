//! 题头定位与区块切分
//!
//! 题头形如 `Question ID: 1a2b3c4d` 或 `ID - 1a2b3c4d`。
//! 答案区的 `ID: 1a2b3c4d Answer` 不是新题目的开始，必须排除，
//! 否则答案区会被当成重复题目把原区块截断。

use crate::models::{Block, RawDocument};
use regex::Regex;
use std::collections::HashSet;
use std::ops::Range;
use std::sync::LazyLock;

static ANCHOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:Question\s+ID|\bID)\s*[:\-]\s*([0-9a-f]{8})\b").expect("valid anchor regex")
});

static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:Question\s+)?\b(\d{1,2})[.)]").expect("valid question number regex")
});

/// 题头
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    /// 小写的题目 ID
    pub id: String,
    /// 题头起始位置
    pub start: usize,
    /// 题头结束位置（ID 之后）
    pub end: usize,
}

/// 题头之后是否紧跟 `Answer`
fn followed_by_answer(text: &str, pos: usize) -> bool {
    let rest = text[pos..].trim_start();
    rest.get(..6)
        .is_some_and(|word| word.eq_ignore_ascii_case("answer"))
}

/// 按出现顺序找出所有题头
pub fn locate_anchors(text: &str) -> Vec<Anchor> {
    ANCHOR_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let id = caps.get(1)?;
            if followed_by_answer(text, whole.end()) {
                return None;
            }
            Some(Anchor {
                id: id.as_str().to_ascii_lowercase(),
                start: whole.start(),
                end: whole.end(),
            })
        })
        .collect()
}

/// 切分区块：每个区块从自己的题头开始，到下一个题头（或文本末尾）结束
pub fn segment(document: &RawDocument) -> Vec<Block> {
    let anchors = locate_anchors(&document.text);
    anchors
        .iter()
        .enumerate()
        .map(|(i, anchor)| {
            let end = anchors
                .get(i + 1)
                .map(|next| next.start)
                .unwrap_or(document.text.len());
            Block {
                id: anchor.id.clone(),
                start: anchor.start,
                header_end: anchor.end,
                end,
                pages: document.pages_for_span(anchor.start, end),
            }
        })
        .collect()
}

/// 题号在题头剩余部分中的位置 `(整个匹配区间, 题号)`，只看第一行
fn number_match(header_rest: &str) -> Option<(Range<usize>, u32)> {
    let line_end = header_rest.find('\n').unwrap_or(header_rest.len());
    let caps = NUMBER_RE.captures(&header_rest[..line_end])?;
    let number = caps.get(1)?.as_str().parse().ok()?;
    Some((caps.get(0)?.range(), number))
}

/// 题号：题头所在行剩余部分中的 `Question 12.` / `12)`
pub fn question_number(header_rest: &str) -> Option<u32> {
    number_match(header_rest).map(|(_, number)| number)
}

/// 去掉题头所在行中已被解析为题号的文本
pub fn strip_question_number(header_rest: &str) -> String {
    match number_match(header_rest) {
        Some((range, _)) => format!("{}{}", &header_rest[..range.start], &header_rest[range.end..]),
        None => header_rest.to_string(),
    }
}

/// 去重累加器：已见过的 ID 与保留的区块
#[derive(Debug, Default)]
struct Selection {
    seen: HashSet<String>,
    kept: Vec<Block>,
}

/// 按 ID 去重（保留第一次出现）并截取前 `cap` 个
pub fn select_blocks(blocks: Vec<Block>, cap: usize) -> Vec<Block> {
    let selection = blocks
        .into_iter()
        .fold(Selection::default(), |mut acc, block| {
            if acc.kept.len() < cap && acc.seen.insert(block.id.clone()) {
                acc.kept.push(block);
            }
            acc
        });
    selection.kept
}

/// 文档中前 `n` 个题头 ID（用于失败诊断）
pub fn first_ids(text: &str, n: usize) -> Vec<String> {
    locate_anchors(text).into_iter().take(n).map(|a| a.id).collect()
}
