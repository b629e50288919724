//! 选项提取（两阶段）
//!
//! 输入是区块中答案区之前的文本（已规范化，已去掉图表标题行）。
//!
//! - 第一阶段：按行识别 `A. xxx` / `(B) xxx` 形式的选项组，
//!   A、B、C、D 四个都找到才算成功
//! - 第二阶段（第一阶段失败时）：先切出全部候选标签 `(label, position)`，
//!   再按 A → B → C → D 严格递增的顺序挑选，标签之间的文本即选项内容
//!
//! 选项要么 0 个要么恰好 4 个，不保留部分结果。

use crate::models::Choice;
use crate::services::normalizer::{normalize_inline, replace_punctuation};
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::LazyLock;

pub const LABELS: [char; 4] = ['A', 'B', 'C', 'D'];

/// 选项文本长度下限（字符）
pub const MIN_CHOICE_CHARS: usize = 2;
/// 选项文本长度上限（字符）
pub const MAX_CHOICE_CHARS: usize = 800;

static LABEL_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\(?([A-D])\)?[.)](?:\s+(.*))?$").expect("valid choice line regex")
});
static TERMINATOR_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:ID\s*:|Correct\s*Answer)").expect("valid terminator regex"));
static SENTINEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\n(?:ID\s*:|Correct\s*Answer)").expect("valid sentinel regex")
});
static CORRECT_ANSWER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Correct\s*Answer").expect("valid answer regex"));
static CAPTION_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:Figure|Table)\b").expect("valid caption regex"));

/// 使用的提取方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Strategy {
    /// 第一阶段：按行的选项组
    Block,
    /// 第二阶段：位置扫描
    Positional,
}

/// 完整的四选项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceSet {
    pub choices: Vec<Choice>,
    /// 第一个选项标签的位置（题干在此之前）
    pub stem_end: usize,
    pub strategy: Strategy,
}

/// 候选标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LabelToken {
    pub label: char,
    /// 标签起始位置
    pub start: usize,
    /// 标签及其后空白的结束位置
    pub end: usize,
}

/// 第二阶段的调试信息
#[derive(Debug, Clone, Serialize)]
pub struct InlineTrace {
    pub window: String,
    pub tokens: Vec<LabelToken>,
    pub choices: Vec<String>,
    pub accepted: bool,
}

/// 提取结果
#[derive(Debug, Clone, Default)]
pub struct ChoiceOutcome {
    pub set: Option<ChoiceSet>,
    /// 运行过第二阶段时才有
    pub trace: Option<InlineTrace>,
}

/// 提取选项：先第一阶段，失败后第二阶段
pub fn extract(pre: &str) -> ChoiceOutcome {
    if let Some(set) = parse_block(pre) {
        return ChoiceOutcome {
            set: Some(set),
            trace: None,
        };
    }
    let (set, trace) = parse_positional(pre);
    ChoiceOutcome {
        set,
        trace: Some(trace),
    }
}

// ========== 第一阶段：按行的选项组 ==========

/// 正在收集的选项组
struct Group {
    label: char,
    start: usize,
    lines: Vec<String>,
}

/// 第一阶段：逐行识别选项组，每个标签保留第一次出现
pub fn parse_block(pre: &str) -> Option<ChoiceSet> {
    let mut found: BTreeMap<char, (usize, String)> = BTreeMap::new();
    let mut current: Option<Group> = None;

    let mut offset = 0;
    for raw_line in pre.split('\n') {
        let line_start = offset;
        offset += raw_line.len() + 1;
        let line = raw_line.trim();

        if let Some(caps) = LABEL_LINE_RE.captures(line) {
            finish_group(current.take(), &mut found);
            let label = caps
                .get(1)
                .and_then(|m| m.as_str().chars().next())
                .unwrap_or('A');
            let first_line = caps.get(2).map(|m| m.as_str().to_string());
            current = Some(Group {
                label,
                start: line_start,
                lines: first_line.into_iter().collect(),
            });
        } else if TERMINATOR_LINE_RE.is_match(line) {
            finish_group(current.take(), &mut found);
        } else if let Some(group) = current.as_mut() {
            group.lines.push(line.to_string());
        }
    }
    finish_group(current.take(), &mut found);

    if !LABELS.iter().all(|label| found.contains_key(label)) {
        return None;
    }
    // 任一选项过长，整组作废
    if found
        .values()
        .any(|(_, text)| text.chars().count() > MAX_CHOICE_CHARS)
    {
        return None;
    }

    let stem_end = found.values().map(|(start, _)| *start).min().unwrap_or(0);
    let choices = LABELS
        .iter()
        .filter_map(|label| {
            found
                .get(label)
                .map(|(_, text)| Choice::new(label.to_string(), text.clone()))
        })
        .collect();
    Some(ChoiceSet {
        choices,
        stem_end,
        strategy: Strategy::Block,
    })
}

fn finish_group(group: Option<Group>, found: &mut BTreeMap<char, (usize, String)>) {
    let Some(group) = group else {
        return;
    };
    let text = normalize_inline(&group.lines.join("\n"));
    if text.is_empty() || found.contains_key(&group.label) {
        return;
    }
    found.insert(group.label, (group.start, text));
}

// ========== 第二阶段：位置扫描 ==========

/// 尝试在 `k` 处匹配一个标签：`A.` `A)` `(A)` `(A).` 后跟至少一个空白
fn match_token_at(chars: &[(usize, char)], k: usize, total_len: usize) -> Option<LabelToken> {
    let byte_at = |j: usize| chars.get(j).map(|(b, _)| *b).unwrap_or(total_len);
    let char_at = |j: usize| chars.get(j).map(|(_, c)| *c);

    // 前一个字符不能是字母或数字
    if k > 0 && char_at(k - 1).is_some_and(|c| c.is_ascii_alphanumeric()) {
        return None;
    }

    let mut j = k;
    if char_at(j) == Some('(') {
        j += 1;
    }
    let label = char_at(j).filter(|c| LABELS.contains(c))?;
    j += 1;

    let punct_end = match (char_at(j), char_at(j + 1)) {
        (Some(')'), Some('.' | ')')) if char_at(j + 2).is_some_and(char::is_whitespace) => j + 2,
        (Some(')' | '.'), Some(c)) if c.is_whitespace() => j + 1,
        _ => return None,
    };

    let mut end = punct_end;
    while char_at(end).is_some_and(char::is_whitespace) {
        end += 1;
    }

    Some(LabelToken {
        label,
        start: byte_at(k),
        end: byte_at(end),
    })
}

/// 切出所有候选标签（互不重叠，按位置排列）
pub fn tokenize(window: &str) -> Vec<LabelToken> {
    let chars: Vec<(usize, char)> = window.char_indices().collect();
    let mut tokens = Vec::new();
    let mut k = 0;
    while k < chars.len() {
        match match_token_at(&chars, k, window.len()) {
            Some(token) => {
                tokens.push(token);
                k = chars.partition_point(|(b, _)| *b < token.end);
            }
            None => k += 1,
        }
    }
    tokens
}

/// 按 A → B → C → D 挑选标签，每个都必须从上一个结束之后开始
pub fn select_ordered(tokens: &[LabelToken]) -> Option<[LabelToken; 4]> {
    let mut selected = Vec::with_capacity(4);
    let mut pos = 0;
    for needed in LABELS {
        let token = tokens
            .iter()
            .find(|t| t.label == needed && t.start >= pos)?;
        pos = token.end;
        selected.push(*token);
    }
    selected.try_into().ok()
}

/// 清理一个选项片段；长度不合格返回 None
fn clean_chunk(chunk: &str) -> Option<String> {
    let kept: Vec<&str> = chunk
        .split('\n')
        .filter(|line| !CAPTION_LINE_RE.is_match(line.trim()))
        .collect();
    let joined = kept.join("\n");
    let trimmed = joined.trim_start_matches(|c: char| c.is_whitespace() || matches!(c, '.' | ':' | ')' | '-'));
    let mut text = normalize_inline(trimmed);
    if let Some(m) = CORRECT_ANSWER_RE.find(&text) {
        text = text[..m.start()].trim_end().to_string();
    }

    let len = text.chars().count();
    if len < MIN_CHOICE_CHARS || len > MAX_CHOICE_CHARS {
        return None;
    }
    Some(text)
}

/// 第二阶段：位置扫描
pub fn parse_positional(pre: &str) -> (Option<ChoiceSet>, InlineTrace) {
    let window = replace_punctuation(pre);
    let mut trace = InlineTrace {
        window: window.chars().take(600).collect(),
        tokens: Vec::new(),
        choices: Vec::new(),
        accepted: false,
    };

    // 位置一致才能用选项位置切题干
    if window.len() != pre.len() {
        return (None, trace);
    }

    let sentinels: Vec<usize> = SENTINEL_RE.find_iter(&window).map(|m| m.start()).collect();
    let Some(selected) = select_ordered(&tokenize(&window)) else {
        return (None, trace);
    };
    trace.tokens = selected.to_vec();

    let mut choices = Vec::with_capacity(4);
    for (i, token) in selected.iter().enumerate() {
        let mut end = selected.get(i + 1).map(|t| t.start).unwrap_or(window.len());
        if let Some(stop) = sentinels.iter().find(|s| **s >= token.end && **s < end) {
            end = *stop;
        }
        let Some(text) = clean_chunk(&window[token.end..end]) else {
            return (None, trace);
        };
        trace.choices.push(text.clone());
        choices.push(Choice::new(token.label.to_string(), text));
    }

    trace.accepted = true;
    let set = ChoiceSet {
        choices,
        stem_end: selected[0].start,
        strategy: Strategy::Positional,
    };
    (Some(set), trace)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(set: &ChoiceSet) -> Vec<&str> {
        set.choices.iter().map(|c| c.label.as_str()).collect()
    }

    #[test]
    fn test_block_stage_accepts_full_set() {
        let pre = "What is 2 + 2?\nA. 3\nB. 4\nC) 5\n(D) 6";
        let outcome = extract(pre);
        let set = outcome.set.unwrap();
        assert_eq!(set.strategy, Strategy::Block);
        assert_eq!(labels(&set), vec!["A", "B", "C", "D"]);
        assert_eq!(set.choices[3].text, "6");
        assert_eq!(&pre[..set.stem_end], "What is 2 + 2?\n");
        assert!(outcome.trace.is_none());
    }

    #[test]
    fn test_block_stage_joins_continuation_lines() {
        let pre = "stem\nA. first part\ncontinues here\nB. two\nC. three\nD. four\nID: 0a1b2c3d trailing";
        let set = parse_block(pre).unwrap();
        assert_eq!(set.choices[0].text, "first part continues here");
        assert_eq!(set.choices[3].text, "four");
    }

    #[test]
    fn test_block_stage_keeps_first_duplicate() {
        let pre = "A. one\nB. two\nC. three\nD. four\nA. again";
        let set = parse_block(pre).unwrap();
        assert_eq!(set.choices[0].text, "one");
    }

    #[test]
    fn test_partial_set_yields_none() {
        let pre = "stem\nA. one\nB. two";
        let outcome = extract(pre);
        assert!(outcome.set.is_none());
        // 第一阶段失败后运行过第二阶段
        assert!(outcome.trace.is_some());
    }

    #[test]
    fn test_positional_stage_inline_choices() {
        let pre = "Which choice completes the text? A) ran B) runs C) running D) to run";
        assert!(parse_block(pre).is_none());
        let outcome = extract(pre);
        let set = outcome.set.unwrap();
        assert_eq!(set.strategy, Strategy::Positional);
        assert_eq!(set.choices[0].text, "ran");
        assert_eq!(set.choices[3].text, "to run");
        assert_eq!(pre[..set.stem_end].trim(), "Which choice completes the text?");
        assert!(outcome.trace.unwrap().accepted);
    }

    #[test]
    fn test_tokenizer_skips_letters_inside_words() {
        let tokens = tokenize("PLAN A. go XB) no (C) yes D. end");
        let found: Vec<char> = tokens.iter().map(|t| t.label).collect();
        assert_eq!(found, vec!['A', 'C', 'D']);
    }

    #[test]
    fn test_ordered_selection_is_strictly_increasing() {
        // 选项 C 的文本里提到了 "A." 不能被当作新的 A
        let tokens = tokenize("B) early A) one B) two C) see A. above D) four");
        let selected = select_ordered(&tokens).unwrap();
        for pair in selected.windows(2) {
            assert!(pair[1].start >= pair[0].end);
        }
        assert_eq!(selected[0].label, 'A');
        assert_eq!(selected[3].label, 'D');
    }

    #[test]
    fn test_ordered_selection_missing_label() {
        let tokens = tokenize("A) one B) two D) four C) three");
        assert!(select_ordered(&tokens).is_none());
    }

    #[test]
    fn test_positional_stops_at_sentinel() {
        let pre = "stem A) one B) two C) three D) four\nCorrect Answer: B\nChoice B is right";
        let (set, _) = parse_positional(pre);
        let set = set.unwrap();
        assert_eq!(set.choices[3].text, "four");
    }

    #[test]
    fn test_positional_stops_at_id_line() {
        let pre = "stem A) one B) two C) three D) four\nID: 0a1b2c3d trailing text that is not a choice";
        let (set, trace) = parse_positional(pre);
        let set = set.unwrap();
        assert_eq!(set.choices[3].text, "four");
        assert_eq!(trace.choices[3], "four");
    }

    #[test]
    fn test_oversized_choice_discards_whole_set() {
        let long = "word ".repeat(200);
        let pre = format!("stem A) one B) two C) {} D) four", long);
        let outcome = extract(&pre);
        assert!(outcome.set.is_none());
        assert!(!outcome.trace.unwrap().accepted);
    }

    #[test]
    fn test_oversized_block_choice_discards_whole_set() {
        let pre = format!("stem\nA. one\nB. two\nC. {}\nD. four", "word ".repeat(200));
        assert!(parse_block(&pre).is_none());
        assert!(extract(&pre).set.is_none());
    }

    #[test]
    fn test_too_short_choice_discards_whole_set() {
        let pre = "stem A) one B) x C) three D) four";
        assert!(extract(pre).set.is_none());
    }
}
