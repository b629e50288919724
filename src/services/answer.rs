//! 答案与解析提取
//!
//! 答案区形如：
//!
//! ```text
//! ID: 0a1b2c3d Answer
//! Correct Answer: B
//! Rationale ...
//! ```
//!
//! 答案区中的 ID 必须与区块 ID 一致（忽略大小写），否则视为没有答案。

use crate::services::normalizer::normalize_inline;
use regex::Regex;
use std::sync::LazyLock;

static ANSWER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\bID\s*:\s*([0-9a-f]{8})\s*Answer[\s\S]{0,300}?Correct\s*Answer\s*:\s*([A-D0-9./\-]+)",
    )
    .expect("valid answer regex")
});

/// 答案与解析
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerSection {
    pub answer: Option<String>,
    pub rationale: Option<String>,
}

/// 是否为选择题字母答案
pub fn is_choice_letter(answer: &str) -> bool {
    matches!(answer, "A" | "B" | "C" | "D")
}

/// 提取答案与解析
pub fn extract(block_id: &str, block_text: &str) -> AnswerSection {
    let Some(caps) = ANSWER_RE.captures(block_text) else {
        return AnswerSection::default();
    };
    let (Some(whole), Some(id), Some(token)) = (caps.get(0), caps.get(1), caps.get(2)) else {
        return AnswerSection::default();
    };

    if !id.as_str().eq_ignore_ascii_case(block_id) {
        tracing::debug!(
            "答案区 ID {} 与区块 ID {} 不一致，忽略答案",
            id.as_str(),
            block_id
        );
        return AnswerSection::default();
    }

    let answer = token
        .as_str()
        .trim_end_matches(['.', '-', '/'])
        .to_ascii_uppercase();
    let rationale = normalize_inline(&block_text[whole.end()..]);

    AnswerSection {
        answer: Some(answer).filter(|a| !a.is_empty()),
        rationale: Some(rationale).filter(|r| !r.is_empty()),
    }
}

/// 答案区之前的文本（题干与选项所在区域）
pub fn pre_answer<'a>(block_id: &str, block_text: &'a str) -> &'a str {
    let pattern = format!(r"(?i)\bID\s*:\s*{}\s*Answer", regex::escape(block_id));
    match Regex::new(&pattern).ok().and_then(|re| re.find(block_text)) {
        Some(m) => &block_text[..m.start()],
        None => block_text,
    }
}
