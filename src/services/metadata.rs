//! 元数据提取
//!
//! 按优先级依次执行一组纯函数规则，每条规则返回部分元数据，
//! 合并时每个字段取第一个非空值：
//!
//! 1. `composite_row`：组合标签行（Assessment / Test / Domain / Skill / Difficulty），
//!    值在同一行 Difficulty 之后，或在下一行
//! 2. `label_value`：逐行 `Label: value`

use crate::models::{Difficulty, Subject};
use crate::services::normalizer::normalize_inline;
use regex::Regex;
use std::sync::LazyLock;

/// 只在区块开头这么多字符内查找元数据
pub const METADATA_WINDOW: usize = 1000;

const LABEL_TOKENS: [&str; 5] = ["assessment", "test", "domain", "skill", "difficulty"];

static DIFFICULTY_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)difficulty\b").expect("valid difficulty label regex"));
static READING_WRITING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)reading and writing").expect("valid test name regex"));
static MATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bmath\b").expect("valid test name regex"));
static DIFFICULTY_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(easy|medium|hard)$").expect("valid difficulty regex"));
static LABEL_VALUE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(assessment|test|domain|skill|difficulty)\s*:").expect("valid label regex")
});

/// 元数据（各字段均可缺失）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub assessment: Option<String>,
    pub test: Option<String>,
    pub domain: Option<String>,
    pub skill: Option<String>,
    pub difficulty_raw: Option<String>,
}

fn fill(slot: &mut Option<String>, value: Option<String>) {
    if slot.is_none() {
        *slot = value.filter(|v| !v.trim().is_empty());
    }
}

impl Metadata {
    /// 合并：已有字段保持不变，只填充空字段
    pub fn merge(&mut self, patch: Metadata) {
        fill(&mut self.assessment, patch.assessment);
        fill(&mut self.test, patch.test);
        fill(&mut self.domain, patch.domain);
        fill(&mut self.skill, patch.skill);
        fill(&mut self.difficulty_raw, patch.difficulty_raw);
    }

    /// 套用默认值
    pub fn resolve(&self, subject: Subject) -> ResolvedMetadata {
        ResolvedMetadata {
            assessment: self.assessment.clone().unwrap_or_else(|| "SAT".to_string()),
            test: self
                .test
                .as_deref()
                .map(|t| Subject::find(t).map(|s| s.name().to_string()).unwrap_or_else(|| t.to_string()))
                .unwrap_or_else(|| subject.name().to_string()),
            domain: self.domain.clone().unwrap_or_else(|| "Unknown".to_string()),
            skill: self.skill.clone().unwrap_or_else(|| "Unknown".to_string()),
            difficulty: Difficulty::from_raw(self.difficulty_raw.as_deref().unwrap_or("")),
        }
    }
}

/// 套用默认值后的元数据
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMetadata {
    pub assessment: String,
    pub test: String,
    pub domain: String,
    pub skill: String,
    pub difficulty: Difficulty,
}

/// 单条规则的结果
#[derive(Debug, Default)]
pub struct RulePatch {
    pub metadata: Metadata,
    /// 需要从题干中删除的行
    pub strip_rows: Vec<String>,
}

/// 提取结果
#[derive(Debug, Default)]
pub struct MetadataExtraction {
    pub metadata: Metadata,
    pub strip_rows: Vec<String>,
}

type Rule = fn(&[&str], Subject) -> RulePatch;

/// 规则按优先级排列
const RULES: &[(&str, Rule)] = &[
    ("composite_row", composite_row_rule),
    ("label_value", label_value_rule),
];

/// 取前 `n` 个字符
fn head(text: &str, n: usize) -> &str {
    match text.char_indices().nth(n) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// 提取区块元数据
pub fn extract(block_text: &str, subject: Subject) -> MetadataExtraction {
    let lines: Vec<&str> = head(block_text, METADATA_WINDOW)
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    RULES
        .iter()
        .fold(MetadataExtraction::default(), |mut acc, (name, rule)| {
            let patch = rule(&lines, subject);
            tracing::trace!("元数据规则 {} 结果: {:?}", name, patch.metadata);
            acc.metadata.merge(patch.metadata);
            acc.strip_rows.extend(patch.strip_rows);
            acc
        })
}

// ========== 规则 1: 组合标签行 ==========

fn composite_row_rule(lines: &[&str], subject: Subject) -> RulePatch {
    let mut patch = RulePatch::default();

    let Some(idx) = lines.iter().position(|line| {
        let lower = line.to_ascii_lowercase();
        LABEL_TOKENS.iter().all(|t| lower.contains(t))
    }) else {
        return patch;
    };

    let label_row = lines[idx];
    patch.strip_rows.push(label_row.to_string());

    // `Label: value` 写法交给逐行规则
    if LABEL_VALUE_RE.find_iter(label_row).count() > 1 {
        return patch;
    }

    // 同一行 Difficulty 之后有内容：行内布局；否则读取下一行
    let inline_values = DIFFICULTY_LABEL_RE
        .find(label_row)
        .map(|m| label_row[m.end()..].trim_start_matches([':', '-', ' ']).trim())
        .unwrap_or("");
    let values = if !inline_values.is_empty() {
        inline_values
    } else {
        match lines.get(idx + 1).copied() {
            Some(next) if !next.to_ascii_lowercase().starts_with("assessment") => {
                patch.strip_rows.push(next.to_string());
                next
            }
            _ => "",
        }
    };

    patch.metadata = decompose_values(values, subject);
    patch
}

/// 拆分值行：`<assessment> <test> <domain> <skill> <difficulty>`
fn decompose_values(values: &str, subject: Subject) -> Metadata {
    let mut meta = Metadata::default();

    let (detected, before, after) = if let Some(m) = READING_WRITING_RE.find(values) {
        (Some(Subject::ReadingWriting), &values[..m.start()], &values[m.end()..])
    } else if let Some(m) = MATH_RE.find(values) {
        (Some(Subject::Math), &values[..m.start()], &values[m.end()..])
    } else {
        (None, values, "")
    };
    let (before, after) = (before.trim(), after.trim());

    meta.test = detected.map(|s| s.name().to_string());
    if before.to_ascii_lowercase().contains("sat") {
        meta.assessment = Some("SAT".to_string());
    } else if !before.is_empty() {
        meta.assessment = Some(before.to_string());
    }

    let after_lower = after.to_ascii_lowercase();
    let matched = detected
        .unwrap_or(subject)
        .domain_candidates()
        .find_map(|domain| {
            after_lower
                .find(&domain.to_ascii_lowercase())
                .map(|pos| (domain, pos))
        });
    let Some((domain, pos)) = matched else {
        return meta;
    };
    meta.domain = Some(domain.to_string());

    let rest = after[pos + domain.len()..].trim();
    let (skill, difficulty) = split_difficulty_suffix(rest);
    meta.difficulty_raw = difficulty;
    if !skill.is_empty() {
        meta.skill = Some(skill.to_string());
    }
    meta
}

/// 从末尾拆出难度：单词（Easy/Medium/Hard）或 1–5 个圆点
fn split_difficulty_suffix(rest: &str) -> (&str, Option<String>) {
    if let Some(caps) = DIFFICULTY_WORD_RE.captures(rest) {
        if let (Some(whole), Some(word)) = (caps.get(0), caps.get(1)) {
            let mut title = word.as_str().to_ascii_lowercase();
            title[..1].make_ascii_uppercase();
            return (rest[..whole.start()].trim(), Some(title));
        }
    }

    let dots: Vec<(usize, char)> = rest
        .char_indices()
        .rev()
        .take_while(|(_, c)| Difficulty::is_dot_glyph(*c))
        .take(5)
        .collect();
    match dots.last() {
        Some((start, _)) => {
            let glyphs: String = dots.iter().rev().map(|(_, c)| *c).collect();
            (rest[..*start].trim(), Some(glyphs))
        }
        None => (rest, None),
    }
}

// ========== 规则 2: 逐行 Label: value ==========

fn label_value_rule(lines: &[&str], _subject: Subject) -> RulePatch {
    let mut patch = RulePatch::default();
    for line in lines {
        let labels: Vec<_> = LABEL_VALUE_RE.captures_iter(line).collect();
        for (i, caps) in labels.iter().enumerate() {
            let (Some(whole), Some(key)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let value_end = labels
                .get(i + 1)
                .and_then(|next| next.get(0))
                .map(|m| m.start())
                .unwrap_or(line.len());
            let value = normalize_inline(&line[whole.end()..value_end]);
            if value.is_empty() {
                continue;
            }
            let slot = match key.as_str().to_ascii_lowercase().as_str() {
                "assessment" => &mut patch.metadata.assessment,
                "test" => &mut patch.metadata.test,
                "domain" => &mut patch.metadata.domain,
                "skill" => &mut patch.metadata.skill,
                _ => &mut patch.metadata.difficulty_raw,
            };
            fill(slot, Some(value));
        }
    }
    patch
}
