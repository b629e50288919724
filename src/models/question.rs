use crate::utils::logging::truncate_text;
use serde::{Deserialize, Serialize};

/// 选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub label: String,
    pub text: String,
}

impl Choice {
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
        }
    }
}

/// 难度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// 难度圆点字符
static DOT_GLYPHS: phf::Set<char> = phf::phf_set! {
    '•', '●', '○', '·',
};

impl Difficulty {
    /// 是否为难度圆点字符
    pub fn is_dot_glyph(c: char) -> bool {
        DOT_GLYPHS.contains(&c)
    }

    /// 从原始难度文本映射
    ///
    /// 圆点个数：1 → Easy，2 → Medium，3 个及以上 → Hard；
    /// 否则按首字母判断，空值或无法识别时为 Medium。
    pub fn from_raw(raw: &str) -> Self {
        let raw = raw.trim().to_lowercase();
        if raw.is_empty() {
            return Difficulty::Medium;
        }

        match raw.chars().filter(|c| Self::is_dot_glyph(*c)).count() {
            0 => {}
            1 => return Difficulty::Easy,
            2 => return Difficulty::Medium,
            _ => return Difficulty::Hard,
        }

        if raw.starts_with('e') {
            Difficulty::Easy
        } else if raw.starts_with('h') {
            Difficulty::Hard
        } else {
            Difficulty::Medium
        }
    }
}

/// 题目记录（最终输出）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub id: String,
    pub assessment: String,
    pub test: String,
    pub domain: String,
    pub skill: String,
    pub difficulty: Difficulty,
    pub number: Option<u32>,
    pub stem: String,
    pub choices: Option<Vec<Choice>>,
    pub answer: Option<String>,
    pub rationale: Option<String>,
    pub images: Vec<String>,
    pub pages: Vec<u32>,
}

impl QuestionRecord {
    /// 是否为完整的四选项题目
    pub fn is_mcq(&self) -> bool {
        self.choices.as_ref().is_some_and(|c| c.len() == 4)
    }
}

impl std::fmt::Display for QuestionRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{} / {} / {:?}] {}",
            self.id,
            self.domain,
            self.skill,
            self.difficulty,
            truncate_text(&self.stem, 80)
        )
    }
}
