use crate::models::Subject;
use regex::Regex;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::LazyLock;

static PAGE_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[PAGE:(\d+)\]\]").expect("valid page marker regex"));

/// 生成页码标记
pub fn page_marker(page: u32) -> String {
    format!("[[PAGE:{}]]", page)
}

/// 按顺序列出文本中所有页码标记：(标记起始位置, 页码)
fn page_markers(text: &str) -> impl Iterator<Item = (usize, u32)> + '_ {
    PAGE_MARKER_RE.captures_iter(text).filter_map(|caps| {
        let whole = caps.get(0)?;
        let page = caps.get(1)?.as_str().parse().ok()?;
        Some((whole.start(), page))
    })
}

/// 将页码标记替换为换行
pub fn strip_page_markers(text: &str) -> String {
    PAGE_MARKER_RE.replace_all(text, "\n").into_owned()
}

/// 一份试卷的原始文本
///
/// 文本已规范化，并包含 `[[PAGE:n]]` 形式的页码标记。
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub text: String,
    pub source_path: PathBuf,
    pub subject: Subject,
}

impl RawDocument {
    pub fn new(text: impl Into<String>, source_path: impl Into<PathBuf>, subject: Subject) -> Self {
        Self {
            text: text.into(),
            source_path: source_path.into(),
            subject,
        }
    }

    /// 空文档（提取失败时使用）
    pub fn empty(source_path: impl Into<PathBuf>, subject: Subject) -> Self {
        Self::new(String::new(), source_path, subject)
    }

    /// 由分页文本构建：每页前插入页码标记（页码从 1 开始）
    pub fn from_pages<S: AsRef<str>>(
        pages: &[S],
        source_path: impl Into<PathBuf>,
        subject: Subject,
    ) -> Self {
        let mut text = String::new();
        for (idx, page) in pages.iter().enumerate() {
            let page = page.as_ref();
            if page.trim().is_empty() {
                continue;
            }
            text.push('\n');
            text.push_str(&page_marker(idx as u32 + 1));
            text.push('\n');
            text.push_str(&crate::services::normalizer::normalize(page));
            text.push('\n');
        }
        Self::new(text, source_path, subject)
    }

    /// 计算区间 `[start, end)` 覆盖的页码
    ///
    /// 区间内的页码标记，加上区间起点所在的页；
    /// 两者都没有时取区间之后的第一个标记。
    pub fn pages_for_span(&self, start: usize, end: usize) -> Vec<u32> {
        let mut pages = BTreeSet::new();
        let mut next_after = None;
        for (pos, page) in page_markers(&self.text) {
            if pos <= start {
                pages.clear();
                pages.insert(page);
            } else if pos < end {
                pages.insert(page);
            } else {
                next_after = Some(page);
                break;
            }
        }
        if pages.is_empty() {
            pages.extend(next_after);
        }
        pages.into_iter().collect()
    }
}

/// 题目区块：归属于某个题目 ID 的文本区间 `[start, end)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub id: String,
    pub start: usize,
    /// 题头结束位置（题头文本之后）
    pub header_end: usize,
    pub end: usize,
    pub pages: Vec<u32>,
}

impl Block {
    /// 区块原始文本
    pub fn text<'a>(&self, document: &'a str) -> &'a str {
        &document[self.start..self.end]
    }

    /// 题头在区块内的长度
    pub fn header_len(&self) -> usize {
        self.header_end - self.start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pages_inserts_markers() {
        let doc = RawDocument::from_pages(&["first page", "", "third page"], "x.txt", Subject::Math);
        assert!(doc.text.contains("[[PAGE:1]]"));
        assert!(!doc.text.contains("[[PAGE:2]]"));
        assert!(doc.text.contains("[[PAGE:3]]"));
    }

    #[test]
    fn test_pages_for_span() {
        let text = "[[PAGE:1]]\naaa\nbbb\n[[PAGE:2]]\nccc\n[[PAGE:3]]\nddd";
        let doc = RawDocument::new(text, "x.txt", Subject::Math);
        let a = text.find("aaa").unwrap();
        let c = text.find("ccc").unwrap();
        let d = text.find("ddd").unwrap();
        assert_eq!(doc.pages_for_span(a, a + 3), vec![1]);
        assert_eq!(doc.pages_for_span(a, c + 3), vec![1, 2]);
        assert_eq!(doc.pages_for_span(c, text.len()), vec![2, 3]);
        assert_eq!(doc.pages_for_span(d, text.len()), vec![3]);
    }

    #[test]
    fn test_pages_for_span_without_leading_marker() {
        let text = "aaa\n[[PAGE:4]]\nbbb";
        let doc = RawDocument::new(text, "x.txt", Subject::Math);
        assert_eq!(doc.pages_for_span(0, 3), vec![4]);
    }

    #[test]
    fn test_strip_page_markers() {
        assert_eq!(strip_page_markers("a[[PAGE:12]]b"), "a\nb");
    }
}
