//! 文本规范化
//!
//! - 排版用的破折号、引号替换为 ASCII
//! - 特殊空白替换为普通空格，行内连续空白压缩为一个空格
//! - 删除空行，保留换行（后续的标签行、选项行识别依赖行结构）
//! - 修复跨行断词：`word-\nword` → `wordword`
//!
//! 规范化是幂等的：对结果再次规范化不会产生变化。

/// 需要替换的排版字符
static PUNCTUATION: phf::Map<char, &'static str> = phf::phf_map! {
    '\u{2012}' => "-",
    '\u{2013}' => "-",
    '\u{2014}' => "-",
    '\u{2015}' => "-",
    '\u{2018}' => "'",
    '\u{2019}' => "'",
    '\u{201A}' => "'",
    '\u{201C}' => "\"",
    '\u{201D}' => "\"",
    '\u{201E}' => "\"",
    '\u{00A0}' => " ",
    '\u{2002}' => " ",
    '\u{2003}' => " ",
    '\u{2007}' => " ",
    '\u{2009}' => " ",
    '\u{200A}' => " ",
    '\u{202F}' => " ",
    '\u{000C}' => "\n",
    '\r' => "\n",
};

/// 规范化整段文本（保留行结构）
pub fn normalize(text: &str) -> String {
    let replaced = replace_punctuation(text);
    let lines: Vec<String> = replaced
        .lines()
        .map(collapse_whitespace)
        .filter(|line| !line.is_empty())
        .collect();
    repair_hyphenation(&lines.join("\n"))
}

/// 只替换排版字符和特殊空白
pub fn replace_punctuation(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match PUNCTUATION.get(&c) {
            Some(replacement) => out.push_str(replacement),
            None => out.push(c),
        }
    }
    out
}

/// 压缩所有空白（包括换行）为单个空格并去掉首尾空白
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 单行规范化：排版字符替换 + 断词修复 + 空白压缩
pub fn normalize_inline(text: &str) -> String {
    collapse_whitespace(&repair_hyphenation(&replace_punctuation(text)))
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// 修复跨行断词：`word-\nword` → `wordword`
pub fn repair_hyphenation(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '-'
            && chars.get(i + 1) == Some(&'\n')
            && chars.get(i + 2).is_some_and(|n| is_word_char(*n))
            && out.chars().last().is_some_and(is_word_char)
        {
            i += 2;
            continue;
        }
        out.push(c);
        i += 1;
    }
    out
}
