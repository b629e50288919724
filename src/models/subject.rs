/// 试卷科目
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Subject {
    /// 数学
    #[serde(rename = "Math")]
    Math,
    /// 阅读与写作
    #[serde(rename = "Reading and Writing")]
    ReadingWriting,
}

/// 数学的四个领域
const MATH_DOMAINS: &[&str] = &[
    "Algebra",
    "Advanced Math",
    "Problem-Solving and Data Analysis",
    "Geometry and Trigonometry",
];

/// 阅读与写作的领域
const READING_WRITING_DOMAINS: &[&str] = &[
    "Information and Ideas",
    "Craft and Structure",
    "Expression of Ideas",
    "Standard English Conventions",
    "Command of Evidence",
    "Words in Context",
];

impl Subject {
    /// 获取标准名称
    pub fn name(self) -> &'static str {
        match self {
            Subject::Math => "Math",
            Subject::ReadingWriting => "Reading and Writing",
        }
    }

    /// 日志与汇总中使用的简称
    pub fn short_name(self) -> &'static str {
        match self {
            Subject::Math => "Math",
            Subject::ReadingWriting => "R&W",
        }
    }

    /// 本科目的领域候选
    pub fn domains(self) -> &'static [&'static str] {
        match self {
            Subject::Math => MATH_DOMAINS,
            Subject::ReadingWriting => READING_WRITING_DOMAINS,
        }
    }

    /// 领域候选（本科目优先，其后是另一科目）
    pub fn domain_candidates(self) -> impl Iterator<Item = &'static str> {
        let other = match self {
            Subject::Math => Subject::ReadingWriting,
            Subject::ReadingWriting => Subject::Math,
        };
        self.domains().iter().chain(other.domains()).copied()
    }

    /// 尝试从字符串解析科目（精确匹配，忽略大小写）
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "math" => Some(Subject::Math),
            "reading and writing" | "r&w" | "rw" => Some(Subject::ReadingWriting),
            _ => None,
        }
    }

    /// 智能查找科目（支持模糊匹配）
    pub fn find(s: &str) -> Option<Self> {
        if let Some(subject) = Self::from_str(s) {
            return Some(subject);
        }

        let s_lower = s.to_ascii_lowercase();
        if s_lower.contains("reading and writing") {
            return Some(Subject::ReadingWriting);
        }
        if s_lower
            .split(|c: char| !c.is_ascii_alphanumeric())
            .any(|word| word == "math")
        {
            return Some(Subject::Math);
        }

        None
    }
}

impl std::fmt::Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
