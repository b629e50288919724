//! 全局完整性校验
//!
//! 两份试卷都处理完之后执行：每份恰好 `expected_per_test` 道，
//! 总数恰好 `expected_total()`，完整四选项题目不少于 `min_mcq`。

use crate::config::Config;
use crate::error::ValidationError;
use crate::models::{QuestionRecord, Subject};

/// 一份试卷的处理结果（用于校验与诊断）
#[derive(Debug, Clone)]
pub struct DocumentRecords {
    pub subject: Subject,
    pub records: Vec<QuestionRecord>,
    /// 源文档中前 5 个题头 ID
    pub first_ids: Vec<String>,
}

impl DocumentRecords {
    pub fn count(&self) -> usize {
        self.records.len()
    }
}

/// 校验全部记录
pub fn validate_completeness(documents: &[DocumentRecords], config: &Config) -> Result<(), ValidationError> {
    let count_of = |subject: Subject| -> usize {
        documents
            .iter()
            .filter(|d| d.subject == subject)
            .map(DocumentRecords::count)
            .sum()
    };
    let ids_of = |subject: Subject| -> Vec<String> {
        documents
            .iter()
            .find(|d| d.subject == subject)
            .map(|d| d.first_ids.clone())
            .unwrap_or_default()
    };

    let math = count_of(Subject::Math);
    let reading_writing = count_of(Subject::ReadingWriting);
    let total = math + reading_writing;
    let mcq = documents
        .iter()
        .flat_map(|d| d.records.iter())
        .filter(|r| r.is_mcq())
        .count();

    let complete = math == config.expected_per_test
        && reading_writing == config.expected_per_test
        && total == config.expected_total()
        && mcq >= config.min_mcq;

    if complete {
        return Ok(());
    }

    Err(ValidationError::Incomplete {
        math,
        reading_writing,
        total,
        mcq,
        expected: config.expected_per_test,
        expected_total: config.expected_total(),
        min_mcq: config.min_mcq,
        math_ids: ids_of(Subject::Math),
        reading_writing_ids: ids_of(Subject::ReadingWriting),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Choice, Difficulty};

    fn record(id: usize, mcq: bool) -> QuestionRecord {
        QuestionRecord {
            id: format!("{:08x}", id),
            assessment: "SAT".to_string(),
            test: "Math".to_string(),
            domain: "Algebra".to_string(),
            skill: "Linear".to_string(),
            difficulty: Difficulty::Easy,
            number: None,
            stem: "stem".to_string(),
            choices: mcq.then(|| {
                ["A", "B", "C", "D"]
                    .iter()
                    .map(|l| Choice::new(*l, "text"))
                    .collect()
            }),
            answer: None,
            rationale: None,
            images: vec![],
            pages: vec![1],
        }
    }

    fn document(subject: Subject, n: usize, mcq: usize) -> DocumentRecords {
        DocumentRecords {
            subject,
            records: (0..n).map(|i| record(i, i < mcq)).collect(),
            first_ids: (0..n.min(5)).map(|i| format!("{:08x}", i)).collect(),
        }
    }

    #[test]
    fn test_complete_run_passes() {
        let docs = [document(Subject::Math, 50, 45), document(Subject::ReadingWriting, 50, 45)];
        assert!(validate_completeness(&docs, &Config::default()).is_ok());
    }

    #[test]
    fn test_too_few_mcq_fails() {
        let docs = [document(Subject::Math, 50, 44), document(Subject::ReadingWriting, 50, 45)];
        let err = validate_completeness(&docs, &Config::default()).unwrap_err();
        let ValidationError::Incomplete { mcq, total, .. } = err;
        assert_eq!(mcq, 89);
        assert_eq!(total, 100);
    }

    #[test]
    fn test_uneven_split_fails_and_reports_ids() {
        let docs = [document(Subject::Math, 49, 49), document(Subject::ReadingWriting, 51, 51)];
        let err = validate_completeness(&docs, &Config::default()).unwrap_err();
        let ValidationError::Incomplete {
            math,
            reading_writing,
            math_ids,
            ..
        } = &err;
        assert_eq!((*math, *reading_writing), (49, 51));
        assert_eq!(math_ids.len(), 5);
        assert!(err.to_string().contains("Math=49"));
    }
}
