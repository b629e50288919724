//! 批量处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责两份试卷的处理和资源管理。
//!
//! ## 核心功能
//!
//! 1. **文本加载**：两份试卷并发提取文本
//! 2. **并发控制**：两份试卷共用一个 Semaphore 限制图片导出
//! 3. **向下委托**：委托 paper_processor 处理单份试卷
//! 4. **全局校验**：数量不满足要求时整个运行失败，不写任何输出
//! 5. **结果写入**：按 Math → R&W 的顺序写出全部记录

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::infrastructure::{ImageExporter, NoopImageExporter, PdfImagesExporter, TextSource};
use crate::models::{QuestionRecord, RawDocument, Subject};
use crate::orchestrator::paper_processor::process_document;
use crate::services::RecordWriter;
use crate::utils::logging::{log_document_loaded, log_startup, print_final_stats};
use crate::workflow::{validate_completeness, DocumentRecords};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// 运行输入
#[derive(Debug, Clone)]
pub struct Inputs {
    pub math: PathBuf,
    pub reading_writing: PathBuf,
    pub out: PathBuf,
    pub image_dir: PathBuf,
}

/// 运行结果摘要
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub math: usize,
    pub reading_writing: usize,
    pub mcq: usize,
    pub out: PathBuf,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.math + self.reading_writing
    }
}

/// 应用主结构
pub struct App {
    config: Config,
    text_source: TextSource,
    exporter: Option<Arc<dyn ImageExporter>>,
}

impl App {
    /// 创建应用（图片导出器在运行时按 `image_dir` 创建）
    pub fn new(config: Config) -> Self {
        let text_source = TextSource::new(config.pdftotext_bin.clone());
        Self {
            config,
            text_source,
            exporter: None,
        }
    }

    /// 使用指定的图片导出器
    pub fn with_exporter(mut self, exporter: Arc<dyn ImageExporter>) -> Self {
        self.exporter = Some(exporter);
        self
    }

    /// 运行应用主逻辑
    pub async fn run(&self, inputs: &Inputs) -> Result<RunSummary> {
        log_startup(&inputs.math, &inputs.reading_writing);

        // 两份试卷并发提取文本
        let (math, reading_writing) = futures::join!(
            self.text_source.load(&inputs.math, Subject::Math),
            self.text_source.load(&inputs.reading_writing, Subject::ReadingWriting),
        );
        for document in [&math, &reading_writing] {
            log_document_loaded(document.subject, document.text.chars().count());
        }

        let exporter: Arc<dyn ImageExporter> = match &self.exporter {
            Some(exporter) => exporter.clone(),
            None => Arc::new(PdfImagesExporter::new(
                self.config.pdfimages_bin.clone(),
                inputs.image_dir.clone(),
                self.config.media_root.clone(),
            )),
        };

        let documents = self
            .process_with(vec![math, reading_writing], exporter)
            .await?;

        // 按来源试卷计数
        let count_of = |subject: Subject| -> usize {
            documents
                .iter()
                .filter(|d| d.subject == subject)
                .map(DocumentRecords::count)
                .sum()
        };
        let records: Vec<QuestionRecord> = documents.iter().flat_map(|d| d.records.clone()).collect();

        RecordWriter::new(&inputs.out)
            .write(&records)
            .map_err(AppError::from)
            .with_context(|| format!("无法写入结果文件: {}", inputs.out.display()))?;

        let summary = RunSummary {
            math: count_of(Subject::Math),
            reading_writing: count_of(Subject::ReadingWriting),
            mcq: records.iter().filter(|r| r.is_mcq()).count(),
            out: inputs.out.clone(),
        };
        print_final_stats(summary.math, summary.reading_writing, summary.mcq, &inputs.out);
        Ok(summary)
    }

    /// 处理已加载的试卷（不导出图片），并执行全局校验
    pub async fn process_documents(&self, documents: Vec<RawDocument>) -> AppResult<Vec<QuestionRecord>> {
        let exporter: Arc<dyn ImageExporter> = match &self.exporter {
            Some(exporter) => exporter.clone(),
            None => Arc::new(NoopImageExporter),
        };
        let documents = self.process_with(documents, exporter).await?;
        Ok(documents.into_iter().flat_map(|d| d.records).collect())
    }

    async fn process_with(
        &self,
        documents: Vec<RawDocument>,
        exporter: Arc<dyn ImageExporter>,
    ) -> AppResult<Vec<DocumentRecords>> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_exports.max(1)));

        let results: Vec<DocumentRecords> = futures::future::join_all(documents.iter().map(|document| {
            process_document(document, exporter.clone(), semaphore.clone(), &self.config)
        }))
        .await;

        validate_completeness(&results, &self.config)?;
        Ok(results)
    }
}
