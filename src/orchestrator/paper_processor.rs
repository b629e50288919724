//! 单份试卷处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块负责处理单份试卷的所有区块，是试卷级别的编排器。
//!
//! ## 核心功能
//!
//! 1. **切分区块**：定位题头，按 ID 去重并截取前 N 个
//! 2. **流程调度**：创建并复用 `QuestionFlow`，按顺序组装记录
//! 3. **图片导出**：有限并发地导出图片，失败时该题图片为空
//! 4. **统计输出**：记录题目数量与四选项题数量

use crate::config::Config;
use crate::infrastructure::ImageExporter;
use crate::models::{QuestionRecord, RawDocument};
use crate::services::debug_writer::BlockBounds;
use crate::services::header_locator::{first_ids, segment, select_blocks};
use crate::utils::logging::{log_blocks_selected, log_document_complete};
use crate::workflow::{BlockCtx, DocumentRecords, QuestionFlow};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::warn;

/// 诊断中列出的题头 ID 数量
const DIAGNOSTIC_IDS: usize = 5;

/// 处理单份试卷
///
/// # 参数
/// - `document`: 试卷文本
/// - `exporter`: 图片导出能力
/// - `semaphore`: 图片导出并发限制（两份试卷共用）
/// - `config`: 配置
pub async fn process_document(
    document: &RawDocument,
    exporter: Arc<dyn ImageExporter>,
    semaphore: Arc<Semaphore>,
    config: &Config,
) -> DocumentRecords {
    let subject = document.subject;
    let blocks = segment(document);
    if blocks.is_empty() && !document.text.is_empty() {
        warn!("[{}] ⚠️ 未找到任何题头", subject.short_name());
    }
    let anchors = blocks.len();
    let blocks = select_blocks(blocks, config.expected_per_test);
    log_blocks_selected(subject, anchors, blocks.len());

    // 创建流程对象（只创建一次，复用）
    let flow = QuestionFlow::new(config);

    if let Some(writer) = flow.debug_writer() {
        let bounds: Vec<BlockBounds> = blocks
            .iter()
            .map(|b| BlockBounds {
                id: b.id.clone(),
                start: b.start,
                end: b.end,
                pages: b.pages.clone(),
            })
            .collect();
        if let Err(e) = writer.write_bounds(subject.name(), &bounds) {
            warn!("[{}] ⚠️ 区块边界写入失败: {}", subject.short_name(), e);
        }
    }

    let records: Vec<QuestionRecord> = blocks
        .iter()
        .enumerate()
        .map(|(index, block)| {
            let ctx = BlockCtx::new(subject, index + 1, block.id.clone());
            flow.run(document, block, &ctx)
        })
        .collect();

    let records = attach_images(records, document, exporter, semaphore).await;

    let mcq = records.iter().filter(|r| r.is_mcq()).count();
    log_document_complete(subject, records.len(), mcq);

    DocumentRecords {
        subject,
        records,
        first_ids: first_ids(&document.text, DIAGNOSTIC_IDS),
    }
}

/// 为每条记录导出图片
///
/// 导出任务并发执行，但按记录顺序等待，输出顺序不变。
async fn attach_images(
    records: Vec<QuestionRecord>,
    document: &RawDocument,
    exporter: Arc<dyn ImageExporter>,
    semaphore: Arc<Semaphore>,
) -> Vec<QuestionRecord> {
    let handles: Vec<_> = records
        .iter()
        .map(|record| {
            let exporter = exporter.clone();
            let semaphore = semaphore.clone();
            let source = document.source_path.clone();
            let id = record.id.clone();
            let pages = record.pages.clone();
            tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                tokio::task::spawn_blocking(move || exporter.export(&source, &id, &pages)).await
            })
        })
        .collect();

    let mut out = Vec::with_capacity(records.len());
    for (mut record, handle) in records.into_iter().zip(handles) {
        record.images = match handle.await {
            Ok(Ok(Ok(images))) => images,
            Ok(Ok(Err(e))) => {
                warn!("[{}] ⚠️ 图片导出失败: {}", record.id, e);
                Vec::new()
            }
            Ok(Err(e)) | Err(e) => {
                warn!("[{}] ⚠️ 图片导出任务失败: {}", record.id, e);
                Vec::new()
            }
        };
        out.push(record);
    }
    out
}
