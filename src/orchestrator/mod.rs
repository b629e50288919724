//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责整个运行的调度和统计，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量处理器
//! - 并发加载两份试卷的文本
//! - 持有图片导出器与并发限制（Semaphore）
//! - 执行全局完整性校验，写出结果
//!
//! ### `paper_processor` - 单份试卷处理器
//! - 切分、去重、截取区块
//! - 创建并复用 QuestionFlow
//! - 为每条记录导出图片
//! - 输出单份试卷的统计信息
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理两份试卷)
//!     ↓
//! paper_processor (处理 Vec<Block>)
//!     ↓
//! workflow::QuestionFlow (处理单个 Block)
//!     ↓
//! services (能力层：metadata / choices / answer / stem)
//!     ↓
//! infrastructure (基础设施：TextSource / ImageExporter)
//! ```

pub mod batch_processor;
pub mod paper_processor;

// 重新导出主要类型
pub use batch_processor::{App, Inputs, RunSummary};
pub use paper_processor::process_document;
