//! # CB Question Extract
//!
//! 从 Math 与 Reading and Writing 两份试卷中提取结构化题目记录
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 与外部命令和文件系统打交道，只暴露能力
//! - `TextSource` - 文本提取（pdftotext → pdf-extract → 空文档）
//! - `ImageExporter` - 按页导出图片（pdfimages）
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个区块
//! - `normalizer` / `header_locator` - 文本规范化与区块切分
//! - `metadata` / `choices` / `answer` / `stem` - 字段提取
//! - `RecordWriter` / `DebugWriter` - 写结果与调试文件
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个区块"的完整处理流程
//! - `BlockCtx` - 上下文封装（科目 + 区块序号 + ID）
//! - `QuestionFlow` - 流程编排（元数据 → 答案 → 选项 → 题干）
//! - `validator` - 全局完整性校验
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 两份试卷的加载、校验与写出
//! - `orchestrator/paper_processor` - 单份试卷处理器，遍历区块列表
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{ImageExporter, TextSource};
pub use models::{Block, Choice, Difficulty, QuestionRecord, RawDocument, Subject};
pub use orchestrator::{App, Inputs, RunSummary};
pub use workflow::{BlockCtx, QuestionFlow};
