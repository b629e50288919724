//! 图片导出 - 基础设施层
//!
//! 按题目的页码范围导出页面中的嵌入图片，返回可写入记录的图片引用。
//! 导出是阻塞操作，调用方负责放到 blocking 线程并限制并发。

use crate::error::ExportError;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, warn};

/// 图片导出能力
pub trait ImageExporter: Send + Sync {
    /// 导出 `pages` 上的图片，返回 `/<media_root>/<id>/fig<n>.png` 形式的引用
    fn export(&self, source: &Path, id: &str, pages: &[u32]) -> Result<Vec<String>, ExportError>;
}

/// 不导出任何图片
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopImageExporter;

impl ImageExporter for NoopImageExporter {
    fn export(&self, _source: &Path, _id: &str, _pages: &[u32]) -> Result<Vec<String>, ExportError> {
        Ok(Vec::new())
    }
}

/// 基于 `pdfimages` 的导出器
#[derive(Debug, Clone)]
pub struct PdfImagesExporter {
    bin: String,
    image_dir: PathBuf,
    media_root: String,
}

impl PdfImagesExporter {
    pub fn new(bin: impl Into<String>, image_dir: impl Into<PathBuf>, media_root: impl Into<String>) -> Self {
        Self {
            bin: bin.into(),
            image_dir: image_dir.into(),
            media_root: media_root.into(),
        }
    }

    /// 图片引用路径
    pub fn reference(&self, id: &str, n: usize) -> String {
        format!("/{}/{}/fig{}.png", self.media_root.trim_matches('/'), id, n)
    }

    fn run_page(&self, source: &Path, page: u32, prefix: &Path) -> Result<(), ExportError> {
        let page_arg = page.to_string();
        let output = Command::new(&self.bin)
            .arg("-png")
            .args(["-f", page_arg.as_str(), "-l", page_arg.as_str()])
            .arg(source)
            .arg(prefix)
            .output()
            .map_err(|e| ExportError::Command {
                program: self.bin.clone(),
                page,
                message: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(ExportError::Command {
                program: self.bin.clone(),
                page,
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

impl ImageExporter for PdfImagesExporter {
    fn export(&self, source: &Path, id: &str, pages: &[u32]) -> Result<Vec<String>, ExportError> {
        let is_pdf = source
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        if !is_pdf || pages.is_empty() {
            return Ok(Vec::new());
        }

        fs::create_dir_all(&self.image_dir).map_err(|source| ExportError::CreateDir {
            path: self.image_dir.display().to_string(),
            source,
        })?;
        // 每次导出独立的临时目录，离开作用域时删除
        let staging = tempfile::Builder::new()
            .prefix(&format!(".staging-{}-", id))
            .tempdir_in(&self.image_dir)
            .map_err(|source| ExportError::CreateDir {
                path: self.image_dir.display().to_string(),
                source,
            })?;
        for (idx, page) in pages.iter().enumerate() {
            let prefix = staging.path().join(format!("p{:03}", idx));
            self.run_page(source, *page, &prefix)?;
        }

        let mut produced: Vec<PathBuf> = fs::read_dir(staging.path())
            .map_err(|source| ExportError::Move {
                path: staging.path().display().to_string(),
                source,
            })?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "png"))
            .collect();
        if produced.is_empty() {
            return Ok(Vec::new());
        }
        // 前缀带页序号，文件名排序即页面顺序
        produced.sort();

        let target_dir = self.image_dir.join(id);
        fs::create_dir_all(&target_dir).map_err(|source| ExportError::CreateDir {
            path: target_dir.display().to_string(),
            source,
        })?;

        let mut refs = Vec::with_capacity(produced.len());
        for (idx, path) in produced.iter().enumerate() {
            let n = idx + 1;
            let target = target_dir.join(format!("fig{}.png", n));
            move_file(path, &target)?;
            refs.push(self.reference(id, n));
        }
        debug!("[{}] 导出 {} 张图片", id, refs.len());
        if let Err(e) = staging.close() {
            warn!("[{}] ⚠️ 临时目录清理失败: {}", id, e);
        }
        Ok(refs)
    }
}

fn move_file(from: &Path, to: &Path) -> Result<(), ExportError> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    // 跨文件系统时 rename 会失败
    fs::copy(from, to)
        .map(|_| ())
        .map_err(|source| ExportError::Move {
            path: to.display().to_string(),
            source,
        })
}
