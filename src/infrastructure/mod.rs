pub mod image_exporter;
pub mod text_source;

pub use image_exporter::{ImageExporter, NoopImageExporter, PdfImagesExporter};
pub use text_source::TextSource;
