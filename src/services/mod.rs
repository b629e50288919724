pub mod answer;
pub mod choices;
pub mod debug_writer;
pub mod header_locator;
pub mod metadata;
pub mod normalizer;
pub mod record_writer;
pub mod stem;

pub use debug_writer::DebugWriter;
pub use record_writer::RecordWriter;
