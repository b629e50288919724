pub mod document;
pub mod question;
pub mod subject;

pub use document::{Block, RawDocument};
pub use question::{Choice, Difficulty, QuestionRecord};
pub use subject::Subject;
