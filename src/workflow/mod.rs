pub mod block_ctx;
pub mod question_flow;
pub mod validator;

pub use block_ctx::BlockCtx;
pub use question_flow::QuestionFlow;
pub use validator::{validate_completeness, DocumentRecords};
