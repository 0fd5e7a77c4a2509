pub mod progress;
pub mod upload_ctx;
pub mod upload_flow;

pub use progress::{LogProgress, ProgressSink, UploadProgress, UploadStage};
pub use upload_ctx::UploadCtx;
pub use upload_flow::UploadFlow;
