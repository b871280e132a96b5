pub mod review_ctx;
pub mod review_flow;

pub use review_ctx::{ReviewCtx, ReviewOptions};
pub use review_flow::ReviewFlow;
