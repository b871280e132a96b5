//! 展示层：终端输出与网页上传服务

pub mod html;
pub mod server;
pub mod text;

pub use server::{router, serve, ServerState};
pub use text::render_text;
