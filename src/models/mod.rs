pub mod document;
pub mod question;
pub mod report;

pub use document::{Document, DocumentFormat};
pub use question::{AltLabel, Alternative, DropReason, DroppedBlock, Exam, Question};
pub use report::{Finding, Report, ReviewStatus};
