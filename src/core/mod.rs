mod outcome;
mod report;
mod session;
mod todo;

pub use outcome::{TestOutcome, TestStatus};
pub use report::{ReportSummary, TestReport};
pub use session::Session;
pub use todo::{Todo, TodoFilter, TodoId, TodoStats};
pub(crate) use todo::normalize_text;
