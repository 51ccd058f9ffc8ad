//! Report composition: grouping, prompting, summarization.

mod groups;
mod summarizer;

pub use groups::TaskGroups;
pub use summarizer::{empty_report, ReportSummarizer};
