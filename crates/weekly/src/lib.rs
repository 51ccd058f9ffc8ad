//! Weekly report pipeline for Notion task trackers.
//!
//! This crate provides:
//! - A Notion adapter that queries tasks by status within the current week
//! - GitHub commit enrichment for tasks linked to a repository
//! - AI-powered summarization into a three-section weekly report
//! - Publishing the report back to a Notion database
//! - A weekly scheduler for unattended operation

pub mod compose;
pub mod config;
pub mod github;
pub mod notion;
pub mod pipeline;
pub mod schedule;

// Re-export main types
pub use compose::{ReportSummarizer, TaskGroups};
pub use config::Settings;
pub use github::{Commit, GitHubClient};
pub use notion::{NotionClient, Task, TaskStatus, WeekWindow};
pub use pipeline::{Pipeline, PreviewData, RunOutcome};
pub use schedule::{ScheduleSpec, Scheduler};
