//! Report pipeline - orchestrates the fetch-enrich-compose-publish flow.

use anyhow::{Context, Result};
use std::sync::Arc;

use llm::{AnthropicProvider, CompletionProvider, DeepSeekProvider, ProviderRegistry};

use crate::compose::{ReportSummarizer, TaskGroups};
use crate::config::{LlmConfig, Settings};
use crate::github::GitHubClient;
use crate::notion::{CreatedReport, NotionClient, Task, TaskStatus, WeekWindow};

/// Fetch result shown by preview mode.
#[derive(Debug)]
pub struct PreviewData {
    /// The week being reported on.
    pub window: WeekWindow,
    /// Tasks grouped by status.
    pub groups: TaskGroups,
}

/// Result of a full pipeline run.
#[derive(Debug)]
pub struct RunOutcome {
    /// Report title.
    pub title: String,
    /// The week being reported on.
    pub window: WeekWindow,
    /// Completed task count.
    pub completed: usize,
    /// In-progress task count.
    pub in_progress: usize,
    /// The composed document, when composition ran.
    pub content: Option<String>,
    /// The published page, when publishing ran.
    pub page: Option<CreatedReport>,
}

impl RunOutcome {
    /// Total task count.
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.completed + self.in_progress
    }

    /// Whether a page was written to Notion.
    #[must_use]
    pub fn published(&self) -> bool {
        self.page.is_some()
    }
}

/// Weekly report pipeline.
///
/// Strictly linear: fetch must complete before compose, compose before
/// publish. One instance handles one run at a time.
pub struct Pipeline {
    settings: Settings,
    notion: NotionClient,
    github: Option<GitHubClient>,
    provider: Arc<dyn CompletionProvider>,
}

impl Pipeline {
    /// Build a pipeline from settings, resolving the summarization
    /// provider from the configured model.
    pub fn from_settings(settings: Settings) -> Result<Self> {
        let notion = NotionClient::new(&settings.notion.token);
        let github = settings
            .github
            .enabled
            .then(|| GitHubClient::new(settings.github.token.clone()));

        let registry = build_registry(&settings.llm);
        let provider = registry
            .require_for_model(&settings.llm.model)
            .with_context(|| {
                format!(
                    "providers available: {}",
                    registry.provider_names().join(", ")
                )
            })?;

        Ok(Self {
            settings,
            notion,
            github,
            provider,
        })
    }

    /// Build a pipeline with explicit clients (used by tests).
    #[must_use]
    pub fn new(
        settings: Settings,
        notion: NotionClient,
        github: Option<GitHubClient>,
        provider: Arc<dyn CompletionProvider>,
    ) -> Self {
        Self {
            settings,
            notion,
            github,
            provider,
        }
    }

    /// Fetch and enrich this week's tasks without composing a report.
    pub async fn preview(&self) -> Result<PreviewData> {
        let (window, tasks) = self.fetch_tasks().await?;
        Ok(PreviewData {
            window,
            groups: TaskGroups::partition(tasks),
        })
    }

    /// Run the full pipeline once: fetch, enrich, compose, publish.
    pub async fn run(&self) -> Result<RunOutcome> {
        let (window, tasks) = self.fetch_tasks().await?;
        let groups = TaskGroups::partition(tasks);

        tracing::info!(
            completed = groups.completed.len(),
            in_progress = groups.in_progress.len(),
            window = %window.label(),
            "Fetched tasks"
        );

        let mut outcome = RunOutcome {
            title: window.report_title(),
            window,
            completed: groups.completed.len(),
            in_progress: groups.in_progress.len(),
            content: None,
            page: None,
        };

        if groups.is_empty() && !self.settings.report.publish_when_empty {
            tracing::info!("No tasks this week and publish_when_empty is off, skipping publish");
            return Ok(outcome);
        }

        let summarizer =
            ReportSummarizer::new(self.provider.clone(), self.settings.llm.model.clone());
        let content = summarizer.summarize(&groups, &window).await?;

        let page = self
            .notion
            .create_report(&self.settings.notion.report_database_id, &window, &content)
            .await
            .context("failed to publish report")?;

        tracing::info!(url = %page.url, "Report published");

        outcome.content = Some(content);
        outcome.page = Some(page);
        Ok(outcome)
    }

    /// The statuses enabled by the inclusion flags.
    fn enabled_statuses(&self) -> Vec<TaskStatus> {
        let mut statuses = Vec::new();
        if self.settings.report.include_completed {
            statuses.push(TaskStatus::Completed);
        }
        if self.settings.report.include_in_progress {
            statuses.push(TaskStatus::InProgress);
        }
        statuses
    }

    async fn fetch_tasks(&self) -> Result<(WeekWindow, Vec<Task>)> {
        let window = WeekWindow::current();

        let mut tasks = self
            .notion
            .query_week(
                &self.settings.notion.task_database_id,
                &window,
                &self.enabled_statuses(),
            )
            .await
            .context("failed to fetch tasks")?;

        if let Some(github) = &self.github {
            for task in &mut tasks {
                if let Some(repo_url) = task.repo_url.clone() {
                    task.commits = github.commits_in_window(&repo_url, &window).await;
                    if !task.commits.is_empty() {
                        tracing::debug!(
                            task = %task.title,
                            commits = task.commits.len(),
                            "Enriched with commits"
                        );
                    }
                }
            }
        }

        Ok((window, tasks))
    }
}

/// Register the providers reachable from configuration: DeepSeek from
/// the config key/base URL, Anthropic from its environment variable.
fn build_registry(llm: &LlmConfig) -> ProviderRegistry {
    let registry = ProviderRegistry::new();
    registry.register(Arc::new(
        DeepSeekProvider::new(llm.api_key.clone()).with_base_url(llm.base_url.clone()),
    ));
    registry.register(Arc::new(AnthropicProvider::from_env()));
    registry
}
