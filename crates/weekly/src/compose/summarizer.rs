//! Report generation via the summarization API.

use anyhow::{Context, Result};
use std::sync::Arc;

use llm::{ChatMessage, CompletionOptions, CompletionProvider};

use super::groups::TaskGroups;
use crate::notion::WeekWindow;

/// Generates the weekly report document from grouped tasks.
pub struct ReportSummarizer {
    provider: Arc<dyn CompletionProvider>,
    model: String,
}

impl ReportSummarizer {
    /// Create a summarizer for the given provider and model.
    #[must_use]
    pub fn new(provider: Arc<dyn CompletionProvider>, model: String) -> Self {
        Self { provider, model }
    }

    /// Produce the report document for the week.
    ///
    /// An empty task list yields the fixed no-activity document without
    /// calling the API.
    pub async fn summarize(&self, groups: &TaskGroups, window: &WeekWindow) -> Result<String> {
        if groups.is_empty() {
            tracing::info!("No tasks this week, using the no-activity document");
            return Ok(empty_report(window));
        }

        let prompt = format!(
            "Write the weekly report for {window} based on this task list:\n\n{tasks}\n\nProduce a professional weekly summary.",
            window = window.label(),
            tasks = groups.format_for_prompt(),
        );

        let messages = vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)];

        let options = CompletionOptions {
            temperature: Some(0.7),
            max_tokens: Some(1500),
            ..Default::default()
        };

        let completion = self
            .provider
            .complete(&self.model, &messages, &options)
            .await
            .context("summarization request failed")?;

        tracing::debug!(
            model = %completion.model,
            tokens = completion.usage.total_tokens,
            "Report generated"
        );

        Ok(completion.text.trim().to_string())
    }
}

/// Fixed document used when the week has no task activity.
#[must_use]
pub fn empty_report(window: &WeekWindow) -> String {
    format!(
        "## Weekly summary\n\n**Period: {}**\n\nNo task activity was recorded this week.\n",
        window.label()
    )
}

const SYSTEM_PROMPT: &str = r"You are a professional weekly report writer. Given a list of tasks worked on this week, produce a concise, well-organized weekly report.

Requirements:
1. Be concise and highlight the important work
2. Group related items where it reads better
3. For completed tasks, emphasize outcomes
4. For in-progress tasks, state current progress
5. Output markdown with exactly these section headings, in this order:
   ## Completed work
   ## In progress
   ## Next week plan
6. Omit a section entirely if there is nothing to put in it
7. Derive the next-week plan from the in-progress tasks
8. Keep the whole report between 300 and 500 words";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notion::{Task, TaskStatus};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use llm::{Completion, LlmResult, TokenUsage};
    use std::sync::Mutex;

    /// Captures the prompt and returns canned text.
    struct StubProvider {
        last_prompt: Mutex<Option<String>>,
        reply: String,
    }

    impl StubProvider {
        fn new(reply: &str) -> Self {
            Self {
                last_prompt: Mutex::new(None),
                reply: reply.to_string(),
            }
        }
    }

    #[async_trait]
    impl CompletionProvider for StubProvider {
        fn name(&self) -> &'static str {
            "stub"
        }

        fn api_key_env_var(&self) -> &'static str {
            "STUB_API_KEY"
        }

        fn is_configured(&self) -> bool {
            true
        }

        fn supported_models(&self) -> Vec<&str> {
            vec!["stub-model"]
        }

        async fn complete(
            &self,
            _model: &str,
            messages: &[ChatMessage],
            _options: &CompletionOptions,
        ) -> LlmResult<Completion> {
            let user = messages.last().map(|m| m.content.clone());
            *self.last_prompt.lock().unwrap() = user;
            Ok(Completion {
                text: self.reply.clone(),
                usage: TokenUsage::default(),
                model: "stub-model".to_string(),
                provider: "stub".to_string(),
            })
        }
    }

    fn window() -> WeekWindow {
        WeekWindow::containing(NaiveDate::from_ymd_opt(2026, 8, 6).unwrap())
    }

    #[tokio::test]
    async fn test_empty_groups_skip_the_api() {
        let provider = Arc::new(StubProvider::new("should not be used"));
        let summarizer = ReportSummarizer::new(provider.clone(), "stub-model".to_string());

        let report = summarizer
            .summarize(&TaskGroups::default(), &window())
            .await
            .unwrap();

        assert!(report.starts_with("## Weekly summary"));
        assert!(report.contains("No task activity"));
        assert!(provider.last_prompt.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_prompt_contains_only_nonempty_groups() {
        let provider = Arc::new(StubProvider::new("## Completed work\n- Fix bug A"));
        let summarizer = ReportSummarizer::new(provider.clone(), "stub-model".to_string());

        let groups = TaskGroups::partition(vec![Task::new(
            "1".to_string(),
            "Fix bug A".to_string(),
            TaskStatus::Completed,
        )]);

        let report = summarizer.summarize(&groups, &window()).await.unwrap();
        assert_eq!(report, "## Completed work\n- Fix bug A");

        let prompt = provider.last_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.contains("Fix bug A"));
        assert!(prompt.contains("Completed tasks:"));
        assert!(!prompt.contains("In-progress tasks:"));
        assert!(prompt.contains("2026-08-03 ~ 2026-08-09"));
    }
}
