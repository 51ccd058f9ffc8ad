//! Notion API adapter.
//!
//! Two operations: query the task tracker for this week's records, and
//! create a report page in the report database. Both speak the
//! 2022-06-28 API version.

use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

use super::blocks::markdown_to_blocks;
use super::error::NotionError;
use super::types::{Task, TaskStatus, WeekWindow};

/// Notion API base URL.
const NOTION_BASE_URL: &str = "https://api.notion.com/v1";

/// API version header value.
const NOTION_VERSION: &str = "2022-06-28";

// Property names in the task tracker database.
const PROP_TITLE: &str = "Name";
const PROP_STATUS: &str = "Status";
const PROP_NOTES: &str = "Notes";
const PROP_TYPE: &str = "Type";
const PROP_PRIORITY: &str = "Priority";
const PROP_DUE: &str = "Due date";
const PROP_REPO: &str = "Repository";
const PROP_EDITED: &str = "Last edited";

// Property names in the report database.
const PROP_REPORT_TITLE: &str = "Name";
const PROP_REPORT_DATE: &str = "Date";

/// A report page created in the report database.
#[derive(Debug, Clone)]
pub struct CreatedReport {
    /// Page id.
    pub page_id: String,
    /// Shareable page URL.
    pub url: String,
}

/// Client for the Notion workspace APIs.
pub struct NotionClient {
    client: Client,
    token: String,
    base_url: String,
}

impl NotionClient {
    /// Create a client with the given integration token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            token: token.into(),
            base_url: NOTION_BASE_URL.to_string(),
        }
    }

    /// Set a custom base URL (used by tests).
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Query tasks whose status is in `statuses` and whose last-edited
    /// time falls inside the window.
    ///
    /// An empty status set short-circuits to an empty list without
    /// calling the API. Pagination is followed to exhaustion.
    pub async fn query_week(
        &self,
        database_id: &str,
        window: &WeekWindow,
        statuses: &[TaskStatus],
    ) -> Result<Vec<Task>, NotionError> {
        if statuses.is_empty() {
            tracing::debug!("No statuses enabled, skipping query");
            return Ok(Vec::new());
        }

        let status_filters: Vec<Value> = statuses
            .iter()
            .map(|s| {
                json!({
                    "property": PROP_STATUS,
                    "status": { "equals": s.api_name() },
                })
            })
            .collect();

        let filter = json!({
            "and": [
                { "or": status_filters },
                {
                    "property": PROP_EDITED,
                    "last_edited_time": { "on_or_after": window.start_rfc3339() },
                },
                {
                    "property": PROP_EDITED,
                    "last_edited_time": { "on_or_before": window.end_rfc3339() },
                },
            ]
        });

        let mut tasks = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut body = json!({
                "filter": filter,
                "sorts": [
                    { "property": PROP_EDITED, "direction": "descending" },
                ],
            });
            if let Some(c) = &cursor {
                body["start_cursor"] = json!(c);
            }

            let url = format!("{}/databases/{}/query", self.base_url, database_id);
            let page: Value = self.post(&url, &body).await?;

            let results = page
                .get("results")
                .and_then(Value::as_array)
                .ok_or_else(|| NotionError::Malformed("missing results array".to_string()))?;

            for result in results {
                if let Some(task) = extract_task(result) {
                    // The server already filters on the edited-time
                    // property; drop anything that still slipped out of
                    // the window (e.g. a lagging page-level timestamp).
                    if task.last_edited.is_some_and(|ts| !window.contains(ts)) {
                        continue;
                    }
                    tasks.push(task);
                }
            }

            let has_more = page
                .get("has_more")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            if !has_more {
                break;
            }
            cursor = page
                .get("next_cursor")
                .and_then(Value::as_str)
                .map(String::from);
            if cursor.is_none() {
                break;
            }
        }

        tracing::info!(
            count = tasks.len(),
            window = %window.label(),
            "Fetched weekly tasks"
        );

        Ok(tasks)
    }

    /// Create a report page with the document as its body.
    pub async fn create_report(
        &self,
        database_id: &str,
        window: &WeekWindow,
        content: &str,
    ) -> Result<CreatedReport, NotionError> {
        let title = window.report_title();
        let body = json!({
            "parent": { "database_id": database_id },
            "properties": {
                PROP_REPORT_TITLE: {
                    "title": [ { "text": { "content": title } } ],
                },
                PROP_REPORT_DATE: {
                    "date": {
                        "start": window.start_date(),
                        "end": window.end_date(),
                    },
                },
            },
            "children": markdown_to_blocks(content),
        });

        let url = format!("{}/pages", self.base_url);
        let page: Value = self.post(&url, &body).await?;

        let page_id = page
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| NotionError::Malformed("created page has no id".to_string()))?
            .to_string();

        let page_url = page
            .get("url")
            .and_then(Value::as_str)
            .map_or_else(
                || format!("https://notion.so/{}", page_id.replace('-', "")),
                String::from,
            );

        tracing::info!(page_id = %page_id, "Published report page");

        Ok(CreatedReport {
            page_id,
            url: page_url,
        })
    }

    /// POST a JSON body and parse the JSON response, mapping auth and
    /// API failures to descriptive errors.
    async fn post(&self, url: &str, body: &Value) -> Result<Value, NotionError> {
        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Notion-Version", NOTION_VERSION)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if status == StatusCode::UNAUTHORIZED {
            return Err(NotionError::Auth(text));
        }
        if !status.is_success() {
            return Err(NotionError::Api { status, body: text });
        }

        serde_json::from_str(&text).map_err(|e| NotionError::Malformed(e.to_string()))
    }
}

/// Extract a task from a page object. Returns `None` for pages without
/// a title or with a status outside the enumerated set.
fn extract_task(page: &Value) -> Option<Task> {
    let properties = page.get("properties")?;

    let title = join_plain_text(properties.get(PROP_TITLE)?.get("title")?);
    if title.is_empty() {
        return None;
    }

    let status_name = properties
        .get(PROP_STATUS)?
        .get("status")?
        .get("name")?
        .as_str()?;
    let status = TaskStatus::parse(status_name)?;

    let mut task = Task::new(
        page.get("id")?.as_str()?.to_string(),
        title,
        status,
    );

    task.notes = properties
        .get(PROP_NOTES)
        .and_then(|p| p.get("rich_text"))
        .map(join_plain_text)
        .filter(|s| !s.is_empty());

    task.task_types = properties
        .get(PROP_TYPE)
        .and_then(|p| p.get("multi_select"))
        .and_then(Value::as_array)
        .map(|opts| {
            opts.iter()
                .filter_map(|o| o.get("name").and_then(Value::as_str))
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();

    task.priority = properties
        .get(PROP_PRIORITY)
        .and_then(|p| p.get("select"))
        .and_then(|s| s.get("name"))
        .and_then(Value::as_str)
        .map(String::from);

    task.due_date = properties
        .get(PROP_DUE)
        .and_then(|p| p.get("date"))
        .and_then(|d| d.get("start"))
        .and_then(Value::as_str)
        .map(String::from);

    task.repo_url = properties
        .get(PROP_REPO)
        .and_then(|p| p.get("url"))
        .and_then(Value::as_str)
        .map(String::from);

    // Prefer the dedicated property, fall back to the page timestamp.
    let edited = properties
        .get(PROP_EDITED)
        .and_then(|p| p.get("last_edited_time"))
        .and_then(Value::as_str)
        .or_else(|| page.get("last_edited_time").and_then(Value::as_str));
    task.last_edited = edited
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc));

    Some(task)
}

/// Join the `plain_text` fragments of a rich-text or title array.
fn join_plain_text(value: &Value) -> String {
    value
        .as_array()
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.get("plain_text").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default()
}
