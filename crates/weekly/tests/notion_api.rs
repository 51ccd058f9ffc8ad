//! Integration tests for the Notion adapter against a mock server.

use chrono::{Duration, Utc};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use weekly::notion::{NotionClient, TaskStatus, WeekWindow};

fn page(id: &str, title: &str, status: &str, edited: &str) -> serde_json::Value {
    json!({
        "object": "page",
        "id": id,
        "last_edited_time": edited,
        "properties": {
            "Name": { "type": "title", "title": [ { "plain_text": title } ] },
            "Status": { "type": "status", "status": { "name": status } },
            "Last edited": { "type": "last_edited_time", "last_edited_time": edited },
        }
    })
}

fn in_window(window: &WeekWindow) -> String {
    (window.start.with_timezone(&Utc) + Duration::hours(1)).to_rfc3339()
}

fn before_window(window: &WeekWindow) -> String {
    (window.start.with_timezone(&Utc) - Duration::days(2)).to_rfc3339()
}

#[tokio::test]
async fn query_returns_parsed_tasks() {
    let server = MockServer::start().await;
    let window = WeekWindow::current();
    let edited = in_window(&window);

    Mock::given(method("POST"))
        .and(path("/databases/db-tasks/query"))
        .and(header("Notion-Version", "2022-06-28"))
        .and(header("Authorization", "Bearer secret_abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                page("p1", "Fix bug A", "Done", &edited),
                page("p2", "Feature B", "In progress", &edited),
                page("p3", "Ignored", "Not started", &edited),
            ],
            "has_more": false,
            "next_cursor": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = NotionClient::new("secret_abc").with_base_url(server.uri());
    let tasks = client
        .query_week(
            "db-tasks",
            &window,
            &[TaskStatus::Completed, TaskStatus::InProgress],
        )
        .await
        .unwrap();

    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].title, "Fix bug A");
    assert_eq!(tasks[0].status, TaskStatus::Completed);
    assert_eq!(tasks[1].title, "Feature B");
    assert_eq!(tasks[1].status, TaskStatus::InProgress);
}

#[tokio::test]
async fn query_sends_status_and_window_filter() {
    let server = MockServer::start().await;
    let window = WeekWindow::current();

    Mock::given(method("POST"))
        .and(path("/databases/db-tasks/query"))
        .and(body_partial_json(json!({
            "filter": {
                "and": [
                    { "or": [ { "property": "Status", "status": { "equals": "Done" } } ] },
                    { "property": "Last edited", "last_edited_time": { "on_or_after": window.start_rfc3339() } },
                    { "property": "Last edited", "last_edited_time": { "on_or_before": window.end_rfc3339() } },
                ]
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [], "has_more": false, "next_cursor": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = NotionClient::new("secret_abc").with_base_url(server.uri());
    client
        .query_week("db-tasks", &window, &[TaskStatus::Completed])
        .await
        .unwrap();
}

#[tokio::test]
async fn query_follows_pagination() {
    let server = MockServer::start().await;
    let window = WeekWindow::current();
    let edited = in_window(&window);

    // Second page, requested with the cursor
    Mock::given(method("POST"))
        .and(path("/databases/db-tasks/query"))
        .and(body_partial_json(json!({ "start_cursor": "cursor-2" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [ page("p2", "Feature B", "In progress", &edited) ],
            "has_more": false,
            "next_cursor": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    // First page
    Mock::given(method("POST"))
        .and(path("/databases/db-tasks/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [ page("p1", "Fix bug A", "Done", &edited) ],
            "has_more": true,
            "next_cursor": "cursor-2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = NotionClient::new("secret_abc").with_base_url(server.uri());
    let tasks = client
        .query_week(
            "db-tasks",
            &window,
            &[TaskStatus::Completed, TaskStatus::InProgress],
        )
        .await
        .unwrap();

    assert_eq!(tasks.len(), 2);
}

#[tokio::test]
async fn query_drops_records_outside_the_window() {
    let server = MockServer::start().await;
    let window = WeekWindow::current();

    Mock::given(method("POST"))
        .and(path("/databases/db-tasks/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                page("p1", "This week", "Done", &in_window(&window)),
                page("p2", "Last week", "Done", &before_window(&window)),
            ],
            "has_more": false,
            "next_cursor": null
        })))
        .mount(&server)
        .await;

    let client = NotionClient::new("secret_abc").with_base_url(server.uri());
    let tasks = client
        .query_week("db-tasks", &window, &[TaskStatus::Completed])
        .await
        .unwrap();

    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "This week");
}

#[tokio::test]
async fn empty_status_set_skips_the_api() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let client = NotionClient::new("secret_abc").with_base_url(server.uri());
    let tasks = client
        .query_week("db-tasks", &WeekWindow::current(), &[])
        .await
        .unwrap();

    assert!(tasks.is_empty());
}

#[tokio::test]
async fn unauthorized_is_an_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "object": "error", "status": 401, "code": "unauthorized",
            "message": "API token is invalid."
        })))
        .mount(&server)
        .await;

    let client = NotionClient::new("bad-token").with_base_url(server.uri());
    let err = client
        .query_week("db-tasks", &WeekWindow::current(), &[TaskStatus::Completed])
        .await
        .unwrap_err();

    assert!(err.to_string().contains("authentication failed"));
}

#[tokio::test]
async fn create_report_posts_title_and_blocks() {
    let server = MockServer::start().await;
    let window = WeekWindow::current();

    Mock::given(method("POST"))
        .and(path("/pages"))
        .and(body_partial_json(json!({
            "parent": { "database_id": "db-reports" },
            "properties": {
                "Name": { "title": [ { "text": { "content": window.report_title() } } ] },
                "Date": { "date": { "start": window.start_date(), "end": window.end_date() } },
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "page",
            "id": "report-page-1",
            "url": "https://notion.so/reportpage1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = NotionClient::new("secret_abc").with_base_url(server.uri());
    let created = client
        .create_report("db-reports", &window, "## Completed work\n- Fix bug A")
        .await
        .unwrap();

    assert_eq!(created.page_id, "report-page-1");
    assert_eq!(created.url, "https://notion.so/reportpage1");

    // The markdown body went out as blocks
    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let children = body["children"].as_array().unwrap();
    assert_eq!(children[0]["type"], "heading_2");
    assert_eq!(
        children[1]["bulleted_list_item"]["rich_text"][0]["text"]["content"],
        "Fix bug A"
    );
}
