//! Status grouping and prompt formatting.

use crate::notion::{Task, TaskStatus};

/// Commit lines shown per task in the prompt.
const MAX_COMMITS_PER_TASK: usize = 5;

/// Tasks partitioned by status. Every task lands in exactly one group.
#[derive(Debug, Clone, Default)]
pub struct TaskGroups {
    /// Tasks finished during the week.
    pub completed: Vec<Task>,
    /// Tasks still underway.
    pub in_progress: Vec<Task>,
}

impl TaskGroups {
    /// Partition a task list by status.
    #[must_use]
    pub fn partition(tasks: Vec<Task>) -> Self {
        let mut groups = Self::default();
        for task in tasks {
            match task.status {
                TaskStatus::Completed => groups.completed.push(task),
                TaskStatus::InProgress => groups.in_progress.push(task),
            }
        }
        groups
    }

    /// Whether both groups are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.completed.is_empty() && self.in_progress.is_empty()
    }

    /// Total task count across both groups.
    #[must_use]
    pub fn total(&self) -> usize {
        self.completed.len() + self.in_progress.len()
    }

    /// Render both groups as plain text for the summarization prompt.
    /// An empty group contributes nothing, not an empty header.
    #[must_use]
    pub fn format_for_prompt(&self) -> String {
        let mut lines: Vec<String> = Vec::new();

        if !self.completed.is_empty() {
            lines.push("Completed tasks:".to_string());
            for task in &self.completed {
                lines.push(format_task_line(task, false));
                lines.extend(format_commit_lines(task));
            }
            lines.push(String::new());
        }

        if !self.in_progress.is_empty() {
            lines.push("In-progress tasks:".to_string());
            for task in &self.in_progress {
                lines.push(format_task_line(task, true));
                lines.extend(format_commit_lines(task));
            }
        }

        lines.join("\n").trim_end().to_string()
    }
}

/// One prompt line per task: title, notes, labels. Due dates only
/// matter for work that is still open.
fn format_task_line(task: &Task, with_due: bool) -> String {
    let mut line = format!("- {}", task.title);

    if let Some(notes) = &task.notes {
        line.push_str(&format!(" ({notes})"));
    }
    if !task.task_types.is_empty() {
        line.push_str(&format!(" [type: {}]", task.task_types.join(", ")));
    }
    if let Some(priority) = &task.priority {
        line.push_str(&format!(" [priority: {priority}]"));
    }
    if with_due {
        if let Some(due) = &task.due_date {
            line.push_str(&format!(" [due: {due}]"));
        }
    }

    line
}

fn format_commit_lines(task: &Task) -> Vec<String> {
    let mut lines = Vec::new();
    if task.commits.is_empty() {
        return lines;
    }

    lines.push(format!("  commits this week ({}):", task.commits.len()));
    for commit in task.commits.iter().take(MAX_COMMITS_PER_TASK) {
        lines.push(format!("    {} {}", commit.sha, commit.message));
    }
    if task.commits.len() > MAX_COMMITS_PER_TASK {
        lines.push(format!(
            "    ... and {} more",
            task.commits.len() - MAX_COMMITS_PER_TASK
        ));
    }
    lines
}
