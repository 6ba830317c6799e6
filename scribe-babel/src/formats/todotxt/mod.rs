//! Todo.txt task lists
//!
//! One task per non-blank line:
//!
//! ```text
//! x 2024-01-03 (A) 2024-01-01 Call mom +Family @phone due:2024-01-15
//! │ │          │   │          │        │       │      └ key:value pairs
//! │ │          │   │          │        │       └ contexts
//! │ │          │   │          │        └ projects
//! │ │          │   │          └ description
//! │ │          │   └ creation date
//! │ │          └ priority (a single letter, normalized to uppercase)
//! │ └ completion date (only after the done marker)
//! └ done marker
//! ```
//!
//! Dates are compared as `YYYY-MM-DD` strings, so "overdue" is a plain lexicographic
//! comparison against today's date.

use crate::descriptor::{self, FormatDescriptor};
use crate::document::{Metadata, ParseOptions, ParsedDocument};
use crate::format::Parser;
use crate::formats::common::{escape_html, line_finding, split_lines, stylesheet_or_empty};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

static LEADING_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4}-\d{2}-\d{2})\s+").unwrap());
static PRIORITY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\(([A-Za-z])\)\s+").unwrap());
static PROJECT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:^|\s)\+(\S+)").unwrap());
static CONTEXT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:^|\s)@(\S+)").unwrap());
static KEY_VALUE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\w+):(\S+)").unwrap());
static PROJECT_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\+\S+").unwrap());
static CONTEXT_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"@\S+").unwrap());
static ISO_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());
static LOWERCASE_PRIORITY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\([a-z]\)\s").unwrap());

/// A parsed todo.txt line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoTask {
    pub line: String,
    pub done: bool,
    pub priority: Option<char>,
    pub completion_date: Option<String>,
    pub creation_date: Option<String>,
    pub description: String,
    pub projects: Vec<String>,
    pub contexts: Vec<String>,
    pub key_values: BTreeMap<String, String>,
    pub due_date: Option<String>,
}

impl TodoTask {
    /// Due strictly before `today` (both `YYYY-MM-DD`)
    pub fn is_overdue(&self, today: &str) -> bool {
        self.due_date.as_deref().is_some_and(|due| due < today)
    }

    pub fn is_due_today(&self, today: &str) -> bool {
        self.due_date.as_deref() == Some(today)
    }
}

/// Parse one line into a task
pub fn parse_task(line: &str) -> TodoTask {
    let mut rest = line.trim();

    let done = rest.starts_with("x ") || rest.starts_with("X ");
    let mut completion_date = None;
    if done {
        rest = rest[2..].trim_start();
        if let Some(caps) = LEADING_DATE.captures(rest) {
            completion_date = Some(caps[1].to_string());
            rest = &rest[caps[0].len()..];
        }
    }

    let mut priority = None;
    if let Some(caps) = PRIORITY.captures(rest) {
        priority = caps[1].chars().next().map(|c| c.to_ascii_uppercase());
        rest = &rest[caps[0].len()..];
    }

    let mut creation_date = None;
    if let Some(caps) = LEADING_DATE.captures(rest) {
        creation_date = Some(caps[1].to_string());
        rest = &rest[caps[0].len()..];
    }

    let projects = PROJECT
        .captures_iter(line)
        .map(|caps| caps[1].to_string())
        .collect();
    let contexts = CONTEXT
        .captures_iter(line)
        .map(|caps| caps[1].to_string())
        .collect();
    let key_values: BTreeMap<String, String> = KEY_VALUE
        .captures_iter(line)
        .map(|caps| (caps[1].to_string(), caps[2].to_string()))
        .collect();
    let due_date = key_values.get("due").cloned();

    let description = PROJECT_TOKEN.replace_all(rest, "");
    let description = CONTEXT_TOKEN.replace_all(&description, "");
    let description = KEY_VALUE.replace_all(&description, "");
    let description = description.split_whitespace().collect::<Vec<_>>().join(" ");

    TodoTask {
        line: line.to_string(),
        done,
        priority,
        completion_date,
        creation_date,
        description,
        projects,
        contexts,
        key_values,
        due_date,
    }
}

/// Parse every non-blank line
pub fn parse_tasks(content: &str) -> Vec<TodoTask> {
    split_lines(content)
        .into_iter()
        .filter(|line| !line.trim().is_empty())
        .map(parse_task)
        .collect()
}

/// Today's date as `YYYY-MM-DD` in local time
pub fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

/// Parser implementation for todo.txt
#[derive(Debug, Default, Clone, Copy)]
pub struct TodoTxtParser;

impl TodoTxtParser {
    /// Parse against an explicit "today", for deterministic output
    pub fn parse_with_today(&self, content: &str, today: &str) -> ParsedDocument {
        let tasks = parse_tasks(content);
        let completed = tasks.iter().filter(|t| t.done).count();
        let overdue = tasks.iter().filter(|t| t.is_overdue(today)).count();

        let mut metadata = Metadata::new();
        metadata.insert("totalTasks".into(), tasks.len().to_string());
        metadata.insert("completedTasks".into(), completed.to_string());
        metadata.insert("pendingTasks".into(), (tasks.len() - completed).to_string());
        metadata.insert("overdueTasks".into(), overdue.to_string());

        ParsedDocument::new(self.descriptor(), content, render(&tasks, today))
            .with_metadata(metadata)
    }
}

impl Parser for TodoTxtParser {
    fn descriptor(&self) -> &'static FormatDescriptor {
        &descriptor::TODOTXT
    }

    fn parse(&self, content: &str, _options: &ParseOptions) -> ParsedDocument {
        self.parse_with_today(content, &today())
    }

    fn validate(&self, content: &str) -> Vec<String> {
        let mut findings = Vec::new();
        for (index, line) in split_lines(content).into_iter().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let task = parse_task(line);
            if let Some(due) = task.due_date.as_deref() {
                if !ISO_DATE.is_match(due) {
                    findings.push(line_finding(
                        index,
                        format!("Invalid due date '{due}' (expected YYYY-MM-DD)"),
                    ));
                }
            }
            let unmarked = line.trim_start();
            let unmarked = unmarked
                .strip_prefix("x ")
                .or_else(|| unmarked.strip_prefix("X "))
                .unwrap_or(unmarked);
            if LOWERCASE_PRIORITY.is_match(unmarked) {
                findings.push(line_finding(index, "Priority should be an uppercase letter"));
            }
        }
        findings
    }
}

fn render(tasks: &[TodoTask], today: &str) -> String {
    let mut html = String::from("<div class='todotxt'>");
    html.push_str(&stylesheet_or_empty(descriptor::TODOTXT.id, true));

    for task in tasks {
        let mut classes = vec!["task".to_string()];
        if task.done {
            classes.push("done".into());
        }
        if task.is_overdue(today) {
            classes.push("overdue".into());
        }
        if task.is_due_today(today) {
            classes.push("due-today".into());
        }
        if let Some(priority) = task.priority {
            classes.push(format!("priority-{priority}"));
        }

        html.push_str(&format!("<div class='{}'>", classes.join(" ")));
        let checkbox = if task.done { "\u{2611}" } else { "\u{2610}" };
        html.push_str(&format!("<span class='checkbox'>{checkbox}</span> "));
        if let Some(priority) = task.priority {
            html.push_str(&format!("<span class='priority'>({priority})</span> "));
        }
        html.push_str(&format!(
            "<span class='description'>{}</span>",
            escape_html(&task.description)
        ));
        if !task.projects.is_empty() {
            html.push_str(" <span class='projects'>");
            for project in &task.projects {
                html.push_str(&format!("<span class='project'>+{}</span> ", escape_html(project)));
            }
            html.push_str("</span>");
        }
        if !task.contexts.is_empty() {
            html.push_str(" <span class='contexts'>");
            for context in &task.contexts {
                html.push_str(&format!("<span class='context'>@{}</span> ", escape_html(context)));
            }
            html.push_str("</span>");
        }
        if let Some(due) = &task.due_date {
            html.push_str(&format!(" <span class='due-date'>due:{}</span>", escape_html(due)));
        }
        html.push_str("</div>");
    }

    html.push_str("</div>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_task() {
        let task = parse_task("(A) 2023-01-01 Call mom +Family @phone due:2023-01-15");
        assert_eq!(task.priority, Some('A'));
        assert_eq!(task.creation_date.as_deref(), Some("2023-01-01"));
        assert_eq!(task.description, "Call mom");
        assert_eq!(task.projects, vec!["Family"]);
        assert_eq!(task.contexts, vec!["phone"]);
        assert_eq!(task.due_date.as_deref(), Some("2023-01-15"));
        assert!(!task.done);
    }

    #[test]
    fn test_parse_completed_task() {
        let task = parse_task("x 2024-02-02 (b) 2024-02-01 file taxes +home");
        assert!(task.done);
        assert_eq!(task.completion_date.as_deref(), Some("2024-02-02"));
        assert_eq!(task.creation_date.as_deref(), Some("2024-02-01"));
        assert_eq!(task.priority, Some('B'));
        assert_eq!(task.description, "file taxes");
    }

    #[test]
    fn test_overdue_is_lexicographic() {
        let task = parse_task("pay rent due:2024-03-01");
        assert!(task.is_overdue("2024-03-02"));
        assert!(!task.is_overdue("2024-03-01"));
        assert!(task.is_due_today("2024-03-01"));
        assert!(!parse_task("no due date").is_overdue("2999-01-01"));
    }

    #[test]
    fn test_metadata_counts() {
        let content = "x done thing\n(A) late due:2020-01-01\n\nfuture due:2999-01-01\n";
        let doc = TodoTxtParser.parse_with_today(content, "2024-06-01");
        assert_eq!(doc.meta("totalTasks"), Some("3"));
        assert_eq!(doc.meta("completedTasks"), Some("1"));
        assert_eq!(doc.meta("pendingTasks"), Some("2"));
        assert_eq!(doc.meta("overdueTasks"), Some("1"));
        assert!(doc
            .parsed_content
            .contains("<div class='task overdue priority-A'>"));
    }

    #[test]
    fn test_rendering_escapes_description() {
        let doc = TodoTxtParser.parse_with_today("fix <tag> bug @work", "2024-01-01");
        assert!(doc
            .parsed_content
            .contains("<span class='description'>fix &lt;tag&gt; bug</span>"));
        assert!(doc.parsed_content.contains("<span class='context'>@work</span>"));
    }

    #[test]
    fn test_validate() {
        let findings = TodoTxtParser.validate("(a) lower\nok due:2024-01-01\nbad due:tomorrow");
        assert_eq!(
            findings,
            vec![
                "Line 1: Priority should be an uppercase letter",
                "Line 3: Invalid due date 'tomorrow' (expected YYYY-MM-DD)",
            ]
        );
    }
}
