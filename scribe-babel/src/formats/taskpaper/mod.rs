//! TaskPaper outlines
//!
//! Every non-blank line is one item:
//!
//! | Line shape                 | Item    |
//! |----------------------------|---------|
//! | `- text` (after tabs)      | Task    |
//! | `text:` (after tabs)       | Project |
//! | anything else              | Note    |
//!
//! Indentation is the number of leading tab characters; spaces do not count. Tags are
//! `@name` or `@name(value)`. `@done` marks a task complete, `@today` flags it for today and
//! `@due(value)` carries a due date.

use crate::descriptor::{self, FormatDescriptor};
use crate::document::{Metadata, ParseOptions, ParsedDocument};
use crate::format::Parser;
use crate::formats::common::{
    escape_html, line_finding, split_lines, stylesheet_or_empty, InlineSpans,
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"@(\w+)(?:\(([^)]*)\))?").unwrap());
static UNCLOSED_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"@(\w+)\([^)]*$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Project,
    Task,
    Note,
    Empty,
}

/// One line of a TaskPaper document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskpaperItem {
    pub kind: ItemKind,
    /// Text without indentation and without the `- ` task marker
    pub content: String,
    pub indent: usize,
    /// One-based
    pub line_number: usize,
    pub tags: BTreeMap<String, String>,
}

impl TaskpaperItem {
    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.contains_key(name)
    }

    pub fn is_done(&self) -> bool {
        self.has_tag("done")
    }

    pub fn is_today(&self) -> bool {
        self.has_tag("today")
    }

    pub fn due_date(&self) -> Option<&str> {
        self.tags.get("due").map(String::as_str)
    }
}

/// Split a document into items, one per line
pub fn parse_items(content: &str) -> Vec<TaskpaperItem> {
    split_lines(content)
        .into_iter()
        .enumerate()
        .map(|(index, line)| parse_item(line, index + 1))
        .collect()
}

fn parse_item(line: &str, line_number: usize) -> TaskpaperItem {
    if line.trim().is_empty() {
        return TaskpaperItem {
            kind: ItemKind::Empty,
            content: String::new(),
            indent: 0,
            line_number,
            tags: BTreeMap::new(),
        };
    }

    let indent = line.chars().take_while(|c| *c == '\t').count();
    let trimmed = line.trim_start();
    let (kind, content) = if let Some(task) = trimmed.strip_prefix("- ") {
        (ItemKind::Task, task)
    } else if trimmed.trim_end().ends_with(':') {
        (ItemKind::Project, trimmed)
    } else {
        (ItemKind::Note, trimmed)
    };

    let tags = TAG
        .captures_iter(content)
        .map(|caps| {
            let value = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            (caps[1].to_string(), value.to_string())
        })
        .collect();

    TaskpaperItem {
        kind,
        content: content.to_string(),
        indent,
        line_number,
        tags,
    }
}

/// Parser implementation for TaskPaper
#[derive(Debug, Default, Clone, Copy)]
pub struct TaskpaperParser;

impl Parser for TaskpaperParser {
    fn descriptor(&self) -> &'static FormatDescriptor {
        &descriptor::TASKPAPER
    }

    fn parse(&self, content: &str, options: &ParseOptions) -> ParsedDocument {
        let items = parse_items(content);
        let count = |pred: &dyn Fn(&TaskpaperItem) -> bool| {
            items.iter().filter(|item| pred(item)).count().to_string()
        };
        let is_task = |item: &TaskpaperItem| item.kind == ItemKind::Task;

        let mut metadata = Metadata::new();
        metadata.insert("extension".into(), options.extension_or_empty());
        metadata.insert("lines".into(), items.len().to_string());
        metadata.insert("projects".into(), count(&|i| i.kind == ItemKind::Project));
        metadata.insert("tasks".into(), count(&is_task));
        metadata.insert("notes".into(), count(&|i| i.kind == ItemKind::Note));
        metadata.insert("doneTasks".into(), count(&|i| is_task(i) && i.is_done()));
        metadata.insert("todayTasks".into(), count(&|i| is_task(i) && i.is_today()));

        ParsedDocument::new(self.descriptor(), content, render(&items)).with_metadata(metadata)
    }

    fn validate(&self, content: &str) -> Vec<String> {
        let mut findings = Vec::new();
        for (index, line) in split_lines(content).into_iter().enumerate() {
            let trimmed = line.trim_start();
            if trimmed.starts_with('-') && !trimmed.starts_with("- ") {
                findings.push(line_finding(
                    index,
                    "Task marker should be '- ' (hyphen followed by space)",
                ));
            }
            if UNCLOSED_TAG.is_match(trimmed) {
                findings.push(line_finding(index, "Unclosed tag parameter"));
            }
        }
        findings
    }
}

fn render(items: &[TaskpaperItem]) -> String {
    let mut html = String::from("<div class='taskpaper'>");
    html.push_str(&stylesheet_or_empty(descriptor::TASKPAPER.id, true));

    for item in items {
        let class = match item.kind {
            ItemKind::Empty => {
                html.push_str("<br>");
                continue;
            }
            ItemKind::Project => "taskpaper-project",
            ItemKind::Task if item.is_done() => "taskpaper-task-done",
            ItemKind::Task => "taskpaper-task",
            ItemKind::Note => "taskpaper-note",
        };
        let body = match item.kind {
            ItemKind::Task => format!("- {}", highlight_tags(&item.content)),
            ItemKind::Project => highlight_tags(&item.content),
            _ => escape_html(&item.content),
        };
        if item.indent > 0 {
            html.push_str(&format!(
                "<span class='{class}' style='margin-left: {}em'>{body}</span>",
                item.indent * 2
            ));
        } else {
            html.push_str(&format!("<span class='{class}'>{body}</span>"));
        }
    }

    html.push_str("</div>");
    html
}

#[derive(Debug, Clone, Copy)]
struct Tag;

fn highlight_tags(content: &str) -> String {
    let (mut spans, text) = InlineSpans::protect(content);
    let text = spans.extract(&text, &TAG, Tag);
    spans.restore(&escape_html(&text), |span| {
        let class = match span.group(1) {
            "done" => "taskpaper-tag-done",
            "today" => "taskpaper-tag-today",
            _ => "taskpaper-tag",
        };
        format!("<span class='{class}'>{}</span>", escape_html(span.group(0)))
    })
}
