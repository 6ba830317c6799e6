use crate::common::parse_file;
use scribe_babel::formats::todotxt::parse_task;

#[test]
fn full_task_line() {
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
fn overdue_compares_date_strings() {
    let task = parse_task("Pay rent due:2023-01-15");
    assert!(task.is_overdue("2023-01-16"));
    assert!(!task.is_overdue("2023-01-15"));
    assert!(!task.is_overdue("2023-01-14"));
    assert!(!parse_task("No due date").is_overdue("2999-12-31"));
}

#[test]
fn completed_task() {
    let task = parse_task("x 2023-02-01 2023-01-01 Done thing");
    assert!(task.done);
    assert_eq!(task.completion_date.as_deref(), Some("2023-02-01"));
    assert_eq!(task.creation_date.as_deref(), Some("2023-01-01"));
    assert_eq!(task.description, "Done thing");
}

#[test]
fn todo_txt_filename_selects_todotxt() {
    let doc = parse_file("todo.txt", "(B) Write tests\n");
    assert_eq!(doc.format.id, "todotxt");
}
