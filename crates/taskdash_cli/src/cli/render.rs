use tabled::settings::Style;
use tabled::{Table, Tabled};
use taskdash_core::config::Palette;
use taskdash_core::model::{CompletedTask, Task};
use time::Weekday;

const BAR_GLYPH: &str = "█";

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "#")]
    number: usize,
    #[tabled(rename = "Task")]
    task: String,
    #[tabled(rename = "Priority")]
    priority: &'static str,
    #[tabled(rename = "Category")]
    category: &'static str,
    #[tabled(rename = "Deadline")]
    deadline: String,
    #[tabled(rename = "Recurring")]
    recurring: &'static str,
}

pub fn task_table(tasks: &[Task]) -> String {
    let rows = tasks.iter().enumerate().map(|(index, task)| TaskRow {
        number: index + 1,
        task: task.task.clone(),
        priority: task.priority.label(),
        category: task.category.label(),
        deadline: task.deadline.clone().unwrap_or_else(|| "-".to_string()),
        recurring: task.recurring.map(|r| r.label()).unwrap_or("-"),
    });

    let mut table = Table::new(rows);
    table.with(Style::sharp());
    table.to_string()
}

/// One-line summary: `Write report 🌀daily [High | Work]`.
pub fn task_line(task: &Task, palette: &Palette) -> String {
    let recurring = task
        .recurring
        .map(|r| format!(" 🌀{}", r.label()))
        .unwrap_or_default();
    format!(
        "{}{} [{} | {}]",
        task.task,
        recurring,
        palette.priority(task.priority),
        task.category
    )
}

pub fn completed_lines(records: &[CompletedTask]) -> Vec<String> {
    records
        .iter()
        .map(|record| format!("- {} ({})", record.label(), record.completed_on))
        .collect()
}

/// Horizontal bar chart, one row per weekday.
pub fn weekday_chart(counts: &[(Weekday, usize)], palette: &Palette) -> String {
    let width = counts
        .iter()
        .map(|(day, _)| day.to_string().len())
        .max()
        .unwrap_or(0);

    counts
        .iter()
        .map(|(day, count)| {
            let bar = palette.accentize(&BAR_GLYPH.repeat(*count));
            format!("{:<width$} | {} {}", day.to_string(), bar, count)
                .trim_end()
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn task_json(number: Option<usize>, task: &Task) -> serde_json::Value {
    let mut value = serde_json::to_value(task).unwrap_or(serde_json::Value::Null);
    if let (Some(number), Some(object)) = (number, value.as_object_mut()) {
        object.insert("number".to_string(), serde_json::json!(number));
    }
    value
}

pub fn chart_json(counts: &[(Weekday, usize)]) -> serde_json::Value {
    serde_json::Value::Array(
        counts
            .iter()
            .map(|(day, count)| serde_json::json!({ "day": day.to_string(), "count": count }))
            .collect(),
    )
}
