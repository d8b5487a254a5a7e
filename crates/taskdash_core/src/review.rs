use crate::calendar;
use crate::error::AppError;
use crate::model::CompletedTask;
use time::{Date, Duration, Weekday};

pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Monday,
    Weekday::Tuesday,
    Weekday::Wednesday,
    Weekday::Thursday,
    Weekday::Friday,
    Weekday::Saturday,
    Weekday::Sunday,
];

/// Completed records dated within `[today - 6 days, today]`, in file order.
pub fn completed_this_week(
    completed: &[CompletedTask],
    today: Date,
) -> Result<Vec<CompletedTask>, AppError> {
    let week_start = today - Duration::days(6);
    let mut recent = Vec::new();
    for record in completed {
        let completed_on = completed_on_date(record)?;
        if completed_on >= week_start && completed_on <= today {
            recent.push(record.clone());
        }
    }

    Ok(recent)
}

/// Completion counts per weekday, Monday first, zero-filled.
pub fn weekday_counts(records: &[CompletedTask]) -> Result<[(Weekday, usize); 7], AppError> {
    let mut counts = WEEKDAYS.map(|day| (day, 0));
    for record in records {
        let weekday = completed_on_date(record)?.weekday();
        let slot = weekday.number_days_from_monday() as usize;
        counts[slot].1 += 1;
    }

    Ok(counts)
}

fn completed_on_date(record: &CompletedTask) -> Result<Date, AppError> {
    calendar::parse_iso_date(&record.completed_on).map_err(|_| {
        AppError::invalid_data(format!(
            "completed_on must be YYYY-MM-DD for task '{}'",
            record.label()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::{completed_this_week, weekday_counts};
    use crate::model::{Category, CompletedTask, Priority, Task};
    use time::{Date, Month, Weekday};

    fn record(label: &str, completed_on: &str) -> CompletedTask {
        CompletedTask {
            task: Task {
                task: label.to_string(),
                category: Category::Work,
                priority: Priority::Low,
                deadline: None,
                recurring: None,
                subtasks: Vec::new(),
                reasoning: String::new(),
            },
            completed_on: completed_on.to_string(),
        }
    }

    fn today() -> Date {
        // Saturday
        Date::from_calendar_date(2025, Month::December, 20).unwrap()
    }

    #[test]
    fn week_window_is_inclusive_of_both_ends() {
        let completed = vec![
            record("too old", "2025-12-13"),
            record("first day", "2025-12-14"),
            record("middle", "2025-12-17"),
            record("today", "2025-12-20"),
            record("future", "2025-12-21"),
        ];

        let recent = completed_this_week(&completed, today()).unwrap();
        let labels: Vec<&str> = recent.iter().map(CompletedTask::label).collect();

        assert_eq!(labels, vec!["first day", "middle", "today"]);
    }

    #[test]
    fn week_window_rejects_unparseable_dates() {
        let completed = vec![record("bad", "yesterday")];
        let err = completed_this_week(&completed, today()).unwrap_err();
        assert_eq!(err.code(), "invalid_data");
    }

    #[test]
    fn weekday_counts_are_monday_first_and_zero_filled() {
        let records = vec![
            record("a", "2025-12-15"),
            record("b", "2025-12-15"),
            record("c", "2025-12-20"),
        ];

        let counts = weekday_counts(&records).unwrap();

        assert_eq!(counts[0], (Weekday::Monday, 2));
        assert_eq!(counts[1], (Weekday::Tuesday, 0));
        assert_eq!(counts[5], (Weekday::Saturday, 1));
        assert_eq!(counts[6], (Weekday::Sunday, 0));
        assert_eq!(counts.iter().map(|(_, n)| n).sum::<usize>(), records.len());
    }
}
