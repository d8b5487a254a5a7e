use crate::calendar;
use crate::error::AppError;
use crate::model::{CompletedTask, NewTask, Task};
use crate::storage::json_store::{self, StorePaths, TaskState};
use std::collections::HashSet;
use time::Date;

pub const MANUAL_REASONING: &str = "User entered manually";

/// Active and completed task lists for one session, written back to the
/// store after every mutation.
#[derive(Debug)]
pub struct TaskRepository {
    paths: StorePaths,
    state: TaskState,
}

impl TaskRepository {
    pub fn open(paths: StorePaths) -> Result<Self, AppError> {
        let state = json_store::load_state(&paths)?;
        Ok(Self { paths, state })
    }

    pub fn paths(&self) -> &StorePaths {
        &self.paths
    }

    pub fn tasks(&self) -> &[Task] {
        &self.state.tasks
    }

    pub fn completed(&self) -> &[CompletedTask] {
        &self.state.completed
    }

    pub fn get(&self, index: usize) -> Result<&Task, AppError> {
        self.state
            .tasks
            .get(index)
            .ok_or_else(|| AppError::invalid_input("task index out of range"))
    }

    pub fn add(&mut self, new_task: NewTask) -> Result<Task, AppError> {
        let trimmed = new_task.task.trim();
        if trimmed.is_empty() {
            return Err(AppError::invalid_input("task is required"));
        }

        let deadline = match new_task.deadline.as_deref().map(str::trim) {
            Some("") | None => None,
            Some(value) => Some(calendar::format_iso_date(calendar::parse_iso_date(value)?)?),
        };

        let task = Task {
            task: trimmed.to_string(),
            category: new_task.category,
            priority: new_task.priority,
            deadline,
            recurring: new_task.recurring,
            subtasks: Vec::new(),
            reasoning: MANUAL_REASONING.to_string(),
        };

        let mut next = self.state.clone();
        next.tasks.push(task.clone());
        self.commit(next)?;
        tracing::info!(task = %task.task, "added task");

        Ok(task)
    }

    pub fn complete(&mut self, index: usize) -> Result<CompletedTask, AppError> {
        self.complete_on(index, calendar::today())
    }

    /// Marks the task at `index` done as of `today`. Recurring tasks stay in
    /// the active list.
    pub fn complete_on(&mut self, index: usize, today: Date) -> Result<CompletedTask, AppError> {
        let task = self.get(index)?.clone();
        let record = CompletedTask {
            task,
            completed_on: calendar::format_iso_date(today)?,
        };

        let mut next = self.state.clone();
        next.completed.push(record.clone());
        if !record.task.is_recurring() {
            next.tasks.remove(index);
        }
        self.commit(next)?;
        tracing::info!(
            task = %record.task.task,
            recurring = record.task.is_recurring(),
            "completed task"
        );

        Ok(record)
    }

    pub fn filter_for_today(&self) -> Result<Vec<Task>, AppError> {
        self.filter_for(calendar::today())
    }

    /// Active tasks minus recurring ones already completed on `today`.
    /// Matching is by label.
    pub fn filter_for(&self, today: Date) -> Result<Vec<Task>, AppError> {
        let today = calendar::format_iso_date(today)?;
        let completed_today: HashSet<&str> = self
            .state
            .completed
            .iter()
            .filter(|record| record.completed_on == today)
            .map(CompletedTask::label)
            .collect();

        Ok(self
            .state
            .tasks
            .iter()
            .filter(|task| !(task.is_recurring() && completed_today.contains(task.task.as_str())))
            .cloned()
            .collect())
    }

    /// Saves `next` and only then replaces the in-memory state, so a failed
    /// save leaves the session as it was.
    fn commit(&mut self, next: TaskState) -> Result<(), AppError> {
        json_store::save_state(&self.paths, &next)?;
        self.state = next;
        Ok(())
    }
}
