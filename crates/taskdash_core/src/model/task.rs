use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub task: String,
    pub category: Category,
    pub priority: Priority,
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default)]
    pub recurring: Option<Recurrence>,
    #[serde(default)]
    pub subtasks: Vec<String>,
    #[serde(default)]
    pub reasoning: String,
}

impl Task {
    pub fn is_recurring(&self) -> bool {
        self.recurring.is_some()
    }
}

/// A finished task. Serialized as the task's own fields plus `completed_on`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedTask {
    #[serde(flatten)]
    pub task: Task,
    pub completed_on: String,
}

impl CompletedTask {
    pub fn label(&self) -> &str {
        &self.task.task
    }
}

/// Fields supplied by the user when adding a task. Defaults to a
/// high-priority one-off work task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub task: String,
    pub category: Category,
    pub priority: Priority,
    pub deadline: Option<String>,
    pub recurring: Option<Recurrence>,
}

impl NewTask {
    pub fn new<S: Into<String>>(task: S) -> Self {
        Self {
            task: task.into(),
            category: Category::Work,
            priority: Priority::High,
            deadline: None,
            recurring: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Work,
    Personal,
    Other,
}

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Self::Work => "Work",
            Self::Personal => "Personal",
            Self::Other => "Other",
        }
    }
}

impl FromStr for Category {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "work" => Ok(Self::Work),
            "personal" => Ok(Self::Personal),
            "other" => Ok(Self::Other),
            _ => Err(AppError::invalid_input(
                "category must be one of Work, Personal, Other",
            )),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn label(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl FromStr for Priority {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(AppError::invalid_input(
                "priority must be one of High, Medium, Low",
            )),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recurrence {
    Daily,
    Weekly,
}

impl Recurrence {
    pub fn label(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
        }
    }

    /// Parses a recurrence choice where `no`/`none` mean a one-off task.
    pub fn parse_choice(raw: &str) -> Result<Option<Self>, AppError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "no" | "none" => Ok(None),
            "daily" => Ok(Some(Self::Daily)),
            "weekly" => Ok(Some(Self::Weekly)),
            _ => Err(AppError::invalid_input(
                "recurring must be one of daily, weekly, no",
            )),
        }
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
