use crate::error::AppError;
use crate::model::Task;
use rand::seq::SliceRandom;
use std::ops::RangeInclusive;

pub const FOCUS_MINUTES: RangeInclusive<u32> = 5..=60;
pub const DEFAULT_FOCUS_MINUTES: u32 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusState {
    Idle,
    Running { index: usize, remaining: u32 },
    Expired { index: usize },
}

/// Countdown for a single task. Advanced by an external ticker, one tick
/// per minute.
#[derive(Debug, Clone)]
pub struct FocusTimer {
    state: FocusState,
}

impl Default for FocusTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl FocusTimer {
    pub fn new() -> Self {
        Self {
            state: FocusState::Idle,
        }
    }

    pub fn state(&self) -> FocusState {
        self.state
    }

    pub fn start(&mut self, index: usize, minutes: u32, task_count: usize) -> Result<(), AppError> {
        if matches!(self.state, FocusState::Running { .. }) {
            return Err(AppError::invalid_input("a focus session is already running"));
        }
        if index >= task_count {
            return Err(AppError::invalid_input("task index out of range"));
        }
        if !FOCUS_MINUTES.contains(&minutes) {
            return Err(AppError::invalid_input(format!(
                "focus time must be between {} and {} minutes",
                FOCUS_MINUTES.start(),
                FOCUS_MINUTES.end()
            )));
        }

        self.state = FocusState::Running {
            index,
            remaining: minutes,
        };
        tracing::debug!(index, minutes, "focus session started");
        Ok(())
    }

    pub fn tick(&mut self) -> FocusState {
        if let FocusState::Running { index, remaining } = self.state {
            let remaining = remaining.saturating_sub(1);
            self.state = if remaining == 0 {
                tracing::debug!(index, "focus session expired");
                FocusState::Expired { index }
            } else {
                FocusState::Running { index, remaining }
            };
        }
        self.state
    }

    pub fn remaining(&self) -> u32 {
        match self.state {
            FocusState::Running { remaining, .. } => remaining,
            _ => 0,
        }
    }

    pub fn stop(&mut self) {
        self.state = FocusState::Idle;
    }
}

/// Picks one subtask at random to suggest as a starting point.
pub fn suggest_subtask(task: &Task) -> Option<&str> {
    task.subtasks
        .choose(&mut rand::thread_rng())
        .map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::{FocusState, FocusTimer, suggest_subtask};
    use crate::model::{Category, Priority, Task};

    #[test]
    fn counts_down_to_expiry() {
        let mut timer = FocusTimer::new();
        timer.start(1, 5, 2).unwrap();
        assert_eq!(timer.remaining(), 5);

        for expected in (1..5).rev() {
            assert_eq!(
                timer.tick(),
                FocusState::Running {
                    index: 1,
                    remaining: expected
                }
            );
        }

        assert_eq!(timer.tick(), FocusState::Expired { index: 1 });
        assert_eq!(timer.remaining(), 0);
        assert_eq!(timer.tick(), FocusState::Expired { index: 1 });
    }

    #[test]
    fn rejects_durations_outside_bounds() {
        let mut timer = FocusTimer::new();
        assert_eq!(timer.start(0, 4, 1).unwrap_err().code(), "invalid_input");
        assert_eq!(timer.start(0, 61, 1).unwrap_err().code(), "invalid_input");
        assert!(timer.start(0, 60, 1).is_ok());
        assert_eq!(timer.state(), FocusState::Running { index: 0, remaining: 60 });
    }

    #[test]
    fn rejects_unknown_task_index() {
        let mut timer = FocusTimer::new();
        assert_eq!(timer.start(3, 25, 3).unwrap_err().code(), "invalid_input");
        assert_eq!(timer.state(), FocusState::Idle);
    }

    #[test]
    fn cannot_start_twice_but_can_stop() {
        let mut timer = FocusTimer::new();
        timer.start(0, 25, 1).unwrap();
        assert!(timer.start(0, 25, 1).is_err());

        timer.stop();
        assert_eq!(timer.state(), FocusState::Idle);
        assert_eq!(timer.tick(), FocusState::Idle);
    }

    #[test]
    fn suggests_one_of_the_subtasks() {
        let mut task = Task {
            task: "Write report".to_string(),
            category: Category::Work,
            priority: Priority::High,
            deadline: None,
            recurring: None,
            subtasks: Vec::new(),
            reasoning: String::new(),
        };
        assert_eq!(suggest_subtask(&task), None);

        task.subtasks = vec!["outline".to_string(), "draft".to_string()];
        let suggestion = suggest_subtask(&task).unwrap();
        assert!(suggestion == "outline" || suggestion == "draft");
    }
}
