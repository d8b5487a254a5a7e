//! Builds the requests sent to the assistant: the daily plan, the weekly
//! review and free-form questions about the task lists.

use crate::assistant::Assistant;
use crate::error::AppError;
use crate::model::{CompletedTask, Task};
use crate::repository::TaskRepository;
use crate::review;
use serde::Serialize;
use time::Date;

pub const DEFAULT_TEMPERATURE: f32 = 0.4;

pub const DAILY_PLAN_INSTRUCTION: &str = "You're an intelligent planner.
From the user's task list, suggest a plan for today with 2–4 tasks under 4 hours. Show priority and estimated time.
Format:
### Suggested Focus for Today:
- **Primary:** <task> — ~<time> (<reason>)
- ...
⏲ Total time: ~X hours
";

pub const WEEKLY_REVIEW_INSTRUCTION: &str = "You are a helpful assistant. Analyze the user's completed tasks this week and give encouraging, constructive feedback.";

pub const QUESTION_INSTRUCTION: &str = "You are an intelligent assistant. The user will ask a question in natural language about their tasks.
You have access to two lists:
- tasks: active/incomplete tasks
- done_tasks: completed tasks with date info

Answer the question clearly and helpfully using those lists.
";

#[derive(Debug, Clone, PartialEq)]
pub struct PlannerRequest {
    pub system: String,
    pub payload: String,
    pub temperature: f32,
}

#[derive(Serialize)]
struct QuestionContext<'a> {
    tasks: &'a [Task],
    done_tasks: &'a [CompletedTask],
    question: &'a str,
}

pub fn daily_plan(
    repo: &TaskRepository,
    today: Date,
    temperature: f32,
) -> Result<PlannerRequest, AppError> {
    let filtered = repo.filter_for(today)?;
    build(DAILY_PLAN_INSTRUCTION, &filtered, temperature)
}

pub fn weekly_review(
    repo: &TaskRepository,
    today: Date,
    temperature: f32,
) -> Result<PlannerRequest, AppError> {
    let recent = review::completed_this_week(repo.completed(), today)?;
    build(WEEKLY_REVIEW_INSTRUCTION, &recent, temperature)
}

pub fn question(
    repo: &TaskRepository,
    question: &str,
    temperature: f32,
) -> Result<PlannerRequest, AppError> {
    let trimmed = question.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("question is required"));
    }

    let context = QuestionContext {
        tasks: repo.tasks(),
        done_tasks: repo.completed(),
        question: trimmed,
    };
    build(QUESTION_INSTRUCTION, &context, temperature)
}

/// Sends a single request; failures are returned as-is with no retry.
pub fn ask(assistant: &dyn Assistant, request: &PlannerRequest) -> Result<String, AppError> {
    tracing::debug!(
        payload_bytes = request.payload.len(),
        temperature = request.temperature,
        "asking assistant"
    );
    assistant.complete(request)
}

fn build<T: Serialize + ?Sized>(
    system: &str,
    payload: &T,
    temperature: f32,
) -> Result<PlannerRequest, AppError> {
    let payload = serde_json::to_string_pretty(payload)
        .map_err(|err| AppError::invalid_data(err.to_string()))?;
    Ok(PlannerRequest {
        system: system.to_string(),
        payload,
        temperature,
    })
}
