use crate::error::AppError;
use crate::model::{CompletedTask, Task};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

const DATA_DIR_ENV_VAR: &str = "TASKDASH_DATA_DIR";
const TASKS_FILE_NAME: &str = "tasks.json";
const DONE_FILE_NAME: &str = "done_tasks.json";

/// Locations of the two task documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePaths {
    pub tasks: PathBuf,
    pub done_tasks: PathBuf,
}

impl StorePaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            tasks: dir.join(TASKS_FILE_NAME),
            done_tasks: dir.join(DONE_FILE_NAME),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskState {
    pub tasks: Vec<Task>,
    pub completed: Vec<CompletedTask>,
}

/// Resolves the data directory: `TASKDASH_DATA_DIR`, then the configured
/// directory, then the platform default.
pub fn data_dir(configured: Option<&str>) -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(DATA_DIR_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if let Some(path) = configured
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata).join("taskdash"))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home).join(".config").join("taskdash"))
    }
}

pub fn store_paths(configured: Option<&str>) -> Result<StorePaths, AppError> {
    Ok(StorePaths::in_dir(&data_dir(configured)?))
}

pub fn load_state(paths: &StorePaths) -> Result<TaskState, AppError> {
    let tasks = load_list(&paths.tasks)?;
    let completed = load_list(&paths.done_tasks)?;
    tracing::debug!(
        tasks = tasks.len(),
        completed = completed.len(),
        "loaded task state"
    );

    Ok(TaskState { tasks, completed })
}

pub fn save_state(paths: &StorePaths, state: &TaskState) -> Result<(), AppError> {
    // Completed records first: an interrupted save then duplicates a task
    // rather than losing it.
    save_list(&paths.done_tasks, &state.completed)?;
    save_list(&paths.tasks, &state.tasks)?;
    tracing::debug!(
        tasks = state.tasks.len(),
        completed = state.completed.len(),
        "saved task state"
    );

    Ok(())
}

fn load_list<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, AppError> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })
}

fn save_list<T: Serialize>(path: &Path, items: &[T]) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|err| AppError::io(err.to_string()))?;
    }

    let content =
        serde_json::to_string_pretty(items).map_err(|err| AppError::invalid_data(err.to_string()))?;
    std::fs::write(path, content).map_err(|err| AppError::io(err.to_string()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, permissions).map_err(|err| AppError::io(err.to_string()))?;
    }

    Ok(())
}
