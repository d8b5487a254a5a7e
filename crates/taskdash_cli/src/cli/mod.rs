use clap::{Parser, Subcommand};
use taskdash_core::config::ConfigOverrides;
use taskdash_core::error::AppError;

pub mod render;

const AFTER_HELP: &str = "\
Environment:
  TASKDASH_API_KEY, DEEPSEEK_API_KEY  API key for the planner service
  TASKDASH_OFFLINE=1                  Skip the planner service and print the request it would send
  TASKDASH_DATA_DIR                   Directory holding tasks.json and done_tasks.json
  TASKDASH_CONFIG_PATH                Path of the JSON config file";

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Personal task dashboard with an AI planner",
    long_about = None,
    after_help = AFTER_HELP
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new task
    ///
    /// Example: taskdash add "Write report" --priority high --deadline 2025-12-24
    /// Example: taskdash add "Water plants" --category personal --recurring daily
    Add {
        task: Option<String>,
        /// Work, Personal or Other
        #[arg(long, default_value = "Work")]
        category: String,
        /// High, Medium or Low
        #[arg(long, default_value = "High")]
        priority: String,
        /// Deadline date (YYYY-MM-DD)
        #[arg(long)]
        deadline: Option<String>,
        /// daily, weekly or no
        #[arg(long, default_value = "no")]
        recurring: String,
    },
    /// List active tasks
    ///
    /// Example: taskdash list
    List,
    /// Mark a task as done
    ///
    /// Example: taskdash done 2
    Done {
        /// Task number as shown by `list`
        number: usize,
    },
    /// Ask the assistant for today's plan
    ///
    /// Example: taskdash plan
    Plan,
    /// Show tasks completed this week and a chart by weekday
    ///
    /// Example: taskdash week
    Week,
    /// Ask the assistant to review this week's completed tasks
    ///
    /// Example: taskdash review
    Review,
    /// Run a focus session on a task
    ///
    /// Example: taskdash focus 1 --minutes 25
    Focus {
        /// Task number as shown by `list`
        number: usize,
        /// Session length in minutes (5-60)
        #[arg(long, default_value_t = 25)]
        minutes: u32,
        /// Seconds per countdown minute
        #[arg(long, default_value_t = 60, hide = true)]
        tick_secs: u64,
        /// Mark the task done when time is up without asking
        #[arg(long)]
        yes: bool,
    },
    /// Ask a question about your tasks
    ///
    /// Example: taskdash ask "What deadlines are coming up?"
    Ask {
        #[arg(num_args = 1.., required = true)]
        question: Vec<String>,
    },
}

/// Converts a 1-based task number from the command line into a list index.
pub fn task_index(number: usize) -> Result<usize, AppError> {
    number
        .checked_sub(1)
        .ok_or_else(|| AppError::invalid_input("task number starts at 1"))
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigOverrideTarget {
    Theme,
    DataDir,
    BaseUrl,
    Model,
    Temperature,
    TimeoutSecs,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let trimmed = raw.trim();
    let (key_raw, value_raw) = trimmed
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim().to_string();
    let (field, remainder) = key_raw
        .split_once('.')
        .map(|(field, rest)| (field.trim(), Some(rest.trim())))
        .unwrap_or((key_raw.trim(), None));

    let canonical_field =
        canonicalize_flag_name(field).ok_or_else(|| "override key cannot be empty".to_string())?;

    let target = match (canonical_field.as_str(), remainder) {
        ("theme", None) => ConfigOverrideTarget::Theme,
        ("data_dir", None) => ConfigOverrideTarget::DataDir,
        ("theme" | "data_dir", Some(_)) => {
            return Err(format!("{canonical_field} override cannot have subfields"));
        }
        ("assistant", Some(sub)) => match canonicalize_flag_name(sub).as_deref() {
            Some("base_url") => ConfigOverrideTarget::BaseUrl,
            Some("model") => ConfigOverrideTarget::Model,
            Some("temperature") => ConfigOverrideTarget::Temperature,
            Some("timeout_secs") => ConfigOverrideTarget::TimeoutSecs,
            Some(other) => return Err(format!("unknown assistant field '{other}'")),
            None => return Err("assistant override requires a field name".to_string()),
        },
        ("assistant", None) => {
            return Err("assistant override requires a field name".to_string());
        }
        (other, _) => return Err(format!("unknown config field '{other}'")),
    };

    Ok(ParsedConfigOverride { target, value })
}

/// Folds every `--config-override` into one set of overrides.
pub fn collect_overrides(raw: &[String]) -> Result<ConfigOverrides, AppError> {
    let mut overrides = ConfigOverrides::default();
    for entry in raw {
        let parsed = parse_config_override(entry).map_err(AppError::invalid_input)?;
        match parsed.target {
            ConfigOverrideTarget::Theme => overrides.theme = Some(parsed.value),
            ConfigOverrideTarget::DataDir => overrides.data_dir = Some(parsed.value),
            ConfigOverrideTarget::BaseUrl => overrides.base_url = Some(parsed.value),
            ConfigOverrideTarget::Model => overrides.model = Some(parsed.value),
            ConfigOverrideTarget::Temperature => {
                let temperature = parsed
                    .value
                    .parse::<f32>()
                    .map_err(|_| AppError::invalid_input("assistant.temperature must be a number"))?;
                overrides.temperature = Some(temperature);
            }
            ConfigOverrideTarget::TimeoutSecs => {
                let timeout_secs = parsed.value.parse::<u64>().map_err(|_| {
                    AppError::invalid_input("assistant.timeout_secs must be a whole number")
                })?;
                overrides.timeout_secs = Some(timeout_secs);
            }
        }
    }

    Ok(overrides)
}

fn canonicalize_flag_name(name: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
