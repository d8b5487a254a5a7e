use clap::{CommandFactory, Parser};
use std::io::{self, BufRead, Write};
use std::time::Duration;
use taskdash_cli::cli::{Cli, Command, collect_overrides, render, task_index};
use taskdash_core::assistant;
use taskdash_core::calendar;
use taskdash_core::config::{self, Config, Palette};
use taskdash_core::error::AppError;
use taskdash_core::focus::{FocusState, FocusTimer, suggest_subtask};
use taskdash_core::model::{NewTask, Recurrence};
use taskdash_core::planner::{self, PlannerRequest};
use taskdash_core::repository::TaskRepository;
use taskdash_core::review;
use taskdash_core::storage::json_store;
use tracing_subscriber::EnvFilter;

/// State shared by every command of one run: the open repository and the
/// configuration it was opened with.
struct Session {
    repo: TaskRepository,
    config: Config,
}

impl Session {
    fn open(config: Config) -> Result<Self, AppError> {
        let paths = json_store::store_paths(config.data_dir.as_deref())?;
        let repo = TaskRepository::open(paths)?;
        Ok(Self { repo, config })
    }
}

fn print_json(value: &serde_json::Value) {
    println!("{}", value);
}

fn heading(palette: &Palette, text: &str) {
    println!("{}", palette.accentize(text));
}

fn ask_assistant(config: &Config, request: &PlannerRequest) -> Result<String, AppError> {
    let assistant = assistant::assistant_from_env(&config.assistant)?;
    planner::ask(assistant.as_ref(), request)
}

fn print_response(json: bool, palette: &Palette, title: &str, response: &str) {
    if json {
        print_json(&serde_json::json!({ "response": response }));
    } else {
        heading(palette, title);
        println!("{}", response.trim_end());
    }
}

fn confirm(input: &mut dyn BufRead, prompt: &str) -> Result<bool, AppError> {
    print!("{prompt} [y/N] ");
    io::stdout()
        .flush()
        .map_err(|err| AppError::io(err.to_string()))?;

    let mut answer = String::new();
    input
        .read_line(&mut answer)
        .map_err(|err| AppError::io(err.to_string()))?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escape = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        if in_quotes && ch == '\\' {
            escape = true;
            continue;
        }

        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }

        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() {
                args.push(current.clone());
                current.clear();
            }
            continue;
        }

        current.push(ch);
    }

    if in_quotes {
        return Err(AppError::invalid_input("unterminated quote in command"));
    }

    if !current.is_empty() {
        args.push(current);
    }

    Ok(args)
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

struct FocusRequest {
    number: usize,
    minutes: u32,
    tick: Duration,
    yes: bool,
}

/// Drives the focus timer one tick per `tick` interval and offers to
/// complete the task once time is up.
fn run_focus(
    session: &mut Session,
    request: FocusRequest,
    json: bool,
    palette: &Palette,
    input: &mut dyn BufRead,
) -> Result<(), AppError> {
    let index = task_index(request.number)?;
    let mut timer = FocusTimer::new();
    timer.start(index, request.minutes, session.repo.tasks().len())?;
    let task = session.repo.get(index)?.clone();

    if !json {
        println!("Now focusing on: {}", render::task_line(&task, palette));
        if let Some(subtask) = suggest_subtask(&task) {
            println!("Subtask suggestion: {subtask}");
        }
        println!("Timer started for {} minutes...", request.minutes);
    }

    while let FocusState::Running { remaining, .. } = timer.state() {
        if !json {
            println!("{remaining} minute(s) left...");
        }
        std::thread::sleep(request.tick);
        timer.tick();
    }

    let mut completed = None;
    if let FocusState::Expired { index } = timer.state() {
        if !json {
            println!("Time's up!");
        }
        if request.yes || (!json && confirm(input, "Mark as done?")?) {
            completed = Some(session.repo.complete(index)?);
        }
    }
    timer.stop();

    if json {
        print_json(&serde_json::json!({
            "task": render::task_json(Some(request.number), &task),
            "minutes": request.minutes,
            "completed": completed,
        }));
    } else if completed.is_some() {
        println!("Task marked as done!");
    }

    Ok(())
}

fn run_command(cli: Cli, session: &mut Session, input: &mut dyn BufRead) -> Result<(), AppError> {
    let overrides = collect_overrides(&cli.config_override)?;
    let config = config::merge_overrides(&session.config, &overrides);
    let palette = config::palette_for_theme(config.theme.as_deref());

    match cli.command {
        Command::Add {
            task,
            category,
            priority,
            deadline,
            recurring,
        } => {
            let task = match task {
                Some(value) if !value.trim().is_empty() => value,
                _ => return Err(AppError::invalid_input("task is required")),
            };

            let new_task = NewTask {
                task,
                category: category.parse()?,
                priority: priority.parse()?,
                deadline,
                recurring: Recurrence::parse_choice(&recurring)?,
            };
            let task = session.repo.add(new_task)?;
            if cli.json {
                print_json(&render::task_json(Some(session.repo.tasks().len()), &task));
            } else {
                println!("Task added! {}", render::task_line(&task, &palette));
            }
        }
        Command::List => {
            let tasks = session.repo.tasks();
            if cli.json {
                let payload = tasks
                    .iter()
                    .enumerate()
                    .map(|(index, task)| render::task_json(Some(index + 1), task))
                    .collect();
                print_json(&serde_json::Value::Array(payload));
            } else if tasks.is_empty() {
                println!("No tasks yet.");
            } else {
                heading(&palette, "Your Tasks");
                println!("{}", render::task_table(tasks));
            }
        }
        Command::Done { number } => {
            let record = session.repo.complete(task_index(number)?)?;
            if cli.json {
                print_json(&serde_json::json!(record));
            } else {
                println!(
                    "Completed task: {} ({})",
                    record.label(),
                    record.completed_on
                );
            }
        }
        Command::Plan => {
            let request = planner::daily_plan(
                &session.repo,
                calendar::today(),
                config.assistant.temperature,
            )?;
            let response = ask_assistant(&config, &request)?;
            print_response(cli.json, &palette, "Today's Plan", &response);
        }
        Command::Week => {
            let recent = review::completed_this_week(session.repo.completed(), calendar::today())?;
            let counts = review::weekday_counts(&recent)?;
            if cli.json {
                print_json(&serde_json::json!({
                    "completed": recent,
                    "counts": render::chart_json(&counts),
                }));
            } else if recent.is_empty() {
                println!("No tasks completed this week.");
            } else {
                heading(&palette, "Completed Tasks (This Week)");
                for line in render::completed_lines(&recent) {
                    println!("{line}");
                }
                println!();
                heading(&palette, "Tasks Completed by Day of Week");
                println!("{}", render::weekday_chart(&counts, &palette));
            }
        }
        Command::Review => {
            let today = calendar::today();
            if review::completed_this_week(session.repo.completed(), today)?.is_empty() {
                if cli.json {
                    print_json(&serde_json::json!({ "response": null }));
                } else {
                    println!("No tasks completed this week.");
                }
                return Ok(());
            }
            let request =
                planner::weekly_review(&session.repo, today, config.assistant.temperature)?;
            let response = ask_assistant(&config, &request)?;
            print_response(cli.json, &palette, "AI Feedback on Your Week", &response);
        }
        Command::Focus {
            number,
            minutes,
            tick_secs,
            yes,
        } => {
            let request = FocusRequest {
                number,
                minutes,
                tick: Duration::from_secs(tick_secs),
                yes,
            };
            run_focus(session, request, cli.json, &palette, input)?;
        }
        Command::Ask { question } => {
            let request = planner::question(
                &session.repo,
                &question.join(" "),
                config.assistant.temperature,
            )?;
            let response = ask_assistant(&config, &request)?;
            print_response(cli.json, &palette, "AI Response", &response);
        }
    }

    Ok(())
}

/// The interactive session keeps one repository open, so a per-command
/// `data_dir` override cannot take effect there.
fn reject_data_dir_override(cli: &Cli) -> Result<(), AppError> {
    if collect_overrides(&cli.config_override)?.data_dir.is_some() {
        return Err(AppError::invalid_input(
            "data_dir cannot be overridden inside an interactive session",
        ));
    }
    Ok(())
}

fn run_interactive(config: Config) -> Result<(), AppError> {
    let mut session = Session::open(config)?;
    let mut input = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();

    loop {
        input.clear();
        let bytes = stdin_lock
            .read_line(&mut input)
            .map_err(|err| AppError::io(err.to_string()))?;

        if bytes == 0 {
            break;
        }

        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        let args = match split_command_line(line) {
            Ok(args) => args,
            Err(err) => {
                eprintln!("ERROR: {}", err);
                continue;
            }
        };

        if args.is_empty() {
            continue;
        }

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push("taskdash".to_string());
        argv.extend(args);

        let cli = match Cli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                continue;
            }
        };

        let result = reject_data_dir_override(&cli)
            .and_then(|()| run_command(cli, &mut session, &mut stdin_lock));
        if let Err(err) = result {
            tracing::debug!(code = err.code(), "command failed");
            eprintln!("ERROR: {}", err);
        }
    }

    Ok(())
}

fn run_once(cli: Cli, config: Config) -> Result<(), AppError> {
    let overrides = collect_overrides(&cli.config_override)?;
    let mut session = Session::open(config::merge_overrides(&config, &overrides))?;
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();
    run_command(cli, &mut session, &mut stdin_lock)
}

fn load_config() -> Config {
    let loaded = config::load_config_with_fallback();
    if let Some(err) = loaded.error {
        eprintln!("WARNING: {}", err);
    }
    loaded.config
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let mut args = std::env::args_os();
    args.next();
    if args.next().is_none() {
        if let Err(err) = run_interactive(load_config()) {
            eprintln!("ERROR: {}", err);
            std::process::exit(1);
        }
        return;
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => {
            let _ = err.print();
            return;
        }
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    if let Err(err) = run_once(cli, load_config()) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
