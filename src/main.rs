use std::io::{BufRead, Write};

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tasktrack::board::TaskBoard;
use tasktrack::browse::Session;
use tasktrack::cli::{Cli, CliCommand};
use tasktrack::config::Config;
use tasktrack::error::{Error, Result};
use tasktrack::form::{LOAD_FAILED, TaskForm, today};
use tasktrack::render::{Renderer, render_json, title_text};
use tasktrack::store::{RestTaskStore, TaskStore};
use tasktrack::task::Task;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_logging();

    let config = match Config::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    info!(?config, "config loaded");

    if let Err(e) = run(cli.command, config).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(command: CliCommand, config: Config) -> Result<()> {
    let store = RestTaskStore::new(&config.base_url);
    let renderer = Renderer::new(config.template_dir.clone())?;
    let mut board = TaskBoard::new(store);

    match command {
        CliCommand::List {
            search,
            status,
            sort,
            json,
        } => {
            board.refresh().map_err(|e| with_message(&board, e))?;
            let view = board.view_mut();
            if let Some(term) = search {
                view.set_search(term);
            }
            view.set_status(status);
            for key in sort {
                view.sort_by(key);
            }
            if json {
                println!("{}", render_json(board.view().visible())?);
            } else {
                print!("{}", renderer.render_view(board.view())?);
            }
        }
        CliCommand::Show { id, json } => {
            let task = board.store().get_task(&id)?;
            if json {
                println!("{}", render_json(&task)?);
            } else {
                print!("{}", renderer.render_task(&task)?);
            }
        }
        CliCommand::Add { name, due } => {
            let mut form = TaskForm::add();
            form.task_name = name;
            form.due_date = due;
            let task = save(&mut board, &mut form)?;
            println!("Created task {} ({})", task.id, title_text(&task));
            warn_stale(&board);
        }
        CliCommand::Edit { id, name, due } => {
            let current = board
                .store()
                .get_task(&id)
                .map_err(|e| Error::user(LOAD_FAILED, e))?;
            let mut form = TaskForm::edit(&id);
            form.fill_from(&current);
            if let Some(name) = name {
                form.task_name = name;
            }
            if let Some(due) = due {
                form.due_date = due;
            }
            let task = save(&mut board, &mut form)?;
            println!("Updated task {} ({})", task.id, title_text(&task));
            warn_stale(&board);
        }
        CliCommand::Toggle { id } => {
            board.refresh().map_err(|e| with_message(&board, e))?;
            let task = board
                .toggle_status(&id)
                .map_err(|e| with_message(&board, e))?;
            println!("{} is now {}", title_text(&task), task.status_label());
        }
        CliCommand::Delete { id, yes } => {
            board.refresh().map_err(|e| with_message(&board, e))?;
            let title = match board.view().find(&id) {
                Some(task) => title_text(task).to_string(),
                None => return Err(Error::NotFound(format!("task {id}"))),
            };
            if !yes && config.confirm_delete && !confirm(&format!("Delete '{title}'?"))? {
                println!("Cancelled.");
                return Ok(());
            }
            board.delete(&id).map_err(|e| with_message(&board, e))?;
            println!("Deleted {title}");
        }
        CliCommand::Browse => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            let mut session = Session::new(board, &renderer, &config, std::io::stdout());
            session.run(stdin, config.debounce()).await?;
        }
    }
    Ok(())
}

/// Submit a form; validation and save failures surface as the form's message.
fn save<S: TaskStore>(board: &mut TaskBoard<S>, form: &mut TaskForm) -> Result<Task> {
    match board.save(form, today()) {
        Ok(task) => Ok(task),
        Err(e @ Error::Validation(_)) => Err(e),
        Err(e) => match form.error() {
            Some(msg) => Err(Error::user(msg, e)),
            None => Err(with_message(board, e)),
        },
    }
}

/// Prefer the user-facing board message over the raw error, keeping the cause.
fn with_message<S: TaskStore>(board: &TaskBoard<S>, err: Error) -> Error {
    match board.message() {
        Some(msg) if !matches!(err, Error::NotFound(_)) => Error::user(msg, err),
        _ => err,
    }
}

/// A save can succeed while the follow-up reload fails.
fn warn_stale<S: TaskStore>(board: &TaskBoard<S>) {
    if let Some(msg) = board.message() {
        eprintln!("warning: {msg}");
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} [y/N] ");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
