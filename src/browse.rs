//! Interactive session: one command per line, the table redrawn after
//! every change. Search input is debounced before it is applied.

use std::io::Write;

use chrono::NaiveDate;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tracing::{debug, info};

use crate::board::TaskBoard;
use crate::config::Config;
use crate::debounce::Debouncer;
use crate::error::Result;
use crate::form::TaskForm;
use crate::render::{Renderer, title_text};
use crate::store::TaskStore;
use crate::view::{SortKey, StatusFilter};

const HELP: &str = "\
Commands:
  /TERM | search TERM     search titles (applied after you stop typing)
  clear                   reset search and status filter
  status all|pending|completed
  sort task_name|due_date|createdAt   (repeat to reverse)
  show N                  task details (N = row number or id)
  toggle N                mark pending/completed
  delete N                delete a task
  add NAME YYYY-MM-DD     create a task
  edit N NAME YYYY-MM-DD  edit a task
  refresh                 reload from the server
  help | quit";

#[derive(Debug, Clone, PartialEq)]
pub enum BrowseCommand {
    Search(String),
    Clear,
    Status(StatusFilter),
    Sort(SortKey),
    Show(String),
    Toggle(String),
    Delete(String),
    Add { name: String, due: String },
    Edit { reference: String, name: String, due: String },
    Refresh,
    Help,
    Quit,
    Empty,
}

/// Split trailing date off "NAME WORDS DATE".
fn split_name_and_date(rest: &str) -> Option<(String, String)> {
    let (name, due) = rest.trim().rsplit_once(char::is_whitespace)?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name.to_string(), due.to_string()))
}

pub fn parse_command(line: &str) -> std::result::Result<BrowseCommand, String> {
    let line = line.trim_end_matches(['\r', '\n']);
    if let Some(term) = line.strip_prefix('/') {
        return Ok(BrowseCommand::Search(term.to_string()));
    }

    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(BrowseCommand::Empty);
    }
    let (word, rest) = trimmed
        .split_once(char::is_whitespace)
        .map(|(w, r)| (w, r.trim()))
        .unwrap_or((trimmed, ""));

    let need_arg = |what: &str| -> std::result::Result<String, String> {
        if rest.is_empty() {
            Err(format!("usage: {word} {what}"))
        } else {
            Ok(rest.to_string())
        }
    };

    match word.to_lowercase().as_str() {
        "search" => Ok(BrowseCommand::Search(rest.to_string())),
        "clear" => Ok(BrowseCommand::Clear),
        "status" => Ok(BrowseCommand::Status(need_arg("FILTER")?.parse()?)),
        "sort" => Ok(BrowseCommand::Sort(need_arg("KEY")?.parse()?)),
        "show" => Ok(BrowseCommand::Show(need_arg("N")?)),
        "toggle" => Ok(BrowseCommand::Toggle(need_arg("N")?)),
        "delete" | "rm" => Ok(BrowseCommand::Delete(need_arg("N")?)),
        "add" => {
            let (name, due) =
                split_name_and_date(rest).ok_or_else(|| "usage: add NAME YYYY-MM-DD".to_string())?;
            Ok(BrowseCommand::Add { name, due })
        }
        "edit" => {
            let usage = || "usage: edit N NAME YYYY-MM-DD".to_string();
            let (reference, tail) = rest.split_once(char::is_whitespace).ok_or_else(usage)?;
            let (name, due) = split_name_and_date(tail).ok_or_else(usage)?;
            Ok(BrowseCommand::Edit {
                reference: reference.to_string(),
                name,
                due,
            })
        }
        "refresh" | "r" => Ok(BrowseCommand::Refresh),
        "help" | "?" => Ok(BrowseCommand::Help),
        "quit" | "exit" | "q" => Ok(BrowseCommand::Quit),
        other => Err(format!("unknown command: {other} (type 'help')")),
    }
}

enum Event {
    Line(Option<String>),
    Search(Option<String>),
}

/// An interactive session over any line source and output sink.
pub struct Session<'a, S, W> {
    board: TaskBoard<S>,
    renderer: &'a Renderer,
    out: W,
    confirm_delete: bool,
    today: fn() -> NaiveDate,
}

impl<'a, S: TaskStore, W: Write> Session<'a, S, W> {
    pub fn new(board: TaskBoard<S>, renderer: &'a Renderer, config: &Config, out: W) -> Self {
        Self {
            board,
            renderer,
            out,
            confirm_delete: config.confirm_delete,
            today: crate::form::today,
        }
    }

    pub fn with_today(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn board(&self) -> &TaskBoard<S> {
        &self.board
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Run until `quit` or end of input. A search still settling when input
    /// ends is applied before returning.
    pub async fn run<R>(&mut self, input: R, debounce: std::time::Duration) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        let mut search = Debouncer::new(self.board.view().search_term().to_string(), debounce);
        let mut pending_search = false;

        let _ = self.board.refresh();
        self.draw()?;

        loop {
            let event = tokio::select! {
                line = lines.next_line() => Event::Line(line?),
                term = search.settled() => Event::Search(term),
            };

            match event {
                Event::Search(Some(term)) => {
                    pending_search = false;
                    debug!(term = %term, "search settled");
                    self.board.view_mut().set_search(term);
                    self.draw()?;
                }
                Event::Search(None) => break,
                Event::Line(None) => {
                    if pending_search && let Some(term) = search.settled().await {
                        self.board.view_mut().set_search(term);
                        self.draw()?;
                    }
                    break;
                }
                Event::Line(Some(line)) => match parse_command(&line) {
                    Ok(BrowseCommand::Quit) => break,
                    Ok(BrowseCommand::Search(term)) => {
                        pending_search = true;
                        search.push(term);
                    }
                    Ok(command) => self.execute(command, &mut lines).await?,
                    Err(msg) => writeln!(self.out, "{msg}")?,
                },
            }
        }

        info!("browse session ended");
        Ok(())
    }

    async fn execute<R>(&mut self, command: BrowseCommand, lines: &mut Lines<R>) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        match command {
            BrowseCommand::Clear => self.board.view_mut().clear_filters(),
            BrowseCommand::Status(filter) => self.board.view_mut().set_status(filter),
            BrowseCommand::Sort(key) => self.board.view_mut().sort_by(key),
            BrowseCommand::Refresh => {
                let _ = self.board.refresh();
            }
            BrowseCommand::Help => {
                writeln!(self.out, "{HELP}")?;
                return Ok(());
            }
            BrowseCommand::Empty => return Ok(()),
            BrowseCommand::Show(reference) => {
                let Some(id) = self.resolve(&reference)? else {
                    return Ok(());
                };
                if let Some(task) = self.board.view().find(&id) {
                    let text = self.renderer.render_task(task)?;
                    writeln!(self.out, "{text}")?;
                }
                return Ok(());
            }
            BrowseCommand::Toggle(reference) => {
                let Some(id) = self.resolve(&reference)? else {
                    return Ok(());
                };
                let _ = self.board.toggle_status(&id);
            }
            BrowseCommand::Delete(reference) => {
                let Some(id) = self.resolve(&reference)? else {
                    return Ok(());
                };
                if self.confirm_delete && !self.confirm(&id, lines).await? {
                    writeln!(self.out, "Cancelled.")?;
                    return Ok(());
                }
                let _ = self.board.delete(&id);
            }
            BrowseCommand::Add { name, due } => {
                let mut form = TaskForm::add();
                form.task_name = name;
                form.due_date = due;
                self.save(form)?;
            }
            BrowseCommand::Edit {
                reference,
                name,
                due,
            } => {
                let Some(id) = self.resolve(&reference)? else {
                    return Ok(());
                };
                let mut form = TaskForm::load(self.board.store(), &id);
                if let Some(msg) = form.error() {
                    writeln!(self.out, "{msg}")?;
                    return Ok(());
                }
                form.task_name = name;
                form.due_date = due;
                self.save(form)?;
            }
            BrowseCommand::Search(_) | BrowseCommand::Quit => return Ok(()),
        }
        self.draw()
    }

    fn save(&mut self, mut form: TaskForm) -> Result<()> {
        let today = (self.today)();
        if self.board.save(&mut form, today).is_err()
            && let Some(msg) = form.error()
        {
            writeln!(self.out, "{msg}")?;
        }
        Ok(())
    }

    fn resolve(&mut self, reference: &str) -> Result<Option<String>> {
        let id = self.board.resolve_id(reference);
        if id.is_none() {
            writeln!(self.out, "No task at {reference}")?;
        }
        Ok(id)
    }

    async fn confirm<R>(&mut self, id: &str, lines: &mut Lines<R>) -> Result<bool>
    where
        R: AsyncBufRead + Unpin,
    {
        let title = self
            .board
            .view()
            .find(id)
            .map(|t| title_text(t).to_string())
            .unwrap_or_else(|| id.to_string());
        write!(self.out, "Delete '{title}'? [y/N] ")?;
        self.out.flush()?;
        let answer = lines.next_line().await?.unwrap_or_default();
        Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
    }

    fn draw(&mut self) -> Result<()> {
        let view = self.board.view();
        writeln!(
            self.out,
            "\nSearch: \"{}\"  Status: {}",
            view.search_term(),
            view.status_filter()
        )?;
        let table = self.renderer.render_view(view)?;
        write!(self.out, "{table}")?;
        if !table.ends_with('\n') {
            writeln!(self.out)?;
        }
        if let Some(msg) = self.board.message() {
            writeln!(self.out, "! {msg}")?;
        }
        self.out.flush()?;
        Ok(())
    }
}
