//! Line-oriented interactive session.

use std::io::Write;
use std::str::FromStr;

use anyhow::Result;
use taskdeck_app::{CategoryDataService, EditorState, Notification, TaskDataService, TaskSession};
use taskdeck_core::id::TaskId;
use taskdeck_core::{CategoryDraft, Priority, PriorityParseError, StatusFilter, StatusFilterParseError};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

use super::render;

const HELP: &str = "\
Commands:
  list                         show visible tasks
  filter <all|pending|completed>
  search [text]                filter by title/description; no text clears
  stats                        total, completed, pending and overdue counts
  new                          open an empty task form
  edit <n>                     open a form for task <n>
  set <field> <value>          field: title, description, due, priority, category
  tag <tag> / untag <tag>      edit the form's tags
  save / cancel                submit or discard the open form
  show [n]                     task details, or the open form
  done <n>                     toggle completion
  rm <n>                       delete
  categories [add <name> [tags...]]
  help / quit
<n> is a number from the last list or a task id (prefix).";

#[derive(Debug, Error)]
enum ShellError {
    #[error("unknown command '{0}' (type 'help')")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("unknown field '{0}' (expected title, description, due, priority or category)")]
    Field(String),
    #[error(transparent)]
    Filter(#[from] StatusFilterParseError),
    #[error(transparent)]
    Priority(#[from] PriorityParseError),
    #[error("could not split input: {0}")]
    Quoting(#[from] shell_words::ParseError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum FormEdit {
    Title(String),
    Description(String),
    Due(String),
    Priority(Priority),
    Category(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ShellCommand {
    List,
    Filter(StatusFilter),
    Search(String),
    Stats,
    New,
    Edit(String),
    Set(FormEdit),
    Tag(String),
    Untag(String),
    Save,
    Cancel,
    Show(Option<String>),
    Done(String),
    Remove(String),
    Categories,
    AddCategory { name: String, tags: Vec<String> },
    Help,
    Quit,
}

impl FromStr for ShellCommand {
    type Err = ShellError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let words = shell_words::split(line)?;
        let Some((head, rest)) = words.split_first() else {
            return Err(ShellError::Usage("help"));
        };
        let target = |usage: &'static str| match rest {
            [target] => Ok(target.clone()),
            _ => Err(ShellError::Usage(usage)),
        };

        let command = match head.to_ascii_lowercase().as_str() {
            "list" | "ls" => Self::List,
            "filter" => match rest {
                [status] => Self::Filter(status.parse()?),
                _ => return Err(ShellError::Usage("filter <all|pending|completed>")),
            },
            "search" => Self::Search(rest.join(" ")),
            "stats" => Self::Stats,
            "new" => Self::New,
            "edit" => Self::Edit(target("edit <n>")?),
            "set" => {
                let Some((field, value)) = rest.split_first() else {
                    return Err(ShellError::Usage("set <field> <value>"));
                };
                let value = value.join(" ");
                Self::Set(match field.to_ascii_lowercase().as_str() {
                    "title" => FormEdit::Title(value),
                    "description" | "desc" => FormEdit::Description(value),
                    "due" => FormEdit::Due(value),
                    "priority" => FormEdit::Priority(value.parse()?),
                    "category" => FormEdit::Category(value),
                    _ => return Err(ShellError::Field(field.clone())),
                })
            }
            "tag" => Self::Tag(target("tag <tag>")?),
            "untag" => Self::Untag(target("untag <tag>")?),
            "save" => Self::Save,
            "cancel" => Self::Cancel,
            "show" => match rest {
                [] => Self::Show(None),
                [target] => Self::Show(Some(target.clone())),
                _ => return Err(ShellError::Usage("show [n]")),
            },
            "done" => Self::Done(target("done <n>")?),
            "rm" | "delete" => Self::Remove(target("rm <n>")?),
            "categories" => match rest {
                [] => Self::Categories,
                [add, name, tags @ ..] if add == "add" => Self::AddCategory {
                    name: name.clone(),
                    tags: tags.to_vec(),
                },
                _ => return Err(ShellError::Usage("categories [add <name> [tags...]]")),
            },
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => return Err(ShellError::Unknown(other.to_owned())),
        };
        Ok(command)
    }
}

/// Run the interactive loop until `quit` or end of input.
///
/// # Errors
/// Returns an error only when reading input or writing output fails.
#[allow(clippy::future_not_send)]
pub async fn run_shell<T, C, R, W>(
    session: &mut TaskSession<T, C>,
    input: R,
    out: &mut W,
) -> Result<()>
where
    T: TaskDataService,
    C: CategoryDataService,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    writeln!(
        out,
        "{} tasks loaded. Type 'help' for commands.",
        session.snapshot().len()
    )?;
    prompt(session, out)?;

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if !line.is_empty() {
            match line.parse::<ShellCommand>() {
                Ok(ShellCommand::Quit) => break,
                Ok(command) => {
                    debug!(?command, "Shell command");
                    execute(session, command, out).await?;
                }
                Err(err) => writeln!(out, "error: {err}")?,
            }
        }
        prompt(session, out)?;
    }
    writeln!(out)?;
    Ok(())
}

fn prompt<T, C, W>(session: &TaskSession<T, C>, out: &mut W) -> Result<()>
where
    T: TaskDataService,
    C: CategoryDataService,
    W: Write,
{
    let marker = match session.editor().state() {
        EditorState::Idle => "",
        EditorState::Editing(_) | EditorState::Submitting(_) => " (editing)",
    };
    write!(out, "taskdeck{marker}> ")?;
    out.flush()?;
    Ok(())
}

/// Resolve `<n>`: a 1-based position in the visible list, a full id, or a unique id prefix.
fn resolve_target<T, C>(session: &TaskSession<T, C>, token: &str) -> Option<TaskId>
where
    T: TaskDataService,
    C: CategoryDataService,
{
    if let Ok(position) = token.parse::<usize>() {
        return position
            .checked_sub(1)
            .and_then(|index| session.visible().get(index).map(|task| task.id));
    }
    if let Ok(id) = TaskId::from_str(token) {
        return session.task(id).map(|task| task.id);
    }
    let prefix = token.to_ascii_lowercase();
    let snapshot = session.snapshot();
    let mut matches = snapshot
        .iter()
        .filter(|task| task.id.to_string().starts_with(&prefix))
        .map(|task| task.id);
    match (matches.next(), matches.next()) {
        (Some(id), None) => Some(id),
        _ => None,
    }
}

fn print_note<W: Write>(out: &mut W, note: &Notification) -> Result<()> {
    writeln!(out, "{}", render::notification(note))?;
    Ok(())
}

#[allow(clippy::future_not_send)]
async fn execute<T, C, W>(
    session: &mut TaskSession<T, C>,
    command: ShellCommand,
    out: &mut W,
) -> Result<()>
where
    T: TaskDataService,
    C: CategoryDataService,
    W: Write,
{
    let now = session.now();
    match command {
        ShellCommand::List => {
            let visible = session.visible();
            if visible.is_empty() {
                writeln!(out, "No tasks to show")?;
            } else {
                write!(out, "{}", render::task_table(&visible, now))?;
            }
        }
        ShellCommand::Filter(status) => {
            session.set_status_filter(status);
            writeln!(out, "filter: {status} ({} visible)", session.visible().len())?;
        }
        ShellCommand::Search(query) => {
            session.set_query(&query);
            writeln!(out, "{} visible", session.visible().len())?;
        }
        ShellCommand::Stats => writeln!(out, "{}", render::stats_line(&session.stats()))?,
        ShellCommand::New => match session.begin_create() {
            Ok(()) => writeln!(out, "New task. Use 'set', 'tag', then 'save'.")?,
            Err(err) => writeln!(out, "error: {err}")?,
        },
        ShellCommand::Edit(token) => {
            let Some(id) = resolve_target(session, &token) else {
                writeln!(out, "No task matches '{token}'")?;
                return Ok(());
            };
            match session.begin_edit(id) {
                Ok(()) => {
                    if let Some(open) = session.editor().session() {
                        write!(out, "{}", render::form_summary(&open.form, true))?;
                    }
                }
                Err(err) => writeln!(out, "error: {err}")?,
            }
        }
        ShellCommand::Set(edit) => match session.form_mut() {
            Ok(form) => match edit {
                FormEdit::Title(value) => form.title = value,
                FormEdit::Description(value) => form.description = value,
                FormEdit::Due(value) => form.due_date = value,
                FormEdit::Priority(value) => form.priority = value,
                FormEdit::Category(value) => form.category = value,
            },
            Err(err) => writeln!(out, "error: {err}")?,
        },
        ShellCommand::Tag(tag) => match session.form_mut() {
            Ok(form) => {
                if !form.add_tag(&tag) {
                    writeln!(out, "tag '{}' ignored (blank or already present)", tag.trim())?;
                }
            }
            Err(err) => writeln!(out, "error: {err}")?,
        },
        ShellCommand::Untag(tag) => match session.form_mut() {
            Ok(form) => {
                if !form.remove_tag(&tag) {
                    writeln!(out, "tag '{}' not on this task", tag.trim())?;
                }
            }
            Err(err) => writeln!(out, "error: {err}")?,
        },
        ShellCommand::Save => match session.submit().await {
            Ok(note) => print_note(out, &note)?,
            Err(err) => writeln!(out, "error: {err}")?,
        },
        ShellCommand::Cancel => match session.cancel() {
            Ok(()) => writeln!(out, "discarded")?,
            Err(err) => writeln!(out, "error: {err}")?,
        },
        ShellCommand::Show(None) => match session.editor().session() {
            Some(open) => write!(
                out,
                "{}",
                render::form_summary(&open.form, open.target().is_some())
            )?,
            None => writeln!(out, "usage: show <n>")?,
        },
        ShellCommand::Show(Some(token)) => {
            match resolve_target(session, &token).and_then(|id| session.task(id)) {
                Some(task) => write!(
                    out,
                    "{}",
                    render::task_detail(task, session.categories(), now)
                )?,
                None => writeln!(out, "No task matches '{token}'")?,
            }
        }
        ShellCommand::Done(token) => {
            let Some(id) = resolve_target(session, &token) else {
                writeln!(out, "No task matches '{token}'")?;
                return Ok(());
            };
            let note = session.toggle_complete(id).await;
            print_note(out, &note)?;
        }
        ShellCommand::Remove(token) => {
            let Some(id) = resolve_target(session, &token) else {
                writeln!(out, "No task matches '{token}'")?;
                return Ok(());
            };
            let note = session.delete(id).await;
            print_note(out, &note)?;
        }
        ShellCommand::Categories => write!(out, "{}", render::category_table(session.categories()))?,
        ShellCommand::AddCategory { name, tags } => {
            let note = session
                .create_category(CategoryDraft {
                    name,
                    tags: taskdeck_app::normalize_tags(tags),
                })
                .await;
            print_note(out, &note)?;
        }
        ShellCommand::Help => writeln!(out, "{HELP}")?,
        ShellCommand::Quit => {}
    }
    Ok(())
}
