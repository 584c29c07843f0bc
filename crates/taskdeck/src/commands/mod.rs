use anyhow::{Context, Result};
use taskdeck_app::{CategoryDataService, TaskDataService, TaskSession};
use taskdeck_core::{StatusFilter, Task};

use crate::{Command, OutputFormat};

mod render;
mod shell;

use shell::run_shell;

#[allow(clippy::future_not_send)]
pub async fn run<T, C>(command: Command, session: &mut TaskSession<T, C>) -> Result<()>
where
    T: TaskDataService,
    C: CategoryDataService,
{
    match command {
        Command::List {
            status,
            search,
            format,
        } => handle_list(session, status.as_deref(), search.as_deref(), format),
        Command::Stats { format } => handle_stats(session, format),
        Command::Categories => {
            print!("{}", render::category_table(session.categories()));
            Ok(())
        }
        Command::Shell => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            run_shell(session, stdin, &mut std::io::stdout()).await
        }
    }
}

fn handle_list<T, C>(
    session: &mut TaskSession<T, C>,
    status: Option<&str>,
    search: Option<&str>,
    format: OutputFormat,
) -> Result<()>
where
    T: TaskDataService,
    C: CategoryDataService,
{
    if let Some(status) = status {
        let status: StatusFilter = status.parse().context("invalid --status")?;
        session.set_status_filter(status);
    }
    if let Some(search) = search {
        session.set_query(search);
    }

    let visible: Vec<&Task> = session.visible();
    if visible.is_empty() {
        if session.filter().is_empty() {
            println!("No tasks found");
        } else {
            println!("No tasks matched the provided filters");
        }
        return Ok(());
    }

    match format {
        OutputFormat::Table => print!("{}", render::task_table(&visible, session.now())),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&visible)?),
    }
    Ok(())
}

fn handle_stats<T, C>(session: &TaskSession<T, C>, format: OutputFormat) -> Result<()>
where
    T: TaskDataService,
    C: CategoryDataService,
{
    let stats = session.stats();
    match format {
        OutputFormat::Table => println!("{}", render::stats_line(&stats)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
    }
    Ok(())
}
