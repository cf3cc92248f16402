use crate::cli::{Cli, Command};
use crate::config::Config;
use crate::logging::{init_tracing, LogSink};
use crate::model::{Filter, Task};
use crate::projector::Stats;
use crate::storage::{init_project_dir, locate_data_dir, DataLocation, FileBackend};
use crate::store::Store;
use crate::ui;
use anyhow::{bail, Context, Result};
use chrono::{Local, TimeZone};
use std::env;
use std::path::Path;
use tracing::info;

pub fn run(args: Cli) -> Result<()> {
    let command = args.command.unwrap_or(Command::Tui);
    if let Command::Init = command {
        init_tracing(args.verbose, args.quiet, LogSink::Stderr)?;
        return init(args.data_dir.as_deref());
    }

    let cwd = env::current_dir()?;
    let location = locate_data_dir(args.data_dir.as_deref(), &cwd)?;
    let log_path = location.log_path();
    let sink = match command {
        Command::Tui => LogSink::File(&log_path),
        _ => LogSink::Stderr,
    };
    init_tracing(args.verbose, args.quiet, sink)?;
    info!(dir = %location.dir.display(), scope = location.scope.label(), "using data directory");

    let config = Config::load(&location.config_path())?;
    let mut store = Store::open(location.backend());
    match command {
        Command::Init => Ok(()),
        Command::Add { text, category } => add(&mut store, &config, &text, category.as_deref()),
        Command::List { filter } => list(&mut store, &filter),
        Command::Toggle { id } => toggle(&mut store, &id),
        Command::Edit { id, text } => edit(&mut store, &id, &text),
        Command::Delete { id } => delete(&mut store, &id),
        Command::ClearCompleted => clear_completed(&mut store),
        Command::Dark { state } => {
            store
                .set_dark_mode(state.enabled())
                .context("saving settings")?;
            println!("Dark mode {}", if state.enabled() { "on" } else { "off" });
            Ok(())
        }
        Command::Stats => {
            print_stats(&store.projector().stats());
            Ok(())
        }
        Command::Tui => ui::run(store, location, config),
    }
}

fn init(data_dir: Option<&Path>) -> Result<()> {
    let location: DataLocation = init_project_dir(data_dir)?;
    println!("Initialized task list at {}", location.dir.display());
    Ok(())
}

fn add(
    store: &mut Store<FileBackend>,
    config: &Config,
    text: &str,
    category: Option<&str>,
) -> Result<()> {
    let category = config.resolve_category(category)?;
    match store.add_task(text, &category).context("saving new task")? {
        Some(id) => {
            println!("Added task {} to {}", id, category);
            Ok(())
        }
        None => bail!("task text must not be empty"),
    }
}

fn list(store: &mut Store<FileBackend>, filter: &str) -> Result<()> {
    store.set_filter(Filter::parse(filter));
    let projector = store.projector();
    let tasks = projector.visible_tasks();
    println!("Filter: {}", store.filter());
    if tasks.is_empty() {
        println!("  (empty)");
    }
    for task in tasks {
        print_task(task);
    }
    println!();
    print_stats(&projector.stats());
    Ok(())
}

fn toggle(store: &mut Store<FileBackend>, id: &str) -> Result<()> {
    if !store
        .toggle_complete(id)
        .with_context(|| format!("toggling task {}", id))?
    {
        bail!("task {} not found", id);
    }
    let state = match store.task(id) {
        Some(task) if task.completed => "completed",
        _ => "open",
    };
    println!("Task {} is now {}", id, state);
    Ok(())
}

fn edit(store: &mut Store<FileBackend>, id: &str, text: &str) -> Result<()> {
    if store.task(id).is_none() {
        bail!("task {} not found", id);
    }
    if !store
        .edit_text(id, text)
        .with_context(|| format!("editing task {}", id))?
    {
        bail!("task text must not be empty; {} left unchanged", id);
    }
    println!("Updated task {}", id);
    Ok(())
}

fn delete(store: &mut Store<FileBackend>, id: &str) -> Result<()> {
    if !store
        .delete_task(id)
        .with_context(|| format!("deleting task {}", id))?
    {
        bail!("task {} not found", id);
    }
    println!("Deleted task {}", id);
    Ok(())
}

fn clear_completed(store: &mut Store<FileBackend>) -> Result<()> {
    let removed = store
        .clear_completed()
        .context("clearing completed tasks")?;
    println!("Removed {} completed task(s)", removed);
    Ok(())
}

pub fn format_created(created_at: i64) -> String {
    match Local.timestamp_millis_opt(created_at).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        None => created_at.to_string(),
    }
}

fn print_task(task: &Task) {
    let mark = if task.completed { "x" } else { " " };
    println!("  [{}] {}: {}", mark, task.id, task.text);
    println!(
        "      {} • {}",
        task.category,
        format_created(task.created_at)
    );
}

fn print_stats(stats: &Stats) {
    println!(
        "{} remaining of {} • {}% complete",
        stats.remaining, stats.total, stats.percent_complete
    );
}
