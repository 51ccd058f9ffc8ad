//! Weekly CLI - Notion weekly report pipeline.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use weekly::compose::TaskGroups;
use weekly::config::Settings;
use weekly::notion::Task;
use weekly::pipeline::{Pipeline, RunOutcome};
use weekly::schedule::Scheduler;

/// Weekly CLI - generate and publish weekly reports from a Notion task tracker.
#[derive(Parser)]
#[command(name = "weekly")]
#[command(about = "Notion weekly report pipeline")]
#[command(version)]
pub struct Cli {
    /// Config file path (default: config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show this week's tasks without generating a report
    Preview,

    /// Run the full pipeline once: fetch, summarize, publish
    Run,

    /// Start the weekly scheduler
    Schedule,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("weekly=debug,llm=debug,info")
    } else {
        EnvFilter::new("weekly=info,llm=info,warn")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Commands::Preview => run_preview(cli.config.as_deref()).await,
        Commands::Run => run_once(cli.config.as_deref()).await,
        Commands::Schedule => run_scheduler(cli.config.as_deref()).await,
    }
}

fn load_settings(config_path: Option<&std::path::Path>) -> Result<Settings> {
    Settings::discover(config_path)
        .context("configuration error - copy config.example.yaml to config.yaml and fill it in")
}

async fn run_preview(config_path: Option<&std::path::Path>) -> Result<()> {
    let settings = load_settings(config_path)?;
    let pipeline = Pipeline::from_settings(settings)?;

    println!("👀 {}\n", "Previewing this week's tasks".bold());

    let preview = pipeline.preview().await?;
    println!("📅 Period: {}\n", preview.window.label());

    if preview.groups.is_empty() {
        println!("📭 No task activity recorded this week");
        return Ok(());
    }

    println!("📋 Found {} tasks:\n", preview.groups.total());
    print_groups(&preview.groups);

    Ok(())
}

async fn run_once(config_path: Option<&std::path::Path>) -> Result<()> {
    let settings = load_settings(config_path)?;
    let pipeline = Pipeline::from_settings(settings)?;

    println!("📝 {}\n", "Generating weekly report".bold());

    let outcome = pipeline.run().await?;
    print_outcome(&outcome);

    Ok(())
}

async fn run_scheduler(config_path: Option<&std::path::Path>) -> Result<()> {
    let settings = load_settings(config_path)?;
    let scheduler = Scheduler::new(settings)?;

    println!("📅 {}", "Weekly report scheduler started".bold());
    println!(
        "⏳ Next run: {}",
        scheduler.next_run().format("%Y-%m-%d %H:%M:%S")
    );
    println!("   Press Ctrl+C to stop\n");

    scheduler.run().await
}

fn print_groups(groups: &TaskGroups) {
    if !groups.completed.is_empty() {
        println!("{}", "✅ Completed:".green().bold());
        for task in &groups.completed {
            print_task(task);
        }
        println!();
    }

    if !groups.in_progress.is_empty() {
        println!("{}", "🔄 In progress:".yellow().bold());
        for task in &groups.in_progress {
            print_task(task);
        }
        println!();
    }
}

fn print_task(task: &Task) {
    println!("   {}", task.title);
    if let Some(notes) = &task.notes {
        println!("      notes: {notes}");
    }
    if !task.task_types.is_empty() {
        println!("      type: {}", task.task_types.join(", "));
    }
    if let Some(due) = &task.due_date {
        println!("      due: {due}");
    }
    if !task.commits.is_empty() {
        println!("      📦 {} commits this week:", task.commits.len());
        for commit in task.commits.iter().take(5) {
            println!("         {} {}", commit.sha, commit.message);
        }
        if task.commits.len() > 5 {
            println!("         ... and {} more", task.commits.len() - 5);
        }
    }
}

fn print_outcome(outcome: &RunOutcome) {
    if let Some(page) = &outcome.page {
        println!("\n{}", "✅ Weekly report published!".green().bold());
        println!("📌 Title: {}", outcome.title);
        println!("📊 Tasks: {}", outcome.task_count());
        println!("🔗 Link: {}", page.url);
    } else {
        println!("\n📭 {}", "No tasks this week, nothing published".yellow());
        return;
    }

    if let Some(content) = &outcome.content {
        println!("\n📄 Report preview:");
        println!("{}", "-".repeat(50));
        println!("{content}");
    }
}
