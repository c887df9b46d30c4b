//! Compliance Roadmap CLI
//!
//! Computes the EU AI Act compliance roadmap from fixture files.
//!
//! # Usage
//!
//! ```bash
//! # Full roadmap (tasks sorted by deadline)
//! roadmap_cli roadmap --systems fixtures/ai_systems.json --obligations fixtures/obligations.json
//!
//! # Urgent tasks only, as JSON, as of a fixed date
//! roadmap_cli -o json --now 2026-03-01 urgent
//!
//! # Enforcement timeline
//! roadmap_cli milestones
//! ```

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use sentinel_roadmap::deadline::parse_deadline;
use sentinel_roadmap::{
    milestone_timeline, next_milestone, ConfigLoader, FileSource, InventorySummary,
    MilestonePhase, OrgScope, RoadmapConfig, RoadmapEngine, RoadmapService, RoadmapSnapshot,
    RoadmapStats, RoadmapTask, SystemFilter, TaskFilter,
};

#[derive(Parser)]
#[command(name = "roadmap_cli")]
#[command(version = "0.1.0")]
#[command(about = "EU AI Act compliance roadmap for registered AI systems")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format: json, text, or pretty (default)
    #[arg(long, short = 'o', global = true, default_value = "pretty", value_enum)]
    format: OutputFormat,

    /// AI system registry file (JSON or YAML)
    #[arg(
        long,
        global = true,
        env = "SENTINEL_SYSTEMS",
        default_value = "fixtures/ai_systems.json"
    )]
    systems: PathBuf,

    /// Obligation catalog file (JSON or YAML)
    #[arg(
        long,
        global = true,
        env = "SENTINEL_OBLIGATIONS",
        default_value = "fixtures/obligations.json"
    )]
    obligations: PathBuf,

    /// Restrict the registry to one organization
    #[arg(long, global = true)]
    org: Option<String>,

    /// Evaluate as of this date or RFC 3339 timestamp (default: now)
    #[arg(long, global = true)]
    now: Option<String>,

    /// Config directory holding roadmap.yaml (default: $SENTINEL_CONFIG_DIR or ./config)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
    Pretty,
}

#[derive(Subcommand)]
enum Commands {
    /// Full roadmap: every task ordered by deadline, plus totals
    Roadmap {
        /// Only tasks with this status ("all" for every status)
        #[arg(long)]
        status: Option<String>,

        /// Only tasks for this system id
        #[arg(long)]
        system: Option<String>,
    },

    /// Non-compliant tasks inside the urgency window (overdue included)
    Urgent,

    /// Progress per classified system
    Systems,

    /// EU AI Act enforcement milestones relative to now
    Milestones,

    /// Registry summary by classification and status
    Inventory {
        /// Case-insensitive search over name, purpose and description
        #[arg(long)]
        search: Option<String>,

        #[arg(long)]
        classification: Option<String>,

        #[arg(long)]
        status: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let format = cli.format;

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if format == OutputFormat::Json {
                let output = serde_json::json!({ "error": format!("{:#}", e) });
                println!("{}", output);
            } else {
                eprintln!("{}: {:#}", "error".red().bold(), e);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let loader = match &cli.config_dir {
        Some(dir) => ConfigLoader::new(dir),
        None => ConfigLoader::from_env(),
    };
    let config = loader.load_roadmap().with_context(|| {
        format!(
            "Failed to load config from {}",
            loader.config_dir().display()
        )
    })?;

    // Captured once so every day count in the output agrees
    let now = resolve_now(cli.now.as_deref())?;

    // The timeline needs no registry data
    if matches!(cli.command, Commands::Milestones) {
        return cmd_milestones(&config, now, cli.format);
    }

    let engine = RoadmapEngine::from_config(&config).context("Invalid roadmap configuration")?;
    let snapshot = load_snapshot(&cli.systems, &cli.obligations, cli.org, engine).await?;

    match cli.command {
        Commands::Roadmap { status, system } => {
            let filter = TaskFilter {
                status,
                system_id: system,
            };
            cmd_roadmap(&snapshot, &engine, now, &filter, cli.format)
        }
        Commands::Urgent => cmd_urgent(&snapshot, &engine, now, cli.format),
        Commands::Systems => cmd_systems(&snapshot, &engine, now, cli.format),
        Commands::Milestones => cmd_milestones(&config, now, cli.format),
        Commands::Inventory {
            search,
            classification,
            status,
        } => {
            let filter = SystemFilter {
                search,
                classification,
                status,
            };
            cmd_inventory(&snapshot, &filter, cli.format)
        }
    }
}

fn resolve_now(raw: Option<&str>) -> Result<DateTime<Utc>> {
    match raw {
        None => Ok(Utc::now()),
        Some(raw) => parse_deadline(raw).ok_or_else(|| {
            anyhow!(
                "--now must be a date (YYYY-MM-DD) or RFC 3339 timestamp, got '{}'",
                raw
            )
        }),
    }
}

async fn load_snapshot(
    systems: &Path,
    obligations: &Path,
    org: Option<String>,
    engine: RoadmapEngine,
) -> Result<RoadmapSnapshot> {
    let source = FileSource::new(systems, obligations);
    let scope = OrgScope {
        organization_id: org,
    };
    let service = RoadmapService::new(source.clone(), source, scope).with_engine(engine);

    let snapshot = service
        .refresh()
        .await
        .context("Failed to load roadmap data")?;
    Ok(Arc::unwrap_or_clone(snapshot))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("JSON serialization failed")?;
    println!("{}", json);
    Ok(())
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

fn cmd_roadmap(
    snapshot: &RoadmapSnapshot,
    engine: &RoadmapEngine,
    now: DateTime<Utc>,
    filter: &TaskFilter,
    format: OutputFormat,
) -> Result<()> {
    let stats = snapshot.roadmap(engine, now);
    let tasks = filter.apply(&stats.all_tasks);

    if format == OutputFormat::Json {
        return print_json(&serde_json::json!({
            "tasks": tasks,
            "totalTasks": stats.all_tasks.len(),
            "urgentTasks": stats.urgent_tasks.len(),
            "completedCount": stats.completed_count,
            "overdueCount": stats.overdue_count,
            "progressPercent": stats.progress_percent,
        }));
    }

    print_summary(&stats, format);
    println!();
    if tasks.is_empty() {
        println!("No roadmap tasks.");
    }
    for task in tasks {
        print_task(task, engine.urgency_window_days(), format);
    }
    Ok(())
}

fn cmd_urgent(
    snapshot: &RoadmapSnapshot,
    engine: &RoadmapEngine,
    now: DateTime<Utc>,
    format: OutputFormat,
) -> Result<()> {
    let stats = snapshot.roadmap(engine, now);

    if format == OutputFormat::Json {
        return print_json(&stats.urgent_tasks);
    }

    if stats.urgent_tasks.is_empty() {
        let message = format!(
            "No urgent tasks in the next {} days",
            engine.urgency_window_days()
        );
        match format {
            OutputFormat::Pretty => println!("{} {}", "OK".green().bold(), message),
            _ => println!("{}", message),
        }
        return Ok(());
    }

    println!(
        "{} urgent task(s) (due within {} days)",
        stats.urgent_tasks.len(),
        engine.urgency_window_days()
    );
    for task in &stats.urgent_tasks {
        print_task(task, engine.urgency_window_days(), format);
    }
    Ok(())
}

fn cmd_systems(
    snapshot: &RoadmapSnapshot,
    engine: &RoadmapEngine,
    now: DateTime<Utc>,
    format: OutputFormat,
) -> Result<()> {
    let stats = snapshot.roadmap(engine, now);

    if format == OutputFormat::Json {
        return print_json(&stats.system_progress);
    }

    if stats.system_progress.is_empty() {
        println!("No classified AI systems. Run a risk assessment to build a roadmap.");
        return Ok(());
    }

    for item in &stats.system_progress {
        let name = display_name(&item.system.name, &item.system.id);
        let percent = format!("{:>3}%", item.progress.round() as u32);
        let line = format!(
            "{}  {}  {}/{} tasks  [{}]",
            percent,
            name,
            item.completed_tasks,
            item.total_tasks,
            item.system.risk_classification
        );
        match format {
            OutputFormat::Pretty if item.urgent_tasks > 0 => println!(
                "{}  {}",
                line,
                format!("{} urgent", item.urgent_tasks).yellow().bold()
            ),
            OutputFormat::Pretty if item.completed_tasks == item.total_tasks => {
                println!("{}", line.green())
            }
            _ if item.urgent_tasks > 0 => println!("{}  {} urgent", line, item.urgent_tasks),
            _ => println!("{}", line),
        }
    }
    Ok(())
}

fn cmd_milestones(config: &RoadmapConfig, now: DateTime<Utc>, format: OutputFormat) -> Result<()> {
    let timeline = milestone_timeline(&config.milestones, now, config.due_soon_days);

    if format == OutputFormat::Json {
        return print_json(&timeline);
    }

    for status in &timeline {
        let when = match status.phase {
            MilestonePhase::Active => "Active".to_string(),
            _ => format!("{}d", status.days_until),
        };
        let line = format!(
            "{}  {:<45} {}",
            status.milestone.date, status.milestone.title, when
        );
        match (format, status.phase) {
            (OutputFormat::Pretty, MilestonePhase::Active) => println!("{}", line.green()),
            (OutputFormat::Pretty, MilestonePhase::DueSoon) => println!("{}", line.yellow()),
            _ => println!("{}", line),
        }
    }

    if let Some(next) = next_milestone(&timeline) {
        println!();
        println!("Next: {} in {} days", next.milestone.title, next.days_until);
    }
    Ok(())
}

fn cmd_inventory(
    snapshot: &RoadmapSnapshot,
    filter: &SystemFilter,
    format: OutputFormat,
) -> Result<()> {
    let summary = InventorySummary::from_systems(&snapshot.systems);
    let matched = filter.apply(&snapshot.systems);

    if format == OutputFormat::Json {
        return print_json(&serde_json::json!({
            "summary": summary,
            "systems": matched,
        }));
    }

    println!(
        "{} systems registered, {} high-risk, {} compliant ({}%), {} need assessment",
        summary.total,
        summary.high_risk,
        summary.compliant,
        summary.compliant_percent,
        summary.needs_assessment()
    );
    for (classification, count) in summary.by_classification.iter().filter(|(_, c)| **c > 0) {
        println!("  {:<20} {}", classification, count);
    }

    if filter.is_active() {
        println!();
        println!("{} result(s)", matched.len());
    }
    for system in matched {
        println!(
            "  {}  [{}]  {}",
            display_name(&system.name, &system.id),
            system.risk_classification,
            system.effective_status()
        );
    }
    Ok(())
}

// =============================================================================
// OUTPUT HELPERS
// =============================================================================

fn print_summary(stats: &RoadmapStats<'_>, format: OutputFormat) {
    let header = format!(
        "{} tasks · {}% complete",
        stats.all_tasks.len(),
        stats.progress_percent
    );
    match format {
        OutputFormat::Pretty => println!("{}", header.bold()),
        _ => println!("{}", header),
    }
    println!(
        "Urgent: {}  Overdue: {}  Completed: {}  Systems: {}",
        stats.urgent_tasks.len(),
        stats.overdue_count,
        stats.completed_count,
        stats.system_progress.len()
    );
}

fn print_task(task: &RoadmapTask<'_>, window_days: i64, format: OutputFormat) {
    let due = match task.days_remaining {
        Some(days) if days < 0 => format!("{} DAYS OVERDUE", days.abs()),
        Some(days) => format!("{} days left", days),
        None => "no valid deadline".to_string(),
    };
    let title = if task.obligation.obligation_title.is_empty() {
        task.obligation.id.as_str()
    } else {
        task.obligation.obligation_title.as_str()
    };
    let line = format!(
        "  {:<18} {:<40} {}  ({})",
        due,
        title,
        display_name(&task.system.name, &task.system.id),
        task.status
    );

    if format != OutputFormat::Pretty {
        println!("{}", line);
    } else if task.is_completed() {
        println!("{}", line.green());
    } else if task.is_overdue() {
        println!("{}", line.red().bold());
    } else if task.is_urgent(window_days) {
        println!("{}", line.yellow());
    } else {
        println!("{}", line);
    }
}

fn display_name<'a>(name: &'a str, id: &'a str) -> &'a str {
    if name.is_empty() {
        id
    } else {
        name
    }
}
