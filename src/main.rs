use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};

mod actions;
mod classify;
mod dates;
mod fields;
mod ingest;
mod loader;
mod models;
mod report;
mod staff;

use models::DatasetModel;

#[derive(Parser)]
#[command(name = "pastoral-tracker")]
#[command(about = "Behaviour incident aggregation and action planning for pastoral teams", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Totals, tracked students and the active reporting window
    Summary {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Full profile and strategy recommendations for one student
    Student {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long)]
        name: String,
    },
    /// Weekday-by-period intensity grid, optionally drilled into one cell
    Heatmap {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long)]
        day: Option<u32>,
        #[arg(long)]
        period: Option<u32>,
    },
    /// Tiered action-priority list for staff assignment
    Actions {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// On-call / removal leaderboards
    Oncall {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
    /// Generate the weekly markdown report
    Report {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Write a fixed demo export to try the tool without school data
    Sample {
        #[arg(long, default_value = "sample.csv")]
        out: PathBuf,
    },
}

fn load_model(csv: &Path) -> anyhow::Result<DatasetModel> {
    let rows = loader::load_rows(csv)?;
    Ok(ingest::ingest(&rows))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Summary { csv } => {
            let model = load_model(&csv)?;
            println!(
                "{} incidents across {} students.",
                model.total_incidents(),
                model.students.len()
            );
            if model.window.is_empty() {
                println!("No dated incidents found.");
            } else {
                let dates: Vec<String> =
                    model.window.iter().map(|d| d.to_string()).collect();
                println!("Active window: {}", dates.join(", "));
            }
            for year in model.years() {
                let summary = model.year_summary(&year);
                println!("Year {} - {} incidents", summary.year, summary.total);
                for (issue, count) in summary.top_issues {
                    println!("  - {issue}: {count}");
                }
            }
        }
        Commands::Student { csv, name } => {
            let model = load_model(&csv)?;
            let student = model
                .student(&name)
                .with_context(|| format!("no student named {name:?} in this export"))?;
            println!("{} (Year {}, {})", student.name, student.year, student.reg);
            println!(
                "Incidents: {} | SEN: {} | PP: {} | Reading age: {} | Prior attainment: {}",
                student.count,
                student.sen_status,
                if student.is_pp { "Yes" } else { "No" },
                student.reading_age,
                student.prior_attainment
            );
            println!("Top incident types:");
            for (kind, count) in models::top_n(&student.types, 3) {
                let diagnosis = classify::diagnose(&kind);
                println!("  - {kind}: {count} [{}]", diagnosis.label());
            }
            println!("Top subjects:");
            for (subject, count) in models::top_n(&student.subjects, 3) {
                println!("  - {subject}: {count}");
            }
            println!("Recent incidents:");
            for incident in student.incidents.iter().take(10) {
                println!(
                    "  - {} {} in {} with {}",
                    incident.date, incident.kind, incident.subject, incident.teacher
                );
            }
            if !student.comments.is_empty() {
                let recent: Vec<&str> = student
                    .comments
                    .iter()
                    .rev()
                    .take(5)
                    .rev()
                    .map(String::as_str)
                    .collect();
                println!("Recent notes: {}", recent.join(" | "));
            }
            if let Some((top_kind, _)) = models::top_n(&student.types, 1).into_iter().next() {
                let diagnosis = classify::diagnose(&top_kind);
                println!("Strategies ({}):", diagnosis.label());
                for strategy in diagnosis.strategies() {
                    println!("  - {strategy}");
                }
            }
            if let Some(sen) = classify::sen_strategies(&student.sen_status) {
                println!("SEN provisions ({}):", student.sen_status);
                for strategy in sen {
                    println!("  - {strategy}");
                }
            }
        }
        Commands::Heatmap { csv, day, period } => {
            let model = load_model(&csv)?;
            if let (Some(day), Some(period)) = (day, period) {
                print_cell(&model, day, period);
            } else {
                print_grid(&model);
            }
        }
        Commands::Actions { csv, json } => {
            let model = load_model(&csv)?;
            let plan = actions::action_plan(&model);
            if json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
                return Ok(());
            }
            if plan.assignments.is_empty() {
                println!("No students meet the action criteria this week.");
                return Ok(());
            }
            for assignment in plan.assignments {
                let s = &assignment.stat;
                println!(
                    "{} [{}] {} (Year {}, {}) - {} incidents, {} - {}",
                    assignment.role.label(),
                    assignment.staff,
                    s.name,
                    s.year,
                    s.reg,
                    s.recent_count,
                    s.top_issue,
                    assignment.action
                );
            }
        }
        Commands::Oncall { csv, limit } => {
            let model = load_model(&csv)?;
            println!("Top students:");
            for (name, count) in model.on_call.top_students(limit) {
                println!("  - {name}: {count}");
            }
            println!("Top subjects:");
            for (subject, count) in model.on_call.top_subjects(limit) {
                println!("  - {subject}: {count}");
            }
            println!("Top staff:");
            for (initials, count) in model.on_call.top_staff(limit) {
                println!("  - {initials}: {count}");
            }
        }
        Commands::Report { csv, out } => {
            let model = load_model(&csv)?;
            let report = report::build_report(&model);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Sample { out } => {
            loader::write_sample(&out)?;
            println!("Sample export written to {}.", out.display());
        }
    }

    Ok(())
}

fn print_grid(model: &DatasetModel) {
    const DAYS: [&str; 5] = ["Mon", "Tue", "Wed", "Thu", "Fri"];
    const PERIOD_LABELS: [&str; 6] = [
        "P1 (8:45)",
        "P2 (9:45)",
        "P3 (10:45)",
        "P4 (12:00)",
        "P5 (1:00)",
        "P6 (2:30)",
    ];
    println!(
        "{:>12} {:>5} {:>5} {:>5} {:>5} {:>5}",
        "", DAYS[0], DAYS[1], DAYS[2], DAYS[3], DAYS[4]
    );
    for period in 1..=6u32 {
        let counts: Vec<String> = (1..=5u32)
            .map(|day| format!("{:>5}", model.heatmap.count(period, day)))
            .collect();
        println!(
            "{:>12} {}",
            PERIOD_LABELS[(period - 1) as usize],
            counts.join(" ")
        );
    }
}

fn print_cell(model: &DatasetModel, day: u32, period: u32) {
    println!(
        "Day {} period {}: {} incidents",
        day,
        period,
        model.heatmap.count(period, day)
    );
    if let Some(cell) = model.heatmap.cell(period, day) {
        for (year, groups) in &cell.drilldown {
            for (group, count) in groups {
                println!("  Year {year} / {group}: {count}");
            }
        }
    }
    let students = model.students_at(day, period);
    if students.is_empty() {
        println!("No students recorded in this slot within the active window.");
    } else {
        println!("Students in this slot (active window):");
        for entry in students {
            println!("  - {} ({}): {}", entry.name, entry.reg, entry.count);
        }
    }
}
