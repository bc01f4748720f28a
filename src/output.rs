//! Terminal output
//!
//! Renders recommendations and plans as a fixed-width table, JSON or YAML.

use anyhow::Result;
use clap::ValueEnum;
use recapply::recommendation::{Recommendation, Step};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
}

/// Column definition: header and width
const COLUMNS: &[(&str, usize)] = &[
    ("ID", 36),
    ("RECOMMENDER", 46),
    ("STATE", 10),
    ("PRIORITY", 8),
    ("REFRESHED", 10),
    ("DESCRIPTION", 0),
];

pub fn print_recommendations(items: &[Recommendation], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(items)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(items)?),
        OutputFormat::Table => {
            println!("{}", row(COLUMNS.iter().map(|(h, _)| h.to_string())));
            for rec in items {
                println!("{}", row(table_cells(rec)));
            }
            if items.is_empty() {
                println!("(no recommendations)");
            }
        }
    }
    Ok(())
}

pub fn print_recommendation(rec: &Recommendation, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(rec)?),
        // The full document is more useful than a one-line row
        OutputFormat::Json | OutputFormat::Table => {
            println!("{}", serde_json::to_string_pretty(rec)?)
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct PlanView<'a> {
    name: &'a str,
    state: &'a str,
    steps: Vec<String>,
}

pub fn print_plan(rec: &Recommendation, steps: &[Step], format: OutputFormat) -> Result<()> {
    let view = PlanView {
        name: &rec.name,
        state: &rec.state_info.state,
        steps: steps.iter().map(|s| s.to_string()).collect(),
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&view)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&view)?),
        OutputFormat::Table => {
            println!("{}", rec.name);
            for (i, step) in steps.iter().enumerate() {
                let marker = if step.is_mutating() { "*" } else { " " };
                println!("  {}{:>2}. {}", marker, i + 1, step);
            }
        }
    }
    Ok(())
}

fn table_cells(rec: &Recommendation) -> Vec<String> {
    vec![
        rec.short_id().to_string(),
        rec.recommender().unwrap_or("-").to_string(),
        non_empty(&rec.state_info.state),
        rec.priority.clone().unwrap_or_else(|| "-".to_string()),
        rec.last_refresh_time
            .as_deref()
            .map(format_timestamp_short)
            .unwrap_or_else(|| "-".to_string()),
        rec.description.clone().unwrap_or_else(|| "-".to_string()),
    ]
}

fn row(cells: impl IntoIterator<Item = String>) -> String {
    cells
        .into_iter()
        .zip(COLUMNS.iter())
        .map(|(cell, (_, width))| {
            if *width == 0 {
                cell
            } else {
                format!("{:<width$}", truncate(&cell, *width), width = *width)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end()
        .to_string()
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn non_empty(s: &str) -> String {
    if s.is_empty() {
        "-".to_string()
    } else {
        s.to_string()
    }
}

/// RFC3339 timestamp to its date part
fn format_timestamp_short(timestamp: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(timestamp)
        .map(|t| t.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|_| timestamp.chars().take(10).collect())
}
