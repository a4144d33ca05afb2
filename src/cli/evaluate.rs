use std::path::PathBuf;

use anyhow::bail;
use chrono::NaiveDate;
use clap::Parser;
use pathways::{
    Catalogue, Evaluator, Status, StatusReport,
    storage::{Member, Roster},
};
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use tracing::instrument;

use super::terminal::{Colorize, is_narrow, paint, symbol};

#[derive(Debug, Parser)]
#[command(about = "Evaluate the status of every member of a roster")]
pub struct Evaluate {
    /// Path to a YAML roster of members and their competencies
    roster: PathBuf,

    /// Date against which expiry is measured (YYYY-MM-DD, defaults to today)
    #[arg(long, value_name = "DATE")]
    as_of: Option<NaiveDate>,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,

    /// Only report these requirements or certifications (can be specified
    /// multiple times)
    #[arg(long, value_name = "NAME")]
    only: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl Evaluate {
    #[instrument(level = "debug", skip_all, fields(roster = %self.roster.display()))]
    pub fn run(self, catalogue: &Catalogue) -> anyhow::Result<()> {
        let evaluator = catalogue.compile()?;

        if let Some(unknown) = self
            .only
            .iter()
            .find(|name| !evaluator.graph().contains(name))
        {
            bail!("'{unknown}' is not defined in the catalogue");
        }

        let roster = Roster::load(&self.roster)?;
        let as_of = self
            .as_of
            .unwrap_or_else(|| chrono::Local::now().date_naive());

        warn_unrecognised(&evaluator, &roster);

        let reports: Vec<(&Member, StatusReport)> = roster
            .members()
            .par_iter()
            .map(|member| (member, evaluator.evaluate(&member.ledger, as_of)))
            .collect();

        let columns: Vec<&str> = if self.only.is_empty() {
            catalogue
                .certifications()
                .iter()
                .map(|c| c.name.as_str())
                .collect()
        } else {
            self.only.iter().map(String::as_str).collect()
        };

        match self.output {
            OutputFormat::Json => Self::output_json(catalogue, as_of, &reports, &self.only)?,
            OutputFormat::Table => Self::output_table(catalogue, as_of, &reports, &columns),
        }

        Ok(())
    }

    fn output_json(
        catalogue: &Catalogue,
        as_of: NaiveDate,
        reports: &[(&Member, StatusReport)],
        only: &[String],
    ) -> anyhow::Result<()> {
        use serde_json::json;

        let members: Vec<_> = reports
            .iter()
            .map(|(member, report)| {
                let statuses: serde_json::Map<_, _> = report
                    .iter()
                    .filter(|(name, _)| only.is_empty() || only.iter().any(|o| o == name.as_str()))
                    .map(|(name, status)| (name.to_string(), json!(status)))
                    .collect();
                json!({
                    "id": member.id,
                    "name": member.name,
                    "statuses": statuses,
                })
            })
            .collect();

        let output = json!({
            "as_of": as_of,
            "catalogue": catalogue.fingerprint(),
            "members": members,
        });

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }

    fn output_table(
        catalogue: &Catalogue,
        as_of: NaiveDate,
        reports: &[(&Member, StatusReport)],
        columns: &[&str],
    ) {
        if reports.is_empty() {
            println!("No members found in the roster.");
            return;
        }

        let name_width = reports
            .iter()
            .map(|(member, _)| member.name.chars().count())
            .max()
            .unwrap_or(0)
            .max("Name".len());
        let table_width = name_width + columns.iter().map(|c| c.len() + 2).sum::<usize>();

        println!("Status as of {as_of}");
        println!("{}", "──────────────────────────".dim());

        if is_narrow(table_width) {
            // Stacked output for narrow terminals
            for (member, report) in reports {
                println!("{}", member.name);
                for column in columns {
                    let status = report.get(column).unwrap_or_default();
                    println!(
                        "  {} {}",
                        paint(status, symbol(status)),
                        catalogue.title(column)
                    );
                }
            }
        } else {
            print!("{:<name_width$}", "Name");
            for column in columns {
                print!("  {column}");
            }
            println!();

            for (member, report) in reports {
                print!("{:<name_width$}", member.name);
                for column in columns {
                    let status = report.get(column).unwrap_or_default();
                    let cell = format!("{:<width$}", symbol(status), width = column.len());
                    print!("  {}", paint(status, &cell));
                }
                println!();
            }
        }

        println!();
        println!(
            "{}   {}   {}",
            paint(Status::Current, "✓ current"),
            paint(Status::Expired, "⧗ expired"),
            paint(Status::None, "✗ not held"),
        );
    }
}

/// Logs ledger codes that no requirement accepts.
fn warn_unrecognised(evaluator: &Evaluator, roster: &Roster) {
    for member in roster.members() {
        let codes: Vec<&str> = evaluator
            .table()
            .unrecognised_codes(&member.ledger)
            .map(|code| code.as_str())
            .collect();

        if !codes.is_empty() {
            tracing::warn!(
                member = %member.id,
                codes = %codes.join(", "),
                "ignoring unrecognised competency codes"
            );
        }
    }
}
