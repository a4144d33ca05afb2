use clap::Parser;
use pathways::Catalogue;
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Parser, Default)]
#[command(about = "Validate the catalogue and summarise its contents")]
pub struct Check {
    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl Check {
    #[instrument(level = "debug", skip_all)]
    pub fn run(self, catalogue: &Catalogue) -> anyhow::Result<()> {
        // Configuration errors propagate and exit non-zero.
        let evaluator = catalogue.compile()?;

        let requirements = evaluator.table().len();
        let certifications = evaluator.graph().len();
        let depth = evaluator.graph().depth();
        let expiring = evaluator
            .table()
            .iter()
            .filter(|(_, equivalency)| equivalency.expiry().is_some())
            .count();
        let fingerprint = catalogue.fingerprint();

        match self.output {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "requirements": requirements,
                    "expiring_requirements": expiring,
                    "certifications": certifications,
                    "depth": depth,
                    "fingerprint": fingerprint,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Table => {
                println!("Catalogue");
                println!("{}", "─────────".dim());
                println!("{:<16} {requirements} ({expiring} with expiry)", "Requirements");
                println!("{:<16} {certifications}", "Certifications");
                println!("{:<16} {depth}", "Depth");
                println!("{:<16} {}", "Fingerprint", fingerprint.dim());
                println!();
                println!("{}", "No configuration errors ✅".success());
            }
        }

        Ok(())
    }
}
