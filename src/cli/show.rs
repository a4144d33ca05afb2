use anyhow::bail;
use clap::Parser;
use pathways::{Catalogue, Combinator, Evaluator, Status};
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Parser)]
#[command(about = "Show how a requirement or certification is defined")]
pub struct Show {
    /// Name of a requirement or certification
    name: String,
}

impl Show {
    #[instrument(level = "debug", skip(catalogue))]
    pub fn run(self, catalogue: &Catalogue) -> anyhow::Result<()> {
        let evaluator = catalogue.compile()?;
        let name = self.name.as_str();

        if let Some(requirement) = catalogue.requirement(name) {
            println!("{} {}", "Requirement".info(), catalogue.title(name));
            println!("{:<12} {name}", "Key");
            let aliases: Vec<_> = requirement.aliases.iter().map(|a| a.as_str()).collect();
            println!("{:<12} {}", "Aliases", aliases.join(", "));
            match requirement.expiry_years {
                Some(years) => println!("{:<12} {years} years", "Expiry"),
                None => println!("{:<12} {}", "Expiry", "never".dim()),
            }
        } else if let Some(certification) = catalogue.certification(name) {
            println!("{} {}", "Certification".info(), catalogue.title(name));
            println!("{:<12} {name}", "Name");
            let combinator = match certification.combinator {
                Combinator::And => "all of",
                Combinator::Or => "any of",
            };
            println!("{:<12} {combinator}", "Requires");
            if certification.inputs.is_empty() {
                println!("  {}", empty_inputs_note(certification.combinator).dim());
            }
            for input in &certification.inputs {
                println!("  - {input} {}", kind(&evaluator, input).dim());
            }
        } else {
            bail!("'{name}' is not defined in the catalogue");
        }

        let dependents = evaluator.graph().dependents(name);
        if dependents.is_empty() {
            println!("{:<12} {}", "Used by", "nothing".dim());
        } else {
            println!("Used by");
            for dependent in dependents {
                println!("  - {dependent}");
            }
        }

        Ok(())
    }
}

fn kind(evaluator: &Evaluator, name: &str) -> &'static str {
    if evaluator.graph().is_leaf(name) {
        "(requirement)"
    } else {
        "(certification)"
    }
}

/// Describes a certification with no inputs, which holds only when its
/// combinator's identity does.
fn empty_inputs_note(combinator: Combinator) -> &'static str {
    match combinator.apply(std::iter::empty()) {
        Status::Current => "(no inputs; always held)",
        Status::Expired | Status::None => "(no inputs; never held)",
    }
}
