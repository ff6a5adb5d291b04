//! Validate command - check a rate document without running an estimate

use crate::cmd::{load_config, source_label};
use crate::core::{Concept, TaxConfig, TaxYear};
use clap::Args;
use serde::Serialize;
use std::path::Path;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct ValidateCommand {
    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

/// Bracket counts of one year
#[derive(Debug, Clone, Serialize, Tabled)]
struct YearRow {
    #[tabled(rename = "Year")]
    year: TaxYear,
    #[tabled(rename = "Payroll Tax")]
    payroll_tax: usize,
    #[tabled(rename = "Social Security Tax")]
    social_tax: usize,
    #[tabled(rename = "General Tax Credit")]
    general_credit: usize,
    #[tabled(rename = "Labour Tax Credit")]
    labour_credit: usize,
}

/// JSON output structure
#[derive(Debug, Serialize)]
struct ValidationOutput {
    source: String,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha256: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    income_ceiling: Option<u32>,
    years: Vec<YearRow>,
}

impl ValidateCommand {
    pub fn exec(&self, path: Option<&Path>) -> anyhow::Result<()> {
        let source = source_label(path);
        let output = match load_config(path) {
            Ok(config) => ValidationOutput {
                source,
                valid: true,
                error: None,
                sha256: Some(config.digest().to_string()),
                income_ceiling: Some(config.ceiling()),
                years: year_rows(&config),
            },
            Err(err) => ValidationOutput {
                source,
                valid: false,
                error: Some(format!("{:#}", err)),
                sha256: None,
                income_ceiling: None,
                years: Vec::new(),
            },
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            self.print_text(&output);
        }

        // Exit with code 1 if the document is unusable
        if !output.valid {
            std::process::exit(1);
        }
        Ok(())
    }

    fn print_text(&self, output: &ValidationOutput) {
        println!();
        println!("VALIDATION RESULTS ({})", output.source);
        println!();

        if let Some(ref error) = output.error {
            println!("\u{26A0} {}", error);
            println!();
            return;
        }

        println!("\u{2713} Rate document is valid.");
        if let (Some(ceiling), Some(digest)) = (output.income_ceiling, &output.sha256) {
            println!("  Income ceiling: {}", ceiling);
            println!("  SHA-256:        {}", digest);
        }
        println!();

        let table = Table::new(&output.years)
            .with(Style::rounded())
            .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
            .to_string();
        println!("Brackets per year");
        println!("{}", table);
        println!();
    }
}

fn year_rows(config: &TaxConfig) -> Vec<YearRow> {
    config
        .years()
        .iter()
        .map(|&year| YearRow {
            year,
            payroll_tax: config.bracket_count(Concept::PayrollTax, year),
            social_tax: config.bracket_count(Concept::SocialTax, year),
            general_credit: config.bracket_count(Concept::GeneralCredit, year),
            labour_credit: config.bracket_count(Concept::LabourCredit, year),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_bracket_counts() {
        let config = TaxConfig::bundled().unwrap();
        let rows = year_rows(&config);
        assert_eq!(rows.len(), 3);
        let latest = &rows[2];
        assert_eq!(latest.year, TaxYear(2023));
        assert_eq!(
            (
                latest.payroll_tax,
                latest.social_tax,
                latest.general_credit,
                latest.labour_credit
            ),
            (3, 2, 3, 5)
        );
    }
}
