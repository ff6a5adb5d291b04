//! HTML command - results table and charts as a browser report

pub mod html;

use crate::cmd::resolve_year;
use crate::core::{estimate, Query, TaxConfig};
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct HtmlCommand {
    /// Gross yearly income
    #[arg(short, long, default_value_t = 60_000, allow_negative_numbers = true)]
    income: i64,

    /// Tax year (defaults to the most recent year in the rate document)
    #[arg(short, long)]
    year: Option<u16>,

    /// Retiring next year (social security at the reduced rate)
    #[arg(short, long)]
    retire: bool,

    /// Output file path (default: opens in browser)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl HtmlCommand {
    pub fn exec(&self, config: &TaxConfig) -> anyhow::Result<()> {
        let query = Query {
            income: self.income,
            year: resolve_year(config, self.year),
            retire: self.retire,
        };
        let assessment = estimate(config, query)?;
        let html = html::generate_html(&assessment, config, chrono::Local::now());

        if let Some(ref output_path) = self.output {
            std::fs::write(output_path, &html)?;
            println!("HTML report written to: {}", output_path.display());
        } else {
            // Write to temp file and open in browser
            let temp_path = std::env::temp_dir().join("nltax-report.html");
            std::fs::write(&temp_path, &html)?;
            opener::open(&temp_path)?;
            println!("Opened HTML report in browser: {}", temp_path.display());
        }

        Ok(())
    }
}
