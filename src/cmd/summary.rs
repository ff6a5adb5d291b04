//! Summary command - taxes, credits and net income for one income

use crate::cmd::resolve_year;
use crate::core::{estimate, Concept, Estimate, Query, TaxConfig};
use clap::Args;
use serde::Serialize;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

pub const DISCLAIMER: &str = "This calculator provides an estimated income tax calculation \
based on the information provided. It is for illustrative purposes only and does not \
guarantee accuracy. Consult a tax professional for precise calculations.";

#[derive(Args, Debug)]
pub struct SummaryCommand {
    /// Gross yearly income
    #[arg(short, long, default_value_t = 60_000, allow_negative_numbers = true)]
    income: i64,

    /// Tax year (defaults to the most recent year in the rate document)
    #[arg(short, long)]
    year: Option<u16>,

    /// Retiring next year (social security at the reduced rate)
    #[arg(short, long)]
    retire: bool,

    /// Output as JSON instead of a formatted table
    #[arg(long)]
    json: bool,
}

/// Summary data for JSON output
#[derive(Debug, Serialize)]
struct SummaryData {
    tax_year: String,
    retire: bool,
    income_before_tax: i64,
    payroll_tax: i64,
    social_security_tax: i64,
    general_tax_credit: i64,
    labour_tax_credit: i64,
    income_after_tax: i64,
}

impl From<&Estimate> for SummaryData {
    fn from(e: &Estimate) -> Self {
        SummaryData {
            tax_year: e.year.display(),
            retire: e.retire,
            income_before_tax: i64::from(e.income),
            payroll_tax: e.payroll_tax,
            social_security_tax: e.social_tax,
            general_tax_credit: e.general_credit,
            labour_tax_credit: e.labour_credit,
            income_after_tax: e.net_income(),
        }
    }
}

/// Row of the results table
#[derive(Debug, Clone, PartialEq, Eq, Tabled)]
pub struct SummaryRow {
    #[tabled(rename = "")]
    pub item: &'static str,

    #[tabled(rename = "Values")]
    pub value: i64,
}

/// Income, the four components and the resulting net income
pub fn summary_rows(estimate: &Estimate) -> Vec<SummaryRow> {
    let mut rows = vec![SummaryRow {
        item: "Income Before Tax",
        value: i64::from(estimate.income),
    }];
    rows.extend(Concept::ALL.iter().map(|c| SummaryRow {
        item: c.label(),
        value: estimate.amount(*c),
    }));
    rows.push(SummaryRow {
        item: "Income After Tax",
        value: estimate.net_income(),
    });
    rows
}

impl SummaryCommand {
    pub fn exec(&self, config: &TaxConfig) -> anyhow::Result<()> {
        let query = Query {
            income: self.income,
            year: resolve_year(config, self.year),
            retire: self.retire,
        };
        let assessment = estimate(config, query)?;

        if self.json {
            self.print_json(&assessment.estimate)
        } else {
            self.print_summary(&assessment.estimate);
            Ok(())
        }
    }

    fn print_summary(&self, estimate: &Estimate) {
        let status = if estimate.retire {
            "retiring next year"
        } else {
            "working"
        };

        println!();
        println!("INCOME TAX ESTIMATE ({}, {})", estimate.year, status);
        println!();

        let table = Table::new(summary_rows(estimate))
            .with(Style::rounded())
            .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
            .to_string();
        println!("{}", table);
        println!("*values are per year");
        println!();
        println!("Disclaimer: {}", DISCLAIMER);
        println!();
    }

    fn print_json(&self, estimate: &Estimate) -> anyhow::Result<()> {
        let data = SummaryData::from(estimate);
        println!("{}", serde_json::to_string_pretty(&data)?);
        Ok(())
    }
}
