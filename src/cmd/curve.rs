//! Curve command - breakpoints or the resampled chart series of one concept

use crate::cmd::resolve_year;
use crate::core::{concept_curve, ChartSeries, Concept, Curve, TaxConfig, TaxYear};
use crate::utils::write_csv;
use clap::{Args, ValueEnum};
use nltax_derive::CsvSchema;
use serde::Serialize;
use std::io;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct CurveCommand {
    /// Tax concept to show
    #[arg(short = 't', long, value_enum)]
    concept: ConceptArg,

    /// Tax year (defaults to the most recent year in the rate document)
    #[arg(short, long)]
    year: Option<u16>,

    /// Retiring next year (social security at the reduced rate)
    #[arg(short, long)]
    retire: bool,

    /// Write the resampled chart series as CSV instead of the breakpoints table
    #[arg(long)]
    csv: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ConceptArg {
    PayrollTax,
    SocialTax,
    GeneralCredit,
    LabourCredit,
}

impl From<ConceptArg> for Concept {
    fn from(arg: ConceptArg) -> Self {
        match arg {
            ConceptArg::PayrollTax => Concept::PayrollTax,
            ConceptArg::SocialTax => Concept::SocialTax,
            ConceptArg::GeneralCredit => Concept::GeneralCredit,
            ConceptArg::LabourCredit => Concept::LabourCredit,
        }
    }
}

/// One point of an exported chart series
#[derive(Debug, Clone, PartialEq, Eq, Serialize, CsvSchema)]
pub struct ChartRecord {
    /// Tax year of the rates
    pub year: u16,
    /// payroll-tax, social-tax, general-credit or labour-credit
    pub concept: Concept,
    /// Gross yearly income
    pub income: u32,
    /// Amount of tax or credit at this income (whole euros)
    pub amount: i64,
}

#[derive(Debug, Clone, Tabled)]
struct BreakpointRow {
    #[tabled(rename = "Income")]
    income: u32,
    #[tabled(rename = "Amount")]
    amount: String,
}

impl CurveCommand {
    pub fn exec(&self, config: &TaxConfig) -> anyhow::Result<()> {
        let concept: Concept = self.concept.into();
        let year = resolve_year(config, self.year);
        let curve = concept_curve(config, concept, year, self.retire)?;

        if self.csv {
            let series = ChartSeries::resample(&curve);
            write_csv(chart_records(concept, year, &series), io::stdout())
        } else {
            self.print_table(concept, year, &curve);
            Ok(())
        }
    }

    fn print_table(&self, concept: Concept, year: TaxYear, curve: &Curve) {
        let rows: Vec<BreakpointRow> = curve
            .points()
            .map(|(income, amount)| BreakpointRow {
                income,
                amount: format!("{:.2}", amount),
            })
            .collect();

        println!();
        println!("{} ({}) - {} breakpoints", concept.label().to_uppercase(), year, rows.len());
        println!();
        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
            .to_string();
        println!("{}", table);
    }
}

fn chart_records(concept: Concept, year: TaxYear, series: &ChartSeries) -> Vec<ChartRecord> {
    series
        .points()
        .iter()
        .map(|p| ChartRecord {
            year: year.0,
            concept,
            income: p.income,
            amount: p.amount,
        })
        .collect()
}
