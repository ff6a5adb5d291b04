use super::chart::ChartSeries;
use super::config::TaxConfig;
use super::curve::{build_curve, Curve};
use super::nl::{Concept, TaxYear};
use serde::Serialize;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("income cannot be negative: {0}")]
    NegativeIncome(i64),
    #[error("income too large: {0}")]
    IncomeOutOfRange(i64),
    #[error("no rates for tax year {year} (available: {available})")]
    UnknownYear { year: TaxYear, available: String },
}

/// One estimate request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Query {
    pub income: i64,
    pub year: TaxYear,
    /// Retiring next year: social security at the reduced rate
    pub retire: bool,
}

/// Result bundle of a query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Estimate {
    pub year: TaxYear,
    pub income: u32,
    pub retire: bool,
    pub payroll_tax: i64,
    pub social_tax: i64,
    pub general_credit: i64,
    pub labour_credit: i64,
}

impl Estimate {
    pub fn amount(&self, concept: Concept) -> i64 {
        match concept {
            Concept::PayrollTax => self.payroll_tax,
            Concept::SocialTax => self.social_tax,
            Concept::GeneralCredit => self.general_credit,
            Concept::LabourCredit => self.labour_credit,
        }
    }

    /// Income after taxes, with credits added back. Saturates like the
    /// rounded amounts it is built from.
    pub fn net_income(&self) -> i64 {
        i64::from(self.income)
            .saturating_sub(self.payroll_tax)
            .saturating_sub(self.social_tax)
            .saturating_add(self.general_credit)
            .saturating_add(self.labour_credit)
    }
}

/// Curve of one concept together with its plot-ready resampling
#[derive(Debug, Clone)]
pub struct ConceptCurve {
    pub concept: Concept,
    pub curve: Curve,
    pub chart: ChartSeries,
}

#[derive(Debug, Clone)]
pub struct Assessment {
    pub estimate: Estimate,
    pub curves: Vec<ConceptCurve>,
}

impl Assessment {
    pub fn curve(&self, concept: Concept) -> Option<&ConceptCurve> {
        self.curves.iter().find(|c| c.concept == concept)
    }
}

/// Build the curve of `concept` for a year and retirement status.
pub fn concept_curve(
    config: &TaxConfig,
    concept: Concept,
    year: TaxYear,
    retire: bool,
) -> Result<Curve, QueryError> {
    let table = config
        .table(concept, year, retire)
        .ok_or_else(|| unknown_year(config, year))?;
    Ok(build_curve(concept, &table, config.ceiling()))
}

/// Evaluate all four concepts at the queried income.
pub fn estimate(config: &TaxConfig, query: Query) -> Result<Assessment, QueryError> {
    let income = match u32::try_from(query.income) {
        Ok(income) => income,
        Err(_) if query.income < 0 => return Err(QueryError::NegativeIncome(query.income)),
        Err(_) => return Err(QueryError::IncomeOutOfRange(query.income)),
    };
    if !config.has_year(query.year) {
        return Err(unknown_year(config, query.year));
    }

    let mut curves = Vec::with_capacity(Concept::ALL.len());
    for concept in Concept::ALL {
        let curve = concept_curve(config, concept, query.year, query.retire)?;
        let chart = ChartSeries::resample(&curve);
        curves.push(ConceptCurve {
            concept,
            curve,
            chart,
        });
    }

    let amount = |concept: Concept| {
        curves
            .iter()
            .find(|c| c.concept == concept)
            .map_or(0, |c| c.curve.evaluate(income))
    };
    let estimate = Estimate {
        year: query.year,
        income,
        retire: query.retire,
        payroll_tax: amount(Concept::PayrollTax),
        social_tax: amount(Concept::SocialTax),
        general_credit: amount(Concept::GeneralCredit),
        labour_credit: amount(Concept::LabourCredit),
    };

    log::info!(
        "estimate {} for income {} (retire: {}): net {}",
        estimate.year,
        estimate.income,
        estimate.retire,
        estimate.net_income()
    );

    Ok(Assessment { estimate, curves })
}

fn unknown_year(config: &TaxConfig, year: TaxYear) -> QueryError {
    QueryError::UnknownYear {
        year,
        available: config
            .years()
            .iter()
            .map(TaxYear::display)
            .collect::<Vec<_>>()
            .join(", "),
    }
}
