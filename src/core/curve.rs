//! Cumulative bracket curves and exact evaluation.
//!
//! Each concept chains its brackets into a sparse piecewise-linear curve
//! (income threshold -> cumulative amount). The curve always starts at
//! threshold 0 and ends at the income ceiling.

use super::bracket::{Bracket, BracketTable, Levy};
use super::nl::Concept;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::BTreeMap;

/// Sparse breakpoint table of a piecewise-linear function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Curve {
    points: BTreeMap<u32, Decimal>,
}

impl Curve {
    pub fn points(&self) -> impl Iterator<Item = (u32, Decimal)> + '_ {
        self.points.iter().map(|(k, v)| (*k, *v))
    }

    /// Value recorded at exactly `threshold`, if it is a breakpoint
    pub fn value_at(&self, threshold: u32) -> Option<Decimal> {
        self.points.get(&threshold).copied()
    }

    /// Linear interpolation between the neighbouring breakpoints, clamped to
    /// the first and last recorded amounts outside the domain.
    pub fn interpolate(&self, income: u32) -> Decimal {
        let below = self.points.range(..=income).next_back();
        let above = self.points.range(income..).next();
        match (below, above) {
            (Some((x0, y0)), Some((x1, y1))) if x0 == x1 => {
                debug_assert_eq!(y0, y1);
                *y0
            }
            (Some((x0, y0)), Some((x1, y1))) => {
                let offset = Decimal::from(income - x0);
                let span = Decimal::from(x1 - x0);
                *y0 + (*y1 - *y0) * offset / span
            }
            (Some((_, y)), None) | (None, Some((_, y))) => *y,
            (None, None) => Decimal::ZERO,
        }
    }

    /// Amount at `income`, rounded to a whole number.
    pub fn evaluate(&self, income: u32) -> i64 {
        round_amount(self.interpolate(income))
    }
}

/// Round half away from zero to a whole amount.
pub fn round_amount(value: Decimal) -> i64 {
    let rounded = value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    rounded.to_i64().unwrap_or(if rounded.is_sign_negative() {
        i64::MIN
    } else {
        i64::MAX
    })
}

struct CurveBuilder {
    concept: Concept,
    points: BTreeMap<u32, Decimal>,
}

impl CurveBuilder {
    fn new(concept: Concept) -> Self {
        let mut points = BTreeMap::new();
        points.insert(0, Decimal::ZERO);
        CurveBuilder { concept, points }
    }

    /// Amount at the most recent breakpoint
    fn running(&self) -> Decimal {
        self.points
            .last_key_value()
            .map_or(Decimal::ZERO, |(_, v)| *v)
    }

    fn record(&mut self, threshold: u32, amount: Decimal) {
        log::debug!("{}: {} -> {}", self.concept, threshold, amount);
        self.points.insert(threshold, amount);
    }

    fn finish(self) -> Curve {
        Curve {
            points: self.points,
        }
    }
}

/// Number of income units in a bounded bracket, both ends inclusive
fn bounded_width(bracket: &Bracket, max: u32) -> u32 {
    max - bracket.min + 1
}

/// Build the curve of `concept` from its (already resolved) bracket table.
pub fn build_curve(concept: Concept, table: &BracketTable, ceiling: u32) -> Curve {
    match concept {
        Concept::PayrollTax => payroll_tax(table, ceiling),
        Concept::SocialTax => social_tax(table, ceiling),
        Concept::GeneralCredit => general_credit(table, ceiling),
        Concept::LabourCredit => labour_credit(table, ceiling),
    }
}

/// Plain cumulative tax. The open-ended bracket charges its rate over the
/// whole ceiling, or adds its flat amount, on top of the lower brackets.
pub fn payroll_tax(table: &BracketTable, ceiling: u32) -> Curve {
    let mut curve = CurveBuilder::new(Concept::PayrollTax);
    for bracket in table.brackets() {
        match bracket.max {
            Some(max) => {
                let total = curve.running() + bracket.levy.over(bounded_width(bracket, max));
                curve.record(max + 1, total);
            }
            None => {
                let total = curve.running() + bracket.levy.over(ceiling);
                curve.record(ceiling, total);
            }
        }
    }
    curve.finish()
}

/// Cumulative premium over the bounded brackets, flat from the top bracket
/// onwards (the premium base is capped).
pub fn social_tax(table: &BracketTable, ceiling: u32) -> Curve {
    let mut curve = CurveBuilder::new(Concept::SocialTax);
    for bracket in table.brackets() {
        match bracket.max {
            Some(max) => {
                let total = curve.running() + bracket.levy.over(bounded_width(bracket, max));
                curve.record(max + 1, total);
            }
            None => {
                let total = curve.running();
                curve.record(ceiling, total);
            }
        }
    }
    curve.finish()
}

/// Plateau at the flat credit, then a linear phase-out to zero over the
/// following multiplier bracket.
pub fn general_credit(table: &BracketTable, ceiling: u32) -> Curve {
    let mut curve = CurveBuilder::new(Concept::GeneralCredit);
    for bracket in table.brackets() {
        match (bracket.max, bracket.levy) {
            (Some(max), Levy::FlatAmount(amount)) => {
                curve.record(bracket.min, amount);
                curve.record(max + 1, amount);
            }
            (Some(max), Levy::Multiplier(_)) => curve.record(max + 1, Decimal::ZERO),
            (None, _) => curve.record(ceiling, Decimal::ZERO),
        }
    }
    curve.finish()
}

/// Build-up and phase-out of the labour credit. Multiplier brackets add to
/// the running credit (negative rates phase it out), flat brackets set it.
pub fn labour_credit(table: &BracketTable, ceiling: u32) -> Curve {
    let mut curve = CurveBuilder::new(Concept::LabourCredit);
    for bracket in table.brackets() {
        match (bracket.max, bracket.levy) {
            (Some(max), Levy::FlatAmount(amount)) => curve.record(max + 1, amount),
            (Some(max), Levy::Multiplier(rate)) => {
                let total = curve.running() + Decimal::from(bounded_width(bracket, max)) * rate;
                curve.record(max + 1, total);
            }
            (None, Levy::FlatAmount(amount)) => curve.record(ceiling, amount),
            (None, Levy::Multiplier(rate)) => {
                let total = curve.running() + Decimal::from(ceiling) * rate;
                curve.record(ceiling, total);
            }
        }
    }
    curve.finish()
}
