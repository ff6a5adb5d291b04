//! Chart resampling: dense, plot-ready series derived from a sparse curve.
//!
//! Only used for display. Each segment between two breakpoints receives the
//! same number of samples, so sampling is finer (in income terms) wherever
//! breakpoints sit close together. Exact amounts come from `Curve::evaluate`.

use super::curve::{round_amount, Curve};
use rust_decimal::Decimal;
use serde::Serialize;

pub const SAMPLES_PER_SEGMENT: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChartPoint {
    pub income: u32,
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ChartSeries {
    points: Vec<ChartPoint>,
}

impl ChartSeries {
    pub fn resample(curve: &Curve) -> Self {
        let breakpoints: Vec<(u32, Decimal)> = curve.points().collect();
        let mut series = ChartSeries {
            points: Vec::with_capacity(breakpoints.len() * SAMPLES_PER_SEGMENT as usize + 1),
        };

        for segment in breakpoints.windows(2) {
            let (x0, y0) = segment[0];
            let (x1, y1) = segment[1];
            let span = u64::from(x1 - x0);
            for step in 0..SAMPLES_PER_SEGMENT {
                // floor of the evenly spaced position, never past x1
                let offset = span * u64::from(step) / u64::from(SAMPLES_PER_SEGMENT);
                let amount = y0 + (y1 - y0) * Decimal::from(offset) / Decimal::from(span);
                series.push(x0 + offset as u32, round_amount(amount));
            }
        }
        if let Some((x, y)) = breakpoints.last() {
            series.push(*x, round_amount(*y));
        }

        log::debug!(
            "resampled {} breakpoints into {} chart points",
            breakpoints.len(),
            series.points.len()
        );
        series
    }

    /// Narrow segments floor several samples onto the same income; the first
    /// one (the breakpoint itself) wins.
    fn push(&mut self, income: u32, amount: i64) {
        if self.points.last().is_some_and(|p| p.income == income) {
            return;
        }
        self.points.push(ChartPoint { income, amount });
    }

    pub fn points(&self) -> &[ChartPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Lowest and highest amount in the series
    pub fn amount_range(&self) -> Option<(i64, i64)> {
        let min = self.points.iter().map(|p| p.amount).min()?;
        let max = self.points.iter().map(|p| p.amount).max()?;
        Some((min, max))
    }

    /// Linear interpolation over the dense series, clamped at both ends.
    pub fn evaluate(&self, income: u32) -> i64 {
        let idx = self.points.partition_point(|p| p.income < income);
        let before = idx.checked_sub(1).map(|i| self.points[i]);
        match (before, self.points.get(idx).copied()) {
            (_, Some(p)) if p.income == income => p.amount,
            (Some(a), Some(b)) => {
                let offset = Decimal::from(income - a.income);
                let span = Decimal::from(b.income - a.income);
                let amount =
                    Decimal::from(a.amount) + Decimal::from(b.amount - a.amount) * offset / span;
                round_amount(amount)
            }
            (Some(p), None) | (None, Some(p)) => p.amount,
            (None, None) => 0,
        }
    }
}
