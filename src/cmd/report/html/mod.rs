//! HTML report generation.
//!
//! Renders a self-contained page: the inputs, the results table and one SVG
//! line chart per concept with the user's own amount marked on it.

use crate::cmd::summary::{summary_rows, DISCLAIMER};
use crate::core::{Assessment, ConceptCurve, Estimate, TaxConfig};
use chrono::{DateTime, Local};

const TEMPLATE: &str = include_str!("report.html");
const CSS: &str = include_str!("report.css");

const TAX_COLOUR: &str = "#636efa";
const CREDIT_COLOUR: &str = "#00cc96";
const MARKER_COLOUR: &str = "#ef553b";

const WIDTH: f64 = 720.0;
const HEIGHT: f64 = 320.0;
const LEFT: f64 = 64.0;
const RIGHT: f64 = 16.0;
const TOP: f64 = 16.0;
const BOTTOM: f64 = 36.0;
const X_TICKS: u32 = 4;

/// Generate HTML report content
pub fn generate_html(assessment: &Assessment, config: &TaxConfig, generated: DateTime<Local>) -> String {
    let estimate = &assessment.estimate;
    let charts: String = assessment
        .curves
        .iter()
        .map(|curve| chart_figure(curve, estimate))
        .collect();

    TEMPLATE
        .replace("__CSS__", CSS)
        .replace("__INPUTS__", &inputs(estimate))
        .replace("__TABLE__", &results_table(estimate))
        .replace("__CHARTS__", &charts)
        .replace("__FOOTER__", &footer(config, generated))
}

fn inputs(estimate: &Estimate) -> String {
    let retire = if estimate.retire { "yes" } else { "no" };
    format!(
        "            <dt>Gross Yearly Income</dt><dd>{}</dd>\n\
         \x20           <dt>Tax Year</dt><dd>{}</dd>\n\
         \x20           <dt>Retire next year</dt><dd>{}</dd>",
        estimate.income, estimate.year, retire
    )
}

fn results_table(estimate: &Estimate) -> String {
    let rows = summary_rows(estimate);
    let last = rows.len() - 1;
    let body: String = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let class = if i == last { " class=\"total\"" } else { "" };
            format!(
                "                <tr{}><td>{}</td><td class=\"value\">{}</td></tr>\n",
                class, row.item, row.value
            )
        })
        .collect();
    format!(
        "            <table class=\"results\">\n{}            </table>",
        body
    )
}

fn footer(config: &TaxConfig, generated: DateTime<Local>) -> String {
    let digest = if config.digest().is_empty() {
        String::new()
    } else {
        format!(" &middot; rate document sha256 {}", &config.digest()[..12])
    };
    format!(
        "        <p>Generated {}{}</p>\n        <p><strong>Disclaimer:</strong> {}</p>",
        generated.format("%Y-%m-%d %H:%M"),
        digest,
        DISCLAIMER
    )
}

/// Maps incomes and amounts onto the SVG canvas.
struct Plot {
    x_max: f64,
    y_min: f64,
    y_max: f64,
}

impl Plot {
    fn x(&self, income: f64) -> f64 {
        LEFT + income / self.x_max * (WIDTH - LEFT - RIGHT)
    }

    fn y(&self, amount: f64) -> f64 {
        TOP + (self.y_max - amount) / (self.y_max - self.y_min) * (HEIGHT - TOP - BOTTOM)
    }
}

fn chart_figure(curve: &ConceptCurve, estimate: &Estimate) -> String {
    let label = curve.concept.label();
    let colour = if curve.concept.is_credit() {
        CREDIT_COLOUR
    } else {
        TAX_COLOUR
    };
    format!(
        "            <figure class=\"chart\">\n\
         \x20               <figcaption>{label}</figcaption>\n\
         {svg}\n\
         \x20               <div class=\"legend\"><span style=\"color:{colour}\">&#9644;</span> {label} \
         <span style=\"color:{MARKER_COLOUR}\">&#9679;</span> Your {label}</div>\n\
         \x20           </figure>\n",
        svg = svg_chart(curve, estimate, colour),
    )
}

fn svg_chart(curve: &ConceptCurve, estimate: &Estimate, colour: &str) -> String {
    let points = curve.chart.points();
    let marker = estimate.amount(curve.concept);
    let last_income = points.last().map_or(0, |p| p.income);
    let (low, high) = curve.chart.amount_range().unwrap_or((0, 0));

    let y_min = low.min(0).min(marker) as f64;
    let y_max = (high.max(marker) as f64).max(y_min + 1.0);
    let plot = Plot {
        x_max: f64::from(last_income.max(estimate.income).max(1)),
        y_min,
        y_max,
    };

    let mut line: Vec<String> = points
        .iter()
        .map(|p| format!("{:.1},{:.1}", plot.x(f64::from(p.income)), plot.y(p.amount as f64)))
        .collect();
    // the curve is flat past its last breakpoint
    if let Some(last) = points.last().filter(|p| estimate.income > p.income) {
        line.push(format!(
            "{:.1},{:.1}",
            plot.x(f64::from(estimate.income)),
            plot.y(last.amount as f64)
        ));
    }

    let axis_y = plot.y(0.0_f64.max(y_min));
    let mut ticks = String::new();
    for i in 0..=X_TICKS {
        let income = plot.x_max * f64::from(i) / f64::from(X_TICKS);
        ticks.push_str(&format!(
            "<text class=\"tick\" x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\">{:.0}</text>",
            plot.x(income),
            HEIGHT - BOTTOM + 16.0,
            income
        ));
    }
    for amount in [y_min, (y_min + y_max) / 2.0, y_max] {
        ticks.push_str(&format!(
            "<text class=\"tick\" x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\">{:.0}</text>",
            LEFT - 6.0,
            plot.y(amount) + 4.0,
            amount
        ));
    }

    format!(
        "<svg viewBox=\"0 0 {w} {h}\" role=\"img\" aria-label=\"{label}\">\
         <line class=\"axis\" x1=\"{left}\" y1=\"{axis_y:.1}\" x2=\"{right:.1}\" y2=\"{axis_y:.1}\"/>\
         <line class=\"axis\" x1=\"{left}\" y1=\"{top}\" x2=\"{left}\" y2=\"{bottom:.1}\"/>\
         {ticks}\
         <polyline fill=\"none\" stroke=\"{colour}\" stroke-width=\"4\" points=\"{line}\"/>\
         <circle cx=\"{mx:.1}\" cy=\"{my:.1}\" r=\"6\" fill=\"{MARKER_COLOUR}\">\
         <title>Your {label}: {marker}</title></circle>\
         </svg>",
        w = WIDTH,
        h = HEIGHT,
        label = curve.concept.label(),
        left = LEFT,
        right = WIDTH - RIGHT,
        top = TOP,
        bottom = HEIGHT - BOTTOM,
        line = line.join(" "),
        mx = plot.x(f64::from(estimate.income)),
        my = plot.y(marker as f64),
    )
}
