pub mod bracket;
pub mod chart;
pub mod config;
pub mod curve;
pub mod estimate;
pub mod nl;

// Flat public surface for domain types and functions.
#[allow(unused_imports)]
pub use bracket::{Bracket, BracketError, BracketTable, Levy, SocialBracket, Tier};
#[allow(unused_imports)]
pub use chart::{ChartPoint, ChartSeries, SAMPLES_PER_SEGMENT};
#[allow(unused_imports)]
pub use config::{BracketRecord, ConfigError, RateDocument, SocialBracketRecord, TaxConfig};
#[allow(unused_imports)]
pub use curve::{build_curve, Curve};
#[allow(unused_imports)]
pub use estimate::{concept_curve, estimate, Assessment, ConceptCurve, Estimate, Query, QueryError};
#[allow(unused_imports)]
pub use nl::{Concept, TaxYear, INCOME_CEILING};
