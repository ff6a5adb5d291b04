//! Rate document loading and validation.
//!
//! The document is read once, validated eagerly and turned into an immutable
//! [`TaxConfig`] that every query borrows.

use super::bracket::{Bracket, BracketError, BracketTable, Levy, SocialBracket};
use super::nl::{Concept, TaxYear, INCOME_CEILING};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::borrow::Cow;
use std::collections::BTreeMap;

const BUNDLED_RATES: &str = include_str!("../../data/rates.json");

/// Largest flat amount a bracket may carry. Together with rates bounded by 1
/// this keeps every curve value and interpolation product inside `Decimal`.
const MAX_AMOUNT: Decimal = dec!(1_000_000_000_000_000);

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid rate document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("income ceiling must be greater than zero")]
    ZeroCeiling,
    #[error("no tax years listed")]
    NoYears,
    #[error("{concept} has no brackets for {year}")]
    MissingTable { concept: Concept, year: TaxYear },
    #[error("{concept} {year}: bracket from {min} has both a rate and an amount")]
    AmbiguousLevy {
        concept: Concept,
        year: TaxYear,
        min: u32,
    },
    #[error("{concept} {year}: bracket from {min} has neither a rate nor an amount")]
    MissingLevy {
        concept: Concept,
        year: TaxYear,
        min: u32,
    },
    #[error("{concept} {year}: bracket from {min} has levy {value} outside the supported range")]
    LevyOutOfRange {
        concept: Concept,
        year: TaxYear,
        min: u32,
        value: Decimal,
    },
    #[error("{concept} {year}: {source}")]
    InvalidTable {
        concept: Concept,
        year: TaxYear,
        source: BracketError,
    },
}

/// Input root of the rate document
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RateDocument {
    /// Supported tax years (integers or strings)
    pub years: Vec<TaxYear>,
    /// Income standing in for the open-ended top bracket
    #[serde(default = "default_ceiling")]
    pub income_ceiling: u32,
    /// Payroll tax brackets per year
    pub payroll_tax: BTreeMap<TaxYear, Vec<BracketRecord>>,
    /// Social security premium brackets per year
    pub social_tax: BTreeMap<TaxYear, Vec<SocialBracketRecord>>,
    /// General tax credit brackets per year
    pub general_credit: BTreeMap<TaxYear, Vec<BracketRecord>>,
    /// Labour tax credit brackets per year
    pub labour_credit: BTreeMap<TaxYear, Vec<BracketRecord>>,
}

fn default_ceiling() -> u32 {
    INCOME_CEILING
}

/// A bracket charging either a `rate` or a flat `amount`
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BracketRecord {
    /// Lowest income in the bracket (inclusive)
    pub min: u32,
    /// Highest income in the bracket (inclusive), omitted for the top bracket
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<u32>,
    /// Multiplier applied to every unit of income in the bracket
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<f64>")]
    pub rate: Option<Decimal>,
    /// Flat amount for the bracket as a whole
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<f64>")]
    pub amount: Option<Decimal>,
}

/// A social security bracket with rates before and after retirement
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SocialBracketRecord {
    /// Lowest income in the bracket (inclusive)
    pub min: u32,
    /// Highest income in the bracket (inclusive), omitted for the top bracket
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<u32>,
    /// Premium rate below retirement age
    #[schemars(with = "f64")]
    pub social: Decimal,
    /// Premium rate from retirement age
    #[schemars(with = "f64")]
    pub older: Decimal,
}

impl BracketRecord {
    fn to_bracket(&self, concept: Concept, year: TaxYear) -> Result<Bracket, ConfigError> {
        let levy = match (self.rate, self.amount) {
            (Some(_), Some(_)) => {
                return Err(ConfigError::AmbiguousLevy {
                    concept,
                    year,
                    min: self.min,
                })
            }
            (None, None) => {
                return Err(ConfigError::MissingLevy {
                    concept,
                    year,
                    min: self.min,
                })
            }
            (None, Some(amount)) => Levy::FlatAmount(amount),
            // older documents flag flat credit amounts by a rate above 1
            (Some(rate), None) if concept.is_credit() && rate > Decimal::ONE => {
                log::warn!(
                    "{} {}: reading rate {} of bracket from {} as a flat amount",
                    concept,
                    year,
                    rate,
                    self.min
                );
                Levy::FlatAmount(rate)
            }
            (Some(rate), None) => Levy::Multiplier(rate),
        };
        check_levy(&levy, concept, year, self.min)?;
        Ok(Bracket {
            min: self.min,
            max: self.max,
            levy,
        })
    }
}

impl SocialBracketRecord {
    fn to_bracket(&self, year: TaxYear) -> Result<SocialBracket, ConfigError> {
        for rate in [self.social, self.older] {
            check_levy(&Levy::Multiplier(rate), Concept::SocialTax, year, self.min)?;
        }
        Ok(SocialBracket {
            min: self.min,
            max: self.max,
            social: self.social,
            older: self.older,
        })
    }
}

/// Rates must lie within -1..=1 and flat amounts within `MAX_AMOUNT`.
fn check_levy(levy: &Levy, concept: Concept, year: TaxYear, min: u32) -> Result<(), ConfigError> {
    let (value, limit) = match *levy {
        Levy::Multiplier(rate) => (rate, Decimal::ONE),
        Levy::FlatAmount(amount) => (amount, MAX_AMOUNT),
    };
    if value.abs() > limit {
        return Err(ConfigError::LevyOutOfRange {
            concept,
            year,
            min,
            value,
        });
    }
    Ok(())
}

/// Validated, read-only bracket tables for every supported year.
#[derive(Debug, Clone)]
pub struct TaxConfig {
    years: Vec<TaxYear>,
    ceiling: u32,
    payroll_tax: BTreeMap<TaxYear, BracketTable>,
    social_tax: BTreeMap<TaxYear, BracketTable<SocialBracket>>,
    general_credit: BTreeMap<TaxYear, BracketTable>,
    labour_credit: BTreeMap<TaxYear, BracketTable>,
    digest: String,
}

impl TaxConfig {
    /// Rates compiled into the binary
    pub fn bundled() -> Result<Self, ConfigError> {
        Self::from_slice(BUNDLED_RATES.as_bytes())
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, ConfigError> {
        let document: RateDocument = serde_json::from_slice(bytes)?;
        let mut config = Self::from_document(document)?;
        config.digest = hex::encode(Sha256::digest(bytes));
        Ok(config)
    }

    pub fn from_document(document: RateDocument) -> Result<Self, ConfigError> {
        let ceiling = document.income_ceiling;
        if ceiling == 0 {
            return Err(ConfigError::ZeroCeiling);
        }

        let mut years = document.years;
        years.sort();
        years.dedup();
        if years.is_empty() {
            return Err(ConfigError::NoYears);
        }

        let mut payroll_tax = BTreeMap::new();
        let mut social_tax = BTreeMap::new();
        let mut general_credit = BTreeMap::new();
        let mut labour_credit = BTreeMap::new();

        for &year in &years {
            payroll_tax.insert(
                year,
                plain_table(&document.payroll_tax, Concept::PayrollTax, year, ceiling)?,
            );
            general_credit.insert(
                year,
                plain_table(&document.general_credit, Concept::GeneralCredit, year, ceiling)?,
            );
            labour_credit.insert(
                year,
                plain_table(&document.labour_credit, Concept::LabourCredit, year, ceiling)?,
            );

            let records = document
                .social_tax
                .get(&year)
                .ok_or(ConfigError::MissingTable {
                    concept: Concept::SocialTax,
                    year,
                })?;
            let brackets = records
                .iter()
                .map(|r| r.to_bracket(year))
                .collect::<Result<Vec<_>, _>>()?;
            let table = BracketTable::new(brackets, ceiling)
                .map_err(|source| ConfigError::InvalidTable {
                    concept: Concept::SocialTax,
                    year,
                    source,
                })?;
            social_tax.insert(year, table);
        }

        for concept in Concept::ALL {
            let listed: Vec<TaxYear> = match concept {
                Concept::PayrollTax => document.payroll_tax.keys().copied().collect(),
                Concept::SocialTax => document.social_tax.keys().copied().collect(),
                Concept::GeneralCredit => document.general_credit.keys().copied().collect(),
                Concept::LabourCredit => document.labour_credit.keys().copied().collect(),
            };
            for year in listed.into_iter().filter(|y| !years.contains(y)) {
                log::warn!("ignoring {} table for unlisted year {}", concept, year);
            }
        }

        log::info!(
            "loaded rates for {} year(s), income ceiling {}",
            years.len(),
            ceiling
        );

        Ok(TaxConfig {
            years,
            ceiling,
            payroll_tax,
            social_tax,
            general_credit,
            labour_credit,
            digest: String::new(),
        })
    }

    /// Supported years, oldest first
    pub fn years(&self) -> &[TaxYear] {
        &self.years
    }

    pub fn has_year(&self, year: TaxYear) -> bool {
        self.years.contains(&year)
    }

    /// Most recent supported year
    pub fn latest_year(&self) -> TaxYear {
        // years is validated non-empty on construction
        self.years[self.years.len() - 1]
    }

    pub fn ceiling(&self) -> u32 {
        self.ceiling
    }

    /// SHA-256 of the document bytes (empty when built from a parsed document)
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Bracket table of `concept` for `year`, with social security rates
    /// resolved for the retirement status.
    pub fn table(&self, concept: Concept, year: TaxYear, retire: bool) -> Option<Cow<'_, BracketTable>> {
        match concept {
            Concept::PayrollTax => self.payroll_tax.get(&year).map(Cow::Borrowed),
            Concept::GeneralCredit => self.general_credit.get(&year).map(Cow::Borrowed),
            Concept::LabourCredit => self.labour_credit.get(&year).map(Cow::Borrowed),
            Concept::SocialTax => self
                .social_tax
                .get(&year)
                .map(|table| Cow::Owned(table.resolve(retire))),
        }
    }

    pub fn bracket_count(&self, concept: Concept, year: TaxYear) -> usize {
        match concept {
            Concept::PayrollTax => self.payroll_tax.get(&year).map_or(0, BracketTable::len),
            Concept::SocialTax => self.social_tax.get(&year).map_or(0, BracketTable::len),
            Concept::GeneralCredit => self.general_credit.get(&year).map_or(0, BracketTable::len),
            Concept::LabourCredit => self.labour_credit.get(&year).map_or(0, BracketTable::len),
        }
    }
}

fn plain_table(
    tables: &BTreeMap<TaxYear, Vec<BracketRecord>>,
    concept: Concept,
    year: TaxYear,
    ceiling: u32,
) -> Result<BracketTable, ConfigError> {
    let records = tables
        .get(&year)
        .ok_or(ConfigError::MissingTable { concept, year })?;
    let brackets = records
        .iter()
        .map(|r| r.to_bracket(concept, year))
        .collect::<Result<Vec<_>, _>>()?;
    BracketTable::new(brackets, ceiling).map_err(|source| ConfigError::InvalidTable {
        concept,
        year,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn document(payroll: &str) -> String {
        format!(
            r#"{{
                "years": ["2030"],
                "payrollTax": {{ "2030": {payroll} }},
                "socialTax": {{ "2030": [
                    {{ "min": 0, "max": 29999, "social": 0.2, "older": 0.1 }},
                    {{ "min": 30000, "social": 0, "older": 0 }}
                ] }},
                "generalCredit": {{ "2030": [
                    {{ "min": 0, "max": 19999, "amount": 3000 }},
                    {{ "min": 20000, "max": 39999, "rate": 0.15 }},
                    {{ "min": 40000, "rate": 0 }}
                ] }},
                "labourCredit": {{ "2030": [
                    {{ "min": 0, "max": 9999, "rate": 0.1 }},
                    {{ "min": 10000, "rate": 0 }}
                ] }}
            }}"#
        )
    }

    const PAYROLL: &str =
        r#"[{ "min": 0, "max": 9999, "rate": 0.10 }, { "min": 10000, "rate": 0.20 }]"#;

    #[test]
    fn bundled_rates_load() {
        let config = TaxConfig::bundled().unwrap();
        assert_eq!(
            config.years(),
            &[TaxYear(2021), TaxYear(2022), TaxYear(2023)]
        );
        assert_eq!(config.latest_year(), TaxYear(2023));
        assert_eq!(config.ceiling(), INCOME_CEILING);
        assert_eq!(config.digest().len(), 64);
        for year in config.years() {
            for concept in Concept::ALL {
                assert!(config.bracket_count(concept, *year) > 0);
            }
        }
    }

    #[test]
    fn string_years_and_default_ceiling() {
        let config = TaxConfig::from_slice(document(PAYROLL).as_bytes()).unwrap();
        assert!(config.has_year(TaxYear(2030)));
        assert!(!config.has_year(TaxYear(2029)));
        assert_eq!(config.ceiling(), 120_000);
        assert_eq!(config.bracket_count(Concept::GeneralCredit, TaxYear(2030)), 3);
    }

    #[test]
    fn ceiling_override() {
        let json = document(PAYROLL).replacen("\"years\"", "\"incomeCeiling\": 150000, \"years\"", 1);
        let config = TaxConfig::from_slice(json.as_bytes()).unwrap();
        assert_eq!(config.ceiling(), 150_000);
    }

    #[test]
    fn amount_and_rate_levies() {
        let config = TaxConfig::from_slice(document(PAYROLL).as_bytes()).unwrap();
        let table = config
            .table(Concept::GeneralCredit, TaxYear(2030), false)
            .unwrap();
        assert_eq!(table.brackets()[0].levy, Levy::FlatAmount(dec!(3000)));
        assert_eq!(table.brackets()[1].levy, Levy::Multiplier(dec!(0.15)));
    }

    #[test]
    fn legacy_rate_above_one_is_flat_amount() {
        let json = document(PAYROLL).replace(r#""amount": 3000"#, r#""rate": 3000"#);
        let config = TaxConfig::from_slice(json.as_bytes()).unwrap();
        let table = config
            .table(Concept::GeneralCredit, TaxYear(2030), false)
            .unwrap();
        assert_eq!(table.brackets()[0].levy, Levy::FlatAmount(dec!(3000)));
    }

    #[test]
    fn social_table_resolved_for_retirement() {
        let config = TaxConfig::from_slice(document(PAYROLL).as_bytes()).unwrap();
        let working = config.table(Concept::SocialTax, TaxYear(2030), false).unwrap();
        let retired = config.table(Concept::SocialTax, TaxYear(2030), true).unwrap();
        assert_eq!(working.brackets()[0].levy, Levy::Multiplier(dec!(0.2)));
        assert_eq!(retired.brackets()[0].levy, Levy::Multiplier(dec!(0.1)));
    }

    #[test]
    fn ambiguous_levy_rejected() {
        let payroll = r#"[{ "min": 0, "max": 9999, "rate": 0.1, "amount": 5 }, { "min": 10000, "rate": 0.2 }]"#;
        let err = TaxConfig::from_slice(document(payroll).as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::AmbiguousLevy {
                concept: Concept::PayrollTax,
                min: 0,
                ..
            }
        ));
    }

    #[test]
    fn missing_levy_rejected() {
        let payroll = r#"[{ "min": 0, "max": 9999 }, { "min": 10000, "rate": 0.2 }]"#;
        let err = TaxConfig::from_slice(document(payroll).as_bytes()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingLevy { .. }));
    }

    #[test]
    fn non_contiguous_table_names_concept_and_year() {
        let payroll = r#"[{ "min": 0, "max": 9999, "rate": 0.1 }, { "min": 12000, "rate": 0.2 }]"#;
        let err = TaxConfig::from_slice(document(payroll).as_bytes()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Payroll Tax 2030: bracket starts at 12000, expected 10000"
        );
    }

    #[test]
    fn missing_table_rejected() {
        let json = document(PAYROLL).replace(r#""years": ["2030"]"#, r#""years": [2030, 2031]"#);
        let err = TaxConfig::from_slice(json.as_bytes()).unwrap_err();
        assert_eq!(err.to_string(), "Payroll Tax has no brackets for 2031");
    }

    #[test]
    fn empty_years_rejected() {
        let json = document(PAYROLL).replace(r#""years": ["2030"]"#, r#""years": []"#);
        let err = TaxConfig::from_slice(json.as_bytes()).unwrap_err();
        assert!(matches!(err, ConfigError::NoYears));
    }

    #[test]
    fn huge_negative_rate_rejected() {
        let json = document(PAYROLL).replace(r#""rate": 0.1 }"#, r#""rate": -7e25 }"#);
        let err = TaxConfig::from_slice(json.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::LevyOutOfRange {
                concept: Concept::LabourCredit,
                min: 0,
                ..
            }
        ));
    }

    #[test]
    fn huge_flat_amount_rejected() {
        let json = document(PAYROLL).replace(r#""rate": 0.1 }"#, r#""amount": 5e25 }"#);
        let err = TaxConfig::from_slice(json.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::LevyOutOfRange {
                concept: Concept::LabourCredit,
                ..
            }
        ));
    }

    #[test]
    fn largest_flat_amount_accepted() {
        let json = document(PAYROLL).replace(r#""amount": 3000"#, r#""amount": 1000000000000000"#);
        let config = TaxConfig::from_slice(json.as_bytes()).unwrap();
        let table = config
            .table(Concept::GeneralCredit, TaxYear(2030), false)
            .unwrap();
        assert_eq!(table.brackets()[0].levy, Levy::FlatAmount(MAX_AMOUNT));
    }

    #[test]
    fn social_rate_above_one_rejected() {
        let json = document(PAYROLL).replace(r#""social": 0.2"#, r#""social": 3"#);
        let err = TaxConfig::from_slice(json.as_bytes()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Social Security Tax 2030: bracket from 0 has levy 3 outside the supported range"
        );
    }

    #[test]
    fn payroll_rate_above_one_is_not_a_flat_amount() {
        let payroll = r#"[{ "min": 0, "max": 9999, "rate": 2 }, { "min": 10000, "rate": 0.2 }]"#;
        let err = TaxConfig::from_slice(document(payroll).as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::LevyOutOfRange {
                concept: Concept::PayrollTax,
                min: 0,
                ..
            }
        ));
    }

    #[test]
    fn zero_ceiling_rejected() {
        let json = document(PAYROLL).replacen("\"years\"", "\"incomeCeiling\": 0, \"years\"", 1);
        let err = TaxConfig::from_slice(json.as_bytes()).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroCeiling));
    }

    #[test]
    fn malformed_json_rejected() {
        let err = TaxConfig::from_slice(b"{ \"years\": ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
