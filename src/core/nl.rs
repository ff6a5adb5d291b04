use schemars::JsonSchema;
use serde::de::{self, Unexpected, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Synthetic upper bound used in place of the open-ended top bracket.
pub const INCOME_CEILING: u32 = 120_000;

/// Dutch tax year (calendar year)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, JsonSchema)]
pub struct TaxYear(pub u16);

impl TaxYear {
    pub fn display(&self) -> String {
        self.0.to_string()
    }
}

impl fmt::Display for TaxYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Years appear both as integers (`2023`) and as strings (`"2023"`), the
/// latter always when used as an object key.
impl<'de> Deserialize<'de> for TaxYear {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct YearVisitor;

        impl Visitor<'_> for YearVisitor {
            type Value = TaxYear;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a tax year as an integer or a string")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<TaxYear, E> {
                u16::try_from(v)
                    .map(TaxYear)
                    .map_err(|_| E::invalid_value(Unexpected::Unsigned(v), &self))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<TaxYear, E> {
                u16::try_from(v)
                    .map(TaxYear)
                    .map_err(|_| E::invalid_value(Unexpected::Signed(v), &self))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<TaxYear, E> {
                v.trim()
                    .parse::<u16>()
                    .map(TaxYear)
                    .map_err(|_| E::invalid_value(Unexpected::Str(v), &self))
            }
        }

        deserializer.deserialize_any(YearVisitor)
    }
}

/// The four independently computed components of the estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Concept {
    PayrollTax,
    SocialTax,
    GeneralCredit,
    LabourCredit,
}

impl Concept {
    pub const ALL: [Concept; 4] = [
        Concept::PayrollTax,
        Concept::SocialTax,
        Concept::GeneralCredit,
        Concept::LabourCredit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Concept::PayrollTax => "Payroll Tax",
            Concept::SocialTax => "Social Security Tax",
            Concept::GeneralCredit => "General Tax Credit",
            Concept::LabourCredit => "Labour Tax Credit",
        }
    }

    /// Credits are added to net income, taxes are subtracted.
    pub fn is_credit(&self) -> bool {
        matches!(self, Concept::GeneralCredit | Concept::LabourCredit)
    }
}

impl fmt::Display for Concept {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn tax_year_from_integer() {
        let year: TaxYear = serde_json::from_str("2023").unwrap();
        assert_eq!(year, TaxYear(2023));
    }

    #[test]
    fn tax_year_from_string() {
        let year: TaxYear = serde_json::from_str("\" 2022\"").unwrap();
        assert_eq!(year, TaxYear(2022));
    }

    #[test]
    fn tax_year_as_object_key() {
        let map: BTreeMap<TaxYear, u32> =
            serde_json::from_str(r#"{"2023": 1, "2021": 2}"#).unwrap();
        let years: Vec<_> = map.keys().copied().collect();
        assert_eq!(years, vec![TaxYear(2021), TaxYear(2023)]);
    }

    #[test]
    fn tax_year_rejects_garbage() {
        assert!(serde_json::from_str::<TaxYear>("\"next year\"").is_err());
        assert!(serde_json::from_str::<TaxYear>("-1").is_err());
        assert!(serde_json::from_str::<TaxYear>("70000").is_err());
    }

    #[test]
    fn tax_year_display() {
        assert_eq!(TaxYear(2023).display(), "2023");
        assert_eq!(TaxYear(2021).to_string(), "2021");
    }

    #[test]
    fn credits_and_taxes() {
        assert!(!Concept::PayrollTax.is_credit());
        assert!(!Concept::SocialTax.is_credit());
        assert!(Concept::GeneralCredit.is_credit());
        assert!(Concept::LabourCredit.is_credit());
    }

    #[test]
    fn concept_labels() {
        assert_eq!(Concept::SocialTax.to_string(), "Social Security Tax");
        assert_eq!(Concept::LabourCredit.label(), "Labour Tax Credit");
    }
}
