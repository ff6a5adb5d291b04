use rust_decimal::Decimal;
use serde::Serialize;

/// How a bracket charges the income that falls inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Levy {
    /// Fraction of every unit of income in the bracket
    Multiplier(Decimal),
    /// Fixed amount for the bracket as a whole
    FlatAmount(Decimal),
}

impl Levy {
    /// Amount levied over `width` units of income
    pub fn over(&self, width: u32) -> Decimal {
        match self {
            Levy::Multiplier(rate) => Decimal::from(width) * rate,
            Levy::FlatAmount(amount) => *amount,
        }
    }
}

/// One tier of a stepped tax or credit rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Bracket {
    pub min: u32,
    /// Inclusive upper bound, `None` for the open-ended top tier
    pub max: Option<u32>,
    pub levy: Levy,
}

/// Social security tier with separate rates before and after retirement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SocialBracket {
    pub min: u32,
    pub max: Option<u32>,
    pub social: Decimal,
    pub older: Decimal,
}

impl SocialBracket {
    pub fn for_status(&self, retire: bool) -> Bracket {
        let rate = if retire { self.older } else { self.social };
        Bracket {
            min: self.min,
            max: self.max,
            levy: Levy::Multiplier(rate),
        }
    }
}

/// Income bounds shared by every kind of bracket
pub trait Tier {
    fn min(&self) -> u32;
    fn max(&self) -> Option<u32>;
}

impl Tier for Bracket {
    fn min(&self) -> u32 {
        self.min
    }
    fn max(&self) -> Option<u32> {
        self.max
    }
}

impl Tier for SocialBracket {
    fn min(&self) -> u32 {
        self.min
    }
    fn max(&self) -> Option<u32> {
        self.max
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BracketError {
    #[error("no brackets defined")]
    Empty,
    #[error("first bracket starts at {0}, expected 0")]
    FirstMin(u32),
    #[error("bracket starts at {found}, expected {expected}")]
    NotContiguous { expected: u32, found: u32 },
    #[error("bracket {min}..={max} ends before it starts")]
    Inverted { min: u32, max: u32 },
    #[error("open-ended bracket from {0} is not the last bracket")]
    OpenEndedNotLast(u32),
    #[error("last bracket ends at {0} but must be open-ended")]
    MissingOpenEnded(u32),
    #[error("bracket ending at {max} reaches the income ceiling {ceiling}")]
    ReachesCeiling { max: u32, ceiling: u32 },
}

/// Ordered, contiguous brackets with exactly one open-ended top tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BracketTable<T = Bracket> {
    brackets: Vec<T>,
}

impl<T: Tier> BracketTable<T> {
    pub fn new(brackets: Vec<T>, ceiling: u32) -> Result<Self, BracketError> {
        validate(&brackets, ceiling)?;
        Ok(BracketTable { brackets })
    }

    pub fn brackets(&self) -> &[T] {
        &self.brackets
    }

    pub fn len(&self) -> usize {
        self.brackets.len()
    }
}

impl BracketTable<SocialBracket> {
    /// Pick the social or older rate of every bracket.
    pub fn resolve(&self, retire: bool) -> BracketTable<Bracket> {
        BracketTable {
            brackets: self
                .brackets
                .iter()
                .map(|b| b.for_status(retire))
                .collect(),
        }
    }
}

fn validate<T: Tier>(brackets: &[T], ceiling: u32) -> Result<(), BracketError> {
    let first = brackets.first().ok_or(BracketError::Empty)?;
    if first.min() != 0 {
        return Err(BracketError::FirstMin(first.min()));
    }

    let last_index = brackets.len() - 1;
    let mut expected = 0;
    for (i, bracket) in brackets.iter().enumerate() {
        if bracket.min() != expected {
            return Err(BracketError::NotContiguous {
                expected,
                found: bracket.min(),
            });
        }
        match bracket.max() {
            Some(max) if max < bracket.min() => {
                return Err(BracketError::Inverted {
                    min: bracket.min(),
                    max,
                })
            }
            // max + 1 becomes a curve threshold and must stay below the ceiling
            Some(max) if max.saturating_add(1) >= ceiling => {
                return Err(BracketError::ReachesCeiling { max, ceiling })
            }
            Some(max) if i == last_index => return Err(BracketError::MissingOpenEnded(max)),
            Some(max) => expected = max + 1,
            None if i != last_index => {
                return Err(BracketError::OpenEndedNotLast(bracket.min()))
            }
            None => {}
        }
    }
    Ok(())
}
