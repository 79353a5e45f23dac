//! Currency codes and quote pairs

use crate::core::error::QuoteError;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Three-letter ISO-style currency code, always stored uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CurrencyCode {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        if code.is_empty() {
            return Err(QuoteError::Validation("currency code is required".into()));
        }
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(QuoteError::Validation(format!(
                "invalid currency code: {code}"
            )));
        }
        Ok(Self(code.to_ascii_uppercase()))
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = QuoteError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

impl Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An ordered (base, target) currency pair. Base and target always differ.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pair {
    base: CurrencyCode,
    target: CurrencyCode,
}

impl Pair {
    pub fn new(base: CurrencyCode, target: CurrencyCode) -> Result<Self, QuoteError> {
        if base == target {
            return Err(QuoteError::Validation(format!(
                "currencies are the same: {base}"
            )));
        }
        Ok(Self { base, target })
    }

    pub fn base(&self) -> &CurrencyCode {
        &self.base
    }

    pub fn target(&self) -> &CurrencyCode {
        &self.target
    }

    /// Parses `BASE/TARGET` and, when `allowed` is non-empty, checks both
    /// codes against it.
    pub fn parse_allowed(input: &str, allowed: &[CurrencyCode]) -> Result<Self, QuoteError> {
        let pair: Pair = input.parse()?;
        if !allowed.is_empty()
            && (!allowed.contains(&pair.base) || !allowed.contains(&pair.target))
        {
            return Err(QuoteError::Validation(format!(
                "currency pair is not supported: {pair}"
            )));
        }
        Ok(pair)
    }
}

impl FromStr for Pair {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(QuoteError::Validation("currency pair is required".into()));
        }
        let (base, target) = s.split_once('/').ok_or_else(|| {
            QuoteError::Validation(format!("currency pair requires separator '/': {s}"))
        })?;
        Pair::new(base.parse()?, target.parse()?)
    }
}

impl Display for Pair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.base, self.target)
    }
}
