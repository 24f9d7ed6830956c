//! Fixed-point amounts of external currency (6 decimal places).

use crate::errors::{AppError, AppResult};
use serde::Serialize;
use std::fmt;

const SCALE: u64 = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Amount {
    pub micros: u64,
}

impl Amount {
    /// Parse a positive decimal such as `1`, `0.5` or `2.125`.
    pub fn parse(s: &str) -> AppResult<Self> {
        let invalid = || AppError::InvalidAmount(s.to_string());
        let s_trim = s.trim();

        let (whole, frac) = match s_trim.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s_trim, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        if frac.len() > 6
            || !whole.chars().all(|c| c.is_ascii_digit())
            || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }

        let whole: u64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let frac_micros: u64 = if frac.is_empty() {
            0
        } else {
            format!("{:0<6}", frac).parse().map_err(|_| invalid())?
        };

        let micros = whole
            .checked_mul(SCALE)
            .and_then(|m| m.checked_add(frac_micros))
            .ok_or_else(invalid)?;

        if micros == 0 {
            return Err(invalid());
        }
        Ok(Self { micros })
    }

    /// Whole tokens worth this amount at `rate` tokens per unit, floored.
    pub fn convert(&self, rate: i64) -> i64 {
        let credit = u128::from(self.micros) * rate.max(0) as u128 / u128::from(SCALE);
        i64::try_from(credit).unwrap_or(i64::MAX)
    }

    /// Integer string in the token's smallest unit (e.g. 18 decimals).
    pub fn to_token_units(&self, decimals: u32) -> String {
        if decimals >= 6 {
            format!("{}{}", self.micros, "0".repeat((decimals - 6) as usize))
        } else {
            (self.micros / 10u64.pow(6 - decimals)).to_string()
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.micros / SCALE;
        let frac = self.micros % SCALE;
        if frac == 0 {
            write!(f, "{}", whole)
        } else {
            let digits = format!("{:06}", frac);
            write!(f, "{}.{}", whole, digits.trim_end_matches('0'))
        }
    }
}
