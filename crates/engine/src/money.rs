use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Currency, EngineError, ResultEngine};

/// Rupee amount held as integer paise.
///
/// Signed only so a remaining balance can drop below zero; allocations and
/// spends are always in `1..=Money::MAX_ENTRY`.
///
/// ```rust
/// use engine::Money;
///
/// let amount: Money = "12,5".parse().unwrap();
/// assert_eq!(amount.minor(), 1250);
/// assert_eq!(amount.with_symbol(), "Rs. 12.50");
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

const PAISE_PER_RUPEE: i64 = 100;

impl Money {
    pub const ZERO: Money = Money(0);

    /// Largest single allocation or spend: one hundred billion rupees.
    pub const MAX_ENTRY: Money = Money(100_000_000_000 * PAISE_PER_RUPEE);

    #[must_use]
    pub const fn new(minor: i64) -> Self {
        Self(minor)
    }

    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    #[must_use]
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    #[must_use]
    pub fn checked_sub(self, rhs: Money) -> Option<Money> {
        self.0.checked_sub(rhs.0).map(Money)
    }

    /// Sum of `amounts`, or `InvalidAmount` when the total leaves `i64`.
    pub fn total<I: IntoIterator<Item = Money>>(amounts: I) -> ResultEngine<Money> {
        amounts
            .into_iter()
            .try_fold(Money::ZERO, Money::checked_add)
            .ok_or_else(|| EngineError::InvalidAmount("total out of range".to_string()))
    }

    /// Formats the amount with the currency symbol used on statements.
    #[must_use]
    pub fn with_symbol(self) -> String {
        format!("{} {self}", Currency::Inr.symbol())
    }

    /// Check that `self` is usable as one allocation or spend.
    pub fn ensure_entry(self) -> ResultEngine<Money> {
        if !self.is_positive() {
            return Err(EngineError::InvalidAmount(
                "amount must be greater than zero".to_string(),
            ));
        }
        if self > Self::MAX_ENTRY {
            return Err(EngineError::InvalidAmount(format!(
                "amount must not exceed {}",
                Self::MAX_ENTRY
            )));
        }
        Ok(self)
    }

    /// Parse user input as one allocation or spend.
    pub fn parse_positive(input: &str) -> ResultEngine<Self> {
        input.parse::<Money>()?.ensure_entry()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let paise = self.0.unsigned_abs();
        let rupees = paise / PAISE_PER_RUPEE as u64;
        let rest = paise % PAISE_PER_RUPEE as u64;
        if self.0 < 0 {
            f.write_str("-")?;
        }
        write!(f, "{rupees}.{rest:02}")
    }
}

fn digits(part: &str) -> Option<i64> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

impl FromStr for Money {
    type Err = EngineError;

    /// Decimal rupees with at most two places, `.` or `,` as separator and
    /// an optional sign.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidAmount(format!("not an amount: {:?}", s.trim()));

        let text = s.trim();
        let (sign, unsigned) = match text.as_bytes().first() {
            Some(b'-') => (-1, &text[1..]),
            Some(b'+') => (1, &text[1..]),
            _ => (1, text),
        };

        let (rupees, paise) = match unsigned.split_once(['.', ',']) {
            None => (unsigned, ""),
            Some((rupees, paise)) => (rupees, paise),
        };
        let rupees = digits(rupees).ok_or_else(invalid)?;
        let paise = match paise.len() {
            0 => 0,
            1 => digits(paise).ok_or_else(invalid)? * 10,
            2 => digits(paise).ok_or_else(invalid)?,
            _ => return Err(EngineError::InvalidAmount("too many decimals".to_string())),
        };

        rupees
            .checked_mul(PAISE_PER_RUPEE)
            .and_then(|minor| minor.checked_add(paise))
            .map(|minor| Money(sign * minor))
            .ok_or_else(|| EngineError::InvalidAmount("amount too large".to_string()))
    }
}
