use std::{fmt, str::FromStr};

use thiserror::Error;

/// Example formats shown to the user after a rejected notation.
pub const VALID_FORMATS: &str = "1d20, 3d6, 4d8+3, 2d10-1";

/// A validated `<count>d<sides>[+/-modifier]` roll request.
///
/// Every total the spec can produce fits in an `i64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollSpec {
    count: u32,
    sides: u32,
    modifier: i64,
}

impl RollSpec {
    /// Build a spec directly, applying the same checks as [`parse`].
    pub fn new(count: u32, sides: u32, modifier: i64) -> Result<Self, NotationError> {
        if count == 0 {
            return Err(NotationError::ZeroCount);
        }
        if sides == 0 {
            return Err(NotationError::ZeroSides);
        }

        // count >= 1, so only the largest possible total can overflow.
        let highest = i64::from(count)
            .checked_mul(i64::from(sides))
            .and_then(|max_sum| max_sum.checked_add(modifier));
        if highest.is_none() {
            return Err(NotationError::OutOfRange(format!(
                "{}d{}{:+}",
                count, sides, modifier
            )));
        }

        Ok(Self {
            count,
            sides,
            modifier,
        })
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn sides(&self) -> u32 {
        self.sides
    }

    pub fn modifier(&self) -> i64 {
        self.modifier
    }
}

impl fmt::Display for RollSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)?;
        if self.modifier != 0 {
            write!(f, "{:+}", self.modifier)?;
        }
        Ok(())
    }
}

impl FromStr for RollSpec {
    type Err = NotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotationError {
    #[error("'{0}' does not match <count>d<sides>[+/-modifier]")]
    Malformed(String),
    #[error("dice count must be at least 1")]
    ZeroCount,
    #[error("dice must have at least 1 side")]
    ZeroSides,
    #[error("'{0}' is too large")]
    OutOfRange(String),
}

/// Parse dice notation such as `1d20`, `3d6` or `4d8+3`.
///
/// Surrounding whitespace and interior spaces are ignored; the separator is
/// case-insensitive. Anything else outside the grammar is rejected.
pub fn parse(text: &str) -> Result<RollSpec, NotationError> {
    let normalized: String = text.trim().chars().filter(|c| *c != ' ').collect();
    let malformed = || NotationError::Malformed(normalized.clone());

    let (count_part, rest) = normalized
        .split_once(['d', 'D'])
        .ok_or_else(malformed)?;

    let (sides_part, modifier_part) = match rest.find(['+', '-']) {
        Some(idx) => (&rest[..idx], Some(rest.split_at(idx).1)),
        None => (rest, None),
    };

    if !is_digits(count_part) || !is_digits(sides_part) {
        return Err(malformed());
    }

    let count: u32 = parse_number(count_part)?;
    let sides: u32 = parse_number(sides_part)?;

    let modifier = match modifier_part {
        Some(part) => {
            // `part` starts with the sign; split_at(1) is safe on ASCII.
            let (sign, digits) = part.split_at(1);
            if !is_digits(digits) {
                return Err(malformed());
            }
            let magnitude: i64 = parse_number(digits)?;
            if sign == "-" { -magnitude } else { magnitude }
        }
        None => 0,
    };

    RollSpec::new(count, sides, modifier)
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn parse_number<T: FromStr>(digits: &str) -> Result<T, NotationError> {
    digits
        .parse()
        .map_err(|_| NotationError::OutOfRange(digits.to_string()))
}
