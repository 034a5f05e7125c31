use std::{fmt, str::FromStr, sync::LazyLock};

use regex::Regex;

use crate::account::ValidationError;

static PHONE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\+7\d{3}-\d{3}-\d{2}-\d{2}$").expect("phone pattern is a valid regex")
});

const PASSPORT_MIN: u32 = 10_000_000;
const PASSPORT_MAX: u32 = 99_999_999;

/// Passport number, the external key of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Passport(u32);

impl Passport {
    pub fn new(number: u32) -> Result<Self, ValidationError> {
        if (PASSPORT_MIN..=PASSPORT_MAX).contains(&number) {
            Ok(Self(number))
        } else {
            Err(ValidationError::PassportLength)
        }
    }

    pub fn number(self) -> u32 {
        self.0
    }
}

impl FromStr for Passport {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // wider than u32 so that "123456789012" reports the length, not the digits
        let number: u64 = s
            .trim()
            .parse()
            .map_err(|_| ValidationError::PassportDigits)?;
        u32::try_from(number)
            .map_err(|_| ValidationError::PassportLength)
            .and_then(Self::new)
    }
}

impl fmt::Display for Passport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Phone number in the `+7DDD-DDD-DD-DD` form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for PhoneNumber {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if PHONE_PATTERN.is_match(s) {
            Ok(Self(s.to_owned()))
        } else {
            Err(ValidationError::PhoneFormat)
        }
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
