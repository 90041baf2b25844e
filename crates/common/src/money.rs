use serde::{Deserialize, Serialize};

/// Money amount represented in minor units to avoid floating point issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money {
    /// Amount in minor units (e.g., 1000 = $10.00)
    minor_units: i64,
}

impl Money {
    /// Creates a new Money amount from minor units.
    pub fn from_minor_units(minor_units: i64) -> Self {
        Self { minor_units }
    }

    /// Converts a major-unit price (e.g. a catalog price of `10.00`) into
    /// minor units.
    ///
    /// Rounds half away from zero.
    pub fn from_major(major: f64) -> Self {
        Self {
            minor_units: (major * 100.0).round() as i64,
        }
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self { minor_units: 0 }
    }

    /// Returns the amount in minor units.
    pub fn minor_units(&self) -> i64 {
        self.minor_units
    }

    /// Returns the amount in major units.
    pub fn as_major(&self) -> f64 {
        self.minor_units as f64 / 100.0
    }

    /// Returns the major-unit portion (whole number).
    pub fn major_part(&self) -> i64 {
        self.minor_units / 100
    }

    /// Returns the minor-unit remainder after the major part.
    pub fn minor_part(&self) -> i64 {
        self.minor_units.abs() % 100
    }

    /// Returns true if the amount is positive.
    pub fn is_positive(&self) -> bool {
        self.minor_units > 0
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.minor_units == 0
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.minor_units < 0 {
            write!(f, "-{}.{:02}", self.major_part().abs(), self.minor_part())
        } else {
            write!(f, "{}.{:02}", self.major_part(), self.minor_part())
        }
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money {
            minor_units: self.minor_units + rhs.minor_units,
        }
    }
}

impl std::ops::Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Self) -> Self::Output {
        Money {
            minor_units: self.minor_units - rhs.minor_units,
        }
    }
}

impl std::ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.minor_units += rhs.minor_units;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_from_minor_units() {
        let money = Money::from_minor_units(1234);
        assert_eq!(money.minor_units(), 1234);
        assert_eq!(money.major_part(), 12);
        assert_eq!(money.minor_part(), 34);
    }

    #[test]
    fn test_money_from_major_exact() {
        assert_eq!(Money::from_major(10.0).minor_units(), 1000);
        assert_eq!(Money::from_major(0.0).minor_units(), 0);
        assert_eq!(Money::from_major(19.99).minor_units(), 1999);
    }

    #[test]
    fn test_money_from_major_rounds_half_away_from_zero() {
        // 0.125 and 10.125 are exactly representable in binary
        assert_eq!(Money::from_major(0.125).minor_units(), 13);
        assert_eq!(Money::from_major(10.125).minor_units(), 1013);
        assert_eq!(Money::from_major(-0.125).minor_units(), -13);
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::from_minor_units(1234).to_string(), "12.34");
        assert_eq!(Money::from_minor_units(100).to_string(), "1.00");
        assert_eq!(Money::from_minor_units(5).to_string(), "0.05");
        assert_eq!(Money::from_minor_units(-1234).to_string(), "-12.34");
    }

    #[test]
    fn test_money_arithmetic() {
        let a = Money::from_minor_units(1000);
        let b = Money::from_minor_units(500);

        assert_eq!((a + b).minor_units(), 1500);
        assert_eq!((a - b).minor_units(), 500);

        let mut c = a;
        c += b;
        assert_eq!(c.minor_units(), 1500);
    }

    #[test]
    fn test_money_as_major_roundtrip() {
        let money = Money::from_major(10.0);
        assert_eq!(money.as_major(), 10.0);
    }

    #[test]
    fn test_money_comparison() {
        assert!(Money::from_minor_units(100).is_positive());
        assert!(Money::from_minor_units(0).is_zero());
    }

    #[test]
    fn test_money_serialization_roundtrip() {
        let money = Money::from_minor_units(999);
        let json = serde_json::to_string(&money).unwrap();
        let deserialized: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(money, deserialized);
    }
}
