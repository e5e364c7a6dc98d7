use std::fmt;

/// Monetary or rate value paired with its integer-cents shadow.
///
/// The shadow is what lands on disk, so equality and rendering go through it:
/// two amounts that encode to the same columns compare equal.
#[derive(Debug, Clone, Copy, Default)]
pub struct Amount {
    value: f64,
    cents: i64,
}

impl Amount {
    /// Build from a display value, truncating to whole cents.
    pub fn from_value(value: f64) -> Self {
        Self {
            value,
            cents: to_cents(value),
        }
    }

    /// Build from a display value, rounding half away from zero to cents.
    pub fn rounded(value: f64) -> Self {
        Self::from_cents((value * 100.0).round() as i64)
    }

    /// Build from the on-disk representation.
    pub fn from_cents(cents: i64) -> Self {
        Self {
            value: cents as f64 / 100.0,
            cents,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn cents(&self) -> i64 {
        self.cents
    }
}

impl PartialEq for Amount {
    fn eq(&self, other: &Self) -> bool {
        self.cents == other.cents
    }
}

impl Eq for Amount {}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.cents < 0 { "-" } else { "" };
        let abs = self.cents.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

/// Multiply by 100 and truncate toward zero.
pub fn to_cents(value: f64) -> i64 {
    truncate_units(value * 100.0)
}

/// Truncate toward zero after discarding binary noise.
///
/// `0.29 * 100.0` is `28.999999999999996` in f64; it must truncate to 29.
/// Noise is anything within 1e-6 of an integer, widened for large
/// magnitudes where one ulp already exceeds that.
pub fn truncate_units(value: f64) -> i64 {
    let nearest = value.round();
    let tolerance = 1e-6_f64.max(value.abs() * 1e-12);
    if (value - nearest).abs() <= tolerance {
        nearest as i64
    } else {
        value.trunc() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_instead_of_rounding() {
        assert_eq!(to_cents(123.456), 12345);
        assert_eq!(to_cents(-0.459), -45);
        assert_eq!(to_cents(0.29), 29);
    }

    #[test]
    fn renders_from_cents() {
        assert_eq!(Amount::from_cents(12345).to_string(), "123.45");
        assert_eq!(Amount::from_cents(-45).to_string(), "-0.45");
        assert_eq!(Amount::from_value(3.4000000000000004).to_string(), "3.40");
        assert_eq!(Amount::rounded(0.125).to_string(), "0.13");
    }

    #[test]
    fn equality_follows_disk_representation() {
        assert_eq!(Amount::from_value(123.456), Amount::from_cents(12345));
        assert_ne!(Amount::from_value(123.46), Amount::from_cents(12345));
    }
}
