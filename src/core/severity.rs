//! Anomaly severity classification.

use std::fmt;

use crate::core::price::Percent;

/// Categorical label derived from the magnitude of a price change
/// expressed in multiples of the base threshold `T` (§4.2, GLOSSARY).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Classifies `change` (already `abs`-ed by the caller) against the
    /// base threshold `t`. Caller guarantees `change >= t`, i.e. this
    /// is only called once an update has already crossed the anomaly
    /// bar.
    pub fn classify(change: Percent, t: Percent) -> Self {
        if change.raw() < t.scaled_by(2).raw() {
            Severity::Low
        } else if change.raw() < t.scaled_by(5).raw() {
            Severity::Medium
        } else if change.raw() < t.scaled_by(10).raw() {
            Severity::High
        } else {
            Severity::Critical
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
            Severity::Critical => "Critical",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t() -> Percent {
        Percent::from_f64(2.0)
    }

    #[test]
    fn low_just_under_two_t() {
        assert_eq!(Severity::classify(Percent::from_f64(3.0), t()), Severity::Low);
    }

    #[test]
    fn medium_at_two_t() {
        assert_eq!(Severity::classify(Percent::from_f64(4.0), t()), Severity::Medium);
    }

    #[test]
    fn high_at_five_t() {
        assert_eq!(Severity::classify(Percent::from_f64(10.0), t()), Severity::High);
    }

    #[test]
    fn critical_at_ten_t() {
        assert_eq!(Severity::classify(Percent::from_f64(20.0), t()), Severity::Critical);
    }

    #[test]
    fn critical_for_large_jump_matches_scenario_3() {
        // 100 -> 125 is a 25% change, T = 2% -> 12.5T, Critical.
        assert_eq!(Severity::classify(Percent::from_f64(25.0), t()), Severity::Critical);
    }
}
