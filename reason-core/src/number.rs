//! Lenient integer decoding for model-generated numbers
//!
//! Generators sometimes emit `3.0` where an integer is asked for. Integral
//! floats are accepted; fractional or out-of-range values are rejected.

use serde::{de::Error, Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Int(i64),
    Float(f64),
}

/// Deserialize an integer that may arrive as an integral float
pub(crate) fn integral<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<i64>,
{
    let n = match RawNumber::deserialize(deserializer)? {
        RawNumber::Int(n) => n,
        RawNumber::Float(f) => {
            if f.fract() != 0.0 || !f.is_finite() || f < i64::MIN as f64 || f >= i64::MAX as f64 {
                return Err(D::Error::custom(format!("expected an integer, got {}", f)));
            }
            f as i64
        }
    };
    T::try_from(n).map_err(|_| D::Error::custom(format!("integer {} out of range", n)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Ranked {
        #[serde(deserialize_with = "integral")]
        priority: u8,
        #[serde(deserialize_with = "integral")]
        severity: i64,
    }

    #[test]
    fn test_accepts_integral_floats() {
        let ranked: Ranked = serde_json::from_str(r#"{"priority": 2.0, "severity": -3}"#).unwrap();
        assert_eq!(ranked.priority, 2);
        assert_eq!(ranked.severity, -3);
    }

    #[test]
    fn test_rejects_fractions_and_overflow() {
        assert!(serde_json::from_str::<Ranked>(r#"{"priority": 2.5, "severity": 1}"#).is_err());
        assert!(serde_json::from_str::<Ranked>(r#"{"priority": 300, "severity": 1}"#).is_err());
        assert!(serde_json::from_str::<Ranked>(r#"{"priority": -1, "severity": 1}"#).is_err());
        assert!(serde_json::from_str::<Ranked>(r#"{"priority": 1, "severity": 1e300}"#).is_err());
    }
}
