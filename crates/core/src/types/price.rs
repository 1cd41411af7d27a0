//! Fixed-point price representation on the wire.
//!
//! Prices are stored as `NUMERIC(10,2)` and handled in-process as
//! [`rust_decimal::Decimal`]. On the wire they are always strings with
//! exactly two fraction digits ("150.00"), accepted back as either a
//! string or a bare JSON number.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serializer};

/// Format a decimal with exactly two fraction digits.
#[must_use]
pub fn format_two_dp(value: Decimal) -> String {
    format!("{:.2}", value.round_dp(2))
}

/// Incoming price payloads may be a string or a JSON number.
#[derive(Deserialize)]
#[serde(untagged)]
enum DecimalInput {
    Text(String),
    Float(f64),
    Int(i64),
}

fn decimal_from_input<E: serde::de::Error>(input: DecimalInput) -> Result<Decimal, E> {
    match input {
        DecimalInput::Text(s) => s
            .trim()
            .parse::<Decimal>()
            .map_err(|e| E::custom(format!("invalid decimal: {e}"))),
        DecimalInput::Float(f) => {
            Decimal::try_from(f).map_err(|e| E::custom(format!("invalid decimal: {e}")))
        }
        DecimalInput::Int(i) => Ok(Decimal::from(i)),
    }
}

/// Serde adapter for required price fields.
///
/// ```
/// use rust_decimal::Decimal;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Tier {
///     #[serde(with = "giglet_core::types::price::two_dp")]
///     price: Decimal,
/// }
///
/// let tier: Tier = serde_json::from_str(r#"{"price": 150}"#).unwrap();
/// assert_eq!(serde_json::to_string(&tier).unwrap(), r#"{"price":"150.00"}"#);
/// ```
pub mod two_dp {
    use super::{Decimal, DecimalInput, Deserialize, Deserializer, Serializer, decimal_from_input};

    pub fn serialize<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_two_dp(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        decimal_from_input(DecimalInput::deserialize(deserializer)?)
    }
}

/// Serde adapter for optional price fields.
///
/// Serializes `None` as `null` (derived aggregates stay null when absent,
/// never zero).
pub mod two_dp_opt {
    use super::{Decimal, DecimalInput, Deserialize, Deserializer, Serializer, decimal_from_input};

    pub fn serialize<S: Serializer>(
        value: &Option<Decimal>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.serialize_str(&super::format_two_dp(*v)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Decimal>, D::Error> {
        let input = Option::<DecimalInput>::deserialize(deserializer)?;
        input.map(decimal_from_input).transpose()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize, Deserialize)]
    struct Priced {
        #[serde(with = "two_dp")]
        price: Decimal,
    }

    #[derive(Serialize, Deserialize)]
    struct MaybePriced {
        #[serde(with = "two_dp_opt")]
        min_price: Option<Decimal>,
    }

    #[test]
    fn test_serializes_two_fraction_digits() {
        let p = Priced {
            price: Decimal::new(150, 0),
        };
        assert_eq!(serde_json::to_string(&p).unwrap(), r#"{"price":"150.00"}"#);
    }

    #[test]
    fn test_serializes_rounded() {
        let p = Priced {
            price: "99.999".parse().unwrap(),
        };
        assert_eq!(serde_json::to_string(&p).unwrap(), r#"{"price":"100.00"}"#);
    }

    #[test]
    fn test_deserializes_from_string_and_number() {
        let from_str: Priced = serde_json::from_str(r#"{"price":"150.00"}"#).unwrap();
        let from_int: Priced = serde_json::from_str(r#"{"price":150}"#).unwrap();
        let from_float: Priced = serde_json::from_str(r#"{"price":150.5}"#).unwrap();
        assert_eq!(from_str.price, Decimal::new(15000, 2));
        assert_eq!(from_int.price, Decimal::new(150, 0));
        assert_eq!(from_float.price, "150.5".parse().unwrap());
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(serde_json::from_str::<Priced>(r#"{"price":"abc"}"#).is_err());
    }

    #[test]
    fn test_optional_none_is_null() {
        let m = MaybePriced { min_price: None };
        assert_eq!(
            serde_json::to_string(&m).unwrap(),
            r#"{"min_price":null}"#
        );
        let parsed: MaybePriced = serde_json::from_str(r#"{"min_price":null}"#).unwrap();
        assert!(parsed.min_price.is_none());
    }

    #[test]
    fn test_optional_some() {
        let m = MaybePriced {
            min_price: Some(Decimal::new(15000, 2)),
        };
        assert_eq!(
            serde_json::to_string(&m).unwrap(),
            r#"{"min_price":"150.00"}"#
        );
    }
}
