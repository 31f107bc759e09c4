use std::str::FromStr;

use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::{prelude::FromPrimitive, Decimal};
use serde_json::Value as JsonValue;

/// A JSON endpoint whose fields are read with a "missing means zero" policy.
#[async_trait]
pub trait FieldSource: Sync + Send {
    async fn fetch_object(&self) -> Result<JsonValue>;

    async fn get_field(&self, name: &str) -> Result<JsonValue> {
        Ok(field_or_zero(&self.fetch_object().await?, name))
    }
}

/// Returns `object[name]`, or `0` when it is absent, null or falsy.
pub fn field_or_zero(object: &JsonValue, name: &str) -> JsonValue {
    match object.get(name) {
        Some(value) if is_truthy(value) => value.clone(),
        _ => JsonValue::from(0),
    }
}

fn is_truthy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => false,
        JsonValue::Bool(b) => *b,
        JsonValue::Number(n) => n.as_f64().map_or(false, |f| f != 0.),
        JsonValue::String(s) => !s.is_empty(),
        JsonValue::Array(a) => !a.is_empty(),
        JsonValue::Object(o) => !o.is_empty(),
    }
}

fn as_f64(value: &JsonValue) -> f64 {
    match value {
        JsonValue::Number(n) => n.as_f64().unwrap_or(0.),
        JsonValue::String(s) => s.trim().parse().unwrap_or(0.),
        _ => 0.,
    }
}

fn as_string(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PoolStats {
    pub global_hashrate: f64,
    pub num_workers: u64,
    pub difficulty: f64,
    pub pool_hashrate: f64,
    pub total_pending_payout: f64,
    pub total_payout_amount: f64,
}

impl PoolStats {
    pub fn from_object(object: &JsonValue) -> PoolStats {
        let num = |name| as_f64(&field_or_zero(object, name));
        let workers = num("num_workers");
        PoolStats {
            global_hashrate: num("global_hashrate"),
            num_workers: if workers > 0. { workers as u64 } else { 0 },
            difficulty: num("difficulty"),
            pool_hashrate: num("pool_hashrate"),
            total_pending_payout: num("total_pending_payout"),
            total_payout_amount: num("total_payout_amount"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TokenTicker {
    pub currency_pair: String,
    pub last: Decimal,
    pub change_percentage: String,
}

impl TokenTicker {
    /// Builds a ticker from the pair object; `pair` stands in for a missing
    /// `currency_pair` field.
    pub fn from_object(object: &JsonValue, pair: &str) -> TokenTicker {
        let currency_pair = match field_or_zero(object, "currency_pair") {
            JsonValue::String(s) => s,
            _ => pair.to_owned(),
        };
        let last = match field_or_zero(object, "last") {
            JsonValue::String(s) => Decimal::from_str(s.trim()).unwrap_or_default(),
            JsonValue::Number(n) => n.as_f64().and_then(Decimal::from_f64).unwrap_or_default(),
            _ => Decimal::ZERO,
        };
        TokenTicker {
            currency_pair,
            last,
            change_percentage: as_string(&field_or_zero(object, "change_percentage")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn falsy_fields_become_zero() {
        let object = json!({
            "a": null,
            "b": false,
            "c": 0,
            "d": "",
            "e": [],
            "f": 12.5,
            "g": "x",
        });
        for name in ["a", "b", "c", "d", "e", "missing"] {
            assert_eq!(field_or_zero(&object, name), json!(0), "{}", name);
        }
        assert_eq!(field_or_zero(&object, "f"), json!(12.5));
        assert_eq!(field_or_zero(&object, "g"), json!("x"));
    }

    #[test]
    fn pool_stats_defaults_missing_fields() {
        let stats = PoolStats::from_object(&json!({
            "global_hashrate": 2e12,
            "num_workers": 10,
            "pool_hashrate": null,
            "total_pending_payout": "100.5",
        }));
        assert_eq!(stats.global_hashrate, 2e12);
        assert_eq!(stats.num_workers, 10);
        assert_eq!(stats.pool_hashrate, 0.);
        assert_eq!(stats.difficulty, 0.);
        assert_eq!(stats.total_pending_payout, 100.5);
        assert_eq!(stats.total_payout_amount, 0.);
    }

    #[test]
    fn pool_stats_from_non_object() {
        assert_eq!(PoolStats::from_object(&json!("oops")), PoolStats::default());
    }

    #[test]
    fn ticker_parses_string_price() {
        let ticker = TokenTicker::from_object(
            &json!({"currency_pair": "ALPH_USDT", "last": "0.05", "change_percentage": "1.2"}),
            "ALPH_USDT",
        );
        assert_eq!(ticker.currency_pair, "ALPH_USDT");
        assert_eq!(ticker.last, Decimal::from_str("0.05").unwrap());
        assert_eq!(ticker.change_percentage, "1.2");
    }

    #[test]
    fn ticker_falls_back_on_missing_fields() {
        let ticker = TokenTicker::from_object(&json!({"last": "garbage"}), "ALPH_BTC");
        assert_eq!(ticker.currency_pair, "ALPH_BTC");
        assert_eq!(ticker.last, Decimal::ZERO);
        assert_eq!(ticker.change_percentage, "0");
    }
}
