//! Canonical field vocabulary and partial per-instrument field maps

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// The closed set of numeric attributes tracked per instrument.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Price,
    ChangePct,
    Open,
    High,
    Low,
    Volume,
    Turnover,
    PeTtm,
    EpsTtm,
    MarketCap,
}

/// Partial field map for one instrument.
///
/// Entries are tri-state: an absent key was never attempted, a key holding
/// `None` was attempted and found empty (serialized as JSON `null`), and a
/// key holding a value was extracted. The distinction drives merge
/// precedence across sources.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMap(BTreeMap<Field, Option<f64>>);

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an attempted extraction. Non-finite values degrade to `None`
    /// so persisted snapshots only ever hold finite numbers or `null`.
    pub fn insert(&mut self, field: Field, value: Option<f64>) {
        self.0.insert(field, value.filter(|v| v.is_finite()));
    }

    /// The entry for `field`: `None` if never attempted, `Some(None)` if
    /// attempted and empty, `Some(Some(v))` if extracted.
    pub fn get(&self, field: Field) -> Option<Option<f64>> {
        self.0.get(&field).copied()
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, Option<f64>)> + '_ {
        self.0.iter().map(|(field, value)| (*field, *value))
    }

    /// Applies an overlay entry-by-entry: every key the overlay contains
    /// replaces this map's entry, explicit `None` included. Keys the overlay
    /// never attempted are left alone.
    pub fn apply(&mut self, overlay: FieldMap) {
        for (field, value) in overlay.0 {
            self.0.insert(field, value);
        }
    }
}

fn label_patterns() -> &'static [(Regex, Field)] {
    static PATTERNS: OnceLock<Vec<(Regex, Field)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            (r"(?i)open", Field::Open),
            (r"(?i)high", Field::High),
            (r"(?i)low", Field::Low),
            (r"(?i)volume", Field::Volume),
            (r"(?i)turnover|value", Field::Turnover),
            (r"(?i)p/e", Field::PeTtm),
            (r"(?i)eps", Field::EpsTtm),
            (r"(?i)market cap", Field::MarketCap),
        ]
        .into_iter()
        .map(|(pattern, field)| (Regex::new(pattern).unwrap(), field))
        .collect()
    })
}

/// Classifies a cleaned stat-row label against the fixed field-name
/// patterns. Patterns are tested independently, so one label can map to
/// several fields; an unrecognized label maps to none.
pub fn classify_label(label: &str) -> Vec<Field> {
    label_patterns()
        .iter()
        .filter(|(re, _)| re.is_match(label))
        .map(|(_, field)| *field)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_label_matches_known_patterns() {
        assert_eq!(classify_label("Open Price"), vec![Field::Open]);
        assert_eq!(classify_label("TURNOVER"), vec![Field::Turnover]);
        assert_eq!(classify_label("Value Traded"), vec![Field::Turnover]);
        assert_eq!(classify_label("P/E Ratio (TTM)"), vec![Field::PeTtm]);
        assert_eq!(classify_label("EPS"), vec![Field::EpsTtm]);
        assert_eq!(classify_label("Market Cap"), vec![Field::MarketCap]);
        assert_eq!(classify_label("Previous Session"), Vec::<Field>::new());
    }

    #[test]
    fn test_classify_label_can_match_several_fields() {
        assert_eq!(classify_label("High/Low"), vec![Field::High, Field::Low]);
    }

    #[test]
    fn test_insert_coerces_non_finite_to_null() {
        let mut map = FieldMap::new();
        map.insert(Field::Price, Some(f64::NAN));
        map.insert(Field::Open, Some(f64::INFINITY));
        assert_eq!(map.get(Field::Price), Some(None));
        assert_eq!(map.get(Field::Open), Some(None));
    }

    #[test]
    fn test_apply_replaces_present_keys_only() {
        let mut base = FieldMap::new();
        base.insert(Field::Price, Some(1.0));
        base.insert(Field::Open, Some(5.0));

        let mut overlay = FieldMap::new();
        overlay.insert(Field::Price, None);
        base.apply(overlay);

        assert_eq!(base.get(Field::Price), Some(None));
        assert_eq!(base.get(Field::Open), Some(Some(5.0)));
    }

    #[test]
    fn test_serialized_form_uses_snake_case_and_null() {
        let mut map = FieldMap::new();
        map.insert(Field::ChangePct, Some(1.23));
        map.insert(Field::MarketCap, None);

        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"change_pct":1.23,"market_cap":null}"#);

        let parsed: FieldMap = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, map);
    }

    #[test]
    fn test_unknown_field_name_is_rejected() {
        assert!(serde_json::from_str::<FieldMap>(r#"{"bogus":1}"#).is_err());
    }
}
