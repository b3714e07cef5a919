//! Text normalization for scraped market values

use regex::Regex;
use std::sync::OnceLock;

fn number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-?\d*\.?\d+").unwrap())
}

fn percent_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([+-]?\d+(?:\.\d+)?)\s*%").unwrap())
}

// Thousands separators plus the dirham symbol and its ISO code.
fn strip_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[,\s]|د\.إ|(?i:AED)").unwrap())
}

/// Collapses any whitespace run to a single space and trims the ends.
pub fn clean(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parses the first signed decimal out of locale-formatted text.
///
/// Currency markers and thousands separators are stripped first. Absence of
/// a numeric substring is a valid `None`, never an error.
pub fn to_number(text: Option<&str>) -> Option<f64> {
    let cleaned = clean(text?);
    if cleaned.is_empty() {
        return None;
    }
    let stripped = strip_re().replace_all(&cleaned, "");
    let matched = number_re().find(&stripped)?;
    matched
        .as_str()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Parses a signed percentage like `+1.23%`; the sign and a space before the
/// percent sign are both tolerated.
pub fn parse_change_percent(text: Option<&str>) -> Option<f64> {
    let cleaned = clean(text?);
    let captures = percent_re().captures(&cleaned)?;
    captures
        .get(1)?
        .as_str()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}
