use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

/// Static rates (USD per one unit of the foreign currency) used when a
/// Processor isn't configured with its own table (spec §4.3).
pub fn default_currency_rates() -> BTreeMap<String, f64> {
    [
        ("EUR", 1.10),
        ("GBP", 1.27),
        ("CAD", 0.73),
        ("AUD", 0.65),
        ("JPY", 0.0067),
        ("CHF", 1.14),
        ("USD", 1.0),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

static NUMBER: &str = r"[\d][\d,]*(?:\.\d+)?";
static MAGNITUDE: &str = r"(?:\s*(million|k|thousand))?";

static RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)([€£¥$]|usd|eur|gbp|cad|aud|jpy|chf)?\s*({NUMBER}){MAGNITUDE}\s*(?:-|to|–)\s*([€£¥$]|usd|eur|gbp|cad|aud|jpy|chf)?\s*({NUMBER}){MAGNITUDE}"
    ))
    .unwrap()
});
static UP_TO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)up\s+to\s*([€£¥$]|usd|eur|gbp|cad|aud|jpy|chf)?\s*({NUMBER}){MAGNITUDE}")).unwrap()
});
static MINIMUM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)minimum\s*(?:of)?\s*([€£¥$]|usd|eur|gbp|cad|aud|jpy|chf)?\s*({NUMBER}){MAGNITUDE}")).unwrap()
});
static SINGLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)([€£¥$]|usd|eur|gbp|cad|aud|jpy|chf)?\s*({NUMBER}){MAGNITUDE}")).unwrap()
});

#[derive(Debug, Clone, Default)]
pub struct MoneyParse {
    pub amount_min: Option<u64>,
    pub amount_max: Option<u64>,
    pub warning: Option<String>,
}

fn symbol_to_code(symbol: &str) -> &'static str {
    match symbol.to_uppercase().as_str() {
        "€" | "EUR" => "EUR",
        "£" | "GBP" => "GBP",
        "¥" | "JPY" => "JPY",
        "CAD" => "CAD",
        "AUD" => "AUD",
        "CHF" => "CHF",
        _ => "USD",
    }
}

fn apply_magnitude(value: f64, magnitude: Option<&str>) -> f64 {
    match magnitude.map(str::to_lowercase).as_deref() {
        Some("million") => value * 1_000_000.0,
        Some("k") | Some("thousand") => value * 1_000.0,
        _ => value,
    }
}

fn to_usd(value: f64, currency_symbol: Option<&str>, rates: &BTreeMap<String, f64>) -> u64 {
    let code = currency_symbol.map(symbol_to_code).unwrap_or("USD");
    let rate = rates.get(code).copied().unwrap_or(1.0);
    (value * rate).round().max(0.0) as u64
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.replace(',', "").parse::<f64>().ok()
}

/// Parse a funding-amount phrase into min/max USD bounds, per spec §4.3's
/// recognized shapes. Returns a warning (rather than an error) when no
/// numeric amount can be found at all.
pub fn parse_money(text: &str, rates: &BTreeMap<String, f64>) -> MoneyParse {
    if let Some(caps) = RANGE.captures(text) {
        let min_symbol = caps.get(1).map(|m| m.as_str());
        let min_value = parse_number(&caps[2]).unwrap_or(0.0);
        let min_magnitude = caps.get(3).map(|m| m.as_str());
        let max_symbol = caps.get(4).map(|m| m.as_str()).or(min_symbol);
        let max_value = parse_number(&caps[5]).unwrap_or(0.0);
        let max_magnitude = caps.get(6).map(|m| m.as_str());
        let min = to_usd(apply_magnitude(min_value, min_magnitude), min_symbol, rates);
        let max = to_usd(apply_magnitude(max_value, max_magnitude), max_symbol, rates);
        return MoneyParse {
            amount_min: Some(min.min(max)),
            amount_max: Some(min.max(max)),
            warning: None,
        };
    }

    if let Some(caps) = UP_TO.captures(text) {
        let symbol = caps.get(1).map(|m| m.as_str());
        let value = parse_number(&caps[2]).unwrap_or(0.0);
        let magnitude = caps.get(3).map(|m| m.as_str());
        let max = to_usd(apply_magnitude(value, magnitude), symbol, rates);
        return MoneyParse {
            amount_min: Some(0),
            amount_max: Some(max),
            warning: None,
        };
    }

    if let Some(caps) = MINIMUM.captures(text) {
        let symbol = caps.get(1).map(|m| m.as_str());
        let value = parse_number(&caps[2]).unwrap_or(0.0);
        let magnitude = caps.get(3).map(|m| m.as_str());
        let min = to_usd(apply_magnitude(value, magnitude), symbol, rates);
        return MoneyParse {
            amount_min: Some(min),
            amount_max: None,
            warning: None,
        };
    }

    if let Some(caps) = SINGLE.captures(text) {
        let symbol = caps.get(1).map(|m| m.as_str());
        let value = parse_number(&caps[2]).unwrap_or(0.0);
        let magnitude = caps.get(3).map(|m| m.as_str());
        let amount = to_usd(apply_magnitude(value, magnitude), symbol, rates);
        return MoneyParse {
            amount_min: Some(amount),
            amount_max: Some(amount),
            warning: None,
        };
    }

    MoneyParse {
        amount_min: None,
        amount_max: None,
        warning: Some("no numeric funding amount found".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rates() -> BTreeMap<String, f64> {
        default_currency_rates()
    }

    #[test]
    fn parses_simple_range() {
        let result = parse_money("Awards of $5,000 - $50,000", &rates());
        assert_eq!(result.amount_min, Some(5_000));
        assert_eq!(result.amount_max, Some(50_000));
    }

    #[test]
    fn parses_up_to_with_zero_minimum() {
        let result = parse_money("Grants of up to $25,000 available", &rates());
        assert_eq!(result.amount_min, Some(0));
        assert_eq!(result.amount_max, Some(25_000));
    }

    #[test]
    fn parses_minimum_with_no_maximum() {
        let result = parse_money("minimum of $10,000 required", &rates());
        assert_eq!(result.amount_min, Some(10_000));
        assert_eq!(result.amount_max, None);
    }

    #[test]
    fn parses_million_magnitude() {
        let result = parse_money("A $2 million award", &rates());
        assert_eq!(result.amount_min, Some(2_000_000));
    }

    #[test]
    fn converts_foreign_currency_to_usd() {
        let result = parse_money("Funding of €10,000", &rates());
        assert_eq!(result.amount_min, Some(11_000));
    }

    #[test]
    fn no_amount_emits_warning_not_error() {
        let result = parse_money("No dollar figures mentioned here.", &rates());
        assert!(result.amount_min.is_none());
        assert!(result.warning.is_some());
    }
}
