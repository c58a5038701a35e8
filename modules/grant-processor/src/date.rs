use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

static ISO: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").unwrap());
static SLASH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{2,4})$").unwrap());
static MONTH_DAY_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z]+)\s+(\d{1,2}),?\s+(\d{4})$").unwrap());
static DAY_MONTH_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})\s+([A-Za-z]+),?\s+(\d{4})$").unwrap());

fn month_from_name(name: &str) -> Option<u32> {
    const NAMES: &[&str] = &[
        "january", "february", "march", "april", "may", "june", "july", "august",
        "september", "october", "november", "december",
    ];
    let lowered = name.to_lowercase();
    NAMES
        .iter()
        .position(|full| *full == lowered || full[..3] == lowered)
        .map(|i| i as u32 + 1)
}

fn normalize_year(raw: &str) -> Option<i32> {
    let year: i32 = raw.parse().ok()?;
    Some(if raw.len() == 2 {
        if year <= 69 { 2000 + year } else { 1900 + year }
    } else {
        year
    })
}

/// Try ISO-8601, `M/D/YYYY`, `D/M/YYYY`, `Month D, YYYY`, `D Month YYYY` in
/// that order (spec §4.3). Ambiguous slash dates resolve US-first (`M/D`)
/// unless the first component exceeds 12, in which case it must be the day.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();

    if let Some(caps) = ISO.captures(text) {
        let year: i32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let day: u32 = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if let Some(caps) = SLASH.captures(text) {
        let first: u32 = caps[1].parse().ok()?;
        let second: u32 = caps[2].parse().ok()?;
        let year = normalize_year(&caps[3])?;
        let (month, day) = if first > 12 { (second, first) } else { (first, second) };
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if let Some(caps) = MONTH_DAY_YEAR.captures(text) {
        let month = month_from_name(&caps[1])?;
        let day: u32 = caps[2].parse().ok()?;
        let year: i32 = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if let Some(caps) = DAY_MONTH_YEAR.captures(text) {
        let day: u32 = caps[1].parse().ok()?;
        let month = month_from_name(&caps[2])?;
        let year: i32 = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_date() {
        assert_eq!(parse_date("2027-03-15"), NaiveDate::from_ymd_opt(2027, 3, 15));
    }

    #[test]
    fn resolves_ambiguous_slash_date_us_first() {
        assert_eq!(parse_date("03/04/2027"), NaiveDate::from_ymd_opt(2027, 3, 4));
    }

    #[test]
    fn falls_back_to_day_first_when_month_exceeds_twelve() {
        assert_eq!(parse_date("25/12/2027"), NaiveDate::from_ymd_opt(2027, 12, 25));
    }

    #[test]
    fn parses_month_name_day_year() {
        assert_eq!(parse_date("March 15, 2027"), NaiveDate::from_ymd_opt(2027, 3, 15));
    }

    #[test]
    fn parses_day_month_name_year() {
        assert_eq!(parse_date("15 March 2027"), NaiveDate::from_ymd_opt(2027, 3, 15));
    }

    #[test]
    fn unparseable_text_returns_none() {
        assert_eq!(parse_date("whenever works"), None);
    }
}
