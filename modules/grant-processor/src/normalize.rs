use std::sync::LazyLock;

use regex::Regex;

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static BANGS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"!{2,}").unwrap());
static QUESTIONS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\?{2,}").unwrap());
static ELLIPSIS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.{3,}").unwrap());

const ENTITIES: &[(&str, &str)] = &[
    ("&amp;", "&"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&apos;", "'"),
    ("&nbsp;", " "),
    ("&mdash;", "—"),
    ("&ndash;", "–"),
];

/// Strip tags, decode common entities, collapse whitespace, trim. In
/// aggressive mode, also collapse repeated punctuation runs (spec §4.3).
pub fn normalize_text(input: &str, aggressive: bool) -> String {
    let mut text = TAG.replace_all(input, " ").to_string();
    for (entity, replacement) in ENTITIES {
        text = text.replace(entity, replacement);
    }
    text = WHITESPACE.replace_all(&text, " ").trim().to_string();

    if aggressive {
        text = BANGS.replace_all(&text, "!").to_string();
        text = QUESTIONS.replace_all(&text, "?").to_string();
        text = ELLIPSIS.replace_all(&text, "…").to_string();
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags_and_decodes_entities() {
        let input = "<p>Grants &amp; Awards</p>";
        assert_eq!(normalize_text(input, false), "Grants & Awards");
    }

    #[test]
    fn collapses_whitespace_runs() {
        assert_eq!(normalize_text("too   much    space", false), "too much space");
    }

    #[test]
    fn aggressive_mode_collapses_repeated_punctuation() {
        assert_eq!(normalize_text("Apply now!!! Really???", true), "Apply now! Really?");
        assert_eq!(normalize_text("Wait...", true), "Wait…");
    }

    #[test]
    fn non_aggressive_mode_leaves_punctuation_alone() {
        assert_eq!(normalize_text("Apply now!!!", false), "Apply now!!!");
    }
}
