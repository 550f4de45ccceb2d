//! BibTeX codec
//!
//! Converts between a [`BibEntry`] and the restricted, line-oriented BibTeX
//! text used for import and export. Only `author`, `title`, `year` and
//! `journal` are understood; every other line is skipped.
//!
//! Serialized values are written verbatim. A value containing `{`, `}`, `"`,
//! `,` or a line break will not survive `parse(serialize(entry))` unchanged.
//! The year keeps only its digits, so a negative year comes back positive.

use tracing::warn;

use crate::models::BibEntry;

/// Characters removed from text field values on parse
const STRIPPED_CHARS: [char; 4] = ['{', '}', '"', ','];

/// Field a line contributes to, decided by its leading keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKey {
    Author,
    Title,
    Year,
    Journal,
}

impl FieldKey {
    /// Keywords in match order; the first prefix that matches wins
    const ALL: [(&'static str, FieldKey); 4] = [
        ("author", FieldKey::Author),
        ("title", FieldKey::Title),
        ("year", FieldKey::Year),
        ("journal", FieldKey::Journal),
    ];

    fn classify(line: &str) -> Option<FieldKey> {
        Self::ALL
            .iter()
            .find(|(keyword, _)| line.starts_with(keyword))
            .map(|&(_, key)| key)
    }
}

/// Parse BibTeX text into an entry
///
/// Lines are trimmed and classified by keyword prefix (case-sensitive).
/// A later line for the same field overwrites an earlier one. Missing
/// fields keep their defaults (empty string, year 0).
pub fn parse(text: &str) -> BibEntry {
    let mut entry = BibEntry::default();

    for line in text.lines() {
        let line = line.trim();
        let Some(key) = FieldKey::classify(line) else {
            continue;
        };

        let slot = match key {
            FieldKey::Year => {
                entry.year = parse_year_digits(line);
                continue;
            }
            FieldKey::Author => &mut entry.author,
            FieldKey::Title => &mut entry.title,
            FieldKey::Journal => &mut entry.journal,
        };

        if let Some(value) = text_value(line) {
            *slot = value;
        }
    }

    entry
}

/// Serialize an entry as a BibTeX `@article`
pub fn serialize(entry: &BibEntry) -> String {
    format!(
        "@article{{{title}_bibtex,\n author\t\t=\t\"{author}\",\n title\t\t=\t\"{title}\",\n year\t\t=\t{year},\n journal\t=\t\"{journal}\"\n}}",
        title = entry.title,
        author = entry.author,
        year = entry.year,
        journal = entry.journal,
    )
}

/// Value after the first `=`, trimmed, with delimiter characters removed
fn text_value(line: &str) -> Option<String> {
    let (_, raw) = line.split_once('=')?;
    Some(
        raw.trim()
            .chars()
            .filter(|c| !STRIPPED_CHARS.contains(c))
            .collect(),
    )
}

/// Every ASCII digit on the line, concatenated; 0 when there are none
fn parse_year_digits(line: &str) -> i32 {
    let digits: String = line.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return 0;
    }

    digits.parse().unwrap_or_else(|_| {
        warn!(digits = %digits, "Year out of range, using 0");
        0
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_braced_fields() {
        let text = "@article{study,\n\
                    author = {Jane Doe},\n\
                    title={A Study},\n\
                    year=2021,\n\
                    journal={Nature}\n\
                    }";

        let entry = parse(text);
        assert_eq!(entry, BibEntry::new("A Study", "Jane Doe", 2021, "Nature"));
    }

    #[test]
    fn test_parse_quoted_and_indented_fields() {
        let text = "  author  = \"Ada Lovelace\",\n\ttitle = \"Notes\",\n  year = \"1843\",";

        let entry = parse(text);
        assert_eq!(entry.author, "Ada Lovelace");
        assert_eq!(entry.title, "Notes");
        assert_eq!(entry.year, 1843);
        assert_eq!(entry.journal, "");
    }

    #[test]
    fn test_parse_strips_delimiters_anywhere() {
        let entry = parse("title = {The {RNA} World, Revisited}");
        assert_eq!(entry.title, "The RNA World Revisited");
    }

    #[test]
    fn test_parse_value_after_first_equals() {
        let entry = parse("title = {E = mc2}");
        assert_eq!(entry.title, "E = mc2");
    }

    #[test]
    fn test_parse_last_occurrence_wins() {
        let entry = parse("author = {First}\nauthor = {Second}");
        assert_eq!(entry.author, "Second");
    }

    #[test]
    fn test_parse_keywords_are_case_sensitive() {
        let entry = parse("Author = {Upper}\nTITLE = {Loud}");
        assert_eq!(entry, BibEntry::default());
    }

    #[test]
    fn test_parse_prefix_match() {
        // `journaltitle` starts with `journal`
        let entry = parse("journaltitle = {Physics Letters}");
        assert_eq!(entry.journal, "Physics Letters");
    }

    #[test]
    fn test_parse_ignores_unknown_lines() {
        let text = "@book{x,\npublisher = {Someone},\nvolume = 3,\n% comment\n}";
        assert_eq!(parse(text), BibEntry::default());
    }

    #[test]
    fn test_parse_keyword_without_equals_is_ignored() {
        let entry = parse("title = {Kept}\ntitle");
        assert_eq!(entry.title, "Kept");
    }

    #[test]
    fn test_parse_year_digits() {
        assert_eq!(parse("year = {2019}").year, 2019);
        assert_eq!(parse("year = 20-21").year, 2021);
        assert_eq!(parse("year = unknown").year, 0);
        assert_eq!(parse("year = 99999999999").year, 0);
    }

    #[test]
    fn test_parse_empty_input() {
        assert_eq!(parse(""), BibEntry::default());
    }

    #[test]
    fn test_serialize_format() {
        let entry = BibEntry::new("A Study", "Jane Doe", 2021, "Nature");

        let expected = "@article{A Study_bibtex,\n author\t\t=\t\"Jane Doe\",\n title\t\t=\t\"A Study\",\n year\t\t=\t2021,\n journal\t=\t\"Nature\"\n}";
        assert_eq!(serialize(&entry), expected);
    }

    #[test]
    fn test_serialize_then_parse_reconstructs_entry() {
        let entries = [
            BibEntry::new("A Study", "Jane Doe", 2021, "Nature"),
            BibEntry::new("", "", 0, ""),
            BibEntry::new(" padded ", "O'Brien & Sons", 1066, "J. Phys. A: Math."),
            BibEntry::new("Ünïcödé title", "Žižek", 2008, "Überblick = Review"),
        ];

        for entry in entries {
            assert_eq!(parse(&serialize(&entry)), entry);
        }
    }

    #[test]
    fn test_negative_year_loses_sign() {
        let entry = BibEntry::new("Gallic War", "Caesar", -44, "Commentarii");
        assert_eq!(parse(&serialize(&entry)).year, 44);
    }

    #[test]
    fn test_serialize_does_not_escape() {
        let entry = BibEntry::new("Sets, {Maps}", "A", 1, "J");
        let text = serialize(&entry);
        assert!(text.contains("\"Sets, {Maps}\""));

        // Delimiters are lost on the way back in
        assert_eq!(parse(&text).title, "Sets Maps");
    }
}
