use crate::error::{RenamerError, Result};
use log::error;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

pub(crate) static TAG_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{.*?\}").expect("tag token pattern is valid"));

/// Placeholder tokens accepted in a filename format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tag {
    Year,
    Month,
    Day,
    Journal,
    JournalAbbr,
    AuthorsAll,
    AuthorsEtAl,
    Authors3EtAl,
    InitialAuthorsAll,
    InitialAuthorsEtAl,
    InitialAuthors3EtAl,
    Title,
}

impl Tag {
    pub const ALL: [Tag; 12] = [
        Tag::Year,
        Tag::Month,
        Tag::Day,
        Tag::Journal,
        Tag::JournalAbbr,
        Tag::AuthorsAll,
        Tag::AuthorsEtAl,
        Tag::Authors3EtAl,
        Tag::InitialAuthorsAll,
        Tag::InitialAuthorsEtAl,
        Tag::InitialAuthors3EtAl,
        Tag::Title,
    ];

    pub const AUTHORS: [Tag; 6] = [
        Tag::AuthorsAll,
        Tag::AuthorsEtAl,
        Tag::Authors3EtAl,
        Tag::InitialAuthorsAll,
        Tag::InitialAuthorsEtAl,
        Tag::InitialAuthors3EtAl,
    ];

    pub fn token(&self) -> &'static str {
        match self {
            Tag::Year => "{YYYY}",
            Tag::Month => "{MM}",
            Tag::Day => "{DD}",
            Tag::Journal => "{J}",
            Tag::JournalAbbr => "{Jabbr}",
            Tag::AuthorsAll => "{Aall}",
            Tag::AuthorsEtAl => "{Aetal}",
            Tag::Authors3EtAl => "{A3etal}",
            Tag::InitialAuthorsAll => "{aAall}",
            Tag::InitialAuthorsEtAl => "{aAetal}",
            Tag::InitialAuthors3EtAl => "{aA3etal}",
            Tag::Title => "{T}",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Tag::Year => "Year of publication",
            Tag::Month => "Month of publication (in digits)",
            Tag::Day => "Day of publication (in digits)",
            Tag::Journal => "Full name of journal",
            Tag::JournalAbbr => {
                "Abbreviated name of journal, if any is available (otherwise the full name is used)"
            }
            Tag::AuthorsAll => "Last name of all authors (separated by comma)",
            Tag::AuthorsEtAl => {
                "Last name of the first author, add 'et al.' if more authors are present"
            }
            Tag::Authors3EtAl => {
                "Last name of the first three authors (separated by comma), add 'et al.' if more authors are present"
            }
            Tag::InitialAuthorsAll => {
                "First initial and last name of all authors (separated by comma)"
            }
            Tag::InitialAuthorsEtAl => {
                "First initial and last name of the first author, add 'et al.' if more authors are present"
            }
            Tag::InitialAuthors3EtAl => {
                "First initial and last name of the first three authors (separated by comma), add 'et al.' if more authors are present"
            }
            Tag::Title => "Title",
        }
    }

    pub fn from_token(token: &str) -> Option<Tag> {
        Tag::ALL.iter().copied().find(|tag| tag.token() == token)
    }

    pub fn is_author(&self) -> bool {
        Tag::AUTHORS.contains(self)
    }

    /// One line per tag, used by `--help` and `--list-tags`.
    pub fn help_table() -> String {
        Tag::ALL
            .iter()
            .map(|tag| format!("  {:<10} {}", tag.token(), tag.description()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Checks a format string and returns the tags it contains, in order of first appearance.
pub fn validate(format: &str) -> Result<Vec<Tag>> {
    if format.trim().is_empty() {
        error!("The specified format is empty.");
        return Err(RenamerError::InvalidFormat(
            "the format is an empty string".to_string(),
        ));
    }

    let tokens: Vec<&str> = TAG_TOKEN.find_iter(format).map(|m| m.as_str()).collect();
    if tokens.is_empty() {
        error!("The specified format does not contain any tag. Tags must be delimited by {{ and }}.");
        return Err(RenamerError::InvalidFormat(format!(
            "\"{}\" does not contain any tag",
            format
        )));
    }

    let mut tags = Vec::new();
    for token in tokens {
        let tag = Tag::from_token(token).ok_or_else(|| {
            error!("The specified format contains \"{}\", which is not a valid tag.", token);
            RenamerError::InvalidFormat(format!(
                "\"{}\" is not a valid tag (valid tags: {})",
                token,
                Tag::ALL.map(|t| t.token()).join(", ")
            ))
        })?;
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }

    Ok(tags)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_format() {
        let tags = validate("{YYYY} - {Jabbr} - {A3etal} - {T}").unwrap();
        assert_eq!(
            tags,
            vec![Tag::Year, Tag::JournalAbbr, Tag::Authors3EtAl, Tag::Title]
        );
    }

    #[test]
    fn test_validate_deduplicates_repeated_tags() {
        let tags = validate("{T} ({YYYY}) {T}").unwrap();
        assert_eq!(tags, vec![Tag::Title, Tag::Year]);
    }

    #[test]
    fn test_validate_rejects_empty_format() {
        assert!(matches!(validate(""), Err(RenamerError::InvalidFormat(_))));
        assert!(matches!(validate("   "), Err(RenamerError::InvalidFormat(_))));
    }

    #[test]
    fn test_validate_rejects_format_without_tags() {
        assert!(matches!(
            validate("just some text"),
            Err(RenamerError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_validate_rejects_unknown_tag() {
        let err = validate("{YYYY} - {ZZZ}").unwrap_err();
        assert!(err.to_string().contains("{ZZZ}"));
    }

    #[test]
    fn test_tags_are_case_sensitive() {
        assert!(validate("{yyyy}").is_err());
        assert_eq!(validate("{aAetal}").unwrap(), vec![Tag::InitialAuthorsEtAl]);
    }

    #[test]
    fn test_every_tag_round_trips_through_its_token() {
        for tag in Tag::ALL {
            assert_eq!(Tag::from_token(tag.token()), Some(tag));
        }
    }

    #[test]
    fn test_help_table_lists_every_tag() {
        let table = Tag::help_table();
        assert_eq!(table.lines().count(), Tag::ALL.len());
        assert!(table.contains("{Jabbr}"));
    }
}
