use crate::abbreviations::Abbreviations;
use crate::metadata::Metadata;
use crate::sanitizer::{sanitize_filename, truncate};
use crate::settings::RenameConfig;
use crate::tags::{TAG_TOKEN, Tag};
use log::{debug, warn};
use regex::Captures;
use std::collections::BTreeMap;

const NO_JOURNAL: &str = "[NoJournal]";
const NO_JOURNAL_ABBR: &str = "[NoJourn]";
const NO_AUTHOR: &str = "[NoAuthor]";
const NO_TITLE: &str = "[NoTitle]";
const ET_AL: &str = " et al.";
const AUTHOR_SEPARATOR: &str = " and ";

const MONTHS: [(&str, &str, &str); 12] = [
    ("jan", "january", "01"),
    ("feb", "february", "02"),
    ("mar", "march", "03"),
    ("apr", "april", "04"),
    ("may", "may", "05"),
    ("jun", "june", "06"),
    ("jul", "july", "07"),
    ("aug", "august", "08"),
    ("sep", "september", "09"),
    ("oct", "october", "10"),
    ("nov", "november", "11"),
    ("dec", "december", "12"),
];

/// Resolved value of every tag used by a format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacementMap {
    values: BTreeMap<Tag, String>,
}

impl ReplacementMap {
    pub fn get(&self, tag: Tag) -> Option<&str> {
        self.values.get(&tag).map(String::as_str)
    }

    /// Replaces every occurrence of every resolved tag in `format`, in a single
    /// pass: tokens appearing inside a value are kept as text.
    pub fn substitute(&self, format: &str) -> String {
        TAG_TOKEN
            .replace_all(format, |caps: &Captures| {
                Tag::from_token(&caps[0])
                    .and_then(|tag| self.get(tag))
                    .unwrap_or(&caps[0])
                    .to_string()
            })
            .into_owned()
    }
}

/// Resolves `tags` against `metadata`. Missing or malformed fields resolve to
/// placeholders, so this never fails.
pub fn resolve(
    metadata: &Metadata,
    tags: &[Tag],
    abbreviations: &Abbreviations,
    max_length_authors: usize,
) -> ReplacementMap {
    let mut values = BTreeMap::new();

    let needs_authors = tags.iter().any(Tag::is_author);
    let authors = if needs_authors {
        Some(AuthorStrings::derive(metadata, max_length_authors))
    } else {
        None
    };

    for &tag in tags {
        let value = match tag {
            Tag::Year => resolve_year(metadata),
            Tag::Month => resolve_month(metadata),
            Tag::Day => resolve_day(metadata),
            Tag::Journal => resolve_journal(metadata),
            Tag::JournalAbbr => resolve_journal_abbr(metadata, abbreviations),
            Tag::Title => metadata
                .non_empty("title")
                .map(str::to_string)
                .unwrap_or_else(|| NO_TITLE.to_string()),
            author_tag => match authors.as_ref() {
                Some(authors) => authors.for_tag(author_tag).to_string(),
                None => NO_AUTHOR.to_string(),
            },
        };
        values.insert(tag, value);
    }

    ReplacementMap { values }
}

/// Builds the new filename (without extension) for one publication.
pub fn build_filename(
    metadata: &Metadata,
    config: &RenameConfig,
    abbreviations: &Abbreviations,
) -> String {
    let replacements = resolve(
        metadata,
        &config.tags,
        abbreviations,
        config.max_length_authors,
    );
    let substituted = replacements.substitute(&config.format);
    let sanitized = sanitize_filename(&substituted, config.max_length_filename);

    // A leading dot would hide the file from later scans.
    let filename = sanitized.trim_start_matches('.').trim_start();
    if filename.is_empty() {
        warn!(
            "Nothing usable left of \"{}\", falling back to {}",
            substituted, NO_TITLE
        );
        return truncate(NO_TITLE, config.max_length_filename);
    }

    debug!("Built filename \"{}\" from \"{}\"", filename, substituted);
    filename.to_string()
}

fn is_digits(s: &str, count: usize) -> bool {
    s.len() == count && s.chars().all(|c| c.is_ascii_digit())
}

fn resolve_year(metadata: &Metadata) -> String {
    match metadata.get("year").map(str::trim) {
        Some(year) if is_digits(year, 4) => year.to_string(),
        _ => "0000".to_string(),
    }
}

fn resolve_month(metadata: &Metadata) -> String {
    let Some(month) = metadata.get("month").map(str::trim) else {
        return "00".to_string();
    };

    if is_digits(month, 1) || is_digits(month, 2) {
        return match month.parse::<u8>() {
            Ok(n @ 1..=12) => format!("{:02}", n),
            _ => "00".to_string(),
        };
    }

    let lower = month.to_lowercase();
    MONTHS
        .iter()
        .find(|(short, long, _)| lower == *short || lower == *long)
        .map(|(_, _, number)| number.to_string())
        .unwrap_or_else(|| "00".to_string())
}

fn resolve_day(metadata: &Metadata) -> String {
    match metadata.get("day").map(str::trim) {
        Some(day) if is_digits(day, 2) => day.to_string(),
        Some(day) if is_digits(day, 1) => format!("0{}", day),
        _ => "00".to_string(),
    }
}

fn resolve_journal(metadata: &Metadata) -> String {
    metadata
        .non_empty("journal")
        .or_else(|| metadata.non_empty("ejournal"))
        .map(str::to_string)
        .unwrap_or_else(|| NO_JOURNAL.to_string())
}

/// Only names from `journal` are looked up; `ejournal` is used as is.
fn resolve_journal_abbr(metadata: &Metadata, abbreviations: &Abbreviations) -> String {
    if let Some(journal) = metadata.non_empty("journal") {
        return abbreviations
            .find(journal)
            .unwrap_or_else(|| journal.to_string());
    }
    metadata
        .non_empty("ejournal")
        .map(str::to_string)
        .unwrap_or_else(|| NO_JOURNAL_ABBR.to_string())
}

struct Author {
    initial: String,
    last_name: String,
}

impl Author {
    fn parse(name: &str) -> Option<Self> {
        let tokens: Vec<&str> = name.split_whitespace().collect();
        let (last_name, first_names) = tokens.split_last()?;
        let initial = first_names
            .first()
            .and_then(|first| first.chars().next())
            .map(|c| format!("{}.", c.to_uppercase()))
            .unwrap_or_default();
        Some(Author {
            initial,
            last_name: last_name.to_string(),
        })
    }

    fn with_initial(&self) -> String {
        if self.initial.is_empty() {
            self.last_name.clone()
        } else {
            format!("{} {}", self.initial, self.last_name)
        }
    }
}

/// The six author renderings, computed together from one author list.
struct AuthorStrings {
    all: String,
    et_al: String,
    three_et_al: String,
    initials_all: String,
    initials_et_al: String,
    initials_three_et_al: String,
}

impl AuthorStrings {
    fn derive(metadata: &Metadata, max_length: usize) -> Self {
        let authors = parse_authors(author_source(metadata));
        if authors.is_empty() {
            return AuthorStrings::placeholder(max_length);
        }

        let last_names: Vec<String> = authors.iter().map(|a| a.last_name.clone()).collect();
        let with_initials: Vec<String> = authors.iter().map(Author::with_initial).collect();

        AuthorStrings {
            all: truncate(&last_names.join(", "), max_length),
            et_al: truncate(&et_al(&last_names, 1), max_length),
            three_et_al: truncate(&et_al(&last_names, 3), max_length),
            initials_all: truncate(&with_initials.join(", "), max_length),
            initials_et_al: truncate(&et_al(&with_initials, 1), max_length),
            initials_three_et_al: truncate(&et_al(&with_initials, 3), max_length),
        }
    }

    fn placeholder(max_length: usize) -> Self {
        let none = truncate(NO_AUTHOR, max_length);
        AuthorStrings {
            all: none.clone(),
            et_al: none.clone(),
            three_et_al: none.clone(),
            initials_all: none.clone(),
            initials_et_al: none.clone(),
            initials_three_et_al: none,
        }
    }

    fn for_tag(&self, tag: Tag) -> &str {
        match tag {
            Tag::AuthorsAll => &self.all,
            Tag::AuthorsEtAl => &self.et_al,
            Tag::Authors3EtAl => &self.three_et_al,
            Tag::InitialAuthorsAll => &self.initials_all,
            Tag::InitialAuthorsEtAl => &self.initials_et_al,
            Tag::InitialAuthors3EtAl => &self.initials_three_et_al,
            _ => NO_AUTHOR,
        }
    }
}

/// `author`, unless `authors` is present and longer.
fn author_source(metadata: &Metadata) -> &str {
    let author = metadata.get("author").unwrap_or_default();
    match metadata.get("authors") {
        Some(authors) if authors.len() > author.len() => authors,
        _ => author,
    }
}

fn parse_authors(source: &str) -> Vec<Author> {
    if source.trim().is_empty() {
        return Vec::new();
    }
    source
        .split(AUTHOR_SEPARATOR)
        .filter_map(|name| Author::parse(name.trim()))
        .collect()
}

fn et_al(names: &[String], keep: usize) -> String {
    let mut joined = names
        .iter()
        .take(keep)
        .cloned()
        .collect::<Vec<_>>()
        .join(", ");
    if names.len() > keep {
        joined.push_str(ET_AL);
    }
    joined
}
