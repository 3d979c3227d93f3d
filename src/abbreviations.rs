use crate::sanitizer::sanitize;
use anyhow::{Context, Result, anyhow};
use log::{debug, info, warn};
use std::fs;
use std::path::Path;

const STANDARD_ABBREVIATIONS: &str = include_str!("../data/standard_abbreviations.txt");

/// Journal name to abbreviation table.
///
/// User overrides are searched before the bundled standard list, and the first
/// matching line wins. Each line has the form `Full Journal Name = Abbreviation`.
pub struct Abbreviations {
    user: String,
    standard: &'static str,
}

impl Abbreviations {
    pub fn new(user: impl Into<String>) -> Self {
        Abbreviations {
            user: user.into(),
            standard: STANDARD_ABBREVIATIONS,
        }
    }

    /// Reads the user override file. A missing file only means there are no overrides.
    pub fn load(user_file: Option<&Path>) -> Result<Self> {
        let user = match user_file {
            Some(path) if path.exists() => {
                debug!("Loading user abbreviations from {:?}", path);
                fs::read_to_string(path)
                    .with_context(|| format!("Failed to read abbreviation file {:?}", path))?
            }
            Some(path) => {
                debug!("No user abbreviation file at {:?}", path);
                String::new()
            }
            None => String::new(),
        };
        Ok(Abbreviations::new(user))
    }

    pub fn find(&self, journal: &str) -> Option<String> {
        let key = normalize(journal);
        if key.is_empty() {
            return None;
        }

        find_in(&self.user, &key).or_else(|| find_in(self.standard, &key))
    }
}

fn normalize(name: &str) -> String {
    sanitize(&name.trim().to_lowercase())
}

fn find_in(lines: &str, key: &str) -> Option<String> {
    lines.lines().find_map(|line| {
        let (full, abbreviation) = line.split_once(" = ")?;
        let abbreviation = abbreviation.trim();
        if abbreviation.is_empty() || normalize(full) != key {
            return None;
        }
        Some(abbreviation.to_string())
    })
}

/// Prepends the entries of `source` to the user abbreviation file, so they take
/// precedence over anything already there. Returns the number of entries added.
pub fn add_abbreviations(source: &Path, user_file: &Path) -> Result<usize> {
    if !source.is_file() {
        return Err(anyhow!("{:?} is not a valid path to a file", source));
    }

    info!("Loading the file {:?}...", source);
    let new_entries = fs::read_to_string(source)
        .with_context(|| format!("Failed to read {:?}", source))?;

    let mut count = 0;
    for line in new_entries.lines().filter(|l| !l.trim().is_empty()) {
        if line.contains(" = ") {
            count += 1;
        } else {
            warn!("Line \"{}\" is not in the format 'FULL NAME = ABBREVIATION'", line);
        }
    }

    let existing = if user_file.exists() {
        fs::read_to_string(user_file)
            .with_context(|| format!("Failed to read {:?}", user_file))?
    } else {
        String::new()
    };

    if let Some(parent) = user_file.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut content = new_entries.trim_end().to_string();
    content.push('\n');
    content.push_str(&existing);
    fs::write(user_file, content)
        .with_context(|| format!("Failed to write {:?}", user_file))?;

    info!(
        "Added {} journal abbreviation(s) to {:?}",
        count, user_file
    );
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_find_in_standard_list() {
        let abbreviations = Abbreviations::new("");
        assert_eq!(
            abbreviations.find("Physical Review Letters"),
            Some("Phys. Rev. Lett.".to_string())
        );
        assert_eq!(
            abbreviations.find("  physical review B "),
            Some("Phys. Rev. B".to_string())
        );
    }

    #[test]
    fn test_prefix_does_not_match_longer_names() {
        let abbreviations = Abbreviations::new("Physical Review = Phys. Rev.\n");
        assert_eq!(
            abbreviations.find("Physical Review"),
            Some("Phys. Rev.".to_string())
        );
        assert_eq!(abbreviations.find("Physical"), None);
    }

    #[test]
    fn test_user_overrides_take_precedence() {
        let abbreviations = Abbreviations::new("Physical Review Letters = PRL\n");
        assert_eq!(
            abbreviations.find("Physical Review Letters"),
            Some("PRL".to_string())
        );
    }

    #[test]
    fn test_journal_names_with_markup_and_colons() {
        let abbreviations = Abbreviations::new("");
        assert_eq!(
            abbreviations.find("Journal of Physics: Condensed Matter"),
            Some("J. Phys.: Condens. Matter".to_string())
        );
        assert_eq!(
            abbreviations.find("{\\textit{Nature Physics}}"),
            Some("Nat. Phys.".to_string())
        );
    }

    #[test]
    fn test_unknown_journal() {
        let abbreviations = Abbreviations::new("");
        assert_eq!(abbreviations.find("Journal of Imaginary Results"), None);
        assert_eq!(abbreviations.find(""), None);
    }

    #[test]
    fn test_load_missing_user_file() {
        let tmp_dir = TempDir::new().unwrap();
        let abbreviations = Abbreviations::load(Some(&tmp_dir.path().join("none.txt"))).unwrap();
        assert_eq!(abbreviations.find("Nature"), Some("Nature".to_string()));
    }

    #[test]
    fn test_add_abbreviations_prepends_entries() {
        let tmp_dir = TempDir::new().unwrap();
        let user_file = tmp_dir.path().join("config").join("user.txt");
        let first = tmp_dir.path().join("first.txt");
        let second = tmp_dir.path().join("second.txt");
        fs::write(&first, "My Journal = MJ\n").unwrap();
        fs::write(&second, "My Journal = My J.\nnot an entry\n").unwrap();

        assert_eq!(add_abbreviations(&first, &user_file).unwrap(), 1);
        assert_eq!(add_abbreviations(&second, &user_file).unwrap(), 1);

        let abbreviations = Abbreviations::load(Some(&user_file)).unwrap();
        assert_eq!(abbreviations.find("my journal"), Some("My J.".to_string()));
    }

    #[test]
    fn test_add_abbreviations_rejects_missing_source() {
        let tmp_dir = TempDir::new().unwrap();
        let result = add_abbreviations(
            &tmp_dir.path().join("missing.txt"),
            &tmp_dir.path().join("user.txt"),
        );
        assert!(result.is_err());
    }
}
