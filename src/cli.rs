use crate::settings::Settings;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "pdf-renamer",
    about = "Rename pdf files of scientific publications from their bibliographic metadata",
    version = "0.1.0",
    after_help = "Run with --list-tags to see the tags accepted by --format."
)]
pub struct Args {
    /// Pdf file or folder to rename
    #[arg(value_name = "PATH", help = "Path of the pdf file or of a folder")]
    pub path: Option<PathBuf>,

    /// Filename format
    #[arg(
        long,
        short = 'f',
        value_name = "FORMAT",
        help = "Format of the new filename, e.g. \"{YYYY} - {Jabbr} - {A3etal} - {T}\""
    )]
    pub format: Option<String>,

    /// Recurse into subfolders
    #[arg(
        long,
        short = 's',
        help = "Rename also pdf files contained in subfolders of the target folder"
    )]
    pub sub_folders: bool,

    #[arg(
        long,
        value_name = "N",
        help = "Maximum length of any string related to authors"
    )]
    pub max_length_authors: Option<usize>,

    #[arg(
        long,
        value_name = "N",
        help = "Maximum length of any generated filename; longer names are truncated"
    )]
    pub max_length_filename: Option<usize>,

    /// User journal abbreviations, searched before the bundled list
    #[arg(
        long,
        value_name = "PATH",
        help = "File of user-defined journal abbreviations ('FULL NAME = ABBREVIATION' per line)"
    )]
    pub abbreviation_file: Option<PathBuf>,

    #[arg(
        long,
        value_name = "PATH",
        help = "Add the content of this file to the user-defined journal abbreviations and exit"
    )]
    pub add_abbreviation_file: Option<PathBuf>,

    #[arg(
        long,
        help = "Store the format, length limits and subfolder option given in this command as default values"
    )]
    pub set_default: bool,

    #[arg(
        long,
        value_name = "PATH",
        help = "Settings file (default: ~/.config/pdf-renamer/settings.json)"
    )]
    pub config: Option<PathBuf>,

    #[arg(long, help = "List the valid format tags and exit")]
    pub list_tags: bool,

    #[arg(
        long,
        short = 'd',
        help = "Show the new filenames without renaming anything"
    )]
    pub dry_run: bool,

    #[arg(
        long,
        help = "Output the results in JSON format instead of human-readable text"
    )]
    pub json: bool,

    #[arg(long, short = 'q', help = "Decrease verbosity of output")]
    pub quiet: bool,

    #[arg(long, short = 'v', help = "Enable debug logging")]
    pub verbose: bool,
}

impl Args {
    pub fn settings_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Settings::default_path)
    }

    /// Command-line values take precedence over stored settings.
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(ref format) = self.format {
            settings.format = format.clone();
        }
        if let Some(n) = self.max_length_authors {
            settings.max_length_authors = n;
        }
        if let Some(n) = self.max_length_filename {
            settings.max_length_filename = n;
        }
        if self.sub_folders {
            settings.check_subfolders = true;
        }
        if let Some(ref path) = self.abbreviation_file {
            settings.abbreviation_file = Some(path.clone());
        }
        if self.quiet {
            settings.verbose = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_leave_settings_untouched() {
        let args = Args::try_parse_from(["pdf-renamer", "papers"]).unwrap();
        assert_eq!(args.path, Some(PathBuf::from("papers")));

        let mut settings = Settings::default();
        args.apply(&mut settings);
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_overrides() {
        let args = Args::try_parse_from([
            "pdf-renamer",
            "paper.pdf",
            "-f",
            "{T}",
            "-s",
            "--max-length-authors",
            "12",
            "--max-length-filename",
            "40",
            "-q",
        ])
        .unwrap();

        let mut settings = Settings::default();
        args.apply(&mut settings);
        assert_eq!(settings.format, "{T}");
        assert!(settings.check_subfolders);
        assert_eq!(settings.max_length_authors, 12);
        assert_eq!(settings.max_length_filename, 40);
        assert!(!settings.verbose);
    }

    #[test]
    fn test_path_is_optional() {
        let args = Args::try_parse_from(["pdf-renamer", "--list-tags"]).unwrap();
        assert!(args.path.is_none());
        assert!(args.list_tags);
    }

    #[test]
    fn test_rejects_non_numeric_lengths() {
        assert!(Args::try_parse_from(["pdf-renamer", "--max-length-filename", "long"]).is_err());
    }
}
