use crate::abbreviations::Abbreviations;
use crate::collision;
use crate::error::{RenamerError, Result};
use crate::metadata::{Metadata, MetadataProvider};
use crate::resolver;
use crate::scanner::{self, Scanner};
use crate::settings::RenameConfig;
use log::{debug, error, info, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Outcome for one pdf file.
#[derive(Debug, Clone, Serialize)]
pub struct RenameResult {
    pub path_original: PathBuf,
    /// `None` when no metadata was found or the rename failed.
    pub path_new: Option<PathBuf>,
    pub identifier: Option<String>,
    pub identifier_type: Option<String>,
    pub method: Option<String>,
    pub metadata: Option<Metadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RenameResult {
    fn new(path: &Path) -> Self {
        RenameResult {
            path_original: path.to_path_buf(),
            path_new: None,
            identifier: None,
            identifier_type: None,
            method: None,
            metadata: None,
            error: None,
        }
    }

    pub fn is_renamed(&self) -> bool {
        self.path_new
            .as_ref()
            .is_some_and(|new| *new != self.path_original)
    }

    pub fn has_identifier(&self) -> bool {
        self.identifier.is_some()
    }

    /// The lookup or the rename went wrong for this file.
    pub fn has_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Renamed vs. not renamed counts for the end-of-run report.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub renamed: usize,
    pub unchanged: usize,
    pub without_identifier: usize,
    pub failed: usize,
}

impl Summary {
    pub fn from_results(results: &[RenameResult]) -> Self {
        let mut summary = Summary::default();
        for result in results {
            if result.has_failed() {
                summary.failed += 1;
            } else if !result.has_identifier() {
                summary.without_identifier += 1;
            } else if result.is_renamed() {
                summary.renamed += 1;
            } else if result.path_new.is_some() {
                summary.unchanged += 1;
            } else {
                summary.failed += 1;
            }
        }
        summary
    }
}

pub struct Renamer<'a> {
    config: &'a RenameConfig,
    abbreviations: &'a Abbreviations,
    provider: &'a dyn MetadataProvider,
    dry_run: bool,
}

impl<'a> Renamer<'a> {
    pub fn new(
        config: &'a RenameConfig,
        abbreviations: &'a Abbreviations,
        provider: &'a dyn MetadataProvider,
    ) -> Self {
        Renamer {
            config,
            abbreviations,
            provider,
            dry_run: false,
        }
    }

    /// Only compute the new names; nothing is renamed.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Renames a single pdf, or every pdf in a folder.
    pub fn rename_target(&self, target: &Path) -> Result<Vec<RenameResult>> {
        if target.is_dir() {
            let files = Scanner::new(target, self.config.check_subfolders)?.scan();

            let mut results = Vec::with_capacity(files.len());
            for file in files {
                info!("................");
                let result = self.rename_file(&file).unwrap_or_else(|e| {
                    warn!("Skipping {:?}: {}", file, e);
                    let mut result = RenameResult::new(&file);
                    result.error = Some(e.to_string());
                    result
                });
                results.push(result);
            }
            return Ok(results);
        }

        Ok(vec![self.rename_file(target)?])
    }

    /// Looks up metadata for `pdf` and renames it. Per-file problems end up in
    /// the returned result; only an invalid target is an error.
    pub fn rename_file(&self, pdf: &Path) -> Result<RenameResult> {
        if !pdf.is_file() || !scanner::is_pdf(pdf) {
            error!("{:?} is not a valid pdf file", pdf);
            return Err(RenamerError::InvalidTarget(pdf.to_path_buf()));
        }
        info!("File: {:?}", pdf);

        let mut result = RenameResult::new(pdf);
        let lookup = match self.provider.lookup(pdf) {
            Ok(Some(lookup)) => lookup,
            Ok(None) => {
                info!("{}", RenamerError::MetadataUnavailable(pdf.to_path_buf()));
                return Ok(result);
            }
            Err(e) => {
                warn!("Metadata lookup failed for {:?}: {:#}", pdf, e);
                result.error = Some(e.to_string());
                return Ok(result);
            }
        };

        info!(
            "Found an identifier for this file: {} ({})",
            lookup.identifier, lookup.identifier_type
        );
        for (key, value) in lookup.metadata.iter() {
            debug!("\t{} = \"{}\"", key, value);
        }

        let new_name = resolver::build_filename(&lookup.metadata, self.config, self.abbreviations);
        result.identifier = Some(lookup.identifier);
        result.identifier_type = Some(lookup.identifier_type);
        result.method = Some(lookup.method);
        result.metadata = Some(lookup.metadata);

        let extension = pdf
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
            .unwrap_or_default();
        let candidate = pdf
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(&new_name);
        info!("The new file name is {}{}", new_name, extension);

        let outcome = if self.dry_run {
            collision::probe_path(pdf, &candidate, &extension)
        } else {
            collision::resolve_path(pdf, &candidate, &extension)
        };

        match outcome {
            Ok(path_new) => {
                if !self.dry_run && path_new != pdf {
                    info!("File renamed correctly.");
                }
                result.path_new = Some(path_new);
            }
            Err(e) => {
                error!("Some error occurred while trying to rename this file: {}", e);
                result.error = Some(e.to_string());
            }
        }

        Ok(result)
    }
}
