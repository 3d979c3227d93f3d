use crate::renamer::{RenameResult, Summary};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Serialize, Deserialize)]
pub struct RenameOperation {
    pub from: String,
    pub to: String,
    pub identifier: String,
    pub identifier_type: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SkippedFile {
    pub path: String,
    pub reason: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct OperationsOutput {
    pub dry_run: bool,
    pub renames: Vec<RenameOperation>,
    pub unchanged: Vec<String>,
    pub skipped: Vec<SkippedFile>,
    pub renamed_count: usize,
    pub not_renamed_count: usize,
}

fn relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .to_string()
}

impl OperationsOutput {
    /// Report for a run, with paths relative to `target_dir`, in processing order.
    pub fn from_results(results: &[RenameResult], target_dir: &Path, dry_run: bool) -> Self {
        let mut output = OperationsOutput {
            dry_run,
            ..Self::default()
        };

        for result in results {
            let from = relative(&result.path_original, target_dir);
            match (&result.path_new, &result.identifier) {
                (Some(new), Some(identifier)) if result.is_renamed() => {
                    output.renames.push(RenameOperation {
                        from,
                        to: relative(new, target_dir),
                        identifier: identifier.clone(),
                        identifier_type: result.identifier_type.clone().unwrap_or_default(),
                    });
                }
                (Some(_), _) => output.unchanged.push(from),
                (None, _) => {
                    let reason = match (&result.error, &result.identifier) {
                        (Some(error), _) => error.clone(),
                        (None, None) => "no identifier found".to_string(),
                        (None, Some(_)) => "not renamed".to_string(),
                    };
                    output.skipped.push(SkippedFile { path: from, reason });
                }
            }
        }

        let summary = Summary::from_results(results);
        output.renamed_count = summary.renamed;
        output.not_renamed_count = results.len() - summary.renamed;
        output
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
