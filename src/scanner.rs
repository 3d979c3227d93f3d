use crate::error::{RenamerError, Result};
use log::{debug, info};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub struct Scanner {
    root_path: PathBuf,
    check_subfolders: bool,
}

impl Scanner {
    pub fn new(path: &Path, check_subfolders: bool) -> Result<Self> {
        if !path.is_dir() {
            return Err(RenamerError::InvalidTarget(path.to_path_buf()));
        }
        Ok(Scanner {
            root_path: path.to_path_buf(),
            check_subfolders,
        })
    }

    /// Pdf files of the root folder sorted by name, followed by those of each
    /// subfolder (recursively) when subfolders are enabled.
    pub fn scan(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();
        self.scan_folder(&self.root_path, &mut files);
        debug!("Scanner found {} pdf files", files.len());
        files
    }

    fn scan_folder(&self, folder: &Path, files: &mut Vec<PathBuf>) {
        info!("Looking for pdf files and subfolders in the folder {:?}...", folder);

        let mut pdfs = Vec::new();
        let mut subfolders = Vec::new();
        for entry in WalkDir::new(folder)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if should_skip(path) {
                continue;
            }
            if entry.file_type().is_dir() {
                subfolders.push(path.to_path_buf());
            } else if is_pdf(path) {
                pdfs.push(path.to_path_buf());
            }
        }

        if pdfs.is_empty() {
            info!("No pdf file found in {:?}", folder);
        } else {
            info!("Found {} pdf file(s)", pdfs.len());
        }
        files.extend(pdfs);

        if subfolders.is_empty() {
            return;
        }
        if !self.check_subfolders {
            info!(
                "Found {} subfolder(s), not scanned because subfolder checking is disabled (use --sub-folders)",
                subfolders.len()
            );
            return;
        }

        info!("Exploring {} subfolder(s)...", subfolders.len());
        for subfolder in subfolders {
            self.scan_folder(&subfolder, files);
        }
    }
}

pub fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

/// Hidden files and folders
fn should_skip(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| name.starts_with('.'))
}
