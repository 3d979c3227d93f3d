use anyhow::{Context, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Bibliographic fields of one publication, as handed over by a provider.
///
/// Every field is optional; consumers fall back to placeholders when one is
/// missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata {
    fields: BTreeMap<String, String>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with(mut self, field: &str, value: &str) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: &str, value: &str) {
        self.fields.insert(field.to_string(), value.to_string());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// Like [`Metadata::get`], but treats blank values as missing.
    pub fn non_empty(&self, field: &str) -> Option<&str> {
        self.get(field).filter(|v| !v.trim().is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.fields.iter()
    }

    /// Builds a record from a JSON object, turning every value into text.
    /// Arrays of names are joined with `" and "`, the bibtex author separator.
    pub fn from_json_object(object: &Map<String, Value>) -> Self {
        let mut metadata = Metadata::new();
        for (key, value) in object {
            let text = match value {
                Value::Null => continue,
                Value::String(s) => s.clone(),
                Value::Array(items) => items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(" and "),
                other => other.to_string(),
            };
            metadata.insert(&key.to_lowercase(), &text);
        }
        metadata
    }
}

/// What a provider found out about one pdf file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lookup {
    pub identifier: String,
    pub identifier_type: String,
    pub method: String,
    pub metadata: Metadata,
}

/// Source of identifiers and bibliographic metadata for pdf files.
pub trait MetadataProvider {
    /// `Ok(None)` means nothing could be found for this file.
    fn lookup(&self, pdf: &Path) -> Result<Option<Lookup>>;
}

/// Reads metadata from a JSON file stored next to the pdf (`paper.pdf.json`).
///
/// Two layouts are accepted:
///
/// ```json
/// {"identifier": "10.1103/PhysRevLett.1", "identifier_type": "DOI", "metadata": {"title": "..."}}
/// ```
///
/// or a flat object holding the bibliographic fields directly, in which case
/// the identifier is taken from `doi` or `eprint` when present.
#[derive(Debug, Default)]
pub struct SidecarProvider;

impl SidecarProvider {
    pub fn sidecar_path(pdf: &Path) -> PathBuf {
        let mut name = pdf.as_os_str().to_os_string();
        name.push(".json");
        PathBuf::from(name)
    }

    fn parse(sidecar: &Path, content: &str) -> Result<Option<Lookup>> {
        let value: Value = serde_json::from_str(content)
            .with_context(|| format!("Malformed metadata file {:?}", sidecar))?;
        let Value::Object(object) = value else {
            warn!("Metadata file {:?} does not contain a JSON object", sidecar);
            return Ok(None);
        };

        let text = |key: &str| object.get(key).and_then(Value::as_str).map(str::to_string);

        if let Some(Value::Object(fields)) = object.get("metadata") {
            let Some(identifier) = text("identifier") else {
                debug!("No identifier in {:?}", sidecar);
                return Ok(None);
            };
            return Ok(Some(Lookup {
                identifier,
                identifier_type: text("identifier_type").unwrap_or_else(|| "unknown".to_string()),
                method: text("method").unwrap_or_else(|| "sidecar".to_string()),
                metadata: Metadata::from_json_object(fields),
            }));
        }

        let metadata = Metadata::from_json_object(&object);
        let (identifier, identifier_type) = match (metadata.non_empty("doi"), metadata.non_empty("eprint")) {
            (Some(doi), _) => (doi.to_string(), "DOI".to_string()),
            (None, Some(eprint)) => (eprint.to_string(), "arxiv ID".to_string()),
            (None, None) => (
                sidecar
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default(),
                "sidecar".to_string(),
            ),
        };

        Ok(Some(Lookup {
            identifier,
            identifier_type,
            method: "sidecar".to_string(),
            metadata,
        }))
    }
}

impl MetadataProvider for SidecarProvider {
    fn lookup(&self, pdf: &Path) -> Result<Option<Lookup>> {
        let sidecar = Self::sidecar_path(pdf);
        if !sidecar.is_file() {
            debug!("No metadata file found at {:?}", sidecar);
            return Ok(None);
        }

        let content = fs::read_to_string(&sidecar)
            .with_context(|| format!("Failed to read {:?}", sidecar))?;
        Self::parse(&sidecar, &content)
    }
}
