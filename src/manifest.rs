//! Providers declared in a TOML manifest
//!
//! Each `[[provider]]` entry becomes one registered provider. Entries are
//! parsed loosely and shape-checked when the provider runs, so a bad
//! `template` or `vars` value fails the render rather than the load.

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Deserialize;

use crate::error::{io_context, Error, Result};
use crate::registry::{ProviderHandle, Registry};
use crate::template::{Bindings, Fragment};

#[derive(Debug, Deserialize)]
struct ManifestFile {
    #[serde(default, rename = "provider")]
    providers: Vec<ProviderEntry>,
}

/// One provider declaration
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderEntry {
    /// Provider name, also used for output file names
    pub name: String,
    /// Inline template text or a template file name
    pub template: toml::Value,
    /// Template variables
    #[serde(default)]
    pub vars: Option<toml::Value>,
}

impl ProviderEntry {
    /// Check the entry's shape and build its fragment
    pub fn fragment(&self) -> Result<Fragment> {
        let source = self.template.as_str().ok_or_else(|| Error::Shape {
            provider: self.name.clone(),
            message: format!("template must be a string, not {}", self.template.type_str()),
        })?;

        let bindings = match &self.vars {
            None => Bindings::new(),
            Some(toml::Value::Table(table)) => {
                let mut bindings = Bindings::new();
                for (key, value) in table {
                    bindings.insert(key.clone(), value);
                }
                bindings
            }
            Some(other) => {
                return Err(Error::Shape {
                    provider: self.name.clone(),
                    message: format!("vars must be a table, not {}", other.type_str()),
                })
            }
        };

        Ok(Fragment::new(source, bindings))
    }
}

/// A loaded provider manifest
#[derive(Debug, Clone)]
pub struct Manifest {
    pub path: PathBuf,
    pub entries: Vec<ProviderEntry>,
}

impl Manifest {
    /// Load a manifest file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                io_context(e, "reading manifest", path)
            }
        })?;

        Self::parse(path.to_path_buf(), &content)
    }

    /// Parse manifest content
    pub fn parse(path: PathBuf, content: &str) -> Result<Self> {
        let file: ManifestFile = toml::from_str(content)
            .map_err(|e| Error::Manifest(format!("{}: {}", path.display(), e)))?;

        let name_re = Regex::new(r"^[A-Za-z_][A-Za-z0-9_-]*$")
            .map_err(|e| Error::Manifest(format!("regex error: {}", e)))?;
        for entry in &file.providers {
            if !name_re.is_match(&entry.name) {
                return Err(Error::Manifest(format!(
                    "{}: invalid provider name '{}'",
                    path.display(),
                    entry.name
                )));
            }
        }

        Ok(Self {
            path,
            entries: file.providers,
        })
    }

    /// Register every entry, in file order
    pub fn register_into(&self, registry: &mut Registry) -> Vec<ProviderHandle> {
        self.entries
            .iter()
            .map(|entry| {
                let entry = entry.clone();
                registry.register(entry.name.clone(), move || entry.fragment())
            })
            .collect()
    }
}
