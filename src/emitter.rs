//! File emitter
//!
//! Writes providers to their own files, `<output_dir>/<name><ext>`,
//! optionally wrapped in the document header and footer.

use std::path::PathBuf;

use crate::assembler::write_output;
use crate::config::DocumentConfig;
use crate::error::Result;
use crate::registry::{ProviderHandle, Registry};

/// A rendered provider and the file it belongs in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedFile {
    pub provider: String,
    pub path: PathBuf,
    pub content: String,
}

/// Writes one file per provider
#[derive(Debug)]
pub struct Emitter<'a> {
    registry: &'a Registry,
    config: &'a DocumentConfig,
}

impl<'a> Emitter<'a> {
    pub fn new(registry: &'a Registry, config: &'a DocumentConfig) -> Self {
        Self { registry, config }
    }

    /// Render the first provider named `name` without writing it
    pub fn plan_one(&self, name: &str, wrap: bool, extension: &str) -> Result<Option<EmittedFile>> {
        match self.registry.find(name) {
            Some(provider) => self.render(provider, wrap, extension).map(Some),
            None => {
                log::warn!("no provider named {}", name);
                Ok(None)
            }
        }
    }

    /// Render every provider without writing anything
    pub fn plan_all(&self, wrap: bool, extension: &str) -> Result<Vec<EmittedFile>> {
        self.registry
            .iter()
            .map(|provider| self.render(provider, wrap, extension))
            .collect()
    }

    /// Write the first provider named `name`.
    ///
    /// Returns `Ok(None)` and writes nothing if no provider has that name.
    pub fn emit_one(&self, name: &str, wrap: bool, extension: &str) -> Result<Option<PathBuf>> {
        let Some(file) = self.plan_one(name, wrap, extension)? else {
            return Ok(None);
        };
        self.config.check_output_dir()?;
        write_output(&file.path, &file.content)?;
        Ok(Some(file.path))
    }

    /// Write every provider to its own file.
    ///
    /// All providers are rendered before the first file is written, so a
    /// failing provider leaves the output directory untouched.
    pub fn emit_all(&self, wrap: bool, extension: &str) -> Result<Vec<PathBuf>> {
        let files = self.plan_all(wrap, extension)?;
        self.config.check_output_dir()?;
        let mut written = Vec::with_capacity(files.len());
        for file in files {
            write_output(&file.path, &file.content)?;
            written.push(file.path);
        }
        Ok(written)
    }

    fn render(&self, provider: &ProviderHandle, wrap: bool, extension: &str) -> Result<EmittedFile> {
        let body = provider.call()?;
        let content = if wrap {
            self.config.enclose(&body)
        } else {
            body
        };
        let file_name = format!("{}{}", provider.name(), normalize_extension(extension));
        Ok(EmittedFile {
            provider: provider.name().to_string(),
            path: self.config.output_dir().join(file_name),
            content,
        })
    }
}

/// Prefix a non-empty extension with `.` when it lacks one
pub fn normalize_extension(extension: &str) -> String {
    if extension.is_empty() || extension.starts_with('.') {
        extension.to_string()
    } else {
        format!(".{}", extension)
    }
}
