//! Output assembler
//!
//! Builds the document: header, then every provider's output in
//! registration order, then footer.

use std::fs;
use std::path::Path;

use crate::config::DocumentConfig;
use crate::error::{io_context, Result};
use crate::registry::Registry;

/// Assembles registered providers into a single document
#[derive(Debug)]
pub struct Assembler<'a> {
    registry: &'a Registry,
    config: &'a DocumentConfig,
}

impl<'a> Assembler<'a> {
    pub fn new(registry: &'a Registry, config: &'a DocumentConfig) -> Self {
        Self { registry, config }
    }

    /// Concatenated provider outputs, without header and footer
    pub fn render_body(&self) -> Result<String> {
        let mut body = String::new();
        for provider in self.registry {
            body.push_str(&provider.call()?);
        }
        Ok(body)
    }

    /// Render the whole document.
    ///
    /// Any provider failure aborts before anything is written. When the
    /// config's `brain_file` flag is set the document is also written to
    /// `output_dir/brain_file_name`.
    pub fn render_all(&self) -> Result<String> {
        let document = self.config.enclose(&self.render_body()?);

        if self.config.brain_file() {
            self.config.check_output_dir()?;
            write_output(&self.config.brain_file_path(), &document)?;
        }

        Ok(document)
    }
}

/// Overwrite `path` with `content`
pub(crate) fn write_output(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|e| io_context(e, "writing", path))?;
    log::info!("Wrote {}", path.display());
    Ok(())
}
