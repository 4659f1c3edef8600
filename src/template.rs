//! Template sources, bindings and the rendering engine for jaiml
//!
//! Providers hand back a [`Fragment`]: a template source plus the variable
//! bindings it is rendered with. Rendering is delegated to MiniJinja.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use minijinja::{AutoEscape, Environment, UndefinedBehavior, Value};
use serde::Serialize;

use crate::config::DocumentConfig;
use crate::error::{Error, Result};

/// Extensions of template files looked up in the templates directory
pub const ACCEPTED_FILE_EXT: &[&str] = &[".jinja", ".j2", ".aiml", ".xml"];

/// Sources at or above this many characters are always inline text
const MAX_FILE_REF_LEN: usize = 50;

/// Where a provider's template text comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    /// Template text compiled directly
    Inline(String),
    /// Name of a file resolved against the templates directory
    File(String),
}

impl TemplateSource {
    /// Classify a raw string as a file reference or inline text.
    ///
    /// A string is a file reference only when it is shorter than 50
    /// characters and ends in one of [`ACCEPTED_FILE_EXT`].
    pub fn classify(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        if is_file_reference(&raw) {
            TemplateSource::File(raw)
        } else {
            TemplateSource::Inline(raw)
        }
    }

    /// Raw text of the source (template body or file name)
    pub fn as_str(&self) -> &str {
        match self {
            TemplateSource::Inline(text) | TemplateSource::File(text) => text,
        }
    }
}

impl From<&str> for TemplateSource {
    fn from(raw: &str) -> Self {
        TemplateSource::classify(raw)
    }
}

impl From<String> for TemplateSource {
    fn from(raw: String) -> Self {
        TemplateSource::classify(raw)
    }
}

fn is_file_reference(raw: &str) -> bool {
    if raw.chars().count() >= MAX_FILE_REF_LEN {
        return false;
    }
    let ext = Path::new(raw)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e));
    match ext {
        Some(ext) => ACCEPTED_FILE_EXT.contains(&ext.as_str()),
        None => false,
    }
}

/// Variable bindings a template is rendered with
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Bindings(BTreeMap<String, Value>);

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a binding, returning the value it replaced
    pub fn insert(&mut self, key: impl Into<String>, value: impl Serialize) -> Option<Value> {
        self.0.insert(key.into(), Value::from_serialize(&value))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Bindings {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// What a provider returns: a template source and its bindings
#[derive(Debug, Clone)]
pub struct Fragment {
    pub source: TemplateSource,
    pub bindings: Bindings,
}

impl Fragment {
    /// Build a fragment, classifying `source` as inline text or a file name
    pub fn new(source: impl Into<String>, bindings: Bindings) -> Self {
        Self {
            source: TemplateSource::classify(source),
            bindings,
        }
    }

    /// Build a fragment whose source is always treated as template text
    pub fn inline(text: impl Into<String>, bindings: Bindings) -> Self {
        Self {
            source: TemplateSource::Inline(text.into()),
            bindings,
        }
    }

    /// Build a fragment that always loads `name` from the templates directory
    pub fn file(name: impl Into<String>, bindings: Bindings) -> Self {
        Self {
            source: TemplateSource::File(name.into()),
            bindings,
        }
    }
}

/// Renders fragments with a MiniJinja environment
pub struct Renderer {
    env: Environment<'static>,
    templates_dir: PathBuf,
}

impl Renderer {
    /// Create a renderer that resolves file templates under `templates_dir`.
    ///
    /// The directory does not have to exist; looking up a file template
    /// then fails at render time.
    pub fn new(templates_dir: impl AsRef<Path>) -> Self {
        let templates_dir = templates_dir.as_ref().to_path_buf();

        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        // AIML is XML, but bindings are inserted verbatim
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_loader(minijinja::path_loader(&templates_dir));

        Self { env, templates_dir }
    }

    /// Create a renderer for the config's current `templates_dir`
    pub fn for_config(config: &DocumentConfig) -> Self {
        Self::new(config.templates_dir())
    }

    /// Fail on undefined variables instead of rendering them empty
    pub fn strict(mut self) -> Self {
        self.env.set_undefined_behavior(UndefinedBehavior::Strict);
        self
    }

    pub fn templates_dir(&self) -> &Path {
        &self.templates_dir
    }

    /// Render a fragment; `provider` labels any error
    pub fn render(&self, provider: &str, fragment: &Fragment) -> Result<String> {
        let template_error = |e: minijinja::Error| Error::Template {
            provider: provider.to_string(),
            message: e.to_string(),
        };

        match &fragment.source {
            TemplateSource::Inline(text) => {
                log::debug!("{}: rendering inline template", provider);
                self.env
                    .render_str(text, &fragment.bindings)
                    .map_err(template_error)
            }
            TemplateSource::File(name) => {
                log::debug!(
                    "{}: rendering {} from {}",
                    provider,
                    name,
                    self.templates_dir.display()
                );
                let template = self.env.get_template(name).map_err(template_error)?;
                template.render(&fragment.bindings).map_err(template_error)
            }
        }
    }
}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderer")
            .field("templates_dir", &self.templates_dir)
            .finish_non_exhaustive()
    }
}
