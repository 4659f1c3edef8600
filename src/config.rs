//! Configuration management for jaiml
//!
//! Two layers: [`AppConfig`] mirrors the TOML file on disk, and
//! [`DocumentConfig`] is the validated value handed to the assembler and
//! emitter. Handles project/XDG config discovery and path expansion.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{io_context, Error, Result};

const APP_NAME: &str = "jaiml";

/// Name of the per-project config file
pub const PROJECT_CONFIG_FILE: &str = "jaiml.toml";

pub const DEFAULT_HEADER: &str = "<aiml version=\"1.0\" encoding=\"UTF-8\">\n";
pub const DEFAULT_FOOTER: &str = "\n</aiml>";
pub const DEFAULT_BRAIN_FILE_NAME: &str = "brain.aiml";
pub const DEFAULT_EXTENSION: &str = ".aiml";
pub const DEFAULT_TEMPLATES_DIR: &str = "jinja-templates";
pub const DEFAULT_MANIFEST: &str = "providers.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Document assembly settings
    pub document: DocumentSettings,
    /// Path configuration
    pub paths: PathsConfig,
}

/// Document assembly settings as written in the config file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentSettings {
    /// Text placed before the concatenated providers
    pub header: String,
    /// Text placed after the concatenated providers
    pub footer: String,
    /// Persist the assembled document on every render
    pub brain_file: bool,
    /// File name of the persisted document, inside output_dir
    pub brain_file_name: String,
    /// Extension of files written by `emit`
    pub extension: String,
    /// Wrap emitted files in header and footer
    pub wrap: bool,
}

impl Default for DocumentSettings {
    fn default() -> Self {
        Self {
            header: DEFAULT_HEADER.to_string(),
            footer: DEFAULT_FOOTER.to_string(),
            brain_file: true,
            brain_file_name: DEFAULT_BRAIN_FILE_NAME.to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
            wrap: false,
        }
    }
}

/// Path configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory searched for file-backed templates
    pub templates_dir: String,
    /// Directory the brain file and emitted files are written to
    pub output_dir: String,
    /// Provider manifest
    pub manifest: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            templates_dir: DEFAULT_TEMPLATES_DIR.to_string(),
            output_dir: ".".to_string(),
            manifest: DEFAULT_MANIFEST.to_string(),
        }
    }
}

/// A settable configuration key and the config table it lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    Header,
    Footer,
    BrainFile,
    BrainFileName,
    Extension,
    Wrap,
    TemplatesDir,
    OutputDir,
    Manifest,
}

impl SettingKey {
    pub const ALL: &'static [SettingKey] = &[
        SettingKey::Header,
        SettingKey::Footer,
        SettingKey::BrainFile,
        SettingKey::BrainFileName,
        SettingKey::Extension,
        SettingKey::Wrap,
        SettingKey::TemplatesDir,
        SettingKey::OutputDir,
        SettingKey::Manifest,
    ];

    /// Parse `header` or `document.header` style keys
    pub fn parse(key: &str) -> Result<Self> {
        let bare = key
            .strip_prefix("document.")
            .or_else(|| key.strip_prefix("paths."))
            .unwrap_or(key);
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.name() == bare)
            .ok_or_else(|| Error::Config(format!("unknown setting '{}'", key)))
    }

    pub fn name(self) -> &'static str {
        match self {
            SettingKey::Header => "header",
            SettingKey::Footer => "footer",
            SettingKey::BrainFile => "brain_file",
            SettingKey::BrainFileName => "brain_file_name",
            SettingKey::Extension => "extension",
            SettingKey::Wrap => "wrap",
            SettingKey::TemplatesDir => "templates_dir",
            SettingKey::OutputDir => "output_dir",
            SettingKey::Manifest => "manifest",
        }
    }

    /// Config table holding this key
    pub fn section(self) -> &'static str {
        match self {
            SettingKey::TemplatesDir | SettingKey::OutputDir | SettingKey::Manifest => "paths",
            _ => "document",
        }
    }
}

/// Validated settings used to assemble and emit documents
#[derive(Debug, Clone)]
pub struct DocumentConfig {
    header: String,
    footer: String,
    output_dir: PathBuf,
    templates_dir: PathBuf,
    brain_file: bool,
    brain_file_name: String,
    extension: String,
    wrap: bool,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        let settings = DocumentSettings::default();
        Self {
            header: settings.header,
            footer: settings.footer,
            output_dir: PathBuf::from("."),
            templates_dir: PathBuf::from(DEFAULT_TEMPLATES_DIR),
            brain_file: settings.brain_file,
            brain_file_name: settings.brain_file_name,
            extension: settings.extension,
            wrap: settings.wrap,
        }
    }
}

impl DocumentConfig {
    /// Build from a loaded config file, resolving relative paths against `base_dir`.
    ///
    /// `output_dir` is not required to exist yet; writers call
    /// [`DocumentConfig::check_output_dir`] before touching the disk.
    pub fn from_app_config(config: &AppConfig, base_dir: &Path) -> Result<Self> {
        let doc = &config.document;
        let mut resolved = Self {
            header: doc.header.clone(),
            footer: doc.footer.clone(),
            brain_file: doc.brain_file,
            brain_file_name: doc.brain_file_name.clone(),
            extension: doc.extension.clone(),
            wrap: doc.wrap,
            ..Self::default()
        };
        resolved.templates_dir = resolve_against(base_dir, &config.paths.templates_dir)?;
        resolved.output_dir = resolve_against(base_dir, &config.paths.output_dir)?;
        Ok(resolved)
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn footer(&self) -> &str {
        &self.footer
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn templates_dir(&self) -> &Path {
        &self.templates_dir
    }

    pub fn brain_file(&self) -> bool {
        self.brain_file
    }

    pub fn brain_file_name(&self) -> &str {
        &self.brain_file_name
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn wrap(&self) -> bool {
        self.wrap
    }

    /// Where the assembled document is persisted
    pub fn brain_file_path(&self) -> PathBuf {
        self.output_dir.join(&self.brain_file_name)
    }

    pub fn set_header(&mut self, header: impl Into<String>) {
        self.header = header.into();
    }

    pub fn set_footer(&mut self, footer: impl Into<String>) {
        self.footer = footer.into();
    }

    pub fn set_brain_file(&mut self, enabled: bool) {
        self.brain_file = enabled;
    }

    /// Only renderers built afterwards with [`Renderer::for_config`] see the change
    ///
    /// [`Renderer::for_config`]: crate::template::Renderer::for_config
    pub fn set_templates_dir(&mut self, dir: impl Into<PathBuf>) {
        self.templates_dir = dir.into();
    }

    /// Point output at an existing directory; on error the previous value is kept
    pub fn set_output_dir(&mut self, dir: impl Into<PathBuf>) -> Result<()> {
        let dir = dir.into();
        ensure_dir(&dir)?;
        self.output_dir = dir;
        Ok(())
    }

    /// Fail unless `output_dir` is an existing directory
    pub fn check_output_dir(&self) -> Result<()> {
        ensure_dir(&self.output_dir)
    }

    /// Assign a dynamically typed value, checking its type first.
    ///
    /// On error nothing is changed. `manifest` is not part of the document
    /// settings and only has its type checked. A new `templates_dir` applies
    /// to renderers built after the call.
    pub fn set(&mut self, key: SettingKey, value: &toml::Value) -> Result<()> {
        match key {
            SettingKey::Header => self.header = expect_str(key, value)?.to_string(),
            SettingKey::Footer => self.footer = expect_str(key, value)?.to_string(),
            SettingKey::BrainFileName => {
                self.brain_file_name = expect_str(key, value)?.to_string()
            }
            SettingKey::Extension => self.extension = expect_str(key, value)?.to_string(),
            SettingKey::TemplatesDir => {
                self.templates_dir = expand_str_path(expect_str(key, value)?)?
            }
            SettingKey::OutputDir => {
                let dir = expand_str_path(expect_str(key, value)?)?;
                self.set_output_dir(dir)?
            }
            SettingKey::BrainFile => self.brain_file = expect_bool(key, value)?,
            SettingKey::Wrap => self.wrap = expect_bool(key, value)?,
            SettingKey::Manifest => {
                expect_str(key, value)?;
            }
        }
        Ok(())
    }

    /// Surround a body with the configured header and footer
    pub fn enclose(&self, body: &str) -> String {
        let mut out = String::with_capacity(self.header.len() + body.len() + self.footer.len());
        out.push_str(&self.header);
        out.push_str(body);
        out.push_str(&self.footer);
        out
    }
}

fn ensure_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "output_dir {} is not an existing directory",
            dir.display()
        )))
    }
}

fn expect_str(key: SettingKey, value: &toml::Value) -> Result<&str> {
    value.as_str().ok_or_else(|| {
        Error::Config(format!(
            "{} must be a string, not {}",
            key.name(),
            value.type_str()
        ))
    })
}

fn expect_bool(key: SettingKey, value: &toml::Value) -> Result<bool> {
    value.as_bool().ok_or_else(|| {
        Error::Config(format!(
            "{} must be a boolean, not {}",
            key.name(),
            value.type_str()
        ))
    })
}

/// Resolved application paths
#[derive(Debug, Clone)]
pub struct ResolvedPaths {
    /// Config file path
    pub config_file: PathBuf,
    /// Directory relative paths in the config are resolved against
    pub project_dir: PathBuf,
}

impl ResolvedPaths {
    /// Find the config file: override, then `./jaiml.toml`, then the XDG config dir
    pub fn discover(config_override: Option<PathBuf>) -> Result<Self> {
        let cwd = env::current_dir()?;

        if let Some(path) = config_override {
            let expanded = expand_path(&path)?;
            let config_file = if expanded.is_dir() {
                expanded.join(PROJECT_CONFIG_FILE)
            } else {
                expanded
            };
            let project_dir = match config_file.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => cwd,
            };
            return Ok(Self {
                config_file,
                project_dir,
            });
        }

        let local = cwd.join(PROJECT_CONFIG_FILE);
        if local.is_file() {
            return Ok(Self {
                config_file: local,
                project_dir: cwd,
            });
        }

        Ok(Self {
            config_file: default_config_dir()?.join("config.toml"),
            project_dir: cwd,
        })
    }

    /// Resolve a configured path against the project directory
    pub fn resolve(&self, path: &str) -> Result<PathBuf> {
        resolve_against(&self.project_dir, path)
    }
}

/// Load configuration, creating a default file if it doesn't exist
pub fn load_or_create_config(paths: &ResolvedPaths) -> Result<AppConfig> {
    if !paths.config_file.exists() {
        write_default_config(&paths.config_file)?;
    }
    load_config(&paths.config_file)
}

/// Load configuration without touching the disk; a missing file yields defaults
pub fn load_config_or_default(paths: &ResolvedPaths) -> Result<AppConfig> {
    if paths.config_file.exists() {
        load_config(&paths.config_file)
    } else {
        Ok(AppConfig::default())
    }
}

fn load_config(path: &Path) -> Result<AppConfig> {
    let content =
        fs::read_to_string(path).map_err(|e| io_context(e, "reading config file", path))?;
    let config: AppConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Render the default configuration as TOML with a leading comment
pub fn default_config_toml(title: &str) -> Result<String> {
    let toml_content = toml::to_string_pretty(&AppConfig::default())?;
    Ok(format!("# {}\n\n{}", title, toml_content))
}

/// Write the default configuration file
pub fn write_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| io_context(e, "creating config directory", parent))?;
    }

    let content = default_config_toml("jaiml configuration\n# Generated automatically on first run")?;
    fs::write(path, content).map_err(|e| io_context(e, "writing config file", path))?;

    log::info!("Created default config at {}", path.display());
    Ok(())
}

fn resolve_against(base: &Path, path: &str) -> Result<PathBuf> {
    let expanded = expand_str_path(path)?;
    if expanded.is_absolute() {
        Ok(expanded)
    } else {
        Ok(base.join(expanded))
    }
}

/// Expand a PathBuf, handling ~ and environment variables
pub fn expand_path(path: &Path) -> Result<PathBuf> {
    if let Some(text) = path.to_str() {
        expand_str_path(text)
    } else {
        Ok(path.to_path_buf())
    }
}

/// Expand a string path, handling ~ and environment variables
pub fn expand_str_path(text: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(text)
        .map_err(|e| Error::Config(format!("expanding path '{}': {}", text, e)))?;
    // Normalize the path to remove double slashes from env vars with trailing slashes
    let path = PathBuf::from(expanded.to_string());
    let normalized: PathBuf = path.components().collect();
    Ok(normalized)
}

/// Get the default config directory (XDG compliant)
pub fn default_config_dir() -> Result<PathBuf> {
    if let Some(dir) = env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir).join(APP_NAME));
    }

    if let Some(mut dir) = dirs::config_dir() {
        dir.push(APP_NAME);
        return Ok(dir);
    }

    dirs::home_dir()
        .map(|home| home.join(".config").join(APP_NAME))
        .ok_or_else(|| Error::Config("unable to determine configuration directory".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = DocumentConfig::default();
        assert_eq!(config.header(), "<aiml version=\"1.0\" encoding=\"UTF-8\">\n");
        assert_eq!(config.footer(), "\n</aiml>");
        assert!(config.brain_file());
        assert_eq!(config.brain_file_path(), PathBuf::from("./brain.aiml"));
    }

    #[test]
    fn test_non_string_header_rejected() {
        let mut config = DocumentConfig::default();
        config.set_header("<aiml>");

        let err = config
            .set(SettingKey::Header, &toml::Value::Integer(123))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert_eq!(config.header(), "<aiml>");
    }

    #[test]
    fn test_non_bool_brain_file_rejected() {
        let mut config = DocumentConfig::default();
        let err = config
            .set(SettingKey::BrainFile, &toml::Value::String("yes".into()))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(config.brain_file());
    }

    #[test]
    fn test_missing_output_dir_rejected() {
        let dir = tempdir().unwrap();
        let mut config = DocumentConfig::default();
        config.set_output_dir(dir.path()).unwrap();

        let missing = dir.path().join("does-not-exist");
        assert!(matches!(
            config.set_output_dir(&missing),
            Err(Error::Config(_))
        ));
        let value = toml::Value::String(missing.display().to_string());
        assert!(config.set(SettingKey::OutputDir, &value).is_err());
        assert_eq!(config.output_dir(), dir.path());
    }

    #[test]
    fn test_setting_key_parse() {
        assert_eq!(SettingKey::parse("footer").unwrap(), SettingKey::Footer);
        assert_eq!(
            SettingKey::parse("paths.output_dir").unwrap(),
            SettingKey::OutputDir
        );
        assert_eq!(SettingKey::OutputDir.section(), "paths");
        assert!(SettingKey::parse("colour").is_err());
    }

    #[test]
    fn test_from_app_config_resolves_relative_paths() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("out")).unwrap();

        let config: AppConfig = toml::from_str(
            r#"
[document]
footer = "</aiml>"

[paths]
output_dir = "out"
"#,
        )
        .unwrap();
        let resolved = DocumentConfig::from_app_config(&config, dir.path()).unwrap();

        assert_eq!(resolved.output_dir(), dir.path().join("out"));
        assert_eq!(resolved.templates_dir(), dir.path().join("jinja-templates"));
        assert_eq!(resolved.footer(), "</aiml>");
        assert_eq!(resolved.header(), DEFAULT_HEADER);
        resolved.check_output_dir().unwrap();
    }

    #[test]
    fn test_from_app_config_defers_output_dir_check() {
        let dir = tempdir().unwrap();
        let mut config = AppConfig::default();
        config.paths.output_dir = "out".to_string();

        let resolved = DocumentConfig::from_app_config(&config, dir.path()).unwrap();
        assert_eq!(resolved.output_dir(), dir.path().join("out"));
        assert!(matches!(resolved.check_output_dir(), Err(Error::Config(_))));
    }

    #[test]
    fn test_default_config_roundtrips() {
        let text = default_config_toml("test").unwrap();
        let parsed: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.document.header, DEFAULT_HEADER);
        assert_eq!(parsed.paths.manifest, DEFAULT_MANIFEST);
    }

    #[test]
    fn test_enclose() {
        let mut config = DocumentConfig::default();
        config.set_header("<h>");
        config.set_footer("</h>");
        assert_eq!(config.enclose("body"), "<h>body</h>");
    }

    #[test]
    fn test_expand_home() {
        let path = expand_str_path("~/test").unwrap();
        assert!(!path.to_string_lossy().contains('~'));
    }
}
