//! Project skeleton for `jaiml create`

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::PROJECT_CONFIG_FILE;
use crate::error::{io_context, Error, Result};

/// Folders created in a new project
pub const FOLDERS: &[&str] = &["jinja-templates", "out", "src"];

const CONFIG_SEED: &str = r#"# jaiml project configuration

[document]
brain_file = false
brain_file_name = "brain.aiml"
extension = ".aiml"
wrap = false

[paths]
templates_dir = "jinja-templates"
output_dir = "out"
manifest = "providers.toml"
"#;

const MANIFEST_SEED: &str = r#"# Providers, rendered in the order they appear here.
#
# `template` is either inline template text or the name of a file in
# jinja-templates/ (.jinja, .j2, .aiml or .xml).

[[provider]]
name = "greeting"
template = "greeting.aiml"

[provider.vars]
responses = ["HELLO SIR", "How Are you?", "Hi!", "Hello dear", "Hi, are you ok?"]

[[provider]]
name = "farewell"
template = """
<category>
    <pattern>BYE</pattern>
    <template>{{ reply }}</template>
</category>
"""

[provider.vars]
reply = "See you soon!"
"#;

const TEMPLATE_SEED: &str = r#"<category>
    <pattern>HELLO _</pattern>
    <template>
        <random>
        {% for response in responses %}
            <li>{{ response }}</li>
        {% endfor %}
        </random>
    </template>
</category>
"#;

/// Folders and seed files for a new project rooted at `root`
#[derive(Debug, Clone)]
pub struct Scaffold {
    root: PathBuf,
}

impl Scaffold {
    /// `root` must already exist
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(Error::FileNotFound {
                path: root.to_path_buf(),
            });
        }
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn folders(&self) -> Vec<PathBuf> {
        FOLDERS.iter().map(|f| self.root.join(f)).collect()
    }

    pub fn files(&self) -> Vec<(PathBuf, &'static str)> {
        vec![
            (self.root.join(PROJECT_CONFIG_FILE), CONFIG_SEED),
            (self.root.join("providers.toml"), MANIFEST_SEED),
            (
                self.root.join("jinja-templates").join("greeting.aiml"),
                TEMPLATE_SEED,
            ),
        ]
    }

    /// Create the folders, then the seed files; nothing existing is overwritten
    pub fn create(&self) -> Result<Vec<PathBuf>> {
        let mut created = Vec::new();

        for folder in self.folders() {
            fs::create_dir(&folder).map_err(|e| io_context(e, "creating folder", &folder))?;
            log::debug!("created {}", folder.display());
            created.push(folder);
        }

        for (path, content) in self.files() {
            let mut file = OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .map_err(|e| io_context(e, "creating file", &path))?;
            file.write_all(content.as_bytes())
                .map_err(|e| io_context(e, "writing file", &path))?;
            log::debug!("created {}", path.display());
            created.push(path);
        }

        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, DocumentConfig};
    use crate::manifest::Manifest;
    use crate::registry::Registry;
    use crate::template::Renderer;
    use tempfile::tempdir;

    #[test]
    fn test_create_layout() {
        let dir = tempdir().unwrap();
        let created = Scaffold::new(dir.path()).unwrap().create().unwrap();

        assert_eq!(created.len(), 6);
        for folder in FOLDERS {
            assert!(dir.path().join(folder).is_dir());
        }
        assert!(dir.path().join("jaiml.toml").is_file());
        assert!(dir.path().join("providers.toml").is_file());
    }

    #[test]
    fn test_missing_root_rejected() {
        let dir = tempdir().unwrap();
        let err = Scaffold::new(dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn test_existing_project_rejected() {
        let dir = tempdir().unwrap();
        let scaffold = Scaffold::new(dir.path()).unwrap();
        scaffold.create().unwrap();
        assert!(matches!(scaffold.create(), Err(Error::Io(_))));
    }

    #[test]
    fn test_seed_project_renders() {
        let dir = tempdir().unwrap();
        Scaffold::new(dir.path()).unwrap().create().unwrap();

        let app: AppConfig =
            toml::from_str(&fs::read_to_string(dir.path().join("jaiml.toml")).unwrap()).unwrap();
        let config = DocumentConfig::from_app_config(&app, dir.path()).unwrap();
        assert!(!config.brain_file());
        let manifest = Manifest::load(dir.path().join("providers.toml")).unwrap();
        let mut reg = Registry::new(Renderer::for_config(&config));
        let handles = manifest.register_into(&mut reg);

        let greeting = handles[0].call().unwrap();
        assert!(greeting.contains("<li>Hi!</li>"));
        let farewell = handles[1].call().unwrap();
        assert!(farewell.contains("<template>See you soon!</template>"));
    }
}
