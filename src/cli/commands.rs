//! Command implementations for jaiml

use std::fs;
use std::path::PathBuf;

use crate::assembler::Assembler;
use crate::config::{
    default_config_toml, load_config_or_default, load_or_create_config, write_default_config,
    AppConfig, DocumentConfig, ResolvedPaths, SettingKey,
};
use crate::emitter::{normalize_extension, EmittedFile, Emitter};
use crate::error::{io_context, Error, Result};
use crate::manifest::Manifest;
use crate::registry::Registry;
use crate::scaffold::Scaffold;
use crate::template::Renderer;

use super::{
    CommonOpts, ConfigCommand, ConfigSetArgs, CreateArgs, EmitArgs, ListArgs, ProviderArgs,
    RenderArgs,
};

/// Runtime context for command execution
pub struct Context {
    pub common: CommonOpts,
    pub paths: ResolvedPaths,
    pub config: AppConfig,
}

impl Context {
    /// Create a new context
    pub fn new(common: CommonOpts) -> Result<Self> {
        let paths = ResolvedPaths::discover(common.config.clone())?;
        let config = if common.dry_run {
            load_config_or_default(&paths)?
        } else {
            load_or_create_config(&paths)?
        };

        Ok(Self {
            common,
            paths,
            config,
        })
    }

    /// Validated document settings for this invocation
    pub fn document_config(&self) -> Result<DocumentConfig> {
        DocumentConfig::from_app_config(&self.config, &self.paths.project_dir)
    }

    /// Load the manifest and register its providers
    fn load_registry(&self, args: &ProviderArgs, doc: &DocumentConfig) -> Result<Registry> {
        let manifest_path = match args.manifest {
            Some(ref path) => path.clone(),
            None => self.paths.resolve(&self.config.paths.manifest)?,
        };
        let manifest = Manifest::load(&manifest_path)?;

        let mut renderer = Renderer::for_config(doc);
        if args.strict {
            renderer = renderer.strict();
        }
        let mut registry = Registry::new(renderer);
        manifest.register_into(&mut registry);

        log::debug!(
            "loaded {} providers from {}",
            registry.len(),
            manifest_path.display()
        );
        Ok(registry)
    }

    /// Output result as JSON or human-readable
    pub fn output<T: serde::Serialize>(&self, value: &T, human: &str) -> Result<()> {
        if self.common.json {
            let json = serde_json::to_string_pretty(value)?;
            println!("{}", json);
        } else {
            println!("{}", human);
        }
        Ok(())
    }
}

/// Handle create command
pub fn handle_create(ctx: &Context, args: CreateArgs) -> Result<()> {
    let scaffold = Scaffold::new(&args.path)?;

    if ctx.common.dry_run {
        for folder in scaffold.folders() {
            log::info!("dry-run: would create folder {}", folder.display());
        }
        for (file, _) in scaffold.files() {
            log::info!("dry-run: would create file {}", file.display());
        }
        return Ok(());
    }

    let created = scaffold.create()?;

    ctx.output(
        &serde_json::json!({
            "status": "ok",
            "root": scaffold.root(),
            "created": created
        }),
        &format!("Created jaiml project in {}", scaffold.root().display()),
    )
}

/// Handle render command
pub fn handle_render(ctx: &Context, args: RenderArgs) -> Result<()> {
    let mut doc = ctx.document_config()?;
    let registry = ctx.load_registry(&args.providers, &doc)?;

    if args.no_brain_file {
        doc.set_brain_file(false);
    } else if ctx.common.dry_run && doc.brain_file() {
        log::info!(
            "dry-run: would write {}",
            doc.brain_file_path().display()
        );
        doc.set_brain_file(false);
    }

    let document = Assembler::new(&registry, &doc).render_all()?;

    if ctx.common.json {
        let brain_file = doc.brain_file().then(|| doc.brain_file_path());
        let output = serde_json::json!({
            "providers": registry.names(),
            "brain_file": brain_file,
            "document": document
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", document);
    }

    Ok(())
}

/// Handle emit command
pub fn handle_emit(ctx: &Context, args: EmitArgs) -> Result<()> {
    let doc = ctx.document_config()?;
    let registry = ctx.load_registry(&args.providers, &doc)?;
    let emitter = Emitter::new(&registry, &doc);

    let extension = normalize_extension(args.ext.as_deref().unwrap_or(doc.extension()));
    let wrap = args.wrap_override().unwrap_or(doc.wrap());

    if ctx.common.dry_run {
        let planned: Vec<EmittedFile> = match args.name {
            Some(ref name) => emitter.plan_one(name, wrap, &extension)?.into_iter().collect(),
            None => emitter.plan_all(wrap, &extension)?,
        };
        for file in &planned {
            log::info!("dry-run: would write {}", file.path.display());
        }
        return Ok(());
    }

    let written: Vec<PathBuf> = match args.name {
        Some(ref name) => emitter.emit_one(name, wrap, &extension)?.into_iter().collect(),
        None => emitter.emit_all(wrap, &extension)?,
    };

    ctx.output(
        &serde_json::json!({
            "status": "ok",
            "files": written
        }),
        &format!("Wrote {} file(s) to {}", written.len(), doc.output_dir().display()),
    )
}

/// Handle list command
pub fn handle_list(ctx: &Context, args: ListArgs) -> Result<()> {
    let doc = ctx.document_config()?;
    let registry = ctx.load_registry(&args.providers, &doc)?;

    if ctx.common.json {
        println!("{}", serde_json::to_string_pretty(&registry.names())?);
    } else {
        for name in registry.names() {
            println!("{}", name);
        }
    }
    Ok(())
}

/// Handle config command
pub fn handle_config(ctx: &Context, command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Show => {
            if ctx.common.json {
                let json = serde_json::to_string_pretty(&ctx.config)?;
                println!("{}", json);
            } else {
                let toml = toml::to_string_pretty(&ctx.config)?;
                println!("{}", toml);
            }
            Ok(())
        }
        ConfigCommand::Path => {
            println!("{}", ctx.paths.config_file.display());
            Ok(())
        }
        ConfigCommand::Reset => {
            if ctx.common.dry_run {
                log::info!(
                    "dry-run: would reset config at {}",
                    ctx.paths.config_file.display()
                );
                return Ok(());
            }
            write_default_config(&ctx.paths.config_file)?;
            ctx.output(
                &serde_json::json!({
                    "status": "ok",
                    "file": ctx.paths.config_file
                }),
                &format!("Reset config at {}", ctx.paths.config_file.display()),
            )
        }
        ConfigCommand::Set(args) => handle_config_set(ctx, args),
    }
}

fn handle_config_set(ctx: &Context, args: ConfigSetArgs) -> Result<()> {
    let key = SettingKey::parse(&args.key)?;
    let value = parse_setting_value(&args.value);

    // Paths are checked the way they will be resolved on load
    let checked = match (key, &value) {
        (SettingKey::OutputDir | SettingKey::TemplatesDir, toml::Value::String(raw)) => {
            toml::Value::String(ctx.paths.resolve(raw)?.display().to_string())
        }
        _ => value.clone(),
    };
    DocumentConfig::default().set(key, &checked)?;

    let config_file = &ctx.paths.config_file;
    let current = if config_file.exists() {
        fs::read_to_string(config_file)
            .map_err(|e| io_context(e, "reading config file", config_file))?
    } else {
        default_config_toml("jaiml configuration")?
    };
    let mut doc: toml_edit::DocumentMut = current
        .parse()
        .map_err(|e| Error::Config(format!("parsing {}: {}", config_file.display(), e)))?;

    set_setting(&mut doc, key, &value)?;

    if ctx.common.dry_run {
        log::info!("dry-run: would set {} = {}", key.name(), value);
        return Ok(());
    }

    let temp_path = config_file.with_extension("toml.tmp");
    fs::write(&temp_path, doc.to_string())
        .map_err(|e| io_context(e, "writing config file", &temp_path))?;
    fs::rename(&temp_path, config_file)?;

    ctx.output(
        &serde_json::json!({
            "status": "ok",
            "key": format!("{}.{}", key.section(), key.name()),
            "file": config_file
        }),
        &format!("Set {}.{}", key.section(), key.name()),
    )
}

/// Parse a command-line value as a TOML literal, falling back to a plain string
fn parse_setting_value(raw: &str) -> toml::Value {
    toml::from_str::<toml::Table>(&format!("value = {}", raw))
        .ok()
        .and_then(|mut table| table.remove("value"))
        .unwrap_or_else(|| toml::Value::String(raw.to_string()))
}

/// Write a validated setting into its table, keeping the rest of the file intact
fn set_setting(doc: &mut toml_edit::DocumentMut, key: SettingKey, value: &toml::Value) -> Result<()> {
    let item = match value {
        toml::Value::String(s) => toml_edit::value(s.as_str()),
        toml::Value::Boolean(b) => toml_edit::value(*b),
        other => {
            return Err(Error::Config(format!(
                "{} cannot be set to a {}",
                key.name(),
                other.type_str()
            )))
        }
    };

    let root = doc.as_table_mut();
    if !root.contains_key(key.section()) {
        root.insert(key.section(), toml_edit::Item::Table(toml_edit::Table::new()));
    }
    let table = root
        .get_mut(key.section())
        .and_then(|section| section.as_table_mut())
        .ok_or_else(|| Error::Config(format!("[{}] is not a table", key.section())))?;
    table.insert(key.name(), item);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_setting_value() {
        assert_eq!(parse_setting_value("123"), toml::Value::Integer(123));
        assert_eq!(parse_setting_value("false"), toml::Value::Boolean(false));
        assert_eq!(
            parse_setting_value("\"<aiml>\""),
            toml::Value::String("<aiml>".to_string())
        );
        assert_eq!(
            parse_setting_value("<aiml>"),
            toml::Value::String("<aiml>".to_string())
        );
        assert_eq!(parse_setting_value("out"), toml::Value::String("out".to_string()));
    }

    #[test]
    fn test_set_setting_preserves_comments() {
        let mut doc: toml_edit::DocumentMut = "# keep me\n[document]\nwrap = false\n"
            .parse()
            .unwrap();
        set_setting(&mut doc, SettingKey::Wrap, &toml::Value::Boolean(true)).unwrap();
        set_setting(
            &mut doc,
            SettingKey::OutputDir,
            &toml::Value::String("out".to_string()),
        )
        .unwrap();

        let text = doc.to_string();
        assert!(text.starts_with("# keep me"));
        let parsed: AppConfig = toml::from_str(&text).unwrap();
        assert!(parsed.document.wrap);
        assert_eq!(parsed.paths.output_dir, "out");
    }
}
