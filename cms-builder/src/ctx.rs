//! Application context and state management.
//!
//! [`AppContext`] bundles the builder session for the model being edited with
//! the component registry and model index it is checked against.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cmsform::data::{
    BuilderSession, ComponentRegistry, FieldId, FieldSchema, FormValue, ModelIndex, ModelMeta,
    registry::RegistryFile, schema::load_file,
};
use colored::Colorize;

use cmsform::RenderContext;

/// The state shared by every subcommand.
pub struct AppContext {
    pub session: BuilderSession,
    pub registry: ComponentRegistry,
    pub models: ModelIndex,
}

impl AppContext {
    /// Open `model` (created on first save) and the optional registry file.
    pub fn load(model: Option<PathBuf>, registry: Option<PathBuf>) -> Result<Self> {
        let session = BuilderSession::open(model.as_ref(), ModelMeta::default())
            .context("failed to open model")?;
        let (registry, models) = match registry {
            Some(path) => RegistryFile::load(&path)
                .with_context(|| format!("failed to load registry {}", path.display()))?,
            None => (ComponentRegistry::default(), ModelIndex::default()),
        };
        debug!(
            "{} components, {} fields in `{}`",
            registry.len(),
            session.fields().len(),
            session.model.meta.key
        );
        Ok(AppContext {
            session,
            registry,
            models,
        })
    }

    /// Field `id` at any depth, or an error naming it.
    pub fn field(&self, id: &FieldId) -> Result<&FieldSchema> {
        self.session
            .model
            .field(id)
            .ok_or_else(|| anyhow!("no field with id `{id}`"))
    }

    pub fn render_context<'a>(&'a self, value: &'a FormValue) -> RenderContext<'a> {
        RenderContext {
            registry: &self.registry,
            models: &self.models,
            value,
        }
    }

    /// Save when something changed and report where to.
    pub fn save(&mut self) -> Result<()> {
        if !self.session.needs_save {
            println!("{}", "nothing changed".yellow());
            return Ok(());
        }
        self.session
            .save()
            .with_context(|| format!("failed to save {}", self.session.path.display()))?;
        println!(
            "{} {}",
            "saved".green(),
            self.session.path.display().to_string().bold()
        );
        Ok(())
    }
}

/// Read a form value from a JSON or TOML file.
pub fn load_value(path: &Path) -> Result<FormValue> {
    let raw = load_file(path).with_context(|| format!("failed to read {}", path.display()))?;
    Ok(FormValue::from_json(raw)?)
}
