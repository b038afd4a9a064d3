use std::{
    fs,
    path::{Path, PathBuf},
    time::SystemTime,
};

use crate::{
    data::{
        field::{FieldId, FieldSchema, FieldType},
        model::{MetaField, Model, ModelMeta},
        schema::{FileFormat, SchemaError},
    },
    dnd::{DragController, DragSource, DropOutcome, DropTarget, Point},
    engine::{self, FieldPatch},
};

/// Tab of the field configuration drawer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSection {
    /// Label, key, helper text and repeater sub-fields.
    Basic,
    RelationOptions,
    MediaOptions,
    /// Required/unique flags, text regex and repeater row limits.
    Validation,
    /// Dynamic zone component whitelist.
    Components,
}

/// Drawer tabs applicable to `field`.
pub fn config_sections(field: &FieldSchema) -> Vec<ConfigSection> {
    let t = field.field_type();
    let mut sections = vec![ConfigSection::Basic];
    if t == Some(FieldType::Relation) {
        sections.push(ConfigSection::RelationOptions);
    }
    if t == Some(FieldType::Media) {
        sections.push(ConfigSection::MediaOptions);
    }
    if t == Some(FieldType::DynamicZone) {
        sections.push(ConfigSection::Components);
    } else {
        sections.push(ConfigSection::Validation);
    }
    sections
}

const DEFAULT_MODEL_PATH: &str = "model.json";

/// Builder state for one model being edited.
#[derive(Debug, Clone)]
pub struct BuilderSession {
    pub model: Model,
    /// File the model is saved to.
    pub path: PathBuf,
    /// Whether the model has unsaved changes.
    pub needs_save: bool,
    active_field: Option<FieldId>,
    drawer_open: bool,
    drag: DragController,
}

impl BuilderSession {
    pub fn new(model: Model, path: impl AsRef<Path>) -> Self {
        BuilderSession {
            model,
            path: path.as_ref().to_path_buf(),
            needs_save: false,
            active_field: None,
            drawer_open: false,
            drag: DragController::default(),
        }
    }

    /// Open the model at `path`, or start an empty one named by `meta` when
    /// the file does not exist yet.
    pub fn open(path: Option<impl AsRef<Path>>, meta: ModelMeta) -> Result<Self, SchemaError> {
        let path = path
            .map(|p| p.as_ref().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH));
        FileFormat::from_path(&path)?;
        let model = if path.exists() {
            Model::load(&path)?
        } else {
            debug!("{} does not exist, starting empty", path.display());
            Model::new(meta)
        };
        Ok(Self::new(model, path))
    }

    fn replace_fields(&mut self, next: Vec<FieldSchema>) -> bool {
        if next == self.model.fields {
            return false;
        }
        self.model.fields = next;
        self.needs_save = true;
        true
    }

    pub fn fields(&self) -> &[FieldSchema] {
        &self.model.fields
    }

    pub fn update_meta(&mut self, field: MetaField, value: &str) {
        let next = self.model.meta.patched(field, value);
        if next != self.model.meta {
            self.model.meta = next;
            self.needs_save = true;
        }
    }

    pub fn add_field(&mut self, field_type: FieldType, label: &str) -> bool {
        let next = engine::add_field(self.fields(), field_type, label);
        self.replace_fields(next)
    }

    pub fn insert_field(&mut self, index: isize, field_type: FieldType, label: &str) -> bool {
        let next = engine::insert_field(self.fields(), index, field_type, label);
        self.replace_fields(next)
    }

    /// Remove a field; closes the drawer if it was being configured.
    pub fn remove_field(&mut self, id: &FieldId) -> bool {
        let next = engine::remove_field(self.fields(), id);
        if self.active_field.as_ref() == Some(id) {
            self.close_drawer();
        }
        self.replace_fields(next)
    }

    pub fn update_field(&mut self, id: &FieldId, patch: &FieldPatch) -> bool {
        let next = engine::update_field(self.fields(), id, patch);
        self.replace_fields(next)
    }

    pub fn reorder_fields(&mut self, active: &FieldId, over: &FieldId) -> bool {
        let next = engine::reorder_fields(self.fields(), active, over);
        self.replace_fields(next)
    }

    /// Run a mutation on the top-level fields.
    pub fn edit_fields<F>(&mut self, op: F) -> bool
    where
        F: FnOnce(&[FieldSchema]) -> Vec<FieldSchema>,
    {
        let next = op(self.fields());
        self.replace_fields(next)
    }

    /// Run a mutation on the sub-fields of repeater `parent`.
    pub fn edit_sub_fields<F>(&mut self, parent: &FieldId, op: F) -> bool
    where
        F: FnOnce(&[FieldSchema]) -> Vec<FieldSchema>,
    {
        let next = engine::edit_sub_fields(self.fields(), parent, op);
        self.replace_fields(next)
    }

    /// Open the configuration drawer for `id`.
    pub fn open_config(&mut self, id: &FieldId) -> bool {
        if engine::find_field(self.fields(), id).is_none() {
            return false;
        }
        self.active_field = Some(id.clone());
        self.drawer_open = true;
        true
    }

    pub fn close_drawer(&mut self) {
        self.drawer_open = false;
        self.active_field = None;
    }

    pub fn is_drawer_open(&self) -> bool {
        self.drawer_open
    }

    /// Field currently shown in the configuration drawer.
    pub fn active_field(&self) -> Option<&FieldSchema> {
        self.active_field
            .as_ref()
            .and_then(|id| engine::find_field(self.fields(), id))
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    pub fn drag_press(&mut self, source: DragSource, at: Point) {
        self.drag.press(source, at);
    }

    pub fn drag_move(&mut self, at: Point) -> bool {
        self.drag.move_to(at)
    }

    pub fn drag_start(&mut self, source: DragSource) {
        self.drag.start(source);
    }

    /// Finish the current gesture over `target` and apply its outcome.
    pub fn drag_release(&mut self, target: Option<&DropTarget>) -> DropOutcome {
        let (next, outcome) = self.drag.release(&self.model.fields, target);
        self.replace_fields(next);
        outcome
    }

    /// Write the model, backing up an existing file first.
    ///
    /// Does nothing when there are no pending changes.
    pub fn save(&mut self) -> Result<(), SchemaError> {
        if !self.needs_save {
            return Ok(());
        }
        let format = FileFormat::from_path(&self.path)?;
        let s = format.render(&self.model)?;

        if self.path.exists() {
            let ext = self
                .path
                .extension()
                .and_then(|s| s.to_str())
                .unwrap_or("");
            let secs = SystemTime::now()
                .duration_since(SystemTime::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or_default();
            let backup_path = self.path.with_extension(format!("bk-{secs}.{ext}"));
            fs::copy(&self.path, &backup_path)?;
            debug!("backup written to {}", backup_path.display());
        }
        fs::write(&self.path, s)?;
        info!("model `{}` saved to {}", self.model.meta.key, self.path.display());
        self.needs_save = false;
        Ok(())
    }
}
