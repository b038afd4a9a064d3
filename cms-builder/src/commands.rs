//! Subcommand handlers.
//!
//! Each handler loads nothing itself: it works on the [`AppContext`] built in
//! `main`, mutates the session through `cmsform`, then saves or prints.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cmsform::{
    FieldPatch,
    data::{
        FieldId, FieldKind, FieldSchema, FieldType, FormValue, Model, ModelMeta,
        field::DynamicZoneOptions,
    },
    engine, lint,
    render::{render_model, validate::validate_model},
    zone::Whitelist,
};
use colored::Colorize;

use crate::ctx::{AppContext, load_value};

/// `update` flags before they are resolved against the current field.
pub struct PatchArgs {
    pub key: Option<String>,
    pub label: Option<String>,
    pub required: Option<bool>,
    pub unique: Option<bool>,
    pub helper_text: Option<String>,
    pub field_type: Option<FieldType>,
    pub options: Option<String>,
}

/// Handler for builder subcommands.
pub struct CommandHandler;

impl CommandHandler {
    /// Run `op` on the top-level fields, or on the sub-fields of `parent`.
    fn edit<F>(ctx: &mut AppContext, parent: Option<FieldId>, op: F) -> Result<bool>
    where
        F: FnOnce(&[FieldSchema]) -> Vec<FieldSchema>,
    {
        let changed = match parent {
            Some(parent) => {
                let field = ctx.field(&parent)?;
                if field.field_type() != Some(FieldType::Repeater) {
                    bail!("field `{parent}` is not a repeater");
                }
                ctx.session.edit_sub_fields(&parent, op)
            }
            None => ctx.session.edit_fields(op),
        };
        Ok(changed)
    }

    /// Repeater whose sub-fields hold `id`, or `None` at the top level.
    ///
    /// A given `parent` must match the actual owner.
    fn owner(ctx: &AppContext, parent: Option<FieldId>, id: &FieldId) -> Result<Option<FieldId>> {
        let owner = engine::owner_of(ctx.session.fields(), id)
            .ok_or_else(|| anyhow!("no field with id `{id}`"))?
            .map(|f| f.id.clone());
        if let Some(parent) = parent {
            if owner.as_ref() != Some(&parent) {
                bail!("field `{id}` is not a sub-field of `{parent}`");
            }
        }
        Ok(owner)
    }

    pub fn handle_init(
        ctx: &mut AppContext,
        name: String,
        key: String,
        description: String,
    ) -> Result<()> {
        if ctx.session.path.exists() {
            warn!(
                "{} already exists, only its metadata is replaced",
                ctx.session.path.display()
            );
        }
        let meta = ModelMeta {
            name,
            key,
            description,
        };
        if ctx.session.model.meta != meta || !ctx.session.path.exists() {
            ctx.session.model.meta = meta;
            ctx.session.needs_save = true;
        }
        ctx.save()
    }

    /// `add` when `index` is `None`, `insert` otherwise.
    pub fn handle_add(
        ctx: &mut AppContext,
        parent: Option<FieldId>,
        index: Option<isize>,
        field_type: FieldType,
        label: &str,
    ) -> Result<()> {
        Self::edit(ctx, parent, |list| match index {
            Some(i) => engine::insert_field(list, i, field_type, label),
            None => engine::add_field(list, field_type, label),
        })?;
        ctx.save()
    }

    pub fn handle_remove(ctx: &mut AppContext, parent: Option<FieldId>, id: &FieldId) -> Result<()> {
        let owner = Self::owner(ctx, parent, id)?;
        Self::edit(ctx, owner, |list| engine::remove_field(list, id))?;
        ctx.save()
    }

    /// Turn `update` flags into a patch for field `id`.
    pub fn build_patch(ctx: &AppContext, id: &FieldId, args: PatchArgs) -> Result<FieldPatch> {
        let current = ctx.field(id)?;
        let kind = match &args.options {
            Some(raw) => {
                let field_type = args
                    .field_type
                    .or(current.field_type())
                    .ok_or_else(|| anyhow!("field `{id}` has an unsupported type, pass --type"))?;
                let value = serde_json::from_str(raw).context("--options is not valid JSON")?;
                let mut kind = FieldKind::with_options(field_type, value)?;
                if let FieldKind::Repeater { sub_fields, .. } = &mut kind {
                    *sub_fields = current.sub_fields().to_vec();
                }
                Some(kind)
            }
            None => None,
        };
        let patch = FieldPatch {
            key: args.key,
            label: args.label,
            required: args.required,
            unique: args.unique,
            helper_text: args.helper_text,
            field_type: args.field_type,
            kind,
        };
        if patch.is_empty() {
            bail!("nothing to update");
        }
        Ok(patch)
    }

    pub fn handle_update(
        ctx: &mut AppContext,
        parent: Option<FieldId>,
        id: &FieldId,
        patch: &FieldPatch,
    ) -> Result<()> {
        let owner = Self::owner(ctx, parent, id)?;
        if !Self::edit(ctx, owner, |list| engine::update_field(list, id, patch))? {
            println!("{}", format!("field `{id}` left unchanged").yellow());
        }
        ctx.save()
    }

    pub fn handle_move(
        ctx: &mut AppContext,
        parent: Option<FieldId>,
        active: &FieldId,
        over: &FieldId,
    ) -> Result<()> {
        let owner = Self::owner(ctx, parent, active)?;
        if Self::owner(ctx, None, over)? != owner {
            bail!("`{active}` and `{over}` are not siblings");
        }
        Self::edit(ctx, owner, |list| engine::reorder_fields(list, active, over))?;
        ctx.save()
    }

    pub fn handle_whitelist(
        ctx: &mut AppContext,
        parent: Option<FieldId>,
        id: &FieldId,
        allow: &[String],
        deny: &[String],
        clear: bool,
    ) -> Result<()> {
        let field = ctx.field(id)?;
        if field.field_type() != Some(FieldType::DynamicZone) {
            bail!("field `{id}` is not a dynamic zone");
        }
        let mut whitelist = Whitelist::from(field.allowed_components());
        if clear {
            whitelist.clear();
        }
        for key in allow {
            if ctx.registry.get(key).is_none() {
                warn!("component `{key}` is not registered");
            }
            whitelist.toggle(key, true);
        }
        for key in deny {
            whitelist.toggle(key, false);
        }
        let patch = FieldPatch {
            kind: Some(FieldKind::DynamicZone {
                options: DynamicZoneOptions {
                    allowed_components: whitelist.into_vec(),
                },
            }),
            ..Default::default()
        };
        let owner = Self::owner(ctx, parent, id)?;
        Self::edit(ctx, owner, |list| engine::update_field(list, id, &patch))?;

        let field = ctx.field(id)?;
        for item in ctx.registry.list_allowed(field.allowed_components()) {
            println!("  {} {}", item.key.bold(), item.display_name);
        }
        ctx.save()
    }

    pub fn handle_components(ctx: &AppContext, search: Option<&str>) -> Result<()> {
        let found = ctx.registry.search(search.unwrap_or(""));
        if found.is_empty() {
            println!("{}", "no components found".yellow());
        }
        for c in found {
            println!(
                "{} {} [{}] {} fields",
                c.key.bold(),
                c.display_name,
                c.category,
                c.fields.len()
            );
            if !c.description.is_empty() {
                println!("    {}", c.description.dimmed());
            }
        }
        Ok(())
    }

    pub fn handle_render(ctx: &AppContext, value: Option<PathBuf>) -> Result<()> {
        let value = match value {
            Some(path) => load_value(&path)?,
            None => FormValue::new(),
        };
        let nodes = render_model(&ctx.session.model, &ctx.render_context(&value));
        println!("{}", serde_json::to_string_pretty(&nodes)?);
        Ok(())
    }

    pub fn handle_validate(ctx: &AppContext, value: &Path) -> Result<()> {
        let value = load_value(value)?;
        let errs = validate_model(&ctx.session.model, &ctx.render_context(&value));
        if errs.is_empty() {
            println!("{}", "valid".green());
            return Ok(());
        }
        for e in &errs {
            println!("{}: {}", e.path.to_string().bold(), e.message.red());
        }
        bail!("{} validation errors", errs.len())
    }

    pub fn handle_check(ctx: &AppContext) -> Result<()> {
        let errs = lint::check_model(&ctx.session.model, &ctx.registry, &ctx.models);
        if errs.is_empty() {
            println!("{}", "no problems found".green());
            return Ok(());
        }
        for e in &errs {
            println!("{}", e.to_string().yellow());
        }
        bail!("{} problems found", errs.len())
    }

    pub fn handle_schema() -> Result<()> {
        let schema = schemars::schema_for!(Model);
        println!("{}", serde_json::to_string_pretty(&schema)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmsform::data::BuilderSession;

    fn ctx(dir: &Path) -> AppContext {
        AppContext::load(Some(dir.join("page.json")), None).unwrap()
    }

    #[test]
    fn nested_add_requires_repeater() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = ctx(dir.path());
        CommandHandler::handle_add(&mut ctx, None, None, FieldType::Text, "Title").unwrap();
        let title = ctx.session.fields()[0].id.clone();
        assert!(CommandHandler::handle_add(&mut ctx, Some(title), None, FieldType::Text, "x").is_err());

        CommandHandler::handle_add(&mut ctx, None, Some(0), FieldType::Repeater, "Rows").unwrap();
        let rows = ctx.session.fields()[0].id.clone();
        CommandHandler::handle_add(&mut ctx, Some(rows), None, FieldType::Number, "Qty").unwrap();

        let saved = BuilderSession::open(Some(dir.path().join("page.json")), ModelMeta::default())
            .unwrap();
        assert_eq!(saved.fields()[0].sub_fields()[0].label, "Qty");
        assert_eq!(saved.fields()[1].label, "Title");
    }

    #[test]
    fn whitelist_toggles_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = ctx(dir.path());
        CommandHandler::handle_add(&mut ctx, None, None, FieldType::DynamicZone, "Blocks").unwrap();
        let id = ctx.session.fields()[0].id.clone();

        let allow = ["text".to_string(), "hero_banner".to_string()];
        CommandHandler::handle_whitelist(&mut ctx, None, &id, &allow, &[], false).unwrap();
        CommandHandler::handle_whitelist(&mut ctx, None, &id, &[], &["text".to_string()], false)
            .unwrap();
        assert_eq!(ctx.field(&id).unwrap().allowed_components(), ["hero_banner"]);

        CommandHandler::handle_whitelist(&mut ctx, None, &id, &[], &[], true).unwrap();
        assert!(ctx.field(&id).unwrap().allowed_components().is_empty());
    }

    #[test]
    fn options_patch_uses_current_type() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = ctx(dir.path());
        CommandHandler::handle_add(&mut ctx, None, None, FieldType::Media, "Cover").unwrap();
        let id = ctx.session.fields()[0].id.clone();
        let patch = CommandHandler::build_patch(
            &ctx,
            &id,
            PatchArgs {
                key: None,
                label: None,
                required: Some(true),
                unique: None,
                helper_text: None,
                field_type: None,
                options: Some(r#"{"multiple":true}"#.to_string()),
            },
        )
        .unwrap();
        CommandHandler::handle_update(&mut ctx, None, &id, &patch).unwrap();
        let field = ctx.field(&id).unwrap();
        assert!(field.required);
        assert!(matches!(&field.kind, FieldKind::Media { options } if options.multiple));
    }

    #[test]
    fn empty_update_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = ctx(dir.path());
        CommandHandler::handle_add(&mut ctx, None, None, FieldType::Text, "Title").unwrap();
        let id = ctx.session.fields()[0].id.clone();
        let args = PatchArgs {
            key: None,
            label: None,
            required: None,
            unique: None,
            helper_text: None,
            field_type: None,
            options: None,
        };
        assert!(CommandHandler::build_patch(&ctx, &id, args).is_err());
    }

    #[test]
    fn nested_ids_find_their_repeater() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = ctx(dir.path());
        CommandHandler::handle_add(&mut ctx, None, None, FieldType::Text, "Title").unwrap();
        CommandHandler::handle_add(&mut ctx, None, None, FieldType::Repeater, "Rows").unwrap();
        let title = ctx.session.fields()[0].id.clone();
        let rows = ctx.session.fields()[1].id.clone();
        CommandHandler::handle_add(&mut ctx, Some(rows.clone()), None, FieldType::Text, "A").unwrap();
        CommandHandler::handle_add(&mut ctx, Some(rows.clone()), None, FieldType::Text, "B").unwrap();
        let a = ctx.field(&rows).unwrap().sub_fields()[0].id.clone();
        let b = ctx.field(&rows).unwrap().sub_fields()[1].id.clone();

        CommandHandler::handle_move(&mut ctx, None, &a, &b).unwrap();
        let labels: Vec<_> = ctx.field(&rows).unwrap().sub_fields().iter().map(|f| f.label.clone()).collect();
        assert_eq!(labels, ["B", "A"]);
        assert!(CommandHandler::handle_move(&mut ctx, None, &a, &title).is_err());

        assert!(CommandHandler::handle_remove(&mut ctx, Some(title), &a).is_err());
        CommandHandler::handle_remove(&mut ctx, None, &a).unwrap();
        assert!(ctx.field(&a).is_err());
        assert_eq!(ctx.field(&rows).unwrap().sub_fields().len(), 1);

        let saved = BuilderSession::open(Some(dir.path().join("page.json")), ModelMeta::default())
            .unwrap();
        assert_eq!(saved.fields()[1].sub_fields()[0].label, "B");
    }
}
