use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use cmsform::data::{FieldId, FieldType, model::MetaField};

#[macro_use]
extern crate log;
#[macro_use]
extern crate anyhow;

mod commands;
mod ctx;

use commands::CommandHandler;
use ctx::AppContext;

/// Build and inspect headless CMS content models.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Model file, `.json` or `.toml`.
    #[arg(short, long, global = true)]
    model: Option<PathBuf>,
    /// Component registry and model index; built-ins when omitted.
    #[arg(short, long, global = true)]
    registry: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the model file with the given metadata.
    Init {
        #[arg(long)]
        name: String,
        #[arg(long)]
        key: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Append a field.
    Add {
        field_type: FieldType,
        label: String,
        /// Add to the sub-fields of this repeater instead.
        #[arg(long)]
        parent: Option<FieldId>,
    },
    /// Insert a field at a position; out of range appends.
    Insert {
        #[arg(allow_negative_numbers = true)]
        index: isize,
        field_type: FieldType,
        label: String,
        #[arg(long)]
        parent: Option<FieldId>,
    },
    /// Remove a field.
    Remove {
        id: FieldId,
        /// Repeater expected to hold `id`; looked up when omitted.
        #[arg(long)]
        parent: Option<FieldId>,
    },
    /// Patch attributes of a field.
    Update {
        id: FieldId,
        #[arg(long)]
        parent: Option<FieldId>,
        #[arg(long)]
        key: Option<String>,
        #[arg(long)]
        label: Option<String>,
        #[arg(long)]
        required: Option<bool>,
        #[arg(long)]
        unique: Option<bool>,
        #[arg(long)]
        helper_text: Option<String>,
        /// Change the type; options reset to defaults.
        #[arg(long = "type")]
        field_type: Option<FieldType>,
        /// Type options as JSON, e.g. `{"multiple":true}`.
        #[arg(long)]
        options: Option<String>,
    },
    /// Move `active` to the position of `over`.
    Move {
        active: FieldId,
        over: FieldId,
        #[arg(long)]
        parent: Option<FieldId>,
    },
    /// Set a model attribute: name, key or description.
    Meta { field: MetaField, value: String },
    /// Edit the component whitelist of a dynamic zone.
    Whitelist {
        id: FieldId,
        #[arg(long)]
        parent: Option<FieldId>,
        #[arg(long)]
        allow: Vec<String>,
        #[arg(long)]
        deny: Vec<String>,
        /// Drop every entry before applying `--allow`.
        #[arg(long)]
        clear: bool,
    },
    /// List registered components.
    Components {
        #[arg(long)]
        search: Option<String>,
    },
    /// Print the render tree as JSON.
    Render {
        /// Form value file used to expand repeater rows and zone slots.
        #[arg(long)]
        value: Option<PathBuf>,
    },
    /// Validate a form value against the model.
    Validate { value: PathBuf },
    /// Report duplicate keys and unresolved references.
    Check,
    /// Print the JSON Schema of the model file format.
    Schema,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let Cli {
        model,
        registry,
        command,
    } = Cli::parse();
    let load = move || AppContext::load(model, registry);

    match command {
        Command::Schema => CommandHandler::handle_schema(),
        Command::Init {
            name,
            key,
            description,
        } => CommandHandler::handle_init(&mut load()?, name, key, description),
        Command::Add {
            field_type,
            label,
            parent,
        } => CommandHandler::handle_add(&mut load()?, parent, None, field_type, &label),
        Command::Insert {
            index,
            field_type,
            label,
            parent,
        } => CommandHandler::handle_add(&mut load()?, parent, Some(index), field_type, &label),
        Command::Remove { id, parent } => CommandHandler::handle_remove(&mut load()?, parent, &id),
        Command::Update {
            id,
            parent,
            key,
            label,
            required,
            unique,
            helper_text,
            field_type,
            options,
        } => {
            let mut ctx = load()?;
            let patch = CommandHandler::build_patch(
                &ctx,
                &id,
                commands::PatchArgs {
                    key,
                    label,
                    required,
                    unique,
                    helper_text,
                    field_type,
                    options,
                },
            )?;
            CommandHandler::handle_update(&mut ctx, parent, &id, &patch)
        }
        Command::Move {
            active,
            over,
            parent,
        } => CommandHandler::handle_move(&mut load()?, parent, &active, &over),
        Command::Meta { field, value } => {
            let mut ctx = load()?;
            ctx.session.update_meta(field, &value);
            ctx.save()
        }
        Command::Whitelist {
            id,
            parent,
            allow,
            deny,
            clear,
        } => CommandHandler::handle_whitelist(&mut load()?, parent, &id, &allow, &deny, clear),
        Command::Components { search } => CommandHandler::handle_components(&load()?, search.as_deref()),
        Command::Render { value } => CommandHandler::handle_render(&load()?, value),
        Command::Validate { value } => CommandHandler::handle_validate(&load()?, &value),
        Command::Check => CommandHandler::handle_check(&load()?),
    }
}
