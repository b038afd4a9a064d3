//! Content-model data structures.
//!
//! This module holds everything a model file is made of, plus the state kept
//! while a model is being edited:
//!
//! - [`field`] - field schemas and their per-type options
//! - [`model`] - model metadata and the index of known models
//! - [`value`] - the form value tree filled in against a model
//!
//! ## Architecture
//!
//! - [`app_data`] - Builder session wrapping one model file
//! - [`path`] - Name paths addressing values inside a form
//! - [`registry`] - Reusable component definitions
//! - [`schema`] - Error type and file format handling
//! - [`toolbox`] - Palette of field types offered to the builder

/// Builder session and model file persistence.
pub mod app_data;

/// Field schema definitions.
pub mod field;

/// Model metadata and model index.
pub mod model;

/// Name paths into form values.
pub mod path;

/// Component registry.
pub mod registry;

/// Errors and file formats.
pub mod schema;

pub mod toolbox;

/// Form value tree.
pub mod value;

pub use app_data::{BuilderSession, ConfigSection, config_sections};
pub use field::{FieldId, FieldKind, FieldSchema, FieldType};
pub use model::{Model, ModelIndex, ModelMeta};
pub use path::NamePath;
pub use registry::ComponentRegistry;
pub use schema::SchemaError;
pub use value::FormValue;
