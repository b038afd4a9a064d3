//! # cmsform
//!
//! Schema engine for a headless CMS content-type builder.
//!
//! A content model is an ordered list of typed field schemas. cmsform edits
//! those lists, turns a model into a tree of form controls with validation
//! rules, and checks form values against it.
//!
//! ## Features
//!
//! - Pure list mutations: add, insert, remove, update and reorder fields
//! - Nested repeaters and dynamic zones backed by a component registry
//! - Drag and drop reconciliation with an activation distance
//! - Render tree carrying full name paths for every control
//! - TOML and JSON model files with automatic backup before saving
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cmsform::data::{BuilderSession, FieldType, ModelMeta};
//!
//! let mut session = BuilderSession::open(Some("article.json"), ModelMeta::default()).unwrap();
//! session.add_field(FieldType::Text, "Title");
//! session.save().unwrap();
//! ```
//!
//! ## Modules
//!
//! - [`data`] - Field, model, value and registry data structures
//! - [`engine`] - Field list mutations
//! - [`dnd`] - Drag and drop state
//! - [`render`] - Render tree and validation
//! - [`zone`] - Dynamic zone component lookup
//! - [`lint`] - Whole-model structural checks

#[macro_use]
extern crate log;

/// Field, model, value and registry data structures.
pub mod data;

/// Drag and drop gesture state and drop reconciliation.
pub mod dnd;

/// Pure mutations over field lists.
pub mod engine;

pub mod lint;

/// Render tree generation and form validation.
pub mod render;

/// Dynamic zone component lookup and whitelist editing.
pub mod zone;

pub use engine::FieldPatch;
pub use render::{RenderContext, RenderNode, render_field, render_model};
pub use serde_json::Value;
