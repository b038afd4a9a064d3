use std::{fmt, path::Path, str::FromStr};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::data::{
    field::{FieldId, FieldSchema},
    schema::{SchemaError, load_file},
};

/// Name, key and description of a content model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ModelMeta {
    pub name: String,
    /// System key, e.g. `article`.
    pub key: String,
    #[serde(default)]
    pub description: String,
}

/// Attribute of [`ModelMeta`] addressed by a key/value patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaField {
    Name,
    Key,
    Description,
}

impl FromStr for MetaField {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(MetaField::Name),
            "key" => Ok(MetaField::Key),
            "description" => Ok(MetaField::Description),
            other => Err(SchemaError::UnknownMetaField(other.to_string())),
        }
    }
}

impl fmt::Display for MetaField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MetaField::Name => "name",
            MetaField::Key => "key",
            MetaField::Description => "description",
        })
    }
}

impl ModelMeta {
    /// Copy of this record with one attribute replaced.
    pub fn patched(&self, field: MetaField, value: impl Into<String>) -> ModelMeta {
        let mut next = self.clone();
        let value = value.into();
        match field {
            MetaField::Name => next.name = value,
            MetaField::Key => {
                warn!("model key changed from `{}` to `{value}`", self.key);
                next.key = value;
            }
            MetaField::Description => next.description = value,
        }
        next
    }
}

/// A named, ordered collection of top-level fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Model {
    #[serde(default)]
    pub meta: ModelMeta,
    #[serde(default)]
    pub fields: Vec<FieldSchema>,
}

impl Model {
    pub fn new(meta: ModelMeta) -> Self {
        Model {
            meta,
            fields: Vec::new(),
        }
    }

    /// Load a model from a `.json` or `.toml` file.
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        load_file(path)
    }

    /// Find a field by id at any depth.
    pub fn field(&self, id: &FieldId) -> Option<&FieldSchema> {
        crate::engine::find_field(&self.fields, id)
    }
}

/// Entry of the [`ModelIndex`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ModelRef {
    pub label: String,
    pub key: String,
}

/// Models a relation field may target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ModelIndex(Vec<ModelRef>);

impl ModelIndex {
    pub fn new(models: Vec<ModelRef>) -> Self {
        ModelIndex(models)
    }

    pub fn get(&self, key: &str) -> Option<&ModelRef> {
        self.0.iter().find(|m| m.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModelRef> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for ModelIndex {
    fn default() -> Self {
        let m = |label: &str, key: &str| ModelRef {
            label: label.to_string(),
            key: key.to_string(),
        };
        ModelIndex(vec![
            m("用户 (User)", "plugin::users-permissions.user"),
            m("作者 (Author)", "api::author.author"),
            m("分类 (Category)", "api::category.category"),
            m("标签 (Tag)", "api::tag.tag"),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn meta_patch_replaces_one_attribute() {
        let meta = ModelMeta {
            name: "文章".into(),
            key: "article".into(),
            description: "用于博客发布".into(),
        };
        let next = meta.patched("name".parse().unwrap(), "Post");
        assert_eq!(next.name, "Post");
        assert_eq!(next.key, "article");
        assert_eq!(meta.name, "文章");
        assert!("icon".parse::<MetaField>().is_err());
    }

    #[test]
    fn model_decodes_without_fields() {
        let model: Model = serde_json::from_value(json!({
            "meta": { "name": "Article", "key": "article" }
        }))
        .unwrap();
        assert!(model.fields.is_empty());
        assert_eq!(model.meta.description, "");
    }

    #[test]
    fn default_index_knows_author() {
        let index = ModelIndex::default();
        assert!(index.contains("api::author.author"));
        assert!(!index.contains("api::page.page"));
    }
}
