use std::{fmt, str::FromStr};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::data::schema::SchemaError;

/// Opaque field identifier, stable across reorders and never reused.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct FieldId(String);

impl FieldId {
    /// Generate a fresh identifier.
    pub fn generate() -> Self {
        FieldId(format!("field_{}", uuid::Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FieldId {
    fn from(s: &str) -> Self {
        FieldId(s.to_string())
    }
}

impl From<String> for FieldId {
    fn from(s: String) -> Self {
        FieldId(s)
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Closed enumeration of field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Textarea,
    Number,
    Boolean,
    Datetime,
    Date,
    Media,
    Relation,
    Repeater,
    Component,
    DynamicZone,
}

impl FieldType {
    pub const ALL: [FieldType; 11] = [
        FieldType::Text,
        FieldType::Textarea,
        FieldType::Number,
        FieldType::Boolean,
        FieldType::Datetime,
        FieldType::Date,
        FieldType::Media,
        FieldType::Relation,
        FieldType::Repeater,
        FieldType::Component,
        FieldType::DynamicZone,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Textarea => "textarea",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Datetime => "datetime",
            FieldType::Date => "date",
            FieldType::Media => "media",
            FieldType::Relation => "relation",
            FieldType::Repeater => "repeater",
            FieldType::Component => "component",
            FieldType::DynamicZone => "dynamic_zone",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| SchemaError::UnknownFieldType(s.to_string()))
    }
}

/// Media categories a media field accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Images,
    Videos,
    Audios,
    Files,
}

/// Options of a `media` field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MediaOptions {
    /// Allow selecting more than one file.
    #[serde(default)]
    pub multiple: bool,
    #[serde(default)]
    pub allowed_types: Vec<MediaKind>,
}

/// Cardinality of a relation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum RelationType {
    #[default]
    OneToOne,
    OneToMany,
    ManyToOne,
    ManyToMany,
}

/// Options of a `relation` field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RelationOptions {
    /// Key of the referenced model; `None` until configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_model_key: Option<String>,
    #[serde(default)]
    pub relation_type: RelationType,
}

/// Options of a `text` field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TextOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
}

impl TextOptions {
    fn is_empty(&self) -> bool {
        self.regex.is_none()
    }
}

/// Row count limits of a `repeater` field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RepeaterOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<usize>,
}

impl RepeaterOptions {
    fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

/// Component whitelist of a `dynamic_zone` field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DynamicZoneOptions {
    #[serde(default)]
    pub allowed_components: Vec<String>,
}

/// Type tag and type-specific payload of a field.
///
/// Serialized inline into [`FieldSchema`] as `"type"`, `"options"` and
/// `"subFields"`. Unknown type names decode to [`FieldKind::Unsupported`],
/// which keeps the raw payload so it is written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    Text {
        #[serde(default, skip_serializing_if = "TextOptions::is_empty")]
        options: TextOptions,
    },
    Textarea,
    Number,
    Boolean,
    Datetime,
    Date,
    Media {
        #[serde(default)]
        options: MediaOptions,
    },
    Relation {
        #[serde(default)]
        options: RelationOptions,
    },
    Repeater {
        #[serde(default, rename = "subFields")]
        sub_fields: Vec<FieldSchema>,
        #[serde(default, skip_serializing_if = "RepeaterOptions::is_empty")]
        options: RepeaterOptions,
    },
    Component,
    DynamicZone {
        #[serde(default)]
        options: DynamicZoneOptions,
    },
    /// A type this crate does not know. Rendered as a placeholder.
    #[serde(skip)]
    Unsupported {
        type_name: String,
        /// Every other attribute the field carried, `options` included.
        rest: Map<String, Value>,
    },
}

impl FieldKind {
    /// Default payload for a freshly created field of `field_type`.
    pub fn new(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Text => FieldKind::Text {
                options: TextOptions::default(),
            },
            FieldType::Textarea => FieldKind::Textarea,
            FieldType::Number => FieldKind::Number,
            FieldType::Boolean => FieldKind::Boolean,
            FieldType::Datetime => FieldKind::Datetime,
            FieldType::Date => FieldKind::Date,
            FieldType::Media => FieldKind::Media {
                options: MediaOptions::default(),
            },
            FieldType::Relation => FieldKind::Relation {
                options: RelationOptions::default(),
            },
            FieldType::Repeater => FieldKind::Repeater {
                sub_fields: Vec::new(),
                options: RepeaterOptions::default(),
            },
            FieldType::Component => FieldKind::Component,
            FieldType::DynamicZone => FieldKind::DynamicZone {
                options: DynamicZoneOptions::default(),
            },
        }
    }

    /// Build a payload from a type and a JSON `options` object.
    pub fn with_options(field_type: FieldType, options: Value) -> Result<Self, SchemaError> {
        let kind = serde_json::from_value(json!({
            "type": field_type.as_str(),
            "options": options,
        }))?;
        Ok(kind)
    }

    /// `None` for kinds decoded from an unknown type name.
    pub fn field_type(&self) -> Option<FieldType> {
        let t = match self {
            FieldKind::Text { .. } => FieldType::Text,
            FieldKind::Textarea => FieldType::Textarea,
            FieldKind::Number => FieldType::Number,
            FieldKind::Boolean => FieldType::Boolean,
            FieldKind::Datetime => FieldType::Datetime,
            FieldKind::Date => FieldType::Date,
            FieldKind::Media { .. } => FieldType::Media,
            FieldKind::Relation { .. } => FieldType::Relation,
            FieldKind::Repeater { .. } => FieldType::Repeater,
            FieldKind::Component => FieldType::Component,
            FieldKind::DynamicZone { .. } => FieldType::DynamicZone,
            FieldKind::Unsupported { .. } => return None,
        };
        Some(t)
    }
}

/// Wire form of [`FieldKind`] that round-trips unknown types.
mod kind_repr {
    use serde::{
        Deserialize, Deserializer, Serialize, Serializer,
        de::Error as _,
        ser::SerializeMap,
    };
    use serde_json::{Map, Value};

    use super::{FieldKind, FieldType};

    pub fn serialize<S: Serializer>(kind: &FieldKind, s: S) -> Result<S::Ok, S::Error> {
        match kind {
            FieldKind::Unsupported { type_name, rest } => {
                let mut map = s.serialize_map(Some(rest.len() + 1))?;
                map.serialize_entry("type", type_name)?;
                for (k, v) in rest {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            known => known.serialize(s),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<FieldKind, D::Error> {
        let mut map = Map::<String, Value>::deserialize(d)?;
        let type_name = match map.get("type") {
            Some(Value::String(t)) => t.clone(),
            _ => return Err(D::Error::missing_field("type")),
        };
        if type_name.parse::<FieldType>().is_ok() {
            return FieldKind::deserialize(Value::Object(map)).map_err(D::Error::custom);
        }
        map.remove("type");
        Ok(FieldKind::Unsupported { type_name, rest: map })
    }
}

/// One node of a content-model definition tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldSchema {
    pub id: FieldId,
    /// Data binding name, unique among siblings.
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub unique: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub helper_text: Option<String>,
    #[serde(flatten, with = "kind_repr")]
    #[schemars(with = "FieldKind")]
    pub kind: FieldKind,
}

impl FieldSchema {
    /// Create a field with a freshly generated id.
    pub fn new(field_type: FieldType, key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::with_id(FieldId::generate(), key, label, FieldKind::new(field_type))
    }

    pub fn with_id(
        id: impl Into<FieldId>,
        key: impl Into<String>,
        label: impl Into<String>,
        kind: FieldKind,
    ) -> Self {
        FieldSchema {
            id: id.into(),
            key: key.into(),
            label: label.into(),
            required: false,
            unique: false,
            helper_text: None,
            kind,
        }
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn field_type(&self) -> Option<FieldType> {
        self.kind.field_type()
    }

    /// Sub-fields of a repeater; empty for every other type.
    pub fn sub_fields(&self) -> &[FieldSchema] {
        match &self.kind {
            FieldKind::Repeater { sub_fields, .. } => sub_fields,
            _ => &[],
        }
    }

    /// Whitelist of a dynamic zone; empty for every other type.
    pub fn allowed_components(&self) -> &[String] {
        match &self.kind {
            FieldKind::DynamicZone { options } => &options.allowed_components,
            _ => &[],
        }
    }
}
