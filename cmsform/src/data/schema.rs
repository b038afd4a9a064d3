use std::{fs, path::Path};

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

/// Errors raised while loading schemas or editing form values.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// A value did not have the shape the schema or path expects.
    #[error("type mismatch at `{path}`: expected {expected}, got {actual}")]
    TypeMismatch {
        path: String,
        expected: String,
        actual: String,
    },
    /// An array index more than one past the end of the array.
    #[error("index {index} out of range at `{path}` (len {len})")]
    IndexOutOfRange {
        path: String,
        index: usize,
        len: usize,
    },
    /// A field type name outside the supported enumeration.
    #[error("unknown field type `{0}`")]
    UnknownFieldType(String),
    /// A model metadata attribute other than name/key/description.
    #[error("unknown model attribute `{0}`")]
    UnknownMetaField(String),
    /// Two siblings share the same binding key.
    #[error("duplicate key `{key}` at `{path}`")]
    DuplicateKey { path: String, key: String },
    /// A dynamic zone whitelists a component missing from the registry.
    #[error("dynamic zone `{path}` allows unregistered component `{component}`")]
    UnresolvedComponent { path: String, component: String },
    /// A relation points at a model missing from the model index.
    #[error("relation `{path}` targets unknown model `{target}`")]
    UnresolvedRelation { path: String, target: String },
    /// File extension is neither JSON nor TOML.
    #[error("unsupported file extension: {0:?}")]
    UnsupportedFormat(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),
    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),
}

impl SchemaError {
    pub(crate) fn type_mismatch(path: impl ToString, expected: &str, actual: &Value) -> Self {
        SchemaError::TypeMismatch {
            path: path.to_string(),
            expected: expected.to_string(),
            actual: describe(actual).to_string(),
        }
    }
}

/// Short JSON type name used in error messages.
pub fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// On-disk format of model and registry files, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Toml,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> Result<Self, SchemaError> {
        let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");
        match ext {
            "json" => Ok(FileFormat::Json),
            "toml" | "tml" => Ok(FileFormat::Toml),
            other => Err(SchemaError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn parse<T: DeserializeOwned>(self, content: &str) -> Result<T, SchemaError> {
        let value = match self {
            FileFormat::Json => serde_json::from_str(content)?,
            FileFormat::Toml => toml::from_str(content)?,
        };
        Ok(value)
    }

    pub fn render<T: Serialize>(self, value: &T) -> Result<String, SchemaError> {
        let s = match self {
            FileFormat::Json => serde_json::to_string_pretty(value)?,
            FileFormat::Toml => toml::to_string_pretty(value)?,
        };
        Ok(s)
    }
}

/// Read and decode a JSON or TOML file.
pub fn load_file<T: DeserializeOwned>(path: &Path) -> Result<T, SchemaError> {
    let format = FileFormat::from_path(path)?;
    let content = fs::read_to_string(path)?;
    format.parse(&content)
}
