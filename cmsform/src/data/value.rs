use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::data::{
    path::{NamePath, PathSegment},
    schema::SchemaError,
};

/// Discriminator key of a dynamic-zone slot record.
pub const COMPONENT_KEY: &str = "__component";

/// Nested form state mirroring the shape of a model's schema.
///
/// The root is always a JSON object. Repeaters hold arrays of records and
/// dynamic zones hold arrays of `{"__component": key, ...}` records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormValue(Value);

impl Default for FormValue {
    fn default() -> Self {
        FormValue(Value::Object(Map::new()))
    }
}

impl FormValue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a submitted payload; the payload must be an object.
    pub fn from_json(value: Value) -> Result<Self, SchemaError> {
        match value {
            Value::Object(_) => Ok(FormValue(value)),
            other => Err(SchemaError::type_mismatch("", "object", &other)),
        }
    }

    pub fn as_json(&self) -> &Value {
        &self.0
    }

    pub fn into_json(self) -> Value {
        self.0
    }

    pub fn get(&self, path: &NamePath) -> Option<&Value> {
        let mut cur = &self.0;
        for seg in path.segments() {
            cur = match seg {
                PathSegment::Key(k) => cur.get(k.as_str())?,
                PathSegment::Index(i) => cur.get(*i)?,
            };
        }
        Some(cur)
    }

    fn get_mut(&mut self, path: &NamePath) -> Option<&mut Value> {
        let mut cur = &mut self.0;
        for seg in path.segments() {
            cur = match seg {
                PathSegment::Key(k) => cur.get_mut(k.as_str())?,
                PathSegment::Index(i) => cur.get_mut(*i)?,
            };
        }
        Some(cur)
    }

    /// Write `value` at `path`, creating missing objects and arrays on the way.
    ///
    /// An index may address an existing element or the one just past the end,
    /// which appends. Anything further out is [`SchemaError::IndexOutOfRange`].
    pub fn set(&mut self, path: &NamePath, value: Value) -> Result<(), SchemaError> {
        let mut walked = NamePath::root();
        let mut cur = &mut self.0;
        for seg in path.segments() {
            match seg {
                PathSegment::Key(k) => {
                    if cur.is_null() {
                        *cur = Value::Object(Map::new());
                    }
                    cur = match cur {
                        Value::Object(map) => map.entry(k.clone()).or_insert(Value::Null),
                        other => return Err(SchemaError::type_mismatch(&walked, "object", other)),
                    };
                    walked = walked.key(k);
                }
                PathSegment::Index(i) => {
                    if cur.is_null() {
                        *cur = Value::Array(Vec::new());
                    }
                    cur = match cur {
                        Value::Array(arr) => {
                            if *i > arr.len() {
                                return Err(SchemaError::IndexOutOfRange {
                                    path: walked.to_string(),
                                    index: *i,
                                    len: arr.len(),
                                });
                            }
                            if *i == arr.len() {
                                arr.push(Value::Null);
                            }
                            &mut arr[*i]
                        }
                        other => return Err(SchemaError::type_mismatch(&walked, "array", other)),
                    };
                    walked = walked.index(*i);
                }
            }
        }
        *cur = value;
        Ok(())
    }

    /// Rows of the repeater or dynamic zone at `path`; empty when unset.
    pub fn rows(&self, path: &NamePath) -> &[Value] {
        match self.get(path) {
            Some(Value::Array(arr)) => arr,
            _ => &[],
        }
    }

    /// Append a row and return its index.
    pub fn push_row(&mut self, path: &NamePath, row: Value) -> Result<usize, SchemaError> {
        let index = match self.get(path) {
            None | Some(Value::Null) => 0,
            Some(Value::Array(arr)) => arr.len(),
            Some(other) => return Err(SchemaError::type_mismatch(path, "array", other)),
        };
        self.set(&path.index(index), row)?;
        Ok(index)
    }

    /// Remove row `index`; later rows shift down with their values intact.
    ///
    /// Returns `false` when there is no such row.
    pub fn remove_row(&mut self, path: &NamePath, index: usize) -> bool {
        match self.get_mut(path) {
            Some(Value::Array(arr)) if index < arr.len() => {
                arr.remove(index);
                true
            }
            _ => false,
        }
    }

    /// Component key chosen for the dynamic-zone slot at `slot`.
    pub fn component_at(&self, slot: &NamePath) -> Option<&str> {
        self.get(slot)?.get(COMPONENT_KEY)?.as_str()
    }

    /// Choose the component of a dynamic-zone slot.
    ///
    /// Switching to a different component discards the slot's previous
    /// field values; re-selecting the current one keeps them. Returns
    /// whether the slot changed.
    pub fn select_component(&mut self, slot: &NamePath, key: &str) -> Result<bool, SchemaError> {
        if self.component_at(slot) == Some(key) {
            return Ok(false);
        }
        if let Some(prev) = self.component_at(slot) {
            debug!("slot {slot}: component {prev} -> {key}, clearing values");
        }
        self.set(slot, json!({ COMPONENT_KEY: key }))?;
        Ok(true)
    }
}
