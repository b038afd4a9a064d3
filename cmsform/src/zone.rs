//! Dynamic zone resolution: whitelist display, component field lookup and
//! whitelist editing.

use serde::Serialize;

use crate::data::{
    field::FieldSchema,
    registry::{ComponentDef, ComponentRegistry},
};

/// Selectable component of a dynamic-zone slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllowedComponent {
    pub key: String,
    pub display_name: String,
}

impl ComponentRegistry {
    /// Resolve display names for a whitelist, keeping its order. Unregistered
    /// keys fall back to the raw key.
    pub fn list_allowed(&self, whitelist: &[String]) -> Vec<AllowedComponent> {
        whitelist
            .iter()
            .map(|key| AllowedComponent {
                key: key.clone(),
                display_name: self
                    .get(key)
                    .map(|c| c.display_name.clone())
                    .unwrap_or_else(|| key.clone()),
            })
            .collect()
    }

    /// Fields of component `key`; empty when unregistered.
    pub fn resolve_fields(&self, key: &str) -> &[FieldSchema] {
        match self.get(key) {
            Some(c) => &c.fields,
            None => &[],
        }
    }

    /// Components whose display name or key contains `text`.
    pub fn search(&self, text: &str) -> Vec<&ComponentDef> {
        self.iter()
            .filter(|c| c.display_name.contains(text) || c.key.contains(text))
            .collect()
    }
}

/// Ordered set of component keys allowed in a dynamic zone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Whitelist(Vec<String>);

impl Whitelist {
    pub fn new(keys: Vec<String>) -> Self {
        Whitelist(keys)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.iter().any(|k| k == key)
    }

    /// Add (at the end) or remove `key`; other entries keep their order.
    pub fn toggle(&mut self, key: &str, checked: bool) {
        if checked {
            if !self.contains(key) {
                self.0.push(key.to_string());
            }
        } else {
            self.0.retain(|k| k != key);
        }
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl From<&[String]> for Whitelist {
    fn from(keys: &[String]) -> Self {
        Whitelist(keys.to_vec())
    }
}
