//! Structural checks over a whole model.

use std::collections::BTreeSet;

use crate::data::{
    field::{FieldKind, FieldSchema},
    model::{Model, ModelIndex},
    path::NamePath,
    registry::ComponentRegistry,
    schema::SchemaError,
};

/// Report duplicate sibling keys and unresolved references.
///
/// Findings are returned, not raised: an unresolved reference still renders,
/// just as a placeholder.
pub fn check_model(model: &Model, registry: &ComponentRegistry, models: &ModelIndex) -> Vec<SchemaError> {
    let mut errs = Vec::new();
    check_siblings(&model.fields, &NamePath::root(), registry, models, &mut errs);
    for component in registry.iter() {
        check_siblings(
            &component.fields,
            &NamePath::root().key(&component.key),
            registry,
            models,
            &mut errs,
        );
    }
    errs
}

fn check_siblings(
    fields: &[FieldSchema],
    prefix: &NamePath,
    registry: &ComponentRegistry,
    models: &ModelIndex,
    errs: &mut Vec<SchemaError>,
) {
    let mut seen = BTreeSet::new();
    for field in fields {
        let path = prefix.key(&field.key);
        if !seen.insert(field.key.as_str()) {
            errs.push(SchemaError::DuplicateKey {
                path: prefix.to_string(),
                key: field.key.clone(),
            });
        }
        match &field.kind {
            FieldKind::Repeater { sub_fields, .. } => {
                check_siblings(sub_fields, &path, registry, models, errs);
            }
            FieldKind::DynamicZone { options } => {
                for component in &options.allowed_components {
                    if registry.get(component).is_none() {
                        errs.push(SchemaError::UnresolvedComponent {
                            path: path.to_string(),
                            component: component.clone(),
                        });
                    }
                }
            }
            FieldKind::Relation { options } => {
                if let Some(target) = &options.target_model_key {
                    if !models.contains(target) {
                        errs.push(SchemaError::UnresolvedRelation {
                            path: path.to_string(),
                            target: target.clone(),
                        });
                    }
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reports_each_problem_once() {
        let model: Model = serde_json::from_value(json!({
            "meta": { "name": "Page", "key": "page" },
            "fields": [
                { "id": "1", "key": "title", "label": "Title", "type": "text" },
                { "id": "2", "key": "title", "label": "Title again", "type": "text" },
                { "id": "3", "key": "blocks", "label": "Blocks", "type": "dynamic_zone",
                  "options": { "allowedComponents": ["hero_banner", "ghost_key"] } },
                { "id": "4", "key": "rows", "label": "Rows", "type": "repeater", "subFields": [
                    { "id": "5", "key": "owner", "label": "Owner", "type": "relation",
                      "options": { "targetModelKey": "api::nope.nope" } },
                    { "id": "6", "key": "owner", "label": "Owner 2", "type": "number" }
                ] }
            ]
        }))
        .unwrap();

        let errs: Vec<_> = check_model(&model, &ComponentRegistry::default(), &ModelIndex::default())
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            errs,
            [
                "duplicate key `title` at ``",
                "dynamic zone `blocks` allows unregistered component `ghost_key`",
                "relation `rows.owner` targets unknown model `api::nope.nope`",
                "duplicate key `owner` at `rows`",
            ]
        );
    }

    #[test]
    fn builtin_registry_is_clean() {
        let errs = check_model(&Model::default(), &ComponentRegistry::default(), &ModelIndex::default());
        assert!(errs.is_empty(), "{errs:?}");
    }
}
