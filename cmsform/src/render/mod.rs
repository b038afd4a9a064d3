//! Recursive form renderer.
//!
//! Turns a schema tree plus the current [`FormValue`] into a tree of
//! [`RenderNode`]s that a form host can display. Every node carries the full
//! [`NamePath`] its value binds to: a child's path is its parent's path, then
//! the row index for list entries, then the child's key.

use serde::Serialize;

use crate::{
    data::{
        field::{FieldKind, FieldSchema},
        model::{Model, ModelIndex},
        path::NamePath,
        registry::ComponentRegistry,
        value::{COMPONENT_KEY, FormValue},
    },
    zone::AllowedComponent,
};

/// Widget mapping for leaf fields.
pub mod control;

/// Validation rules and their evaluation.
pub mod rules;

/// Form value validation against a render tree.
pub mod validate;

use control::{Control, ValueProp, control_for};
use rules::{Rule, rules_for};

pub const UNSUPPORTED_PLACEHOLDER: &str = "Unsupported field type";
pub const COMPONENT_REQUIRED: &str = "component type is required";
pub const COMPONENT_NOT_ALLOWED: &str = "component type is not allowed here";

/// Read-only collaborators of a render pass.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub registry: &'a ComponentRegistry,
    pub models: &'a ModelIndex,
    pub value: &'a FormValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum RenderNode {
    Control(ControlNode),
    List(ListNode),
    Placeholder(PlaceholderNode),
}

/// A single editable control.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlNode {
    pub path: NamePath,
    pub label: String,
    pub control: Control,
    pub value_prop: ValueProp,
    pub rules: Vec<Rule>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    Repeater,
    DynamicZone,
}

/// Expandable list bound to an array value (repeater or dynamic zone).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListNode {
    pub path: NamePath,
    pub label: String,
    pub kind: ListKind,
    pub rules: Vec<Rule>,
    pub rows: Vec<RowNode>,
    /// Caption of the add-row affordance.
    pub add_label: String,
}

/// One entry of a [`ListNode`]; every row can be removed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowNode {
    pub index: usize,
    pub path: NamePath,
    pub title: String,
    /// Component selector, for dynamic-zone slots only.
    pub selector: Option<ComponentSelector>,
    pub children: Vec<RenderNode>,
}

/// The `__component` picker of a dynamic-zone slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentSelector {
    pub path: NamePath,
    pub options: Vec<AllowedComponent>,
    pub selected: Option<String>,
    /// `false` when nothing is selected, or the selection is outside the
    /// whitelist or unregistered.
    pub resolved: bool,
    pub rules: Vec<Rule>,
}

/// Disabled stand-in for a field type the renderer does not support.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceholderNode {
    pub path: NamePath,
    pub label: String,
    pub message: String,
}

impl RenderNode {
    pub fn path(&self) -> &NamePath {
        match self {
            RenderNode::Control(n) => &n.path,
            RenderNode::List(n) => &n.path,
            RenderNode::Placeholder(n) => &n.path,
        }
    }

    /// All control nodes in this subtree, depth first.
    pub fn controls(&self) -> Vec<&ControlNode> {
        let mut out = Vec::new();
        self.collect_controls(&mut out);
        out
    }

    fn collect_controls<'a>(&'a self, out: &mut Vec<&'a ControlNode>) {
        match self {
            RenderNode::Control(n) => out.push(n),
            RenderNode::List(list) => {
                for row in &list.rows {
                    for child in &row.children {
                        child.collect_controls(out);
                    }
                }
            }
            RenderNode::Placeholder(_) => {}
        }
    }

    /// Node bound exactly at `path` in this subtree.
    pub fn find(&self, path: &NamePath) -> Option<&RenderNode> {
        if self.path() == path {
            return Some(self);
        }
        let RenderNode::List(list) = self else {
            return None;
        };
        list.rows
            .iter()
            .flat_map(|row| row.children.iter())
            .find_map(|child| child.find(path))
    }
}

/// Render `field`, whose value lives at `name_path`.
pub fn render_field(field: &FieldSchema, name_path: &NamePath, ctx: &RenderContext<'_>) -> RenderNode {
    match &field.kind {
        FieldKind::Repeater { sub_fields, .. } => {
            let rows = (0..ctx.value.rows(name_path).len())
                .map(|index| {
                    let row_path = name_path.index(index);
                    RowNode {
                        index,
                        title: format!("{} #{}", field.label, index + 1),
                        selector: None,
                        children: render_children(sub_fields, &row_path, ctx),
                        path: row_path,
                    }
                })
                .collect();
            RenderNode::List(ListNode {
                path: name_path.clone(),
                label: field.label.clone(),
                kind: ListKind::Repeater,
                rules: rules_for(field),
                rows,
                add_label: format!("Add {}", field.label),
            })
        }
        FieldKind::DynamicZone { options } => {
            let allowed = ctx.registry.list_allowed(&options.allowed_components);
            let rows = (0..ctx.value.rows(name_path).len())
                .map(|index| render_slot(field, name_path, index, &allowed, ctx))
                .collect();
            RenderNode::List(ListNode {
                path: name_path.clone(),
                label: field.label.clone(),
                kind: ListKind::DynamicZone,
                rules: rules_for(field),
                rows,
                add_label: format!("Add {} component", field.label),
            })
        }
        _ => match control_for(field, ctx.models) {
            Some(control) => RenderNode::Control(ControlNode {
                path: name_path.clone(),
                label: field.label.clone(),
                value_prop: control.value_prop(),
                control,
                rules: rules_for(field),
            }),
            None => RenderNode::Placeholder(PlaceholderNode {
                path: name_path.clone(),
                label: field.label.clone(),
                message: UNSUPPORTED_PLACEHOLDER.to_string(),
            }),
        },
    }
}

fn render_children(fields: &[FieldSchema], prefix: &NamePath, ctx: &RenderContext<'_>) -> Vec<RenderNode> {
    fields
        .iter()
        .map(|f| render_field(f, &prefix.key(&f.key), ctx))
        .collect()
}

fn render_slot(
    field: &FieldSchema,
    name_path: &NamePath,
    index: usize,
    allowed: &[AllowedComponent],
    ctx: &RenderContext<'_>,
) -> RowNode {
    let slot_path = name_path.index(index);
    let selected = ctx.value.component_at(&slot_path).map(str::to_string);
    let whitelist = field.allowed_components();
    let component = match selected.as_deref() {
        Some(key) if !whitelist.iter().any(|k| k == key) => {
            warn!("slot {slot_path}: component `{key}` is not allowed");
            None
        }
        Some(key) => {
            let found = ctx.registry.get(key);
            if found.is_none() {
                warn!("slot {slot_path}: component `{key}` is not registered");
            }
            found
        }
        None => None,
    };
    let children = component
        .map(|c| render_children(&c.fields, &slot_path, ctx))
        .unwrap_or_default();
    let title = match component {
        Some(c) => format!("{} #{}: {}", field.label, index + 1, c.display_name),
        None => format!("{} #{}", field.label, index + 1),
    };
    RowNode {
        index,
        title,
        selector: Some(ComponentSelector {
            path: slot_path.key(COMPONENT_KEY),
            options: allowed.to_vec(),
            resolved: component.is_some(),
            selected,
            rules: vec![
                Rule::Required {
                    message: COMPONENT_REQUIRED.to_string(),
                },
                Rule::OneOf {
                    allowed: whitelist.to_vec(),
                    message: COMPONENT_NOT_ALLOWED.to_string(),
                },
            ],
        }),
        children,
        path: slot_path,
    }
}

/// Render every top-level field of `model`.
pub fn render_model(model: &Model, ctx: &RenderContext<'_>) -> Vec<RenderNode> {
    render_children(&model.fields, &NamePath::root(), ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data::field::{DynamicZoneOptions, FieldType, RelationOptions},
        path,
    };
    use serde_json::json;

    fn repeater(key: &str, subs: Vec<FieldSchema>) -> FieldSchema {
        FieldSchema::with_id(
            key,
            key,
            key.to_uppercase(),
            FieldKind::Repeater {
                sub_fields: subs,
                options: Default::default(),
            },
        )
    }

    fn zone(key: &str, allowed: &[&str]) -> FieldSchema {
        FieldSchema::with_id(
            key,
            key,
            "Blocks",
            FieldKind::DynamicZone {
                options: DynamicZoneOptions {
                    allowed_components: allowed.iter().map(|s| s.to_string()).collect(),
                },
            },
        )
    }

    fn render_with(model: &Model, value: serde_json::Value) -> Vec<RenderNode> {
        let registry = ComponentRegistry::default();
        let models = ModelIndex::default();
        let value = FormValue::from_json(value).unwrap();
        let ctx = RenderContext {
            registry: &registry,
            models: &models,
            value: &value,
        };
        render_model(model, &ctx)
    }

    #[test]
    fn repeater_row_paths_include_index() {
        let model = Model {
            fields: vec![
                FieldSchema::new(FieldType::Text, "a", "A"),
                repeater("b", vec![FieldSchema::new(FieldType::Number, "c", "C")]),
            ],
            ..Default::default()
        };
        let nodes = render_with(&model, json!({ "b": [{}, {}, {"c": 3}] }));
        assert_eq!(nodes[0].path(), &path!["a"]);
        let RenderNode::List(list) = &nodes[1] else {
            panic!("expected list");
        };
        assert_eq!(list.kind, ListKind::Repeater);
        assert_eq!(list.rows.len(), 3);
        assert_eq!(list.rows[2].title, "B #3");
        assert_eq!(list.rows[2].children[0].path(), &path!["b", 2usize, "c"]);
        assert!(nodes[1].find(&path!["b", 2usize, "c"]).is_some());
    }

    #[test]
    fn nested_repeaters_compose_paths() {
        let model = Model {
            fields: vec![repeater(
                "groups",
                vec![repeater("items", vec![FieldSchema::new(FieldType::Boolean, "on", "On")])],
            )],
            ..Default::default()
        };
        let nodes = render_with(&model, json!({ "groups": [{ "items": [{}, {}] }] }));
        let controls = nodes[0].controls();
        let paths: Vec<_> = controls.iter().map(|c| c.path.to_string()).collect();
        assert_eq!(paths, ["groups.0.items.0.on", "groups.0.items.1.on"]);
        assert_eq!(controls[0].value_prop, ValueProp::Checked);
    }

    #[test]
    fn dynamic_zone_slots_resolve_components() {
        let model = Model {
            fields: vec![zone("blocks", &["hero_banner", "ghost_key"])],
            ..Default::default()
        };
        let nodes = render_with(
            &model,
            json!({ "blocks": [
                { "__component": "hero_banner", "heading": "Hi" },
                { "__component": "ghost_key" },
                {}
            ] }),
        );
        let RenderNode::List(list) = &nodes[0] else {
            panic!("expected list");
        };
        assert_eq!(list.kind, ListKind::DynamicZone);

        let hero = &list.rows[0];
        let selector = hero.selector.as_ref().unwrap();
        assert_eq!(selector.path, path!["blocks", 0usize, "__component"]);
        assert_eq!(selector.options[1].display_name, "ghost_key");
        assert!(selector.resolved);
        assert_eq!(hero.children.len(), 4);
        assert_eq!(hero.children[0].path(), &path!["blocks", 0usize, "heading"]);

        let ghost = &list.rows[1];
        assert!(!ghost.selector.as_ref().unwrap().resolved);
        assert!(ghost.children.is_empty());

        let empty = &list.rows[2];
        assert_eq!(empty.selector.as_ref().unwrap().selected, None);
        assert!(empty.children.is_empty());
    }

    #[test]
    fn slots_outside_whitelist_stay_unresolved() {
        let model = Model {
            fields: vec![zone("blocks", &["image_gallery"])],
            ..Default::default()
        };
        let nodes = render_with(
            &model,
            json!({ "blocks": [
                { "__component": "hero_banner", "heading": "Hi" },
                { "__component": "image_gallery" }
            ] }),
        );
        let RenderNode::List(list) = &nodes[0] else {
            panic!("expected list");
        };
        let hero = &list.rows[0];
        let selector = hero.selector.as_ref().unwrap();
        assert_eq!(selector.selected.as_deref(), Some("hero_banner"));
        assert!(!selector.resolved);
        assert!(hero.children.is_empty());
        assert_eq!(hero.title, "Blocks #1");
        assert!(list.rows[1].selector.as_ref().unwrap().resolved);

        let empty = render_with(
            &Model {
                fields: vec![zone("blocks", &[])],
                ..Default::default()
            },
            json!({ "blocks": [{ "__component": "hero_banner" }] }),
        );
        let RenderNode::List(list) = &empty[0] else {
            panic!("expected list");
        };
        assert!(!list.rows[0].selector.as_ref().unwrap().resolved);
    }

    #[test]
    fn zone_inside_repeater() {
        let model = Model {
            fields: vec![repeater("sections", vec![zone("body", &["text"])])],
            ..Default::default()
        };
        let nodes = render_with(
            &model,
            json!({ "sections": [{ "body": [{ "__component": "text" }] }] }),
        );
        assert!(nodes[0]
            .find(&path!["sections", 0usize, "body", 0usize, "title"])
            .is_some());
    }

    #[test]
    fn unsupported_types_become_placeholders() {
        let model: Model = serde_json::from_value(json!({
            "fields": [
                { "id": "1", "key": "embed", "label": "Embed", "type": "component" },
                { "id": "2", "key": "geo", "label": "Geo", "type": "geo_point" }
            ]
        }))
        .unwrap();
        let nodes = render_with(&model, json!({}));
        for node in &nodes {
            let RenderNode::Placeholder(p) = node else {
                panic!("expected placeholder, got {node:?}");
            };
            assert_eq!(p.message, UNSUPPORTED_PLACEHOLDER);
        }
    }

    #[test]
    fn relation_target_resolution() {
        let field = |target: Option<&str>| {
            FieldSchema::with_id(
                "r",
                "author",
                "Author",
                FieldKind::Relation {
                    options: RelationOptions {
                        target_model_key: target.map(str::to_string),
                        ..Default::default()
                    },
                },
            )
        };
        for (target, expected) in [
            (Some("api::author.author"), true),
            (Some("api::nope.nope"), false),
            (None, false),
        ] {
            let model = Model {
                fields: vec![field(target)],
                ..Default::default()
            };
            let nodes = render_with(&model, json!({}));
            let RenderNode::Control(c) = &nodes[0] else {
                panic!("expected control");
            };
            let Control::RelationPicker { resolved, .. } = &c.control else {
                panic!("expected relation picker");
            };
            assert_eq!(*resolved, expected);
        }
    }
}
