use serde::Serialize;

use crate::data::{
    field::{FieldKind, FieldSchema, MediaKind},
    model::ModelIndex,
};

/// Editable widget a form host should show for a leaf field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "control", rename_all = "snake_case")]
pub enum Control {
    Input { placeholder: String },
    TextArea { rows: u8 },
    NumberInput,
    Switch,
    DatePicker { show_time: bool },
    MediaPicker {
        multiple: bool,
        allowed_types: Vec<MediaKind>,
    },
    /// Single-selection relation picker. `resolved` is false when the
    /// target is unset or unknown to the model index.
    RelationPicker {
        target_model: Option<String>,
        resolved: bool,
    },
}

/// Property of the control the form host binds the value to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueProp {
    Value,
    Checked,
}

/// Control for a leaf field; `None` for lists and unsupported types.
pub fn control_for(field: &FieldSchema, models: &ModelIndex) -> Option<Control> {
    let control = match &field.kind {
        FieldKind::Text { .. } => Control::Input {
            placeholder: format!("Enter {}", field.label),
        },
        FieldKind::Textarea => Control::TextArea { rows: 4 },
        FieldKind::Number => Control::NumberInput,
        FieldKind::Boolean => Control::Switch,
        FieldKind::Datetime => Control::DatePicker { show_time: true },
        FieldKind::Date => Control::DatePicker { show_time: false },
        FieldKind::Media { options } => Control::MediaPicker {
            multiple: options.multiple,
            allowed_types: options.allowed_types.clone(),
        },
        FieldKind::Relation { options } => {
            let target = options.target_model_key.clone();
            let resolved = target.as_deref().is_some_and(|t| models.contains(t));
            if !resolved {
                warn!(
                    "relation `{}` has unresolved target {:?}",
                    field.key, options.target_model_key
                );
            }
            Control::RelationPicker {
                target_model: target,
                resolved,
            }
        }
        FieldKind::Repeater { .. }
        | FieldKind::DynamicZone { .. }
        | FieldKind::Component
        | FieldKind::Unsupported { .. } => return None,
    };
    Some(control)
}

impl Control {
    pub fn value_prop(&self) -> ValueProp {
        match self {
            Control::Switch => ValueProp::Checked,
            _ => ValueProp::Value,
        }
    }
}
