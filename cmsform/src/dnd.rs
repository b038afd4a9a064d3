//! Drag and drop reconciliation for the builder canvas.
//!
//! A gesture starts as [`DragState::Pending`] when the pointer goes down on a
//! palette tool or canvas entry and only becomes [`DragState::Dragging`] after
//! moving past the activation distance, so plain clicks on buttons inside a
//! canvas row are never hijacked. Releasing always returns to
//! [`DragState::Idle`].

use crate::{
    data::field::{FieldId, FieldSchema, FieldType},
    engine,
};

/// What is being dragged.
#[derive(Debug, Clone, PartialEq)]
pub enum DragSource {
    /// A palette entry; dropping creates a new field.
    Tool { field_type: FieldType, label: String },
    /// An existing canvas entry; dropping reorders.
    Field { id: FieldId },
}

/// Where the pointer was released.
#[derive(Debug, Clone, PartialEq)]
pub enum DropTarget {
    /// The canvas container itself, not a specific entry.
    Canvas,
    Field(FieldId),
}

/// Result of a completed gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    Inserted { index: usize },
    Moved { from: usize, to: usize },
    Ignored,
}

/// Resolve a drop against `list`.
pub fn reconcile(
    list: &[FieldSchema],
    source: &DragSource,
    target: Option<&DropTarget>,
) -> (Vec<FieldSchema>, DropOutcome) {
    let Some(target) = target else {
        return (list.to_vec(), DropOutcome::Ignored);
    };
    match source {
        DragSource::Tool { field_type, label } => {
            let index = match target {
                DropTarget::Field(over) => list
                    .iter()
                    .position(|f| &f.id == over)
                    .unwrap_or(list.len()),
                DropTarget::Canvas => list.len(),
            };
            // `index <= len`, so the insert never falls back to append.
            let next = engine::insert_field(list, index as isize, *field_type, label);
            (next, DropOutcome::Inserted { index })
        }
        DragSource::Field { id } => {
            let DropTarget::Field(over) = target else {
                return (list.to_vec(), DropOutcome::Ignored);
            };
            let from = list.iter().position(|f| &f.id == id);
            let to = list.iter().position(|f| &f.id == over);
            match (from, to) {
                (Some(from), Some(to)) if from != to => (
                    engine::reorder_fields(list, id, over),
                    DropOutcome::Moved { from, to },
                ),
                _ => (list.to_vec(), DropOutcome::Ignored),
            }
        }
    }
}

/// Pointer position in host coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Point { x, y }
    }

    pub fn distance(&self, other: &Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Minimum pointer travel before a press turns into a drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActivationConstraint {
    pub distance: f32,
}

impl Default for ActivationConstraint {
    fn default() -> Self {
        ActivationConstraint { distance: 5.0 }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    /// Pressed, not yet past the activation distance.
    Pending { source: DragSource, origin: Point },
    Dragging { source: DragSource },
}

/// Floating preview shown under the pointer while dragging.
#[derive(Debug, Clone, PartialEq)]
pub struct DragPreview {
    pub label: String,
    pub field_type: Option<FieldType>,
    /// Key of the dragged canvas entry; `None` for palette tools.
    pub key: Option<String>,
}

/// Drag gesture state machine.
#[derive(Debug, Clone, Default)]
pub struct DragController {
    state: DragState,
    constraint: ActivationConstraint,
}

impl DragController {
    pub fn new(constraint: ActivationConstraint) -> Self {
        DragController {
            state: DragState::Idle,
            constraint,
        }
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Pointer down on a tool or canvas entry.
    pub fn press(&mut self, source: DragSource, at: Point) {
        if self.state != DragState::Idle {
            debug!("press while {:?}, restarting gesture", self.state);
        }
        self.state = DragState::Pending { source, origin: at };
    }

    /// Start a drag directly, for hosts that recognise gestures themselves.
    pub fn start(&mut self, source: DragSource) {
        self.state = DragState::Dragging { source };
    }

    /// Pointer moved; returns `true` once the gesture is an active drag.
    pub fn move_to(&mut self, at: Point) -> bool {
        if let DragState::Pending { source, origin } = &self.state {
            if origin.distance(&at) >= self.constraint.distance {
                self.state = DragState::Dragging {
                    source: source.clone(),
                };
            }
        }
        self.is_dragging()
    }

    /// Pointer released over `target`. A press that never activated is a
    /// click and leaves `list` alone.
    pub fn release(
        &mut self,
        list: &[FieldSchema],
        target: Option<&DropTarget>,
    ) -> (Vec<FieldSchema>, DropOutcome) {
        match std::mem::take(&mut self.state) {
            DragState::Dragging { source } => {
                let (next, outcome) = reconcile(list, &source, target);
                debug!("drop {source:?} on {target:?}: {outcome:?}");
                (next, outcome)
            }
            _ => (list.to_vec(), DropOutcome::Ignored),
        }
    }

    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }

    /// Overlay contents for the active drag, if any.
    pub fn preview(&self, list: &[FieldSchema]) -> Option<DragPreview> {
        let DragState::Dragging { source } = &self.state else {
            return None;
        };
        match source {
            DragSource::Tool { field_type, label } => Some(DragPreview {
                label: label.clone(),
                field_type: Some(*field_type),
                key: None,
            }),
            DragSource::Field { id } => {
                let field = list.iter().find(|f| &f.id == id)?;
                Some(DragPreview {
                    label: field.label.clone(),
                    field_type: field.field_type(),
                    key: Some(field.key.clone()),
                })
            }
        }
    }
}
