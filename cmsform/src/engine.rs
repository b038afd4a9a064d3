//! Pure mutations over ordered field lists.
//!
//! Every operation takes the current list and returns a new one; a call that
//! references a missing id returns an unchanged copy. Nothing here fails, so
//! callers can compare the result with the input to detect changes.

use crate::data::field::{FieldId, FieldKind, FieldSchema, FieldType};

/// Shallow patch applied by [`update_field`]. `None` leaves the attribute alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldPatch {
    pub key: Option<String>,
    pub label: Option<String>,
    pub required: Option<bool>,
    pub unique: Option<bool>,
    pub helper_text: Option<String>,
    /// Switch type; options reset to that type's defaults.
    pub field_type: Option<FieldType>,
    /// Replace the whole type payload. Wins over `field_type`.
    pub kind: Option<FieldKind>,
}

impl FieldPatch {
    pub fn is_empty(&self) -> bool {
        *self == FieldPatch::default()
    }
}

fn key_taken(list: &[FieldSchema], key: &str, except: Option<&FieldId>) -> bool {
    list.iter().any(|f| f.key == key && Some(&f.id) != except)
}

/// Sibling-unique key `<type>_<n>`, starting at `n = len + 1`.
pub fn next_key(list: &[FieldSchema], field_type: FieldType) -> String {
    let mut n = list.len() + 1;
    loop {
        let key = format!("{}_{n}", field_type.as_str());
        if !key_taken(list, &key, None) {
            return key;
        }
        n += 1;
    }
}

/// A new field of `field_type` whose key is unique within `list`.
pub fn new_field(list: &[FieldSchema], field_type: FieldType, label: &str) -> FieldSchema {
    FieldSchema::new(field_type, next_key(list, field_type), label)
}

/// Append a new field.
pub fn add_field(list: &[FieldSchema], field_type: FieldType, label: &str) -> Vec<FieldSchema> {
    let mut out = list.to_vec();
    out.push(new_field(list, field_type, label));
    out
}

/// Insert a new field at `index`; any index outside `0..=len` appends.
pub fn insert_field(
    list: &[FieldSchema],
    index: isize,
    field_type: FieldType,
    label: &str,
) -> Vec<FieldSchema> {
    let field = new_field(list, field_type, label);
    let mut out = list.to_vec();
    match usize::try_from(index) {
        Ok(i) if i <= out.len() => out.insert(i, field),
        _ => out.push(field),
    }
    out
}

pub fn remove_field(list: &[FieldSchema], id: &FieldId) -> Vec<FieldSchema> {
    if !list.iter().any(|f| &f.id == id) {
        debug!("remove: no field {id}");
    }
    list.iter().filter(|f| &f.id != id).cloned().collect()
}

/// Merge `patch` into the field with `id`.
///
/// A patch whose key would collide with a sibling is rejected whole.
pub fn update_field(list: &[FieldSchema], id: &FieldId, patch: &FieldPatch) -> Vec<FieldSchema> {
    let Some(pos) = list.iter().position(|f| &f.id == id) else {
        debug!("update: no field {id}");
        return list.to_vec();
    };
    if let Some(key) = &patch.key {
        if key_taken(list, key, Some(id)) {
            warn!("update: key `{key}` already used by a sibling of {id}, patch ignored");
            return list.to_vec();
        }
    }

    let mut out = list.to_vec();
    let field = &mut out[pos];
    if let Some(key) = &patch.key {
        field.key = key.clone();
    }
    if let Some(label) = &patch.label {
        field.label = label.clone();
    }
    if let Some(required) = patch.required {
        field.required = required;
    }
    if let Some(unique) = patch.unique {
        field.unique = unique;
    }
    if let Some(text) = &patch.helper_text {
        field.helper_text = Some(text.clone());
    }
    match (&patch.kind, patch.field_type) {
        (Some(kind), _) => field.kind = kind.clone(),
        (None, Some(t)) if field.field_type() != Some(t) => field.kind = FieldKind::new(t),
        _ => {}
    }
    out
}

/// Move `active` to the position currently held by `over` (array move).
pub fn reorder_fields(list: &[FieldSchema], active: &FieldId, over: &FieldId) -> Vec<FieldSchema> {
    let from = list.iter().position(|f| &f.id == active);
    let to = list.iter().position(|f| &f.id == over);
    let mut out = list.to_vec();
    match (from, to) {
        (Some(from), Some(to)) if from != to => {
            let item = out.remove(from);
            out.insert(to, item);
        }
        _ => debug!("reorder: {active} -> {over} is a no-op"),
    }
    out
}

/// Apply `op` to the sub-fields of the repeater `parent`, found at any depth.
///
/// Returns an unchanged copy if `parent` is missing or is not a repeater.
pub fn edit_sub_fields<F>(list: &[FieldSchema], parent: &FieldId, op: F) -> Vec<FieldSchema>
where
    F: FnOnce(&[FieldSchema]) -> Vec<FieldSchema>,
{
    let mut op = Some(op);
    edit_in(list, parent, &mut op).unwrap_or_else(|| {
        debug!("edit_sub_fields: no repeater {parent}");
        list.to_vec()
    })
}

fn edit_in<F>(list: &[FieldSchema], parent: &FieldId, op: &mut Option<F>) -> Option<Vec<FieldSchema>>
where
    F: FnOnce(&[FieldSchema]) -> Vec<FieldSchema>,
{
    for (i, field) in list.iter().enumerate() {
        let FieldKind::Repeater { sub_fields, .. } = &field.kind else {
            continue;
        };
        let replaced = if &field.id == parent {
            op.take().map(|op| op(sub_fields.as_slice()))
        } else {
            edit_in(sub_fields, parent, op)
        };
        if let Some(next) = replaced {
            let mut out = list.to_vec();
            if let FieldKind::Repeater { sub_fields, .. } = &mut out[i].kind {
                *sub_fields = next;
            }
            return Some(out);
        }
    }
    None
}

/// Find a field by id, descending into repeaters.
pub fn find_field<'a>(list: &'a [FieldSchema], id: &FieldId) -> Option<&'a FieldSchema> {
    list.iter().find_map(|f| {
        if &f.id == id {
            Some(f)
        } else {
            find_field(f.sub_fields(), id)
        }
    })
}

/// The list holding `id`: `Some(None)` at the top level, `Some(Some(r))` for
/// the sub-fields of repeater `r`, `None` when `id` is missing.
pub fn owner_of<'a>(list: &'a [FieldSchema], id: &FieldId) -> Option<Option<&'a FieldSchema>> {
    if list.iter().any(|f| &f.id == id) {
        return Some(None);
    }
    list.iter().find_map(|f| match owner_of(f.sub_fields(), id)? {
        None => Some(Some(f)),
        nested => Some(nested),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(list: &[FieldSchema]) -> Vec<&str> {
        list.iter().map(|f| f.id.as_str()).collect()
    }

    fn sample() -> Vec<FieldSchema> {
        ["a", "b", "c", "d"]
            .into_iter()
            .map(|k| FieldSchema::with_id(k, k, k.to_uppercase(), FieldKind::Number))
            .collect()
    }

    #[test]
    fn add_generates_unique_keys() {
        let list = add_field(&[], FieldType::Text, "Title");
        assert_eq!(list[0].key, "text_1");
        assert_eq!(list[0].label, "Title");
        assert!(!list[0].required);

        // `text_2` is taken, so the next text field skips ahead.
        let list = update_field(
            &list,
            &list[0].id.clone(),
            &FieldPatch {
                key: Some("text_2".into()),
                ..Default::default()
            },
        );
        let list = add_field(&list, FieldType::Text, "Body");
        assert_eq!(list[1].key, "text_3");
        assert_ne!(list[0].id, list[1].id);
    }

    #[test]
    fn insert_out_of_range_appends() {
        let list = sample();
        for index in [-1, 5, 100] {
            let out = insert_field(&list, index, FieldType::Boolean, "Flag");
            assert_eq!(out.len(), 5);
            assert_eq!(out[4].field_type(), Some(FieldType::Boolean));
        }
        let out = insert_field(&list, 4, FieldType::Boolean, "Flag");
        assert_eq!(out[4].label, "Flag");
        let out = insert_field(&list, 0, FieldType::Boolean, "Flag");
        assert_eq!(out[0].label, "Flag");
        assert_eq!(&ids(&out)[1..], ["a", "b", "c", "d"]);
    }

    #[test]
    fn remove_is_idempotent() {
        let list = sample();
        let once = remove_field(&list, &"b".into());
        let twice = remove_field(&once, &"b".into());
        assert_eq!(ids(&once), ["a", "c", "d"]);
        assert_eq!(once, twice);
    }

    #[test]
    fn update_merges_and_ignores_missing() {
        let list = sample();
        let out = update_field(
            &list,
            &"c".into(),
            &FieldPatch {
                label: Some("Price".into()),
                required: Some(true),
                ..Default::default()
            },
        );
        assert_eq!(out[2].label, "Price");
        assert!(out[2].required);
        assert_eq!(out[2].key, "c");
        assert_eq!(update_field(&list, &"zz".into(), &FieldPatch::default()), list);
    }

    #[test]
    fn update_rejects_sibling_key_collision() {
        let list = sample();
        let patch = FieldPatch {
            key: Some("a".into()),
            label: Some("changed".into()),
            ..Default::default()
        };
        assert_eq!(update_field(&list, &"b".into(), &patch), list);
        // Keeping its own key is not a collision.
        let out = update_field(
            &list,
            &"a".into(),
            &FieldPatch {
                key: Some("a".into()),
                label: Some("A2".into()),
                ..Default::default()
            },
        );
        assert_eq!(out[0].label, "A2");
    }

    #[test]
    fn update_type_resets_options() {
        let list = sample();
        let out = update_field(
            &list,
            &"a".into(),
            &FieldPatch {
                field_type: Some(FieldType::Repeater),
                ..Default::default()
            },
        );
        assert_eq!(out[0].field_type(), Some(FieldType::Repeater));
        assert!(out[0].sub_fields().is_empty());
    }

    #[test]
    fn reorder_is_array_move() {
        let list = sample();
        assert_eq!(ids(&reorder_fields(&list, &"a".into(), &"c".into())), ["b", "c", "a", "d"]);
        assert_eq!(ids(&reorder_fields(&list, &"d".into(), &"b".into())), ["a", "d", "b", "c"]);
        assert_eq!(reorder_fields(&list, &"b".into(), &"b".into()), list);
        assert_eq!(reorder_fields(&list, &"b".into(), &"x".into()), list);
        assert_eq!(reorder_fields(&list, &"x".into(), &"b".into()), list);
    }

    #[test]
    fn reorder_preserves_ids_and_length() {
        let list = sample();
        for a in ["a", "b", "c", "d"] {
            for b in ["a", "b", "c", "d", "x"] {
                let out = reorder_fields(&list, &a.into(), &b.into());
                let mut got = ids(&out);
                got.sort();
                assert_eq!(got, ["a", "b", "c", "d"]);
            }
        }
    }

    #[test]
    fn edits_nested_repeater() {
        let inner = FieldSchema::with_id("inner", "rows", "Rows", FieldKind::new(FieldType::Repeater));
        let outer = FieldSchema::with_id(
            "outer",
            "groups",
            "Groups",
            FieldKind::Repeater {
                sub_fields: vec![inner],
                options: Default::default(),
            },
        );
        let list = vec![outer];

        let out = edit_sub_fields(&list, &"inner".into(), |subs| {
            add_field(subs, FieldType::Number, "Qty")
        });
        let inner = find_field(&out, &"inner".into()).unwrap();
        assert_eq!(inner.sub_fields().len(), 1);
        assert_eq!(inner.sub_fields()[0].key, "number_1");
        // input untouched
        assert!(find_field(&list, &"inner".into()).unwrap().sub_fields().is_empty());

        let unchanged = edit_sub_fields(&out, &"missing".into(), |_| Vec::new());
        assert_eq!(unchanged, out);
    }

    #[test]
    fn owner_is_the_direct_parent() {
        let inner = FieldSchema::with_id(
            "inner",
            "rows",
            "Rows",
            FieldKind::Repeater {
                sub_fields: vec![FieldSchema::new(FieldType::Text, "leaf", "Leaf")],
                options: Default::default(),
            },
        );
        let leaf = inner.sub_fields()[0].id.clone();
        let outer = FieldSchema::with_id(
            "outer",
            "groups",
            "Groups",
            FieldKind::Repeater {
                sub_fields: vec![inner],
                options: Default::default(),
            },
        );
        let list = vec![outer];

        assert_eq!(owner_of(&list, &"outer".into()), Some(None));
        assert_eq!(owner_of(&list, &"inner".into()).unwrap().unwrap().id.as_str(), "outer");
        assert_eq!(owner_of(&list, &leaf).unwrap().unwrap().id.as_str(), "inner");
        assert_eq!(owner_of(&list, &"missing".into()), None);
    }
}
