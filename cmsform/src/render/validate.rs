use serde::Serialize;

use crate::{
    data::{model::Model, path::NamePath, value::FormValue},
    render::{RenderContext, RenderNode, render_model, rules::Rule},
};

/// Non-fatal validation failure, reported next to the control at `path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub path: NamePath,
    pub message: String,
}

fn check_rules(rules: &[Rule], path: &NamePath, value: &FormValue, errs: &mut Vec<ValidationError>) {
    let current = value.get(path);
    for rule in rules {
        if !rule.check(current) {
            errs.push(ValidationError {
                path: path.clone(),
                message: rule.message().to_string(),
            });
        }
    }
}

/// Check `value` against every rule in the render tree.
pub fn validate_nodes(nodes: &[RenderNode], value: &FormValue) -> Vec<ValidationError> {
    let mut errs = Vec::new();
    for node in nodes {
        validate_node(node, value, &mut errs);
    }
    errs
}

fn validate_node(node: &RenderNode, value: &FormValue, errs: &mut Vec<ValidationError>) {
    match node {
        RenderNode::Control(c) => check_rules(&c.rules, &c.path, value, errs),
        RenderNode::List(list) => {
            check_rules(&list.rules, &list.path, value, errs);
            for row in &list.rows {
                if let Some(selector) = &row.selector {
                    check_rules(&selector.rules, &selector.path, value, errs);
                }
                for child in &row.children {
                    validate_node(child, value, errs);
                }
            }
        }
        RenderNode::Placeholder(_) => {}
    }
}

/// Render `model` against `ctx.value` and collect every rule violation.
pub fn validate_model(model: &Model, ctx: &RenderContext<'_>) -> Vec<ValidationError> {
    validate_nodes(&render_model(model, ctx), ctx.value)
}
