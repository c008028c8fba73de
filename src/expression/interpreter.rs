//! Clause splitting and application of update expressions.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::model::value::{AttributeValue, Item};

const ACTIONS: [&str; 4] = ["SET", "REMOVE", "ADD", "DELETE"];

/// Applies `expression` to a copy of `item` and returns the updated item.
///
/// Clauses apply left to right; the original item is never modified, so a
/// failing clause leaves the caller's view untouched.
pub fn apply_update(
    item: &Item,
    expression: &str,
    values: &HashMap<String, AttributeValue>,
) -> Result<Item> {
    let clauses = split_clauses(expression);
    if clauses.is_empty() {
        return Err(Error::InvalidExpression(
            "empty update expression".to_string(),
        ));
    }

    let mut updated = item.clone();
    for clause in clauses {
        apply_clause(&mut updated, &clause, values)?;
    }
    Ok(updated)
}

/// Splits the expression into per-action clauses. A new clause begins at
/// every action keyword; leading tokens before the first keyword end up in
/// a clause of their own and are rejected by `apply_clause`.
fn split_clauses(expression: &str) -> Vec<Vec<String>> {
    let mut clauses: Vec<Vec<String>> = Vec::new();
    let mut current: Vec<String> = Vec::new();

    for token in expression.split_whitespace() {
        if ACTIONS.contains(&token.to_uppercase().as_str()) && !current.is_empty() {
            clauses.push(std::mem::take(&mut current));
        }
        current.push(token.to_string());
    }
    if !current.is_empty() {
        clauses.push(current);
    }
    clauses
}

fn apply_clause(
    item: &mut Item,
    parts: &[String],
    values: &HashMap<String, AttributeValue>,
) -> Result<()> {
    let action = parts[0].to_uppercase();
    match action.as_str() {
        "SET" => apply_set(item, parts, values),
        "REMOVE" => apply_remove(item, parts),
        "ADD" => apply_add(item, parts, values),
        "DELETE" => apply_delete(item, parts, values),
        other => Err(Error::InvalidExpression(format!(
            "unsupported update action: {}",
            other
        ))),
    }
}

/// `SET name = value`
fn apply_set(
    item: &mut Item,
    parts: &[String],
    values: &HashMap<String, AttributeValue>,
) -> Result<()> {
    if parts.len() < 4 || parts[2] != "=" {
        return Err(Error::InvalidExpression(format!(
            "invalid SET clause: {}",
            parts.join(" ")
        )));
    }
    let name = &parts[1];
    // Joining the tail keeps quoted literals with spaces intact.
    let value_str = parts[3..].join(" ");
    let value = resolve_value(&value_str, values)?;
    item.insert(name.clone(), value);
    Ok(())
}

/// `REMOVE name₁ name₂ …`
fn apply_remove(item: &mut Item, parts: &[String]) -> Result<()> {
    if parts.len() < 2 {
        return Err(Error::InvalidExpression(format!(
            "invalid REMOVE clause: {}",
            parts.join(" ")
        )));
    }
    for name in &parts[1..] {
        item.remove(name);
    }
    Ok(())
}

/// `ADD name value`: numeric addition on an existing `N` attribute.
fn apply_add(
    item: &mut Item,
    parts: &[String],
    values: &HashMap<String, AttributeValue>,
) -> Result<()> {
    if parts.len() < 3 {
        return Err(Error::InvalidExpression(format!(
            "invalid ADD clause: {}",
            parts.join(" ")
        )));
    }
    let name = &parts[1];
    let value_str = parts[2..].join(" ");
    let add_value = resolve_value(&value_str, values)?;

    let existing = match item.get(name) {
        Some(AttributeValue::N(n)) => n,
        _ => {
            return Err(Error::InvalidExpression(format!(
                "attribute {} is not a number or does not exist for ADD",
                name
            )))
        }
    };
    let AttributeValue::N(addend) = &add_value else {
        return Err(Error::InvalidExpression(format!(
            "ADD value for {} is not a number",
            name
        )));
    };

    let existing: f64 = existing.parse().map_err(|_| {
        Error::InvalidExpression(format!("failed to parse existing number for ADD: {}", name))
    })?;
    let addend: f64 = addend.parse().map_err(|_| {
        Error::InvalidExpression(format!("failed to parse ADD operand for {}", name))
    })?;

    item.insert(
        name.clone(),
        AttributeValue::N(format_number(existing + addend)),
    );
    Ok(())
}

/// `DELETE name [value]`: with a set-typed target and a matching set
/// value, removes the listed elements; otherwise removes the attribute.
fn apply_delete(
    item: &mut Item,
    parts: &[String],
    values: &HashMap<String, AttributeValue>,
) -> Result<()> {
    if parts.len() < 2 {
        return Err(Error::InvalidExpression(format!(
            "invalid DELETE clause: {}",
            parts.join(" ")
        )));
    }
    let name = &parts[1];

    // Scalar form: remove the attribute outright.
    if parts.len() == 2 {
        item.remove(name);
        return Ok(());
    }

    let placeholder = &parts[2];
    let Some(to_delete) = values.get(placeholder) else {
        return Err(Error::InvalidExpression(format!(
            "expression attribute value {} not found for DELETE",
            placeholder
        )));
    };

    let Some(existing) = item.get(name) else {
        // Nothing to delete from.
        return Ok(());
    };

    let replacement = match (existing, to_delete) {
        (AttributeValue::SS(have), AttributeValue::SS(drop)) => Some(AttributeValue::SS(
            have.iter().filter(|v| !drop.contains(v)).cloned().collect(),
        )),
        (AttributeValue::NS(have), AttributeValue::NS(drop)) => Some(AttributeValue::NS(
            have.iter().filter(|v| !drop.contains(v)).cloned().collect(),
        )),
        (AttributeValue::BS(have), AttributeValue::BS(drop)) => Some(AttributeValue::BS(
            have.iter().filter(|v| !drop.contains(v)).cloned().collect(),
        )),
        _ => None,
    };

    match replacement {
        Some(value) => {
            item.insert(name.clone(), value);
        }
        // Non-set target or mismatched set types: remove the attribute.
        None => {
            item.remove(name);
        }
    }
    Ok(())
}

/// Resolves a clause value: `:placeholder` via the expression values map,
/// anything else as an inferred-type literal.
fn resolve_value(
    raw: &str,
    values: &HashMap<String, AttributeValue>,
) -> Result<AttributeValue> {
    if raw.starts_with(':') {
        return values.get(raw).cloned().ok_or_else(|| {
            Error::InvalidExpression(format!("expression attribute value {} not found", raw))
        });
    }
    Ok(parse_literal(raw))
}

/// Infers the type of a literal token: double-quoted ⇒ `S`, boolean ⇒
/// `BOOL`, float ⇒ `N` (re-encoded to shortest round-trip form), anything
/// else ⇒ `S`.
fn parse_literal(raw: &str) -> AttributeValue {
    if raw.len() > 1 && raw.starts_with('"') && raw.ends_with('"') {
        return AttributeValue::S(raw[1..raw.len() - 1].to_string());
    }
    if let Ok(b) = raw.parse::<bool>() {
        return AttributeValue::BOOL(b);
    }
    if let Ok(f) = raw.parse::<f64>() {
        return AttributeValue::N(format_number(f));
    }
    AttributeValue::S(raw.to_string())
}

/// Shortest decimal string that round-trips through `f64`.
fn format_number(value: f64) -> String {
    format!("{}", value)
}
