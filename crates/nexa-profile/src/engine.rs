//! Block validator: interprets the rule table against a snapshot.

use crate::block::BlockId;
use crate::rules::{rules_for, FieldRule, Target};
use crate::snapshot::FormSnapshot;
use crate::validate::{check, FieldValue, Rule, ValidationError};

/// Validate one block. Returns every field error, empty when the block is valid.
///
/// The snapshot is only read.
pub fn validate_block(block: BlockId, snapshot: &FormSnapshot) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for rule in rules_for(block) {
        evaluate(rule, snapshot, &mut errors);
    }
    tracing::debug!(block = %block, errors = errors.len(), "validated block");
    errors
}

/// Validate a block given its client-facing number.
///
/// Numbers outside the form yield no errors.
pub fn validate_block_number(number: u32, snapshot: &FormSnapshot) -> Vec<ValidationError> {
    match BlockId::from_number(number) {
        Some(block) => validate_block(block, snapshot),
        None => {
            tracing::warn!(number, "validation requested for unknown block");
            Vec::new()
        }
    }
}

fn evaluate(rule: &FieldRule, snapshot: &FormSnapshot, errors: &mut Vec<ValidationError>) {
    match rule.target {
        Target::Field(name) => {
            let Some(value) = snapshot.value(name) else {
                tracing::warn!(field = name, "rule table names a field the snapshot lacks");
                return;
            };
            apply(name, value, rule.rules, errors);
        }
        Target::EachItem { list, field } => {
            let Some(records) = snapshot.records(list) else {
                tracing::warn!(list, "rule table names a list the snapshot lacks");
                return;
            };
            for (index, record) in records.iter().enumerate() {
                let Some(text) = record.text(field) else {
                    tracing::warn!(list, field, "rule table names an item field the snapshot lacks");
                    return;
                };
                let field_id = format!("{list}[{index}].{field}");
                apply(&field_id, FieldValue::Text(text), rule.rules, errors);
            }
        }
        Target::AnyOf(fields) => {
            let present = fields.iter().any(|name| {
                matches!(snapshot.value(name), Some(FieldValue::Text(Some(s))) if !s.trim().is_empty())
            });
            if present {
                return;
            }
            let field_id = fields.join("|");
            if rule.rules.contains(&Rule::Required) {
                errors.push(ValidationError::new(
                    field_id,
                    format!("Provide at least one contact: {}", fields.join(", ")),
                ));
            }
        }
    }
}

fn apply(field_id: &str, value: FieldValue<'_>, rules: &[Rule], errors: &mut Vec<ValidationError>) {
    errors.extend(rules.iter().filter_map(|rule| check(field_id, value, *rule)));
}
