use std::collections::BTreeSet;
use std::sync::OnceLock;

use mt_core::{DialogueAction, DialogueError};
use regex::Regex;

use crate::INTERNAL_RESERVED_NAME_PREFIX;

fn label_name_regex() -> &'static Regex {
    static LABEL: OnceLock<Regex> = OnceLock::new();
    LABEL.get_or_init(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("label regex must compile"))
}

/// Returns every top-level label name, rejecting malformed and duplicate names.
pub(crate) fn collect_labels(
    actions: &[DialogueAction],
) -> Result<BTreeSet<&str>, DialogueError> {
    let mut labels = BTreeSet::new();
    for (index, action) in actions.iter().enumerate() {
        let Some(name) = action.label_name() else {
            continue;
        };
        if !label_name_regex().is_match(name) {
            return Err(DialogueError::script(
                "COMPILER_LABEL_INVALID",
                format!(
                    "Label \"{}\" (action #{}) may only contain letters, digits and '_'.",
                    name, index
                ),
            ));
        }
        if name.starts_with(INTERNAL_RESERVED_NAME_PREFIX) {
            return Err(DialogueError::script(
                "COMPILER_LABEL_INVALID",
                format!(
                    "Label \"{}\" (action #{}) uses the reserved prefix \"{}\".",
                    name, index, INTERNAL_RESERVED_NAME_PREFIX
                ),
            ));
        }
        if !labels.insert(name) {
            return Err(DialogueError::script(
                "COMPILER_DUPLICATE_LABEL",
                format!(
                    "Duplicate label \"{}\": action #{} redefines a label declared earlier.",
                    name, index
                ),
            ));
        }
    }
    Ok(labels)
}

/// Checks jump/choice targets and the shape of nested actions, dead code included.
pub(crate) fn validate_references(
    actions: &[DialogueAction],
    labels: &BTreeSet<&str>,
) -> Result<(), DialogueError> {
    for (index, action) in actions.iter().enumerate() {
        validate_action(index, action, labels, false)?;
    }
    Ok(())
}

fn validate_action(
    index: usize,
    action: &DialogueAction,
    labels: &BTreeSet<&str>,
    nested: bool,
) -> Result<(), DialogueError> {
    match action {
        DialogueAction::Label { name } if nested => Err(DialogueError::script(
            "COMPILER_NESTED_LABEL",
            format!(
                "Label \"{}\" cannot be declared inside a conditional (action #{}).",
                name, index
            ),
        )),
        DialogueAction::Choice { options } if options.is_empty() => Err(DialogueError::script(
            "COMPILER_CHOICE_EMPTY",
            format!("Choice at action #{} has no options.", index),
        )),
        DialogueAction::Conditional { actions, .. } => {
            if nested {
                return Err(DialogueError::script(
                    "COMPILER_NESTED_CONDITIONAL",
                    format!(
                        "Conditional at action #{} is nested inside another conditional.",
                        index
                    ),
                ));
            }
            for inner in actions {
                validate_action(index, inner, labels, true)?;
            }
            Ok(())
        }
        _ => {
            for target in action.targets() {
                if !labels.contains(target) {
                    return Err(DialogueError::script(
                        "COMPILER_LABEL_NOT_FOUND",
                        format!(
                            "Label \"{}\" not found: {} at action #{} has no matching label.",
                            target,
                            action.kind_name(),
                            index
                        ),
                    ));
                }
            }
            Ok(())
        }
    }
}
