//! Turns the action list accumulated for one script group into a validated
//! dialogue state machine.
//!
//! Every label becomes a state whose body is the run of actions after it, up
//! to the next label or the first `finish`/`jump`/`choice`. Actions after that
//! terminator are unreachable: they are validated, then dropped with a
//! warning. A list that does not open with a label gets an implicit
//! [`mt_core::IMPLICIT_START_STATE`]. Output order is label declaration
//! order, so equal input always yields an identical document.

use mt_core::{DialogueAction, DialogueError, Fsm};

mod segment;
mod validate;

pub const INTERNAL_RESERVED_NAME_PREFIX: &str = "__";

#[derive(Debug, Clone, PartialEq)]
pub struct Compilation {
    pub fsm: Fsm,
    pub warnings: Vec<String>,
}

pub fn compile_actions(actions: &[DialogueAction]) -> Result<Compilation, DialogueError> {
    if actions.is_empty() {
        return Err(DialogueError::internal(
            "COMPILER_EMPTY_INPUT",
            "Cannot compile an empty action list.",
        ));
    }

    let labels = validate::collect_labels(actions)?;
    validate::validate_references(actions, &labels)?;

    let (states, warnings) = segment::build_states(actions);
    let Some(initial) = states.first().map(|state| state.id.clone()) else {
        return Err(DialogueError::internal(
            "COMPILER_NO_STATES",
            format!("{} action(s) produced no states.", actions.len()),
        ));
    };

    Ok(Compilation {
        fsm: Fsm { initial, states },
        warnings,
    })
}

#[cfg(test)]
mod tests;
