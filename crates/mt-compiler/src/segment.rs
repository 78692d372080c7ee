use mt_core::{CompiledState, Condition, DialogueAction, Transition, IMPLICIT_START_STATE};

struct Segment<'a> {
    id: &'a str,
    actions: &'a [DialogueAction],
    next_label: Option<&'a str>,
}

fn split_segments(actions: &[DialogueAction]) -> Vec<Segment<'_>> {
    let label_positions = actions
        .iter()
        .enumerate()
        .filter_map(|(index, action)| action.label_name().map(|name| (index, name)))
        .collect::<Vec<_>>();

    let mut segments = Vec::with_capacity(label_positions.len() + 1);
    let first_label = label_positions
        .first()
        .map(|(index, _)| *index)
        .unwrap_or(actions.len());
    if first_label > 0 {
        segments.push(Segment {
            id: IMPLICIT_START_STATE,
            actions: &actions[..first_label],
            next_label: label_positions.first().map(|(_, name)| *name),
        });
    }

    for (position, &(index, name)) in label_positions.iter().enumerate() {
        let following = label_positions.get(position + 1);
        let end = following.map(|(next, _)| *next).unwrap_or(actions.len());
        segments.push(Segment {
            id: name,
            actions: &actions[index + 1..end],
            next_label: following.map(|(_, next_name)| *next_name),
        });
    }

    segments
}

fn conditional_transitions(
    condition: &Condition,
    actions: &[DialogueAction],
    out: &mut Vec<Transition>,
) {
    for action in actions {
        match action {
            DialogueAction::Finish => out.push(Transition::ConditionalFinish {
                condition: condition.clone(),
            }),
            DialogueAction::Checkpoint { .. } => {}
            _ => {
                for target in action.targets() {
                    out.push(Transition::Conditional {
                        condition: condition.clone(),
                        target: target.to_string(),
                    });
                }
            }
        }
    }
}

fn terminal_transitions(terminator: &DialogueAction, out: &mut Vec<Transition>) {
    match terminator {
        DialogueAction::Jump { target } => out.push(Transition::Jump {
            target: target.clone(),
        }),
        DialogueAction::Choice { options } => {
            out.extend(options.iter().map(|option| Transition::Choice {
                text: option.text.clone(),
                target: option.target.clone(),
            }));
        }
        _ => out.push(Transition::Finish),
    }
}

fn build_state(segment: &Segment<'_>, warnings: &mut Vec<String>) -> CompiledState {
    let terminator_at = segment
        .actions
        .iter()
        .position(DialogueAction::is_terminator);
    let live_end = terminator_at.map(|index| index + 1).unwrap_or(segment.actions.len());
    let body = segment.actions[..live_end].to_vec();

    let dead = segment.actions.len() - live_end;
    if let Some(index) = terminator_at.filter(|_| dead > 0) {
        warnings.push(format!(
            "state \"{}\": {} unreachable action(s) after {} ignored",
            segment.id,
            dead,
            segment.actions[index].kind_name()
        ));
    }

    let mut transitions = Vec::new();
    for action in &body {
        if let DialogueAction::Conditional { condition, actions } = action {
            conditional_transitions(condition, actions, &mut transitions);
        }
    }
    match (terminator_at, segment.next_label) {
        (Some(index), _) => terminal_transitions(&segment.actions[index], &mut transitions),
        (None, Some(next)) => transitions.push(Transition::Fallthrough {
            target: next.to_string(),
        }),
        (None, None) => transitions.push(Transition::End),
    }

    CompiledState {
        id: segment.id.to_string(),
        body,
        transitions,
    }
}

/// Splits a validated action list into label-delimited states.
pub(crate) fn build_states(actions: &[DialogueAction]) -> (Vec<CompiledState>, Vec<String>) {
    let mut warnings = Vec::new();
    let states = split_segments(actions)
        .iter()
        .map(|segment| build_state(segment, &mut warnings))
        .collect();
    (states, warnings)
}
