use super::*;
use mt_core::{CompareOp, Condition, FlagScope, TimeOfDay, Transition, IMPLICIT_START_STATE};

fn condition(key: &str, op: CompareOp, value: f64) -> Condition {
    Condition::flag(key, op, value, FlagScope::Local)
}

#[test]
fn single_label_say_finish_compiles_to_one_state() {
    let actions = vec![
        DialogueAction::label("start"),
        DialogueAction::say(None, "Hi"),
        DialogueAction::Finish,
    ];

    let compiled = compile_actions(&actions).expect("compile should pass");
    assert!(compiled.warnings.is_empty());
    assert_eq!(compiled.fsm.initial, "start");
    assert_eq!(compiled.fsm.state_count(), 1);

    let start = compiled.fsm.state("start").expect("start state");
    assert_eq!(
        start.body,
        vec![DialogueAction::say(None, "Hi"), DialogueAction::Finish]
    );
    assert_eq!(start.transitions, vec![Transition::Finish]);
}

#[test]
fn missing_jump_target_is_a_script_error_naming_the_label() {
    let actions = vec![
        DialogueAction::label("start"),
        DialogueAction::say(None, "Hi"),
        DialogueAction::jump("missing"),
    ];

    let error = compile_actions(&actions).expect_err("dangling jump should fail");
    assert_eq!(error.code, "COMPILER_LABEL_NOT_FOUND");
    assert!(error.is_script_error());
    assert!(error.message.contains("\"missing\""));
}

#[test]
fn missing_choice_target_is_reported() {
    let actions = vec![
        DialogueAction::label("start"),
        DialogueAction::choice([("Yes", "yes"), ("No", "nope")]),
        DialogueAction::label("yes"),
        DialogueAction::Finish,
    ];

    let error = compile_actions(&actions).expect_err("dangling choice should fail");
    assert_eq!(error.code, "COMPILER_LABEL_NOT_FOUND");
    assert!(error.message.contains("\"nope\""));
}

#[test]
fn duplicate_label_is_a_script_error_naming_the_duplicate() {
    let actions = vec![
        DialogueAction::label("intro"),
        DialogueAction::Finish,
        DialogueAction::label("intro"),
        DialogueAction::Finish,
    ];

    let error = compile_actions(&actions).expect_err("duplicate label should fail");
    assert_eq!(error.code, "COMPILER_DUPLICATE_LABEL");
    assert!(error.is_script_error());
    assert!(error.message.contains("\"intro\""));
}

#[test]
fn malformed_and_reserved_label_names_are_rejected() {
    let error = compile_actions(&[DialogueAction::label("two words")])
        .expect_err("label with space should fail");
    assert_eq!(error.code, "COMPILER_LABEL_INVALID");

    let error = compile_actions(&[DialogueAction::label("")]).expect_err("empty label");
    assert_eq!(error.code, "COMPILER_LABEL_INVALID");

    let error = compile_actions(&[DialogueAction::label("__start__")])
        .expect_err("reserved prefix should fail");
    assert_eq!(error.code, "COMPILER_LABEL_INVALID");
    assert!(error.message.contains("reserved"));
}

#[test]
fn actions_before_first_label_form_implicit_start_state() {
    let actions = vec![
        DialogueAction::set_flag("met", true),
        DialogueAction::say(Some("m"), "Hello"),
        DialogueAction::label("after"),
        DialogueAction::Finish,
    ];

    let compiled = compile_actions(&actions).expect("compile should pass");
    assert_eq!(compiled.fsm.initial, IMPLICIT_START_STATE);
    assert_eq!(
        compiled.fsm.state_ids().collect::<Vec<_>>(),
        vec![IMPLICIT_START_STATE, "after"]
    );
    let start = compiled.fsm.state(IMPLICIT_START_STATE).expect("implicit state");
    assert_eq!(start.body.len(), 2);
    assert_eq!(
        start.transitions,
        vec![Transition::Fallthrough {
            target: "after".to_string()
        }]
    );
}

#[test]
fn unterminated_last_state_ends() {
    let compiled =
        compile_actions(&[DialogueAction::say(None, "just talk")]).expect("compile should pass");
    assert_eq!(compiled.fsm.state_count(), 1);
    assert_eq!(compiled.fsm.states[0].transitions, vec![Transition::End]);
}

#[test]
fn content_after_finish_is_dropped_with_warning() {
    let actions = vec![
        DialogueAction::label("start"),
        DialogueAction::Finish,
        DialogueAction::say(None, "never shown"),
        DialogueAction::jump("start"),
        DialogueAction::label("next"),
        DialogueAction::say(None, "shown"),
    ];

    let compiled = compile_actions(&actions).expect("compile should pass");
    let start = compiled.fsm.state("start").expect("start");
    assert_eq!(start.body, vec![DialogueAction::Finish]);
    assert_eq!(start.transitions, vec![Transition::Finish]);
    assert_eq!(
        compiled.warnings,
        vec!["state \"start\": 2 unreachable action(s) after finish ignored".to_string()]
    );
    assert_eq!(compiled.fsm.state("next").expect("next").body.len(), 1);
}

#[test]
fn dead_code_is_still_validated() {
    let actions = vec![
        DialogueAction::label("start"),
        DialogueAction::Finish,
        DialogueAction::jump("nowhere"),
    ];
    let error = compile_actions(&actions).expect_err("dead jump still resolves labels");
    assert_eq!(error.code, "COMPILER_LABEL_NOT_FOUND");
}

#[test]
fn jump_and_choice_terminate_their_state() {
    let actions = vec![
        DialogueAction::label("start"),
        DialogueAction::say(Some("m"), "Who am I?"),
        DialogueAction::choice([("Monika", "knows"), ("No idea", "unknown")]),
        DialogueAction::label("knows"),
        DialogueAction::jump("start"),
        DialogueAction::say(None, "dead"),
        DialogueAction::label("unknown"),
        DialogueAction::Finish,
    ];

    let compiled = compile_actions(&actions).expect("compile should pass");
    let start = compiled.fsm.state("start").expect("start");
    assert_eq!(
        start.transitions,
        vec![
            Transition::Choice {
                text: "Monika".to_string(),
                target: "knows".to_string()
            },
            Transition::Choice {
                text: "No idea".to_string(),
                target: "unknown".to_string()
            },
        ]
    );
    let knows = compiled.fsm.state("knows").expect("knows");
    assert_eq!(
        knows.transitions,
        vec![Transition::Jump {
            target: "start".to_string()
        }]
    );
    assert_eq!(compiled.warnings.len(), 1);
}

#[test]
fn conditionals_become_guarded_transitions() {
    let guard = condition("aff", CompareOp::Gt, 5.0);
    let actions = vec![
        DialogueAction::label("start"),
        DialogueAction::Conditional {
            condition: guard.clone(),
            actions: vec![
                DialogueAction::say(Some("m"), "You again!"),
                DialogueAction::jump("friends"),
            ],
        },
        DialogueAction::Conditional {
            condition: condition("aff", CompareOp::Lt, 0.0),
            actions: vec![DialogueAction::Finish],
        },
        DialogueAction::say(Some("m"), "Hello, stranger."),
        DialogueAction::label("friends"),
        DialogueAction::Finish,
    ];

    let compiled = compile_actions(&actions).expect("compile should pass");
    let start = compiled.fsm.state("start").expect("start");
    assert_eq!(start.body.len(), 3);
    assert_eq!(
        start.transitions,
        vec![
            Transition::Conditional {
                condition: guard,
                target: "friends".to_string()
            },
            Transition::ConditionalFinish {
                condition: condition("aff", CompareOp::Lt, 0.0)
            },
            Transition::Fallthrough {
                target: "friends".to_string()
            },
        ]
    );
}

#[test]
fn conditional_contents_are_validated() {
    let nested_label = vec![DialogueAction::Conditional {
        condition: condition("x", CompareOp::Eq, 1.0),
        actions: vec![DialogueAction::label("inner")],
    }];
    let error = compile_actions(&nested_label).expect_err("nested label should fail");
    assert_eq!(error.code, "COMPILER_NESTED_LABEL");

    let nested_jump = vec![
        DialogueAction::label("start"),
        DialogueAction::Conditional {
            condition: condition("x", CompareOp::Eq, 1.0),
            actions: vec![DialogueAction::jump("ghost")],
        },
    ];
    let error = compile_actions(&nested_jump).expect_err("nested dangling jump should fail");
    assert_eq!(error.code, "COMPILER_LABEL_NOT_FOUND");
    assert!(error.message.contains("\"ghost\""));

    let doubly_nested = vec![DialogueAction::Conditional {
        condition: condition("x", CompareOp::Eq, 1.0),
        actions: vec![DialogueAction::Conditional {
            condition: condition("y", CompareOp::Eq, 1.0),
            actions: vec![],
        }],
    }];
    let error = compile_actions(&doubly_nested).expect_err("nested conditional should fail");
    assert_eq!(error.code, "COMPILER_NESTED_CONDITIONAL");
}

#[test]
fn empty_choice_is_rejected() {
    let error = compile_actions(&[DialogueAction::Choice { options: vec![] }])
        .expect_err("choice without options should fail");
    assert_eq!(error.code, "COMPILER_CHOICE_EMPTY");
}

#[test]
fn empty_input_is_an_internal_error() {
    let error = compile_actions(&[]).expect_err("empty list should fail");
    assert_eq!(error.code, "COMPILER_EMPTY_INPUT");
    assert!(!error.is_script_error());
}

#[test]
fn compiling_twice_yields_identical_json() {
    let actions = vec![
        DialogueAction::say(None, "prelude"),
        DialogueAction::label("zeta"),
        DialogueAction::set_flag("seen_zeta", true),
        DialogueAction::jump("alpha"),
        DialogueAction::label("alpha"),
        DialogueAction::Finish,
    ];

    let first = compile_actions(&actions).expect("first compile");
    let second = compile_actions(&actions).expect("second compile");
    let first_json = first.fsm.to_json_pretty().expect("json");
    let second_json = second.fsm.to_json_pretty().expect("json");
    assert_eq!(first_json, second_json);

    let zeta = first_json.find("\"zeta\"").expect("zeta");
    let alpha = first_json.find("\"alpha\": {").expect("alpha state");
    assert!(zeta < alpha, "states must keep declaration order");
}

#[test]
fn label_only_states_fall_through_in_order() {
    let actions = vec![
        DialogueAction::label("a"),
        DialogueAction::label("b"),
        DialogueAction::label("c"),
    ];
    let compiled = compile_actions(&actions).expect("compile should pass");
    let transitions = compiled
        .fsm
        .states
        .iter()
        .map(|state| state.transitions.clone())
        .collect::<Vec<_>>();
    assert_eq!(
        transitions,
        vec![
            vec![Transition::Fallthrough {
                target: "b".to_string()
            }],
            vec![Transition::Fallthrough {
                target: "c".to_string()
            }],
            vec![Transition::End],
        ]
    );
    let json = serde_json::to_value(&compiled.fsm).expect("json value");
    assert_eq!(json["initial"], "a");
}

#[test]
fn checkpoint_label_must_exist() {
    let actions = vec![
        DialogueAction::label("start"),
        DialogueAction::Checkpoint {
            label: "chapter_2".to_string(),
        },
        DialogueAction::Finish,
    ];
    let error = compile_actions(&actions).expect_err("dangling checkpoint should fail");
    assert_eq!(error.code, "COMPILER_LABEL_NOT_FOUND");
    assert!(error.message.contains("\"chapter_2\""));
    assert!(error.message.contains("checkpoint"));
}

#[test]
fn checkpoint_keeps_the_state_open() {
    let actions = vec![
        DialogueAction::label("start"),
        DialogueAction::Checkpoint {
            label: "start".to_string(),
        },
        DialogueAction::Conditional {
            condition: Condition::time(TimeOfDay::Night),
            actions: vec![
                DialogueAction::Checkpoint {
                    label: "late".to_string(),
                },
                DialogueAction::jump("late"),
            ],
        },
        DialogueAction::IdleChats,
        DialogueAction::label("late"),
        DialogueAction::Finish,
    ];

    let compiled = compile_actions(&actions).expect("compile should pass");
    let start = compiled.fsm.state("start").expect("start");
    assert_eq!(start.body.len(), 3);
    assert_eq!(
        start.transitions,
        vec![
            Transition::Conditional {
                condition: Condition::time(TimeOfDay::Night),
                target: "late".to_string()
            },
            Transition::Fallthrough {
                target: "late".to_string()
            },
        ]
    );
}
