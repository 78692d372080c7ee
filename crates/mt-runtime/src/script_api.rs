use std::cell::RefCell;
use std::rc::Rc;

use rhai::{Array, Dynamic, Engine, FnPtr, NativeCallContext};

use mt_core::{
    CompareOp, Condition, DialogueAction, FlagOp, FlagScope, StagePosition, TimeOfDay,
};

use crate::helpers::rhai_bridge::{
    dynamic_to_choice_options, dynamic_to_flag_value, dynamic_to_number, dynamic_to_string_list,
    runtime_error, ScriptResult,
};

/// Collects the actions one source unit appends. Closures passed to `when`
/// record into a nested frame that becomes the conditional's body.
#[derive(Debug)]
pub(crate) struct ActionRecorder {
    frames: Vec<Vec<DialogueAction>>,
}

impl ActionRecorder {
    pub(crate) fn new() -> Self {
        Self {
            frames: vec![Vec::new()],
        }
    }

    fn record(&mut self, action: DialogueAction) {
        if let Some(frame) = self.frames.last_mut() {
            frame.push(action);
        }
    }

    fn open_nested(&mut self) {
        self.frames.push(Vec::new());
    }

    fn close_nested(&mut self) -> Vec<DialogueAction> {
        if self.frames.len() > 1 {
            self.frames.pop().unwrap_or_default()
        } else {
            Vec::new()
        }
    }

    pub(crate) fn depth(&self) -> usize {
        self.frames.len() - 1
    }

    pub(crate) fn take_actions(&mut self) -> Vec<DialogueAction> {
        self.frames.truncate(1);
        self.frames.first_mut().map(std::mem::take).unwrap_or_default()
    }
}

pub(crate) type SharedRecorder = Rc<RefCell<ActionRecorder>>;

fn record(recorder: &SharedRecorder, action: DialogueAction) {
    recorder.borrow_mut().record(action);
}

fn record_conditional(
    context: &NativeCallContext,
    recorder: &SharedRecorder,
    condition: Condition,
    body: FnPtr,
) -> ScriptResult<()> {
    recorder.borrow_mut().open_nested();
    let outcome = body.call_within_context::<Dynamic>(context, ());
    let actions = recorder.borrow_mut().close_nested();
    outcome?;

    record(recorder, DialogueAction::Conditional { condition, actions });
    Ok(())
}

fn flag_condition(
    scope: FlagScope,
    key: &str,
    op: &str,
    value: Dynamic,
) -> ScriptResult<Condition> {
    let op = CompareOp::parse(op).ok_or_else(|| {
        runtime_error(format!(
            "unknown comparison operator \"{}\" (expected ==, !=, > or <)",
            op
        ))
    })?;
    Ok(Condition::flag(key, op, dynamic_to_flag_value(value)?, scope))
}

fn register_flag_functions(engine: &mut Engine, recorder: &SharedRecorder) {
    for (name, scope) in [("set_flag", FlagScope::Local), ("set_global", FlagScope::Global)] {
        let rec = Rc::clone(recorder);
        engine.register_fn(name, move |key: &str, value: Dynamic| -> ScriptResult<()> {
            let value = dynamic_to_flag_value(value)?;
            record(
                &rec,
                DialogueAction::SetFlag {
                    key: key.to_string(),
                    value,
                    scope,
                },
            );
            Ok(())
        });
    }

    for (name, op, scope) in [
        ("add_flag", FlagOp::Add, FlagScope::Local),
        ("sub_flag", FlagOp::Sub, FlagScope::Local),
        ("add_global", FlagOp::Add, FlagScope::Global),
        ("sub_global", FlagOp::Sub, FlagScope::Global),
    ] {
        let rec = Rc::clone(recorder);
        engine.register_fn(name, move |key: &str, amount: Dynamic| -> ScriptResult<()> {
            let amount = dynamic_to_number(amount)?;
            record(
                &rec,
                DialogueAction::ModifyFlag {
                    key: key.to_string(),
                    op,
                    amount,
                    scope,
                },
            );
            Ok(())
        });
    }

    for (name, scope) in [("when", FlagScope::Local), ("when_global", FlagScope::Global)] {
        let rec = Rc::clone(recorder);
        engine.register_fn(
            name,
            move |context: NativeCallContext,
                  key: &str,
                  op: &str,
                  value: Dynamic,
                  body: FnPtr|
                  -> ScriptResult<()> {
                let condition = flag_condition(scope, key, op, value)?;
                record_conditional(&context, &rec, condition, body)
            },
        );
    }

    for (name, time) in [("when_day", TimeOfDay::Day), ("when_night", TimeOfDay::Night)] {
        let rec = Rc::clone(recorder);
        engine.register_fn(
            name,
            move |context: NativeCallContext, body: FnPtr| -> ScriptResult<()> {
                record_conditional(&context, &rec, Condition::time(time), body)
            },
        );
    }
}

fn register_stage_functions(engine: &mut Engine, recorder: &SharedRecorder) {
    for (name, position) in [
        ("show", StagePosition::Center),
        ("show_left", StagePosition::Left),
        ("show_right", StagePosition::Right),
    ] {
        let rec = Rc::clone(recorder);
        engine.register_fn(name, move |character: &str, sprite: &str| {
            record(
                &rec,
                DialogueAction::Show {
                    character: character.to_string(),
                    sprite: sprite.to_string(),
                    position,
                },
            );
        });
    }

    let rec = Rc::clone(recorder);
    engine.register_fn("remove", move |target: &str| {
        record(
            &rec,
            DialogueAction::Remove {
                target: target.to_string(),
            },
        );
    });

    let rec = Rc::clone(recorder);
    engine.register_fn("play_sound", move |file: &str| {
        record(
            &rec,
            DialogueAction::PlaySound {
                file: file.to_string(),
            },
        );
    });

    let rec = Rc::clone(recorder);
    engine.register_fn("unlock_dialogue", move |events: Dynamic| -> ScriptResult<()> {
        let events = dynamic_to_string_list(events, "dialogue event")?;
        record(&rec, DialogueAction::UnlockDialogue { events });
        Ok(())
    });

    let rec = Rc::clone(recorder);
    engine.register_fn("idle_chats", move || {
        record(&rec, DialogueAction::IdleChats);
    });

    engine.register_fn("character", |id: &str| id.to_string());
}

/// Installs the dialogue functions a source unit may call. Every one of them
/// only appends to `recorder`.
pub(crate) fn register_dialogue_api(engine: &mut Engine, recorder: &SharedRecorder) {
    let rec = Rc::clone(recorder);
    engine.register_fn("label", move |name: &str| {
        record(&rec, DialogueAction::label(name));
    });

    let rec = Rc::clone(recorder);
    engine.register_fn("say", move |text: &str| {
        record(&rec, DialogueAction::say(None, text));
    });

    let rec = Rc::clone(recorder);
    engine.register_fn("say", move |speaker: &str, text: &str| {
        record(&rec, DialogueAction::say(Some(speaker), text));
    });

    let rec = Rc::clone(recorder);
    engine.register_fn("speak", move |speaker: &str, text: &str, voice: &str| {
        record(
            &rec,
            DialogueAction::Say {
                speaker: Some(speaker.to_string()),
                text: text.to_string(),
                voice: Some(voice.to_string()),
            },
        );
    });

    let rec = Rc::clone(recorder);
    engine.register_fn("choice", move |options: Array| -> ScriptResult<()> {
        let options = dynamic_to_choice_options(options)?;
        record(&rec, DialogueAction::Choice { options });
        Ok(())
    });

    let rec = Rc::clone(recorder);
    engine.register_fn("jump", move |target: &str| {
        record(&rec, DialogueAction::jump(target));
    });

    let rec = Rc::clone(recorder);
    engine.register_fn("checkpoint", move |label: &str| {
        record(
            &rec,
            DialogueAction::Checkpoint {
                label: label.to_string(),
            },
        );
    });

    let rec = Rc::clone(recorder);
    engine.register_fn("finish", move || {
        record(&rec, DialogueAction::Finish);
    });

    register_flag_functions(engine, recorder);
    register_stage_functions(engine, recorder);
}
