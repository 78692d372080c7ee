use rhai::{Array, Dynamic, EvalAltResult, ImmutableString, Map, Position, FLOAT, INT};

use mt_core::{ChoiceOption, FlagValue};

pub(crate) type ScriptResult<T> = Result<T, Box<EvalAltResult>>;

pub(crate) fn runtime_error(message: impl Into<String>) -> Box<EvalAltResult> {
    Box::new(EvalAltResult::ErrorRuntime(
        Dynamic::from(message.into()),
        Position::NONE,
    ))
}

pub(crate) fn dynamic_to_flag_value(value: Dynamic) -> ScriptResult<FlagValue> {
    if value.is::<bool>() {
        return Ok(FlagValue::Bool(value.cast::<bool>()));
    }
    if value.is::<INT>() {
        return Ok(FlagValue::Number(value.cast::<INT>() as f64));
    }
    if value.is::<FLOAT>() {
        return Ok(FlagValue::Number(value.cast::<FLOAT>()));
    }
    if value.is::<ImmutableString>() {
        return Ok(FlagValue::String(
            value.cast::<ImmutableString>().to_string(),
        ));
    }
    Err(runtime_error(format!(
        "flag values must be bool, number or string, got {}",
        value.type_name()
    )))
}

pub(crate) fn dynamic_to_number(value: Dynamic) -> ScriptResult<f64> {
    match dynamic_to_flag_value(value)? {
        FlagValue::Number(number) => Ok(number),
        other => Err(runtime_error(format!(
            "expected a number, got {}",
            other.type_name()
        ))),
    }
}

fn dynamic_to_text(value: Dynamic, what: &str) -> ScriptResult<String> {
    if value.is::<ImmutableString>() {
        return Ok(value.cast::<ImmutableString>().to_string());
    }
    Err(runtime_error(format!(
        "{} must be a string, got {}",
        what,
        value.type_name()
    )))
}

pub(crate) fn dynamic_to_string_list(value: Dynamic, what: &str) -> ScriptResult<Vec<String>> {
    if value.is::<Array>() {
        return value
            .cast::<Array>()
            .into_iter()
            .map(|item| dynamic_to_text(item, what))
            .collect();
    }
    Ok(vec![dynamic_to_text(value, what)?])
}

/// Reads `[text, target]` pairs or `#{text, target}` maps.
pub(crate) fn dynamic_to_choice_options(options: Array) -> ScriptResult<Vec<ChoiceOption>> {
    let mut out = Vec::with_capacity(options.len());
    for (index, option) in options.into_iter().enumerate() {
        if option.is::<Array>() {
            let mut pair = option.cast::<Array>();
            if pair.len() != 2 {
                return Err(runtime_error(format!(
                    "choice option #{} must be [text, target], got {} element(s)",
                    index,
                    pair.len()
                )));
            }
            let target = dynamic_to_text(pair.remove(1), "choice target")?;
            let text = dynamic_to_text(pair.remove(0), "choice text")?;
            out.push(ChoiceOption { text, target });
            continue;
        }
        if option.is::<Map>() {
            let mut map = option.cast::<Map>();
            let (Some(text), Some(target)) = (map.remove("text"), map.remove("target")) else {
                return Err(runtime_error(format!(
                    "choice option #{} needs both \"text\" and \"target\"",
                    index
                )));
            };
            out.push(ChoiceOption {
                text: dynamic_to_text(text, "choice text")?,
                target: dynamic_to_text(target, "choice target")?,
            });
            continue;
        }
        return Err(runtime_error(format!(
            "choice option #{} must be an array or a map, got {}",
            index,
            option.type_name()
        )));
    }
    Ok(out)
}
