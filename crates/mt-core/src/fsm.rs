use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::action::{Condition, DialogueAction};

/// State id used when the action list does not open with a label.
pub const IMPLICIT_START_STATE: &str = "__start__";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transition {
    Jump { target: String },
    Choice { text: String, target: String },
    Conditional { condition: Condition, target: String },
    ConditionalFinish { condition: Condition },
    Fallthrough { target: String },
    Finish,
    End,
}

impl Transition {
    pub fn target(&self) -> Option<&str> {
        match self {
            Self::Jump { target }
            | Self::Choice { target, .. }
            | Self::Conditional { target, .. }
            | Self::Fallthrough { target } => Some(target.as_str()),
            Self::ConditionalFinish { .. } | Self::Finish | Self::End => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledState {
    pub id: String,
    pub body: Vec<DialogueAction>,
    pub transitions: Vec<Transition>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StateFields<B, T> {
    body: B,
    transitions: T,
}

/// Compiled dialogue document. States keep label declaration order, both in
/// memory and when serialized as a JSON object keyed by state id.
#[derive(Debug, Clone, PartialEq)]
pub struct Fsm {
    pub initial: String,
    pub states: Vec<CompiledState>,
}

impl Fsm {
    pub fn state(&self, id: &str) -> Option<&CompiledState> {
        self.states.iter().find(|state| state.id == id)
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn state_ids(&self) -> impl Iterator<Item = &str> {
        self.states.iter().map(|state| state.id.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        let mut out = serde_json::to_string_pretty(self)?;
        out.push('\n');
        Ok(out)
    }
}

struct OrderedStates<'a>(&'a [CompiledState]);

impl Serialize for OrderedStates<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for state in self.0 {
            map.serialize_entry(
                &state.id,
                &StateFields {
                    body: &state.body,
                    transitions: &state.transitions,
                },
            )?;
        }
        map.end()
    }
}

impl Serialize for Fsm {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("initial", &self.initial)?;
        map.serialize_entry("states", &OrderedStates(&self.states))?;
        map.end()
    }
}

struct StateList(Vec<CompiledState>);

struct StateListVisitor;

impl<'de> Visitor<'de> for StateListVisitor {
    type Value = StateList;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of state id to state")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut states = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((id, fields)) =
            access.next_entry::<String, StateFields<Vec<DialogueAction>, Vec<Transition>>>()?
        {
            states.push(CompiledState {
                id,
                body: fields.body,
                transitions: fields.transitions,
            });
        }
        Ok(StateList(states))
    }
}

impl<'de> Deserialize<'de> for StateList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(StateListVisitor)
    }
}

#[derive(Deserialize)]
struct RawFsm {
    initial: String,
    states: StateList,
}

impl<'de> Deserialize<'de> for Fsm {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawFsm::deserialize(deserializer)?;
        Ok(Self {
            initial: raw.initial,
            states: raw.states.0,
        })
    }
}
