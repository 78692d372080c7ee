use serde::{Deserialize, Serialize};

use crate::value::FlagValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagScope {
    #[default]
    Local,
    Global,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagOp {
    Add,
    Sub,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Lt,
}

impl CompareOp {
    /// Accepts the symbolic form and the block-editor names.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "==" | "eq" | "same" => Some(Self::Eq),
            "!=" | "ne" | "not_same" => Some(Self::Ne),
            ">" | "gt" | "more_than" => Some(Self::Gt),
            "<" | "lt" | "less_than" => Some(Self::Lt),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Lt => "<",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StagePosition {
    #[default]
    Center,
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub text: String,
    pub target: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    Day,
    Night,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlagCondition {
    pub key: String,
    pub op: CompareOp,
    pub value: FlagValue,
    #[serde(default)]
    pub scope: FlagScope,
}

/// Guard of a conditional block: a flag comparison or the player's time of day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Condition {
    Flag(FlagCondition),
    Time { time_of_day: TimeOfDay },
}

impl Condition {
    pub fn flag(
        key: impl Into<String>,
        op: CompareOp,
        value: impl Into<FlagValue>,
        scope: FlagScope,
    ) -> Self {
        Self::Flag(FlagCondition {
            key: key.into(),
            op,
            value: value.into(),
            scope,
        })
    }

    pub fn time(time_of_day: TimeOfDay) -> Self {
        Self::Time { time_of_day }
    }
}

/// One dialogue instruction appended by a script while it executes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DialogueAction {
    Label {
        name: String,
    },
    Say {
        speaker: Option<String>,
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        voice: Option<String>,
    },
    Choice {
        options: Vec<ChoiceOption>,
    },
    SetFlag {
        key: String,
        value: FlagValue,
        #[serde(default)]
        scope: FlagScope,
    },
    ModifyFlag {
        key: String,
        op: FlagOp,
        amount: f64,
        #[serde(default)]
        scope: FlagScope,
    },
    Show {
        character: String,
        sprite: String,
        #[serde(default)]
        position: StagePosition,
    },
    /// Hides a character or a named sprite.
    Remove {
        target: String,
    },
    PlaySound {
        file: String,
    },
    /// Autosave point; the label must exist like a jump target.
    Checkpoint {
        label: String,
    },
    IdleChats,
    UnlockDialogue {
        events: Vec<String>,
    },
    Conditional {
        condition: Condition,
        actions: Vec<DialogueAction>,
    },
    Jump {
        target: String,
    },
    Finish,
}

impl DialogueAction {
    pub fn label(name: impl Into<String>) -> Self {
        Self::Label { name: name.into() }
    }

    pub fn say(speaker: Option<&str>, text: impl Into<String>) -> Self {
        Self::Say {
            speaker: speaker.map(str::to_string),
            text: text.into(),
            voice: None,
        }
    }

    pub fn jump(target: impl Into<String>) -> Self {
        Self::Jump {
            target: target.into(),
        }
    }

    pub fn choice<T, L>(options: impl IntoIterator<Item = (T, L)>) -> Self
    where
        T: Into<String>,
        L: Into<String>,
    {
        Self::Choice {
            options: options
                .into_iter()
                .map(|(text, target)| ChoiceOption {
                    text: text.into(),
                    target: target.into(),
                })
                .collect(),
        }
    }

    pub fn set_flag(key: impl Into<String>, value: impl Into<FlagValue>) -> Self {
        Self::SetFlag {
            key: key.into(),
            value: value.into(),
            scope: FlagScope::Local,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Label { .. } => "label",
            Self::Say { .. } => "say",
            Self::Choice { .. } => "choice",
            Self::SetFlag { .. } => "set_flag",
            Self::ModifyFlag { .. } => "modify_flag",
            Self::Show { .. } => "show",
            Self::Remove { .. } => "remove",
            Self::PlaySound { .. } => "play_sound",
            Self::Checkpoint { .. } => "checkpoint",
            Self::IdleChats => "idle_chats",
            Self::UnlockDialogue { .. } => "unlock_dialogue",
            Self::Conditional { .. } => "conditional",
            Self::Jump { .. } => "jump",
            Self::Finish => "finish",
        }
    }

    pub fn label_name(&self) -> Option<&str> {
        match self {
            Self::Label { name } => Some(name.as_str()),
            _ => None,
        }
    }

    /// Control never continues past these within a state.
    pub fn is_terminator(&self) -> bool {
        matches!(self, Self::Finish | Self::Jump { .. } | Self::Choice { .. })
    }

    /// Label names this action refers to, nested ones included.
    pub fn targets(&self) -> Vec<&str> {
        match self {
            Self::Jump { target } => vec![target.as_str()],
            Self::Checkpoint { label } => vec![label.as_str()],
            Self::Choice { options } => options.iter().map(|o| o.target.as_str()).collect(),
            Self::Conditional { actions, .. } => {
                actions.iter().flat_map(DialogueAction::targets).collect()
            }
            _ => Vec::new(),
        }
    }
}
