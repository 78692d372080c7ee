use mt_core::DialogueAction;

/// Append-only view of a builder; the only channel a source unit writes through.
pub trait ActionSink {
    fn append(&mut self, action: DialogueAction);

    fn extend(&mut self, actions: Vec<DialogueAction>) {
        for action in actions {
            self.append(action);
        }
    }
}

/// Ordered accumulator for the actions of one script group.
///
/// One builder is created per compile request and reset before every group,
/// so nothing appended for one group can reach the next.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DialogueBuilder {
    actions: Vec<DialogueAction>,
}

impl DialogueBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.actions.clear();
    }

    /// Current sequence. Does not clear the builder.
    pub fn flush(&self) -> &[DialogueAction] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl ActionSink for DialogueBuilder {
    fn append(&mut self, action: DialogueAction) {
        self.actions.push(action);
    }

    fn extend(&mut self, actions: Vec<DialogueAction>) {
        self.actions.extend(actions);
    }
}
