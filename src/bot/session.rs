use rust_decimal::Decimal;
use std::collections::HashMap;

/// The step a chat is at inside one of the multi-turn flows, together with
/// whatever it has collected so far. A chat with no entry is idle.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Flow {
    AddFriend,
    AddAmount { friend: String },
    AddDesc { friend: String, amount: Decimal },
    CheckFriend,
    ClearFriend,
    ClearConfirm { friend: String },
    DeleteId,
    DeleteConfirm { id: i64 },
    DefaultFriend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FlowKind {
    Add,
    Check,
    Clear,
    Delete,
    Default,
}

impl Flow {
    pub(crate) fn kind(&self) -> FlowKind {
        match self {
            Self::AddFriend | Self::AddAmount { .. } | Self::AddDesc { .. } => FlowKind::Add,
            Self::CheckFriend => FlowKind::Check,
            Self::ClearFriend | Self::ClearConfirm { .. } => FlowKind::Clear,
            Self::DeleteId | Self::DeleteConfirm { .. } => FlowKind::Delete,
            Self::DefaultFriend => FlowKind::Default,
        }
    }
}

impl std::fmt::Display for FlowKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Add => write!(f, "adding a record"),
            Self::Check => write!(f, "checking records"),
            Self::Clear => write!(f, "clearing records"),
            Self::Delete => write!(f, "deleting a record"),
            Self::Default => write!(f, "setting your default friend"),
        }
    }
}

/// In-progress conversations keyed by chat id. Entries are only added when
/// a flow starts or advances and removed when it finishes or is cancelled;
/// nothing expires on its own.
#[derive(Debug, Default)]
pub(crate) struct Sessions {
    by_chat: HashMap<i64, Flow>,
}

impl Sessions {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn get(&self, chat: i64) -> Option<&Flow> {
        self.by_chat.get(&chat)
    }

    /// Enter (or stay in) `flow` for `chat`, replacing any previous step.
    pub(crate) fn set(&mut self, chat: i64, flow: Flow) {
        tracing::debug!(chat, state = ?flow, "session state");
        self.by_chat.insert(chat, flow);
    }

    /// Remove and return the chat's current step, leaving it idle.
    pub(crate) fn take(&mut self, chat: i64) -> Option<Flow> {
        let flow = self.by_chat.remove(&chat);
        if flow.is_some() {
            tracing::debug!(chat, "session idle");
        }
        flow
    }

    pub(crate) fn len(&self) -> usize {
        self.by_chat.len()
    }
}
