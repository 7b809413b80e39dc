/// What the transport should do with the on-screen keyboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Keyboard {
    /// Leave whatever the user currently sees.
    Keep,
    Remove,
    /// One-time keyboard with the given button rows.
    Options {
        rows: Vec<Vec<String>>,
        placeholder: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Reply {
    pub(crate) text: String,
    pub(crate) keyboard: Keyboard,
}

impl Reply {
    pub(crate) fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: Keyboard::Keep,
        }
    }

    pub(crate) fn removing_keyboard(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: Keyboard::Remove,
        }
    }

    pub(crate) fn with_options(
        text: impl Into<String>,
        rows: Vec<Vec<String>>,
        placeholder: Option<&str>,
    ) -> Self {
        Self {
            text: text.into(),
            keyboard: Keyboard::Options {
                rows,
                placeholder: placeholder.map(str::to_string),
            },
        }
    }

    /// Button labels in display order, empty unless the reply carries options.
    #[cfg(test)]
    pub(crate) fn buttons(&self) -> Vec<&str> {
        match &self.keyboard {
            Keyboard::Options { rows, .. } => rows.iter().flatten().map(String::as_str).collect(),
            Keyboard::Keep | Keyboard::Remove => Vec::new(),
        }
    }
}
