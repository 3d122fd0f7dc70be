/// Shown in place of an empty heading.
pub const HEADING_PLACEHOLDER: &str = "Enter note heading...";

/// A note as edited: the first line is the heading, the rest is the body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteDraft {
    pub heading: String,
    pub body: String,
}

impl NoteDraft {
    pub fn new(heading: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            body: body.into(),
        }
    }

    pub fn from_text(text: &str) -> Self {
        match text.split_once('\n') {
            Some((heading, body)) => Self::new(heading, body),
            None => Self::new(text, ""),
        }
    }

    pub fn to_text(&self) -> String {
        format!("{}\n{}", self.heading, self.body)
    }

    pub fn display_heading(&self) -> &str {
        if self.heading.is_empty() {
            HEADING_PLACEHOLDER
        } else {
            &self.heading
        }
    }
}
