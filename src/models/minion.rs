use serde::{Deserialize, Serialize};

/// Wire representation of a minion.
///
/// Every field is optional so the same shape serves creates and partial
/// updates: an absent field on update leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Minion {
    pub name: Option<String>,
    pub description: Option<String>,
    pub contents: Option<Vec<String>>,
    /// Name (not id) of the owning parent.
    pub parent_name: Option<String>,
}

impl Minion {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_parent(mut self, parent_name: impl Into<String>) -> Self {
        self.parent_name = Some(parent_name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_contents<I, S>(mut self, contents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.contents = Some(contents.into_iter().map(Into::into).collect());
        self
    }
}
