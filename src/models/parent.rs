use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Wire representation of a parent.
///
/// `minion_names` is derived from the minions that reference this parent.
/// It is reported on every read and ignored on create and update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parent {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub minion_names: BTreeSet<String>,
}

impl Parent {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
