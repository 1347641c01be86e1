//! Chat participant record.

use serde::Deserialize;

/// One connected chat participant, as announced by `join`/`initial` events.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Participant {
    pub name: String,
    #[serde(rename = "isModerator", default)]
    pub is_moderator: bool,
    #[serde(rename = "isCanGiveChatMod", default)]
    pub can_grant_moderator: bool,
    #[serde(rename = "isStaff", default)]
    pub is_staff: bool,
}

impl Participant {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_moderator: false,
            can_grant_moderator: false,
            is_staff: false,
        }
    }
}
