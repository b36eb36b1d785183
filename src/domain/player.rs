use serde::{Deserialize, Serialize};
use std::fmt;

use super::normalize_player_name;

/// A lowercased player name. This is the player's identity within a room —
/// there is no separate connection UUID in this system's identity model.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PlayerName(String);

impl PlayerName {
    #[must_use]
    pub fn new(raw: &str) -> Self {
        Self(normalize_player_name(raw))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl<'de> Deserialize<'de> for PlayerName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::new(&raw))
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerName {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for PlayerName {
    fn from(raw: String) -> Self {
        Self::new(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_whitespace() {
        assert_eq!(PlayerName::new(" Alice ").as_str(), "alice");
        assert_eq!(PlayerName::new("BOB"), PlayerName::new("bob"));
    }
}
