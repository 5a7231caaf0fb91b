//! Group model definitions.
//!
//! # Purpose
//! Defines the group record validated by this crate and the membership helpers
//! the store relies on for idempotent member edits.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_guid: Option<String>,
    #[serde(default)]
    pub members: Vec<String>,
}

impl Group {
    /// Append members not already present, keeping first-seen order.
    ///
    /// Returns the number of members actually added.
    pub fn add_members<I, S>(&mut self, members: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let before = self.members.len();
        for member in members {
            let member = member.into();
            if !self.members.contains(&member) {
                self.members.push(member);
            }
        }
        self.members.len() - before
    }

    /// Remove every listed member; unknown members are ignored.
    ///
    /// Returns the number of members actually removed.
    pub fn remove_members<I, S>(&mut self, members: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let before = self.members.len();
        let removed: Vec<S> = members.into_iter().collect();
        self.members
            .retain(|member| !removed.iter().any(|gone| gone.as_ref() == member));
        before - self.members.len()
    }

    /// Collapse duplicate members in place.
    pub fn dedupe_members(&mut self) {
        let members = std::mem::take(&mut self.members);
        self.add_members(members);
    }

    pub fn has_member(&self, user: &str) -> bool {
        self.members.iter().any(|member| member == user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group() -> Group {
        Group {
            name: "Administrators".to_string(),
            provider_id: None,
            description: "System administrators".to_string(),
            legacy_guid: None,
            members: vec!["alice".to_string()],
        }
    }

    #[test]
    fn add_members_is_idempotent() {
        let mut group = group();
        assert_eq!(group.add_members(["bob", "alice", "bob"]), 1);
        assert_eq!(group.members, vec!["alice", "bob"]);
        assert_eq!(group.add_members(["bob"]), 0);
    }

    #[test]
    fn remove_members_ignores_unknown() {
        let mut group = group();
        group.add_members(["bob"]);
        assert_eq!(group.remove_members(["carol", "alice"]), 1);
        assert_eq!(group.members, vec!["bob"]);
        assert_eq!(group.remove_members(["alice"]), 0);
    }

    #[test]
    fn dedupe_preserves_first_seen_order() {
        let mut group = group();
        group.members = vec![
            "carol".to_string(),
            "alice".to_string(),
            "carol".to_string(),
        ];
        group.dedupe_members();
        assert_eq!(group.members, vec!["carol", "alice"]);
        assert!(group.has_member("alice"));
        assert!(!group.has_member("bob"));
    }
}
