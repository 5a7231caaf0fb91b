use serde::{Deserialize, Serialize};

/// Permission token carried by an ACL group-permission entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    Create,
    Read,
    Update,
    Delete,
    Order,
}

impl Permission {
    pub fn as_str(self) -> &'static str {
        match self {
            Permission::Create => "create",
            Permission::Read => "read",
            Permission::Update => "update",
            Permission::Delete => "delete",
            Permission::Order => "order",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Permission {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "create" => Ok(Permission::Create),
            "read" => Ok(Permission::Read),
            "update" => Ok(Permission::Update),
            "delete" => Ok(Permission::Delete),
            "order" => Ok(Permission::Order),
            _ => Err(()),
        }
    }
}

/// Render permissions as a comma separated list for diagnostics.
pub fn join_permissions<'a>(permissions: impl IntoIterator<Item = &'a Permission>) -> String {
    permissions
        .into_iter()
        .map(|permission| permission.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
