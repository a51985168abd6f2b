//! Team members

use chrono::NaiveDateTime;
use serde::Serialize;

/// Role given to members created without one
pub const DEFAULT_ROLE: &str = "writer";

/// A member of the editorial team
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
    pub role: String,
    /// Inactive members are hidden from default listings but keep their history
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input for creating a member
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub role: String,
    pub is_active: bool,
}

impl NewUser {
    /// Builds a new active member, trimming the name
    pub fn new(name: &str, role: Option<&str>) -> Option<Self> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let role = role
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_ROLE);

        Some(Self {
            name: name.to_string(),
            role: role.to_string(),
            is_active: true,
        })
    }
}
