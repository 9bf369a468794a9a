//! Permission data models

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Action level a grant authorizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Action {
    /// View and download
    Read,
    /// Upload, create folders and delete
    Write,
    /// Manage grants on the resource
    Admin,
}

impl Action {
    /// All action levels, weakest first
    pub const ALL: [Action; 3] = [Action::Read, Action::Write, Action::Admin];

    /// Parse the wire form of an action. Anything other than the three
    /// known names is rejected.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Read" => Some(Action::Read),
            "Write" => Some(Action::Write),
            "Admin" => Some(Action::Admin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Read => "Read",
            Action::Write => "Write",
            Action::Admin => "Admin",
        }
    }

    /// Check whether a grant at level `granted` satisfies a request for `self`
    ///
    /// Read requests accept any grant, Write requests accept Write or Admin,
    /// Admin requests accept only Admin.
    pub fn is_satisfied_by(self, granted: Action) -> bool {
        match (self, granted) {
            (Action::Read, _) => true,
            (Action::Write, Action::Write | Action::Admin) => true,
            (Action::Admin, Action::Admin) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Approval state of a grant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrantState {
    Approved,
    Pending,
    Rejected,
    #[serde(other)]
    Unknown,
}

impl Default for GrantState {
    fn default() -> Self {
        GrantState::Pending
    }
}

/// Composite user identity, `owner/name`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId {
    owner: String,
    name: String,
}

impl UserId {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Display name, shown on per-user grant tags
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for UserId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok(Self::new(owner, name))
            }
            _ => Err(Error::InvalidUserId(s.to_string())),
        }
    }
}

impl TryFrom<String> for UserId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<UserId> for String {
    fn from(user: UserId) -> Self {
        user.to_string()
    }
}

/// A permission record authorizing users to act on a resource
///
/// Only the first entry of `resources`, `domains` and `actions` is
/// consulted. Actions are kept as raw strings so that records with unknown
/// action names still load; such records never match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionGrant {
    pub owner: String,
    pub name: String,
    #[serde(default)]
    pub resources: Vec<String>,
    #[serde(default)]
    pub domains: Vec<String>,
    /// Authorized users as `owner/name` strings
    #[serde(default)]
    pub users: Vec<String>,
    #[serde(default)]
    pub actions: Vec<String>,
    #[serde(default)]
    pub state: GrantState,
    #[serde(default)]
    pub is_enabled: bool,
}

impl PermissionGrant {
    /// Create an approved, enabled grant for a single resource and action
    pub fn new(
        owner: impl Into<String>,
        name: impl Into<String>,
        domain: impl Into<String>,
        resource: impl Into<String>,
        action: Action,
    ) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            resources: vec![resource.into()],
            domains: vec![domain.into()],
            users: Vec::new(),
            actions: vec![action.as_str().to_string()],
            state: GrantState::Approved,
            is_enabled: true,
        }
    }

    /// Add an authorized user
    pub fn with_user(mut self, user: &UserId) -> Self {
        self.users.push(user.to_string());
        self
    }

    pub fn with_state(mut self, state: GrantState) -> Self {
        self.state = state;
        self
    }

    pub fn with_enabled(mut self, is_enabled: bool) -> Self {
        self.is_enabled = is_enabled;
        self
    }

    /// Record identity, `owner/name`
    pub fn id(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    pub fn primary_resource(&self) -> Option<&str> {
        self.resources.first().map(String::as_str)
    }

    pub fn primary_domain(&self) -> Option<&str> {
        self.domains.first().map(String::as_str)
    }

    /// First action, or `None` when missing or not a known action name
    pub fn primary_action(&self) -> Option<Action> {
        self.actions.first().and_then(|a| Action::parse(a))
    }

    /// Approved and enabled
    pub fn is_active(&self) -> bool {
        self.state == GrantState::Approved && self.is_enabled
    }

    pub fn includes_user(&self, user: &UserId) -> bool {
        let id = user.to_string();
        self.users.iter().any(|u| *u == id)
    }

    /// Check whether this grant, attached to `key`, lets `user` perform `action`
    pub fn authorizes(&self, key: &str, action: Action, user: &UserId) -> bool {
        self.is_active()
            && self.primary_resource() == Some(key)
            && self.includes_user(user)
            && self
                .primary_action()
                .map_or(false, |granted| action.is_satisfied_by(granted))
    }
}
