//! Role-derived capabilities.
//!
//! A role maps to a fixed [`CapabilitySet`]. The mapping is a pure function;
//! the controller consults it through a single authorization gate before
//! every mutating command.
//!
//! | Capability | Editor | Approver | Admin |
//! |---|---|---|---|
//! | [`EditContent`](Capability::EditContent) | yes | | yes |
//! | [`Publish`](Capability::Publish) | | yes | yes |
//! | [`DeleteStory`](Capability::DeleteStory) | | | yes |
//! | [`ManageCategories`](Capability::ManageCategories) | yes | | yes |
//! | [`ReviewSubmissions`](Capability::ReviewSubmissions) | | yes | yes |
//! | [`ManageSite`](Capability::ManageSite) | | | yes |

use serde::{Deserialize, Serialize};

/// Editorial role attached to an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Full access, including accounts and branding.
    Admin,
    /// Writes and files stories.
    Editor,
    /// Reviews submissions and controls publication.
    Approver,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Editor, Role::Approver];
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "ADMIN"),
            Self::Editor => write!(f, "EDITOR"),
            Self::Approver => write!(f, "APPROVER"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Self::Admin),
            "EDITOR" => Ok(Self::Editor),
            "APPROVER" => Ok(Self::Approver),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

/// A class of mutating operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Create stories and edit their content.
    EditContent,
    /// Move a story between Draft and Live.
    Publish,
    /// Permanently delete a story.
    DeleteStory,
    /// Add, rename and delete categories.
    ManageCategories,
    /// Promote or discard submissions.
    ReviewSubmissions,
    /// Manage accounts and branding.
    ManageSite,
}

impl Capability {
    pub const ALL: [Capability; 6] = [
        Capability::EditContent,
        Capability::Publish,
        Capability::DeleteStory,
        Capability::ManageCategories,
        Capability::ReviewSubmissions,
        Capability::ManageSite,
    ];

    const fn bit(self) -> u8 {
        match self {
            Self::EditContent => 1 << 0,
            Self::Publish => 1 << 1,
            Self::DeleteStory => 1 << 2,
            Self::ManageCategories => 1 << 3,
            Self::ReviewSubmissions => 1 << 4,
            Self::ManageSite => 1 << 5,
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::EditContent => "edit stories",
            Self::Publish => "publish stories",
            Self::DeleteStory => "delete stories",
            Self::ManageCategories => "manage categories",
            Self::ReviewSubmissions => "review submissions",
            Self::ManageSite => "manage accounts and branding",
        };
        f.write_str(name)
    }
}

/// The set of capabilities granted to a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CapabilitySet(u8);

impl CapabilitySet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn with(self, capability: Capability) -> Self {
        Self(self.0 | capability.bit())
    }

    pub const fn allows(self, capability: Capability) -> bool {
        self.0 & capability.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Capability> {
        Capability::ALL.into_iter().filter(move |c| self.allows(*c))
    }
}

const EDITOR: CapabilitySet = CapabilitySet::empty()
    .with(Capability::EditContent)
    .with(Capability::ManageCategories);

const APPROVER: CapabilitySet = CapabilitySet::empty()
    .with(Capability::Publish)
    .with(Capability::ReviewSubmissions);

const ADMIN: CapabilitySet = CapabilitySet::empty()
    .with(Capability::EditContent)
    .with(Capability::Publish)
    .with(Capability::DeleteStory)
    .with(Capability::ManageCategories)
    .with(Capability::ReviewSubmissions)
    .with(Capability::ManageSite);

/// Capabilities granted to `role`. No role grants nothing.
pub fn capabilities_for(role: Option<Role>) -> CapabilitySet {
    match role {
        Some(Role::Admin) => ADMIN,
        Some(Role::Editor) => EDITOR,
        Some(Role::Approver) => APPROVER,
        None => CapabilitySet::empty(),
    }
}
