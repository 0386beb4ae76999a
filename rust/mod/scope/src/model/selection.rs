use std::fmt;

use serde::{Deserialize, Serialize};

/// The value selected at one hierarchy level: everything, or one node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Choice {
    #[default]
    All,
    Id(String),
}

impl Choice {
    pub const ALL_TAG: &'static str = "all";

    pub fn id(id: &str) -> Self {
        Choice::Id(id.to_string())
    }

    /// `None` and empty ids both mean "all".
    pub fn from_option(id: Option<&str>) -> Self {
        match id {
            Some(id) if !id.is_empty() && id != Self::ALL_TAG => Choice::id(id),
            _ => Choice::All,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Choice::All)
    }

    pub fn as_id(&self) -> Option<&str> {
        match self {
            Choice::All => None,
            Choice::Id(id) => Some(id),
        }
    }

    pub fn is(&self, id: &str) -> bool {
        self.as_id() == Some(id)
    }
}

impl From<String> for Choice {
    fn from(s: String) -> Self {
        Choice::from_option(Some(&s))
    }
}

impl From<&str> for Choice {
    fn from(s: &str) -> Self {
        Choice::from_option(Some(s))
    }
}

impl From<Choice> for String {
    fn from(choice: Choice) -> Self {
        match choice {
            Choice::All => Choice::ALL_TAG.to_string(),
            Choice::Id(id) => id,
        }
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_id().unwrap_or(Self::ALL_TAG))
    }
}

/// The four hierarchy levels, top-down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Region,
    Area,
    Church,
    Group,
}

/// Which levels are fixed for the session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LockFlags {
    pub region: bool,
    pub area: bool,
    pub church: bool,
    pub group: bool,
}

impl LockFlags {
    pub fn none() -> Self {
        Self::default()
    }

    /// Locks every level down to and including `level`.
    pub fn down_to(level: Level) -> Self {
        Self {
            region: true,
            area: !matches!(level, Level::Region),
            church: matches!(level, Level::Church | Level::Group),
            group: matches!(level, Level::Group),
        }
    }

    pub fn is_locked(&self, level: Level) -> bool {
        match level {
            Level::Region => self.region,
            Level::Area => self.area,
            Level::Church => self.church,
            Level::Group => self.group,
        }
    }
}

/// Mutable selection state of one session.
///
/// Lock flags and `restricted_groups` are fixed when the session is
/// resolved; only the four choices change afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScopeSelection {
    pub region: Choice,
    pub area: Choice,
    pub church: Choice,
    pub group: Choice,
    pub locks: LockFlags,

    /// Assigned group ids, in assignment order. When set, the group
    /// candidates are these ids, in this order, whatever the church
    /// selection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restricted_groups: Option<Vec<String>>,
}

impl ScopeSelection {
    /// Everything selectable, nothing locked.
    pub fn open() -> Self {
        Self::default()
    }

    pub fn choice(&self, level: Level) -> &Choice {
        match level {
            Level::Region => &self.region,
            Level::Area => &self.area,
            Level::Church => &self.church,
            Level::Group => &self.group,
        }
    }
}
