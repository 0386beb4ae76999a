use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A role tag from the fixed vocabulary.
///
/// Parsing never fails: unrecognized tags are kept as `Unknown` so the
/// caller can decide how to treat them (the permission matrix ignores them,
/// the lock resolver treats them as plain users).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    PastorGeral,
    PastorRegiao,
    PastorCoordenador,
    Pastor,
    /// Diaconal tier. The only tier that can own a group.
    Diacono,
    Obreiro,
    User,
    Unknown(String),
}

impl Role {
    pub fn parse(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "admin" => Role::Admin,
            "pastor_geral" => Role::PastorGeral,
            "pastor_regiao" => Role::PastorRegiao,
            "pastor_coordenador" => Role::PastorCoordenador,
            "pastor" => Role::Pastor,
            "diacono" | "diaconal" | "group_leader" | "lider" => Role::Diacono,
            "obreiro" | "worker" => Role::Obreiro,
            "user" => Role::User,
            other => Role::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => "admin",
            Role::PastorGeral => "pastor_geral",
            Role::PastorRegiao => "pastor_regiao",
            Role::PastorCoordenador => "pastor_coordenador",
            Role::Pastor => "pastor",
            Role::Diacono => "diacono",
            Role::Obreiro => "obreiro",
            Role::User => "user",
            Role::Unknown(tag) => tag,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Role::Unknown(_))
    }

    /// Roles whose scope is bounded by their church and group memberships.
    pub fn is_member_tier(&self) -> bool {
        matches!(
            self,
            Role::Diacono | Role::Obreiro | Role::User | Role::Unknown(_)
        )
    }
}

impl From<String> for Role {
    fn from(tag: String) -> Self {
        Role::parse(&tag)
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The set of roles an actor holds. Usually a singleton.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleSet(BTreeSet<Role>);

impl RoleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        tags.into_iter().map(|t| Role::parse(t.as_ref())).collect()
    }

    pub fn contains(&self, role: &Role) -> bool {
        self.0.contains(role)
    }

    pub fn is_admin(&self) -> bool {
        self.0.contains(&Role::Admin)
    }

    pub fn any(&self, pred: impl Fn(&Role) -> bool) -> bool {
        self.0.iter().any(pred)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Role> {
        self.0.iter()
    }

    pub fn unknown_tags(&self) -> impl Iterator<Item = &str> {
        self.0.iter().filter_map(|r| match r {
            Role::Unknown(tag) => Some(tag.as_str()),
            _ => None,
        })
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[Role; N]> for RoleSet {
    fn from(roles: [Role; N]) -> Self {
        roles.into_iter().collect()
    }
}
