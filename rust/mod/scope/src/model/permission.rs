use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ScopeError;
use crate::model::Role;

/// A functional area subject to CRUD-style permission checks.
///
/// Portuguese tags are canonical (they are what the permission table
/// stores); English aliases are accepted when parsing.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Module {
    Visitantes,
    Igrejas,
    Regioes,
    Areas,
    Grupos,
    Usuarios,
    Importacao,
    Interacoes,
    Tarefas,
    Frequencia,
    Unknown(String),
}

impl Module {
    pub const ALL: [Module; 10] = [
        Module::Visitantes,
        Module::Igrejas,
        Module::Regioes,
        Module::Areas,
        Module::Grupos,
        Module::Usuarios,
        Module::Importacao,
        Module::Interacoes,
        Module::Tarefas,
        Module::Frequencia,
    ];

    pub fn parse(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "visitantes" | "visitors" => Module::Visitantes,
            "igrejas" | "churches" => Module::Igrejas,
            "regioes" | "regions" => Module::Regioes,
            "areas" => Module::Areas,
            "grupos" | "groups" => Module::Grupos,
            "usuarios" | "users" => Module::Usuarios,
            "importacao" | "import" => Module::Importacao,
            "interacoes" | "interactions" => Module::Interacoes,
            "tarefas" | "tasks" => Module::Tarefas,
            "frequencia" | "attendance" => Module::Frequencia,
            _ => Module::Unknown(tag.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Module::Visitantes => "visitantes",
            Module::Igrejas => "igrejas",
            Module::Regioes => "regioes",
            Module::Areas => "areas",
            Module::Grupos => "grupos",
            Module::Usuarios => "usuarios",
            Module::Importacao => "importacao",
            Module::Interacoes => "interacoes",
            Module::Tarefas => "tarefas",
            Module::Frequencia => "frequencia",
            Module::Unknown(tag) => tag,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Module::Unknown(_))
    }
}

impl From<String> for Module {
    fn from(tag: String) -> Self {
        Module::parse(&tag)
    }
}

impl From<Module> for String {
    fn from(module: Module) -> Self {
        module.as_str().to_string()
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    View,
    Create,
    Edit,
    Delete,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::View, Action::Create, Action::Edit, Action::Delete];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::View => "view",
            Action::Create => "create",
            Action::Edit => "edit",
            Action::Delete => "delete",
        }
    }
}

impl FromStr for Action {
    type Err = ScopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "view" | "read" => Ok(Action::View),
            "create" => Ok(Action::Create),
            "edit" | "update" => Ok(Action::Edit),
            "delete" => Ok(Action::Delete),
            other => Err(ScopeError::Validation(format!("unknown action '{}'", other))),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `module:action` pair, e.g. `"visitantes:edit"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Permission {
    pub module: Module,
    pub action: Action,
}

impl Permission {
    pub fn new(module: Module, action: Action) -> Self {
        Self { module, action }
    }
}

impl FromStr for Permission {
    type Err = ScopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (module, action) = s
            .split_once(':')
            .ok_or_else(|| ScopeError::Validation(format!("permission '{}' is not module:action", s)))?;
        Ok(Self {
            module: Module::parse(module),
            action: action.parse()?,
        })
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.module, self.action)
    }
}

/// One row of the permission table: what a role may do on a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRow {
    pub role: Role,
    pub module: Module,
    #[serde(default)]
    pub can_view: bool,
    #[serde(default)]
    pub can_create: bool,
    #[serde(default)]
    pub can_edit: bool,
    #[serde(default)]
    pub can_delete: bool,
}

impl PermissionRow {
    pub fn allows(&self, action: Action) -> bool {
        match action {
            Action::View => self.can_view,
            Action::Create => self.can_create,
            Action::Edit => self.can_edit,
            Action::Delete => self.can_delete,
        }
    }
}

/// Effective flags for one module after merging every held role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Grants {
    pub view: bool,
    pub create: bool,
    pub edit: bool,
    pub delete: bool,
}

impl Grants {
    pub fn all() -> Self {
        Self {
            view: true,
            create: true,
            edit: true,
            delete: true,
        }
    }

    pub(crate) fn merge(&mut self, row: &PermissionRow) {
        self.view |= row.can_view;
        self.create |= row.can_create;
        self.edit |= row.can_edit;
        self.delete |= row.can_delete;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_aliases_resolve_to_canonical_modules() {
        assert_eq!(Module::parse("visitors"), Module::Visitantes);
        assert_eq!(Module::parse("attendance").as_str(), "frequencia");
        assert_eq!(Module::parse("reports"), Module::Unknown("reports".into()));
    }

    #[test]
    fn permission_string_parses() {
        let perm: Permission = "visitors:edit".parse().unwrap();
        assert_eq!(perm, Permission::new(Module::Visitantes, Action::Edit));
        assert_eq!(perm.to_string(), "visitantes:edit");

        assert!("visitantes".parse::<Permission>().is_err());
        assert!("visitantes:approve".parse::<Permission>().is_err());
    }

    #[test]
    fn row_defaults_missing_flags_to_false() {
        let row: PermissionRow =
            serde_json::from_str(r#"{"role":"pastor","module":"visitantes","can_view":true}"#)
                .unwrap();
        assert_eq!(row.role, Role::Pastor);
        assert!(row.allows(Action::View));
        assert!(!row.allows(Action::Delete));
    }
}
