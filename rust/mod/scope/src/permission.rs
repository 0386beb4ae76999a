//! Role → (module, action) permission matrix.
//!
//! `admin` is a universal override. For every other role set the matrix
//! ORs the rows of all held roles and denies when no row matches.

use std::collections::HashMap;

use tracing::warn;

use crate::model::{Action, Grants, Module, Permission, PermissionRow, Role, RoleSet};

#[derive(Debug, Clone, Default)]
pub struct PermissionMatrix {
    rows: HashMap<(Role, Module), Vec<PermissionRow>>,
}

impl PermissionMatrix {
    /// Build the matrix from raw rows. Rows tagged with an unknown role or
    /// module can never match a valid check and are dropped here.
    pub fn new(rows: impl IntoIterator<Item = PermissionRow>) -> Self {
        let mut by_key: HashMap<(Role, Module), Vec<PermissionRow>> = HashMap::new();
        for row in rows {
            if !row.role.is_known() || !row.module.is_known() {
                warn!(role = %row.role, module = %row.module, "ignoring permission row with unknown tag");
                continue;
            }
            by_key
                .entry((row.role.clone(), row.module.clone()))
                .or_default()
                .push(row);
        }
        Self { rows: by_key }
    }

    pub fn len(&self) -> usize {
        self.rows.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn matching<'a>(
        &'a self,
        roles: &'a RoleSet,
        module: &'a Module,
    ) -> impl Iterator<Item = &'a PermissionRow> + 'a {
        roles
            .iter()
            .filter_map(move |role| self.rows.get(&(role.clone(), module.clone())))
            .flatten()
    }

    pub fn can(&self, roles: &RoleSet, module: &Module, action: Action) -> bool {
        if roles.is_admin() {
            return true;
        }
        self.matching(roles, module).any(|row| row.allows(action))
    }

    pub fn check(&self, roles: &RoleSet, permission: &Permission) -> bool {
        self.can(roles, &permission.module, permission.action)
    }

    /// Effective flags on `module` for the whole role set.
    pub fn grants(&self, roles: &RoleSet, module: &Module) -> Grants {
        if roles.is_admin() {
            return Grants::all();
        }
        let mut grants = Grants::default();
        for row in self.matching(roles, module) {
            grants.merge(row);
        }
        grants
    }
}
