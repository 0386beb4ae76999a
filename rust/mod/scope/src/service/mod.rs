//! Entry points the surrounding application calls.
//!
//! [`ScopeService`] loads inputs through a [`Directory`], then hands them to
//! the pure engine. Only directory failures surface as errors; unknown tags
//! and inconsistent data resolve to denials or fallbacks.

mod cache;

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::ScopeConfig;
use crate::error::ScopeError;
use crate::hierarchy::HierarchyGraph;
use crate::model::{Action, Grants, Module, RoleSet};
use crate::permission::PermissionMatrix;
use crate::session::ScopeSession;
use crate::store::Directory;

pub use cache::HierarchyCache;

pub struct ScopeService<D: Directory> {
    directory: D,
    config: ScopeConfig,
    hierarchy: HierarchyCache,
}

impl<D: Directory> ScopeService<D> {
    pub fn new(directory: D, config: ScopeConfig) -> Self {
        let hierarchy = HierarchyCache::new(config.hierarchy_cache_ttl);
        Self {
            directory,
            config,
            hierarchy,
        }
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    pub fn config(&self) -> &ScopeConfig {
        &self.config
    }

    /// Current hierarchy graph, loading it if the cached one expired.
    pub fn hierarchy(&self) -> Result<Arc<HierarchyGraph>, ScopeError> {
        if let Some(graph) = self.hierarchy.get() {
            return Ok(graph);
        }
        let snapshot = self.directory.load_hierarchy()?;
        info!(
            regions = snapshot.regions.len(),
            areas = snapshot.areas.len(),
            churches = snapshot.churches.len(),
            groups = snapshot.groups.len(),
            "hierarchy loaded"
        );
        let graph = Arc::new(HierarchyGraph::from_snapshot(snapshot));
        self.hierarchy.set(Arc::clone(&graph));
        Ok(graph)
    }

    /// Drop the cached hierarchy so the next call reloads it.
    pub fn invalidate(&self) {
        self.hierarchy.invalidate();
    }

    pub fn roles(&self, actor_id: &str) -> Result<RoleSet, ScopeError> {
        let roles = self.directory.load_roles(actor_id)?;
        for tag in roles.unknown_tags() {
            warn!(actor = actor_id, role = tag, "unknown role tag");
        }
        Ok(roles)
    }

    /// Resolve a fresh session for an actor.
    pub fn resolve_scope(&self, actor_id: &str) -> Result<ScopeSession, ScopeError> {
        let roles = self.roles(actor_id)?;
        let profile = self.directory.load_profile(actor_id)?;
        let assignments = self.directory.load_group_assignments(actor_id)?;
        let graph = self.hierarchy()?;

        let session = ScopeSession::start(graph, actor_id, &roles, &profile, &assignments);
        debug!(actor = actor_id, rule = ?session.rule(), "scope session started");
        Ok(session)
    }

    /// Permission matrix restricted to the rows of `roles`.
    pub fn permissions(&self, roles: &RoleSet) -> Result<PermissionMatrix, ScopeError> {
        let matrix = PermissionMatrix::new(self.directory.load_permission_rows(roles)?);
        debug!(rows = matrix.len(), "permission rows loaded");
        Ok(matrix)
    }

    /// Whether `actor_id` may perform `action` on `module`.
    ///
    /// Tags are parsed here. An unknown module or action denies, except for
    /// `admin`, which is allowed without looking at the matrix.
    pub fn can(&self, actor_id: &str, module: &str, action: &str) -> Result<bool, ScopeError> {
        let roles = self.roles(actor_id)?;
        if roles.is_admin() {
            return Ok(true);
        }
        let action: Action = match action.parse() {
            Ok(action) => action,
            Err(e) => {
                debug!(actor = actor_id, error = %e, "permission check denied");
                return Ok(false);
            }
        };
        let module = Module::parse(module);
        if !module.is_known() {
            debug!(actor = actor_id, %module, "unknown module, permission denied");
            return Ok(false);
        }
        Ok(self.permissions(&roles)?.can(&roles, &module, action))
    }

    /// [`can`](Self::can) over a `"module:action"` string.
    pub fn check(&self, actor_id: &str, permission: &str) -> Result<bool, ScopeError> {
        match permission.split_once(':') {
            Some((module, action)) => self.can(actor_id, module, action),
            None => {
                let roles = self.roles(actor_id)?;
                Ok(roles.is_admin())
            }
        }
    }

    /// Effective flags for one module.
    pub fn grants(&self, actor_id: &str, module: &str) -> Result<Grants, ScopeError> {
        let roles = self.roles(actor_id)?;
        let module = Module::parse(module);
        Ok(self.permissions(&roles)?.grants(&roles, &module))
    }
}
