//! Scope module: hierarchy scope locking, cascading selection and
//! role-based module permissions.
//!
//! # Components
//!
//! - **HierarchyGraph**: indexed Region → Area → Church → Group tree
//! - **PermissionMatrix**: role × module × action grants, admin override
//! - **ScopeLockResolver**: role precedence table fixing locked levels
//! - **CascadeFilter**: candidate lists per level and cascading resets
//! - **ScopeSession**: one actor's mutable selection
//! - **ScopeService**: `resolve_scope` / `can` entry points over a [`store::Directory`]
//!
//! # Usage
//!
//! ```ignore
//! use scope::{ScopeConfig, ScopeService, store::MemoryDirectory};
//!
//! let service = ScopeService::new(directory, ScopeConfig::default());
//! let mut session = service.resolve_scope("u1")?;
//! session.set_church("C9");
//! let allowed = service.can("u1", "visitantes", "edit")?;
//! ```

pub mod cascade;
pub mod config;
pub mod error;
pub mod hierarchy;
pub mod lock;
pub mod model;
pub mod permission;
pub mod service;
pub mod session;
pub mod store;

pub use cascade::CascadeFilter;
pub use config::ScopeConfig;
pub use error::ScopeError;
pub use hierarchy::{HierarchyGraph, HierarchyIssue};
pub use lock::{LockRule, Resolution, ScopeLockResolver};
pub use permission::PermissionMatrix;
pub use service::ScopeService;
pub use session::{ScopeSession, SessionView};
