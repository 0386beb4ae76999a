mod hierarchy;
mod permission;
mod profile;
mod role;
mod selection;

pub use hierarchy::*;
pub use permission::*;
pub use profile::*;
pub use role::*;
pub use selection::*;
