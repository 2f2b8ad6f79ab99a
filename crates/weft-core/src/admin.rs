//! Administrative override.
//!
//! Administrators may read any resource and may configure a visible public
//! share as writeable. They get nothing else: deleting a resource or changing
//! its access list still requires ownership of that resource.

use crate::identity::{Identity, Role};

pub fn is_administrator(identity: Option<&Identity>) -> bool {
  identity.is_some_and(|i| i.has_role(Role::Administrator))
}
