//! # Access Policy Gate
//!
//! Every role check in the crate goes through [`authorize`]. The rule table in
//! [`decide`] is the whole authorization matrix; it is a pure function so it can
//! be tested exhaustively without any actor running.
//!
//! The caller's identity is always passed in explicitly. `None` means the
//! request carried no identity at all.

use std::fmt;
use thiserror::Error;

use crate::domain::{Role, UserId};

/// Authenticated identity attached to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: UserId,
    pub role: Role,
}

impl Caller {
    pub fn client(user_id: UserId) -> Self {
        Self { user_id, role: Role::Client }
    }

    pub fn employee(user_id: UserId) -> Self {
        Self { user_id, role: Role::Employee }
    }

    pub fn admin(user_id: UserId) -> Self {
        Self { user_id, role: Role::Admin }
    }
}

/// Operations guarded by the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ManageCatalog,
    BrowseCatalog,
    PlaceOrder,
    ListOwnOrders,
    ViewOwnOrder,
    CancelOrder,
    ListAllOrders,
    ViewAnyOrder,
    UpdateOrderStatus,
    AssignOrder,
    ListEmployees,
    ListUsers,
    DeleteUser,
    ReadNotifications,
}

impl Action {
    pub const ALL: [Action; 14] = [
        Action::ManageCatalog,
        Action::BrowseCatalog,
        Action::PlaceOrder,
        Action::ListOwnOrders,
        Action::ViewOwnOrder,
        Action::CancelOrder,
        Action::ListAllOrders,
        Action::ViewAnyOrder,
        Action::UpdateOrderStatus,
        Action::AssignOrder,
        Action::ListEmployees,
        Action::ListUsers,
        Action::DeleteUser,
        Action::ReadNotifications,
    ];
}

/// What the action touches. Ownership matters only for owner-scoped actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Any,
    OwnedBy(UserId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    RoleNotAllowed,
    NotOwner,
}

impl DenyReason {
    pub fn code(self) -> &'static str {
        match self {
            DenyReason::RoleNotAllowed => "role_not_allowed",
            DenyReason::NotOwner => "not_owner",
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("authentication required")]
    Unauthenticated,
    #[error("access denied ({reason})")]
    Forbidden { reason: DenyReason },
}

fn owner_only(caller: &Caller, resource: Resource) -> Decision {
    match resource {
        Resource::OwnedBy(owner) if owner == caller.user_id => Decision::Allow,
        _ => Decision::Deny(DenyReason::NotOwner),
    }
}

fn role_in(caller: &Caller, allowed: &[Role]) -> Decision {
    if allowed.contains(&caller.role) {
        Decision::Allow
    } else {
        Decision::Deny(DenyReason::RoleNotAllowed)
    }
}

/// The authorization matrix.
pub fn decide(caller: &Caller, action: Action, resource: Resource) -> Decision {
    use Action::*;
    const STAFF: &[Role] = &[Role::Employee, Role::Admin];

    match action {
        ManageCatalog | ListUsers | DeleteUser => role_in(caller, &[Role::Admin]),
        BrowseCatalog => Decision::Allow,
        PlaceOrder | ListOwnOrders => role_in(caller, &[Role::Client]),
        ViewOwnOrder | CancelOrder => match role_in(caller, &[Role::Client]) {
            Decision::Allow => owner_only(caller, resource),
            deny => deny,
        },
        ListAllOrders | ViewAnyOrder | UpdateOrderStatus | AssignOrder | ListEmployees => role_in(caller, STAFF),
        ReadNotifications => owner_only(caller, resource),
    }
}

/// Single entry point used by every client method.
pub fn authorize(caller: Option<&Caller>, action: Action, resource: Resource) -> Result<(), AccessError> {
    let caller = caller.ok_or(AccessError::Unauthenticated)?;
    match decide(caller, action, resource) {
        Decision::Allow => Ok(()),
        Decision::Deny(reason) => {
            tracing::warn!(user_id = caller.user_id, role = ?caller.role, ?action, %reason, "Access denied");
            Err(AccessError::Forbidden { reason })
        }
    }
}

/// [`authorize`], handing back the caller on success.
pub fn authorize_caller(caller: Option<&Caller>, action: Action, resource: Resource) -> Result<&Caller, AccessError> {
    authorize(caller, action, resource)?;
    caller.ok_or(AccessError::Unauthenticated)
}

/// Identity and role half of an owner-scoped check, run before the resource
/// is loaded. Ownership is checked with [`authorize`] once the owner is known.
pub fn authorize_identity(caller: Option<&Caller>, action: Action) -> Result<&Caller, AccessError> {
    let who = caller.ok_or(AccessError::Unauthenticated)?;
    authorize_caller(caller, action, Resource::OwnedBy(who.user_id))
}
