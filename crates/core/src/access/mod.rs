//! Role-scoped visibility and mutation policy.
//!
//! Every repository query and every mutating route consults this module.
//! Denials are ordinary outcomes surfaced as `AccessError::Forbidden`,
//! never panics.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors raised by policy checks.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccessError {
    #[error("operation not permitted for this role")]
    Forbidden,
}

/// The closed set of roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Accountant,
    Client,
}

impl Role {
    /// Returns the lowercase wire name of the role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Accountant => "accountant",
            Self::Client => "client",
        }
    }

    /// Parses a role from its wire name.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(Self::Admin),
            "accountant" => Some(Self::Accountant),
            "client" => Some(Self::Client),
            _ => None,
        }
    }

    /// Whether the role is part of the firm's staff.
    #[must_use]
    pub fn is_staff(&self) -> bool {
        matches!(self, Self::Admin | Self::Accountant)
    }
}

/// The authenticated caller, as seen by policy checks.
///
/// `client_id` is the client record linked to a Client-role user, resolved
/// from `clients.created_by` at request time. Staff principals carry `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Uuid,
    pub role: Role,
    pub client_id: Option<Uuid>,
}

impl Principal {
    #[must_use]
    pub fn new(user_id: Uuid, role: Role, client_id: Option<Uuid>) -> Self {
        Self {
            user_id,
            role,
            client_id,
        }
    }

    /// The set of client records visible to this principal.
    #[must_use]
    pub fn client_scope(&self) -> ClientScope {
        match self.role {
            Role::Admin | Role::Accountant => ClientScope::All,
            Role::Client => match self.client_id {
                Some(id) => ClientScope::Own(id),
                None => ClientScope::Empty,
            },
        }
    }
}

/// Visibility scope over client-owned records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientScope {
    /// Staff see everything.
    All,
    /// A Client-role user sees only records of their linked client.
    Own(Uuid),
    /// A Client-role user with no linked record sees nothing. Queries
    /// under this scope resolve to empty collections, never errors.
    Empty,
}

impl ClientScope {
    /// Whether a record owned by `record_client` is visible in this scope.
    ///
    /// Records with no client attached (firm-internal filings, unassigned
    /// tasks) are visible to staff only.
    #[must_use]
    pub fn permits(&self, record_client: Option<Uuid>) -> bool {
        match self {
            Self::All => true,
            Self::Own(own) => record_client == Some(*own),
            Self::Empty => false,
        }
    }
}

/// The protected resource families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Clients,
    Invoices,
    Filings,
    Tasks,
    Company,
    Users,
}

/// Whether the principal may list or read records of the resource at all.
///
/// Record-level visibility is further narrowed by [`ClientScope::permits`].
#[must_use]
pub fn can_view(principal: &Principal, resource: Resource) -> bool {
    match resource {
        Resource::Users | Resource::Company => principal.role.is_staff(),
        Resource::Clients | Resource::Invoices | Resource::Filings | Resource::Tasks => true,
    }
}

/// Whether the principal may create, update, or delete records of the
/// resource. Clients are strictly view-only everywhere.
#[must_use]
pub fn can_mutate(principal: &Principal, resource: Resource) -> bool {
    match resource {
        Resource::Users => matches!(principal.role, Role::Admin),
        Resource::Clients
        | Resource::Invoices
        | Resource::Filings
        | Resource::Tasks
        | Resource::Company => principal.role.is_staff(),
    }
}

/// Whether the principal may submit a draft filing.
#[must_use]
pub fn can_submit_filing(principal: &Principal) -> bool {
    principal.role.is_staff()
}

/// Whether the principal may activate or deactivate the target account.
///
/// Admin only, and never their own account, so the last admin cannot
/// lock themselves out.
#[must_use]
pub fn can_toggle_user_status(principal: &Principal, target: Uuid) -> bool {
    matches!(principal.role, Role::Admin) && principal.user_id != target
}

/// Ownership facts of a task, for the accountant-specific rules.
#[derive(Debug, Clone, Copy)]
pub struct TaskOwnership {
    pub created_by: Uuid,
    pub assigned_to: Option<Uuid>,
    pub client_id: Option<Uuid>,
}

/// Whether the principal may see a task.
///
/// Admins see all tasks. Accountants see tasks they created or are
/// assigned to. Clients see tasks attached to their linked client.
#[must_use]
pub fn can_view_task(principal: &Principal, task: &TaskOwnership) -> bool {
    match principal.role {
        Role::Admin => true,
        Role::Accountant => {
            task.created_by == principal.user_id || task.assigned_to == Some(principal.user_id)
        }
        Role::Client => principal.client_scope().permits(task.client_id),
    }
}

/// Whether the principal may edit or delete a task.
///
/// Accountants may only mutate tasks they created themselves, even when
/// assigned to a task created by someone else.
#[must_use]
pub fn can_mutate_task(principal: &Principal, task: &TaskOwnership) -> bool {
    match principal.role {
        Role::Admin => true,
        Role::Accountant => task.created_by == principal.user_id,
        Role::Client => false,
    }
}

/// Whether the principal may mark a task completed.
///
/// Looser than mutation: an accountant assigned to a task may complete it
/// without owning it.
#[must_use]
pub fn can_complete_task(principal: &Principal, task: &TaskOwnership) -> bool {
    match principal.role {
        Role::Admin => true,
        Role::Accountant => {
            task.created_by == principal.user_id || task.assigned_to == Some(principal.user_id)
        }
        Role::Client => false,
    }
}

/// Converts a policy decision into a result.
///
/// # Errors
///
/// Returns `AccessError::Forbidden` when `allowed` is false.
pub fn ensure(allowed: bool) -> Result<(), AccessError> {
    if allowed {
        Ok(())
    } else {
        Err(AccessError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn staff(role: Role) -> Principal {
        Principal::new(Uuid::new_v4(), role, None)
    }

    fn client_user(client_id: Option<Uuid>) -> Principal {
        Principal::new(Uuid::new_v4(), Role::Client, client_id)
    }

    #[test]
    fn test_role_parse_round_trip() {
        for role in [Role::Admin, Role::Accountant, Role::Client] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("superuser"), None);
    }

    #[test]
    fn test_staff_scope_is_all() {
        assert_eq!(staff(Role::Admin).client_scope(), ClientScope::All);
        assert_eq!(staff(Role::Accountant).client_scope(), ClientScope::All);
    }

    #[test]
    fn test_unlinked_client_scope_is_empty() {
        let principal = client_user(None);
        assert_eq!(principal.client_scope(), ClientScope::Empty);
        assert!(!principal.client_scope().permits(Some(Uuid::new_v4())));
        assert!(!principal.client_scope().permits(None));
    }

    #[test]
    fn test_linked_client_sees_only_own_records() {
        let own = Uuid::new_v4();
        let scope = client_user(Some(own)).client_scope();
        assert!(scope.permits(Some(own)));
        assert!(!scope.permits(Some(Uuid::new_v4())));
        assert!(!scope.permits(None));
    }

    #[rstest]
    #[case(Role::Admin, true)]
    #[case(Role::Accountant, true)]
    #[case(Role::Client, false)]
    fn test_client_role_is_view_only(#[case] role: Role, #[case] may_mutate: bool) {
        let principal = Principal::new(Uuid::new_v4(), role, None);
        for resource in [
            Resource::Clients,
            Resource::Invoices,
            Resource::Filings,
            Resource::Tasks,
            Resource::Company,
        ] {
            assert_eq!(can_mutate(&principal, resource), may_mutate);
        }
    }

    #[test]
    fn test_only_admin_manages_users() {
        assert!(can_mutate(&staff(Role::Admin), Resource::Users));
        assert!(!can_mutate(&staff(Role::Accountant), Resource::Users));
        assert!(!can_view(&client_user(None), Resource::Users));
    }

    #[test]
    fn test_accountant_cannot_mutate_foreign_task() {
        let me = staff(Role::Accountant);
        let task = TaskOwnership {
            created_by: Uuid::new_v4(),
            assigned_to: Some(me.user_id),
            client_id: None,
        };
        assert!(!can_mutate_task(&me, &task));
        assert!(can_complete_task(&me, &task));
        assert!(can_view_task(&me, &task));
    }

    #[test]
    fn test_accountant_mutates_own_task() {
        let me = staff(Role::Accountant);
        let task = TaskOwnership {
            created_by: me.user_id,
            assigned_to: None,
            client_id: None,
        };
        assert!(can_mutate_task(&me, &task));
    }

    #[test]
    fn test_accountant_blind_to_unrelated_task() {
        let me = staff(Role::Accountant);
        let task = TaskOwnership {
            created_by: Uuid::new_v4(),
            assigned_to: Some(Uuid::new_v4()),
            client_id: None,
        };
        assert!(!can_view_task(&me, &task));
    }

    #[test]
    fn test_client_views_own_client_task_but_never_completes() {
        let own = Uuid::new_v4();
        let me = client_user(Some(own));
        let task = TaskOwnership {
            created_by: Uuid::new_v4(),
            assigned_to: None,
            client_id: Some(own),
        };
        assert!(can_view_task(&me, &task));
        assert!(!can_complete_task(&me, &task));
        assert!(!can_mutate_task(&me, &task));
    }

    #[test]
    fn test_only_admin_toggles_user_status_and_never_their_own() {
        let admin = staff(Role::Admin);
        assert!(can_toggle_user_status(&admin, Uuid::new_v4()));
        assert!(!can_toggle_user_status(&admin, admin.user_id));
        assert!(!can_toggle_user_status(
            &staff(Role::Accountant),
            Uuid::new_v4()
        ));
        assert!(!can_toggle_user_status(&client_user(None), Uuid::new_v4()));
    }

    #[test]
    fn test_filing_submit_gate() {
        assert!(can_submit_filing(&staff(Role::Admin)));
        assert!(can_submit_filing(&staff(Role::Accountant)));
        assert!(!can_submit_filing(&client_user(Some(Uuid::new_v4()))));
    }

    #[test]
    fn test_ensure_maps_to_forbidden() {
        assert_eq!(ensure(false), Err(AccessError::Forbidden));
        assert!(ensure(true).is_ok());
    }
}
