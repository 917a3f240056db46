/// Authorization policy
///
/// All permission rules live here as pure functions over the actor and the
/// facts the caller has already loaded (project role, task assignee,
/// status). Handlers translate denials into their endpoint's status code
/// and message; the policy itself never touches HTTP or the database.
///
/// # Rules
///
/// - Admin-only actions (user management, task delete/restore) require the
///   admin flag.
/// - Project mutations require the actor to be an admin AND hold the
///   manager role on that project.
/// - Task authoring (create/update) requires admin OR the manager role on
///   the task's project.
/// - Delivery is reserved for the non-admin assignee of an in-progress
///   task.

use uuid::Uuid;

use super::middleware::AuthContext;
use crate::models::task::TaskStatus;

/// A denied policy check
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PolicyDenied {
    /// Actor must be an admin
    #[error("admin required")]
    AdminRequired,

    /// Actor must be an admin holding the manager role on the project
    #[error("project manager required")]
    ProjectManagerRequired,

    /// Actor must be an admin or hold the manager role on the project
    #[error("task author required")]
    TaskAuthorRequired,
}

/// A denied delivery attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryDenied {
    /// Actor is an admin or the task is not in-progress
    #[error("User unAuthorization or task status not in-progress")]
    NotEligible,

    /// Task belongs to a different assignee
    #[error("This task assigned to another user")]
    AssignedToAnotherUser,
}

/// Requires the actor to be an admin
pub fn require_admin(actor: &AuthContext) -> Result<(), PolicyDenied> {
    if actor.is_admin {
        Ok(())
    } else {
        Err(PolicyDenied::AdminRequired)
    }
}

/// Requires an admin who also manages the project
///
/// `is_manager` is the actor's manager-role membership on the project in
/// question, looked up by the caller.
pub fn require_project_manager(
    actor: &AuthContext,
    is_manager: bool,
) -> Result<(), PolicyDenied> {
    if actor.is_admin && is_manager {
        Ok(())
    } else {
        Err(PolicyDenied::ProjectManagerRequired)
    }
}

/// Requires an admin or a manager of the project
pub fn require_task_author(actor: &AuthContext, is_manager: bool) -> Result<(), PolicyDenied> {
    if actor.is_admin || is_manager {
        Ok(())
    } else {
        Err(PolicyDenied::TaskAuthorRequired)
    }
}

/// Authorizes a delivery attempt
///
/// Delivery belongs to the assignee: the actor must not be an admin, the
/// task must still be in-progress, and the task must be assigned to the
/// actor. The eligibility check comes first, so an admin poking at someone
/// else's task sees `NotEligible`, not the assignee message.
pub fn authorize_delivery(
    actor: &AuthContext,
    assignee: Uuid,
    status: TaskStatus,
) -> Result<(), DeliveryDenied> {
    if actor.is_admin || status != TaskStatus::InProgress {
        return Err(DeliveryDenied::NotEligible);
    }

    if actor.user_id != assignee {
        return Err(DeliveryDenied::AssignedToAnotherUser);
    }

    Ok(())
}
