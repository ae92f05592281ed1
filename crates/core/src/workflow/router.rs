//! Routing and authorization for approval stages.
//!
//! All authorization decisions live here: which employees may decide a
//! stage, who may cancel or withdraw a request, and who may adjust
//! balances. The workflow service assumes these checks already ran.

use kadro_shared::EmployeeId;

use crate::employee::{EmployeeProfile, EmployeeRole};
use crate::workflow::error::WorkflowError;
use crate::workflow::types::ApprovalStage;

/// Stateless approval routing engine.
pub struct ApprovalRouter;

impl ApprovalRouter {
    /// Resolves the set of employees allowed to decide `stage` for a
    /// request by `employee`.
    ///
    /// The Manager stage routes to the employee's reporting manager; the
    /// HR stage routes to every hr/admin directory member.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::ManagerNotAssigned`] when the employee
    /// has no reporting manager, or
    /// [`WorkflowError::NoApproversAvailable`] when the HR pool is empty
    /// or the stage is Completed.
    pub fn resolve_approvers(
        stage: ApprovalStage,
        employee: &EmployeeProfile,
        hr_staff: &[EmployeeId],
    ) -> Result<Vec<EmployeeId>, WorkflowError> {
        match stage {
            ApprovalStage::Manager => {
                let manager = employee.reporting_manager.ok_or(
                    WorkflowError::ManagerNotAssigned {
                        employee_id: employee.id,
                    },
                )?;
                Ok(vec![manager])
            }
            ApprovalStage::Hr => {
                if hr_staff.is_empty() {
                    return Err(WorkflowError::NoApproversAvailable { stage });
                }
                Ok(hr_staff.to_vec())
            }
            ApprovalStage::Completed => Err(WorkflowError::NoApproversAvailable { stage }),
        }
    }

    /// Checks that `actor` is in the resolved approver set.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::NotAuthorized`] otherwise.
    pub fn authorize(actor: EmployeeId, resolved: &[EmployeeId]) -> Result<(), WorkflowError> {
        if resolved.contains(&actor) {
            return Ok(());
        }
        Err(WorkflowError::NotAuthorized { actor })
    }

    /// Resolves the stage's approvers and checks the actor in one step.
    ///
    /// # Errors
    ///
    /// Propagates the routing errors of [`Self::resolve_approvers`] and
    /// the [`WorkflowError::NotAuthorized`] of [`Self::authorize`].
    pub fn authorize_decision(
        stage: ApprovalStage,
        actor: EmployeeId,
        employee: &EmployeeProfile,
        hr_staff: &[EmployeeId],
    ) -> Result<(), WorkflowError> {
        let resolved = Self::resolve_approvers(stage, employee, hr_staff)?;
        Self::authorize(actor, &resolved)
    }

    /// Only hr/admin roles may apply administrative balance adjustments.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::NotAuthorized`] for any other role.
    pub fn authorize_adjustment(
        actor: EmployeeId,
        actor_role: EmployeeRole,
    ) -> Result<(), WorkflowError> {
        if actor_role.can_adjust_balances() {
            return Ok(());
        }
        Err(WorkflowError::NotAuthorized { actor })
    }

    /// The requesting employee or an hr/admin may cancel a request.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::NotAuthorized`] for anyone else.
    pub fn authorize_cancellation(
        owner: EmployeeId,
        actor: EmployeeId,
        actor_role: EmployeeRole,
    ) -> Result<(), WorkflowError> {
        if actor == owner || actor_role.is_hr() {
            return Ok(());
        }
        Err(WorkflowError::NotAuthorized { actor })
    }

    /// Only the requesting employee may withdraw their request.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::NotAuthorized`] for anyone else.
    pub fn authorize_withdrawal(
        owner: EmployeeId,
        actor: EmployeeId,
    ) -> Result<(), WorkflowError> {
        if actor == owner {
            return Ok(());
        }
        Err(WorkflowError::NotAuthorized { actor })
    }
}
