use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "request_status")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Declined,
}

impl RequestStatus {
    /// Accepted and Declined are terminal, a request never leaves them.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }
}

/// A proposal by `sender_id` to join `project_id`, directed at
/// `receiver_id`. The receiver is fixed at creation to whoever owned the
/// project at that moment and is never rewritten, even if ownership
/// later changes hands.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct VolunteerRequest {
    pub id: i32,
    pub sender_id: i32,
    pub receiver_id: i32,
    pub project_id: i32,
    pub status: RequestStatus,
}

impl VolunteerRequest {
    /// Guard for accept/decline. The acting volunteer must be the
    /// recorded receiver and must still own the requested project, and
    /// the request must still be pending. Authorization failures and
    /// state failures are distinct errors so callers can tell a 403
    /// from a 409.
    pub fn ensure_resolvable_by(&self, volunteer_id: i32, current_owner_id: i32) -> Result<(), Error> {
        if volunteer_id != self.receiver_id || volunteer_id != current_owner_id {
            return Err(Error::NotAuthorized(
                "you are not the owner of the project detailed in this request".into(),
            ));
        }
        if self.status.is_terminal() {
            return Err(Error::InvalidState("request is not pending".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn pending_request() -> VolunteerRequest {
        VolunteerRequest {
            id: 1,
            sender_id: 2,
            receiver_id: 10,
            project_id: 5,
            status: RequestStatus::Pending,
        }
    }

    #[test]
    fn test_receiver_and_owner_may_resolve_pending() {
        let req = pending_request();
        assert!(req.ensure_resolvable_by(10, 10).is_ok());
    }

    #[test]
    fn test_non_receiver_is_rejected() {
        let req = pending_request();
        match req.ensure_resolvable_by(2, 10) {
            Err(Error::NotAuthorized(_)) => {}
            other => panic!("expected NotAuthorized, got {:?}", other),
        }
    }

    #[test]
    fn test_receiver_who_lost_ownership_is_rejected() {
        // ownership moved to volunteer 99 after the request was created
        let req = pending_request();
        match req.ensure_resolvable_by(10, 99) {
            Err(Error::NotAuthorized(_)) => {}
            other => panic!("expected NotAuthorized, got {:?}", other),
        }
    }

    #[test]
    fn test_accepted_request_cannot_be_resolved_again() {
        let mut req = pending_request();
        req.status = RequestStatus::Accepted;
        match req.ensure_resolvable_by(10, 10) {
            Err(Error::InvalidState(_)) => {}
            other => panic!("expected InvalidState, got {:?}", other),
        }
    }

    #[test]
    fn test_declined_request_cannot_be_resolved_again() {
        let mut req = pending_request();
        req.status = RequestStatus::Declined;
        match req.ensure_resolvable_by(10, 10) {
            Err(Error::InvalidState(_)) => {}
            other => panic!("expected InvalidState, got {:?}", other),
        }
    }

    #[test]
    fn test_authorization_is_checked_before_state() {
        // a stranger poking a terminal request sees 403, not 409
        let mut req = pending_request();
        req.status = RequestStatus::Declined;
        match req.ensure_resolvable_by(2, 10) {
            Err(Error::NotAuthorized(_)) => {}
            other => panic!("expected NotAuthorized, got {:?}", other),
        }
    }

    #[test]
    fn test_terminal_states() {
        assert!(!RequestStatus::Pending.is_terminal());
        assert!(RequestStatus::Accepted.is_terminal());
        assert!(RequestStatus::Declined.is_terminal());
    }
}
