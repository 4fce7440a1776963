use uuid::Uuid;

use super::Credential;
use crate::services::ServiceError;

/// A stored resource with a recorded owner
pub trait Owned {
    /// Resource name used in rejection messages
    const RESOURCE: &'static str;

    fn owner_id(&self) -> Uuid;
}

/// Reject callers that do not own `resource`.
///
/// Callers load the resource first; a missing resource is reported as
/// `NotFound` before this check runs.
pub fn authorize<R: Owned>(resource: &R, credential: &Credential) -> Result<(), ServiceError> {
    if resource.owner_id() == credential.id {
        return Ok(());
    }

    tracing::warn!(
        resource = R::RESOURCE,
        caller = %credential.id,
        "ownership check failed"
    );
    Err(ServiceError::Unauthorized(format!(
        "You are not allowed to access this {}",
        R::RESOURCE
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Thing(Uuid);

    impl Owned for Thing {
        const RESOURCE: &'static str = "thing";

        fn owner_id(&self) -> Uuid {
            self.0
        }
    }

    #[test]
    fn owner_is_authorized() {
        let owner = Uuid::new_v4();
        assert!(authorize(&Thing(owner), &Credential { id: owner }).is_ok());
    }

    #[test]
    fn other_caller_is_unauthorized() {
        let err = authorize(&Thing(Uuid::new_v4()), &Credential { id: Uuid::new_v4() }).unwrap_err();
        match err {
            ServiceError::Unauthorized(message) => assert_eq!(message, "You are not allowed to access this thing"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
