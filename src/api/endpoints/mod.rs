pub mod appointments;
pub mod blood_bank;
pub mod doctors;
pub mod health;
pub mod patients;
pub mod payments;
pub mod prescriptions;

use crate::api::error::ApiError;
use crate::api::types::AuthContext;
use crate::models::enums::UserRole;

pub(crate) fn ensure_admin(auth: &AuthContext) -> Result<(), ApiError> {
    if auth.role != UserRole::Admin {
        return Err(ApiError::Forbidden(
            "You are not allowed to perform this action".into(),
        ));
    }
    Ok(())
}

pub(crate) fn ensure_doctor(auth: &AuthContext) -> Result<(), ApiError> {
    if auth.role != UserRole::Doctor {
        return Err(ApiError::Forbidden(
            "Only doctors may perform this action".into(),
        ));
    }
    Ok(())
}
