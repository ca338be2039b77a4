use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use raidboard_core::{AccountError, RosterError};
use raidboard_store::StoreError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Account(#[from] AccountError),

    #[error(transparent)]
    Roster(#[from] RosterError),

    #[error("No event named '{0}'")]
    EventNotFound(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("No cancellation pending for '{0}'")]
    NoPendingCancellation(String),

    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for ServerError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::EventNotFound(name) => ServerError::EventNotFound(name),
            StoreError::Roster(e) => ServerError::Roster(e),
            other => ServerError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::Account(e) => (account_status(e), self.to_string()),
            ServerError::Roster(e) => (roster_status(e), self.to_string()),
            ServerError::EventNotFound(_) | ServerError::NotFound(_) => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            ServerError::NoPendingCancellation(_) => (StatusCode::CONFLICT, self.to_string()),
            ServerError::NotLoggedIn => (StatusCode::UNAUTHORIZED, self.to_string()),
            ServerError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ServerError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
        }

        let body = serde_json::json!({
            "error": message,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn account_status(e: &AccountError) -> StatusCode {
    match e {
        AccountError::InvalidName => StatusCode::BAD_REQUEST,
        AccountError::DuplicateAccount => StatusCode::CONFLICT,
        AccountError::UnknownAccount | AccountError::WrongPassword => StatusCode::UNAUTHORIZED,
    }
}

fn roster_status(e: &RosterError) -> StatusCode {
    match e {
        RosterError::InvalidName => StatusCode::BAD_REQUEST,
        RosterError::NotAuthenticated => StatusCode::UNAUTHORIZED,
        RosterError::NotCreator => StatusCode::FORBIDDEN,
        RosterError::DuplicateEventName
        | RosterError::AlreadyJoined
        | RosterError::EventFull
        | RosterError::NotAParticipant => StatusCode::CONFLICT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_through() {
        let e: ServerError = StoreError::EventNotFound("Vow".into()).into();
        assert!(matches!(e, ServerError::EventNotFound(_)));

        let e: ServerError = StoreError::Roster(RosterError::EventFull).into();
        assert!(matches!(e, ServerError::Roster(RosterError::EventFull)));
    }

    #[test]
    fn status_mapping() {
        assert_eq!(
            roster_status(&RosterError::NotCreator),
            StatusCode::FORBIDDEN
        );
        assert_eq!(roster_status(&RosterError::EventFull), StatusCode::CONFLICT);
        assert_eq!(
            account_status(&AccountError::WrongPassword),
            StatusCode::UNAUTHORIZED
        );
    }
}
