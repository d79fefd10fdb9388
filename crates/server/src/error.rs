use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use campaign::CampaignError;
use thiserror::Error;
use utils::response::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Campaign(#[from] CampaignError),
    #[error(transparent)]
    Json(#[from] JsonRejection),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Campaign(CampaignError::InvalidRequest(_)) => StatusCode::BAD_REQUEST,
            ApiError::Campaign(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Json(_) => StatusCode::BAD_REQUEST,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        let error_message = match &self {
            ApiError::Campaign(CampaignError::InvalidRequest(msg)) => msg.clone(),
            ApiError::Campaign(err) => format!("Internal Processing Error: {}", err),
            ApiError::Json(rejection) => format!("Invalid request body: {}", rejection.body_text()),
            ApiError::BadRequest(msg) => msg.clone(),
            ApiError::InternalError(msg) => msg.clone(),
        };

        if status_code.is_server_error() {
            tracing::error!("[API] {}", error_message);
        } else {
            tracing::debug!("[API] Rejected request: {}", error_message);
        }

        let response = ApiResponse::<()>::error(&error_message);
        (status_code, Json(response)).into_response()
    }
}
