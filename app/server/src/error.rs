//! FILENAME: app/server/src/error.rs
// PURPOSE: Request-level errors and their JSON error body.

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use datasets::DatasetError;
use thiserror::Error;

use crate::api_types::ErrorBody;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error("{0}")]
    BadRequest(String),

    #[error("upload error: {0}")]
    Multipart(#[from] MultipartError),

    #[error("worker task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ApiError {
    /// HTTP status and the client-facing sub code.
    pub fn status_and_sub_code(&self) -> (StatusCode, u16) {
        match self {
            ApiError::Dataset(err) => match err {
                DatasetError::NotFound(_)
                | DatasetError::AlreadyExists(_)
                | DatasetError::UnsupportedExtension(_) => (StatusCode::BAD_REQUEST, 1),
                DatasetError::InvalidFilename(_) => (StatusCode::BAD_REQUEST, 2),
                DatasetError::UnknownTable(_) | DatasetError::UnknownColumn(_) => {
                    (StatusCode::BAD_REQUEST, 3)
                }
                DatasetError::Io(_) | DatasetError::Sqlite(_) | DatasetError::Csv(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, 10)
                }
            },
            ApiError::BadRequest(_) | ApiError::Multipart(_) => (StatusCode::BAD_REQUEST, 1),
            ApiError::Task(_) => (StatusCode::INTERNAL_SERVER_ERROR, 10),
        }
    }

    /// Message shown to clients. Server errors do not leak internals.
    pub fn client_message(&self) -> String {
        match self {
            ApiError::Dataset(DatasetError::NotFound(_)) => "database does not exist".to_string(),
            ApiError::Dataset(DatasetError::AlreadyExists(_)) => {
                "database filename already exists".to_string()
            }
            ApiError::Dataset(DatasetError::UnsupportedExtension(_)) => {
                "extension error: only accept .db, .csv and .txt".to_string()
            }
            ApiError::Dataset(DatasetError::Io(_))
            | ApiError::Dataset(DatasetError::Sqlite(_))
            | ApiError::Dataset(DatasetError::Csv(_))
            | ApiError::Task(_) => "internal error while reading the dataset".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, sub_code) = self.status_and_sub_code();
        if status.is_server_error() {
            crate::log_error!("HTTP", "{} ({})", self, status);
        } else {
            crate::log_warn!("HTTP", "{} ({})", self, status);
        }

        let body = ErrorBody {
            status: status.as_u16(),
            sub_code,
            message: self.client_message(),
        };
        (status, Json(body)).into_response()
    }
}
