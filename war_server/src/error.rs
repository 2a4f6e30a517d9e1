use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use thiserror::Error;
use tokio::task::JoinError;
use tracing::{error, warn};
use war_core::WarError;

use crate::render;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("missing or unknown session")]
    InvalidSession,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("blocking task failed: {0}")]
    Task(#[from] JoinError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidSession => StatusCode::BAD_REQUEST,
            AppError::Store(err) => match err {
                StoreError::GameNotFound(_) => StatusCode::NOT_FOUND,
                StoreError::NotSeated(_) => StatusCode::FORBIDDEN,
                StoreError::SeatTaken(_) => StatusCode::CONFLICT,
                StoreError::Rule(
                    WarError::AlreadyFlipped { .. } | WarError::GameOver { .. } | WarError::EmptyHand,
                ) => {
                    StatusCode::CONFLICT
                }
                StoreError::Rule(_)
                | StoreError::Corrupt { .. }
                | StoreError::Sqlite(_)
                | StoreError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        } else {
            warn!(error = %self, status = status.as_u16(), "request rejected");
        }
        (status, Html(render::error_fragment(status, &self.to_string()))).into_response()
    }
}
