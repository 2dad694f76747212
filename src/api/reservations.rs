//! Reservation endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::loan::{Loan, LoanDetails, ReturnReport},
};

use super::AuthenticatedBorrower;

/// Create reservation request
#[derive(Deserialize, ToSchema)]
pub struct CreateReservationRequest {
    /// Item to reserve
    pub item_id: i32,
}

/// Batch return request
#[derive(Deserialize, ToSchema)]
pub struct ReturnRequest {
    /// Loans to return
    #[serde(default)]
    pub loan_ids: Vec<i32>,
    /// Code given by the librarian at the desk
    #[serde(default)]
    pub verification_token: String,
}

/// Active loans of the authenticated borrower
#[utoipa::path(
    get,
    path = "/reservations",
    tag = "reservations",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Active loans, most recent first", body = Vec<LoanDetails>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_reservations(
    State(state): State<crate::AppState>,
    AuthenticatedBorrower(claims): AuthenticatedBorrower,
) -> AppResult<Json<Vec<LoanDetails>>> {
    let loans = state
        .services
        .reservations
        .list_active_loans(claims.borrower_id())
        .await?;
    Ok(Json(loans))
}

/// Reserve an item
#[utoipa::path(
    post,
    path = "/reservations",
    tag = "reservations",
    security(("bearer_auth" = [])),
    request_body = CreateReservationRequest,
    responses(
        (status = 201, description = "Reservation created", body = Loan),
        (status = 400, description = "Limit reached, duplicate reservation or out of stock", body = crate::error::ErrorResponse),
        (status = 404, description = "Item not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_reservation(
    State(state): State<crate::AppState>,
    AuthenticatedBorrower(claims): AuthenticatedBorrower,
    Json(request): Json<CreateReservationRequest>,
) -> AppResult<(StatusCode, Json<Loan>)> {
    let loan = state
        .services
        .reservations
        .create_reservation(claims.borrower_id(), request.item_id)
        .await?;

    Ok((StatusCode::CREATED, Json(loan)))
}

/// Return reserved items
#[utoipa::path(
    post,
    path = "/reservations/return",
    tag = "reservations",
    security(("bearer_auth" = [])),
    request_body = ReturnRequest,
    responses(
        (status = 200, description = "Per-loan outcome; partial success is possible", body = ReturnReport),
        (status = 400, description = "No loans selected", body = crate::error::ErrorResponse),
        (status = 401, description = "Verification token rejected", body = crate::error::ErrorResponse)
    )
)]
pub async fn return_reservations(
    State(state): State<crate::AppState>,
    AuthenticatedBorrower(claims): AuthenticatedBorrower,
    Json(request): Json<ReturnRequest>,
) -> AppResult<Json<ReturnReport>> {
    let report = state
        .services
        .reservations
        .return_items(
            claims.borrower_id(),
            &request.loan_ids,
            &request.verification_token,
        )
        .await?;

    Ok(Json(report))
}
