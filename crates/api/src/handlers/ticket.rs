//! Handlers for the `/tickets` resource.
//!
//! Customers purchase and cancel their own tickets. Staff check tickets in,
//! run bulk operations, and annotate tickets with notes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use cinema_core::error::CoreError;
use cinema_core::ticket_ledger::{self, state_machine, BulkReport, Requester};
use cinema_core::types::DbId;
use cinema_db::models::status::StatusId;
use cinema_db::models::ticket::{
    BookingReceipt, BulkTicketIds, CancelTicket, PurchaseTicket, Ticket, TicketDetail,
    TicketFilter,
};
use cinema_db::models::ticket_note::{CreateTicketNote, TicketNote};
use cinema_db::repositories::{TicketNoteRepo, TicketRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Maximum length of a staff note.
const MAX_NOTE_LEN: usize = 2000;

fn parse_status(status: Option<&str>) -> AppResult<Option<StatusId>> {
    match status {
        None => Ok(None),
        Some(name) => state_machine::status_id(name).map(Some).ok_or_else(|| {
            AppError::BadRequest(format!(
                "Unknown ticket status '{name}'. Expected Active, Used or Cancelled"
            ))
        }),
    }
}

// ---------------------------------------------------------------------------
// Customer handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/tickets/purchase
///
/// Books one seat for the caller. An unusable promo code does not fail the
/// purchase; the ticket is sold at full price and the reason is returned in
/// `promo_rejection`.
pub async fn purchase(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(input): Json<PurchaseTicket>,
) -> AppResult<(StatusCode, Json<DataResponse<BookingReceipt>>)> {
    let receipt = TicketRepo::book(&state.pool, user.user_id, &input, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: receipt })))
}

/// GET /api/v1/tickets/mine
pub async fn mine(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Query(filter): Query<TicketFilter>,
) -> AppResult<Json<DataResponse<Vec<TicketDetail>>>> {
    let status_id = parse_status(filter.status.as_deref())?;
    let tickets = TicketRepo::list_for_user(&state.pool, user.user_id, status_id).await?;
    Ok(Json(DataResponse { data: tickets }))
}

/// GET /api/v1/tickets/{id}
///
/// Visible to the owner and to staff. Other callers get 404 so ticket ids
/// cannot be probed.
pub async fn get_by_id(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<TicketDetail>>> {
    let not_found = || {
        AppError::Core(CoreError::NotFound {
            entity: "Ticket",
            id,
        })
    };
    let detail = TicketRepo::find_detail(&state.pool, id)
        .await?
        .ok_or_else(not_found)?;
    if detail.ticket.user_id != user.user_id && !user.is_admin() {
        return Err(not_found());
    }
    Ok(Json(DataResponse { data: detail }))
}

/// POST /api/v1/tickets/{id}/cancel
///
/// Owners may cancel an active ticket until the calendar day before the
/// screening.
pub async fn cancel(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CancelTicket>,
) -> AppResult<Json<DataResponse<Ticket>>> {
    let ticket = TicketRepo::cancel(
        &state.pool,
        id,
        Requester::Customer(user.user_id),
        input.reason.as_deref(),
        Utc::now(),
    )
    .await?;
    Ok(Json(DataResponse { data: ticket }))
}

// ---------------------------------------------------------------------------
// Staff handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/tickets/{id}/check-in
pub async fn check_in(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Ticket>>> {
    let ticket = TicketRepo::check_in(&state.pool, id, Utc::now()).await?;
    Ok(Json(DataResponse { data: ticket }))
}

/// GET /api/v1/tickets/all
pub async fn list_all(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(filter): Query<TicketFilter>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<TicketDetail>>>> {
    let status_id = parse_status(filter.status.as_deref())?;
    let tickets = TicketRepo::list_all(
        &state.pool,
        status_id,
        filter.screening_id,
        page.clamp_limit(),
        page.clamp_offset(),
    )
    .await?;
    Ok(Json(DataResponse { data: tickets }))
}

/// POST /api/v1/tickets/bulk-cancel
///
/// Cancels each ticket independently. Tickets that cannot be cancelled are
/// reported in `skips`. Staff may cancel any customer's ticket, but the
/// cancellation window still applies.
pub async fn bulk_cancel(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<BulkTicketIds>,
) -> AppResult<Json<DataResponse<BulkReport>>> {
    ticket_ledger::validate_bulk_size(input.ticket_ids.len())?;
    let report = TicketRepo::bulk_cancel(
        &state.pool,
        &input.ticket_ids,
        admin.user_id,
        input.reason.as_deref(),
        Utc::now(),
    )
    .await?;
    Ok(Json(DataResponse { data: report }))
}

/// POST /api/v1/tickets/bulk-mark-used
pub async fn bulk_mark_used(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<BulkTicketIds>,
) -> AppResult<Json<DataResponse<BulkReport>>> {
    ticket_ledger::validate_bulk_size(input.ticket_ids.len())?;
    let report = TicketRepo::bulk_mark_used(&state.pool, &input.ticket_ids, Utc::now()).await?;
    Ok(Json(DataResponse { data: report }))
}

/// POST /api/v1/tickets/{id}/notes
pub async fn add_note(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CreateTicketNote>,
) -> AppResult<(StatusCode, Json<DataResponse<TicketNote>>)> {
    let note = input.note.trim();
    if note.is_empty() || note.len() > MAX_NOTE_LEN {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Note must be 1-{MAX_NOTE_LEN} characters"
        ))));
    }
    ensure_ticket_exists(&state, id).await?;

    let note = TicketNoteRepo::create(&state.pool, id, admin.user_id, note).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: note })))
}

/// GET /api/v1/tickets/{id}/notes
pub async fn list_notes(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<TicketNote>>>> {
    ensure_ticket_exists(&state, id).await?;
    let notes = TicketNoteRepo::list_for_ticket(&state.pool, id).await?;
    Ok(Json(DataResponse { data: notes }))
}

async fn ensure_ticket_exists(state: &AppState, id: DbId) -> AppResult<()> {
    TicketRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Ticket",
            id,
        }))?;
    Ok(())
}
