//! Repository for the `tickets` table: the ticket ledger.
//!
//! Every mutation locks the ticket's screening row before reading the
//! ledger, so booking, cancellation and check-in for one screening are
//! serialised while different screenings proceed in parallel.

use cinema_core::error::ReservationError;
use cinema_core::promo::{self, PromoRejection};
use cinema_core::ticket_ledger::{
    self, BulkReport, HeldSeat, Requester, ScreeningSnapshot, TicketLedger,
};
use cinema_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::error::LedgerError;
use crate::models::screening::Screening;
use crate::models::status::{StatusId, TicketStatus};
use crate::models::ticket::{BookingReceipt, PurchaseTicket, Ticket, TicketDetail};
use crate::repositories::{PromoCodeRepo, RoomRepo, ScreeningRepo};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, screening_id, user_id, seat_label, status_id, base_price, \
    discount_amount, price_paid, promo_code_id, purchased_at, checked_in_at, cancelled_at, \
    refund_reason, created_at, updated_at";

const DETAIL_COLUMNS: &str = "\
    tk.id, tk.screening_id, tk.user_id, tk.seat_label, tk.status_id, tk.base_price, \
    tk.discount_amount, tk.price_paid, tk.promo_code_id, tk.purchased_at, tk.checked_in_at, \
    tk.cancelled_at, tk.refund_reason, tk.created_at, tk.updated_at, \
    m.title AS movie_title, s.show_time, r.name AS room_name, t.name AS theater_name, \
    p.code AS promo_code";

const DETAIL_FROM: &str = "\
    FROM tickets tk \
    JOIN screenings s ON s.id = tk.screening_id \
    JOIN movies m ON m.id = s.movie_id \
    JOIN rooms r ON r.id = s.room_id \
    JOIN theaters t ON t.id = r.theater_id \
    LEFT JOIN promo_codes p ON p.id = tk.promo_code_id";

/// Provides ticket ledger operations.
pub struct TicketRepo;

impl TicketRepo {
    /// Book a seat for `user_id`.
    ///
    /// A promo code that cannot be applied does not fail the booking; the
    /// ticket is sold at full price and the rejection is returned in the
    /// receipt. A redeemed code's usage counter is incremented in the same
    /// transaction as the ticket insert.
    pub async fn book(
        pool: &PgPool,
        user_id: DbId,
        input: &PurchaseTicket,
        now: Timestamp,
    ) -> Result<BookingReceipt, LedgerError> {
        let mut tx = pool.begin().await?;

        let screening = ScreeningRepo::lock(&mut tx, input.screening_id)
            .await?
            .ok_or(ReservationError::ScreeningNotFound(input.screening_id))?;
        let room = RoomRepo::dimensions_in_tx(&mut tx, screening.room_id)
            .await?
            .ok_or(ReservationError::ScreeningNotFound(screening.id))?;
        let held = Self::held_seats(&mut tx, screening.id).await?;

        let ledger = TicketLedger::new(
            ScreeningSnapshot {
                id: screening.id,
                is_active: screening.is_active,
                show_time: screening.show_time,
                price: screening.price,
                grid: room.grid(),
            },
            held,
        );
        let seat_label = ledger.check_booking(&input.seat_label, user_id, now)?;

        let mut discount = None;
        let mut promo_code_id = None;
        let mut promo_rejection = None;
        if let Some(code) = input.promo_code.as_deref().filter(|c| !c.trim().is_empty()) {
            let code = promo::normalize_code(code);
            let evaluated = match PromoCodeRepo::lock_by_code(&mut tx, &code).await? {
                Some(promo) => promo
                    .terms()
                    .evaluate(screening.price, now)
                    .map(|amount| (promo.id, amount)),
                None => Err(PromoRejection::PromoInvalid),
            };
            match evaluated {
                Ok((id, amount)) => {
                    discount = Some(amount);
                    promo_code_id = Some(id);
                }
                Err(rejection) => {
                    tracing::warn!(
                        screening_id = screening.id,
                        user_id,
                        code = %code,
                        reason = %rejection,
                        "Promo code not applied"
                    );
                    promo_rejection = Some(rejection);
                }
            }
        }

        let query = format!(
            "INSERT INTO tickets \
                (screening_id, user_id, seat_label, status_id, base_price, \
                 discount_amount, price_paid, promo_code_id, purchased_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {COLUMNS}"
        );
        let ticket = sqlx::query_as::<_, Ticket>(&query)
            .bind(screening.id)
            .bind(user_id)
            .bind(&seat_label)
            .bind(TicketStatus::Active.id())
            .bind(screening.price)
            .bind(discount)
            .bind(ticket_ledger::payable(screening.price, discount))
            .bind(promo_code_id)
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;

        if let Some(id) = promo_code_id {
            PromoCodeRepo::record_use(&mut tx, id).await?;
        }
        tx.commit().await?;

        tracing::info!(
            ticket_id = ticket.id,
            screening_id = screening.id,
            user_id,
            seat = %seat_label,
            price_paid = %ticket.price_paid,
            "Ticket booked"
        );
        Ok(BookingReceipt {
            ticket,
            promo_rejection,
        })
    }

    /// Cancel a ticket, recording `reason` as the refund reason.
    pub async fn cancel(
        pool: &PgPool,
        ticket_id: DbId,
        requester: Requester,
        reason: Option<&str>,
        now: Timestamp,
    ) -> Result<Ticket, LedgerError> {
        let mut tx = pool.begin().await?;

        let (ticket, screening) = Self::lock_with_screening(&mut tx, ticket_id)
            .await?
            .ok_or(ReservationError::TicketNotFound(ticket_id))?;
        ticket_ledger::check_cancellation(&ticket.snapshot(), requester, screening.show_time, now)?;

        let query = format!(
            "UPDATE tickets SET status_id = $2, cancelled_at = $3, refund_reason = $4 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let ticket = sqlx::query_as::<_, Ticket>(&query)
            .bind(ticket_id)
            .bind(TicketStatus::Cancelled.id())
            .bind(now)
            .bind(reason)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::info!(
            ticket_id,
            screening_id = ticket.screening_id,
            requested_by = requester.user_id(),
            "Ticket cancelled"
        );
        Ok(ticket)
    }

    /// Mark a ticket as used at the door.
    pub async fn check_in(
        pool: &PgPool,
        ticket_id: DbId,
        now: Timestamp,
    ) -> Result<Ticket, LedgerError> {
        let mut tx = pool.begin().await?;

        let (ticket, _) = Self::lock_with_screening(&mut tx, ticket_id)
            .await?
            .ok_or(ReservationError::TicketNotFound(ticket_id))?;
        ticket_ledger::check_check_in(&ticket.snapshot())?;

        let query = format!(
            "UPDATE tickets SET status_id = $2, checked_in_at = $3 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let ticket = sqlx::query_as::<_, Ticket>(&query)
            .bind(ticket_id)
            .bind(TicketStatus::Used.id())
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::info!(ticket_id, screening_id = ticket.screening_id, "Ticket checked in");
        Ok(ticket)
    }

    /// Cancel many tickets on behalf of staff. Each ticket is cancelled in
    /// its own transaction; rejected ones are skipped.
    pub async fn bulk_cancel(
        pool: &PgPool,
        ticket_ids: &[DbId],
        staff_id: DbId,
        reason: Option<&str>,
        now: Timestamp,
    ) -> Result<BulkReport, sqlx::Error> {
        let mut report = BulkReport::default();
        for &id in ticket_ids {
            let outcome = Self::cancel(pool, id, Requester::Staff(staff_id), reason, now).await;
            Self::record(&mut report, id, outcome)?;
        }
        tracing::info!(
            succeeded = report.succeeded,
            skipped = report.skipped,
            staff_id,
            "Bulk cancel finished"
        );
        Ok(report)
    }

    /// Check in many tickets. Rejected ones are skipped.
    pub async fn bulk_mark_used(
        pool: &PgPool,
        ticket_ids: &[DbId],
        now: Timestamp,
    ) -> Result<BulkReport, sqlx::Error> {
        let mut report = BulkReport::default();
        for &id in ticket_ids {
            let outcome = Self::check_in(pool, id, now).await;
            Self::record(&mut report, id, outcome)?;
        }
        tracing::info!(
            succeeded = report.succeeded,
            skipped = report.skipped,
            "Bulk mark-used finished"
        );
        Ok(report)
    }

    /// Find a ticket by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Ticket>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tickets WHERE id = $1");
        sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Ticket with its screening, room and promo code.
    pub async fn find_detail(pool: &PgPool, id: DbId) -> Result<Option<TicketDetail>, sqlx::Error> {
        let query = format!("SELECT {DETAIL_COLUMNS} {DETAIL_FROM} WHERE tk.id = $1");
        sqlx::query_as::<_, TicketDetail>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// A user's tickets, latest screening first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        status_id: Option<StatusId>,
    ) -> Result<Vec<TicketDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {DETAIL_COLUMNS} {DETAIL_FROM} \
             WHERE tk.user_id = $1 \
               AND ($2::SMALLINT IS NULL OR tk.status_id = $2) \
             ORDER BY s.show_time DESC, tk.id DESC"
        );
        sqlx::query_as::<_, TicketDetail>(&query)
            .bind(user_id)
            .bind(status_id)
            .fetch_all(pool)
            .await
    }

    /// All tickets, newest first, for staff.
    pub async fn list_all(
        pool: &PgPool,
        status_id: Option<StatusId>,
        screening_id: Option<DbId>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TicketDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {DETAIL_COLUMNS} {DETAIL_FROM} \
             WHERE ($1::SMALLINT IS NULL OR tk.status_id = $1) \
               AND ($2::BIGINT IS NULL OR tk.screening_id = $2) \
             ORDER BY tk.purchased_at DESC, tk.id DESC \
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, TicketDetail>(&query)
            .bind(status_id)
            .bind(screening_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Transaction helpers
    // -----------------------------------------------------------------------

    async fn held_seats(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        screening_id: DbId,
    ) -> Result<Vec<HeldSeat>, sqlx::Error> {
        let rows = sqlx::query_as::<_, (DbId, DbId, String)>(
            "SELECT id, user_id, seat_label FROM tickets \
             WHERE screening_id = $1 AND status_id = $2",
        )
        .bind(screening_id)
        .bind(TicketStatus::Active.id())
        .fetch_all(&mut **tx)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(ticket_id, user_id, seat_label)| HeldSeat {
                ticket_id,
                user_id,
                seat_label,
            })
            .collect())
    }

    /// Lock a ticket's screening, then the ticket itself.
    async fn lock_with_screening(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        ticket_id: DbId,
    ) -> Result<Option<(Ticket, Screening)>, sqlx::Error> {
        let screening_id =
            sqlx::query_scalar::<_, DbId>("SELECT screening_id FROM tickets WHERE id = $1")
                .bind(ticket_id)
                .fetch_optional(&mut **tx)
                .await?;
        let Some(screening_id) = screening_id else {
            return Ok(None);
        };
        let Some(screening) = ScreeningRepo::lock(tx, screening_id).await? else {
            return Ok(None);
        };

        let query = format!("SELECT {COLUMNS} FROM tickets WHERE id = $1 FOR UPDATE");
        let ticket = sqlx::query_as::<_, Ticket>(&query)
            .bind(ticket_id)
            .fetch_optional(&mut **tx)
            .await?;
        Ok(ticket.map(|t| (t, screening)))
    }

    fn record(
        report: &mut BulkReport,
        ticket_id: DbId,
        outcome: Result<Ticket, LedgerError>,
    ) -> Result<(), sqlx::Error> {
        match outcome {
            Ok(_) => report.record_success(),
            Err(LedgerError::Rejected(rejection)) => {
                tracing::debug!(ticket_id, reason = %rejection, "Bulk item skipped");
                report.record_skip(ticket_id, rejection.to_string());
            }
            Err(LedgerError::Database(err)) => return Err(err),
        }
        Ok(())
    }
}
