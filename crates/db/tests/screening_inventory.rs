//! Integration tests for screening inventory: the per-room no-overlap rule,
//! deactivation, and updates.

use assert_matches::assert_matches;
use chrono::{DateTime, Duration, Utc};
use cinema_core::error::ReservationError;
use cinema_db::models::movie::CreateMovie;
use cinema_db::models::screening::{CreateScreening, ScreeningFilter, UpdateScreening};
use cinema_db::models::theater::CreateTheater;
use cinema_db::models::ticket::PurchaseTicket;
use cinema_db::repositories::{MovieRepo, ScreeningRepo, TheaterRepo, TicketRepo};
use cinema_db::LedgerError;
use rust_decimal_macros::dec;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn movie(pool: &PgPool, minutes: i32) -> i64 {
    MovieRepo::create(
        pool,
        &CreateMovie {
            title: format!("Feature {minutes}"),
            description: None,
            duration_minutes: minutes,
            release_date: None,
        },
    )
    .await
    .unwrap()
    .id
}

async fn room(pool: &PgPool) -> i64 {
    let theater = TheaterRepo::create(
        pool,
        &CreateTheater {
            name: "Odeon".to_string(),
            address: None,
            row_count: 10,
            seats_per_row: 15,
            room_count: 1,
        },
    )
    .await
    .unwrap();
    theater.rooms[0].id
}

/// Tomorrow at `hour:minute` UTC.
fn tomorrow_at(hour: u32, minute: u32) -> DateTime<Utc> {
    (Utc::now().date_naive() + Duration::days(1))
        .and_hms_opt(hour, minute, 0)
        .unwrap()
        .and_utc()
}

fn screening(movie_id: i64, room_id: i64, show_time: DateTime<Utc>) -> CreateScreening {
    CreateScreening {
        movie_id,
        room_id,
        show_time,
        price: dec!(12.00),
    }
}

// ---------------------------------------------------------------------------
// Overlap
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_overlapping_screening_is_rejected(pool: PgPool) {
    let movie_id = movie(&pool, 120).await;
    let room_id = room(&pool).await;

    let first = ScreeningRepo::create(&pool, &screening(movie_id, room_id, tomorrow_at(18, 0)))
        .await
        .unwrap();
    let err = ScreeningRepo::create(&pool, &screening(movie_id, room_id, tomorrow_at(19, 0)))
        .await
        .unwrap_err();

    assert_matches!(
        err,
        LedgerError::Rejected(ReservationError::OverlapConflict { existing_id }) if existing_id == first.id
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_back_to_back_screenings_both_succeed(pool: PgPool) {
    let movie_id = movie(&pool, 120).await;
    let room_id = room(&pool).await;

    ScreeningRepo::create(&pool, &screening(movie_id, room_id, tomorrow_at(18, 0)))
        .await
        .unwrap();
    ScreeningRepo::create(&pool, &screening(movie_id, room_id, tomorrow_at(20, 0)))
        .await
        .expect("screening starting when the previous one ends should be accepted");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_same_time_in_other_room_is_allowed(pool: PgPool) {
    let movie_id = movie(&pool, 120).await;
    let room_a = room(&pool).await;
    let room_b = room(&pool).await;

    ScreeningRepo::create(&pool, &screening(movie_id, room_a, tomorrow_at(18, 0)))
        .await
        .unwrap();
    ScreeningRepo::create(&pool, &screening(movie_id, room_b, tomorrow_at(18, 0)))
        .await
        .unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unknown_movie_or_room_is_rejected(pool: PgPool) {
    let movie_id = movie(&pool, 90).await;
    let room_id = room(&pool).await;

    let err = ScreeningRepo::create(&pool, &screening(movie_id + 100, room_id, tomorrow_at(18, 0)))
        .await
        .unwrap_err();
    assert_matches!(err, LedgerError::Rejected(ReservationError::MovieOrRoomNotFound));

    let err = ScreeningRepo::create(&pool, &screening(movie_id, room_id + 100, tomorrow_at(18, 0)))
        .await
        .unwrap_err();
    assert_matches!(err, LedgerError::Rejected(ReservationError::MovieOrRoomNotFound));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_inactive_room_is_rejected(pool: PgPool) {
    let movie_id = movie(&pool, 90).await;
    let room_id = room(&pool).await;
    sqlx::query("UPDATE rooms SET is_active = false WHERE id = $1")
        .bind(room_id)
        .execute(&pool)
        .await
        .unwrap();

    let err = ScreeningRepo::create(&pool, &screening(movie_id, room_id, tomorrow_at(18, 0)))
        .await
        .unwrap_err();
    assert_matches!(err, LedgerError::Rejected(ReservationError::RoomInactive(id)) if id == room_id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_overlapping_inserts_admit_one(pool: PgPool) {
    let movie_id = movie(&pool, 120).await;
    let room_id = room(&pool).await;

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let pool = pool.clone();
            let input = screening(movie_id, room_id, tomorrow_at(18, i * 5));
            tokio::spawn(async move { ScreeningRepo::create(&pool, &input).await })
        })
        .collect();

    let results = futures::future::join_all(handles).await;
    let created = results
        .into_iter()
        .map(|r| r.unwrap())
        .filter(|r| r.is_ok())
        .count();
    assert_eq!(created, 1, "only one overlapping screening may commit");
}

// ---------------------------------------------------------------------------
// Deactivation and update
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deactivation_frees_the_slot(pool: PgPool) {
    let movie_id = movie(&pool, 120).await;
    let room_id = room(&pool).await;

    let first = ScreeningRepo::create(&pool, &screening(movie_id, room_id, tomorrow_at(18, 0)))
        .await
        .unwrap();
    let deactivated = ScreeningRepo::deactivate(&pool, first.id).await.unwrap();
    assert!(!deactivated.is_active);

    ScreeningRepo::create(&pool, &screening(movie_id, room_id, tomorrow_at(18, 30)))
        .await
        .expect("inactive screenings do not occupy the room");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_ticketed_screening_cannot_be_deactivated_or_moved(pool: PgPool) {
    let movie_id = movie(&pool, 120).await;
    let room_id = room(&pool).await;
    let s = ScreeningRepo::create(&pool, &screening(movie_id, room_id, tomorrow_at(18, 0)))
        .await
        .unwrap();
    TicketRepo::book(
        &pool,
        1,
        &PurchaseTicket {
            screening_id: s.id,
            seat_label: "A1".to_string(),
            promo_code: None,
        },
        Utc::now(),
    )
    .await
    .unwrap();

    let err = ScreeningRepo::deactivate(&pool, s.id).await.unwrap_err();
    assert_matches!(err, LedgerError::Rejected(ReservationError::HasActiveTickets(id)) if id == s.id);

    let update = UpdateScreening {
        show_time: Some(tomorrow_at(21, 0)),
        ..Default::default()
    };
    let err = ScreeningRepo::update(&pool, s.id, &update).await.unwrap_err();
    assert_matches!(err, LedgerError::Rejected(ReservationError::HasActiveTickets(_)));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_rechecks_overlap_excluding_itself(pool: PgPool) {
    let movie_id = movie(&pool, 120).await;
    let room_id = room(&pool).await;
    let early = ScreeningRepo::create(&pool, &screening(movie_id, room_id, tomorrow_at(14, 0)))
        .await
        .unwrap();
    ScreeningRepo::create(&pool, &screening(movie_id, room_id, tomorrow_at(18, 0)))
        .await
        .unwrap();

    let nudge = UpdateScreening {
        show_time: Some(tomorrow_at(14, 30)),
        ..Default::default()
    };
    let moved = ScreeningRepo::update(&pool, early.id, &nudge).await.unwrap();
    assert_eq!(moved.show_time, tomorrow_at(14, 30));

    let collide = UpdateScreening {
        show_time: Some(tomorrow_at(17, 0)),
        ..Default::default()
    };
    let err = ScreeningRepo::update(&pool, early.id, &collide).await.unwrap_err();
    assert_matches!(err, LedgerError::Rejected(ReservationError::OverlapConflict { .. }));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_missing_screening_reports_not_found(pool: PgPool) {
    let err = ScreeningRepo::deactivate(&pool, 4242).await.unwrap_err();
    assert_matches!(err, LedgerError::Rejected(ReservationError::ScreeningNotFound(4242)));
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_detail_lists_occupied_seats(pool: PgPool) {
    let movie_id = movie(&pool, 100).await;
    let room_id = room(&pool).await;
    let s = ScreeningRepo::create(&pool, &screening(movie_id, room_id, tomorrow_at(18, 0)))
        .await
        .unwrap();
    for (user, seat) in [(1, "c3"), (2, "A1")] {
        TicketRepo::book(
            &pool,
            user,
            &PurchaseTicket {
                screening_id: s.id,
                seat_label: seat.to_string(),
                promo_code: None,
            },
            Utc::now(),
        )
        .await
        .unwrap();
    }

    let detail = ScreeningRepo::find_detail(&pool, s.id).await.unwrap().unwrap();
    assert_eq!(detail.occupied_seats, vec!["A1", "C3"]);
    assert_eq!(detail.screening.total_seats, 150);
    assert_eq!(detail.screening.available_seats, 148);

    let upcoming = ScreeningRepo::list_upcoming(&pool, &ScreeningFilter::default(), Utc::now())
        .await
        .unwrap();
    assert_eq!(upcoming.len(), 1);
    assert_eq!(upcoming[0].movie_title, "Feature 100");
}
