//! Integration tests for schedule expansion and schedule deletion.

use assert_matches::assert_matches;
use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use cinema_core::error::ReservationError;
use cinema_core::schedule::ScheduleDefinition;
use cinema_db::models::movie::CreateMovie;
use cinema_db::models::screening::CreateScreening;
use cinema_db::models::theater::CreateTheater;
use cinema_db::models::ticket::PurchaseTicket;
use cinema_db::repositories::{MovieRepo, ScheduleRepo, ScreeningRepo, TheaterRepo, TicketRepo};
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
            name: "Rialto".to_string(),
            address: Some("1 Main St".to_string()),
            row_count: 8,
            seats_per_row: 12,
            room_count: 2,
        },
    )
    .await
    .unwrap();
    theater.rooms[0].id
}

fn first_day() -> NaiveDate {
    Utc::now().date_naive() + Duration::days(2)
}

fn six_pm() -> NaiveTime {
    NaiveTime::from_hms_opt(18, 0, 0).unwrap()
}

fn daily_at_six(movie_id: i64, room_id: i64) -> ScheduleDefinition {
    ScheduleDefinition {
        movie_id,
        room_id,
        start_date: first_day(),
        end_date: first_day() + Duration::days(6),
        show_times: vec![six_pm()],
        days_of_week: (0..=6).collect(),
        price: dec!(9.50),
    }
}

// ---------------------------------------------------------------------------
// Expansion
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_existing_screening_produces_single_conflict(pool: PgPool) {
    let long_movie = movie(&pool, 120).await;
    let short_movie = movie(&pool, 90).await;
    let room_id = room(&pool).await;

    let day_three = first_day() + Duration::days(2);
    ScreeningRepo::create(
        &pool,
        &CreateScreening {
            movie_id: long_movie,
            room_id,
            show_time: day_three.and_time(six_pm()).and_utc(),
            price: dec!(10),
        },
    )
    .await
    .unwrap();

    let result = ScheduleRepo::expand(&pool, &daily_at_six(short_movie, room_id), Some(1), Utc::now())
        .await
        .unwrap();

    assert_eq!(result.screenings_created, 6);
    assert_eq!(result.conflicts.len(), 1);
    assert_eq!(result.conflicts[0].date, day_three);
    assert_eq!(result.conflicts[0].time, six_pm());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_rerun_reports_every_slot_as_conflict(pool: PgPool) {
    let movie_id = movie(&pool, 90).await;
    let room_id = room(&pool).await;
    let definition = daily_at_six(movie_id, room_id);

    let first = ScheduleRepo::expand(&pool, &definition, None, Utc::now()).await.unwrap();
    assert_eq!(first.screenings_created, 7);
    assert!(first.conflicts.is_empty());

    let second = ScheduleRepo::expand(&pool, &definition, None, Utc::now()).await.unwrap();
    assert_eq!(second.screenings_created, 0);
    assert_eq!(second.conflicts.len(), 7);
    assert_ne!(first.schedule_id, second.schedule_id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_created_screenings_reference_schedule(pool: PgPool) {
    let movie_id = movie(&pool, 90).await;
    let room_id = room(&pool).await;
    let result = ScheduleRepo::expand(&pool, &daily_at_six(movie_id, room_id), None, Utc::now())
        .await
        .unwrap();

    let linked: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM screenings WHERE schedule_id = $1")
            .bind(result.schedule_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(linked, 7);

    let saved = ScheduleRepo::find_by_id(&pool, result.schedule_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(saved.show_times, vec![six_pm()]);
    assert_eq!(saved.days_of_week, vec![0, 1, 2, 3, 4, 5, 6]);

    let listed = ScheduleRepo::list(&pool).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].screening_count, 7);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_expansion_into_inactive_room_is_rejected(pool: PgPool) {
    let movie_id = movie(&pool, 90).await;
    let room_id = room(&pool).await;
    sqlx::query("UPDATE rooms SET is_active = false WHERE id = $1")
        .bind(room_id)
        .execute(&pool)
        .await
        .unwrap();

    let err = ScheduleRepo::expand(&pool, &daily_at_six(movie_id, room_id), None, Utc::now())
        .await
        .unwrap_err();
    assert_matches!(err, LedgerError::Rejected(ReservationError::RoomInactive(_)));
}

// ---------------------------------------------------------------------------
// Deletion
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_keeps_ticketed_screenings(pool: PgPool) {
    let movie_id = movie(&pool, 90).await;
    let room_id = room(&pool).await;
    let result = ScheduleRepo::expand(&pool, &daily_at_six(movie_id, room_id), None, Utc::now())
        .await
        .unwrap();

    let ticketed: i64 = sqlx::query_scalar(
        "SELECT id FROM screenings WHERE schedule_id = $1 ORDER BY show_time LIMIT 1",
    )
    .bind(result.schedule_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    TicketRepo::book(
        &pool,
        7,
        &PurchaseTicket {
            screening_id: ticketed,
            seat_label: "B2".to_string(),
            promo_code: None,
        },
        Utc::now(),
    )
    .await
    .unwrap();
    assert_eq!(
        ScheduleRepo::count_active_tickets(&pool, result.schedule_id)
            .await
            .unwrap(),
        1
    );

    let deletion = ScheduleRepo::delete(&pool, result.schedule_id, Utc::now())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(deletion.deactivated, 6);
    assert_eq!(deletion.skipped, 1);

    let still_active = ScreeningRepo::find_by_id(&pool, ticketed).await.unwrap().unwrap();
    assert!(still_active.is_active);
    assert!(ScheduleRepo::list(&pool).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_unknown_schedule_returns_none(pool: PgPool) {
    let outcome = ScheduleRepo::delete(&pool, 999, Utc::now()).await.unwrap();
    assert!(outcome.is_none());
}
