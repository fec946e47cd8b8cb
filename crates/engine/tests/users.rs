use chrono::{Duration, NaiveDate, Utc};
use sea_orm::{Database, DatabaseConnection};

use engine::{AnchorDay, Engine, EngineError, Money};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db.clone()).build();
    (engine, db)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn anchor(day: u32) -> AnchorDay {
    AnchorDay::new(day).unwrap()
}

#[tokio::test]
async fn register_creates_user_and_first_allocation() {
    let (engine, _db) = engine_with_db().await;

    let user = engine
        .register_user("alice", "s3cret", anchor(8), Money::new(100_000), date(2024, 3, 5))
        .await
        .unwrap();
    assert_eq!(user.username, "alice");
    assert_eq!(user.anchor_day, anchor(8));

    let allocations = engine.list_allocations("alice").await.unwrap();
    assert_eq!(allocations.len(), 1);
    assert_eq!(allocations[0].cycle_start, date(2024, 2, 8));
    assert_eq!(allocations[0].allocated, Money::new(100_000));
}

#[tokio::test]
async fn duplicate_username_is_rejected_without_side_effects() {
    let (engine, _db) = engine_with_db().await;
    engine
        .register_user("alice", "one", anchor(8), Money::new(1_000), date(2024, 3, 5))
        .await
        .unwrap();

    let err = engine
        .register_user(" alice ", "two", anchor(1), Money::new(5_000), date(2024, 4, 5))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("alice".to_string()));

    assert_eq!(engine.list_allocations("alice").await.unwrap().len(), 1);
    assert!(engine.authenticate("alice", "one").await.is_ok());
    assert_eq!(
        engine.authenticate("alice", "two").await.unwrap_err(),
        EngineError::InvalidCredentials
    );
}

#[tokio::test]
async fn concurrent_registrations_of_one_name_conflict() {
    let (engine, _db) = engine_with_db().await;

    let (first, second) = tokio::join!(
        engine.register_user("alice", "one", anchor(8), Money::new(1_000), date(2024, 3, 5)),
        engine.register_user("alice", "two", anchor(8), Money::new(2_000), date(2024, 3, 5)),
    );
    let mut outcomes = [first, second];
    outcomes.sort_by_key(|outcome| outcome.is_err());
    assert!(outcomes[0].is_ok());
    assert_eq!(
        outcomes[1].as_ref().unwrap_err(),
        &EngineError::ExistingKey("alice".to_string())
    );
    assert_eq!(engine.list_allocations("alice").await.unwrap().len(), 1);
}

#[tokio::test]
async fn invalid_registration_creates_nothing() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .register_user("bob", "pw", anchor(8), Money::ZERO, date(2024, 3, 5))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let err = engine
        .register_user("bob", "", anchor(8), Money::new(100), date(2024, 3, 5))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));

    assert!(matches!(
        engine.user("bob").await.unwrap_err(),
        EngineError::KeyNotFound(_)
    ));
}

#[tokio::test]
async fn lookups_normalise_the_username() {
    let (engine, _db) = engine_with_db().await;
    engine
        .register_user("alice", "pw", anchor(8), Money::new(100), date(2024, 3, 10))
        .await
        .unwrap();

    assert_eq!(engine.user("  alice ").await.unwrap().username, "alice");
    let allocation = engine
        .set_budget(" alice", Money::new(200), date(2024, 4, 10))
        .await
        .unwrap();
    assert_eq!(allocation.user_id, "alice");
}

#[tokio::test]
async fn authenticate_hides_which_part_is_wrong() {
    let (engine, _db) = engine_with_db().await;
    engine
        .register_user("alice", "s3cret", anchor(8), Money::new(100), date(2024, 3, 5))
        .await
        .unwrap();

    assert_eq!(
        engine.authenticate("alice", "s3cret").await.unwrap().username,
        "alice"
    );
    assert_eq!(
        engine.authenticate("alice", "nope").await.unwrap_err(),
        EngineError::InvalidCredentials
    );
    assert_eq!(
        engine.authenticate("mallory", "s3cret").await.unwrap_err(),
        EngineError::InvalidCredentials
    );
}

#[tokio::test]
async fn update_anchor_day_moves_future_cycles() {
    let (engine, _db) = engine_with_db().await;
    engine
        .register_user("alice", "pw", anchor(8), Money::new(100), date(2024, 3, 10))
        .await
        .unwrap();

    let user = engine.update_anchor_day("alice", anchor(31)).await.unwrap();
    assert_eq!(user.anchor_day, anchor(31));

    // The cycle containing 2024-03-10 now starts on 2024-02-29 and has no
    // allocation yet; the old one is untouched.
    let allocation = engine
        .set_budget("alice", Money::new(2_000), date(2024, 3, 10))
        .await
        .unwrap();
    assert_eq!(allocation.cycle_start, date(2024, 2, 29));
    assert!(
        engine
            .allocation("alice", date(2024, 3, 8))
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn sessions_resolve_expire_and_close() {
    let (engine, _db) = engine_with_db().await;
    engine
        .register_user("alice", "pw", anchor(8), Money::new(100), date(2024, 3, 10))
        .await
        .unwrap();

    let now = Utc::now();
    let token = engine
        .open_session("alice", now, Duration::hours(1))
        .await
        .unwrap();

    let user = engine.session_user(&token, now).await.unwrap();
    assert_eq!(user.username, "alice");

    assert!(matches!(
        engine
            .session_user(&token, now + Duration::hours(2))
            .await
            .unwrap_err(),
        EngineError::Unauthorized(_)
    ));

    let purged = engine
        .purge_expired_sessions(now + Duration::hours(2))
        .await
        .unwrap();
    assert_eq!(purged, 1);

    let token = engine
        .open_session("alice", now, Duration::hours(1))
        .await
        .unwrap();
    engine.close_session(&token).await.unwrap();
    assert!(matches!(
        engine.session_user(&token, now).await.unwrap_err(),
        EngineError::Unauthorized(_)
    ));
}
