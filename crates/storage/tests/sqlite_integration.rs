use exam_core::AggregateScore;
use exam_core::time::fixed_now;
use storage::repository::{PROGRESS_KEY, ProgressRecord, ProgressRepository, StorageError};
use storage::sqlite::SqliteRepository;

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

#[tokio::test]
async fn sqlite_roundtrip_persists_progress() {
    let repo = connect("memdb_progress_roundtrip").await;
    assert!(repo.load_progress(PROGRESS_KEY).await.unwrap().is_none());

    let score = AggregateScore {
        total_questions: 3,
        answered_count: 3,
        correct_count: 2,
        incorrect_count: 1,
    };
    let record = ProgressRecord::from_score(&score, fixed_now());
    repo.save_progress(PROGRESS_KEY, &record).await.unwrap();

    let loaded = repo.load_progress(PROGRESS_KEY).await.unwrap();
    assert_eq!(loaded, Some(record));
}

#[tokio::test]
async fn sqlite_upsert_keeps_single_row_per_key() {
    let repo = connect("memdb_progress_upsert").await;
    let mut record = ProgressRecord::from_score(&AggregateScore::new(5), fixed_now());
    repo.save_progress(PROGRESS_KEY, &record).await.unwrap();
    record.answered_questions = 1;
    record.correct_answers = 1;
    repo.save_progress(PROGRESS_KEY, &record).await.unwrap();

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM kv_store")
        .fetch_one(repo.pool())
        .await
        .unwrap();
    assert_eq!(count, 1);
    let loaded = repo.load_progress(PROGRESS_KEY).await.unwrap().unwrap();
    assert_eq!(loaded.correct_answers, 1);
}

#[tokio::test]
async fn sqlite_migrations_are_idempotent() {
    let repo = connect("memdb_progress_migrate_twice").await;
    repo.migrate().await.expect("second migrate");
    let versions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM schema_migrations")
        .fetch_one(repo.pool())
        .await
        .unwrap();
    assert_eq!(versions, 1);
}

#[tokio::test]
async fn sqlite_malformed_value_surfaces_serialization_error() {
    let repo = connect("memdb_progress_malformed").await;
    sqlx::query("INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)")
        .bind(PROGRESS_KEY)
        .bind("not json")
        .bind(fixed_now())
        .execute(repo.pool())
        .await
        .unwrap();

    let err = repo.load_progress(PROGRESS_KEY).await.unwrap_err();
    assert!(matches!(err, StorageError::Serialization(_)));
}
