use storage::repository::{SessionRecord, SessionStore};
use storage::sqlite::SqliteRepository;
use tutor_core::ProgressPolicy;
use tutor_core::model::{PathId, Score, Session, SessionKey, Turn};

fn build_session(path: &str) -> Session {
    let policy = ProgressPolicy::default();
    let key = SessionKey::for_path(&PathId::new(path));
    let mut session = Session::start(key, "Welcome to Databases!", 1, &policy);
    session.extend(
        [
            Turn::user("an index", None),
            Turn::system("What does a B-tree give you?")
                .with_code(Some("CREATE INDEX idx ON t(c);".into())),
            Turn::user("ordered lookups", Some(Score::new(8).unwrap())),
            Turn::system("Good. Next question...").with_feedback(Some("Spot on".into())),
        ],
        &policy,
    );
    session
}

#[tokio::test]
async fn sqlite_roundtrips_session_record() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_sessions?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let session = build_session("db-101");
    let record = SessionRecord::from_session(&session);
    repo.save(session.key(), &record).await.unwrap();

    let loaded = repo
        .load(session.key())
        .await
        .unwrap()
        .expect("record stored");
    assert_eq!(loaded, record);

    let restored = loaded.into_session(session.key().clone(), &ProgressPolicy::default());
    assert_eq!(restored, session);
    assert_eq!(restored.progress().percent(), 27);
}

#[tokio::test]
async fn sqlite_save_overwrites_and_ignores_identical_writes() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_overwrite?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let mut session = build_session("db-102");
    let key = session.key().clone();
    repo.save(&key, &SessionRecord::from_session(&session))
        .await
        .unwrap();
    repo.save(&key, &SessionRecord::from_session(&session))
        .await
        .unwrap();

    session.retreat();
    let moved = SessionRecord::from_session(&session);
    repo.save(&key, &moved).await.unwrap();

    let loaded = repo.load(&key).await.unwrap().unwrap();
    assert_eq!(loaded.cursor, Some(2));
    assert_eq!(loaded.ai_message, "What does a B-tree give you?");
    assert_eq!(loaded.code_snippet, "CREATE INDEX idx ON t(c);");
}

#[tokio::test]
async fn sqlite_keys_are_independent() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_keys?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    repo.migrate().await.expect("migrations are re-runnable");

    let session = build_session("a");
    repo.save(session.key(), &SessionRecord::from_session(&session))
        .await
        .unwrap();

    let other = SessionKey::for_path(&PathId::new("b"));
    assert!(repo.load(&other).await.unwrap().is_none());
}
