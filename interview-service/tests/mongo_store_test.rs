mod common;

use common::{test_config, OTHER_USER_ID, TEST_USER_ID};
use interview_service::models::{
    InterviewSession, Message, MessageKind, Participant, ParticipantRole, SessionStatus,
};
use interview_service::services::{InterviewStore, MongoStore, SessionUpdate};
use service_core::error::AppError;

async fn connect() -> (MongoStore, String) {
    let config = test_config();
    let store = MongoStore::connect(&config.mongodb.uri, &config.mongodb.database)
        .await
        .expect("Failed to connect to MongoDB");
    store
        .initialize_indexes()
        .await
        .expect("Failed to create indexes");
    (store, config.mongodb.database)
}

async fn cleanup(store: &MongoStore, db_name: &str) {
    let _ = store.client().database(db_name).drop(None).await;
}

fn session() -> InterviewSession {
    InterviewSession::new(
        "Mongo loop".to_string(),
        "Platform Engineer".to_string(),
        None,
        TEST_USER_ID.to_string(),
        None,
    )
}

#[tokio::test]
#[ignore] // Requires MongoDB
async fn exclusive_role_index_rejects_second_joined_holder() {
    let (store, db_name) = connect().await;
    let session = session();
    store.insert_session(&session).await.unwrap();

    let first = Participant::new(
        session.session_id.clone(),
        TEST_USER_ID.to_string(),
        ParticipantRole::Candidate,
    );
    store.insert_participant(&first).await.unwrap();

    let second = Participant::new(
        session.session_id.clone(),
        OTHER_USER_ID.to_string(),
        ParticipantRole::Candidate,
    );
    let err = store.insert_participant(&second).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
    assert!(err.to_string().contains("candidate role"));

    // Once the first holder leaves the role is free again.
    let mut first = first;
    first.leave();
    store.replace_participant(&first).await.unwrap();
    store.insert_participant(&second).await.unwrap();

    cleanup(&store, &db_name).await;
}

#[tokio::test]
#[ignore] // Requires MongoDB
async fn one_participant_record_per_user() {
    let (store, db_name) = connect().await;
    let session = session();
    store.insert_session(&session).await.unwrap();

    let observer = Participant::new(
        session.session_id.clone(),
        TEST_USER_ID.to_string(),
        ParticipantRole::Observer,
    );
    store.insert_participant(&observer).await.unwrap();

    let duplicate = Participant::new(
        session.session_id.clone(),
        TEST_USER_ID.to_string(),
        ParticipantRole::Observer,
    );
    let err = store.insert_participant(&duplicate).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
    assert!(err.to_string().contains("already has a participant record"));

    cleanup(&store, &db_name).await;
}

#[tokio::test]
#[ignore] // Requires MongoDB
async fn sessions_and_messages_round_trip() {
    let (store, db_name) = connect().await;
    let mut session = session();
    store.insert_session(&session).await.unwrap();

    for content in ["one", "two", "three"] {
        let message = Message::new(
            session.session_id.clone(),
            TEST_USER_ID.to_string(),
            Some(ParticipantRole::Interviewer),
            content.to_string(),
            MessageKind::Text,
        );
        store.insert_message(&message).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let recent = store.recent_messages(&session.session_id, 2).await.unwrap();
    let contents: Vec<&str> = recent.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["two", "three"]);

    let since = recent[0].created_at;
    let newer = store
        .list_messages(&session.session_id, Some(since), 10)
        .await
        .unwrap();
    assert_eq!(newer.len(), 1);
    assert_eq!(newer[0].content, "three");

    session.start();
    store.replace_session(&session).await.unwrap();
    let loaded = store
        .find_session(&session.session_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded.status, session.status);

    let listed = store
        .list_sessions_for_user(TEST_USER_ID, 10, 0)
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);

    cleanup(&store, &db_name).await;
}

#[tokio::test]
#[ignore] // Requires MongoDB
async fn replacing_an_unknown_participant_is_not_found() {
    let (store, db_name) = connect().await;
    let session = session();
    store.insert_session(&session).await.unwrap();

    let stranger = Participant::new(
        session.session_id.clone(),
        OTHER_USER_ID.to_string(),
        ParticipantRole::Observer,
    );
    let err = store.replace_participant(&stranger).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    cleanup(&store, &db_name).await;
}

#[tokio::test]
#[ignore] // Requires MongoDB
async fn live_updates_start_once_and_never_reopen_ended_sessions() {
    let (store, db_name) = connect().await;
    let mut session = session();
    store.insert_session(&session).await.unwrap();

    let update = SessionUpdate {
        participant_roles: Some(vec![ParticipantRole::Interviewer, ParticipantRole::Candidate]),
        start: true,
    };
    let started = store
        .update_live_session(&session.session_id, &update)
        .await
        .unwrap();
    assert_eq!(started.status, SessionStatus::InProgress);
    let started_at = started.started_at.unwrap();

    // Starting again keeps the original start time.
    let again = store
        .update_live_session(&session.session_id, &SessionUpdate::start())
        .await
        .unwrap();
    assert_eq!(again.started_at, Some(started_at));
    assert_eq!(again.participant_roles.len(), 2);

    session.end();
    store.replace_session(&session).await.unwrap();
    let err = store
        .update_live_session(&session.session_id, &update)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let stored = store
        .find_session(&session.session_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, SessionStatus::Ended);
    assert!(stored.ended_at.is_some());

    let err = store
        .update_live_session("missing", &SessionUpdate::start())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    cleanup(&store, &db_name).await;
}
