use vowline_db::Database;
use vowline_db::queries::{NewEvent, NewQuestion, NewTemplateEvent};

fn open_db() -> (tempfile::TempDir, Database) {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(&dir.path().join("test.db")).unwrap();
    (dir, db)
}

fn seed_user(db: &Database, id: &str, username: &str) {
    db.create_user(
        id,
        username,
        &format!("{username}@example.com"),
        "hash",
        false,
    )
    .unwrap();
}

fn seed_timeline(db: &Database, id: &str, user_id: &str) {
    db.create_timeline(id, user_id, "Our wedding", "2026-09-12", 6, 24)
        .unwrap();
}

#[test]
fn migrations_are_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.db");

    let db = Database::open(&path).unwrap();
    drop(db);

    // Second open replays the bootstrapper against an already-migrated file.
    let db = Database::open(&path).unwrap();
    let settings = db.list_settings().unwrap();
    assert_eq!(settings.len(), 4);
}

#[test]
fn seeds_are_present() {
    let (_dir, db) = open_db();

    let site_name = db.get_setting("site_name").unwrap().unwrap();
    assert_eq!(site_name.value, "Vowline");

    let reset = db.get_email_template("password_reset").unwrap().unwrap();
    assert!(reset.body.contains("{{reset_url}}"));

    let templates = db.list_templates_with_counts().unwrap();
    assert_eq!(templates.len(), 1);
    assert_eq!(templates[0].template.name, "Classic full day");
    assert_eq!(templates[0].event_count, 9);

    let questions = db.list_active_questions().unwrap();
    assert_eq!(questions.len(), 3);
    // Guided order follows sort_order.
    assert!(questions[0].sort_order <= questions[1].sort_order);
}

#[test]
fn duplicate_username_is_rejected() {
    let (_dir, db) = open_db();
    seed_user(&db, "u1", "ava");

    let err = db.create_user("u2", "ava", "other@example.com", "hash", false);
    assert!(err.is_err());

    let err = db.create_user("u3", "someone", "ava@example.com", "hash", false);
    assert!(err.is_err(), "duplicate email should also be rejected");
}

#[test]
fn timeline_delete_cascades_to_events_and_restrictions() {
    let (_dir, db) = open_db();
    seed_user(&db, "u1", "ava");
    seed_timeline(&db, "t1", "u1");

    db.create_event(
        "t1",
        &NewEvent {
            id: "e1",
            title: "Ceremony",
            start_time: "15:00",
            end_time: "15:45",
            category: Some("ceremony"),
            color: None,
            notes: None,
        },
    )
    .unwrap();
    db.create_restriction("r1", "t1", "Noise curfew", "22:00", "24:00")
        .unwrap();
    db.create_share_token("s1", "t1", "tok-1").unwrap();

    assert!(db.delete_timeline("t1").unwrap());
    assert!(db.get_event("e1").unwrap().is_none());
    assert!(db.get_restriction("r1").unwrap().is_none());
    assert!(db.get_share_token("tok-1").unwrap().is_none());
}

#[test]
fn user_delete_cascades_to_timelines() {
    let (_dir, db) = open_db();
    seed_user(&db, "u1", "ava");
    seed_timeline(&db, "t1", "u1");

    assert!(db.delete_user("u1").unwrap());
    assert!(db.get_timeline("t1").unwrap().is_none());
}

#[test]
fn events_list_in_chronological_order() {
    let (_dir, db) = open_db();
    seed_user(&db, "u1", "ava");
    seed_timeline(&db, "t1", "u1");

    for (id, title, start, end) in [
        ("e1", "Dancing", "20:00", "23:00"),
        ("e2", "Hair & makeup", "09:00", "12:00"),
        ("e3", "Ceremony", "15:30", "16:15"),
    ] {
        db.create_event(
            "t1",
            &NewEvent {
                id,
                title,
                start_time: start,
                end_time: end,
                category: None,
                color: None,
                notes: None,
            },
        )
        .unwrap();
    }

    let events = db.list_events("t1").unwrap();
    let titles: Vec<&str> = events.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, ["Hair & makeup", "Ceremony", "Dancing"]);
}

#[test]
fn batch_insert_copies_template_events() {
    let (_dir, db) = open_db();
    seed_user(&db, "u1", "ava");
    seed_timeline(&db, "t1", "u1");

    let source = db
        .list_template_events("00000000-0000-0000-0000-000000000001")
        .unwrap();
    assert_eq!(source.len(), 9);

    let ids: Vec<String> = (0..source.len()).map(|i| format!("copy-{i}")).collect();
    let batch: Vec<NewEvent<'_>> = source
        .iter()
        .zip(&ids)
        .map(|(te, id)| NewEvent {
            id: id.as_str(),
            title: &te.title,
            start_time: &te.start_time,
            end_time: &te.end_time,
            category: te.category.as_deref(),
            color: te.color.as_deref(),
            notes: te.notes.as_deref(),
        })
        .collect();
    db.create_events("t1", &batch).unwrap();

    let events = db.list_events("t1").unwrap();
    assert_eq!(events.len(), 9);
    assert_eq!(events[0].title, "Hair & makeup");
}

#[test]
fn response_upsert_replaces_answer_and_keeps_row() {
    let (_dir, db) = open_db();
    seed_user(&db, "u1", "ava");
    seed_timeline(&db, "t1", "u1");
    let question = "00000000-0000-0000-0000-000000000202";

    db.upsert_response("resp1", "u1", "t1", question, true)
        .unwrap();
    db.upsert_response("resp2", "u1", "t1", question, false)
        .unwrap();

    let response = db.get_response("t1", question).unwrap().unwrap();
    assert_eq!(response.id, "resp1");
    assert!(!response.answer);
    assert_eq!(db.list_responses("t1").unwrap().len(), 1);
}

#[test]
fn reset_token_consumes_exactly_once() {
    let (_dir, db) = open_db();
    seed_user(&db, "u1", "ava");

    db.create_reset_token("pr1", "u1", "hash-abc", "2099-01-01 00:00:00")
        .unwrap();

    assert_eq!(
        db.consume_reset_token("hash-abc").unwrap().as_deref(),
        Some("u1")
    );
    assert!(db.consume_reset_token("hash-abc").unwrap().is_none());
}

#[test]
fn newer_reset_token_invalidates_older_one() {
    let (_dir, db) = open_db();
    seed_user(&db, "u1", "ava");

    db.create_reset_token("pr1", "u1", "hash-old", "2099-01-01 00:00:00")
        .unwrap();
    db.create_reset_token("pr2", "u1", "hash-new", "2099-01-01 00:00:00")
        .unwrap();

    assert!(db.consume_reset_token("hash-old").unwrap().is_none());
    assert_eq!(
        db.consume_reset_token("hash-new").unwrap().as_deref(),
        Some("u1")
    );
}

#[test]
fn expired_reset_token_is_rejected() {
    let (_dir, db) = open_db();
    seed_user(&db, "u1", "ava");

    db.create_reset_token("pr1", "u1", "hash-stale", "2000-01-01 00:00:00")
        .unwrap();
    assert!(db.consume_reset_token("hash-stale").unwrap().is_none());
}

#[test]
fn settings_upsert_overwrites_value() {
    let (_dir, db) = open_db();

    db.set_setting("registration_enabled", "false").unwrap();
    let row = db.get_setting("registration_enabled").unwrap().unwrap();
    assert_eq!(row.value, "false");

    db.set_setting("banner", "Welcome!").unwrap();
    assert_eq!(db.get_setting("banner").unwrap().unwrap().value, "Welcome!");
}

#[test]
fn share_token_round_trip_and_revoke() {
    let (_dir, db) = open_db();
    seed_user(&db, "u1", "ava");
    seed_timeline(&db, "t1", "u1");

    db.create_share_token("s1", "t1", "tok-deadbeef").unwrap();
    db.create_share_token("s2", "t1", "tok-cafe").unwrap();

    let found = db.get_share_token("tok-deadbeef").unwrap().unwrap();
    assert_eq!(found.timeline_id, "t1");
    assert_eq!(db.list_share_tokens("t1").unwrap().len(), 2);

    // Wrong timeline scope must not revoke.
    assert!(!db.delete_share_token("s1", "other").unwrap());
    assert!(db.delete_share_token("s1", "t1").unwrap());
    assert!(db.get_share_token("tok-deadbeef").unwrap().is_none());
    assert!(db.get_share_token("tok-cafe").unwrap().is_some());
}

#[test]
fn template_event_update_round_trip() {
    let (_dir, db) = open_db();
    db.create_template("tpl1", "Minimal", None).unwrap();
    db.create_template_event(
        "tpl1",
        &NewTemplateEvent {
            id: "te1",
            title: "Ceremony",
            start_time: "15:00",
            end_time: "15:30",
            category: None,
            color: None,
            notes: None,
            sort_order: 10,
        },
    )
    .unwrap();

    db.update_template_event(
        "te1",
        &NewTemplateEvent {
            id: "te1",
            title: "Ceremony",
            start_time: "16:00",
            end_time: "16:30",
            category: Some("ceremony"),
            color: None,
            notes: None,
            sort_order: 10,
        },
    )
    .unwrap();

    let row = db.get_template_event("te1").unwrap().unwrap();
    assert_eq!(row.start_time, "16:00");
    assert_eq!(row.category.as_deref(), Some("ceremony"));

    assert!(db.delete_template("tpl1").unwrap());
    assert!(db.get_template_event("te1").unwrap().is_none());
}

#[test]
fn inactive_questions_hidden_from_planners() {
    let (_dir, db) = open_db();
    db.create_question(&NewQuestion {
        id: "q-extra",
        prompt: "Will there be fireworks?",
        category: Some("reception"),
        default_title: "Fireworks",
        default_start_time: "22:00",
        default_end_time: "22:15",
        default_color: None,
        sort_order: 99,
        active: false,
    })
    .unwrap();

    let active = db.list_active_questions().unwrap();
    assert!(active.iter().all(|q| q.id != "q-extra"));

    let all = db.list_questions().unwrap();
    assert!(all.iter().any(|q| q.id == "q-extra"));
}

#[test]
fn admin_listing_counts_timelines() {
    let (_dir, db) = open_db();
    seed_user(&db, "u1", "ava");
    seed_user(&db, "u2", "ben");
    seed_timeline(&db, "t1", "u1");
    seed_timeline(&db, "t2", "u1");

    let rows = db.list_users_with_counts().unwrap();
    assert_eq!(rows.len(), 2);

    let ava = rows.iter().find(|r| r.user.username == "ava").unwrap();
    let ben = rows.iter().find(|r| r.user.username == "ben").unwrap();
    assert_eq!(ava.timeline_count, 2);
    assert_eq!(ben.timeline_count, 0);
}
