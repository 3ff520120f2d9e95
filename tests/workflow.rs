mod common;

use std::sync::{Arc, Barrier};
use std::thread;

use tasktrack::error::Error;
use tasktrack::notify::{ReviewNotice, deliver};
use tasktrack::store::Store;
use tasktrack::types::{PermitLists, TaskFilter, TaskState};
use tasktrack::workflow::{NewTask, SEPARATOR, UpdateIntent, parse_entries};

use common::*;

fn new_task(name: &str, app: &str) -> NewTask {
    NewTask {
        name: name.to_string(),
        app_acronym: app.to_string(),
        ..NewTask::default()
    }
}

fn move_to(to: TaskState) -> UpdateIntent {
    UpdateIntent::StateChange { to, note: None }
}

/// APP1 with alice (Dev), bob (no groups), carol (Eng) and dave (Lead).
fn seeded() -> TestDb {
    let db = TestDb::new();
    let store = db.store.as_ref();
    add_application(
        store,
        "APP1",
        PermitLists {
            create: groups(&["Dev"]),
            open: groups(&["Dev"]),
            todo: groups(&["Eng"]),
            doing: groups(&["Eng"]),
            done: groups(&["Lead"]),
        },
    );
    add_account(store, "alice", &["Dev"]);
    add_account(store, "bob", &[]);
    add_account(store, "carol", &["Eng"]);
    add_account(store, "dave", &["Lead"]);
    db
}

fn advance(store: &dyn Store, name: &str, steps: &[(&str, TaskState)]) {
    for (caller, to) in steps {
        store
            .update_task(caller, name, &move_to(*to))
            .unwrap_or_else(|e| panic!("{caller} -> {to}: {e}"));
    }
}

#[test]
fn test_release_keeps_owner_unset() {
    let db = seeded();
    let store = db.store.as_ref();

    let task = store.create_task("alice", &new_task("Login page", "APP1")).unwrap();
    assert_eq!(task.id, "APP1_1");
    assert_eq!(task.state, TaskState::Open);

    let outcome = store.update_task("alice", "Login page", &move_to(TaskState::ToDo)).unwrap();
    assert_eq!(outcome.task.state, TaskState::ToDo);
    assert_eq!(outcome.task.owner, None);
    assert!(outcome.notice.is_none());

    let stored = store.get_task("Login page").unwrap().unwrap();
    assert_eq!(stored.state, TaskState::ToDo);
    let entries = parse_entries(&stored.notes);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].body, "Task released.");
    assert!(entries[0].header.contains("TODO - alice"), "{}", entries[0].header);
}

#[test]
fn test_take_without_permit_is_rejected() {
    let db = seeded();
    let store = db.store.as_ref();
    store.create_task("alice", &new_task("Login page", "APP1")).unwrap();
    advance(store, "Login page", &[("alice", TaskState::ToDo)]);

    let err = store
        .update_task("bob", "Login page", &move_to(TaskState::Doing))
        .unwrap_err();
    assert!(matches!(err, Error::Forbidden(_)), "{err:?}");
    assert_eq!(err.code(), "unauthorized");

    let stored = store.get_task("Login page").unwrap().unwrap();
    assert_eq!(stored.state, TaskState::ToDo);
    assert_eq!(stored.owner, None);
}

#[test]
fn test_review_schedules_notice_for_done_groups() {
    let db = seeded();
    let store = db.store.as_ref();
    add_account(store, "erin", &["lead"]);
    store.create_task("alice", &new_task("Login page", "APP1")).unwrap();
    advance(
        store,
        "Login page",
        &[("alice", TaskState::ToDo), ("carol", TaskState::Doing)],
    );
    assert_eq!(
        store.get_task("Login page").unwrap().unwrap().owner.as_deref(),
        Some("carol")
    );

    let outcome = store.update_task("carol", "Login page", &move_to(TaskState::Done)).unwrap();
    assert_eq!(outcome.task.state, TaskState::Done);
    assert_eq!(outcome.task.owner, None);

    let notice = outcome.notice.expect("review produces a notice");
    assert_eq!(notice.task_id, "APP1_1");
    assert_eq!(notice.reviewer, "carol");
    assert!(notice.groups.contains("Lead"));

    let mailer = RecordingMailer::default();
    let sent = deliver(store, &mailer, &notice).unwrap();
    assert_eq!(sent, 2);

    let mail = &mailer.sent()[0];
    assert_eq!(mail.to, vec!["dave@example.com", "erin@example.com"]);
    assert!(mail.subject.contains("APP1_1"));
    assert!(mail.body.contains("carol"));
}

#[test]
fn test_review_with_empty_done_group_delivers_nothing() {
    let db = TestDb::new();
    let store = db.store.as_ref();
    add_application(store, "APP2", standard_permits());
    add_account(store, "alice", &["Dev"]);
    add_account(store, "carol", &["Eng"]);
    add_inactive_account(store, "lee", &["Lead"]);

    store.create_task("alice", &new_task("Solo", "APP2")).unwrap();
    advance(
        store,
        "Solo",
        &[("alice", TaskState::ToDo), ("carol", TaskState::Doing)],
    );
    let outcome = store.update_task("carol", "Solo", &move_to(TaskState::Done)).unwrap();

    let mailer = RecordingMailer::default();
    let notice = outcome.notice.unwrap();
    assert_eq!(deliver(store, &mailer, &notice).unwrap(), 0);
    assert!(mailer.sent().is_empty());
}

#[test]
fn test_plan_change_in_done_is_silent() {
    let db = seeded();
    let store = db.store.as_ref();
    add_plan(store, "OldPlan", "APP1");
    add_plan(store, "NewPlan", "APP1");

    let mut new = new_task("Login page", "APP1");
    new.plan = Some("OldPlan".to_string());
    store.create_task("alice", &new).unwrap();
    advance(
        store,
        "Login page",
        &[
            ("alice", TaskState::ToDo),
            ("carol", TaskState::Doing),
            ("carol", TaskState::Done),
        ],
    );
    let before = store.get_task("Login page").unwrap().unwrap();

    let intent = UpdateIntent::PlanChange {
        plan: Some("NewPlan".to_string()),
        note: None,
    };
    let outcome = store.update_task("dave", "Login page", &intent).unwrap();
    assert!(outcome.notice.is_none());

    let after = store.get_task("Login page").unwrap().unwrap();
    assert_eq!(after.plan.as_deref(), Some("NewPlan"));
    assert_eq!(after.state, TaskState::Done);
    assert_eq!(after.notes, before.notes);
}

#[test]
fn test_plan_change_with_transition_is_logged() {
    let db = seeded();
    let store = db.store.as_ref();
    add_plan(store, "Sprint 1", "APP1");
    store.create_task("alice", &new_task("Login page", "APP1")).unwrap();

    let intent = UpdateIntent::PlanAndState {
        plan: Some("Sprint 1".to_string()),
        to: TaskState::ToDo,
        note: Some("ready to pick up".to_string()),
    };
    let outcome = store.update_task("alice", "Login page", &intent).unwrap();
    assert_eq!(outcome.task.plan.as_deref(), Some("Sprint 1"));

    let bodies: Vec<String> = parse_entries(&outcome.task.notes)
        .into_iter()
        .map(|e| e.body)
        .collect();
    assert_eq!(
        bodies,
        vec![
            "ready to pick up",
            "Task released.",
            "Plan changed from none to Sprint 1.",
            "Task created.",
        ]
    );
}

#[test]
fn test_edges_outside_the_table_conflict() {
    let db = seeded();
    let store = db.store.as_ref();
    store.create_task("alice", &new_task("Login page", "APP1")).unwrap();

    for to in [TaskState::Doing, TaskState::Done, TaskState::Closed, TaskState::Open] {
        let err = store.update_task("alice", "Login page", &move_to(to)).unwrap_err();
        assert!(matches!(err, Error::Conflict(_)), "Open -> {to}: {err:?}");
        assert!(err.to_string().contains("reload"));
    }
    assert_eq!(
        store.get_task("Login page").unwrap().unwrap().state,
        TaskState::Open
    );
}

#[test]
fn test_full_lifecycle_with_reject() {
    let db = seeded();
    let store = db.store.as_ref();
    store.create_task("alice", &new_task("Login page", "APP1")).unwrap();
    advance(
        store,
        "Login page",
        &[
            ("alice", TaskState::ToDo),
            ("carol", TaskState::Doing),
            ("carol", TaskState::Done),
            ("dave", TaskState::Doing),
        ],
    );
    let rejected = store.get_task("Login page").unwrap().unwrap();
    assert_eq!(rejected.state, TaskState::Doing);
    assert_eq!(rejected.owner, None);

    let promoted = store.promote_task("carol", "Login page").unwrap();
    assert_eq!(promoted.task.state, TaskState::Done);
    assert!(promoted.notice.is_some());

    advance(store, "Login page", &[("dave", TaskState::Closed)]);
    let closed = store.get_task("Login page").unwrap().unwrap();
    assert_eq!(closed.state, TaskState::Closed);

    let err = store
        .update_task("dave", "Login page", &move_to(TaskState::Done))
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));

    let bodies: Vec<String> = parse_entries(&closed.notes).into_iter().map(|e| e.body).collect();
    assert_eq!(
        bodies,
        vec![
            "Task approved.",
            "Task reviewed.",
            "Task rejected.",
            "Task reviewed.",
            "Task taken.",
            "Task released.",
            "Task created.",
        ]
    );
}

#[test]
fn test_promote_requires_doing() {
    let db = seeded();
    let store = db.store.as_ref();
    store.create_task("alice", &new_task("Login page", "APP1")).unwrap();

    let err = store.promote_task("carol", "Login page").unwrap_err();
    assert!(matches!(err, Error::BadRequest(_)), "{err:?}");
}

#[test]
fn test_append_note_keeps_history() {
    let db = seeded();
    let store = db.store.as_ref();
    store.create_task("alice", &new_task("Login page", "APP1")).unwrap();

    store
        .append_task_note("bob", "Login page", &format!("first\n{SEPARATOR}\nstill first"))
        .unwrap();
    let task = store.append_task_note("carol", "Login page", "second").unwrap();

    let entries = parse_entries(&task.notes);
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].body, "second");
    assert!(entries[0].header.ends_with("OPEN - carol"), "{}", entries[0].header);
    assert!(entries[1].body.starts_with("first"));
    assert!(entries[1].body.contains("still first"));

    assert!(matches!(
        store.append_task_note("bob", "Login page", "  "),
        Err(Error::BadRequest(_))
    ));
    assert!(matches!(
        store.append_task_note("bob", "Nope", "hello"),
        Err(Error::NotFound(_))
    ));
}

#[test]
fn test_create_task_failures_roll_back() {
    let db = seeded();
    let store = db.store.as_ref();
    store.create_task("alice", &new_task("Login page", "APP1")).unwrap();

    let err = store.create_task("alice", &new_task("Login page", "APP1")).unwrap_err();
    assert!(matches!(err, Error::AlreadyExists(_)));
    assert_eq!(err.code(), "duplicate");

    let mut with_plan = new_task("Signup", "APP1");
    with_plan.plan = Some("Missing".to_string());
    assert!(matches!(
        store.create_task("alice", &with_plan),
        Err(Error::NotFound(_))
    ));

    assert!(matches!(
        store.create_task("carol", &new_task("Signup", "APP1")),
        Err(Error::Forbidden(_))
    ));
    assert!(matches!(
        store.create_task("alice", &new_task("Signup", "NOAPP")),
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        store.create_task("alice", &new_task(&"x".repeat(51), "APP1")),
        Err(Error::BadRequest(_))
    ));

    // None of the failures above consumed a revision.
    let next = store.create_task("alice", &new_task("Signup", "APP1")).unwrap();
    assert_eq!(next.id, "APP1_2");
    assert_eq!(store.get_application("APP1").unwrap().unwrap().revision, 2);
}

#[test]
fn test_list_filters() {
    let db = seeded();
    let store = db.store.as_ref();
    add_application(store, "APP2", standard_permits());
    add_plan(store, "Sprint 1", "APP1");

    let mut planned = new_task("Planned", "APP1");
    planned.plan = Some("Sprint 1".to_string());
    store.create_task("alice", &planned).unwrap();
    store.create_task("alice", &new_task("Released", "APP1")).unwrap();
    store.create_task("alice", &new_task("Other app", "APP2")).unwrap();
    advance(store, "Released", &[("alice", TaskState::ToDo)]);

    let all = store.list_tasks(&TaskFilter::default()).unwrap();
    assert_eq!(all.len(), 3);

    let app1 = TaskFilter {
        app: Some("APP1".to_string()),
        ..TaskFilter::default()
    };
    assert_eq!(store.list_tasks(&app1).unwrap().len(), 2);

    let open = store
        .list_tasks(&app1.clone().with_state(TaskState::Open))
        .unwrap();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].name, "Planned");

    let in_plan = TaskFilter {
        plan: Some("Sprint 1".to_string()),
        ..TaskFilter::default()
    };
    let names: Vec<String> = store
        .list_tasks(&in_plan)
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(names, vec!["Planned"]);
}

#[test]
fn test_concurrent_creation_mints_sequential_ids() {
    let db = seeded();
    const WRITERS: usize = 8;
    let barrier = Arc::new(Barrier::new(WRITERS));

    let handles: Vec<_> = (0..WRITERS)
        .map(|i| {
            let store = db.reopen();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                store
                    .create_task("alice", &new_task(&format!("Task {i}"), "APP1"))
                    .map(|t| t.id)
            })
        })
        .collect();

    let mut ids: Vec<String> = handles
        .into_iter()
        .map(|h| h.join().unwrap().unwrap())
        .collect();
    ids.sort_by_key(|id| id.trim_start_matches("APP1_").parse::<u32>().unwrap());

    let expected: Vec<String> = (1..=WRITERS).map(|n| format!("APP1_{n}")).collect();
    assert_eq!(ids, expected);
}

#[test]
fn test_concurrent_transitions_have_one_winner() {
    let db = seeded();
    add_account(db.store.as_ref(), "cody", &["Eng"]);
    db.store
        .create_task("alice", &new_task("Contested", "APP1"))
        .unwrap();
    advance(db.store.as_ref(), "Contested", &[("alice", TaskState::ToDo)]);

    let barrier = Arc::new(Barrier::new(2));
    let handles: Vec<_> = ["carol", "cody"]
        .into_iter()
        .map(|caller| {
            let store = db.reopen();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                store
                    .update_task(caller, "Contested", &move_to(TaskState::Doing))
                    .map(|o| o.task.owner)
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let winners: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    let losers: Vec<_> = results.iter().filter_map(|r| r.as_ref().err()).collect();

    assert_eq!(winners.len(), 1);
    assert_eq!(losers.len(), 1);
    assert!(matches!(losers[0], Error::Conflict(_)), "{:?}", losers[0]);

    let stored = db.store.get_task("Contested").unwrap().unwrap();
    assert_eq!(stored.state, TaskState::Doing);
    assert_eq!(&stored.owner, winners[0]);

    let takes = parse_entries(&stored.notes)
        .into_iter()
        .filter(|e| e.body == "Task taken.")
        .count();
    assert_eq!(takes, 1);
}

#[test]
fn test_notice_text() {
    let notice = ReviewNotice {
        task_id: "APP1_7".to_string(),
        task_name: "Login page".to_string(),
        app_acronym: "APP1".to_string(),
        reviewer: "carol".to_string(),
        groups: groups(&["Lead"]),
    };
    assert!(notice.subject().contains("[APP1]"));
    assert!(notice.body().contains("Login page"));
}
