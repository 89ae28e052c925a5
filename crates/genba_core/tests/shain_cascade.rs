use chrono::NaiveDate;
use genba_core::db::open_db;
use genba_core::store::WriteBatch;
use genba_core::{
    Collection, DeleteConfirmation, DocumentStore, Employee, Project, ProjectService, RosterError,
    ShainService, SqliteDocumentStore, Task, TaskPatch, TaskUpdateOutcome,
};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()
}

fn employee(number: &str) -> Employee {
    Employee {
        employee_number: number.to_string(),
        family_name: "山田".to_string(),
        given_name: "太郎".to_string(),
        office: "山口支店".to_string(),
        department: "工事部".to_string(),
        email: String::new(),
    }
}

fn task(id: &str, assignees: &[&str]) -> Task {
    let mut task = Task::placeholder(id, "作業", today());
    task.assigned_to = assignees.iter().map(|id| id.to_string()).collect();
    task
}

fn project(id: &str, tasks: Vec<Task>) -> Project {
    let mut project = Project::new(id, format!("工事{id}"), today());
    project.tasks = tasks;
    project
}

fn seeded_store(store: &SqliteDocumentStore<'_>) {
    let mut batch = WriteBatch::new();
    for number in ["001", "002"] {
        batch.set(&employee(number)).unwrap();
    }
    batch
        .set(&project("P1", vec![task("T1", &["001", "002"]), task("T1b", &[])]))
        .unwrap();
    batch.set(&project("P2", vec![task("T2", &["001"])])).unwrap();
    batch.set(&project("P3", vec![task("T3", &["002"])])).unwrap();
    store.commit(&batch).unwrap();
}

fn revision(store: &SqliteDocumentStore<'_>, project_id: &str) -> i64 {
    store
        .get(Collection::Projects, project_id)
        .unwrap()
        .unwrap()
        .revision
}

#[test]
fn deleting_an_employee_strips_every_assignment_in_one_batch() {
    let conn = genba_core::db::open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();
    seeded_store(&store);
    let untouched_revision = revision(&store, "P3");

    let service = ShainService::new(&store).unwrap();
    let report = service
        .delete("001", DeleteConfirmation::parse("DELETE").unwrap())
        .unwrap();
    assert_eq!(report.updated_projects, ["P1", "P2"]);

    assert!(store.get(Collection::Shain, "001").unwrap().is_none());
    assert_eq!(revision(&store, "P3"), untouched_revision);
    assert_eq!(revision(&store, "P1"), untouched_revision + 1);

    let roster = service.employees();
    assert_eq!(roster.len(), 1);
    for stored in store.snapshot(Collection::Projects).unwrap().documents {
        let project: Project = serde_json::from_value(stored.body).unwrap();
        assert!(!project.references_employee("001"), "{} still references 001", project.id);
    }
    assert!(service.dangling_assignments().is_empty());
}

#[test]
fn task_order_and_other_assignees_survive_the_cascade() {
    let conn = genba_core::db::open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();
    seeded_store(&store);

    let service = ShainService::new(&store).unwrap();
    service
        .delete("001", DeleteConfirmation::parse("DELETE").unwrap())
        .unwrap();

    let stored = store.get(Collection::Projects, "P1").unwrap().unwrap();
    let p1: Project = serde_json::from_value(stored.body).unwrap();
    let ids: Vec<&str> = p1.tasks.iter().map(|task| task.id.as_str()).collect();
    assert_eq!(ids, ["T1", "T1b"]);
    assert!(p1.tasks[0].is_assigned("002"));
    assert_eq!(p1.name, "工事P1");
}

#[test]
fn unconfirmed_delete_changes_nothing() {
    let conn = genba_core::db::open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();
    seeded_store(&store);
    let before = store.snapshot(Collection::Projects).unwrap();

    assert!(matches!(
        DeleteConfirmation::parse("delete"),
        Err(RosterError::NotConfirmed)
    ));
    assert!(store.get(Collection::Shain, "001").unwrap().is_some());
    assert_eq!(store.snapshot(Collection::Projects).unwrap(), before);
}

#[test]
fn task_list_changed_by_another_client_rolls_back_the_cascade() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("genba.sqlite3");
    let conn_a = open_db(&path).unwrap();
    let conn_b = open_db(&path).unwrap();
    let store_a = SqliteDocumentStore::try_new(&conn_a).unwrap();
    let store_b = SqliteDocumentStore::try_new(&conn_b).unwrap();
    seeded_store(&store_a);

    let service_a = ShainService::new(&store_a).unwrap();
    let p1_before = revision(&store_a, "P1");
    let p2_before = revision(&store_a, "P2");

    let outcome = ProjectService::new(&store_b)
        .unwrap()
        .update_task(
            "P1",
            "T1b",
            &TaskPatch {
                progress: Some(60),
                ..TaskPatch::default()
            },
        )
        .unwrap();
    assert!(matches!(outcome, TaskUpdateOutcome::Applied(_)));

    let err = service_a
        .delete("001", DeleteConfirmation::parse("DELETE").unwrap())
        .unwrap_err();
    assert!(matches!(
        err,
        RosterError::StaleSnapshot { collection: Collection::Projects, ref id } if id == "P1"
    ));

    assert!(store_a.get(Collection::Shain, "001").unwrap().is_some());
    assert_eq!(revision(&store_a, "P1"), p1_before + 1);
    assert_eq!(revision(&store_a, "P2"), p2_before);
    let stored = store_a.get(Collection::Projects, "P1").unwrap().unwrap();
    let p1: Project = serde_json::from_value(stored.body).unwrap();
    assert!(p1.tasks[0].is_assigned("001"));
    assert_eq!(p1.tasks[1].progress, 60);
    let stored = store_a.get(Collection::Projects, "P2").unwrap().unwrap();
    let p2: Project = serde_json::from_value(stored.body).unwrap();
    assert!(p2.references_employee("001"));
}

#[test]
fn deleting_an_unknown_employee_is_not_found_and_commits_nothing() {
    let conn = genba_core::db::open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();
    seeded_store(&store);
    let version = store.snapshot(Collection::Shain).unwrap().version;

    let service = ShainService::new(&store).unwrap();
    let err = service
        .delete("404", DeleteConfirmation::parse("DELETE").unwrap())
        .unwrap_err();
    assert!(matches!(
        err,
        RosterError::NotFound { collection: Collection::Shain, ref id } if id == "404"
    ));
    assert_eq!(store.snapshot(Collection::Shain).unwrap().version, version);
    assert_eq!(service.employees().len(), 2);
}
