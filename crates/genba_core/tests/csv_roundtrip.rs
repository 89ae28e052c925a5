use chrono::NaiveDate;
use genba_core::{
    export_employees, export_projects, parse_csv, transform_csv_to_projects, write_export,
    employees_from_csv, Employee, Project, RosterError,
};
use std::fs;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()
}

fn employee(number: &str, email: &str) -> Employee {
    Employee {
        employee_number: number.to_string(),
        family_name: "山田".to_string(),
        given_name: "太郎".to_string(),
        office: "山口支店".to_string(),
        department: "工事部".to_string(),
        email: email.to_string(),
    }
}

#[test]
fn roster_export_written_to_disk_reimports_unchanged() {
    let roster = vec![employee("001", "yamada@example.com"), employee("002", "")];
    let export = export_employees(&roster).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = write_export(dir.path(), &export).unwrap();
    assert!(path.ends_with("社員名簿.csv"));

    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(employees_from_csv(&text), roster);
    assert_eq!(parse_csv(&text).len(), 2);
}

#[test]
fn project_export_keeps_tasks_and_assignments() {
    let mut project = Project::new("K-1", "護岸補修", today());
    project.client = "山口市".to_string();
    let mut second = project.tasks[0].clone();
    second.id = "K-1-2".to_string();
    second.name = "据付".to_string();
    second.assigned_to.insert("002".to_string());
    second.progress = 75;
    project.tasks.push(second);
    project.tasks[0].assigned_to.insert("001".to_string());

    let export = export_projects(&[project.clone()]).unwrap();
    assert_eq!(export.row_count, 2);

    let roster = export_employees(&[employee("001", ""), employee("002", "")]).unwrap();
    let reimported = transform_csv_to_projects(&export.content, &roster.content, "", today()).unwrap();
    assert_eq!(reimported, vec![project]);
}

#[test]
fn assignees_missing_from_roster_are_dropped_on_import() {
    let kouji = "工事ID,工事名,担当者\nK-1,工事,001 999\n";
    let projects = transform_csv_to_projects(kouji, "社員番号\n001\n", "", today()).unwrap();
    let assignees: Vec<&str> = projects[0].tasks[0]
        .assigned_to
        .iter()
        .map(String::as_str)
        .collect();
    assert_eq!(assignees, ["001"]);
}

#[test]
fn empty_roster_export_is_refused() {
    let err = export_employees(&[]).unwrap_err();
    assert!(matches!(err, RosterError::EmptyExport { .. }));
    assert_eq!(err.user_notice(), "エクスポートするデータがありません。");
}
