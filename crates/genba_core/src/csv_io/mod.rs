//! CSV import/export for roster and project sheets.
//!
//! # Responsibility
//! - Parse and serialize spreadsheet-compatible CSV (`codec`).
//! - Rebuild `Project` records from the flat sheets (`transform`).
//! - Produce export files from collection snapshots (`export`).
//!
//! # Invariants
//! - Produced CSV always starts with a UTF-8 BOM.
//! - Parsed values stay text; only `transform` reinterprets them.

pub mod codec;
pub mod export;
pub mod transform;

/// Roster sheet columns, in export order.
pub mod shain_columns {
    pub const EMPLOYEE_NUMBER: &str = "社員番号";
    pub const FAMILY_NAME: &str = "姓";
    pub const GIVEN_NAME: &str = "名";
    pub const OFFICE: &str = "事業所";
    pub const DEPARTMENT: &str = "部署";
    pub const EMAIL: &str = "メールアドレス";

    pub const ALL: [&str; 6] = [
        EMPLOYEE_NUMBER,
        FAMILY_NAME,
        GIVEN_NAME,
        OFFICE,
        DEPARTMENT,
        EMAIL,
    ];
}

/// Projects sheet columns; one row per task.
pub mod kouji_columns {
    pub const PROJECT_ID: &str = "工事ID";
    pub const PROJECT_NAME: &str = "工事名";
    pub const CLIENT: &str = "発注者";
    pub const LOCATION: &str = "場所";
    pub const CLIENT_CONTACT: &str = "発注担当";
    pub const REPRESENTATIVE_CATEGORY: &str = "代理人区分";
    pub const TASK_ID: &str = "作業ID";
    pub const TASK_NAME: &str = "作業名";
    pub const WORK_CATEGORY: &str = "作業区分";
    pub const START_DATE: &str = "開始日";
    pub const END_DATE: &str = "終了日";
    pub const PROGRESS: &str = "進捗";
    /// Space separated employee numbers.
    pub const ASSIGNEES: &str = "担当者";

    pub const ALL: [&str; 13] = [
        PROJECT_ID,
        PROJECT_NAME,
        CLIENT,
        LOCATION,
        CLIENT_CONTACT,
        REPRESENTATIVE_CATEGORY,
        TASK_ID,
        TASK_NAME,
        WORK_CATEGORY,
        START_DATE,
        END_DATE,
        PROGRESS,
        ASSIGNEES,
    ];
}

/// Work-history sheet columns.
pub mod keireki_columns {
    pub const PROJECT_ID: &str = "工事ID";
    pub const EMPLOYEE_NUMBER: &str = "社員番号";
    /// Optional; when blank the employee joins every task of the project.
    pub const TASK_ID: &str = "作業ID";
}
