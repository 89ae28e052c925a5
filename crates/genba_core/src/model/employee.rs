//! Employee (`shain`) record.
//!
//! # Invariants
//! - `employee_number` is the storage key and never changes after creation.
//! - `email` is either empty or a plausible address.

use crate::model::validation::ValidationError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// Employee number, used as the document key in the `shain` collection.
pub type EmployeeId = String;

pub const DEFAULT_OFFICE: &str = "山口支店";
pub const DEFAULT_DEPARTMENT: &str = "工事部";

/// One roster entry.
///
/// Serialized with the roster sheet column names so stored documents, CSV
/// import rows and CSV export columns all share one vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    #[serde(rename = "社員番号")]
    pub employee_number: EmployeeId,
    #[serde(rename = "姓", default)]
    pub family_name: String,
    #[serde(rename = "名", default)]
    pub given_name: String,
    #[serde(rename = "事業所", default)]
    pub office: String,
    #[serde(rename = "部署", default)]
    pub department: String,
    #[serde(rename = "メールアドレス", default)]
    pub email: String,
}

impl Employee {
    /// Storage key of this record.
    pub fn id(&self) -> &str {
        self.employee_number.as_str()
    }

    /// Display name in roster order (`姓 名`).
    pub fn full_name(&self) -> String {
        format!("{} {}", self.family_name, self.given_name)
    }

    /// Checks record invariants before persistence.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.employee_number.trim().is_empty() {
            return Err(ValidationError::BlankId { kind: "employee" });
        }
        if !self.email.is_empty() && !EMAIL_RE.is_match(self.email.as_str()) {
            return Err(ValidationError::InvalidEmail(self.email.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Employee;
    use crate::model::validation::ValidationError;

    fn yamada() -> Employee {
        Employee {
            employee_number: "001".to_string(),
            family_name: "山田".to_string(),
            given_name: "太郎".to_string(),
            office: "山口支店".to_string(),
            department: "工事部".to_string(),
            email: "yamada@example.jp".to_string(),
        }
    }

    #[test]
    fn serializes_with_roster_column_names() {
        let value = serde_json::to_value(yamada()).unwrap();
        assert_eq!(value["社員番号"], "001");
        assert_eq!(value["姓"], "山田");
        assert_eq!(value["メールアドレス"], "yamada@example.jp");
    }

    #[test]
    fn missing_optional_columns_default_to_empty() {
        let employee: Employee =
            serde_json::from_str(r#"{"社員番号":"002","姓":"佐藤"}"#).unwrap();
        assert_eq!(employee.id(), "002");
        assert_eq!(employee.given_name, "");
        assert_eq!(employee.email, "");
    }

    #[test]
    fn validate_rejects_blank_number_and_bad_email() {
        let mut employee = yamada();
        employee.employee_number = "  ".to_string();
        assert_eq!(
            employee.validate(),
            Err(ValidationError::BlankId { kind: "employee" })
        );

        let mut employee = yamada();
        employee.email = "not-an-address".to_string();
        assert!(matches!(
            employee.validate(),
            Err(ValidationError::InvalidEmail(_))
        ));
    }

    #[test]
    fn full_name_joins_family_and_given() {
        assert_eq!(yamada().full_name(), "山田 太郎");
    }
}
