//! Wire types owned by the backend.
//!
//! Defined independently of `tutor-core`; the dashboard's integration tests
//! drive this router with the core client to catch drift.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Response envelope. `data` is omitted on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: message.into(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: message.into(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Student {
    pub id: u64,
    pub name: String,
    pub age: u8,
}

#[derive(Debug, Deserialize)]
pub struct StudentInput {
    pub name: String,
    pub age: u8,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    pub student_id: u64,
    pub present: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Lesson {
    pub id: u64,
    pub date: NaiveDate,
    pub time: String,
    pub attendance: Vec<Attendance>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: u64,
    pub name: String,
    pub course: String,
    pub teacher: String,
    /// 0 = Sunday .. 6 = Saturday.
    pub lesson_day: u8,
    pub lesson_time: String,
    pub start_date: NaiveDate,
    pub back_office_url: String,
    pub students: Vec<Student>,
    pub lessons: Vec<Lesson>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupInput {
    pub name: String,
    pub course: String,
    pub teacher: String,
    pub lesson_day: u8,
    pub lesson_time: String,
    pub start_date: NaiveDate,
    pub back_office_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberInput {
    pub student_id: u64,
}

#[derive(Debug, Deserialize)]
pub struct LessonInput {
    pub date: NaiveDate,
    pub time: String,
}

#[derive(Debug, Deserialize)]
pub struct AttendanceInput {
    pub records: Vec<Attendance>,
}

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionToken {
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct User {
    pub username: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_omits_data() {
        let json = serde_json::to_value(ApiResponse::<Student>::fail("Student not found")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"success": false, "message": "Student not found"})
        );
    }

    #[test]
    fn group_input_reads_camel_case() {
        let input: GroupInput = serde_json::from_str(
            r#"{"name":"A","course":"Python","teacher":"Irina","lessonDay":2,
                "lessonTime":"18:30","startDate":"2025-09-02","backOfficeUrl":"https://bo"}"#,
        )
        .unwrap();
        assert_eq!(input.lesson_day, 2);
        assert_eq!(input.back_office_url, "https://bo");
    }

    #[test]
    fn student_input_rejects_missing_age() {
        let result: Result<StudentInput, _> = serde_json::from_str(r#"{"name":"Ann"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn student_input_rejects_negative_age() {
        let result: Result<StudentInput, _> = serde_json::from_str(r#"{"name":"Ann","age":-1}"#);
        assert!(result.is_err());
    }
}
