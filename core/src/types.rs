//! Domain DTOs for the backend API.
//!
//! # Design
//! These types mirror the backend's schema but are defined independently.
//! Integration tests against the real backend router catch schema drift.
//! Field names are camelCase on the wire.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Day of the week a group meets. Serialized as an integer, Sunday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum DayOfWeek {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Sunday,
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DayOfWeek::Sunday => "Sunday",
            DayOfWeek::Monday => "Monday",
            DayOfWeek::Tuesday => "Tuesday",
            DayOfWeek::Wednesday => "Wednesday",
            DayOfWeek::Thursday => "Thursday",
            DayOfWeek::Friday => "Friday",
            DayOfWeek::Saturday => "Saturday",
        }
    }
}

impl From<DayOfWeek> for u8 {
    fn from(day: DayOfWeek) -> u8 {
        day as u8
    }
}

impl TryFrom<u8> for DayOfWeek {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        DayOfWeek::ALL
            .get(usize::from(value))
            .copied()
            .ok_or_else(|| format!("invalid day of week: {value}"))
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Student {
    pub id: u64,
    pub name: String,
    pub age: u8,
}

/// Writable fields of a student, used for both create and update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StudentInput {
    pub name: String,
    pub age: u8,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    pub student_id: u64,
    pub present: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Lesson {
    pub id: u64,
    pub date: NaiveDate,
    /// `HH:MM:SS`.
    pub time: String,
    #[serde(default)]
    pub attendance: Vec<Attendance>,
}

impl Lesson {
    pub fn is_present(&self, student_id: u64) -> bool {
        self.attendance
            .iter()
            .any(|a| a.student_id == student_id && a.present)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: u64,
    pub name: String,
    pub course: String,
    pub teacher: String,
    pub lesson_day: DayOfWeek,
    pub lesson_time: String,
    pub start_date: NaiveDate,
    pub back_office_url: String,
    #[serde(default)]
    pub students: Vec<Student>,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

impl Group {
    pub fn has_member(&self, student_id: u64) -> bool {
        self.students.iter().any(|s| s.id == student_id)
    }
}

/// Writable fields of a group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GroupInput {
    pub name: String,
    pub course: String,
    pub teacher: String,
    pub lesson_day: DayOfWeek,
    pub lesson_time: String,
    pub start_date: NaiveDate,
    pub back_office_url: String,
}

/// Payload for enrolling an existing student into a group.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MemberInput {
    pub student_id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LessonInput {
    pub date: NaiveDate,
    pub time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttendanceInput {
    pub records: Vec<Attendance>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Opaque bearer token returned by a successful login.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionToken {
    pub token: String,
}

/// The authenticated actor, as reported by `auth/me`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub username: String,
}
