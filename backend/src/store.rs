//! In-memory storage for students, groups, lessons and login tokens.
//!
//! Groups hold member ids in enrollment order and lessons point back at their
//! group; `group()` assembles the nested payload the API returns.

use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveDate, NaiveTime};

use crate::dto::{
    Attendance, AttendanceInput, Group, GroupInput, Lesson, LessonInput, Student, StudentInput,
};
use crate::error::BackendError;

pub const MIN_AGE: u8 = 6;
pub const MAX_AGE: u8 = 18;

#[derive(Debug, Clone)]
struct GroupRecord {
    id: u64,
    input: GroupInput,
    member_ids: Vec<u64>,
}

#[derive(Debug, Clone)]
struct LessonRecord {
    id: u64,
    group_id: u64,
    date: NaiveDate,
    time: String,
    attendance: Vec<Attendance>,
}

impl LessonRecord {
    fn to_lesson(&self) -> Lesson {
        Lesson {
            id: self.id,
            date: self.date,
            time: self.time.clone(),
            attendance: self.attendance.clone(),
        }
    }
}

#[derive(Debug, Default)]
pub struct Store {
    next_id: u64,
    students: BTreeMap<u64, Student>,
    groups: BTreeMap<u64, GroupRecord>,
    lessons: BTreeMap<u64, LessonRecord>,
    tokens: HashMap<String, String>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    pub fn students(&self) -> Vec<Student> {
        self.students.values().cloned().collect()
    }

    pub fn student(&self, id: u64) -> Result<Student, BackendError> {
        self.students
            .get(&id)
            .cloned()
            .ok_or(BackendError::NotFound("Student"))
    }

    pub fn create_student(&mut self, input: StudentInput) -> Result<Student, BackendError> {
        let input = validate_student(input)?;
        let student = Student {
            id: self.allocate_id(),
            name: input.name,
            age: input.age,
        };
        self.students.insert(student.id, student.clone());
        Ok(student)
    }

    pub fn update_student(&mut self, id: u64, input: StudentInput) -> Result<Student, BackendError> {
        let input = validate_student(input)?;
        let student = self
            .students
            .get_mut(&id)
            .ok_or(BackendError::NotFound("Student"))?;
        student.name = input.name;
        student.age = input.age;
        Ok(student.clone())
    }

    pub fn groups(&self) -> Vec<Group> {
        self.groups.values().map(|g| self.assemble(g)).collect()
    }

    pub fn group(&self, id: u64) -> Result<Group, BackendError> {
        self.groups
            .get(&id)
            .map(|g| self.assemble(g))
            .ok_or(BackendError::NotFound("Group"))
    }

    pub fn create_group(&mut self, input: GroupInput) -> Result<Group, BackendError> {
        let input = validate_group(input)?;
        let id = self.allocate_id();
        self.groups.insert(
            id,
            GroupRecord {
                id,
                input,
                member_ids: Vec::new(),
            },
        );
        self.group(id)
    }

    pub fn update_group(&mut self, id: u64, input: GroupInput) -> Result<Group, BackendError> {
        let input = validate_group(input)?;
        let record = self
            .groups
            .get_mut(&id)
            .ok_or(BackendError::NotFound("Group"))?;
        record.input = input;
        self.group(id)
    }

    pub fn add_member(&mut self, group_id: u64, student_id: u64) -> Result<Group, BackendError> {
        if !self.students.contains_key(&student_id) {
            return Err(BackendError::NotFound("Student"));
        }
        let record = self
            .groups
            .get_mut(&group_id)
            .ok_or(BackendError::NotFound("Group"))?;
        if record.member_ids.contains(&student_id) {
            return Err(BackendError::Conflict(
                "Student is already in this group".to_string(),
            ));
        }
        record.member_ids.push(student_id);
        self.group(group_id)
    }

    pub fn schedule_lesson(&mut self, group_id: u64, input: LessonInput) -> Result<Lesson, BackendError> {
        if !self.groups.contains_key(&group_id) {
            return Err(BackendError::NotFound("Group"));
        }
        let time = normalize_time(&input.time)?;
        let record = LessonRecord {
            id: self.allocate_id(),
            group_id,
            date: input.date,
            time,
            attendance: Vec::new(),
        };
        let lesson = record.to_lesson();
        self.lessons.insert(record.id, record);
        Ok(lesson)
    }

    /// Replace the attendance of a lesson. Every student must belong to the
    /// lesson's group.
    pub fn record_attendance(&mut self, lesson_id: u64, input: AttendanceInput) -> Result<Lesson, BackendError> {
        let group_id = self
            .lessons
            .get(&lesson_id)
            .map(|l| l.group_id)
            .ok_or(BackendError::NotFound("Lesson"))?;
        let members = self
            .groups
            .get(&group_id)
            .map(|g| g.member_ids.clone())
            .unwrap_or_default();
        if let Some(stranger) = input.records.iter().find(|r| !members.contains(&r.student_id)) {
            return Err(BackendError::Validation(format!(
                "Student {} is not in this group",
                stranger.student_id
            )));
        }
        let lesson = self
            .lessons
            .get_mut(&lesson_id)
            .ok_or(BackendError::NotFound("Lesson"))?;
        lesson.attendance = input.records;
        Ok(lesson.to_lesson())
    }

    pub fn issue_token(&mut self, username: &str) -> String {
        let token = uuid::Uuid::new_v4().to_string();
        self.tokens.insert(token.clone(), username.to_string());
        token
    }

    pub fn user_for_token(&self, token: &str) -> Option<&str> {
        self.tokens.get(token).map(String::as_str)
    }

    fn assemble(&self, record: &GroupRecord) -> Group {
        let students = record
            .member_ids
            .iter()
            .filter_map(|id| self.students.get(id).cloned())
            .collect();
        let mut lessons: Vec<Lesson> = self
            .lessons
            .values()
            .filter(|l| l.group_id == record.id)
            .map(LessonRecord::to_lesson)
            .collect();
        lessons.sort_by(|a, b| (a.date, &a.time).cmp(&(b.date, &b.time)));
        let input = &record.input;
        Group {
            id: record.id,
            name: input.name.clone(),
            course: input.course.clone(),
            teacher: input.teacher.clone(),
            lesson_day: input.lesson_day,
            lesson_time: input.lesson_time.clone(),
            start_date: input.start_date,
            back_office_url: input.back_office_url.clone(),
            students,
            lessons,
        }
    }

    /// A small data set so a freshly started backend has something to show.
    pub fn seeded() -> Self {
        let mut store = Self::new();
        let mut seed = || -> Result<(), BackendError> {
            let ann = store.create_student(StudentInput { name: "Ann".into(), age: 10 })?;
            let boris = store.create_student(StudentInput { name: "Boris".into(), age: 12 })?;
            store.create_student(StudentInput { name: "Vera".into(), age: 15 })?;
            store.create_student(StudentInput { name: "Gleb".into(), age: 9 })?;
            let python = store.create_group(GroupInput {
                name: "Python Start".into(),
                course: "Python".into(),
                teacher: "Irina Petrova".into(),
                lesson_day: 2,
                lesson_time: "18:30".into(),
                start_date: NaiveDate::from_ymd_opt(2025, 9, 2).unwrap_or_default(),
                back_office_url: "https://backoffice.example/groups/python-start".into(),
            })?;
            store.create_group(GroupInput {
                name: "Scratch Juniors".into(),
                course: "Scratch".into(),
                teacher: "Oleg Smirnov".into(),
                lesson_day: 6,
                lesson_time: "11:00".into(),
                start_date: NaiveDate::from_ymd_opt(2025, 9, 6).unwrap_or_default(),
                back_office_url: "https://backoffice.example/groups/scratch-juniors".into(),
            })?;
            store.add_member(python.id, ann.id)?;
            store.add_member(python.id, boris.id)?;
            let first = store.schedule_lesson(
                python.id,
                LessonInput {
                    date: python.start_date,
                    time: "18:30".into(),
                },
            )?;
            store.schedule_lesson(
                python.id,
                LessonInput {
                    date: python.start_date + chrono::Duration::days(7),
                    time: "18:30".into(),
                },
            )?;
            store.record_attendance(
                first.id,
                AttendanceInput {
                    records: vec![
                        Attendance { student_id: ann.id, present: true },
                        Attendance { student_id: boris.id, present: false },
                    ],
                },
            )?;
            Ok(())
        };
        if let Err(err) = seed() {
            tracing::warn!(error = %err, "seed data rejected");
        }
        store
    }
}

fn validate_student(input: StudentInput) -> Result<StudentInput, BackendError> {
    let name = input.name.trim().to_string();
    if name.chars().count() < 2 {
        return Err(BackendError::Validation(
            "Name must be at least 2 characters long.".to_string(),
        ));
    }
    if input.age < MIN_AGE {
        return Err(BackendError::Validation(format!("Minimal age must be {MIN_AGE}")));
    }
    if input.age > MAX_AGE {
        return Err(BackendError::Validation(format!("Maximum age must be {MAX_AGE}")));
    }
    Ok(StudentInput { name, age: input.age })
}

fn validate_group(input: GroupInput) -> Result<GroupInput, BackendError> {
    for (field, value) in [
        ("name", &input.name),
        ("course", &input.course),
        ("teacher", &input.teacher),
    ] {
        if value.trim().is_empty() {
            return Err(BackendError::Validation(format!("Group {field} is required")));
        }
    }
    if input.lesson_day > 6 {
        return Err(BackendError::Validation("Invalid lesson day".to_string()));
    }
    let lesson_time = normalize_time(&input.lesson_time)?;
    Ok(GroupInput {
        name: input.name.trim().to_string(),
        course: input.course.trim().to_string(),
        teacher: input.teacher.trim().to_string(),
        lesson_time,
        ..input
    })
}

/// Accept `HH:MM` or `HH:MM:SS` and store `HH:MM:SS`.
fn normalize_time(raw: &str) -> Result<String, BackendError> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw.trim(), "%H:%M"))
        .map(|t| t.format("%H:%M:%S").to_string())
        .map_err(|_| BackendError::Validation(format!("Invalid time: {raw}")))
}
