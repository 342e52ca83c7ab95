//! Group detail page.
//!
//! Fetches the group and the full student list side by side. A failed group
//! fetch short-circuits to a page holding only the failure message; otherwise
//! members and lessons render straight from the group payload, and the
//! student list feeds the "add member" picker.

use std::collections::HashSet;

use minijinja::context;
use serde::Serialize;
use tutor_core::{DayOfWeek, Envelope, Group, Student, User};

use crate::api::Api;
use crate::error::DashboardError;
use crate::toast::Toast;
use crate::view::render::{day_month, long_date, short_time, Renderer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupPage {
    Missing { message: String },
    Loaded(Box<GroupDetail>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupDetail {
    pub group: Group,
    /// `None` when the student list could not be fetched.
    pub addable: Option<Vec<Student>>,
    pub can_edit: bool,
}

/// Students from `all` that are not in `members`, in `all`'s order, each at
/// most once.
pub fn addable_students(all: &[Student], members: &[Student]) -> Vec<Student> {
    let member_ids: HashSet<u64> = members.iter().map(|s| s.id).collect();
    let mut seen = HashSet::new();
    all.iter()
        .filter(|s| !member_ids.contains(&s.id) && seen.insert(s.id))
        .cloned()
        .collect()
}

pub async fn load(api: &Api, id: u64, user: Option<&User>) -> GroupPage {
    let group_path = format!("groups/{id}");
    let (group, students) = tokio::join!(
        api.get::<Group>(&group_path),
        api.get::<Vec<Student>>("students"),
    );

    let group = match group {
        Envelope::Success { data, .. } => data,
        Envelope::Failure { message } => return GroupPage::Missing { message },
    };
    let addable = students
        .into_data()
        .map(|all| addable_students(&all, &group.students));

    GroupPage::Loaded(Box::new(GroupDetail {
        group,
        addable,
        can_edit: user.is_some(),
    }))
}

#[derive(Serialize)]
struct AttendanceRow<'a> {
    student_id: u64,
    name: &'a str,
    present: bool,
}

#[derive(Serialize)]
struct LessonView<'a> {
    id: u64,
    date: String,
    time: &'a str,
    rows: Vec<AttendanceRow<'a>>,
}

#[derive(Serialize)]
struct GroupView<'a> {
    id: u64,
    name: &'a str,
    course: &'a str,
    teacher: &'a str,
    lesson_day: u8,
    day_name: &'static str,
    lesson_time: &'a str,
    lesson_time_short: &'a str,
    start_date: String,
    start_date_iso: String,
    back_office_url: &'a str,
    members: &'a [Student],
    lessons: Vec<LessonView<'a>>,
}

impl<'a> GroupView<'a> {
    fn new(group: &'a Group) -> Self {
        let lessons = group
            .lessons
            .iter()
            .map(|lesson| LessonView {
                id: lesson.id,
                date: day_month(lesson.date),
                time: short_time(&lesson.time),
                rows: group
                    .students
                    .iter()
                    .map(|s| AttendanceRow {
                        student_id: s.id,
                        name: &s.name,
                        present: lesson.is_present(s.id),
                    })
                    .collect(),
            })
            .collect();
        Self {
            id: group.id,
            name: &group.name,
            course: &group.course,
            teacher: &group.teacher,
            lesson_day: group.lesson_day.into(),
            day_name: group.lesson_day.name(),
            lesson_time: &group.lesson_time,
            lesson_time_short: short_time(&group.lesson_time),
            start_date: long_date(group.start_date),
            start_date_iso: group.start_date.to_string(),
            back_office_url: &group.back_office_url,
            members: &group.students,
            lessons,
        }
    }
}

pub fn render(
    renderer: &Renderer,
    page: &GroupPage,
    user: Option<&User>,
    toast: Option<&Toast>,
) -> Result<String, DashboardError> {
    match page {
        GroupPage::Missing { message } => renderer.render(
            "group_missing.html",
            context! { message, user, toast => toast.map(Toast::phase) },
        ),
        GroupPage::Loaded(detail) => {
            let days: Vec<(u8, &str)> = DayOfWeek::ALL
                .iter()
                .map(|d| (u8::from(*d), d.name()))
                .collect();
            renderer.render(
                "group.html",
                context! {
                    group => GroupView::new(&detail.group),
                    students_loaded => detail.addable.is_some(),
                    addable => detail.addable.as_deref().unwrap_or_default(),
                    can_edit => detail.can_edit,
                    days,
                    user,
                    toast => toast.map(Toast::phase),
                },
            )
        }
    }
}
