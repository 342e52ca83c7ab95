//! HTTP surface of the dashboard.
//!
//! Pages are rendered per request from fresh backend data, except the
//! student table which is served from the `PageCache` until a student
//! mutation revalidates it. Mutations re-render the page they were posted
//! from, with the settled toast on top.

use std::collections::HashSet;
use std::future::Future;

use axum::extract::rejection::FormRejection;
use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use minijinja::context;
use serde::Serialize;
use tutor_core::session::create_session;
use tutor_core::{
    Attendance, AttendanceInput, Credentials, Envelope, Group, GroupInput, Lesson, LessonInput,
    MemberInput, SessionToken, Student,
};

use crate::error::DashboardError;
use crate::form::{StudentForm, StudentFormValues};
use crate::session::{ResponseCookies, Viewer};
use crate::toast::{PendingToast, Toast};
use crate::view::render::short_time;
use crate::view::{group, students};
use crate::DashboardState;

type Page = Result<Html<String>, DashboardError>;

pub fn router(state: DashboardState) -> Router {
    Router::new()
        .route("/", get(|| async { Redirect::to("/dashboard/groups") }))
        .route("/login", get(login_page).post(login))
        .route("/dashboard/groups", get(groups_page))
        .route("/dashboard/groups/{id}", get(group_page).post(update_group))
        .route("/dashboard/groups/{id}/students", post(add_member))
        .route("/dashboard/groups/{id}/lessons", post(schedule_lesson))
        .route(
            "/dashboard/groups/{id}/lessons/{lesson_id}/attendance",
            post(record_attendance),
        )
        .route("/dashboard/students", get(students_page).post(create_student))
        .route("/dashboard/students/{id}", post(update_student))
        .with_state(state)
}

fn group_route(id: u64) -> String {
    format!("dashboard/groups/{id}")
}

/// Show a pending toast for the duration of `call`, then settle it with the
/// envelope's message.
async fn with_toast<T>(call: impl Future<Output = Envelope<T>>) -> Toast {
    let pending = PendingToast::new();
    let envelope = call.await;
    pending.settle(&envelope)
}

// --- login ---

async fn login_page(State(state): State<DashboardState>, viewer: Viewer) -> Page {
    let html = state.renderer.render(
        "login.html",
        context! { user => viewer.user(), username => "" },
    )?;
    Ok(Html(html))
}

async fn login(
    State(state): State<DashboardState>,
    Form(credentials): Form<Credentials>,
) -> Result<Response, DashboardError> {
    let pending = PendingToast::new();
    let envelope: Envelope<SessionToken> =
        state.api.create("auth/login", &credentials, "login").await;
    match envelope {
        Envelope::Success { data, .. } => {
            tracing::info!(username = %credentials.username, "signed in");
            let mut response = Redirect::to("/dashboard/groups").into_response();
            create_session(&mut ResponseCookies(response.headers_mut()), &data.token)?;
            Ok(response)
        }
        Envelope::Failure { message } => {
            let toast = pending.reject(message);
            let html = state.renderer.render(
                "login.html",
                context! {
                    user => None::<()>,
                    username => credentials.username,
                    toast => toast.phase(),
                },
            )?;
            Ok(Html(html).into_response())
        }
    }
}

// --- groups ---

#[derive(Serialize)]
struct GroupRow<'a> {
    id: u64,
    name: &'a str,
    course: &'a str,
    teacher: &'a str,
    day_name: &'static str,
    time: &'a str,
    members: usize,
}

async fn groups_page(State(state): State<DashboardState>, viewer: Viewer) -> Page {
    let groups: Envelope<Vec<Group>> = viewer.api.get("groups").await;
    let (rows, error): (Vec<GroupRow>, Option<&str>) = match &groups {
        Envelope::Success { data, .. } => (
            data.iter()
                .map(|g| GroupRow {
                    id: g.id,
                    name: &g.name,
                    course: &g.course,
                    teacher: &g.teacher,
                    day_name: g.lesson_day.name(),
                    time: short_time(&g.lesson_time),
                    members: g.students.len(),
                })
                .collect(),
            None,
        ),
        Envelope::Failure { message } => (Vec::new(), Some(message.as_str())),
    };
    let html = state.renderer.render(
        "groups.html",
        context! { groups => rows, error, user => viewer.user() },
    )?;
    Ok(Html(html))
}

async fn render_group(
    state: &DashboardState,
    viewer: &Viewer,
    id: u64,
    toast: Option<&Toast>,
) -> Page {
    let page = group::load(&viewer.api, id, viewer.user()).await;
    Ok(Html(group::render(&state.renderer, &page, viewer.user(), toast)?))
}

async fn group_page(
    State(state): State<DashboardState>,
    viewer: Viewer,
    Path(id): Path<u64>,
) -> Page {
    render_group(&state, &viewer, id, None).await
}

async fn update_group(
    State(state): State<DashboardState>,
    viewer: Viewer,
    Path(id): Path<u64>,
    form: Result<Form<GroupInput>, FormRejection>,
) -> Page {
    let toast = match form {
        Ok(Form(input)) => {
            with_toast(viewer.api.update::<Group, _>(
                &format!("groups/{id}"),
                &input,
                &group_route(id),
            ))
            .await
        }
        Err(rejection) => PendingToast::new().reject(rejection.body_text()),
    };
    render_group(&state, &viewer, id, Some(&toast)).await
}

async fn add_member(
    State(state): State<DashboardState>,
    viewer: Viewer,
    Path(id): Path<u64>,
    form: Result<Form<MemberInput>, FormRejection>,
) -> Page {
    let toast = match form {
        Ok(Form(input)) => {
            with_toast(viewer.api.create::<Group, _>(
                &format!("groups/{id}/students"),
                &input,
                &group_route(id),
            ))
            .await
        }
        Err(rejection) => PendingToast::new().reject(rejection.body_text()),
    };
    render_group(&state, &viewer, id, Some(&toast)).await
}

async fn schedule_lesson(
    State(state): State<DashboardState>,
    viewer: Viewer,
    Path(id): Path<u64>,
    form: Result<Form<LessonInput>, FormRejection>,
) -> Page {
    let toast = match form {
        Ok(Form(input)) => {
            with_toast(viewer.api.create::<Lesson, _>(
                &format!("groups/{id}/lessons"),
                &input,
                &group_route(id),
            ))
            .await
        }
        Err(rejection) => PendingToast::new().reject(rejection.body_text()),
    };
    render_group(&state, &viewer, id, Some(&toast)).await
}

/// Checkbox form: one `member=<id>` per student listed, one `present=<id>`
/// per ticked box.
fn attendance_from_form(pairs: &[(String, String)]) -> AttendanceInput {
    let present: HashSet<&str> = pairs
        .iter()
        .filter(|(key, _)| key == "present")
        .map(|(_, value)| value.as_str())
        .collect();
    let records = pairs
        .iter()
        .filter(|(key, _)| key == "member")
        .filter_map(|(_, value)| {
            value.parse().ok().map(|student_id| Attendance {
                student_id,
                present: present.contains(value.as_str()),
            })
        })
        .collect();
    AttendanceInput { records }
}

async fn record_attendance(
    State(state): State<DashboardState>,
    viewer: Viewer,
    Path((id, lesson_id)): Path<(u64, u64)>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Page {
    let input = attendance_from_form(&pairs);
    let toast = with_toast(viewer.api.update::<Lesson, _>(
        &format!("lessons/{lesson_id}/attendance"),
        &input,
        &group_route(id),
    ))
    .await;
    render_group(&state, &viewer, id, Some(&toast)).await
}

// --- students ---

async fn students_page(State(state): State<DashboardState>, viewer: Viewer) -> Page {
    let html = students::cached_page(&viewer.api, &state.renderer, viewer.user()).await?;
    Ok(Html(html))
}

async fn submit_student(state: &DashboardState, viewer: &Viewer, mut form: StudentForm) -> Page {
    let toast = form.submit(&viewer.api).await.ok();
    let rows = students::fetch(&viewer.api).await;
    // A form that went through cleanly is not shown again; anything else
    // keeps what the user typed.
    let keep_form = toast.as_ref().map_or(true, |t| !t.is_success());
    let html = students::render(
        &state.renderer,
        &rows,
        viewer.user(),
        keep_form.then_some(&form),
        toast.as_ref(),
    )?;
    Ok(Html(html))
}

async fn create_student(
    State(state): State<DashboardState>,
    viewer: Viewer,
    Form(values): Form<StudentFormValues>,
) -> Page {
    let mut form = StudentForm::create(StudentFormValues::default());
    form.fill(values);
    submit_student(&state, &viewer, form).await
}

async fn update_student(
    State(state): State<DashboardState>,
    viewer: Viewer,
    Path(id): Path<u64>,
    Form(values): Form<StudentFormValues>,
) -> Page {
    let existing: Envelope<Student> = viewer.api.get(&format!("students/{id}")).await;
    let student = match existing {
        Envelope::Success { data, .. } => data,
        Envelope::Failure { message } => {
            let toast = PendingToast::new().reject(message);
            let rows = students::fetch(&viewer.api).await;
            let html =
                students::render(&state.renderer, &rows, viewer.user(), None, Some(&toast))?;
            return Ok(Html(html));
        }
    };
    let mut form = StudentForm::edit(&student);
    form.fill(values);
    submit_student(&state, &viewer, form).await
}
