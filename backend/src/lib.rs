//! In-memory backend resource API for the tutoring dashboard.
//!
//! Every response body is an envelope: `{"success", "data", "message"}`.
//! State lives in a single `Store` behind a tokio `RwLock`.

pub mod config;
pub mod dto;
pub mod error;
pub mod store;

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, patch, post},
    Json, Router,
};
use tokio::{net::TcpListener, sync::RwLock};

use crate::dto::{
    ApiResponse, AttendanceInput, Credentials, Group, GroupInput, Lesson, LessonInput,
    MemberInput, SessionToken, Student, StudentInput, User,
};
use crate::error::BackendError;
use crate::store::Store;

pub type Db = Arc<RwLock<Store>>;

/// The single account allowed to log in.
#[derive(Debug, Clone)]
pub struct AdminAccount {
    pub username: String,
    pub password: String,
}

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    admin: Arc<AdminAccount>,
}

impl AppState {
    pub fn new(store: Store, admin: AdminAccount) -> Self {
        Self {
            db: Arc::new(RwLock::new(store)),
            admin: Arc::new(admin),
        }
    }
}

type ApiResult<T> = Result<(StatusCode, Json<ApiResponse<T>>), BackendError>;

fn ok<T>(data: T, message: &str) -> ApiResult<T> {
    Ok((StatusCode::OK, Json(ApiResponse::ok(data, message))))
}

fn created<T>(data: T, message: &str) -> ApiResult<T> {
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(data, message))))
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/students", get(list_students).post(create_student))
        .route("/students/{id}", get(get_student).patch(update_student))
        .route("/groups", get(list_groups).post(create_group))
        .route("/groups/{id}", get(get_group).patch(update_group))
        .route("/groups/{id}/students", post(add_member))
        .route("/groups/{id}/lessons", post(schedule_lesson))
        .route("/lessons/{id}/attendance", patch(record_attendance))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        .with_state(state)
}

pub async fn run(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(listener, app(state)).await
}

async fn list_students(State(state): State<AppState>) -> ApiResult<Vec<Student>> {
    let students = state.db.read().await.students();
    ok(students, "Students loaded")
}

async fn create_student(
    State(state): State<AppState>,
    payload: Result<Json<StudentInput>, JsonRejection>,
) -> ApiResult<Student> {
    let Json(input) = payload?;
    let student = state.db.write().await.create_student(input)?;
    tracing::info!(id = student.id, "student created");
    created(student, "Student created")
}

async fn get_student(State(state): State<AppState>, Path(id): Path<u64>) -> ApiResult<Student> {
    let student = state.db.read().await.student(id)?;
    ok(student, "Student loaded")
}

async fn update_student(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    payload: Result<Json<StudentInput>, JsonRejection>,
) -> ApiResult<Student> {
    let Json(input) = payload?;
    let student = state.db.write().await.update_student(id, input)?;
    tracing::info!(id, "student updated");
    ok(student, "Student updated")
}

async fn list_groups(State(state): State<AppState>) -> ApiResult<Vec<Group>> {
    let groups = state.db.read().await.groups();
    ok(groups, "Groups loaded")
}

async fn create_group(
    State(state): State<AppState>,
    payload: Result<Json<GroupInput>, JsonRejection>,
) -> ApiResult<Group> {
    let Json(input) = payload?;
    let group = state.db.write().await.create_group(input)?;
    tracing::info!(id = group.id, "group created");
    created(group, "Group created")
}

async fn get_group(State(state): State<AppState>, Path(id): Path<u64>) -> ApiResult<Group> {
    let group = state.db.read().await.group(id)?;
    ok(group, "Group loaded")
}

async fn update_group(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    payload: Result<Json<GroupInput>, JsonRejection>,
) -> ApiResult<Group> {
    let Json(input) = payload?;
    let group = state.db.write().await.update_group(id, input)?;
    tracing::info!(id, "group updated");
    ok(group, "Group updated")
}

async fn add_member(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    payload: Result<Json<MemberInput>, JsonRejection>,
) -> ApiResult<Group> {
    let Json(input) = payload?;
    let group = state.db.write().await.add_member(id, input.student_id)?;
    tracing::info!(group = id, student = input.student_id, "student added to group");
    created(group, "Student added to group")
}

async fn schedule_lesson(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    payload: Result<Json<LessonInput>, JsonRejection>,
) -> ApiResult<Lesson> {
    let Json(input) = payload?;
    let lesson = state.db.write().await.schedule_lesson(id, input)?;
    tracing::info!(group = id, lesson = lesson.id, "lesson scheduled");
    created(lesson, "Lesson scheduled")
}

async fn record_attendance(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    payload: Result<Json<AttendanceInput>, JsonRejection>,
) -> ApiResult<Lesson> {
    let Json(input) = payload?;
    let lesson = state.db.write().await.record_attendance(id, input)?;
    ok(lesson, "Attendance saved")
}

async fn login(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> ApiResult<SessionToken> {
    let Json(credentials) = payload?;
    if credentials.username != state.admin.username || credentials.password != state.admin.password {
        tracing::warn!(username = %credentials.username, "login rejected");
        return Err(BackendError::Unauthorized("Invalid credentials"));
    }
    let token = state.db.write().await.issue_token(&credentials.username);
    ok(SessionToken { token }, "Logged in")
}

async fn me(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<User> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(BackendError::Unauthorized("Not authenticated"))?;
    let username = state
        .db
        .read()
        .await
        .user_for_token(token)
        .map(str::to_string)
        .ok_or(BackendError::Unauthorized("Not authenticated"))?;
    ok(User { username }, "Authenticated")
}
