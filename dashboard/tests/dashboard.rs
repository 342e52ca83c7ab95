mod support;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;
use tutor_dashboard::{router, DashboardState};

use support::{
    seeded_dashboard, FailingTransport, HeldStudentList, NoStudentList, RouterTransport,
    ADMIN_PASSWORD, ADMIN_USER, BACKEND_URL,
};

struct Page {
    status: StatusCode,
    headers: axum::http::HeaderMap,
    body: String,
}

async fn send(app: &Router, request: Request<Body>) -> Page {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    Page {
        status,
        headers,
        body: String::from_utf8(bytes.to_vec()).unwrap(),
    }
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn post_form(uri: &str, form: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(form.to_string())).unwrap()
}

/// Log in through the dashboard and return the `Cookie` header to send back.
async fn sign_in(app: &Router) -> String {
    let page = send(
        app,
        post_form(
            "/login",
            &format!("username={ADMIN_USER}&password={ADMIN_PASSWORD}"),
            None,
        ),
    )
    .await;
    assert_eq!(page.status, StatusCode::SEE_OTHER);
    let set_cookie = page.headers[header::SET_COOKIE].to_str().unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

// --- navigation and session ---

#[tokio::test]
async fn root_redirects_to_groups() {
    let (state, _) = seeded_dashboard();
    let page = send(&router(state), get("/", None)).await;
    assert_eq!(page.status, StatusCode::SEE_OTHER);
    assert_eq!(page.headers[header::LOCATION], "/dashboard/groups");
}

#[tokio::test]
async fn login_sets_session_cookie() {
    let (state, _) = seeded_dashboard();
    let page = send(
        &router(state),
        post_form("/login", "username=admin&password=secret", None),
    )
    .await;
    assert_eq!(page.status, StatusCode::SEE_OTHER);
    assert_eq!(page.headers[header::LOCATION], "/dashboard/groups");
    let cookie = page.headers[header::SET_COOKIE].to_str().unwrap();
    assert!(cookie.starts_with("session="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Secure"));
    assert!(cookie.contains("SameSite=Lax"));
    assert!(cookie.contains("Path=/"));
    assert!(cookie.contains("Expires="));
}

#[tokio::test]
async fn bad_credentials_render_error_toast_without_cookie() {
    let (state, _) = seeded_dashboard();
    let page = send(
        &router(state),
        post_form("/login", "username=admin&password=nope", None),
    )
    .await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.headers.get(header::SET_COOKIE).is_none());
    assert!(page.body.contains("toast-error"));
    assert!(page.body.contains("Invalid credentials"));
}

#[tokio::test]
async fn unknown_session_is_anonymous() {
    let (state, _) = seeded_dashboard();
    let page = send(&router(state), get("/dashboard/groups/5", Some("session=stale"))).await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Sign in"));
    assert!(!page.body.contains("Save group"));
}

// --- groups ---

#[tokio::test]
async fn groups_list_links_each_group() {
    let (state, _) = seeded_dashboard();
    let page = send(&router(state), get("/dashboard/groups", None)).await;
    assert!(page.body.contains("<a href=\"/dashboard/groups/5\">Python Start</a>"));
    assert!(page.body.contains("Scratch Juniors"));
    assert!(page.body.contains("Tuesday 18:30"));
}

#[tokio::test]
async fn missing_group_renders_only_the_failure_message() {
    let (state, _) = seeded_dashboard();
    let page = send(&router(state), get("/dashboard/groups/99", None)).await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("<div class=\"missing\">Group not found</div>"));
    assert!(!page.body.contains("Members"));
    assert!(!page.body.contains("Lessons"));
}

#[tokio::test]
async fn anonymous_group_page_hides_edit_controls() {
    let (state, _) = seeded_dashboard();
    let page = send(&router(state), get("/dashboard/groups/5", None)).await;
    assert!(page.body.contains("Members"));
    assert!(page.body.contains("Ann (10)"));
    assert!(page.body.contains("2 September 2025"));
    assert!(!page.body.contains("Save group"));
    assert!(!page.body.contains("Add to group"));
    assert!(!page.body.contains("Save attendance"));
}

#[tokio::test]
async fn signed_in_group_page_offers_only_non_members() {
    let (state, _) = seeded_dashboard();
    let app = router(state);
    let cookie = sign_in(&app).await;
    let page = send(&app, get("/dashboard/groups/5", Some(&cookie))).await;
    assert!(page.body.contains("Save group"));
    assert!(page.body.contains("<option value=\"3\">Vera</option>"));
    assert!(page.body.contains("<option value=\"4\">Gleb</option>"));
    assert!(!page.body.contains("<option value=\"1\">Ann</option>"));
    assert!(!page.body.contains("<option value=\"2\">Boris</option>"));
}

#[tokio::test]
async fn group_page_fetches_group_and_students() {
    let (state, transport) = seeded_dashboard();
    send(&router(state), get("/dashboard/groups/5", None)).await;
    let seen = transport.seen();
    assert!(seen.contains(&"GET /groups/5".to_string()));
    assert!(seen.contains(&"GET /students".to_string()));
}

#[tokio::test]
async fn group_page_without_student_list_shows_error_instead_of_members() {
    let transport = Arc::new(NoStudentList(RouterTransport::seeded()));
    let app = router(DashboardState::new(BACKEND_URL, transport).unwrap());
    let cookie = sign_in(&app).await;
    let page = send(&app, get("/dashboard/groups/5", Some(&cookie))).await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("<h1>Python Start</h1>"));
    assert!(page.body.contains("<div class=\"error\">Error</div>"));
    assert!(!page.body.contains("Ann (10)"));
    assert!(!page.body.contains("Add to group"));
    // Lessons come from the group payload and still render.
    assert!(page.body.contains("Save attendance"));
}

#[tokio::test]
async fn adding_a_member_twice_shows_backend_message() {
    let (state, _) = seeded_dashboard();
    let app = router(state);
    let cookie = sign_in(&app).await;
    let page = send(
        &app,
        post_form("/dashboard/groups/5/students", "studentId=1", Some(&cookie)),
    )
    .await;
    assert!(page.body.contains("toast-error"));
    assert!(page.body.contains("Student is already in this group"));
}

#[tokio::test]
async fn adding_a_member_moves_them_out_of_the_picker() {
    let (state, _) = seeded_dashboard();
    let app = router(state);
    let cookie = sign_in(&app).await;
    let page = send(
        &app,
        post_form("/dashboard/groups/5/students", "studentId=3", Some(&cookie)),
    )
    .await;
    assert!(page.body.contains("Student added to group"));
    assert!(page.body.contains("Vera (15)"));
    assert!(!page.body.contains("<option value=\"3\">Vera</option>"));
}

#[tokio::test]
async fn scheduling_and_attendance_round_trip() {
    let (state, _) = seeded_dashboard();
    let app = router(state);
    let cookie = sign_in(&app).await;

    let page = send(
        &app,
        post_form("/dashboard/groups/5/lessons", "date=2025-09-16&time=18:30", Some(&cookie)),
    )
    .await;
    assert!(page.body.contains("Lesson scheduled"));
    assert!(page.body.contains("16.09 18:30"));

    let page = send(
        &app,
        post_form(
            "/dashboard/groups/5/lessons/8/attendance",
            "member=1&member=2&present=2",
            Some(&cookie),
        ),
    )
    .await;
    assert!(page.body.contains("toast-success"));
    assert!(page.body.contains("Attendance saved"));
}

#[tokio::test]
async fn updating_a_group_renders_new_values() {
    let (state, _) = seeded_dashboard();
    let app = router(state);
    let cookie = sign_in(&app).await;
    let form = "name=Python+Advanced&course=Python&teacher=Irina+Petrova&lessonDay=4\
                &lessonTime=17:00&startDate=2025-09-04&backOfficeUrl=https%3A%2F%2Fexample.com";
    let page = send(&app, post_form("/dashboard/groups/5", form, Some(&cookie))).await;
    assert!(page.body.contains("Group updated"));
    assert!(page.body.contains("<h1>Python Advanced</h1>"));
    assert!(page.body.contains("Thursday 17:00"));
}

// --- students ---

#[tokio::test]
async fn creating_a_student_toasts_and_refetches() {
    let (state, _) = seeded_dashboard();
    let app = router(state);
    let cookie = sign_in(&app).await;
    let page = send(
        &app,
        post_form("/dashboard/students", "name=Dina&age=11", Some(&cookie)),
    )
    .await;
    assert!(page.body.contains("<div class=\"toast toast-success\" role=\"status\">Student created</div>"));
    assert!(page.body.contains("value=\"Dina\""));
}

#[tokio::test]
async fn invalid_student_is_rejected_before_any_request() {
    let (state, transport) = seeded_dashboard();
    let app = router(state);
    let cookie = sign_in(&app).await;
    let page = send(
        &app,
        post_form("/dashboard/students", "name=D&age=19", Some(&cookie)),
    )
    .await;
    assert!(page.body.contains("Name must be at least 2 characters long."));
    assert!(page.body.contains("Maximum age must be 18"));
    assert!(!page.body.contains("toast"));
    assert!(!transport.seen().contains(&"POST /students".to_string()));

    let page = send(
        &app,
        post_form("/dashboard/students", "name=Dina&age=5", Some(&cookie)),
    )
    .await;
    assert!(page.body.contains("Minimal age must be 6"));
    // What the user typed stays in the create form.
    assert!(page.body.contains("value=\"Dina\""));
    assert!(!transport.seen().contains(&"POST /students".to_string()));
}

#[tokio::test]
async fn non_numeric_age_is_a_field_error() {
    let (state, _) = seeded_dashboard();
    let app = router(state);
    let cookie = sign_in(&app).await;
    let page = send(
        &app,
        post_form("/dashboard/students", "name=Dina&age=ten", Some(&cookie)),
    )
    .await;
    assert!(page.body.contains("Age must be a number"));
}

#[tokio::test]
async fn editing_a_student_patches_it() {
    let (state, transport) = seeded_dashboard();
    let app = router(state);
    let cookie = sign_in(&app).await;
    let page = send(
        &app,
        post_form("/dashboard/students/1", "name=Anna&age=11", Some(&cookie)),
    )
    .await;
    assert!(page.body.contains("Student updated"));
    assert!(page.body.contains("value=\"Anna\""));
    assert!(transport.seen().contains(&"PATCH /students/1".to_string()));
}

#[tokio::test]
async fn editing_a_missing_student_shows_failure() {
    let (state, _) = seeded_dashboard();
    let app = router(state);
    let cookie = sign_in(&app).await;
    let page = send(
        &app,
        post_form("/dashboard/students/99", "name=Anna&age=11", Some(&cookie)),
    )
    .await;
    assert!(page.body.contains("toast-error"));
    assert!(page.body.contains("Student not found"));
}

#[tokio::test]
async fn student_page_is_cached_until_a_mutation() {
    let (state, transport) = seeded_dashboard();
    let cache = state.api.cache().clone();
    let app = router(state);

    send(&app, get("/dashboard/students", None)).await;
    send(&app, get("/dashboard/students", None)).await;
    let fetches = transport.seen().iter().filter(|s| *s == "GET /students").count();
    assert_eq!(fetches, 1);
    assert_eq!(cache.len().await, 1);

    let cookie = sign_in(&app).await;
    send(
        &app,
        post_form("/dashboard/students", "name=Dina&age=11", Some(&cookie)),
    )
    .await;
    assert!(cache.is_empty().await);

    let page = send(&app, get("/dashboard/students", None)).await;
    assert!(page.body.contains("<td>Dina</td>"));
}

#[tokio::test]
async fn list_fetched_across_a_mutation_is_not_cached() {
    let transport = Arc::new(HeldStudentList::seeded());
    let state = DashboardState::new(BACKEND_URL, transport.clone()).unwrap();
    let cache = state.api.cache().clone();
    let app = router(state);

    let reader = tokio::spawn({
        let app = app.clone();
        async move { send(&app, get("/dashboard/students", None)).await }
    });
    transport.reached().await;

    let cookie = sign_in(&app).await;
    let page = send(
        &app,
        post_form("/dashboard/students", "name=Dina&age=11", Some(&cookie)),
    )
    .await;
    assert!(page.body.contains("Student created"));

    transport.release();
    let stale = reader.await.unwrap();
    assert!(!stale.body.contains("Dina"));
    assert!(cache.is_empty().await);

    let page = send(&app, get("/dashboard/students", None)).await;
    assert!(page.body.contains("<td>Dina</td>"));
}

#[tokio::test]
async fn unreachable_backend_renders_failure_in_place() {
    let state = DashboardState::new(BACKEND_URL, Arc::new(FailingTransport)).unwrap();
    let cache = state.api.cache().clone();
    let app = router(state);

    let page = send(&app, get("/dashboard/students", None)).await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("network error: connection failed: backend down"));
    assert!(cache.is_empty().await);

    let page = send(&app, get("/dashboard/groups/5", None)).await;
    assert!(page.body.contains("<div class=\"missing\">network error"));
}
