//! Typed API client core for the tutoring dashboard.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). Every parsed response is an
//! `Envelope`: a success carrying data and a message, or a failure carrying
//! only a message.
//!
//! # Design
//! - `ApiClient` is stateless apart from `base_url` and an optional token.
//! - Requests are built by `build_get` / `build_create` / `build_update`;
//!   one `parse` method handles every response.
//! - DTOs are defined independently from the backend crate; integration
//!   tests catch schema drift.
//! - `session` issues the `session` cookie the dashboard hands to browsers.

pub mod client;
pub mod envelope;
pub mod error;
pub mod http;
pub mod session;
pub mod types;

pub use client::ApiClient;
pub use envelope::Envelope;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use types::{
    Attendance, AttendanceInput, Credentials, DayOfWeek, Group, GroupInput, Lesson, LessonInput,
    MemberInput, SessionToken, Student, StudentInput, User,
};
