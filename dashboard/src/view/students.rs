//! Student table with the create/edit forms.

use minijinja::context;
use serde::Serialize;
use tutor_core::{Envelope, Student, User};

use crate::api::Api;
use crate::error::DashboardError;
use crate::form::{FieldErrors, FormMode, StudentForm, StudentFormValues, STUDENTS_ROUTE};
use crate::toast::Toast;
use crate::view::render::Renderer;

/// What the template needs to redraw a form the user has been editing.
#[derive(Serialize)]
struct FormView<'a> {
    /// `None` for the create form.
    edit_id: Option<u64>,
    values: &'a StudentFormValues,
    errors: &'a FieldErrors,
}

impl<'a> From<&'a StudentForm> for FormView<'a> {
    fn from(form: &'a StudentForm) -> Self {
        Self {
            edit_id: match form.mode() {
                FormMode::Create => None,
                FormMode::Edit(id) => Some(id),
            },
            values: form.values(),
            errors: form.errors(),
        }
    }
}

pub async fn fetch(api: &Api) -> Envelope<Vec<Student>> {
    api.get("students").await
}

pub fn render(
    renderer: &Renderer,
    students: &Envelope<Vec<Student>>,
    user: Option<&User>,
    form: Option<&StudentForm>,
    toast: Option<&Toast>,
) -> Result<String, DashboardError> {
    let (rows, error) = match students {
        Envelope::Success { data, .. } => (data.as_slice(), None),
        Envelope::Failure { message } => (&[][..], Some(message.as_str())),
    };
    renderer.render(
        "students.html",
        context! {
            students => rows,
            error,
            user,
            can_edit => user.is_some(),
            form => form.map(FormView::from),
            toast => toast.map(Toast::phase),
        },
    )
}

/// The plain page, served from the cache until a student mutation
/// revalidates it. A render whose fetch overlapped a revalidation is served
/// once but not cached.
pub async fn cached_page(
    api: &Api,
    renderer: &Renderer,
    user: Option<&User>,
) -> Result<String, DashboardError> {
    let signed_in = user.is_some();
    if let Some(html) = api.cache().get(STUDENTS_ROUTE, signed_in).await {
        return Ok(html);
    }
    let generation = api.cache().generation(STUDENTS_ROUTE).await;
    let students = fetch(api).await;
    let html = render(renderer, &students, user, None, None)?;
    if students.is_success() {
        api.cache()
            .insert(STUDENTS_ROUTE, signed_in, html.clone(), generation)
            .await;
    }
    Ok(html)
}
