//! Template environment and the small formatting helpers the pages share.

use chrono::NaiveDate;
use minijinja::Environment;
use serde::Serialize;

use crate::error::DashboardError;

const TEMPLATES: &[(&str, &str)] = &[
    ("layout.html", include_str!("../../templates/layout.html")),
    ("group.html", include_str!("../../templates/group.html")),
    ("group_missing.html", include_str!("../../templates/group_missing.html")),
    ("groups.html", include_str!("../../templates/groups.html")),
    ("students.html", include_str!("../../templates/students.html")),
    ("login.html", include_str!("../../templates/login.html")),
];

pub struct Renderer {
    env: Environment<'static>,
}

impl Renderer {
    pub fn new() -> Result<Self, DashboardError> {
        let mut env = Environment::new();
        for &(name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        Ok(Self { env })
    }

    pub fn render<S: Serialize>(&self, template: &str, ctx: S) -> Result<String, DashboardError> {
        Ok(self.env.get_template(template)?.render(ctx)?)
    }
}

/// `18:30:00` -> `18:30`. Anything without seconds is returned unchanged.
pub fn short_time(time: &str) -> &str {
    if time.matches(':').count() == 2 {
        time.rsplit_once(':').map_or(time, |(head, _)| head)
    } else {
        time
    }
}

/// `dd.MM`, as used on lesson rows.
pub fn day_month(date: NaiveDate) -> String {
    date.format("%d.%m").to_string()
}

/// Long form start date, e.g. `2 September 2025`.
pub fn long_date(date: NaiveDate) -> String {
    date.format("%-d %B %Y").to_string()
}
