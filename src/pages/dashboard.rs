//! Dashboard page: the authenticated landing route.
//!
//! SYSTEM CONTEXT
//! ==============
//! Rendered behind `ProtectedRoute`, so a user is present whenever the body
//! runs. The sections shown depend on the role; students, teachers, companies
//! and administrators each see the areas of the portal they can act on.

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod dashboard_test;

use leptos::prelude::*;

use crate::components::header::Header;
use crate::net::types::{Role, UserRecord};
use crate::state::auth::AuthState;

/// One tile on the landing page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DashboardSection {
    pub title: &'static str,
    pub detail: String,
}

impl DashboardSection {
    fn new(title: &'static str, detail: impl Into<String>) -> Self {
        Self { title, detail: detail.into() }
    }
}

/// Sections for `user`, in display order.
#[must_use]
pub fn dashboard_sections(user: &UserRecord) -> Vec<DashboardSection> {
    match &user.role {
        Role::Student { student } => {
            let option = student
                .as_ref()
                .and_then(|s| s.master_option.as_deref())
                .map_or_else(|| "Master option not assigned yet.".to_owned(), |o| format!("Enrolled in {o}."));
            vec![
                DashboardSection::new("Master option", option),
                DashboardSection::new("Project choices", "Rank the validated proposals for your option."),
                DashboardSection::new("My project", "Follow your assignment and supervisor."),
            ]
        }
        Role::Teacher { teacher } => {
            let mut sections = vec![
                DashboardSection::new("My proposals", "Submit and track your project proposals."),
                DashboardSection::new("Supervised projects", "Projects you supervise this year."),
            ];
            if teacher.as_ref().is_some_and(|t| t.is_responsible) {
                sections.push(DashboardSection::new(
                    "Validation queue",
                    "Review proposals awaiting validation for your option.",
                ));
            }
            sections
        }
        Role::Company { company } => {
            let name = company
                .as_ref()
                .and_then(|c| c.name.as_deref())
                .unwrap_or("your company");
            vec![
                DashboardSection::new("Proposals", format!("Internship proposals submitted by {name}.")),
                DashboardSection::new("Hosted students", "Students assigned to your proposals."),
            ]
        }
        Role::Administrator {} => vec![
            DashboardSection::new("Users", "Create and manage student, teacher and company accounts."),
            DashboardSection::new("Email campaigns", "Configure reminder and announcement campaigns."),
            DashboardSection::new("Proposal periods", "Open and close submission and choice windows."),
        ],
    }
}

#[component]
pub fn DashboardPage() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();

    let greeting = move || {
        auth.get()
            .current_user()
            .map(|user| format!("Welcome, {}", user.display_name()))
            .unwrap_or_default()
    };
    let sections = move || auth.get().current_user().map(dashboard_sections).unwrap_or_default();

    view! {
        <div class="dashboard-page">
            <Header/>
            <section class="dashboard">
                <h1 class="dashboard__greeting">{greeting}</h1>
                <div class="dashboard__grid">
                    <For
                        each=sections
                        key=|section| section.title
                        children=move |section| {
                            view! {
                                <article class="dashboard-card">
                                    <h2>{section.title}</h2>
                                    <p>{section.detail}</p>
                                </article>
                            }
                        }
                    />
                </div>
            </section>
        </div>
    }
}
