use super::*;
use crate::net::types::TeacherProfile;
use crate::test_support::{admin, company, student, teacher};

fn titles(user: &UserRecord) -> Vec<&'static str> {
    dashboard_sections(user).into_iter().map(|s| s.title).collect()
}

#[test]
fn student_sees_master_option_and_choices() {
    let sections = dashboard_sections(&student(1));
    assert_eq!(sections[0].detail, "Enrolled in GL.");
    assert_eq!(titles(&student(1)), vec!["Master option", "Project choices", "My project"]);
}

#[test]
fn student_without_profile_reports_missing_option() {
    let mut user = student(1);
    user.role = Role::Student { student: None };
    assert_eq!(dashboard_sections(&user)[0].detail, "Master option not assigned yet.");
}

#[test]
fn validation_queue_is_only_for_responsible_teachers() {
    assert!(!titles(&teacher(2)).contains(&"Validation queue"));

    let mut responsible = teacher(2);
    responsible.role = Role::Teacher {
        teacher: Some(TeacherProfile { is_responsible: true, ..TeacherProfile::default() }),
    };
    assert_eq!(
        titles(&responsible),
        vec!["My proposals", "Supervised projects", "Validation queue"]
    );
}

#[test]
fn company_sections_name_the_company() {
    let sections = dashboard_sections(&company(3));
    assert_eq!(sections[0].detail, "Internship proposals submitted by Corp.");
}

#[test]
fn administrator_manages_users_and_campaigns() {
    assert_eq!(titles(&admin(4)), vec!["Users", "Email campaigns", "Proposal periods"]);
}
