use super::common::*;
use std::sync::Arc;

use chrono::Utc;

use crate::directory::admin::{AccessDecision, AdminError, AdminGate, AdminService, SiteSettings};
use crate::directory::backend::BackendError;
use crate::directory::domain::{Board, SchoolFields, SchoolId, SchoolRecordError, SchoolType};

#[test]
fn gate_requires_a_session() {
    let gate = AdminGate::new(Arc::new(MemorySessions::standard()));

    assert_eq!(gate.check(None), AccessDecision::Unauthenticated);
    assert_eq!(gate.check(Some("  ")), AccessDecision::Unauthenticated);
    assert_eq!(gate.check(Some("expired")), AccessDecision::Unauthenticated);
}

#[test]
fn gate_distinguishes_admins_from_users() {
    let gate = AdminGate::new(Arc::new(MemorySessions::standard()));

    assert_eq!(gate.check(Some(USER_TOKEN)), AccessDecision::Forbidden);
    match gate.check(Some(ADMIN_TOKEN)) {
        AccessDecision::Granted(user) => assert_eq!(user.email, "admin@schoolhub.com"),
        other => panic!("expected access, got {other:?}"),
    }
}

#[test]
fn gate_denies_when_role_lookup_fails() {
    let gate = AdminGate::new(Arc::new(MemorySessions::with_failing_role_lookup()));
    assert_eq!(gate.check(Some(ADMIN_TOKEN)), AccessDecision::Forbidden);
}

#[test]
fn authorize_maps_decisions_to_errors() {
    let (service, _) = admin_service(odisha_schools());

    assert!(matches!(
        service.authorize(None),
        Err(AdminError::Unauthenticated)
    ));
    assert!(matches!(
        service.authorize(Some(USER_TOKEN)),
        Err(AdminError::Forbidden)
    ));
    assert!(service.authorize(Some(ADMIN_TOKEN)).is_ok());
}

#[test]
fn create_school_inserts_validated_row() {
    let (service, backend) = admin_service(odisha_schools());

    let record = service
        .create_school(valid_fields("Capital High School", "Bhubaneswar"))
        .expect("school created");

    assert_eq!(record.name, "Capital High School");
    assert!(record.ratings.is_none());
    assert_eq!(backend.stored().len(), 5);
}

#[test]
fn create_school_rejects_incomplete_form_before_backend() {
    let (service, backend) = admin_service(Vec::new());
    let fields = SchoolFields {
        name: "Nameless".to_string(),
        ..SchoolFields::default()
    };

    let err = service.create_school(fields).expect_err("validation fails");
    assert!(matches!(
        err,
        AdminError::Validation(SchoolRecordError::MissingRequired(_))
    ));
    assert_eq!(err.to_string(), "Please fill in all required fields");
    assert!(backend.stored().is_empty());
}

#[test]
fn duplicate_school_surfaces_create_notice() {
    let (service, _) = admin_service(odisha_schools());
    let err = service
        .create_school(valid_fields("Stewart School", "Cuttack"))
        .expect_err("duplicate rejected");

    assert_eq!(err.to_string(), "Failed to create school");
    assert!(matches!(
        err,
        AdminError::Mutation {
            source: BackendError::Conflict,
            ..
        }
    ));
}

#[test]
fn update_school_keeps_ratings_and_applies_fields() {
    let (service, backend) = admin_service(odisha_schools());
    let mut fields = valid_fields("Stewart School", "Cuttack");
    fields.board = Some(Board::Cbse);
    fields.school_type = Some(SchoolType::Aided);
    fields.principal = Some("Fr. Thomas".to_string());

    let updated = service
        .update_school(&SchoolId("sch-003".to_string()), fields)
        .expect("update succeeds");
    assert_eq!(updated.board, Board::Cbse);
    assert_eq!(updated.principal.as_deref(), Some("Fr. Thomas"));
    assert_eq!(updated.overall_rating(), 4.1);

    let stored = backend
        .stored()
        .into_iter()
        .find(|school| school.id.0 == "sch-003")
        .expect("row stored");
    assert_eq!(stored, updated);
}

#[test]
fn update_and_delete_report_unknown_ids() {
    let (service, _) = admin_service(odisha_schools());
    let missing = SchoolId("sch-404".to_string());

    assert!(matches!(
        service.update_school(&missing, valid_fields("Ghost", "Puri")),
        Err(AdminError::NotFound(_))
    ));
    assert!(matches!(
        service.delete_school(&missing),
        Err(AdminError::NotFound(_))
    ));
}

#[test]
fn backend_failures_become_mutation_notices() {
    let service = AdminService::new(
        Arc::new(UnavailableBackend),
        Arc::new(MemorySessions::standard()),
    );

    let err = service
        .create_school(valid_fields("Capital High School", "Bhubaneswar"))
        .expect_err("rejected");
    assert_eq!(err.to_string(), "Failed to create school");

    let err = service
        .delete_school(&SchoolId("sch-001".to_string()))
        .expect_err("offline");
    assert_eq!(err.to_string(), "Failed to delete school");

    let err = service.delete_all_schools().expect_err("offline");
    assert_eq!(err.to_string(), "Failed to delete all schools");
}

#[test]
fn delete_all_empties_the_table() {
    let (service, backend) = admin_service(odisha_schools());
    assert_eq!(service.delete_all_schools().expect("delete all"), 4);
    assert!(backend.stored().is_empty());
}

#[test]
fn admin_search_includes_district() {
    let (service, _) = admin_service(odisha_schools());

    let found = service.schools("khordha").expect("search runs");
    assert_eq!(found.len(), 2);
    assert_eq!(service.schools("").expect("search runs").len(), 4);
}

#[test]
fn users_are_filtered_and_summarised() {
    let (service, _) = admin_service(Vec::new());

    let directory = service.users("anita", Utc::now()).expect("users load");
    assert_eq!(directory.users.len(), 1);
    assert_eq!(directory.users[0].email, "parent@example.com");
    assert_eq!(directory.summary.total, 2);
    assert_eq!(directory.summary.admins, 1);
    assert_eq!(directory.summary.new_this_week, 1);
    assert_eq!(directory.summary.active, 1);
}

#[test]
fn dashboard_and_analytics_count_rows() {
    let (service, _) = admin_service(odisha_schools());

    let dashboard = service.dashboard().expect("dashboard loads");
    assert_eq!(dashboard.total_schools, 4);
    assert_eq!(dashboard.total_users, 2);
    assert_eq!(dashboard.total_ratings, 3);
    assert_eq!(dashboard.average_rating, 4.4);

    let analytics = service.analytics().expect("analytics load");
    assert_eq!(analytics.dashboard, dashboard);
    let boards: Vec<_> = analytics
        .schools_by_board
        .iter()
        .map(|entry| (entry.board, entry.count))
        .collect();
    assert_eq!(
        boards,
        vec![(Board::Cbse, 2), (Board::Ib, 1), (Board::Icse, 1)]
    );
    let private = analytics
        .schools_by_type
        .iter()
        .find(|entry| entry.school_type == SchoolType::Private)
        .expect("private schools counted");
    assert_eq!(private.count, 1);
}

#[test]
fn settings_round_trip_through_backend() {
    let (service, _) = admin_service(Vec::new());
    assert_eq!(service.settings().expect("load"), SiteSettings::default());

    let updated = SiteSettings {
        maintenance_mode: true,
        max_rating_per_user: 3,
        ..SiteSettings::default()
    };
    service.save_settings(updated.clone()).expect("save");
    assert_eq!(service.settings().expect("load"), updated);

    let reset = service.reset_settings().expect("reset");
    assert_eq!(reset, SiteSettings::default());
    assert_eq!(service.settings().expect("load"), SiteSettings::default());
}

#[test]
fn invalid_settings_are_not_stored() {
    let (service, _) = admin_service(Vec::new());
    let invalid = SiteSettings {
        site_name: " ".to_string(),
        ..SiteSettings::default()
    };

    assert!(matches!(
        service.save_settings(invalid),
        Err(AdminError::Settings(_))
    ));
    assert_eq!(service.settings().expect("load"), SiteSettings::default());
}
