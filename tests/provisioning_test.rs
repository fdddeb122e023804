//! Integration tests for duplicate-course provisioning

mod common;

use common::{exception, provisioning_site, Reply, ScriptedTransport};
use moodlecli::core::provision::{CourseRoles, Provisioner, RecoveryPolicy};
use moodlecli::domain::{
    CourseId, CourseRecord, MoodleCliError, MoodleError, ProvisioningStage, RoleId,
};
use serde_json::json;
use std::time::Duration;
use test_case::test_case;

const DUPLICATE: &str = "core_course_duplicate_course";
const GET_COURSES: &str = "core_course_get_courses";
const ENROL: &str = "enrol_manual_enrol_users";
const METHODS: &str = "local_raisecli_get_self_enrolment_methods";
const ENABLE: &str = "local_raisecli_enable_self_enrolment_method";
const SET_KEY: &str = "local_raisecli_set_self_enrolment_method_key";

fn record(category: &str) -> CourseRecord {
    CourseRecord {
        instructor_firstname: "Tom".into(),
        instructor_lastname: "Michaels".into(),
        instructor_email: "TomMichaels@gmail.com".into(),
        instructor_auth_type: "manual".into(),
        course_name: "Algebra3".into(),
        course_shortname: "ALG3".into(),
        course_category: category.into(),
        course_id: None,
        course_enrolment_url: None,
        course_enrolment_key: None,
    }
}

fn roles() -> CourseRoles {
    CourseRoles {
        instructor: RoleId::new(3),
        student: RoleId::new(5),
    }
}

fn fast_policy(max_attempts: Option<u32>) -> RecoveryPolicy {
    RecoveryPolicy {
        poll_interval: Duration::from_millis(1),
        max_attempts,
    }
}

fn fixed_key() -> String {
    "brave-otter-0042".to_string()
}

fn stage_of(err: &MoodleCliError) -> ProvisioningStage {
    match err {
        MoodleCliError::Provisioning { stage, .. } => *stage,
        other => panic!("expected a provisioning error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_provision_course() {
    let transport = ScriptedTransport::new();
    provisioning_site(&transport);
    let client = transport.client();

    let provisioned = Provisioner::new(&client, fast_policy(None))
        .with_key_generator(fixed_key)
        .provision(CourseId::new(2), record("1"), roles())
        .await
        .unwrap();

    assert_eq!(provisioned.course_id, Some(CourseId::new(3)));
    assert_eq!(
        provisioned.course_enrolment_url.as_deref(),
        Some("http://test-things/enrol/index.php?id=3")
    );
    assert_eq!(provisioned.course_enrolment_key.as_deref(), Some("brave-otter-0042"));
    assert!(provisioned.is_provisioned());

    assert_eq!(
        transport.functions(),
        vec![
            "core_user_get_users",
            DUPLICATE,
            ENROL,
            METHODS,
            ENABLE,
            SET_KEY
        ]
    );

    let duplicate = &transport.calls_to(DUPLICATE)[0];
    assert_eq!(duplicate.method, "POST");
    assert_eq!(duplicate.param("courseid"), Some("2"));
    assert_eq!(duplicate.param("fullname"), Some("Algebra3"));
    assert_eq!(duplicate.param("shortname"), Some("ALG3"));
    assert_eq!(duplicate.param("categoryid"), Some("1"));
    assert!(duplicate.param("options[0][name]").is_none());

    let enrol = &transport.calls_to(ENROL)[0];
    assert_eq!(enrol.param("enrolments[0][courseid]"), Some("3"));
    assert_eq!(enrol.param("enrolments[0][userid]"), Some("2"));
    assert_eq!(enrol.param("enrolments[0][roleid]"), Some("3"));

    let methods = &transport.calls_to(METHODS)[0];
    assert_eq!(methods.param("roleid"), Some("5"));

    let set_key = &transport.calls_to(SET_KEY)[0];
    assert_eq!(set_key.param("enrolid"), Some("2"));
    assert_eq!(set_key.param("enrolkey"), Some("brave-otter-0042"));
}

#[test_case(json!([]) ; "no methods")]
#[test_case(json!([{"id": 2}, {"id": 4}]) ; "two methods")]
#[tokio::test]
async fn test_unexpected_enrolment_method_count(methods: serde_json::Value) {
    let transport = ScriptedTransport::new();
    provisioning_site(&transport);
    transport.on(METHODS, methods);
    let client = transport.client();

    let err = Provisioner::new(&client, fast_policy(None))
        .provision(CourseId::new(2), record("1"), roles())
        .await
        .unwrap_err();

    assert_eq!(stage_of(&err), ProvisioningStage::LocatingStudentEnrolment);
    assert!(matches!(
        err.moodle_error(),
        Some(MoodleError::InvariantViolation(_))
    ));
    assert_eq!(transport.count(ENABLE), 0);
    assert_eq!(transport.count(SET_KEY), 0);
}

#[tokio::test]
async fn test_duplicate_timeout_recovered_by_shortname() {
    let transport = ScriptedTransport::new();
    provisioning_site(&transport);
    transport.once(DUPLICATE, Reply::Timeout).on(
        GET_COURSES,
        json!([
            {"id": 1, "shortname": "moodle"},
            {"id": 2, "shortname": "BASE"},
            {"id": 7, "shortname": "ALG3"}
        ]),
    );
    let client = transport.client();

    let provisioned = Provisioner::new(&client, fast_policy(None))
        .provision(CourseId::new(2), record("1"), roles())
        .await
        .unwrap();

    assert_eq!(provisioned.course_id, Some(CourseId::new(7)));
    assert_eq!(transport.count(DUPLICATE), 1);
    assert_eq!(transport.count(GET_COURSES), 1);
    assert_eq!(
        transport.calls_to(ENROL)[0].param("enrolments[0][courseid]"),
        Some("7")
    );
}

#[tokio::test]
async fn test_recovery_polls_until_course_is_listed() {
    let transport = ScriptedTransport::new();
    provisioning_site(&transport);
    transport
        .once(DUPLICATE, Reply::Timeout)
        .once(GET_COURSES, Reply::Json(json!([{"id": 1, "shortname": "moodle"}])))
        .once(GET_COURSES, Reply::Refused)
        .on(GET_COURSES, json!([{"id": 8, "shortname": "ALG3"}]));
    let client = transport.client();

    let provisioned = Provisioner::new(&client, fast_policy(None))
        .provision(CourseId::new(2), record("1"), roles())
        .await
        .unwrap();

    assert_eq!(provisioned.course_id, Some(CourseId::new(8)));
    assert_eq!(transport.count(GET_COURSES), 3);
}

#[tokio::test]
async fn test_bounded_recovery_gives_up() {
    let transport = ScriptedTransport::new();
    provisioning_site(&transport);
    transport
        .once(DUPLICATE, Reply::Timeout)
        .on(GET_COURSES, json!([{"id": 1, "shortname": "moodle"}]));
    let client = transport.client();

    let err = Provisioner::new(&client, fast_policy(Some(3)))
        .provision(CourseId::new(2), record("1"), roles())
        .await
        .unwrap_err();

    assert_eq!(stage_of(&err), ProvisioningStage::DuplicateTimeoutRecovery);
    assert!(matches!(
        err.moodle_error(),
        Some(MoodleError::DuplicateNotFound { attempts: 3, .. })
    ));
    assert_eq!(transport.count(GET_COURSES), 3);
    assert_eq!(transport.count(ENROL), 0);
}

#[tokio::test]
async fn test_remote_error_while_duplicating_is_not_recovered() {
    let transport = ScriptedTransport::new();
    provisioning_site(&transport);
    transport.on(DUPLICATE, exception("moodle_exception"));
    let client = transport.client();

    let err = Provisioner::new(&client, fast_policy(None))
        .provision(CourseId::new(2), record("1"), roles())
        .await
        .unwrap_err();

    assert_eq!(stage_of(&err), ProvisioningStage::Duplicating);
    assert_eq!(transport.count(GET_COURSES), 0);
}

#[tokio::test]
async fn test_remote_error_while_polling_stops_recovery() {
    let transport = ScriptedTransport::new();
    provisioning_site(&transport);
    transport
        .once(DUPLICATE, Reply::Timeout)
        .on(GET_COURSES, exception("webservice_access_exception"));
    let client = transport.client();

    let err = Provisioner::new(&client, fast_policy(None))
        .provision(CourseId::new(2), record("1"), roles())
        .await
        .unwrap_err();

    assert_eq!(stage_of(&err), ProvisioningStage::DuplicateTimeoutRecovery);
    assert!(err
        .moodle_error()
        .is_some_and(|e| e.is_remote_exception("webservice_access_exception")));
    assert_eq!(transport.count(GET_COURSES), 1);
}

#[tokio::test]
async fn test_non_numeric_category_rejected_before_any_remote_call() {
    let transport = ScriptedTransport::new();
    provisioning_site(&transport);
    transport.on("core_user_get_users", json!({"users": []}));
    let client = transport.client();

    let err = Provisioner::new(&client, fast_policy(None))
        .provision(CourseId::new(2), record("MISC"), roles())
        .await
        .unwrap_err();

    assert_eq!(stage_of(&err), ProvisioningStage::Duplicating);
    assert!(err.to_string().contains("MISC"));
    assert_eq!(transport.count("core_user_create_users"), 0);
    assert_eq!(transport.count(DUPLICATE), 0);
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn test_instructor_lookup_failure_stops_before_duplicating() {
    let transport = ScriptedTransport::new();
    provisioning_site(&transport);
    transport.on("core_user_get_users", exception("invalid_parameter_exception"));
    let client = transport.client();

    let err = Provisioner::new(&client, fast_policy(None))
        .provision(CourseId::new(2), record("1"), roles())
        .await
        .unwrap_err();

    assert_eq!(stage_of(&err), ProvisioningStage::ResolvingInstructor);
    assert_eq!(transport.count(DUPLICATE), 0);
}

#[tokio::test]
async fn test_lookup_roles_by_shortname() {
    let transport = ScriptedTransport::new();
    transport.on_fn("local_raisecli_get_role_by_shortname", |params| {
        let id = match params.get("shortname").map(String::as_str) {
            Some("editingteacher") => 3,
            Some("student") => 5,
            other => panic!("unexpected role {other:?}"),
        };
        Reply::Json(json!({"id": id}))
    });
    let client = transport.client();

    let roles = CourseRoles::lookup(&client, &Default::default()).await.unwrap();
    assert_eq!(roles.instructor, RoleId::new(3));
    assert_eq!(roles.student, RoleId::new(5));
}
