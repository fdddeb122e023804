//! Web-service function selectors
//!
//! Each constant is the `wsfunction` value of one remote operation.

/// Path of the REST server, relative to the Moodle base URL
pub const WEBSERVICE_PATH: &str = "/webservice/rest/server.php";

/// Path of the self enrolment page, relative to the Moodle base URL
pub const ENROL_PATH: &str = "/enrol/index.php";

pub const GET_COURSES: &str = "core_course_get_courses";
pub const GET_COURSES_BY_FIELD: &str = "core_course_get_courses_by_field";
pub const DUPLICATE_COURSE: &str = "core_course_duplicate_course";
pub const IMPORT_COURSE: &str = "core_course_import_course";

pub const ENROL_USERS: &str = "enrol_manual_enrol_users";
pub const UNENROL_USERS: &str = "enrol_manual_unenrol_users";
pub const GET_ENROLLED_USERS: &str = "core_enrol_get_enrolled_users";
pub const GET_COURSE_ENROLMENT_METHODS: &str = "core_enrol_get_course_enrolment_methods";
pub const SELF_ENROLMENT_INSTANCE_INFO: &str = "enrol_self_get_instance_info";

pub const GET_USERS: &str = "core_user_get_users";
pub const CREATE_USERS: &str = "core_user_create_users";

pub const GET_ROLE_BY_SHORTNAME: &str = "local_raisecli_get_role_by_shortname";
pub const GET_SELF_ENROLMENT_METHODS: &str = "local_raisecli_get_self_enrolment_methods";
pub const ENABLE_SELF_ENROLMENT_METHOD: &str = "local_raisecli_enable_self_enrolment_method";
pub const SET_SELF_ENROLMENT_METHOD_KEY: &str = "local_raisecli_set_self_enrolment_method_key";
pub const GET_USER_UUIDS: &str = "local_raisecli_get_user_uuids";
pub const GET_POLICY_ACCEPTANCE_DATA: &str = "local_raisecli_get_policy_acceptance_data";

pub const GET_GRADE_ITEMS: &str = "gradereport_user_get_grade_items";
pub const GET_QUIZZES_BY_COURSES: &str = "mod_quiz_get_quizzes_by_courses";
pub const GET_USER_QUIZ_ATTEMPTS: &str = "mod_quiz_get_user_attempts";
pub const GET_QUIZ_ATTEMPT_REVIEW: &str = "mod_quiz_get_attempt_review";

/// Exception class Moodle raises when a looked-up record does not exist
pub const MISSING_RECORD_EXCEPTION: &str = "dml_missing_record_exception";
