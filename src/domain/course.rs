//! Courses, enrolment methods and the course bulk record

use super::ids::{CourseId, EnrolmentId, RoleId};
use super::user::{AuthMethod, UserIdentity};
use serde::{Deserialize, Serialize};

/// A course as returned by the web service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    #[serde(default)]
    pub shortname: Option<String>,
    #[serde(default)]
    pub fullname: Option<String>,
    #[serde(default)]
    pub categoryid: Option<i64>,
}

/// An enrolment method instance attached to a course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrolmentMethod {
    pub id: EnrolmentId,
    #[serde(default)]
    pub courseid: Option<CourseId>,
    #[serde(default)]
    pub roleid: Option<RoleId>,
    /// Moodle stores `0` for enabled, `1` for disabled
    #[serde(default)]
    pub status: Option<i64>,
    #[serde(default)]
    pub password: Option<String>,
}

impl EnrolmentMethod {
    pub fn is_enabled(&self) -> bool {
        self.status == Some(0)
    }
}

/// One row of a course bulk setup
///
/// Read from the input CSV, then augmented in place by the provisioner with
/// the new course id, enrolment URL and enrolment key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseRecord {
    pub instructor_firstname: String,
    pub instructor_lastname: String,
    pub instructor_email: String,
    pub instructor_auth_type: String,
    pub course_name: String,
    pub course_shortname: String,
    pub course_category: String,
    #[serde(default)]
    pub course_id: Option<CourseId>,
    #[serde(default)]
    pub course_enrolment_url: Option<String>,
    #[serde(default)]
    pub course_enrolment_key: Option<String>,
}

impl CourseRecord {
    /// Column names of the course bulk input CSV
    pub const INPUT_FIELDS: [&'static str; 7] = [
        "instructor_firstname",
        "instructor_lastname",
        "instructor_email",
        "instructor_auth_type",
        "course_name",
        "course_shortname",
        "course_category",
    ];

    /// Column names of the course bulk output CSV
    pub const OUTPUT_FIELDS: [&'static str; 10] = [
        "instructor_firstname",
        "instructor_lastname",
        "instructor_email",
        "instructor_auth_type",
        "course_name",
        "course_shortname",
        "course_category",
        "course_id",
        "course_enrolment_url",
        "course_enrolment_key",
    ];

    pub fn instructor(&self) -> UserIdentity {
        UserIdentity::new(
            self.instructor_firstname.clone(),
            self.instructor_lastname.clone(),
            self.instructor_email.clone(),
            AuthMethod::from(self.instructor_auth_type.clone()),
        )
    }

    /// Whether the provisioner has filled in the derived fields
    pub fn is_provisioned(&self) -> bool {
        self.course_id.is_some()
            && self.course_enrolment_url.is_some()
            && self.course_enrolment_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> CourseRecord {
        CourseRecord {
            instructor_firstname: "Tom".into(),
            instructor_lastname: "Michaels".into(),
            instructor_email: "TomMichaels@example.com".into(),
            instructor_auth_type: "manual".into(),
            course_name: "Algebra".into(),
            course_shortname: "a1".into(),
            course_category: "MISC".into(),
            course_id: None,
            course_enrolment_url: None,
            course_enrolment_key: None,
        }
    }

    #[test]
    fn test_instructor_identity() {
        let identity = record().instructor();
        assert_eq!(identity.first_name, "Tom");
        assert!(identity.auth.is_manual());
        assert_eq!(identity.normalized_email(), "tommichaels@example.com");
    }

    #[test]
    fn test_is_provisioned() {
        let mut r = record();
        assert!(!r.is_provisioned());
        r.course_id = Some(CourseId::new(3));
        r.course_enrolment_url = Some("http://moodle/enrol/index.php?id=3".into());
        r.course_enrolment_key = Some("brave-otter-0042".into());
        assert!(r.is_provisioned());
    }

    #[test]
    fn test_enrolment_method_status() {
        let method: EnrolmentMethod =
            serde_json::from_str(r#"{"id": 9, "roleid": 5, "status": 1}"#).unwrap();
        assert!(!method.is_enabled());
        assert_eq!(method.roleid, Some(RoleId::new(5)));
    }
}
