//! Moodle web-service gateway
//!
//! [`MoodleClient`] is the single point of contact with the remote service.
//! Every call carries the same three fixed parameters (`wsfunction`,
//! `moodlewsrestformat=json`, `wstoken`) merged with the flattened
//! operation parameters, and every JSON response carrying an `exception` key
//! is turned into [`MoodleError::Remote`].

use super::functions as ws;
use super::params::{flatten, ParamValue};
use super::transport::{ReqwestTransport, Transport};
use crate::config::{MoodleConfig, SecretString};
use crate::core::secrets::generate_password;
use crate::domain::grades::{AttemptSummary, UserGrade};
use crate::domain::ids::{AttemptId, CourseId, EnrolmentId, QuizId, RoleId, UserId};
use crate::domain::{Course, EnrolmentMethod, MoodleError, MoodleUser, Role, UserIdentity};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

type MoodleResult<T> = std::result::Result<T, MoodleError>;

/// Default per-call timeout; duplicating a large course can take minutes
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Method {
    Get,
    Post,
}

/// Gateway to the Moodle REST web service
///
/// One method per remote operation. Read operations are sent as GET, write
/// operations as POST.
///
/// # Example
///
/// ```no_run
/// use moodlecli::adapters::moodle::{MoodleClient, ReqwestTransport};
/// use moodlecli::config::secret_string;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let transport = Arc::new(ReqwestTransport::new()?);
/// let client = MoodleClient::new(transport, "https://moodle.example.com", secret_string("token".into()));
///
/// for course in client.get_courses().await? {
///     println!("{} {:?}", course.id, course.shortname);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct MoodleClient {
    transport: Arc<dyn Transport>,
    base_url: String,
    endpoint: String,
    token: SecretString,
    timeout: Duration,
}

impl std::fmt::Debug for MoodleClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MoodleClient")
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl MoodleClient {
    /// Creates a gateway over `transport`
    ///
    /// # Arguments
    ///
    /// * `transport` - Sends the requests
    /// * `base_url` - Moodle site URL, without the web-service path
    /// * `token` - Web-service token
    pub fn new(transport: Arc<dyn Transport>, base_url: impl Into<String>, token: SecretString) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let endpoint = format!("{base_url}{}", ws::WEBSERVICE_PATH);
        Self {
            transport,
            base_url,
            endpoint,
            token,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Creates a gateway with the production HTTP transport
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &MoodleConfig) -> MoodleResult<Self> {
        let transport = Arc::new(ReqwestTransport::new()?);
        Ok(Self::new(transport, config.base_url.clone(), config.token.clone())
            .with_timeout(Duration::from_secs(config.timeout_seconds)))
    }

    /// Overrides the per-call timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL of the REST endpoint
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// URL students use to self-enrol in a course
    pub fn course_enrolment_url(&self, course_id: CourseId) -> String {
        format!("{}{}?id={course_id}", self.base_url, ws::ENROL_PATH)
    }

    /// Builds the complete wire parameters for one call
    ///
    /// The fixed parameters come first, followed by the flattened operation
    /// parameters in key order.
    pub fn create_params(&self, function: &str, params: &ParamValue) -> Vec<(String, String)> {
        let mut wire = vec![
            ("wsfunction".to_string(), function.to_string()),
            ("moodlewsrestformat".to_string(), "json".to_string()),
            (
                "wstoken".to_string(),
                self.token.expose_secret().as_ref().to_string(),
            ),
        ];
        wire.extend(
            flatten(params)
                .into_iter()
                .map(|(key, value)| (key, value.to_string())),
        );
        wire
    }

    async fn call(&self, method: Method, function: &str, params: ParamValue) -> MoodleResult<Value> {
        let wire = self.create_params(function, &params);
        tracing::debug!(function, method = ?method, param_count = wire.len() - 3, "Calling Moodle web service");

        let response = match method {
            Method::Get => self.transport.get(&self.endpoint, &wire, self.timeout).await,
            Method::Post => self.transport.post(&self.endpoint, &wire, self.timeout).await,
        }
        .map_err(|e| {
            tracing::debug!(function, error = %e, "Moodle call failed");
            e
        })?;

        check_exception(response)
    }

    async fn get(&self, function: &str, params: Value) -> MoodleResult<Value> {
        self.call(Method::Get, function, params.into()).await
    }

    async fn post(&self, function: &str, params: Value) -> MoodleResult<Value> {
        self.call(Method::Post, function, params.into()).await
    }

    // ---- courses ----

    /// Lists every course on the site
    pub async fn get_courses(&self) -> MoodleResult<Vec<Course>> {
        let value = self.get(ws::GET_COURSES, json!({})).await?;
        decode(ws::GET_COURSES, value)
    }

    /// Looks up a course by its unique short name
    ///
    /// # Errors
    ///
    /// Returns [`MoodleError::InvariantViolation`] if more than one course
    /// matches.
    pub async fn get_course_by_shortname(&self, shortname: &str) -> MoodleResult<Option<Course>> {
        #[derive(Deserialize)]
        struct Courses {
            #[serde(default)]
            courses: Vec<Course>,
        }

        let value = self
            .get(
                ws::GET_COURSES_BY_FIELD,
                json!({"field": "shortname", "value": shortname}),
            )
            .await?;
        let mut courses = decode::<Courses>(ws::GET_COURSES_BY_FIELD, value)?.courses;
        if courses.len() > 1 {
            return Err(MoodleError::InvariantViolation(format!(
                "{} courses share short name '{shortname}'",
                courses.len()
            )));
        }
        Ok(courses.pop())
    }

    /// Duplicates a course and returns the new course id
    ///
    /// # Arguments
    ///
    /// * `source_id` - Course to duplicate
    /// * `fullname` - Full name of the new course
    /// * `shortname` - Short name of the new course
    /// * `category_id` - Category to place the new course in
    /// * `copy_users` - Whether enrolled users are copied along with content
    ///
    /// # Errors
    ///
    /// Large courses can outlive the proxy in front of Moodle; the resulting
    /// [`MoodleError::Timeout`] does not mean the duplication failed.
    pub async fn copy_course(
        &self,
        source_id: CourseId,
        fullname: &str,
        shortname: &str,
        category_id: i64,
        copy_users: bool,
    ) -> MoodleResult<CourseId> {
        #[derive(Deserialize)]
        struct Duplicated {
            id: CourseId,
        }

        let mut params = json!({
            "courseid": source_id,
            "fullname": fullname,
            "shortname": shortname,
            "categoryid": category_id,
        });
        if copy_users {
            params["options"] = json!([{"name": "users", "value": 1}]);
        }

        let value = self.post(ws::DUPLICATE_COURSE, params).await?;
        Ok(decode::<Duplicated>(ws::DUPLICATE_COURSE, value)?.id)
    }

    /// Imports the content of one course into another
    pub async fn import_course(&self, from: CourseId, to: CourseId) -> MoodleResult<()> {
        self.post(
            ws::IMPORT_COURSE,
            json!({"importfrom": from, "importto": to, "deletecontent": 0}),
        )
        .await?;
        Ok(())
    }

    // ---- enrolment ----

    /// Enrols a user in a course with a role via manual enrolment
    pub async fn enrol_user(&self, course_id: CourseId, user_id: UserId, role_id: RoleId) -> MoodleResult<()> {
        self.post(
            ws::ENROL_USERS,
            json!({"enrolments": [{"roleid": role_id, "userid": user_id, "courseid": course_id}]}),
        )
        .await?;
        Ok(())
    }

    /// Removes a manual enrolment
    pub async fn unenrol_user(&self, course_id: CourseId, user_id: UserId, role_id: RoleId) -> MoodleResult<()> {
        self.post(
            ws::UNENROL_USERS,
            json!({"enrolments": [{"userid": user_id, "courseid": course_id, "roleid": role_id}]}),
        )
        .await?;
        Ok(())
    }

    /// Users enrolled in a course, as returned by the web service
    pub async fn get_enrolled_users(&self, course_id: CourseId) -> MoodleResult<Vec<Value>> {
        let value = self
            .get(ws::GET_ENROLLED_USERS, json!({"courseid": course_id}))
            .await?;
        decode(ws::GET_ENROLLED_USERS, value)
    }

    /// Every enrolment method instance of a course
    pub async fn get_course_enrolment_methods(&self, course_id: CourseId) -> MoodleResult<Vec<Value>> {
        let value = self
            .get(ws::GET_COURSE_ENROLMENT_METHODS, json!({"courseid": course_id}))
            .await?;
        decode(ws::GET_COURSE_ENROLMENT_METHODS, value)
    }

    /// Public details of a self enrolment instance
    pub async fn get_self_enrolment_info(&self, instance_id: EnrolmentId) -> MoodleResult<Value> {
        self.get(ws::SELF_ENROLMENT_INSTANCE_INFO, json!({"instanceid": instance_id}))
            .await
    }

    /// Self enrolment methods of a course that enrol with `role_id`
    pub async fn get_self_enrolment_methods(
        &self,
        course_id: CourseId,
        role_id: RoleId,
    ) -> MoodleResult<Vec<EnrolmentMethod>> {
        let value = self
            .get(
                ws::GET_SELF_ENROLMENT_METHODS,
                json!({"courseid": course_id, "roleid": role_id}),
            )
            .await?;
        decode(ws::GET_SELF_ENROLMENT_METHODS, value)
    }

    pub async fn enable_self_enrolment_method(&self, enrol_id: EnrolmentId) -> MoodleResult<Value> {
        self.post(ws::ENABLE_SELF_ENROLMENT_METHOD, json!({"enrolid": enrol_id}))
            .await
    }

    pub async fn set_self_enrolment_method_key(&self, enrol_id: EnrolmentId, key: &str) -> MoodleResult<Value> {
        self.post(
            ws::SET_SELF_ENROLMENT_METHOD_KEY,
            json!({"enrolid": enrol_id, "enrolkey": key}),
        )
        .await
    }

    // ---- users and roles ----

    /// Looks up a user by email, lower-cased before the query
    ///
    /// # Errors
    ///
    /// Returns [`MoodleError::InvariantViolation`] if more than one user
    /// matches.
    pub async fn get_user_by_email(&self, email: &str) -> MoodleResult<Option<MoodleUser>> {
        #[derive(Deserialize)]
        struct Users {
            #[serde(default)]
            users: Vec<MoodleUser>,
        }

        let email = crate::domain::user::normalize_email(email);
        let value = self
            .get(
                ws::GET_USERS,
                json!({"criteria": [{"key": "email", "value": email}]}),
            )
            .await?;
        let mut users = decode::<Users>(ws::GET_USERS, value)?.users;
        if users.len() > 1 {
            return Err(MoodleError::InvariantViolation(format!(
                "{} users found for email '{email}'",
                users.len()
            )));
        }
        Ok(users.pop())
    }

    /// Creates a user and returns its id
    ///
    /// The lower-cased email is used as both username and email. A random
    /// password is generated only for `manual` accounts; other auth plugins
    /// must not receive one or Moodle will try to email it out.
    pub async fn create_user(&self, identity: &UserIdentity) -> MoodleResult<UserId> {
        #[derive(Deserialize)]
        struct Created {
            id: UserId,
        }

        let email = identity.normalized_email();
        let mut user = json!({
            "username": email,
            "firstname": identity.first_name,
            "lastname": identity.last_name,
            "email": email,
            "auth": identity.auth.as_str(),
        });
        if identity.auth.is_manual() {
            user["password"] = Value::String(generate_password(&mut rand::thread_rng()));
        }

        let value = self.post(ws::CREATE_USERS, json!({"users": [user]})).await?;
        decode::<Vec<Created>>(ws::CREATE_USERS, value)?
            .into_iter()
            .next()
            .map(|created| created.id)
            .ok_or_else(|| {
                MoodleError::InvalidResponse(format!("{} returned no user", ws::CREATE_USERS))
            })
    }

    pub async fn get_role_by_shortname(&self, shortname: &str) -> MoodleResult<Role> {
        let value = self
            .get(ws::GET_ROLE_BY_SHORTNAME, json!({"shortname": shortname}))
            .await?;
        decode(ws::GET_ROLE_BY_SHORTNAME, value)
    }

    /// External identity mappings for `user_ids`, or for every user when empty
    pub async fn get_user_uuids(&self, user_ids: &[UserId]) -> MoodleResult<Vec<Value>> {
        let params = if user_ids.is_empty() {
            json!({})
        } else {
            json!({"user_ids": user_ids})
        };
        let value = self.get(ws::GET_USER_UUIDS, params).await?;
        decode(ws::GET_USER_UUIDS, value)
    }

    /// Policy acceptance records of every user
    pub async fn get_policy_acceptance_data(&self) -> MoodleResult<Vec<Value>> {
        let value = self.get(ws::GET_POLICY_ACCEPTANCE_DATA, json!({})).await?;
        decode(ws::GET_POLICY_ACCEPTANCE_DATA, value)
    }

    // ---- grades and quizzes ----

    /// Grade items of every user in a course
    pub async fn get_grade_items(&self, course_id: CourseId) -> MoodleResult<Vec<UserGrade>> {
        #[derive(Deserialize)]
        struct GradeItems {
            #[serde(default)]
            usergrades: Vec<UserGrade>,
        }

        let value = self
            .get(ws::GET_GRADE_ITEMS, json!({"courseid": course_id}))
            .await?;
        Ok(decode::<GradeItems>(ws::GET_GRADE_ITEMS, value)?.usergrades)
    }

    /// Quiz metadata for a set of courses
    pub async fn get_quizzes_by_courses(&self, course_ids: &[CourseId]) -> MoodleResult<Vec<Value>> {
        #[derive(Deserialize)]
        struct Quizzes {
            #[serde(default)]
            quizzes: Vec<Value>,
        }

        let value = self
            .get(ws::GET_QUIZZES_BY_COURSES, json!({"courseids": course_ids}))
            .await?;
        Ok(decode::<Quizzes>(ws::GET_QUIZZES_BY_COURSES, value)?.quizzes)
    }

    /// Finished attempts of one user on one quiz
    pub async fn get_user_quiz_attempts(&self, quiz_id: QuizId, user_id: UserId) -> MoodleResult<Vec<AttemptSummary>> {
        #[derive(Deserialize)]
        struct Attempts {
            #[serde(default)]
            attempts: Vec<AttemptSummary>,
        }

        let value = self
            .get(
                ws::GET_USER_QUIZ_ATTEMPTS,
                json!({"quizid": quiz_id, "userid": user_id, "status": "finished"}),
            )
            .await?;
        Ok(decode::<Attempts>(ws::GET_USER_QUIZ_ATTEMPTS, value)?.attempts)
    }

    /// Full review of one attempt: grade, attempt record and questions
    pub async fn get_quiz_attempt_review(&self, attempt_id: AttemptId) -> MoodleResult<Value> {
        self.get(ws::GET_QUIZ_ATTEMPT_REVIEW, json!({"attemptid": attempt_id}))
            .await
    }
}

/// Fails on a JSON object carrying an `exception` key
fn check_exception(value: Value) -> MoodleResult<Value> {
    let Some(exception) = value.as_object().and_then(|obj| obj.get("exception")) else {
        return Ok(value);
    };

    let text = |field: &str| {
        value
            .get(field)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    Err(MoodleError::Remote {
        exception: exception
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| exception.to_string()),
        errorcode: text("errorcode"),
        message: text("message"),
    })
}

fn decode<T: DeserializeOwned>(function: &str, value: Value) -> MoodleResult<T> {
    serde_json::from_value(value)
        .map_err(|e| MoodleError::InvalidResponse(format!("Unexpected {function} response: {e}")))
}
