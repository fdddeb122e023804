//! Duplicate-course provisioning
//!
//! Provisioning one course runs these steps in order:
//!
//! 1. resolve or create the instructor account
//! 2. duplicate the base course
//! 3. enrol the instructor in the new course
//! 4. find the student self enrolment method (exactly one must exist)
//! 5. enable it
//! 6. set a fresh enrolment key on it
//!
//! Duplicating a large course can take longer than the proxy in front of
//! Moodle allows, so the client sees a timeout while the server carries on
//! and finishes the copy. A transport failure on step 2 is therefore not
//! fatal: the provisioner polls the course list until a course with the
//! target short name shows up and continues with that course.

use crate::adapters::moodle::MoodleClient;
use crate::config::ProvisioningConfig;
use crate::core::secrets::generate_enrolment_key;
use crate::core::users::resolve_or_create;
use crate::domain::ids::{CourseId, RoleId};
use crate::domain::{CourseRecord, MoodleCliError, MoodleError, ProvisioningStage, Result};
use std::future::Future;
use std::time::Duration;

/// How a timed-out duplication is recovered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoveryPolicy {
    /// Pause between two course listings
    pub poll_interval: Duration,
    /// Number of listings before giving up; `None` polls until the course appears
    pub max_attempts: Option<u32>,
}

impl Default for RecoveryPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(30),
            max_attempts: None,
        }
    }
}

impl From<&ProvisioningConfig> for RecoveryPolicy {
    fn from(config: &ProvisioningConfig) -> Self {
        Self {
            poll_interval: Duration::from_secs(config.poll_interval_seconds),
            max_attempts: config.max_poll_attempts,
        }
    }
}

/// Role ids used when provisioning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CourseRoles {
    /// Role the instructor is enrolled with
    pub instructor: RoleId,
    /// Role of the self enrolment method students use
    pub student: RoleId,
}

impl CourseRoles {
    /// Looks up both roles by short name
    ///
    /// # Errors
    ///
    /// Returns an error if either role lookup fails.
    pub async fn lookup(client: &MoodleClient, config: &ProvisioningConfig) -> Result<Self> {
        let instructor = client.get_role_by_shortname(&config.instructor_role).await?;
        let student = client.get_role_by_shortname(&config.student_role).await?;
        tracing::debug!(
            instructor_role = %config.instructor_role,
            instructor_role_id = %instructor.id,
            student_role = %config.student_role,
            student_role_id = %student.id,
            "Resolved provisioning roles"
        );
        Ok(Self {
            instructor: instructor.id,
            student: student.id,
        })
    }
}

/// Provisions courses by duplicating a base course
pub struct Provisioner<'a> {
    client: &'a MoodleClient,
    recovery: RecoveryPolicy,
    key_generator: fn() -> String,
}

impl<'a> Provisioner<'a> {
    /// Creates a provisioner using `client` for every remote call
    pub fn new(client: &'a MoodleClient, recovery: RecoveryPolicy) -> Self {
        Self {
            client,
            recovery,
            key_generator: random_enrolment_key,
        }
    }

    /// Gateway used for every remote call
    pub fn client(&self) -> &'a MoodleClient {
        self.client
    }

    /// Replaces the enrolment key generator
    pub fn with_key_generator(mut self, key_generator: fn() -> String) -> Self {
        self.key_generator = key_generator;
        self
    }

    /// Provisions one course and returns the record with its derived fields set
    ///
    /// # Arguments
    ///
    /// * `base_course` - Course to duplicate
    /// * `record` - Instructor and target course details
    /// * `roles` - Instructor and student role ids
    ///
    /// # Errors
    ///
    /// Returns [`MoodleCliError::Provisioning`] naming the step that failed.
    /// A transport failure while duplicating is recovered by polling and is
    /// only reported if a bounded poll gives up.
    pub async fn provision(
        &self,
        base_course: CourseId,
        mut record: CourseRecord,
        roles: CourseRoles,
    ) -> Result<CourseRecord> {
        let shortname = record.course_shortname.clone();
        let shortname = shortname.as_str();

        // Checked before the first remote write so a bad row leaves no trace
        let category = parse_category(&record)?;

        let instructor = record.instructor();
        let instructor_id = at_stage(shortname, ProvisioningStage::ResolvingInstructor, async {
            resolve_or_create(self.client, &instructor).await
        })
        .await?;

        let course_id = self.duplicate(base_course, &record, category).await?;
        tracing::info!(shortname, course_id = %course_id, "Course duplicated");

        at_stage(shortname, ProvisioningStage::EnrollingInstructor, async {
            self.client
                .enrol_user(course_id, instructor_id, roles.instructor)
                .await
                .map_err(MoodleCliError::from)
        })
        .await?;

        let enrolment_id = at_stage(shortname, ProvisioningStage::LocatingStudentEnrolment, async {
            let methods = self
                .client
                .get_self_enrolment_methods(course_id, roles.student)
                .await
                .map_err(MoodleCliError::from)?;
            match methods.as_slice() {
                [method] => {
                    tracing::debug!(
                        shortname,
                        enrolment_id = %method.id,
                        already_enabled = method.is_enabled(),
                        "Located student self enrolment method"
                    );
                    Ok(method.id)
                }
                _ => Err(MoodleCliError::from(MoodleError::InvariantViolation(format!(
                    "Expected exactly one student self enrolment method in course {course_id}, found {}",
                    methods.len()
                )))),
            }
        })
        .await?;

        at_stage(shortname, ProvisioningStage::EnablingEnrolment, async {
            self.client
                .enable_self_enrolment_method(enrolment_id)
                .await
                .map_err(MoodleCliError::from)
        })
        .await?;

        let key = (self.key_generator)();
        at_stage(shortname, ProvisioningStage::SettingKey, async {
            self.client
                .set_self_enrolment_method_key(enrolment_id, &key)
                .await
                .map_err(MoodleCliError::from)
        })
        .await?;

        record.course_id = Some(course_id);
        record.course_enrolment_url = Some(self.client.course_enrolment_url(course_id));
        record.course_enrolment_key = Some(key);

        tracing::info!(
            shortname,
            course_id = %course_id,
            enrolment_id = %enrolment_id,
            stage = %ProvisioningStage::Done,
            "Course provisioned"
        );
        Ok(record)
    }

    async fn duplicate(
        &self,
        base_course: CourseId,
        record: &CourseRecord,
        category: i64,
    ) -> Result<CourseId> {
        let shortname = record.course_shortname.as_str();
        let result = self
            .client
            .copy_course(base_course, &record.course_name, shortname, category, false)
            .await;

        match result {
            Ok(course_id) => Ok(course_id),
            Err(err) if err.is_transport() => {
                tracing::warn!(
                    shortname,
                    base_course_id = %base_course,
                    error = %err,
                    "Duplication request lost; waiting for the course to appear"
                );
                at_stage(
                    shortname,
                    ProvisioningStage::DuplicateTimeoutRecovery,
                    self.await_duplicate(shortname),
                )
                .await
            }
            Err(err) => Err(stage_error(shortname, ProvisioningStage::Duplicating, err.into())),
        }
    }

    /// Polls the course list until a course named `shortname` appears
    ///
    /// The first listing happens immediately. Transport failures while
    /// listing are logged and polling continues; remote errors end it.
    async fn await_duplicate(&self, shortname: &str) -> Result<CourseId> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;

            match self.client.get_courses().await {
                Ok(courses) => {
                    if let Some(course) = courses
                        .iter()
                        .find(|c| c.shortname.as_deref() == Some(shortname))
                    {
                        tracing::info!(shortname, course_id = %course.id, attempt, "Found duplicated course");
                        return Ok(course.id);
                    }
                }
                Err(err) if err.is_transport() => {
                    tracing::warn!(shortname, attempt, error = %err, "Course listing failed");
                }
                Err(err) => return Err(err.into()),
            }

            if self.recovery.max_attempts.is_some_and(|max| attempt >= max) {
                return Err(MoodleError::DuplicateNotFound {
                    shortname: shortname.to_string(),
                    attempts: attempt,
                }
                .into());
            }

            crate::log_retry_attempt!(attempt, self.recovery.max_attempts, "duplicated course not listed yet");
            tokio::time::sleep(self.recovery.poll_interval).await;
        }
    }
}

fn random_enrolment_key() -> String {
    generate_enrolment_key(&mut rand::thread_rng())
}

fn stage_error(shortname: &str, stage: ProvisioningStage, source: MoodleCliError) -> MoodleCliError {
    MoodleCliError::Provisioning {
        shortname: shortname.to_string(),
        stage,
        source: Box::new(source),
    }
}

/// Category id of the target course, reported at the duplication stage
fn parse_category(record: &CourseRecord) -> Result<i64> {
    record.course_category.trim().parse::<i64>().map_err(|_| {
        stage_error(
            &record.course_shortname,
            ProvisioningStage::Duplicating,
            MoodleCliError::Validation(format!(
                "course_category must be a numeric category id, got '{}'",
                record.course_category
            )),
        )
    })
}

async fn at_stage<T, F>(shortname: &str, stage: ProvisioningStage, step: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tracing::debug!(shortname, stage = %stage, "Provisioning step");
    step.await.map_err(|source| stage_error(shortname, stage, source))
}
