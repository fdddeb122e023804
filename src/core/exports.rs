//! Single-artifact exports of user data

use crate::adapters::moodle::functions::MISSING_RECORD_EXCEPTION;
use crate::adapters::moodle::MoodleClient;
use crate::adapters::storage::{put_json, BlobStore};
use crate::domain::ids::{CourseId, UserId};
use crate::domain::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Enrolled users of a course together with their external identities
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CourseUsers {
    pub users: Vec<Value>,
    pub uuids: Vec<Value>,
}

/// External identity mappings, or none if Moodle has no record of them
///
/// A `dml_missing_record_exception` means no mapping exists for the
/// requested users and yields an empty list; every other error propagates.
pub async fn maybe_user_uuids(client: &MoodleClient, user_ids: &[UserId]) -> Result<Vec<Value>> {
    match client.get_user_uuids(user_ids).await {
        Ok(uuids) => Ok(uuids),
        Err(err) if err.is_remote_exception(MISSING_RECORD_EXCEPTION) => {
            tracing::debug!(users = user_ids.len(), "No user UUID records");
            Ok(Vec::new())
        }
        Err(err) => Err(err.into()),
    }
}

/// Fetches a course's enrolled users and their external identities
pub async fn course_users(client: &MoodleClient, course_id: CourseId) -> Result<CourseUsers> {
    let users = client.get_enrolled_users(course_id).await?;
    let ids: Vec<UserId> = users
        .iter()
        .filter_map(|u| u.get("id").and_then(Value::as_i64))
        .map(UserId::new)
        .collect();

    // An empty id list would ask for every user on the site
    let uuids = if ids.is_empty() {
        Vec::new()
    } else {
        maybe_user_uuids(client, &ids).await?
    };

    tracing::debug!(course_id = %course_id, users = users.len(), uuids = uuids.len(), "Collected course users");
    Ok(CourseUsers { users, uuids })
}

/// Writes a course's users and their identities to `container`/`key`
pub async fn export_course_users(
    client: &MoodleClient,
    store: &dyn BlobStore,
    course_id: CourseId,
    container: &str,
    key: &str,
) -> Result<CourseUsers> {
    let users = course_users(client, course_id).await?;
    put_json(store, container, key, &users).await?;
    tracing::info!(course_id = %course_id, container, key, "Course users exported");
    Ok(users)
}

/// Writes the identity mappings of every user to `container`/`key`
pub async fn export_user_uuids(
    client: &MoodleClient,
    store: &dyn BlobStore,
    container: &str,
    key: &str,
) -> Result<usize> {
    let uuids = maybe_user_uuids(client, &[]).await?;
    put_json(store, container, key, &uuids).await?;
    tracing::info!(count = uuids.len(), container, key, "User UUIDs exported");
    Ok(uuids.len())
}

/// Writes the policy acceptance records of every user to `container`/`key`
pub async fn export_policy_acceptances(
    client: &MoodleClient,
    store: &dyn BlobStore,
    container: &str,
    key: &str,
) -> Result<usize> {
    let records = client.get_policy_acceptance_data().await?;
    put_json(store, container, key, &records).await?;
    tracing::info!(count = records.len(), container, key, "Policy acceptances exported");
    Ok(records.len())
}
