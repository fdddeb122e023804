//! Incremental grade synchronization
//!
//! Grade items and quiz metadata are cheap to fetch and always reflect the
//! current grading state, so every pass fetches them fresh. Attempt
//! summaries and attempt reviews are expensive (one call per user and quiz,
//! then one per attempt), so they are reused from the previous pass where
//! the cached data is known to be current.
//!
//! Cached summaries for a (user, quiz) pair are current when the latest
//! `gradednotificationsenttime` among them is at or after the grade item's
//! `gradedatesubmitted`. Attempt reviews never change once an attempt is
//! finished, so a cached review is reused whenever its attempt id is cached.

use crate::adapters::moodle::MoodleClient;
use crate::adapters::storage::{get_json_or, put_json, BlobStore};
use crate::domain::grades::{AttemptIndex, GradeTree, QuizAttempts};
use crate::domain::ids::CourseId;
use crate::domain::Result;
use std::collections::BTreeMap;

/// Remote calls made and avoided during one synchronization
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub summaries_fetched: usize,
    pub summaries_reused: usize,
    pub details_fetched: usize,
    pub details_reused: usize,
}

/// Builds a fresh grade tree for a course, reusing `previous` where current
///
/// # Arguments
///
/// * `client` - Moodle gateway
/// * `course_id` - Course to synchronize
/// * `previous` - Tree from the previous pass; an empty tree fetches everything
///
/// # Errors
///
/// Any remote failure aborts the synchronization.
pub async fn update_grades(
    client: &MoodleClient,
    course_id: CourseId,
    previous: &GradeTree,
) -> Result<GradeTree> {
    let (tree, stats) = update_grades_with_stats(client, course_id, previous).await?;
    tracing::info!(
        course_id = %course_id,
        users = tree.usergrades.len(),
        details = tree.detail_count(),
        summaries_fetched = stats.summaries_fetched,
        summaries_reused = stats.summaries_reused,
        details_fetched = stats.details_fetched,
        details_reused = stats.details_reused,
        "Grades synchronized"
    );
    Ok(tree)
}

/// Same as [`update_grades`], also reporting how many remote calls were made
pub async fn update_grades_with_stats(
    client: &MoodleClient,
    course_id: CourseId,
    previous: &GradeTree,
) -> Result<(GradeTree, SyncStats)> {
    let usergrades = client.get_grade_items(course_id).await?;
    let quizzes = client.get_quizzes_by_courses(&[course_id]).await?;

    let mut stats = SyncStats::default();
    let mut tree = GradeTree {
        usergrades: Vec::new(),
        quizzes,
        attempts: AttemptIndex::new(),
    };

    for user in &usergrades {
        for item in &user.gradeitems {
            if !item.may_have_quiz_attempts() {
                continue;
            }
            let (Some(quiz_id), Some(submitted_at)) = (item.iteminstance(), item.submitted_at())
            else {
                continue;
            };

            let cached = previous.attempts_for(user.userid, quiz_id);

            let summaries = match cached {
                Some(cached) if cached.is_fresh_for(submitted_at) => {
                    stats.summaries_reused += 1;
                    cached.summaries.clone()
                }
                _ => {
                    tracing::debug!(
                        user_id = %user.userid,
                        quiz_id = %quiz_id,
                        submitted_at,
                        "Fetching quiz attempts"
                    );
                    stats.summaries_fetched += 1;
                    client.get_user_quiz_attempts(quiz_id, user.userid).await?
                }
            };

            let mut details = BTreeMap::new();
            for summary in &summaries {
                let Some(attempt_id) = summary.id() else {
                    continue;
                };
                let detail = match cached.and_then(|c| c.detail(attempt_id)) {
                    Some(detail) => {
                        stats.details_reused += 1;
                        detail.clone()
                    }
                    None => {
                        tracing::debug!(attempt_id = %attempt_id, "Fetching attempt review");
                        stats.details_fetched += 1;
                        client.get_quiz_attempt_review(attempt_id).await?
                    }
                };
                details.insert(attempt_id.to_string(), detail);
            }

            tree.set_attempts(user.userid, quiz_id, QuizAttempts { summaries, details });
        }
    }

    tree.usergrades = usergrades;
    Ok((tree, stats))
}

/// Synchronizes a course's grades against the tree stored under `container`/`key`
///
/// The stored tree (or an empty one if the key does not exist yet) is the
/// previous pass; the new tree replaces it.
///
/// # Errors
///
/// Returns an error if the stored tree cannot be read, synchronization
/// fails, or the new tree cannot be written. Nothing is written on failure.
pub async fn export_grades(
    client: &MoodleClient,
    store: &dyn BlobStore,
    course_id: CourseId,
    container: &str,
    key: &str,
) -> Result<GradeTree> {
    let previous = get_json_or(store, container, key, GradeTree::default()).await?;
    let tree = update_grades(client, course_id, &previous).await?;
    put_json(store, container, key, &tree).await?;
    tracing::info!(course_id = %course_id, container, key, "Grades exported");
    Ok(tree)
}
