//! Integration tests for incremental grade synchronization

mod common;

use common::{Reply, ScriptedTransport};
use moodlecli::adapters::storage::{BlobStore, LocalBlobStore, MemoryBlobStore};
use moodlecli::core::grades::{export_grades, update_grades, update_grades_with_stats};
use moodlecli::domain::{CourseId, GradeTree};
use serde_json::{json, Value};
use std::sync::Arc;

const GRADE_ITEMS: &str = "gradereport_user_get_grade_items";
const QUIZZES: &str = "mod_quiz_get_quizzes_by_courses";
const ATTEMPTS: &str = "mod_quiz_get_user_attempts";
const REVIEW: &str = "mod_quiz_get_attempt_review";

/// One user (11) with one graded quiz (22) submitted at 33 and two attempts
fn grading_site() -> Arc<ScriptedTransport> {
    let transport = ScriptedTransport::new();
    transport
        .on(
            GRADE_ITEMS,
            json!({"usergrades": [
                {"userid": 11, "gradeitems": [{"iteminstance": 22, "gradedatesubmitted": 33}]}
            ]}),
        )
        .on(QUIZZES, json!({"quizzes": [{"name": "Quiz 1", "sumgrades": 10}]}))
        .on(
            ATTEMPTS,
            json!({"attempts": [
                {"id": 101, "attempt": 1, "gradednotificationsenttime": 22},
                {"id": 102, "attempt": 2, "gradednotificationsenttime": 33}
            ]}),
        )
        .on(REVIEW, json!({"attempt": {}, "questions": []}));
    transport
}

fn expected_tree() -> Value {
    json!({
        "usergrades": [
            {"userid": 11, "gradeitems": [{"iteminstance": 22, "gradedatesubmitted": 33}]}
        ],
        "quizzes": [{"name": "Quiz 1", "sumgrades": 10}],
        "attempts": {
            "11": {
                "22": {
                    "summaries": [
                        {"id": 101, "attempt": 1, "gradednotificationsenttime": 22},
                        {"id": 102, "attempt": 2, "gradednotificationsenttime": 33}
                    ],
                    "details": {
                        "101": {"attempt": {}, "questions": []},
                        "102": {"attempt": {}, "questions": []}
                    }
                }
            }
        }
    })
}

fn tree(value: Value) -> GradeTree {
    serde_json::from_value(value).unwrap()
}

#[tokio::test]
async fn test_empty_cache_fetches_everything_once() {
    let transport = grading_site();
    let client = transport.client();

    let result = update_grades(&client, CourseId::new(10), &GradeTree::default())
        .await
        .unwrap();

    assert_eq!(serde_json::to_value(&result).unwrap(), expected_tree());
    assert_eq!(transport.count(GRADE_ITEMS), 1);
    assert_eq!(transport.count(QUIZZES), 1);
    assert_eq!(transport.count(ATTEMPTS), 1);
    assert_eq!(transport.count(REVIEW), 2);

    assert_eq!(
        transport.calls_to(GRADE_ITEMS)[0].param("courseid"),
        Some("10")
    );
    assert_eq!(transport.calls_to(QUIZZES)[0].param("courseids[0]"), Some("10"));

    let attempts = &transport.calls_to(ATTEMPTS)[0];
    assert_eq!(attempts.param("userid"), Some("11"));
    assert_eq!(attempts.param("quizid"), Some("22"));
    assert_eq!(attempts.param("status"), Some("finished"));

    let mut reviewed: Vec<String> = transport
        .calls_to(REVIEW)
        .iter()
        .filter_map(|c| c.param("attemptid").map(str::to_string))
        .collect();
    reviewed.sort();
    assert_eq!(reviewed, vec!["101", "102"]);
}

#[tokio::test]
async fn test_fresh_cache_is_reused_without_attempt_calls() {
    let transport = grading_site();
    let client = transport.client();

    let (result, stats) =
        update_grades_with_stats(&client, CourseId::new(10), &tree(expected_tree()))
            .await
            .unwrap();

    assert_eq!(serde_json::to_value(&result).unwrap(), expected_tree());
    assert_eq!(transport.count(GRADE_ITEMS), 1);
    assert_eq!(transport.count(QUIZZES), 1);
    assert_eq!(transport.count(ATTEMPTS), 0);
    assert_eq!(transport.count(REVIEW), 0);
    assert_eq!(stats.summaries_reused, 1);
    assert_eq!(stats.details_reused, 2);
}

#[tokio::test]
async fn test_stale_cache_refetches_summaries_and_new_details_only() {
    let transport = grading_site();
    let client = transport.client();

    let previous = tree(json!({
        "usergrades": [
            {"userid": 11, "gradeitems": [{"iteminstance": 22, "gradedatesubmitted": 22}]}
        ],
        "quizzes": [{"name": "Quiz 1", "sumgrades": 10}],
        "attempts": {
            "11": {
                "22": {
                    "summaries": [
                        {"id": 101, "attempt": 1, "gradednotificationsenttime": 22}
                    ],
                    "details": {"101": {"attempt": {}, "questions": []}}
                }
            }
        }
    }));

    let (result, stats) = update_grades_with_stats(&client, CourseId::new(10), &previous)
        .await
        .unwrap();

    assert_eq!(serde_json::to_value(&result).unwrap(), expected_tree());
    assert_eq!(transport.count(ATTEMPTS), 1);
    assert_eq!(transport.count(REVIEW), 1);
    assert_eq!(transport.calls_to(REVIEW)[0].param("attemptid"), Some("102"));
    assert_eq!(stats.summaries_fetched, 1);
    assert_eq!(stats.details_fetched, 1);
    assert_eq!(stats.details_reused, 1);
}

#[tokio::test]
async fn test_only_stale_pair_is_refetched() {
    let transport = ScriptedTransport::new();
    transport
        .on(
            GRADE_ITEMS,
            json!({"usergrades": [
                {"userid": 11, "gradeitems": [{"iteminstance": 22, "gradedatesubmitted": 33}]},
                {"userid": 12, "gradeitems": [{"iteminstance": 22, "gradedatesubmitted": 50}]}
            ]}),
        )
        .on(QUIZZES, json!({"quizzes": []}))
        .on_fn(ATTEMPTS, |params| {
            assert_eq!(params.get("userid").map(String::as_str), Some("12"));
            Reply::Json(json!({"attempts": [
                {"id": 201, "gradednotificationsenttime": 20},
                {"id": 202, "gradednotificationsenttime": 50}
            ]}))
        })
        .on(REVIEW, json!({"attempt": {}, "questions": []}));
    let client = transport.client();

    let previous = tree(json!({
        "attempts": {
            "11": {"22": {
                "summaries": [{"id": 101, "gradednotificationsenttime": 33}],
                "details": {"101": {"cached": true}}
            }},
            "12": {"22": {
                "summaries": [{"id": 201, "gradednotificationsenttime": 20}],
                "details": {"201": {"cached": true}}
            }}
        }
    }));

    let result = update_grades(&client, CourseId::new(10), &previous)
        .await
        .unwrap();

    assert_eq!(transport.count(ATTEMPTS), 1);
    assert_eq!(transport.count(REVIEW), 1);
    assert_eq!(transport.calls_to(REVIEW)[0].param("attemptid"), Some("202"));

    let user_12 = &result.attempts["12"]["22"];
    assert_eq!(user_12.summaries.len(), 2);
    assert_eq!(user_12.details["201"], json!({"cached": true}));
    assert_eq!(user_12.details["202"], json!({"attempt": {}, "questions": []}));
    assert_eq!(result.attempts["11"]["22"].details["101"], json!({"cached": true}));
}

#[tokio::test]
async fn test_ungraded_and_non_quiz_items_are_skipped() {
    let transport = ScriptedTransport::new();
    transport
        .on(
            GRADE_ITEMS,
            json!({"usergrades": [
                {"userid": 11, "gradeitems": [
                    {"iteminstance": 22, "gradedatesubmitted": null},
                    {"iteminstance": 23, "itemmodule": "assign", "gradedatesubmitted": 40},
                    {"itemtype": "course", "gradedatesubmitted": 40}
                ]}
            ]}),
        )
        .on(QUIZZES, json!({"quizzes": []}));
    let client = transport.client();

    let result = update_grades(&client, CourseId::new(10), &GradeTree::default())
        .await
        .unwrap();

    assert!(result.attempts.is_empty());
    assert_eq!(result.usergrades[0].gradeitems.len(), 3);
    assert_eq!(transport.count(ATTEMPTS), 0);
    assert_eq!(transport.count(REVIEW), 0);
}

#[tokio::test]
async fn test_remote_failure_aborts_sync() {
    let transport = grading_site();
    transport.once(ATTEMPTS, Reply::Timeout);
    let client = transport.client();

    let err = update_grades(&client, CourseId::new(10), &GradeTree::default())
        .await
        .unwrap_err();

    assert!(err.moodle_error().is_some_and(|e| e.is_transport()));
    assert_eq!(transport.count(REVIEW), 0);
}

#[tokio::test]
async fn test_export_grades_writes_tree_and_reuses_it() {
    let transport = grading_site();
    let client = transport.client();
    let store = MemoryBlobStore::new();

    export_grades(&client, &store, CourseId::new(21), "test-bucket", "/grades/course1.json")
        .await
        .unwrap();

    let stored: Value =
        serde_json::from_slice(&store.get("test-bucket", "/grades/course1.json").await.unwrap())
            .unwrap();
    assert_eq!(stored, expected_tree());
    assert_eq!(transport.count(REVIEW), 2);

    // The stored tree is current, so a second export makes no attempt calls
    export_grades(&client, &store, CourseId::new(21), "test-bucket", "/grades/course1.json")
        .await
        .unwrap();
    assert_eq!(transport.count(ATTEMPTS), 1);
    assert_eq!(transport.count(REVIEW), 2);
}

#[tokio::test]
async fn test_export_grades_to_local_store() {
    let transport = grading_site();
    let client = transport.client();
    let dir = tempfile::tempdir().unwrap();
    let store = LocalBlobStore::new(dir.path());

    export_grades(&client, &store, CourseId::new(21), "exports", "grades/21.json")
        .await
        .unwrap();

    let path = dir.path().join("exports").join("grades").join("21.json");
    let stored: Value = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(stored, expected_tree());
}

#[tokio::test]
async fn test_export_grades_writes_nothing_on_failure() {
    let transport = grading_site();
    transport.once(REVIEW, Reply::Refused);
    let client = transport.client();
    let store = MemoryBlobStore::new();

    assert!(export_grades(&client, &store, CourseId::new(21), "exports", "grades/21.json")
        .await
        .is_err());
    assert!(store.get("exports", "grades/21.json").await.is_err());
}
