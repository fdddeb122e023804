//! Grade tree: the cached/exported artifact of grade synchronization
//!
//! The tree combines course grade items, quiz metadata and per-user,
//! per-quiz attempt data:
//!
//! ```json
//! {
//!   "usergrades": [{"userid": 11, "gradeitems": [{"iteminstance": 22, "gradedatesubmitted": 33}]}],
//!   "quizzes": [{"name": "Quiz 1", "sumgrades": 10}],
//!   "attempts": {
//!     "11": {"22": {"summaries": [{"id": 101, "gradednotificationsenttime": 33}],
//!                   "details": {"101": {"attempt": {}, "questions": []}}}}
//!   }
//! }
//! ```
//!
//! Items, summaries and details keep every field the web service returned so
//! a cached tree written back to storage loses nothing.

use super::ids::{AttemptId, QuizId, UserId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Attempt data keyed by user id, then quiz id (both as strings)
pub type AttemptIndex = BTreeMap<String, BTreeMap<String, QuizAttempts>>;

/// The full grade tree for one course
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GradeTree {
    #[serde(default)]
    pub usergrades: Vec<UserGrade>,
    #[serde(default)]
    pub quizzes: Vec<Value>,
    #[serde(default)]
    pub attempts: AttemptIndex,
}

impl GradeTree {
    /// Cached attempt data for a (user, quiz) pair
    pub fn attempts_for(&self, user: UserId, quiz: QuizId) -> Option<&QuizAttempts> {
        self.attempts
            .get(&user.to_string())
            .and_then(|per_quiz| per_quiz.get(&quiz.to_string()))
    }

    /// Stores attempt data for a (user, quiz) pair, replacing any previous entry
    pub fn set_attempts(&mut self, user: UserId, quiz: QuizId, attempts: QuizAttempts) {
        self.attempts
            .entry(user.to_string())
            .or_default()
            .insert(quiz.to_string(), attempts);
    }

    /// Number of attempt details held in the tree
    pub fn detail_count(&self) -> usize {
        self.attempts
            .values()
            .flat_map(|per_quiz| per_quiz.values())
            .map(|a| a.details.len())
            .sum()
    }
}

/// Grade items of one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserGrade {
    pub userid: UserId,
    #[serde(default)]
    pub gradeitems: Vec<GradeItem>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One grade item, kept verbatim
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GradeItem(pub Map<String, Value>);

impl GradeItem {
    /// Instance id of the activity; for quiz items, the quiz id
    pub fn iteminstance(&self) -> Option<QuizId> {
        self.0.get("iteminstance").and_then(lenient_i64).map(QuizId::new)
    }

    /// Submission timestamp, `None` for ungraded items
    pub fn submitted_at(&self) -> Option<i64> {
        self.0.get("gradedatesubmitted").and_then(lenient_i64)
    }

    /// Activity module name (`quiz`, `assign`, ...) when reported
    pub fn module(&self) -> Option<&str> {
        self.0.get("itemmodule").and_then(Value::as_str)
    }

    /// Whether the item may carry quiz attempts
    ///
    /// Items that report a module other than `quiz` never do; items that do
    /// not report a module are treated as quiz items.
    pub fn may_have_quiz_attempts(&self) -> bool {
        self.module().map_or(true, |m| m == "quiz")
    }
}

/// Summary of one quiz attempt, kept verbatim
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttemptSummary(pub Map<String, Value>);

impl AttemptSummary {
    pub fn id(&self) -> Option<AttemptId> {
        self.0.get("id").and_then(lenient_i64).map(AttemptId::new)
    }

    /// When the graded notification for this attempt was sent
    pub fn graded_notification_sent_at(&self) -> Option<i64> {
        self.0.get("gradednotificationsenttime").and_then(lenient_i64)
    }
}

/// Attempt summaries and details for one (user, quiz) pair
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuizAttempts {
    #[serde(default)]
    pub summaries: Vec<AttemptSummary>,
    /// Attempt review payloads keyed by attempt id
    #[serde(default)]
    pub details: BTreeMap<String, Value>,
}

impl QuizAttempts {
    /// Latest graded notification time among the summaries
    pub fn latest_notification(&self) -> Option<i64> {
        self.summaries
            .iter()
            .filter_map(AttemptSummary::graded_notification_sent_at)
            .max()
    }

    /// Whether these summaries already reflect a submission made at `submitted_at`
    pub fn is_fresh_for(&self, submitted_at: i64) -> bool {
        self.latest_notification()
            .is_some_and(|latest| latest >= submitted_at)
    }

    pub fn detail(&self, attempt: AttemptId) -> Option<&Value> {
        self.details.get(&attempt.to_string())
    }
}

/// Reads an integer that may be encoded as a JSON number or numeric string
fn lenient_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
