//! Shared fixtures for integration tests
//!
//! [`ScriptedTransport`] stands in for the Moodle server: responses are
//! scripted per web-service function and every call is recorded so tests
//! can assert on call counts, order and parameters.

#![allow(dead_code)]

use async_trait::async_trait;
use moodlecli::adapters::moodle::{MoodleClient, Transport};
use moodlecli::config::secret_string;
use moodlecli::domain::MoodleError;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const TEST_MOODLE_URL: &str = "http://test-things";
pub const TEST_MOODLE_TOKEN: &str = "e4586db9345084f15abc7326b84dde21";

/// One recorded request
#[derive(Debug, Clone)]
pub struct Call {
    pub method: &'static str,
    pub function: String,
    /// Operation parameters, without the fixed ones
    pub params: BTreeMap<String, String>,
}

impl Call {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

/// What the fake server does for a request
#[derive(Debug, Clone)]
pub enum Reply {
    Json(Value),
    Timeout,
    Refused,
}

type Responder = Arc<dyn Fn(&BTreeMap<String, String>) -> Reply + Send + Sync>;

/// In-process [`Transport`] answering from a script
#[derive(Default)]
pub struct ScriptedTransport {
    queued: Mutex<HashMap<String, VecDeque<Reply>>>,
    responders: Mutex<HashMap<String, Responder>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Answers every call to `function` with `value`
    pub fn on(&self, function: &str, value: Value) -> &Self {
        self.on_fn(function, move |_| Reply::Json(value.clone()))
    }

    /// Answers calls to `function` from their parameters
    pub fn on_fn<F>(&self, function: &str, responder: F) -> &Self
    where
        F: Fn(&BTreeMap<String, String>) -> Reply + Send + Sync + 'static,
    {
        self.responders
            .lock()
            .unwrap()
            .insert(function.to_string(), Arc::new(responder));
        self
    }

    /// Answers the next call to `function` with `reply`, ahead of any responder
    pub fn once(&self, function: &str, reply: Reply) -> &Self {
        self.queued
            .lock()
            .unwrap()
            .entry(function.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    /// Builds a gateway talking to this transport
    pub fn client(self: &Arc<Self>) -> MoodleClient {
        let transport: Arc<dyn Transport> = self.clone();
        MoodleClient::new(
            transport,
            TEST_MOODLE_URL,
            secret_string(TEST_MOODLE_TOKEN.to_string()),
        )
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, function: &str) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| c.function == function)
            .collect()
    }

    pub fn count(&self, function: &str) -> usize {
        self.calls_to(function).len()
    }

    /// Functions called, in order
    pub fn functions(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.function).collect()
    }

    fn respond(&self, method: &'static str, params: &[(String, String)]) -> Result<Value, MoodleError> {
        let mut all: BTreeMap<String, String> = params.iter().cloned().collect();
        assert_eq!(all.remove("wstoken").as_deref(), Some(TEST_MOODLE_TOKEN));
        assert_eq!(all.remove("moodlewsrestformat").as_deref(), Some("json"));
        let function = all
            .remove("wsfunction")
            .expect("every call names its web-service function");

        self.calls.lock().unwrap().push(Call {
            method,
            function: function.clone(),
            params: all.clone(),
        });

        let queued = self
            .queued
            .lock()
            .unwrap()
            .get_mut(&function)
            .and_then(VecDeque::pop_front);
        let reply = match queued {
            Some(reply) => reply,
            None => {
                let responder = self
                    .responders
                    .lock()
                    .unwrap()
                    .get(&function)
                    .cloned()
                    .unwrap_or_else(|| panic!("no scripted response for {function}"));
                responder(&all)
            }
        };

        match reply {
            Reply::Json(value) => Ok(value),
            Reply::Timeout => Err(MoodleError::Timeout(format!("{function} timed out"))),
            Reply::Refused => Err(MoodleError::ConnectionFailed("connection refused".into())),
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(
        &self,
        url: &str,
        params: &[(String, String)],
        _timeout: Duration,
    ) -> Result<Value, MoodleError> {
        assert_eq!(url, format!("{TEST_MOODLE_URL}/webservice/rest/server.php"));
        self.respond("GET", params)
    }

    async fn post(
        &self,
        url: &str,
        params: &[(String, String)],
        _timeout: Duration,
    ) -> Result<Value, MoodleError> {
        assert_eq!(url, format!("{TEST_MOODLE_URL}/webservice/rest/server.php"));
        self.respond("POST", params)
    }
}

/// A remote application error payload
pub fn exception(name: &str) -> Value {
    json!({
        "exception": name,
        "errorcode": "invalidparameter",
        "message": "Invalid parameter value detected"
    })
}

/// Scripts a site where provisioning succeeds end to end
///
/// Roles resolve to id 2, every user already exists with id 2, duplication
/// creates course 3 and the student self enrolment method has id 2.
pub fn provisioning_site(transport: &ScriptedTransport) {
    transport
        .on("local_raisecli_get_role_by_shortname", json!({"id": 2, "shortname": "student"}))
        .on("core_user_get_users", json!({"users": [{"id": 2}]}))
        .on("core_course_duplicate_course", json!({"id": 3, "shortname": "ALG3"}))
        .on("enrol_manual_enrol_users", Value::Null)
        .on("local_raisecli_get_self_enrolment_methods", json!([{"id": 2}]))
        .on("local_raisecli_enable_self_enrolment_method", json!({"id": 2}))
        .on("local_raisecli_set_self_enrolment_method_key", json!({"id": 3}))
        .on("core_user_create_users", json!([{"id": 5, "username": "new"}]));
}
