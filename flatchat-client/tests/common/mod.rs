#![allow(dead_code)]

/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - An in-memory session store signed in as `u1` / `t1`
/// - `FakeBackend`, a stateful stand-in for the household API that keeps
///   collections per household, assigns ids and serves the user lookup
///   plus the post like and comment routes
/// - Request counting and one-shot failure injection

use async_trait::async_trait;
use flatchat_client::coordinator::MutationCoordinator;
use flatchat_client::identity::IdentityResolver;
use flatchat_client::resource::ResourceClient;
use flatchat_client::transport::{
    HttpRequest, HttpResponse, Transport, TransportError, TransportResult,
};
use flatchat_shared::models::{HouseholdResource, ResourceFamily, SessionPatch};
use flatchat_shared::session::SessionStore;
use reqwest::{Method, Url};
use serde_json::{json, Value as JsonValue};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

pub const API_BASE: &str = "http://fake.test/dev";
pub const USER_ID: &str = "u1";
pub const ACCESS_TOKEN: &str = "t1";

enum Injected {
    Response(u16, JsonValue),
    Error(TransportError),
}

#[derive(Default)]
struct BackendState {
    users: HashMap<String, JsonValue>,
    collections: HashMap<(ResourceFamily, String), Vec<JsonValue>>,
    comments: Vec<JsonValue>,
    next_id: u64,
    id_only_creates: bool,
    injected: Vec<(Method, String, VecDeque<Injected>)>,
    requests: Vec<(Method, String)>,
}

/// In-process household API
#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<BackendState>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BackendState> {
        self.state.lock().unwrap()
    }

    /// Registers the record returned by `read-user` for `user_id`
    pub fn add_user(&self, user_id: &str, record: JsonValue) {
        self.lock().users.insert(user_id.to_string(), record);
    }

    /// Stores `item` as if another client had created it
    pub fn seed(&self, family: ResourceFamily, household_id: &str, item: JsonValue) {
        self.lock()
            .collections
            .entry((family, household_id.to_string()))
            .or_default()
            .push(item);
    }

    /// Server-side contents of one collection
    pub fn stored(&self, family: ResourceFamily, household_id: &str) -> Vec<JsonValue> {
        self.lock()
            .collections
            .get(&(family, household_id.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    /// Makes creates answer `{"message", <id field>}` instead of echoing the item
    pub fn answer_creates_with_id_only(&self) {
        self.lock().id_only_creates = true;
    }

    /// Answers the next matching request with `status` and `body`
    pub fn fail_next(&self, method: Method, path_suffix: &str, status: u16, body: JsonValue) {
        self.inject(method, path_suffix, Injected::Response(status, body));
    }

    /// Drops the next matching request at the network level
    pub fn disconnect_next(&self, method: Method, path_suffix: &str) {
        self.inject(
            method,
            path_suffix,
            Injected::Error(TransportError::Connection("connection reset".to_string())),
        );
    }

    fn inject(&self, method: Method, path_suffix: &str, reply: Injected) {
        let mut state = self.lock();
        match state
            .injected
            .iter_mut()
            .find(|(m, suffix, _)| *m == method && suffix == path_suffix)
        {
            Some((_, _, queue)) => queue.push_back(reply),
            None => state
                .injected
                .push((method, path_suffix.to_string(), VecDeque::from([reply]))),
        }
    }

    /// Number of requests whose path ends with `path_suffix`
    pub fn count(&self, method: Method, path_suffix: &str) -> usize {
        self.lock()
            .requests
            .iter()
            .filter(|(m, path)| *m == method && path.ends_with(path_suffix))
            .count()
    }

    pub fn total_requests(&self) -> usize {
        self.lock().requests.len()
    }

    fn handle(&self, request: &HttpRequest) -> HttpResponse {
        let segments: Vec<String> = request
            .url
            .path_segments()
            .map(|s| s.map(str::to_string).collect())
            .unwrap_or_default();

        match segments.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
            [.., "read-user"] => return self.read_user(request),
            [.., "like-post"] => return self.like_post(request),
            [.., "create-comment"] => return self.create_comment(request),
            [.., "get-comments", post_id] => {
                let comments: Vec<JsonValue> = self
                    .lock()
                    .comments
                    .iter()
                    .filter(|comment| comment["PostID"] == *post_id)
                    .cloned()
                    .collect();
                return HttpResponse::json(200, &json!({ "comments": comments }));
            }
            _ => {}
        }

        let Some(position) = segments
            .iter()
            .position(|s| ResourceFamily::ALL.iter().any(|f| f.path() == s.as_str()))
        else {
            return HttpResponse::json(404, &json!({"message": "no route"}));
        };
        let Some(family) = ResourceFamily::parse(&segments[position]) else {
            return HttpResponse::json(404, &json!({"message": "no route"}));
        };
        let id = segments.get(position + 1).cloned();
        let household = request.query_param("HouseholdID").unwrap_or_default();

        match (request.method.clone(), id) {
            (Method::GET, None) => {
                let mut body = serde_json::Map::new();
                body.insert(
                    family.collection_key().to_string(),
                    JsonValue::Array(self.stored(family, &household)),
                );
                HttpResponse::json(200, &JsonValue::Object(body))
            }
            (Method::GET, Some(id)) => match self.find(family, &household, &id) {
                Some(item) => HttpResponse::json(200, &item),
                None => HttpResponse::json(404, &json!({"message": "not found"})),
            },
            (Method::POST, None) => self.create(family, request.body.clone()),
            (Method::PUT, Some(id)) => self.replace(family, &household, &id, request.body.clone()),
            (Method::DELETE, Some(id)) => self.delete(family, &household, &id),
            _ => HttpResponse::json(405, &json!({"message": "method not allowed"})),
        }
    }

    fn read_user(&self, request: &HttpRequest) -> HttpResponse {
        if request.bearer.as_deref() != Some(ACCESS_TOKEN) {
            return HttpResponse::json(401, &json!({"message": "Unauthorized"}));
        }
        let user_id = request
            .body
            .as_ref()
            .and_then(|body| body["UserID"].as_str())
            .unwrap_or_default()
            .to_string();
        match self.lock().users.get(&user_id) {
            Some(record) => HttpResponse::json(200, record),
            None => HttpResponse::json(404, &json!({"message": "User not found"})),
        }
    }

    fn find(&self, family: ResourceFamily, household: &str, id: &str) -> Option<JsonValue> {
        self.stored(family, household)
            .into_iter()
            .find(|item| item[family.id_field()] == id)
    }

    fn create(&self, family: ResourceFamily, body: Option<JsonValue>) -> HttpResponse {
        let Some(mut item) = body.filter(JsonValue::is_object) else {
            return HttpResponse::json(400, &json!({"message": "Invalid request body"}));
        };
        let household = item["HouseholdID"].as_str().unwrap_or_default().to_string();
        if household.is_empty() {
            return HttpResponse::json(400, &json!({"message": "HouseholdID is required"}));
        }

        let mut state = self.lock();
        state.next_id += 1;
        let id = format!("{}{}", &family.path()[..1], state.next_id);
        item[family.id_field()] = json!(id);
        state
            .collections
            .entry((family, household))
            .or_default()
            .push(item.clone());
        if state.id_only_creates {
            let mut reply = serde_json::Map::new();
            reply.insert("message".to_string(), json!("Created"));
            reply.insert(family.id_field().to_string(), json!(id));
            return HttpResponse::json(201, &JsonValue::Object(reply));
        }
        HttpResponse::json(201, &item)
    }

    fn like_post(&self, request: &HttpRequest) -> HttpResponse {
        let post_id = request
            .body
            .as_ref()
            .and_then(|body| body["PostID"].as_str())
            .unwrap_or_default()
            .to_string();

        let mut state = self.lock();
        let post = state
            .collections
            .iter_mut()
            .filter(|((family, _), _)| *family == ResourceFamily::Post)
            .flat_map(|(_, items)| items.iter_mut())
            .find(|item| item["PostID"] == post_id.as_str());
        match post {
            Some(post) => {
                let likes = post["Likes"].as_u64().unwrap_or(0) + 1;
                post["Likes"] = json!(likes);
                HttpResponse::json(
                    200,
                    &json!({"message": "Post liked successfully", "UpdatedLikes": likes}),
                )
            }
            None => HttpResponse::json(404, &json!({"message": "Post not found"})),
        }
    }

    fn create_comment(&self, request: &HttpRequest) -> HttpResponse {
        let Some(mut comment) = request.body.clone().filter(JsonValue::is_object) else {
            return HttpResponse::json(400, &json!({"message": "Invalid request body"}));
        };
        let mut state = self.lock();
        state.next_id += 1;
        let id = format!("c{}", state.next_id);
        comment["CommentID"] = json!(id);
        state.comments.push(comment);
        HttpResponse::json(
            201,
            &json!({"message": "Comment added successfully", "CommentID": id}),
        )
    }

    fn replace(
        &self,
        family: ResourceFamily,
        household: &str,
        id: &str,
        body: Option<JsonValue>,
    ) -> HttpResponse {
        let Some(mut item) = body.filter(JsonValue::is_object) else {
            return HttpResponse::json(400, &json!({"message": "Invalid request body"}));
        };
        item[family.id_field()] = json!(id);

        let mut state = self.lock();
        let slot = state
            .collections
            .get_mut(&(family, household.to_string()))
            .and_then(|items| items.iter_mut().find(|i| i[family.id_field()] == id));
        match slot {
            Some(existing) => {
                *existing = item.clone();
                HttpResponse::json(200, &item)
            }
            None => HttpResponse::json(404, &json!({"message": "not found"})),
        }
    }

    fn delete(&self, family: ResourceFamily, household: &str, id: &str) -> HttpResponse {
        let mut state = self.lock();
        let Some(items) = state.collections.get_mut(&(family, household.to_string())) else {
            return HttpResponse::json(404, &json!({"message": "not found"}));
        };
        let before = items.len();
        items.retain(|item| item[family.id_field()] != id);
        if items.len() == before {
            return HttpResponse::json(404, &json!({"message": "not found"}));
        }
        HttpResponse::new(200, "")
    }

    fn take_injected(&self, request: &HttpRequest) -> Option<Injected> {
        let mut state = self.lock();
        let path = request.url.path().to_string();
        state
            .injected
            .iter_mut()
            .find(|(m, suffix, queue)| {
                *m == request.method && path.ends_with(suffix.as_str()) && !queue.is_empty()
            })
            .and_then(|(_, _, queue)| queue.pop_front())
    }
}

#[async_trait]
impl Transport for FakeBackend {
    fn name(&self) -> &str {
        "fake"
    }

    async fn send(&self, request: HttpRequest) -> TransportResult<HttpResponse> {
        self.lock()
            .requests
            .push((request.method.clone(), request.url.path().to_string()));

        match self.take_injected(&request) {
            Some(Injected::Response(status, body)) => Ok(HttpResponse::json(status, &body)),
            Some(Injected::Error(e)) => Err(e),
            None => Ok(self.handle(&request)),
        }
    }
}

/// Test context containing a signed-in session and the fake API
pub struct TestContext {
    pub store: Arc<SessionStore>,
    pub backend: Arc<FakeBackend>,
}

impl TestContext {
    /// Signed in as `u1` with access token `t1`, no household cached
    pub fn new() -> Self {
        let store = Arc::new(SessionStore::in_memory());
        store.set(SessionPatch::login(USER_ID, ACCESS_TOKEN));
        TestContext {
            store,
            backend: Arc::new(FakeBackend::new()),
        }
    }

    /// No session at all
    pub fn signed_out() -> Self {
        TestContext {
            store: Arc::new(SessionStore::in_memory()),
            backend: Arc::new(FakeBackend::new()),
        }
    }

    pub fn base_url() -> Url {
        Url::parse(API_BASE).unwrap()
    }

    pub fn resolver(&self) -> IdentityResolver {
        let read_user = Url::parse(&format!("{}/read-user", API_BASE)).unwrap();
        IdentityResolver::new(self.store.clone(), self.backend.clone(), read_user)
    }

    pub fn client<R: HouseholdResource>(&self) -> ResourceClient<R> {
        ResourceClient::new(self.backend.clone(), Self::base_url())
    }

    pub fn coordinator<R: HouseholdResource>(&self, household_id: &str) -> MutationCoordinator<R> {
        MutationCoordinator::new(self.client(), household_id)
    }
}
