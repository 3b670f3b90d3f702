/// Household-scoped resource client
///
/// `ResourceClient<R>` executes the uniform CRUD contract shared by every
/// resource family. It is stateless: it never caches a collection and never
/// patches one locally. Sequencing writes with refetches is the job of
/// [`MutationCoordinator`](crate::coordinator::MutationCoordinator).
///
/// # Error Mapping
///
/// - payload fails `Validate`, or no household: `Validation`, no request sent
/// - transport failure: `Network`
/// - non-2xx status: `Server`, carrying the body's `message` (or `error`)
///   field, a bare JSON string body, or a generic
///   "request failed with status N"
/// - 2xx body of the wrong shape: `MalformedResponse`
///
/// # Example
///
/// ```no_run
/// use flatchat_client::resource::ResourceClient;
/// use flatchat_client::transport::ReqwestTransport;
/// use flatchat_shared::models::Bill;
/// use reqwest::Url;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let transport = Arc::new(ReqwestTransport::new(None)?);
/// let bills: ResourceClient<Bill> =
///     ResourceClient::new(transport, Url::parse("http://localhost:3000/dev")?);
///
/// let created = bills
///     .create(&Bill::new("h1", "Rent", "1200", vec!["u1".into(), "u2".into()]))
///     .await?;
/// for bill in bills.list("h1").await? {
///     println!("{:?} {}", bill.bill_id, bill.title);
/// }
/// # let _ = created;
/// # Ok(())
/// # }
/// ```

use flatchat_shared::models::{
    Comment, HouseholdResource, Post, Reservation, ResourceFamily, ReviewAction,
};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde_json::{json, Value as JsonValue};
use std::marker::PhantomData;
use std::sync::Arc;
use validator::Validate;

use crate::error::{ResourceError, ResourceResult};
use crate::transport::{HttpRequest, HttpResponse, Transport};

/// CRUD client for one resource family
pub struct ResourceClient<R: HouseholdResource> {
    transport: Arc<dyn Transport>,
    base: Url,
    _family: PhantomData<fn() -> R>,
}

impl<R: HouseholdResource> Clone for ResourceClient<R> {
    fn clone(&self) -> Self {
        ResourceClient {
            transport: self.transport.clone(),
            base: self.base.clone(),
            _family: PhantomData,
        }
    }
}

impl<R: HouseholdResource> ResourceClient<R> {
    /// Creates a client for `R` rooted at `base` (the family's path is appended)
    pub fn new(transport: Arc<dyn Transport>, base: Url) -> Self {
        ResourceClient {
            transport,
            base,
            _family: PhantomData,
        }
    }

    pub fn family(&self) -> ResourceFamily {
        R::FAMILY
    }

    /// Lists every resource of the household
    ///
    /// Filtering is done by the server; the result is not re-filtered here.
    pub async fn list(&self, household_id: &str) -> ResourceResult<Vec<R>> {
        let household_id = require_household(household_id)?;
        let url = self.url(&[], &[("HouseholdID", household_id)])?;

        let response = self.execute(HttpRequest::get(url)).await?;
        let items = parse_collection::<R>(R::FAMILY, &response.body)?;

        tracing::debug!(
            family = %R::FAMILY,
            household_id = %household_id,
            count = items.len(),
            "Listed resources"
        );
        Ok(items)
    }

    /// Reads a single resource
    pub async fn get(&self, id: &str, household_id: &str) -> ResourceResult<R> {
        let household_id = require_household(household_id)?;
        let url = self.url(&[id], &[("HouseholdID", household_id)])?;

        let response = self.execute(HttpRequest::get(url)).await?;
        parse_body(&response.body)
    }

    /// Creates a resource; the returned copy carries the server-assigned id
    ///
    /// Servers answer a create with the full resource, with the resource
    /// nested under a key (`{"message", "task": {..}}`), or with just the new
    /// id (`{"message", "PostID"}`). In the last case the id is applied to a
    /// copy of `payload`. A success body without any id is malformed.
    pub async fn create(&self, payload: &R) -> ResourceResult<R> {
        payload.validate()?;
        require_household(payload.household_id())?;

        let url = self.url(&[], &[])?;
        let body = to_body(payload)?;
        let response = self
            .execute(HttpRequest::new(Method::POST, url).with_body(body))
            .await?;
        let created = created_resource(payload, parse_body(&response.body)?)?;

        tracing::info!(
            family = %R::FAMILY,
            household_id = %payload.household_id(),
            id = created.id().unwrap_or_default(),
            "Resource created"
        );
        Ok(created)
    }

    /// Replaces a resource wholesale
    ///
    /// `payload` must be the complete resource, not a diff.
    pub async fn update(&self, id: &str, payload: &R) -> ResourceResult<R> {
        payload.validate()?;
        let household_id = require_household(payload.household_id())?;

        let url = self.url(&[id], &[("HouseholdID", household_id)])?;
        let body = to_body(payload)?;
        let response = self
            .execute(HttpRequest::new(Method::PUT, url).with_body(body))
            .await?;

        tracing::info!(family = %R::FAMILY, id = %id, "Resource updated");
        parse_body(&response.body)
    }

    /// Deletes a resource
    ///
    /// `requesting_user_id` is sent so the server can verify ownership.
    pub async fn remove(
        &self,
        id: &str,
        household_id: &str,
        requesting_user_id: &str,
    ) -> ResourceResult<()> {
        let household_id = require_household(household_id)?;
        let url = self.url(
            &[id],
            &[("HouseholdID", household_id), ("UserID", requesting_user_id)],
        )?;

        self.execute(HttpRequest::delete(url)).await?;
        tracing::info!(family = %R::FAMILY, id = %id, "Resource removed");
        Ok(())
    }

    /// `<base>/<family path>/<segments..>?<query>`
    fn url(&self, segments: &[&str], query: &[(&str, &str)]) -> ResourceResult<Url> {
        let mut path = vec![R::FAMILY.path()];
        path.extend_from_slice(segments);
        self.endpoint(&path, query)
    }

    /// `<base>/<segments..>?<query>`, for routes outside the family path
    fn endpoint(&self, segments: &[&str], query: &[(&str, &str)]) -> ResourceResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ResourceError::Validation(format!("{} is not a valid base URL", self.base))
            })?
            .pop_if_empty()
            .extend(segments);

        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    async fn execute(&self, request: HttpRequest) -> ResourceResult<HttpResponse> {
        let method = request.method.clone();
        let response = self.transport.send(request).await.map_err(|e| {
            tracing::warn!(family = %R::FAMILY, method = %method, error = %e, "Request failed");
            ResourceError::from(e)
        })?;
        check_status(response)
    }
}

impl ResourceClient<Reservation> {
    /// Approves or rejects a reservation
    ///
    /// The server records the reviewer and computes the new status; run this
    /// through the coordinator so the collection is refetched.
    pub async fn review(
        &self,
        id: &str,
        household_id: &str,
        action: ReviewAction,
        user_id: &str,
    ) -> ResourceResult<Reservation> {
        let household_id = require_household(household_id)?;
        let url = self.url(&[id, "approve"], &[("HouseholdID", household_id)])?;
        let body = json!({
            "Action": action.to_string(),
            "UserID": user_id,
            "HouseholdID": household_id,
        });

        let response = self
            .execute(HttpRequest::new(Method::PATCH, url).with_body(body))
            .await?;

        tracing::info!(id = %id, action = %action, "Reservation reviewed");
        parse_body(&response.body)
    }
}

impl ResourceClient<Post> {
    /// Likes a post and returns its new like count
    pub async fn like(&self, post_id: &str) -> ResourceResult<u64> {
        let post_id = require_id("PostID", post_id)?;
        let url = self.endpoint(&["like-post"], &[])?;

        let response = self
            .execute(HttpRequest::new(Method::POST, url).with_body(json!({ "PostID": post_id })))
            .await?;
        let likes = parse_body::<JsonValue>(&response.body)?
            .get("UpdatedLikes")
            .and_then(JsonValue::as_u64)
            .ok_or_else(|| {
                ResourceError::MalformedResponse("like response has no UpdatedLikes".to_string())
            })?;

        tracing::info!(id = %post_id, likes, "Post liked");
        Ok(likes)
    }

    /// Lists the comments on a post
    pub async fn comments(&self, post_id: &str) -> ResourceResult<Vec<Comment>> {
        let post_id = require_id("PostID", post_id)?;
        let url = self.endpoint(&["get-comments", post_id], &[])?;

        let response = self.execute(HttpRequest::get(url)).await?;
        let value: JsonValue = parse_body(&response.body)?;
        match value.get("comments") {
            None | Some(JsonValue::Null) => Ok(Vec::new()),
            Some(items @ JsonValue::Array(_)) => serde_json::from_value(items.clone())
                .map_err(|e| ResourceError::MalformedResponse(e.to_string())),
            Some(_) => Err(ResourceError::MalformedResponse(
                "`comments` is not an array".to_string(),
            )),
        }
    }

    /// Adds a comment to a post; the returned copy carries the new `CommentID`
    pub async fn comment(
        &self,
        post_id: &str,
        user_id: &str,
        content: &str,
    ) -> ResourceResult<Comment> {
        let mut comment = Comment::new(post_id.trim(), user_id.trim(), content.trim());
        comment.validate()?;

        let url = self.endpoint(&["create-comment"], &[])?;
        let body = to_body(&comment)?;
        let response = self
            .execute(HttpRequest::new(Method::POST, url).with_body(body))
            .await?;
        let id = id_value(&parse_body(&response.body)?, "CommentID").ok_or_else(|| {
            ResourceError::MalformedResponse("comment response has no CommentID".to_string())
        })?;

        tracing::info!(post_id = %comment.post_id, id = %id, "Comment added");
        comment.comment_id = Some(id);
        Ok(comment)
    }
}

fn require_id<'a>(field: &str, id: &'a str) -> ResourceResult<&'a str> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(ResourceError::Validation(format!("{} is required.", field)));
    }
    Ok(trimmed)
}

fn require_household(household_id: &str) -> ResourceResult<&str> {
    require_id("HouseholdID", household_id)
}

fn to_body<T: serde::Serialize>(payload: &T) -> ResourceResult<JsonValue> {
    serde_json::to_value(payload).map_err(|e| ResourceError::Validation(e.to_string()))
}

/// Passes 2xx responses through and turns anything else into `Server`
pub(crate) fn check_status(response: HttpResponse) -> ResourceResult<HttpResponse> {
    if response.is_success() {
        return Ok(response);
    }

    let message = server_message(&response.body)
        .unwrap_or_else(|| format!("request failed with status {}", response.status));
    tracing::warn!(status = response.status, message = %message, "Server rejected request");

    Err(ResourceError::Server {
        status: response.status,
        message,
    })
}

/// `message` (or `error`) field of an error body, or the body itself if it
/// is a JSON string
fn server_message(body: &str) -> Option<String> {
    let value: JsonValue = serde_json::from_str(body).ok()?;
    let message = match value {
        JsonValue::String(text) => text,
        JsonValue::Object(mut map) => match map.remove("message").or_else(|| map.remove("error")) {
            Some(JsonValue::String(text)) => text,
            _ => return None,
        },
        _ => return None,
    };

    let message = message.trim().to_string();
    (!message.is_empty()).then_some(message)
}

/// Resolves a create response into the stored resource
fn created_resource<R: HouseholdResource>(payload: &R, body: JsonValue) -> ResourceResult<R> {
    let mut candidates = vec![&body];
    if let JsonValue::Object(map) = &body {
        candidates.extend(map.values().filter(|value| value.is_object()));
    }

    let full = candidates
        .iter()
        .filter_map(|candidate| serde_json::from_value::<R>((*candidate).clone()).ok())
        .find(|resource| resource.id().is_some_and(|id| !id.is_empty()));
    if let Some(resource) = full {
        return Ok(resource);
    }

    let id_field = R::FAMILY.id_field();
    let id = candidates
        .iter()
        .find_map(|candidate| id_value(candidate, id_field).or_else(|| id_value(candidate, "id")))
        .ok_or_else(|| {
            ResourceError::MalformedResponse(format!("create response has no {}", id_field))
        })?;

    let mut echoed = to_body(payload)?;
    echoed[id_field] = JsonValue::String(id);
    serde_json::from_value(echoed).map_err(|e| ResourceError::MalformedResponse(e.to_string()))
}

/// Non-empty string or numeric id stored under `field`
fn id_value(value: &JsonValue, field: &str) -> Option<String> {
    match value.get(field)? {
        JsonValue::String(id) if !id.trim().is_empty() => Some(id.clone()),
        JsonValue::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

/// Parses a 2xx body as `T`
pub(crate) fn parse_body<T: DeserializeOwned>(body: &str) -> ResourceResult<T> {
    serde_json::from_str(body).map_err(|e| ResourceError::MalformedResponse(e.to_string()))
}

/// Extracts the family's collection from a list response
///
/// An object without the collection key is an empty collection; anything
/// else that is not `{ <key>: [..] }` is malformed.
fn parse_collection<R: HouseholdResource>(
    family: ResourceFamily,
    body: &str,
) -> ResourceResult<Vec<R>> {
    let value: JsonValue = parse_body(body)?;
    let JsonValue::Object(mut map) = value else {
        return Err(ResourceError::MalformedResponse(format!(
            "expected an object with `{}`",
            family.collection_key()
        )));
    };

    match map.remove(family.collection_key()) {
        None | Some(JsonValue::Null) => Ok(Vec::new()),
        Some(items @ JsonValue::Array(_)) => serde_json::from_value(items)
            .map_err(|e| ResourceError::MalformedResponse(e.to_string())),
        Some(_) => Err(ResourceError::MalformedResponse(format!(
            "`{}` is not an array",
            family.collection_key()
        ))),
    }
}
