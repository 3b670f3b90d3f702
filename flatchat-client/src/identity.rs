/// Identity resolution
///
/// `IdentityResolver` turns the stored session into the `{userID,
/// householdID}` pair every resource call is scoped by, plus an optional
/// display name.
///
/// # Resolution Protocol
///
/// ```text
/// resolve_household()
///   ├─> no userID / accessToken      -> Err(Unauthenticated), no request
///   ├─> householdID cached           -> Ok(Some(id)), no request
///   └─> POST <read-user> {UserID}    (bearer: accessToken), exactly once
///         ├─> 2xx with HouseholdID    -> cache it, Ok(Some(id))
///         ├─> 2xx without HouseholdID -> Ok(None), nothing cached
///         └─> non-2xx / network error -> Ok(None), nothing cached
/// ```
///
/// A failed lookup is never cached, so the next call retries. Concurrent
/// calls that both miss the cache each perform their own lookup.
///
/// Display names use the same protocol, with a [`NameFreshness`] predicate
/// deciding whether the cached name counts as resolved. A name lookup that
/// also returns a household fills the household cache if it is empty.
///
/// # Example
///
/// ```no_run
/// use flatchat_client::identity::IdentityResolver;
/// use flatchat_client::transport::ReqwestTransport;
/// use flatchat_shared::session::SessionStore;
/// use reqwest::Url;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = Arc::new(SessionStore::in_memory());
/// let transport = Arc::new(ReqwestTransport::new(None)?);
/// let resolver = IdentityResolver::new(
///     store,
///     transport,
///     Url::parse("http://localhost:3000/dev/read-user")?,
/// );
///
/// let household = resolver.require_household().await?;
/// println!("Household: {}", household);
/// # Ok(())
/// # }
/// ```

use flatchat_shared::auth::{EmailOrOpaqueId, NameFreshness};
use flatchat_shared::models::{SessionContext, SessionPatch, UserRecord};
use flatchat_shared::session::SessionStore;
use reqwest::{Method, Url};
use serde_json::json;
use std::sync::Arc;

use crate::error::{IdentityError, IdentityResult};
use crate::transport::{HttpRequest, Transport};

/// Identity every household page is scoped by
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub user_id: String,
    pub household_id: String,
    pub display_name: Option<String>,
}

/// Resolves and caches the household and display name of the session
pub struct IdentityResolver {
    store: Arc<SessionStore>,
    transport: Arc<dyn Transport>,
    read_user_url: Url,
    freshness: Box<dyn NameFreshness>,
}

impl IdentityResolver {
    /// Creates a resolver with the default display-name predicate
    pub fn new(
        store: Arc<SessionStore>,
        transport: Arc<dyn Transport>,
        read_user_url: Url,
    ) -> Self {
        IdentityResolver {
            store,
            transport,
            read_user_url,
            freshness: Box::new(EmailOrOpaqueId),
        }
    }

    /// Replaces the display-name predicate
    pub fn with_freshness<P>(mut self, predicate: P) -> Self
    where
        P: NameFreshness + 'static,
    {
        self.freshness = Box::new(predicate);
        self
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    fn session(&self) -> IdentityResult<SessionContext> {
        self.store.get().ok_or(IdentityError::Unauthenticated)
    }

    /// Household of the current session, looking it up if not cached
    ///
    /// `Ok(None)` means the lookup failed or the user has no household; the
    /// next call will try again.
    pub async fn resolve_household(&self) -> IdentityResult<Option<String>> {
        let context = self.session()?;

        if let Some(household_id) = context.household_id {
            tracing::debug!(household_id = %household_id, "Household cache hit");
            return Ok(Some(household_id));
        }

        tracing::debug!(user_id = %context.user_id, "Household cache miss, looking up user");
        let Some(record) = self.lookup(&context).await else {
            return Ok(None);
        };

        match record.household() {
            Some(household_id) => {
                self.cache_household(household_id);
                Ok(Some(household_id.to_string()))
            }
            None => {
                tracing::info!(user_id = %context.user_id, "User has not joined a household");
                Ok(None)
            }
        }
    }

    /// Like [`resolve_household`](Self::resolve_household), but an absent
    /// household is an error
    pub async fn require_household(&self) -> IdentityResult<String> {
        self.resolve_household()
            .await?
            .ok_or(IdentityError::HouseholdUnresolved)
    }

    /// Display name of the current session, looking it up if the cached one
    /// is missing or not a real name
    ///
    /// Returns `Ok(None)` when the lookup fails or returns no name.
    pub async fn resolve_display_name(&self) -> IdentityResult<Option<String>> {
        let context = self.session()?;

        if !self.freshness.needs_lookup(context.display_name.as_deref()) {
            tracing::debug!("Display name cache hit");
            return Ok(context.display_name);
        }

        tracing::debug!(user_id = %context.user_id, "Display name unresolved, looking up user");
        let Some(record) = self.lookup(&context).await else {
            return Ok(None);
        };

        let name = record.display_name().map(str::to_string);
        if let Some(name) = &name {
            self.store.set(SessionPatch::display_name(name.as_str()));
        }

        if context.household_id.is_none() {
            if let Some(household_id) = record.household() {
                self.cache_household(household_id);
            }
        }

        Ok(name)
    }

    /// User, household and display name in one call
    ///
    /// The display name is resolved first so that its lookup can fill an
    /// empty household cache.
    pub async fn resolve_context(&self) -> IdentityResult<ResolvedIdentity> {
        let user_id = self.session()?.user_id;
        let display_name = self.resolve_display_name().await?;
        let household_id = self.require_household().await?;

        Ok(ResolvedIdentity {
            user_id,
            household_id,
            display_name,
        })
    }

    fn cache_household(&self, household_id: &str) {
        self.store.set(SessionPatch::household(household_id));
        self.store.remember_household_id(household_id);
        tracing::info!(household_id = %household_id, "Household resolved");
    }

    /// One identity lookup; every failure is logged and reported as `None`
    async fn lookup(&self, context: &SessionContext) -> Option<UserRecord> {
        let request = HttpRequest::new(Method::POST, self.read_user_url.clone())
            .with_bearer(context.bearer())
            .with_body(json!({ "UserID": context.user_id }));

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "User lookup failed");
                return None;
            }
        };

        if !response.is_success() {
            tracing::warn!(status = response.status, "User lookup rejected");
            return None;
        }

        match serde_json::from_str::<UserRecord>(&response.body) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(error = %e, "User lookup returned an unexpected body");
                None
            }
        }
    }
}
