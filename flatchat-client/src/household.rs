/// Household directory
///
/// Read-only calls against the household service:
///
/// ```text
/// POST <household>/join-household   {HouseholdID, UserID} -> {HouseholdName, JoinCode, Admins}
/// GET  <household>/household-users?HouseholdID=<id>      -> {users: [..]}
/// ```
///
/// A successful `info` call records the household name in the durable tier
/// so the next session can show it before any request completes.

use flatchat_shared::models::{HouseholdInfo, HouseholdMember};
use flatchat_shared::session::SessionStore;
use reqwest::{Method, Url};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::error::{ResourceError, ResourceResult};
use crate::resource::{check_status, parse_body};
use crate::transport::{HttpRequest, Transport};

#[derive(Debug, Deserialize)]
struct MembersResponse {
    #[serde(default)]
    users: Vec<HouseholdMember>,
}

/// Client for household metadata and membership
pub struct HouseholdDirectory {
    store: Arc<SessionStore>,
    transport: Arc<dyn Transport>,
    base: Url,
}

impl HouseholdDirectory {
    pub fn new(store: Arc<SessionStore>, transport: Arc<dyn Transport>, base: Url) -> Self {
        HouseholdDirectory {
            store,
            transport,
            base,
        }
    }

    /// Name, join code and admins of the household
    pub async fn info(&self, household_id: &str, user_id: &str) -> ResourceResult<HouseholdInfo> {
        let url = self.endpoint("join-household", &[])?;
        let request = self.authorize(HttpRequest::new(Method::POST, url)).with_body(json!({
            "HouseholdID": household_id,
            "UserID": user_id,
        }));

        let response = check_status(self.transport.send(request).await?)?;
        let info: HouseholdInfo = parse_body(&response.body)?;

        if let Some(name) = info.household_name.as_deref().filter(|n| !n.trim().is_empty()) {
            self.store.remember_household_name(name);
        }
        tracing::debug!(household_id = %household_id, "Household info fetched");
        Ok(info)
    }

    /// Members of the household
    pub async fn members(&self, household_id: &str) -> ResourceResult<Vec<HouseholdMember>> {
        let url = self.endpoint("household-users", &[("HouseholdID", household_id)])?;
        let request = self.authorize(HttpRequest::get(url));

        let response = check_status(self.transport.send(request).await?)?;
        let members: MembersResponse = parse_body(&response.body)?;
        Ok(members.users)
    }

    /// Household name remembered from an earlier session
    pub fn cached_name(&self) -> Option<String> {
        self.store.durable_household().household_name
    }

    fn authorize(&self, request: HttpRequest) -> HttpRequest {
        match self.store.get() {
            Some(context) => request.with_bearer(context.bearer()),
            None => request,
        }
    }

    fn endpoint(&self, path: &str, query: &[(&str, &str)]) -> ResourceResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ResourceError::Validation(format!("{} is not a valid base URL", self.base))
            })?
            .pop_if_empty()
            .push(path);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }
}
