/// Write-then-refetch coordination
///
/// `MutationCoordinator<R>` owns the page-visible `{loading, error, data}`
/// state of one resource family in one household.
///
/// # Policy
///
/// ```text
/// mutate(write)
///   ├─> loading = true
///   ├─> await write
///   │     └─> failed: error = message, data untouched, no refetch
///   ├─> await list(household)
///   │     ├─> ok: data replaced wholesale, error cleared
///   │     └─> failed: error = message, data untouched,
///   │               outcome carries `refetch_error`
///   └─> loading = false (once nothing else is in flight)
/// ```
///
/// Local state is never patched from a write result. Concurrent mutations are
/// not serialized: each refetch starts after its own write, and whichever
/// refetch completes last determines `data`. No timeout is applied; a hung
/// request keeps `loading` true until it resolves or the future is dropped.
///
/// # Example
///
/// ```no_run
/// use flatchat_client::coordinator::{MutationCoordinator, Mutation};
/// use flatchat_client::resource::ResourceClient;
/// use flatchat_client::transport::ReqwestTransport;
/// use flatchat_shared::models::Task;
/// use reqwest::Url;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let transport = Arc::new(ReqwestTransport::new(None)?);
/// let tasks: ResourceClient<Task> =
///     ResourceClient::new(transport, Url::parse("http://localhost:3000/dev")?);
/// let coordinator = MutationCoordinator::new(tasks, "h1");
///
/// let mut updates = coordinator.subscribe();
/// coordinator.refresh().await?;
/// coordinator
///     .mutate(Mutation::Create(Task::new("h1", "Bins")))
///     .await?
///     .into_synced()?;
///
/// println!("{} tasks", updates.borrow_and_update().data.len());
/// # Ok(())
/// # }
/// ```

use flatchat_shared::models::HouseholdResource;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::watch;

use crate::error::{ResourceError, ResourceResult};
use crate::resource::ResourceClient;

/// State a page renders
#[derive(Debug, Clone, PartialEq)]
pub struct SyncState<R> {
    /// True while any operation of the coordinator is in flight
    pub loading: bool,

    /// Message of the most recent failure, cleared by a successful refetch
    pub error: Option<String>,

    /// Last collection returned by the server
    pub data: Vec<R>,
}

impl<R> Default for SyncState<R> {
    fn default() -> Self {
        SyncState {
            loading: false,
            error: None,
            data: Vec::new(),
        }
    }
}

/// A uniform write
#[derive(Debug, Clone)]
pub enum Mutation<R> {
    /// Create; an unscoped payload is bound to the coordinator's household
    Create(R),

    /// Full replacement of `id`
    Update { id: String, payload: R },

    /// Delete of `id` on behalf of `requesting_user_id`
    Remove {
        id: String,
        requesting_user_id: String,
    },
}

/// Result of a write that went through
///
/// The write itself succeeded; `refetch_error` is set when the collection
/// could not be reloaded afterwards, so `data` may not show the write yet.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationOutcome<T> {
    /// Value returned by the write
    pub value: T,

    /// Failure of the follow-up refetch, if any
    pub refetch_error: Option<ResourceError>,
}

impl<T> MutationOutcome<T> {
    /// True when the refetch after the write succeeded
    pub fn is_synced(&self) -> bool {
        self.refetch_error.is_none()
    }

    /// The write's value, or the refetch error if the page data is stale
    pub fn into_synced(self) -> ResourceResult<T> {
        match self.refetch_error {
            None => Ok(self.value),
            Some(e) => Err(e),
        }
    }

    fn map<U>(self, f: impl FnOnce(T) -> U) -> MutationOutcome<U> {
        MutationOutcome {
            value: f(self.value),
            refetch_error: self.refetch_error,
        }
    }
}

/// Sequences writes with collection refetches for one household
pub struct MutationCoordinator<R: HouseholdResource> {
    client: ResourceClient<R>,
    household_id: String,
    state: watch::Sender<SyncState<R>>,
    in_flight: AtomicUsize,
}

/// Marks one operation as in flight for as long as it lives
struct InFlight<'a, R: HouseholdResource> {
    coordinator: &'a MutationCoordinator<R>,
}

impl<'a, R: HouseholdResource> InFlight<'a, R> {
    fn start(coordinator: &'a MutationCoordinator<R>) -> Self {
        coordinator.in_flight.fetch_add(1, Ordering::SeqCst);
        coordinator.state.send_modify(|state| state.loading = true);
        InFlight { coordinator }
    }
}

impl<R: HouseholdResource> Drop for InFlight<'_, R> {
    fn drop(&mut self) {
        let remaining = self.coordinator.in_flight.fetch_sub(1, Ordering::SeqCst) - 1;
        if remaining == 0 {
            self.coordinator
                .state
                .send_modify(|state| state.loading = false);
        }
    }
}

impl<R: HouseholdResource> MutationCoordinator<R> {
    /// Creates a coordinator with empty state; call [`refresh`](Self::refresh)
    /// to load the collection
    pub fn new(client: ResourceClient<R>, household_id: impl Into<String>) -> Self {
        let (state, _) = watch::channel(SyncState::default());
        MutationCoordinator {
            client,
            household_id: household_id.into(),
            state,
            in_flight: AtomicUsize::new(0),
        }
    }

    pub fn household_id(&self) -> &str {
        &self.household_id
    }

    /// Underlying client, for family-specific writes passed to
    /// [`mutate_with`](Self::mutate_with)
    pub fn client(&self) -> &ResourceClient<R> {
        &self.client
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> SyncState<R> {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<SyncState<R>> {
        self.state.subscribe()
    }

    /// Reloads the collection
    pub async fn refresh(&self) -> ResourceResult<()> {
        let _in_flight = InFlight::start(self);
        self.refetch().await
    }

    /// Runs a uniform write, then refetches
    ///
    /// The outcome's value is the server's copy for creates and updates.
    pub async fn mutate(
        &self,
        mutation: Mutation<R>,
    ) -> ResourceResult<MutationOutcome<Option<R>>> {
        match mutation {
            Mutation::Create(mut payload) => {
                if payload.household_id().trim().is_empty() {
                    payload.set_household_id(&self.household_id);
                }
                self.mutate_with(async {
                    self.check_scope(&payload)?;
                    self.client.create(&payload).await
                })
                .await
                .map(|outcome| outcome.map(Some))
            }
            Mutation::Update { id, payload } => self
                .mutate_with(async {
                    self.check_scope(&payload)?;
                    self.client.update(&id, &payload).await
                })
                .await
                .map(|outcome| outcome.map(Some)),
            Mutation::Remove {
                id,
                requesting_user_id,
            } => self
                .mutate_with(
                    self.client
                        .remove(&id, &self.household_id, &requesting_user_id),
                )
                .await
                .map(|outcome| outcome.map(|_| None)),
        }
    }

    /// Runs an arbitrary write, then refetches if it succeeded
    ///
    /// A failed write sets `error`, leaves `data` untouched and issues no
    /// refetch. If the write succeeds but the refetch fails, the write's
    /// value is returned together with the refetch failure, which is also
    /// reported through `error`.
    pub async fn mutate_with<T, F>(&self, write: F) -> ResourceResult<MutationOutcome<T>>
    where
        F: Future<Output = ResourceResult<T>>,
    {
        let _in_flight = InFlight::start(self);

        let value = match write.await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(
                    family = %self.client.family(),
                    household_id = %self.household_id,
                    error = %e,
                    "Write failed, keeping current data"
                );
                self.record_error(&e);
                return Err(e);
            }
        };

        let refetch_error = self.refetch().await.err();
        Ok(MutationOutcome {
            value,
            refetch_error,
        })
    }

    async fn refetch(&self) -> ResourceResult<()> {
        match self.client.list(&self.household_id).await {
            Ok(items) => {
                tracing::debug!(
                    family = %self.client.family(),
                    count = items.len(),
                    "Collection refetched"
                );
                self.state.send_modify(|state| {
                    state.data = items;
                    state.error = None;
                });
                Ok(())
            }
            Err(e) => {
                tracing::warn!(
                    family = %self.client.family(),
                    household_id = %self.household_id,
                    error = %e,
                    "Refetch failed"
                );
                self.record_error(&e);
                Err(e)
            }
        }
    }

    fn record_error(&self, error: &ResourceError) {
        let message = error.user_message();
        self.state.send_modify(|state| state.error = Some(message));
    }

    fn check_scope(&self, payload: &R) -> ResourceResult<()> {
        if payload.household_id().trim() != self.household_id.trim() {
            return Err(ResourceError::Validation(format!(
                "{} belongs to another household.",
                R::FAMILY
            )));
        }
        Ok(())
    }
}
