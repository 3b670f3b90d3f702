//! # Flatchat CLI
//!
//! Command-line front end over the household client: stores a session
//! issued by the identity provider, resolves the household, and lists or
//! removes household resources.
//!
//! ## Usage
//!
//! ```bash
//! flatchat session import --user-id u1 --access-token <token>
//! flatchat whoami
//! flatchat list bills
//! flatchat remove tasks t1
//! flatchat like p1
//! flatchat comment p1 "Still available?"
//! ```

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use flatchat_client::config::ClientConfig;
use flatchat_client::coordinator::{Mutation, MutationCoordinator};
use flatchat_client::household::HouseholdDirectory;
use flatchat_client::identity::{IdentityResolver, ResolvedIdentity};
use flatchat_client::resource::ResourceClient;
use flatchat_client::transport::{ReqwestTransport, Transport};
use flatchat_shared::models::{
    Bill, HouseholdResource, Notice, Post, Reservation, ResourceFamily, SessionPatch,
    ShoppingList, Task,
};
use flatchat_shared::session::SessionStore;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "flatchat", version, about = "Household client for Flatchat")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Manage the stored session
    #[command(subcommand)]
    Session(SessionCommand),

    /// Show the resolved user, household and display name
    Whoami,

    /// List one resource family of the current household
    List {
        /// bills, tasks, reservations, shopping-lists, notices or posts
        family: String,
    },

    /// List every resource family of the current household
    Dashboard,

    /// List the members of the current household
    Members,

    /// Delete a resource and print the refreshed collection size
    Remove {
        family: String,
        id: String,
    },

    /// Like a post on the feed
    Like { post_id: String },

    /// List the comments on a post
    Comments { post_id: String },

    /// Comment on a post
    Comment { post_id: String, text: String },
}

#[derive(Subcommand)]
enum SessionCommand {
    /// Store tokens issued by the identity provider
    Import(ImportArgs),

    /// Show the stored session without tokens
    Show,

    /// Sign out
    Clear,
}

#[derive(Args)]
struct ImportArgs {
    #[arg(long)]
    user_id: String,

    #[arg(long)]
    access_token: String,

    #[arg(long)]
    id_token: Option<String>,

    #[arg(long)]
    refresh_token: Option<String>,

    #[arg(long)]
    username: Option<String>,
}

/// Everything a command needs, built once from the configuration
struct App {
    config: ClientConfig,
    store: Arc<SessionStore>,
    transport: Arc<dyn Transport>,
}

impl App {
    fn new(config: ClientConfig) -> anyhow::Result<Self> {
        let store = Arc::new(SessionStore::open(&config.state_dir));
        let transport = Arc::new(
            ReqwestTransport::new(config.request_timeout())
                .context("Failed to build HTTP client")?,
        );
        Ok(App {
            config,
            store,
            transport,
        })
    }

    fn resolver(&self) -> anyhow::Result<IdentityResolver> {
        Ok(IdentityResolver::new(
            self.store.clone(),
            self.transport.clone(),
            self.config.read_user_endpoint()?,
        ))
    }

    fn directory(&self) -> anyhow::Result<HouseholdDirectory> {
        Ok(HouseholdDirectory::new(
            self.store.clone(),
            self.transport.clone(),
            self.config.household_base()?,
        ))
    }

    fn client<R: HouseholdResource>(&self) -> anyhow::Result<ResourceClient<R>> {
        Ok(ResourceClient::new(
            self.transport.clone(),
            self.config.resource_base(R::FAMILY)?,
        ))
    }

    async fn household(&self) -> anyhow::Result<String> {
        Ok(self.resolver()?.require_household().await?)
    }

    async fn list_json<R: HouseholdResource>(
        &self,
        household_id: &str,
    ) -> anyhow::Result<Vec<JsonValue>> {
        let items = self.client::<R>()?.list(household_id).await?;
        items
            .iter()
            .map(|item| serde_json::to_value(item).map_err(Into::into))
            .collect()
    }

    async fn list_family(
        &self,
        family: ResourceFamily,
        household_id: &str,
    ) -> anyhow::Result<Vec<JsonValue>> {
        match family {
            ResourceFamily::Bill => self.list_json::<Bill>(household_id).await,
            ResourceFamily::Task => self.list_json::<Task>(household_id).await,
            ResourceFamily::Reservation => self.list_json::<Reservation>(household_id).await,
            ResourceFamily::ShoppingList => self.list_json::<ShoppingList>(household_id).await,
            ResourceFamily::Notice => self.list_json::<Notice>(household_id).await,
            ResourceFamily::Post => self.list_json::<Post>(household_id).await,
        }
    }

    async fn remove<R: HouseholdResource>(
        &self,
        identity: &ResolvedIdentity,
        id: &str,
    ) -> anyhow::Result<usize> {
        let coordinator =
            MutationCoordinator::new(self.client::<R>()?, identity.household_id.as_str());
        coordinator
            .mutate(Mutation::Remove {
                id: id.to_string(),
                requesting_user_id: identity.user_id.clone(),
            })
            .await?
            .into_synced()
            .context("Removed, but the list could not be refreshed")?;

        Ok(coordinator.snapshot().data.len())
    }

    async fn remove_family(
        &self,
        family: ResourceFamily,
        identity: &ResolvedIdentity,
        id: &str,
    ) -> anyhow::Result<usize> {
        match family {
            ResourceFamily::Bill => self.remove::<Bill>(identity, id).await,
            ResourceFamily::Task => self.remove::<Task>(identity, id).await,
            ResourceFamily::Reservation => self.remove::<Reservation>(identity, id).await,
            ResourceFamily::ShoppingList => self.remove::<ShoppingList>(identity, id).await,
            ResourceFamily::Notice => self.remove::<Notice>(identity, id).await,
            ResourceFamily::Post => self.remove::<Post>(identity, id).await,
        }
    }
}

fn parse_family(raw: &str) -> anyhow::Result<ResourceFamily> {
    ResourceFamily::parse(raw).with_context(|| format!("Unknown resource family: {}", raw))
}

fn print_json(value: &JsonValue) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run_session(app: &App, command: SessionCommand) -> anyhow::Result<()> {
    match command {
        SessionCommand::Import(args) => {
            let mut patch = SessionPatch::login(args.user_id, args.access_token);
            if let Some(token) = args.id_token {
                patch = patch.with_id_token(token);
            }
            if let Some(token) = args.refresh_token {
                patch = patch.with_refresh_token(token);
            }
            if let Some(username) = args.username {
                patch = patch.with_username(username);
            }
            app.store.set(patch);
            tracing::info!("Session stored");
        }
        SessionCommand::Show => match app.store.get() {
            Some(context) => {
                let durable = app.store.durable_household();
                print_json(&serde_json::json!({
                    "userID": context.user_id,
                    "username": context.username,
                    "householdID": context.household_id,
                    "Name": context.display_name,
                    "durableHouseholdID": durable.household_id,
                    "durableHouseholdName": durable.household_name,
                }))?;
            }
            None => println!("Not signed in"),
        },
        SessionCommand::Clear => {
            app.store.clear();
            tracing::info!("Session cleared");
        }
    }
    Ok(())
}

async fn run(app: App, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Session(command) => run_session(&app, command)?,
        Command::Whoami => {
            let identity = app.resolver()?.resolve_context().await?;
            let directory = app.directory()?;
            let household_name = match directory
                .info(&identity.household_id, &identity.user_id)
                .await
            {
                Ok(info) => info.household_name,
                Err(e) => {
                    tracing::warn!(error = %e, "Household info unavailable, using cached name");
                    directory.cached_name()
                }
            };
            print_json(&serde_json::json!({
                "userID": identity.user_id,
                "householdID": identity.household_id,
                "householdName": household_name,
                "Name": identity.display_name,
            }))?;
        }
        Command::List { family } => {
            let family = parse_family(&family)?;
            let household_id = app.household().await?;
            let items = app.list_family(family, &household_id).await?;
            print_json(&JsonValue::Array(items))?;
        }
        Command::Dashboard => {
            let household_id = app.household().await?;
            let (bills, tasks, reservations, shopping_lists, notices, posts) = futures::try_join!(
                app.list_json::<Bill>(&household_id),
                app.list_json::<Task>(&household_id),
                app.list_json::<Reservation>(&household_id),
                app.list_json::<ShoppingList>(&household_id),
                app.list_json::<Notice>(&household_id),
                app.list_json::<Post>(&household_id),
            )?;
            let mut dashboard = serde_json::Map::new();
            for (family, items) in [
                (ResourceFamily::Bill, bills),
                (ResourceFamily::Task, tasks),
                (ResourceFamily::Reservation, reservations),
                (ResourceFamily::ShoppingList, shopping_lists),
                (ResourceFamily::Notice, notices),
                (ResourceFamily::Post, posts),
            ] {
                dashboard.insert(family.collection_key().to_string(), JsonValue::Array(items));
            }
            print_json(&JsonValue::Object(dashboard))?;
        }
        Command::Members => {
            let household_id = app.household().await?;
            let members = app.directory()?.members(&household_id).await?;
            print_json(&serde_json::to_value(members)?)?;
        }
        Command::Remove { family, id } => {
            let family = parse_family(&family)?;
            let identity = app.resolver()?.resolve_context().await?;
            let remaining = app.remove_family(family, &identity, &id).await?;
            println!("Deleted {} {}; {} remaining", family, id, remaining);
        }
        Command::Like { post_id } => {
            let household_id = app.household().await?;
            let coordinator = MutationCoordinator::new(app.client::<Post>()?, household_id);
            let likes = coordinator
                .mutate_with(coordinator.client().like(&post_id))
                .await?
                .into_synced()
                .context("Liked, but the feed could not be refreshed")?;
            println!("{} now has {} likes", post_id, likes);
        }
        Command::Comments { post_id } => {
            let comments = app.client::<Post>()?.comments(&post_id).await?;
            print_json(&serde_json::to_value(comments)?)?;
        }
        Command::Comment { post_id, text } => {
            let identity = app.resolver()?.resolve_context().await?;
            let coordinator =
                MutationCoordinator::new(app.client::<Post>()?, identity.household_id.as_str());
            let comment = coordinator
                .mutate_with(coordinator.client().comment(&post_id, &identity.user_id, &text))
                .await?
                .into_synced()
                .context("Commented, but the feed could not be refreshed")?;
            print_json(&serde_json::to_value(comment)?)?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flatchat_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = ClientConfig::from_env().context("Failed to load configuration")?;
    tracing::debug!(api_base_url = %config.api_base_url, "Configuration loaded");

    let app = App::new(config)?;
    if app.store.is_degraded() {
        tracing::warn!("Session storage unavailable, changes will not persist");
    }

    run(app, cli.command).await
}
