use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use tracing_subscriber::EnvFilter;
use travelmaps::config::{self, ClientConfig, ConfigError, HttpTimeouts};
use travelmaps::local::{Alerts, BadgeTracker, Memory, PlaceChange, SavedPlace, SavedPlaces};
use travelmaps::models::{CategoryDraft, CategoryPatch, PinDraft, ProfileUpdate};
use travelmaps::services::{categories, pins, share, users};
use travelmaps::storage::{FileStore, StorageError};
use travelmaps::validation::{AuthMode, CredentialsForm};
use travelmaps::{ApiClient, ClientError, SessionManager, TokenStore};

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("no saved place with id `{0}`")]
    PlaceNotFound(String),
    #[error("saved places were not written")]
    PlacesNotSaved,
    #[error("not logged in")]
    NotLoggedIn,
}

#[derive(Parser, Debug)]
#[command(name = "travelmaps", about = "TravelMaps pins, categories and sharing from the terminal")]
struct Cli {
    /// Server origin; `/api/v1` is appended.
    #[arg(long, env = "TRAVELMAPS_API_URL", default_value = config::DEFAULT_API_URL)]
    api_url: String,

    /// Where tokens and saved places are kept.
    #[arg(long, env = "TRAVELMAPS_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[arg(long, env = "TRAVELMAPS_REQUEST_TIMEOUT_SECS", default_value_t = config::DEFAULT_REQUEST_TIMEOUT_SECS)]
    timeout_secs: u64,

    #[arg(long, env = "TRAVELMAPS_CONNECT_TIMEOUT_SECS", default_value_t = config::DEFAULT_CONNECT_TIMEOUT_SECS)]
    connect_timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "TRAVELMAPS_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Register {
        #[arg(long)]
        email: String,
        #[arg(long, env = "TRAVELMAPS_PASSWORD", hide_env_values = true)]
        password: String,
        /// Defaults to `--password`.
        #[arg(long)]
        confirm_password: Option<String>,
        #[arg(long, default_value = "")]
        name: String,
    },
    Logout,
    Whoami,
    Pins(PinsCommand),
    Categories(CategoriesCommand),
    Share(ShareCommand),
    Users(UsersCommand),
    Places(PlacesCommand),
    Badge(BadgeCommand),
}

#[derive(Args, Debug)]
struct PinsCommand {
    #[command(subcommand)]
    command: PinsSubcommand,
}

#[derive(Args, Debug)]
struct PinFields {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    lat: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    lng: Option<f64>,
    #[arg(long)]
    address: Option<String>,
    #[arg(long)]
    notes: Option<String>,
    #[arg(long)]
    image_url: Option<String>,
    #[arg(long)]
    category_id: Option<String>,
    #[arg(long)]
    public: Option<bool>,
}

impl PinFields {
    fn into_draft(self) -> PinDraft {
        PinDraft {
            name: self.name,
            description: self.description,
            lat: self.lat,
            lng: self.lng,
            address: self.address,
            notes: self.notes,
            image_url: self.image_url,
            category_id: self.category_id,
            is_public: self.public,
            ..PinDraft::default()
        }
    }
}

#[derive(Subcommand, Debug)]
enum PinsSubcommand {
    List,
    Public,
    Shared,
    Create {
        #[command(flatten)]
        fields: PinFields,
    },
    Update {
        id: String,
        #[command(flatten)]
        fields: PinFields,
    },
    Delete {
        id: String,
    },
}

#[derive(Args, Debug)]
struct CategoriesCommand {
    #[command(subcommand)]
    command: CategoriesSubcommand,
}

#[derive(Subcommand, Debug)]
enum CategoriesSubcommand {
    List,
    Public,
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        icon: Option<String>,
        #[arg(long, default_value_t = false)]
        public: bool,
    },
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        icon: Option<String>,
        #[arg(long)]
        public: Option<bool>,
    },
    Delete {
        id: String,
    },
}

#[derive(Args, Debug)]
struct ShareCommand {
    #[command(subcommand)]
    command: ShareSubcommand,
}

#[derive(Subcommand, Debug)]
enum ShareSubcommand {
    Pin { pin_id: String, user_id: String },
    UnsharePin { pin_id: String, user_id: String },
    PinShares { pin_id: String },
    Category { category_id: String, user_id: String },
    UnshareCategory { category_id: String, user_id: String },
    CategoryShares { category_id: String },
    WithMe,
}

#[derive(Args, Debug)]
struct UsersCommand {
    #[command(subcommand)]
    command: UsersSubcommand,
}

#[derive(Subcommand, Debug)]
enum UsersSubcommand {
    Search {
        query: String,
    },
    List {
        #[arg(long)]
        limit: Option<u32>,
    },
    Get {
        id: String,
    },
    UpdateMe {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
}

#[derive(Args, Debug)]
struct PlacesCommand {
    #[command(subcommand)]
    command: PlacesSubcommand,
}

#[derive(Subcommand, Debug)]
enum PlacesSubcommand {
    List,
    Add {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        formatted: Option<String>,
    },
    Remove {
        id: String,
    },
    Memory {
        place_id: String,
        #[arg(long)]
        note: Option<String>,
        /// Image as a data URL.
        #[arg(long)]
        image: Option<String>,
    },
}

#[derive(Args, Debug)]
struct BadgeCommand {
    #[command(subcommand)]
    command: BadgeSubcommand,
}

#[derive(Subcommand, Debug)]
enum BadgeSubcommand {
    Check,
    Clear,
}

/// Alerts printed to stderr.
struct StderrAlerts;

impl Alerts for StderrAlerts {
    fn alert(&self, message: &str) {
        eprintln!("{message}");
    }
}

struct CliContext {
    store: Arc<FileStore>,
    client: ApiClient,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = build_config(&cli)?;
    tracing::debug!(api = %config.api_base_url, data_dir = %config.data_dir.display(), "configured");
    let store = Arc::new(FileStore::open(&config.data_dir)?);
    let client = ApiClient::from_config(&config, TokenStore::new(store.clone()))?;
    let ctx = CliContext { store, client };

    match cli.command {
        Command::Login { email, password } => {
            let form = CredentialsForm { email, password, ..CredentialsForm::default() };
            run_credentials(&ctx, &form).await
        }
        Command::Register { email, password, confirm_password, name } => {
            let form = CredentialsForm {
                mode: AuthMode::Register,
                name,
                email,
                confirm_password: confirm_password.unwrap_or_else(|| password.clone()),
                password,
            };
            run_credentials(&ctx, &form).await
        }
        Command::Logout => {
            SessionManager::new(ctx.client.clone()).logout();
            print_json(&json!({ "loggedOut": true }))
        }
        Command::Whoami => run_whoami(&ctx).await,
        Command::Pins(pins) => run_pins(&ctx, pins).await,
        Command::Categories(categories) => run_categories(&ctx, categories).await,
        Command::Share(share) => run_share(&ctx, share).await,
        Command::Users(users) => run_users(&ctx, users).await,
        Command::Places(places) => run_places(&ctx, places),
        Command::Badge(badge) => run_badge(&ctx, badge),
    }
}

fn build_config(cli: &Cli) -> Result<ClientConfig, CliError> {
    let data_dir = match &cli.data_dir {
        Some(dir) => dir.clone(),
        None => config::default_data_dir()?,
    };
    let timeouts = HttpTimeouts { request_secs: cli.timeout_secs, connect_secs: cli.connect_timeout_secs };
    Ok(ClientConfig::new(&cli.api_url, data_dir)?.with_timeouts(timeouts))
}

async fn run_credentials(ctx: &CliContext, form: &CredentialsForm) -> Result<(), CliError> {
    let session = SessionManager::new(ctx.client.clone());
    let auth = session.submit(form).await?;
    print_json(&auth.user)
}

async fn run_whoami(ctx: &CliContext) -> Result<(), CliError> {
    let session = SessionManager::new(ctx.client.clone());
    session.initialize().await;
    let user = session.state().user.ok_or(CliError::NotLoggedIn)?;
    print_json(&user)
}

async fn run_pins(ctx: &CliContext, cmd: PinsCommand) -> Result<(), CliError> {
    let client = &ctx.client;
    match cmd.command {
        PinsSubcommand::List => print_json(&pins::list(client).await?),
        PinsSubcommand::Public => print_json(&pins::list_public(client).await?),
        PinsSubcommand::Shared => print_json(&pins::shared_items(client).await?),
        PinsSubcommand::Create { fields } => print_json(&pins::create(client, &fields.into_draft()).await?),
        PinsSubcommand::Update { id, fields } => {
            print_json(&pins::update(client, &id, &fields.into_draft()).await?)
        }
        PinsSubcommand::Delete { id } => {
            pins::delete(client, &id).await?;
            print_json(&json!({ "deleted": id }))
        }
    }
}

async fn run_categories(ctx: &CliContext, cmd: CategoriesCommand) -> Result<(), CliError> {
    let client = &ctx.client;
    match cmd.command {
        CategoriesSubcommand::List => print_json(&categories::list(client).await?),
        CategoriesSubcommand::Public => print_json(&categories::list_public(client).await?),
        CategoriesSubcommand::Create { name, color, icon, public } => {
            let draft = CategoryDraft { name, color, icon, is_public: public };
            print_json(&categories::create(client, &draft).await?)
        }
        CategoriesSubcommand::Update { id, name, color, icon, public } => {
            let patch = CategoryPatch { name, color, icon, is_public: public };
            print_json(&categories::update(client, &id, &patch).await?)
        }
        CategoriesSubcommand::Delete { id } => {
            categories::delete(client, &id).await?;
            print_json(&json!({ "deleted": id }))
        }
    }
}

async fn run_share(ctx: &CliContext, cmd: ShareCommand) -> Result<(), CliError> {
    let client = &ctx.client;
    match cmd.command {
        ShareSubcommand::Pin { pin_id, user_id } => print_json(&share::share_pin(client, &pin_id, &user_id).await?),
        ShareSubcommand::UnsharePin { pin_id, user_id } => {
            print_json(&share::unshare_pin(client, &pin_id, &user_id).await?)
        }
        ShareSubcommand::PinShares { pin_id } => print_json(&share::pin_shares(client, &pin_id).await?),
        ShareSubcommand::Category { category_id, user_id } => {
            print_json(&share::share_category(client, &category_id, &user_id).await?)
        }
        ShareSubcommand::UnshareCategory { category_id, user_id } => {
            print_json(&share::unshare_category(client, &category_id, &user_id).await?)
        }
        ShareSubcommand::CategoryShares { category_id } => {
            print_json(&share::category_shares(client, &category_id).await?)
        }
        ShareSubcommand::WithMe => print_json(&share::shared_with_me(client).await?),
    }
}

async fn run_users(ctx: &CliContext, cmd: UsersCommand) -> Result<(), CliError> {
    let client = &ctx.client;
    match cmd.command {
        UsersSubcommand::Search { query } => print_json(&users::search(client, &query).await?),
        UsersSubcommand::List { limit } => print_json(&users::list(client, limit).await?),
        UsersSubcommand::Get { id } => print_json(&users::get(client, &id).await?),
        UsersSubcommand::UpdateMe { name, email } => {
            let update = ProfileUpdate { name, email, ..ProfileUpdate::default() };
            print_json(&users::update_profile(client, &update).await?)
        }
    }
}

fn run_places(ctx: &CliContext, cmd: PlacesCommand) -> Result<(), CliError> {
    let mut saved = SavedPlaces::load(ctx.store.clone(), Arc::new(StderrAlerts));
    match cmd.command {
        PlacesSubcommand::List => {
            let summaries: Vec<_> = saved
                .places()
                .iter()
                .map(|p| json!({ "id": p.id, "title": p.title(), "subtitle": p.subtitle() }))
                .collect();
            print_json(&summaries)?;
        }
        PlacesSubcommand::Add { lat, lon, name, formatted } => {
            let place = SavedPlace { name, formatted, ..SavedPlace::new(lat, lon) };
            if !saved.add(place.clone()) {
                return Err(CliError::PlacesNotSaved);
            }
            print_json(&place)?;
        }
        PlacesSubcommand::Remove { id } => place_change(saved.remove(&id), id)?,
        PlacesSubcommand::Memory { place_id, note, image } => {
            place_change(saved.add_memory(&place_id, Memory::new(note, image)), place_id)?;
        }
    }
    Ok(())
}

fn place_change(change: PlaceChange, id: String) -> Result<(), CliError> {
    match change {
        PlaceChange::Saved => Ok(()),
        PlaceChange::Unsaved => Err(CliError::PlacesNotSaved),
        PlaceChange::NoSuchPlace => Err(CliError::PlaceNotFound(id)),
    }
}

fn run_badge(ctx: &CliContext, cmd: BadgeCommand) -> Result<(), CliError> {
    let tracker = BadgeTracker::new(ctx.store.clone(), None);
    match cmd.command {
        BadgeSubcommand::Check => {
            tracker.check_and_set();
            println!("{}", tracker.unseen_updates());
        }
        BadgeSubcommand::Clear => tracker.clear(),
    }
    Ok(())
}

fn print_json(value: &impl Serialize) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
