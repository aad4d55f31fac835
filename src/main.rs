use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use hop4deals::auth::{AuthError, Credentials, DenyReason, LoginError, NavEntry, Verdict, evaluate};
use hop4deals::config::ConfigError;
use hop4deals::net::{Access, ApiError, Resource};
use hop4deals::router::{Outcome, Page};
use hop4deals::{App, Config};
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("login failed: {0}")]
    Login(#[from] LoginError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("not logged in; run `hop4deals login` first")]
    NotLoggedIn,
    #[error("cannot access {resource}: {reason}")]
    Denied { resource: Resource, reason: DenyReason },
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "hop4deals", about = "Hop4Deals back-office session and API CLI")]
struct Cli {
    #[arg(long, env = "HOP4DEALS_API_URL")]
    api_url: Option<String>,

    #[arg(long, env = "HOP4DEALS_STORE", help = "Session file path")]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Exchange credentials for a stored session.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "HOP4DEALS_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Logout,
    Whoami,
    /// Print the back-office sidebar for the current user.
    Menu,
    /// Print the storefront navbar links.
    Navbar,
    /// Resolve a location the way the back-office router would.
    Visit { path: String },
    /// Re-read the signed-in user from the server.
    Refresh,
    Api(ApiCommand),
}

#[derive(Args, Debug)]
struct ApiCommand {
    resource: Resource,

    #[command(subcommand)]
    command: ApiSubcommand,
}

#[derive(Subcommand, Debug)]
enum ApiSubcommand {
    List {
        #[arg(long = "query", value_parser = parse_query_pair, help = "Filter as key=value; repeatable")]
        query: Vec<(String, String)>,
    },
    Get {
        id: String,
    },
    Create {
        #[arg(long)]
        data: String,
    },
    Update {
        id: String,
        #[arg(long)]
        data: String,
    },
    Delete {
        id: String,
    },
}

impl ApiSubcommand {
    fn access(&self) -> Access {
        match self {
            Self::List { .. } | Self::Get { .. } => Access::Read,
            Self::Create { .. } | Self::Update { .. } | Self::Delete { .. } => Access::Write,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    if let Some(api_url) = cli.api_url.as_deref() {
        config = config.with_api_url(api_url)?;
    }
    if let Some(store) = cli.store {
        config.store_path = store;
    }

    let app = App::new(&config)?;
    app.start();

    match cli.command {
        Command::Login { email, password } => run_login(&app, Credentials::new(email, password)).await,
        Command::Logout => {
            app.logout();
            println!("logged out");
            Ok(())
        }
        Command::Whoami => run_whoami(&app),
        Command::Menu => {
            print_entries(&app.sidebar());
            Ok(())
        }
        Command::Navbar => {
            print_entries(&app.navbar());
            Ok(())
        }
        Command::Visit { path } => {
            print_outcome(&app.visit(&path));
            Ok(())
        }
        Command::Refresh => run_refresh(&app).await,
        Command::Api(api) => run_api(&app, api).await,
    }
}

async fn run_login(app: &App, credentials: Credentials) -> Result<(), CliError> {
    let user = app.login(&credentials).await?;
    println!("logged in as {} ({})", user.email, user.role.label());
    Ok(())
}

fn run_whoami(app: &App) -> Result<(), CliError> {
    let user = app.session().user().ok_or(CliError::NotLoggedIn)?;
    println!("{} ({})", user.email, user.role.label());
    if user.is_data_entry() {
        let granted: Vec<_> = user.privileges.granted().map(|p| p.as_str()).collect();
        println!("privileges: {}", if granted.is_empty() { "none".to_owned() } else { granted.join(", ") });
    }
    Ok(())
}

async fn run_refresh(app: &App) -> Result<(), CliError> {
    match app.refresh().await? {
        Some(user) => println!("refreshed {} ({})", user.email, user.role.label()),
        None => return Err(CliError::NotLoggedIn),
    }
    Ok(())
}

async fn run_api(app: &App, api: ApiCommand) -> Result<(), CliError> {
    let resource = api.resource;
    if let Some(requirement) = resource.requirement_for(api.command.access()) {
        match evaluate(&app.session().snapshot(), requirement) {
            Verdict::Allow => {}
            Verdict::Pending | Verdict::Deny(DenyReason::NotLoggedIn) => return Err(CliError::NotLoggedIn),
            Verdict::Deny(reason) => return Err(CliError::Denied { resource, reason }),
        }
    }

    let client = app.api().resource(resource);
    let json = match api.command {
        ApiSubcommand::List { query } => client.list(&query).await?,
        ApiSubcommand::Get { id } => client.get(&id).await?,
        ApiSubcommand::Create { data } => client.create(&parse_json(&data)?).await?,
        ApiSubcommand::Update { id, data } => client.update(&id, &parse_json(&data)?).await?,
        ApiSubcommand::Delete { id } => client.delete(&id).await?,
    };
    print_json(&json)
}

fn parse_query_pair(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim().to_owned(), v.trim().to_owned()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))
}

fn parse_json(raw: &str) -> Result<Value, CliError> {
    Ok(serde_json::from_str(raw)?)
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

fn print_entries(entries: &[NavEntry]) {
    for entry in entries {
        if entry.icon.is_empty() {
            println!("{:<20} {}", entry.label, entry.path);
        } else {
            println!("{} {:<18} {}", entry.icon, entry.label, entry.path);
        }
    }
}

fn print_outcome(outcome: &Outcome) {
    match outcome {
        Outcome::Page(Page::Storefront(title)) => println!("page: {title}"),
        Outcome::Page(Page::BrandDetail) => println!("page: Brand"),
        Outcome::Page(Page::Login) => println!("page: Login"),
        Outcome::Page(Page::BackOffice(entry)) => println!("page: {} {}", entry.icon, entry.label),
        Outcome::Loading => println!("loading"),
        Outcome::Redirected(to) => println!("redirected: {to}"),
        Outcome::AccessDenied { title, message } => println!("{title}: {message}"),
    }
}
