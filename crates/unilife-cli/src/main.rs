mod render;
mod token_source;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use unilife_models::{build_schedule, group_by_day, Statistics, TaskStatus, UserId};
use unilife_sdk::{ClientConfig, ClientOptions, DataClient, IdentityToken};
use unilife_session::{BridgeConfig, DataClientFactory, SessionBridge, SessionState, SessionView};

use crate::token_source::TokenSource;

#[derive(Parser, Debug)]
#[command(name = "unilife")]
#[command(author, version, about = "University life organizer: schedule, courses and tasks", long_about = None)]
pub struct Cli {
    /// File holding the current identity token; re-read on every refresh
    #[arg(long, env = "UNILIFE_TOKEN_FILE", conflicts_with = "token")]
    pub token_file: Option<PathBuf>,

    /// Identity token to use as is
    #[arg(long, env = "UNILIFE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Act as this user instead of the token subject
    #[arg(long)]
    pub user: Option<String>,

    /// Seconds to wait for the first token before giving up
    #[arg(long, default_value_t = 30)]
    pub connect_timeout: u64,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classes and open tasks, day by day
    Schedule,
    /// Credits, GPA and task progress
    Stats,
    /// List courses
    Courses,
    /// List tasks
    Tasks {
        /// Include finished tasks
        #[arg(long)]
        all: bool,
    },
    /// Mark a task as finished
    Done {
        /// Task id
        id: String,
    },
    /// Stay signed in and log every token refresh until interrupted
    Watch,
}

impl Cli {
    fn token_source(&self) -> anyhow::Result<TokenSource> {
        match (&self.token_file, &self.token) {
            (Some(path), _) => Ok(TokenSource::File(path.clone())),
            (None, Some(token)) => Ok(TokenSource::Static(token.clone())),
            (None, None) => bail!("no identity token: pass --token-file or --token"),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let client_config = ClientConfig::from_env().context("loading backend configuration")?;
    let bridge_config = BridgeConfig::from_env().context("loading session configuration")?;
    let source = cli.token_source()?;

    info!(backend = %client_config.base_url, "starting unilife");

    let factory = DataClientFactory::new(client_config, ClientOptions::default());
    let bridge = SessionBridge::init(source, factory, bridge_config);
    bridge.handle().set_signed_in(true);

    let result = run(&cli, &bridge).await;

    bridge.handle().set_signed_in(false);
    bridge.dispose().await;
    result
}

async fn run(cli: &Cli, bridge: &SessionBridge<DataClient>) -> anyhow::Result<()> {
    let client = wait_for_client(bridge, Duration::from_secs(cli.connect_timeout)).await?;
    let user = || resolve_user(cli.user.as_deref(), &client.session_token());

    match &cli.command {
        Commands::Schedule => {
            let user = user()?;
            let (courses, classes, tasks) = futures::try_join!(
                client.list_courses(&user),
                client.list_classes(&user),
                client.list_open_tasks(&user),
            )?;
            let events = build_schedule(&courses, &classes, &tasks);
            print!("{}", render::schedule(&group_by_day(&events)));
        }
        Commands::Stats => {
            let user = user()?;
            let (courses, tasks) =
                futures::try_join!(client.list_courses(&user), client.list_tasks(&user))?;
            print!("{}", render::statistics(&Statistics::compute(&courses, &tasks)));
        }
        Commands::Courses => {
            print!("{}", render::courses(&client.list_courses(&user()?).await?));
        }
        Commands::Tasks { all } => {
            let user = user()?;
            let tasks = if *all {
                client.list_tasks(&user).await?
            } else {
                client.list_open_tasks(&user).await?
            };
            print!("{}", render::tasks(&tasks));
        }
        Commands::Done { id } => {
            client.set_task_status(id, TaskStatus::Finished).await?;
            println!("Task {id} finished.");
        }
        Commands::Watch => watch(bridge, &client).await?,
    }
    Ok(())
}

async fn wait_for_client(
    bridge: &SessionBridge<DataClient>,
    timeout: Duration,
) -> anyhow::Result<Arc<DataClient>> {
    let mut view = bridge.subscribe();
    let ready = tokio::time::timeout(timeout, view.wait_for(|v| v.client.is_some()))
        .await
        .context("timed out waiting for an identity token")?
        .context("session bridge stopped")?;
    ready.client.clone().context("session bridge published no client")
}

fn resolve_user(explicit: Option<&str>, token: &IdentityToken) -> anyhow::Result<UserId> {
    if let Some(user) = explicit {
        return Ok(UserId::new(user));
    }
    let claims = token.claims().context("reading identity token claims")?;
    claims
        .sub
        .map(|sub| UserId::new(&sub))
        .context("identity token has no subject; pass --user")
}

async fn watch(bridge: &SessionBridge<DataClient>, client: &DataClient) -> anyhow::Result<()> {
    let feed = client.realtime_url()?;
    info!(
        feed = %format!("{}://{}{}", feed.scheme(), feed.host_str().unwrap_or_default(), feed.path()),
        events_per_second = client.options().events_per_second,
        "change feed endpoint"
    );

    let mut view = bridge.subscribe();
    info!("watching session, press Ctrl-C to stop");
    log_view(&view.borrow_and_update());

    loop {
        tokio::select! {
            changed = view.changed() => {
                if changed.is_err() {
                    warn!("session bridge stopped");
                    return Ok(());
                }
                log_view(&view.borrow_and_update());
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                return Ok(());
            }
        }
    }
}

fn log_view(view: &SessionView<DataClient>) {
    let next_refresh_secs = view
        .next_refresh
        .map(|at| at.saturating_duration_since(tokio::time::Instant::now()).as_secs());
    match view.state {
        SessionState::Authenticated => {
            let token = view.client.as_ref().map(|c| c.session_token());
            info!(?token, ?next_refresh_secs, "session authenticated");
        }
        SessionState::Acquiring => info!(?next_refresh_secs, "acquiring token"),
        SessionState::Unauthenticated => info!("signed out"),
    }
}
