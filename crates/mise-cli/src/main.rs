mod config;
mod demo;
mod repl;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mise::{
    AccountBackend, CookMode, Credentials, HttpClient, MemorySession, RecipeBackend,
    SessionProvider, SignupWizard, StaticSession, SuggestionBackend, ThreadFetcher,
};

use crate::config::Config;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Read settings from this file instead of config/
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use a built-in catalogue instead of the server
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account (password from MISE_PASSWORD)
    Signup { email: String },
    /// Log in and print a session token (password from MISE_PASSWORD)
    Login { email: String },
    /// Start a new suggestion thread
    Suggest {
        #[arg(required = true, num_args = 1..)]
        prompt: Vec<String>,
    },
    /// Resume an existing thread
    Thread { id: String },
    /// List saved recipes
    Recipes,
    /// Step through a saved recipe
    Cook {
        recipe_id: String,
        #[arg(long, default_value_t = 1)]
        step: usize,
    },
    /// Rework a saved recipe from a chat instruction
    Modify {
        recipe_id: String,
        #[arg(required = true, num_args = 1..)]
        prompt: Vec<String>,
    },
    /// Ask a question about the recipe a thread produced
    Ask {
        thread_id: String,
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
}

struct Backends {
    suggestions: Arc<dyn SuggestionBackend>,
    recipes: Arc<dyn RecipeBackend>,
    accounts: Option<Arc<dyn AccountBackend>>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)
            .map(Config::with_env_secrets)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => Config::load().context("Failed to load configuration")?,
    };

    init_logging(&config);
    tracing::debug!(base_url = %config.client.base_url, offline = cli.offline, "Config loaded");

    let backends = build_backends(&config, cli.offline)?;
    let fetcher = ThreadFetcher::new(backends.suggestions.clone())
        .with_persisted_rejections(config.flow.persist_rejections);

    match cli.command {
        Command::Signup { email } => {
            let accounts = account_backend(&backends)?;
            let credentials = Credentials::new(email, password()?);
            let token = SignupWizard::new()
                .signup(accounts.as_ref(), &credentials)
                .await
                .context("Signup failed")?;
            println!("export MISE_TOKEN={}", token.token);
        }
        Command::Login { email } => {
            let accounts = account_backend(&backends)?;
            let credentials = Credentials::new(email, password()?);
            let token = accounts.login(&credentials).await.context("Login failed")?;
            println!("export MISE_TOKEN={}", token.token);
        }
        Command::Suggest { prompt } => {
            let thread = fetcher.start(&prompt.join(" ")).await?;
            repl::run_thread(thread).await?;
        }
        Command::Thread { id } => {
            let thread = fetcher.load(&id).await?;
            repl::run_thread(thread).await?;
        }
        Command::Recipes => {
            let recipes = backends.recipes.list_recipes().await?;
            if recipes.is_empty() {
                println!("No saved recipes yet.");
            }
            for recipe in recipes {
                println!(
                    "{}  {} ({} min, serves {})",
                    recipe.id, recipe.recipe.title, recipe.recipe.total_time_minutes, recipe.recipe.servings
                );
            }
        }
        Command::Cook { recipe_id, step } => {
            let recipe = backends
                .recipes
                .get_recipe(&recipe_id)
                .await
                .with_context(|| format!("Failed to load recipe {}", recipe_id))?;
            repl::run_cook(CookMode::new(recipe.recipe, step)).await?;
        }
        Command::Modify { recipe_id, prompt } => {
            let recipe = backends
                .recipes
                .modify_recipe(&recipe_id, &prompt.join(" "))
                .await
                .with_context(|| format!("Failed to modify recipe {}", recipe_id))?;
            print!("{}", repl::render_recipe(&recipe));
        }
        Command::Ask { thread_id, question } => {
            let answer = backends
                .recipes
                .ask_question(&thread_id, &question.join(" "))
                .await?;
            println!("{}", answer);
        }
    }

    Ok(())
}

fn build_backends(config: &Config, offline: bool) -> anyhow::Result<Backends> {
    if offline {
        tracing::info!("Using offline catalogue");
        let backend = demo::backend();
        return Ok(Backends {
            suggestions: backend.clone(),
            recipes: backend,
            accounts: None,
        });
    }

    let session: Arc<dyn SessionProvider> = match &config.token {
        Some(token) => Arc::new(StaticSession::new(token.clone())),
        None => Arc::new(MemorySession::new()),
    };
    let client = Arc::new(HttpClient::from_config(&config.client, session.clone())?);
    tracing::info!(base_url = %client.base_url(), authenticated = session.is_authenticated(), "HTTP client ready");

    Ok(Backends {
        suggestions: client.clone(),
        recipes: client.clone(),
        accounts: Some(client),
    })
}

fn account_backend(backends: &Backends) -> anyhow::Result<Arc<dyn AccountBackend>> {
    match &backends.accounts {
        Some(accounts) => Ok(accounts.clone()),
        None => bail!("Accounts are not available in offline mode"),
    }
}

fn password() -> anyhow::Result<String> {
    std::env::var("MISE_PASSWORD").context("MISE_PASSWORD environment variable is required")
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}
