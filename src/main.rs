use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use label_links::auth::client_secret::ClientSecret;
use label_links::auth::code_source::{AuthorizationCodeSource, ConsolePrompt, LoopbackReceiver};
use label_links::auth::oauth::OAuthFlow;
use label_links::auth::token_manager::TokenManager;
use label_links::config::{Config, OutputFormat, load_config};
use label_links::mail::gmail::GmailClient;
use label_links::pipeline::Pipeline;

const DEFAULT_LOOPBACK_REDIRECT: &str = "http://127.0.0.1:8080/callback";

#[derive(Parser)]
#[command(name = "label-links")]
#[command(about = "Print the subject and first link of every Gmail message matching a search", long_about = None)]
struct Cli {
    /// Config file (defaults to <config dir>/label-links/config.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Gmail search expression
    #[arg(long, short)]
    query: Option<String>,

    /// Messages per list call
    #[arg(long)]
    page_size: Option<u32>,

    /// OAuth client secret file
    #[arg(long)]
    credentials: Option<PathBuf>,

    /// Cached token file
    #[arg(long)]
    token: Option<PathBuf>,

    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Catch the authorization redirect on a local port instead of pasting the code
    #[arg(long)]
    loopback: bool,

    /// Don't try to open the authorization URL in a browser
    #[arg(long)]
    no_browser: bool,

    /// Debug logging (RUST_LOG still takes precedence)
    #[arg(long, short)]
    verbose: bool,
}

impl Cli {
    fn apply(self, mut cfg: Config) -> Config {
        if let Some(q) = self.query {
            cfg.query = q;
        }
        if let Some(n) = self.page_size {
            cfg.page_size = n;
        }
        if let Some(p) = self.credentials {
            cfg.credentials_path = p;
        }
        if let Some(p) = self.token {
            cfg.token_path = p;
        }
        if let Some(f) = self.format {
            cfg.format = f;
        }
        if self.no_browser {
            cfg.open_browser = false;
        }
        cfg
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let loopback = cli.loopback;
    let cfg = load_config(cli.config.as_deref()).context("Configuration error")?;
    let cfg = cli.apply(cfg);
    cfg.validate().context("Configuration error")?;

    let secret = ClientSecret::load(&cfg.credentials_path)?;
    let flow = OAuthFlow::new(&secret)?;
    let tokens = TokenManager::new(flow, &cfg.token_path);

    let mut code_source: Box<dyn AuthorizationCodeSource> = if loopback {
        let redirect = cfg
            .redirect_uri
            .clone()
            .unwrap_or_else(|| DEFAULT_LOOPBACK_REDIRECT.to_string());
        Box::new(LoopbackReceiver::new(redirect, cfg.open_browser))
    } else {
        Box::new(ConsolePrompt::stdio(
            secret.console_redirect_uri(),
            cfg.open_browser,
        ))
    };
    let access_token = tokens
        .access_token(code_source.as_mut())
        .context("Unable to obtain an access token")?;

    let gmail = GmailClient::new(&cfg.api_base_url, access_token);
    let stdout = std::io::stdout().lock();
    Pipeline::new(&gmail, stdout, cfg.format).run(&cfg.query, cfg.page_size)?;
    Ok(())
}
