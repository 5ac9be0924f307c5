//! Command line interface.

use apiprobe_domain::{DomainError, HttpMethod, RequestSpec, token_preview};
use apiprobe_infrastructure::{AuthStack, Settings};
use clap::{Parser, Subcommand};
use serde_json::Value;

/// Authenticated API test client.
#[derive(Debug, Parser)]
#[command(name = "apiprobe", version, about)]
pub struct Cli {
    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Obtain a token for a provider, logging in if needed
    Token {
        /// Provider key (e.g. reqres, petstore)
        provider: String,
        /// Log in even if a valid token is cached, retrying with backoff
        #[arg(long)]
        force: bool,
    },
    /// Show the token status of a provider
    Status {
        /// Provider key
        provider: String,
    },
    /// Forget cached tokens
    Clear {
        /// Provider key
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        provider: Option<String>,
        /// Clear every provider
        #[arg(long)]
        all: bool,
    },
    /// Send one request through the auth pipeline
    Send {
        /// HTTP method
        #[arg(value_parser = parse_method)]
        method: HttpMethod,
        /// Absolute URL
        url: String,
        /// JSON request body
        #[arg(long, value_parser = parse_json)]
        body: Option<Value>,
        /// Request timeout in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,
    },
}

fn parse_method(s: &str) -> Result<HttpMethod, DomainError> {
    s.parse()
}

fn parse_json(s: &str) -> Result<Value, serde_json::Error> {
    serde_json::from_str(s)
}

fn ensure_provider(stack: &AuthStack, provider: &str) -> Result<(), String> {
    if stack.providers.get(provider).is_some() {
        return Ok(());
    }
    let known: Vec<&str> = stack.providers.iter().map(|p| p.key.as_str()).collect();
    Err(format!(
        "unknown provider '{provider}' (known: {})",
        known.join(", ")
    ))
}

/// Runs a parsed command.
///
/// # Errors
///
/// Returns an error if settings are invalid, the provider is unknown, or
/// the command fails.
pub async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::from_env()?;
    let stack = AuthStack::build(&settings)?;

    match cli.command {
        Command::Token { provider, force } => {
            ensure_provider(&stack, &provider)?;
            let token = if force {
                stack.token_store.invalidate(&provider).await;
                Some(
                    stack
                        .gateway
                        .login_with_retry(&provider, stack.retry_policy)
                        .await?,
                )
            } else {
                stack.gateway.token_for(&provider).await?
            };
            match token {
                Some(token) => {
                    let status = stack.token_store.status(&provider).await;
                    println!("{provider}: {} ({})", token_preview(&token), status.display_message());
                }
                None => return Err(format!("{provider}: login failed").into()),
            }
        }
        Command::Status { provider } => {
            ensure_provider(&stack, &provider)?;
            let status = stack.token_store.status(&provider).await;
            println!("{provider}: {}", status.display_message());
        }
        Command::Clear { provider, all } => {
            if all {
                stack.token_store.clear_all().await;
                println!("cleared all tokens");
            } else if let Some(provider) = provider {
                ensure_provider(&stack, &provider)?;
                stack.token_store.clear(&provider).await;
                println!("{provider}: cleared");
            }
        }
        Command::Send {
            method,
            url,
            body,
            timeout_ms,
        } => {
            let mut request = RequestSpec::new(method, url)
                .with_timeout_ms(timeout_ms.unwrap_or(settings.request_timeout_ms));
            if let Some(body) = body {
                request = request.with_json(body);
            }
            let response = stack.client.execute(request).await?;
            println!("HTTP {} ({} ms)", response.status, response.duration.as_millis());
            println!("{}", serde_json::to_string_pretty(&response.body)?);
        }
    }
    Ok(())
}
