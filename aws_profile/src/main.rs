use crate::environment::{ChildEnvironment, TOKEN_TYPE_ENV};
use anyhow::Result;
use clap::Parser;
use file_manager::credential_cache::{CredentialCache, JsonFileCache};
use session::identity::resolve_identity;
use session::session::SdkSession;
use shared::args::Args;
use shared::invocation::Invocation;
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod environment;
mod exec;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.debug);

    let env: HashMap<String, String> = std::env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
        .collect();

    let invocation = match Invocation::resolve(args, &program_name(), &env) {
        Ok(invocation) => invocation,
        Err(usage) => {
            print!("{}", usage);
            std::io::stdout().flush()?;
            std::process::exit(1);
        }
    };

    info!(
        "Resolving credentials for profile {}",
        invocation.profile.as_deref().unwrap_or("(sdk default)")
    );

    let mut session = SdkSession::load(invocation.profile.as_deref()).await;
    let identity = resolve_identity(
        &mut session,
        invocation.region.clone(),
        invocation.cache_enabled,
        || Ok(Box::new(JsonFileCache::new()?) as Box<dyn CredentialCache>),
    )
    .await?;

    let environment = ChildEnvironment::build(
        &invocation,
        &identity,
        env.get(TOKEN_TYPE_ENV).map(String::as_str),
    );

    let code = exec::run(&invocation.command, &environment)?;
    std::process::exit(code);
}

fn program_name() -> String {
    std::env::args_os()
        .next()
        .and_then(|arg0| {
            Path::new(&arg0)
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "aws-profile".to_string())
}

/// Logs always go to stderr, stdout belongs to the wrapped command
fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(debug)
        .with_line_number(debug)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}
