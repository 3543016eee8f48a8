//! procvisor - dedicated server supervisor.
//!
//! Resolves the server executable and parameters (flags, stored settings or
//! an interactive prompt), builds the supervisor and runs the operator
//! console until end of input or a termination signal.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tokio::io::{BufReader, Stdin, Stdout};

use procvisor::{
    CommandLoop, ConfigStore, Console, FileStore, LaunchSpec, Launcher, OsLauncher, Subscribe,
    SupervisorBuilder, SupervisorConfig, keys, wait_for_shutdown_signal,
};

mod cli;

type StdConsole = Console<BufReader<Stdin>, Stdout>;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Args::parse();
    cli::init_logging(args.log_format, args.log_level)?;

    let store = Arc::new(
        FileStore::open(&args.store)
            .with_context(|| format!("opening settings file {}", args.store.display()))?,
    );
    let mut console = Console::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout());
    console.say("Welcome to procvisor!").await?;

    let launch = resolve_launch(&args, store.as_ref(), &mut console).await?;
    console
        .say(&format!("Local path to server: {}", launch.executable().display()))
        .await?;
    console
        .say(&format!("Server params are: {}", launch.raw_params()))
        .await?;

    let launcher: Arc<dyn Launcher> = if args.quiet_server {
        Arc::new(OsLauncher::detached())
    } else {
        Arc::new(OsLauncher::new())
    };
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(procvisor::LogWriter::new())];
    let sup = SupervisorBuilder::new(SupervisorConfig::default(), launch.clone())
        .with_store(store.clone())
        .with_launcher(launcher)
        .with_subscribers(subs)
        .build();

    if args.autostart {
        if let Err(e) = sup.start().await {
            tracing::error!(target: "procvisor", error = %e, label = e.as_label(), "autostart failed");
        }
    }

    let mut repl = CommandLoop::new(sup.clone(), store, launch, console);
    let signal = tokio::select! {
        res = repl.run() => {
            res.context("console i/o failed")?;
            tracing::info!(target: "procvisor", "console input closed; waiting for a shutdown signal");
            wait_for_shutdown_signal().await?
        }
        res = wait_for_shutdown_signal() => res.context("installing signal handlers")?,
    };
    tracing::info!(target: "procvisor", %signal, "shutting down");

    sup.shutdown().await;
    // A stdin read still parked on the blocking pool would hold the runtime open.
    std::process::exit(0)
}

/// Flags win over stored settings; missing settings are prompted for and stored.
async fn resolve_launch(
    args: &cli::Args,
    store: &FileStore,
    console: &mut StdConsole,
) -> Result<LaunchSpec> {
    let executable = match &args.server {
        Some(path) => {
            store.set(keys::SERVER_EXE, path)?;
            path.clone()
        }
        None => match store.get(keys::SERVER_EXE).filter(|p| !p.is_empty()) {
            Some(path) => path,
            None => {
                let Some(path) = console.prompt_executable().await? else {
                    bail!("no server executable given");
                };
                store.set(keys::SERVER_EXE, &path)?;
                path
            }
        },
    };

    let params = match &args.params {
        Some(params) => {
            store.set(keys::SERVER_PARAMS, params)?;
            params.clone()
        }
        None => match store.get(keys::SERVER_PARAMS) {
            Some(params) => params,
            None => {
                let params = console.prompt_params().await?.unwrap_or_default();
                store.set(keys::SERVER_PARAMS, &params)?;
                params
            }
        },
    };

    Ok(LaunchSpec::new(executable, params))
}
