//! Phonebase CLI — turn a phone (or any box with a shell) into a
//! personal JSON backend.
//!
//! Three subcommands:
//! - `connect` — register with the cloud registry, then serve
//! - `serve`   — serve locally, no registration (works offline)
//! - `status`  — query the registry for registered phones

mod commands;

use std::path::PathBuf;
use std::process;

use anyhow::{bail, Context, Result};
use clap::ArgMatches;
use phonebase_cloud::{spawn_heartbeat, RegisteredPhone, RegistryClient, RegistryConfig};
use phonebase_core::DeviceInfo;
use phonebase_server::{AppState, Profile, ServerConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let matches = commands::build_cli().get_matches();
    let result = match matches.subcommand() {
        Some(("connect", sub)) => run_connect(sub).await,
        Some(("serve", sub)) => run_serve(sub).await,
        Some(("status", sub)) => run_status(sub).await,
        _ => unreachable!("subcommand is required"),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

/// Environment config, overridden by any flags given on the command line
fn server_config(matches: &ArgMatches) -> ServerConfig {
    let mut config = ServerConfig::load();
    if let Some(port) = matches.get_one::<u16>("port") {
        config.port = *port;
    }
    if let Some(dir) = matches.get_one::<String>("data-dir") {
        config.data_dir = PathBuf::from(dir);
    }
    config
}

/// Registry credentials come from the environment, never from flags
fn registry_config() -> Result<RegistryConfig> {
    let project = std::env::var("PHONEBASE_PROJECT")
        .context("PHONEBASE_PROJECT is not set (Firebase project ID)")?;
    let api_key = std::env::var("PHONEBASE_API_KEY")
        .context("PHONEBASE_API_KEY is not set (Firebase web API key)")?;
    Ok(RegistryConfig::new(project, api_key))
}

/// Flag wins and is saved; otherwise fall back to the stored profile
fn resolve_username(matches: &ArgMatches, config: &ServerConfig) -> Result<String> {
    let saved = Profile::load(&config.data_dir);

    if let Some(user) = matches.get_one::<String>("user") {
        if saved.as_ref().map(|p| p.username.as_str()) != Some(user.as_str()) {
            Profile::new(user.clone()).save(&config.data_dir)?;
        }
        return Ok(user.clone());
    }

    match saved {
        Some(profile) => Ok(profile.username),
        None => bail!("no saved profile; pass --user NAME on first connect"),
    }
}

fn print_banner(registered: &RegisteredPhone, port: u16) {
    println!();
    println!("✅ Connected!");
    println!("   Phone ID: {}", registered.phone_id);
    println!(
        "   Device:   {} ({})",
        registered.device.device_name, registered.device.model
    );
    println!("   API:      http://{}:{}/", registered.device.ip, port);
    println!();
}

async fn run_connect(matches: &ArgMatches) -> Result<()> {
    let config = server_config(matches);
    let username = resolve_username(matches, &config)?;
    let registry = RegistryClient::new(registry_config()?)?;
    let device = DeviceInfo::detect();

    println!("📱 Phonebase");
    println!("Registering {} as {}...", device.device_name, username);

    let registered = match registry.register(&username, &device).await {
        Ok(registered) => registered,
        Err(e) => {
            eprintln!("Registration failed: {e}");
            eprintln!("Check PHONEBASE_PROJECT / PHONEBASE_API_KEY and your network connection.");
            process::exit(1);
        }
    };

    print_banner(&registered, config.port);

    let state = AppState::open(&config)?;
    let heartbeat = spawn_heartbeat(
        registry,
        registered.phone_id.clone(),
        config.heartbeat_period,
    );

    let result = phonebase_server::serve(&config, state).await;
    heartbeat.abort();
    result?;
    Ok(())
}

async fn run_serve(matches: &ArgMatches) -> Result<()> {
    let config = server_config(matches);
    let state = AppState::open(&config)?;

    println!("📱 Phonebase (local mode, no cloud registration)");
    println!("   Data dir: {}", config.data_dir.display());
    println!("   API:      http://0.0.0.0:{}/", config.port);
    println!();

    phonebase_server::serve(&config, state).await?;
    Ok(())
}

async fn run_status(matches: &ArgMatches) -> Result<()> {
    let user = matches
        .get_one::<String>("user")
        .context("--user is required")?;

    let registry = RegistryClient::new(registry_config()?)?;
    let phones = registry.list_phones().await?;

    println!("Found {} registered phone(s)", phones.len());
    for phone in &phones {
        println!();
        println!("  {}", phone.phone_id);
        println!(
            "    user:     {}",
            phone.user_id.as_deref().unwrap_or("(none)")
        );
        println!(
            "    device:   {}",
            phone.device_name.as_deref().unwrap_or("(unknown)")
        );
        println!(
            "    model:    {}",
            phone.model.as_deref().unwrap_or("(unknown)")
        );
        println!("    ip:       {}", phone.ip.as_deref().unwrap_or("(unknown)"));
        match phone.last_seen {
            Some(seen) => println!("    lastSeen: {}", seen.to_rfc3339()),
            None => println!("    lastSeen: (never)"),
        }
    }

    println!();
    let matched = phones
        .iter()
        .filter(|p| p.user_id.as_deref() == Some(user.as_str()))
        .count();
    if matched > 0 {
        println!("✅ {matched} phone(s) registered for {user}");
    } else {
        println!("❌ No phone registered for {user}");
    }
    Ok(())
}
