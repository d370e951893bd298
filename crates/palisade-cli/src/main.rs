//! palisade CLI tool
//!
//! Inspects and mutates a node's peer directory: which peers are
//! discoverable, which are trusted, what certificate each presents, and how
//! a trusted peer is reached.
//!
//! Usage:
//!   palisade self
//!   palisade peers
//!   palisade addresses
//!   palisade admit <uuid> <cert>
//!   palisade remove <uuid>
//!   palisade set-addr <uuid> <host:plainPort:securePort>
//!   palisade drop-addr <uuid>
//!   palisade addr <uuid>

use palisade_client::{Authority, DirectoryStore, PeerDirectory, Result, Session};
use palisade_directory::{Certificate, DirectorySnapshot, PeerClass, PeerUuid};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// CLI configuration from environment variables.
struct CliConfig {
    api_url: String,
    token: Option<String>,
}

impl CliConfig {
    fn from_env() -> Self {
        let api_url = std::env::var("PALISADE_API")
            .unwrap_or_else(|_| "http://localhost:8080".to_string());
        let token = std::env::var("PALISADE_TOKEN").ok();
        Self { api_url, token }
    }
}

fn print_usage() {
    eprintln!("palisade - Inspect and manage a node's peer directory");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  palisade self                       Show this node's identity");
    eprintln!("  palisade peers                      List available and known peers");
    eprintln!("  palisade addresses                  List address overrides");
    eprintln!("  palisade admit <uuid> <cert>        Admit a peer into the trust list");
    eprintln!("  palisade remove <uuid>              Remove a peer from the trust list");
    eprintln!("  palisade set-addr <uuid> <address>  Bind an address (host:plainPort:securePort)");
    eprintln!("  palisade drop-addr <uuid>           Drop a peer's address binding");
    eprintln!("  palisade addr <uuid>                Show one peer's address binding");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  PALISADE_API    Management API base URL (default: http://localhost:8080)");
    eprintln!("  PALISADE_TOKEN  Bearer token for authenticated nodes");
}

fn fingerprint_of(cert: &Certificate) -> String {
    match cert.fingerprint() {
        Ok(fp) => fp.to_string(),
        Err(err) => format!("(no fingerprint: {err})"),
    }
}

fn short_fingerprint_of(cert: &Certificate) -> String {
    match cert.fingerprint() {
        Ok(fp) => fp.short(),
        Err(_) => "????????".to_string(),
    }
}

fn class_label(class: PeerClass) -> &'static str {
    match class {
        PeerClass::Unknown => "unknown",
        PeerClass::AvailableOnly => "available",
        PeerClass::KnownUnaddressed => "known",
        PeerClass::KnownAddressed => "known+addr",
    }
}

fn print_warnings(snapshot: &DirectorySnapshot) {
    for warning in &snapshot.warnings {
        eprintln!("warning: {warning}");
    }
}

fn print_peers(snapshot: &DirectorySnapshot) {
    print_warnings(snapshot);

    println!("available ({}):", snapshot.available.len());
    for peer in &snapshot.available {
        println!(
            "  {}  {}  [{}]",
            peer.uuid,
            short_fingerprint_of(&peer.cert),
            class_label(snapshot.classify(&peer.uuid))
        );
    }

    println!("known ({}):", snapshot.known.len());
    for peer in &snapshot.known {
        let address = peer
            .effective_address
            .as_ref()
            .map(|a| a.to_string())
            .unwrap_or_else(|| "-".to_string());
        let connected = if peer.connected() { "connected" } else { "unreachable" };
        println!(
            "  {}  {}  {}  {}",
            peer.uuid(),
            short_fingerprint_of(&peer.record.cert),
            address,
            connected
        );
    }
}

async fn cmd_self(directory: &PeerDirectory) -> Result<()> {
    let snapshot = directory.refresh().await?;
    print_warnings(&snapshot);
    println!("uuid:        {}", snapshot.self_info.uuid);
    println!("fingerprint: {}", fingerprint_of(&snapshot.self_info.cert));
    Ok(())
}

async fn cmd_peers(directory: &PeerDirectory) -> Result<()> {
    let snapshot = directory.refresh().await?;
    print_peers(&snapshot);
    Ok(())
}

async fn cmd_addresses(directory: &PeerDirectory) -> Result<()> {
    let snapshot = directory.refresh().await?;
    print_warnings(&snapshot);
    if snapshot.addresses.is_empty() {
        println!("(none)");
    }
    for binding in &snapshot.addresses {
        println!("  {}  {}", binding.uuid, binding.address);
    }
    Ok(())
}

async fn cmd_admit(directory: &PeerDirectory, uuid: &str, cert: &str) -> Result<()> {
    let snapshot = directory
        .admit(&PeerUuid::new(uuid), &Certificate::new(cert))
        .await?;
    println!("admitted {uuid}");
    print_peers(&snapshot);
    Ok(())
}

async fn cmd_remove(directory: &PeerDirectory, uuid: &str) -> Result<()> {
    let snapshot = directory.remove(&PeerUuid::new(uuid)).await?;
    println!("removed {uuid}");
    print_peers(&snapshot);
    Ok(())
}

async fn cmd_set_addr(directory: &PeerDirectory, uuid: &str, address: &str) -> Result<()> {
    let snapshot = directory.rebind(&PeerUuid::new(uuid), address).await?;
    println!("bound {address} to {uuid}");
    print_peers(&snapshot);
    Ok(())
}

async fn cmd_drop_addr(directory: &PeerDirectory, uuid: &str) -> Result<()> {
    let snapshot = directory.unbind(&PeerUuid::new(uuid)).await?;
    println!("dropped address binding for {uuid}");
    print_peers(&snapshot);
    Ok(())
}

async fn cmd_addr(directory: &PeerDirectory, uuid: &str) -> Result<()> {
    match directory.store().load_address(&PeerUuid::new(uuid)).await? {
        Some(binding) => println!("{}", binding.address),
        None => println!("(unbound)"),
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    let config = CliConfig::from_env();
    tracing::debug!("using authority at {}", config.api_url);
    let session = match &config.token {
        Some(token) => Session::with_token(token),
        None => Session::anonymous(),
    };
    let authority = match Authority::new(&config.api_url, session) {
        Ok(authority) => authority,
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    };
    let directory = PeerDirectory::new(DirectoryStore::new(authority));

    let result = match args[1].as_str() {
        "self" => cmd_self(&directory).await,
        "peers" => cmd_peers(&directory).await,
        "addresses" => cmd_addresses(&directory).await,
        "admit" => {
            if args.len() < 4 {
                eprintln!("Error: admit requires <uuid> and <cert> arguments");
                std::process::exit(1);
            }
            cmd_admit(&directory, &args[2], &args[3]).await
        }
        "remove" => {
            if args.len() < 3 {
                eprintln!("Error: remove requires a <uuid> argument");
                std::process::exit(1);
            }
            cmd_remove(&directory, &args[2]).await
        }
        "set-addr" => {
            if args.len() < 4 {
                eprintln!("Error: set-addr requires <uuid> and <address> arguments");
                std::process::exit(1);
            }
            cmd_set_addr(&directory, &args[2], &args[3]).await
        }
        "drop-addr" => {
            if args.len() < 3 {
                eprintln!("Error: drop-addr requires a <uuid> argument");
                std::process::exit(1);
            }
            cmd_drop_addr(&directory, &args[2]).await
        }
        "addr" => {
            if args.len() < 3 {
                eprintln!("Error: addr requires a <uuid> argument");
                std::process::exit(1);
            }
            cmd_addr(&directory, &args[2]).await
        }
        "-h" | "--help" | "help" => {
            print_usage();
            return;
        }
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            std::process::exit(1);
        }
    };

    if let Err(err) = result {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
