//! wallet-store CLI
//!
//! Drives a wallet store backed by a local keypair adapter. The selected
//! wallet is remembered in a JSON file, so `--auto-connect` reconnects it on
//! the next run.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use wallet_store::adapter::KeypairAdapter;
use wallet_store::prelude::*;
use wallet_store::storage::{FileNameRepository, NameRepository};
use wallet_store::store::DEFAULT_LOCAL_STORAGE_KEY;

/// wallet-store: select, connect and sign with a wallet
#[derive(Parser)]
#[command(name = "wallet-store")]
#[command(about = "Wallet selection and connection state from the command line", long_about = None)]
struct Cli {
    /// File remembering the selected wallet
    #[arg(long, global = true, default_value = ".wallet-store.json")]
    storage: PathBuf,

    /// Key of the selected wallet entry in the storage file
    #[arg(long, global = true, default_value = DEFAULT_LOCAL_STORAGE_KEY)]
    key: String,

    /// Base58 encoded 64-byte keypair (a random one when absent)
    #[arg(long, global = true)]
    keypair: Option<String>,

    /// Name of the keypair wallet
    #[arg(long, global = true, default_value = "Burner")]
    name: String,

    /// Connect the remembered wallet on start-up
    #[arg(long, global = true)]
    auto_connect: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered wallets
    Wallets,

    /// Show the selected wallet and its connection state
    Status,

    /// Select a wallet and connect to it
    Connect {
        /// Wallet to select (defaults to the remembered one, then the keypair wallet)
        #[arg(short, long)]
        wallet: Option<String>,

        /// Sign this message once connected
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Disconnect and clear the selection
    Disconnect,

    /// Clear the remembered wallet
    Forget,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}: {}", e.kind(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), WalletError> {
    let adapter = match &cli.keypair {
        Some(keypair) => KeypairAdapter::from_base58(&cli.name, keypair)?,
        None => KeypairAdapter::generate(&cli.name),
    };
    let storage: Arc<dyn NameRepository> = Arc::new(FileNameRepository::new(&cli.storage));

    let store = WalletStore::new(
        WalletStoreConfig::new()
            .with_wallet(Arc::new(adapter))
            .with_auto_connect(cli.auto_connect)
            .with_local_storage_key(&cli.key)
            .with_storage(storage.clone()),
    );
    settle(&store).await;

    let result = match cli.command {
        Commands::Wallets => {
            print_wallets(&store);
            Ok(())
        }
        Commands::Status => {
            print_status(&store);
            Ok(())
        }
        Commands::Connect { wallet, message } => {
            let wallet = match wallet {
                Some(wallet) => wallet,
                None => store.selected_name().get().unwrap_or_else(|| cli.name.clone()),
            };
            connect(&store, &wallet, message).await
        }
        Commands::Disconnect => {
            store.disconnect().await?;
            info!("Disconnected");
            print_status(&store);
            Ok(())
        }
        Commands::Forget => {
            storage
                .save(&cli.key, None)
                .map_err(|e| WalletError::Other(e.to_string()))?;
            info!("Forgot selected wallet in {:?}", cli.storage);
            Ok(())
        }
    };

    // Leave the remembered selection untouched on the way out.
    store.set_unloading(true);
    result
}

async fn connect(store: &WalletStore, wallet: &str, message: Option<String>) -> Result<(), WalletError> {
    store.select(wallet);
    settle(store).await;
    store.connect().await?;
    print_status(store);

    if let Some(message) = message {
        let sign = store
            .sign_message()
            .get()
            .ok_or_else(|| WalletError::SignMessage("Wallet cannot sign messages".into()))?;
        let signature = sign.call(message.as_bytes()).await?;
        println!("Signature: {}", signature);
    }
    Ok(())
}

/// Let a pending auto-connect finish
async fn settle(store: &WalletStore) {
    let connecting = store.connecting();
    let idle = connecting.wait_for(|connecting| !*connecting);
    if tokio::time::timeout(Duration::from_secs(5), idle).await.is_err() {
        info!("Still connecting, continuing anyway");
    }
}

fn print_wallets(store: &WalletStore) {
    println!("┌─────────────────────────────────────────────────────────────┐");
    println!("│  WALLETS                                                    │");
    println!("├─────────────────────────────────────────────────────────────┤");
    for wallet in store.wallets().get() {
        println!(
            "│  {:<12} │ {:<12} │ {}",
            wallet.name(),
            wallet.ready_state.to_string(),
            wallet.adapter.url()
        );
    }
    println!("└─────────────────────────────────────────────────────────────┘");
}

fn print_status(store: &WalletStore) {
    let selected = store.selected_name().get();
    let public_key = store.public_key().get();
    println!("┌─────────────────────────────────────────────────────────────┐");
    println!("│  WALLET STATUS                                              │");
    println!("├─────────────────────────────────────────────────────────────┤");
    println!("│  Selected:   {}", selected.as_deref().unwrap_or("-"));
    println!("│  Ready:      {}", store.ready_state().get());
    println!("│  Connected:  {}", store.connected().get());
    println!(
        "│  Public key: {}",
        public_key.map_or_else(|| "-".to_string(), |key| key.to_string())
    );
    println!("└─────────────────────────────────────────────────────────────┘");
}
