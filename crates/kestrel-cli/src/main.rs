use clap::{Parser, Subcommand};
use kestrel_rpc::ports;
use kestrel_types::Network;
use kestrel_wallet::SendConfig;
use std::path::PathBuf;

mod commands;

/// Kestrel send-engine command-line tools.
#[derive(Parser)]
#[command(name = "kestrel-wallet-cli")]
#[command(about = "Daemon, address, decoy, and relay tools for the Kestrel network")]
#[command(version)]
struct Cli {
    /// Network to use.
    #[arg(long, default_value = "mainnet")]
    network: NetworkArg,

    /// Daemon RPC URL (overrides default for the selected network).
    #[arg(long)]
    daemon: Option<String>,

    /// JSON file with send settings (fees, mixin limits, `network_timeout` in seconds).
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Debug)]
enum NetworkArg {
    Mainnet,
    Testnet,
}

impl std::fmt::Display for NetworkArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mainnet => write!(f, "mainnet"),
            Self::Testnet => write!(f, "testnet"),
        }
    }
}

impl std::str::FromStr for NetworkArg {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "mainnet" | "main" => Ok(Self::Mainnet),
            "testnet" | "test" => Ok(Self::Testnet),
            _ => Err(format!("unknown network: {} (use mainnet or testnet)", s)),
        }
    }
}

impl NetworkArg {
    fn to_network(&self) -> Network {
        match self {
            Self::Mainnet => Network::Mainnet,
            Self::Testnet => Network::Testnet,
        }
    }

    fn default_daemon_url(&self) -> String {
        let port = match self {
            Self::Mainnet => ports::DAEMON_MAINNET,
            Self::Testnet => ports::DAEMON_TESTNET,
        };
        format!("http://127.0.0.1:{}", port)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show daemon height, node fee, and the mixin range in force.
    Status,

    /// Decode an address and print its keys and payment ID.
    Decode {
        address: String,
    },

    /// Build an integrated address from a standard address and payment ID.
    Integrate {
        address: String,

        /// 64 hex characters.
        #[arg(long)]
        payment_id: String,
    },

    /// Fetch decoys for a set of input amounts, as a send would.
    Decoys {
        /// Input amounts in KST (e.g., "1.00", "2.50"). Repeatable.
        #[arg(long = "amount", required = true)]
        amounts: Vec<String>,

        /// Decoys per input (defaults to the network default).
        #[arg(long)]
        mixin: Option<u64>,
    },

    /// Relay a signed, hex-encoded transaction.
    Relay {
        /// Raw transaction hex.
        #[arg(long)]
        hex: String,
    },
}

/// Application context shared across commands.
struct AppContext {
    network: Network,
    daemon_url: String,
    config: SendConfig,
}

impl AppContext {
    fn from_cli(cli: &Cli) -> Result<Self, Box<dyn std::error::Error>> {
        let config = match &cli.config {
            Some(path) => SendConfig::from_json(&std::fs::read_to_string(path)?)?,
            None => SendConfig::default(),
        };

        Ok(Self {
            network: cli.network.to_network(),
            daemon_url: cli
                .daemon
                .clone()
                .unwrap_or_else(|| cli.network.default_daemon_url()),
            config,
        })
    }
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let ctx = match AppContext::from_cli(&cli) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error: cannot load config: {}", e);
            std::process::exit(1);
        }
    };
    log::debug!("{} daemon at {}", cli.network, ctx.daemon_url);

    let result = match cli.command {
        Commands::Status => commands::show_status(&ctx).await,
        Commands::Decode { address } => commands::decode_address(&ctx, &address),
        Commands::Integrate { address, payment_id } => {
            commands::integrate_address(&ctx, &address, &payment_id)
        }
        Commands::Decoys { amounts, mixin } => commands::probe_decoys(&ctx, &amounts, mixin).await,
        Commands::Relay { hex } => commands::relay_raw(&ctx, &hex).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
