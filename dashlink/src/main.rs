use clap::{Parser, Subcommand};
use colored::*;
use dashlink::commands::{self, ConfigOverrides};
use dashlink_core::config::{DEFAULT_DEST_PORT, DEFAULT_GROUP, DEFAULT_LOCAL_PORT};
use dashlink_core::TransportConfig;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "dashlink")]
#[command(about = "dashlink - real-time dashboard synchronized over UDP multicast")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the dashboard sync loop until Ctrl+C
    Run {
        /// Dashboard file (defaults to ./dashlink.{toml,yaml,yml})
        #[arg(short = 'c', long = "config")]
        config: Option<PathBuf>,

        /// Multicast group
        #[arg(long = "group")]
        group: Option<Ipv4Addr>,

        /// Port inbound packets arrive on
        #[arg(long = "local-port")]
        local_port: Option<u16>,

        /// Port outbound datagrams are sent to
        #[arg(long = "dest-port")]
        dest_port: Option<u16>,

        /// Sync rate in Hz
        #[arg(short = 'r', long = "rate")]
        rate: Option<f64>,

        /// Where to write the memory layout
        #[arg(long = "layout")]
        layout: Option<PathBuf>,

        /// Skip writing the memory layout
        #[arg(long = "no-layout")]
        no_layout: bool,

        /// Stop after this many seconds
        #[arg(short = 'd', long = "duration-secs", value_name = "SECS")]
        duration_secs: Option<f64>,
    },

    /// Print or write the memory layout without running
    Layout {
        /// Dashboard file (defaults to ./dashlink.{toml,yaml,yml})
        #[arg(short = 'c', long = "config")]
        config: Option<PathBuf>,

        /// Write the layout here instead of printing it
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
    },

    /// Send one inbound packet to a dashboard (peer tool)
    Inject {
        /// Input buffer offset
        #[arg(long = "offset")]
        offset: u32,

        /// Payload as hex, e.g. "ff0000" or "ff:00:00"
        #[arg(long = "hex", default_value = "")]
        hex: String,

        /// Multicast group
        #[arg(long = "group", default_value_t = DEFAULT_GROUP)]
        group: Ipv4Addr,

        /// Dashboard local port
        #[arg(short = 'p', long = "port", default_value_t = DEFAULT_LOCAL_PORT)]
        port: u16,

        /// Multicast TTL
        #[arg(long = "ttl", default_value_t = 1)]
        ttl: u32,
    },

    /// Print outbound dashboard datagrams as hex (peer tool)
    Listen {
        /// Multicast group
        #[arg(long = "group", default_value_t = DEFAULT_GROUP)]
        group: Ipv4Addr,

        /// Dashboard destination port
        #[arg(short = 'p', long = "port", default_value_t = DEFAULT_DEST_PORT)]
        port: u16,

        /// Interface address to join on
        #[arg(long = "interface", default_value_t = Ipv4Addr::UNSPECIFIED)]
        interface: Ipv4Addr,

        /// Stop after this many datagrams
        #[arg(short = 'n', long = "count")]
        count: Option<usize>,
    },
}

fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dashlink=info,dashlink_core=info,dashlink_widgets=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    if let Err(e) = run_command(cli.command) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run_command(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Run {
            config,
            group,
            local_port,
            dest_port,
            rate,
            layout,
            no_layout,
            duration_secs,
        } => {
            let overrides = ConfigOverrides {
                group,
                local_port,
                dest_port,
                rate_hz: rate,
                layout_path: layout,
                no_layout,
            };
            let definition = commands::load_definition(config.as_deref(), &overrides)?;
            let duration = duration_secs
                .map(Duration::try_from_secs_f64)
                .transpose()
                .map_err(|e| anyhow::anyhow!("invalid --duration-secs: {}", e))?;
            commands::run::execute_run(&definition, duration)?;
            Ok(())
        }

        Commands::Layout { config, output } => {
            let definition =
                commands::load_definition(config.as_deref(), &ConfigOverrides::default())?;
            commands::layout::execute_layout(&definition, output.as_deref())?;
            Ok(())
        }

        Commands::Inject {
            offset,
            hex,
            group,
            port,
            ttl,
        } => {
            let payload = commands::inject::parse_hex(&hex)?;
            commands::inject::execute_inject(group, port, ttl, offset, &payload)?;
            Ok(())
        }

        Commands::Listen {
            group,
            port,
            interface,
            count,
        } => {
            let transport = TransportConfig {
                group,
                interface,
                ..TransportConfig::default()
            };
            let received = commands::listen::execute_listen(&transport, port, count)?;
            tracing::info!("Received {} datagrams", received);
            Ok(())
        }
    }
}
