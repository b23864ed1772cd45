use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use duet::client::{
    ChatEntry, ChatOrigin, ClientConfig, DuetClient, MediaConstraints, SessionUpdate,
};
use duet::model::IceServerConfig;
use duet::server::{ServerConfig, TurnConfig, serve};
use duet::utils::default_ice_servers;
use std::fs;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cargo-duet")]
#[command(bin_name = "cargo-duet")]
enum Cli {
    Duet(DuetArgs),
}

#[derive(clap::Args)]
struct DuetArgs {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the signaling relay.
    Serve {
        #[arg(short, long, default_value = "0.0.0.0:3000")]
        listen: SocketAddr,

        /// STUN server URL advertised to clients; repeatable.
        #[arg(long)]
        stun: Vec<String>,

        /// External TURN server advertised to clients.
        #[arg(long, env = "TURN_URL")]
        turn_url: Option<String>,

        #[arg(long, env = "TURN_USERNAME")]
        turn_username: Option<String>,

        #[arg(long, env = "TURN_CREDENTIAL")]
        turn_credential: Option<String>,

        /// Host a TURN server next to the relay, using the TURN credentials above.
        #[arg(long)]
        embedded_turn: bool,

        #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
        turn_public_ip: IpAddr,

        #[arg(long, default_value_t = 3478)]
        turn_port: u16,

        #[arg(long, default_value = "duet")]
        turn_realm: String,
    },
    /// Join a room and chat; lines from stdin are sent as chat messages.
    Join {
        #[arg(short, long, default_value = "ws://127.0.0.1:3000/ws")]
        server: String,

        #[arg(short, long)]
        room: String,

        #[arg(short, long)]
        name: Option<String>,

        #[arg(long)]
        audio_only: bool,
    },
}

fn main() -> Result<()> {
    let Cli::Duet(args) = Cli::parse();
    init_tracing();

    let runtime = tokio::runtime::Runtime::new().context("Failed to start tokio runtime")?;

    match args.command {
        Commands::Serve {
            listen,
            stun,
            turn_url,
            turn_username,
            turn_credential,
            embedded_turn,
            turn_public_ip,
            turn_port,
            turn_realm,
        } => {
            let mut ice_servers: Vec<IceServerConfig> =
                stun.into_iter().map(IceServerConfig::stun).collect();
            if ice_servers.is_empty() {
                ice_servers = default_ice_servers();
            }
            if let Some(url) = turn_url {
                ice_servers.push(IceServerConfig {
                    urls: vec![url],
                    username: turn_username.clone(),
                    credential: turn_credential.clone(),
                });
            }

            let turn = embedded_turn.then(|| {
                let defaults = TurnConfig::default();
                TurnConfig {
                    public_ip: turn_public_ip,
                    port: turn_port,
                    realm: turn_realm,
                    username: turn_username.unwrap_or(defaults.username),
                    password: turn_credential.unwrap_or(defaults.password),
                }
            });

            println!("{}", "📡 Starting Duet relay...".green().bold());
            let config = ServerConfig {
                listen_addr: listen,
                ice_servers,
                turn,
            };
            runtime.block_on(serve(config))?;
        }
        Commands::Join {
            server,
            room,
            name,
            audio_only,
        } => {
            let mut config = ClientConfig::new(server, room);
            config.display_name = name;
            config.constraints = MediaConstraints {
                audio: true,
                video: !audio_only,
            };
            runtime.block_on(run_call(config))?;
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter_layer =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter_layer)
        .with_target(false)
        .init();
}

async fn run_call(config: ClientConfig) -> Result<()> {
    println!(
        "{} {}",
        "📞 Joining room".green().bold(),
        config.room_id.to_string().bold()
    );
    println!(
        "{}",
        "   type to chat, '/image <path>' to send a picture, '/quit' to hang up".dimmed()
    );

    let mut client = DuetClient::connect(config)
        .await
        .context("Failed to join room")?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            update = client.next_update() => match update {
                Some(update) => print_update(&update),
                None => break,
            },
            line = lines.next_line(), if stdin_open => match line.context("Failed to read stdin")? {
                Some(line) => handle_line(&client, line.trim())?,
                None => {
                    stdin_open = false;
                    client.hangup();
                }
            },
        }
    }

    info!("Call ended");
    Ok(())
}

fn handle_line(client: &DuetClient, line: &str) -> Result<()> {
    if line == "/quit" {
        client.hangup();
    } else if let Some(path) = line.strip_prefix("/image ") {
        let bytes = fs::read(path.trim()).with_context(|| format!("Failed to read {}", path))?;
        client.send_image(&bytes);
    } else if !line.is_empty() {
        client.send_chat(Some(line.to_owned()), None);
    }
    Ok(())
}

fn print_update(update: &SessionUpdate) {
    match update {
        SessionUpdate::StateChanged(state) => {
            println!("{} {}", "●".cyan(), state.to_string().cyan())
        }
        SessionUpdate::RemoteMediaAvailable { kind } => {
            println!("{} remote {} started", "▶".green(), kind)
        }
        SessionUpdate::RemoteMediaCleared => println!("{}", "■ remote media gone".yellow()),
        SessionUpdate::Chat(entry) => print_chat(entry),
        SessionUpdate::Error(e) => println!("{} {}", "✖".red().bold(), e.to_string().red()),
    }
}

fn print_chat(entry: &ChatEntry) {
    let who = match entry.origin {
        ChatOrigin::Local => "you".bold(),
        ChatOrigin::Remote => entry.message.from.magenta().bold(),
    };

    if let Some(text) = &entry.message.text {
        println!("{}: {}", who, text);
    }
    match entry.message.image_bytes() {
        Ok(Some(bytes)) => {
            let note = format!("[image, {} bytes]", bytes.len());
            println!("{}: {}", who, note.dimmed())
        }
        Ok(None) => {}
        Err(e) => println!("{}: {}", who, format!("[broken image: {}]", e).red()),
    }
}
