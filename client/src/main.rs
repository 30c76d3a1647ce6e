use clap::Parser;
use client::network::Client;
use log::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short = 's', long, default_value = "127.0.0.1:8000")]
    server: String,

    /// Display name to bid under
    #[arg(short = 'n', long, default_value = "")]
    name: String,

    /// Auction code to join
    #[arg(short = 'a', long, default_value = "")]
    auction: String,

    /// Connect as the monitor and mirror all auction activity
    #[arg(short = 'm', long)]
    monitor: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    let client = Client::connect(&args.server).await?;

    if args.monitor {
        info!("Registering as monitor");
        client.run_monitor().await
    } else {
        if args.name.is_empty() || args.auction.is_empty() {
            return Err("--name and --auction are required unless --monitor is set".into());
        }
        info!("Joining auction {} as {}", args.auction, args.name);
        client.run_bidder(&args.name, &args.auction).await
    }
}
