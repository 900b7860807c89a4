use clap::Parser;
use mintwatch::config::load_config;
use mintwatch::engine::Mintwatch;
use mintwatch::handler::telegram::sender::TelegramNotifier;
use mintwatch::handler::telegram::Notification;

#[derive(Parser, Debug)]
#[command(
    name = "mintwatch",
    about = "Watches a Solana wallet for new token mints and alerts a Telegram chat"
)]
struct Cli {
    /// Optional TOML config file; environment variables override it
    #[arg(short, long, default_value = "Config.toml")]
    config: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = Mintwatch::run(&cli.config).await {
        eprintln!("mintwatch failed: {e:#}");

        // Best-effort crash alert. Configuration failures have no usable
        // chat to report to, so load_config failing here just skips it.
        if let Ok(config) = load_config(&cli.config) {
            let _ = TelegramNotifier::send_now(
                &config.telegram,
                Notification::Error { text: format!("{e:#}") },
            )
            .await;
        }

        std::process::exit(1);
    }
}
