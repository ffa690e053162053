//! Command-line entry point for the post scheduler.

use clap::{Parser, Subcommand};
use postbot::config::{self, Config};
use postbot::handlers::SCHEDULE_DATE_FORMAT;
use postbot::{run_bot, run_dispatch};
use postbot_store::ScheduleStore;

#[derive(Parser)]
#[command(
    name = "postbot",
    about = "Channel post scheduler: run the bot, dispatch due posts, inspect the schedule",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot and poll for updates
    Run {
        /// Bot token (overrides BOT_TOKEN)
        #[arg(short, long)]
        token: Option<String>,
    },
    /// Send due posts to the target channel and exit
    Dispatch {
        /// Bot token (overrides BOT_TOKEN)
        #[arg(short, long)]
        token: Option<String>,
    },
    /// Print pending posts without talking to Telegram
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { token } => {
            let config = Config::load(token)?;
            run_bot(config).await
        }
        Commands::Dispatch { token } => {
            let config = Config::load(token)?;
            run_dispatch(config).await?;
            Ok(())
        }
        Commands::Status => handle_status(),
    }
}

/// Print the schedule as a table. Needs no bot credentials, so it reads the
/// two relevant settings directly instead of going through [`Config`].
fn handle_status() -> anyhow::Result<()> {
    let schedule_file = std::env::var("SCHEDULE_FILE")
        .unwrap_or_else(|_| config::DEFAULT_SCHEDULE_FILE.to_string());
    let offset_hours: i32 = std::env::var("TIMEZONE_OFFSET_HOURS")
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(config::DEFAULT_TIMEZONE_OFFSET_HOURS);
    let tz = chrono::FixedOffset::east_opt(offset_hours * 3600)
        .ok_or_else(|| anyhow::anyhow!("TIMEZONE_OFFSET_HOURS is out of range"))?;

    let store = ScheduleStore::new(&schedule_file);
    let mut posts = store.load();
    if posts.is_empty() {
        println!("No posts scheduled (file: {})", schedule_file);
        return Ok(());
    }
    posts.sort_by_key(|post| post.dispatch_at);

    println!("Pending posts: {}", posts.len());
    println!(
        "{:<36} {:<20} {:<6} Text",
        "ID", "Scheduled (local)", "Media"
    );
    println!("{}", "-".repeat(120));
    for post in &posts {
        let when = post
            .dispatch_at
            .with_timezone(&tz)
            .format(SCHEDULE_DATE_FORMAT)
            .to_string();
        let text: String = post
            .message_text
            .replace('\n', " ")
            .chars()
            .take(60)
            .collect();
        println!(
            "{:<36} {:<20} {:<6} {}",
            post.id,
            when,
            post.media.len(),
            text
        );
    }
    Ok(())
}
