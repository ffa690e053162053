//! App config: bot identity, operator, target channel, schedule file,
//! operator timezone. Loaded from env.

use anyhow::Result;
use chrono::FixedOffset;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_SCHEDULE_FILE: &str = "schedule.json";
pub const DEFAULT_LOG_FILE: &str = "logs/postbot.log";
/// Offset the operator types schedule times in when TIMEZONE_OFFSET_HOURS is unset.
pub const DEFAULT_TIMEZONE_OFFSET_HOURS: i32 = 3;

/// Application config.
///
/// `target_chat_id` stays optional at load time: the bot can run without it
/// (that is how the operator discovers the channel id via forwarded
/// messages), while the dispatch subcommand insists on it.
#[derive(Debug, Clone)]
pub struct Config {
    /// BOT_TOKEN
    pub bot_token: String,
    /// ADMIN_ID: the single operator allowed to drive the bot
    pub admin_id: i64,
    /// TARGET_CHAT_ID: delivery channel for dispatched posts
    pub target_chat_id: Option<i64>,
    /// SCHEDULE_FILE
    pub schedule_file: PathBuf,
    /// TIMEZONE_OFFSET_HOURS: fixed offset operator input is typed in and
    /// status times are shown in
    pub timezone_offset: FixedOffset,
    /// TELEGRAM_API_URL or TELOXIDE_API_URL
    pub telegram_api_url: Option<String>,
    /// LOG_FILE
    pub log_file: String,
}

impl Config {
    /// Load from environment variables. `token` overrides BOT_TOKEN if provided.
    pub fn load(token: Option<String>) -> Result<Self> {
        let bot_token = match token {
            Some(token) => token,
            None => env::var("BOT_TOKEN").map_err(|_| anyhow::anyhow!("BOT_TOKEN not set"))?,
        };
        let admin_id = env::var("ADMIN_ID")
            .map_err(|_| anyhow::anyhow!("ADMIN_ID not set"))?
            .parse::<i64>()
            .map_err(|_| anyhow::anyhow!("ADMIN_ID must be a numeric Telegram user id"))?;
        let target_chat_id = match env::var("TARGET_CHAT_ID") {
            Ok(raw) => Some(raw.parse::<i64>().map_err(|_| {
                anyhow::anyhow!("TARGET_CHAT_ID must be a numeric Telegram chat id")
            })?),
            Err(_) => None,
        };
        let schedule_file = env::var("SCHEDULE_FILE")
            .unwrap_or_else(|_| DEFAULT_SCHEDULE_FILE.to_string())
            .into();
        let offset_hours: i32 = env::var("TIMEZONE_OFFSET_HOURS")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(DEFAULT_TIMEZONE_OFFSET_HOURS);
        let timezone_offset = FixedOffset::east_opt(offset_hours * 3600)
            .ok_or_else(|| anyhow::anyhow!("TIMEZONE_OFFSET_HOURS is out of range"))?;
        let telegram_api_url = env::var("TELEGRAM_API_URL")
            .or_else(|_| env::var("TELOXIDE_API_URL"))
            .ok();
        let log_file = env::var("LOG_FILE").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());

        Ok(Self {
            bot_token,
            admin_id,
            target_chat_id,
            schedule_file,
            timezone_offset,
            telegram_api_url,
            log_file,
        })
    }

    /// Validate config (e.g. telegram_api_url must be a valid URL if set).
    pub fn validate(&self) -> Result<()> {
        if self.bot_token.trim().is_empty() {
            anyhow::bail!("BOT_TOKEN is empty");
        }
        if let Some(ref url_str) = self.telegram_api_url {
            if reqwest::Url::parse(url_str).is_err() {
                anyhow::bail!(
                    "TELEGRAM_API_URL (or TELOXIDE_API_URL) is set but not a valid URL: {}",
                    url_str
                );
            }
        }
        Ok(())
    }

    /// The delivery channel id; the dispatch subcommand cannot run without it.
    pub fn require_target_chat(&self) -> Result<i64> {
        self.target_chat_id
            .ok_or_else(|| anyhow::anyhow!("TARGET_CHAT_ID not set"))
    }
}
