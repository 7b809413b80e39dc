use anyhow::Result;

use super::{console, telegram};
use crate::bot::Controller;
use crate::config::Config;

/// Chat id the console pretends to be when `--chat` is not given.
const CONSOLE_CHAT: i64 = 1;

pub(crate) fn as_cli(args: &[String], config: &Config, controller: &mut Controller) -> Result<()> {
    match args.get(1).map(String::as_str) {
        None | Some("poll") => {
            let token = config.require_token()?;
            let client = telegram::TelegramClient::new(token, config.poll_timeout_secs);
            telegram::as_telegram(&client, controller)
        }
        Some("console") => {
            let chat = parse_chat_flag(&args[2..])?;
            console::as_console(chat, controller)
        }
        Some(other) => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

pub(crate) fn print_usage() {
    println!("debtbot - keep track of what your friends owe you");
    println!();
    println!("Usage: debtbot [command]");
    println!();
    println!("Commands:");
    println!("  (none), poll                  Run the Telegram bot (long polling)");
    println!("  console                       Chat with the bot on stdin/stdout");
    println!("    --chat <id>                 Chat id to act as (default: {CONSOLE_CHAT})");
    println!("  --help, -h                    Show this help");
    println!("  --version, -V                 Show version");
    println!();
    println!("Environment:");
    println!("  DEBTBOT_TOKEN                 Telegram bot token (or TELEGRAM_BOT_TOKEN)");
    println!("  DEBTBOT_DB                    Database file (default: platform data dir)");
    println!("  DEBTBOT_POLL_TIMEOUT          Long-poll timeout in seconds (default: 30)");
    println!("  DEBTBOT_REPO_URL              Link shown by /github");
    println!("  RUST_LOG                      Log filter (default: info)");
}

fn parse_chat_flag(args: &[String]) -> Result<i64> {
    match args.windows(2).find(|w| w[0] == "--chat") {
        Some(w) => w[1]
            .parse()
            .map_err(|_| anyhow::anyhow!("--chat expects a numeric id, got {:?}", w[1])),
        None if args.iter().any(|a| a == "--chat") => {
            anyhow::bail!("Usage: debtbot console [--chat <id>]")
        }
        None => Ok(CONSOLE_CHAT),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_chat_flag_default() {
        assert_eq!(parse_chat_flag(&args(&[])).unwrap(), CONSOLE_CHAT);
    }

    #[test]
    fn test_chat_flag_value() {
        assert_eq!(parse_chat_flag(&args(&["--chat", "-100123"])).unwrap(), -100123);
    }

    #[test]
    fn test_chat_flag_invalid() {
        assert!(parse_chat_flag(&args(&["--chat", "me"])).is_err());
        assert!(parse_chat_flag(&args(&["--chat"])).is_err());
    }
}
