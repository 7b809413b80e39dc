use std::collections::HashMap;
use std::sync::LazyLock;

use super::dialogue::{self, Controller};
use super::reply::Reply;
use super::session::Flow;
use super::util::{button_rows, format_signed, split_first_word, truncate};
use super::validate;
use crate::db::StorageResult;

/// An entry command: only runs while the chat is idle.
pub(crate) struct Command {
    pub(crate) description: &'static str,
    pub(crate) run: fn(&str, i64, &mut Controller) -> StorageResult<Reply>,
}

macro_rules! register_command {
    ($name:expr, $desc:expr, $func:expr, $registry:expr) => {{
        $registry.insert(
            $name,
            Command {
                description: $desc,
                run: $func,
            },
        );
    }};
}

pub(crate) static COMMANDS: LazyLock<HashMap<&str, Command>> = LazyLock::new(|| {
    let mut r: HashMap<&str, Command> = HashMap::new();

    register_command!("start", "Say hello and list commands", cmd_help, r);
    register_command!("help", "List commands", cmd_help, r);
    register_command!(
        "add",
        "Record a debt (e.g. /add Bob 15 Pizza, or /add 15 Pizza with a default friend)",
        cmd_add,
        r
    );
    register_command!("check", "Show a friend's records and total", cmd_check, r);
    register_command!("clear", "Delete all records with a friend", cmd_clear, r);
    register_command!("delete", "Delete a single record", cmd_delete, r);
    register_command!("default", "Set or remove your default friend", cmd_default, r);
    register_command!("github", "Where to find my source code", cmd_github, r);

    r
});

/// Flow-only commands. They are understood everywhere but only act in the
/// step they belong to.
pub(crate) const CANCEL: &str = "cancel";
pub(crate) const SKIP: &str = "skip";
pub(crate) const REMOVE: &str = "remove";

/// Most recent records listed by /delete; older ids are still accepted.
const DELETE_LIST_LIMIT: usize = 20;
const FRIENDS_PER_ROW: usize = 3;
const IDS_PER_ROW: usize = 4;

/// Split `/name@bot args` into a lowercase command name and its arguments.
/// Returns `None` for text that is not a command.
pub(crate) fn parse(text: &str) -> Option<(String, &str)> {
    let body = text.trim().strip_prefix('/')?;
    let (word, args) = split_first_word(body);
    let name = word.split('@').next().unwrap_or("");
    Some((name.to_lowercase(), args))
}

pub(crate) fn is_known(name: &str) -> bool {
    COMMANDS.contains_key(name) || [CANCEL, SKIP, REMOVE].contains(&name)
}

pub(crate) fn help_text() -> String {
    let mut names: Vec<&&str> = COMMANDS.keys().collect();
    names.sort();
    let mut lines = vec![
        "Hi! I keep track of how much your friends owe you.".to_string(),
        String::new(),
    ];
    for name in names {
        if let Some(cmd) = COMMANDS.get(*name) {
            lines.push(format!("/{name} - {}", cmd.description));
        }
    }
    lines.push(format!("/{CANCEL} - Stop whatever we're doing"));
    lines.push(String::new());
    lines.push("Negative amounts mean you owe them.".to_string());
    lines.join("\n")
}

/// Keyboard of known friends followed by a row of extra buttons.
pub(crate) fn friend_keyboard(friends: Vec<String>, extra: &[&str]) -> Vec<Vec<String>> {
    let mut rows = button_rows(friends, FRIENDS_PER_ROW);
    rows.push(extra.iter().map(|s| format!("/{s}")).collect());
    rows
}

// ── Command implementations ──────────────────────────────────

fn cmd_help(_args: &str, _chat: i64, _ctl: &mut Controller) -> StorageResult<Reply> {
    Ok(Reply::removing_keyboard(help_text()))
}

fn cmd_github(_args: &str, _chat: i64, ctl: &mut Controller) -> StorageResult<Reply> {
    Ok(match ctl.repo_url.as_deref() {
        Some(url) => Reply::text(format!("My source code lives at {url}")),
        None => Reply::text("No source link configured."),
    })
}

fn cmd_add(args: &str, chat: i64, ctl: &mut Controller) -> StorageResult<Reply> {
    if !args.is_empty() {
        return quick_add(args, chat, ctl);
    }
    let friends = ctl.db.list_friends(chat)?;
    ctl.sessions.set(chat, Flow::AddFriend);
    Ok(Reply::with_options(
        dialogue::ASK_FRIEND_ADD,
        friend_keyboard(friends, &[CANCEL]),
        Some("Who?"),
    ))
}

/// `/add <name> <amount> [desc]` or `/add <amount> [desc]` with a default friend.
fn quick_add(args: &str, chat: i64, ctl: &mut Controller) -> StorageResult<Reply> {
    let (first, rest) = split_first_word(args);

    if let Some(amount) = validate::parse_amount(first) {
        return match ctl.db.get_default_friend(chat)? {
            Some(pref) => ctl.save_record(chat, &pref.default_friend, amount, rest),
            None => Ok(Reply::text(dialogue::NO_DEFAULT_FRIEND)),
        };
    }

    if !validate::is_valid_name(first) {
        return Ok(Reply::text(dialogue::invalid_name(first)));
    }

    let (raw_amount, desc) = split_first_word(rest);
    if raw_amount.is_empty() {
        return Ok(Reply::text(dialogue::ADD_USAGE));
    }
    match validate::parse_amount(raw_amount) {
        Some(amount) => ctl.save_record(chat, first, amount, desc),
        None => Ok(Reply::text(dialogue::invalid_amount(raw_amount))),
    }
}

fn cmd_check(_args: &str, chat: i64, ctl: &mut Controller) -> StorageResult<Reply> {
    let friends = ctl.db.list_friends(chat)?;
    if friends.is_empty() {
        return Ok(Reply::text(dialogue::NO_RECORDS_YET));
    }
    ctl.sessions.set(chat, Flow::CheckFriend);
    Ok(Reply::with_options(
        "Check records for who?",
        friend_keyboard(friends, &[CANCEL]),
        Some("Who?"),
    ))
}

fn cmd_clear(_args: &str, chat: i64, ctl: &mut Controller) -> StorageResult<Reply> {
    let friends = ctl.db.list_friends(chat)?;
    if friends.is_empty() {
        return Ok(Reply::text(dialogue::NO_RECORDS_YET));
    }
    ctl.sessions.set(chat, Flow::ClearFriend);
    Ok(Reply::with_options(
        "Clear all records with who?",
        friend_keyboard(friends, &[CANCEL]),
        Some("Who?"),
    ))
}

fn cmd_delete(_args: &str, chat: i64, ctl: &mut Controller) -> StorageResult<Reply> {
    let recent = ctl.db.list_recent(chat)?;
    if recent.is_empty() {
        return Ok(Reply::text(dialogue::NO_RECORDS_YET));
    }

    let mut lines = vec!["Which record should I delete? Send its ID.".to_string()];
    let mut ids = Vec::new();
    for record in recent.iter().take(DELETE_LIST_LIMIT) {
        let id = record.id.unwrap_or_default();
        ids.push(format!("#{id}"));
        lines.push(
            format!(
                "#{id} {} {} {} {}",
                record.created_date(),
                record.friend,
                format_signed(record.amount),
                truncate(&record.desc, 40),
            )
            .trim_end()
            .to_string(),
        );
    }
    if recent.len() > DELETE_LIST_LIMIT {
        lines.push(format!("…and {} older", recent.len() - DELETE_LIST_LIMIT));
    }

    let mut rows = button_rows(ids, IDS_PER_ROW);
    rows.push(vec![format!("/{CANCEL}")]);
    ctl.sessions.set(chat, Flow::DeleteId);
    Ok(Reply::with_options(lines.join("\n"), rows, Some("ID?")))
}

fn cmd_default(_args: &str, chat: i64, ctl: &mut Controller) -> StorageResult<Reply> {
    let current = ctl.db.get_default_friend(chat)?;
    let friends = ctl.db.list_friends(chat)?;
    let text = match current {
        Some(pref) => format!(
            "Your default friend is {}. Who should it be instead? Send /{REMOVE} to unset it.",
            pref.default_friend
        ),
        None => "You have no default friend. Who should it be?".to_string(),
    };
    ctl.sessions.set(chat, Flow::DefaultFriend);
    Ok(Reply::with_options(
        text,
        friend_keyboard(friends, &[REMOVE, CANCEL]),
        Some("Who?"),
    ))
}
