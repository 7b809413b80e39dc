use rust_decimal::Decimal;

use super::commands::{self, CANCEL, REMOVE, SKIP};
use super::reply::Reply;
use super::session::{Flow, Sessions};
use super::util::{format_amount, format_signed, truncate};
use super::validate;
use crate::db::{Database, StorageResult};
use crate::models::Record;

pub(crate) const ASK_FRIEND_ADD: &str =
    "Who owes you money? Choose below or type a new name (case insensitive)!";
pub(crate) const ADD_USAGE: &str =
    "Usage: /add <name> <amount> [description], or /add <amount> [description] once you have a default friend.";
pub(crate) const NO_DEFAULT_FRIEND: &str =
    "You don't have a default friend yet. Set one with /default, or use /add <name> <amount>.";
pub(crate) const NO_RECORDS_YET: &str = "You don't have any records yet. Start with /add.";
pub(crate) const CANCELLED: &str = "Cancelled. Nothing was changed.";
pub(crate) const NOTHING_TO_CANCEL: &str = "Nothing to cancel.";
pub(crate) const NOT_UNDERSTOOD: &str = "Sorry, I didn't understand that command.";
pub(crate) const IDLE_HINT: &str = "Send /help to see what I can do.";
pub(crate) const STORAGE_FAILURE: &str =
    "Something went wrong talking to the database. Please try again.";

/// Keeps /check and /clear replies under Telegram's 4096-character limit.
const STATEMENT_LIST_LIMIT: usize = 50;
const STATEMENT_DESC_WIDTH: usize = 40;

const CONFIRM_ROWS: [&str; 2] = ["Yes", "No"];

pub(crate) fn invalid_name(input: &str) -> String {
    format!("\"{input}\" isn't a valid name. Use a single word with letters only.")
}

pub(crate) fn invalid_amount(input: &str) -> String {
    format!("\"{input}\" isn't a valid amount. Try something like 12.50 or -3.")
}

fn confirm_keyboard() -> Vec<Vec<String>> {
    vec![CONFIRM_ROWS.iter().map(|s| s.to_string()).collect()]
}

/// Drives every chat's conversation. Storage is only touched at the points
/// where a flow needs data or completes.
pub(crate) struct Controller {
    pub(super) db: Database,
    pub(super) sessions: Sessions,
    pub(super) repo_url: Option<String>,
}

impl Controller {
    pub(crate) fn new(db: Database, repo_url: Option<String>) -> Self {
        Self {
            db,
            sessions: Sessions::new(),
            repo_url,
        }
    }

    #[cfg(test)]
    pub(crate) fn db(&self) -> &Database {
        &self.db
    }

    #[cfg(test)]
    pub(crate) fn flow(&self, chat: i64) -> Option<&Flow> {
        self.sessions.get(chat)
    }

    pub(crate) fn active_sessions(&self) -> usize {
        self.sessions.len()
    }

    /// Handle one inbound message from `chat` and produce the reply.
    /// Storage failures end the chat's flow and become a generic apology.
    pub(crate) fn handle(&mut self, chat: i64, text: &str) -> Reply {
        match self.dispatch(chat, text) {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!(chat, error = %e, "storage failure while handling message");
                self.sessions.take(chat);
                Reply::removing_keyboard(STORAGE_FAILURE)
            }
        }
    }

    fn dispatch(&mut self, chat: i64, text: &str) -> StorageResult<Reply> {
        if let Some((name, args)) = commands::parse(text) {
            return self.on_command(chat, &name, args);
        }
        match self.sessions.take(chat) {
            Some(flow) => self.on_input(chat, flow, text.trim()),
            None => Ok(Reply::text(IDLE_HINT)),
        }
    }

    fn on_command(&mut self, chat: i64, name: &str, args: &str) -> StorageResult<Reply> {
        if !commands::is_known(name) {
            return Ok(Reply::text(NOT_UNDERSTOOD));
        }

        if name == CANCEL {
            return Ok(match self.sessions.take(chat) {
                Some(flow) => {
                    tracing::info!(chat, flow = ?flow.kind(), "conversation cancelled");
                    Reply::removing_keyboard(CANCELLED)
                }
                None => Reply::text(NOTHING_TO_CANCEL),
            });
        }

        match (self.sessions.get(chat).cloned(), name) {
            (Some(Flow::AddDesc { friend, amount }), SKIP) => {
                self.sessions.take(chat);
                self.save_record(chat, &friend, amount, "")
            }
            (Some(Flow::DefaultFriend), REMOVE) => {
                self.sessions.take(chat);
                self.remove_default(chat)
            }
            (Some(flow), _) => Ok(Reply::text(format!(
                "We're still {}. Answer the question above, or send /{CANCEL} to stop.",
                flow.kind()
            ))),
            (None, SKIP) => Ok(Reply::text(format!(
                "/{SKIP} only works when I ask for a description."
            ))),
            (None, REMOVE) => Ok(Reply::text(format!(
                "/{REMOVE} only works after /default."
            ))),
            (None, _) => match commands::COMMANDS.get(name) {
                Some(cmd) => (cmd.run)(args, chat, self),
                None => Ok(Reply::text(NOT_UNDERSTOOD)),
            },
        }
    }

    /// Advance `flow` with free text. The flow has already been taken out of
    /// the session map; steps that need another answer put it back.
    fn on_input(&mut self, chat: i64, flow: Flow, input: &str) -> StorageResult<Reply> {
        match flow {
            Flow::AddFriend => {
                if !validate::is_valid_name(input) {
                    self.sessions.set(chat, Flow::AddFriend);
                    return Ok(Reply::text(invalid_name(input)));
                }
                self.sessions.set(
                    chat,
                    Flow::AddAmount {
                        friend: input.to_string(),
                    },
                );
                Ok(Reply::removing_keyboard(format!(
                    "How much does {input} owe you? Use a negative amount if you owe them."
                )))
            }
            Flow::AddAmount { friend } => match validate::parse_amount(input) {
                Some(amount) => {
                    self.sessions.set(chat, Flow::AddDesc { friend, amount });
                    Ok(Reply::with_options(
                        format!("Add a short description! (or /{SKIP})"),
                        vec![vec![format!("/{SKIP}")]],
                        Some("Skip?"),
                    ))
                }
                None => {
                    self.sessions.set(chat, Flow::AddAmount { friend });
                    Ok(Reply::text(invalid_amount(input)))
                }
            },
            Flow::AddDesc { friend, amount } => self.save_record(chat, &friend, amount, input),
            Flow::CheckFriend => {
                if !validate::is_valid_name(input) {
                    self.sessions.set(chat, Flow::CheckFriend);
                    return Ok(Reply::text(invalid_name(input)));
                }
                self.check_friend(chat, input)
            }
            Flow::ClearFriend => {
                if !validate::is_valid_name(input) {
                    self.sessions.set(chat, Flow::ClearFriend);
                    return Ok(Reply::text(invalid_name(input)));
                }
                self.preview_clear(chat, input)
            }
            Flow::ClearConfirm { friend } => {
                if !validate::is_yes(input) {
                    return Ok(Reply::removing_keyboard(CANCELLED));
                }
                let removed = self.db.clear_records(chat, &friend)?;
                tracing::info!(chat, removed, "cleared records");
                Ok(Reply::removing_keyboard(format!(
                    "Cleared {removed} record(s) with {friend}."
                )))
            }
            Flow::DeleteId => self.select_for_delete(chat, input),
            Flow::DeleteConfirm { id } => {
                if !validate::is_yes(input) {
                    return Ok(Reply::removing_keyboard(CANCELLED));
                }
                let removed = self.db.delete_record(chat, id)?;
                Ok(match removed.first() {
                    Some(record) => {
                        tracing::info!(chat, id, "deleted record");
                        Reply::removing_keyboard(format!(
                            "Deleted record #{id}: {}",
                            describe(record)
                        ))
                    }
                    None => Reply::removing_keyboard(format!("Record #{id} no longer exists.")),
                })
            }
            Flow::DefaultFriend => {
                if !validate::is_valid_name(input) {
                    self.sessions.set(chat, Flow::DefaultFriend);
                    return Ok(Reply::text(invalid_name(input)));
                }
                self.db.set_default_friend(chat, input)?;
                tracing::info!(chat, "default friend set");
                Ok(Reply::removing_keyboard(format!(
                    "Default friend set to {input}. Now /add 10 Lunch records against {input}."
                )))
            }
        }
    }

    pub(super) fn save_record(
        &mut self,
        chat: i64,
        friend: &str,
        amount: Decimal,
        desc: &str,
    ) -> StorageResult<Reply> {
        let id = self.db.add_record(chat, friend, amount, desc)?;
        tracing::info!(chat, id, "added record");
        let mut text = format!("Added record: {friend} {}", format_signed(amount));
        if !desc.is_empty() {
            text.push_str(&format!(", {desc}"));
        }
        Ok(Reply::removing_keyboard(text))
    }

    fn check_friend(&mut self, chat: i64, friend: &str) -> StorageResult<Reply> {
        let records = self.db.list_records_for_friend(chat, friend)?;
        if records.is_empty() {
            return Ok(Reply::removing_keyboard(format!(
                "No records found for {friend}."
            )));
        }
        Ok(Reply::removing_keyboard(statement(friend, &records)))
    }

    fn preview_clear(&mut self, chat: i64, friend: &str) -> StorageResult<Reply> {
        let records = self.db.list_records_for_friend(chat, friend)?;
        if records.is_empty() {
            return Ok(Reply::removing_keyboard(format!(
                "No records found for {friend}."
            )));
        }
        let text = format!(
            "{}\n\nDelete all {} of these? (Yes/No)",
            statement(friend, &records),
            records.len()
        );
        self.sessions.set(
            chat,
            Flow::ClearConfirm {
                friend: friend.to_string(),
            },
        );
        Ok(Reply::with_options(text, confirm_keyboard(), Some("Yes/No")))
    }

    fn select_for_delete(&mut self, chat: i64, input: &str) -> StorageResult<Reply> {
        let record = match validate::parse_record_id(input) {
            Some(id) => self.db.get_record_by_id(chat, id)?,
            None => None,
        };
        let Some(record) = record else {
            self.sessions.set(chat, Flow::DeleteId);
            return Ok(Reply::text(format!(
                "I couldn't find record {input}. Send one of the IDs listed above."
            )));
        };
        let id = record.id.unwrap_or_default();
        self.sessions.set(chat, Flow::DeleteConfirm { id });
        Ok(Reply::with_options(
            format!("Delete record #{id}: {}? (Yes/No)", describe(&record)),
            confirm_keyboard(),
            Some("Yes/No"),
        ))
    }

    fn remove_default(&mut self, chat: i64) -> StorageResult<Reply> {
        Ok(if self.db.delete_default_friend(chat)? {
            tracing::info!(chat, "default friend removed");
            Reply::removing_keyboard("Default friend removed.")
        } else {
            Reply::removing_keyboard("You didn't have a default friend.")
        })
    }
}

/// `Bob +$15.00 Pizza`
fn describe(record: &Record) -> String {
    format!(
        "{} {} {}",
        record.friend,
        format_signed(record.amount),
        record.desc
    )
    .trim_end()
    .to_string()
}

/// Per-record lines for one friend followed by their total. Only the newest
/// [`STATEMENT_LIST_LIMIT`] records are listed; the total covers all of them.
fn statement(friend: &str, records: &[Record]) -> String {
    let mut lines = vec![format!("Records for {friend}:")];
    let hidden = records.len().saturating_sub(STATEMENT_LIST_LIMIT);
    if hidden > 0 {
        lines.push(format!("…{hidden} older record(s) not shown"));
    }
    for record in &records[hidden..] {
        lines.push(
            format!(
                "{} {}",
                format_signed(record.amount),
                truncate(&record.desc, STATEMENT_DESC_WIDTH)
            )
            .trim_end()
            .to_string(),
        );
    }
    let total = match Record::total(records) {
        Some(total) => format_amount(total),
        None => "too large to show".to_string(),
    };
    lines.push(format!("Total: {total}"));
    lines.join("\n")
}
