//! Telegram Bot API transport: long-polls `getUpdates` and answers each text
//! message through the dialogue controller.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::bot::{Controller, Keyboard, Reply};

const API_BASE: &str = "https://api.telegram.org";
const RETRY_DELAY: Duration = Duration::from_secs(5);
/// Headroom on top of the long-poll timeout before the HTTP read gives up.
const READ_SLACK: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Update {
    pub(crate) update_id: i64,
    pub(crate) message: Option<Message>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Message {
    pub(crate) chat: Chat,
    pub(crate) text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Chat {
    pub(crate) id: i64,
}

#[derive(Debug, Deserialize)]
struct User {
    username: Option<String>,
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<ReplyMarkup<'a>>,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(untagged)]
enum ReplyMarkup<'a> {
    Keyboard {
        keyboard: Vec<Vec<KeyboardButton<'a>>>,
        one_time_keyboard: bool,
        resize_keyboard: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        input_field_placeholder: Option<&'a str>,
    },
    Remove {
        remove_keyboard: bool,
    },
}

#[derive(Debug, Serialize, PartialEq)]
struct KeyboardButton<'a> {
    text: &'a str,
}

impl<'a> ReplyMarkup<'a> {
    fn from_keyboard(keyboard: &'a Keyboard) -> Option<Self> {
        match keyboard {
            Keyboard::Keep => None,
            Keyboard::Remove => Some(Self::Remove {
                remove_keyboard: true,
            }),
            Keyboard::Options { rows, placeholder } => Some(Self::Keyboard {
                keyboard: rows
                    .iter()
                    .map(|row| {
                        row.iter()
                            .map(|text| KeyboardButton {
                                text: text.as_str(),
                            })
                            .collect()
                    })
                    .collect(),
                one_time_keyboard: true,
                resize_keyboard: true,
                input_field_placeholder: placeholder.as_deref(),
            }),
        }
    }
}

pub(crate) struct TelegramClient {
    agent: ureq::Agent,
    token: String,
    poll_timeout_secs: u64,
}

impl TelegramClient {
    pub(crate) fn new(token: &str, poll_timeout_secs: u64) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(10))
            .timeout_read(Duration::from_secs(poll_timeout_secs) + READ_SLACK)
            .build();
        Self {
            agent,
            token: token.to_string(),
            poll_timeout_secs,
        }
    }

    fn url(&self, method: &str) -> String {
        format!("{API_BASE}/bot{}/{method}", self.token)
    }

    /// Request URLs embed the token; keep it out of error messages and logs.
    fn redact(&self, err: impl std::fmt::Display) -> anyhow::Error {
        anyhow::anyhow!("{}", err.to_string().replace(&self.token, "<token>"))
    }

    fn unwrap_response<T>(&self, method: &str, response: ApiResponse<T>) -> Result<T> {
        match (response.ok, response.result) {
            (true, Some(result)) => Ok(result),
            _ => anyhow::bail!(
                "{method} rejected: {}",
                response.description.unwrap_or_else(|| "no description".into())
            ),
        }
    }

    fn get_me(&self) -> Result<User> {
        let response: ApiResponse<User> = self
            .agent
            .get(&self.url("getMe"))
            .call()
            .map_err(|e| self.redact(e))?
            .into_json()?;
        self.unwrap_response("getMe", response)
    }

    pub(crate) fn get_updates(&self, offset: i64) -> Result<Vec<Update>> {
        let response: ApiResponse<Vec<Update>> = self
            .agent
            .get(&self.url("getUpdates"))
            .query("offset", &offset.to_string())
            .query("timeout", &self.poll_timeout_secs.to_string())
            .query("allowed_updates", r#"["message"]"#)
            .call()
            .map_err(|e| self.redact(e))?
            .into_json()?;
        self.unwrap_response("getUpdates", response)
    }

    pub(crate) fn send_message(&self, chat: i64, reply: &Reply) -> Result<()> {
        let body = SendMessage {
            chat_id: chat,
            text: &reply.text,
            reply_markup: ReplyMarkup::from_keyboard(&reply.keyboard),
        };
        let response: ApiResponse<serde_json::Value> = self
            .agent
            .post(&self.url("sendMessage"))
            .send_json(&body)
            .map_err(|e| self.redact(e))?
            .into_json()?;
        self.unwrap_response("sendMessage", response)?;
        Ok(())
    }
}

/// Poll forever, handling updates in the order Telegram delivers them.
pub(crate) fn as_telegram(client: &TelegramClient, controller: &mut Controller) -> Result<()> {
    let me = client.get_me()?;
    tracing::info!(
        bot = me.username.as_deref().unwrap_or("?"),
        timeout = client.poll_timeout_secs,
        "polling for updates"
    );

    let mut offset = 0;
    loop {
        let updates = match client.get_updates(offset) {
            Ok(updates) => updates,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "getUpdates failed, retrying in {}s",
                    RETRY_DELAY.as_secs()
                );
                std::thread::sleep(RETRY_DELAY);
                continue;
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);
            let Some((chat, text)) = text_message(update) else {
                continue;
            };
            let reply = controller.handle(chat, &text);
            if let Err(e) = client.send_message(chat, &reply) {
                tracing::warn!(chat, error = %e, "sendMessage failed");
            }
        }
        tracing::debug!(sessions = controller.active_sessions(), offset, "poll done");
    }
}

/// The chat and text of an update, if it is a text message.
fn text_message(update: Update) -> Option<(i64, String)> {
    let message = update.message?;
    Some((message.chat.id, message.text?))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_parse_updates() {
        let json = r#"{
            "ok": true,
            "result": [
                {"update_id": 10, "message": {"message_id": 1, "chat": {"id": 42, "type": "private"}, "text": "/add Bob 15"}},
                {"update_id": 11, "message": {"message_id": 2, "chat": {"id": 42, "type": "private"}, "sticker": {}}},
                {"update_id": 12, "edited_message": {"message_id": 1, "chat": {"id": 42}}}
            ]
        }"#;
        let response: ApiResponse<Vec<Update>> = serde_json::from_str(json).unwrap();
        assert!(response.ok);
        let updates = response.result.unwrap();
        assert_eq!(updates.len(), 3);

        let messages: Vec<_> = updates.into_iter().filter_map(text_message).collect();
        assert_eq!(messages, vec![(42, "/add Bob 15".to_string())]);
    }

    #[test]
    fn test_error_response() {
        let json = r#"{"ok": false, "error_code": 401, "description": "Unauthorized"}"#;
        let response: ApiResponse<Vec<Update>> = serde_json::from_str(json).unwrap();
        let client = TelegramClient::new("123:secret", 30);
        let err = client.unwrap_response("getUpdates", response).unwrap_err();
        assert_eq!(err.to_string(), "getUpdates rejected: Unauthorized");
    }

    #[test]
    fn test_redact_hides_token() {
        let client = TelegramClient::new("123:secret", 30);
        let err = client.redact(format!("{}: status code 404", client.url("getMe")));
        assert!(!err.to_string().contains("secret"));
        assert!(err.to_string().contains("<token>"));
    }

    #[test]
    fn test_markup_keep_is_omitted() {
        let reply = Reply::text("hi");
        let body = SendMessage {
            chat_id: 1,
            text: &reply.text,
            reply_markup: ReplyMarkup::from_keyboard(&reply.keyboard),
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value, serde_json::json!({"chat_id": 1, "text": "hi"}));
    }

    #[test]
    fn test_markup_remove() {
        let value = serde_json::to_value(ReplyMarkup::from_keyboard(&Keyboard::Remove)).unwrap();
        assert_eq!(value, serde_json::json!({"remove_keyboard": true}));
    }

    #[test]
    fn test_markup_options() {
        let keyboard = Keyboard::Options {
            rows: vec![vec!["Bob".into(), "Alice".into()], vec!["/cancel".into()]],
            placeholder: Some("Who?".into()),
        };
        let value = serde_json::to_value(ReplyMarkup::from_keyboard(&keyboard)).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "keyboard": [[{"text": "Bob"}, {"text": "Alice"}], [{"text": "/cancel"}]],
                "one_time_keyboard": true,
                "resize_keyboard": true,
                "input_field_placeholder": "Who?"
            })
        );
    }
}
