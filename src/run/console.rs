use anyhow::Result;
use std::io::{self, BufRead, Write};

use crate::bot::{Controller, Keyboard, Reply};

pub(crate) fn as_console(chat: i64, controller: &mut Controller) -> Result<()> {
    tracing::info!(chat, "console session started");
    println!("debtbot console (chat {chat}). Try /help; Ctrl-D quits.");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    write!(stdout, "> ")?;
    stdout.flush()?;
    for line in stdin.lock().lines() {
        let line = line?;
        if !line.trim().is_empty() {
            let reply = controller.handle(chat, &line);
            println!("{}", render(&reply));
        }
        write!(stdout, "> ")?;
        stdout.flush()?;
    }
    println!();
    Ok(())
}

/// Reply text followed by any keyboard buttons, one bracketed row per line.
pub(crate) fn render(reply: &Reply) -> String {
    let mut out = reply.text.clone();
    if let Keyboard::Options { rows, .. } = &reply.keyboard {
        for row in rows {
            out.push_str(&format!("\n  [ {} ]", row.join(" | ")));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_plain() {
        assert_eq!(render(&Reply::text("hi")), "hi");
        assert_eq!(render(&Reply::removing_keyboard("bye")), "bye");
    }

    #[test]
    fn test_render_options() {
        let reply = Reply::with_options(
            "Who?",
            vec![
                vec!["Bob".into(), "Alice".into()],
                vec!["/cancel".into()],
            ],
            Some("Who?"),
        );
        assert_eq!(render(&reply), "Who?\n  [ Bob | Alice ]\n  [ /cancel ]");
    }
}
