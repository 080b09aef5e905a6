//! Rendering of a running turn to the terminal.
//!
//! Replies arrive as whole snapshots. When a snapshot extends what is
//! already on screen only the new tail is written; otherwise the reply is
//! printed again on a fresh line.

use std::io::{self, Stdout, Write};
use std::sync::{Mutex, PoisonError};

use murmur_core::events::Finalization;
use murmur_core::{ChatEvent, ChatEventEmitter, MessageId, MessageRole};

/// Prefix printed before assistant replies.
pub const ASSISTANT_PROMPT: &str = "assistant> ";

/// What to write to bring the screen up to date with a snapshot.
#[derive(Debug, PartialEq, Eq)]
pub enum Delta<'a> {
    /// Write this tail after what is already shown.
    Append(&'a str),
    /// The snapshot no longer extends the shown text; reprint all of it.
    Restart(&'a str),
}

/// Compare the text on screen with a new snapshot.
pub fn delta<'a>(shown: &str, snapshot: &'a str) -> Delta<'a> {
    match snapshot.strip_prefix(shown) {
        Some(tail) => Delta::Append(tail),
        None => Delta::Restart(snapshot),
    }
}

#[derive(Default)]
struct Screen {
    message: Option<MessageId>,
    shown: String,
}

/// Emitter that writes streamed replies and summaries to a terminal.
pub struct TerminalEmitter<W = Stdout> {
    inner: Mutex<(Screen, W)>,
}

impl TerminalEmitter<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalEmitter<W> {
    pub fn new(out: W) -> Self {
        Self {
            inner: Mutex::new((Screen::default(), out)),
        }
    }

    /// Consume the emitter and return its writer.
    pub fn into_inner(self) -> W {
        self.inner
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .1
    }

    fn render(&self, event: ChatEvent) -> io::Result<()> {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let (screen, out) = &mut *guard;

        match event {
            ChatEvent::MessageAppended { message, .. } if message.role == MessageRole::Assistant => {
                screen.message = Some(message.id);
                screen.shown.clear();
                write!(out, "{ASSISTANT_PROMPT}{}", message.content)?;
                screen.shown.push_str(&message.content);
            }
            ChatEvent::MessageUpdated {
                message_id,
                content,
                ..
            } if screen.message == Some(message_id) => {
                show(screen, out, &content)?;
            }
            ChatEvent::MessageFinalized {
                message_id,
                content,
                ..
            } if screen.message == Some(message_id) => {
                show(screen, out, &content)?;
                writeln!(out)?;
                screen.message = None;
                screen.shown.clear();
            }
            ChatEvent::SummaryFinalized {
                summary, outcome, ..
            } => match outcome {
                Finalization::Completed => writeln!(out, "  (summary: {summary})")?,
                Finalization::Failed => writeln!(out, "  (summary failed: {summary})")?,
                Finalization::Cancelled => {}
            },
            _ => return Ok(()),
        }
        out.flush()
    }
}

fn show(screen: &mut Screen, out: &mut impl Write, snapshot: &str) -> io::Result<()> {
    match delta(&screen.shown, snapshot) {
        Delta::Append(tail) => write!(out, "{tail}")?,
        Delta::Restart(all) => write!(out, "\n{ASSISTANT_PROMPT}{all}")?,
    }
    screen.shown.clear();
    screen.shown.push_str(snapshot);
    Ok(())
}

impl<W: Write + Send> ChatEventEmitter for TerminalEmitter<W> {
    fn emit(&self, event: ChatEvent) {
        if let Err(e) = self.render(event) {
            tracing::debug!(error = %e, "Failed to write to terminal");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use murmur_core::{ConversationId, Message};

    fn updated(conversation_id: ConversationId, message_id: MessageId, text: &str) -> ChatEvent {
        ChatEvent::MessageUpdated {
            conversation_id,
            message_id,
            content: text.to_string(),
        }
    }

    #[test]
    fn test_delta() {
        assert_eq!(delta("Hel", "Hello"), Delta::Append("lo"));
        assert_eq!(delta("", "Hi"), Delta::Append("Hi"));
        assert_eq!(delta("Hello", "Help"), Delta::Restart("Help"));
    }

    #[test]
    fn test_growing_snapshots_print_once() {
        let conv = ConversationId::new();
        let placeholder = Message::assistant_placeholder();
        let id = placeholder.id;
        let emitter = TerminalEmitter::new(Vec::new());

        emitter.emit(ChatEvent::MessageAppended {
            conversation_id: conv,
            message: placeholder,
        });
        for text in ["H", "He", "Hello"] {
            emitter.emit(updated(conv, id, text));
        }
        emitter.emit(ChatEvent::MessageFinalized {
            conversation_id: conv,
            message_id: id,
            content: "Hello".into(),
            outcome: Finalization::Completed,
        });

        let out = String::from_utf8(emitter.into_inner()).unwrap();
        assert_eq!(out, "assistant> Hello\n");
    }

    #[test]
    fn test_rewritten_snapshot_reprinted() {
        let conv = ConversationId::new();
        let placeholder = Message::assistant_placeholder();
        let id = placeholder.id;
        let emitter = TerminalEmitter::new(Vec::new());

        emitter.emit(ChatEvent::MessageAppended {
            conversation_id: conv,
            message: placeholder,
        });
        emitter.emit(updated(conv, id, "Hi"));
        emitter.emit(updated(conv, id, "Hey"));

        let out = String::from_utf8(emitter.into_inner()).unwrap();
        assert_eq!(out, "assistant> Hi\nassistant> Hey");
    }

    #[test]
    fn test_user_echo_and_foreign_messages_ignored() {
        let conv = ConversationId::new();
        let emitter = TerminalEmitter::new(Vec::new());

        emitter.emit(ChatEvent::MessageAppended {
            conversation_id: conv,
            message: Message::user("typed already"),
        });
        emitter.emit(updated(conv, MessageId::new(), "stray"));

        assert!(emitter.into_inner().is_empty());
    }

    #[test]
    fn test_summary_line() {
        let emitter = TerminalEmitter::new(Vec::new());
        emitter.emit(ChatEvent::SummaryFinalized {
            conversation_id: ConversationId::new(),
            summary: "Greetings".into(),
            outcome: Finalization::Completed,
        });

        let out = String::from_utf8(emitter.into_inner()).unwrap();
        assert_eq!(out, "  (summary: Greetings)\n");
    }
}
