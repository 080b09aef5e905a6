//! Chat command handler.
//!
//! Runs an interactive loop: each line typed is sent as one turn, the
//! reply streams to the terminal and the summary follows. Ctrl+C while a
//! reply streams cancels that turn; at the prompt it clears the line.

use std::sync::Arc;

use anyhow::Result;
use murmur_core::{
    Conversation, ConversationId, ReplyOutcome, SummaryOutcome, TurnOutcome, classify,
};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::handlers::show::render_transcript;
use crate::handlers::status::report;
use crate::presentation::TerminalEmitter;

const PROMPT: &str = "you> ";

/// What a line typed at the prompt asks for.
#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Quit,
    /// Regenerate the summary without sending a message.
    RefreshSummary,
    Blank,
    Send(String),
}

/// Interpret one line of input.
pub fn interpret(line: &str) -> Input {
    match line.trim() {
        "/quit" | "/exit" => Input::Quit,
        "/summary" => Input::RefreshSummary,
        "" => Input::Blank,
        _ => Input::Send(line.to_string()),
    }
}

/// Execute the chat command.
pub async fn execute(ctx: &CliContext, id: Option<ConversationId>) -> Result<()> {
    let mut conversation = open_conversation(ctx, id).await?;

    let orchestrator = ctx.orchestrator(Arc::new(TerminalEmitter::stdout()));
    orchestrator.prewarm();

    let state = classify(&ctx.model.check_availability().await);
    if !state.is_available() {
        for line in report(&state) {
            println!("{line}");
        }
        println!();
    }

    if conversation.messages.is_empty() {
        println!("Conversation {}", conversation.id);
    } else {
        print!("{}", render_transcript(&conversation));
    }
    println!("Type /quit to exit, /summary to refresh the summary. Ctrl+C cancels a reply.");
    println!();

    let mut editor = DefaultEditor::new().map_err(|e| CliError::Io(e.to_string()))?;
    loop {
        let line = match tokio::task::block_in_place(|| editor.readline(PROMPT)) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(CliError::Io(e.to_string()).into()),
        };

        match interpret(&line) {
            Input::Quit => break,
            Input::Blank => continue,
            Input::RefreshSummary => {
                let outcome = orchestrator
                    .refresh_summary(&mut conversation)
                    .await
                    .map_err(CliError::from)?;
                if outcome == SummaryOutcome::Declined {
                    println!("(the model is not available; summary unchanged)");
                }
            }
            Input::Send(text) => {
                let _ = editor.add_history_entry(text.as_str());
                let cancel = CancellationToken::new();
                let turn = orchestrator.run_turn_with_cancel(&mut conversation, text, &cancel);
                tokio::pin!(turn);

                let outcome = tokio::select! {
                    outcome = &mut turn => outcome,
                    Ok(()) = signal::ctrl_c() => {
                        debug!("Ctrl+C received, cancelling turn");
                        cancel.cancel();
                        turn.await
                    }
                }
                .map_err(CliError::from)?;

                if let Some(note) = outcome_note(&outcome) {
                    println!("{note}");
                }
            }
        }
    }

    println!("Bye. Resume with `murmur chat {}`.", conversation.id);
    Ok(())
}

async fn open_conversation(ctx: &CliContext, id: Option<ConversationId>) -> Result<Conversation> {
    let conversation = match id {
        Some(id) => ctx.conversations.require_conversation(id).await,
        None => ctx.conversations.create_conversation().await,
    };
    Ok(conversation.map_err(CliError::from)?)
}

/// Extra line printed after a turn, for outcomes the stream did not show.
pub fn outcome_note(outcome: &TurnOutcome) -> Option<&'static str> {
    match outcome.reply {
        ReplyOutcome::Declined => Some("(no reply: the model is not available right now)"),
        ReplyOutcome::Cancelled { .. } => Some("(reply cancelled; summary not updated)"),
        ReplyOutcome::Completed { .. } | ReplyOutcome::Failed { .. } => None,
    }
}
