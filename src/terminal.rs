//! Interactive terminal conversation
//!
//! Reads user lines from an input stream and writes the conversation to an
//! output stream, one routed turn per line. Input is only read again after the
//! previous turn completes, so at most one turn is in flight.

use crate::message::Message;
use crate::prompts::PromptSet;
use crate::router::MessageRouter;
use crate::session::{ConversationSession, PENDING_TEXT};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

const EXIT_COMMANDS: [&str; 2] = ["/quit", "/exit"];

async fn write_message<W: AsyncWrite + Unpin>(output: &mut W, message: &Message) -> std::io::Result<()> {
    output
        .write_all(format!("{}> {}\n", message.role, message.content).as_bytes())
        .await?;
    output.flush().await
}

/// Run a conversation until end of input or an exit command
///
/// Returns the final session so callers can inspect the transcript.
pub async fn run_session<R, W>(
    router: &MessageRouter,
    prompts: &PromptSet,
    input: R,
    mut output: W,
) -> std::io::Result<ConversationSession>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut session = ConversationSession::from_prompts(prompts);
    tracing::info!(session_id = %session.id(), "Conversation started");

    if let Some(welcome) = session.messages().last() {
        write_message(&mut output, welcome).await?;
    }

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        if EXIT_COMMANDS.contains(&text) {
            break;
        }

        let turn = match session.begin_turn(text) {
            Ok(turn) => turn,
            Err(e) => {
                tracing::error!(error = %e, "Could not start turn");
                continue;
            }
        };
        output.write_all(format!("{}\n", PENDING_TEXT).as_bytes()).await?;
        output.flush().await?;

        let reply = turn.resolve(router, prompts).await;
        write_message(&mut output, &reply).await?;
        if let Err(e) = session.complete_turn(turn, reply) {
            tracing::error!(error = %e, "Could not complete turn");
        }
    }

    tracing::info!(session_id = %session.id(), messages = session.len(), "Conversation ended");
    Ok(session)
}
