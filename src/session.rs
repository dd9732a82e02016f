//! Conversation session and the per-turn routing sequence
//!
//! A session is the ordered message history of one active conversation. Each
//! user turn appends the user message and a pending placeholder, classifies the
//! turn, routes it, then swaps the placeholder for the final reply.
//!
//! The placeholder is tracked by a session-local entry identifier, never by its
//! text, so a model reply that happens to read `"Thinking..."` is kept.

use crate::message::Message;
use crate::prompts::PromptSet;
use crate::router::{MessageRouter, ModelKey};
use uuid::Uuid;

/// Text shown while a turn is in flight
pub const PENDING_TEXT: &str = "Thinking...";
/// Assistant greeting seeded after the identity message
pub const WELCOME_TEXT: &str = "How can I help you today?";

/// Session-local identifier of a history entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(u64);

#[derive(Debug, Clone)]
struct Entry {
    id: EntryId,
    message: Message,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("A turn is already in flight for this session")]
    TurnInFlight,

    #[error("Pending turn does not belong to this session")]
    ForeignTurn,
}

/// A turn handed to a session that did not start it
///
/// Carries the turn back so it can still be completed by its own session.
#[derive(Debug, thiserror::Error)]
#[error("Pending turn does not belong to this session")]
pub struct ForeignTurn(PendingTurn);

impl ForeignTurn {
    pub fn into_turn(self) -> PendingTurn {
        self.0
    }
}

impl From<ForeignTurn> for SessionError {
    fn from(_: ForeignTurn) -> Self {
        Self::ForeignTurn
    }
}

/// A user turn whose placeholder is in the session history
///
/// Obtained from [`ConversationSession::begin_turn`] and consumed by
/// [`ConversationSession::complete_turn`].
#[derive(Debug)]
#[must_use = "a pending turn keeps its placeholder in the session until completed"]
pub struct PendingTurn {
    session: Uuid,
    placeholder: EntryId,
    user_message: Message,
    history: Vec<Message>,
}

impl PendingTurn {
    pub fn user_message(&self) -> &Message {
        &self.user_message
    }

    /// Conversation as it was before this turn started
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Classify and route this turn, returning the assistant reply
    ///
    /// The classification call sends history + user message + query prompt to
    /// the chat model. If it fails, the reply is an `"Error: ..."` message and
    /// no routing happens. Never fails.
    pub async fn resolve(&self, router: &MessageRouter, prompts: &PromptSet) -> Message {
        let mut classification = Vec::with_capacity(self.history.len() + 2);
        classification.extend_from_slice(&self.history);
        classification.push(self.user_message.clone());
        classification.push(prompts.query().clone());

        match router.client().generate(&classification, ModelKey::Chat).await {
            Ok(label) => {
                tracing::debug!(label = %label.content.trim(), "Turn classified");
                router
                    .route(
                        &label.content,
                        &self.history,
                        &self.user_message,
                        prompts.question(),
                    )
                    .await
            }
            Err(e) => {
                tracing::error!(error = %e, "Classification call failed");
                Message::error(e)
            }
        }
    }
}

/// In-memory history of one conversation
#[derive(Debug, Clone)]
pub struct ConversationSession {
    id: Uuid,
    entries: Vec<Entry>,
    next_id: u64,
    pending: Option<EntryId>,
}

impl ConversationSession {
    /// Start a session seeded with the identity system message and the welcome message
    pub fn new(identity: &str) -> Self {
        let mut session = Self {
            id: Uuid::new_v4(),
            entries: Vec::new(),
            next_id: 0,
            pending: None,
        };
        session.push(Message::system(identity));
        session.push(Message::assistant(WELCOME_TEXT));
        session
    }

    pub fn from_prompts(prompts: &PromptSet) -> Self {
        Self::new(prompts.identity())
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    fn push(&mut self, message: Message) -> EntryId {
        let id = EntryId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry { id, message });
        id
    }

    /// All messages in order, including a pending placeholder if one exists
    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.entries.iter().map(|entry| &entry.message)
    }

    /// Messages in order, excluding any pending placeholder
    pub fn history(&self) -> Vec<Message> {
        self.entries
            .iter()
            .filter(|entry| Some(entry.id) != self.pending)
            .map(|entry| entry.message.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True while a turn's placeholder is in the history
    pub fn is_waiting(&self) -> bool {
        self.pending.is_some()
    }

    /// Append the user message and the pending placeholder
    ///
    /// # Errors
    /// Returns `SessionError::TurnInFlight` if another turn has not completed.
    pub fn begin_turn(&mut self, text: impl Into<String>) -> Result<PendingTurn, SessionError> {
        if self.pending.is_some() {
            return Err(SessionError::TurnInFlight);
        }

        let history = self.history();
        let user_message = Message::user(text);
        self.push(user_message.clone());
        let placeholder = self.push(Message::assistant(PENDING_TEXT));
        self.pending = Some(placeholder);

        Ok(PendingTurn {
            session: self.id,
            placeholder,
            user_message,
            history,
        })
    }

    /// Remove the turn's placeholder and append `reply`
    ///
    /// # Errors
    /// Returns [`ForeignTurn`] holding `turn` unchanged if another session started it.
    pub fn complete_turn(&mut self, turn: PendingTurn, reply: Message) -> Result<(), ForeignTurn> {
        if turn.session != self.id || self.pending != Some(turn.placeholder) {
            return Err(ForeignTurn(turn));
        }

        self.entries.retain(|entry| entry.id != turn.placeholder);
        self.pending = None;
        self.push(reply);
        Ok(())
    }

    /// Run one full user turn and return the reply appended to the history
    pub async fn send(
        &mut self,
        text: impl Into<String>,
        router: &MessageRouter,
        prompts: &PromptSet,
    ) -> Result<Message, SessionError> {
        let turn = self.begin_turn(text)?;
        let reply = turn.resolve(router, prompts).await;
        self.complete_turn(turn, reply.clone())?;
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Role;

    #[test]
    fn test_new_session_is_seeded() {
        let session = ConversationSession::new("You are Planet.");
        let messages: Vec<_> = session.messages().cloned().collect();
        assert_eq!(
            messages,
            vec![
                Message::system("You are Planet."),
                Message::assistant(WELCOME_TEXT)
            ]
        );
        assert!(!session.is_waiting());
    }

    #[test]
    fn test_fallback_prompts_seed_fallback_identity() {
        let session = ConversationSession::from_prompts(&PromptSet::fallback());
        let first = session.messages().next().unwrap();
        assert_eq!(first, &Message::system("You are a helpful assistant."));
    }

    #[test]
    fn test_begin_turn_appends_user_and_placeholder() {
        let mut session = ConversationSession::new("id");
        let turn = session.begin_turn("hello").unwrap();

        assert!(session.is_waiting());
        assert_eq!(session.len(), 4);
        let last = session.messages().last().unwrap();
        assert_eq!(last, &Message::assistant(PENDING_TEXT));
        assert_eq!(turn.history().len(), 2);
        assert_eq!(turn.user_message(), &Message::user("hello"));
        // The placeholder is not part of the history sent to models
        assert_eq!(session.history().len(), 3);

        session
            .complete_turn(turn, Message::assistant("hi"))
            .unwrap();
    }

    #[test]
    fn test_second_turn_rejected_while_pending() {
        let mut session = ConversationSession::new("id");
        let turn = session.begin_turn("one").unwrap();
        assert_eq!(session.begin_turn("two").unwrap_err(), SessionError::TurnInFlight);
        session.complete_turn(turn, Message::assistant("done")).unwrap();
        assert!(session.begin_turn("two").is_ok());
    }

    #[test]
    fn test_complete_turn_replaces_placeholder() {
        let mut session = ConversationSession::new("id");
        let turn = session.begin_turn("hello").unwrap();
        session
            .complete_turn(turn, Message::assistant("hi there"))
            .unwrap();

        let messages: Vec<_> = session.messages().cloned().collect();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[2], Message::user("hello"));
        assert_eq!(messages[3], Message::assistant("hi there"));
        assert!(messages.iter().all(|m| m.content != PENDING_TEXT));
    }

    #[test]
    fn test_reply_equal_to_pending_text_is_kept() {
        let mut session = ConversationSession::new("id");
        let turn = session.begin_turn("say Thinking...").unwrap();
        session
            .complete_turn(turn, Message::assistant(PENDING_TEXT))
            .unwrap();

        let last = session.messages().last().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert_eq!(last.content, PENDING_TEXT);
        assert_eq!(session.len(), 4);

        // A later turn removes only its own placeholder
        let turn = session.begin_turn("again").unwrap();
        session.complete_turn(turn, Message::assistant("ok")).unwrap();
        let pending_count = session
            .messages()
            .filter(|m| m.content == PENDING_TEXT)
            .count();
        assert_eq!(pending_count, 1);
        assert_eq!(session.len(), 6);
    }

    #[test]
    fn test_foreign_turn_rejected() {
        let mut a = ConversationSession::new("a");
        let mut b = ConversationSession::new("b");
        let turn_a = a.begin_turn("hi").unwrap();
        let turn_b = b.begin_turn("hi").unwrap();

        let rejected = b
            .complete_turn(turn_a, Message::assistant("x"))
            .unwrap_err();
        assert_eq!(
            rejected.to_string(),
            SessionError::ForeignTurn.to_string()
        );
        assert!(b.is_waiting());
        b.complete_turn(turn_b, Message::assistant("y")).unwrap();
        assert!(!b.is_waiting());

        // The rejected turn still completes on the session that started it
        assert!(a.is_waiting());
        a.complete_turn(rejected.into_turn(), Message::assistant("z"))
            .unwrap();
        assert!(!a.is_waiting());
        assert!(a.messages().all(|m| m.content != PENDING_TEXT));
        assert_eq!(a.messages().last(), Some(&Message::assistant("z")));
        assert!(a.begin_turn("next").is_ok());
    }
}
