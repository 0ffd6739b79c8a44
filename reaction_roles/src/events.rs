//! Reaction notifications delivered by the chat platform's event stream.

use role_mappings::{GuildId, MessageId, UserId};

/// Whether a reaction was attached or detached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReactionKind {
    Added,
    Removed,
}

/// A member reacted to, or un-reacted from, a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReactionEvent {
    pub kind: ReactionKind,
    /// `None` when the message is outside any guild (direct messages).
    pub guild: Option<GuildId>,
    pub message: MessageId,
    /// The reacting user.
    pub user: UserId,
}

impl ReactionEvent {
    /// A reaction was added to `message`.
    pub fn added(guild: Option<GuildId>, message: MessageId, user: UserId) -> Self {
        Self {
            kind: ReactionKind::Added,
            guild,
            message,
            user,
        }
    }

    /// A reaction was removed from `message`.
    pub fn removed(guild: Option<GuildId>, message: MessageId, user: UserId) -> Self {
        Self {
            kind: ReactionKind::Removed,
            guild,
            message,
            user,
        }
    }
}
