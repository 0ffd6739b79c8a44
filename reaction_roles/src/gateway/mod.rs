//! The chat-platform side of role assignment.
//!
//! [`GuildGateway`] is implemented by the platform client. Member retrieval and
//! role changes are independent asynchronous requests that may fail on their own.

use role_mappings::{GuildId, RoleId, UserId};

/// A guild member, as retrieved from the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub guild: GuildId,
    pub user: UserId,
    pub display_name: String,
}

impl Member {
    pub fn new(guild: GuildId, user: UserId, display_name: impl Into<String>) -> Self {
        Self {
            guild,
            user,
            display_name: display_name.into(),
        }
    }
}

/// Failures reported by the platform.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GatewayError {
    #[error("Member {user} not found in guild {guild}")]
    MemberNotFound { guild: GuildId, user: UserId },

    #[error("Request failed: {0}")]
    Request(String),
}

/// Membership operations the reaction handler drives.
#[async_trait::async_trait]
pub trait GuildGateway: Send + Sync {
    /// Check the platform's cache for a role. Must not block.
    fn role_exists(&self, guild: GuildId, role: RoleId) -> bool;

    async fn fetch_member(&self, guild: GuildId, user: UserId) -> Result<Member, GatewayError>;

    async fn add_member_role(&self, member: &Member, role: RoleId) -> Result<(), GatewayError>;

    async fn remove_member_role(&self, member: &Member, role: RoleId) -> Result<(), GatewayError>;
}
