//! Reaction handler - turns reaction notifications into role grants and revokes.
//!
//! The flow for every notification:
//! 1. **Scope**: Ignore reactions outside a guild
//! 2. **Lookup**: Find the role mapped to the message (read-only)
//! 3. **Check**: Confirm the role still exists in the guild
//! 4. **Dispatch**: Spawn a task that fetches the member and grants or revokes
//!
//! Dispatch is fire-and-forget. The handler never waits on the platform and
//! never retries; failures are logged from the spawned task.

use std::sync::Arc;

use role_mappings::{GuildId, MappingStore, MessageId, RoleId, UserId};
use tokio::runtime::Handle;
use tracing::{debug, warn};

use crate::events::{ReactionEvent, ReactionKind};
use crate::gateway::GuildGateway;

/// What the handler decided for one notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionOutcome {
    /// The reaction was not on a guild message.
    NotInGuild,
    /// No role is mapped to the message.
    Unmapped,
    /// The mapped role no longer exists in the guild.
    RoleMissing(RoleId),
    /// A grant was dispatched.
    Granting(RoleId),
    /// A revoke was dispatched.
    Revoking(RoleId),
    /// The role change could not be dispatched: no Tokio runtime was reachable.
    NoRuntime(RoleId),
}

impl ReactionOutcome {
    /// Check whether a role change was dispatched.
    pub fn is_dispatched(&self) -> bool {
        matches!(self, ReactionOutcome::Granting(_) | ReactionOutcome::Revoking(_))
    }
}

/// Consults the mapping store for each reaction and drives the gateway.
pub struct ReactionHandler<G> {
    store: Arc<MappingStore>,
    gateway: Arc<G>,
    /// Runtime used when a notification arrives on a thread outside Tokio.
    runtime: Option<Handle>,
}

impl<G> Clone for ReactionHandler<G> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            gateway: Arc::clone(&self.gateway),
            runtime: self.runtime.clone(),
        }
    }
}

impl<G: GuildGateway + 'static> ReactionHandler<G> {
    /// Create a handler, capturing the current Tokio runtime if there is one.
    pub fn new(store: Arc<MappingStore>, gateway: Arc<G>) -> Self {
        Self {
            store,
            gateway,
            runtime: Handle::try_current().ok(),
        }
    }

    /// Builder method to dispatch role changes on `runtime` when the caller is
    /// not running inside one.
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Handle one reaction notification.
    ///
    /// Safe to call from any thread. Role changes run on the caller's Tokio
    /// runtime, or on the captured one when the caller has none.
    pub fn handle(&self, event: &ReactionEvent) -> ReactionOutcome {
        let Some(guild) = event.guild else {
            return ReactionOutcome::NotInGuild;
        };
        let Some(role) = self.store.get_mapping(guild, event.message) else {
            return ReactionOutcome::Unmapped;
        };
        if !self.gateway.role_exists(guild, role) {
            debug!(%guild, message = %event.message, %role, "Mapped role no longer exists");
            return ReactionOutcome::RoleMissing(role);
        }

        let Some(runtime) = Handle::try_current().ok().or_else(|| self.runtime.clone()) else {
            warn!(
                %guild,
                message = %event.message,
                %role,
                "No Tokio runtime available, role change skipped"
            );
            return ReactionOutcome::NoRuntime(role);
        };

        debug!(
            %guild,
            message = %event.message,
            user = %event.user,
            %role,
            kind = ?event.kind,
            "Dispatching role change"
        );
        let gateway = Arc::clone(&self.gateway);
        let (kind, user) = (event.kind, event.user);
        runtime.spawn(async move {
            apply_role(gateway.as_ref(), kind, guild, user, role).await;
        });

        match kind {
            ReactionKind::Added => ReactionOutcome::Granting(role),
            ReactionKind::Removed => ReactionOutcome::Revoking(role),
        }
    }

    pub fn on_reaction_add(
        &self,
        guild: Option<GuildId>,
        message: MessageId,
        user: UserId,
    ) -> ReactionOutcome {
        self.handle(&ReactionEvent::added(guild, message, user))
    }

    pub fn on_reaction_remove(
        &self,
        guild: Option<GuildId>,
        message: MessageId,
        user: UserId,
    ) -> ReactionOutcome {
        self.handle(&ReactionEvent::removed(guild, message, user))
    }
}

async fn apply_role<G: GuildGateway + ?Sized>(
    gateway: &G,
    kind: ReactionKind,
    guild: GuildId,
    user: UserId,
    role: RoleId,
) {
    let member = match gateway.fetch_member(guild, user).await {
        Ok(member) => member,
        Err(err) => {
            warn!(%guild, %user, %role, error = %err, "Could not retrieve reacting member");
            return;
        }
    };

    let result = match kind {
        ReactionKind::Added => gateway.add_member_role(&member, role).await,
        ReactionKind::Removed => gateway.remove_member_role(&member, role).await,
    };
    if let Err(err) = result {
        warn!(%guild, %user, %role, kind = ?kind, error = %err, "Role change failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{GatewayError, Member};
    use std::collections::HashSet;
    use std::time::Duration;
    use tokio::sync::mpsc;

    #[derive(Debug, PartialEq, Eq)]
    enum Call {
        Grant(UserId, RoleId),
        Revoke(UserId, RoleId),
    }

    struct RecordingGateway {
        roles: HashSet<(GuildId, RoleId)>,
        members: HashSet<UserId>,
        calls: mpsc::UnboundedSender<Call>,
    }

    #[async_trait::async_trait]
    impl GuildGateway for RecordingGateway {
        fn role_exists(&self, guild: GuildId, role: RoleId) -> bool {
            self.roles.contains(&(guild, role))
        }

        async fn fetch_member(&self, guild: GuildId, user: UserId) -> Result<Member, GatewayError> {
            if self.members.contains(&user) {
                Ok(Member::new(guild, user, format!("user-{user}")))
            } else {
                Err(GatewayError::MemberNotFound { guild, user })
            }
        }

        async fn add_member_role(&self, member: &Member, role: RoleId) -> Result<(), GatewayError> {
            let _ = self.calls.send(Call::Grant(member.user, role));
            Ok(())
        }

        async fn remove_member_role(
            &self,
            member: &Member,
            role: RoleId,
        ) -> Result<(), GatewayError> {
            let _ = self.calls.send(Call::Revoke(member.user, role));
            Ok(())
        }
    }

    fn setup() -> (
        Arc<MappingStore>,
        ReactionHandler<RecordingGateway>,
        mpsc::UnboundedReceiver<Call>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        let gateway = RecordingGateway {
            roles: [(GuildId(100), RoleId(300))].into_iter().collect(),
            members: [UserId(1)].into_iter().collect(),
            calls: tx,
        };
        let store = Arc::new(MappingStore::new());
        let handler = ReactionHandler::new(Arc::clone(&store), Arc::new(gateway));
        (store, handler, rx)
    }

    async fn next_call(rx: &mut mpsc::UnboundedReceiver<Call>) -> Call {
        tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("gateway call within timeout")
            .expect("channel open")
    }

    async fn assert_no_call(rx: &mut mpsc::UnboundedReceiver<Call>) {
        let result = tokio::time::timeout(Duration::from_millis(50), rx.recv()).await;
        assert!(result.is_err(), "unexpected gateway call: {result:?}");
    }

    #[tokio::test]
    async fn test_reaction_add_grants_mapped_role() {
        let (store, handler, mut rx) = setup();
        store.add_mapping(GuildId(100), MessageId(200), RoleId(300));

        let outcome = handler.on_reaction_add(Some(GuildId(100)), MessageId(200), UserId(1));

        assert_eq!(outcome, ReactionOutcome::Granting(RoleId(300)));
        assert_eq!(next_call(&mut rx).await, Call::Grant(UserId(1), RoleId(300)));
        assert_no_call(&mut rx).await;
    }

    #[tokio::test]
    async fn test_reaction_remove_revokes_mapped_role() {
        let (store, handler, mut rx) = setup();
        store.add_mapping(GuildId(100), MessageId(200), RoleId(300));

        let outcome = handler.on_reaction_remove(Some(GuildId(100)), MessageId(200), UserId(1));

        assert_eq!(outcome, ReactionOutcome::Revoking(RoleId(300)));
        assert_eq!(next_call(&mut rx).await, Call::Revoke(UserId(1), RoleId(300)));
    }

    #[tokio::test]
    async fn test_reaction_outside_guild_is_ignored() {
        let (store, handler, mut rx) = setup();
        store.add_mapping(GuildId(100), MessageId(200), RoleId(300));

        let outcome = handler.on_reaction_add(None, MessageId(200), UserId(1));

        assert_eq!(outcome, ReactionOutcome::NotInGuild);
        assert_no_call(&mut rx).await;
    }

    #[tokio::test]
    async fn test_unmapped_message_is_noop() {
        let (store, handler, mut rx) = setup();

        let outcome = handler.on_reaction_add(Some(GuildId(100)), MessageId(201), UserId(1));

        assert_eq!(outcome, ReactionOutcome::Unmapped);
        assert!(!outcome.is_dispatched());
        assert!(store.is_empty());
        assert_no_call(&mut rx).await;
    }

    #[tokio::test]
    async fn test_deleted_role_is_noop() {
        let (store, handler, mut rx) = setup();
        store.add_mapping(GuildId(100), MessageId(200), RoleId(404));

        let outcome = handler.on_reaction_add(Some(GuildId(100)), MessageId(200), UserId(1));

        assert_eq!(outcome, ReactionOutcome::RoleMissing(RoleId(404)));
        assert_no_call(&mut rx).await;
    }

    #[test]
    fn test_dispatch_from_thread_outside_runtime() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let (store, handler, mut rx) = setup();
        let handler = handler.with_runtime(runtime.handle().clone());
        store.add_mapping(GuildId(100), MessageId(200), RoleId(300));

        let outcome = std::thread::spawn(move || {
            handler.on_reaction_add(Some(GuildId(100)), MessageId(200), UserId(1))
        })
        .join()
        .unwrap();

        assert_eq!(outcome, ReactionOutcome::Granting(RoleId(300)));
        let call = runtime.block_on(next_call(&mut rx));
        assert_eq!(call, Call::Grant(UserId(1), RoleId(300)));
    }

    #[test]
    fn test_no_runtime_is_reported_not_panicked() {
        let (store, handler, mut rx) = setup();
        store.add_mapping(GuildId(100), MessageId(200), RoleId(300));

        let outcome = handler.on_reaction_add(Some(GuildId(100)), MessageId(200), UserId(1));

        assert_eq!(outcome, ReactionOutcome::NoRuntime(RoleId(300)));
        assert!(!outcome.is_dispatched());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_member_lookup_failure_is_swallowed() {
        let (store, handler, mut rx) = setup();
        store.add_mapping(GuildId(100), MessageId(200), RoleId(300));

        let outcome = handler.on_reaction_add(Some(GuildId(100)), MessageId(200), UserId(2));

        // Dispatch still happened; the failure stays inside the spawned task.
        assert_eq!(outcome, ReactionOutcome::Granting(RoleId(300)));
        assert_no_call(&mut rx).await;
    }
}
