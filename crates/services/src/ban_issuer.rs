//! # BanIssuer
//!
//! Issues identity, address and range bans, applies them to every affected
//! identity and disconnects the ones that are online.
//!
//! None of the entry points fail. Errors end up in the returned
//! [`BanResult`]: an operation-level error when the ban could not be issued
//! at all, or a per-candidate failure when one identity could not be
//! processed. Once the ban record exists every remaining candidate is still
//! attempted.

use std::collections::HashSet;
use std::net::IpAddr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use configs::BanSettings;
use domains::{
    matches, Address, Ban, BanStore, ConnectionEnforcer, DomainError, Identity, IdentityRegistry,
    NewBan, SessionDirectory,
};
use ipnet::IpNet;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::ban_result::BanResult;
use crate::error::IssueError;
use crate::locks::IdentityLocks;
use crate::message::{kick_message, resolve_reason};

/// Outcome of trying one candidate.
enum Applied {
    Skipped,
    Banned(Identity),
    /// Banned, but the disconnect failed
    BannedStillConnected(Identity, IssueError),
}

pub struct BanIssuer {
    registry: Arc<dyn IdentityRegistry>,
    sessions: Arc<dyn SessionDirectory>,
    connections: Arc<dyn ConnectionEnforcer>,
    bans: Arc<dyn BanStore>,
    settings: BanSettings,
    locks: IdentityLocks,
}

impl BanIssuer {
    pub fn new(
        registry: Arc<dyn IdentityRegistry>,
        sessions: Arc<dyn SessionDirectory>,
        connections: Arc<dyn ConnectionEnforcer>,
        bans: Arc<dyn BanStore>,
        settings: BanSettings,
    ) -> Self {
        Self {
            registry,
            sessions,
            connections,
            bans,
            settings,
            locks: IdentityLocks::default(),
        }
    }

    /// Bans one identity, replacing whatever ban it had.
    ///
    /// Unknown keys get a record, seeded from the live connection when the
    /// player is online.
    #[tracing::instrument(skip(self, message))]
    pub async fn ban_by_identity(
        &self,
        key: Uuid,
        message: Option<&str>,
        ends_at: Option<DateTime<Utc>>,
        admin: bool,
    ) -> BanResult {
        let reason = resolve_reason(message, admin, &self.settings);
        let result = match self.issue_identity_ban(key, reason, ends_at, admin).await {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "failed to issue identity ban");
                BanResult::failed(e)
            }
        };
        self.locks.prune();
        result
    }

    /// Bans every connected identity whose current address is `addr`.
    /// Identities that already have an active ban are left alone.
    #[tracing::instrument(skip(self, message))]
    pub async fn ban_by_address(
        &self,
        addr: IpAddr,
        message: Option<&str>,
        ends_at: Option<DateTime<Utc>>,
        admin: bool,
        include_historic: bool,
    ) -> BanResult {
        let reason = resolve_reason(message, admin, &self.settings);
        self.issue_targeted_ban(Address::host(addr), reason, ends_at, admin, include_historic)
            .await
    }

    /// Bans every connected identity whose current address lies in `range`.
    /// Identities that already have an active ban are left alone.
    #[tracing::instrument(skip(self, message))]
    pub async fn ban_by_range(
        &self,
        range: IpNet,
        message: Option<&str>,
        ends_at: Option<DateTime<Utc>>,
        admin: bool,
        include_historic: bool,
    ) -> BanResult {
        let reason = resolve_reason(message, admin, &self.settings);
        self.issue_targeted_ban(Address::range(range), reason, ends_at, admin, include_historic)
            .await
    }

    async fn issue_identity_ban(
        &self,
        key: Uuid,
        reason: String,
        ends_at: Option<DateTime<Utc>>,
        admin: bool,
    ) -> Result<BanResult, IssueError> {
        let _guard = self.locks.lock(key).await;

        let mut identity = self.resolve_identity(key).await?;
        let ban = self.create_ban(reason, ends_at, admin, None).await?;

        self.registry
            .set_active_ban(key, ban.id)
            .await
            .map_err(IssueError::Mutation)?;
        identity.active_ban = Some(ban.id);

        let mut result = BanResult::new();
        if let Err(e) = self.enforce(key, &ban).await {
            warn!(%key, error = %e, "identity banned but still connected");
            result.add_failure(key, e);
        }
        info!(%key, ban = %ban.id, "identity banned");
        result.add_ban(ban);
        result.add_player(identity);
        Ok(result)
    }

    async fn issue_targeted_ban(
        &self,
        target: Address,
        reason: String,
        ends_at: Option<DateTime<Utc>>,
        admin: bool,
        include_historic: bool,
    ) -> BanResult {
        let ban = match self.create_ban(reason, ends_at, admin, Some(target)).await {
            Ok(ban) => ban,
            Err(e) => {
                warn!(%target, error = %e, "failed to issue address ban");
                return BanResult::failed(e);
            }
        };

        let mut result = BanResult::new();
        result.add_ban(ban.clone());

        match self.connections.connected_identities().await {
            Ok(connected) => {
                for key in connected {
                    let outcome = self.apply_to_connected(&target, &ban, key).await;
                    Self::record(&mut result, key, outcome);
                }
            }
            Err(e) => {
                warn!(%target, error = %e, "could not list connected identities");
                result.set_error(IssueError::Resolution(e));
            }
        }

        if include_historic {
            self.apply_to_historic(&target, &ban, &mut result).await;
        }

        self.locks.prune();
        info!(
            %target,
            ban = %ban.id,
            banned = result.players().len(),
            failed = result.failures().len(),
            "address ban issued"
        );
        result
    }

    /// Evaluates one connected identity against the target.
    async fn apply_to_connected(
        &self,
        target: &Address,
        ban: &Ban,
        key: Uuid,
    ) -> Result<Applied, IssueError> {
        let identity = self
            .registry
            .find_by_key(key)
            .await
            .map_err(IssueError::Resolution)?
            .ok_or_else(|| {
                IssueError::Resolution(DomainError::NotFound("identity".into(), key.to_string()))
            })?;

        // Ranges can cover many players; skip the session lookup for the
        // ones that are already banned.
        if target.is_range() && identity.is_banned() {
            debug!(%key, "already banned");
            return Ok(Applied::Skipped);
        }

        let session = self
            .sessions
            .latest_session(key)
            .await
            .map_err(IssueError::Resolution)?
            .ok_or_else(|| {
                IssueError::Resolution(DomainError::NotFound("session".into(), key.to_string()))
            })?;

        if !matches(target, &session.address) {
            return Ok(Applied::Skipped);
        }
        if identity.is_banned() {
            debug!(%key, "already banned");
            return Ok(Applied::Skipped);
        }

        self.apply(identity, ban).await
    }

    /// Applies the ban to every identity that ever used a matching address.
    async fn apply_to_historic(&self, target: &Address, ban: &Ban, result: &mut BanResult) {
        let sessions = match self.sessions.historic_sessions(target).await {
            Ok(sessions) => sessions,
            Err(e) => {
                warn!(%target, error = %e, "could not search historic sessions");
                result.set_error(IssueError::Resolution(e));
                return;
            }
        };

        // Identities the live pass already banned or failed on are not retried.
        let mut seen: HashSet<Uuid> = result
            .players()
            .iter()
            .map(|p| p.key)
            .chain(result.failures().iter().map(|f| f.identity))
            .collect();
        for session in sessions {
            if !matches(target, &session.address) || !seen.insert(session.identity) {
                continue;
            }
            let key = session.identity;
            let outcome = match self.registry.find_by_key(key).await {
                Ok(Some(identity)) if identity.is_banned() => Ok(Applied::Skipped),
                Ok(Some(identity)) => self.apply(identity, ban).await,
                Ok(None) => Err(IssueError::Resolution(DomainError::NotFound(
                    "identity".into(),
                    key.to_string(),
                ))),
                Err(e) => Err(IssueError::Resolution(e)),
            };
            Self::record(result, key, outcome);
        }
    }

    /// Sets the ban if the identity is still unbanned, then disconnects it.
    async fn apply(&self, mut identity: Identity, ban: &Ban) -> Result<Applied, IssueError> {
        let key = identity.key;
        let _guard = self.locks.lock(key).await;

        let written = self
            .registry
            .set_active_ban_if_unbanned(key, ban.id)
            .await
            .map_err(IssueError::Mutation)?;
        if !written {
            debug!(%key, "banned concurrently by another operation");
            return Ok(Applied::Skipped);
        }
        identity.active_ban = Some(ban.id);

        match self.enforce(key, ban).await {
            Ok(()) => Ok(Applied::Banned(identity)),
            Err(e) => Ok(Applied::BannedStillConnected(identity, e)),
        }
    }

    fn record(result: &mut BanResult, key: Uuid, outcome: Result<Applied, IssueError>) {
        match outcome {
            Ok(Applied::Skipped) => {}
            Ok(Applied::Banned(identity)) => {
                debug!(%key, "banned");
                result.add_player(identity);
            }
            Ok(Applied::BannedStillConnected(identity, e)) => {
                warn!(%key, error = %e, "banned but still connected");
                result.add_player(identity);
                result.add_failure(key, e);
            }
            Err(e) => {
                warn!(%key, error = %e, "skipping candidate");
                result.add_failure(key, e);
            }
        }
    }

    /// Disconnects `key` if it is online.
    async fn enforce(&self, key: Uuid, ban: &Ban) -> Result<(), IssueError> {
        let online = self
            .connections
            .is_connected(key)
            .await
            .map_err(IssueError::Enforcement)?;
        if online {
            let message = kick_message(&ban.reason, ban.ends_at);
            self.connections
                .disconnect(key, &message)
                .await
                .map_err(IssueError::Enforcement)?;
        }
        Ok(())
    }

    async fn resolve_identity(&self, key: Uuid) -> Result<Identity, IssueError> {
        if let Some(identity) = self
            .registry
            .find_by_key(key)
            .await
            .map_err(IssueError::Resolution)?
        {
            return Ok(identity);
        }

        let live = self
            .connections
            .live_session(key)
            .await
            .map_err(IssueError::Resolution)?;
        let created = match &live {
            Some(live) => self.registry.create_from_live_session(live).await,
            None => self.registry.create_from_key(key).await,
        };

        match created {
            Ok(identity) => Ok(identity),
            // Someone else created it between our lookup and insert.
            Err(DomainError::Conflict(_)) => self
                .registry
                .find_by_key(key)
                .await
                .map_err(IssueError::Resolution)?
                .ok_or_else(|| {
                    IssueError::Resolution(DomainError::NotFound(
                        "identity".into(),
                        key.to_string(),
                    ))
                }),
            Err(e) => Err(IssueError::Resolution(e)),
        }
    }

    async fn create_ban(
        &self,
        reason: String,
        ends_at: Option<DateTime<Utc>>,
        admin: bool,
        target: Option<Address>,
    ) -> Result<Ban, IssueError> {
        self.bans
            .create_ban(NewBan {
                reason,
                ends_at,
                admin,
                target,
            })
            .await
            .map_err(IssueError::Persistence)
    }
}

#[cfg(test)]
#[path = "ban_issuer_tests.rs"]
mod tests;
