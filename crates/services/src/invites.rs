use bson::{oid::ObjectId, DateTime};
use chrono::{Duration, Utc};
use corral_config::InviteSettings;
use corral_db::models::{Invitation, RoleType};
use mongodb::Database;
use thiserror::Error;
use tracing::debug;

use crate::codegen;
use crate::dao::base::DaoError;
use crate::dao::invitation::InvitationDao;

#[derive(Debug, Error)]
pub enum InviteError {
    #[error("store error: {0}")]
    Store(#[from] DaoError),
    #[error("no unused code string found after {attempts} attempts; try a longer code length")]
    GenerationExhausted { attempts: u32 },
    #[error("invalid code length: {0}")]
    InvalidLength(usize),
    #[error("invalid use count: {0}")]
    InvalidUses(u32),
}

/// Why a redemption (or advisory check) did not go through.
///
/// These are expected outcomes, not errors; transport failures surface as
/// [`InviteError::Store`] instead and never mean "code invalid".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// No active record matches the code string.
    NotFound,
    /// The record exists but its expiry has passed; it is left unmutated.
    Expired,
    /// Out of uses, or consumed by a concurrent redeemer mid-flight.
    Exhausted,
    /// Lost the conditional-write race past the retry bound.
    Conflict,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::NotFound => "not found",
            RejectReason::Expired => "expired",
            RejectReason::Exhausted => "exhausted",
            RejectReason::Conflict => "already redeemed concurrently",
        }
    }
}

#[derive(Debug, Clone)]
pub enum Redemption {
    Redeemed(RedeemedInfo),
    Rejected(RejectReason),
}

/// Post-redemption snapshot: what the caller needs to finish onboarding.
#[derive(Debug, Clone)]
pub struct RedeemedInfo {
    pub invitation_id: ObjectId,
    pub issuer_id: ObjectId,
    pub role_type: RoleType,
    pub code: String,
    pub uses_remaining: u32,
    pub exhausted: bool,
}

/// Canonical form of a code string: trimmed, ASCII-uppercased.
///
/// Codes are issued from an upper+digits alphabet, so normalizing at both
/// generation and lookup makes matching effectively case-insensitive.
pub fn normalize(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

pub struct InviteService {
    invitations: InvitationDao,
    settings: InviteSettings,
}

impl InviteService {
    pub fn new(db: &Database, settings: InviteSettings) -> Self {
        Self {
            invitations: InvitationDao::new(db),
            settings,
        }
    }

    /// Issue a code, retrying generation until the string is unused by any
    /// record, active or not.
    ///
    /// The loop is bounded by `invites.generation_attempts`; the partial
    /// unique index backstops the window between the availability check and
    /// the insert, with a duplicate-key insert re-entering the loop.
    pub async fn create_code(
        &self,
        issuer_id: ObjectId,
        role_type: RoleType,
        uses_total: u32,
        ttl_days: Option<i64>,
        length: usize,
    ) -> Result<Invitation, InviteError> {
        if uses_total == 0 {
            return Err(InviteError::InvalidUses(uses_total));
        }
        if length == 0 {
            return Err(InviteError::InvalidLength(length));
        }

        let expires_at = ttl_days
            .map(|days| DateTime::from_chrono(Utc::now() + Duration::days(days)));

        let attempts = self.settings.generation_attempts.max(1);
        for _ in 0..attempts {
            let candidate = codegen::generate_with(codegen::CODE_ALPHABET, length);
            if self.invitations.code_in_use(&candidate).await? {
                continue;
            }
            match self
                .invitations
                .create(candidate, issuer_id, role_type, uses_total, expires_at)
                .await
            {
                Ok(invitation) => {
                    debug!(code = %invitation.code, issuer = %issuer_id, uses_total, "Invitation issued");
                    return Ok(invitation);
                }
                Err(DaoError::DuplicateKey(_)) => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(InviteError::GenerationExhausted { attempts })
    }

    /// Standard code: configured length, default uses and TTL.
    pub async fn create_default_code(
        &self,
        issuer_id: ObjectId,
        role_type: RoleType,
    ) -> Result<Invitation, InviteError> {
        self.create_code(
            issuer_id,
            role_type,
            self.settings.default_uses,
            Some(self.settings.default_ttl_days),
            self.settings.code_length,
        )
        .await
    }

    /// Personalized code: longer string, issuer-chosen uses and TTL.
    pub async fn create_personalized_code(
        &self,
        issuer_id: ObjectId,
        role_type: RoleType,
        uses_total: u32,
        ttl_days: Option<i64>,
    ) -> Result<Invitation, InviteError> {
        self.create_code(
            issuer_id,
            role_type,
            uses_total,
            ttl_days,
            self.settings.personalized_code_length,
        )
        .await
    }

    /// The high-use, long-TTL code issued automatically at owner signup so
    /// a fresh tenant can invite staff immediately.
    pub async fn create_bootstrap_code(
        &self,
        owner_id: ObjectId,
    ) -> Result<Invitation, InviteError> {
        self.create_code(
            owner_id,
            RoleType::Empleado,
            self.settings.owner_code_uses,
            Some(self.settings.owner_code_ttl_days),
            self.settings.code_length,
        )
        .await
    }

    pub async fn list_codes(&self, issuer_id: ObjectId) -> Result<Vec<Invitation>, InviteError> {
        Ok(self.invitations.list_by_issuer(issuer_id).await?)
    }

    /// Advisory pre-validation for UX feedback. Never mutates, and must not
    /// be relied on for correctness: state can change between this check and
    /// `redeem`, which re-validates under its conditional write.
    pub async fn check_code(&self, code: &str) -> Result<bool, InviteError> {
        let code = normalize(code);
        Ok(self
            .invitations
            .find_redeemable_by_code(&code, DateTime::now())
            .await?
            .is_some())
    }

    /// Read-only lookup of a redeemable invitation with the rejection reason.
    pub(crate) async fn peek_code(
        &self,
        code: &str,
    ) -> Result<Result<Invitation, RejectReason>, InviteError> {
        let code = normalize(code);
        let found = self.invitations.find_active_by_code(&code).await?;
        Ok(classify(found, DateTime::now()))
    }

    /// Redeem one use of a code.
    ///
    /// Validation and consumption run under optimistic concurrency: the
    /// decrement-or-delete is a conditional write keyed on the counter read
    /// in the same attempt, and a failed precondition re-reads and retries
    /// up to `invites.redeem_attempts` before reporting `Conflict`. A record
    /// that vanishes between attempts was consumed by a concurrent redeemer
    /// and reports `Exhausted`. Expired records are never mutated.
    pub async fn redeem(
        &self,
        code: &str,
        redeemer_id: ObjectId,
    ) -> Result<Redemption, InviteError> {
        let code = normalize(code);
        let attempts = self.settings.redeem_attempts.max(1);

        for attempt in 0..attempts {
            let found = self.invitations.find_active_by_code(&code).await?;
            if found.is_none() && attempt > 0 {
                return Ok(Redemption::Rejected(RejectReason::Exhausted));
            }
            let invitation = match classify(found, DateTime::now()) {
                Ok(invitation) => invitation,
                Err(reason) => return Ok(Redemption::Rejected(reason)),
            };

            let id = invitation.id.expect("stored invitation has an id");
            let remaining = invitation.uses_remaining - 1;

            if self
                .invitations
                .consume(id, invitation.uses_remaining, redeemer_id)
                .await?
            {
                debug!(code = %code, remaining, redeemer = %redeemer_id, "Invitation redeemed");
                return Ok(Redemption::Redeemed(RedeemedInfo {
                    invitation_id: id,
                    issuer_id: invitation.issuer_id,
                    role_type: invitation.role_type,
                    code: invitation.code,
                    uses_remaining: remaining,
                    exhausted: remaining == 0,
                }));
            }

            debug!(code = %code, attempt, "Redemption precondition failed, re-reading");
        }

        Ok(Redemption::Rejected(RejectReason::Conflict))
    }

    pub async fn revoke_code(
        &self,
        issuer_id: ObjectId,
        id: ObjectId,
    ) -> Result<bool, InviteError> {
        Ok(self.invitations.revoke(issuer_id, id).await?)
    }

    pub async fn delete_code(
        &self,
        issuer_id: ObjectId,
        id: ObjectId,
    ) -> Result<bool, InviteError> {
        Ok(self.invitations.delete(issuer_id, id).await?)
    }
}

/// Steps 1-4 of the redemption state machine, shared by the advisory check
/// and the mutating path.
fn classify(
    invitation: Option<Invitation>,
    now: DateTime,
) -> Result<Invitation, RejectReason> {
    let Some(invitation) = invitation else {
        return Err(RejectReason::NotFound);
    };
    if invitation.is_expired(now) {
        return Err(RejectReason::Expired);
    }
    if invitation.uses_remaining == 0 {
        // Unreachable while the store upholds `active == (uses > 0)`.
        return Err(RejectReason::Exhausted);
    }
    Ok(invitation)
}
