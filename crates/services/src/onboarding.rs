use corral_config::InviteSettings;
use corral_db::models::{Invitation, Member};
use mongodb::Database;
use tracing::{debug, warn};

use crate::dao::member::MemberDao;
use crate::invites::{InviteError, InviteService, Redemption, RejectReason};

/// Outcome of registering against an invitation code.
#[derive(Debug)]
pub enum Onboarding {
    Joined(Onboarded),
    Rejected(RejectReason),
}

#[derive(Debug)]
pub struct Onboarded {
    pub member: Member,
    /// Present only for owner self-signup: the auto-issued staff code.
    pub bootstrap_code: Option<Invitation>,
}

/// Orchestrates the Authentication/Profile boundary: member profiles are
/// persisted first and code consumption committed after, so a consumed use
/// can never be stranded without a member attached. If consumption fails
/// after the profile was written, the profile is deleted as compensation.
pub struct OnboardingService {
    members: MemberDao,
    invites: InviteService,
}

impl OnboardingService {
    pub fn new(db: &Database, settings: InviteSettings) -> Self {
        Self {
            members: MemberDao::new(db),
            invites: InviteService::new(db, settings),
        }
    }

    pub fn invites(&self) -> &InviteService {
        &self.invites
    }

    /// Self-service owner signup: the member becomes their own tenant root
    /// with the full admin set, and one bootstrap invitation is issued so
    /// staff can be invited immediately.
    pub async fn register_owner(
        &self,
        email: String,
        display_name: String,
    ) -> Result<Onboarded, InviteError> {
        let member = self.members.create_owner(email, display_name).await?;
        let owner_id = member.id.expect("stored member has an id");

        let bootstrap = self.invites.create_bootstrap_code(owner_id).await?;
        debug!(owner = %owner_id, code = %bootstrap.code, "Owner registered with bootstrap code");

        Ok(Onboarded {
            member,
            bootstrap_code: Some(bootstrap),
        })
    }

    /// Register a prospective member against an invitation code.
    ///
    /// The advisory check rejects obviously dead codes before any write.
    /// After the profile insert, `redeem` commits consumption; a rejection
    /// at that point (the code was used up or revoked in the meantime)
    /// rolls the profile back and surfaces the reason.
    pub async fn register_with_code(
        &self,
        code: &str,
        email: String,
        display_name: String,
    ) -> Result<Onboarding, InviteError> {
        let invitation = match self.invites.peek_code(code).await? {
            Ok(invitation) => invitation,
            Err(reason) => return Ok(Onboarding::Rejected(reason)),
        };

        let member = self
            .members
            .create(
                email,
                display_name,
                invitation.role_type,
                invitation.issuer_id,
                invitation.id,
            )
            .await?;
        let member_id = member.id.expect("stored member has an id");

        match self.invites.redeem(code, member_id).await {
            Ok(Redemption::Redeemed(info)) => {
                debug!(member = %member_id, tenant = %info.issuer_id, "Member joined via invitation");
                Ok(Onboarding::Joined(Onboarded {
                    member,
                    bootstrap_code: None,
                }))
            }
            Ok(Redemption::Rejected(reason)) => {
                self.members.delete(member_id).await?;
                debug!(member = %member_id, reason = reason.as_str(), "Registration rejected, member rolled back");
                Ok(Onboarding::Rejected(reason))
            }
            Err(err) => {
                // Best-effort compensation; the original failure wins.
                if let Err(rollback) = self.members.delete(member_id).await {
                    warn!(member = %member_id, error = %rollback, "Failed to roll back member after store error");
                }
                Err(err)
            }
        }
    }
}
