use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use super::role::RoleType;

/// A redeemable invitation code.
///
/// Code strings are stored ASCII-uppercase; lookups normalize the same way.
/// `active` mirrors `uses_remaining > 0` on every write, and a record whose
/// last use is consumed is hard-deleted rather than kept at zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invitation {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub code: String,
    pub issuer_id: ObjectId,
    pub role_type: RoleType,
    pub active: bool,
    pub uses_remaining: u32,
    pub uses_total: u32,
    pub expires_at: Option<DateTime>,
    pub used_at: Option<DateTime>,
    pub used_by: Option<ObjectId>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl Invitation {
    pub const COLLECTION: &'static str = "invitations";

    pub fn is_expired(&self, now: DateTime) -> bool {
        self.expires_at.is_some_and(|exp| exp <= now)
    }

    pub fn is_redeemable(&self, now: DateTime) -> bool {
        self.active && self.uses_remaining > 0 && !self.is_expired(now)
    }
}
