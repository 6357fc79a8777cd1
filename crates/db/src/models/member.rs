use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use super::role::RoleType;

/// A ranch member profile, persisted at the end of onboarding.
///
/// `tenant_id` is the issuer of the redeemed invitation, or the member's own
/// id for self-service owner signup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    pub display_name: String,
    pub role: RoleType,
    #[serde(default)]
    pub permissions: u64,
    pub tenant_id: ObjectId,
    pub invited_with: Option<ObjectId>,
    pub joined_at: DateTime,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl Member {
    pub const COLLECTION: &'static str = "members";
}
