use bson::{doc, oid::ObjectId, DateTime};
use mongodb::Database;
use corral_db::models::{Invitation, RoleType};
use tracing::debug;

use super::base::{BaseDao, DaoResult};

pub struct InvitationDao {
    pub base: BaseDao<Invitation>,
}

impl InvitationDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Invitation::COLLECTION),
        }
    }

    pub async fn create(
        &self,
        code: String,
        issuer_id: ObjectId,
        role_type: RoleType,
        uses_total: u32,
        expires_at: Option<DateTime>,
    ) -> DaoResult<Invitation> {
        let now = DateTime::now();
        let invitation = Invitation {
            id: None,
            code,
            issuer_id,
            role_type,
            active: true,
            uses_remaining: uses_total,
            uses_total,
            expires_at,
            used_at: None,
            used_by: None,
            created_at: now,
            updated_at: now,
        };

        let id = self.base.insert_one(&invitation).await?;
        self.base.find_by_id(id).await
    }

    pub async fn list_by_issuer(&self, issuer_id: ObjectId) -> DaoResult<Vec<Invitation>> {
        self.base
            .find_many(
                doc! { "issuer_id": issuer_id },
                Some(doc! { "created_at": -1 }),
            )
            .await
    }

    /// Most recent active record for a code string.
    ///
    /// The partial unique index keeps this to at most one document; the sort
    /// is the tiebreak if the index is ever rebuilt with old data present.
    pub async fn find_active_by_code(&self, code: &str) -> DaoResult<Option<Invitation>> {
        let results = self
            .base
            .find_many(
                doc! { "code": code, "active": true },
                Some(doc! { "created_at": -1 }),
            )
            .await?;
        Ok(results.into_iter().next())
    }

    /// As `find_active_by_code`, filtered down to records that still have
    /// uses left and have not expired.
    pub async fn find_redeemable_by_code(
        &self,
        code: &str,
        now: DateTime,
    ) -> DaoResult<Option<Invitation>> {
        let results = self
            .base
            .find_many(
                doc! {
                    "code": code,
                    "active": true,
                    "uses_remaining": { "$gt": 0 },
                    "$or": [
                        { "expires_at": null },
                        { "expires_at": { "$gt": now } },
                    ],
                },
                Some(doc! { "created_at": -1 }),
            )
            .await?;
        Ok(results.into_iter().next())
    }

    /// Whether any record, active or not, holds this code string.
    pub async fn code_in_use(&self, code: &str) -> DaoResult<bool> {
        let count = self.base.count(doc! { "code": code }).await?;
        Ok(count > 0)
    }

    /// Atomically consume one use, keyed on the previously read counter.
    ///
    /// The precondition `{_id, active, uses_remaining: expected}` turns the
    /// write into a compare-and-swap: `false` means another redeemer won the
    /// race and the caller must re-read before deciding anything. Consuming
    /// the last use deletes the record outright, so exhausted codes never
    /// linger at zero.
    pub async fn consume(
        &self,
        id: ObjectId,
        expected_uses: u32,
        redeemer_id: ObjectId,
    ) -> DaoResult<bool> {
        let precondition = doc! {
            "_id": id,
            "active": true,
            "uses_remaining": expected_uses,
        };

        if expected_uses <= 1 {
            let deleted = self.base.delete_one(precondition).await?;
            if deleted {
                debug!(?id, redeemer = %redeemer_id, "Invitation exhausted and deleted");
            }
            Ok(deleted)
        } else {
            self.base
                .update_one(
                    precondition,
                    doc! {
                        "$set": {
                            "uses_remaining": expected_uses - 1,
                            "used_at": DateTime::now(),
                            "used_by": redeemer_id,
                            "active": true,
                        }
                    },
                )
                .await
        }
    }

    /// Issuer-driven revocation: deactivates without deleting, keeping a
    /// tombstone for the issuer's code list.
    pub async fn revoke(&self, issuer_id: ObjectId, id: ObjectId) -> DaoResult<bool> {
        self.base
            .update_one(
                doc! { "_id": id, "issuer_id": issuer_id, "active": true },
                doc! { "$set": { "active": false, "uses_remaining": 0 } },
            )
            .await
    }

    pub async fn delete(&self, issuer_id: ObjectId, id: ObjectId) -> DaoResult<bool> {
        self.base
            .delete_one(doc! { "_id": id, "issuer_id": issuer_id })
            .await
    }
}
