use bson::{doc, oid::ObjectId, DateTime};
use mongodb::Database;
use corral_db::models::{Member, RoleType};

use super::base::{BaseDao, DaoError, DaoResult};

pub struct MemberDao {
    pub base: BaseDao<Member>,
}

impl MemberDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Member::COLLECTION),
        }
    }

    /// Persist a member joining an existing tenant.
    pub async fn create(
        &self,
        email: String,
        display_name: String,
        role: RoleType,
        tenant_id: ObjectId,
        invited_with: Option<ObjectId>,
    ) -> DaoResult<Member> {
        let now = DateTime::now();
        let member = Member {
            id: None,
            email,
            display_name,
            role,
            permissions: role.permissions(),
            tenant_id,
            invited_with,
            joined_at: now,
            created_at: now,
            updated_at: now,
        };

        let id = self.base.insert_one(&member).await?;
        self.base.find_by_id(id).await
    }

    /// Persist a self-service owner: the member is their own tenant root,
    /// so the id is generated up front and doubles as `tenant_id`.
    pub async fn create_owner(
        &self,
        email: String,
        display_name: String,
    ) -> DaoResult<Member> {
        let id = ObjectId::new();
        let now = DateTime::now();
        let member = Member {
            id: Some(id),
            email,
            display_name,
            role: RoleType::Admin,
            permissions: RoleType::Admin.permissions(),
            tenant_id: id,
            invited_with: None,
            joined_at: now,
            created_at: now,
            updated_at: now,
        };

        self.base.insert_one(&member).await?;
        self.base.find_by_id(id).await
    }

    pub async fn find_by_email(&self, email: &str) -> DaoResult<Member> {
        self.base
            .find_one(doc! { "email": email })
            .await?
            .ok_or(DaoError::NotFound)
    }

    pub async fn list_by_tenant(&self, tenant_id: ObjectId) -> DaoResult<Vec<Member>> {
        self.base
            .find_many(
                doc! { "tenant_id": tenant_id },
                Some(doc! { "joined_at": -1 }),
            )
            .await
    }

    pub async fn delete(&self, id: ObjectId) -> DaoResult<bool> {
        self.base.delete_one(doc! { "_id": id }).await
    }
}
