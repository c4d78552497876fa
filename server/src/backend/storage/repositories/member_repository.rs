use anyhow::Result;
use async_trait::async_trait;
use sqlx::{sqlite::SqliteRow, Row};

use super::{from_micros, to_micros};
use crate::backend::domain::models::{Member, Role};
use crate::backend::storage::connection::DbConnection;
use crate::backend::storage::traits::MemberStorage;

/// Repository for the member directory
#[derive(Clone)]
pub struct MemberRepository {
    db: DbConnection,
}

impl MemberRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn row_to_member(row: &SqliteRow) -> Result<Member> {
        let role: String = row.try_get("role")?;
        Ok(Member {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            role: role.parse::<Role>()?,
            monthly_fee: row.try_get("monthly_fee")?,
            created_at: from_micros(row.try_get("created_at")?)?,
        })
    }
}

#[async_trait]
impl MemberStorage for MemberRepository {
    async fn store_member(&self, member: &Member) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO members (id, name, role, monthly_fee, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&member.id)
        .bind(&member.name)
        .bind(member.role.as_str())
        .bind(member.monthly_fee)
        .bind(to_micros(member.created_at))
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn get_member(&self, member_id: &str) -> Result<Option<Member>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, role, monthly_fee, created_at
            FROM members
            WHERE id = ?
            "#,
        )
        .bind(member_id)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(Self::row_to_member).transpose()
    }

    async fn get_member_by_name(&self, name: &str) -> Result<Option<Member>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, role, monthly_fee, created_at
            FROM members
            WHERE name = ?
            "#,
        )
        .bind(name)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(Self::row_to_member).transpose()
    }

    async fn list_members(&self) -> Result<Vec<Member>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, role, monthly_fee, created_at
            FROM members
            ORDER BY name ASC
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::row_to_member).collect()
    }

    async fn update_monthly_fee(&self, member_id: &str, monthly_fee: i64) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE members
            SET monthly_fee = ?
            WHERE id = ?
            "#,
        )
        .bind(monthly_fee)
        .bind(member_id)
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn member(name: &str, role: Role, fee: i64) -> Member {
        Member {
            id: Member::generate_id(),
            name: name.to_string(),
            role,
            monthly_fee: fee,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_store_and_get_member() {
        let db = DbConnection::init_test().await.unwrap();
        let repo = MemberRepository::new(db);

        let alice = member("alice", Role::Member, 50000);
        repo.store_member(&alice).await.unwrap();

        let loaded = repo.get_member(&alice.id).await.unwrap().unwrap();
        assert_eq!(loaded.name, "alice");
        assert_eq!(loaded.role, Role::Member);
        assert_eq!(loaded.monthly_fee, 50000);
        assert_eq!(loaded.created_at.timestamp_micros(), alice.created_at.timestamp_micros());

        let by_name = repo.get_member_by_name("alice").await.unwrap().unwrap();
        assert_eq!(by_name.id, alice.id);
        assert!(repo.get_member("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_name_is_rejected_by_store() {
        let db = DbConnection::init_test().await.unwrap();
        let repo = MemberRepository::new(db);

        repo.store_member(&member("bob", Role::Member, 0)).await.unwrap();
        assert!(repo.store_member(&member("bob", Role::Member, 0)).await.is_err());
    }

    #[tokio::test]
    async fn test_list_members_ordered_by_name() {
        let db = DbConnection::init_test().await.unwrap();
        let repo = MemberRepository::new(db);

        repo.store_member(&member("carol", Role::Member, 0)).await.unwrap();
        repo.store_member(&member("admin", Role::Admin, 0)).await.unwrap();
        repo.store_member(&member("bob", Role::Member, 0)).await.unwrap();

        let names: Vec<String> = repo
            .list_members()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, vec!["admin", "bob", "carol"]);
    }

    #[tokio::test]
    async fn test_update_monthly_fee() {
        let db = DbConnection::init_test().await.unwrap();
        let repo = MemberRepository::new(db);

        let dave = member("dave", Role::Member, 1000);
        repo.store_member(&dave).await.unwrap();

        assert!(repo.update_monthly_fee(&dave.id, 2000).await.unwrap());
        assert_eq!(repo.get_member(&dave.id).await.unwrap().unwrap().monthly_fee, 2000);
        assert!(!repo.update_monthly_fee("missing", 2000).await.unwrap());
    }
}
