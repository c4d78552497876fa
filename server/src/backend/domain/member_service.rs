//! Member directory.
//!
//! Members are created by an admin. An admin account never carries a monthly
//! fee; a member's fee of 0 means any approved deposit settles the month.

use chrono::Utc;
use log::{info, warn};
use std::sync::Arc;

use super::commands::members::CreateMemberCommand;
use super::error::{LedgerError, LedgerResult};
use super::models::{Member, Role};
use crate::backend::storage::{Connection, MemberStorage};

#[derive(Clone)]
pub struct MemberService<C: Connection> {
    member_repository: C::MemberRepository,
}

impl<C: Connection> MemberService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        let member_repository = connection.create_member_repository();
        Self { member_repository }
    }

    pub async fn create_member(&self, command: CreateMemberCommand) -> LedgerResult<Member> {
        let name = command.name.trim();
        if name.is_empty() {
            return Err(LedgerError::validation("name is required"));
        }
        if command.monthly_fee < 0 {
            return Err(LedgerError::validation("monthly fee must be zero or more"));
        }

        if self.member_repository.get_member_by_name(name).await?.is_some() {
            return Err(LedgerError::conflict(format!("member '{}' already exists", name)));
        }

        let monthly_fee = match command.role {
            Role::Admin => 0,
            Role::Member => command.monthly_fee,
        };
        let member = Member {
            id: Member::generate_id(),
            name: name.to_string(),
            role: command.role,
            monthly_fee,
            created_at: Utc::now(),
        };

        self.member_repository.store_member(&member).await?;
        info!("Created {} '{}' ({})", member.role.as_str(), member.name, member.id);
        Ok(member)
    }

    pub async fn update_monthly_fee(&self, member_id: &str, monthly_fee: i64) -> LedgerResult<Member> {
        if monthly_fee < 0 {
            return Err(LedgerError::validation("monthly fee must be zero or more"));
        }

        let mut member = self
            .member_repository
            .get_member(member_id)
            .await?
            .ok_or_else(|| LedgerError::not_found(format!("member {} not found", member_id)))?;

        if member.is_admin() {
            return Err(LedgerError::validation("admin accounts do not carry a monthly fee"));
        }

        if !self.member_repository.update_monthly_fee(member_id, monthly_fee).await? {
            return Err(LedgerError::not_found(format!("member {} not found", member_id)));
        }

        info!("Monthly fee for '{}' changed {} -> {}", member.name, member.monthly_fee, monthly_fee);
        member.monthly_fee = monthly_fee;
        Ok(member)
    }

    pub async fn list_members(&self) -> LedgerResult<Vec<Member>> {
        Ok(self.member_repository.list_members().await?)
    }

    /// Seed the admin account on startup; returns the existing one when present
    pub async fn ensure_admin(&self, name: &str) -> LedgerResult<Member> {
        if let Some(existing) = self.member_repository.get_member_by_name(name.trim()).await? {
            if !existing.is_admin() {
                warn!("Seed admin name '{}' belongs to a regular member", existing.name);
            }
            return Ok(existing);
        }

        self.create_member(CreateMemberCommand {
            name: name.to_string(),
            role: Role::Admin,
            monthly_fee: 0,
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::storage::DbConnection;

    async fn service() -> MemberService<DbConnection> {
        let db = DbConnection::init_test().await.unwrap();
        MemberService::new(Arc::new(db))
    }

    fn command(name: &str, role: Role, monthly_fee: i64) -> CreateMemberCommand {
        CreateMemberCommand {
            name: name.to_string(),
            role,
            monthly_fee,
        }
    }

    #[tokio::test]
    async fn test_create_member_trims_name() {
        let service = service().await;
        let member = service
            .create_member(command("  alice  ", Role::Member, 50000))
            .await
            .unwrap();
        assert_eq!(member.name, "alice");
        assert_eq!(member.monthly_fee, 50000);

        let members = service.list_members().await.unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].id, member.id);
    }

    #[tokio::test]
    async fn test_create_member_validation() {
        let service = service().await;
        assert!(matches!(
            service.create_member(command("   ", Role::Member, 0)).await,
            Err(LedgerError::Validation(_))
        ));
        assert!(matches!(
            service.create_member(command("bob", Role::Member, -1)).await,
            Err(LedgerError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_name_is_conflict() {
        let service = service().await;
        service.create_member(command("bob", Role::Member, 0)).await.unwrap();
        assert!(matches!(
            service.create_member(command("bob", Role::Member, 100)).await,
            Err(LedgerError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_admin_never_carries_fee() {
        let service = service().await;
        let admin = service
            .create_member(command("root", Role::Admin, 9000))
            .await
            .unwrap();
        assert_eq!(admin.monthly_fee, 0);

        assert!(matches!(
            service.update_monthly_fee(&admin.id, 100).await,
            Err(LedgerError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_update_monthly_fee() {
        let service = service().await;
        let carol = service.create_member(command("carol", Role::Member, 1000)).await.unwrap();

        let updated = service.update_monthly_fee(&carol.id, 3000).await.unwrap();
        assert_eq!(updated.monthly_fee, 3000);

        assert!(matches!(
            service.update_monthly_fee(&carol.id, -5).await,
            Err(LedgerError::Validation(_))
        ));
        assert!(matches!(
            service.update_monthly_fee("missing", 5).await,
            Err(LedgerError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_ensure_admin_is_idempotent() {
        let service = service().await;
        let first = service.ensure_admin("admin").await.unwrap();
        let second = service.ensure_admin("admin").await.unwrap();
        assert_eq!(first.id, second.id);
        assert!(first.is_admin());
        assert_eq!(service.list_members().await.unwrap().len(), 1);
    }
}
