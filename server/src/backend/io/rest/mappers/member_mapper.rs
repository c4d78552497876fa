use shared::{Member as SharedMember, Role as SharedRole};

use super::timestamp_to_dto;
use crate::backend::domain::models::{Member, Role};

pub struct MemberMapper;

impl MemberMapper {
    pub fn role_to_dto(role: Role) -> SharedRole {
        match role {
            Role::Admin => SharedRole::Admin,
            Role::Member => SharedRole::Member,
        }
    }

    pub fn role_to_domain(role: SharedRole) -> Role {
        match role {
            SharedRole::Admin => Role::Admin,
            SharedRole::Member => Role::Member,
        }
    }

    pub fn to_dto(member: Member) -> SharedMember {
        SharedMember {
            id: member.id,
            name: member.name,
            role: Self::role_to_dto(member.role),
            monthly_fee: member.monthly_fee,
            created_at: timestamp_to_dto(member.created_at),
        }
    }

    pub fn to_dto_list(members: Vec<Member>) -> Vec<SharedMember> {
        members.into_iter().map(Self::to_dto).collect()
    }
}
