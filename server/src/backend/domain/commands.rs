//! Domain-level command and query types.
//! These structs are used by services inside the domain layer and are **not**
//! exposed over the public API. The REST layer maps the public DTOs defined in
//! the `shared` crate to these internal types.

pub mod deposits {
    use crate::backend::domain::models::EntryStatus;

    /// Member-initiated deposit request.
    #[derive(Debug, Clone)]
    pub struct RequestDepositCommand {
        pub amount: i64,
        pub month_key: String,
        pub note: String,
    }

    /// Who an admin direct deposit is credited to.
    #[derive(Debug, Clone, PartialEq)]
    pub enum DepositTarget {
        Member(String),
        Donation,
    }

    #[derive(Debug, Clone)]
    pub struct AdminDepositCommand {
        pub amount: i64,
        pub month_key: String,
        pub note: String,
        pub target: DepositTarget,
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    pub enum Decision {
        Approve,
        Reject,
    }

    /// Targets one member's due month.
    #[derive(Debug, Clone)]
    pub struct MemberMonthCommand {
        pub member_id: String,
        pub month_key: String,
        pub note: Option<String>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct ForcePaidResult {
        pub entry_id: String,
        pub amount: i64,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct DecisionResult {
        pub entry_id: String,
        pub status: EntryStatus,
    }
}

pub mod entries {
    use crate::backend::domain::models::EntryStatus;

    /// Partial update; `None` leaves the field untouched.
    #[derive(Debug, Clone, Default)]
    pub struct UpdateEntryCommand {
        pub amount: Option<i64>,
        pub note: Option<String>,
        pub month_key: Option<String>,
        pub status: Option<EntryStatus>,
    }

    /// Withdrawal or adjustment.
    #[derive(Debug, Clone)]
    pub struct CashMovementCommand {
        pub amount: i64,
        pub note: String,
    }
}

pub mod members {
    use crate::backend::domain::models::Role;

    #[derive(Debug, Clone)]
    pub struct CreateMemberCommand {
        pub name: String,
        pub role: Role,
        pub monthly_fee: i64,
    }
}

pub mod reports {
    /// Query for the transaction feed.
    #[derive(Debug, Clone, Default)]
    pub struct TransactionPageQuery {
        pub limit: Option<i64>,
    }
}
