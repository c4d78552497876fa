pub mod ledger_entry;
pub mod member;
pub mod month_key;

pub use ledger_entry::*;
pub use member::*;
pub use month_key::*;
