//! Entities and their sparse filters and patches

pub mod account;
pub mod reading;
pub mod report;

pub use account::{
    Account, AccountFilter, AccountPatch, AccountView, CreatedAccount, NewAccount, RoleUpdate,
};
pub use reading::{Reading, ReadingFilter, ReadingPatch};
pub use report::OutcomeReport;
