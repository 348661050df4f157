//! Repositories over the reading and account collections

pub mod accounts;
pub mod bulk;
pub mod readings;

pub use accounts::AccountRepository;
pub use readings::ReadingRepository;
