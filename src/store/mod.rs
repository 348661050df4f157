//! Document store abstraction
//!
//! The core only talks to storage through [`Collection`]: selection through
//! [`Selector`], field-level writes through [`Mutation`], and entities through
//! the field table of [`Document`]. [`MemoryDatabase`] is the bundled backend.

mod collection;
mod document;
mod memory;
mod mutation;
mod selector;
mod value;

pub use collection::{Collection, DeleteResult, StoreResult, UpdateResult};
pub use document::{Document, Field};
pub use memory::{MemoryCollection, MemoryDatabase};
pub use mutation::Mutation;
pub use selector::Selector;
pub use value::{FromValue, IntoValue, RecordId, Value};
