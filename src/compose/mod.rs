//! Composition engines
//!
//! - [`build_selector`] turns a sparse filter into a selection predicate
//! - [`build_mutation`] turns a sparse patch into a field-level mutation

mod filter;
mod patch;

pub use filter::{Extremal, ExtremalOrder, SparseFilter, build_selector};
pub use patch::{PatchField, SparsePatch, build_mutation};
