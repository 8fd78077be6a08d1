//! Branch lifecycle knowledge: ordered maintenance branches, closure dates,
//! per-repository exception tables, and the registry that binds them to
//! repository slugs.
//!
//! The branch order encodes the backport cascade: a pull request milestoned
//! to the branch at index `i` is expected in every branch at index `j >= i`
//! and in none before it.

pub mod exceptions;
pub mod model;
pub mod registry;

pub use exceptions::ExceptionTables;
pub use model::{BranchModel, BranchWindow, earliest_expected_branch};
pub use registry::{Registry, RepositoryPolicy};
