//! Unattended "pull and report" for local git checkouts.
//!
//! This crate keeps working copies in step with their upstream by:
//! - Fetching from the remote
//! - Comparing the checked-out revision with the remote-tracking ref
//! - Listing the commits that are new, one summary line each
//! - Merging them into the working copy
//!
//! All git work is done by the `git` binary through [`git::GitRunner`].

pub mod config;
pub mod constants;
pub mod error;
pub mod git;
pub mod output;
pub mod repo;
pub mod sync;

pub use error::SyncError;
pub use repo::{Repository, is_valid_repository};
pub use sync::{SyncResult, sync};
