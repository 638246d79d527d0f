//! GitHub issues as a Concourse resource.
//!
//! Issues matching a configured state, label set, and title prefix become
//! pipeline versions ([`resolver`]); finished builds are recorded as exactly
//! one open issue ([`publisher`]); consumed issues are marked by a title
//! rewrite so they never trigger twice ([`tombstone`]). The remote store is
//! reached through the [`store::IssueStore`] contract, implemented for the
//! real API in [`github::client`]. How the CI host invokes these operations
//! is the host's business; [`resource::Resource`] exposes them in the shape
//! it expects.

pub mod build;
pub mod github;
pub mod publisher;
pub mod resolver;
pub mod resource;
pub mod store;
pub mod tombstone;
pub mod version;
