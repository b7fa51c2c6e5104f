//! Stream relay, fragment sources and repository traits for agentdesk.
//!
//! This crate defines the "ports" (repository traits, the fragment source
//! trait) that the infrastructure layer implements. It depends only on
//! `agentdesk-types` -- never on `agentdesk-infra` or any database/IO crate.

pub mod relay;
pub mod repository;
pub mod service;
pub mod source;

#[cfg(test)]
pub(crate) mod testing;
