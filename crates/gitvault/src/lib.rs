//! gitvault - mirror repositories from code-hosting sources to local disk.
//!
//! The library discovers repositories through [`source::RepoSource`]
//! adapters (GitHub, GitLab), materializes a local mirror of each with the
//! [`mirror::MirrorEngine`], and summarizes the run for a webhook via
//! [`notify::Notifier`]. [`run::run`] ties the pieces together; the CLI
//! crate only adds configuration and exit codes on top.

pub mod github;
pub mod gitlab;
pub mod http;
pub mod mem;
pub mod mirror;
pub mod notify;
pub mod run;
pub mod source;

pub use mirror::{MirrorEngine, SyncError, SyncOutcome};
pub use notify::{DeliveryError, Notifier};
pub use run::{run, RunOptions, RunReport, RunStatus};
pub use source::{RemoteRepo, RepoSource, SourceError};
