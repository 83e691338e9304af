//! Stream processing for the airmap workspace.
//!
//! * **[`parser`]**: turns capture rows into [`NetworkRecord`]s.
//! * **[`merger`]**: the deduplicated, stable-ordered network collection.
//! * **[`dispatcher`]**: decodes typed device scan messages.
//! * **[`session`]**: stream lifecycle and generation tagging.
//! * **[`aggregator`]**: the synchronous state all of the above feed into.
//! * **[`discovery`]**: runs live subscriptions against the aggregator.
//! * **[`backend`]**: HTTP and Server-Sent Events client for the capture backend.
//!
//! [`NetworkRecord`]: airmap_common::network::record::NetworkRecord

pub mod aggregator;
pub mod backend;
pub mod discovery;
pub mod dispatcher;
pub mod merger;
pub mod parser;
pub mod session;
pub mod vendors;
