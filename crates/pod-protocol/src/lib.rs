//! Resource protocol handler for the pod resource store.
//!
//! A [`Pod`] owns the `resources` table of a [`RowStore`] and answers
//! HTTP-like requests against absolute URLs:
//!
//! - `GET` returns a resource's body and content type
//! - `PUT` creates or wholesale replaces a resource
//! - `DELETE` removes a resource (never the root)
//!
//! Every failure is reported as a [`Response`] with one of the statuses in
//! [`status`]; `handle_request` never returns an error.
//!
//! [`RowStore`]: pod_store::RowStore

pub mod config;
pub mod error;
pub mod message;
pub mod pod;

pub use config::PodConfig;
pub use error::{ProtocolError, ProtocolResult};
pub use message::{headers, reason, status, Method, Request, Response};
pub use pod::{Pod, RESOURCES_TABLE};
