//! Path resolution for the pod resource store.
//!
//! Two independent jobs live here:
//!
//! - [`normalize_request_url`] turns a request URL into the canonical,
//!   base-rooted identifier the protocol handler stores rows under. It is
//!   the single place where traversal, containment, encoding, and naming
//!   rules are enforced.
//! - [`resolve_user_path`] turns a human-typed path (`/a`, `..`, `notes/x`)
//!   into an absolute URL relative to a current location. It is an
//!   ergonomics layer only; the handler re-validates whatever it produces.

pub mod error;
pub mod names;
pub mod normalize;
pub mod resolve;

pub use error::{PathError, PathResult};
pub use names::NameRules;
pub use normalize::{normalize_base, normalize_request_url, parent_id};
pub use resolve::resolve_user_path;
