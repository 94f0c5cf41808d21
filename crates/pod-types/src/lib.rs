//! Foundation types for the pod resource store.
//!
//! This crate provides the data model shared by every other pod crate. A pod
//! holds exactly one kind of entity, the [`Resource`], addressed by its
//! absolute URL. Resources are persisted as attribute bags ([`Row`]) in a
//! keyed table.
//!
//! # Key Types
//!
//! - [`ResourceKind`] -- `Container` or `Object`, derived from the trailing `/`
//! - [`CoreFields`] -- the slice of a row owned by the protocol handler
//! - [`Resource`] -- core fields plus the open extension attribute map
//! - [`Row`] -- the raw attribute bag stored per key
//! - [`Persona`] -- an identity record kept in its own table

pub mod error;
pub mod persona;
pub mod resource;

pub use error::{TypeError, TypeResult};
pub use persona::Persona;
pub use resource::{attrs, CoreFields, Resource, ResourceKind, Row};
