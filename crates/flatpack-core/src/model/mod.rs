//! Static, per-type entity descriptors.
//!
//! An `EntityModel` is built once per entity type (usually as a `static`)
//! and stands in for runtime reflection: it lists the declared fields in
//! order, links to the ancestor model, and names reference targets for
//! dangling-reference repair.
//!
//! In general:
//! - `model` describes *what an entity type declares*
//! - `graph` holds *instances* of those types
pub mod entity;
pub mod field;
pub mod registry;
