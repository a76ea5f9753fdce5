//! Domain models for the graph store API payloads.
//!
//! Every payload is parsed defensively: absent optional fields default to
//! empty values instead of failing the whole response.

mod category;
mod counts;
mod entity;
mod metadata;
mod nullable;
mod relation;
mod value;

pub use category::CategoryNode;
pub use counts::Counts;
pub use entity::{format_date, Entity, EntityPage, KindPair};
pub use metadata::{MetadataCandidate, MetadataEntry, MetadataMap};
pub use relation::{Relation, RelationBatch};
pub use value::WireValue;
