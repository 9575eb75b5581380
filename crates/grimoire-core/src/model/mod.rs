pub mod actor;
pub mod entity;

pub use actor::{Actor, Item, Synthetics, TokenOverrides};
pub use entity::{AnySchema, BaseEntity, EntitySchema, SpellSchema};
