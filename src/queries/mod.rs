//! Statement operations: thin adapters over [Storage](crate::Storage).

mod create;
mod insert;
mod select;

pub use create::CreateQuery;
pub use insert::InsertQuery;
pub use select::{Projection, SelectQuery};
