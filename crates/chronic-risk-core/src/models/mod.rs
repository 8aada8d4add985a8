//! Domain models for the risk pipeline.

mod record;
mod row;
mod schema;
mod scores;

pub use record::*;
pub use row::*;
pub use schema::*;
pub use scores::*;
