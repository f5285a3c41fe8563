mod bson;
mod collection;
pub mod errors;

pub use bson::{option_datetime_as_bson_datetime, Id};
pub use collection::{ensure_indexes_exist, Coll, MongoCollection};
