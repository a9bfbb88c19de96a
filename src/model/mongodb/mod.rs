mod bson;
mod collection;

pub use bson::{is_duplicate_key, Id};
pub use collection::{ensure_indexes_exist, Coll, MongoCollection};
