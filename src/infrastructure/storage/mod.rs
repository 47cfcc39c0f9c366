pub mod file;
pub mod memory;

use crate::domain::models::KeyValueStore;

pub type StoreBox = Box<dyn KeyValueStore + Send + Sync>;
