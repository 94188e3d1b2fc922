pub mod postgres;
pub mod profile_store;
pub mod redis;

pub use postgres::create_pool;
pub use profile_store::{InMemoryProfileStore, ProfileStore};
pub use self::redis::create_redis_client;
pub use self::redis::RedisProfileStore;
