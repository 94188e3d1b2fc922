pub mod store;

pub use store::create_redis_client;
pub use store::RedisProfileStore;
pub use store::StoreKey;
