//! Key-value backends.
//!
//! - **In-memory** - shared `HashMap`, for development and tests
//! - **Redis** - one `Redis` key per item, bincode-encoded
//! - **DynamoDB** (feature `dynamodb`) - one DynamoDB table per collection

pub mod key_value_memory;
pub mod key_value_redis;
#[cfg(feature = "dynamodb")]
pub mod key_value_dynamodb;

// Re-exports
pub use key_value_memory::InMemoryKeyValueStore;
pub use key_value_redis::RedisKeyValueStore;
#[cfg(feature = "dynamodb")]
pub use key_value_dynamodb::DynamoDbKeyValueStore;
