//! Internal record id generation.

/// Generates primary keys for basic records of code-less grants.
///
/// Ids become primary keys, so they must not collide across processes.
/// Implementations should draw at least 96 bits of randomness.
pub trait IdGenerator: Send + Sync {
    /// Produce a fresh id.
    fn next_id(&self) -> String;
}

/// UUIDv4 generator producing 32 lowercase hex characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> String {
        uuid::Uuid::new_v4().simple().to_string()
    }
}
