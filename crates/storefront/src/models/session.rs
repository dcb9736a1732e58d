//! Session-related types.
//!
//! The tower-sessions session only carries a key into the in-memory
//! [`crate::services::CartRegistry`]; the cart itself never leaves the
//! process.

/// Session keys.
pub mod keys {
    /// Key for the UUID identifying this session's cart in the registry.
    pub const CART_KEY: &str = "cart_key";
}
