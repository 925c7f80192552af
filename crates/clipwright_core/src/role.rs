//! Role types for conversation participants.

use serde::{Deserialize, Serialize};

/// Sender role for a chat message.
///
/// # Examples
///
/// ```
/// use clipwright_core::Role;
///
/// assert_ne!(Role::User, Role::Assistant);
/// assert_eq!(format!("{}", Role::System), "System");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
pub enum Role {
    /// System messages provide context and instructions
    System,
    /// User messages are from the application
    User,
    /// Assistant messages are from the model
    Assistant,
}
