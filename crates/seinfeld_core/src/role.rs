//! Role types for conversation participants.

use serde::{Deserialize, Serialize};

/// Who authored a message in a generation request.
///
/// # Examples
///
/// ```
/// use seinfeld_core::Role;
///
/// assert_ne!(Role::User, Role::Assistant);
/// assert_eq!(format!("{}", Role::System), "system");
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
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Persona and standing instructions
    #[display("system")]
    System,
    /// The task for this turn
    #[display("user")]
    User,
    /// Model output
    #[display("assistant")]
    Assistant,
}
