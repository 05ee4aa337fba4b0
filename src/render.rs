//! Rendering of builder objects to SoQL clause text.

use crate::error::SodaResult;

/// Trait for converting builder objects to SoQL strings.
///
/// Rendering is a pure read: calling it repeatedly on the same object
/// yields the same string.
pub trait ToSoql {
    /// Convert this node to a SoQL string.
    fn to_soql(&self) -> SodaResult<String>;
}
