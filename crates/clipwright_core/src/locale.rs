//! Locale selection for prompt templates.

use serde::{Deserialize, Serialize};

/// Locale used to select prompt templates for a job.
///
/// # Examples
///
/// ```
/// use clipwright_core::Locale;
///
/// assert_eq!(format!("{}", Locale::En), "en");
/// assert_eq!(Locale::default(), Locale::En);
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
pub enum Locale {
    /// English templates
    #[default]
    #[serde(rename = "en")]
    #[display("en")]
    En,
    /// Chinese templates
    #[serde(rename = "zh")]
    #[display("zh")]
    Zh,
}
