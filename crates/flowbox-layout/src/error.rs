//! Error types for layout, shaping and style conversion.
//!
//! None of these abort a layout pass. Structural errors are collected into
//! the result of [`calculate_block_layout`](crate::calculate_block_layout),
//! shaping errors become fallback glyphs, and style errors become a warning
//! plus the property's initial value.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A malformed host element tree.
///
/// Detected while validating the flat element list. The offending subtree is
/// left out of the layout; its siblings are laid out normally.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum LayoutError {
    /// The element names a parent that is not in the element list.
    #[error("element '{element}' references unknown parent '{parent}'")]
    UnknownParent {
        /// Host id of the element.
        element: String,
        /// The parent id that could not be resolved.
        parent: String,
    },
    /// Following parent references from the element leads back to it.
    #[error("element '{element}' is part of a parent cycle")]
    Cycle {
        /// Host id of an element on the cycle.
        element: String,
    },
    /// Two elements share the same id. The first one wins.
    #[error("duplicate element id '{element}'")]
    DuplicateElement {
        /// The repeated host id.
        element: String,
    },
    /// The element list is not empty but no element is a root.
    #[error("element list has no root element")]
    MissingRoot,
}

/// A failure reported by a [`TextShaper`](crate::TextShaper).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    /// The font cascade for the run's style was empty.
    #[error("no font face available for run")]
    NoFontFace,
    /// The shaper could not shape the run.
    #[error("shaping failed: {reason}")]
    Failed {
        /// Human readable description from the shaper.
        reason: String,
    },
}

/// A host style value that could not be converted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StyleError {
    /// A keyword property received a value it does not accept.
    #[error("unknown value '{value}' for '{property}'")]
    UnknownKeyword {
        /// camelCase host property name.
        property: String,
        /// The rejected value.
        value: String,
    },
    /// A length property received something that is not a supported length.
    #[error("invalid length '{value}' for '{property}'")]
    InvalidLength {
        /// camelCase host property name.
        property: String,
        /// The rejected value.
        value: String,
    },
}
