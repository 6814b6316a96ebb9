//! Error types for template resolution.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error categories reported by the resolver.
///
/// These categories are stable and used for automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    /// The referenced template file does not exist.
    TemplateNotFound,
    /// The template parsed, but its root is not a mapping (or a content
    /// field has an unusable shape).
    InvalidTemplate,
    /// The template file could not be read or parsed.
    LoadError,
    /// A legacy parent-reference key (`inherits`, `parentRef`) is present.
    UnsupportedInheritanceKey,
    /// `extends` is present but is not a non-empty string.
    InvalidExtendsFormat,
    /// A top-level key outside {metadata, placeholders, template, extends}.
    UnknownField,
    /// The `placeholders` field is not a mapping.
    InvalidPlaceholders,
    /// A placeholder entry is not a mapping.
    InvalidPlaceholder,
    /// A placeholder is missing its `type` field.
    MissingType,
    /// A placeholder declares a type outside the supported enumeration.
    InvalidType,
    /// An array placeholder does not declare `items`.
    MissingItems,
    /// The inheritance chain revisits a template.
    CircularInheritance,
    /// A descendant redeclares a placeholder with a different type.
    TypeConflict,
    /// A descendant weakens an inherited `required: true` constraint.
    ConstraintWeakening,
    /// The merged result carries a field outside the content allowlist.
    NonContentField,
    /// The merged result carries duplicate placeholder names.
    DuplicatePlaceholders,
    /// Catch-all; preserves the original message.
    UnknownError,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TemplateNotFound => write!(f, "TEMPLATE_NOT_FOUND"),
            Self::InvalidTemplate => write!(f, "INVALID_TEMPLATE"),
            Self::LoadError => write!(f, "LOAD_ERROR"),
            Self::UnsupportedInheritanceKey => write!(f, "UNSUPPORTED_INHERITANCE_KEY"),
            Self::InvalidExtendsFormat => write!(f, "INVALID_EXTENDS_FORMAT"),
            Self::UnknownField => write!(f, "UNKNOWN_FIELD"),
            Self::InvalidPlaceholders => write!(f, "INVALID_PLACEHOLDERS"),
            Self::InvalidPlaceholder => write!(f, "INVALID_PLACEHOLDER"),
            Self::MissingType => write!(f, "MISSING_TYPE"),
            Self::InvalidType => write!(f, "INVALID_TYPE"),
            Self::MissingItems => write!(f, "MISSING_ITEMS"),
            Self::CircularInheritance => write!(f, "CIRCULAR_INHERITANCE"),
            Self::TypeConflict => write!(f, "TYPE_CONFLICT"),
            Self::ConstraintWeakening => write!(f, "CONSTRAINT_WEAKENING"),
            Self::NonContentField => write!(f, "NON_CONTENT_FIELD"),
            Self::DuplicatePlaceholders => write!(f, "DUPLICATE_PLACEHOLDERS"),
            Self::UnknownError => write!(f, "UNKNOWN_ERROR"),
        }
    }
}

/// A template resolution failure.
///
/// Uniform across all phases: the first violation found aborts the call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveError {
    /// Category from the registry above.
    pub category: ErrorCategory,
    /// Human-readable, single-line message.
    pub message: String,
    /// The template reference the failure was detected on, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_ref: Option<String>,
}

impl ResolveError {
    /// Create an error without a template reference.
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            template_ref: None,
        }
    }

    /// Create an error attributed to a template reference.
    pub fn with_ref(
        category: ErrorCategory,
        message: impl Into<String>,
        template_ref: impl Into<String>,
    ) -> Self {
        Self {
            category,
            message: message.into(),
            template_ref: Some(template_ref.into()),
        }
    }

    /// Create a TEMPLATE_NOT_FOUND error.
    pub fn template_not_found(template_ref: &str) -> Self {
        Self::with_ref(
            ErrorCategory::TemplateNotFound,
            format!("template not found: {}", template_ref),
            template_ref,
        )
    }

    /// Create a LOAD_ERROR.
    pub fn load_error(template_ref: &str, detail: impl fmt::Display) -> Self {
        Self::with_ref(
            ErrorCategory::LoadError,
            format!("failed to load template: {}", detail),
            template_ref,
        )
    }

    /// Create an INVALID_TEMPLATE error.
    pub fn invalid_template(template_ref: &str, detail: impl fmt::Display) -> Self {
        Self::with_ref(
            ErrorCategory::InvalidTemplate,
            format!("invalid template: {}", detail),
            template_ref,
        )
    }

    /// Create a CIRCULAR_INHERITANCE error naming the revisited reference.
    pub fn circular_inheritance(template_ref: &str) -> Self {
        Self::with_ref(
            ErrorCategory::CircularInheritance,
            format!("circular inheritance detected: {}", template_ref),
            template_ref,
        )
    }

    /// Create an UNKNOWN_ERROR preserving the original message.
    pub fn unknown(detail: impl fmt::Display) -> Self {
        Self::new(
            ErrorCategory::UnknownError,
            format!("unexpected error during template resolution: {}", detail),
        )
    }
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.category, self.message)
    }
}

impl std::error::Error for ResolveError {}
