//! Strongly-typed identifiers used across the domain.
//!
//! Library identifiers (ISBNs, copy barcodes, member numbers) are opaque
//! strings, so every id is a string newtype. Use [`string_id!`] to declare one.

/// Declare a string-backed identifier newtype.
///
/// The generated type is `Clone + Eq + Ord + Hash`, serializes transparently,
/// parses from non-blank strings and can mint fresh time-ordered values.
#[macro_export]
macro_rules! string_id {
    ($(#[$meta:meta])* $t:ident, $name:literal) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $t(String);

        impl $t {
            /// Wrap an existing identifier value.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Mint a fresh identifier.
            ///
            /// Uses UUIDv7 (time-ordered). Prefer passing IDs explicitly in
            /// tests for determinism.
            pub fn generate() -> Self {
                Self($crate::id::__private::Uuid::now_v7().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $t {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl ::core::convert::AsRef<str> for $t {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl ::core::convert::From<&str> for $t {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl ::core::convert::From<String> for $t {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl ::core::str::FromStr for $t {
            type Err = $crate::error::DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err($crate::error::DomainError::invalid_id(format!(
                        "{}: must not be blank",
                        $name
                    )));
                }
                Ok(Self(trimmed.to_string()))
            }
        }
    };
}

#[doc(hidden)]
pub mod __private {
    pub use uuid::Uuid;
}
