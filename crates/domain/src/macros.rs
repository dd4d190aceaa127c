//! Macro for implementing Display and FromStr for simple string-backed enums
//!
//! # Example
//!
//! ```rust
//! use indexdesk_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Audience {
//!     Admin,
//!     Editor,
//! }
//!
//! impl_domain_status_conversions!(Audience {
//!     Admin => "admin",
//!     Editor => "editor",
//! });
//!
//! assert_eq!("ADMIN".parse::<Audience>().unwrap(), Audience::Admin);
//! assert_eq!(Audience::Editor.to_string(), "editor");
//! ```

/// Implements Display and FromStr for a fieldless enum
///
/// Parsing trims surrounding whitespace and ignores case; display always
/// produces the canonical lowercase form.
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:literal),+ $(,)? }) => {
        impl $enum_name {
            /// Canonical string form
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
