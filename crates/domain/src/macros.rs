//! Macro for implementing Display and FromStr for status-like enums
//!
//! Every enum persisted as a TEXT column (appointment status, end-condition
//! discriminants, audit actions) goes through this macro so the stored
//! representation and the parser can never drift apart.
//!
//! # Example
//!
//! ```rust
//! use cadence_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Shift {
//!     Morning,
//!     Evening,
//! }
//!
//! impl_domain_status_conversions!(Shift {
//!     Morning => "morning",
//!     Evening => "evening",
//! });
//!
//! assert_eq!(Shift::Evening.to_string(), "evening");
//! assert_eq!("MORNING".parse::<Shift>().unwrap(), Shift::Morning);
//! ```

/// Implements `Display`, `FromStr` and `as_str` for unit-only enums.
///
/// Parsing is case-insensitive; failures surface as
/// [`CadenceError::Validation`](crate::CadenceError::Validation) naming the
/// enum and the rejected input.
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl $enum_name {
            /// Stable string representation used for storage.
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
            type Err = $crate::CadenceError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err($crate::CadenceError::Validation(format!(
                        "invalid {}: {}",
                        stringify!($enum_name),
                        s
                    ))),
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use crate::CadenceError;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Room {
        Front,
        Back,
    }

    impl_domain_status_conversions!(Room {
        Front => "front",
        Back => "back_office",
    });

    #[test]
    fn display_uses_storage_string() {
        assert_eq!(Room::Front.to_string(), "front");
        assert_eq!(Room::Back.as_str(), "back_office");
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(Room::from_str("FRONT").unwrap(), Room::Front);
        assert_eq!(Room::from_str("Back_Office").unwrap(), Room::Back);
    }

    #[test]
    fn parse_failure_is_a_validation_error() {
        let err = Room::from_str("cellar").unwrap_err();
        assert_eq!(err, CadenceError::Validation("invalid Room: cellar".into()));
    }
}
