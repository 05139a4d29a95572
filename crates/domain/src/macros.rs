//! Macro for implementing Display and FromStr for configuration enums
//!
//! Configuration values such as the document schema variant or the store
//! kind are spelled in lowercase in config files and environment variables.
//! This macro keeps the string mapping in one place and handles
//! case-insensitive parsing.
//!
//! # Example
//!
//! ```rust
//! use shiftsync_domain::impl_config_enum_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Transport {
//!     Put,
//!     Post,
//! }
//!
//! impl_config_enum_conversions!(Transport {
//!     Put => "put",
//!     Post => "post",
//! });
//! ```

/// Implements Display and FromStr traits for configuration enums
///
/// This macro generates:
/// - Display trait: converts enum variants to their lowercase spelling
/// - FromStr trait: parses case-insensitive strings to enum variants
#[macro_export]
macro_rules! impl_config_enum_conversions {
    ($enum_name:ident { $($variant:ident => $str:literal),+ $(,)? }) => {
        impl ::std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                match self {
                    $(Self::$variant => write!(f, $str),)+
                }
            }
        }

        impl ::std::str::FromStr for $enum_name {
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

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Flavor {
        Plain,
        Fancy,
    }

    impl_config_enum_conversions!(Flavor {
        Plain => "plain",
        Fancy => "fancy",
    });

    #[test]
    fn display_uses_lowercase_spelling() {
        assert_eq!(Flavor::Plain.to_string(), "plain");
        assert_eq!(Flavor::Fancy.to_string(), "fancy");
    }

    #[test]
    fn parsing_ignores_case_and_padding() {
        assert_eq!(Flavor::from_str("FANCY").unwrap(), Flavor::Fancy);
        assert_eq!(Flavor::from_str(" Plain ").unwrap(), Flavor::Plain);
    }

    #[test]
    fn parsing_rejects_unknown_values() {
        let result = Flavor::from_str("spicy");
        assert!(result.unwrap_err().contains("Invalid Flavor: spicy"));
    }

    mod with_result_alias {
        #[allow(unused_imports)]
        use crate::errors::Result;

        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum Mode {
            Push,
            Pull,
        }

        impl_config_enum_conversions!(Mode {
            Push => "push",
            Pull => "pull",
        });
    }

    #[test]
    fn expands_next_to_crate_result_alias() {
        use with_result_alias::Mode;
        assert_eq!(Mode::from_str("PULL").unwrap(), Mode::Pull);
        assert_eq!(Mode::Push.to_string(), "push");
    }
}
