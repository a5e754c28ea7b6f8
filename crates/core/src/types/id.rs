//! Newtype IDs for backend records.
//!
//! Every resource gets its own ID type so a category ID can never be passed
//! where a product ID is expected. The backend uses plain integer keys.

use thiserror::Error;

/// Error returned when an ID cannot be parsed from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid id: {0:?}")]
pub struct ParseIdError(pub String);

/// Define a type-safe ID wrapper around `i32`.
///
/// The generated type is `#[serde(transparent)]`, so it reads and writes the
/// bare integer the API uses, and it parses from path segments and query
/// values via [`core::str::FromStr`].
///
/// ```rust
/// # use pharmacy_admin_core::define_id;
/// define_id!(WarehouseId);
///
/// let id: WarehouseId = "7".parse().unwrap();
/// assert_eq!(id.as_i32(), 7);
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Create a new ID from an i32 value.
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            /// Get the underlying i32 value.
            #[must_use]
            pub const fn as_i32(&self) -> i32 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::types::id::ParseIdError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                s.trim()
                    .parse::<i32>()
                    .map(Self)
                    .map_err(|_| $crate::types::id::ParseIdError(s.to_owned()))
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(AdminId);
define_id!(CategoryId);
define_id!(CustomerId);
define_id!(ProductId);
define_id!(StoreId);
define_id!(AddressId);
define_id!(OrderId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_is_bare_integer_on_the_wire() {
        let id = ProductId::new(42);
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");
        let back: ProductId = serde_json::from_str("42").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_id_parses_from_text() {
        assert_eq!("15".parse::<CategoryId>().unwrap(), CategoryId::new(15));
        assert_eq!(" 3 ".parse::<CategoryId>().unwrap(), CategoryId::new(3));
        assert!("abc".parse::<CategoryId>().is_err());
        assert!("".parse::<CategoryId>().is_err());
    }
}
