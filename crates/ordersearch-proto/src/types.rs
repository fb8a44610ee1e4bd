//! Identifiers and persisted enumerations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseEnumError;

/// Order primary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub i64);

/// Customer primary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(pub i64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Declares an enum persisted as its upper-case snake name.
macro_rules! stored_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Text form as stored in the database.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(ParseEnumError::new($kind, other)),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

stored_enum! {
    /// Lifecycle state of an order.
    OrderStatus, "order status" {
        Pending => "PENDING",
        Confirmed => "CONFIRMED",
        Shipped => "SHIPPED",
        Delivered => "DELIVERED",
        Cancelled => "CANCELLED",
    }
}

stored_enum! {
    /// How a payment was made.
    PaymentMethod, "payment method" {
        CreditCard => "CREDIT_CARD",
        DebitCard => "DEBIT_CARD",
        Paypal => "PAYPAL",
        BankTransfer => "BANK_TRANSFER",
        Cash => "CASH",
    }
}

stored_enum! {
    /// Settlement state of a payment.
    PaymentStatus, "payment status" {
        Pending => "PENDING",
        Completed => "COMPLETED",
        Failed => "FAILED",
        Refunded => "REFUNDED",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_values() {
        assert_eq!("DELIVERED".parse::<OrderStatus>().unwrap(), OrderStatus::Delivered);
        assert_eq!("BANK_TRANSFER".parse::<PaymentMethod>().unwrap(), PaymentMethod::BankTransfer);
        assert_eq!("COMPLETED".parse::<PaymentStatus>().unwrap(), PaymentStatus::Completed);
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        let err = "delivered".parse::<OrderStatus>().unwrap_err();
        assert_eq!(err.kind, "order status");
        assert_eq!(err.value, "delivered");
    }

    #[test]
    fn test_display_matches_storage_text() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), *status);
            assert_eq!(status.to_string(), status.as_str());
        }
    }

    #[test]
    fn test_serde_uses_storage_text() {
        let json = serde_json::to_string(&PaymentMethod::CreditCard).unwrap();
        assert_eq!(json, "\"CREDIT_CARD\"");
        let back: PaymentMethod = serde_json::from_str(&json).unwrap();
        assert_eq!(back, PaymentMethod::CreditCard);
    }
}
