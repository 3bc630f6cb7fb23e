//! Closed enumerations used by enquiries.
//!
//! Each enumeration serializes to the label the backend stores (for example
//! `"Follow up"` or `"Non IT"`) and parses user/CSV input case-insensitively,
//! accepting a few spelling aliases.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::EngineError;

macro_rules! labelled_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $what:literal {
            $( $variant:ident => $label:literal $(| $alias:literal)* ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label $(, alias = $alias)*)]
                $variant,
            )+
        }

        impl $name {
            /// Every value, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Label as stored by the backend.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = EngineError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                $(
                    if wanted.eq_ignore_ascii_case($label)
                        $(|| wanted.eq_ignore_ascii_case($alias))*
                    {
                        return Ok($name::$variant);
                    }
                )+
                Err(EngineError::KeyNotFound(format!("{} {wanted:?}", $what)))
            }
        }
    };
}

labelled_enum! {
    /// Lifecycle status of an enquiry.
    EnquiryStatus, "status" {
        Pending => "Pending",
        FollowUp => "Follow up" | "Follow-up" | "Followup",
        Loss => "Loss",
        Success => "Success",
    }
}

impl Default for EnquiryStatus {
    fn default() -> Self {
        Self::Pending
    }
}

labelled_enum! {
    /// Prior-experience flag ("Are you").
    Experience, "experience" {
        Fresher => "Fresher",
        Experienced => "Experienced" | "Experience",
    }
}

labelled_enum! {
    /// Current employment category.
    WorkSector, "working-in value" {
        It => "IT",
        NonIt => "Non IT" | "Non-IT" | "NonIT",
    }
}

labelled_enum! {
    LearningMode, "learning mode" {
        Online => "Online",
        Offline => "Offline",
    }
}

labelled_enum! {
    /// Where the lead came from.
    LeadSource, "source" {
        Meta => "Meta",
        Instagram => "Instagram",
        Website => "Website",
        Referral => "Referral",
        Direct => "Direct",
    }
}

labelled_enum! {
    PaymentMode, "payment mode" {
        Cash => "Cash",
        Upi => "UPI",
        Card => "Card",
        BankTransfer => "Bank Transfer" | "BankTransfer",
    }
}

labelled_enum! {
    /// Derived payment state of an enquiry. Never set directly, see
    /// [`Ledger::derive`](crate::Ledger::derive).
    PaymentStatus, "payment status" {
        Unpaid => "Unpaid",
        PartiallyPaid => "Partially Paid",
        FullyPaid => "Fully Paid",
    }
}

impl Default for PaymentStatus {
    fn default() -> Self {
        Self::Unpaid
    }
}
