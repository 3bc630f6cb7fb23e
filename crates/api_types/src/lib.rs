use serde::{Deserialize, Serialize};

/// Wrapper used by the backend for sign-in, course and member listings.
#[derive(Debug, Serialize, Deserialize)]
pub struct Data<T> {
    pub data: T,
}

/// Body returned by mutations, and by most failures.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

pub mod auth {
    use super::*;

    /// Role carried by the session and by staff records.
    ///
    /// - `admin`: may create and import enquiries, manage courses and staff.
    /// - `user`: works the enquiries assigned to them.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum Role {
        Admin,
        User,
    }

    impl Role {
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Admin => "admin",
                Self::User => "user",
            }
        }

        pub fn is_admin(self) -> bool {
            self == Self::Admin
        }
    }

    impl std::fmt::Display for Role {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(self.as_str())
        }
    }

    impl std::str::FromStr for Role {
        type Err = String;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            match s.trim().to_ascii_lowercase().as_str() {
                "admin" => Ok(Self::Admin),
                "user" => Ok(Self::User),
                other => Err(format!("unknown role {other:?}")),
            }
        }
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SignIn {
        pub email: String,
        pub password: String,
    }

    /// Payload of a successful sign-in, inside [`Data`].
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct SignedIn {
        #[serde(rename = "accessToken")]
        pub access_token: String,
        pub role: Role,
        #[serde(default)]
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ForgotPassword {
        pub email: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct VerifyOtp {
        pub email: String,
        pub otp: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ResetPassword {
        pub email: String,
        pub password: String,
    }
}

pub mod course {
    use super::*;
    use engine::Money;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CourseNew {
        pub title: String,
        pub fee: Money,
    }
}

pub mod staff {
    use super::*;
    use crate::auth::Role;

    /// A staff account as listed by `/user/members`.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Member {
        #[serde(rename = "_id")]
        pub id: String,
        pub name: String,
        #[serde(default)]
        pub email: String,
        pub role: Role,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberNew {
        pub name: String,
        pub email: String,
        pub password: String,
        pub role: Role,
    }
}

pub mod enquiry {
    use super::*;
    use engine::Enquiry;

    /// Query string of `GET /enquiries`.
    ///
    /// Both bounds are ISO-8601 UTC instants with millisecond precision.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct EnquiryRange {
        #[serde(rename = "startDate")]
        pub start_date: String,
        #[serde(rename = "endDate")]
        pub end_date: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct StudentsUpload {
        pub students: Vec<Enquiry>,
    }
}

#[cfg(test)]
mod tests {
    use super::auth::{Role, SignedIn};
    use super::*;

    #[test]
    fn signed_in_reads_backend_names() {
        let body = r#"{"data":{"accessToken":"t0k","role":"admin","name":"Anu"}}"#;
        let parsed: Data<SignedIn> = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.data.access_token, "t0k");
        assert_eq!(parsed.data.role, Role::Admin);
        assert_eq!(parsed.data.name, "Anu");
    }

    #[test]
    fn message_defaults_to_empty() {
        let parsed: MessageResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.message.is_empty());
    }

    #[test]
    fn range_uses_camel_case_query_names() {
        let range = enquiry::EnquiryRange {
            start_date: "a".to_string(),
            end_date: "b".to_string(),
        };
        let json = serde_json::to_value(&range).unwrap();
        assert_eq!(json["startDate"], "a");
        assert_eq!(json["endDate"], "b");
    }
}
