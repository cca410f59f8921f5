//! The signed-in user record.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

#[cfg(feature = "ts")]
use ts_rs::TS;

/// Role attached to a user account.
///
/// The server treats roles as an open set of strings. The ones the client
/// gates on get their own variant; anything else is kept verbatim so it
/// survives a store round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Seller,
    Admin,
    Dealer,
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::Seller => "seller",
            Role::Admin => "admin",
            Role::Dealer => "dealer",
            Role::Other(s) => s.as_str(),
        }
    }

    /// Area a freshly restored session lands on when it starts at the root.
    /// `None` means stay where we are.
    pub fn landing_path(&self) -> Option<&'static str> {
        match self {
            Role::Dealer => Some("/dealer"),
            _ => None,
        }
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        match s.as_str() {
            "seller" => Role::Seller,
            "admin" => Role::Admin,
            "dealer" => Role::Dealer,
            _ => Role::Other(s),
        }
    }
}

impl From<&str> for Role {
    fn from(s: &str) -> Self {
        Role::from(s.to_string())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User profile as served by `GET /me` and persisted under the `user` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(TS), ts(export))]
pub struct UserRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mid_name: Option<String>,
    pub last_name: String,
    pub email: String,
    #[serde(rename = "phoneNo", default, skip_serializing_if = "Option::is_none")]
    pub phone_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[cfg_attr(feature = "ts", ts(type = "string"))]
    pub role: Role,
}

impl UserRecord {
    pub fn full_name(&self) -> String {
        match self.mid_name.as_deref().filter(|m| !m.is_empty()) {
            Some(mid) => format!("{} {} {}", self.first_name, mid, self.last_name),
            None => format!("{} {}", self.first_name, self.last_name),
        }
    }
}

/// Some backends hand out numeric ids, others strings.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Str(String),
        Int(i64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Str(s) => s,
        Id::Int(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> UserRecord {
        UserRecord {
            id: "1".to_string(),
            first_name: "Ada".to_string(),
            mid_name: Some("K".to_string()),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone_no: Some("5551234567".to_string()),
            city: Some("London".to_string()),
            address: None,
            role: Role::Seller,
        }
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!(Role::from("seller"), Role::Seller);
        assert_eq!(Role::from("admin"), Role::Admin);
        assert_eq!(Role::from("dealer"), Role::Dealer);
        assert_eq!(Role::from("inspector"), Role::Other("inspector".to_string()));
    }

    #[test]
    fn test_role_landing_path() {
        assert_eq!(Role::Dealer.landing_path(), Some("/dealer"));
        assert_eq!(Role::Admin.landing_path(), None);
        assert_eq!(Role::Seller.landing_path(), None);
    }

    #[test]
    fn test_user_json_round_trip() {
        let user = sample_user();
        let json = serde_json::to_string(&user).unwrap();
        let back: UserRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, user);
    }

    #[test]
    fn test_user_wire_names() {
        let json = serde_json::to_value(sample_user()).unwrap();
        assert_eq!(json["phoneNo"], "5551234567");
        assert_eq!(json["role"], "seller");
        // Absent optionals are not written
        assert!(json.get("address").is_none());
    }

    #[test]
    fn test_user_numeric_id_and_unknown_role() {
        let json = r#"{"id": 42, "first_name": "Bo", "last_name": "Diddley",
            "email": "bo@example.com", "role": "inspector"}"#;
        let user: UserRecord = serde_json::from_str(json).unwrap();
        assert_eq!(user.id, "42");
        assert_eq!(user.role, Role::Other("inspector".to_string()));
        assert_eq!(user.mid_name, None);
        assert_eq!(user.full_name(), "Bo Diddley");

        let again = serde_json::to_value(&user).unwrap();
        assert_eq!(again["role"], "inspector");
    }
}
