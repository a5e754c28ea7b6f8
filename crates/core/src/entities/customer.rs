//! Customer accounts with their addresses and orders.
//!
//! Addresses and orders are only ever read; the dashboard shows them on the
//! customer detail page and never edits them.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::manage::{Record, StatusFlag};
use crate::types::{AddressId, CustomerId, OrderId, Price};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    /// Read the API's gender string. Blank or unrecognised values are `None`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "male" => Some(Self::Male),
            "female" => Some(Self::Female),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Male => "Nam",
            Self::Female => "Nữ",
            Self::Other => "Khác",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn lenient_gender<'de, D>(deserializer: D) -> Result<Option<Gender>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(Gender::parse))
}

/// A customer as returned by `/customer`.
///
/// `addresses` and `orders` are present on `GET /customer/{id}` and usually
/// absent from list responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub email: String,
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub phonenumber: String,
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub fullname: String,
    #[serde(default)]
    pub google_id: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default, deserialize_with = "lenient_gender")]
    pub gender: Option<Gender>,
    #[serde(default, deserialize_with = "super::timestamp")]
    pub birthday: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub is_verified: bool,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub is_active: bool,
    #[serde(default, deserialize_with = "super::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "super::timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub addresses: Vec<Address>,
    #[serde(default)]
    pub orders: Vec<Order>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub recipient_name: String,
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub phonenumber: String,
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub address: String,
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub ward: String,
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub district: String,
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub city: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub is_default: bool,
}

impl Address {
    /// `address, ward, district, city`, skipping blank parts.
    #[must_use]
    pub fn one_line(&self) -> String {
        join_parts(&[&self.address, &self.ward, &self.district, &self.city])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub total_price: Price,
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub status: String,
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub payment_method: String,
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub payment_status: String,
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub recipient_name: String,
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub phone_number: String,
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub address: String,
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub ward: String,
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub district: String,
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub city: String,
    #[serde(default, deserialize_with = "super::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Shipping address on one line.
    #[must_use]
    pub fn shipping_address(&self) -> String {
        join_parts(&[&self.address, &self.ward, &self.district, &self.city])
    }
}

fn join_parts(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Body of `POST /customer/create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCustomer {
    pub email: String,
    pub password: String,
    pub fullname: String,
    #[serde(default)]
    pub phonenumber: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
}

/// Partial body of `PUT /customer/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateCustomer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fullname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phonenumber: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
}

impl Record for Customer {
    type Id = CustomerId;

    fn id(&self) -> CustomerId {
        self.id
    }
}

impl StatusFlag for Customer {
    fn flag(&self) -> bool {
        self.is_active
    }

    fn set_flag(&mut self, value: bool) {
        self.is_active = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_customer_detail_with_nested_lists() {
        let json = r#"{
            "id": 9,
            "email": "an@example.com",
            "phonenumber": "0901234567",
            "fullname": "Trần An",
            "gender": "female",
            "birthday": "1998-03-14",
            "is_verified": true,
            "is_active": false,
            "created_at": "2024-01-02T03:04:05.000Z",
            "addresses": [{
                "id": 1, "recipient_name": "Trần An", "phonenumber": "0901234567",
                "address": "12 Lý Thường Kiệt", "ward": "Phường 7", "district": "Quận 10",
                "city": "TP.HCM", "is_default": true
            }],
            "orders": [{
                "id": 100, "total_price": "250000.00", "status": "pending",
                "payment_method": "cod", "payment_status": "unpaid",
                "recipient_name": "Trần An", "phone_number": "0901234567",
                "address": "12 Lý Thường Kiệt", "ward": "", "district": "Quận 10", "city": "TP.HCM"
            }]
        }"#;
        let customer: Customer = serde_json::from_str(json).unwrap();
        assert_eq!(customer.gender, Some(Gender::Female));
        assert!(customer.birthday.is_some());
        assert_eq!(customer.addresses.len(), 1);
        assert_eq!(
            customer.addresses.first().unwrap().one_line(),
            "12 Lý Thường Kiệt, Phường 7, Quận 10, TP.HCM"
        );
        let order = customer.orders.first().unwrap();
        assert_eq!(order.total_price.to_string(), "250.000 VNĐ");
        assert_eq!(order.shipping_address(), "12 Lý Thường Kiệt, Quận 10, TP.HCM");
    }

    #[test]
    fn test_list_row_without_nested_lists() {
        let customer: Customer =
            serde_json::from_str(r#"{"id":2,"email":"b@example.com","is_active":true}"#).unwrap();
        assert!(customer.addresses.is_empty());
        assert!(customer.orders.is_empty());
        assert!(customer.gender.is_none());
    }

    #[test]
    fn test_blank_and_unknown_gender_are_none() {
        let json = r#"{"data":[
            {"id":1,"fullname":"A","gender":""},
            {"id":2,"fullname":"B","gender":"unspecified"},
            {"id":3,"fullname":"C","gender":null},
            {"id":4,"fullname":"D","gender":"Male"}
        ],"totalPages":1}"#;
        let page: crate::list::Page<Customer> = serde_json::from_str(json).unwrap();
        let genders: Vec<_> = page.data.iter().map(|c| c.gender).collect();
        assert_eq!(genders, vec![None, None, None, Some(Gender::Male)]);
    }

    #[test]
    fn test_null_flags_read_as_false() {
        let customer: Customer =
            serde_json::from_str(r#"{"id":5,"is_verified":null,"is_active":null,"addresses":[]}"#).unwrap();
        assert!(!customer.is_verified);
        assert!(!customer.is_active);
    }
}
