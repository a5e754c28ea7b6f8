//! Catalogue products.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::manage::{Record, StatusFlag};
use crate::types::{CategoryId, Price, ProductId};

/// A product as returned by `/product`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub description: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub price: Price,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub stock: i64,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub discount: Decimal,
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub packaging: String,
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub specification: String,
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub indications: String,
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub instructions: String,
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub origin: String,
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub brand: String,
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub ingredients: String,
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub note: String,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub image: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub is_sales: bool,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub sold_quantity: i64,
    #[serde(default)]
    pub category: Option<CategoryRef>,
    #[serde(default, deserialize_with = "super::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "super::timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// The category embedded in a product response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: CategoryId,
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub name: String,
}

/// Every writable product field.
///
/// Used for both `POST /product/create` and `PUT /product/{id}`; the product
/// forms always submit the whole record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Price,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub stock: i64,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub discount: Decimal,
    #[serde(default)]
    pub packaging: String,
    #[serde(default)]
    pub specification: String,
    #[serde(default)]
    pub indications: String,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub ingredients: String,
    #[serde(default)]
    pub note: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub image: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub is_sales: bool,
}

impl From<&Product> for ProductInput {
    fn from(p: &Product) -> Self {
        Self {
            name: p.name.clone(),
            description: p.description.clone(),
            price: p.price,
            stock: p.stock,
            discount: p.discount,
            packaging: p.packaging.clone(),
            specification: p.specification.clone(),
            indications: p.indications.clone(),
            instructions: p.instructions.clone(),
            origin: p.origin.clone(),
            brand: p.brand.clone(),
            ingredients: p.ingredients.clone(),
            note: p.note.clone(),
            category_id: p.category_id,
            image: p.image.clone(),
            is_sales: p.is_sales,
        }
    }
}

impl Record for Product {
    type Id = ProductId;

    fn id(&self) -> ProductId {
        self.id
    }
}

impl StatusFlag for Product {
    fn flag(&self) -> bool {
        self.is_sales
    }

    fn set_flag(&mut self, value: bool) {
        self.is_sales = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_with_embedded_category() {
        let json = r#"{
            "id": 5, "name": "Paracetamol 500mg", "price": 35000, "stock": 120,
            "discount": 0, "brand": "DHG", "packaging": null, "category_id": 2,
            "image": "https://cdn.example.com/p5.png", "is_sales": true,
            "category": {"id": 2, "name": "Giảm đau"}
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.packaging, "");
        assert_eq!(product.category.as_ref().unwrap().name, "Giảm đau");
        assert_eq!(product.sold_quantity, 0);
    }

    #[test]
    fn test_input_omits_missing_category() {
        let input = ProductInput {
            name: "Vitamin C".into(),
            price: Price::new(Decimal::new(60_000, 0)),
            ..ProductInput::default()
        };
        let json = serde_json::to_value(&input).unwrap();
        assert!(json.get("category_id").is_none());
        assert_eq!(json["price"], serde_json::json!(60000.0));
    }

    #[test]
    fn test_null_numbers_and_flags_read_as_defaults() {
        let json = r#"{"data":[{
            "id": 7, "name": "Men vi sinh", "price": null, "stock": null,
            "discount": null, "is_sales": null, "sold_quantity": null, "category_id": null
        }],"totalPages":null}"#;
        let page: crate::list::Page<Product> = serde_json::from_str(json).unwrap();
        let product = page.data.first().unwrap();
        assert_eq!(product.price, Price::default());
        assert_eq!(product.stock, 0);
        assert_eq!(product.discount, Decimal::ZERO);
        assert!(!product.is_sales);
        assert_eq!(product.sold_quantity, 0);
        assert_eq!(product.category_id, None);
        assert_eq!(page.page_count(), 1);
    }
}
