//! Catalog inputs: categories, products and suppliers

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation::{required, validate_non_negative_price, validate_not_blank, InputError};

/// Body of `POST /categories`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CategoryInput {
    #[validate(
        required(message = "Category name is required"),
        custom = "validate_not_blank"
    )]
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDraft {
    pub name: String,
    pub description: Option<String>,
}

impl CategoryInput {
    pub fn parse(self) -> Result<CategoryDraft, InputError> {
        self.validate()?;
        Ok(CategoryDraft {
            name: required(self.name, "name")?.trim().to_string(),
            description: non_empty(self.description),
        })
    }
}

/// Body of `POST /products`
///
/// `quantity` is the opening stock and is only accepted on creation; later
/// changes go through stock movements.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateProductInput {
    #[validate(required, custom = "validate_not_blank")]
    pub name: Option<String>,

    #[validate(required, range(min = 0, message = "quantity cannot be negative"))]
    pub quantity: Option<i32>,

    #[validate(required, custom = "validate_non_negative_price")]
    pub price: Option<Decimal>,

    pub category_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    pub name: String,
    pub quantity: i32,
    pub price: Decimal,
    pub category_id: Option<i64>,
}

impl CreateProductInput {
    pub fn parse(self) -> Result<ProductDraft, InputError> {
        self.validate()?;
        Ok(ProductDraft {
            name: required(self.name, "name")?.trim().to_string(),
            quantity: required(self.quantity, "quantity")?,
            price: required(self.price, "price")?,
            category_id: self.category_id,
        })
    }
}

/// Body of `PUT /products/:id`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateProductInput {
    #[validate(required, custom = "validate_not_blank")]
    pub name: Option<String>,

    #[validate(required, custom = "validate_non_negative_price")]
    pub price: Option<Decimal>,

    pub category_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductUpdate {
    pub name: String,
    pub price: Decimal,
    pub category_id: Option<i64>,
}

impl UpdateProductInput {
    pub fn parse(self) -> Result<ProductUpdate, InputError> {
        self.validate()?;
        Ok(ProductUpdate {
            name: required(self.name, "name")?.trim().to_string(),
            price: required(self.price, "price")?,
            category_id: self.category_id,
        })
    }
}

/// Body of `POST /suppliers` and `PUT /suppliers/:id`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SupplierInput {
    #[validate(
        required(message = "Supplier name is required"),
        custom = "validate_not_blank"
    )]
    pub name: Option<String>,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    #[validate(email(message = "email is not a valid address"))]
    pub email: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupplierDraft {
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

impl SupplierInput {
    pub fn parse(self) -> Result<SupplierDraft, InputError> {
        self.validate()?;
        Ok(SupplierDraft {
            name: required(self.name, "name")?.trim().to_string(),
            contact_person: non_empty(self.contact_person),
            phone: non_empty(self.phone),
            email: non_empty(self.email),
            address: non_empty(self.address),
        })
    }
}

/// Treat empty optional strings as absent
fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
