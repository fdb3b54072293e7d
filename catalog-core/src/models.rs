use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};

pub const NAME_MAX_CHARS: usize = 100;
pub const CATEGORY_MAX_CHARS: usize = 50;
pub const PRICE_MAX: i64 = 1_000_000_000;
pub const STOCK_MAX: i32 = 1_000_000;
pub const DEFAULT_PAGE_LIMIT: i64 = 100;
pub const MAX_PAGE_LIMIT: i64 = 100;

/// A row of the `products` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: i64,
    pub stock: i32,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /products`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateProductRequest {
    pub name: Option<String>,
    pub price: Option<i64>,
    pub stock: Option<i32>,
    pub category: Option<String>,
}

/// Body of `PUT /products/:id`; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub price: Option<i64>,
    pub stock: Option<i32>,
    pub category: Option<String>,
}

/// Validated insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub price: i64,
    pub stock: i32,
    pub category: Option<String>,
}

/// Validated partial update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub price: Option<i64>,
    pub stock: Option<i32>,
    pub category: Option<String>,
}

impl CreateProductRequest {
    pub fn validate(self) -> Result<NewProduct> {
        let name = self
            .name
            .ok_or_else(|| CatalogError::validation("name and price are required"))?;
        let price = self
            .price
            .ok_or_else(|| CatalogError::validation("name and price are required"))?;

        Ok(NewProduct {
            name: validate_name(&name)?,
            price: validate_price(price)?,
            stock: validate_stock(self.stock.unwrap_or(0))?,
            category: self.category.as_deref().map(validate_category).transpose()?.flatten(),
        })
    }
}

impl UpdateProductRequest {
    pub fn validate(self) -> Result<ProductChanges> {
        Ok(ProductChanges {
            name: self.name.as_deref().map(validate_name).transpose()?,
            price: self.price.map(validate_price).transpose()?,
            stock: self.stock.map(validate_stock).transpose()?,
            category: self.category.as_deref().map(validate_category).transpose()?.flatten(),
        })
    }
}

fn validate_name(raw: &str) -> Result<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(CatalogError::validation("name must not be empty"));
    }
    if name.chars().count() > NAME_MAX_CHARS {
        return Err(CatalogError::validation(format!(
            "name must be at most {NAME_MAX_CHARS} characters"
        )));
    }
    Ok(name.to_string())
}

fn validate_price(price: i64) -> Result<i64> {
    if !(0..=PRICE_MAX).contains(&price) {
        return Err(CatalogError::validation(format!(
            "price must be between 0 and {PRICE_MAX}"
        )));
    }
    Ok(price)
}

fn validate_stock(stock: i32) -> Result<i32> {
    if !(0..=STOCK_MAX).contains(&stock) {
        return Err(CatalogError::validation(format!(
            "stock must be between 0 and {STOCK_MAX}"
        )));
    }
    Ok(stock)
}

// 空字符串视为未填写
fn validate_category(raw: &str) -> Result<Option<String>> {
    let category = raw.trim();
    if category.is_empty() {
        return Ok(None);
    }
    if category.chars().count() > CATEGORY_MAX_CHARS {
        return Err(CatalogError::validation(format!(
            "category must be at most {CATEGORY_MAX_CHARS} characters"
        )));
    }
    Ok(Some(category.to_string()))
}

/// `LIMIT`/`OFFSET` window for listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

impl Page {
    /// Build from raw query-string values. Unparsable values fall back to the
    /// defaults; the limit is clamped to `1..=100`, the offset to `>= 0`.
    pub fn from_query(limit: Option<&str>, offset: Option<&str>) -> Self {
        let limit = limit
            .and_then(|v| v.trim().parse::<i64>().ok())
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .clamp(1, MAX_PAGE_LIMIT);
        let offset = offset
            .and_then(|v| v.trim().parse::<i64>().ok())
            .unwrap_or(0)
            .max(0);
        Self { limit, offset }
    }

    /// Parse a raw query string such as `limit=10&offset=20`. Repeated keys
    /// keep their first value; unknown keys are ignored.
    pub fn from_query_string(raw: Option<&str>) -> Self {
        let mut limit = None;
        let mut offset = None;
        for (key, value) in url::form_urlencoded::parse(raw.unwrap_or_default().as_bytes()) {
            match key.as_ref() {
                "limit" if limit.is_none() => limit = Some(value),
                "offset" if offset.is_none() => offset = Some(value),
                _ => {}
            }
        }
        Self::from_query(limit.as_deref(), offset.as_deref())
    }
}

/// Parse the `:id` path segment.
pub fn parse_product_id(raw: &str) -> Result<i64> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(CatalogError::validation(format!("invalid product id: {raw}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(name: &str, price: i64) -> CreateProductRequest {
        CreateProductRequest {
            name: Some(name.to_string()),
            price: Some(price),
            ..Default::default()
        }
    }

    #[test]
    fn create_requires_name_and_price() {
        let missing_price = CreateProductRequest {
            name: Some("Mouse".into()),
            ..Default::default()
        };
        assert!(matches!(
            missing_price.validate(),
            Err(CatalogError::Validation(_))
        ));
        assert!(CreateProductRequest::default().validate().is_err());
    }

    #[test]
    fn create_defaults_stock_and_trims() {
        let product = CreateProductRequest {
            name: Some("  Keyboard ".into()),
            price: Some(45_000),
            stock: None,
            category: Some("   ".into()),
        }
        .validate()
        .unwrap();
        assert_eq!(
            product,
            NewProduct {
                name: "Keyboard".into(),
                price: 45_000,
                stock: 0,
                category: None,
            }
        );
    }

    #[test]
    fn name_length_cap() {
        assert!(create(&"a".repeat(100), 1).validate().is_ok());
        assert!(create(&"a".repeat(101), 1).validate().is_err());
        // counted in characters, not bytes
        assert!(create(&"가".repeat(100), 1).validate().is_ok());
        assert!(create("   ", 1).validate().is_err());
    }

    #[test]
    fn numeric_ranges() {
        assert!(create("x", -1).validate().is_err());
        assert!(create("x", 0).validate().is_ok());
        assert!(create("x", PRICE_MAX + 1).validate().is_err());

        let mut negative_stock = create("x", 1);
        negative_stock.stock = Some(-3);
        assert!(negative_stock.validate().is_err());
    }

    #[test]
    fn category_cap() {
        let mut req = create("x", 1);
        req.category = Some("c".repeat(51));
        assert!(req.validate().is_err());
    }

    #[test]
    fn update_validates_present_fields_only() {
        assert_eq!(
            UpdateProductRequest::default().validate().unwrap(),
            ProductChanges::default()
        );
        let bad = UpdateProductRequest {
            price: Some(-1),
            ..Default::default()
        };
        assert!(bad.validate().is_err());
        let changes = UpdateProductRequest {
            stock: Some(7),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(changes.stock, Some(7));
        assert_eq!(changes.name, None);
    }

    #[test]
    fn page_parsing_falls_back_and_clamps() {
        assert_eq!(Page::from_query(None, None), Page::default());
        assert_eq!(
            Page::from_query(Some("abc"), Some("-4")),
            Page {
                limit: 100,
                offset: 0
            }
        );
        assert_eq!(Page::from_query(Some("500"), Some("20")).limit, 100);
        assert_eq!(Page::from_query(Some("0"), None).limit, 1);
        assert_eq!(
            Page::from_query(Some(" 10 "), Some("30")),
            Page {
                limit: 10,
                offset: 30
            }
        );
    }

    #[test]
    fn page_from_raw_query_string() {
        assert_eq!(Page::from_query_string(None), Page::default());
        assert_eq!(
            Page::from_query_string(Some("limit=5&limit=6&offset=%32")),
            Page {
                limit: 5,
                offset: 2
            }
        );
        assert_eq!(
            Page::from_query_string(Some("limit&offset=abc&sort=name")),
            Page::default()
        );
    }

    #[test]
    fn product_id_must_be_positive_integer() {
        assert_eq!(parse_product_id("42").unwrap(), 42);
        assert!(parse_product_id("0").is_err());
        assert!(parse_product_id("abc").is_err());
        assert!(parse_product_id("-1").is_err());
    }
}
