//! Product operations over the HTTP API.

use super::output::{print_json, OutputFormat};
use super::ui::{
    fit, print_empty, print_header, print_hint, print_kv, print_success, print_table_header,
};
use crate::client::handle_error;
use catalog_core::{CreateProductRequest, Product, UpdateProductRequest};
use crossterm::style::Stylize;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct ProductList {
    products: Vec<Product>,
}

#[derive(Debug, Deserialize)]
struct SingleProduct {
    product: Product,
}

#[derive(Debug, Deserialize)]
struct DeletedProduct {
    deleted: Product,
}

/// Print products as a table.
pub fn print_products(products: &[Product]) {
    if products.is_empty() {
        print_empty("No products found. Use 'create' to add one.");
        return;
    }

    print_table_header(&[
        ("ID", 6),
        ("NAME", 28),
        ("PRICE", 12),
        ("STOCK", 8),
        ("CATEGORY", 16),
    ]);
    for p in products {
        println!(
            "  {} {} {:>12} {:>8} {}",
            fit(&p.id.to_string(), 6).cyan(),
            fit(&p.name, 28),
            p.price,
            p.stock,
            fit(p.category.as_deref().unwrap_or("-"), 16).dark_grey()
        );
    }
    println!();
}

fn print_product(title: &str, product: &Product) {
    print_header(title);
    print_kv("ID", &product.id.to_string());
    print_kv("Name", &product.name);
    print_kv("Price", &product.price.to_string());
    print_kv("Stock", &product.stock.to_string());
    print_kv("Category", product.category.as_deref().unwrap_or("-"));
    print_kv("Created", &product.created_at.to_rfc3339());
    println!();
}

/// List products.
pub async fn list_products(
    client: &reqwest::Client,
    base: &str,
    limit: Option<u32>,
    offset: Option<u32>,
    output: OutputFormat,
) -> anyhow::Result<()> {
    let mut query = Vec::new();
    if let Some(limit) = limit {
        query.push(("limit", limit.to_string()));
    }
    if let Some(offset) = offset {
        query.push(("offset", offset.to_string()));
    }
    let url = format!("{}/products", base);
    let resp = client.get(url).query(&query).send().await?;
    let resp = handle_error(resp).await?;
    let list: ProductList = resp.json().await?;

    match output {
        OutputFormat::Json => print_json(&list.products)?,
        OutputFormat::Table => {
            print_header("📦 PRODUCTS");
            println!("  Total: {}", list.products.len().to_string().white().bold());
            println!();
            print_products(&list.products);
            print_hint("Use 'get <id>' to see product details");
        }
    }
    Ok(())
}

pub async fn get_product(
    client: &reqwest::Client,
    base: &str,
    id: i64,
    output: OutputFormat,
) -> anyhow::Result<()> {
    let url = format!("{}/products/{}", base, id);
    let resp = handle_error(client.get(url).send().await?).await?;
    let body: SingleProduct = resp.json().await?;
    match output {
        OutputFormat::Json => print_json(&body.product)?,
        OutputFormat::Table => print_product(&format!("📦 PRODUCT #{}", id), &body.product),
    }
    Ok(())
}

pub async fn create_product(
    client: &reqwest::Client,
    base: &str,
    request: CreateProductRequest,
    output: OutputFormat,
) -> anyhow::Result<()> {
    let url = format!("{}/products", base);
    let resp = handle_error(client.post(url).json(&request).send().await?).await?;
    let body: SingleProduct = resp.json().await?;
    match output {
        OutputFormat::Json => print_json(&body.product)?,
        OutputFormat::Table => {
            print_success(&format!("Product {} created", body.product.id));
            print_product("📦 NEW PRODUCT", &body.product);
        }
    }
    Ok(())
}

pub async fn update_product(
    client: &reqwest::Client,
    base: &str,
    id: i64,
    request: UpdateProductRequest,
    output: OutputFormat,
) -> anyhow::Result<()> {
    let url = format!("{}/products/{}", base, id);
    let resp = handle_error(client.put(url).json(&request).send().await?).await?;
    let body: SingleProduct = resp.json().await?;
    match output {
        OutputFormat::Json => print_json(&body.product)?,
        OutputFormat::Table => {
            print_success(&format!("Product {} updated", id));
            print_product(&format!("📦 PRODUCT #{}", id), &body.product);
        }
    }
    Ok(())
}

pub async fn delete_product(
    client: &reqwest::Client,
    base: &str,
    id: i64,
    output: OutputFormat,
) -> anyhow::Result<()> {
    let url = format!("{}/products/{}", base, id);
    let resp = handle_error(client.delete(url).send().await?).await?;
    let body: Value = resp.json().await?;
    match output {
        OutputFormat::Json => print_json(&body)?,
        OutputFormat::Table => {
            let deleted: DeletedProduct = serde_json::from_value(body)?;
            print_success(&format!(
                "Product {} ({}) deleted",
                deleted.deleted.id, deleted.deleted.name
            ));
        }
    }
    Ok(())
}
