//! Direct database operations (no API server involved).

use super::output::{print_json, OutputFormat};
use super::products::print_products;
use super::ui::{
    finish_progress_error, finish_progress_success, print_header, print_kv, print_progress,
    print_warning,
};
use catalog_core::{schema, Page, PgProductStore, ProductStore};
use serde_json::json;

async fn connect(database_url: Option<&str>) -> anyhow::Result<PgProductStore> {
    let url = database_url
        .ok_or_else(|| anyhow::anyhow!("--database-url (or DATABASE_URL) is required"))?;
    Ok(PgProductStore::connect(url, 1).await?)
}

/// 建表并（可选）写入示例数据，然后打印当前数据。
pub async fn init_db(
    database_url: Option<&str>,
    seed: bool,
    output: OutputFormat,
) -> anyhow::Result<()> {
    let store = connect(database_url).await?;

    if output == OutputFormat::Table {
        print_header("🗄  DATABASE INIT");
        print_progress("Creating products table");
    }
    if let Err(e) = schema::init_schema(store.pool()).await {
        if output == OutputFormat::Table {
            finish_progress_error("Failed to create products table");
        }
        return Err(e.into());
    }
    if output == OutputFormat::Table {
        finish_progress_success("Products table ready");
    }

    let inserted = if seed {
        schema::seed_if_empty(store.pool()).await?
    } else {
        0
    };
    let products = store.list(Page::default()).await?;

    match output {
        OutputFormat::Json => print_json(&json!({
            "seeded": inserted,
            "products": products,
        }))?,
        OutputFormat::Table => {
            if seed && inserted == 0 {
                print_warning("Table already has rows, sample data not inserted");
            } else {
                print_kv("Seeded", &inserted.to_string());
            }
            println!();
            print_products(&products);
        }
    }
    Ok(())
}

/// Run `SELECT 1` against the database.
pub async fn ping_db(database_url: Option<&str>, output: OutputFormat) -> anyhow::Result<()> {
    let store = connect(database_url).await?;
    if output == OutputFormat::Table {
        print_progress("Pinging database");
    }
    match store.ping().await {
        Ok(ok) => {
            match output {
                OutputFormat::Json => print_json(&json!({ "ok": true, "result": { "ok": ok } }))?,
                OutputFormat::Table => finish_progress_success("Database reachable"),
            }
            Ok(())
        }
        Err(e) => {
            if output == OutputFormat::Table {
                finish_progress_error("Database unreachable");
            }
            Err(e.into())
        }
    }
}
