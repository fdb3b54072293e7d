mod database;
mod output;
mod products;
pub mod ui;

pub use database::{init_db, ping_db};
pub use output::OutputFormat;
pub use products::{create_product, delete_product, get_product, list_products, update_product};
