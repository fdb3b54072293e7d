mod health;
mod products;

pub use health::{handler_404, handler_405, health, health_db};
pub use products::{create_product, delete_product, get_product, list_products, update_product};
