//! Core library for the product catalog: request throttling, write access
//! guard, product validation and the storage port with its adapters.

mod clock;
mod error;
mod guard;
mod models;
mod rate_limit;
pub mod schema;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{CatalogError, Result};
pub use guard::{AccessGuard, GuardMode, RequestOrigin, UNAUTHORIZED_MESSAGE};
pub use models::{
    parse_product_id, CreateProductRequest, NewProduct, Page, Product, ProductChanges,
    UpdateProductRequest, CATEGORY_MAX_CHARS, MAX_PAGE_LIMIT, NAME_MAX_CHARS, PRICE_MAX,
    STOCK_MAX,
};
pub use rate_limit::{
    RateLimitDecision, RateLimiter, DEFAULT_MAX_REQUESTS, DEFAULT_SWEEP_THRESHOLD,
    DEFAULT_WINDOW,
};
pub use store::{MemoryProductStore, PgProductStore, ProductStore};
