mod client;
mod ops;

use catalog_core::{CreateProductRequest, UpdateProductRequest};
use clap::{Parser, Subcommand};
use ops::{
    create_product, delete_product, get_product, init_db, list_products, ping_db, update_product,
    OutputFormat,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// CLI for the product catalog: database bootstrap plus a thin HTTP client.
#[derive(Parser)]
#[command(
    name = "catalog-cli",
    author,
    version,
    about = "CLI for the product catalog API"
)]
struct Cli {
    /// API base url
    #[arg(long, env = "CATALOG_API_BASE", default_value = "http://127.0.0.1:8080")]
    api_base: String,

    /// Shared secret sent as x-api-key on every request
    #[arg(long, env = "API_SECRET_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// PostgreSQL connection string (init-db / ping-db only)
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    // ==================== 数据库 ====================
    /// Create the products table and insert sample rows into an empty table
    InitDb {
        /// 只建表，不写入示例数据
        #[arg(long)]
        no_seed: bool,
    },
    /// Check database connectivity (SELECT 1)
    PingDb,

    // ==================== 商品 ====================
    /// List products
    List {
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        offset: Option<u32>,
    },
    /// Show one product
    Get { id: i64 },
    /// Create a product
    Create {
        #[arg(long, short)]
        name: String,
        #[arg(long, short)]
        price: i64,
        #[arg(long, short)]
        stock: Option<i32>,
        #[arg(long, short)]
        category: Option<String>,
    },
    /// Update fields of a product; omitted fields are left unchanged
    Update {
        id: i64,
        #[arg(long, short)]
        name: Option<String>,
        #[arg(long, short)]
        price: Option<i64>,
        #[arg(long, short)]
        stock: Option<i32>,
        #[arg(long, short)]
        category: Option<String>,
    },
    /// Delete a product
    Delete { id: i64 },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载 .env 文件（如果存在），忽略错误
    let _ = dotenvy::dotenv();
    init_tracing();
    run(Cli::parse()).await
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        // 数据库命令
        Commands::InitDb { no_seed } => {
            init_db(cli.database_url.as_deref(), !no_seed, cli.output).await?
        }
        Commands::PingDb => ping_db(cli.database_url.as_deref(), cli.output).await?,

        // 商品命令：只有走 HTTP 的命令才需要构建客户端
        Commands::List { limit, offset } => {
            let client = client::build_client(&cli.api_key)?;
            list_products(&client, &cli.api_base, limit, offset, cli.output).await?
        }
        Commands::Get { id } => {
            let client = client::build_client(&cli.api_key)?;
            get_product(&client, &cli.api_base, id, cli.output).await?
        }
        Commands::Create {
            name,
            price,
            stock,
            category,
        } => {
            let request = CreateProductRequest {
                name: Some(name),
                price: Some(price),
                stock,
                category,
            };
            let client = client::build_client(&cli.api_key)?;
            create_product(&client, &cli.api_base, request, cli.output).await?
        }
        Commands::Update {
            id,
            name,
            price,
            stock,
            category,
        } => {
            let request = UpdateProductRequest {
                name,
                price,
                stock,
                category,
            };
            let client = client::build_client(&cli.api_key)?;
            update_product(&client, &cli.api_base, id, request, cli.output).await?
        }
        Commands::Delete { id } => {
            let client = client::build_client(&cli.api_key)?;
            delete_product(&client, &cli.api_base, id, cli.output).await?
        }
    }

    Ok(())
}

fn init_tracing() {
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);
    let filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into());
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}
