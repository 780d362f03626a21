//! Shoebox CLI - inspect and mutate a cart from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Show the current cart
//! shoebox show
//!
//! # Add one unit of product 42
//! shoebox add 42
//!
//! # Set product 42's quantity to 3
//! shoebox set 42 3
//!
//! # Remove product 42
//! shoebox remove 42
//! ```
//!
//! Configuration comes from the environment; see `shoebox_cart::CartConfig`
//! for the variables. The cart snapshot lives in the file named by
//! `SHOEBOX_CART_PATH`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use clap::{Parser, Subcommand};
use shoebox_cart::{Cart, CartConfig, CartStore, FileSlot, StorefrontApiClient, TracingNotifier};
use shoebox_core::ProductId;

#[derive(Parser)]
#[command(name = "shoebox")]
#[command(author, version, about = "Shoebox cart tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current cart
    Show,
    /// Add one unit of a product to the cart
    Add {
        /// Catalog product id
        product_id: i32,
    },
    /// Remove a product from the cart
    Remove {
        /// Catalog product id
        product_id: i32,
    },
    /// Set a product's quantity
    Set {
        /// Catalog product id
        product_id: i32,
        /// New quantity (zero or negative is ignored)
        amount: i64,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = CartConfig::from_env()?;
    let api = Arc::new(StorefrontApiClient::new(&config.api)?);
    let slot = Arc::new(FileSlot::new(&config.cart_path));

    let mut store = CartStore::new(api.clone(), api, slot);
    store.subscribe(Arc::new(TracingNotifier));

    match cli.command {
        Commands::Show => {}
        Commands::Add { product_id } => store.add_item(ProductId::new(product_id)).await?,
        Commands::Remove { product_id } => store.remove_item(ProductId::new(product_id))?,
        Commands::Set { product_id, amount } => {
            store
                .update_amount(ProductId::new(product_id), amount)
                .await?;
        }
    }

    print_cart(store.cart());
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_cart(cart: &Cart) {
    if cart.is_empty() {
        println!("Cart is empty");
        return;
    }

    for line in cart.items() {
        println!(
            "{:>6}  {:<30} x{:<4} {}",
            line.id,
            line.title,
            line.amount,
            line.line_total()
        );
    }
    println!(
        "{} item(s), subtotal {}",
        cart.total_quantity(),
        cart.subtotal()
    );
}
