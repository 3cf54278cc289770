//! SenVision CLI
//!
//! Thin shell around senvision-core: owns the cart store for one session
//! and prints the views the storefront would render.
//!
//! ## Usage
//!
//! ```bash
//! # Show the cart
//! senvision show
//!
//! # List the products in the storefront listing
//! senvision catalog
//!
//! # Add a product by id (looked up in the listing)
//! senvision add 12
//!
//! # Change or remove a line
//! senvision set 12 3
//! senvision remove 12
//!
//! # Place the order
//! senvision checkout --name "Awa Diop" --phone "77 123 45 67" --address "Dakar"
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use senvision_core::{
    format_amount, render_all, Cart, CartStore, Celebration, CheckoutForm, ListingCatalog,
    LogOrderSink, Notifier, ProductId, RedbStore,
};

/// SenVision - storefront shopping cart
#[derive(Parser)]
#[command(name = "senvision")]
#[command(version)]
#[command(about = "SenVision - storefront shopping cart")]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Data directory (default: ~/.senvision/data)
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Product listing JSON (default: <data-dir>/products.json)
    #[arg(short, long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the cart contents and totals
    Show {
        /// Print the rendered HTML fragments instead of text
        #[arg(long)]
        html: bool,
    },

    /// List the products available in the listing
    Catalog,

    /// Add one unit of a product from the listing
    Add {
        /// Product id
        id: String,
    },

    /// Remove a product from the cart
    Remove {
        /// Product id
        id: String,
    },

    /// Set a product's quantity (below 1 removes it)
    Set {
        /// Product id
        id: String,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },

    /// Empty the cart
    Clear,

    /// Place the order
    Checkout {
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long, default_value = "")]
        address: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        notes: String,
    },
}

/// Toasts go to stderr so stdout stays the view
struct TerminalToasts;

impl Notifier for TerminalToasts {
    fn notify(&self, message: &str) {
        eprintln!("✓ {}", message);
    }
}

struct Confetti;

impl Celebration for Confetti {
    fn celebrate(&self) {
        eprintln!("🎉 🎊 🎉");
    }
}

fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();
}

/// Get the default data directory (~/.senvision/data)
fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".senvision")
        .join("data")
}

fn parse_product_id(s: &str) -> Result<ProductId> {
    Ok(ProductId::parse(s)?)
}

fn load_catalog(path: &Path) -> Result<ListingCatalog> {
    ListingCatalog::load(path)
        .with_context(|| format!("Failed to load product listing {}", path.display()))
}

fn print_cart(cart: &impl Cart) {
    let view = cart.view();
    if view.is_empty() {
        println!("Votre panier est vide");
        return;
    }

    println!("Panier ({}):", senvision_core::view::count_label(&view));
    println!();
    for line in &view.lines {
        println!(
            "  {} {} - {} x {} = {}",
            line.id,
            line.name,
            format_amount(line.unit_price),
            line.quantity,
            format_amount(line.line_total)
        );
    }
    println!();
    println!("Total: {}", format_amount(view.total));
}

fn print_html(cart: &impl Cart) {
    let rendered = render_all(cart);
    println!("<!-- badge -->\n{}", rendered.badge);
    println!("<!-- cart-count -->\n{}", rendered.count_label);
    println!("<!-- cart-total -->\n{}", rendered.total);
    println!("<!-- cart-items -->\n{}", rendered.dropdown_html);
    println!("<!-- cart-items-offcanvas -->\n{}", rendered.offcanvas.items_html);
    println!("<!-- order-summary -->\n{}", rendered.order_summary.items_html);
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let data_dir = cli.data_dir.unwrap_or_else(default_data_dir);
    let catalog_path = cli
        .catalog
        .unwrap_or_else(|| data_dir.join("products.json"));

    let store = RedbStore::open(data_dir.join("cart.redb"))
        .with_context(|| format!("Failed to open cart storage in {}", data_dir.display()))?;
    let mut cart = CartStore::open(store, Arc::new(TerminalToasts));

    match cli.command {
        Commands::Show { html } => {
            if html {
                print_html(&cart);
            } else {
                print_cart(&cart);
            }
        }

        Commands::Catalog => {
            let catalog = load_catalog(&catalog_path)?;
            if catalog.products().is_empty() {
                println!("No products in listing.");
            } else {
                println!("Products ({}):", catalog.products().len());
                println!();
                for product in catalog.products() {
                    let promo = if product.promotion > 0 {
                        format!(" (-{}%)", product.promotion)
                    } else {
                        String::new()
                    };
                    println!(
                        "  {} {} - {}{}",
                        product.id,
                        product.name,
                        format_amount(product.price as f64),
                        promo
                    );
                }
            }
        }

        Commands::Add { id } => {
            let catalog = load_catalog(&catalog_path)?;
            let id = parse_product_id(&id)?;
            let quantity = cart.add_from_catalog(&catalog, &id)?;
            println!("Added: {}", id);
            println!("  Quantity: {}", quantity);
            println!("  Total: {}", format_amount(cart.total()));
        }

        Commands::Remove { id } => {
            let id = parse_product_id(&id)?;
            cart.remove_item(&id);
            println!("Total: {}", format_amount(cart.total()));
        }

        Commands::Set { id, quantity } => {
            let id = parse_product_id(&id)?;
            if quantity >= 1 && !cart.contains(&id) {
                println!("Not in cart: {}", id);
                return Ok(());
            }
            cart.set_quantity(&id, quantity);
            match cart.quantity_of(&id) {
                Some(q) => println!("Quantity: {}", q),
                None => println!("Removed: {}", id),
            }
            println!("Total: {}", format_amount(cart.total()));
        }

        Commands::Clear => {
            cart.clear();
        }

        Commands::Checkout {
            name,
            phone,
            address,
            email,
            notes,
        } => {
            let mut form = CheckoutForm {
                name,
                phone,
                email,
                address,
                notes,
            };
            let receipt = cart.checkout(&mut form, &LogOrderSink, &Confetti)?;
            tracing::info!(total = receipt.summary.total, "order placed");

            while let Some(wait) = cart.next_deadline() {
                tokio::time::sleep(wait).await;
                for summary in cart.advance(wait) {
                    println!("{}", summary.confirmation_message());
                }
            }
        }
    }

    Ok(())
}
