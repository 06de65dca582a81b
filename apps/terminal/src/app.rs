//! The interactive menu loop and its handlers.
//!
//! Every handler follows the same shape: prompt, call a repository or the
//! checkout service, print the outcome. Errors out of the core are shown as
//! friendly messages and never terminate the loop.

use std::sync::Arc;

use anyhow::Result;
use console::style;
use dialoguer::{Input, Select};
use tracing::warn;

use sales_core::repository::{CustomerRepository, ProductRepository, SaleRepository};
use sales_core::validation::validate_search_term;
use sales_core::{Cart, CheckoutService, CoreError, Customer, Money, Product};
use sales_db::Database;

pub struct App {
    db: Database,
    cart: Cart,
    checkout: CheckoutService,
}

impl App {
    pub fn new(db: Database) -> Self {
        let checkout = CheckoutService::new(Arc::new(db.products()), Arc::new(db.sales()));
        App {
            db,
            cart: Cart::new(),
            checkout,
        }
    }

    /// Runs the main menu loop until the operator exits.
    pub async fn run(&mut self) -> Result<()> {
        println!("{}", style("======================================").cyan());
        println!("{}", style("  Smart Sales - Point of Sale").cyan().bold());
        println!("{}", style("======================================").cyan());

        loop {
            println!();
            let choice = Select::new()
                .with_prompt("Main menu")
                .items(&[
                    "Search products",
                    "Display inventory",
                    "Add product to cart",
                    "View cart",
                    "Checkout",
                    "Restock product",
                    "Customer management",
                    "Reports",
                    "Exit",
                ])
                .default(0)
                .interact()?;

            match choice {
                0 => self.search_products().await?,
                1 => self.display_inventory().await?,
                2 => self.add_to_cart().await?,
                3 => self.view_cart(),
                4 => self.handle_checkout().await?,
                5 => self.restock_product().await?,
                6 => self.customer_menu().await?,
                7 => self.reports_menu().await?,
                _ => {
                    println!("Goodbye.");
                    return Ok(());
                }
            }
        }
    }

    // -------------------------------------------------------------------------
    // Catalog
    // -------------------------------------------------------------------------

    async fn search_products(&self) -> Result<()> {
        let term: String = Input::new()
            .with_prompt("Search term")
            .interact_text()?;

        let term = match validate_search_term(&term) {
            Ok(term) => term,
            Err(e) => {
                println!("{}", style(e).red());
                return Ok(());
            }
        };

        let results = self.db.products().search(&term).await?;
        if results.is_empty() {
            println!("No products found.");
        } else {
            print_product_table(&results);
        }
        Ok(())
    }

    async fn display_inventory(&self) -> Result<()> {
        let products = self.db.products().find_all().await?;
        if products.is_empty() {
            println!("The catalog is empty. Run the seed binary to add products.");
        } else {
            print_product_table(&products);
        }
        Ok(())
    }

    async fn restock_product(&self) -> Result<()> {
        self.display_inventory().await?;

        let id: i64 = Input::new().with_prompt("Product id").interact_text()?;
        let new_quantity: i64 = Input::new()
            .with_prompt("New stock quantity")
            .interact_text()?;

        match self.db.products().update_quantity(id, new_quantity).await {
            Ok(()) => println!("Stock updated."),
            Err(e) => println!("{}", style(format!("Update failed: {e}")).red()),
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Cart
    // -------------------------------------------------------------------------

    async fn add_to_cart(&mut self) -> Result<()> {
        self.display_inventory().await?;

        let id: i64 = Input::new().with_prompt("Product id").interact_text()?;

        let Some(product) = self.db.products().find_by_id(id).await? else {
            println!("Product not found.");
            return Ok(());
        };

        let quantity: i64 = Input::new().with_prompt("Quantity").interact_text()?;

        // An early courtesy check against current stock; checkout re-validates
        // against fresh data anyway.
        if quantity > 0 && !product.can_fill(quantity) {
            println!("Invalid quantity.");
            println!("Available: {}", product.quantity_in_stock);
            return Ok(());
        }

        match self.cart.add_item(&product, quantity) {
            Ok(()) => println!("Item added."),
            Err(e) => println!("{}", style(e).red()),
        }
        Ok(())
    }

    fn view_cart(&self) {
        if self.cart.is_empty() {
            println!("Cart empty.");
            return;
        }

        for item in self.cart.items() {
            println!(
                "{} x{} = {}",
                item.name,
                item.quantity,
                item.line_total()
            );
        }
        println!("Total: {}", style(self.cart.total()).green().bold());
    }

    // -------------------------------------------------------------------------
    // Checkout
    // -------------------------------------------------------------------------

    async fn handle_checkout(&mut self) -> Result<()> {
        if self.cart.is_empty() {
            println!("Cart empty.");
            return Ok(());
        }

        let Some(customer) = self.select_or_create_customer().await? else {
            println!("Checkout cancelled.");
            return Ok(());
        };

        match self.checkout.checkout(&mut self.cart, &customer).await {
            Ok(sale) => {
                println!("{}", style("Checkout complete.").green().bold());
                println!("Sale id: {}", sale.id);
                for line in &sale.lines {
                    println!(
                        "  {} x{} @ {} = {}",
                        line.product_name,
                        line.quantity,
                        line.unit_price(),
                        line.line_total()
                    );
                }
                println!("Sale total: {}", style(sale.total()).green());
            }
            Err(CoreError::InsufficientStock {
                name,
                requested,
                available,
                ..
            }) => {
                println!("{}", style("Checkout failed. Not enough stock for:").red());
                println!("  {name}");
                println!("  Requested: {requested}  Available: {available}");
                println!("The cart was kept; adjust it and try again.");
            }
            Err(CoreError::ProductMissing { product_id }) => {
                println!(
                    "{}",
                    style(format!("Checkout failed. Product missing: {product_id}")).red()
                );
                println!("The cart was kept; remove the item by clearing the cart.");
            }
            Err(e) => {
                warn!(error = %e, "checkout failed");
                println!("{}", style(format!("Checkout failed: {e}")).red());
                println!("The cart was kept; you can retry.");
            }
        }
        Ok(())
    }

    async fn select_or_create_customer(&self) -> Result<Option<Customer>> {
        let choice = Select::new()
            .with_prompt("Customer")
            .items(&["Existing customer", "Create new", "Cancel"])
            .default(0)
            .interact()?;

        match choice {
            0 => {
                let customers = self.db.customers().find_all().await?;
                if customers.is_empty() {
                    println!("No customers available. Create one first.");
                    return Ok(None);
                }
                for c in &customers {
                    println!("  [{}] {} <{}>", c.id, c.name, c.email);
                }
                let id: i64 = Input::new().with_prompt("Customer id").interact_text()?;
                Ok(self.db.customers().find_by_id(id).await?)
            }
            1 => {
                let name: String = Input::new().with_prompt("Name").interact_text()?;
                let email: String = Input::new().with_prompt("Email").interact_text()?;

                match self.db.customers().create_or_get_by_email(&name, &email).await {
                    Ok(customer) => Ok(Some(customer)),
                    Err(e) => {
                        println!("{}", style(format!("Could not save customer: {e}")).red());
                        Ok(None)
                    }
                }
            }
            _ => Ok(None),
        }
    }

    // -------------------------------------------------------------------------
    // Customers
    // -------------------------------------------------------------------------

    async fn customer_menu(&self) -> Result<()> {
        let choice = Select::new()
            .with_prompt("Customer management")
            .items(&["Create customer", "Find by email", "List all", "Back"])
            .default(0)
            .interact()?;

        match choice {
            0 => {
                let name: String = Input::new().with_prompt("Name").interact_text()?;
                let email: String = Input::new().with_prompt("Email").interact_text()?;

                match self.db.customers().create_or_get_by_email(&name, &email).await {
                    Ok(c) => println!("Customer saved with id: {}", c.id),
                    Err(e) => println!("{}", style(format!("Could not save customer: {e}")).red()),
                }
            }
            1 => {
                let email: String = Input::new().with_prompt("Email").interact_text()?;
                match self.db.customers().find_by_email(&email).await? {
                    Some(c) => println!("[{}] {} <{}>", c.id, c.name, c.email),
                    None => println!("Not found."),
                }
            }
            2 => {
                let customers = self.db.customers().find_all().await?;
                if customers.is_empty() {
                    println!("No customers found.");
                }
                for c in &customers {
                    println!("[{}] {} <{}>", c.id, c.name, c.email);
                }
            }
            _ => {}
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Reports
    // -------------------------------------------------------------------------

    async fn reports_menu(&self) -> Result<()> {
        let choice = Select::new()
            .with_prompt("Reports")
            .items(&[
                "Inventory report",
                "Low stock report",
                "Recent sales report",
                "Back",
            ])
            .default(0)
            .interact()?;

        match choice {
            0 => self.inventory_report().await?,
            1 => self.low_stock_report().await?,
            2 => self.recent_sales_report().await?,
            _ => {}
        }
        Ok(())
    }

    async fn inventory_report(&self) -> Result<()> {
        println!("{}", style("INVENTORY REPORT").bold());
        println!("--------------------------------------");

        let products = self.db.products().find_all().await?;
        if products.is_empty() {
            println!("No products found in inventory.");
            return Ok(());
        }

        let total_units: i64 = products.iter().map(|p| p.quantity_in_stock).sum();
        print_product_table(&products);

        println!("--------------------------------------");
        println!("Total SKUs: {}", products.len());
        println!("Total units in stock: {}", total_units);
        Ok(())
    }

    async fn low_stock_report(&self) -> Result<()> {
        let threshold: i64 = Input::new()
            .with_prompt("Low stock threshold")
            .interact_text()?;
        if threshold < 0 {
            println!("Threshold must be 0 or greater.");
            return Ok(());
        }

        println!("{}", style("LOW STOCK REPORT").bold());
        println!("Threshold: {}", threshold);
        println!("--------------------------------------");

        let products = self.db.products().find_all().await?;
        let low: Vec<&Product> = products
            .iter()
            .filter(|p| p.quantity_in_stock <= threshold)
            .collect();

        if low.is_empty() {
            println!("No low stock items found.");
        }
        for p in low {
            println!(
                "[{}] {} ({}) - {} in stock",
                p.id, p.name, p.manufacturer, p.quantity_in_stock
            );
        }
        Ok(())
    }

    async fn recent_sales_report(&self) -> Result<()> {
        let limit: i64 = Input::new()
            .with_prompt("How many recent sales")
            .interact_text()?;
        if limit <= 0 {
            println!("Enter a number greater than 0.");
            return Ok(());
        }

        println!("{}", style("RECENT SALES REPORT").bold());
        println!("--------------------------------------");

        let summaries = self.db.sales().recent_summaries(limit as u32).await?;
        if summaries.is_empty() {
            println!("No sales found.");
            return Ok(());
        }

        let mut grand_total = Money::zero();
        for s in &summaries {
            println!(
                "Sale[id={}, at={}, customer={} <{}>, total={}]",
                s.sale_id,
                s.created_at.format("%Y-%m-%d %H:%M:%S"),
                s.customer_name,
                s.customer_email,
                s.total()
            );
            grand_total += s.total();
        }

        println!("--------------------------------------");
        println!("Sales count: {}", summaries.len());
        println!("Grand total: {}", style(grand_total).green().bold());
        Ok(())
    }
}

/// Prints products in the fixed-width layout used across the menus.
fn print_product_table(products: &[Product]) {
    for p in products {
        println!(
            "[{:>3}] {:<32} {:<20} {:>10}  stock: {}",
            p.id,
            p.name,
            p.manufacturer,
            p.price().to_string(),
            p.quantity_in_stock
        );
    }
}
