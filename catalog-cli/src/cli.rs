use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Add catalog products through taxonomy-driven forms")]
pub struct Cli {
    /// Path to the taxonomy JSON file (overrides settings)
    #[clap(long, global = true)]
    pub taxonomy: Option<PathBuf>,

    /// Path to the supplier list JSON file (overrides settings)
    #[clap(long, global = true)]
    pub suppliers: Option<PathBuf>,

    /// Path to the outbox YAML file (overrides settings)
    #[clap(long, global = true)]
    pub outbox: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the current settings
    Show,

    /// Write a default settings file if none exists
    Init,

    /// Update settings values
    Set {
        /// Path to the taxonomy JSON file
        #[clap(long)]
        taxonomy_path: Option<PathBuf>,

        /// Path to the supplier list JSON file
        #[clap(long)]
        suppliers_path: Option<PathBuf>,

        /// Path to the outbox YAML file
        #[clap(long)]
        outbox_path: Option<PathBuf>,

        /// Branches offered in the form (comma-separated, empty to clear)
        #[clap(long)]
        branches: Option<String>,

        /// Seconds to wait for reference data
        #[clap(long)]
        load_timeout: Option<u64>,
    },
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new product
    Add {
        /// Product name
        #[clap(long)]
        name: Option<String>,

        /// Product description
        #[clap(long)]
        description: Option<String>,

        /// Cost price, as typed (e.g. 1.500,00)
        #[clap(long)]
        cost_price: Option<String>,

        /// Public price, as typed (e.g. 2.000,00)
        #[clap(long)]
        public_price: Option<String>,

        /// Expiry date (YYYY-MM-DD)
        #[clap(long)]
        expiry_date: Option<String>,

        /// Branch holding the stock
        #[clap(long)]
        branch: Option<String>,

        /// Manufacturer name
        #[clap(long)]
        manufacturer: Option<String>,

        /// Stock quantity
        #[clap(long)]
        stock: Option<String>,

        /// Taxonomy group
        #[clap(long)]
        group: Option<String>,

        /// Subgroup within the group
        #[clap(long)]
        subgroup: Option<String>,

        /// Attribute value as NAME=VALUE (repeatable)
        #[clap(long = "attr")]
        attrs: Vec<String>,

        /// Manual SKU (generated automatically when omitted)
        #[clap(long)]
        sku: Option<String>,

        /// Use interactive mode (prompts)
        #[clap(long)]
        interactive: bool,
    },

    /// Show the taxonomy tree
    Taxonomy {
        /// Only show this group
        #[clap(long)]
        group: Option<String>,
    },

    /// List known suppliers
    Suppliers,

    /// List submitted products
    List,

    /// Settings management commands
    #[clap(subcommand)]
    Config(ConfigCommand),
}
