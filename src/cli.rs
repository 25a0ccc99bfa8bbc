use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "shopbot")]
#[command(author, version, about = "Telegram storefront bot with crypto payments", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the bot together with the payment webhook server
    Run,

    /// Run only the payment webhook server (no Telegram polling)
    ServeWebhooks {
        /// Port to listen on (defaults to WEB_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Add a product to the catalog from the shell
    AddProduct {
        /// Product name
        #[arg(long)]
        name: String,

        /// Product description
        #[arg(long, default_value = "")]
        description: String,

        /// Price, e.g. 19.99
        #[arg(long)]
        price: String,

        /// Discount percentage (0-100)
        #[arg(long, default_value = "0")]
        discount: String,

        /// Image URL
        #[arg(long)]
        image_url: Option<String>,

        /// Category name
        #[arg(long)]
        category: Option<String>,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_webhooks_port() {
        let cli = Cli::parse_from(["shopbot", "serve-webhooks", "--port", "8080"]);
        assert!(matches!(cli.command, Some(Commands::ServeWebhooks { port: Some(8080) })));
    }

    #[test]
    fn test_add_product_defaults() {
        let cli = Cli::parse_from(["shopbot", "add-product", "--name", "Book", "--price", "12.5"]);
        match cli.command {
            Some(Commands::AddProduct {
                name,
                discount,
                image_url,
                ..
            }) => {
                assert_eq!(name, "Book");
                assert_eq!(discount, "0");
                assert!(image_url.is_none());
            }
            _ => panic!("expected add-product"),
        }
    }

    #[test]
    fn test_no_subcommand() {
        let cli = Cli::parse_from(["shopbot"]);
        assert!(cli.command.is_none());
    }
}
