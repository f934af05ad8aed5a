//! CLI runner - executes commands

use crate::api::{
    ImageUpload, NewOrder, NewProduct, OrderStatus, ProductUpdate, Registration,
    StorefrontClient,
};
use crate::cli::commands::{Cli, Commands, OutputFormat, Paging, SellerAction, WishlistAction};
use crate::config::ClientConfig;
use crate::error::Result;
use crate::explorer::CategoryExplorer;
use crate::pagination::{FetchOutcome, PaginatedCollection};
use crate::search::SearchIndex;
use crate::types::Role;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Resolve configuration: file, then environment, then flags
    pub fn config(&self) -> Result<ClientConfig> {
        let mut config = ClientConfig::load(self.cli.config.as_deref())?;
        if let Some(base_url) = &self.cli.base_url {
            config.base_url.clone_from(base_url);
        }
        if let Some(path) = &self.cli.session_file {
            config.session_file = Some(path.clone());
        }
        config.validate()?;
        Ok(config)
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let config = self.config()?;
        debug!("Using backend {}", config.base_url);
        let client = config.client()?;

        match &self.cli.command {
            Commands::Products { paging } => {
                let products = list(client.products(), *paging).await?;
                self.output(&products)
            }
            Commands::Product { slug } => self.output(&client.product(slug).await?),
            Commands::Search { query, first } => {
                let index = SearchIndex::load(&client).await?;
                if *first {
                    self.output(&index.submit(query))
                } else {
                    self.output(&index.suggest(query))
                }
            }
            Commands::Categories => self.output(&client.categories().await?),
            Commands::Browse {
                category,
                sub_category,
                sub_sub_category,
            } => {
                let listing = CategoryExplorer::new(client)
                    .browse(
                        category.as_deref(),
                        sub_category.as_deref(),
                        sub_sub_category.as_deref(),
                    )
                    .await?;
                self.output(&listing)
            }
            Commands::Register {
                username,
                password,
                phone,
                email,
                role,
            } => {
                let registration = Registration {
                    username: username.clone(),
                    password: password.clone(),
                    phone: phone.clone(),
                    email: email.clone(),
                    role: *role,
                };
                let message = client.register(&registration).await?;
                self.output(&json!({ "message": message }))
            }
            Commands::Login {
                username,
                password,
                role,
            } => self.login(&client, username, password, *role).await,
            Commands::Logout => {
                client.logout().await?;
                self.output(&json!({ "logged_in": false }))
            }
            Commands::Whoami => match client.session().current().await {
                Some(session) => self.output(&json!({
                    "logged_in": true,
                    "username": session.username,
                    "role": session.role,
                    "expires_at": session.expires_at,
                })),
                None => self.output(&json!({ "logged_in": false })),
            },
            Commands::Wishlist { action } => self.wishlist(&client, action).await,
            Commands::Order { slug, quantity } => {
                let content = client
                    .place_order(&NewOrder {
                        product_slug: slug.clone(),
                        quantity: *quantity,
                    })
                    .await?;
                self.output(&content)
            }
            Commands::Seller { action } => self.seller(&client, action).await,
        }
    }

    async fn login(
        &self,
        client: &StorefrontClient,
        username: &str,
        password: &str,
        role: Role,
    ) -> Result<()> {
        let session = client.login(username, password, role).await?;
        if !client.session().is_in_memory() {
            info!("Session saved to {}", client.session().path().display());
        }
        self.output(&json!({
            "logged_in": true,
            "username": session.username,
            "role": session.role,
            "expires_at": session.expires_at,
        }))
    }

    async fn wishlist(&self, client: &StorefrontClient, action: &WishlistAction) -> Result<()> {
        match action {
            WishlistAction::List => self.output(&client.wishlist().await?),
            WishlistAction::Add { slug } => {
                let message = client.add_to_wishlist(slug).await?;
                self.output(&json!({ "message": message }))
            }
            WishlistAction::Remove { slug } => {
                let message = client.remove_from_wishlist(slug).await?;
                self.output(&json!({ "message": message }))
            }
        }
    }

    async fn seller(&self, client: &StorefrontClient, action: &SellerAction) -> Result<()> {
        let message = match action {
            SellerAction::Products { paging } => {
                let products = list(client.seller_products(), *paging).await?;
                return self.output(&products);
            }
            SellerAction::Product { slug } => {
                return self.output(&client.seller_product(slug).await?);
            }
            SellerAction::Orders { status, paging } => {
                let status = status.as_deref().map(OrderStatus::from);
                let orders = list(client.seller_orders(status.as_ref()), *paging).await?;
                return self.output(&orders);
            }
            SellerAction::Categories => {
                return self.output(&client.all_sub_sub_categories().await?);
            }
            SellerAction::Create {
                name,
                price,
                stock,
                category,
                image,
            } => {
                let product = NewProduct {
                    name: name.clone(),
                    price: *price,
                    stock: *stock,
                    sub_sub_category_id: *category,
                    image: ImageUpload::from_path(image).await?,
                };
                client.create_product(&product).await?
            }
            SellerAction::Update {
                slug,
                name,
                price,
                stock,
                category,
            } => {
                let update = ProductUpdate {
                    name: name.clone(),
                    price: *price,
                    stock: *stock,
                    sub_sub_category_id: *category,
                };
                client.update_product(slug, &update).await?
            }
            SellerAction::Delete { slug } => client.delete_product(slug).await?,
            SellerAction::ChangeImage { slug, image } => {
                let image = ImageUpload::from_path(image).await?;
                client.change_product_image(slug, &image).await?
            }
            SellerAction::SetStatus { id, status } => {
                client
                    .update_order_status(*id, &OrderStatus::from(status.as_str()))
                    .await?
            }
        };
        self.output(&json!({ "message": message }))
    }

    /// Output a value
    fn output<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        let value: Value = serde_json::to_value(value)?;
        match self.cli.format {
            OutputFormat::Json => match value {
                Value::Array(items) => {
                    for item in items {
                        println!("{}", serde_json::to_string(&item)?);
                    }
                }
                other => println!("{}", serde_json::to_string(&other)?),
            },
            OutputFormat::Pretty => println!("{}", serde_json::to_string_pretty(&value)?),
        }
        Ok(())
    }
}

/// Fetch the requested number of pages, or every page
async fn list<T>(collection: PaginatedCollection<T>, paging: Paging) -> Result<Vec<T>>
where
    T: Clone + Send + Sync + 'static,
{
    if paging.all {
        return collection.fetch_all().await;
    }

    for _ in 0..paging.pages.max(1) {
        if let FetchOutcome::Exhausted = collection.fetch_next().await? {
            break;
        }
    }
    debug!(
        "Fetched {} pages, more available: {}",
        collection.pages_fetched().await,
        !collection.is_exhausted().await
    );
    Ok(collection.items().await)
}
