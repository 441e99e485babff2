use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::auth;
use crate::client::ApiClient;
use crate::config;
use crate::forms::{
    FormError, FormSchema, ResourceForm, CATEGORY_FORM, COLOR_FORM, GENDER_FORM, PRODUCT_FORM,
    SIZE_FORM, STORE_FORM,
};

#[derive(Parser)]
#[command(name = "catalog")]
#[command(about = "Catalog CLI - manage stores, attribute catalogs, and products")]
#[command(version)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        env = "CATALOG_API_URL",
        default_value = "http://127.0.0.1:3000",
        help = "Base URL of the catalog API"
    )]
    pub api_url: String,

    #[arg(
        long,
        global = true,
        env = "CATALOG_API_TOKEN",
        help = "Bearer token for mutating calls"
    )]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Mint a bearer token for a user id (uses the local JWT secret)")]
    Token {
        #[arg(long)]
        user: Uuid,
    },

    #[command(about = "Store management")]
    Stores {
        #[command(subcommand)]
        cmd: StoreCommands,
    },

    #[command(about = "Category catalog")]
    Categories {
        #[command(subcommand)]
        cmd: AttributeCommands,
    },

    #[command(about = "Size catalog")]
    Sizes {
        #[command(subcommand)]
        cmd: AttributeCommands,
    },

    #[command(about = "Color catalog")]
    Colors {
        #[command(subcommand)]
        cmd: AttributeCommands,
    },

    #[command(about = "Gender catalog")]
    Genders {
        #[command(subcommand)]
        cmd: AttributeCommands,
    },

    #[command(about = "Product management")]
    Products {
        #[command(subcommand)]
        cmd: ProductCommands,
    },
}

#[derive(Subcommand)]
pub enum StoreCommands {
    Get { id: Uuid },
    Create {
        #[arg(long)]
        name: String,
    },
    Update {
        id: Uuid,
        #[arg(long)]
        name: String,
    },
    Delete {
        id: Uuid,
        #[arg(long, help = "Confirm the deletion")]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum AttributeCommands {
    List {
        #[arg(long)]
        store: Uuid,
    },
    Get {
        #[arg(long)]
        store: Uuid,
        id: Uuid,
    },
    Create {
        #[arg(long)]
        store: Uuid,
        #[arg(long)]
        name: String,
        #[arg(long)]
        value: Option<String>,
    },
    Update {
        #[arg(long)]
        store: Uuid,
        id: Uuid,
        #[arg(long)]
        name: String,
        #[arg(long)]
        value: Option<String>,
    },
    Delete {
        #[arg(long)]
        store: Uuid,
        id: Uuid,
        #[arg(long, help = "Confirm the deletion")]
        yes: bool,
    },
}

#[derive(clap::Args)]
pub struct ProductFields {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub price: Decimal,
    #[arg(long)]
    pub quantity: i64,
    #[arg(long)]
    pub category: Uuid,
    #[arg(long)]
    pub color: Uuid,
    #[arg(long)]
    pub size: Uuid,
    #[arg(long)]
    pub gender: Uuid,
    #[arg(long = "image", help = "Image URL, repeatable; order is kept")]
    pub images: Vec<String>,
    #[arg(long)]
    pub featured: bool,
    #[arg(long)]
    pub archived: bool,
}

#[derive(Subcommand)]
pub enum ProductCommands {
    List {
        #[arg(long)]
        store: Uuid,
        #[arg(long)]
        category: Option<Uuid>,
        #[arg(long)]
        featured: bool,
    },
    Get {
        #[arg(long)]
        store: Uuid,
        id: Uuid,
    },
    Create {
        #[arg(long)]
        store: Uuid,
        #[command(flatten)]
        fields: ProductFields,
    },
    Update {
        #[arg(long)]
        store: Uuid,
        id: Uuid,
        #[command(flatten)]
        fields: ProductFields,
    },
    Delete {
        #[arg(long)]
        store: Uuid,
        id: Uuid,
        #[arg(long, help = "Confirm the deletion")]
        yes: bool,
    },
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Commands::Token { user } = &cli.command {
        let security = &config::config().security;
        let token = auth::issue_token(*user, &security.jwt_secret, security.jwt_expiry_hours)
            .map_err(anyhow::Error::msg)?;
        println!("{}", token);
        return Ok(());
    }

    let client = ApiClient::new(&cli.api_url, cli.token.clone())?;

    match cli.command {
        Commands::Token { .. } => unreachable!("handled above"),
        Commands::Stores { cmd } => handle_store(&client, cmd).await,
        Commands::Categories { cmd } => handle_attribute(&client, &CATEGORY_FORM, cmd).await,
        Commands::Sizes { cmd } => handle_attribute(&client, &SIZE_FORM, cmd).await,
        Commands::Colors { cmd } => handle_attribute(&client, &COLOR_FORM, cmd).await,
        Commands::Genders { cmd } => handle_attribute(&client, &GENDER_FORM, cmd).await,
        Commands::Products { cmd } => handle_product(&client, cmd).await,
    }
}

async fn handle_store(client: &ApiClient, cmd: StoreCommands) -> anyhow::Result<()> {
    match cmd {
        StoreCommands::Get { id } => {
            let record = client.get_json(&format!("api/stores/{}", id)).await?;
            print_record(&record)
        }
        StoreCommands::Create { name } => {
            let mut form = ResourceForm::create(&STORE_FORM);
            let mut values = Map::new();
            values.insert("name".into(), json!(name));
            submit(&mut form, client, None, values).await
        }
        StoreCommands::Update { id, name } => {
            let mut form = ResourceForm::edit(&STORE_FORM, id);
            let mut values = Map::new();
            values.insert("name".into(), json!(name));
            submit(&mut form, client, None, values).await
        }
        StoreCommands::Delete { id, yes } => {
            let mut form = ResourceForm::edit(&STORE_FORM, id);
            delete(&mut form, client, None, id, yes).await
        }
    }
}

async fn handle_attribute(
    client: &ApiClient,
    schema: &'static FormSchema,
    cmd: AttributeCommands,
) -> anyhow::Result<()> {
    match cmd {
        AttributeCommands::List { store } => {
            let path = schema.collection_path(Some(store)).map_err(form_error)?;
            let records = client.get_json(&path).await?;
            print_record(&records)
        }
        AttributeCommands::Get { store, id } => {
            let path = schema.record_path(Some(store), id).map_err(form_error)?;
            let record = client.get_json(&path).await?;
            print_record(&record)
        }
        AttributeCommands::Create { store, name, value } => {
            let mut form = ResourceForm::create(schema);
            submit(&mut form, client, Some(store), attribute_values(name, value)).await
        }
        AttributeCommands::Update {
            store,
            id,
            name,
            value,
        } => {
            let mut form = ResourceForm::edit(schema, id);
            submit(&mut form, client, Some(store), attribute_values(name, value)).await
        }
        AttributeCommands::Delete { store, id, yes } => {
            let mut form = ResourceForm::edit(schema, id);
            delete(&mut form, client, Some(store), id, yes).await
        }
    }
}

async fn handle_product(client: &ApiClient, cmd: ProductCommands) -> anyhow::Result<()> {
    match cmd {
        ProductCommands::List {
            store,
            category,
            featured,
        } => {
            let mut path = format!("api/{}/products", store);
            let mut params = vec![];
            if let Some(category) = category {
                params.push(format!("categoryId={}", category));
            }
            if featured {
                params.push("isFeatured=true".to_string());
            }
            if !params.is_empty() {
                path = format!("{}?{}", path, params.join("&"));
            }
            let records = client.get_json(&path).await?;
            print_record(&records)
        }
        ProductCommands::Get { store, id } => {
            let path = PRODUCT_FORM.record_path(Some(store), id).map_err(form_error)?;
            let record = client.get_json(&path).await?;
            print_record(&record)
        }
        ProductCommands::Create { store, fields } => {
            let mut form = ResourceForm::create(&PRODUCT_FORM);
            submit(&mut form, client, Some(store), product_values(fields)).await
        }
        ProductCommands::Update { store, id, fields } => {
            let mut form = ResourceForm::edit(&PRODUCT_FORM, id);
            submit(&mut form, client, Some(store), product_values(fields)).await
        }
        ProductCommands::Delete { store, id, yes } => {
            let mut form = ResourceForm::edit(&PRODUCT_FORM, id);
            delete(&mut form, client, Some(store), id, yes).await
        }
    }
}

fn attribute_values(name: String, value: Option<String>) -> Map<String, Value> {
    let mut values = Map::new();
    values.insert("name".into(), json!(name));
    if let Some(value) = value {
        values.insert("value".into(), json!(value));
    }
    values
}

fn product_values(fields: ProductFields) -> Map<String, Value> {
    let images: Vec<Value> = fields.images.iter().map(|url| json!({ "url": url })).collect();
    let mut values = Map::new();
    values.insert("name".into(), json!(fields.name));
    values.insert("price".into(), json!(fields.price.to_string()));
    values.insert("quantity".into(), json!(fields.quantity));
    values.insert("categoryId".into(), json!(fields.category.to_string()));
    values.insert("colorId".into(), json!(fields.color.to_string()));
    values.insert("sizeId".into(), json!(fields.size.to_string()));
    values.insert("genderId".into(), json!(fields.gender.to_string()));
    values.insert("images".into(), Value::Array(images));
    values.insert("isFeatured".into(), json!(fields.featured));
    values.insert("isArchived".into(), json!(fields.archived));
    values
}

async fn submit(
    form: &mut ResourceForm,
    client: &ApiClient,
    store_id: Option<Uuid>,
    values: Map<String, Value>,
) -> anyhow::Result<()> {
    let outcome = form
        .submit(client, store_id, values)
        .await
        .map_err(form_error)?;
    println!("✓ {}", outcome.message);
    print_record(&outcome.record)
}

async fn delete(
    form: &mut ResourceForm,
    client: &ApiClient,
    store_id: Option<Uuid>,
    id: Uuid,
    confirmed: bool,
) -> anyhow::Result<()> {
    match form.delete(client, store_id, id, confirmed).await {
        Ok(outcome) => {
            println!("✓ {}", outcome.message);
            print_record(&outcome.record)
        }
        Err(FormError::NotConfirmed) => {
            anyhow::bail!("deletion not confirmed; re-run with --yes")
        }
        Err(e) => Err(form_error(e)),
    }
}

fn form_error(e: FormError) -> anyhow::Error {
    anyhow::Error::msg(e.to_string())
}

fn print_record(record: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(record)?);
    Ok(())
}
