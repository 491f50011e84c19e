use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use client_core::{
    config::{load_settings_from, SETTINGS_FILE},
    ChatSession, FormController, FormEvent, HttpStorefrontApi, NoticeLevel, SendOutcome,
    SubmitOutcome, UserFile,
};
use shared::domain::ProductField;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "storefront", about = "Admin client for the storefront backend", version)]
struct Cli {
    #[arg(long, global = true, help = "Backend origin; overrides config and environment")]
    base_url: Option<String>,
    #[arg(long, global = true, help = "Settings file", default_value = SETTINGS_FILE)]
    config: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fill the product form from flags and submit it.
    AddProduct(AddProductArgs),
    /// Generate a whole product from a free-text prompt.
    Compose(ComposeArgs),
    /// Ask the assistant; reads questions from stdin when no message is given.
    Ask(AskArgs),
}

#[derive(Args, Debug)]
struct AddProductArgs {
    #[arg(long)]
    name: String,
    #[arg(long, default_value = "")]
    brand: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long, default_value = "")]
    price: String,
    #[arg(long, default_value = "", help = "One of Laptop, Headphone, Mobile, Electronics, Toys, Fashion")]
    category: String,
    #[arg(long, default_value = "")]
    stock: String,
    #[arg(long, default_value = "", help = "YYYY-MM-DD")]
    release_date: String,
    #[arg(long, action = ArgAction::SetTrue)]
    available: bool,
    #[arg(long, help = "JPEG or PNG file to upload")]
    image: Option<PathBuf>,
    #[arg(long, action = ArgAction::SetTrue, help = "Ask the backend to write the description")]
    ai_description: bool,
    #[arg(long, action = ArgAction::SetTrue, help = "Ask the backend to draw the image")]
    ai_image: bool,
}

#[derive(Args, Debug)]
struct ComposeArgs {
    #[arg(long)]
    prompt: String,
    #[arg(long, action = ArgAction::SetTrue, help = "Also generate an image for the draft")]
    image_ai: bool,
    #[arg(long, action = ArgAction::SetTrue, help = "Submit the generated draft")]
    submit: bool,
}

#[derive(Args, Debug)]
struct AskArgs {
    message: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings_from(&cli.config, |name| std::env::var(name).ok())
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if let Some(base_url) = cli.base_url {
        settings.base_url = base_url;
    }
    let api = HttpStorefrontApi::new(&settings)?;
    info!(base_url = %api.base_url(), "storefront client ready");

    match cli.command {
        Command::AddProduct(args) => add_product(&api, args).await,
        Command::Compose(args) => compose(&api, args).await,
        Command::Ask(args) => ask(&api, args).await,
    }
}

async fn add_product(api: &HttpStorefrontApi, args: AddProductArgs) -> Result<()> {
    let mut form = FormController::new();
    form.update_field(ProductField::Name, args.name);
    form.update_field(ProductField::Brand, args.brand);
    form.update_field(ProductField::Description, args.description);
    form.update_field(ProductField::Price, args.price);
    form.update_field(ProductField::Category, args.category);
    form.update_field(ProductField::StockQuantity, args.stock);
    form.update_field(ProductField::ReleaseDate, args.release_date);
    form.set_available(args.available);

    if let Some(path) = &args.image {
        form.select_image(Some(read_user_file(path).await?));
    }
    if args.ai_description {
        form.generate_description(api).await;
        print_events(&mut form);
    }
    if args.ai_image {
        form.generate_image(api).await;
        print_events(&mut form);
    }

    submit(api, &mut form).await
}

async fn compose(api: &HttpStorefrontApi, args: ComposeArgs) -> Result<()> {
    let mut form = FormController::new();
    form.open_composer();
    form.set_prompt(args.prompt);
    form.generate_full_product(api).await;
    print_events(&mut form);
    if form.is_composer_open() {
        anyhow::bail!("product generation did not produce a draft");
    }

    if args.image_ai {
        form.generate_image(api).await;
        print_events(&mut form);
    }
    println!("{}", serde_json::to_string_pretty(form.draft())?);
    if let Some(preview) = form.image().preview() {
        println!("image preview: {} bytes as data URL", preview.as_str().len());
    }

    if args.submit {
        submit(api, &mut form).await?;
    }
    Ok(())
}

async fn ask(api: &HttpStorefrontApi, args: AskArgs) -> Result<()> {
    let mut session = ChatSession::new();
    if let Some(first) = session.transcript().first() {
        println!("assistant> {}", first.text);
    }

    if let Some(message) = args.message {
        ask_once(api, &mut session, &message).await;
        return Ok(());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        ask_once(api, &mut session, &line).await;
    }
    Ok(())
}

async fn ask_once(api: &HttpStorefrontApi, session: &mut ChatSession, message: &str) {
    match session.send(api, message).await {
        SendOutcome::Replied => {
            if let Some(reply) = session.transcript().last() {
                println!("assistant> {}", reply.text);
            }
        }
        SendOutcome::Failed => {
            if let Some(error) = session.error() {
                eprintln!("error: {error}");
            }
        }
        SendOutcome::Ignored => {}
    }
}

async fn submit(api: &HttpStorefrontApi, form: &mut FormController) -> Result<()> {
    let outcome = form.submit(api).await;
    print_events(form);
    match outcome {
        SubmitOutcome::Created(created) => {
            match created.id {
                Some(id) => println!("created product {id}"),
                None => println!("product created"),
            }
            Ok(())
        }
        SubmitOutcome::Invalid | SubmitOutcome::Failed => {
            for (field, message) in form.errors().iter() {
                eprintln!("  {field}: {message}");
            }
            anyhow::bail!("product was not added")
        }
        SubmitOutcome::InFlight => anyhow::bail!("a submission is already in flight"),
    }
}

async fn read_user_file(path: &Path) -> Result<UserFile> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("image")
        .to_string();
    let mime_type = mime_guess::from_path(path)
        .first_raw()
        .unwrap_or("application/octet-stream");
    Ok(UserFile::new(filename, mime_type, bytes))
}

fn print_events(form: &mut FormController) {
    for event in form.drain_events() {
        match event {
            FormEvent::Notice(notice) => match notice.level {
                NoticeLevel::Success => println!("ok: {}", notice.message),
                NoticeLevel::Warning => eprintln!("warning: {}", notice.message),
                NoticeLevel::Error => eprintln!("error: {}", notice.message),
            },
            FormEvent::NavigateToListing => debug!("form asked to return to the listing"),
        }
    }
}
