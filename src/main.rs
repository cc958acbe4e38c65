use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use toolshare::api::{HttpApi, TokenSource};
use toolshare::catalog::ToolQuery;
use toolshare::config::Config;
use toolshare::domain::{ChatMessage, NewTool, NewUser, ProfileUpdate, Reservation, Tool, UserProfile};
use toolshare::geo::{Coordinate, Radius};
use toolshare::market::Marketplace;
use toolshare::session::{Session, SessionStore};

mod cli;

use cli::Cli;
use cli::commands::{ChatCommands, Commands, CreateToolArgs, ProfileCommands, RegisterArgs, ToolCommands};

type Market = Marketplace<HttpApi>;

fn setup_logging(level: &str) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("toolshare")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("toolshare.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    // RUST_LOG wins over the configured level
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn build_market(cli: &Cli, config: &Config) -> Result<Market> {
    let base_url = cli.api_url.as_deref().unwrap_or(&config.api.base_url);
    let store = Arc::new(SessionStore::open(&config.session.path).context("Failed to open session store")?);
    let tokens: Arc<dyn TokenSource> = store.clone();
    let api = HttpApi::new(base_url, tokens).context("Invalid API base URL")?;
    info!("Using backend at {}", api.base_url());
    Ok(Marketplace::new(api, store))
}

async fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    // Pure computation, no backend or session needed
    if let Commands::Distance { lat1, lon1, lat2, lon2 } = &cli.command {
        return handle_distance_command(lat1, lon1, lat2, lon2);
    }

    let market = build_market(cli, config)?;
    let outcome = match &cli.command {
        Commands::Login { email, password } => handle_login_command(&market, email, password).await,
        Commands::Logout => handle_logout_command(&market),
        Commands::Whoami => handle_whoami_command(&market),
        Commands::Register(args) => handle_register_command(&market, args).await,
        Commands::Tools { command } => handle_tools_command(&market, command, config).await,
        Commands::Categories => handle_categories_command(&market).await,
        Commands::Reserve { tool_id, start, end } => handle_reserve_command(&market, *tool_id, *start, *end).await,
        Commands::Reservations => handle_reservations_command(&market).await,
        Commands::Chat { command } => handle_chat_command(&market, command).await,
        Commands::Profile { command } => handle_profile_command(&market, command).await,
        Commands::Distance { .. } => Ok(()),
    };

    outcome.map_err(|e| eyre::eyre!(e.user_message()))
}

fn handle_distance_command(lat1: &str, lon1: &str, lat2: &str, lon2: &str) -> Result<()> {
    let a = Coordinate::parse(lat1, lon1)?;
    let b = Coordinate::parse(lat2, lon2)?;
    let distance = a.distance_to(&b);
    info!("Distance {} -> {}: {}", a, b, distance);
    println!("{}", distance);
    Ok(())
}

async fn handle_login_command(market: &Market, email: &str, password: &str) -> toolshare::Result<()> {
    let session = market.login(email, password).await?;
    let who = if session.user.name.is_empty() {
        &session.user.email
    } else {
        &session.user.name
    };
    println!("{} {}", "Logged in as".green(), who.bold());
    Ok(())
}

fn handle_logout_command(market: &Market) -> toolshare::Result<()> {
    market.logout()?;
    println!("{}", "Logged out".green());
    Ok(())
}

fn handle_whoami_command(market: &Market) -> toolshare::Result<()> {
    match market.session()? {
        Session::Anonymous => println!("{}", "Not logged in".yellow()),
        Session::Authenticated(auth) => {
            let user = &auth.user;
            println!("{} {} <{}>", "Logged in as".green(), user.name.bold(), user.email);
            if let Some(id) = user.id {
                println!("  id:   {}", id);
            }
            if let Some(user_type) = user.user_type {
                println!("  type: {}", user_type);
            }
        }
    }
    Ok(())
}

async fn handle_register_command(market: &Market, args: &RegisterArgs) -> toolshare::Result<()> {
    let position = Coordinate::parse(&args.lat, &args.lon)?;
    let user = NewUser {
        name: args.name.trim().to_string(),
        email: args.email.trim().to_string(),
        password: args.password.clone(),
        phone: args.phone.trim().to_string(),
        cpf: args.cpf.trim().to_string(),
        address: args.address.trim().to_string(),
        latitude: position.latitude,
        longitude: position.longitude,
    };
    market.register(&user).await?;
    println!("{} {}", "Account created for".green(), user.email.bold());
    println!("Log in with: toolshare login {}", user.email);
    Ok(())
}

async fn handle_tools_command(market: &Market, command: &ToolCommands, config: &Config) -> toolshare::Result<()> {
    info!("Handling tools command: {:?}", command);
    match command {
        ToolCommands::List { category, max_price } => {
            let mut query = ToolQuery::new();
            if let Some(max) = max_price {
                query = query.with_max_price(*max);
            }
            let tools = match category {
                Some(category) => query.apply(market.tools_in_category(category).await?),
                None => market.tools(&query).await?,
            };
            print_tools(&tools);
        }
        ToolCommands::Nearby {
            lat,
            lon,
            radius,
            all,
            category,
            max_price,
        } => {
            let origin = Coordinate::parse(lat, lon)?;
            let radius = if *all {
                Radius::Unbounded
            } else {
                match radius {
                    Some(km) => Radius::within(*km)?,
                    None => config.nearby.radius(),
                }
            };
            let mut query = ToolQuery::new();
            if let Some(category) = category {
                query = query.with_category(category.as_str());
            }
            if let Some(max) = max_price {
                query = query.with_max_price(*max);
            }
            let tools = market.nearby_tools(origin, radius, &query).await?;
            println!("{} {} ({})", "Tools near".cyan(), origin, radius);
            print_tools(&tools);
        }
        ToolCommands::Show { id } => {
            let tool = market.tool(*id).await?;
            print_tool_detail(&tool);
        }
        ToolCommands::Create(args) => {
            let created = market.create_tool(&new_tool_from_args(args)?).await?;
            let message = created.message.unwrap_or_else(|| "Tool created".to_string());
            println!("{} {} (#{})", message.green(), created.tool.name.bold(), created.tool.id);
        }
    }
    Ok(())
}

fn new_tool_from_args(args: &CreateToolArgs) -> toolshare::Result<NewTool> {
    let position = Coordinate::parse(&args.lat, &args.lon)?;
    let mut tool = NewTool::new(
        args.name.trim(),
        args.description.trim(),
        args.price,
        args.category.trim(),
        position,
    );
    tool.rating = args.rating;
    tool.status = args.status.parse()?;
    tool.image = args.image.clone().filter(|i| !i.trim().is_empty());
    Ok(tool)
}

async fn handle_categories_command(market: &Market) -> toolshare::Result<()> {
    let categories = market.categories().await?;
    if categories.is_empty() {
        println!("{}", "No categories".yellow());
    }
    for category in categories {
        println!("  {}", category);
    }
    Ok(())
}

async fn handle_reserve_command(
    market: &Market,
    tool_id: i64,
    start: chrono::NaiveDate,
    end: chrono::NaiveDate,
) -> toolshare::Result<()> {
    let reservation = market.reserve(tool_id, start, end).await?;
    println!("{} #{}", "Reservation requested:".green(), reservation.id);
    print_reservation(&reservation);
    Ok(())
}

async fn handle_reservations_command(market: &Market) -> toolshare::Result<()> {
    let reservations = market.reservations().await?;
    if reservations.is_empty() {
        println!("{}", "No reservations".yellow());
    }
    for reservation in &reservations {
        print_reservation(reservation);
    }
    Ok(())
}

async fn handle_chat_command(market: &Market, command: &ChatCommands) -> toolshare::Result<()> {
    let (tool_id, messages) = match command {
        ChatCommands::Show { tool_id } => (*tool_id, market.chat(*tool_id).await?),
        ChatCommands::Send { tool_id, message } => (*tool_id, market.send_chat(*tool_id, message).await?),
    };
    let me = market.session()?.user().and_then(|u| u.id);
    print_chat(tool_id, &messages, me);
    Ok(())
}

async fn handle_profile_command(market: &Market, command: &ProfileCommands) -> toolshare::Result<()> {
    match command {
        ProfileCommands::Show => print_profile(&market.profile().await?),
        ProfileCommands::Update {
            name,
            email,
            phone,
            cpf,
            address,
        } => {
            let update = ProfileUpdate {
                name: name.trim().to_string(),
                email: email.trim().to_string(),
                phone: phone.trim().to_string(),
                cpf: cpf.trim().to_string(),
                address: address.trim().to_string(),
            };
            match market.update_profile(&update).await? {
                Some(profile) => print_profile(&profile),
                None => println!("{}", "Profile updated".green()),
            }
        }
    }
    Ok(())
}

fn print_tools(tools: &[Tool]) {
    if tools.is_empty() {
        println!("{}", "No tools found".yellow());
        return;
    }
    for tool in tools {
        let distance = tool.distance.map(|d| format!("  {}", d.to_string().cyan())).unwrap_or_default();
        println!(
            "  #{:<5} {}  {}  {}/day  [{}]{}",
            tool.id,
            tool.name.bold(),
            tool.category.dimmed(),
            format!("{:.2}", tool.price).green(),
            tool.status,
            distance
        );
    }
}

fn print_tool_detail(tool: &Tool) {
    println!("{} (#{})", tool.name.bold(), tool.id);
    println!("  {}", tool.description);
    println!("  category: {}", tool.category);
    println!("  price:    {:.2}/day", tool.price);
    println!("  status:   {}", tool.status);
    if let Some(rating) = tool.rating {
        println!("  rating:   {:.1}", rating);
    }
    match tool.position() {
        Some(position) => println!("  location: {}", position),
        None => println!("  location: {}", "unknown".dimmed()),
    }
}

fn print_reservation(reservation: &Reservation) {
    let date = |d: Option<chrono::NaiveDate>| d.map(|d| d.to_string()).unwrap_or_else(|| "?".to_string());
    let total = reservation
        .total_price
        .map(|t| format!("{:.2}", t))
        .unwrap_or_else(|| "-".to_string());
    println!(
        "  #{:<5} tool {:<5} {} -> {}  total {}  [{}]",
        reservation.id,
        reservation.tool_id.map(|id| id.to_string()).unwrap_or_default(),
        date(reservation.start_date),
        date(reservation.end_date),
        total,
        reservation.status
    );
}

fn print_chat(tool_id: i64, messages: &[ChatMessage], me: Option<i64>) {
    println!("{} #{}", "Chat for tool".cyan(), tool_id);
    if messages.is_empty() {
        println!("{}", "  No messages yet".dimmed());
    }
    for message in messages {
        let mine = me.is_some_and(|id| message.is_from(id));
        let sender = if mine {
            "you".green().to_string()
        } else {
            message.sender.clone().unwrap_or_else(|| "them".to_string()).blue().to_string()
        };
        let at = message.created_at.as_deref().unwrap_or("");
        println!("  {} {}: {}", at.dimmed(), sender, message.message);
    }
}

fn print_profile(profile: &UserProfile) {
    println!("{} (#{})", profile.name.bold(), profile.id);
    println!("  email:   {}", profile.email);
    for (label, value) in [("phone", &profile.phone), ("cpf", &profile.cpf), ("address", &profile.address)] {
        if let Some(value) = value {
            println!("  {:<8} {}", format!("{}:", label), value);
        }
    }
    if let Some(user_type) = profile.user_type {
        println!("  type:    {}", user_type);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    let level = if cli.is_verbose() {
        "debug"
    } else {
        config.log_level.as_deref().unwrap_or("info")
    };
    setup_logging(level).context("Failed to setup logging")?;

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, &config).await?;

    Ok(())
}
