use clap::Parser;
use serde_json::{Value, json};

use crate::{
    auth::{identity::LocalIdentityProvider, session_store::KeyringSessionStore},
    cli::{
        display::{
            SessionIndicator, UiOptions, configure_terminal, error as error_msg,
            is_interactive_terminal, print_header, remote_spinner, short_id, success, system,
            warning,
        },
        parser::{Cli, Commands, ItemArgs},
        prompts, runtime_config, table,
    },
    core::{
        client::WishlistClient,
        errors::{WishlistError, WishlistResult},
        models::WishlistItem,
        service::CacheState,
    },
    storage::{app::AppStore, r#trait::DocumentStore},
};

type AppClient = WishlistClient<AppStore, LocalIdentityProvider<AppStore, KeyringSessionStore>>;

async fn app_client(cli: &Cli) -> WishlistResult<AppClient> {
    let store = AppStore::connect(&cli.backend, &cli.database_url).await?;
    store.init().await?;
    let identity = LocalIdentityProvider::new(store.clone(), KeyringSessionStore);
    Ok(WishlistClient::new(store, identity))
}

fn ui_options(cli: &Cli) -> UiOptions {
    UiOptions {
        json: cli.json,
        quiet: cli.quiet,
        color: !cli.no_color,
    }
}

fn map_user_error(err: &WishlistError) -> &'static str {
    match err {
        WishlistError::InvalidCredentials => "Email or password is incorrect.",
        WishlistError::EmailAlreadyInUse => "An account with this email already exists.",
        WishlistError::NoActiveSession => "No one is signed in. Run signin first.",
        WishlistError::InvalidArgument(message) if message.starts_with("password") => {
            "Password must be at least 6 characters long."
        }
        WishlistError::InvalidArgument(message) if message == "ambiguous item id prefix" => {
            "Ambiguous ID. Use a longer ID prefix."
        }
        WishlistError::InvalidArgument(_) => "Invalid input.",
        WishlistError::NotFound => "Item not found.",
        WishlistError::RequestFailed => "Remote store request failed.",
        WishlistError::RefreshFailed(_) => {
            "Change saved, but the wishlist could not be reloaded. Run list to retry."
        }
        WishlistError::KeyringLocked => "Secure keyring is locked. Unlock your keyring and retry.",
        WishlistError::KeyringUnavailable => "Secure keyring unavailable.",
        WishlistError::UnsupportedBackend(_) => "Unsupported backend configuration.",
        WishlistError::Config(message) if message == "operation cancelled" => {
            "Operation cancelled."
        }
        WishlistError::Config(_) => "Invalid configuration or input.",
        WishlistError::Crypto => "Security operation failed.",
        WishlistError::Serialization => "Data format error.",
    }
}

/// Values that parse as JSON keep their type; everything else is stored as text.
fn parse_detail_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()))
}

fn apply_details(mut item: WishlistItem, details: &[(String, String)]) -> WishlistItem {
    for (key, raw) in details {
        item.details.insert(key.clone(), parse_detail_value(raw));
    }
    item
}

fn resolve_item(id_input: &str, items: &[WishlistItem]) -> WishlistResult<WishlistItem> {
    if let Some(exact) = items
        .iter()
        .find(|item| item.id.as_deref() == Some(id_input))
    {
        return Ok(exact.clone());
    }

    let mut matches = items.iter().filter(|item| {
        item.id
            .as_deref()
            .is_some_and(|id| id.starts_with(id_input))
    });

    let Some(first) = matches.next() else {
        return Err(WishlistError::NotFound);
    };

    if matches.next().is_some() {
        return Err(WishlistError::invalid_argument("ambiguous item id prefix"));
    }

    Ok(first.clone())
}

fn print_json(value: &Value) -> WishlistResult<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

pub async fn run() -> WishlistResult<()> {
    let mut cli = Cli::parse();
    let args = std::env::args().collect::<Vec<_>>();
    let backend_explicit = runtime_config::cli_flag_present(&args, "--backend");
    let database_url_explicit = runtime_config::cli_flag_present(&args, "--database-url");

    if (!backend_explicit || !database_url_explicit)
        && let Some(saved_config) = runtime_config::load()?
    {
        if !backend_explicit {
            cli.backend = saved_config.backend;
        }
        if !database_url_explicit {
            cli.database_url = saved_config.database_url;
        }
    }

    let options = ui_options(&cli);
    configure_terminal(options.color);

    let client = app_client(&cli).await?;

    // Same as an application resume: pick up whoever is still signed in.
    let spinner = remote_spinner("Loading wishlist...", options);
    let attached = client.attach_session().await;
    spinner.finish_and_clear();
    if let Err(err) = &attached {
        tracing::debug!(error = ?err, "resuming session failed");
        warning(map_user_error(err), options);
    }

    let session_indicator = match client.service().await {
        Ok(service) => SessionIndicator::SignedIn(service.uid().to_owned()),
        Err(_) => SessionIndicator::SignedOut,
    };

    let result = match &cli.command {
        Commands::Signup => run_signup(&client, &cli, options, &session_indicator).await,
        Commands::Signin => run_signin(&client, options, &session_indicator).await,
        Commands::Signout => run_signout(&client, options, &session_indicator).await,
        Commands::Status => run_status(&client, &cli, options, &session_indicator).await,
        Commands::List => run_list(&client, options, &session_indicator).await,
        Commands::Add(item) => run_add(&client, options, &session_indicator, item).await,
        Commands::Edit {
            id,
            item,
            clear_details,
        } => run_edit(&client, options, &session_indicator, id, item, *clear_details).await,
        Commands::Delete { id } => run_delete(&client, options, &session_indicator, id).await,
        Commands::Config => run_config(&cli, options, &session_indicator),
    };

    if let Err(err) = &result {
        error_msg(map_user_error(err), options);
    }

    result
}

async fn run_signup(
    client: &AppClient,
    cli: &Cli,
    options: UiOptions,
    session_indicator: &SessionIndicator,
) -> WishlistResult<()> {
    print_header("Create Account", session_indicator, options);
    let name = prompts::input("Name")?;
    let email = prompts::input("Email")?;
    let password = prompts::password_prompt("Password: ")?;

    let spinner = remote_spinner("Creating account...", options);
    let outcome = client.sign_up(&name, &email, &password).await;
    spinner.finish_and_clear();
    let service = outcome?;

    success(&format!("{email} is signed in."), options);
    system(&format!("User ID: {}", short_id(service.uid())), options);

    runtime_config::save(&runtime_config::RuntimeConfig {
        backend: cli.backend.clone(),
        database_url: cli.database_url.clone(),
    })?;
    Ok(())
}

async fn run_signin(
    client: &AppClient,
    options: UiOptions,
    session_indicator: &SessionIndicator,
) -> WishlistResult<()> {
    print_header("Sign In", session_indicator, options);
    let email = prompts::input("Email")?;
    let password = prompts::password_prompt("Password: ")?;

    let spinner = remote_spinner("Signing in...", options);
    let outcome = client.sign_in(&email, &password).await;
    spinner.finish_and_clear();
    let service = outcome?;

    success(&format!("{email} is signed in."), options);
    system(
        &format!("Items on your wishlist: {}", service.items().await.len()),
        options,
    );
    Ok(())
}

async fn run_signout(
    client: &AppClient,
    options: UiOptions,
    session_indicator: &SessionIndicator,
) -> WishlistResult<()> {
    print_header("Sign Out", session_indicator, options);
    client.sign_out().await?;
    success("Signed out.", options);
    Ok(())
}

async fn run_status(
    client: &AppClient,
    cli: &Cli,
    options: UiOptions,
    session_indicator: &SessionIndicator,
) -> WishlistResult<()> {
    print_header("Status", session_indicator, options);

    let Ok(service) = client.service().await else {
        if options.json {
            return print_json(&json!({"signed_in": false, "backend": cli.backend}));
        }
        system("No one is signed in.", options);
        return Ok(());
    };

    let account = service.account().await?;
    let item_count = service.items().await.len();
    let cache = match service.cache_state().await {
        CacheState::Unloaded => "unloaded",
        CacheState::Fresh => "fresh",
        CacheState::Stale => "stale",
    };

    if options.json {
        return print_json(&json!({
            "signed_in": true,
            "uid": service.uid(),
            "name": account.as_ref().map(|record| record.name.clone()),
            "items": item_count,
            "cache": cache,
            "backend": cli.backend,
        }));
    }

    let name = account.map_or_else(|| "-".to_owned(), |record| record.name);
    system(&format!("Name: {name}"), options);
    system(&format!("User ID: {}", service.uid()), options);
    system(&format!("Items: {item_count} ({cache})"), options);
    system(&format!("Backend: {}", cli.backend), options);
    Ok(())
}

async fn run_list(
    client: &AppClient,
    options: UiOptions,
    session_indicator: &SessionIndicator,
) -> WishlistResult<()> {
    print_header("My Wishlist", session_indicator, options);
    let service = client.service().await?;
    if service.cache_state().await == CacheState::Stale {
        warning("Showing items from an earlier read.", options);
    }
    let items = service.items().await;

    if options.json {
        let output = items
            .iter()
            .map(|item| {
                json!({
                    "id": item.id,
                    "name": item.name,
                    "details": item.details,
                })
            })
            .collect::<Vec<_>>();
        return print_json(&Value::Array(output));
    }

    if items.is_empty() {
        system("Your wishlist is empty.", options);
        return Ok(());
    }
    table::print_item_table(&items);
    Ok(())
}

async fn run_add(
    client: &AppClient,
    options: UiOptions,
    session_indicator: &SessionIndicator,
    args: &ItemArgs,
) -> WishlistResult<()> {
    print_header("Add Item", session_indicator, options);
    let service = client.service().await?;

    let name = match &args.name {
        Some(name) => name.clone(),
        None => prompts::input("Item name")?,
    };
    let item = apply_details(WishlistItem::new(name), &args.details);

    let spinner = remote_spinner("Saving item...", options);
    let outcome = service.add_item(item).await;
    spinner.finish_and_clear();
    let added = outcome?;

    success(&format!("Added {}.", added.name), options);
    if let Some(id) = added.id.as_deref() {
        system(&format!("ID: {}", short_id(id)), options);
    }
    Ok(())
}

async fn run_edit(
    client: &AppClient,
    options: UiOptions,
    session_indicator: &SessionIndicator,
    id: &str,
    args: &ItemArgs,
    clear_details: bool,
) -> WishlistResult<()> {
    print_header("Edit Item", session_indicator, options);
    let service = client.service().await?;
    let mut item = resolve_item(id, &service.items().await)?;

    if let Some(name) = &args.name {
        item.name = name.clone();
    }
    if clear_details {
        item.details.clear();
    }
    let item = apply_details(item, &args.details);

    let spinner = remote_spinner("Updating item...", options);
    let outcome = service.edit_item(&item).await;
    spinner.finish_and_clear();
    outcome?;

    success(&format!("Updated {}.", item.name), options);
    Ok(())
}

async fn run_delete(
    client: &AppClient,
    options: UiOptions,
    session_indicator: &SessionIndicator,
    id: &str,
) -> WishlistResult<()> {
    print_header("Delete Item", session_indicator, options);
    let service = client.service().await?;
    let item = resolve_item(id, &service.items().await)?;

    if is_interactive_terminal() && !options.json {
        let proceed = prompts::confirmation_prompt(&format!("Delete {}?", item.name), false)?;
        if !proceed {
            return Err(WishlistError::Config("operation cancelled".to_owned()));
        }
    }

    let spinner = remote_spinner("Deleting item...", options);
    let outcome = service.delete_item(&item).await;
    spinner.finish_and_clear();
    let remaining = outcome?;

    success(&format!("Deleted {}.", item.name), options);
    system(&format!("Items left: {}", remaining.len()), options);
    Ok(())
}

fn run_config(
    cli: &Cli,
    options: UiOptions,
    session_indicator: &SessionIndicator,
) -> WishlistResult<()> {
    print_header("Configuration", session_indicator, options);
    runtime_config::save(&runtime_config::RuntimeConfig {
        backend: cli.backend.clone(),
        database_url: cli.database_url.clone(),
    })?;

    if options.json {
        return print_json(&json!({"backend": cli.backend}));
    }
    system(&format!("Backend: {}", cli.backend), options);
    success("Configuration saved.", options);
    Ok(())
}
