use std::io::{self, BufRead, Write};
use std::time::Duration;

use anyhow::{bail, Result};
use clap::Subcommand;
use ownsphere_core::market_data::MarketSource;
use ownsphere_core::session::RegistrationForm;
use ownsphere_core::settings::{Language, PreferencesUpdate};
use ownsphere_core::{AccountServiceTrait, PreferencesServiceTrait, SessionState};

use crate::main_lib::{connect_and_resume, AppState};
use crate::render;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show connection, session and poller state
    Status,
    /// Create an account; the password is read from stdin
    Register {
        id: String,
        name: String,
        email: String,
    },
    /// Sign in; the password is read from stdin
    Login { email: String },
    /// Sign out after confirmation
    Logout {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Fetch quotes once
    Quotes {
        /// remote or simulated; defaults to the persisted source
        #[arg(short, long)]
        source: Option<MarketSource>,
    },
    /// Keep refreshing quotes until interrupted
    Watch {
        /// Milliseconds between refreshes; defaults to the persisted interval
        #[arg(short, long)]
        interval_ms: Option<u64>,
        /// Stop after this many updates
        #[arg(short, long)]
        count: Option<usize>,
    },
    /// Select the quote source used by refreshes
    Source { source: MarketSource },
    /// Turn the persisted auto-refresh off
    StopWatch,
    /// Show the current token balance
    Balance,
    /// Buy tokens
    Buy { amount: u64 },
    /// Ask the backend for an investment suggestion
    Suggest,
    /// Publish a post
    Post { content: String },
    /// Show or change display preferences
    Prefs {
        #[arg(long)]
        dark_mode: Option<bool>,
        #[arg(long)]
        notifications: Option<bool>,
        #[arg(long)]
        language: Option<Language>,
        /// Flip dark mode
        #[arg(long, conflicts_with = "dark_mode")]
        toggle_dark_mode: bool,
    },
}

pub async fn run(state: &AppState, command: Command) -> Result<()> {
    match command {
        Command::Status => status(state).await,
        Command::Register { id, name, email } => {
            connect_and_resume(state).await?;
            let password = read_line("Password: ")?;
            let confirm_password = read_line("Confirm password: ")?;
            let session = state
                .sessions
                .register(RegistrationForm {
                    id,
                    name,
                    email,
                    password,
                    confirm_password,
                })
                .await?;
            println!("Welcome, {}!\n{}", session.name, render::session(&session));
            Ok(())
        }
        Command::Login { email } => {
            connect_and_resume(state).await?;
            let password = read_line("Password: ")?;
            let session = state.sessions.login(&email, &password).await?;
            println!("Signed in.\n{}", render::session(&session));
            Ok(())
        }
        Command::Logout { yes } => {
            connect_and_resume(state).await?;
            let ticket = state.sessions.request_logout()?;
            let confirmed = yes || {
                let answer = read_line(&format!("Log out {}? [y/N] ", ticket.session_id))?;
                matches!(answer.trim(), "y" | "Y" | "yes")
            };
            if confirmed {
                state.sessions.confirm_logout(&ticket)?;
                println!("Signed out.");
            } else {
                state.sessions.cancel_logout();
                println!("Still signed in.");
            }
            Ok(())
        }
        Command::Quotes { source } => {
            let source = source.unwrap_or_else(|| state.market.config().source);
            let feed = state.market.fetch_once(source).await;
            print!("{}", render::feed(&feed));
            Ok(())
        }
        Command::Watch { interval_ms, count } => watch(state, interval_ms, count).await,
        Command::Source { source } => {
            let feed = state.market.set_source(source).await?;
            print!("{}", render::feed(&feed));
            Ok(())
        }
        Command::StopWatch => {
            // Timers live in-process; resuming first lets stop persist the change.
            state.market.resume_auto_refresh()?;
            state.market.stop_auto_refresh()?;
            println!("Auto-refresh disabled.");
            Ok(())
        }
        Command::Balance => {
            connect_and_resume(state).await?;
            println!("{}", state.accounts.token_balance().await?);
            Ok(())
        }
        Command::Buy { amount } => {
            connect_and_resume(state).await?;
            let balance = state.accounts.buy_tokens(amount).await?;
            println!("Bought {} tokens; balance is now {}.", amount, balance);
            Ok(())
        }
        Command::Suggest => {
            connect_and_resume(state).await?;
            println!("{}", state.accounts.investment_suggestion().await?);
            Ok(())
        }
        Command::Post { content } => {
            connect_and_resume(state).await?;
            state.accounts.create_post(&content).await?;
            println!("Posted.");
            Ok(())
        }
        Command::Prefs {
            dark_mode,
            notifications,
            language,
            toggle_dark_mode,
        } => {
            if toggle_dark_mode {
                state.preferences.toggle_dark_mode()?;
            }
            let update = PreferencesUpdate {
                dark_mode,
                notifications_enabled: notifications,
                language,
            };
            let prefs = if update == PreferencesUpdate::default() {
                state.preferences.get_preferences()
            } else {
                state.preferences.update_preferences(&update)?
            };
            println!("{}", render::preferences(&prefs));
            Ok(())
        }
    }
}

async fn status(state: &AppState) -> Result<()> {
    connect_and_resume(state).await?;
    let settings = state.connection.settings();
    println!(
        "backend: {} ({}, canister {})",
        settings.host, settings.environment, settings.canister_id
    );
    match state.connection.state().failure() {
        Some(reason) => println!("connection: failed ({})", reason),
        None => println!("connection: ready"),
    }
    match state.sessions.state() {
        SessionState::Authenticated(session) => println!("{}", render::session(&session)),
        _ => println!("not signed in"),
    }
    let config = state.market.config();
    println!(
        "market: {} every {} ms, auto-refresh {}",
        config.source,
        config.interval_ms,
        if config.enabled { "on" } else { "off" }
    );
    Ok(())
}

async fn watch(state: &AppState, interval_ms: Option<u64>, count: Option<usize>) -> Result<()> {
    let interval = interval_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| state.market.config().interval());
    let mut updates = state.market.subscribe();

    print!("{}", render::feed(&state.market.fetch_once(state.market.config().source).await));
    updates.borrow_and_update();
    state.market.start_auto_refresh(interval)?;

    let mut seen = 0usize;
    loop {
        if count.is_some_and(|limit| seen >= limit) {
            break;
        }
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let feed = updates.borrow_and_update().clone();
                print!("{}", render::feed(&feed));
                seen += 1;
            }
        }
    }

    state.market.shutdown();
    Ok(())
}

fn read_line(prompt: &str) -> Result<String> {
    eprint!("{}", prompt);
    io::stderr().flush()?;
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        bail!("no input on stdin");
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
