use std::{io::IsTerminal, time::Duration};

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

#[derive(Debug, Clone, Copy)]
pub struct UiOptions {
    pub json: bool,
    pub quiet: bool,
    pub color: bool,
}

#[derive(Debug, Clone)]
pub enum SessionIndicator {
    SignedIn(String),
    SignedOut,
}

pub fn configure_terminal(color: bool) {
    console::set_colors_enabled(color);
}

pub fn is_interactive_terminal() -> bool {
    std::io::stdout().is_terminal()
}

pub fn print_header(title: &str, state: &SessionIndicator, options: UiOptions) {
    if options.quiet || options.json {
        return;
    }

    let state_text = match state {
        SessionIndicator::SignedIn(uid) => format!("[signed in: {}]", short_id(uid)),
        SessionIndicator::SignedOut => "[signed out]".to_owned(),
    };

    println!("wishlist {} {}", env!("CARGO_PKG_VERSION"), state_text);
    println!("---------------------------------------");
    println!("{}", title);
    println!("---------------------------------------");
}

pub fn system(message: &str, options: UiOptions) {
    if options.quiet {
        return;
    }
    if options.json {
        println!("{}", json!({"level":"system", "message": message}));
        return;
    }
    println!("{}", message);
}

pub fn success(message: &str, options: UiOptions) {
    if options.quiet {
        return;
    }
    if options.json {
        println!("{}", json!({"level":"success", "message": message}));
        return;
    }
    println!("✅ {}", style(message).green());
}

pub fn warning(message: &str, options: UiOptions) {
    if options.quiet {
        return;
    }
    if options.json {
        println!("{}", json!({"level":"warning", "message": message}));
        return;
    }
    println!("⚠️ {}", style(message).yellow());
}

pub fn error(message: &str, options: UiOptions) {
    if options.json {
        println!("{}", json!({"level":"error", "message": message}));
        return;
    }
    eprintln!("⛔ {}", style(message).red());
}

/// Spinner shown while a remote call is in flight; hidden for json/quiet output.
pub fn remote_spinner(message: &str, options: UiOptions) -> ProgressBar {
    if options.quiet || options.json || !is_interactive_terminal() {
        return ProgressBar::hidden();
    }

    let spinner = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        spinner.set_style(spinner_style);
    }
    spinner.set_message(message.to_owned());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

pub fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}
