use std::io::{self, Write};

use dialoguer::{Confirm, Input, theme::ColorfulTheme};
use secrecy::SecretString;

use crate::core::errors::{WishlistError, WishlistResult};

pub fn confirmation_prompt(prompt: &str, default: bool) -> WishlistResult<bool> {
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(default)
        .interact()
        .map_err(|_| WishlistError::Config("unable to read confirmation".to_owned()))
}

pub fn password_prompt(prompt: &str) -> WishlistResult<SecretString> {
    print!("{}", prompt);
    io::stdout()
        .flush()
        .map_err(|_| WishlistError::Config("unable to flush output".to_owned()))?;
    let password = rpassword::read_password()
        .map_err(|_| WishlistError::Config("unable to read password".to_owned()))?;
    Ok(SecretString::new(password.into_boxed_str()))
}

pub fn input(prompt: &str) -> WishlistResult<String> {
    Input::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .interact_text()
        .map_err(|_| WishlistError::Config("unable to read input".to_owned()))
}
