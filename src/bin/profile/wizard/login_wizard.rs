//! Login Wizard - Interactive credential prompt
//!
//! Empty answers are accepted here and rejected by the credential exchange,
//! so the messages match the non-interactive path.

use anyhow::Result;
use console::style;
use dialoguer::{theme::ColorfulTheme, Input, Password};

pub fn prompt_credentials(identifier: Option<String>) -> Result<(String, String)> {
    println!("{}", style("  Welcome Back ✨").cyan().bold());
    println!("  {}", style("Sign in with your platform account").dim());
    println!();

    let identifier = match identifier {
        Some(identifier) => {
            println!("  {} {}", style("Username or Email:").bold(), identifier);
            identifier
        }
        None => Input::with_theme(&ColorfulTheme::default())
            .with_prompt("  Username or Email")
            .allow_empty(true)
            .interact_text()?,
    };

    let password = Password::with_theme(&ColorfulTheme::default())
        .with_prompt("  Password")
        .allow_empty_password(true)
        .interact()?;

    println!();
    Ok((identifier, password))
}
