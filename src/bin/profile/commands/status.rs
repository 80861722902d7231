//! Status command - inspect the stored session without contacting the server

use crate::client::ProfileClient;
use crate::style::*;
use anyhow::Result;
use chrono::{DateTime, Utc};
use profile_insight::token;

pub fn run(client: &ProfileClient) -> Result<()> {
    print_header("Session Status");

    let Some(session) = client.guard().current_token()? else {
        print_warning("No session stored.");
        println!("Sign in with:");
        println!("  profile login");
        return Ok(());
    };

    let Some(claims) = session.claims() else {
        print_warning("Stored session token is malformed.");
        println!("It will be discarded the next time the profile is opened.");
        return Ok(());
    };

    let now = Utc::now().timestamp();
    let expires = DateTime::<Utc>::from_timestamp(claims.exp, 0)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| claims.exp.to_string());

    if token::is_expired(&claims, now) {
        print_warning("Session expired.");
    } else {
        print_success("Session active.");
    }
    println!();
    println!("Subject:      {}", claims.sub.as_deref().unwrap_or("?"));
    println!("Expires:      {}", expires);
    if !token::is_expired(&claims, now) {
        let remaining = claims.exp - now;
        println!(
            "Remaining:    {}",
            style_green(&format!("{}h {}m", remaining / 3600, (remaining % 3600) / 60))
        );
    }
    println!("Stored in:    {}", style_dim(&client.session_path().display().to_string()));

    Ok(())
}
