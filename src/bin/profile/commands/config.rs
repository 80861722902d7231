//! Config command - show the effective configuration

use crate::client::ProfileClient;
use crate::style::*;
use anyhow::Result;
use profile_insight::query::{MODULE_EVENT_PATH, TRACKED_EVENT_IDS};
use profile_insight::Config;

pub fn run(config: &Config, client: &ProfileClient) -> Result<()> {
    print_header("Profile Insight Configuration");

    println!();
    println!("Sign-in endpoint:  {}", style_cyan(client.auth_endpoint()));
    println!("GraphQL endpoint:  {}", style_cyan(client.graphql_endpoint()));
    println!("Session database:  {}", client.session_path().display());
    println!("HTTP timeout:      {}s", config.http.timeout_secs);

    println!();
    println!("{}", style_bold("Profile query:"));
    println!(
        "  Level events:    {}",
        TRACKED_EVENT_IDS
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("  Module XP path:  {}", MODULE_EVENT_PATH);

    Ok(())
}
