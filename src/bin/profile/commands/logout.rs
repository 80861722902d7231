//! Logout command

use crate::client::ProfileClient;
use crate::style::*;
use anyhow::Result;

pub fn run(client: &ProfileClient) -> Result<()> {
    client.guard().logout()?;
    print_success("Signed out.");
    println!("Sign in again with:");
    println!("  profile login");
    Ok(())
}
