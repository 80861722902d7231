//! Login command - exchange credentials for a session

use crate::client::ProfileClient;
use crate::style::*;
use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use profile_insight::Redirect;
use std::time::Duration;

pub async fn run(client: &ProfileClient, identifier: Option<String>, force: bool) -> Result<()> {
    let now = chrono::Utc::now().timestamp();
    if !force && client.guard().login_entry(now)? == Some(Redirect::Profile) {
        print_info("Already signed in. Use --force to sign in again.");
        return super::show::run(client, false).await;
    }

    crate::print_banner();
    let (identifier, password) = crate::wizard::prompt_credentials(identifier)?;

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("  {spinner:.cyan} {msg}") {
        pb.set_style(style);
    }
    pb.set_message("Signing in...");
    pb.enable_steady_tick(Duration::from_millis(80));

    let result = client.login(&identifier, &password).await;
    pb.finish_and_clear();

    result?;
    print_success(&format!("Signed in as {}", style_cyan(&identifier)));

    super::show::run(client, false).await
}
