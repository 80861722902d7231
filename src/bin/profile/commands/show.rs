//! Show command - render the profile metrics

use crate::client::ProfileClient;
use crate::style::*;
use anyhow::Result;
use profile_insight::metrics::{AuditCounts, ProfileMetrics, ProjectXp};
use profile_insight::ProfileOutcome;

const BAR_WIDTH: usize = 40;

pub async fn run(client: &ProfileClient, json: bool) -> Result<()> {
    match client.load_metrics().await? {
        ProfileOutcome::Loaded(metrics) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&metrics)?);
            } else {
                render(&metrics);
            }
            Ok(())
        }
        ProfileOutcome::Redirect(_) => {
            print_warning("Your session is missing or has expired.");
            println!("Sign in with:");
            println!("  profile login");
            Ok(())
        }
        ProfileOutcome::Unavailable(e) => {
            print_warning("Profile data unavailable.");
            Err(e.into())
        }
    }
}

fn render(metrics: &ProfileMetrics) {
    let first_name = metrics
        .user
        .as_ref()
        .and_then(|u| u.first_name.as_deref())
        .filter(|n| !n.is_empty())
        .unwrap_or("there");

    println!();
    println!("{}", style_bold(&format!("Hey {} ✨", first_name)));
    println!("{}", style_dim("You're shining through your progress!"));

    render_user(metrics);
    render_audits(&metrics.audits);
    render_projects(&metrics.projects);

    if metrics.milestone_reached {
        println!();
        println!(
            "{}",
            style_magenta("🎉 Module XP milestone reached - congratulations!")
        );
    }
    println!();
}

fn render_user(metrics: &ProfileMetrics) {
    print_header("User Information");

    let Some(user) = &metrics.user else {
        print_info("User record not available.");
        return;
    };

    let name = [user.first_name.as_deref(), user.last_name.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");

    println!("Name:         {}", name);
    println!("Email:        {}", user.email.as_deref().unwrap_or(""));
    println!("Login:        {}", style_cyan(&user.login));
    println!("Audit Ratio:  {}", style_bold(&format!("{:.1}", user.audit_ratio)));
    println!("Total XP:     {}", style_bold(&format!("{}kB", metrics.total_xp_kb)));
    println!("Level:        {}", style_bold(&metrics.level.to_string()));
}

fn render_audits(audits: &AuditCounts) {
    print_header("Audit Stats");

    let total = audits.total() as f64;
    println!(
        "{} {:>4}  {}",
        style_green("✔ Passed:"),
        audits.pass_count,
        style_magenta(&bar(audits.pass_count as f64, total, BAR_WIDTH))
    );
    println!(
        "{} {:>4}  {}",
        style_red("✘ Failed:"),
        audits.fail_count,
        style_red(&bar(audits.fail_count as f64, total, BAR_WIDTH))
    );
}

fn render_projects(projects: &[ProjectXp]) {
    if projects.is_empty() {
        return;
    }

    print_header("XP Earned per Project");

    let max = projects.first().map(|p| p.amount).unwrap_or(0.0);
    let label_width = projects
        .iter()
        .map(|p| p.project.chars().count())
        .max()
        .unwrap_or(0);

    for project in projects {
        println!(
            "{:<width$}  {:>8}  {}",
            project.project,
            project.amount,
            style_magenta(&bar(project.amount, max, BAR_WIDTH)),
            width = label_width
        );
    }
}
