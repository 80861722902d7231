//! Terminal styling utilities

use console::style;

pub fn style_cyan(s: &str) -> String {
    style(s).cyan().to_string()
}

pub fn style_green(s: &str) -> String {
    style(s).green().to_string()
}

pub fn style_red(s: &str) -> String {
    style(s).red().to_string()
}

pub fn style_magenta(s: &str) -> String {
    style(s).magenta().to_string()
}

pub fn style_dim(s: &str) -> String {
    style(s).dim().to_string()
}

pub fn style_bold(s: &str) -> String {
    style(s).bold().to_string()
}

pub fn print_success(msg: &str) {
    println!("{} {}", style_green("✓"), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", style_red("✗"), msg);
}

pub fn print_warning(msg: &str) {
    println!("{} {}", style("⚠").yellow(), msg);
}

pub fn print_info(msg: &str) {
    println!("{} {}", style_cyan("ℹ"), msg);
}

pub fn print_header(title: &str) {
    println!();
    println!("{}", style_bold(title));
    println!("{}", "─".repeat(title.chars().count()));
}

/// Horizontal bar of `width` cells scaled against `max`.
pub fn bar(value: f64, max: f64, width: usize) -> String {
    if max <= 0.0 || value <= 0.0 {
        return String::new();
    }
    let cells = ((value / max) * width as f64).round() as usize;
    "█".repeat(cells.clamp(1, width))
}
