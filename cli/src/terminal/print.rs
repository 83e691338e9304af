//! Terminal output helpers.
//!
//! Everything goes through [`print`], which hands the line to tracing so that
//! output and the progress spinner never overwrite each other.

use crate::terminal::colors;
use crate::terminal::format::Detail;
use crate::terminal::logging::PRINT_TARGET;
use colored::*;
use tracing::info;
use unicode_width::UnicodeWidthStr;

pub const TOTAL_WIDTH: usize = 64;

/// Width keys are padded to in aligned lines and trees.
const KEY_WIDTH: usize = 10;

#[macro_export]
macro_rules! mprint {
    () => {
        $crate::print::print("");
    };
    ($msg:expr) => {
        $crate::print::print($msg);
    };
}

pub fn print(msg: &str) {
    info!(target: PRINT_TARGET, raw_msg = msg);
}

/// Centers `title` inside a rule of `fill` characters.
fn rule(title: ColoredString, fill: &str) -> String {
    let width = UnicodeWidthStr::width(console::strip_ansi_codes(&title.to_string()).as_ref());
    let left = TOTAL_WIDTH.saturating_sub(width) / 2;
    let right = TOTAL_WIDTH.saturating_sub(width + left);
    format!(
        "{}{}{}",
        fill.repeat(left).color(colors::SEPARATOR),
        title,
        fill.repeat(right).color(colors::SEPARATOR)
    )
}

pub fn banner(q_level: u8) {
    if q_level > 0 {
        return;
    }
    let title = format!("⟦ AIRMAP v{} ⟧", env!("CARGO_PKG_VERSION"));
    print(&rule(title.bright_green().bold(), "═"));
}

pub fn header(msg: &str, q_level: u8) {
    if q_level > 0 {
        return;
    }
    let title = format!("⟦ {} ⟧", msg.to_uppercase());
    print(&rule(title.color(colors::PRIMARY), "─"));
}

pub fn fat_separator() {
    print(&"═".repeat(TOTAL_WIDTH).color(colors::SEPARATOR).to_string());
}

fn padded_key(key: &str) -> String {
    let dots = ".".repeat(KEY_WIDTH.saturating_sub(key.len()));
    format!("{key}{}", format!("{dots}:").color(colors::SEPARATOR))
}

pub fn aligned_line(key: &str, value: ColoredString) {
    print_status(format!("{} {value}", padded_key(key)));
}

pub fn print_status<T: AsRef<str>>(msg: T) {
    print(&format!("{} {}", ">".color(colors::SEPARATOR), msg.as_ref()));
}

pub fn tree_head(idx: usize, name: &str) {
    let index = format!("{:>2}", idx + 1).color(colors::ACCENT);
    print(&format!("{index} {}", name.color(colors::PRIMARY).bold()));
}

pub fn as_tree_one_level(details: Vec<Detail>) {
    let count = details.len();
    for (i, (key, value)) in details.into_iter().enumerate() {
        let branch = if i + 1 == count { "└─" } else { "├─" };
        print(&format!(
            "   {} {} {value}",
            branch.color(colors::SEPARATOR),
            padded_key(&key)
        ));
    }
}

pub fn centerln(msg: &str) {
    let pad = " ".repeat(TOTAL_WIDTH.saturating_sub(console::measure_text_width(msg)) / 2);
    print(&format!("{pad}{msg}"));
}

pub fn no_results() {
    print(&rule(" nothing captured ".red().bold(), " "));
}
