// mod.rs — Subcommand implementations.

pub mod cleanup;
pub mod forge;
pub mod mirror;
pub mod platform;
pub mod shadow;

use std::io::{self, BufRead, Write};

/// Ask a yes/no question on stdout; anything but y/yes declines.
pub(crate) fn confirm(prompt: &str) -> anyhow::Result<bool> {
    print!("{prompt} [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    let answer = answer.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}
