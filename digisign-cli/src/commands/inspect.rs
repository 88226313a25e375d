//! Inspect command implementation.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use digisign_core::edge_density;
use tracing::info;

use crate::input::load_image;

/// Execute the inspect command.
pub fn execute(file: &Path) -> Result<()> {
    let image = load_image(file)?;
    let density = edge_density(&image);

    info!(
        width = image.width(),
        height = image.height(),
        edge_density = density,
        "Inspected image"
    );

    println!("{}", file.display().to_string().bold());
    println!(
        "   {} {}x{}",
        "Dimensions:".dimmed(),
        image.width(),
        image.height()
    );
    println!("   {} {}", "Pixels:".dimmed(), image.pixel_count());
    println!("   {} {:.4}", "Edge density:".dimmed(), density);
    Ok(())
}
