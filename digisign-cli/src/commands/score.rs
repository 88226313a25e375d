//! Score command implementation.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use digisign_core::{base_score, edge_density, is_verified, PlaceholderScorer};
use tracing::info;

use crate::input::load_image;

/// Execute the score command.
pub fn execute(file: &Path, trials: u32, no_jitter: bool) -> Result<()> {
    let image = load_image(file)?;

    let scorer = if no_jitter {
        PlaceholderScorer::with_jitter(0.0)
    } else {
        PlaceholderScorer::new()
    };

    let density = edge_density(&image);
    let base = base_score(density);
    info!(edge_density = density, base_score = base, trials, "Scoring image");

    println!("   {} {:.4}", "Edge density:".dimmed(), density);
    println!("   {} {:.4}", "Base score:".dimmed(), base);
    println!("   {} ±{:.2}", "Jitter:".dimmed(), scorer.jitter());
    println!();

    let mut rng = rand::thread_rng();
    let mut passed = 0u32;
    for trial in 1..=trials {
        let score = scorer.score_with_rng(&image, &mut rng);
        let verdict = if is_verified(score) {
            passed += 1;
            "VERIFIED".green().bold()
        } else {
            "REJECTED".red().bold()
        };
        println!("   #{:<4} {:.4}  {}", trial, score, verdict);
    }

    if trials > 1 {
        println!();
        println!(
            "   {} {}/{}",
            "Verified:".dimmed(),
            passed,
            trials
        );
    }
    Ok(())
}
