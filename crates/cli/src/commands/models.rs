//! `stackwright models` - List model aliases.

use stackwright_config::models::{self, MODELS};

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("Models");
    println!("======");
    for line in models::choices() {
        println!("  {line}");
    }
    println!();
    println!("  Every alias accepted by --model:");
    for model in MODELS {
        println!("    {}: {}", model.id, model.aliases.join(", "));
    }
    Ok(())
}
