//! Persistent garden memory.
//!
//! The whole record is a single JSON object on disk. Every read loads the
//! file and every write rewrites it in full; there is no locking.

pub mod store;

pub use store::{GardenMemory, MemoryRecord};

use crate::config::Config;
use anyhow::Result;

/// Handle `greenthumb memory <subcommand>` CLI commands.
pub fn handle_memory_command(command: crate::MemoryCommands, config: &Config) -> Result<()> {
    let mem = GardenMemory::new(&config.data.memory_path);
    match command {
        crate::MemoryCommands::Show => {
            println!("{}", mem.summary()?);
        }
        crate::MemoryCommands::Get { key } => match mem.get(&key)? {
            Some(value) => println!("{}", serde_json::to_string_pretty(&value)?),
            None => println!("No value stored for '{key}'."),
        },
        crate::MemoryCommands::Set { key, value } => {
            // Accept JSON literals ("[\"rose\",\"basil\"]", 7) and fall back to plain text.
            let value = serde_json::from_str(&value)
                .unwrap_or_else(|_| serde_json::Value::String(value.clone()));
            println!("{}", mem.save(&key, value)?);
        }
        crate::MemoryCommands::Clear { yes } => {
            if !yes {
                eprintln!(
                    "Use --yes to confirm clearing {}.",
                    config.data.memory_path.display()
                );
                return Ok(());
            }
            mem.clear()?;
            println!("✓ Cleared garden memory.");
        }
    }
    Ok(())
}
