use clap::{Args, Subcommand};
use std::fs;
use std::path::PathBuf;

use super::Context;

#[derive(Args)]
pub struct DataCommand {
    #[command(subcommand)]
    pub command: DataSubcommand,
}

#[derive(Subcommand)]
pub enum DataSubcommand {
    /// Export the full journal as JSON
    Export {
        /// Write to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Back up and then erase all data
    Clear {
        /// Skip confirmation
        #[arg(long)]
        yes: bool,
    },
}

impl DataCommand {
    pub async fn run(&self, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
        let now = ctx.clock.now();

        match &self.command {
            DataSubcommand::Export { output } => {
                let export = ctx.journal.export(&ctx.user, now).await?;
                let json = serde_json::to_string_pretty(&export)?;
                match output {
                    Some(path) => {
                        fs::write(path, json)?;
                        println!("Exported to {}", path.display());
                    }
                    None => println!("{}", json),
                }
                Ok(())
            }

            DataSubcommand::Clear { yes } => {
                if !yes {
                    println!(
                        "This erases all meals, weigh-ins, workouts and goals for '{}'.",
                        ctx.user
                    );
                    println!("A backup is written first. Re-run with --yes to confirm.");
                    return Ok(());
                }
                let backup = ctx.journal.clear_all(&ctx.user, now).await?;
                println!("Cleared. Backup written to {}", backup.display());
                Ok(())
            }
        }
    }
}
