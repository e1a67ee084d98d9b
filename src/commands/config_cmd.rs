use clap::{Args, Subcommand};
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use super::{print_json, OutputFormat};
use leanfit::config::Config;

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show current configuration values
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Initialize configuration file
    Init,
}

const DEFAULT_CONFIG: &str = r#"# leanfit configuration

# Directory for per-user documents and backups
# (default: ~/.local/share/leanfit)
# data_dir: ~/.local/share/leanfit

# Single-user document to seed new users from (optional)
# legacy_path: /path/to/fitness_data.json

# User the CLI acts as
user: default

# Minutes east of UTC used for "today" (default: local time)
# timezone_offset_minutes: -360

server:
  port: 8080
  # fixed, cookie or api_key
  identity: cookie
  cookie_name: leanfit_uid
  fixed_user: default

# Keys accepted when server.identity is api_key
# api_keys:
#   - key: "your-secret-key-here"
#     user_id: "user1"
"#;

impl ConfigCommand {
    pub fn run(
        &self,
        config: &Config,
        cli_config_path: Option<PathBuf>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ConfigSubcommand::Show { format } => {
                match format {
                    OutputFormat::Json => print_json(config)?,
                    OutputFormat::Text => {
                        println!("Configuration");
                        println!("=============\n");

                        if let Some(path) = &config.config_file {
                            println!("Config file: {}", path.display());
                        } else {
                            println!(
                                "Config file: {} (not found)",
                                cli_config_path
                                    .unwrap_or_else(Config::default_config_path)
                                    .display()
                            );
                        }
                        println!();

                        println!("data_dir: {}", config.data_dir.value.display());
                        println!("  source: {}", config.data_dir.source);
                        println!();

                        match &config.legacy_path.value {
                            Some(path) => println!("legacy_path: {}", path.display()),
                            None => println!("legacy_path: (none)"),
                        }
                        println!("  source: {}", config.legacy_path.source);
                        println!();

                        println!("user: {}", config.user.value);
                        println!("  source: {}", config.user.source);
                        println!();

                        println!("server.port: {}", config.server.port.value);
                        println!("  source: {}", config.server.port.source);
                        println!("server.identity: {}", config.server.identity.value);
                        println!("  source: {}", config.server.identity.source);
                        println!("api_keys: {} configured", config.api_keys.len());
                    }
                }
                Ok(())
            }

            ConfigSubcommand::Init => {
                let config_path = cli_config_path.unwrap_or_else(Config::default_config_path);

                // Check if config already exists
                if config_path.exists() {
                    println!("Config file already exists: {}", config_path.display());
                    println!("Use 'leanfit config show' to view current configuration.");
                    return Ok(());
                }

                if let Some(parent) = config_path.parent() {
                    fs::create_dir_all(parent)?;
                }

                let mut file = fs::File::create(&config_path)?;
                file.write_all(DEFAULT_CONFIG.as_bytes())?;

                println!("Created config file: {}", config_path.display());
                println!("\nEdit this file to customize your settings.");
                Ok(())
            }
        }
    }
}
