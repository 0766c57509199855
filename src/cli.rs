//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};

/// RoomDream - AI room redesign service
#[derive(Parser)]
#[command(name = "roomdream")]
#[command(version)]
#[command(about = "Redesign room photos with an AI image model", long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file (default: config.toml)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server (default when no command is given)
    Serve,

    /// Redesign a room photo through a running server
    Generate {
        /// Public URL of the room photo
        #[arg(long)]
        image: String,

        /// Design theme, e.g. "Modern"
        #[arg(long, default_value = "Modern")]
        theme: String,

        /// Room type, e.g. "Living Room"
        #[arg(long, default_value = "Living Room")]
        room: String,

        /// Extra requirements appended to the template prompt
        #[arg(long)]
        prompt: Option<String>,

        /// Use this prompt instead of the theme/room template
        #[arg(long)]
        custom_prompt: Option<String>,

        /// Guidance scale
        #[arg(long)]
        scale: Option<f64>,

        /// Server base URL
        #[arg(long, default_value = "http://127.0.0.1:8080")]
        server: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

/// Configuration management commands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output path (default: config.example.toml)
        output_path: Option<String>,

        /// Overwrite without asking
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["roomdream"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_generate_args() {
        let cli = Cli::try_parse_from([
            "roomdream",
            "generate",
            "--image",
            "https://upcdn.io/room.jpg",
            "--room",
            "Office",
            "--scale",
            "9",
            "-c",
            "dev.toml",
        ])
        .unwrap();
        assert_eq!(cli.config.as_deref(), Some("dev.toml"));
        match cli.command {
            Some(Commands::Generate {
                image,
                theme,
                room,
                scale,
                ..
            }) => {
                assert_eq!(image, "https://upcdn.io/room.jpg");
                assert_eq!(theme, "Modern");
                assert_eq!(room, "Office");
                assert_eq!(scale, Some(9.0));
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn test_generate_requires_image() {
        assert!(Cli::try_parse_from(["roomdream", "generate"]).is_err());
    }

    #[test]
    fn test_config_generate() {
        let cli = Cli::try_parse_from(["roomdream", "config", "generate", "out.toml", "--force"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Config {
                action: ConfigCommands::Generate { force: true, .. }
            })
        ));
    }
}
