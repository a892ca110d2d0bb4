//! Command line arguments

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about = "Offline tools for decal designs")]
pub struct Args {
    /// Studio config file (JSON). Falls back to ATELIER_CONFIG, then defaults
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Product id to use instead of the configured one
    #[arg(long, global = true)]
    pub product: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Composite a saved design into a PNG
    Export {
        /// Design document (JSON)
        #[arg(long)]
        design: PathBuf,

        /// Output PNG path
        #[arg(long)]
        out: PathBuf,

        /// Produce the gallery thumbnail instead of the print file
        #[arg(long)]
        thumbnail: bool,

        /// Directory relative layer sources resolve against.
        /// Defaults to the design's directory
        #[arg(long)]
        images_root: Option<PathBuf>,
    },

    /// List the layers of a saved design
    Inspect {
        #[arg(long)]
        design: PathBuf,
    },

    /// Downscale an image the way uploads are before they become layers
    Optimize {
        #[arg(long)]
        input: PathBuf,

        #[arg(long)]
        out: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_export() {
        let args = Args::try_parse_from([
            "atelier",
            "export",
            "--design",
            "designs/hoodie.json",
            "--out",
            "print.png",
            "--thumbnail",
        ])
        .unwrap();

        match args.command {
            Command::Export {
                design,
                out,
                thumbnail,
                images_root,
            } => {
                assert_eq!(design, PathBuf::from("designs/hoodie.json"));
                assert_eq!(out, PathBuf::from("print.png"));
                assert!(thumbnail);
                assert!(images_root.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let args = Args::try_parse_from([
            "atelier",
            "inspect",
            "--design",
            "d.json",
            "--product",
            "tshirt-classic",
            "--config",
            "studio.json",
        ])
        .unwrap();

        assert_eq!(args.product.as_deref(), Some("tshirt-classic"));
        assert_eq!(args.config, Some(PathBuf::from("studio.json")));
        assert!(matches!(args.command, Command::Inspect { .. }));
    }

    #[test]
    fn test_missing_required_flag() {
        assert!(Args::try_parse_from(["atelier", "optimize", "--input", "a.png"]).is_err());
    }
}
