//! Command-line and shell grammar.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use fitcheck_core::garment::Category;
use fitcheck_core::outfit::OutfitSlot;
use fitcheck_core::pose::Pose;

#[derive(Parser)]
#[command(name = "fitcheck")]
#[command(about = "FitCheck - compose outfits onto a model photo", long_about = None)]
pub struct Cli {
    /// Keep config and data under this directory instead of the platform dirs
    #[arg(long, global = true)]
    pub home: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    #[command(flatten)]
    Studio(StudioCommand),
    /// Keep one studio open and read commands interactively (adds `undo`)
    Shell,
}

/// One line typed into `fitcheck shell`.
#[derive(Parser)]
#[command(name = "fitcheck", no_binary_name = true, disable_version_flag = true)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: ShellCommand,
}

#[derive(Subcommand)]
pub enum ShellCommand {
    #[command(flatten)]
    Studio(StudioCommand),
    /// Go back to the previous result
    Undo,
    /// Leave the shell
    #[command(alias = "exit")]
    Quit,
}

/// Commands available both as one-shot invocations and inside the shell.
#[derive(Subcommand)]
pub enum StudioCommand {
    /// Print the category detected for garment names
    Classify {
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// List the available poses
    Poses,
    /// Inspect the wardrobe
    Wardrobe {
        #[command(subcommand)]
        action: WardrobeAction,
    },
    /// Show the current session
    Show,
    /// Start a session on a model image, or create the model from a photo
    Establish {
        /// Ready-made model image (URL or file)
        #[arg(required_unless_present = "photo", conflicts_with = "photo")]
        image: Option<String>,
        /// Photo of yourself to generate the model image from
        #[arg(long)]
        photo: Option<String>,
    },
    /// Generate the model again from the last uploaded photo
    Remodel,
    /// Put on a wardrobe garment, or upload one from a file
    TryOn {
        /// Wardrobe garment id
        #[arg(required_unless_present = "file", conflicts_with = "file")]
        garment_id: Option<String>,
        /// Image file of a garment that is not in the wardrobe
        #[arg(long, requires = "name")]
        file: Option<PathBuf>,
        /// Display name of the uploaded garment
        #[arg(long)]
        name: Option<String>,
        /// Category of the uploaded garment; detected from the name when omitted
        #[arg(long)]
        category: Option<Category>,
    },
    /// Re-render the current outfit in another pose
    Pose { pose: Pose },
    /// Take off one garment: top, bottom, fullbody or accessory:<id>
    Remove {
        #[arg(value_parser = parse_slot)]
        slot: OutfitSlot,
    },
    /// Clear the session and everything stored for it
    StartOver,
    /// Hand a catalog product over to the studio, as the product page does
    Import {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        url: String,
        #[arg(long)]
        price: Option<f64>,
        #[arg(long)]
        category: Option<String>,
    },
    /// Write the displayed image to a file
    Export { path: PathBuf },
}

#[derive(Subcommand)]
pub enum WardrobeAction {
    /// List every garment
    List,
}

fn parse_slot(raw: &str) -> Result<OutfitSlot, String> {
    match raw.trim().to_lowercase().as_str() {
        "top" => Ok(OutfitSlot::Top),
        "bottom" => Ok(OutfitSlot::Bottom),
        "fullbody" | "full_body" => Ok(OutfitSlot::FullBody),
        other => match other.strip_prefix("accessory:") {
            Some(id) if !id.is_empty() => Ok(OutfitSlot::Accessory(id.to_string())),
            _ => Err(format!(
                "unknown slot '{raw}', expected top, bottom, fullbody or accessory:<id>"
            )),
        },
    }
}
