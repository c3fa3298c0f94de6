//! calframe: CLI for the crop-frame transform engine.
//!
//! Inspects source images, prints the constraints and render plan of a
//! placement, estimates print quality, renders compositions to SVG or
//! raster, and manages drafts and order snapshots on disk.
//!
//! # Usage
//!
//! ```text
//! calframe inspect photo.jpg
//! calframe plan --image photo.jpg --crop 100x150 --relative-scale 1.5 --container 300x450
//! calframe quality --source 4000x3000 --crop 100x150 --relative-scale 2
//! calframe render --image photo.jpg --crop 100x100 --target thumbnail --container 400x400 -o out.png
//! calframe place --store drafts --draft d1 --template wall.json --slot jan --image photo.jpg
//! calframe snapshot --store drafts --draft d1
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod args;
mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::filter::LevelFilter;

use crate::args::{EditorArgs, Extent, PlacementArgs, Target, TransformArgs};

/// Pan, zoom, and rotate photos inside fixed crop frames.
#[derive(Parser)]
#[command(name = "calframe", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// More log output (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(flatten)]
    editor: EditorArgs,
}

#[derive(Subcommand)]
enum Command {
    /// Print identifier, dimensions, and native print resolution of images.
    Inspect {
        /// Image files (PNG, JPEG, BMP, WebP).
        #[arg(required = true)]
        images: Vec<PathBuf>,

        /// Output as JSON instead of a human-readable report.
        #[arg(long)]
        json: bool,
    },

    /// Print placement constraints and the render plan for a container.
    Plan {
        #[command(flatten)]
        placement: PlacementArgs,

        /// Surface to plan for.
        #[arg(long, value_enum, default_value_t = Target::Editor)]
        target: Target,

        /// Container size in pixels as WxH.
        #[arg(long)]
        container: Extent,

        /// Output as JSON instead of a human-readable report.
        #[arg(long)]
        json: bool,
    },

    /// Estimate print quality of a placement.
    Quality {
        #[command(flatten)]
        placement: PlacementArgs,

        /// Output as JSON instead of a human-readable report.
        #[arg(long)]
        json: bool,
    },

    /// Render a placement to SVG (`.svg` output) or a raster image.
    Render {
        #[command(flatten)]
        placement: PlacementArgs,

        /// Surface to render.
        #[arg(long, value_enum, default_value_t = Target::Thumbnail)]
        target: Target,

        /// Output size in pixels as WxH.
        #[arg(long)]
        container: Extent,

        /// Output path; the extension selects the format.
        #[arg(short, long)]
        output: PathBuf,

        /// Frame background as #rrggbb or #rrggbbaa.
        #[arg(long)]
        background: Option<String>,

        /// SVG document title.
        #[arg(long)]
        title: Option<String>,
    },

    /// Place an image in a slot of a stored draft.
    Place {
        /// Draft store directory.
        #[arg(long)]
        store: PathBuf,

        /// Draft identifier.
        #[arg(long)]
        draft: String,

        /// Template JSON, required when the draft does not exist yet.
        #[arg(long)]
        template: Option<PathBuf>,

        /// Slot to fill; its frame comes from the template.
        #[arg(long)]
        slot: String,

        /// Image file to place.
        #[arg(long)]
        image: PathBuf,

        #[command(flatten)]
        transform: TransformArgs,
    },

    /// Write the order snapshot of a stored draft.
    Snapshot {
        /// Draft store directory.
        #[arg(long)]
        store: PathBuf,

        /// Draft identifier.
        #[arg(long)]
        draft: String,

        /// Output file (stdout if omitted).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

const fn log_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::ERROR;
    }
    match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Log to stderr; `log` records from the library crates are bridged in.
fn init_logging(verbose: u8, quiet: bool) {
    tracing_subscriber::fmt()
        .with_max_level(log_level(verbose, quiet))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<(), String> {
    let config = cli.editor.config()?;
    log::debug!("editor config: {config:?}");

    match &cli.command {
        Command::Inspect { images, json } => commands::inspect(images, *json, &config),
        Command::Plan {
            placement,
            target,
            container,
            json,
        } => commands::plan(placement, *target, *container, *json, &config),
        Command::Quality { placement, json } => commands::quality(placement, *json, &config),
        Command::Render {
            placement,
            target,
            container,
            output,
            background,
            title,
        } => commands::render(
            placement,
            &commands::RenderOptions {
                target: *target,
                container: *container,
                output,
                background: background.as_deref(),
                title: title.as_deref(),
            },
            &config,
        ),
        Command::Place {
            store,
            draft,
            template,
            slot,
            image,
            transform,
        } => commands::place(
            store,
            draft,
            template.as_deref(),
            slot,
            image,
            transform,
            &config,
        ),
        Command::Snapshot {
            store,
            draft,
            output,
        } => commands::snapshot(store, draft, output.as_deref()),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("{msg}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn verbosity_levels() {
        assert_eq!(log_level(0, false), LevelFilter::WARN);
        assert_eq!(log_level(2, false), LevelFilter::DEBUG);
        assert_eq!(log_level(9, false), LevelFilter::TRACE);
        assert_eq!(log_level(3, true), LevelFilter::ERROR);
    }

    #[test]
    fn plan_arguments_parse() {
        let cli = Cli::try_parse_from([
            "calframe",
            "plan",
            "--source",
            "4000x3000",
            "--crop",
            "100x150",
            "--offset-x",
            "-12.5",
            "--target",
            "thumbnail",
            "--container",
            "300x450",
            "--json",
        ])
        .unwrap_or_else(|e| panic!("{e}"));
        let Command::Plan {
            placement,
            target,
            json,
            ..
        } = cli.command
        else {
            panic!("expected plan");
        };
        assert_eq!(target, Target::Thumbnail);
        assert!(json);
        assert!((placement.transform.offset_x + 12.5).abs() < f64::EPSILON);
    }

    #[test]
    fn place_takes_frame_from_slot() {
        let cli = Cli::try_parse_from([
            "calframe",
            "place",
            "--store",
            "drafts",
            "--draft",
            "d1",
            "--slot",
            "jan",
            "--image",
            "photo.png",
            "--relative-scale",
            "1.5",
        ])
        .unwrap_or_else(|e| panic!("{e}"));
        let Command::Place { slot, transform, .. } = cli.command else {
            panic!("expected place");
        };
        assert_eq!(slot, "jan");
        assert!((transform.relative_scale - 1.5).abs() < f64::EPSILON);

        let with_crop = Cli::try_parse_from([
            "calframe",
            "place",
            "--store",
            "drafts",
            "--draft",
            "d1",
            "--slot",
            "jan",
            "--image",
            "photo.png",
            "--crop",
            "1x1",
        ]);
        assert!(with_crop.is_err());
    }

    #[test]
    fn image_and_source_conflict() {
        let result = Cli::try_parse_from([
            "calframe",
            "quality",
            "--image",
            "a.png",
            "--source",
            "10x10",
            "--crop",
            "1x1",
        ]);
        assert!(result.is_err());
    }
}
