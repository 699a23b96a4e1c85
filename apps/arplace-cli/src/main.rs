use anyhow::Context;
use arplace_common::Ray;
use arplace_input::Action;
use arplace_render::{DebugTextRenderer, FrameComposer, Renderer};
use arplace_session::{
    ActionOutcome, CaptureError, CaptureTarget, CapturedFrame, NoCapture, PlacementSession,
    SessionConfig,
};
use arplace_tracking::{ScriptedFrame, ScriptedOracle, TrackingOracle};
use clap::{Parser, Subcommand};
use glam::Vec3;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "arplace-cli", about = "Drive placement sessions from the command line")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Session config file (JSON); defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and supported formats
    Info,
    /// Print the effective session config as JSON
    Config,
    /// Place objects on the virtual ground of a simulation session
    Simulate {
        /// OBJ or FBX files to upload; placements cycle through them
        #[arg(short, long)]
        models: Vec<PathBuf>,
        /// Number of objects to place
        #[arg(short, long, default_value = "3")]
        placements: usize,
        /// Write the final frame to this file
        #[arg(long)]
        capture: Option<PathBuf>,
    },
    /// Run a scripted tracking session
    Track {
        /// Frames without a detected surface before the floor appears
        #[arg(short, long, default_value = "3")]
        empty_frames: usize,
        /// Number of objects to place once the floor is found
        #[arg(short, long, default_value = "2")]
        placements: usize,
    },
}

/// Writes the debug rendering of the latest frame to a file.
struct TextFileCapture {
    path: PathBuf,
    frame: String,
}

impl CaptureTarget for TextFileCapture {
    fn snapshot(&mut self) -> Result<CapturedFrame, CaptureError> {
        std::fs::write(&self.path, &self.frame)
            .map_err(|e| CaptureError::Failed(format!("{}: {e}", self.path.display())))?;
        Ok(CapturedFrame {
            media_type: "text/plain".into(),
            data: self.frame.clone().into_bytes(),
        })
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = match &cli.config {
        Some(path) => SessionConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SessionConfig::default(),
    };

    match cli.command {
        Commands::Info => {
            println!("arplace-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("formats: obj, fbx (binary), built-in cube");
            println!(
                "normalize: target size {}, fbx pre-scale {}",
                config.normalize.target_size, config.normalize.fbx_prescale
            );
            println!(
                "tracking: scripted oracle (supported={})",
                ScriptedOracle::new().is_tracking_supported()
            );
        }
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Commands::Simulate {
            models,
            placements,
            capture,
        } => simulate(config, &models, placements, capture)?,
        Commands::Track {
            empty_frames,
            placements,
        } => track(config, empty_frames, placements),
    }

    Ok(())
}

fn simulate(
    config: SessionConfig,
    models: &[PathBuf],
    placements: usize,
    capture: Option<PathBuf>,
) -> anyhow::Result<()> {
    tracing::info!(models = models.len(), placements, "simulation run");
    let mut composer = FrameComposer::new(config.normalize.clone());
    let mut session = PlacementSession::new(ScriptedOracle::unsupported(), config);
    let mode = session.enter_session();
    println!("Entered {mode} ({})", session.status());

    for path in models {
        let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let reference = session.upload_asset(bytes, &file_name(path));
        println!(
            "Uploaded {} as {} ({})",
            path.display(),
            reference.display_name(),
            reference.kind()
        );
    }

    let known: Vec<_> = session.library().known().collect();
    for i in 0..placements {
        let asset = known[i % known.len()].clone();
        let x = (i as f32 - (placements as f32 - 1.0) / 2.0) * 0.6;
        let ray = Ray::new(Vec3::new(0.0, 1.6, 1.0), Vec3::new(x, -1.6, -2.0));
        let outcomes = session.handle_frame(
            &ScriptedFrame::empty(),
            [Action::Select(asset), Action::place_along(ray)],
            &mut NoCapture,
        );
        report(&outcomes);
    }

    let frame = DebugTextRenderer::new().render(&composer.compose(&session));
    print!("{frame}");

    if let Some(path) = capture {
        let mut target = TextFileCapture { path, frame };
        match session.capture(&mut target) {
            Ok(captured) => println!("Captured {} bytes ({})", captured.data.len(), session.status()),
            Err(error) => println!("{}: {error}", session.status()),
        }
    }

    println!("Events: {}", session.events().len());
    Ok(())
}

fn track(config: SessionConfig, empty_frames: usize, placements: usize) {
    tracing::info!(empty_frames, placements, "scripted tracking run");
    let mut composer = FrameComposer::new(config.normalize.clone());
    let mut session = PlacementSession::new(ScriptedOracle::new(), config);
    let mode = session.enter_session();
    println!("Entered {mode} ({})", session.status());

    for frame_index in 0..empty_frames + placements {
        let frame = if frame_index < empty_frames {
            ScriptedFrame::empty()
        } else {
            let step = (frame_index - empty_frames) as f32;
            ScriptedFrame::hit(Vec3::new(0.3 * step, 0.0, -0.8))
        };
        let outcomes = session.handle_frame(&frame, [Action::place()], &mut NoCapture);
        print!("frame {}: {} -> ", frame_index + 1, session.status());
        report(&outcomes);
    }

    let frame = DebugTextRenderer::new().render(&composer.compose(&session));
    print!("{frame}");

    session.exit_session();
    println!("Exited to {} with {} entities", session.mode(), session.entities().len());
}

fn report(outcomes: &[ActionOutcome]) {
    for outcome in outcomes {
        match outcome {
            ActionOutcome::Placed(entity) => {
                let p = entity.position();
                println!(
                    "placed {} [{}] at ({:.2}, {:.2}, {:.2})",
                    entity.asset().display_name(),
                    entity.id().short(),
                    p.x,
                    p.y,
                    p.z
                );
            }
            ActionOutcome::Rejected(error) => println!("rejected: {error}"),
            _ => {}
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
