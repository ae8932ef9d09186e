//! Facial gesture control application for assistive commands.

use anyhow::{Context, Result};
use clap::Parser;
use gesture_assist::{
    actions::build_handlers,
    app::{Announcements, GestureApp, HeadlessView},
    cli::Args,
    config::{Config, Credentials, EXAMPLE_CONFIG},
    dispatcher::CommandDispatcher,
    gesture_classifier::GestureClassifier,
    replay::{PrecomputedLandmarks, ReplaySource},
};
use log::info;

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    if args.print_config {
        print!("{EXAMPLE_CONFIG}");
        return Ok(());
    }

    // Initialize logger
    let default_level = if args.debug { "debug" } else { "info" };
    env_logger::init_from_env(env_logger::Env::new().default_filter_or(default_level));

    info!("Starting gesture control");

    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            Config::from_file(path).with_context(|| format!("Failed to load {}", path.display()))?
        }
        None => Config::default(),
    };
    args.apply_to(&mut config);
    config.validate().context("Invalid configuration")?;

    // Service initialization failures abort startup
    let handlers =
        build_handlers(&config, Credentials::from_env()).context("Failed to initialize action handlers")?;
    let classifier = GestureClassifier::new(config.gestures);
    let announcements = Announcements::from(&config.speech);

    if let Some(path) = &args.replay {
        let source = ReplaySource::open(path, config.video.realtime_replay)?;
        // Cooldowns follow the recorded timestamps, paced or not
        let dispatcher = CommandDispatcher::with_clock(
            config.dispatch.cooldown()?,
            config.dispatch.command_names.clone(),
            handlers,
            Box::new(source.clock()),
        );
        let model = PrecomputedLandmarks::new(config.model.landmark_count);
        let mut app = GestureApp::new(source, model, HeadlessView, classifier, dispatcher, announcements)?;
        app.run()?;
        return Ok(());
    }

    let dispatcher = CommandDispatcher::from_config(&config.dispatch, handlers)?;
    run_camera(&config, classifier, dispatcher, announcements)
}

#[cfg(feature = "camera")]
fn run_camera(
    config: &Config,
    classifier: GestureClassifier,
    dispatcher: CommandDispatcher,
    announcements: Announcements,
) -> Result<()> {
    use gesture_assist::camera::{CameraSource, FaceMeshModel, PreviewWindow};

    let source = CameraSource::open(&config.video).context("Could not open video source")?;
    let model = FaceMeshModel::new(
        &config.model.face_mesh,
        config.model.landmark_count,
        config.model.min_face_presence,
    )
    .context("Failed to load face-mesh model")?;

    info!("Gesture control active - press 'q' to quit");

    if config.video.display {
        let view = PreviewWindow::new("Gesture Assist")?;
        GestureApp::new(source, model, view, classifier, dispatcher, announcements)?.run()?;
    } else {
        GestureApp::new(source, model, HeadlessView, classifier, dispatcher, announcements)?.run()?;
    }

    Ok(())
}

#[cfg(not(feature = "camera"))]
fn run_camera(
    _config: &Config,
    _classifier: GestureClassifier,
    _dispatcher: CommandDispatcher,
    _announcements: Announcements,
) -> Result<()> {
    anyhow::bail!("Built without the `camera` feature; rebuild with --features camera or pass --replay <file>")
}
