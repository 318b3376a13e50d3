mod cli;

use std::io::{self, IsTerminal};

use clap::Parser;
use cli::{Args, Command};
use termcam::background::BackgroundStore;
use termcam::camera::{CaptureSettings, FfmpegSource, FrameSource, StreamSource};
use termcam::config::{Config, RenderConfig, SourceKind};
use termcam::event_loop::{BackgroundRecorder, CancelToken, Session, SessionStats};
use termcam::pipeline::Pipeline;
use termcam::terminal::{ColorProfile, ScreenGuard, TerminalSink};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    if let Some(Command::Config { action }) = args.command {
        if let Err(e) = cli::handle_config_action(action, args.config.as_deref()) {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
        return;
    }

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), String> {
    let file = Config::load(args.config.as_deref()).map_err(|e| e.to_string())?;

    let terminal_size = if io::stdout().is_terminal() {
        crossterm::terminal::size().ok()
    } else {
        None
    };
    let config = RenderConfig::resolve(&file, &args.overrides(), terminal_size, ColorProfile::detect)
        .map_err(|e| e.to_string())?;
    log::debug!("resolved config: {:?}", config);

    let store = BackgroundStore::new(&config.background.directory);
    let pipeline = Pipeline::from_config(&config, &store).map_err(|e| e.to_string())?;

    let cancel = CancelToken::new();
    if let Err(e) = cancel.install_ctrlc_handler() {
        log::warn!("could not set up Ctrl+C handler: {}", e);
    }

    let recorder = config
        .capture_background
        .then(|| BackgroundRecorder::new(store, config.background.capture_count));

    let stats = match config.source {
        SourceKind::Ffmpeg => {
            let source = FfmpegSource::spawn(&config.capture).map_err(|e| e.to_string())?;
            run_session(source, &pipeline, &config, cancel, recorder)?
        }
        SourceKind::Stdin => {
            let source = StreamSource::stdin(config.capture.resolution, config.capture.timeout);
            run_session(source, &pipeline, &config, cancel, recorder)?
        }
        SourceKind::Native => {
            let source = open_native(&config.capture)?;
            run_session(source, &pipeline, &config, cancel, recorder)?
        }
    };

    log::info!(
        "rendered {} frames ({} dropped, {} timeouts)",
        stats.frames_rendered,
        stats.frames_dropped,
        stats.timeouts
    );
    if config.capture_background {
        eprintln!(
            "Saved {} background samples to {}",
            stats.samples_saved,
            config.background.directory.display()
        );
    }
    Ok(())
}

#[cfg(feature = "camera")]
fn open_native(settings: &CaptureSettings) -> Result<termcam::camera::NativeCamera, String> {
    termcam::camera::NativeCamera::open(settings).map_err(|e| e.to_string())
}

#[cfg(not(feature = "camera"))]
fn open_native(_settings: &CaptureSettings) -> Result<FfmpegSource, String> {
    Err("native capture is not available; rebuild with `--features camera` or use --source ffmpeg".to_string())
}

fn run_session<S: FrameSource>(
    source: S,
    pipeline: &Pipeline,
    config: &RenderConfig,
    cancel: CancelToken,
    recorder: Option<BackgroundRecorder>,
) -> Result<SessionStats, String> {
    let mut guard = ScreenGuard::enter(io::stdout()).map_err(|e| format!("terminal setup failed: {}", e))?;

    let result = {
        let mut session = Session::new(source, TerminalSink::new(guard.writer()), pipeline, cancel);
        if let Some(recorder) = recorder {
            session = session.with_recorder(recorder);
        }
        if config.show_fps {
            session = session.with_fps();
        }
        session.run()
    };

    // Restore the screen before any error reaches stderr
    if let Err(e) = guard.exit() {
        log::warn!("failed to restore terminal: {}", e);
    }
    result.map_err(|e| e.to_string())
}
