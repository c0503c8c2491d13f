use std::{
    io,
    path::PathBuf,
    process::ExitCode,
    time::Duration,
};

use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use colored::Colorize;
use framesight::{
    AnalysisOptions, AnalysisResult, FfmpegLogLevel, FramesightError, FrameOutputOptions,
    InferenceClient, OutputFormat, VideoAnalyzer, report,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

const DEFAULT_VIDEO: &str = "videos/sample.mp4";

const CLI_AFTER_HELP: &str = "Examples:\n  framesight videos/sample.mp4\n  framesight clip.mkv --model gemini-2.5-pro --temperature 0\n  framesight clip.mp4 --json --save-frame frame.jpg\n  framesight --completions zsh > _framesight\n\nThe API key is read from GOOGLE_API_KEY (or a .env file); if it is unset you are prompted for it.";

#[derive(Debug, Parser)]
#[command(
    name = "framesight",
    version,
    about = "Describe a video from its first frame using a multimodal model",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    /// Input video path.
    #[arg(default_value = DEFAULT_VIDEO)]
    video: PathBuf,

    /// Model identifier.
    #[arg(long, default_value = framesight::config::DEFAULT_MODEL)]
    model: String,

    /// Sampling temperature (0.0 - 2.0).
    #[arg(long, default_value_t = framesight::config::DEFAULT_TEMPERATURE)]
    temperature: f32,

    /// Base URL of the OpenAI-compatible API.
    #[arg(long, default_value = framesight::config::DEFAULT_BASE_URL)]
    base_url: String,

    /// Downscale the frame so its longest edge is at most this many pixels.
    #[arg(long)]
    max_dimension: Option<u32>,

    /// Also write the extracted JPEG to this path.
    #[arg(long)]
    save_frame: Option<PathBuf>,

    /// Print the analysis as JSON.
    #[arg(long)]
    json: bool,

    /// Show a spinner while waiting for the model.
    #[arg(long)]
    progress: bool,

    /// Show additional logging output.
    #[arg(long)]
    verbose: bool,

    /// FFmpeg log level (quiet, fatal, error, warning, info, debug).
    #[arg(long, default_value = "error")]
    ffmpeg_log_level: FfmpegLogLevel,

    /// Print a shell completion script and exit.
    #[arg(long, value_enum, value_name = "SHELL")]
    completions: Option<Shell>,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .without_time()
        .init();
}

fn spinner(enabled: bool) -> Option<ProgressBar> {
    if !enabled {
        return None;
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg} ({elapsed})") {
        bar.set_style(style);
    }
    bar.set_message("Waiting for model");
    bar.enable_steady_tick(Duration::from_millis(100));
    Some(bar)
}

fn output_format(json: bool) -> OutputFormat {
    if json {
        OutputFormat::Json
    } else {
        OutputFormat::StyledText
    }
}

fn analyze(cli: &Cli) -> Result<AnalysisResult, FramesightError> {
    let credential = framesight::resolve_credential()?;

    let options = AnalysisOptions::new()
        .with_model(&cli.model)
        .with_temperature(cli.temperature)
        .with_base_url(&cli.base_url);

    let mut frame_options = FrameOutputOptions::new();
    if let Some(max_dimension) = cli.max_dimension {
        frame_options = frame_options.with_max_dimension(max_dimension);
    }

    let client = InferenceClient::new(credential, options)?;
    let analyzer = VideoAnalyzer::new(client).with_frame_options(frame_options);

    let frame = analyzer.extract(&cli.video)?;
    if cli.verbose {
        eprintln!(
            "{} {}x{} frame from {} ({} bytes)",
            "extracted".green().bold(),
            frame.width,
            frame.height,
            cli.video.display(),
            frame.jpeg.len()
        );
    }

    if let Some(path) = &cli.save_frame {
        match std::fs::write(path, &frame.jpeg) {
            Ok(()) => eprintln!("{} {}", "saved".green().bold(), path.display()),
            Err(error) => eprintln!(
                "{} {}",
                "warning:".yellow().bold(),
                format!("could not save frame to {}: {error}", path.display()).yellow()
            ),
        }
    }

    let progress = spinner(cli.progress);
    let result = analyzer.describe(&frame);
    if let Some(bar) = progress {
        bar.finish_and_clear();
    }
    result
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        let mut command = Cli::command();
        clap_complete::generate(shell, &mut command, "framesight", &mut io::stdout());
        return ExitCode::SUCCESS;
    }

    init_logging(cli.verbose);
    framesight::set_ffmpeg_log_level(cli.ffmpeg_log_level);

    match analyze(&cli) {
        Ok(result) => match report::write_analysis(
            &mut io::stdout().lock(),
            &result,
            output_format(cli.json),
        ) {
            Ok(()) => ExitCode::SUCCESS,
            Err(error) => {
                eprintln!("error: {error}");
                ExitCode::FAILURE
            }
        },
        Err(error) => {
            let mut stdout = io::stdout().lock();
            if report::write_failure(&mut stdout, &error).is_err() {
                eprintln!("{}: {error}", error.stage_label());
            }
            ExitCode::FAILURE
        }
    }
}
