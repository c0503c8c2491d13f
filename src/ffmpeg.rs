//! FFmpeg log level control.
//!
//! FFmpeg writes its own diagnostics to stderr independently of the `log`
//! crate. The CLI quiets it to [`FfmpegLogLevel::Error`] by default so decoder
//! chatter does not interleave with the analysis report.

use std::str::FromStr;

use ffmpeg_next::util::log::Level;

use crate::error::UnknownLogLevel;

/// FFmpeg internal log verbosity, from silent to most verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FfmpegLogLevel {
    /// No output.
    Quiet,
    /// Unrecoverable errors only.
    Fatal,
    /// Recoverable errors.
    #[default]
    Error,
    /// Warnings (FFmpeg's own default).
    Warning,
    /// Informational messages.
    Info,
    /// Debugging output.
    Debug,
}

impl FfmpegLogLevel {
    fn to_ffmpeg_level(self) -> Level {
        match self {
            FfmpegLogLevel::Quiet => Level::Quiet,
            FfmpegLogLevel::Fatal => Level::Fatal,
            FfmpegLogLevel::Error => Level::Error,
            FfmpegLogLevel::Warning => Level::Warning,
            FfmpegLogLevel::Info => Level::Info,
            FfmpegLogLevel::Debug => Level::Debug,
        }
    }
}

impl FromStr for FfmpegLogLevel {
    type Err = UnknownLogLevel;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "quiet" | "off" => Ok(FfmpegLogLevel::Quiet),
            "fatal" => Ok(FfmpegLogLevel::Fatal),
            "error" => Ok(FfmpegLogLevel::Error),
            "warning" | "warn" => Ok(FfmpegLogLevel::Warning),
            "info" => Ok(FfmpegLogLevel::Info),
            "debug" => Ok(FfmpegLogLevel::Debug),
            _ => Err(UnknownLogLevel(value.to_string())),
        }
    }
}

/// Set FFmpeg's internal log level. Does not affect `log` crate output.
pub fn set_ffmpeg_log_level(level: FfmpegLogLevel) {
    ffmpeg_next::util::log::set_level(level.to_ffmpeg_level());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_aliases() {
        assert_eq!("WARN".parse(), Ok(FfmpegLogLevel::Warning));
        assert_eq!("off".parse(), Ok(FfmpegLogLevel::Quiet));
        assert_eq!(" debug ".parse(), Ok(FfmpegLogLevel::Debug));
        assert_eq!(
            "trace".parse::<FfmpegLogLevel>(),
            Err(UnknownLogLevel("trace".to_string()))
        );
    }

    #[test]
    fn default_is_error() {
        assert_eq!(FfmpegLogLevel::default(), FfmpegLogLevel::Error);
    }
}
