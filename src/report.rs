//! Console rendering of analysis results and failures.

use std::io::{Result as IoResult, Write};

use colored::Colorize;

use crate::{analysis::AnalysisResult, error::FramesightError};

const HEADING: &str = "Video Analysis Result:";
const TITLE_LABEL: &str = "Video Title:";
const SCENE_LABEL: &str = "Scene Description:";
const NARRATIVE_LABEL: &str = "Narrative Explanation:";

/// How a successful analysis is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Three labelled plain-text sections.
    #[default]
    Text,
    /// The text sections with bold, coloured labels. Styling follows
    /// `colored`'s terminal detection, so it degrades to [`Text`](Self::Text)
    /// when colours are off.
    StyledText,
    /// The result object as pretty-printed JSON.
    Json,
}

/// Write the analysis in the requested format.
pub fn write_analysis<W: Write>(
    out: &mut W,
    result: &AnalysisResult,
    format: OutputFormat,
) -> IoResult<()> {
    match format {
        OutputFormat::Text => write_sections(out, result, |label| label.to_string()),
        OutputFormat::StyledText => write_sections(out, result, |label| {
            if label == HEADING {
                label.bold().to_string()
            } else {
                label.cyan().bold().to_string()
            }
        }),
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, result)?;
            writeln!(out)
        }
    }
}

fn write_sections<W: Write>(
    out: &mut W,
    result: &AnalysisResult,
    style: impl Fn(&str) -> String,
) -> IoResult<()> {
    writeln!(out, "{}", style(HEADING))?;
    writeln!(out)?;
    writeln!(out, "{} {}", style(TITLE_LABEL), result.title)?;
    writeln!(out)?;
    writeln!(out, "{} {}", style(SCENE_LABEL), result.scene_description)?;
    writeln!(out)?;
    writeln!(out, "{} {}", style(NARRATIVE_LABEL), result.narrative_explanation)
}

/// Write the single diagnostic line for a failed run.
///
/// Line breaks inside the underlying message are folded into spaces so the
/// diagnostic always occupies one line.
pub fn write_failure<W: Write>(out: &mut W, error: &FramesightError) -> IoResult<()> {
    let message = error
        .to_string()
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    writeln!(out, "{}: {message}", error.stage_label())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InferenceError;

    fn sample() -> AnalysisResult {
        AnalysisResult {
            title: "Harbor at Dawn".to_string(),
            scene_description: "Fishing boats rest in a calm harbor while gulls circle above the morning mist.".to_string(),
            narrative_explanation: "A quiet start to the day.".to_string(),
        }
    }

    #[test]
    fn text_sections() {
        let mut out = Vec::new();
        write_analysis(&mut out, &sample(), OutputFormat::Text).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Video Analysis Result:\n"));
        assert!(text.contains("Video Title: Harbor at Dawn\n"));
        assert!(text.contains("Scene Description: Fishing boats"));
        assert!(text.contains("Narrative Explanation: A quiet start to the day.\n"));
    }

    #[test]
    fn json_output() {
        let mut out = Vec::new();
        write_analysis(&mut out, &sample(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["title"], "Harbor at Dawn");
    }

    #[test]
    fn failure_is_one_line() {
        let error = FramesightError::from(InferenceError::new("bad gateway\n<html>\n</html>"));
        let mut out = Vec::new();
        write_failure(&mut out, &error).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("Model Invocation Error: Error invoking model: bad gateway"));
    }

    #[test]
    fn styled_text_keeps_the_plain_layout() {
        let mut plain = Vec::new();
        write_analysis(&mut plain, &sample(), OutputFormat::Text).unwrap();

        colored::control::set_override(true);
        let mut styled = Vec::new();
        let written = write_analysis(&mut styled, &sample(), OutputFormat::StyledText);
        colored::control::unset_override();
        written.unwrap();

        let styled = String::from_utf8(styled).unwrap();
        assert!(styled.contains("\u{1b}["), "labels should carry ANSI styling");

        let mut stripped = String::new();
        let mut chars = styled.chars();
        while let Some(c) = chars.next() {
            if c == '\u{1b}' {
                chars.by_ref().find(|&c| c == 'm');
            } else {
                stripped.push(c);
            }
        }
        assert_eq!(stripped, String::from_utf8(plain).unwrap());
    }
}
