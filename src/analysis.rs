//! The structured analysis returned by the model.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{
    error::SchemaViolation,
    schema::{StructuredOutput, check_char_range, check_max_chars},
};

/// Longest allowed title, in characters.
pub const TITLE_MAX_CHARS: usize = 50;
/// Shortest allowed scene description, in characters.
pub const SCENE_DESCRIPTION_MIN_CHARS: usize = 50;
/// Longest allowed scene description, in characters.
pub const SCENE_DESCRIPTION_MAX_CHARS: usize = 150;

/// Title, scene description and narrative produced for one video.
///
/// Field names use camelCase on the wire (`sceneDescription`,
/// `narrativeExplanation`). A value obtained from
/// [`InferenceClient::invoke`](crate::InferenceClient::invoke) has already
/// passed [`validate`](StructuredOutput::validate).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Concise title, at most 50 characters.
    pub title: String,
    /// Key scenes, 50 to 150 characters.
    pub scene_description: String,
    /// Context or narrative of the video, typically 3 to 5 sentences.
    pub narrative_explanation: String,
}

impl StructuredOutput for AnalysisResult {
    const SCHEMA_NAME: &'static str = "video_analysis";

    fn json_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "title": {
                    "type": "string",
                    "description": "Title of the video",
                    "maxLength": TITLE_MAX_CHARS,
                },
                "sceneDescription": {
                    "type": "string",
                    "description": "Description of key scenes in the video",
                    "minLength": SCENE_DESCRIPTION_MIN_CHARS,
                    "maxLength": SCENE_DESCRIPTION_MAX_CHARS,
                },
                "narrativeExplanation": {
                    "type": "string",
                    "description": "Explanation of the video's context or narrative",
                },
            },
            "required": ["title", "sceneDescription", "narrativeExplanation"],
            "additionalProperties": false,
        })
    }

    fn validate(&self) -> Result<(), SchemaViolation> {
        check_max_chars("title", &self.title, TITLE_MAX_CHARS)?;
        check_char_range(
            "sceneDescription",
            &self.scene_description,
            SCENE_DESCRIPTION_MIN_CHARS,
            SCENE_DESCRIPTION_MAX_CHARS,
        )?;
        Ok(())
    }
}
