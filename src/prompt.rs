//! Prompt text sent to the model.

/// Persona sent as the system message.
pub const SYSTEM_PROMPT: &str = "You are a helpful video analysis assistant.";

/// Instruction sent with the extracted frame.
///
/// The field names and bounds match [`AnalysisResult`](crate::AnalysisResult).
pub const ANALYSIS_PROMPT: &str = "\
Analyze the provided video frame and return a structured response with:
- title: A concise title for the video (max 50 characters).
- sceneDescription: A description of key scenes (50-150 characters).
- narrativeExplanation: An explanation of the video's context or narrative (3-5 sentences).
";
