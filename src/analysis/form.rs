//! Exercise form feedback from a photo.

use crate::analysis::{AnalysisService, ServiceError};
use crate::llm::{ChatMessage, ChatRequest};

/// Used when the client does not say what kind of image it sent.
pub const DEFAULT_MIME_TYPE: &str = "image/jpeg";

const TEMPERATURE: f32 = 0.3;
const MAX_TOKENS: u32 = 1024;

fn prompt(exercise: &str) -> String {
    format!(
        r#"You are a professional fitness coach and exercise form analyst. Analyze this image of a person performing "{exercise}".

Carefully examine the person's posture, body alignment, joint angles, and overall form in the image.

Provide your analysis in this exact format:

✅ What's Good:
- List specific things the person is doing correctly (body alignment, stance, grip, etc.)
- Be specific about what you can see in the image

⚠️ What to Fix:
- List specific form issues you can identify from the image
- Mention joint angles, spine alignment, weight distribution issues, etc.
- If the form looks good, still suggest minor refinements

💡 Pro Tips:
- Give 2-3 actionable tips to improve their {exercise} form
- Include cues they can think about during the exercise

⚡ Overall Rating: Give a form score out of 10

Important: Base your analysis on what you can ACTUALLY see in the image. If the image is unclear or doesn't show exercise form, say so honestly. Be encouraging but accurate."#
    )
}

pub fn build_request(
    model: &str,
    image_base64: &str,
    mime_type: Option<&str>,
    exercise: &str,
) -> ChatRequest {
    let mime_type = mime_type.unwrap_or(DEFAULT_MIME_TYPE);
    ChatRequest {
        model: model.to_string(),
        messages: vec![ChatMessage::user_with_image(prompt(exercise), mime_type, image_base64)],
        temperature: TEMPERATURE,
        max_tokens: MAX_TOKENS,
    }
}

impl AnalysisService {
    /// Coaching feedback on the exercise form shown in a photo.
    pub async fn analyze_form(
        &self,
        image_base64: &str,
        mime_type: Option<&str>,
        exercise: &str,
    ) -> Result<String, ServiceError> {
        let request = build_request(&self.vision_model, image_base64, mime_type, exercise);
        self.complete(request).await
    }
}
