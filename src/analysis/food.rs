//! Food photo nutrition analysis.

use serde::{Deserialize, Serialize};

use crate::analysis::payload::{strip_code_fences, PayloadError};
use crate::analysis::{AnalysisService, ServiceError};
use crate::llm::{ChatMessage, ChatRequest};

const PROMPT: &str = r#"You are a professional nutritionist AI. Analyze the food in this image and return a JSON object with EXACTLY this structure (no markdown, no code fences, just raw JSON):
{
  "foodName": "Name of the food/dish",
  "calories": <number>,
  "confidence": <number between 0 and 100>,
  "macros": {
    "protein": <grams as number>,
    "carbs": <grams as number>,
    "fats": <grams as number>
  },
  "suggestions": ["suggestion 1", "suggestion 2"],
  "detailedAnalysis": "A 2-3 sentence analysis of the meal's nutritional value, balance, and any health considerations."
}

Rules:
- Estimate realistic calorie and macro values based on a typical serving size visible in the image.
- Confidence should reflect how clearly the food is identifiable.
- Provide 2-4 actionable dietary suggestions.
- If the image does not contain food, set foodName to "Not Food", calories to 0, confidence to 0, and explain in detailedAnalysis.
- Return ONLY valid JSON. No extra text."#;

const TEMPERATURE: f32 = 0.2;
const MAX_TOKENS: u32 = 1024;

/// Nutrition estimate returned by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodAnalysis {
    pub food_name: String,
    pub calories: f64,
    pub confidence: f64,
    pub macros: Macros,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub detailed_analysis: String,
}

/// Macronutrients in grams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Macros {
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

pub fn build_request(model: &str, image_base64: &str, mime_type: &str) -> ChatRequest {
    ChatRequest {
        model: model.to_string(),
        messages: vec![ChatMessage::user_with_image(PROMPT, mime_type, image_base64)],
        temperature: TEMPERATURE,
        max_tokens: MAX_TOKENS,
    }
}

/// Parse the model's reply, tolerating markdown fences around the JSON.
pub fn parse_food_analysis(reply: &str) -> Result<FoodAnalysis, PayloadError> {
    serde_json::from_str(&strip_code_fences(reply)).map_err(PayloadError::Json)
}

impl AnalysisService {
    /// Estimate calories and macros for a base64-encoded food photo.
    pub async fn analyze_food(
        &self,
        image_base64: &str,
        mime_type: &str,
    ) -> Result<FoodAnalysis, ServiceError> {
        let request = build_request(&self.vision_model, image_base64, mime_type);
        let reply = self.complete(request).await?;
        Ok(parse_food_analysis(&reply)?)
    }
}
