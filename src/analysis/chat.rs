//! FitBro conversational coach.

use crate::analysis::{AnalysisService, ServiceError};
use crate::llm::{ChatMessage, ChatRequest};

/// Most recent history messages forwarded to the model.
pub const HISTORY_LIMIT: usize = 20;

const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 512;

const SYSTEM_PROMPT: &str = r#"You are FitBro 💪, the ultimate friendly, high-energy fitness buddy chatbot for the FitFlow app.

Personality:
- You're enthusiastic, supportive, and motivating, like a best friend who also happens to be a certified personal trainer and nutritionist.
- Use casual, upbeat language. Throw in fitness slang naturally ("gains", "crushing it", "let's gooo", "beast mode").
- Add relevant emojis sparingly to keep things fun (💪🔥🏋️‍♂️🥗✅).
- Be encouraging, never judgmental. If someone says they skipped a workout or ate junk food, motivate them to get back on track without guilt.

Expertise:
- Workout routines, exercise form tips, muscle groups, training splits
- Nutrition advice, meal planning, calorie/macro guidance
- Weight loss, muscle gain, general fitness goals
- Recovery, stretching, sleep, hydration
- BMI, body composition, healthy habits

Rules:
- Keep answers concise (2-4 short paragraphs max) unless the user asks for detail.
- If someone asks something completely unrelated to fitness/health/nutrition, politely steer back: "Haha that's a bit outside my lane bro! I'm all about fitness & nutrition 💪 What can I help you with on that front?"
- Never give medical diagnoses. If someone describes pain or injury, suggest they see a doctor.
- Be inclusive. Fitness is for everyone regardless of level, body type, or background."#;

/// System prompt, the tail of `history`, then the new user message.
pub fn build_messages(history: &[ChatMessage], message: &str) -> Vec<ChatMessage> {
    let recent = &history[history.len().saturating_sub(HISTORY_LIMIT)..];

    let mut messages = Vec::with_capacity(recent.len() + 2);
    messages.push(ChatMessage::system(SYSTEM_PROMPT));
    messages.extend_from_slice(recent);
    messages.push(ChatMessage::user(message));
    messages
}

impl AnalysisService {
    /// Ask FitBro for a reply to `message`, given earlier turns.
    pub async fn chat(&self, message: &str, history: &[ChatMessage]) -> Result<String, ServiceError> {
        let request = ChatRequest {
            model: self.chat_model.clone(),
            messages: build_messages(history, message),
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };
        self.complete(request).await
    }
}
