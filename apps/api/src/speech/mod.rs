// Speech-safe text: sanitizing LLM answers before TTS, plus the kid-voice
// style check. The LLM call and the TTS engine live outside this service.

pub mod handlers;
pub mod normalize;
pub mod sanitizer;
pub mod style;
