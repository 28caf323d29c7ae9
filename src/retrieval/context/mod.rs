
use chrono::{Local, NaiveDate};

use crate::documents::DocumentChunk;

/// Render ranked chunks as numbered fragments separated by blank lines.
///
/// Order is preserved as given; callers pass chunks already sorted by rank.
#[inline]
pub fn build_context(chunks: &[DocumentChunk]) -> String {
    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| format!("[{}] {}", i + 1, chunk.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// System instructions for the answering model, dated today
#[inline]
pub fn build_system_prompt(subject: &str, context: &str) -> String {
    build_system_prompt_on(subject, context, Local::now().date_naive())
}

/// System instructions for the answering model.
///
/// The supplied context is the only information the model may use; the date
/// lets it resolve relative facts such as whether a graduation has happened.
#[inline]
pub fn build_system_prompt_on(subject: &str, context: &str, today: NaiveDate) -> String {
    let today = today.format("%A, %B %-d, %Y");

    format!(
        "You are an AI assistant for {subject}'s portfolio website. Your role is to answer questions about {subject}'s skills, experience, education, and projects.

TODAY'S DATE: {today}

IMPORTANT RULES:
1. ONLY answer based on the context provided below. Never use outside knowledge or make up information.
2. If the context does not contain the information needed, say politely that you don't have that specific information and suggest questions you CAN answer about {subject}.
3. Be conversational, friendly, and professional.
4. Keep responses concise but informative.
5. If asked about topics unrelated to {subject}'s portfolio (weather, current events, etc.), politely steer the conversation back to {subject}'s profile.
6. Use today's date to interpret time-sensitive information correctly (e.g. if a graduation date has passed, {subject} has graduated).

CONTEXT FROM {subject}'S PORTFOLIO:
{context}

Remember: only use the information from the context above. If something isn't in the context, acknowledge that you don't have that information."
    )
}
