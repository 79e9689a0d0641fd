//! Prompts and fixed replies for the vendor assistant

use once_cell::sync::Lazy;

use crate::llm::PromptTemplate;
use crate::models::ConversationTurn;
use crate::rag::query::ConversationType;

pub const SUMMARY_SYSTEM_MESSAGE: &str =
    "You are a helpful assistant that summarizes conversations concisely.";

pub const NO_RELEVANT_CONTEXT_MESSAGE: &str = "I couldn't find relevant information about that in the documentation. Please try rephrasing your question or contact MMT support for assistance.";

pub const DEFAULT_CONVERSATIONAL_REPLY: &str =
    "Hello! I'm here to help you with MakeMyTrip cab vendor integration. How can I assist you today?";

static ANSWER_PROMPT: Lazy<PromptTemplate> = Lazy::new(|| {
    PromptTemplate::new(
        r#"You are a helpful assistant for MakeMyTrip cab vendors. Your role is to help vendors understand and integrate with the MakeMyTrip platform.

CRITICAL RULES:
1. Answer ONLY from the provided documentation context below
2. If the information is not in the context, respond with: "I don't have that information in the documentation. Please contact MMT support for assistance."
3. Always cite specific API names, parameters, or sections when answering
4. Never speculate or provide information not explicitly stated in the context
5. For ambiguous queries, ask for clarification within the scope of cab integration
6. Be precise and technical in your responses
7. If the question is complex, break it down and answer every part the context covers

When answering:
- Reference specific API endpoints, parameters, or workflow steps from the context
- Use exact terminology from the documentation
- If multiple interpretations exist, ask which aspect the vendor needs clarification on
- Provide code examples or JSON structures when they exist in the context
- Explain the "why" behind requirements when the context provides reasoning

Context from documentation:
{{context}}

Conversation history:
{{memory}}

Vendor question: {{query}}

Remember: Only use information from the context above. If you're unsure or the information isn't in the context, say so clearly."#,
    )
});

static SUMMARIZATION_PROMPT: Lazy<PromptTemplate> = Lazy::new(|| {
    PromptTemplate::new(
        r"Summarize the following conversation between a cab vendor and the travel assist bot concisely.

Include:
- APIs or topics discussed (e.g., Search API, Block API, booking flow)
- The vendor's main intent or goal
- Important clarifications, parameters, or constraints mentioned
- Any unresolved questions or pending topics

Keep the summary under 150 words and focus on technical details that would be useful for continuing the conversation.

Conversation:
{{conversation}}

Summary:",
    )
});

/// System prompt for answer synthesis
pub fn build_answer_prompt(context: &str, memory: &str, query: &str) -> String {
    ANSWER_PROMPT.render_with(&[("context", context), ("memory", memory), ("query", query)])
}

/// User message asking for a summary of `turns`
pub fn build_summarization_prompt(turns: &[ConversationTurn]) -> String {
    let conversation = turns
        .iter()
        .map(ConversationTurn::to_transcript_line)
        .collect::<Vec<_>>()
        .join("\n");
    SUMMARIZATION_PROMPT.render_with(&[("conversation", &conversation)])
}

pub fn conversational_reply(kind: Option<ConversationType>) -> &'static str {
    match kind {
        Some(ConversationType::Greeting) => DEFAULT_CONVERSATIONAL_REPLY,
        Some(ConversationType::Gratitude) => {
            "You're welcome! Let me know if you have any other questions about the MakeMyTrip cab integration."
        }
        Some(ConversationType::Farewell) => {
            "Goodbye! Feel free to come back whenever you need help with the MakeMyTrip cab integration."
        }
        Some(ConversationType::Affirmation) => {
            "Great! Is there anything else about the integration you'd like to know?"
        }
        None => DEFAULT_CONVERSATIONAL_REPLY,
    }
}
