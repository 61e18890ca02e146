//! Question-answering prompt assembly.
//!
//! The template has two slots: `{context}` receives the retrieved chunk
//! texts joined by [`CONTEXT_DELIMITER`] in retrieval order, and
//! `{question}` receives the user's question verbatim. Rendering is a
//! plain substitution — no escaping, no truncation (the retriever's
//! k-limit bounds the prompt size).

/// Separator between chunk texts inside the `<context>` block.
pub const CONTEXT_DELIMITER: &str = "\n\n";

const CONTEXT_SLOT: &str = "{context}";
const QUESTION_SLOT: &str = "{question}";

pub const QA_TEMPLATE: &str = "\
Human: Use the following pieces of context to provide a concise answer to the question at the end but summarize with at least 80 words and maximum 200 words with detailed explanations.
If you don't know the answer, just say \"I don't know\" and don't try to make up an answer.
<context>
{context}
</context>

Questions: {question}

Assistant:";

/// Render the QA prompt from retrieved chunk texts and the question.
pub fn render(context_chunks: &[&str], question: &str) -> String {
    let context = context_chunks.join(CONTEXT_DELIMITER);
    QA_TEMPLATE
        .replace(CONTEXT_SLOT, &context)
        .replace(QUESTION_SLOT, question)
}
