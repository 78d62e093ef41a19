//! Task prompt templates
//!
//! Each feature builds one user prompt over the composed context. The quiz
//! and flashcard prompts dictate an exact textual output format; the model's
//! response is passed through verbatim rather than parsed, so format
//! compliance rests entirely on these instructions.

/// Grounded question answering
pub fn ask(context: &str, question: &str) -> String {
    format!(
        "Based on the following context from the study materials, answer this question:\n\
         Context:\n{context}\n\
         Question: {question}\n\
         Please provide a clear, concise answer based only on the information in the context."
    )
}

/// Child-level explanation of a concept
pub fn eli5(context: &str, concept: &str) -> String {
    format!(
        "Based on the following context, explain this concept as if you're talking to a \
         5-year-old child. Use simple words, analogies, and examples that a child would understand.\n\
         Context:\n{context}\n\
         Concept to explain: {concept}\n\
         Rules:\n\
         1. Use very simple language\n\
         2. Include a fun analogy or comparison\n\
         3. Keep it short and engaging\n\
         4. Avoid technical jargon"
    )
}

/// Multiple-choice quiz over the stored material
pub fn quiz(context: &str, num_questions: usize, difficulty: &str) -> String {
    format!(
        "Based on the following study material, create {num_questions} multiple-choice questions.\n\
         Study Material:\n{context}\n\
         Format each question EXACTLY like this:\n\
         Q1: [Question text]\n\
         A) [Option A]\n\
         B) [Option B]\n\
         C) [Option C]\n\
         D) [Option D]\n\
         Correct Answer: [A/B/C/D]\n\
         Explanation: [Brief explanation]\n\
         Make the questions {difficulty} difficulty level."
    )
}

/// Comprehensive summary of the stored material
pub fn summary(context: &str) -> String {
    format!(
        "Create a comprehensive summary of the following study material. Include:\n\
         1. Main topics covered\n\
         2. Key concepts and definitions\n\
         3. Important points to remember\n\
         Study Material:\n{context}\n\
         Format the summary with clear headings and bullet points."
    )
}

/// Flashcards for memorization
pub fn flashcards(context: &str, count: usize) -> String {
    format!(
        "Based on the following study material, create {count} flashcards for memorization.\n\
         Study Material:\n{context}\n\
         Format EXACTLY like this for each flashcard:\n\
         FRONT: [Question or term]\n\
         BACK: [Answer or definition]\n\
         ---\n\
         Make the flashcards focus on key concepts, definitions, and important facts."
    )
}

/// Hierarchical outline of the stored material
pub fn outline(context: &str) -> String {
    format!(
        "Create a hierarchical outline of the following study material. Organize it with \
         main topics, subtopics, and key points.\n\
         Study Material:\n{context}\n\
         Format the outline like this:\n\
         I. Main Topic\n   \
         A. Subtopic\n      \
         1. Key point\n      \
         2. Key point\n   \
         B. Subtopic\n\
         II. Main Topic\n   \
         A. Subtopic\n\
         Make it clear, organized, and easy to scan."
    )
}
