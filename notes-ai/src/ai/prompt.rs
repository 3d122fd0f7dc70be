use minijinja::{context, Environment};

use crate::notes::Note;

const PROMPT_TEMPLATE: &str = r#"You are an AI assistant helping a student work with their notes. Your main task is to answer questions about the notes provided below. You may also answer with related material that is not in the notes, as long as it stays on the topic of the notes.
{% if history %}
{{ history }}
{% endif %}
Here are the user's notes:
{{ notes }}

Current question from user: "{{ question }}"

Important instructions:
1. The answer must be relevant to the notes.
2. Identify which note(s) contain information relevant to the question.
3. If the user asks for study material (MCQs, quizzes), generate it strictly from the notes the user is asking about.
4. Do NOT use markdown or code blocks, and never wrap the response in triple backticks (e.g. ```html).
5. Format the response as clean HTML using tags like <p>, <ul>, <li>, <br> and <div>, without any ```html declaration.
"#;

const FENCE_MARKERS: [&str; 4] = ["```html", "```", "'''html", "'''"];

/// Renders notes as numbered, delimited blocks in the order given.
pub fn format_notes(notes: &[Note]) -> String {
    notes
        .iter()
        .enumerate()
        .map(|(index, note)| {
            let number = index + 1;
            format!(
                "=============== NOTE {number} (ID: {id}) ===============\n\n\
                 {text}\n\n\
                 Created: {created}\n\
                 Last updated: {updated}\n\
                 =============== END OF NOTE {number} ===============",
                id = note.id,
                text = note.text,
                created = note.created_at.to_rfc3339(),
                updated = note.updated_at.to_rfc3339(),
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Pairs earlier questions with their answers. Empty for the first question.
pub fn format_history(questions: &[String], responses: &[String]) -> String {
    if questions.len() <= 1 || responses.is_empty() {
        return String::new();
    }

    let pairs: String = questions[..questions.len() - 1]
        .iter()
        .zip(responses)
        .map(|(question, response)| format!("USER: {question}\nASSISTANT: {response}\n\n"))
        .collect();

    format!("Here is our conversation history for context:\n\n{pairs}")
}

pub fn build_prompt(history: &str, formatted_notes: &str, question: &str) -> Result<String, minijinja::Error> {
    let env = Environment::new();
    let prompt = env.render_str(
        PROMPT_TEMPLATE,
        context! {
            history => history.trim_end(),
            notes => formatted_notes,
            question => question,
        },
    )?;
    Ok(prompt)
}

/// Strips code-fence markers the model sometimes adds despite instructions.
pub fn sanitize_response(text: &str) -> String {
    FENCE_MARKERS
        .iter()
        .fold(text.to_string(), |acc, marker| acc.replace(marker, ""))
        .trim()
        .to_string()
}
