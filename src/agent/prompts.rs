//! Prompt templates for every model call the pipelines make.

use chrono::{Datelike, Local};

/// Current month and year, used to steer answers toward recent material.
#[derive(Debug, Clone)]
pub struct DateHint {
    pub month: String,
    pub year: i32,
}

impl DateHint {
    pub fn now() -> Self {
        let today = Local::now();
        Self {
            month: today.format("%B").to_string(),
            year: today.year(),
        }
    }
}

impl std::fmt::Display for DateHint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.month, self.year)
    }
}

/// Assemble the sectioned prompt sent to the models.
pub fn build_prompt(context: &str, attachment: Option<&str>, history: &str, question: &str) -> String {
    let mut prompt = format!("[context]\n{}\n", context);
    if let Some(file) = attachment {
        prompt.push_str(&format!("[file]\n{}\n", file));
    }
    prompt.push_str(&format!("[history]\n{}\n[question]\n{}\n", history, question));
    prompt
}

pub fn classify_system() -> String {
    "You answer quickly and accurately.
Rules:
- Your job is to decide whether a different agent needs to search online to answer the question
- If you are not sure, decide yes
- If the request is to summarize information clearly given in the question, decide no
- Reply with a decision only"
        .to_string()
}

pub fn planner_system(date: &DateHint, min_count: usize, max_count: usize, min_words: usize) -> String {
    let mut rules = format!(
        "You answer quickly and accurately.
Rules:
- Your job is to turn a question into web search queries
- The current date is {} if the user asks about something happening now
- Reply with between {} and {} short search queries
- If the question references a file look at [file]
- Keep the queries short (between 3 and 5 words)",
        date, min_count, max_count
    );
    if min_words > 1 {
        rules.push_str("\n- Each query is built of multiple words\n- **NEVER** write a query with only one word");
    }
    rules
}

pub fn link_selection_system(date: &DateHint) -> String {
    format!(
        "You answer quickly and accurately using the provided markdown web snippets.
Rules:
- Use the provided web snippets and only the provided web snippets as context
- If the question references a file look at [file]
- Respond with 1-3 links that are the most relevant to the user's question and closest to {}
- Make sure the links cover all parts of the user's question
- Only return links, nothing else",
        date
    )
}

pub fn research_summary_system() -> String {
    "You extract information relevant to a question from a web page.
Rules:
- Always return a summary of only the information relevant to the user's question
- Make sure you return the whole context needed for the question
- Never add information that is not on the page"
        .to_string()
}

pub fn code_extract_system() -> String {
    "You get code examples from web pages.
Rules:
- Always only return code examples
- Return code examples relevant to the question
- **NEVER** respond with anything that is not code"
        .to_string()
}

pub fn page_prompt(page: &str, question: &str, instruction: &str) -> String {
    format!("[web page]\n{}\n[question]\n{}\n[prompt]\n{}\n", page, question, instruction)
}

const SHARED_ANSWER_RULES: &str = "- If you don't understand the context of the user's question look for it in the [history] section
- If the question references a file look at [file]
- Only reply to the user's question
- If the provided context does not contain the answer, say explicitly that you don't know instead of guessing
- You always respond in markdown";

pub fn normal_system(date: &DateHint) -> String {
    format!(
        "You answer quickly and accurately using your own abilities.
Rules:
- If you don't know the answer always say you don't know
- The current date is {}, prefer information closest to it
{}",
        date, SHARED_ANSWER_RULES
    )
}

pub fn search_system(date: &DateHint) -> String {
    format!(
        "You answer quickly and accurately using the provided markdown web snippets.
Rules:
- **Always provide a link** to the article that you got your information from
- **Always cite your sources**
- Respond with information closest to {}
- Use the provided original queries and results as context
- Give the exact answer according to the web snippets, not suggestions for how the user can find it
{}",
        date, SHARED_ANSWER_RULES
    )
}

pub fn research_system(date: &DateHint) -> String {
    format!(
        "You answer quickly and accurately using the provided summaries of web pages.
Rules:
- **Always provide a link** to the web page that you got your information from
- **Always cite your sources**
- Disregard information in the pages that is not relevant to the question
- Respond with information closest to {}
- Look for dates in the provided pages and mention them in your response
- Give the exact answer according to the pages, not suggestions for how the user can find it
{}",
        date, SHARED_ANSWER_RULES
    )
}

pub fn code_system(date: &DateHint) -> String {
    format!(
        "You answer quickly and accurately using the provided code examples.
Rules:
- **Always provide a link** to the web page that you got each example from
- **Always cite your sources**
- Use the provided code examples as context and put code in fenced code blocks
- Disregard code that is not relevant to the question
- Prefer examples closest to {}
- Give the exact example the user asked for, not suggestions for how the user can find it
{}",
        date, SHARED_ANSWER_RULES
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_sections() {
        let prompt = build_prompt("ctx", Some("file body"), "User: hi\n", "why?");
        let context = prompt.find("[context]").unwrap();
        let file = prompt.find("[file]\nfile body").unwrap();
        let history = prompt.find("[history]").unwrap();
        let question = prompt.find("[question]\nwhy?").unwrap();
        assert!(context < file && file < history && history < question);

        assert!(!build_prompt("", None, "", "q").contains("[file]"));
    }

    #[test]
    fn test_date_hint_in_prompts() {
        let date = DateHint {
            month: "October".to_string(),
            year: 2026,
        };
        assert!(search_system(&date).contains("October 2026"));
        assert!(normal_system(&date).contains("October 2026"));
        assert!(planner_system(&date, 1, 3, 2).contains("**NEVER**"));
        assert!(!planner_system(&date, 1, 10, 1).contains("**NEVER**"));
    }
}
