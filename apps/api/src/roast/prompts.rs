// Roast prompt template.

pub const ROAST_PROMPT_TEMPLATE: &str = "You are a brutally honest but hilarious resume roaster. \
Roast the following resume in a funny, sarcastic way. \
Be brutal but entertaining. Keep it under 200 words.\n\n\
Resume:\n{resume_text}\n\nRoast:";

/// Fills the roast template with the extracted resume text.
pub fn build_roast_prompt(resume_text: &str) -> String {
    ROAST_PROMPT_TEMPLATE.replace("{resume_text}", resume_text)
}
