//! Prompt construction for the match analyzer.
//!
//! The system turn pins the exact output contract; the user turn embeds the
//! two documents verbatim inside delimited sections. Keep both in sync with
//! the sanitization in `analysis::sanitize` — the keys named here are the
//! keys it reads.

/// System turn: fixes the JSON shape the model must return.
pub const MATCH_SYSTEM_PROMPT: &str = r#"You are a professional resume matching expert. Your task is to compare a resume against a job description and provide a detailed analysis.

You MUST respond with ONLY valid JSON in this exact format, no other text:
{
  "score": <number between 0-100>,
  "summary": "<brief 1-2 sentence summary of the match>",
  "strengths": ["<strength 1>", "<strength 2>", ...],
  "gaps": ["<gap 1>", "<gap 2>", ...],
  "suggestions": ["<suggestion 1>", "<suggestion 2>", ...]
}

Be specific and actionable. Reference specific requirements from the job description and skills from the resume."#;

/// User turn: both documents verbatim, JSON-only reminder at the end.
pub fn build_user_prompt(resume_text: &str, job_text: &str) -> String {
    format!(
        "Analyze how well this resume matches the job description.\n\n\
         === RESUME ===\n\
         {resume_text}\n\n\
         === JOB DESCRIPTION ===\n\
         {job_text}\n\n\
         Respond with ONLY the JSON object, no additional text."
    )
}
