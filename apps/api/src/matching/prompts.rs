/// Builds the skill-match prompt. The model must answer with the
/// `LlmSkillVerdict` JSON shape.
pub fn skill_match_prompt(talent: &[String], required: &[String]) -> String {
    format!(
        "Compare a candidate's skills against a job posting's required skills.\n\
         Treat synonyms and close variants (e.g. \"postgres\" and \"postgresql\") as matches.\n\n\
         Required skills: {required}\n\
         Candidate skills: {talent}\n\n\
         Respond with a JSON object of exactly this shape:\n\
         {{\"score\": <number 0-100, share of required skills the candidate covers>,\n\
          \"matched_skills\": [<required skills covered>],\n\
          \"missing_skills\": [<required skills not covered>],\n\
          \"recommendation\": \"<one sentence for the candidate>\"}}",
        required = serde_json::to_string(required).unwrap_or_default(),
        talent = serde_json::to_string(talent).unwrap_or_default(),
    )
}
