use crate::llm_client::prompts::{CURATED_CONTENT_INSTRUCTION, JSON_ONLY_SYSTEM};
use crate::models::job::JobContext;
use crate::models::plan::LearningPlan;

pub fn overview_system() -> String {
    format!(
        "{JSON_ONLY_SYSTEM} \
         You write study-plan summaries for job candidates as a senior technical mentor. \
         {CURATED_CONTENT_INSTRUCTION}"
    )
}

/// Prompt for the plan overview. The schedule is passed in compact form so the
/// model can only describe weeks that exist.
pub fn overview_prompt(job: &JobContext, plan: &LearningPlan) -> String {
    let weeks: Vec<String> = plan
        .weekly_schedule
        .iter()
        .map(|w| {
            let titles: Vec<&str> = w.videos.iter().map(|v| v.title.as_str()).collect();
            format!(
                "- Week {}: {} | videos: {} | ~{}h",
                w.week,
                w.focus,
                titles.join("; "),
                w.estimated_hours
            )
        })
        .collect();

    format!(
        r#"Summarise this learning plan for a candidate targeting "{title}" at "{company}".

Skill gaps (most urgent first): {gaps}
Duration: {duration} weeks, {intensity} pacing, {min}-{max} hours per week.

Schedule:
{weeks}

Return JSON with exactly this shape:
{{
  "overview": {{"title": string, "duration": string, "hours": string, "description": string}},
  "skill_gaps": {{"critical": [string], "strategy": string}},
  "weekly_plan": [{{"week": number, "title": string, "objectives": [string], "key_areas": [string]}}],
  "resources": {{"courses": [string], "books": [string]}}
}}

"weekly_plan" must have one entry per scheduled week, numbered as above."#,
        title = job.job_title,
        company = job.company_name,
        gaps = plan.required_skills.join(", "),
        duration = plan.duration_weeks,
        intensity = plan.intensity,
        min = plan.weekly_hours_target.min,
        max = plan.weekly_hours_target.max,
        weeks = weeks.join("\n"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overview_system_demands_json_only() {
        let system = overview_system();
        assert!(system.starts_with(JSON_ONLY_SYSTEM));
        assert!(system.contains(CURATED_CONTENT_INSTRUCTION));
    }
}
