//! Required job skills minus the candidate's current skills.
//!
//! Matching is case-insensitive and word-aware: "React.js" covers "React",
//! "JavaScript" does not cover "Java".

use crate::models::content::SkillGap;

/// Proficiency the plan aims for on every gap skill.
const TARGET_LEVEL: u8 = 3;

fn skill_words(skill: &str) -> Vec<String> {
    skill
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric() && c != '+' && c != '#')
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// True when `candidate` names the same skill as `required`, possibly with extra
/// qualifiers ("React.js", "Advanced Python").
pub fn covers(candidate: &str, required: &str) -> bool {
    let required = skill_words(required);
    if required.is_empty() {
        return false;
    }
    let candidate = skill_words(candidate);
    required.iter().all(|w| candidate.contains(w))
}

/// Missing skills in posting order, priority 1 = listed first.
/// Duplicate requirements are collapsed.
pub fn analyze_gaps(required_skills: &[String], candidate_skills: &[String]) -> Vec<SkillGap> {
    let mut seen: Vec<String> = Vec::new();
    let mut gaps = Vec::new();

    for required in required_skills {
        let required = required.trim();
        if required.is_empty() {
            continue;
        }
        let normalized = required.to_lowercase();
        if seen.contains(&normalized) {
            continue;
        }
        seen.push(normalized);

        if candidate_skills.iter().any(|c| covers(c, required)) {
            continue;
        }
        gaps.push(SkillGap {
            skill: required.to_string(),
            required_level: TARGET_LEVEL,
            current_level: 0,
            priority: gaps.len() as u32 + 1,
        });
    }
    gaps
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_missing_skills_in_posting_order() {
        let gaps = analyze_gaps(
            &strings(&["React", "TypeScript", "GraphQL", "Docker"]),
            &strings(&["typescript", "Docker Compose"]),
        );
        let names: Vec<&str> = gaps.iter().map(|g| g.skill.as_str()).collect();
        assert_eq!(names, vec!["React", "GraphQL"]);
        assert_eq!(gaps[0].priority, 1);
        assert_eq!(gaps[1].priority, 2);
    }

    #[test]
    fn test_qualified_candidate_skill_covers_requirement() {
        assert!(covers("React.js", "React"));
        assert!(covers("Advanced Python", "python"));
    }

    #[test]
    fn test_javascript_does_not_cover_java() {
        assert!(!covers("JavaScript", "Java"));
    }

    #[test]
    fn test_duplicates_and_blanks_collapsed() {
        let gaps = analyze_gaps(&strings(&["Go", "go", " ", "Rust"]), &[]);
        assert_eq!(gaps.len(), 2);
    }
}
