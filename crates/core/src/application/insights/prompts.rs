// Prompt builders, one per endpoint

use super::{CareerRoadmapRequest, CareerSearchRequest, JobMarketQuery, SkillsAssessmentRequest};
use serde_json::{Map, Value};

pub fn job_market(query: &JobMarketQuery) -> String {
    format!(
        "Find current job openings for {industry} positions in {location}. \
Return the data in JSON format with fields: id, title, company, location, salary (min, max, currency), \
skills, experience, type, postedDate, demand, growthRate, industry, description. \
Generate {limit} realistic job postings.",
        industry = query.industry,
        location = query.location,
        limit = query.limit,
    )
}

pub fn market_trends() -> String {
    "Provide current market trends for technology and other industries including:
1. Trending skills with demand scores (0-100), growth rates, and salary estimates
2. Emerging job roles with descriptions, growth rates, and required skills
3. Industry insights with growth rates, job counts, and average salaries
Return in JSON format with trendingSkills, emergingRoles and industryInsights arrays."
        .to_string()
}

pub fn skills_data(skill_name: Option<&str>) -> String {
    format!(
        "Provide detailed information about {} including:
demand score (0-100), salary estimates, growth rate, related skills, and relevant certifications.
Return a JSON array of objects with skill, demand, salary, growth, relatedSkills and certifications.",
        skill_name.unwrap_or("in-demand technical skills")
    )
}

pub fn skills_assessment(req: &SkillsAssessmentRequest) -> String {
    format!(
        r#"Based on this skills assessment, provide personalized career recommendations:

Skills: {skills}
Experience Level: {experience}
Current Role: {role}
Experience Details: {experience_details}
Career Goal: {goal}
Additional Goals: {goals_details}

Please provide recommendations in this exact JSON format:
{{
  "careerPaths": [
    {{
      "title": "Job Title",
      "match": "95%",
      "description": "Why this career path matches",
      "salary": "Salary range",
      "growth": "Growth potential",
      "requiredSkills": ["skill1", "skill2"],
      "nextSteps": ["step1", "step2"]
    }}
  ],
  "skillDevelopment": [
    {{
      "skill": "Skill Name",
      "priority": "High/Medium/Low",
      "timeline": "3-6 months",
      "description": "Why this skill is important",
      "resources": ["resource1", "resource2"]
    }}
  ],
  "roadmap": {{
    "shortTerm": ["Goal 1", "Goal 2"],
    "mediumTerm": ["Goal 1", "Goal 2"],
    "longTerm": ["Goal 1", "Goal 2"]
  }}
}}

Make the recommendations highly personalized and actionable based on their specific skills, experience, and goals."#,
        skills = req.skills.join(", "),
        experience = req.experience_level,
        role = req.current_role,
        experience_details = req.experience_details,
        goal = req.selected_career_goal,
        goals_details = req.goals_details,
    )
}

pub fn all_careers() -> String {
    "Provide a comprehensive list of current career paths with up-to-date information including:

1. Career ID, title, category, and level
2. Current salary ranges (min, max, currency)
3. Required skills for each level
4. Growth potential percentage and description
5. Next steps for career progression
6. Short/medium/long term roadmap
7. Market demand and job outlook

Return a JSON array with one object per career containing all the detailed information."
        .to_string()
}

pub fn career(career_id: &str) -> String {
    format!(
        "Provide detailed, current information for the career: {career_id}

Include:
1. Current salary ranges
2. Required skills and certifications
3. Growth potential and market outlook
4. Career progression roadmap (short/medium/long term)
5. Job requirements and qualifications
6. Market demand and job availability

Return in JSON format with all current market data."
    )
}

pub fn update_career(career_id: &str, updates: &Map<String, Value>) -> String {
    let pretty = serde_json::to_string_pretty(updates).unwrap_or_else(|_| "{}".to_string());
    format!(
        "Update the career data for {career_id} with the following changes:

Updates: {pretty}

Please provide the complete updated career information including:
1. Updated salary ranges with current market data
2. Revised required skills and certifications
3. Current growth potential and market outlook
4. Updated career roadmap
5. Current job requirements

Return the complete updated career data in JSON format."
    )
}

pub fn refresh_career(career_id: &str) -> String {
    format!(
        "Provide the most current market data for {career_id} career path including:

1. Updated salary ranges
2. Current required skills and technologies
3. Latest growth projections and market trends
4. Updated job requirements and qualifications
5. Current certifications and training needed
6. Market demand and job availability

Return complete updated career data in JSON format."
    )
}

pub fn career_roadmap(req: &CareerRoadmapRequest) -> String {
    format!(
        "Generate a personalized career roadmap for transitioning from {current} to {target} in {career}.

Current Skills: {skills}
Current Experience: {experience}

Provide a detailed roadmap with:
1. Short-term goals (3-6 months)
2. Medium-term goals (6-12 months)
3. Long-term goals (1+ years)

Each goal should be specific, actionable, and include:
- Skills to develop
- Certifications to obtain
- Experience to gain
- Milestones to achieve

Return in JSON format with shortTerm, mediumTerm, and longTerm arrays.",
        current = req.current_level,
        target = req.target_level,
        career = req.career_id,
        skills = req.skills.join(", "),
        experience = req.experience,
    )
}

pub fn career_market(career_id: &str) -> String {
    format!(
        "Provide current market data for {career_id} including:

1. Job demand score (0-100)
2. Growth rate percentage
3. Average salary range
4. Number of current job openings
5. Market trends and outlook

Return in JSON format with demand, growth, averageSalary, jobOpenings, and lastUpdated fields."
    )
}

pub fn search_careers(req: &CareerSearchRequest) -> String {
    let bound = |v: Option<i64>| v.map(|n| n.to_string()).unwrap_or_else(|| "Any".to_string());
    format!(
        "Search for careers matching these criteria:

Skills: {skills}
Salary Range: {min} - {max}
Level: {level}
Category: {category}

Return a JSON array of matching careers with current market data.",
        skills = req.skills.join(", "),
        min = bound(req.salary_min()),
        max = bound(req.salary_max()),
        level = req.level.as_deref().unwrap_or("Any"),
        category = req.category.as_deref().unwrap_or("Any"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_market_prompt_mentions_query() {
        let prompt = job_market(&JobMarketQuery {
            industry: "healthcare".to_string(),
            location: "Texas".to_string(),
            limit: 10,
        });
        assert!(prompt.contains("healthcare positions in Texas"));
        assert!(prompt.contains("Generate 10 realistic job postings"));
    }

    #[test]
    fn test_search_prompt_defaults_to_any() {
        let prompt = search_careers(&CareerSearchRequest::default());
        assert!(prompt.contains("Salary Range: Any - Any"));
        assert!(prompt.contains("Level: Any"));
    }
}
