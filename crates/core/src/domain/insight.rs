// Endpoint Payload Records
//
// Typed shapes for generated API payloads. Each record is validated when the
// generator output is decoded; unknown extra fields are ignored.

use serde::{Deserialize, Serialize};

/// Career documents are served as the generator shaped them
pub type CareerDocument = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryBand {
    #[serde(default)]
    pub min: f64,
    #[serde(default)]
    pub max: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobListing {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub salary: Option<SalaryBand>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience: String,
    #[serde(default, rename = "type")]
    pub job_type: String,
    #[serde(default)]
    pub posted_date: String,
    #[serde(default)]
    pub demand: String,
    #[serde(default)]
    pub growth_rate: f64,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub description: String,
}

impl JobListing {
    /// Listing served when generation or parsing fails
    pub fn fallback(posted_date: impl Into<String>) -> Vec<JobListing> {
        vec![JobListing {
            id: "fallback-1".to_string(),
            title: "Software Engineer".to_string(),
            company: "Tech Company".to_string(),
            location: "Remote".to_string(),
            salary: Some(SalaryBand {
                min: 80_000.0,
                max: 120_000.0,
                currency: "USD".to_string(),
            }),
            skills: vec![
                "JavaScript".to_string(),
                "React".to_string(),
                "Node.js".to_string(),
            ],
            experience: "Mid Level".to_string(),
            job_type: "full-time".to_string(),
            posted_date: posted_date.into(),
            demand: "high".to_string(),
            growth_rate: 15.0,
            industry: "Technology".to_string(),
            description: "Fallback job data when APIs are unavailable.".to_string(),
        }]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingSkill {
    pub skill: String,
    #[serde(default)]
    pub demand: f64,
    #[serde(default)]
    pub growth: f64,
    #[serde(default)]
    pub salary: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergingRole {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub growth: f64,
    #[serde(default)]
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndustryInsight {
    pub industry: String,
    #[serde(default)]
    pub growth: f64,
    #[serde(default)]
    pub job_count: f64,
    #[serde(default)]
    pub avg_salary: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketTrends {
    #[serde(default)]
    pub trending_skills: Vec<TrendingSkill>,
    #[serde(default)]
    pub emerging_roles: Vec<EmergingRole>,
    #[serde(default)]
    pub industry_insights: Vec<IndustryInsight>,
}

impl MarketTrends {
    pub fn is_empty(&self) -> bool {
        self.trending_skills.is_empty()
            && self.emerging_roles.is_empty()
            && self.industry_insights.is_empty()
    }

    pub fn fallback() -> Self {
        Self {
            trending_skills: vec![
                TrendingSkill {
                    skill: "AI/ML".to_string(),
                    demand: 95.0,
                    growth: 25.0,
                    salary: 120_000.0,
                },
                TrendingSkill {
                    skill: "Cybersecurity".to_string(),
                    demand: 90.0,
                    growth: 20.0,
                    salary: 110_000.0,
                },
            ],
            emerging_roles: vec![EmergingRole {
                title: "AI Engineer".to_string(),
                description: "Build AI models".to_string(),
                growth: 30.0,
                skills: vec!["Python".to_string(), "ML".to_string()],
            }],
            industry_insights: vec![IndustryInsight {
                industry: "Technology".to_string(),
                growth: 15.0,
                job_count: 50_000.0,
                avg_salary: 95_000.0,
            }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillInsight {
    pub skill: String,
    #[serde(default)]
    pub demand: f64,
    #[serde(default)]
    pub salary: f64,
    #[serde(default)]
    pub growth: f64,
    #[serde(default)]
    pub related_skills: Vec<String>,
    #[serde(default)]
    pub certifications: Vec<String>,
}

impl SkillInsight {
    pub fn fallback() -> Vec<SkillInsight> {
        vec![SkillInsight {
            skill: "JavaScript".to_string(),
            demand: 90.0,
            salary: 95_000.0,
            growth: 15.0,
            related_skills: vec!["TypeScript".to_string(), "React".to_string()],
            certifications: vec!["AWS Certified Developer".to_string()],
        }]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerPathSuggestion {
    pub title: String,
    #[serde(default)]
    pub r#match: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub salary: String,
    #[serde(default)]
    pub growth: String,
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub next_steps: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillDevelopment {
    pub skill: String,
    #[serde(default)]
    pub priority: String,
    #[serde(default)]
    pub timeline: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub resources: Vec<String>,
}

/// Short/medium/long-term goals. Goals are kept as raw JSON since the
/// generator emits either plain strings or structured milestones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Roadmap {
    pub short_term: Vec<serde_json::Value>,
    pub medium_term: Vec<serde_json::Value>,
    pub long_term: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentRecommendations {
    pub career_paths: Vec<CareerPathSuggestion>,
    #[serde(default)]
    pub skill_development: Vec<SkillDevelopment>,
    #[serde(default)]
    pub roadmap: Roadmap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerMarketData {
    pub demand: f64,
    pub growth: f64,
    #[serde(default)]
    pub average_salary: serde_json::Value,
    #[serde(default)]
    pub job_openings: serde_json::Value,
    #[serde(default)]
    pub last_updated: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_job_listing_accepts_sparse_generator_output() {
        let listing: JobListing = serde_json::from_value(json!({
            "title": "Data Engineer",
            "type": "contract",
            "growthRate": 12,
            "unexpected": true
        }))
        .unwrap();
        assert_eq!(listing.job_type, "contract");
        assert_eq!(listing.growth_rate, 12.0);
        assert!(listing.salary.is_none());
    }

    #[test]
    fn test_roadmap_requires_all_horizons() {
        let missing = serde_json::from_value::<Roadmap>(json!({
            "shortTerm": ["Learn Rust"],
            "mediumTerm": []
        }));
        assert!(missing.is_err());
    }

    #[test]
    fn test_market_trends_fallback_is_populated() {
        let trends = MarketTrends::fallback();
        assert!(!trends.is_empty());
        let value = serde_json::to_value(&trends).unwrap();
        assert_eq!(value["trendingSkills"][0]["skill"], "AI/ML");
        assert_eq!(value["industryInsights"][0]["jobCount"], 50_000.0);
    }
}
