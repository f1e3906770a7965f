// Trend Synthesizer - plausible metrics from static industry tables
//
// No network, no failure modes: every call yields a fully populated analysis.

use super::TrendAnalyzer;
use crate::domain::salary::DEFAULT_REGION;
use crate::domain::trend::{clamp_score, round1, HIGH_SCORE_THRESHOLD, MEDIUM_SCORE_THRESHOLD};
use crate::domain::{Career, Currency, DemandLevel, SalaryData, TrendAnalysis, TrendDirection};
use crate::error::Result;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

const SCORE_JITTER: f64 = 1.0;
const AUTOMATION_JITTER: f64 = 0.5;
const GROWTH_JITTER: f64 = 3.0;
const CONFIDENCE_MIN: f64 = 7.0;
const CONFIDENCE_MAX: f64 = 9.5;

/// Parameter bucket for one industry
#[derive(Debug)]
pub struct IndustryProfile {
    pub key: &'static str,
    pub base_score: f64,
    pub growth_rate: f64,
    pub trending_skills: &'static [&'static str],
    pub top_locations: &'static [&'static str],
    pub remote_work: f64,
    pub automation_risk: f64,
    pub base_salary: f64,
    pub industry_impact: &'static str,
}

const TECH: IndustryProfile = IndustryProfile {
    key: "tech",
    base_score: 8.5,
    growth_rate: 15.0,
    trending_skills: &["AI/ML", "Cloud Computing", "Cybersecurity", "DevOps", "Python"],
    top_locations: &["San Francisco", "Seattle", "Austin", "New York", "Boston"],
    remote_work: 8.5,
    automation_risk: 3.0,
    base_salary: 110_000.0,
    industry_impact: "AI adoption and cloud migration keep reshaping technical roles.",
};

static PROFILES: [IndustryProfile; 6] = [
    TECH,
    IndustryProfile {
        key: "healthcare",
        base_score: 8.0,
        growth_rate: 12.0,
        trending_skills: &[
            "Telemedicine",
            "Data Analytics",
            "AI Diagnostics",
            "Patient Care",
            "Medical Technology",
        ],
        top_locations: &["Boston", "Philadelphia", "Cleveland", "Rochester", "Baltimore"],
        remote_work: 4.0,
        automation_risk: 2.0,
        base_salary: 85_000.0,
        industry_impact: "Digital health tools are changing how care is delivered.",
    },
    IndustryProfile {
        key: "finance",
        base_score: 7.5,
        growth_rate: 8.0,
        trending_skills: &[
            "Fintech",
            "Blockchain",
            "Risk Management",
            "Data Science",
            "Regulatory Compliance",
        ],
        top_locations: &["New York", "Chicago", "San Francisco", "Boston", "Charlotte"],
        remote_work: 6.0,
        automation_risk: 4.5,
        base_salary: 95_000.0,
        industry_impact: "Automation of routine processing shifts demand toward analytical roles.",
    },
    IndustryProfile {
        key: "education",
        base_score: 7.0,
        growth_rate: 6.0,
        trending_skills: &[
            "EdTech",
            "Online Learning",
            "Data Analytics",
            "Student Success",
            "Curriculum Design",
        ],
        top_locations: &["Boston", "New York", "Los Angeles", "Chicago", "Washington DC"],
        remote_work: 7.0,
        automation_risk: 3.5,
        base_salary: 60_000.0,
        industry_impact: "Online learning platforms are widening the reach of educators.",
    },
    IndustryProfile {
        key: "manufacturing",
        base_score: 6.5,
        growth_rate: 5.0,
        trending_skills: &[
            "Automation",
            "IoT",
            "Quality Control",
            "Supply Chain",
            "Lean Manufacturing",
        ],
        top_locations: &["Detroit", "Cleveland", "Milwaukee", "Indianapolis", "Grand Rapids"],
        remote_work: 2.0,
        automation_risk: 6.0,
        base_salary: 70_000.0,
        industry_impact: "Robotics and connected equipment are automating production lines.",
    },
    IndustryProfile {
        key: "agriculture",
        base_score: 6.0,
        growth_rate: 4.0,
        trending_skills: &[
            "Precision Agriculture",
            "Drones",
            "Data Analytics",
            "Sustainability",
            "Crop Science",
        ],
        top_locations: &["Fresno", "Bakersfield", "Modesto", "Stockton", "Visalia"],
        remote_work: 1.0,
        automation_risk: 5.0,
        base_salary: 55_000.0,
        industry_impact: "Sensor data and sustainability targets are modernising farm operations.",
    },
];

/// Profile for `industry`; unknown industries use the tech bucket
pub fn profile_for(industry: &str) -> &'static IndustryProfile {
    let key = industry.trim().to_ascii_lowercase();
    PROFILES.iter().find(|p| p.key == key).unwrap_or(&PROFILES[0])
}

fn insight_templates(industry: &str) -> &'static [&'static str] {
    match industry {
        "healthcare" => &[
            "Healthcare technology integration is creating new opportunities for tech-savvy healthcare professionals.",
            "Aging population and increased healthcare needs are driving steady job growth.",
            "Telemedicine and digital health solutions are reshaping the healthcare landscape.",
        ],
        "finance" => &[
            "Fintech innovation is disrupting traditional banking and creating new career opportunities.",
            "Regulatory changes and digital transformation are reshaping the financial services industry.",
            "Data analytics and risk management skills are increasingly valuable in finance.",
        ],
        _ => &[
            "The technology sector continues to experience rapid growth with increasing demand for AI and cloud computing professionals.",
            "Digital transformation across industries is driving unprecedented demand for tech talent.",
            "Remote work adoption has expanded the talent pool and increased competition for top tech roles.",
        ],
    }
}

fn role_clause(title: &str) -> &'static str {
    let title = title.to_lowercase();
    if title.contains("engineer") {
        " Engineering roles are particularly in demand with strong technical skills being highly valued."
    } else if title.contains("analyst") {
        " Data-driven decision making is increasing the importance of analytical roles."
    } else if title.contains("manager") {
        " Leadership and management skills are becoming increasingly important in this field."
    } else {
        " Specialized skills and experience are key differentiators in this competitive market."
    }
}

fn salary_trend(score: f64, senior: bool) -> &'static str {
    if score >= HIGH_SCORE_THRESHOLD {
        if senior {
            "Significant salary increases expected, especially for senior roles"
        } else {
            "Strong salary growth with competitive compensation packages"
        }
    } else if score >= MEDIUM_SCORE_THRESHOLD {
        "Moderate salary growth with stable compensation trends"
    } else {
        "Salary growth may be limited, focus on skill development"
    }
}

fn future_outlook(industry: &str, score: f64) -> String {
    let prefix = if score >= HIGH_SCORE_THRESHOLD {
        "Excellent long-term prospects with strong growth potential. "
    } else if score >= MEDIUM_SCORE_THRESHOLD {
        "Positive outlook with steady growth expected. "
    } else {
        "Challenging market conditions, focus on skill differentiation. "
    };
    let suffix = match industry {
        "tech" => "Technology continues to evolve rapidly, creating new opportunities.",
        "healthcare" => "Healthcare sector remains stable with growing demand for specialized roles.",
        "finance" => "Financial services are adapting to digital transformation and regulatory changes.",
        _ => "Industry trends suggest continued evolution and adaptation.",
    };
    format!("{}{}", prefix, suffix)
}

/// Shuffle and keep 3 to 5 entries
fn sample<R: Rng + ?Sized>(items: &[&str], rng: &mut R) -> Vec<String> {
    let mut pool: Vec<String> = items.iter().map(|s| s.to_string()).collect();
    pool.shuffle(rng);
    let take = rng.gen_range(3..=5).min(pool.len());
    pool.truncate(take);
    pool
}

fn jitter<R: Rng + ?Sized>(rng: &mut R, spread: f64) -> f64 {
    rng.gen_range(-spread..=spread)
}

/// Local analyzer used when no completion provider is configured
pub struct TrendSynthesizer {
    rng: Mutex<StdRng>,
}

impl TrendSynthesizer {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Reproducible sequence of analyses
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn synthesize(&self, career: &Career) -> TrendAnalysis {
        match self.rng.lock() {
            Ok(mut rng) => Self::synthesize_with(career, &mut *rng),
            // Poisoned only if a previous caller panicked mid-draw; the state is still usable
            Err(poisoned) => Self::synthesize_with(career, &mut *poisoned.into_inner()),
        }
    }

    pub fn synthesize_with<R: Rng + ?Sized>(career: &Career, rng: &mut R) -> TrendAnalysis {
        let industry = career.industry.trim().to_ascii_lowercase();
        let profile = profile_for(&industry);
        let multiplier = career.level.multiplier();

        let trend_score = round1(clamp_score(profile.base_score + jitter(rng, SCORE_JITTER)));
        let growth_rate =
            round1((profile.growth_rate * multiplier + jitter(rng, GROWTH_JITTER)).max(0.0));

        let template = insight_templates(&industry)
            .choose(rng)
            .copied()
            .unwrap_or_default();
        let market_insights = format!("{}{}", template, role_clause(&career.title));

        let key_skills_trending = sample(profile.trending_skills, rng);
        let job_availability_score =
            round1(clamp_score(trend_score + jitter(rng, SCORE_JITTER)));
        let top_locations = sample(profile.top_locations, rng);
        let remote_work_trend =
            round1(clamp_score(profile.remote_work + jitter(rng, SCORE_JITTER)));
        let automation_risk =
            round1(clamp_score(profile.automation_risk + jitter(rng, AUTOMATION_JITTER)));
        let confidence_score = round1(rng.gen_range(CONFIDENCE_MIN..=CONFIDENCE_MAX));

        let currency = Currency::for_region(DEFAULT_REGION);

        TrendAnalysis {
            trend_score,
            trend_direction: TrendDirection::from_score(trend_score),
            demand_level: DemandLevel::from_score(trend_score),
            growth_rate,
            market_insights,
            key_skills_trending,
            salary_trend: salary_trend(trend_score, career.level.is_senior()).to_string(),
            job_availability_score,
            top_locations,
            remote_work_trend,
            industry_impact: profile.industry_impact.to_string(),
            automation_risk,
            future_outlook: future_outlook(&industry, trend_score),
            confidence_score,
            currency_code: currency.code().to_string(),
            salary_data: SalaryData::new((profile.base_salary * multiplier).round(), currency),
        }
    }
}

impl Default for TrendSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TrendAnalyzer for TrendSynthesizer {
    async fn analyze(&self, career: &Career) -> Result<TrendAnalysis> {
        Ok(self.synthesize(career))
    }

    fn name(&self) -> &str {
        "synthetic"
    }
}
