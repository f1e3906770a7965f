//! Trendline CLI - Command-line client for the Trendline daemon

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tabled::{Table, Tabled};

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:9527";

#[derive(Parser)]
#[command(name = "trendline")]
#[command(about = "Trendline career trend service CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// RPC server URL
    #[arg(long, env = "TRENDLINE_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Show daemon, scheduler and trend statistics
    Status,

    /// Run a refresh pass now and print its summary
    ForceRun,

    /// Job market listings
    Jobs {
        #[arg(short, long, default_value = "technology")]
        industry: String,

        #[arg(short, long, default_value = "United States")]
        location: String,

        #[arg(short = 'n', long, default_value = "20")]
        limit: u32,
    },

    /// Market trends, optionally restricted to industries
    Trends {
        /// Industry filter (repeatable)
        #[arg(short, long)]
        industry: Vec<String>,
    },

    /// Stored monthly trend analysis for a career
    Outlook {
        career_id: String,

        /// Language of the text fields
        #[arg(short, long, default_value = "en")]
        lang: String,
    },

    /// Skill demand data
    Skills {
        /// Single skill to look up
        #[arg(short, long)]
        name: Option<String>,
    },

    /// List careers
    Careers,

    /// Show one career document
    Career {
        career_id: String,

        /// Regenerate instead of reading the cached document
        #[arg(long)]
        refresh: bool,
    },

    /// Merge fields into a career document
    Update {
        career_id: String,

        /// JSON object of fields to merge
        #[arg(long)]
        json: String,
    },

    /// Market data for a career
    Market { career_id: String },

    /// Development roadmap between two levels
    Roadmap {
        career_id: String,

        #[arg(long)]
        from: String,

        #[arg(long)]
        to: String,

        /// Current skill (repeatable)
        #[arg(short, long)]
        skill: Vec<String>,
    },

    /// Search careers
    Search {
        /// Required skill (repeatable)
        #[arg(short, long)]
        skill: Vec<String>,

        #[arg(long)]
        min_salary: Option<i64>,

        #[arg(long)]
        max_salary: Option<i64>,

        #[arg(long)]
        level: Option<String>,

        #[arg(long)]
        category: Option<String>,
    },

    /// Ask the career assistant
    Chat {
        message: String,

        #[arg(short, long, default_value = "gpt-3.5-turbo")]
        model: String,
    },
}

#[derive(Serialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    method: String,
    params: Value,
    id: u64,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    result: Option<Value>,
    error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

#[derive(Deserialize)]
struct RunSummary {
    id: String,
    month_year: String,
    status: String,
    total_items: u32,
    processed_items: u32,
    success_count: u32,
    failure_count: u32,
    started_at: i64,
    ended_at: Option<i64>,
    #[serde(default)]
    errors: Vec<String>,
}

impl RunSummary {
    fn duration_minutes(&self) -> Option<f64> {
        self.ended_at
            .map(|end| (end - self.started_at) as f64 / 60_000.0)
    }
}

#[derive(Deserialize, Tabled)]
#[serde(rename_all = "camelCase")]
struct JobRow {
    title: String,
    #[serde(default)]
    company: String,
    #[serde(default)]
    location: String,
    #[serde(default, rename = "type")]
    #[tabled(rename = "type")]
    job_type: String,
    #[serde(default)]
    demand: String,
    #[serde(default)]
    #[tabled(rename = "growth %")]
    growth_rate: f64,
}

#[derive(Deserialize, Tabled)]
struct TrendingSkillRow {
    skill: String,
    #[serde(default)]
    demand: f64,
    #[serde(default)]
    growth: f64,
    #[serde(default)]
    salary: f64,
}

#[derive(Deserialize, Tabled)]
#[serde(rename_all = "camelCase")]
struct IndustryRow {
    industry: String,
    #[serde(default)]
    growth: f64,
    #[serde(default)]
    job_count: f64,
    #[serde(default)]
    avg_salary: f64,
}

#[derive(Deserialize, Tabled)]
#[serde(rename_all = "camelCase")]
struct SkillRow {
    skill: String,
    #[serde(default)]
    demand: f64,
    #[serde(default)]
    growth: f64,
    #[serde(default)]
    salary: f64,
    #[serde(default)]
    #[tabled(display_with = "join_list")]
    related_skills: Vec<String>,
}

#[derive(Tabled)]
struct CareerRow {
    id: String,
    title: String,
    industry: String,
}

impl CareerRow {
    fn from_document(doc: &Map<String, Value>) -> Self {
        let field = |name: &str| {
            doc.get(name)
                .and_then(Value::as_str)
                .unwrap_or("-")
                .to_string()
        };
        Self {
            id: field("id"),
            title: field("title"),
            industry: field("industry"),
        }
    }
}

#[derive(Deserialize)]
struct TrendSummary {
    career_id: String,
    trend_score: f64,
    trend_direction: String,
    demand_level: String,
    growth_rate: f64,
    #[serde(default)]
    market_insights: String,
    #[serde(default)]
    future_outlook: String,
    #[serde(default)]
    key_skills_trending: Vec<String>,
    next_update_due: i64,
}

fn print_trend(trend: &TrendSummary) {
    let direction = match trend.trend_direction.as_str() {
        "rising" => trend.trend_direction.green(),
        "declining" => trend.trend_direction.red(),
        _ => trend.trend_direction.normal(),
    };
    let due = chrono::DateTime::from_timestamp_millis(trend.next_update_due)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string());

    println!("{}", trend.career_id.cyan().bold());
    println!("  {} {:.1}/10 ({})", "Score:".bold(), trend.trend_score, direction);
    println!("  {} {}", "Demand:".bold(), trend.demand_level);
    println!("  {} {:.1}%", "Growth:".bold(), trend.growth_rate);
    println!("  {} {}", "Skills:".bold(), join_list(&trend.key_skills_trending));
    println!("  {} {}", "Next refresh:".bold(), due);
    println!();
    println!("  {}", trend.market_insights);
    println!("  {}", trend.future_outlook);
}

fn join_list(items: &[String]) -> String {
    items.join(", ")
}

async fn call_rpc(url: &str, method: &str, params: Value) -> Result<Value> {
    let request = JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        method: method.to_string(),
        params,
        id: 1,
    };

    let client = reqwest::Client::new();
    let response: JsonRpcResponse = client
        .post(url)
        .json(&request)
        .send()
        .await
        .context("Failed to connect to daemon")?
        .json()
        .await
        .context("Failed to parse response")?;

    if let Some(error) = response.error {
        anyhow::bail!("RPC error ({}): {}", error.code, error.message);
    }

    response
        .result
        .ok_or_else(|| anyhow::anyhow!("No result in response"))
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_run(run: &RunSummary) {
    let status = match run.status.as_str() {
        "completed" => run.status.green(),
        "completed_with_errors" => run.status.yellow(),
        "failed" => run.status.red(),
        _ => run.status.normal(),
    };
    println!("  {} {} ({})", "Run:".bold(), run.id, run.month_year);
    println!("  {} {}", "Status:".bold(), status);
    println!(
        "  {} {}/{} processed, {} ok, {} failed",
        "Items:".bold(),
        run.processed_items,
        run.total_items,
        run.success_count,
        run.failure_count
    );
    if let Some(minutes) = run.duration_minutes() {
        println!("  {} {:.2} min", "Duration:".bold(), minutes);
    }
    for error in &run.errors {
        println!("    {} {}", "✗".red(), error);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let url = cli.rpc_url.as_str();

    match cli.command {
        Commands::Status => {
            println!("{}", "System Status".cyan().bold());
            println!();

            match call_rpc(url, "admin.stats.v1", json!({})).await {
                Ok(stats) => {
                    println!("  {} {}", "RPC URL:".bold(), url);
                    println!("  {} {}", "Status:".bold(), "ONLINE".green());
                    println!();
                    let trends = &stats["trends"];
                    println!("  {} {}", "Careers:".bold(), trends["total_careers"]);
                    println!("  {} {}", "Tracked:".bold(), trends["tracked_trends"]);
                    println!("  {} {}", "Due:".bold(), trends["due_careers"]);
                    println!("  {} {}", "Industries:".bold(), trends["industries"]);
                    println!();
                    let scheduler = &stats["scheduler"];
                    let running = scheduler["running"].as_bool().unwrap_or(false);
                    println!(
                        "  {} {} ({})",
                        "Scheduler:".bold(),
                        if running { "RUNNING".green() } else { "IDLE".normal() },
                        scheduler["analyzer"].as_str().unwrap_or("-")
                    );
                    let cache = if stats["cache_enabled"].as_bool().unwrap_or(false) {
                        "enabled".green()
                    } else {
                        "disabled".yellow()
                    };
                    println!("  {} {}", "Cache:".bold(), cache);
                    println!("  {} {} seconds", "Uptime:".bold(), stats["uptime_seconds"]);

                    if !scheduler["last_run"].is_null() {
                        println!();
                        println!("{}", "Last Run".cyan().bold());
                        let run: RunSummary = serde_json::from_value(scheduler["last_run"].clone())?;
                        print_run(&run);
                    }
                }
                Err(e) => {
                    println!("  {} {}", "Status:".bold(), "ERROR".red());
                    println!("  {} {}", "Error:".bold(), e);
                }
            }
        }

        Commands::ForceRun => {
            println!("{}", "Running refresh pass...".cyan().bold());
            println!();
            let result = call_rpc(url, "admin.force_run.v1", json!({})).await?;
            let run: RunSummary = serde_json::from_value(result)?;
            print_run(&run);
        }

        Commands::Jobs {
            industry,
            location,
            limit,
        } => {
            let params = json!({ "industry": industry, "location": location, "limit": limit });
            let result = call_rpc(url, "jobs.market.v1", params).await?;
            let jobs: Vec<JobRow> = serde_json::from_value(result)?;
            println!("{}", format!("{} listings", jobs.len()).cyan().bold());
            println!("{}", Table::new(jobs));
        }

        Commands::Trends { industry } => {
            let params = if industry.is_empty() {
                json!({})
            } else {
                json!({ "industries": industry })
            };
            let result = call_rpc(url, "trends.market.v1", params).await?;

            let skills: Vec<TrendingSkillRow> =
                serde_json::from_value(result["trendingSkills"].clone()).unwrap_or_default();
            let industries: Vec<IndustryRow> =
                serde_json::from_value(result["industryInsights"].clone()).unwrap_or_default();

            println!("{}", "Trending Skills".cyan().bold());
            println!("{}", Table::new(skills));
            println!();
            println!("{}", "Industries".cyan().bold());
            println!("{}", Table::new(industries));
        }

        Commands::Outlook { career_id, lang } => {
            let params = json!({ "career_id": career_id, "language": lang });
            let result = call_rpc(url, "trends.career.v1", params).await?;
            let trend: TrendSummary = serde_json::from_value(result)?;
            print_trend(&trend);
        }

        Commands::Skills { name } => {
            let params = match name {
                Some(name) => json!({ "skill_name": name }),
                None => json!({}),
            };
            let result = call_rpc(url, "skills.data.v1", params).await?;
            let skills: Vec<SkillRow> = serde_json::from_value(result)?;
            println!("{}", Table::new(skills));
        }

        Commands::Careers => {
            let result = call_rpc(url, "careers.list.v1", json!({})).await?;
            let docs: Vec<Map<String, Value>> = serde_json::from_value(result)?;
            let rows: Vec<CareerRow> = docs.iter().map(CareerRow::from_document).collect();
            println!("{}", Table::new(rows));
        }

        Commands::Career { career_id, refresh } => {
            let method = if refresh {
                "careers.refresh.v1"
            } else {
                "careers.get.v1"
            };
            let result = call_rpc(url, method, json!({ "career_id": career_id })).await?;
            print_json(&result)?;
        }

        Commands::Update { career_id, json } => {
            let updates: Value = serde_json::from_str(&json).context("Invalid JSON updates")?;
            let params = json!({ "career_id": career_id, "updates": updates });
            let result = call_rpc(url, "careers.update.v1", params).await?;
            println!("{}", format!("✓ Career {} updated", career_id).green().bold());
            print_json(&result)?;
        }

        Commands::Market { career_id } => {
            let result = call_rpc(url, "careers.market.v1", json!({ "career_id": career_id }))
                .await?;
            print_json(&result)?;
        }

        Commands::Roadmap {
            career_id,
            from,
            to,
            skill,
        } => {
            let params = json!({
                "careerId": career_id,
                "currentLevel": from,
                "targetLevel": to,
                "skills": skill,
            });
            let result = call_rpc(url, "careers.roadmap.v1", params).await?;
            print_json(&result)?;
        }

        Commands::Search {
            skill,
            min_salary,
            max_salary,
            level,
            category,
        } => {
            let mut params = json!({ "skills": skill, "level": level, "category": category });
            if min_salary.is_some() || max_salary.is_some() {
                params["salary"] = json!({ "min": min_salary, "max": max_salary });
            }
            let result = call_rpc(url, "careers.search.v1", params).await?;
            let docs: Vec<Map<String, Value>> = serde_json::from_value(result)?;
            println!("{}", format!("{} matches", docs.len()).cyan().bold());
            let rows: Vec<CareerRow> = docs.iter().map(CareerRow::from_document).collect();
            println!("{}", Table::new(rows));
        }

        Commands::Chat { message, model } => {
            let params = json!({
                "model": model,
                "messages": [{ "role": "user", "content": message }],
            });
            let result = call_rpc(url, "chat.completions.v1", params).await?;
            let content = result["choices"][0]["message"]["content"]
                .as_str()
                .unwrap_or("(no reply)");
            println!("{}", content);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_roadmap() {
        let cli = Cli::try_parse_from([
            "trendline", "roadmap", "swe", "--from", "junior", "--to", "senior", "-s", "Rust",
            "-s", "SQL",
        ])
        .unwrap();
        match cli.command {
            Commands::Roadmap { skill, from, .. } => {
                assert_eq!(from, "junior");
                assert_eq!(skill, vec!["Rust", "SQL"]);
            }
            _ => panic!("expected roadmap"),
        }
        assert_eq!(cli.rpc_url, DEFAULT_RPC_URL);
    }

    #[test]
    fn test_run_summary_duration() {
        let run: RunSummary = serde_json::from_value(json!({
            "id": "r1",
            "month_year": "2024-06",
            "status": "completed",
            "started_at": 0,
            "ended_at": 90_000,
            "total_items": 3,
            "processed_items": 3,
            "success_count": 3,
            "failure_count": 0,
            "errors": []
        }))
        .unwrap();
        assert_eq!(run.duration_minutes(), Some(1.5));
    }

    #[test]
    fn test_trend_summary_reads_flattened_record() {
        let trend: TrendSummary = serde_json::from_value(json!({
            "career_id": "rn",
            "trend_score": 7.4,
            "trend_direction": "rising",
            "demand_level": "high",
            "growth_rate": 6.5,
            "market_insights": "Strong hiring.",
            "key_skills_trending": ["Telehealth"],
            "salary_trend": "up",
            "generated_at": 0,
            "next_update_due": 2_592_000_000i64
        }))
        .unwrap();
        assert_eq!(trend.key_skills_trending, vec!["Telehealth"]);
        assert!(trend.future_outlook.is_empty());
    }

    #[test]
    fn test_career_row_tolerates_missing_fields() {
        let doc: Map<String, Value> =
            serde_json::from_value(json!({ "id": "swe", "title": "Software Engineer" })).unwrap();
        let row = CareerRow::from_document(&doc);
        assert_eq!(row.industry, "-");
    }
}
