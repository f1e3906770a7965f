// Job-market detection for forwarded chat requests

use crate::domain::ChatRequest;

const JOB_MARKET_KEYWORDS: [&str; 6] = [
    "job",
    "position",
    "career",
    "employment",
    "hiring",
    "recruitment",
];
const KNOWN_INDUSTRIES: [&str; 5] = [
    "technology",
    "healthcare",
    "finance",
    "manufacturing",
    "education",
];
const KNOWN_LOCATIONS: [&str; 5] = ["united states", "remote", "new york", "california", "texas"];
const DEFAULT_LOCATION: &str = "United States";

fn lowered(request: &ChatRequest) -> String {
    request.joined_content().to_lowercase()
}

pub fn is_job_market_request(request: &ChatRequest) -> bool {
    let content = lowered(request);
    JOB_MARKET_KEYWORDS.iter().any(|k| content.contains(k))
}

pub fn extract_industry(request: &ChatRequest) -> Option<&'static str> {
    let content = lowered(request);
    KNOWN_INDUSTRIES.iter().copied().find(|i| content.contains(i))
}

pub fn extract_location(request: &ChatRequest) -> &'static str {
    let content = lowered(request);
    KNOWN_LOCATIONS
        .iter()
        .copied()
        .find(|l| content.contains(l))
        .unwrap_or(DEFAULT_LOCATION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ChatMessage;

    fn request(text: &str) -> ChatRequest {
        ChatRequest::new(
            "gpt-3.5-turbo",
            vec![ChatMessage::system("Be brief."), ChatMessage::user(text)],
        )
    }

    #[test]
    fn test_detection() {
        assert!(is_job_market_request(&request("Who is HIRING nurses?")));
        assert!(!is_job_market_request(&request("Tell me a joke")));
    }

    #[test]
    fn test_industry_and_location() {
        let req = request("Finance jobs in New York please");
        assert_eq!(extract_industry(&req), Some("finance"));
        assert_eq!(extract_location(&req), "new york");

        let req = request("any job openings?");
        assert_eq!(extract_industry(&req), None);
        assert_eq!(extract_location(&req), "United States");
    }
}
