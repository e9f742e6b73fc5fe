//! Static placeholder content served when no Gemini API key is configured.

use crate::models::analysis::{AnalysisResult, Percentage, Recommendation, RecommendationType};

fn pct(value: u8) -> Percentage {
    Percentage::saturating(value)
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn mock_analysis() -> AnalysisResult {
    AnalysisResult {
        score: pct(72),
        strengths: strings(&[
            "Strong technical skills in JavaScript and React",
            "Clear work experience section with quantifiable achievements",
            "Well-structured resume format that is easy to follow",
            "Demonstrates leadership experience and teamwork capabilities",
        ]),
        improvements: strings(&[
            "Add more specific metrics and achievements",
            "Tailor your resume for each specific job application",
            "Consider adding a skills section for better keyword matching",
            "Include relevant certifications or continuing education",
        ]),
        keyword_match: pct(65),
        ats_compatibility: pct(78),
        skill_recommendations: strings(&[
            "Cloud infrastructure (AWS/Azure/GCP)",
            "CI/CD pipelines",
            "GraphQL",
            "TypeScript",
            "Docker and containerization",
        ]),
        market_trends: Some(strings(&[
            "AI/ML integration skills are highly sought after",
            "Cloud-native development experience",
            "DevOps and infrastructure as code knowledge",
            "Data visualization and analytics",
        ])),
    }
}

pub fn mock_recommendations() -> Vec<Recommendation> {
    vec![
        Recommendation {
            id: "1".to_string(),
            kind: RecommendationType::Skill,
            title: "Learn Docker and Containerization".to_string(),
            description: "Container skills are in high demand. Adding Docker would strengthen your profile significantly.".to_string(),
            relevance_score: pct(94),
            link: Some("https://www.docker.com/get-started/".to_string()),
            link_text: Some("Start Learning Docker".to_string()),
            tags: strings(&["DevOps", "Container", "High Demand"]),
        },
        Recommendation {
            id: "2".to_string(),
            kind: RecommendationType::Course,
            title: "Advanced TypeScript for React Developers".to_string(),
            description: "TypeScript skills with React are increasingly required in job postings.".to_string(),
            relevance_score: pct(91),
            link: Some("https://www.typescriptlang.org/docs/".to_string()),
            link_text: Some("Explore TypeScript".to_string()),
            tags: strings(&["Frontend", "TypeScript", "Market Trend"]),
        },
        Recommendation {
            id: "3".to_string(),
            kind: RecommendationType::Skill,
            title: "Add Cloud Platform Experience".to_string(),
            description: "AWS, Azure or GCP experience is mentioned in 78% of relevant job postings.".to_string(),
            relevance_score: pct(89),
            link: Some("https://aws.amazon.com/getting-started/".to_string()),
            link_text: Some("Learn Cloud Platforms".to_string()),
            tags: strings(&["Cloud", "Infrastructure", "Growing Field"]),
        },
    ]
}
