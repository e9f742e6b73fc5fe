// Resume analysis prompt templates.
// `{resume_text}` is replaced verbatim; no escaping or truncation.

pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"You are an expert resume analyzer and career coach. Analyze the following resume text and provide detailed feedback:

{resume_text}

Please provide the following in JSON format:
1. An overall score out of 100
2. Key strengths (list of 3-5 items)
3. Areas for improvement (list of 3-5 items)
4. Keyword match percentage for general job applications
5. ATS compatibility score as a percentage
6. Recommendations for skills to add or improve
7. Current market trends that align with this resume (list of 3-5 items)

Format the response as a valid JSON object with the following structure:
{
  "score": number,
  "strengths": string[],
  "improvements": string[],
  "keywordMatch": number,
  "atsCompatibility": number,
  "skillRecommendations": string[],
  "marketTrends": string[]
}
All numbers are integers between 0 and 100."#;

pub const RECOMMENDATIONS_PROMPT_TEMPLATE: &str = r#"Based on the following resume text, generate 5 personalized recommendations that include in-demand skills based on current market trends:

{resume_text}

Format the response as a valid JSON array with the following structure for each recommendation:
[
  {
    "id": "1",
    "type": "skill" | "course" | "job" | "connection",
    "title": string,
    "description": string,
    "relevanceScore": number,
    "link": string,
    "linkText": string,
    "tags": string[]
  }
]

Every "id" must be unique within the array. "relevanceScore" is an integer between 0 and 100.
For skills recommendations, focus on trending technologies and in-demand skills in the current job market.
Include market demand or trend information in the description when possible.
Ensure at least 3 of the recommendations are for skills that are currently trending in the job market."#;

const RESUME_TEXT_PLACEHOLDER: &str = "{resume_text}";

pub fn build_analysis_prompt(resume_text: &str) -> String {
    ANALYSIS_PROMPT_TEMPLATE.replacen(RESUME_TEXT_PLACEHOLDER, resume_text, 1)
}

pub fn build_recommendations_prompt(resume_text: &str) -> String {
    RECOMMENDATIONS_PROMPT_TEMPLATE.replacen(RESUME_TEXT_PLACEHOLDER, resume_text, 1)
}
