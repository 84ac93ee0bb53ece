//! Donation recommendation flow.
//!
//! The catalogue search is the tool; a generative model, when configured,
//! ranks its results. Any model failure falls back to the plain search
//! result so the endpoint always answers.

use async_trait::async_trait;
use domain::models::recommendation::{
    CampaignSummary, RecommendationInput, RecommendationOutput, RecommendationSource,
};
use domain::services::recommendation::{build_prompt, find_campaigns, parse_model_titles, resolve_titles};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use validator::Validate;

use super::ServiceError;
use crate::config::AiConfig;
use crate::middleware::metrics::record_recommendation;

/// A text-in, text-out generative model.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, ServiceError>;
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

/// Client for a `models/<model>:generateContent` REST endpoint.
pub struct GenerateContentClient {
    client: Client,
    url: String,
    api_key: String,
}

impl GenerateContentClient {
    pub fn new(config: &AiConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            client,
            url: format!(
                "{}/models/{}:generateContent",
                config.endpoint.trim_end_matches('/'),
                config.model
            ),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl GenerativeModel for GenerateContentClient {
    async fn generate(&self, prompt: &str) -> Result<String, ServiceError> {
        let body = GenerateRequest {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(&self.url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| ServiceError::Upstream(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Upstream(format!("model returned {}", status)));
        }

        let answer: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::Upstream(e.to_string()))?;

        let text: String = answer
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(ServiceError::Upstream("model returned no text".to_string()));
        }
        Ok(text)
    }
}

#[derive(Clone, Default)]
pub struct Recommender {
    model: Option<Arc<dyn GenerativeModel>>,
}

impl Recommender {
    pub fn new(model: Option<Arc<dyn GenerativeModel>>) -> Self {
        Self { model }
    }

    /// Uses the generateContent client when `ai.enabled` is set.
    pub fn from_config(config: &AiConfig) -> Result<Self, reqwest::Error> {
        if !config.enabled {
            return Ok(Self::default());
        }
        let client: Arc<dyn GenerativeModel> = Arc::new(GenerateContentClient::new(config)?);
        Ok(Self::new(Some(client)))
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    pub async fn recommend(
        &self,
        input: &RecommendationInput,
    ) -> Result<RecommendationOutput, ServiceError> {
        input.validate()?;
        let candidates = find_campaigns(&input.preferences);

        let Some(model) = &self.model else {
            return Ok(Self::catalogue_answer(candidates));
        };
        if candidates.is_empty() {
            return Ok(Self::catalogue_answer(candidates));
        }

        let prompt = build_prompt(&input.donation_history, &input.preferences, &candidates);
        let answer = match model.generate(&prompt).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!(error = %e, "Recommendation model failed, using catalogue search");
                return Ok(Self::catalogue_answer(candidates));
            }
        };

        let ranked = parse_model_titles(&answer)
            .map(|titles| resolve_titles(&titles, &candidates))
            .unwrap_or_default();
        if ranked.is_empty() {
            warn!(answer_len = answer.len(), "Model answer named no known campaign");
            return Ok(Self::catalogue_answer(candidates));
        }

        info!(candidates = candidates.len(), picked = ranked.len(), "Recommendations ranked by model");
        record_recommendation("model");
        Ok(RecommendationOutput {
            recommendations: ranked,
            source: RecommendationSource::Model,
        })
    }

    fn catalogue_answer(candidates: Vec<CampaignSummary>) -> RecommendationOutput {
        record_recommendation("catalogue");
        RecommendationOutput {
            recommendations: candidates,
            source: RecommendationSource::Catalogue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::recommendation::DonationHistoryItem;

    struct FixedModel(Result<String, String>);

    #[async_trait]
    impl GenerativeModel for FixedModel {
        async fn generate(&self, _prompt: &str) -> Result<String, ServiceError> {
            self.0.clone().map_err(ServiceError::Upstream)
        }
    }

    fn with_model(answer: Result<&str, &str>) -> Recommender {
        let model = FixedModel(answer.map(str::to_string).map_err(str::to_string));
        Recommender::new(Some(Arc::new(model)))
    }

    fn input(preferences: &str) -> RecommendationInput {
        RecommendationInput {
            donation_history: vec![DonationHistoryItem {
                campaign: "Winter Blanket Drive".to_string(),
                amount: 500.0,
            }],
            preferences: preferences.to_string(),
        }
    }

    #[tokio::test]
    async fn test_without_model_returns_catalogue_search() {
        let output = Recommender::default().recommend(&input("EDUCATION")).await.unwrap();

        assert_eq!(output.source, RecommendationSource::Catalogue);
        assert_eq!(output.recommendations.len(), 2);
        assert!(output.recommendations.iter().all(|c| c.category == "education"));
    }

    #[tokio::test]
    async fn test_blank_preference_returns_whole_catalogue() {
        let output = Recommender::default().recommend(&input("  ")).await.unwrap();
        assert_eq!(output.recommendations.len(), domain::services::recommendation::catalogue().len());
    }

    #[tokio::test]
    async fn test_model_order_is_kept() {
        let recommender = with_model(Ok(
            "```json\n[\"Mobile Medical Camp\", \"clean water wells\", \"Made-up Fund\"]\n```",
        ));
        let output = recommender.recommend(&input("health")).await.unwrap();

        assert_eq!(output.source, RecommendationSource::Model);
        let titles: Vec<&str> = output.recommendations.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Mobile Medical Camp", "Clean Water Wells"]);
    }

    #[tokio::test]
    async fn test_model_failure_falls_back() {
        let output = with_model(Err("timeout")).recommend(&input("health")).await.unwrap();
        assert_eq!(output.source, RecommendationSource::Catalogue);
        assert_eq!(output.recommendations.len(), 2);

        let output = with_model(Ok("I cannot help with that"))
            .recommend(&input("health"))
            .await
            .unwrap();
        assert_eq!(output.source, RecommendationSource::Catalogue);
    }

    #[tokio::test]
    async fn test_overlong_preferences_rejected() {
        let err = Recommender::default()
            .recommend(&input(&"x".repeat(501)))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }
}
