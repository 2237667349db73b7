// ABOUTME: AI scoring seam for personalized recommendations
// ABOUTME: HTTP implementation posts the scoring request as JSON and decodes the ranked response
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::constants::scoring::SCORING_SERVICE_NAME;
use crate::errors::{AppError, AppResult};
use crate::models::{ScoringRequest, ScoringResponse};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// External AI scoring call
///
/// Implementations may fail, time out, or return fewer usable items than
/// requested; the generator treats all of those as recoverable.
#[async_trait]
pub trait RecommendationScorer: Send + Sync {
    /// Score exercises for one user
    async fn score(&self, request: &ScoringRequest) -> AppResult<ScoringResponse>;
}

/// Scorer backed by an HTTP endpoint
#[derive(Clone)]
pub struct HttpRecommendationScorer {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpRecommendationScorer {
    /// Create a scorer posting to `endpoint`
    ///
    /// `timeout` bounds the whole HTTP exchange. The generator applies its
    /// own timeout on top, so this only guards against hung connections.
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` if the HTTP client cannot be constructed
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::config(format!("Failed to build scoring client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
        })
    }
}

#[async_trait]
impl RecommendationScorer for HttpRecommendationScorer {
    async fn score(&self, request: &ScoringRequest) -> AppResult<ScoringResponse> {
        let mut builder = self.client.post(&self.endpoint).json(request);
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::scoring_unavailable(format!(
                "{SCORING_SERVICE_NAME} returned HTTP {status}"
            )));
        }

        let body: ScoringResponse = response.json().await?;
        debug!(
            user_id = %request.user_id,
            items = body.recommendations.len(),
            success = body.success,
            "Scoring response received"
        );
        Ok(body)
    }
}

/// Scorer used when no endpoint is configured; always unavailable
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledScorer;

#[async_trait]
impl RecommendationScorer for DisabledScorer {
    async fn score(&self, _request: &ScoringRequest) -> AppResult<ScoringResponse> {
        Err(AppError::scoring_unavailable(
            "no scoring endpoint configured",
        ))
    }
}
