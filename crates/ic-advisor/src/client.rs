//! Recommendation client: one structured-generation call, then parse and
//! validate.

use std::sync::Arc;

use ic_protocol::{ApplianceSet, EnvironmentSnapshot, RecommendationResult};
use serde_json::Value;

use crate::error::AdvisorResult;
use crate::extract::first_json_object;
use crate::model::GenerativeModel;
use crate::prompt;
use crate::schema::{RecommendationContract, build_schema};

/// Issues recommendation requests against a model handle.
#[derive(Clone)]
pub struct RecommendationClient {
    model: Arc<dyn GenerativeModel>,
}

impl RecommendationClient {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }

    /// Ask the model for settings satisfying `contract`.
    ///
    /// Never retries. Transport, parse and validation failures come back as
    /// distinct [`AdvisorError`](crate::AdvisorError) kinds.
    pub async fn get_recommendation(
        &self,
        prompt: &str,
        contract: &RecommendationContract,
    ) -> AdvisorResult<RecommendationResult> {
        let schema = contract.to_response_schema();
        let result = self.call(prompt, contract, &schema).await;

        match &result {
            Ok(rec) => tracing::debug!(
                id = %rec.id,
                recheck_at = rec.recommendation.recheck_at,
                "recommendation validated"
            ),
            Err(e) => tracing::warn!(
                kind = %e.kind(),
                error = %e.detail(),
                model = %self.model.model_name(),
                "recommendation request failed"
            ),
        }
        result
    }

    async fn call(
        &self,
        prompt: &str,
        contract: &RecommendationContract,
        schema: &Value,
    ) -> AdvisorResult<RecommendationResult> {
        let text = self.model.generate(prompt, Some(schema)).await?;
        let object = first_json_object(&text)?;
        let recommendation = contract.validate(&Value::Object(object))?;
        Ok(RecommendationResult::new(recommendation))
    }

    /// Build the contract and prompt for an environment, then request.
    pub async fn recommend(
        &self,
        environment: &EnvironmentSnapshot,
        capabilities: &ApplianceSet,
    ) -> AdvisorResult<RecommendationResult> {
        let contract = build_schema(capabilities);
        let prompt = prompt::compose(environment, capabilities, &contract);
        self.get_recommendation(&prompt, &contract).await
    }
}
