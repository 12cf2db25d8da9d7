use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::Flow;
use crate::error::FlowError;
use crate::invoker::TextGenerator;
use crate::prompt::PromptTemplate;
use crate::schema::{FieldSpec, Schema};

pub const GENERATE_MATCH_PREDICTIONS: Flow = Flow {
    name: "generateMatchPredictions",
    input: Schema::new(
        "GenerateMatchPredictionsInput",
        &[FieldSpec::string(
            "matchDetails",
            "Detailed information about the upcoming match, including team or player statistics, recent performance, and any relevant news or factors.",
        )],
    ),
    output: Schema::new(
        "GenerateMatchPredictionsOutput",
        &[
            FieldSpec::string(
                "prediction",
                "The AI-generated prediction for the match outcome.",
            ),
            FieldSpec::string(
                "confidenceLevel",
                "The confidence level of the prediction, expressed as a percentage.",
            ),
            FieldSpec::string(
                "rationale",
                "A detailed explanation of the factors and analysis that led to the prediction.",
            ),
        ],
    ),
    template: PromptTemplate::new(
        "generateMatchPredictionsPrompt",
        concat!(
            "You are an expert in predicting the outcomes of sports matches. ",
            "Based on the provided match details, generate a prediction, a confidence level ",
            "(as a percentage), and a detailed rationale for your prediction.\n\n",
            "Match Details: {{{matchDetails}}}\n\n",
            "Prediction: \n",
            "Confidence Level: \n",
            "Rationale: ",
        ),
    ),
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRequest {
    pub match_details: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResponse {
    pub prediction: String,
    /// Free text such as "70%"; not range-checked.
    pub confidence_level: String,
    pub rationale: String,
}

/// Forecast a match from free-text details.
pub async fn generate_match_predictions<G>(
    generator: &G,
    input: &Value,
) -> Result<PredictionResponse, FlowError>
where
    G: TextGenerator + ?Sized,
{
    GENERATE_MATCH_PREDICTIONS.run_typed(generator, input).await
}

pub async fn predict<G>(generator: &G, request: &PredictionRequest) -> Result<PredictionResponse, FlowError>
where
    G: TextGenerator + ?Sized,
{
    generate_match_predictions(generator, &json!({ "matchDetails": request.match_details })).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_places_details_before_blank_sections() {
        let input = json!({"matchDetails": "Team A vs Team B"});
        let prompt = GENERATE_MATCH_PREDICTIONS
            .template
            .bind(input.as_object().unwrap());
        let details = prompt.find("Match Details: Team A vs Team B").unwrap();
        let prediction = prompt.find("Prediction: \n").unwrap();
        let confidence = prompt.find("Confidence Level: \n").unwrap();
        let rationale = prompt.find("Rationale: ").unwrap();
        assert!(details < prediction && prediction < confidence && confidence < rationale);
    }

    #[test]
    fn response_uses_camel_case_wire_names() {
        let response = PredictionResponse {
            prediction: "Home win".into(),
            confidence_level: "70%".into(),
            rationale: "Form".into(),
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["confidenceLevel"], "70%");
        assert_eq!(
            GENERATE_MATCH_PREDICTIONS.output.check(&value).unwrap().len(),
            3
        );
    }
}
