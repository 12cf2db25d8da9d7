//! Schema-checked prompt flows.
//!
//! Every flow runs the same pipeline: validate input, bind the prompt,
//! make one generative call, validate the output.

pub mod prediction;
pub mod summary;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{info, instrument};

use crate::client::truncate_for_log;
use crate::error::FlowError;
use crate::invoker::{invoke, GenerationRequest, TextGenerator};
use crate::prompt::PromptTemplate;
use crate::schema::Schema;

pub use prediction::{
    generate_match_predictions, predict, PredictionRequest, PredictionResponse,
    GENERATE_MATCH_PREDICTIONS,
};
pub use summary::{
    summarize, summarize_match_analysis, SummaryRequest, SummaryResponse,
    SUMMARIZE_MATCH_ANALYSIS,
};

#[derive(Debug, Clone, Copy)]
pub struct Flow {
    pub name: &'static str,
    pub input: Schema,
    pub output: Schema,
    pub template: PromptTemplate,
}

impl Flow {
    /// Bound template followed by the output field list generated from the
    /// output schema.
    pub fn render_prompt(&self, input: &Map<String, Value>) -> String {
        format!(
            "{}\n\nRespond with a JSON object containing exactly these fields:\n{}",
            self.template.bind(input),
            self.output.describe()
        )
    }

    #[instrument(skip(self, generator, input), fields(flow = self.name))]
    pub async fn run<G>(&self, generator: &G, input: &Value) -> Result<Map<String, Value>, FlowError>
    where
        G: TextGenerator + ?Sized,
    {
        let validated = self.input.validate_input(input)?;
        let prompt = self.render_prompt(&validated);

        info!(
            prompt_chars = prompt.chars().count(),
            prompt = %truncate_for_log(&prompt, 240),
            "Running flow"
        );

        invoke(
            generator,
            GenerationRequest {
                flow: self.name,
                prompt: &prompt,
                output: &self.output,
            },
        )
        .await
    }

    /// Run and decode into the flow's typed response.
    pub async fn run_typed<G, T>(&self, generator: &G, input: &Value) -> Result<T, FlowError>
    where
        G: TextGenerator + ?Sized,
        T: DeserializeOwned,
    {
        let output = self.run(generator, input).await?;
        serde_json::from_value(Value::Object(output))
            .map_err(|err| FlowError::mismatch(self.output.name, err.to_string()))
    }
}
