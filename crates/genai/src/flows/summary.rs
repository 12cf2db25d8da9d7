use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::Flow;
use crate::error::FlowError;
use crate::invoker::TextGenerator;
use crate::prompt::PromptTemplate;
use crate::schema::{FieldSpec, Schema};

pub const SUMMARIZE_MATCH_ANALYSIS: Flow = Flow {
    name: "summarizeMatchAnalysis",
    input: Schema::new(
        "SummarizeMatchAnalysisInput",
        &[FieldSpec::string(
            "matchAnalysis",
            "Detailed analysis of a match, including statistics, performance, and key moments.",
        )],
    ),
    output: Schema::new(
        "SummarizeMatchAnalysisOutput",
        &[FieldSpec::string(
            "summary",
            "A concise summary of the key insights from the match analysis, highlighting crucial factors influencing the match outcome.",
        )],
    ),
    template: PromptTemplate::new(
        "summarizeMatchAnalysisPrompt",
        concat!(
            "You are an expert match analyst. Please provide a concise summary of the following ",
            "match analysis, highlighting the key insights and crucial factors that influenced ",
            "the match outcome. The summary should be easily understandable and help the user ",
            "refine their betting strategies.\n\n",
            "Match Analysis: {{{matchAnalysis}}}",
        ),
    ),
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRequest {
    pub match_analysis: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SummaryResponse {
    pub summary: String,
}

/// Condense free-text match analysis.
pub async fn summarize_match_analysis<G>(
    generator: &G,
    input: &Value,
) -> Result<SummaryResponse, FlowError>
where
    G: TextGenerator + ?Sized,
{
    SUMMARIZE_MATCH_ANALYSIS.run_typed(generator, input).await
}

pub async fn summarize<G>(generator: &G, request: &SummaryRequest) -> Result<SummaryResponse, FlowError>
where
    G: TextGenerator + ?Sized,
{
    summarize_match_analysis(generator, &json!({ "matchAnalysis": request.match_analysis })).await
}
