pub mod client;
pub mod error;
pub mod flows;
pub mod invoker;
pub mod prompt;
pub mod schema;

pub use client::GenAiClient;
pub use error::FlowError;
pub use flows::{
    generate_match_predictions, predict, summarize, summarize_match_analysis, Flow,
    PredictionRequest, PredictionResponse, SummaryRequest, SummaryResponse,
};
pub use invoker::{invoke, GenerationRequest, TextGenerator};
pub use schema::{FieldSpec, FieldType, Schema};
