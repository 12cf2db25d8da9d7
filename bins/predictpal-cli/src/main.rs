#[cfg(any(feature = "genai", feature = "schedule"))]
use anyhow::Context;
use anyhow::Result;
use clap::{Parser, Subcommand};
use predictpal_core::AppConfig;
#[cfg(feature = "schedule")]
use predictpal_core::Language;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "predictpal-cli", about = "PredictPal backend command-line tool", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Generate a match prediction
    #[cfg(feature = "genai")]
    Predict {
        /// Free-text match details (stats, form, context)
        #[arg(long, short = 'd', conflicts_with = "json", required_unless_present = "json")]
        details: Option<String>,
        /// Raw flow input as JSON, e.g. '{"matchDetails":"..."}'
        #[arg(long)]
        json: Option<String>,
    },
    /// Summarize a match analysis
    #[cfg(feature = "genai")]
    Summarize {
        /// Free-text match analysis
        #[arg(long, short = 'a', conflicts_with = "json", required_unless_present = "json")]
        analysis: Option<String>,
        /// Raw flow input as JSON, e.g. '{"matchAnalysis":"..."}'
        #[arg(long)]
        json: Option<String>,
    },
    /// Print the club tournament schedule
    #[cfg(feature = "schedule")]
    Schedule {
        /// Content language (en or es); defaults to PREDICTPAL_DEFAULT_LANGUAGE
        #[arg(long, short = 'l')]
        lang: Option<Language>,
        /// Only print one day (YYYY-MM-DD)
        #[arg(long)]
        date: Option<chrono::NaiveDate>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;
    let cli = Cli::parse();
    #[cfg_attr(not(any(feature = "genai", feature = "schedule")), allow(unused_variables))]
    let config = AppConfig::load_from_env()?;

    match cli.command {
        #[cfg(feature = "genai")]
        Commands::Predict { details, json } => {
            let input = flow_input("matchDetails", details, json)?;
            handle_predict(&config, input).await?
        }
        #[cfg(feature = "genai")]
        Commands::Summarize { analysis, json } => {
            let input = flow_input("matchAnalysis", analysis, json)?;
            handle_summarize(&config, input).await?
        }
        #[cfg(feature = "schedule")]
        Commands::Schedule { lang, date } => {
            let language = lang.unwrap_or(config.default_language);
            print!("{}", render_schedule(language, date)?);
        }
    }

    Ok(())
}

fn init_tracing() -> Result<()> {
    if tracing::subscriber::set_global_default(
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .finish(),
    )
    .is_err()
    {
        // tracing already initialised; ignore.
    }
    Ok(())
}

/// Either wrap the plain-text argument under `field` or parse the raw JSON.
#[cfg(feature = "genai")]
fn flow_input(field: &str, text: Option<String>, raw: Option<String>) -> Result<serde_json::Value> {
    match (text, raw) {
        (Some(text), _) => Ok(serde_json::json!({ field: text })),
        (None, Some(raw)) => serde_json::from_str(&raw).context("--json is not valid JSON"),
        (None, None) => anyhow::bail!("either the text argument or --json is required"),
    }
}

#[cfg(feature = "genai")]
async fn handle_predict(config: &AppConfig, input: serde_json::Value) -> Result<()> {
    use genai::{generate_match_predictions, GenAiClient};

    let client = GenAiClient::from_app_config(config)?;
    let prediction = generate_match_predictions(&client, &input)
        .await
        .context("prediction unavailable")?;
    println!("{}", serde_json::to_string_pretty(&prediction)?);
    Ok(())
}

#[cfg(feature = "genai")]
async fn handle_summarize(config: &AppConfig, input: serde_json::Value) -> Result<()> {
    use genai::{summarize_match_analysis, GenAiClient};

    let client = GenAiClient::from_app_config(config)?;
    let summary = summarize_match_analysis(&client, &input)
        .await
        .context("summary unavailable")?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

#[cfg(feature = "schedule")]
fn render_schedule(language: Language, date: Option<chrono::NaiveDate>) -> Result<String> {
    use std::fmt::Write;

    let page = schedule::catalogue()?.page(language);
    let days: Vec<_> = match date {
        Some(date) => vec![page
            .day(date)
            .with_context(|| format!("no schedule for {date}"))?],
        None => page.schedule.iter().collect(),
    };

    let mut out = String::new();
    writeln!(out, "{}", page.page_title)?;
    for day in days {
        let view = page.day_view(day);
        writeln!(out, "\n== {} ==", view.label)?;
        if let Some(message) = &view.empty_message {
            writeln!(out, "  {message}")?;
        }
        for fixture in &view.matches {
            let score = match (fixture.fixture.team1.score, fixture.fixture.team2.score) {
                (Some(home), Some(away)) => format!(" {home}-{away}"),
                _ => String::new(),
            };
            writeln!(
                out,
                "  {} | {} {} {}{} [{}]",
                fixture.fixture.time,
                fixture.fixture.team1.name,
                page.match_card.vs,
                fixture.fixture.team2.name,
                score,
                fixture.status_label
            )?;
            writeln!(out, "    {}: {}", page.match_card.venue, fixture.fixture.venue)?;
        }
    }
    Ok(out)
}
