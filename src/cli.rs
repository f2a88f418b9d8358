use clap::Parser;

use ytsum::config::FallbackKind;

#[derive(Parser)]
#[command(name = "ytsum", about = "YouTube video summarizer HTTP service", version)]
pub struct Cli {
    /// Address to bind, e.g. 0.0.0.0:5000
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Preferred caption language
    #[arg(short, long)]
    pub lang: Option<String>,

    /// Fallback strategy when no transcript is available
    #[arg(long, value_enum)]
    pub fallback: Option<FallbackKind>,

    /// Gemini model for summarization
    #[arg(long)]
    pub model: Option<String>,

    /// Per-request upstream timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}
