use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser)]
#[command(
    name = "ytgist",
    about = "Summarize a YouTube video with search-grounded Gemini",
    version = env!("GIT_DESCRIBE"),
)]
pub struct Cli {
    /// YouTube video URL (starts an interactive session on stdin if omitted)
    pub url: Option<String>,

    /// Output format: text (default), json
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Gemini model used for the analysis
    #[arg(short, long)]
    pub model: Option<String>,

    /// Generation temperature
    #[arg(short, long)]
    pub temperature: Option<f32>,

    /// Write output to file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Only resolve the video and print its links
    #[arg(long)]
    pub links_only: bool,

    /// Show resolution details and request metadata
    #[arg(short, long)]
    pub verbose: bool,
}
