use colored::Colorize;

use crate::api::{Recommendation, RecommendResponse};
use crate::utils;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusTone {
    Neutral,
    Success,
    Error,
}

/// Presentation surface for one search interaction: a single status line
/// plus a result table. Mirrors the two regions the search page mutates.
pub trait SearchView {
    fn set_status(&self, text: &str, tone: StatusTone);
    fn clear_results(&self);
    fn append_row(&self, rank: usize, recommendation: &Recommendation);
}

/// Renders the status line and result rows to the terminal.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleView;

impl ConsoleView {
    pub fn new(no_color: bool) -> Self {
        if no_color {
            colored::control::set_override(false);
        }
        Self
    }
}

impl SearchView for ConsoleView {
    fn set_status(&self, text: &str, tone: StatusTone) {
        let rendered = match tone {
            StatusTone::Neutral => text.normal(),
            StatusTone::Success => text.bold().green(),
            StatusTone::Error => text.bold().red(),
        };
        println!(":: {rendered}");
    }

    fn clear_results(&self) {
        // A terminal scrolls instead of repainting; rows from a previous
        // search are already out of the live region.
    }

    fn append_row(&self, rank: usize, recommendation: &Recommendation) {
        println!(
            "{:>4}  {}  {}  {}  {}",
            rank.to_string().bold().white(),
            utils::truncate_cell(&recommendation.assessment_name, 48)
                .bold()
                .cyan(),
            utils::format_score(recommendation.score).bold().yellow(),
            utils::truncate_cell(&recommendation.test_type, 32),
            utils::truncate_cell(&recommendation.skills_tags, 48),
        );
        println!("      {}", recommendation.canonical_url.blue());
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "text" | "txt" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

pub fn infer_format_from_path(path: &str) -> Option<OutputFormat> {
    let lower = path.trim().to_lowercase();
    if lower.ends_with(".json") {
        return Some(OutputFormat::Json);
    }
    if lower.ends_with(".txt") {
        return Some(OutputFormat::Text);
    }
    None
}

pub fn render_text(response: &RecommendResponse) -> Vec<u8> {
    let mut out = String::new();
    for (i, r) in response.recommendations.iter().enumerate() {
        out.push_str(&format!(
            "{}\t{}\t{}\t{}\t{}\t{}\n",
            i + 1,
            r.assessment_name,
            r.canonical_url,
            r.test_type,
            r.skills_tags,
            utils::format_score(r.score),
        ));
    }
    out.into_bytes()
}

pub fn render_json(response: &RecommendResponse) -> Vec<u8> {
    serde_json::to_vec_pretty(response).unwrap_or_else(|_| b"{}\n".to_vec())
}
