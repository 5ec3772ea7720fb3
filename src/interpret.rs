use std::sync::LazyLock;

use log::debug;
use regex::Regex;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::{GroundingSource, VideoAnalysis};

/// Responses shorter than this (after trimming) count as empty
pub const MIN_RESPONSE_CHARS: usize = 10;

pub const DEFAULT_CONTEXT: &str = "Information gathered from search results.";

static BLOCK_START: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(?:[1-3]\.|\*\*)").expect("valid regex"));
static SUMMARY_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^1\.\s*").expect("valid regex"));
static CONTEXT_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d\.\s*").expect("valid regex"));
static POINT_MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d\.").expect("valid regex"));
static POINT_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[- \d.]*").expect("valid regex"));

/// Raw citation record from the grounding metadata
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroundingChunk {
    pub web: Option<WebChunk>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebChunk {
    pub title: Option<String>,
    pub uri: Option<String>,
}

/// Turn free-form generated text plus citations into a structured analysis.
///
/// Never fails on degraded shapes: missing blocks fall back to an empty list
/// of key points or the default context. Only a (near) empty text is an error.
pub fn interpret(raw_text: &str, chunks: &[GroundingChunk]) -> Result<VideoAnalysis> {
    let text = raw_text.trim();
    if text.chars().count() < MIN_RESPONSE_CHARS {
        return Err(Error::EmptyResponse);
    }

    let blocks = split_blocks(raw_text);
    debug!("Response split into {} blocks", blocks.len());

    let summary = blocks
        .first()
        .map(|b| SUMMARY_PREFIX.replace(b, "").trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| text.to_string());

    let key_points = blocks.get(1).map(|b| extract_key_points(b)).unwrap_or_default();

    let context = blocks
        .get(2)
        .map(|b| CONTEXT_PREFIX.replace(b.trim(), "").trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_CONTEXT.to_string());

    Ok(VideoAnalysis {
        summary,
        key_points,
        context,
        sources: web_sources(chunks),
    })
}

/// Keep web citations with a URI, in input order
pub fn web_sources(chunks: &[GroundingChunk]) -> Vec<GroundingSource> {
    chunks
        .iter()
        .filter_map(|c| {
            let web = c.web.as_ref()?;
            let uri = web.uri.as_deref().filter(|u| !u.is_empty())?;
            Some(GroundingSource {
                title: web.title.clone(),
                uri: uri.to_string(),
            })
        })
        .collect()
}

/// Split at every line (after the first) that opens with `1.`-`3.` or `**`.
fn split_blocks(text: &str) -> Vec<String> {
    let mut blocks: Vec<Vec<&str>> = Vec::new();
    for (i, line) in text.split('\n').enumerate() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if i == 0 || BLOCK_START.is_match(line) {
            blocks.push(vec![line]);
        } else if let Some(current) = blocks.last_mut() {
            current.push(line);
        }
    }
    blocks.into_iter().map(|lines| lines.join("\n")).collect()
}

fn extract_key_points(block: &str) -> Vec<String> {
    block
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with('-') || POINT_MARKER.is_match(line))
        .map(|line| POINT_PREFIX.replace(line, "").trim().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn web(title: Option<&str>, uri: &str) -> GroundingChunk {
        GroundingChunk {
            web: Some(WebChunk {
                title: title.map(str::to_string),
                uri: Some(uri.to_string()),
            }),
        }
    }

    #[test]
    fn test_three_blocks() {
        let raw = "1. This video is about X.\n2. - Point A\n- Point B\n3. Extra context.";
        let analysis = interpret(raw, &[]).unwrap();
        assert_eq!(analysis.summary, "This video is about X.");
        assert_eq!(analysis.key_points, vec!["Point A", "Point B"]);
        assert_eq!(analysis.context, "Extra context.");
        assert!(analysis.sources.is_empty());
    }

    #[test]
    fn test_single_paragraph() {
        let raw = "A talk about Rust ownership and why borrowing matters.";
        let analysis = interpret(raw, &[]).unwrap();
        assert_eq!(analysis.summary, raw);
        assert!(analysis.key_points.is_empty());
        assert_eq!(analysis.context, DEFAULT_CONTEXT);
    }

    #[test]
    fn test_two_blocks_default_context() {
        let raw = "1. Summary here.\n2. Takeaways:\n- First\n- Second";
        let analysis = interpret(raw, &[]).unwrap();
        assert_eq!(analysis.summary, "Summary here.");
        // The numbered heading line is itself a marker line
        assert_eq!(analysis.key_points, vec!["Takeaways:", "First", "Second"]);
        assert_eq!(analysis.context, DEFAULT_CONTEXT);
    }

    #[test]
    fn test_bold_markers_split() {
        let raw = "Intro to the video.\n**Key points**\n- One\n  - Two\nnot a point\n**Context**\nSome news.";
        let analysis = interpret(raw, &[]).unwrap();
        assert_eq!(analysis.summary, "Intro to the video.");
        assert_eq!(analysis.key_points, vec!["One", "Two"]);
        assert_eq!(analysis.context, "**Context**\nSome news.");
    }

    #[test]
    fn test_numbered_lines_open_blocks() {
        let raw = "Summary line here\n2. Points\n1. alpha\n- 2024 was big\n";
        let analysis = interpret(raw, &[]).unwrap();
        assert_eq!(analysis.key_points, vec!["Points"]);
        assert_eq!(analysis.context, "alpha\n- 2024 was big");
    }

    #[test]
    fn test_point_prefix_strips_leading_digits() {
        let raw = "Summary line here\n**Points**\n- 2024 was big\n7. seventh\n12. not a marker";
        let analysis = interpret(raw, &[]).unwrap();
        assert_eq!(analysis.key_points, vec!["was big", "seventh"]);
    }

    #[test]
    fn test_indented_marker_does_not_split() {
        let raw = "First block text\n  2. indented\n- still first";
        let analysis = interpret(raw, &[]).unwrap();
        assert_eq!(analysis.summary, raw);
        assert!(analysis.key_points.is_empty());
    }

    #[test]
    fn test_extra_blocks_ignored() {
        let raw = "1. S is long enough\n2. - p\n3. ctx\n**More**\nignored";
        let analysis = interpret(raw, &[]).unwrap();
        assert_eq!(analysis.context, "ctx");
    }

    #[test]
    fn test_crlf_lines() {
        let raw = "1. Summary text.\r\n2. - A\r\n- B\r\n3. Ctx.";
        let analysis = interpret(raw, &[]).unwrap();
        assert_eq!(analysis.summary, "Summary text.");
        assert_eq!(analysis.key_points, vec!["A", "B"]);
        assert_eq!(analysis.context, "Ctx.");
    }

    #[test]
    fn test_empty_first_block_falls_back_to_text() {
        let raw = "\n**Heading**\n- a point";
        let analysis = interpret(raw, &[]).unwrap();
        assert_eq!(analysis.summary, raw.trim());
    }

    #[test]
    fn test_empty_response() {
        assert_eq!(interpret("", &[]), Err(Error::EmptyResponse));
        assert_eq!(interpret("short", &[]), Err(Error::EmptyResponse));
        assert_eq!(interpret("   short   \n", &[]), Err(Error::EmptyResponse));
    }

    #[test]
    fn test_min_length_boundary() {
        assert!(interpret("0123456789", &[]).is_ok());
        assert!(interpret("012345678", &[]).is_err());
    }

    #[test]
    fn test_non_web_citations_dropped() {
        let chunks = vec![GroundingChunk::default(), GroundingChunk { web: None }];
        let analysis = interpret("A reasonably long summary.", &chunks).unwrap();
        assert!(analysis.sources.is_empty());
    }

    #[test]
    fn test_citation_order_preserved() {
        let chunks = vec![
            web(Some("B"), "https://b.example"),
            GroundingChunk::default(),
            web(None, "https://a.example"),
            GroundingChunk {
                web: Some(WebChunk {
                    title: Some("no uri".to_string()),
                    uri: None,
                }),
            },
            web(Some("C"), "https://c.example"),
        ];
        let sources = web_sources(&chunks);
        let uris: Vec<_> = sources.iter().map(|s| s.uri.as_str()).collect();
        assert_eq!(uris, vec!["https://b.example", "https://a.example", "https://c.example"]);
        assert_eq!(sources[1].title, None);
    }
}
