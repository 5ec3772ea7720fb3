use eyre::Result;

use crate::{VideoAnalysis, VideoId};

/// Player links for a resolved video
pub fn render_links(video_id: &VideoId) -> String {
    format!(
        "Video: {video_id}\nWatch: {}\nEmbed: {}",
        video_id.watch_url(),
        video_id.embed_url()
    )
}

/// Render an analysis as plain text sections
pub fn render_text(analysis: &VideoAnalysis) -> String {
    let mut out = format!("AI Summary\n{}\n", analysis.summary);

    if !analysis.key_points.is_empty() {
        out.push_str("\nKey Takeaways\n");
        for (idx, point) in analysis.key_points.iter().enumerate() {
            out.push_str(&format!("  {}. {point}\n", idx + 1));
        }
    }

    out.push_str(&format!("\nSearch Grounding Context\n{}\n", analysis.context));

    if !analysis.sources.is_empty() {
        out.push_str("\nSources & References\n");
        for source in &analysis.sources {
            out.push_str(&format!("  - {}: {}\n", source.label(), source.uri));
        }
    }

    out.trim_end().to_string()
}

/// Render an analysis, with its video links, as pretty JSON
pub fn render_json(video_id: &VideoId, analysis: &VideoAnalysis) -> Result<String> {
    let value = serde_json::json!({
        "videoId": video_id,
        "watchUrl": video_id.watch_url(),
        "embedUrl": video_id.embed_url(),
        "analysis": analysis,
    });
    Ok(serde_json::to_string_pretty(&value)?)
}
