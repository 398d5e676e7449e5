//! Prompt templates for every generation stage.
//!
//! Each builder takes domain inputs and returns a fully-formed prompt.
//! Stages with a structured contract carry a strict output-format block;
//! the dispatcher's best-effort decode handles the rest.

use vforge_models::{KeywordTaxonomy, ScriptContext, SourceVideo, StyleTemplate};

/// Characters of script shown to prompts that only need an excerpt.
const EXCERPT_CHARS: usize = 600;

/// Prompt for deriving the script context analysis.
pub fn script_context_prompt(video: &SourceVideo) -> String {
    format!(
        r#"You are a content strategist. Analyze this video script and describe how it works.

TITLE: {title}
SCRIPT:
{script}

IMPORTANT: You must strictly follow this output format.
Return ONLY a single JSON object with this schema:
{{
  "intent": "what the video is trying to achieve",
  "audience": "who it speaks to",
  "tone": "overall tone of voice",
  "core_message": "the single core message",
  "hook_style": "how the opening hook works",
  "cta_style": "how the call to action is framed",
  "content_pillars": ["theme 1", "theme 2"]
}}"#,
        title = video.title,
        script = video.script,
    )
}

/// Prompt for SEO keyword research.
pub fn keyword_research_prompt(video: &SourceVideo) -> String {
    format!(
        r#"You are a YouTube SEO expert. Research keywords for this video.

TITLE: {title}
DESCRIPTION: {description}
CHANNEL: {channel}
SCRIPT EXCERPT:
{excerpt}

IMPORTANT: You must strictly follow this output format.
Return ONLY a single JSON object with this schema:
{{
  "primary": ["high-volume head terms"],
  "secondary": ["supporting mid-tail terms"],
  "long_tail": ["specific long-tail phrases"],
  "trending": ["currently trending terms"]
}}

- 3 to 5 terms per list.
- Every term must be relevant to the actual script content."#,
        title = video.title,
        description = video.description,
        channel = video.channel_title,
        excerpt = video.script_excerpt(EXCERPT_CHARS),
    )
}

/// Prompt for regenerating the script with SEO integration.
pub fn script_prompt(
    video: &SourceVideo,
    context: &ScriptContext,
    keywords: &KeywordTaxonomy,
) -> String {
    let keyword_line = if keywords.is_empty() {
        "(no keyword data available)".to_string()
    } else {
        keywords.flattened().join(", ")
    };

    format!(
        r#"You are a viral video scriptwriter. Rewrite this script to maximize retention and shareability while keeping the original message intact.

TITLE: {title}
ORIGINAL SCRIPT:
{script}

CONTENT ANALYSIS:
- Intent: {intent}
- Audience: {audience}
- Tone: {tone}
- Core message: {core_message}
- Hook style: {hook_style}
- CTA style: {cta_style}

SEO KEYWORDS to weave in naturally: {keywords}

Requirements:
- Open with a hook in the first two sentences.
- Short punchy sentences, spoken-word rhythm.
- Keep the core message and factual claims unchanged.
- End with a clear call to action.
- Return ONLY the rewritten script text, no headings or commentary."#,
        title = video.title,
        script = video.script,
        intent = context.intent,
        audience = context.audience,
        tone = context.tone,
        core_message = context.core_message,
        hook_style = context.hook_style,
        cta_style = context.cta_style,
        keywords = keyword_line,
    )
}

/// Prompt for ranked title options.
pub fn title_prompt(video: &SourceVideo, script: &str, keywords: &KeywordTaxonomy) -> String {
    let keyword_line = if keywords.primary.is_empty() {
        String::new()
    } else {
        format!("\nPrimary keywords: {}", keywords.primary.join(", "))
    };

    format!(
        r#"You are a YouTube title expert. Write 3 click-worthy titles for this video, best first.

ORIGINAL TITLE: {title}{keywords}
SCRIPT:
{script}

IMPORTANT: You must strictly follow this output format.
Return ONLY a JSON array of exactly 3 title strings, best first.
- Under 70 characters each.
- No clickbait that the script cannot deliver on."#,
        title = video.title,
        keywords = keyword_line,
        script = script,
    )
}

/// Prompt for the video description.
pub fn description_prompt(video: &SourceVideo, script: &str, keywords: &KeywordTaxonomy) -> String {
    let keyword_line = if keywords.is_empty() {
        String::new()
    } else {
        format!("\nKeywords to include: {}", keywords.flattened().join(", "))
    };

    format!(
        r#"You are a YouTube SEO expert. Write an engaging video description.

TITLE: {title}{keywords}
SCRIPT:
{script}

Requirements:
- First two lines must hook the viewer (they show above the fold).
- 100-200 words, then 3-5 relevant hashtags on the final line.
- Return ONLY the description text."#,
        title = video.title,
        keywords = keyword_line,
        script = script,
    )
}

/// Prompt for sentence segmentation.
pub fn sentence_breakdown_prompt(script: &str) -> String {
    format!(
        r#"Break this script into individual sentences for visual storyboarding.

SCRIPT:
{script}

IMPORTANT: You must strictly follow this output format.
Return ONLY a JSON array of sentence strings, in original order.
- Each sentence must be independently meaningful and suitable for a single visual.
- Do not merge, split, reword, or drop sentences.
- A script that is already a single sentence returns exactly that one sentence."#,
    )
}

/// Prompt for selecting one style template for the whole video.
pub fn style_selection_prompt(title: &str, script_excerpt: &str) -> String {
    format!(
        r#"Pick the single most fitting visual style for this video from the catalog.

TITLE: {title}
SCRIPT EXCERPT:
{excerpt}

STYLE CATALOG:
{catalog}

Return ONLY the style key (for example: cinematic_realism). Nothing else."#,
        title = title,
        excerpt = script_excerpt,
        catalog = StyleTemplate::catalog_listing(),
    )
}

/// Prompt for deriving one sentence's image prompt body.
///
/// The style fragment is prepended by the caller, not the model, so the
/// shared visual identity is enforced by construction.
pub fn image_prompt_derivation_prompt(sentence: &str, style: StyleTemplate) -> String {
    format!(
        r#"Write an image-generation prompt for this sentence from a video script.

SENTENCE: {sentence}

The image will be rendered in this style (do NOT restate it): {fragment}

Requirements:
- Describe one concrete visual scene specific to the sentence's content.
- Subject, setting, composition. No text or lettering in the image.
- One paragraph, under 60 words.
- Return ONLY the prompt text."#,
        sentence = sentence,
        fragment = style.prompt_fragment(),
    )
}

/// Prompt for per-sentence b-roll search keywords.
pub fn editor_keywords_prompt(sentences: &[String]) -> String {
    let numbered = sentences
        .iter()
        .enumerate()
        .map(|(i, s)| format!("{}. {}", i + 1, s))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"For each numbered sentence, give 2-3 short stock-footage search keywords an editor could use to find b-roll.

SENTENCES:
{numbered}

IMPORTANT: You must strictly follow this output format.
Return ONLY a JSON array with one entry per sentence, in order, where
each entry is an array of keyword strings:
[["keyword", "keyword"], ["keyword", "keyword", "keyword"]]"#,
    )
}

/// Prompt body for the thumbnail image.
pub fn thumbnail_prompt(title: &str, script_excerpt: &str, style: StyleTemplate) -> String {
    format!(
        "{fragment} YouTube thumbnail, wide 16:9 composition, single bold focal subject, \
         high contrast, no text or lettering. Video topic: {title}. Scene inspiration: {excerpt}",
        fragment = style.prompt_fragment(),
        title = title,
        excerpt = script_excerpt,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video() -> SourceVideo {
        SourceVideo::new("v1", "How Batteries Work", "Batteries store energy. They power phones.")
    }

    #[test]
    fn test_script_prompt_includes_keywords() {
        let keywords = KeywordTaxonomy {
            primary: vec!["battery".into()],
            ..Default::default()
        };
        let prompt = script_prompt(&video(), &ScriptContext::default(), &keywords);
        assert!(prompt.contains("battery"));
    }

    #[test]
    fn test_script_prompt_without_keywords() {
        let prompt = script_prompt(&video(), &ScriptContext::default(), &KeywordTaxonomy::default());
        assert!(prompt.contains("(no keyword data available)"));
    }

    #[test]
    fn test_style_selection_lists_catalog() {
        let prompt = style_selection_prompt("Title", "excerpt");
        assert!(prompt.contains("cinematic_realism"));
        assert!(prompt.contains("retro_comic"));
    }

    #[test]
    fn test_thumbnail_prompt_starts_with_style_fragment() {
        let prompt = thumbnail_prompt("Title", "excerpt", StyleTemplate::RetroComic);
        assert!(prompt.starts_with(StyleTemplate::RetroComic.prompt_fragment()));
    }
}
