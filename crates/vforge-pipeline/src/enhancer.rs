//! Content enhancement orchestration.
//!
//! `ContentEnhancer` sequences the full per-video pipeline: metadata
//! reconciliation, keyword research, script regeneration, concurrent
//! title/description derivation, sentence breakdown, per-sentence image
//! prompts, and budget-gated image and thumbnail generation.
//!
//! Only `enhance` is a hard boundary callers must wrap; individual stage
//! methods may return errors at their own granularity. The orchestrator
//! never retries a failed provider call beyond the one-attempt-per-link
//! rule of the fallback chain.

use std::sync::Arc;

use tokio::time::sleep;
use tracing::info;

use vforge_models::{
    CostCategory, CostSummary, EnhancedContent, KeywordTaxonomy, ScriptContext, SentenceImage,
    SourceVideo, StyleTemplate, Thumbnail, VideoId,
};
use vforge_providers::{
    decode, download_image, FallbackChain, ImageGenerator, ImageRequest, TextRequest,
};
use vforge_storage::MediaStore;

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::ledger::CostLedger;
use crate::logging::StageLogger;
use crate::metadata::MetadataProvider;
use crate::prompts;

/// Characters of script passed to style-selection and thumbnail prompts.
const EXCERPT_CHARS: usize = 400;

/// Budget-gated, multi-provider content enhancement orchestrator.
///
/// Owns the cost ledger exclusively; no other component reads or writes
/// it. One instance per process (or per test); instances never share
/// cost state.
pub struct ContentEnhancer {
    chain: FallbackChain,
    image_client: Arc<dyn ImageGenerator>,
    store: Arc<dyn MediaStore>,
    metadata_provider: Option<Arc<dyn MetadataProvider>>,
    ledger: CostLedger,
    config: PipelineConfig,
}

impl ContentEnhancer {
    /// Create a new enhancer. Validates the configuration once.
    pub fn new(
        chain: FallbackChain,
        image_client: Arc<dyn ImageGenerator>,
        store: Arc<dyn MediaStore>,
        config: PipelineConfig,
    ) -> PipelineResult<Self> {
        config.validate()?;
        let ledger = CostLedger::new(config.budget_ceiling_usd);
        Ok(Self {
            chain,
            image_client,
            store,
            metadata_provider: None,
            ledger,
            config,
        })
    }

    /// Attach a reliable-metadata provider.
    pub fn with_metadata_provider(mut self, provider: Arc<dyn MetadataProvider>) -> Self {
        self.metadata_provider = Some(provider);
        self
    }

    /// Aggregated cost view for observability.
    pub fn cost_summary(&self) -> CostSummary {
        self.ledger.summary()
    }

    fn text_request(&self, prompt: String) -> TextRequest {
        TextRequest::new(prompt, self.config.text_model_priority[0])
    }

    // =========================================================================
    // Metadata reconciliation
    // =========================================================================

    /// Enrich caller-supplied video data from the reliable-metadata
    /// provider. Failures degrade to the caller's data as-is.
    pub async fn reconcile_metadata(&self, video: &mut SourceVideo) {
        let Some(provider) = &self.metadata_provider else {
            return;
        };
        let logger = StageLogger::new(&video.video_id, "reconcile_metadata");

        match provider.get_metadata(&video.video_id).await {
            Ok(metadata) => {
                if !metadata.title.is_empty() {
                    video.title = metadata.title;
                }
                if !metadata.description.is_empty() {
                    video.description = metadata.description;
                }
                if !metadata.channel_title.is_empty() {
                    video.channel_title = metadata.channel_title;
                }
                if metadata.duration_seconds > 0 {
                    video.duration_seconds = metadata.duration_seconds;
                }
                if !metadata.canonical_url.is_empty() {
                    video.canonical_url = metadata.canonical_url;
                }
                if video.script.is_empty() {
                    if let Some(transcript) = metadata.transcript_text {
                        video.script = transcript;
                    }
                }
                logger.completion("Metadata reconciled");
            }
            Err(e) => {
                logger.warning(&format!(
                    "Metadata lookup failed, using caller-supplied data: {}",
                    e
                ));
            }
        }
    }

    // =========================================================================
    // Text stages
    // =========================================================================

    /// SEO keyword research. Falls back to the empty taxonomy on any
    /// failure; keyword data enriches but never blocks a run.
    pub async fn research_keywords(&self, video: &SourceVideo) -> KeywordTaxonomy {
        let logger = StageLogger::new(&video.video_id, "keyword_research");
        logger.start("Researching keywords");

        let request = self
            .text_request(prompts::keyword_research_prompt(video))
            .expect_json();

        match self.chain.generate(&request).await {
            Ok(text) => {
                let taxonomy: KeywordTaxonomy = decode::parse_json_or_default(&text);
                logger.completion(&format!(
                    "Keyword research done ({} terms)",
                    taxonomy.flattened().len()
                ));
                taxonomy
            }
            Err(e) => {
                logger.warning(&format!("Keyword research failed, using empty taxonomy: {}", e));
                KeywordTaxonomy::default()
            }
        }
    }

    /// Derive the script context analysis. Defaults on failure.
    pub async fn analyze_script_context(&self, video: &SourceVideo) -> ScriptContext {
        let logger = StageLogger::new(&video.video_id, "script_context");

        let request = self
            .text_request(prompts::script_context_prompt(video))
            .expect_json();

        match self.chain.generate(&request).await {
            Ok(text) => decode::parse_json_or_default(&text),
            Err(e) => {
                logger.warning(&format!("Context analysis failed, using defaults: {}", e));
                ScriptContext::default()
            }
        }
    }

    /// Regenerate the script. Hard failure when the whole fallback chain
    /// is exhausted, since every downstream stage depends on the script.
    pub async fn generate_script(
        &self,
        video: &SourceVideo,
        context: &ScriptContext,
        keywords: &KeywordTaxonomy,
    ) -> PipelineResult<String> {
        let logger = StageLogger::new(&video.video_id, "script_generation");
        logger.start("Regenerating script");

        let request = self
            .text_request(prompts::script_prompt(video, context, keywords))
            .with_temperature(0.8);

        let script = self
            .chain
            .generate(&request)
            .await
            .map_err(|e| PipelineError::script_failed(e.to_string()))?;

        let script = script.trim().to_string();
        if script.is_empty() {
            return Err(PipelineError::script_failed("Provider returned empty script"));
        }

        logger.completion(&format!("Script regenerated ({} chars)", script.len()));
        Ok(script)
    }

    /// Generate ranked title options. Falls back to the source title,
    /// so the result is never empty.
    pub async fn generate_titles(
        &self,
        video: &SourceVideo,
        script: &str,
        keywords: &KeywordTaxonomy,
    ) -> Vec<String> {
        let logger = StageLogger::new(&video.video_id, "title_generation");

        let request = self
            .text_request(prompts::title_prompt(video, script, keywords))
            .with_temperature(0.9)
            .expect_json();

        let titles: Vec<String> = match self.chain.generate(&request).await {
            Ok(text) => decode::parse_json_or_default(&text),
            Err(e) => {
                logger.warning(&format!("Title generation failed: {}", e));
                Vec::new()
            }
        };

        let titles: Vec<String> = titles
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();

        if titles.is_empty() {
            logger.warning("No usable titles generated, keeping source title");
            vec![video.title.clone()]
        } else {
            titles
        }
    }

    /// Generate the video description. Falls back to the source
    /// description on failure.
    pub async fn generate_description(
        &self,
        video: &SourceVideo,
        script: &str,
        keywords: &KeywordTaxonomy,
    ) -> String {
        let logger = StageLogger::new(&video.video_id, "description_generation");

        let request = self
            .text_request(prompts::description_prompt(video, script, keywords))
            .with_temperature(0.7);

        match self.chain.generate(&request).await {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                logger.warning(&format!(
                    "Description generation failed, keeping source description: {}",
                    e
                ));
                video.description.clone()
            }
        }
    }

    // =========================================================================
    // Sentence breakdown and visual stages
    // =========================================================================

    /// Break the script into per-visual sentences.
    ///
    /// An empty script short-circuits to an empty list (a no-op, not an
    /// error). Provider exhaustion or an unusable result is a hard
    /// failure, since everything downstream depends on the segmentation.
    pub async fn break_into_sentences(
        &self,
        video_id: &VideoId,
        script: &str,
    ) -> PipelineResult<Vec<String>> {
        if script.trim().is_empty() {
            return Ok(Vec::new());
        }

        let logger = StageLogger::new(video_id, "sentence_breakdown");
        logger.start("Breaking script into sentences");

        let request = self
            .text_request(prompts::sentence_breakdown_prompt(script))
            .expect_json();

        let text = self
            .chain
            .generate(&request)
            .await
            .map_err(|e| PipelineError::breakdown_failed(e.to_string()))?;

        let sentences: Vec<String> = decode::parse_json(&text)
            .map_err(|e| PipelineError::breakdown_failed(e.to_string()))?;

        let sentences: Vec<String> = sentences
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        if sentences.is_empty() {
            return Err(PipelineError::breakdown_failed(
                "Segmentation returned no sentences for a non-empty script",
            ));
        }

        logger.completion(&format!("Split into {} sentences", sentences.len()));
        Ok(sentences)
    }

    /// Select one style template for the whole video. Falls back to the
    /// default style; style is never left unset.
    pub async fn select_style(&self, video: &SourceVideo, script: &str) -> StyleTemplate {
        let logger = StageLogger::new(&video.video_id, "style_selection");

        let excerpt = script.char_indices().nth(EXCERPT_CHARS).map_or(script, |(i, _)| &script[..i]);
        let request = self.text_request(prompts::style_selection_prompt(&video.title, excerpt));

        match self.chain.generate(&request).await {
            Ok(text) => match text.trim().trim_matches(['"', '`', '.']).parse() {
                Ok(style) => {
                    logger.completion(&format!("Selected style {}", style));
                    style
                }
                Err(_) => {
                    logger.warning(&format!(
                        "Unrecognized style '{}', using default {}",
                        text.trim(),
                        StyleTemplate::DEFAULT
                    ));
                    StyleTemplate::DEFAULT
                }
            },
            Err(e) => {
                logger.warning(&format!(
                    "Style selection failed, using default {}: {}",
                    StyleTemplate::DEFAULT,
                    e
                ));
                StyleTemplate::DEFAULT
            }
        }
    }

    /// Derive one image prompt per sentence, every prompt prefixed with
    /// the selected style's fixed fragment. A failed derivation falls
    /// back to the sentence text itself, so the batch never loses an
    /// entry here.
    pub async fn derive_image_prompts(
        &self,
        video_id: &VideoId,
        sentences: &[String],
        style: StyleTemplate,
    ) -> Vec<String> {
        let logger = StageLogger::new(video_id, "image_prompt_derivation");
        logger.start(&format!("Deriving {} image prompts", sentences.len()));

        let mut prompts_out = Vec::with_capacity(sentences.len());
        for sentence in sentences {
            let request =
                self.text_request(prompts::image_prompt_derivation_prompt(sentence, style));

            let body = match self.chain.generate(&request).await {
                Ok(text) => text.trim().to_string(),
                Err(e) => {
                    logger.warning(&format!(
                        "Prompt derivation failed, falling back to sentence text: {}",
                        e
                    ));
                    sentence.clone()
                }
            };

            // Style fragment prefix is applied here, not by the model,
            // so the shared visual identity holds by construction.
            prompts_out.push(format!("{} {}", style.prompt_fragment(), body));
        }

        prompts_out
    }

    /// Per-sentence b-roll search keywords for editors. Defaults to
    /// empty lists on failure.
    pub async fn generate_editor_keywords(
        &self,
        video_id: &VideoId,
        sentences: &[String],
    ) -> Vec<Vec<String>> {
        if sentences.is_empty() {
            return Vec::new();
        }
        let logger = StageLogger::new(video_id, "editor_keywords");

        let request = self
            .text_request(prompts::editor_keywords_prompt(sentences))
            .expect_json();

        let mut keywords: Vec<Vec<String>> = match self.chain.generate(&request).await {
            Ok(text) => decode::parse_json_or_default(&text),
            Err(e) => {
                logger.warning(&format!("Editor keywords failed, using empty lists: {}", e));
                Vec::new()
            }
        };

        // One entry per sentence, no matter what the model returned
        keywords.resize(sentences.len(), Vec::new());
        keywords
    }

    // =========================================================================
    // Budget-gated image generation
    // =========================================================================

    /// Generate, download, and upload one image per prompt, sequentially
    /// and budget-gated.
    ///
    /// The batch is truncated (never refused) to the affordable count,
    /// with a warning naming how many prompts were dropped. A per-item
    /// failure is logged and skipped; the remaining batch continues.
    /// Results are ordered and contain only completed entries.
    pub async fn generate_sentence_images(
        &mut self,
        video_id: &VideoId,
        sentences: &[String],
        prompts: &[String],
        style: StyleTemplate,
    ) -> Vec<SentenceImage> {
        if prompts.is_empty() {
            return Vec::new();
        }
        let logger = StageLogger::new(video_id, "image_generation");

        let unit_cost = CostLedger::estimate_cost(
            self.config.image_model,
            self.config.image_size.nearest_supported(self.config.image_model),
            self.config.image_quality,
            1,
        );

        let affordable = self.ledger.max_affordable(video_id, unit_cost);
        let mut limit = prompts.len().min(affordable);
        if self.config.max_images_per_video > 0 {
            limit = limit.min(self.config.max_images_per_video);
        }

        if limit < prompts.len() {
            logger.warning(&format!(
                "Truncating image batch from {} to {}: remaining budget ${:.4} at ${:.4}/image (ceiling ${:.2}), max per video {}",
                prompts.len(),
                limit,
                self.ledger.remaining_budget(video_id),
                unit_cost,
                self.ledger.budget_ceiling(),
                self.config.max_images_per_video,
            ));
        }
        if limit == 0 {
            logger.warning("Budget cannot afford any images, skipping batch");
            return Vec::new();
        }

        logger.start(&format!("Generating {} images", limit));
        let mut images = Vec::with_capacity(limit);

        for (index, prompt) in prompts.iter().take(limit).enumerate() {
            if index > 0 {
                // Politeness delay for upstream rate limits
                sleep(self.config.generation_delay).await;
            }

            // Re-check before each billable call; actuals may drift from
            // the estimate used for truncation.
            if !self.ledger.is_within_budget(video_id, unit_cost) {
                logger.warning(&format!(
                    "Budget exhausted mid-batch after {} images, dropping the rest",
                    images.len()
                ));
                break;
            }

            match self
                .generate_single_image(video_id, prompt, index, CostCategory::Image)
                .await
            {
                Ok((original_url, uploaded_url)) => {
                    images.push(SentenceImage {
                        index,
                        sentence: sentences.get(index).cloned().unwrap_or_default(),
                        prompt: prompt.clone(),
                        style,
                        original_url,
                        uploaded_url,
                        cost: unit_cost,
                    });
                }
                Err(e) => {
                    // Partial-failure tolerant: one bad image must not
                    // abort the remaining batch.
                    logger.warning(&format!("Image {} failed, continuing batch: {}", index, e));
                }
            }
        }

        logger.completion(&format!("Generated {}/{} images", images.len(), limit));
        images
    }

    /// Generate the video thumbnail (wide aspect, single item).
    ///
    /// Budget-gated by refusal: when the item does not fit the remaining
    /// budget this returns `BudgetExceeded` without calling the provider.
    pub async fn generate_thumbnail(
        &mut self,
        video: &SourceVideo,
        script: &str,
        style: StyleTemplate,
    ) -> PipelineResult<Thumbnail> {
        let logger = StageLogger::new(&video.video_id, "thumbnail_generation");

        let size = self.config.thumbnail_size.nearest_supported(self.config.image_model);
        let unit_cost =
            CostLedger::estimate_cost(self.config.image_model, size, self.config.image_quality, 1);

        if !self.ledger.is_within_budget(&video.video_id, unit_cost) {
            return Err(PipelineError::BudgetExceeded {
                video_id: video.video_id.clone(),
                current_total: self.ledger.video_total(&video.video_id),
                additional_cost: unit_cost,
                ceiling: self.ledger.budget_ceiling(),
            });
        }

        logger.start("Generating thumbnail");
        let excerpt = script.char_indices().nth(EXCERPT_CHARS).map_or(script, |(i, _)| &script[..i]);
        let prompt = prompts::thumbnail_prompt(&video.title, excerpt, style);

        let request = ImageRequest {
            prompt: prompt.clone(),
            model: self.config.image_model,
            size: self.config.thumbnail_size,
            quality: self.config.image_quality,
            video_id: video.video_id.clone(),
        };

        let generated = self.image_client.generate(&request).await?;
        self.ledger
            .track_image_cost(&video.video_id, unit_cost, CostCategory::Thumbnail);

        let bytes = download_image(&generated.url, self.config.download_timeout)
            .await
            .map_err(|e| PipelineError::download_failed(e.to_string()))?;

        let key = format!("videos/{}/thumbnail.png", video.video_id);
        let uploaded_url = self.store.upload_bytes(bytes, &key, "image/png").await?;

        logger.completion("Thumbnail uploaded");
        Ok(Thumbnail {
            prompt,
            style,
            original_url: generated.url,
            uploaded_url,
            cost: unit_cost,
        })
    }

    /// Generate one image, record its cost, download it, and upload it.
    /// Returns (provider URL, permanent URL).
    async fn generate_single_image(
        &mut self,
        video_id: &VideoId,
        prompt: &str,
        index: usize,
        category: CostCategory,
    ) -> PipelineResult<(String, String)> {
        let request = ImageRequest {
            prompt: prompt.to_string(),
            model: self.config.image_model,
            size: self.config.image_size,
            quality: self.config.image_quality,
            video_id: video_id.clone(),
        };

        let generated = self.image_client.generate(&request).await?;

        // The provider bills on generation; record spend before the
        // download/upload leg can fail.
        let unit_cost = CostLedger::estimate_cost(
            self.config.image_model,
            self.config.image_size.nearest_supported(self.config.image_model),
            self.config.image_quality,
            1,
        );
        self.ledger.track_image_cost(video_id, unit_cost, category);

        let bytes = download_image(&generated.url, self.config.download_timeout)
            .await
            .map_err(|e| PipelineError::download_failed(e.to_string()))?;

        let key = format!("videos/{}/images/{:03}.png", video_id, index);
        let uploaded_url = self.store.upload_bytes(bytes, &key, "image/png").await?;

        Ok((generated.url, uploaded_url))
    }

    // =========================================================================
    // Top-level orchestration
    // =========================================================================

    /// Run the full enhancement pipeline for one video.
    ///
    /// This is the hard boundary: callers wrap it and retry the whole
    /// run on failure. There is no checkpoint/resume.
    pub async fn enhance(&mut self, source: SourceVideo) -> PipelineResult<EnhancedContent> {
        let mut video = source;
        let video_id = video.video_id.clone();
        let run_id = uuid::Uuid::new_v4();
        let logger = StageLogger::new(&video_id, "enhance");
        info!(video_id = %video_id, run_id = %run_id, "Starting enhancement run");

        // 1. Optional metadata reconciliation (degrades, never aborts)
        self.reconcile_metadata(&mut video).await;

        // 2-3. Keyword research and script context (default on failure)
        let keywords = self.research_keywords(&video).await;
        let context = self.analyze_script_context(&video).await;

        // 4. Script regeneration (hard failure)
        let script = self.generate_script(&video, &context, &keywords).await?;

        // 5. Title and description are independent given the script
        let (title_options, description) = tokio::join!(
            self.generate_titles(&video, &script, &keywords),
            self.generate_description(&video, &script, &keywords),
        );

        // 6. Optional sentence breakdown (hard failure when enabled)
        let script_sentences = if self.config.script_breakdown_enabled {
            self.break_into_sentences(&video_id, &script).await?
        } else {
            Vec::new()
        };

        // 7. Style, image prompts, and editor keywords need sentences
        let mut style = None;
        let mut image_prompts = Vec::new();
        let mut editor_keywords = Vec::new();
        if !script_sentences.is_empty() {
            let selected = self.select_style(&video, &script).await;
            style = Some(selected);
            image_prompts = self
                .derive_image_prompts(&video_id, &script_sentences, selected)
                .await;
            editor_keywords = self
                .generate_editor_keywords(&video_id, &script_sentences)
                .await;
        }

        // 8. Budget-gated image batch
        let sentence_images = if self.config.image_generation_enabled && !image_prompts.is_empty() {
            let selected = style.unwrap_or(StyleTemplate::DEFAULT);
            self.generate_sentence_images(&video_id, &script_sentences, &image_prompts, selected)
                .await
        } else {
            Vec::new()
        };

        // 9. Thumbnail; budget refusal degrades to no thumbnail, any
        // other failure aborts the run
        let thumbnail = if self.config.image_generation_enabled {
            let selected = match style {
                Some(s) => s,
                None => self.select_style(&video, &script).await,
            };
            style = Some(selected);
            match self.generate_thumbnail(&video, &script, selected).await {
                Ok(thumbnail) => Some(thumbnail),
                Err(e) if e.is_budget_exceeded() => {
                    logger.warning(&format!("Skipping thumbnail: {}", e));
                    None
                }
                Err(e) => return Err(e),
            }
        } else {
            None
        };

        let cost = self.ledger.video_record(&video_id);
        let run_cost = cost.total;
        info!(
            video_id = %video_id,
            run_id = %run_id,
            run_cost_usd = run_cost,
            images = sentence_images.len(),
            "Enhancement run completed"
        );

        Ok(EnhancedContent {
            video_id,
            script,
            title_options,
            description,
            keywords,
            script_context: Some(context),
            script_sentences,
            image_prompts,
            editor_keywords,
            sentence_images,
            thumbnail,
            style,
            cost,
        })
    }
}
