//! Query pipeline orchestration.
//!
//! Sequences one request end to end: detect language, bridge Russian
//! queries into English, embed, retrieve, build a grounded prompt, generate,
//! and bridge the answer back. Control flow is strictly linear; no step
//! calls back into an earlier one and no step retries.

use crate::config::{Prompts, Settings};
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::Result;
use crate::lang::Language;
use crate::rag::{
    BuiltPrompt, GenerationClient, GroundedPrompt, PromptBuilder, YandexGptClient,
    NO_MATCHES_MESSAGE,
};
use crate::translate::{TranslationOutcome, Translator, YandexTranslator};
use crate::vector_store::{SearchHit, SqliteVectorStore, VectorStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Per-request retrieval depth for the primary path.
const DEFAULT_TOP_K: usize = 3;
/// Per-request retrieval depth for the inspection path.
const INSPECT_TOP_K: usize = 2;

/// Session facts the caller passes back in for the optional on-demand
/// translate-out. Explicit value object instead of ambient mutable state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationState {
    /// Whether the original query was Russian.
    pub was_russian: bool,
    /// The cached English answer, available for later translation.
    pub english_answer: Option<String>,
}

/// Terminal artifact of one pipeline run.
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    /// The answer in the language of the original query.
    pub answer: String,
    /// Language of `answer`.
    pub language: Language,
    /// Detected language of the raw query.
    pub detected: Language,
    /// The English form of the query, if translation occurred.
    pub translated_query: Option<String>,
    /// The retrieval hits the answer was grounded on.
    pub hits: Vec<SearchHit>,
    /// Session facts for follow-up actions.
    pub state: ConversationState,
}

/// Raw components of the inspection path, for grounding verification.
/// No generation call is made to produce this.
#[derive(Debug, Clone)]
pub struct Inspection {
    pub detected: Language,
    pub translated_query: Option<String>,
    pub hits: Vec<SearchHit>,
    /// `None` when retrieval produced no hits.
    pub prompt: Option<GroundedPrompt>,
}

/// The query pipeline: all process-wide singletons are constructed once and
/// held here by handle.
pub struct QueryPipeline {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    translator: Arc<dyn Translator>,
    generator: Arc<dyn GenerationClient>,
    prompt_builder: PromptBuilder,
    top_k: usize,
    inspect_top_k: usize,
}

impl QueryPipeline {
    /// Composition root: build the pipeline and its singletons from
    /// settings. Store-open failures are fatal and surface to the operator.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let prompts = Prompts::load(settings.prompts.custom_dir.as_deref())?;

        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_default();

        let embedder = Arc::new(OpenAIEmbedder::with_config(
            &settings.embedding.model,
            settings.embedding.dimensions as usize,
        ));

        let store = Arc::new(
            SqliteVectorStore::new(&settings.sqlite_path())?
                .with_min_score(settings.rag.min_score),
        );

        let translator = Arc::new(YandexTranslator::from_env(http.clone()));

        let generator = Arc::new(YandexGptClient::from_env(
            http,
            &settings.generation.model,
            settings.generation.temperature,
            settings.generation.max_tokens,
        ));

        Ok(Self {
            embedder,
            store,
            translator,
            generator,
            prompt_builder: PromptBuilder::new(prompts.rag),
            top_k: settings.rag.top_k,
            inspect_top_k: settings.rag.inspect_top_k,
        })
    }

    /// Build a pipeline from injected components.
    pub fn new(
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        translator: Arc<dyn Translator>,
        generator: Arc<dyn GenerationClient>,
        prompt_builder: PromptBuilder,
    ) -> Self {
        Self {
            embedder,
            store,
            translator,
            generator,
            prompt_builder,
            top_k: DEFAULT_TOP_K,
            inspect_top_k: INSPECT_TOP_K,
        }
    }

    /// Override the primary retrieval depth.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Run the full pipeline for one query.
    ///
    /// Always produces a textual answer for a well-formed query; only
    /// embedding failures propagate as errors.
    #[instrument(skip(self), fields(query = %raw_query))]
    pub async fn run(&self, raw_query: &str) -> Result<QueryOutcome> {
        let (detected, query_en, translated_query) = self.bridge_in(raw_query).await;
        let was_russian = detected.needs_translation();

        let query_embedding = self.embedder.embed(&query_en).await?;
        let hits = self.retrieve(&query_embedding, self.top_k).await;

        let prompt = match self.prompt_builder.build(&query_en, &hits) {
            BuiltPrompt::Grounded(prompt) => prompt,
            BuiltPrompt::NoMatches => {
                info!("no catalog matches, skipping generation");
                return Ok(QueryOutcome {
                    answer: NO_MATCHES_MESSAGE.to_string(),
                    language: Language::En,
                    detected,
                    translated_query,
                    hits,
                    state: ConversationState {
                        was_russian,
                        english_answer: None,
                    },
                });
            }
        };

        let english_answer = self.generator.generate(&prompt).await.into_text();

        let (answer, language) = if was_russian {
            let outcome = self
                .translator
                .translate(&english_answer, Language::Ru, Some(Language::En))
                .await;
            let language = if outcome.is_translated() {
                Language::Ru
            } else {
                Language::En
            };
            (outcome.into_text(), language)
        } else {
            (english_answer.clone(), Language::En)
        };

        Ok(QueryOutcome {
            answer,
            language,
            detected,
            translated_query,
            hits,
            state: ConversationState {
                was_russian,
                english_answer: Some(english_answer),
            },
        })
    }

    /// On-demand translate-out of a cached English answer.
    ///
    /// Each call issues a fresh translation of the same cached answer;
    /// nothing is memoized, so repeated calls are independent.
    pub async fn translate_answer(
        &self,
        state: &ConversationState,
    ) -> Option<TranslationOutcome> {
        let english_answer = state.english_answer.as_deref()?;
        Some(
            self.translator
                .translate(english_answer, Language::Ru, Some(Language::En))
                .await,
        )
    }

    /// Inspection path: run detection, bridging and retrieval with a
    /// shallower depth and return the raw prompt components. The generation
    /// client is never invoked.
    #[instrument(skip(self), fields(query = %raw_query))]
    pub async fn inspect(&self, raw_query: &str) -> Result<Inspection> {
        let (detected, query_en, translated_query) = self.bridge_in(raw_query).await;

        let query_embedding = self.embedder.embed(&query_en).await?;
        let hits = self.retrieve(&query_embedding, self.inspect_top_k).await;

        let prompt = match self.prompt_builder.build_strict(&query_en, &hits) {
            BuiltPrompt::Grounded(prompt) => Some(prompt),
            BuiltPrompt::NoMatches => None,
        };

        Ok(Inspection {
            detected,
            translated_query,
            hits,
            prompt,
        })
    }

    /// Detect the query language and translate Russian queries to English.
    /// Returns the detected language, the query to embed, and the English
    /// form when translation occurred.
    async fn bridge_in(&self, raw_query: &str) -> (Language, String, Option<String>) {
        let detected = Language::detect(raw_query);

        if !detected.needs_translation() {
            return (detected, raw_query.to_string(), None);
        }

        let outcome = self
            .translator
            .translate(raw_query, Language::En, Some(Language::Ru))
            .await;

        if outcome.is_translated() {
            let query_en = outcome.into_text();
            info!(%query_en, "query translated for retrieval");
            (detected, query_en.clone(), Some(query_en))
        } else {
            // Degraded: retrieval runs over the untranslated text.
            warn!("query translation unavailable, retrieving with original text");
            (detected, outcome.into_text(), None)
        }
    }

    /// Retrieval with the availability-over-propagation policy: query-time
    /// store errors surface as an empty hit list.
    async fn retrieve(&self, query_embedding: &[f32], top_k: usize) -> Vec<SearchHit> {
        match self.store.search(query_embedding, top_k).await {
            Ok(hits) => hits,
            Err(e) => {
                warn!("retrieval failed, treating as no matches: {}", e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RagPrompts;
    use crate::error::TeveError;
    use crate::rag::Generated;
    use crate::vector_store::{CatalogEntry, MemoryVectorStore, ShowRecord};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Embedder that maps known texts to fixed vectors and records calls.
    struct FakeEmbedder {
        calls: Mutex<Vec<String>>,
        fail: bool,
    }

    impl FakeEmbedder {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        fn embedded_texts(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Embedder for FakeEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            if self.fail {
                return Err(TeveError::Embedding("backend down".to_string()));
            }
            self.calls.lock().unwrap().push(text.to_string());
            // Any text containing "space" lands near the space shows.
            if text.contains("space") {
                Ok(vec![1.0, 0.0])
            } else {
                Ok(vec![0.0, 1.0])
            }
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    /// Translator with a tiny fixed dictionary.
    struct FakeTranslator {
        fail: bool,
        calls: AtomicUsize,
    }

    impl FakeTranslator {
        fn new() -> Self {
            Self {
                fail: false,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Translator for FakeTranslator {
        async fn translate(
            &self,
            text: &str,
            target: Language,
            _source: Option<Language>,
        ) -> TranslationOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return TranslationOutcome::Failed {
                    original: text.to_string(),
                };
            }
            match target {
                Language::En => {
                    TranslationOutcome::Translated("comedy about space".to_string())
                }
                Language::Ru => TranslationOutcome::Translated(format!("RU[{}]", text)),
                Language::Other => TranslationOutcome::Skipped(text.to_string()),
            }
        }
    }

    /// Generator that counts invocations.
    struct FakeGenerator {
        calls: AtomicUsize,
    }

    impl FakeGenerator {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl GenerationClient for FakeGenerator {
        async fn generate(&self, prompt: &GroundedPrompt) -> Generated {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Generated::Answer(format!("Grounded on: {}", prompt.context_block))
        }
    }

    /// Store whose search always errors, for the availability policy test.
    struct BrokenStore;

    #[async_trait]
    impl VectorStore for BrokenStore {
        async fn upsert_batch(&self, _records: &[ShowRecord]) -> Result<usize> {
            Ok(0)
        }

        async fn search(&self, _q: &[f32], _k: usize) -> Result<Vec<SearchHit>> {
            Err(TeveError::VectorStore("index corrupted".to_string()))
        }

        async fn entry_count(&self) -> Result<usize> {
            Ok(0)
        }
    }

    fn seeded_store() -> MemoryVectorStore {
        MemoryVectorStore::with_records(vec![
            ShowRecord::new(
                CatalogEntry::new("Space Laughs", "comedy", "Astronauts tell jokes"),
                vec![1.0, 0.0],
            ),
            ShowRecord::new(
                CatalogEntry::new("Orbit Office", "comedy", "Workplace sitcom on a station"),
                vec![0.9, 0.1],
            ),
            ShowRecord::new(
                CatalogEntry::new("Deep Blue", "documentary", "Ocean life"),
                vec![0.0, 1.0],
            ),
        ])
    }

    struct Harness {
        pipeline: QueryPipeline,
        embedder: Arc<FakeEmbedder>,
        translator: Arc<FakeTranslator>,
        generator: Arc<FakeGenerator>,
    }

    fn harness(
        embedder: FakeEmbedder,
        store: Arc<dyn VectorStore>,
        translator: FakeTranslator,
    ) -> Harness {
        let embedder = Arc::new(embedder);
        let translator = Arc::new(translator);
        let generator = Arc::new(FakeGenerator::new());
        let pipeline = QueryPipeline::new(
            embedder.clone(),
            store,
            translator.clone(),
            generator.clone(),
            PromptBuilder::new(RagPrompts::default()),
        );
        Harness {
            pipeline,
            embedder,
            translator,
            generator,
        }
    }

    #[test]
    fn from_settings_uses_configured_retrieval_depth() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.vector_store.sqlite_path =
            dir.path().join("catalog.db").display().to_string();
        settings.rag.top_k = 5;

        let pipeline = QueryPipeline::from_settings(&settings).unwrap();
        assert_eq!(pipeline.top_k, 5);
        assert_eq!(pipeline.inspect_top_k, 2);

        // The builder override still takes precedence when requested.
        let pipeline = pipeline.with_top_k(7);
        assert_eq!(pipeline.top_k, 7);
    }

    #[tokio::test]
    async fn english_query_skips_translation() {
        let h = harness(
            FakeEmbedder::new(),
            Arc::new(seeded_store()),
            FakeTranslator::new(),
        );

        let outcome = h.pipeline.run("comedy about space").await.unwrap();

        assert_eq!(outcome.detected, Language::En);
        assert!(outcome.translated_query.is_none());
        assert_eq!(outcome.language, Language::En);
        assert!(!outcome.state.was_russian);
        assert_eq!(h.translator.calls.load(Ordering::SeqCst), 0);
        // The answer is grounded on the retrieved titles only.
        assert_eq!(outcome.hits.len(), 3);
        assert!(outcome.answer.contains("Space Laughs"));
        assert!(outcome.answer.contains("Orbit Office"));
    }

    #[tokio::test]
    async fn russian_query_embeds_the_translated_text() {
        let h = harness(
            FakeEmbedder::new(),
            Arc::new(seeded_store()),
            FakeTranslator::new(),
        );

        let outcome = h.pipeline.run("комедия про космос").await.unwrap();

        assert_eq!(outcome.detected, Language::Ru);
        assert_eq!(
            outcome.translated_query.as_deref(),
            Some("comedy about space")
        );
        // The vector fed to retrieval came from the translated text.
        assert_eq!(h.embedder.embedded_texts(), vec!["comedy about space"]);
        // Answer bridged back to Russian, English intermediate cached.
        assert_eq!(outcome.language, Language::Ru);
        assert!(outcome.answer.starts_with("RU["));
        let english = outcome.state.english_answer.as_deref().unwrap();
        assert!(english.contains("Space Laughs"));
        assert_eq!(outcome.answer, format!("RU[{}]", english));
    }

    #[tokio::test]
    async fn no_matches_short_circuits_without_generation() {
        let h = harness(
            FakeEmbedder::new(),
            Arc::new(MemoryVectorStore::new()),
            FakeTranslator::new(),
        );

        let outcome = h.pipeline.run("comedy about space").await.unwrap();

        assert_eq!(outcome.answer, NO_MATCHES_MESSAGE);
        assert!(outcome.hits.is_empty());
        assert!(outcome.state.english_answer.is_none());
        assert_eq!(h.generator.call_count(), 0);
    }

    #[tokio::test]
    async fn retrieval_errors_degrade_to_no_matches() {
        let h = harness(
            FakeEmbedder::new(),
            Arc::new(BrokenStore),
            FakeTranslator::new(),
        );

        let outcome = h.pipeline.run("comedy about space").await.unwrap();

        assert_eq!(outcome.answer, NO_MATCHES_MESSAGE);
        assert_eq!(h.generator.call_count(), 0);
    }

    #[tokio::test]
    async fn embedding_failure_is_fatal() {
        let h = harness(
            FakeEmbedder::failing(),
            Arc::new(seeded_store()),
            FakeTranslator::new(),
        );

        let result = h.pipeline.run("comedy about space").await;
        assert!(matches!(result, Err(TeveError::Embedding(_))));
    }

    #[tokio::test]
    async fn failed_translation_degrades_but_continues() {
        let h = harness(
            FakeEmbedder::new(),
            Arc::new(seeded_store()),
            FakeTranslator::failing(),
        );

        let outcome = h.pipeline.run("комедия про космос").await.unwrap();

        // Retrieval ran over the untranslated text.
        assert_eq!(h.embedder.embedded_texts(), vec!["комедия про космос"]);
        assert!(outcome.translated_query.is_none());
        assert!(outcome.state.was_russian);
        // Translate-out also failed, so the answer stayed English.
        assert_eq!(outcome.language, Language::En);
    }

    #[tokio::test]
    async fn translate_answer_is_fresh_on_every_call() {
        let h = harness(
            FakeEmbedder::new(),
            Arc::new(seeded_store()),
            FakeTranslator::new(),
        );

        let outcome = h.pipeline.run("comedy about space").await.unwrap();
        let calls_before = h.translator.calls.load(Ordering::SeqCst);

        let first = h.pipeline.translate_answer(&outcome.state).await.unwrap();
        let second = h.pipeline.translate_answer(&outcome.state).await.unwrap();

        assert!(first.is_translated());
        assert!(second.is_translated());
        assert_eq!(first.text(), second.text());
        assert_eq!(h.translator.calls.load(Ordering::SeqCst), calls_before + 2);
    }

    #[tokio::test]
    async fn translate_answer_without_cached_answer_is_none() {
        let h = harness(
            FakeEmbedder::new(),
            Arc::new(MemoryVectorStore::new()),
            FakeTranslator::new(),
        );

        let outcome = h.pipeline.run("comedy about space").await.unwrap();
        assert!(h.pipeline.translate_answer(&outcome.state).await.is_none());
    }

    #[tokio::test]
    async fn inspect_uses_shallower_depth_and_no_generation() {
        let h = harness(
            FakeEmbedder::new(),
            Arc::new(seeded_store()),
            FakeTranslator::new(),
        );

        let inspection = h.pipeline.inspect("comedy about space").await.unwrap();

        assert_eq!(inspection.hits.len(), 2);
        assert_eq!(h.generator.call_count(), 0);
        let prompt = inspection.prompt.unwrap();
        assert!(prompt.system_instruction.contains("FORBIDDEN"));
        assert!(prompt.context_block.contains("Space Laughs"));
    }

    #[tokio::test]
    async fn inspect_on_empty_catalog_has_no_prompt() {
        let h = harness(
            FakeEmbedder::new(),
            Arc::new(MemoryVectorStore::new()),
            FakeTranslator::new(),
        );

        let inspection = h.pipeline.inspect("comedy about space").await.unwrap();
        assert!(inspection.hits.is_empty());
        assert!(inspection.prompt.is_none());
    }
}
