//! Platform-agnostic application bootstrap for Stagehand.
//!
//! Provides `Stage` (engine container), `StageBuilder` (collaborator injection),
//! `load_config` (JSON configuration with defaults) and the host adapters in [`adapters`].

pub mod adapters;

use std::path::Path;
use std::sync::Arc;

use stagehand_core::config::StageConfig;
use stagehand_core::error::{CoreError, CoreResult};
use stagehand_core::services::{
    AnchorRegistry, Highlighter, ModalHandle, ModalPresenter, ModalQueue, ModalSequence,
    NavigationStack, StageContext, TransitionRegistry, TutorialController, TutorialProgress,
};
use stagehand_core::traits::{
    Animator, AssetLoader, AudioSink, InMemoryKeyValueStore, InstantAnimator, KeyValueStore,
    NodeHandle, NoopAudioSink,
};
use stagehand_core::types::{ModalRequest, TutorialStep};

/// Load `StageConfig` from a JSON file.
///
/// A missing file yields the defaults; an unreadable or invalid file is an error.
pub fn load_config(path: &Path) -> CoreResult<StageConfig> {
    if !path.exists() {
        log::info!("Config file {} not found, using defaults", path.display());
        return Ok(StageConfig::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config = StageConfig::from_json_str(&content)?;
    log::info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Platform-agnostic stage.
///
/// Holds the three engines and the shared `StageContext`. Every frontend
/// constructs this once at startup via `StageBuilder`.
pub struct Stage {
    /// Stage context (holds all collaborators)
    pub ctx: Arc<StageContext>,
    /// Full-screen navigation stack on the viewport
    pub navigation: Arc<NavigationStack>,
    /// Modal presenter on the overlay
    pub presenter: Arc<ModalPresenter>,
    /// FIFO modal queue in front of the presenter
    pub modals: Arc<ModalQueue>,
    /// Tutorial highlight on the overlay
    pub highlighter: Arc<Highlighter>,
    /// Persisted tutorial progress
    pub progress: Arc<TutorialProgress>,
}

impl Stage {
    pub fn anchors(&self) -> &Arc<AnchorRegistry> {
        &self.ctx.anchors
    }

    pub fn transitions(&self) -> &Arc<TransitionRegistry> {
        &self.ctx.transitions
    }

    pub fn config(&self) -> &StageConfig {
        &self.ctx.config
    }

    /// Enqueue a modal.
    pub fn show_modal(&self, request: ModalRequest) -> ModalHandle {
        self.modals.show(request)
    }

    /// Create a wizard over the modal queue.
    pub fn sequence(&self, requests: Vec<ModalRequest>) -> ModalSequence {
        ModalSequence::new(Arc::clone(&self.modals), requests)
    }

    /// Create a tutorial controller wired to this stage's queue, highlight and progress.
    pub fn tutorial(
        &self,
        tutorial_id: impl Into<String>,
        steps: Vec<TutorialStep>,
    ) -> Arc<TutorialController> {
        TutorialController::new(
            tutorial_id,
            steps,
            &self.ctx,
            Arc::clone(&self.modals),
            Arc::clone(&self.highlighter),
            Some(Arc::clone(&self.progress)),
        )
    }

    /// Drop pending modals, dismiss the active one and remove the highlight.
    pub fn shutdown(&self) {
        self.modals.clear();
        self.modals.dismiss_active();
        self.highlighter.dispose();
        log::info!("Stage shut down");
    }
}

/// Builder for constructing `Stage` with platform-specific collaborators.
///
/// # Required
/// - `loader`: how templates are instantiated
/// - `viewport`: root node for full-screen views
///
/// # Optional
/// - `overlay`: root node for modals and highlights, defaults to `viewport`
/// - `animator`: defaults to `InstantAnimator`
/// - `audio`: defaults to `NoopAudioSink`
/// - `store`: defaults to `InMemoryKeyValueStore`
/// - `transitions`: defaults to the built-in strategies
/// - `config`: defaults to `StageConfig::default()`
pub struct StageBuilder {
    loader: Option<Arc<dyn AssetLoader>>,
    animator: Option<Arc<dyn Animator>>,
    audio: Option<Arc<dyn AudioSink>>,
    store: Option<Arc<dyn KeyValueStore>>,
    transitions: Option<Arc<TransitionRegistry>>,
    viewport: Option<NodeHandle>,
    overlay: Option<NodeHandle>,
    config: StageConfig,
}

impl StageBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            loader: None,
            animator: None,
            audio: None,
            store: None,
            transitions: None,
            viewport: None,
            overlay: None,
            config: StageConfig::default(),
        }
    }

    #[must_use]
    pub fn loader(mut self, loader: Arc<dyn AssetLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    #[must_use]
    pub fn animator(mut self, animator: Arc<dyn Animator>) -> Self {
        self.animator = Some(animator);
        self
    }

    #[must_use]
    pub fn audio(mut self, audio: Arc<dyn AudioSink>) -> Self {
        self.audio = Some(audio);
        self
    }

    #[must_use]
    pub fn store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    #[must_use]
    pub fn transitions(mut self, transitions: Arc<TransitionRegistry>) -> Self {
        self.transitions = Some(transitions);
        self
    }

    #[must_use]
    pub fn viewport(mut self, viewport: NodeHandle) -> Self {
        self.viewport = Some(viewport);
        self
    }

    #[must_use]
    pub fn overlay(mut self, overlay: NodeHandle) -> Self {
        self.overlay = Some(overlay);
        self
    }

    #[must_use]
    pub fn config(mut self, config: StageConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the `Stage`.
    ///
    /// # Errors
    /// Returns `CoreError::InvalidConfig` if a required collaborator is missing
    /// or the configuration fails validation.
    pub fn build(self) -> CoreResult<Stage> {
        self.config.validate()?;

        let loader = self
            .loader
            .ok_or_else(|| CoreError::InvalidConfig("loader is required".to_string()))?;
        let viewport = self
            .viewport
            .ok_or_else(|| CoreError::InvalidConfig("viewport is required".to_string()))?;
        let overlay = self.overlay.unwrap_or_else(|| Arc::clone(&viewport));
        let animator = self.animator.unwrap_or_else(|| Arc::new(InstantAnimator));
        let audio = self.audio.unwrap_or_else(|| Arc::new(NoopAudioSink));
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(InMemoryKeyValueStore::new()));
        let transitions = self.transitions.unwrap_or_else(|| {
            Arc::new(TransitionRegistry::with_builtins(
                self.config.navigation.default_transition,
            ))
        });

        let ctx = Arc::new(StageContext::new(
            loader,
            animator,
            audio,
            Arc::clone(&store),
            Arc::new(AnchorRegistry::new()),
            transitions,
            self.config,
        ));

        let navigation = NavigationStack::new("main", Arc::clone(&ctx), viewport);
        let presenter = ModalPresenter::new(Arc::clone(&ctx), Arc::clone(&overlay));
        let modals = ModalQueue::new(Arc::clone(&presenter));
        let highlighter = Arc::new(Highlighter::new(&ctx, overlay));
        let progress = Arc::new(TutorialProgress::new(store));

        log::info!("Stage built");
        Ok(Stage {
            ctx,
            navigation,
            presenter,
            modals,
            highlighter,
            progress,
        })
    }
}

impl Default for StageBuilder {
    fn default() -> Self {
        Self::new()
    }
}
