use anyhow::{bail, Result};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use dramaflow::queue::{
    FailureInjector, NeverFail, QueueOutcome, QueueRunner, QueueSettings, RandomFailure, RandomProgress,
    TaskQueueSimulator, TaskSpec, TaskStage,
};
use dramaflow::workflow::ExtractionEvent;
use dramaflow::{DramaflowConfig, Project, ProjectStore};

const DEMO_PROJECT: &str = "demo";

pub struct SimulateCommand {
    pub episodes: u32,
    pub languages: Vec<String>,
    pub tick_ms: Option<u64>,
    pub seed: Option<u64>,
}

impl SimulateCommand {
    pub fn new(episodes: u32, languages: Vec<String>) -> Self {
        Self {
            episodes,
            languages,
            tick_ms: None,
            seed: None,
        }
    }

    pub fn with_tick_ms(mut self, tick_ms: Option<u64>) -> Self {
        self.tick_ms = tick_ms;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub async fn execute(&self, config: &DramaflowConfig) -> Result<()> {
        if self.episodes == 0 {
            bail!("A project needs at least one episode");
        }

        let mut settings = config.queue_settings();
        if let Some(tick_ms) = self.tick_ms {
            if tick_ms == 0 {
                bail!("--tick-ms must be at least 1");
            }
            settings.tick_interval = Duration::from_millis(tick_ms);
        }

        // Ctrl-C cancels whichever queue is running
        let shutdown = CancellationToken::new();
        let _guard = shutdown.clone().drop_guard();
        let on_signal = shutdown.clone();
        tokio::spawn(async move {
            tokio::select! {
                result = tokio::signal::ctrl_c() => match result {
                    Ok(()) => {
                        tracing::info!("Received Ctrl-C, cancelling the running queue");
                        on_signal.cancel();
                    }
                    Err(error) => tracing::warn!(error = %error, "Failed to install Ctrl-C handler"),
                },
                _ = on_signal.cancelled() => {}
            }
        });

        let languages: Vec<&str> = self.languages.iter().map(String::as_str).collect();
        let mut store = ProjectStore::new(config.workflow_settings());
        store.add_project(Project::new(DEMO_PROJECT, "Demo Drama", "zh", self.episodes, &languages)?)?;
        let source_id = store.project(DEMO_PROJECT)?.source_variant()?.id().to_string();

        println!("🎬 Demo project with {} episodes, targets: {}", self.episodes, self.languages.join(", "));
        println!();

        store.apply_extraction(DEMO_PROJECT, &source_id, ExtractionEvent::StartExtraction)?;
        println!("🔍 AI extraction started");
        self.run_stage(
            &mut store,
            &source_id,
            TaskStage::Extraction,
            ExtractionEvent::QueueDrained,
            &settings,
            &shutdown,
        )
        .await?;

        println!("✍️  Confirming extracted episodes...");
        let mut next = Some(1);
        while let Some(episode) = next {
            next = store.confirm_episode(DEMO_PROJECT, &source_id, episode)?;
        }
        store.apply_extraction(DEMO_PROJECT, &source_id, ExtractionEvent::ConfirmAll)?;
        println!("✅ Extraction confirmed");

        store.apply_extraction(DEMO_PROJECT, &source_id, ExtractionEvent::StartTranslation)?;
        println!("🌐 AI translation started");
        self.run_stage(
            &mut store,
            &source_id,
            TaskStage::AiTranslation,
            ExtractionEvent::TranslationDrained,
            &settings,
            &shutdown,
        )
        .await?;

        println!();
        println!("📊 Variant status:");
        for variant in store.project(DEMO_PROJECT)?.variants() {
            let report = variant.status_report();
            println!(
                "   {} [{}] {} ({}%)",
                report.language, report.variant_id, report.stage_label, report.progress_percent
            );
        }
        Ok(())
    }

    /// A seeded run seeds both the progress and the failure rng
    fn build_simulator(&self, specs: Vec<TaskSpec>, settings: &QueueSettings) -> TaskQueueSimulator {
        let progress = match self.seed {
            Some(seed) => RandomProgress::seeded(settings.min_increment, settings.max_increment, seed),
            None => RandomProgress::new(settings.min_increment, settings.max_increment),
        };
        let failures: Box<dyn FailureInjector + Send> = match (self.seed, settings.failure_rate > 0.0) {
            (_, false) => Box::new(NeverFail),
            // Offset so failures do not mirror the progress stream
            (Some(seed), true) => Box::new(RandomFailure::seeded(settings.failure_rate, seed.wrapping_add(1))),
            (None, true) => Box::new(RandomFailure::new(settings.failure_rate)),
        };
        TaskQueueSimulator::with_sources(specs, settings.max_concurrency, Box::new(progress), failures)
    }

    async fn run_stage(
        &self,
        store: &mut ProjectStore,
        source_id: &str,
        stage: TaskStage,
        on_drain: ExtractionEvent,
        settings: &QueueSettings,
        shutdown: &CancellationToken,
    ) -> Result<()> {
        let specs = TaskSpec::per_episode(source_id, stage, self.episodes);
        let simulator = self.build_simulator(specs, settings);
        let mut runner = QueueRunner::new(stage.as_str(), simulator, settings, shutdown.child_token());

        let mut transition = None;
        let outcome = runner
            .run_observed(
                || transition = Some(store.apply_extraction(DEMO_PROJECT, source_id, on_drain)),
                |report| {
                    println!(
                        "   ⏱️  tick {:>3}: {} waiting, {} processing, {} done, {} failed",
                        report.tick,
                        report.counts.waiting,
                        report.counts.processing,
                        report.counts.completed,
                        report.counts.failed
                    );
                },
            )
            .await;

        match outcome {
            QueueOutcome::Completed { ticks } => {
                if let Some(result) = transition {
                    result?;
                }
                println!("   ✅ {} queue drained after {} ticks", stage.as_str(), ticks);
                Ok(())
            }
            QueueOutcome::Drained { failed, .. } => {
                bail!("{} queue finished with {} failed tasks", stage.as_str(), failed.len())
            }
            QueueOutcome::Cancelled { .. } => bail!("{} queue was cancelled", stage.as_str()),
        }
    }
}
