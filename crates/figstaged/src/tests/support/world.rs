//! BDD test world: holds the loader, reporter, bootstrap outcome and a stage
//! fed through an in-process session channel.

use std::cell::RefCell;
use std::sync::Arc;
use std::sync::mpsc::{self, Sender};

use figstage_config::{Config, LayoutStrategy};

use crate::arrange::ArrangeStep;
use crate::bootstrap::{BootstrapError, ConfigLoader, Daemon, bootstrap_with};
use crate::frame::Session;
use crate::registry::SceneId;
use crate::stage::Stage;

use super::config_loader::{FailingConfigLoader, TestConfigLoader};
use super::reporter::RecordingStageReporter;

/// Scenario world shared across BDD steps.
pub struct TestWorld {
    loader: Box<dyn ConfigLoader>,
    pub reporter: Arc<RecordingStageReporter>,
    daemon: Option<Daemon>,
    bootstrap_error: Option<BootstrapError>,
    stage: Option<(Stage, Sender<Session>)>,
    last_step: Option<ArrangeStep>,
}

impl TestWorld {
    /// Builds a world with a successful configuration loader.
    #[must_use]
    pub fn new() -> Self {
        Self {
            loader: Box::new(TestConfigLoader::new()),
            reporter: Arc::new(RecordingStageReporter::default()),
            daemon: None,
            bootstrap_error: None,
            stage: None,
            last_step: None,
        }
    }

    /// Installs a loader that always fails.
    pub fn use_failing_loader(&mut self) {
        self.loader = Box::new(FailingConfigLoader);
        self.reset_results();
    }

    /// Installs a loader that succeeds.
    pub fn use_successful_loader(&mut self) {
        self.loader = Box::new(TestConfigLoader::new());
        self.reset_results();
    }

    /// Runs the bootstrap sequence once.
    pub fn bootstrap(&mut self) {
        if self.daemon.is_some() || self.bootstrap_error.is_some() {
            return;
        }
        match bootstrap_with(&*self.loader, self.reporter.clone()) {
            Ok(daemon) => self.daemon = Some(daemon),
            Err(error) => self.bootstrap_error = Some(error),
        }
    }

    /// Returns whether bootstrap produced an error.
    #[must_use]
    pub fn bootstrap_error(&self) -> Option<&BootstrapError> {
        self.bootstrap_error.as_ref()
    }

    /// Returns true when the daemon handle is available.
    #[must_use]
    pub fn daemon_started(&self) -> bool {
        self.daemon.is_some()
    }

    /// Builds a stage using `strategy` and default settings otherwise.
    pub fn build_stage(&mut self, strategy: LayoutStrategy) {
        let config = Config {
            layout_strategy: strategy,
            ..Config::default()
        };
        let (sender, sessions) = mpsc::channel();
        let stage = Stage::new(&config, sessions, self.reporter.clone());
        self.stage = Some((stage, sender));
    }

    /// Delivers one session of message bodies to the stage.
    pub fn deliver(&self, bodies: Vec<String>) -> Result<(), String> {
        let (_, sender) = self.stage.as_ref().ok_or("stage not built")?;
        sender
            .send(Session::new(bodies))
            .map_err(|error| format!("stage channel closed: {error}"))
    }

    /// Ticks the stage `count` times.
    pub fn tick(&mut self, count: usize) -> Result<(), String> {
        let stage = self.stage_mut()?;
        let mut last = None;
        for _ in 0..count {
            last = Some(stage.tick().arrange);
        }
        self.last_step = last;
        Ok(())
    }

    /// Arrangement outcome of the most recent tick.
    pub fn last_step(&self) -> Option<ArrangeStep> {
        self.last_step
    }

    pub fn stage(&self) -> Result<&Stage, String> {
        self.stage
            .as_ref()
            .map(|(stage, _)| stage)
            .ok_or_else(|| "stage not built".to_owned())
    }

    pub fn stage_mut(&mut self) -> Result<&mut Stage, String> {
        self.stage
            .as_mut()
            .map(|(stage, _)| stage)
            .ok_or_else(|| "stage not built".to_owned())
    }

    /// Handles of scenes still waiting on resolution.
    pub fn pending_scenes(&self) -> Result<Vec<SceneId>, String> {
        Ok(self
            .stage()?
            .registry()
            .iter()
            .filter(|(_, entry)| entry.is_pending())
            .map(|(id, _)| id)
            .collect())
    }

    fn reset_results(&mut self) {
        self.daemon = None;
        self.bootstrap_error = None;
    }
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Default test world fixture.
#[must_use]
pub fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::new())
}
