//! Builder that validates configuration and assembles a running scheduler.

use std::fmt;
use std::sync::Arc;

use crate::config::SchedulerConfig;
use crate::core::{
    ErrorClassifier, JobStarter, NoopObserver, Scheduler, SchedulerError, Spawn, StartObserver,
};
use crate::runtime::ShutdownSignal;

/// Assembles a [`Scheduler`] from its collaborators.
pub struct SchedulerBuilder<I, T, E, F> {
    config: SchedulerConfig,
    starter: Arc<dyn JobStarter<I, T, E>>,
    classifier: Arc<dyn ErrorClassifier<E, F>>,
    observer: Option<StartObserver<I, T, F>>,
}

impl<I, T, E, F> SchedulerBuilder<I, T, E, F>
where
    I: Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
    E: Send + 'static,
    F: Clone + fmt::Display + Send + Sync + 'static,
{
    /// Start a builder with the required collaborators.
    pub fn new(
        config: SchedulerConfig,
        starter: Arc<dyn JobStarter<I, T, E>>,
        classifier: Arc<dyn ErrorClassifier<E, F>>,
    ) -> Self {
        Self {
            config,
            starter,
            classifier,
            observer: None,
        }
    }

    /// Observe request lifecycle events. Defaults to a no-op observer.
    #[must_use]
    pub fn with_observer(mut self, observer: StartObserver<I, T, F>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Configuration the scheduler will be built with.
    pub const fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Validate the configuration, construct the scheduler and start its
    /// drain interval on `spawner`.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidConfig`] if validation fails.
    pub fn build<S>(
        self,
        spawner: &S,
        shutdown: &dyn ShutdownSignal,
    ) -> Result<Scheduler<I, T, E, F>, SchedulerError>
    where
        S: Spawn + Clone + Send + 'static,
    {
        self.config
            .validate()
            .map_err(SchedulerError::InvalidConfig)?;

        let observer = self.observer.unwrap_or_else(|| Arc::new(NoopObserver));
        let scheduler = Scheduler::new(
            self.config,
            self.starter,
            self.classifier,
            observer,
            shutdown,
        );
        scheduler.start(spawner);
        Ok(scheduler)
    }
}
