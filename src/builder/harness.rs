use crate::builder::services::ServiceLocator;
use crate::config::FixtureConfig;
use crate::core::Context;
use crate::domain::model::{DSpaceObject, ObjectType};
use crate::utils::error::{ErrorCategory, RepoError, Result};
use crate::utils::logger;
use anyhow::Context as _;
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};

/// Teardown order: lower runs first.
pub mod priority {
    pub const ITEM: i32 = 100;
    pub const EPERSON: i32 = 200;
    pub const GROUP: i32 = 300;
    pub const COLLECTION: i32 = 400;
    pub const COMMUNITY: i32 = 500;
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Collects failures raised inside builder chains so tests can assert on them.
#[derive(Debug, Clone, Default)]
pub struct ErrorSink {
    errors: Arc<Mutex<Vec<RepoError>>>,
}

impl ErrorSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_exception(&self, err: RepoError) {
        tracing::error!(category = ?err.category(), "❌ builder failure: {}", err);
        lock(&self.errors).push(err);
    }

    /// Returns the value, or records the error and returns `None`.
    pub fn capture<T>(&self, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.handle_exception(err);
                None
            }
        }
    }

    pub fn has_errors(&self) -> bool {
        !lock(&self.errors).is_empty()
    }

    pub fn len(&self) -> usize {
        lock(&self.errors).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn messages(&self) -> Vec<String> {
        lock(&self.errors).iter().map(|e| e.to_string()).collect()
    }

    pub fn categories(&self) -> Vec<ErrorCategory> {
        lock(&self.errors).iter().map(|e| e.category()).collect()
    }

    pub fn take(&self) -> Vec<RepoError> {
        std::mem::take(&mut *lock(&self.errors))
    }
}

/// A teardown hook run after the owning test finishes.
#[async_trait]
pub trait Cleanup: Send + Sync {
    fn priority(&self) -> i32;
    fn describe(&self) -> String;
    async fn cleanup(&self) -> anyhow::Result<()>;
}

#[derive(Clone, Default)]
pub struct CleanupRegistry {
    hooks: Arc<Mutex<Vec<Box<dyn Cleanup>>>>,
}

impl CleanupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, hook: impl Cleanup + 'static) {
        tracing::trace!(hook = %hook.describe(), "registered cleanup");
        lock(&self.hooks).push(Box::new(hook));
    }

    pub fn len(&self) -> usize {
        lock(&self.hooks).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drains and runs every hook: by ascending priority, newest first within a priority.
    /// A failing hook does not stop the rest.
    pub async fn run_all(&self) -> Vec<anyhow::Error> {
        let mut hooks = std::mem::take(&mut *lock(&self.hooks));
        hooks.reverse();
        hooks.sort_by_key(|h| h.priority());

        let mut failures = Vec::new();
        for hook in hooks {
            if let Err(err) = hook.cleanup().await {
                tracing::warn!(hook = %hook.describe(), "cleanup failed: {:#}", err);
                failures.push(err);
            }
        }
        failures
    }
}

/// Generic teardown for a repository object: reload in a fresh session, delete if still present.
pub struct ObjectCleanup {
    services: ServiceLocator,
    id: uuid::Uuid,
    object_type: ObjectType,
    priority: i32,
}

impl ObjectCleanup {
    pub fn new(services: ServiceLocator, object: &DSpaceObject, priority: i32) -> Self {
        Self {
            services,
            id: object.id(),
            object_type: object.object_type(),
            priority,
        }
    }
}

#[async_trait]
impl Cleanup for ObjectCleanup {
    fn priority(&self) -> i32 {
        self.priority
    }

    fn describe(&self) -> String {
        format!("{} {}", self.object_type, self.id)
    }

    async fn cleanup(&self) -> anyhow::Result<()> {
        let ctx = self.services.cleanup_context()?;
        let Some(object) = ctx.store().get_object(self.id).await else {
            tracing::debug!(object = %self.describe(), "already removed");
            return Ok(());
        };
        self.services
            .delete_object(&ctx, &object)
            .await
            .with_context(|| format!("deleting {}", self.describe()))?;
        ctx.complete().await?;
        Ok(())
    }
}

/// Everything a builder needs besides the caller's session.
#[derive(Clone)]
pub struct FixtureHarness {
    services: ServiceLocator,
    errors: ErrorSink,
    cleanups: CleanupRegistry,
}

impl FixtureHarness {
    pub fn new(services: ServiceLocator) -> Self {
        Self {
            services,
            errors: ErrorSink::new(),
            cleanups: CleanupRegistry::new(),
        }
    }

    pub fn in_memory(config: FixtureConfig) -> Self {
        Self::new(ServiceLocator::in_memory(config))
    }

    /// Loads a fixture config file, installs the logger with its filter and
    /// wires an in-memory harness.
    pub fn from_config_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config = FixtureConfig::from_file(path)?;
        if !logger::init_logger(&config.logging.filter) {
            tracing::debug!("logger already installed, keeping it");
        }
        Ok(Self::in_memory(config))
    }

    pub fn services(&self) -> &ServiceLocator {
        &self.services
    }

    pub fn errors(&self) -> &ErrorSink {
        &self.errors
    }

    pub fn cleanups(&self) -> &CleanupRegistry {
        &self.cleanups
    }

    pub fn new_context(&self) -> Context {
        self.services.new_context()
    }

    /// A session with authorization turned off, as test set-up code usually wants.
    pub fn admin_context(&self) -> Context {
        let ctx = self.new_context();
        ctx.turn_off_authorisation_system();
        ctx
    }

    pub async fn teardown(&self) -> Vec<anyhow::Error> {
        let failures = self.cleanups.run_all().await;
        if !failures.is_empty() {
            tracing::warn!(failed = failures.len(), "teardown finished with failures");
        }
        failures
    }
}

impl Default for FixtureHarness {
    fn default() -> Self {
        Self::new(ServiceLocator::default())
    }
}
