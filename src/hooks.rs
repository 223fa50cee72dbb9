//! Build-lifecycle hook shim.
//!
//! A [`HookRegistry`] maps phase names (`"run"`, `"emit"`, ...) to the handlers that should
//! fire when a host triggers that phase. Handlers run in registration order and a phase stops
//! at its first failing handler.

use anyhow::Context;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Something that reacts to a named build phase.
#[async_trait]
pub trait PhaseHandler: Send + Sync {
    /// Unique name for this handler.
    fn name(&self) -> &str;

    async fn on_phase(&self, phase: &str) -> anyhow::Result<()>;
}

/// Handlers keyed by phase name.
#[derive(Default)]
pub struct HookRegistry {
    phases: HashMap<String, Vec<Arc<dyn PhaseHandler>>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self {
            phases: HashMap::new(),
        }
    }

    /// Register `handler` for `phase`.
    ///
    /// A handler with the same name already on that phase is replaced in place.
    pub fn register(&mut self, phase: &str, handler: Arc<dyn PhaseHandler>) {
        let handlers = self.phases.entry(phase.to_string()).or_default();

        tracing::debug!("Registering {} on '{}' phase", handler.name(), phase);

        match handlers.iter_mut().find(|h| h.name() == handler.name()) {
            Some(slot) => *slot = handler,
            None => handlers.push(handler),
        }
    }

    /// Remove a handler by name from every phase. Returns whether anything was removed.
    pub fn unregister(&mut self, name: &str) -> bool {
        let mut found = false;
        for handlers in self.phases.values_mut() {
            let before = handlers.len();
            handlers.retain(|h| h.name() != name);
            found |= handlers.len() < before;
        }
        self.phases.retain(|_, handlers| !handlers.is_empty());
        found
    }

    pub fn handlers(&self, phase: &str) -> Vec<Arc<dyn PhaseHandler>> {
        self.phases.get(phase).cloned().unwrap_or_default()
    }

    /// Phase names with at least one handler, sorted.
    pub fn phases(&self) -> Vec<&str> {
        let mut phases: Vec<&str> = self.phases.keys().map(String::as_str).collect();
        phases.sort_unstable();
        phases
    }

    pub fn count(&self) -> usize {
        self.phases.values().map(Vec::len).sum()
    }

    /// Fire `phase`, awaiting each handler in turn.
    ///
    /// Returns how many handlers ran. The first failure is returned with the handler name
    /// attached and the remaining handlers are not run.
    pub async fn trigger(&self, phase: &str) -> anyhow::Result<usize> {
        let handlers = self.handlers(phase);
        if handlers.is_empty() {
            tracing::debug!("No handlers for '{}' phase", phase);
            return Ok(0);
        }

        for handler in &handlers {
            handler
                .on_phase(phase)
                .await
                .with_context(|| format!("{} failed during '{}' phase", handler.name(), phase))?;
        }

        Ok(handlers.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Recorder {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
        fail: bool,
    }

    impl Recorder {
        fn new(name: &'static str, log: &Arc<Mutex<Vec<String>>>) -> Arc<Self> {
            Arc::new(Self {
                name,
                log: Arc::clone(log),
                fail: false,
            })
        }

        fn failing(name: &'static str, log: &Arc<Mutex<Vec<String>>>) -> Arc<Self> {
            Arc::new(Self {
                name,
                log: Arc::clone(log),
                fail: true,
            })
        }
    }

    #[async_trait]
    impl PhaseHandler for Recorder {
        fn name(&self) -> &str {
            self.name
        }

        async fn on_phase(&self, phase: &str) -> anyhow::Result<()> {
            self.log.lock().unwrap().push(format!("{}:{}", self.name, phase));
            if self.fail {
                anyhow::bail!("boom");
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_trigger_runs_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = HookRegistry::new();
        registry.register("run", Recorder::new("first", &log));
        registry.register("run", Recorder::new("second", &log));
        registry.register("emit", Recorder::new("other", &log));

        let ran = registry.trigger("run").await.unwrap();

        assert_eq!(ran, 2);
        assert_eq!(*log.lock().unwrap(), vec!["first:run", "second:run"]);
    }

    #[tokio::test]
    async fn test_trigger_unknown_phase() {
        let registry = HookRegistry::new();
        assert_eq!(registry.trigger("done").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_trigger_stops_at_first_failure() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = HookRegistry::new();
        registry.register("run", Recorder::failing("broken", &log));
        registry.register("run", Recorder::new("after", &log));

        let err = registry.trigger("run").await.unwrap_err();

        assert!(err.to_string().contains("broken failed during 'run' phase"));
        assert_eq!(*log.lock().unwrap(), vec!["broken:run"]);
    }

    #[test]
    fn test_register_replaces_same_name() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = HookRegistry::new();
        registry.register("run", Recorder::new("a", &log));
        registry.register("run", Recorder::new("b", &log));
        registry.register("run", Recorder::new("a", &log));

        let names: Vec<String> = registry
            .handlers("run")
            .iter()
            .map(|h| h.name().to_string())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(registry.count(), 2);
    }

    #[test]
    fn test_unregister() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = HookRegistry::new();
        registry.register("run", Recorder::new("a", &log));
        registry.register("emit", Recorder::new("a", &log));
        registry.register("emit", Recorder::new("b", &log));

        assert!(registry.unregister("a"));
        assert!(!registry.unregister("a"));
        assert_eq!(registry.phases(), vec!["emit"]);
        assert_eq!(registry.count(), 1);
    }
}
