//! Probe registry
//!
//! A static mapping from probe identifier to probe, partitioned into ordered
//! tiers (stage1 = fastest/most essential, stage3 = exhaustive). The registry
//! performs no execution and knows nothing about timeouts or concurrency; it
//! is read-only during a run and safe to share across concurrent runs.

use std::collections::HashSet;
use std::future::Future;
use std::rc::Rc;

use futures::future::LocalBoxFuture;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::probes::ProbeContext;

/// What a probe reports back: a serializable reading, or a statement that
/// the underlying API does not exist in this environment.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeReading {
    Available(Value),
    Unavailable,
}

impl ProbeReading {
    /// Wrap a serializable value as an available reading.
    pub fn value<T: serde::Serialize>(v: T) -> Result<Self> {
        let json = serde_json::to_value(v)
            .map_err(|e| Error::Probe(format!("unserializable probe value: {}", e)))?;
        Ok(ProbeReading::Available(json))
    }
}

/// The pending computation a probe hands back to the engine.
pub type ProbeFuture = LocalBoxFuture<'static, Result<ProbeReading>>;

/// A registered probe: invoked once per run with the run's shared context,
/// yields a reading or fails. Stateless from the engine's point of view.
pub type ProbeFn = Rc<dyn Fn(Rc<ProbeContext>) -> ProbeFuture>;

/// Adapt a synchronous snapshot function into a probe.
pub fn sync_probe<F>(f: F) -> ProbeFn
where
    F: Fn(&ProbeContext) -> Result<ProbeReading> + 'static,
{
    Rc::new(move |ctx: Rc<ProbeContext>| -> ProbeFuture {
        Box::pin(futures::future::ready(f(&ctx)))
    })
}

/// Adapt an asynchronous function into a probe.
pub fn async_probe<F, Fut>(f: F) -> ProbeFn
where
    F: Fn(Rc<ProbeContext>) -> Fut + 'static,
    Fut: Future<Output = Result<ProbeReading>> + 'static,
{
    Rc::new(move |ctx: Rc<ProbeContext>| -> ProbeFuture { Box::pin(f(ctx)) })
}

/// An ordered, named group of probes sharing a priority/cost class.
pub struct Tier {
    name: String,
    entries: Vec<(String, ProbeFn)>,
}

impl Tier {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[(String, ProbeFn)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Registry of probes, partitioned into tiers processed in declared order.
#[derive(Default)]
pub struct ProbeRegistry {
    tiers: Vec<Tier>,
    ids: HashSet<String>,
}

impl ProbeRegistry {
    pub fn new() -> Self {
        Self {
            tiers: Vec::new(),
            ids: HashSet::new(),
        }
    }

    /// Add a probe to a tier, creating the tier on first mention.
    ///
    /// Tier order is first-registration order; order within a tier is
    /// insertion order. An id already present in any tier is rejected —
    /// silently shadowing an earlier probe would make the output depend on
    /// registration order.
    pub fn register(&mut self, tier: &str, id: &str, probe: ProbeFn) -> Result<()> {
        if self.ids.contains(id) {
            let owner = self
                .tiers
                .iter()
                .find(|t| t.entries.iter().any(|(eid, _)| eid == id))
                .map(|t| t.name.clone())
                .unwrap_or_default();
            return Err(Error::DuplicateId {
                id: id.to_string(),
                tier: owner,
            });
        }

        let tier_slot = match self.tiers.iter_mut().find(|t| t.name == tier) {
            Some(t) => t,
            None => {
                self.tiers.push(Tier {
                    name: tier.to_string(),
                    entries: Vec::new(),
                });
                self.tiers.last_mut().expect("tier just pushed")
            }
        };

        tier_slot.entries.push((id.to_string(), probe));
        self.ids.insert(id.to_string());
        Ok(())
    }

    /// Tiers in declared order.
    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    /// Total number of registered probes across all tiers.
    pub fn total_probes(&self) -> usize {
        self.tiers.iter().map(Tier::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn noop_probe() -> ProbeFn {
        sync_probe(|_| ProbeReading::value(json!(true)))
    }

    #[test]
    fn test_register_and_order() {
        let mut registry = ProbeRegistry::new();
        registry.register("stage1", "a", noop_probe()).unwrap();
        registry.register("stage2", "b", noop_probe()).unwrap();
        registry.register("stage1", "c", noop_probe()).unwrap();

        let tiers = registry.tiers();
        assert_eq!(tiers.len(), 2);
        assert_eq!(tiers[0].name(), "stage1");
        assert_eq!(tiers[1].name(), "stage2");

        // Insertion order within a tier
        let ids: Vec<&str> = tiers[0].entries().iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(registry.total_probes(), 3);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut registry = ProbeRegistry::new();
        registry.register("stage1", "a", noop_probe()).unwrap();

        // Same tier
        let err = registry.register("stage1", "a", noop_probe()).unwrap_err();
        assert!(matches!(err, Error::DuplicateId { .. }));

        // Different tier — still rejected
        let err = registry.register("stage2", "a", noop_probe()).unwrap_err();
        match err {
            Error::DuplicateId { id, tier } => {
                assert_eq!(id, "a");
                assert_eq!(tier, "stage1");
            }
            other => panic!("expected DuplicateId, got {:?}", other),
        }

        // Registry unchanged by the rejected registrations
        assert_eq!(registry.total_probes(), 1);
    }

    #[test]
    fn test_empty_registry() {
        let registry = ProbeRegistry::new();
        assert!(registry.tiers().is_empty());
        assert_eq!(registry.total_probes(), 0);
    }
}
