use crate::config::MiddlewareConfig;
use crate::error::{Error, Result};
use crate::middleware::blueprint::MiddlewareBlueprint;
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};

const MAX_ALIAS_HOPS: usize = 32;

/// Resolves middleware names into ordered blueprint lists.
///
/// A name is either a literal implementation id, a registered alias, or a
/// group that expands (recursively) to further names. `:`-suffixed arguments
/// are split off and carried on the blueprint. After expansion the list is
/// deduplicated and stably sorted against the configured priority list:
/// prioritized ids run first, in list order; everything else keeps its
/// original relative order behind them.
#[derive(Debug, Clone, Default)]
pub struct MiddlewareStack {
    aliases: HashMap<String, String>,
    groups: IndexMap<String, Vec<String>>,
    priority: Vec<String>,
    global_groups: Vec<String>,
    always_run_without_route: Vec<String>,
}

impl MiddlewareStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &MiddlewareConfig) -> Self {
        Self {
            aliases: config.aliases.clone(),
            groups: config.groups.clone(),
            priority: config.priority.clone(),
            global_groups: config.global.clone(),
            always_run_without_route: config.always_run_without_route.clone(),
        }
    }

    /// Register an alias pointing at an implementation id (optionally with
    /// bound arguments, e.g. `"signed" => "validate_signature:absolute"`).
    pub fn alias(mut self, name: &str, target: &str) -> Self {
        self.aliases.insert(name.to_string(), target.to_string());
        self
    }

    pub fn group(mut self, name: &str, entries: &[&str]) -> Self {
        self.groups
            .insert(name.to_string(), entries.iter().map(|e| e.to_string()).collect());
        self
    }

    /// Middleware ids that must run before all unlisted ones, in this order.
    pub fn priority(mut self, ids: &[&str]) -> Self {
        self.priority = ids.iter().map(|id| id.to_string()).collect();
        self
    }

    /// Mark a group as global: the kernel runs it for every request.
    pub fn run_globally(mut self, group: &str) -> Self {
        self.global_groups.push(group.to_string());
        self
    }

    /// Mark a global group to run even when no route matched.
    pub fn always_run_if_no_route(mut self, group: &str) -> Self {
        self.always_run_without_route.push(group.to_string());
        self
    }

    /// Resolve the middleware for a matched route (route middleware merged
    /// with controller middleware by the caller).
    pub fn create_with_route_middleware(&self, names: &[String]) -> Result<Vec<MiddlewareBlueprint>> {
        self.resolve(names.iter().map(String::as_str))
    }

    /// Resolve the global groups configured to run even without a route
    /// match. Empty unless groups were marked with
    /// [`always_run_if_no_route`](Self::always_run_if_no_route).
    pub fn create_for_request_without_route(&self) -> Result<Vec<MiddlewareBlueprint>> {
        self.resolve(self.always_run_without_route.iter().map(String::as_str))
    }

    /// Resolve the global groups for the kernel's outer chain.
    pub fn global_middleware(&self) -> Result<Vec<MiddlewareBlueprint>> {
        self.resolve(self.global_groups.iter().map(String::as_str))
    }

    fn resolve<'a>(&self, names: impl Iterator<Item = &'a str>) -> Result<Vec<MiddlewareBlueprint>> {
        let mut expanded = Vec::new();
        let mut visiting = Vec::new();
        for name in names {
            self.expand_into(name, &mut expanded, &mut visiting)?;
        }
        Ok(self.finalize(expanded))
    }

    fn expand_into(
        &self,
        entry: &str,
        out: &mut Vec<MiddlewareBlueprint>,
        visiting: &mut Vec<String>,
    ) -> Result<()> {
        if let Some(entries) = self.groups.get(entry) {
            if visiting.iter().any(|v| v == entry) {
                return Err(Error::MiddlewareCycle(entry.to_string()));
            }
            visiting.push(entry.to_string());
            for entry in entries {
                self.expand_into(entry, out, visiting)?;
            }
            visiting.pop();
            return Ok(());
        }

        let mut blueprint = MiddlewareBlueprint::parse(entry);

        let mut hops = 0;
        while let Some(target) = self.aliases.get(blueprint.id()) {
            hops += 1;
            if hops > MAX_ALIAS_HOPS {
                return Err(Error::MiddlewareCycle(blueprint.id().to_string()));
            }
            let target = MiddlewareBlueprint::parse(target);
            // Arguments bound on the alias come before usage-site arguments
            let mut arguments = target.arguments().to_vec();
            arguments.extend(blueprint.arguments().iter().cloned());
            blueprint = MiddlewareBlueprint::with_arguments(target.id(), arguments);
        }

        out.push(blueprint);
        Ok(())
    }

    /// Deduplicate (first occurrence wins) and apply the priority ordering:
    /// a stable sort on the id's position in the priority list, with unlisted
    /// ids ranked last so they trail the prioritized group in their original
    /// relative order.
    fn finalize(&self, expanded: Vec<MiddlewareBlueprint>) -> Vec<MiddlewareBlueprint> {
        let mut seen = HashSet::new();
        let mut list: Vec<MiddlewareBlueprint> = expanded
            .into_iter()
            .filter(|blueprint| seen.insert(blueprint.clone()))
            .collect();

        list.sort_by_key(|blueprint| {
            self.priority
                .iter()
                .position(|id| id == blueprint.id())
                .unwrap_or(usize::MAX)
        });

        list
    }
}
