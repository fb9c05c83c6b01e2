//! Pipeline topology resolution.
//!
//! Matches the live workload inventory against the expected pipeline
//! stages: a fixed static set plus rule processors discovered from the
//! instance names. Rebuilt from scratch on every poll — the resolver never
//! keeps state between calls.

use serde::Serialize;

use crate::inventory::WorkloadInstance;

/// Fixed pipeline stages, in processing order: (key, label, match pattern).
const STATIC_STAGES: [(&str, &str, &str); 4] = [
    ("channel-router", "Channel Router", "channel-router"),
    ("monitoring", "Monitoring Service", "transaction-monitoring"),
    ("event-director", "Event Director", "event-director"),
    ("typology-processor", "Typology Processor", "typology-processor"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Healthy,
    Unhealthy,
    /// No live instance matched the component's pattern.
    Unknown,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComponentView {
    pub key: String,
    pub label: String,
    pub status: ComponentStatus,
    /// Name of the matched live instance, when one exists.
    pub instance: Option<String>,
    pub phase: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopologyView {
    pub components: Vec<ComponentView>,
    pub health_pct: u32,
}

/// Resolve component health from one immutable inventory snapshot.
pub fn resolve(inventory: &[WorkloadInstance]) -> TopologyView {
    let mut components = Vec::new();

    for (key, label, pattern) in STATIC_STAGES {
        components.push(component_view(key, label, pattern, inventory));
    }

    for id in discover_rule_ids(inventory) {
        let key = format!("rule-{id:03}");
        let label = format!("Rule {id:03}");
        components.push(component_view(&key, &label, &key, inventory));
    }

    let healthy = components
        .iter()
        .filter(|c| c.status == ComponentStatus::Healthy)
        .count();
    let total = components.len().max(1);
    let health_pct = (100.0 * healthy as f64 / total as f64).round() as u32;

    TopologyView {
        components,
        health_pct,
    }
}

fn component_view(
    key: &str,
    label: &str,
    pattern: &str,
    inventory: &[WorkloadInstance],
) -> ComponentView {
    // At most one instance per component: first name match wins.
    let matched = inventory.iter().find(|i| i.name.contains(pattern));
    let status = match matched {
        Some(i) if i.phase.eq_ignore_ascii_case("running") => ComponentStatus::Healthy,
        Some(_) => ComponentStatus::Unhealthy,
        None => ComponentStatus::Unknown,
    };
    ComponentView {
        key: key.to_string(),
        label: label.to_string(),
        status,
        instance: matched.map(|i| i.name.clone()),
        phase: matched.map(|i| i.phase.clone()),
    }
}

/// Discover distinct rule-stage ids from instance names matching the
/// three-digit `rule-NNN` naming convention. Ids sort numerically; for the
/// zero-padded three-digit convention this matches the padded string order.
fn discover_rule_ids(inventory: &[WorkloadInstance]) -> Vec<u32> {
    let mut ids: Vec<u32> = inventory
        .iter()
        .filter_map(|i| rule_id(&i.name))
        .collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// Extract the numeric suffix from a `rule-NNN` name segment: exactly three
/// digits after "rule-", not followed by a fourth.
fn rule_id(name: &str) -> Option<u32> {
    let mut rest = name;
    while let Some(pos) = rest.find("rule-") {
        let tail = &rest[pos + 5..];
        let digits: String = tail.chars().take_while(|c| c.is_ascii_digit()).collect();
        if digits.len() == 3 {
            return digits.parse().ok();
        }
        rest = &rest[pos + 5..];
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance(name: &str, phase: &str) -> WorkloadInstance {
        WorkloadInstance {
            name: name.to_string(),
            phase: phase.to_string(),
            ready: "1/1".to_string(),
            restarts: 0,
            node: None,
            ip: None,
            created_at: None,
            labels: Default::default(),
        }
    }

    #[test]
    fn empty_inventory_is_all_unknown_with_zero_health() {
        let view = resolve(&[]);
        assert_eq!(view.components.len(), 4);
        assert!(view
            .components
            .iter()
            .all(|c| c.status == ComponentStatus::Unknown));
        assert_eq!(view.health_pct, 0);
    }

    #[test]
    fn all_static_running_is_full_health() {
        let inventory = vec![
            instance("channel-router-7f9b", "Running"),
            instance("transaction-monitoring-abc1", "Running"),
            instance("event-director-xyz2", "Running"),
            instance("typology-processor-qrs3", "Running"),
        ];
        let view = resolve(&inventory);
        assert_eq!(view.components.len(), 4);
        assert_eq!(view.health_pct, 100);
    }

    #[test]
    fn pending_maps_to_unhealthy() {
        let inventory = vec![instance("event-director-1", "Pending")];
        let view = resolve(&inventory);
        let ed = view
            .components
            .iter()
            .find(|c| c.key == "event-director")
            .unwrap();
        assert_eq!(ed.status, ComponentStatus::Unhealthy);
    }

    #[test]
    fn failed_phase_maps_to_unhealthy() {
        let inventory = vec![instance("typology-processor-1", "CrashLoopBackOff")];
        let view = resolve(&inventory);
        let tp = view
            .components
            .iter()
            .find(|c| c.key == "typology-processor")
            .unwrap();
        assert_eq!(tp.status, ComponentStatus::Unhealthy);
    }

    #[test]
    fn discovers_rule_stages_sorted_ascending() {
        let inventory = vec![
            instance("rule-012-abc", "Running"),
            instance("rule-003-xyz", "Running"),
        ];
        let view = resolve(&inventory);
        let rules: Vec<&str> = view
            .components
            .iter()
            .filter(|c| c.key.starts_with("rule-"))
            .map(|c| c.key.as_str())
            .collect();
        assert_eq!(rules, vec!["rule-003", "rule-012"]);
    }

    #[test]
    fn duplicate_rule_instances_yield_one_component() {
        let inventory = vec![
            instance("rule-901-processor-a", "Running"),
            instance("rule-901-processor-b", "Running"),
        ];
        let view = resolve(&inventory);
        let rules: Vec<&ComponentView> = view
            .components
            .iter()
            .filter(|c| c.key.starts_with("rule-"))
            .collect();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].status, ComponentStatus::Healthy);
    }

    #[test]
    fn four_digit_suffixes_are_not_rule_stages() {
        assert_eq!(rule_id("rule-1234"), None);
        assert_eq!(rule_id("rule-012-abc"), Some(12));
        assert_eq!(rule_id("my-rule-099"), Some(99));
        assert_eq!(rule_id("ruleless"), None);
    }

    #[test]
    fn mixed_health_rounds_percentage() {
        // 4 static unknown + 2 rules healthy = 2/6 -> 33%.
        let inventory = vec![
            instance("rule-001-a", "Running"),
            instance("rule-002-b", "Running"),
        ];
        let view = resolve(&inventory);
        assert_eq!(view.components.len(), 6);
        assert_eq!(view.health_pct, 33);
    }
}
