use std::time::Duration;

/// Default ceiling on the number of projects.
pub const DEFAULT_MAX_PROJECTS: usize = 10;

/// Default ceiling on the number of tasks in a single project.
pub const DEFAULT_MAX_TASKS_PER_PROJECT: usize = 50;

/// Default overdue-job interval, in minutes.
pub const DEFAULT_SCHEDULER_INTERVAL_MINUTES: u64 = 1;

/// Longest accepted overdue-job interval: one week.
pub const MAX_SCHEDULER_INTERVAL_MINUTES: u64 = 7 * 24 * 60;

/// Business limits and maintenance schedule, passed explicitly into the
/// service and the overdue job at construction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoConfig {
    pub max_projects: usize,
    pub max_tasks_per_project: usize,
    pub scheduler_interval: Duration,
}

impl Default for TodoConfig {
    fn default() -> Self {
        Self {
            max_projects: DEFAULT_MAX_PROJECTS,
            max_tasks_per_project: DEFAULT_MAX_TASKS_PER_PROJECT,
            scheduler_interval: minutes(DEFAULT_SCHEDULER_INTERVAL_MINUTES),
        }
    }
}

impl TodoConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                      | Legacy alias            | Default |
    /// |------------------------------|-------------------------|---------|
    /// | `MAX_NUMBER_OF_PROJECT`      | `PROJECT_OF_NUMBER_MAX` | `10`    |
    /// | `MAX_NUMBER_OF_TASK`         | `TASK_OF_NUMBER_MAX`    | `50`    |
    /// | `SCHEDULER_INTERVAL_MINUTES` |                         | `1`     |
    ///
    /// Unparsable or non-positive values fall back to the default, as does an
    /// interval longer than [`MAX_SCHEDULER_INTERVAL_MINUTES`].
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let max_projects = first_positive(
            &lookup,
            &["MAX_NUMBER_OF_PROJECT", "PROJECT_OF_NUMBER_MAX"],
        )
        .unwrap_or(DEFAULT_MAX_PROJECTS as u64) as usize;

        let max_tasks_per_project =
            first_positive(&lookup, &["MAX_NUMBER_OF_TASK", "TASK_OF_NUMBER_MAX"])
                .unwrap_or(DEFAULT_MAX_TASKS_PER_PROJECT as u64) as usize;

        let interval_minutes = first_positive(&lookup, &["SCHEDULER_INTERVAL_MINUTES"])
            .filter(|m| *m <= MAX_SCHEDULER_INTERVAL_MINUTES)
            .unwrap_or(DEFAULT_SCHEDULER_INTERVAL_MINUTES);

        Self {
            max_projects,
            max_tasks_per_project,
            scheduler_interval: minutes(interval_minutes),
        }
    }
}

fn minutes(count: u64) -> Duration {
    Duration::from_secs(count.saturating_mul(60))
}

/// Return the first key that holds a positive integer.
fn first_positive(lookup: &impl Fn(&str) -> Option<String>, keys: &[&str]) -> Option<u64> {
    keys.iter()
        .filter_map(|key| lookup(key))
        .filter_map(|raw| raw.trim().parse::<u64>().ok())
        .find(|value| *value > 0)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> TodoConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        TodoConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_gives_defaults() {
        assert_eq!(config_from(&[]), TodoConfig::default());
    }

    #[test]
    fn reads_preferred_names() {
        let config = config_from(&[
            ("MAX_NUMBER_OF_PROJECT", "3"),
            ("MAX_NUMBER_OF_TASK", "7"),
            ("SCHEDULER_INTERVAL_MINUTES", "15"),
        ]);
        assert_eq!(config.max_projects, 3);
        assert_eq!(config.max_tasks_per_project, 7);
        assert_eq!(config.scheduler_interval, Duration::from_secs(900));
    }

    #[test]
    fn falls_back_to_legacy_alias() {
        let config = config_from(&[("PROJECT_OF_NUMBER_MAX", "4"), ("TASK_OF_NUMBER_MAX", "8")]);
        assert_eq!(config.max_projects, 4);
        assert_eq!(config.max_tasks_per_project, 8);
    }

    #[test]
    fn invalid_values_use_defaults() {
        let config = config_from(&[
            ("MAX_NUMBER_OF_PROJECT", "0"),
            ("MAX_NUMBER_OF_TASK", "lots"),
            ("SCHEDULER_INTERVAL_MINUTES", "-5"),
        ]);
        assert_eq!(config, TodoConfig::default());
    }

    #[test]
    fn oversized_interval_uses_default() {
        let config = config_from(&[("SCHEDULER_INTERVAL_MINUTES", "307445734561825861")]);
        assert_eq!(config.scheduler_interval, TodoConfig::default().scheduler_interval);

        let config = config_from(&[("SCHEDULER_INTERVAL_MINUTES", "10081")]);
        assert_eq!(config.scheduler_interval, Duration::from_secs(60));

        let config = config_from(&[("SCHEDULER_INTERVAL_MINUTES", "10080")]);
        assert_eq!(config.scheduler_interval, Duration::from_secs(10080 * 60));
    }

    #[test]
    fn invalid_preferred_name_still_checks_alias() {
        let config = config_from(&[("MAX_NUMBER_OF_PROJECT", "0"), ("PROJECT_OF_NUMBER_MAX", "6")]);
        assert_eq!(config.max_projects, 6);
    }
}
