// Profile model: launch targets, starter profiles and the catalog holding both.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// One external process to start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchTarget {
    #[serde(default = "new_id")]
    pub id: String,

    /// Display label used in log lines.
    #[serde(default)]
    pub name: String,

    /// Executable or script; may still carry surrounding quotes.
    #[serde(default)]
    pub path: String,

    #[serde(default)]
    pub arguments: String,

    #[serde(default, rename = "runAsAdmin")]
    pub elevated: bool,

    #[serde(default)]
    pub wait_for_exit: bool,
}

impl LaunchTarget {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            path: path.into(),
            arguments: String::new(),
            elevated: false,
            wait_for_exit: false,
        }
    }

    pub fn with_arguments(mut self, arguments: impl Into<String>) -> Self {
        self.arguments = arguments.into();
        self
    }

    pub fn elevated(mut self, elevated: bool) -> Self {
        self.elevated = elevated;
        self
    }

    pub fn wait_for_exit(mut self, wait: bool) -> Self {
        self.wait_for_exit = wait;
        self
    }
}

/// A named group: one primary target (`sim_id`) plus auxiliaries (`addon_ids`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StarterProfile {
    #[serde(default = "new_id")]
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub sim_id: String,

    #[serde(default)]
    pub addon_ids: Vec<String>,
}

impl StarterProfile {
    pub fn new(name: impl Into<String>, sim_id: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            sim_id: sim_id.into(),
            addon_ids: Vec::new(),
        }
    }

    pub fn with_addons<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.addon_ids = ids.into_iter().map(Into::into).collect();
        self
    }
}

/// The persisted catalog: primary candidates, auxiliary candidates, profiles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilesConfig {
    #[serde(default)]
    pub sims: Vec<LaunchTarget>,

    #[serde(default)]
    pub addons: Vec<LaunchTarget>,

    #[serde(default)]
    pub starters: Vec<StarterProfile>,
}

/// A profile with its targets looked up, ready to execute.
#[derive(Debug, Clone)]
pub struct ResolvedProfile<'a> {
    pub primary: &'a LaunchTarget,
    pub auxiliaries: Vec<&'a LaunchTarget>,
}

impl ProfilesConfig {
    /// Look up the targets of `profile`.
    ///
    /// Returns `None` when the primary id matches no sim. Auxiliaries follow
    /// catalog order; ids with no matching addon are skipped.
    pub fn resolve<'a>(&'a self, profile: &StarterProfile) -> Option<ResolvedProfile<'a>> {
        let primary = self.sims.iter().find(|s| s.id == profile.sim_id)?;
        let auxiliaries = self
            .addons
            .iter()
            .filter(|a| profile.addon_ids.iter().any(|id| *id == a.id))
            .collect();

        Some(ResolvedProfile {
            primary,
            auxiliaries,
        })
    }

    /// Find a profile by 1-based index, id, or case-insensitive name, tried
    /// in that order. A numeric key that is in range always selects by
    /// position, so a profile named "2" is reachable by name only while
    /// there are fewer than two profiles.
    pub fn find_starter(&self, key: &str) -> Option<&StarterProfile> {
        let key = key.trim();

        if let Ok(index) = key.parse::<usize>() {
            if index >= 1 {
                if let Some(starter) = self.starters.get(index - 1) {
                    return Some(starter);
                }
            }
        }

        self.starters
            .iter()
            .find(|s| s.id == key)
            .or_else(|| self.starters.iter().find(|s| s.name.eq_ignore_ascii_case(key)))
    }
}

impl<'a> ResolvedProfile<'a> {
    /// Primary first, then auxiliaries.
    pub fn targets(&self) -> impl Iterator<Item = &'a LaunchTarget> + '_ {
        std::iter::once(self.primary).chain(self.auxiliaries.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> (ProfilesConfig, StarterProfile) {
        let sim = LaunchTarget::new("Sim", "/opt/sim/sim");
        let a = LaunchTarget::new("A", "/opt/a");
        let b = LaunchTarget::new("B", "/opt/b");
        let c = LaunchTarget::new("C", "/opt/c");
        let profile = StarterProfile::new("Race night", sim.id.clone())
            .with_addons([c.id.clone(), "missing".to_string(), a.id.clone()]);
        let config = ProfilesConfig {
            sims: vec![sim],
            addons: vec![a, b, c],
            starters: vec![profile.clone()],
        };
        (config, profile)
    }

    #[test]
    fn resolve_uses_catalog_order() {
        let (config, profile) = catalog();
        let resolved = config.resolve(&profile).unwrap();
        assert_eq!(resolved.primary.name, "Sim");
        let names: Vec<_> = resolved.auxiliaries.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["A", "C"]);
        let all: Vec<_> = resolved.targets().map(|t| t.name.as_str()).collect();
        assert_eq!(all, vec!["Sim", "A", "C"]);
    }

    #[test]
    fn resolve_without_primary_is_none() {
        let (config, mut profile) = catalog();
        profile.sim_id = "nope".into();
        assert!(config.resolve(&profile).is_none());
    }

    #[test]
    fn find_starter_by_index_id_and_name() {
        let (config, profile) = catalog();
        assert_eq!(config.find_starter("1").unwrap().id, profile.id);
        assert_eq!(config.find_starter(&profile.id).unwrap().name, "Race night");
        assert_eq!(config.find_starter("race NIGHT").unwrap().id, profile.id);
        assert!(config.find_starter("2").is_none());
        assert!(config.find_starter("0").is_none());
    }

    #[test]
    fn numeric_key_is_an_index_before_a_name() {
        let (mut config, first) = catalog();
        let named_two = StarterProfile::new("2", first.sim_id.clone());

        config.starters = vec![named_two.clone()];
        assert_eq!(config.find_starter("2").unwrap().id, named_two.id);

        config.starters = vec![named_two.clone(), first.clone()];
        assert_eq!(config.find_starter("2").unwrap().id, first.id);
        assert_eq!(config.find_starter(&named_two.id).unwrap().name, "2");
    }

    #[test]
    fn json_uses_camel_case_and_run_as_admin() {
        let target = LaunchTarget::new("Sim", "\"C:\\Sim\\sim.exe\"")
            .elevated(true)
            .wait_for_exit(true);
        let json = serde_json::to_value(&target).unwrap();
        assert_eq!(json["runAsAdmin"], true);
        assert_eq!(json["waitForExit"], true);
        assert!(json.get("elevated").is_none());
    }

    #[test]
    fn json_missing_fields_default() {
        let config: ProfilesConfig =
            serde_json::from_str(r#"{ "sims": [ { "name": "Sim" } ], "starters": [ { "simId": "x" } ] }"#)
                .unwrap();
        assert_eq!(config.sims.len(), 1);
        assert!(!config.sims[0].id.is_empty());
        assert!(config.addons.is_empty());
        assert!(config.starters[0].addon_ids.is_empty());
    }
}
