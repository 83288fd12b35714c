use std::collections::HashMap;

use crate::config::Config;

/// Name under which the last command's status is stored.
pub const STATUS: &str = "?";

/// Variable bindings read and written by the interpreter.
pub trait VariableStore {
    fn get(&self, name: &str) -> Option<String>;
    /// Bind `name`. With `overwrite = false` an existing binding is kept.
    fn set(&mut self, name: &str, value: &str, overwrite: bool);
}

impl<V: VariableStore + ?Sized> VariableStore for &mut V {
    fn get(&self, name: &str) -> Option<String> {
        (**self).get(name)
    }

    fn set(&mut self, name: &str, value: &str, overwrite: bool) {
        (**self).set(name, value, overwrite)
    }
}

/// Growable in-memory variable table.
#[derive(Debug, Clone, Default)]
pub struct Variables {
    map: HashMap<String, String>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with the configured `[variables]` table.
    pub fn from_config(config: &Config) -> Self {
        let mut vars = Self::new();
        for (name, value) in &config.variables {
            vars.set(name, value, false);
        }
        vars
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl VariableStore for Variables {
    fn get(&self, name: &str) -> Option<String> {
        self.map.get(name).cloned()
    }

    fn set(&mut self, name: &str, value: &str, overwrite: bool) {
        if !overwrite && self.map.contains_key(name) {
            return;
        }
        log::trace!("set {name}={value:?}");
        self.map.insert(name.to_string(), value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get() {
        let mut vars = Variables::new();
        assert_eq!(vars.get("a"), None);
        vars.set("a", "1", true);
        assert_eq!(vars.get("a").as_deref(), Some("1"));
    }

    #[test]
    fn overwrite_flag() {
        let mut vars = Variables::new();
        vars.set("a", "1", false);
        vars.set("a", "2", false);
        assert_eq!(vars.get("a").as_deref(), Some("1"));
        vars.set("a", "3", true);
        assert_eq!(vars.get("a").as_deref(), Some("3"));
        assert_eq!(vars.len(), 1);
    }

    #[test]
    fn grows_without_limit() {
        let mut vars = Variables::new();
        for i in 0..100 {
            vars.set(&format!("v{i}"), &i.to_string(), true);
        }
        assert_eq!(vars.len(), 100);
        assert_eq!(vars.get("v99").as_deref(), Some("99"));
    }

    #[test]
    fn seeded_from_config() {
        let mut config = Config::default_config();
        config.variables.insert("greeting".into(), "hi".into());
        let vars = Variables::from_config(&config);
        assert_eq!(vars.get("greeting").as_deref(), Some("hi"));
    }
}
