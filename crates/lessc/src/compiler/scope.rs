//! Variable environment.
//!
//! A stack of frames, innermost last. Each frame keeps every value assigned to
//! a name, oldest first, so that `@a: @a + 1` can read the binding it shadows.
//! Values are stored exactly as parsed and reduced only when read.

use std::collections::HashMap;

use crate::types::Value;

#[derive(Debug)]
pub struct Scope {
    frames: Vec<HashMap<String, Vec<Value>>>,
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl Scope {
    /// A scope holding only the root frame.
    pub fn new() -> Self {
        Self {
            frames: vec![HashMap::new()],
        }
    }

    pub fn push(&mut self) {
        self.frames.push(HashMap::new());
    }

    /// Leaves the innermost frame. The root frame is never popped.
    pub fn pop(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    /// Appends a binding for `name` (without `@`) to the innermost frame.
    pub fn set(&mut self, name: &str, value: Value) {
        if let Some(frame) = self.frames.last_mut() {
            frame.entry(name.to_string()).or_default().push(value);
        }
    }

    /// The most recent binding of `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.get_shadowed(name, 0)
    }

    /// The binding `skip` positions older than the most recent one, walking
    /// each frame's history before moving to the enclosing frame.
    pub fn get_shadowed(&self, name: &str, skip: usize) -> Option<&Value> {
        self.frames
            .iter()
            .rev()
            .filter_map(|frame| frame.get(name))
            .flat_map(|history| history.iter().rev())
            .nth(skip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inner_frame_shadows() {
        let mut scope = Scope::new();
        scope.set("a", Value::number(1.0));
        scope.push();
        scope.set("a", Value::number(2.0));
        assert_eq!(scope.get("a"), Some(&Value::number(2.0)));
        scope.pop();
        assert_eq!(scope.get("a"), Some(&Value::number(1.0)));
    }

    #[test]
    fn test_history_is_kept() {
        let mut scope = Scope::new();
        scope.set("a", Value::number(1.0));
        scope.push();
        scope.set("a", Value::number(2.0));
        scope.set("a", Value::number(3.0));

        assert_eq!(scope.get_shadowed("a", 0), Some(&Value::number(3.0)));
        assert_eq!(scope.get_shadowed("a", 1), Some(&Value::number(2.0)));
        assert_eq!(scope.get_shadowed("a", 2), Some(&Value::number(1.0)));
        assert_eq!(scope.get_shadowed("a", 3), None);
    }

    #[test]
    fn test_root_frame_survives_pop() {
        let mut scope = Scope::new();
        scope.pop();
        scope.set("x", "y".into());
        scope.pop();
        assert!(scope.get("x").is_some());
        assert!(scope.get("missing").is_none());
    }
}
