//! Form state provider for detail editors.

/// Editable values plus the baseline they were loaded from.
///
/// The dirty flag turns on with the first edit and only turns off when
/// the form is reset to a new baseline. Typing a field back to its
/// original value keeps the form dirty; the auto-sync controller detects
/// that case by comparing against the last saved snapshot instead.
#[derive(Debug, Clone)]
pub struct FormState<S> {
    baseline: S,
    values: S,
    dirty: bool,
}

impl<S: Clone> FormState<S> {
    /// Create a clean form showing `baseline`.
    pub fn new(baseline: S) -> Self {
        Self {
            values: baseline.clone(),
            baseline,
            dirty: false,
        }
    }

    /// Current values.
    pub fn values(&self) -> &S {
        &self.values
    }

    /// Values the form was last reset to.
    pub fn baseline(&self) -> &S {
        &self.baseline
    }

    /// Whether the form was edited since the last reset.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Replace all values.
    pub fn set(&mut self, values: S) {
        self.values = values;
        self.dirty = true;
    }

    /// Edit values in place.
    pub fn edit(&mut self, f: impl FnOnce(&mut S)) {
        f(&mut self.values);
        self.dirty = true;
    }

    /// Reset to a new baseline (e.g., after an external reload).
    pub fn reset(&mut self, baseline: S) {
        self.values = baseline.clone();
        self.baseline = baseline;
        self.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_form_is_clean() {
        let form = FormState::new("A".to_string());
        assert!(!form.is_dirty());
        assert_eq!(form.values(), "A");
    }

    #[test]
    fn test_edit_marks_dirty_even_when_reverted() {
        let mut form = FormState::new("A".to_string());
        form.edit(|v| v.push('B'));
        assert!(form.is_dirty());
        form.set("A".to_string());
        assert!(form.is_dirty());
        assert_eq!(form.baseline(), "A");
    }

    #[test]
    fn test_reset_clears_dirty() {
        let mut form = FormState::new(1u32);
        form.set(2);
        form.reset(2);
        assert!(!form.is_dirty());
        assert_eq!(*form.baseline(), 2);
    }
}
