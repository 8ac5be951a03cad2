use std::collections::HashMap;

/// Accumulates field-level validation errors. The first message recorded for a
/// field wins; later messages for the same field are dropped.
#[derive(Debug, Default, Clone)]
pub struct Validator {
    errors: HashMap<String, String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.entry(field.into()).or_insert_with(|| message.into());
    }

    /// Record `message` under `field` unless `acceptable` holds.
    pub fn check(&mut self, acceptable: bool, field: &str, message: &str) {
        if !acceptable {
            self.add_error(field, message);
        }
    }

    pub fn errors(&self) -> &HashMap<String, String> {
        &self.errors
    }

    pub fn into_errors(self) -> HashMap<String, String> {
        self.errors
    }
}

pub fn permitted_value<T: PartialEq>(value: &T, permitted: &[T]) -> bool {
    permitted.contains(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_error_wins() {
        let mut v = Validator::new();
        v.check(false, "page", "must be greater than zero");
        v.check(false, "page", "must not exceed 500");
        assert_eq!(v.errors().get("page").map(String::as_str), Some("must be greater than zero"));
        assert_eq!(v.errors().len(), 1);
    }

    #[test]
    fn passing_checks_record_nothing() {
        let mut v = Validator::new();
        v.check(true, "title", "must be provided");
        assert!(v.is_empty());
    }

    #[test]
    fn permitted_value_is_exact_match() {
        let list = ["id", "-id"];
        assert!(permitted_value(&"-id", &list));
        assert!(!permitted_value(&"ID", &list));
    }
}
