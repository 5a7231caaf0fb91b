//! Structural validator interpreter.
//!
//! # Purpose and responsibility
//! Validators are data: a closed tree of [`Validator`] nodes interpreted
//! recursively against a value. Leaves report messages for the value at their
//! position, `All` runs every child and concatenates their errors, and `Field`
//! descends into a sub-value under a named path segment.
//!
//! # Key invariants and assumptions
//! - Leaves are pure functions of the shared context and the value.
//! - `Field` nodes built with [`Validator::when_present`] skip absent values;
//!   nothing below them runs.
//! - Errors are keyed by the full field path from the validation root.
use std::collections::BTreeMap;

/// Dotted path to a field inside a validated document.
///
/// Rendered with `Display`; the wire form is the dotted string.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn child(&self, segment: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.to_string());
        Self(segments)
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

/// Accumulated validation messages keyed by field path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeMap<FieldPath, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(path: FieldPath, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(&path, message);
        errors
    }

    pub fn add(&mut self, path: &FieldPath, message: impl Into<String>) {
        self.errors
            .entry(path.clone())
            .or_default()
            .push(message.into());
    }

    pub fn extend_at(&mut self, path: &FieldPath, messages: Vec<String>) {
        if messages.is_empty() {
            return;
        }
        self.errors.entry(path.clone()).or_default().extend(messages);
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        for (path, messages) in other.errors {
            self.errors.entry(path).or_default().extend(messages);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of distinct field paths with errors.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn get(&self, path: &FieldPath) -> Option<&[String]> {
        self.errors.get(path).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldPath, &[String])> {
        self.errors
            .iter()
            .map(|(path, messages)| (path, messages.as_slice()))
    }

    /// Every message, in field-path order.
    pub fn messages(&self) -> Vec<&str> {
        self.errors
            .values()
            .flat_map(|messages| messages.iter().map(String::as_str))
            .collect()
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (path, messages) in &self.errors {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                first = false;
                if path.is_root() {
                    f.write_str(message)?;
                } else {
                    write!(f, "{path}: {message}")?;
                }
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Leaf rule: messages for the value at the leaf's position.
pub type Rule<C, T> = fn(&C, &T) -> Vec<String>;

/// A node in a validator tree over values of type `T`, sharing context `C`.
pub enum Validator<C, T> {
    Leaf(Rule<C, T>),
    All(Vec<Validator<C, T>>),
    Field(&'static str, Box<dyn FieldValidator<C, T>>),
}

/// Type-erased descent from a parent value into one of its fields.
pub trait FieldValidator<C, T>: Send + Sync {
    fn validate_field(
        &self,
        context: &C,
        path: &FieldPath,
        parent: &T,
        errors: &mut ValidationErrors,
    );
}

enum Projection<T, U> {
    Required(fn(&T) -> &U),
    WhenPresent(fn(&T) -> Option<&U>),
}

struct Projected<C, T, U> {
    projection: Projection<T, U>,
    nested: Validator<C, U>,
}

impl<C, T, U> FieldValidator<C, T> for Projected<C, T, U>
where
    C: 'static,
    T: 'static,
    U: 'static,
{
    fn validate_field(
        &self,
        context: &C,
        path: &FieldPath,
        parent: &T,
        errors: &mut ValidationErrors,
    ) {
        let value = match &self.projection {
            Projection::Required(project) => Some(project(parent)),
            Projection::WhenPresent(project) => project(parent),
        };
        if let Some(value) = value {
            self.nested.run(context, path, value, errors);
        }
    }
}

impl<C: 'static, T: 'static> Validator<C, T> {
    pub fn leaf(rule: Rule<C, T>) -> Self {
        Validator::Leaf(rule)
    }

    pub fn all(validators: Vec<Validator<C, T>>) -> Self {
        Validator::All(validators)
    }

    /// Descend into a field that is always present.
    pub fn field<U: 'static>(
        name: &'static str,
        project: fn(&T) -> &U,
        nested: Validator<C, U>,
    ) -> Self {
        Validator::Field(
            name,
            Box::new(Projected {
                projection: Projection::Required(project),
                nested,
            }),
        )
    }

    /// Descend into an optional field, skipping the subtree when it is absent.
    pub fn when_present<U: 'static>(
        name: &'static str,
        project: fn(&T) -> Option<&U>,
        nested: Validator<C, U>,
    ) -> Self {
        Validator::Field(
            name,
            Box::new(Projected {
                projection: Projection::WhenPresent(project),
                nested,
            }),
        )
    }

    /// Interpret this node against `value` located at `path`.
    pub fn run(&self, context: &C, path: &FieldPath, value: &T, errors: &mut ValidationErrors) {
        match self {
            Validator::Leaf(rule) => errors.extend_at(path, rule(context, value)),
            Validator::All(validators) => {
                for validator in validators {
                    validator.run(context, path, value, errors);
                }
            }
            Validator::Field(name, field) => {
                field.validate_field(context, &path.child(name), value, errors)
            }
        }
    }

    /// Validate a value from the document root.
    pub fn validate(&self, context: &C, value: &T) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        self.run(context, &FieldPath::root(), value, &mut errors);
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Limits {
        max_len: usize,
    }

    struct Outer {
        label: String,
        inner: Option<Inner>,
    }

    struct Inner {
        count: i64,
    }

    fn label(outer: &Outer) -> &String {
        &outer.label
    }

    fn inner(outer: &Outer) -> Option<&Inner> {
        outer.inner.as_ref()
    }

    fn label_not_empty(_: &Limits, label: &String) -> Vec<String> {
        if label.is_empty() {
            vec!["label must not be empty".to_string()]
        } else {
            Vec::new()
        }
    }

    fn label_short(limits: &Limits, label: &String) -> Vec<String> {
        if label.len() > limits.max_len {
            vec![format!("label longer than {}", limits.max_len)]
        } else {
            Vec::new()
        }
    }

    fn count_positive(_: &Limits, inner: &Inner) -> Vec<String> {
        if inner.count <= 0 {
            vec!["count must be positive".to_string()]
        } else {
            Vec::new()
        }
    }

    fn outer_validator() -> Validator<Limits, Outer> {
        Validator::all(vec![
            Validator::field(
                "label",
                label,
                Validator::all(vec![
                    Validator::leaf(label_not_empty),
                    Validator::leaf(label_short),
                ]),
            ),
            Validator::when_present("inner", inner, Validator::leaf(count_positive)),
        ])
    }

    #[test]
    fn all_accumulates_sibling_errors_under_field_paths() {
        let outer = Outer {
            label: String::new(),
            inner: Some(Inner { count: 0 }),
        };
        let errors = outer_validator().validate(&Limits { max_len: 3 }, &outer);
        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors.get(&FieldPath::new(["label"])),
            Some(&["label must not be empty".to_string()][..])
        );
        assert_eq!(
            errors.get(&FieldPath::new(["inner"])),
            Some(&["count must be positive".to_string()][..])
        );
    }

    #[test]
    fn when_present_skips_absent_subtree() {
        let outer = Outer {
            label: "abcd".to_string(),
            inner: None,
        };
        let errors = outer_validator().validate(&Limits { max_len: 3 }, &outer);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.messages(), vec!["label longer than 3"]);
    }

    #[test]
    fn valid_value_produces_no_errors() {
        let outer = Outer {
            label: "abc".to_string(),
            inner: Some(Inner { count: 2 }),
        };
        let errors = outer_validator().validate(&Limits { max_len: 3 }, &outer);
        assert!(errors.is_empty());
        assert!(errors.into_result().is_ok());
    }

    #[test]
    fn errors_render_with_paths() {
        let mut errors = ValidationErrors::new();
        errors.add(&FieldPath::new(["a", "b"]), "broken");
        errors.add(&FieldPath::root(), "top level");
        assert_eq!(errors.to_string(), "top level; a.b: broken");
    }

    #[test]
    fn paths_render_as_dotted_strings() {
        let root = FieldPath::root();
        assert!(root.is_root());
        assert_eq!(root.to_string(), "");

        let path = root.child("catalog_item_identity").child("collection_identifier");
        assert!(!path.is_root());
        assert_eq!(path.to_string(), "catalog_item_identity.collection_identifier");
        assert_eq!(
            path,
            FieldPath::new(["catalog_item_identity", "collection_identifier"])
        );
    }

    #[test]
    fn merge_concatenates_messages_at_same_path() {
        let path = FieldPath::new(["group_permissions"]);
        let mut left = ValidationErrors::single(path.clone(), "first");
        left.merge(ValidationErrors::single(path.clone(), "second"));
        assert_eq!(left.get(&path).map(<[String]>::len), Some(2));
    }
}
