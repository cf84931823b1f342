use itertools::Itertools;

use crate::error::Error;

/// Glyph the store's pattern lookup treats as "any characters".
pub const WILDCARD: &str = "*";

const DEFAULT_DELIMITER: char = ':';
const DEFAULT_WRAPPER: (char, char) = ('{', '}');

/// A key pattern such as `user:{id}:profile`. Segments are split on the delimiter; a segment
/// wrapped in the wrapper characters is a placeholder naming a bindable field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyTemplate {
    pattern: String,
    delimiter: char,
    wrapper: (char, char),
}

impl KeyTemplate {
    pub fn new(pattern: impl Into<String>) -> KeyTemplate {
        KeyTemplate {
            pattern: pattern.into(),
            delimiter: DEFAULT_DELIMITER,
            wrapper: DEFAULT_WRAPPER,
        }
    }

    pub fn with_delimiter(mut self, delimiter: char) -> KeyTemplate {
        self.delimiter = delimiter;
        self
    }

    pub fn with_wrapper(mut self, open: char, close: char) -> KeyTemplate {
        self.wrapper = (open, close);
        self
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// Field names in the order their placeholders appear.
    pub fn fields(&self) -> Vec<&str> {
        self.pattern
            .split(self.delimiter)
            .filter(|segment| self.is_placeholder(segment))
            .map(|segment| self.trim_wrapper(segment))
            .unique()
            .collect()
    }

    /// The placeholder segment for `field`, e.g. `{id}`.
    pub fn placeholder(&self, field: &str) -> String {
        format!("{}{}{}", self.wrapper.0, field, self.wrapper.1)
    }

    /// A key is complete when none of its segments is a placeholder. Only complete keys are ever
    /// sent to the store as concrete keys.
    pub fn is_complete(&self, key: &str) -> bool {
        !key.split(self.delimiter)
            .any(|segment| self.is_placeholder(segment))
    }

    /// Replaces every placeholder still present in `key` with the store wildcard, turning a
    /// partially bound key into a pattern the store can match existing keys against.
    pub fn mark_unbound(&self, key: &str) -> String {
        key.split(self.delimiter)
            .map(|segment| {
                if self.is_placeholder(segment) {
                    WILDCARD
                } else {
                    segment
                }
            })
            .join(&self.delimiter.to_string())
    }

    /// Expands the template with each binding in turn, producing the cartesian product of the
    /// candidate values. Duplicates are dropped after every pass, keeping first occurrences.
    ///
    /// With no bindings the template itself is returned; it stands for every key of the family.
    /// Bindings on fields the template does not name are skipped.
    pub fn bind(&self, bindings: &[Binding]) -> Vec<String> {
        let fields = self.fields();
        let mut keys = vec![self.pattern.clone()];

        for binding in bindings {
            if !fields.contains(&binding.field.as_str()) {
                continue;
            }
            let needle = self.placeholder(&binding.field);
            keys = keys
                .iter()
                .cartesian_product(binding.values.iter())
                .map(|(key, value)| self.bind_value(key, &needle, value))
                .unique()
                .collect();
        }

        keys
    }

    /// The single key obtained by binding `field` to `value`.
    pub fn key_for(&self, field: &str, value: &str) -> String {
        self.bind_value(&self.pattern, &self.placeholder(field), value)
    }

    pub fn query(&self) -> Query {
        Query::new(self.clone())
    }

    fn bind_value(&self, key: &str, needle: &str, value: &str) -> String {
        key.split(self.delimiter)
            .map(|segment| if segment == needle { value } else { segment })
            .join(&self.delimiter.to_string())
    }

    fn is_placeholder(&self, segment: &str) -> bool {
        let (open, close) = self.wrapper;
        segment.chars().count() >= 2 && segment.starts_with(open) && segment.ends_with(close)
    }

    fn trim_wrapper<'a>(&self, segment: &'a str) -> &'a str {
        let (open, close) = self.wrapper;
        &segment[open.len_utf8()..segment.len() - close.len_utf8()]
    }
}

/// Candidate values for one field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Binding {
    pub field: String,
    pub values: Vec<String>,
}

/// Constraints accumulated against a template. Fields are expanded in the order they were first
/// constrained; constraining a field again adds to its candidate values.
#[derive(Clone, Debug, PartialEq)]
pub struct Query {
    template: KeyTemplate,
    bindings: Vec<Binding>,
}

impl Query {
    pub fn new(template: KeyTemplate) -> Query {
        Query {
            template,
            bindings: vec![],
        }
    }

    pub fn template(&self) -> &KeyTemplate {
        &self.template
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn where_equal(self, field: &str, value: impl ToString) -> Query {
        self.where_in(field, [value])
    }

    /// A field the template has no placeholder for is accepted and has no effect on the keys.
    pub fn where_in<I, V>(mut self, field: &str, values: I) -> Query
    where
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        let values = values.into_iter().map(|v| v.to_string());

        match self.bindings.iter_mut().find(|b| b.field == field) {
            Some(binding) => binding.values.extend(values),
            None => self.bindings.push(Binding {
                field: field.to_string(),
                values: values.collect(),
            }),
        }

        self
    }

    /// Binds `field` to every integer in `low..=high`.
    pub fn where_between(self, field: &str, low: i64, high: i64) -> Result<Query, Error> {
        if high < low {
            return Err(Error::InvalidRange {
                field: field.to_string(),
                low,
                high,
            });
        }

        Ok(self.where_in(field, low..=high))
    }

    /// True when no field has been constrained, i.e. the query covers the whole key family.
    pub fn is_unconstrained(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn all_keys(&self) -> Vec<String> {
        self.template.bind(&self.bindings)
    }

    pub fn first_key(&self) -> Option<String> {
        self.all_keys().into_iter().next()
    }

    pub fn complete_keys(&self) -> Vec<String> {
        self.all_keys()
            .into_iter()
            .filter(|key| self.template.is_complete(key))
            .collect()
    }

    /// Patterns matching every concrete key the query can denote.
    pub fn patterns(&self) -> Vec<String> {
        self.all_keys()
            .iter()
            .map(|key| self.template.mark_unbound(key))
            .unique()
            .collect()
    }

    pub fn refresh(&mut self) {
        self.bindings.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_in_order() {
        let template = KeyTemplate::new("school:{school}:class:{class}:{id}");

        assert_eq!(template.fields(), vec!["school", "class", "id"]);
    }

    #[test]
    fn no_placeholders() {
        let template = KeyTemplate::new("config:global");
        let query = template.query().where_equal("id", 1);

        assert_eq!(query.all_keys(), vec!["config:global".to_string()]);
        assert!(template.is_complete("config:global"));
    }

    #[test]
    fn cartesian_expansion() {
        let query = KeyTemplate::new("user:{id}:{attr}")
            .query()
            .where_in("id", [1, 2])
            .where_in("attr", ["name", "age"]);

        assert_eq!(
            query.all_keys(),
            vec![
                "user:1:name".to_string(),
                "user:1:age".to_string(),
                "user:2:name".to_string(),
                "user:2:age".to_string(),
            ]
        );
    }

    #[test]
    fn repeated_field_accumulates_union() {
        let query = KeyTemplate::new("user:{id}")
            .query()
            .where_equal("id", 1)
            .where_in("id", [2, 1, 3]);

        assert_eq!(
            query.all_keys(),
            vec![
                "user:1".to_string(),
                "user:2".to_string(),
                "user:3".to_string()
            ]
        );
    }

    #[test]
    fn unknown_field_has_no_effect() {
        let query = KeyTemplate::new("user:{id}")
            .query()
            .where_equal("id", 7)
            .where_in("nope", ["a", "b"]);

        assert_eq!(query.all_keys(), vec!["user:7".to_string()]);
    }

    #[test]
    fn unknown_field_without_values_has_no_effect() {
        let query = KeyTemplate::new("user:{id}")
            .query()
            .where_equal("id", 1)
            .where_in("nope", Vec::<String>::new());

        assert_eq!(query.all_keys(), vec!["user:1".to_string()]);
        assert_eq!(query.patterns(), vec!["user:1".to_string()]);
    }

    #[test]
    fn between() {
        let query = KeyTemplate::new("log:{year}")
            .query()
            .where_between("year", 2021, 2023)
            .unwrap();

        assert_eq!(
            query.all_keys(),
            vec![
                "log:2021".to_string(),
                "log:2022".to_string(),
                "log:2023".to_string()
            ]
        );
    }

    #[test]
    fn between_inverted_bounds() {
        let err = KeyTemplate::new("log:{year}")
            .query()
            .where_between("year", 5, 4)
            .unwrap_err();

        assert!(matches!(
            err,
            Error::InvalidRange { ref field, low: 5, high: 4 } if field == "year"
        ));
    }

    #[test]
    fn partial_binding_and_markers() {
        let template = KeyTemplate::new("log:{year}:{month}");
        let query = template.query().where_equal("year", 2023);

        assert_eq!(query.all_keys(), vec!["log:2023:{month}".to_string()]);
        assert!(query.complete_keys().is_empty());
        assert_eq!(query.first_key(), Some("log:2023:{month}".to_string()));
        assert_eq!(query.patterns(), vec!["log:2023:*".to_string()]);
    }

    #[test]
    fn unconstrained_query_is_the_template() {
        let query = KeyTemplate::new("user:{id}:name").query();

        assert!(query.is_unconstrained());
        assert_eq!(query.all_keys(), vec!["user:{id}:name".to_string()]);
        assert_eq!(query.patterns(), vec!["user:*:name".to_string()]);
    }

    #[test]
    fn empty_candidate_set_yields_no_keys() {
        let query = KeyTemplate::new("user:{id}")
            .query()
            .where_in("id", Vec::<String>::new());

        assert!(query.all_keys().is_empty());
        assert_eq!(query.first_key(), None);
    }

    #[test]
    fn custom_delimiter_and_wrapper() {
        let template = KeyTemplate::new("user/<id>/name")
            .with_delimiter('/')
            .with_wrapper('<', '>');

        assert_eq!(template.fields(), vec!["id"]);
        assert_eq!(template.key_for("id", "9"), "user/9/name");
        assert_eq!(template.mark_unbound("user/<id>/name"), "user/*/name");
    }

    #[test]
    fn placeholder_must_fill_the_segment() {
        let template = KeyTemplate::new("user:x{id}y:name");

        assert!(template.fields().is_empty());
        assert!(template.is_complete("user:x{id}y:name"));
    }

    #[test]
    fn refresh_clears_constraints() {
        let mut query = KeyTemplate::new("user:{id}").query().where_equal("id", 1);
        query.refresh();

        assert!(query.is_unconstrained());
    }
}
