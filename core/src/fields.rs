//! Form fields for POST bodies, including JotForm's bracketed naming.
//!
//! The API expects nested fields flattened as `submission[3][first]`,
//! `question[type]` or `properties[labelWidth]`. Callers pass flat maps and
//! the builders here rewrite the keys.

use std::collections::BTreeMap;

/// Ordered field list encoded as `application/x-www-form-urlencoded`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    fields: Vec<(String, String)>,
}

impl FormFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    /// Submission answers keyed by question ID.
    ///
    /// `3_first` becomes `submission[3][first]`, splitting on the first
    /// underscore only; `4` becomes `submission[4]`.
    pub fn submission(answers: &BTreeMap<String, String>) -> Self {
        Self::from_pairs(answers.iter().map(|(k, v)| {
            let name = match k.split_once('_') {
                Some((question, part)) => format!("submission[{question}][{part}]"),
                None => format!("submission[{k}]"),
            };
            (name, v.clone())
        }))
    }

    pub fn question(properties: &BTreeMap<String, String>) -> Self {
        Self::wrapped("question", properties)
    }

    pub fn properties(properties: &BTreeMap<String, String>) -> Self {
        Self::wrapped("properties", properties)
    }

    fn wrapped(prefix: &str, fields: &BTreeMap<String, String>) -> Self {
        Self::from_pairs(fields.iter().map(|(k, v)| (format!("{prefix}[{k}]"), v.clone())))
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.fields.iter())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn submission_splits_on_first_underscore() {
        let fields = FormFields::submission(&map(&[("name_first", "A"), ("5_addr_line1", "Main St")]));
        assert_eq!(
            fields.fields(),
            &[
                ("submission[5][addr_line1]".to_string(), "Main St".to_string()),
                ("submission[name][first]".to_string(), "A".to_string()),
            ]
        );
    }

    #[test]
    fn submission_plain_key() {
        let fields = FormFields::submission(&map(&[("4", "hello")]));
        assert_eq!(fields.fields(), &[("submission[4]".to_string(), "hello".to_string())]);
    }

    #[test]
    fn submission_encodes_brackets() {
        let fields = FormFields::submission(&map(&[("name_first", "A")]));
        assert_eq!(fields.encode(), "submission%5Bname%5D%5Bfirst%5D=A");
    }

    #[test]
    fn question_and_properties_wrap_keys() {
        let props = map(&[("type", "control_textbox"), ("text", "Your name")]);
        assert_eq!(
            FormFields::question(&props).encode(),
            "question%5Btext%5D=Your+name&question%5Btype%5D=control_textbox"
        );
        let fields = FormFields::properties(&map(&[("labelWidth", "150")]));
        assert_eq!(fields.fields()[0].0, "properties[labelWidth]");
    }

    #[test]
    fn plain_pairs_are_untouched() {
        let fields = FormFields::from_pairs([("webhookURL", "http://example.com/hook?a=1")]);
        assert_eq!(fields.encode(), "webhookURL=http%3A%2F%2Fexample.com%2Fhook%3Fa%3D1");
    }
}
