//! In-memory state behind the mock API.

use std::collections::BTreeMap;

use serde_json::{json, Map, Value};

#[derive(Debug, Clone)]
pub struct Form {
    pub id: u64,
    pub title: String,
    pub status: String,
    pub questions: BTreeMap<u32, Map<String, Value>>,
    pub properties: Map<String, Value>,
    pub webhooks: Vec<String>,
}

impl Form {
    pub fn new(id: u64, title: &str) -> Self {
        let mut properties = Map::new();
        properties.insert("title".to_string(), Value::from(title));
        Self {
            id,
            title: title.to_string(),
            status: "ENABLED".to_string(),
            questions: BTreeMap::new(),
            properties,
            webhooks: Vec::new(),
        }
    }

    pub fn summary(&self, submissions: usize) -> Value {
        json!({
            "id": self.id.to_string(),
            "title": self.title,
            "status": self.status,
            "count": submissions.to_string(),
        })
    }

    pub fn add_question(&mut self, mut question: Map<String, Value>) -> u32 {
        let qid = self.questions.keys().next_back().map_or(1, |last| last + 1);
        question.insert("qid".to_string(), Value::from(qid.to_string()));
        self.questions.insert(qid, question);
        qid
    }

    pub fn questions_json(&self) -> Value {
        Value::Object(
            self.questions
                .iter()
                .map(|(qid, q)| (qid.to_string(), Value::Object(q.clone())))
                .collect(),
        )
    }

    pub fn set_properties(&mut self, properties: Map<String, Value>) {
        if let Some(Value::String(title)) = properties.get("title") {
            self.title = title.clone();
        }
        self.properties.extend(properties);
    }

    pub fn webhooks_json(&self) -> Value {
        Value::Object(
            self.webhooks
                .iter()
                .enumerate()
                .map(|(i, url)| (i.to_string(), Value::from(url.as_str())))
                .collect(),
        )
    }
}

#[derive(Debug, Clone)]
pub struct Submission {
    pub id: u64,
    pub form_id: u64,
    pub answers: Map<String, Value>,
}

impl Submission {
    pub fn to_json(&self) -> Value {
        json!({
            "id": self.id.to_string(),
            "form_id": self.form_id.to_string(),
            "status": "ACTIVE",
            "answers": self.answers,
        })
    }
}

#[derive(Debug)]
pub struct Store {
    next_id: u64,
    pub forms: BTreeMap<u64, Form>,
    pub submissions: BTreeMap<u64, Submission>,
    pub folders: BTreeMap<u64, Value>,
    pub reports: BTreeMap<u64, Value>,
    pub history: Vec<Value>,
}

impl Default for Store {
    fn default() -> Self {
        let mut folders = BTreeMap::new();
        folders.insert(1, json!({"id": "1", "name": "Archive", "color": "#d4d4d4", "forms": []}));
        let mut reports = BTreeMap::new();
        reports.insert(1, json!({"id": "1", "title": "Weekly export", "type": "csv", "status": "ENABLED"}));
        Self {
            next_id: 1000,
            forms: BTreeMap::new(),
            submissions: BTreeMap::new(),
            folders,
            reports,
            history: Vec::new(),
        }
    }
}

impl Store {
    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn record(&mut self, action: &str, form_id: u64) {
        self.history.push(json!({
            "type": action,
            "formID": form_id.to_string(),
            "username": "mockuser",
        }));
    }

    pub fn create_form(&mut self, title: &str) -> &mut Form {
        let id = self.allocate();
        self.record("formCreation", id);
        self.forms.entry(id).or_insert_with(|| Form::new(id, title))
    }

    pub fn clone_form(&mut self, id: u64) -> Option<u64> {
        let mut copy = self.forms.get(&id)?.clone();
        copy.id = self.allocate();
        copy.title = format!("Clone of {}", copy.title);
        copy.properties.insert("title".to_string(), Value::from(copy.title.as_str()));
        let new_id = copy.id;
        self.forms.insert(new_id, copy);
        self.record("formCloned", new_id);
        Some(new_id)
    }

    pub fn delete_form(&mut self, id: u64) -> Option<Form> {
        let mut form = self.forms.remove(&id)?;
        form.status = "DELETED".to_string();
        self.submissions.retain(|_, s| s.form_id != id);
        self.record("formDeletion", id);
        Some(form)
    }

    pub fn submission_count(&self, form_id: u64) -> usize {
        self.submissions.values().filter(|s| s.form_id == form_id).count()
    }

    pub fn form_summary(&self, form: &Form) -> Value {
        form.summary(self.submission_count(form.id))
    }

    pub fn create_submission(&mut self, form_id: u64, answers: Map<String, Value>) -> u64 {
        let id = self.allocate();
        self.submissions.insert(id, Submission { id, form_id, answers });
        id
    }
}

/// Split `submission[3][first]` into `("submission", ["3", "first"])`.
pub fn bracket_path(key: &str) -> Option<(&str, Vec<&str>)> {
    let (prefix, rest) = key.split_once('[')?;
    let rest = rest.strip_suffix(']')?;
    Some((prefix, rest.split("][").collect()))
}

/// Collect `prefix[a]` and `prefix[a][b]` fields into a nested object.
/// Fields with another prefix are ignored.
pub fn nest_fields(prefix: &str, fields: &[(String, String)]) -> Map<String, Value> {
    let mut nested = Map::new();
    for (key, value) in fields {
        let Some((p, segments)) = bracket_path(key) else {
            continue;
        };
        if p != prefix {
            continue;
        }
        match segments.as_slice() {
            [name] => {
                nested.insert(name.to_string(), Value::from(value.as_str()));
            }
            [name, part, ..] => {
                let entry = nested
                    .entry(name.to_string())
                    .or_insert_with(|| Value::Object(Map::new()));
                if !entry.is_object() {
                    *entry = Value::Object(Map::new());
                }
                if let Value::Object(inner) = entry {
                    inner.insert(part.to_string(), Value::from(value.as_str()));
                }
            }
            [] => {}
        }
    }
    nested
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(entries: &[(&str, &str)]) -> Vec<(String, String)> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn bracket_path_splits_segments() {
        assert_eq!(bracket_path("submission[3][first]"), Some(("submission", vec!["3", "first"])));
        assert_eq!(bracket_path("question[type]"), Some(("question", vec!["type"])));
        assert_eq!(bracket_path("webhookURL"), None);
    }

    #[test]
    fn nest_fields_builds_objects() {
        let nested = nest_fields(
            "submission",
            &pairs(&[
                ("submission[3][first]", "Ada"),
                ("submission[3][last]", "Lovelace"),
                ("submission[4]", "yes"),
                ("question[type]", "ignored"),
            ]),
        );
        assert_eq!(
            Value::Object(nested),
            json!({"3": {"first": "Ada", "last": "Lovelace"}, "4": "yes"})
        );
    }

    #[test]
    fn question_ids_increase() {
        let mut form = Form::new(1, "Survey");
        assert_eq!(form.add_question(Map::new()), 1);
        assert_eq!(form.add_question(Map::new()), 2);
        form.questions.remove(&2);
        assert_eq!(form.add_question(Map::new()), 2);
    }

    #[test]
    fn delete_form_drops_its_submissions() {
        let mut store = Store::default();
        let id = store.create_form("Survey").id;
        store.create_submission(id, Map::new());
        let deleted = store.delete_form(id).unwrap();
        assert_eq!(deleted.status, "DELETED");
        assert!(store.submissions.is_empty());
        assert_eq!(store.history.len(), 2);
    }

    #[test]
    fn clone_copies_questions() {
        let mut store = Store::default();
        let id = store.create_form("Survey").id;
        store.forms.get_mut(&id).unwrap().add_question(Map::new());
        let clone_id = store.clone_form(id).unwrap();
        let clone = &store.forms[&clone_id];
        assert_eq!(clone.title, "Clone of Survey");
        assert_eq!(clone.questions.len(), 1);
    }
}
