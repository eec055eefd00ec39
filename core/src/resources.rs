//! One method per JotForm resource.
//!
//! Each operation maps its arguments to a resource path and `RequestParams`
//! and hands them to `JotformClient::dispatch`. Argument values are not
//! validated here; the server rejects what it does not accept.

use std::collections::BTreeMap;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::client::JotformClient;
use crate::error::Result;
use crate::fields::FormFields;
use crate::http::RequestParams;
use crate::query::{HistoryQuery, ListOptions, Query};
use crate::transport::Transport;

/// Unreserved characters stay as they are in a path segment.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

fn get() -> RequestParams {
    RequestParams::Query(Query::new())
}

impl<T: Transport> JotformClient<T> {
    // --- user ---

    /// Account type, avatar, name, email, website and account limits.
    pub fn get_user(&self) -> Result<Vec<u8>> {
        self.dispatch("user", get())
    }

    /// Submission counts and upload space used this month.
    pub fn get_usage(&self) -> Result<Vec<u8>> {
        self.dispatch("user/usage", get())
    }

    /// Forms of this account with title, creation date and submission counts.
    pub fn get_forms(&self, options: &ListOptions) -> Result<Vec<u8>> {
        self.dispatch("user/forms", RequestParams::Query(Query::conditions(options)))
    }

    pub fn get_submissions(&self, options: &ListOptions) -> Result<Vec<u8>> {
        self.dispatch("user/submissions", RequestParams::Query(Query::conditions(options)))
    }

    /// Sub users with their form and folder access privileges.
    pub fn get_subusers(&self) -> Result<Vec<u8>> {
        self.dispatch("user/subusers", get())
    }

    pub fn get_folders(&self) -> Result<Vec<u8>> {
        self.dispatch("user/folders", get())
    }

    /// Report URLs (Excel, CSV, charts, HTML tables) for all forms.
    pub fn get_reports(&self) -> Result<Vec<u8>> {
        self.dispatch("user/reports", get())
    }

    /// Time zone and language of the account.
    pub fn get_settings(&self) -> Result<Vec<u8>> {
        self.dispatch("user/settings", get())
    }

    /// Activity log: forms created/modified/deleted, logins and the like.
    pub fn get_history(&self, history: &HistoryQuery) -> Result<Vec<u8>> {
        self.dispatch("user/history", RequestParams::Query(Query::history(history)))
    }

    pub fn get_submission(&self, submission_id: i64) -> Result<Vec<u8>> {
        self.dispatch(&format!("user/submission/{submission_id}"), get())
    }

    pub fn get_report(&self, report_id: i64) -> Result<Vec<u8>> {
        self.dispatch(&format!("user/report/{report_id}"), get())
    }

    pub fn get_folder(&self, folder_id: i64) -> Result<Vec<u8>> {
        self.dispatch(&format!("user/folder/{folder_id}"), get())
    }

    /// Create a form from pre-serialized questions, properties and emails.
    pub fn create_forms(&self, form: Vec<u8>) -> Result<Vec<u8>> {
        self.dispatch("user/forms", RequestParams::Raw(form))
    }

    // --- form ---

    pub fn get_form(&self, form_id: i64) -> Result<Vec<u8>> {
        self.dispatch(&format!("form/{form_id}"), get())
    }

    pub fn get_form_questions(&self, form_id: i64) -> Result<Vec<u8>> {
        self.dispatch(&format!("form/{form_id}/questions"), get())
    }

    pub fn get_form_question(&self, form_id: i64, question_id: u32) -> Result<Vec<u8>> {
        self.dispatch(&format!("form/{form_id}/question/{question_id}"), get())
    }

    pub fn get_form_submissions(&self, form_id: i64, options: &ListOptions) -> Result<Vec<u8>> {
        self.dispatch(
            &format!("form/{form_id}/submissions"),
            RequestParams::Query(Query::conditions(options)),
        )
    }

    /// Submit answers keyed by question ID; `3_first` addresses a sub-field.
    pub fn create_form_submission(&self, form_id: i64, submission: &BTreeMap<String, String>) -> Result<Vec<u8>> {
        self.dispatch(
            &format!("form/{form_id}/submissions"),
            RequestParams::Form(FormFields::submission(submission)),
        )
    }

    pub fn get_form_files(&self, form_id: i64) -> Result<Vec<u8>> {
        self.dispatch(&format!("form/{form_id}/files"), get())
    }

    pub fn get_form_webhooks(&self, form_id: i64) -> Result<Vec<u8>> {
        self.dispatch(&format!("form/{form_id}/webhooks"), get())
    }

    pub fn create_form_webhook(&self, form_id: i64, webhook_url: &str) -> Result<Vec<u8>> {
        self.dispatch(
            &format!("form/{form_id}/webhooks"),
            RequestParams::Form(FormFields::from_pairs([("webhookURL", webhook_url)])),
        )
    }

    pub fn get_form_properties(&self, form_id: i64) -> Result<Vec<u8>> {
        self.dispatch(&format!("form/{form_id}/properties"), get())
    }

    pub fn get_form_property(&self, form_id: i64, property_key: &str) -> Result<Vec<u8>> {
        let key = utf8_percent_encode(property_key, SEGMENT);
        self.dispatch(&format!("form/{form_id}/properties/{key}"), get())
    }

    pub fn clone_form(&self, form_id: i64) -> Result<Vec<u8>> {
        self.dispatch(&format!("form/{form_id}/clone"), RequestParams::Form(FormFields::new()))
    }

    pub fn delete_form_question(&self, form_id: i64, question_id: u32) -> Result<Vec<u8>> {
        self.dispatch(&format!("form/{form_id}/question/{question_id}"), RequestParams::None)
    }

    pub fn create_form_question(&self, form_id: i64, properties: &BTreeMap<String, String>) -> Result<Vec<u8>> {
        self.dispatch(
            &format!("form/{form_id}/questions"),
            RequestParams::Form(FormFields::question(properties)),
        )
    }

    /// Add several questions at once from a pre-serialized JSON body.
    pub fn create_form_questions(&self, form_id: i64, questions: Vec<u8>) -> Result<Vec<u8>> {
        self.dispatch(&format!("form/{form_id}/questions"), RequestParams::Raw(questions))
    }

    pub fn edit_form_question(
        &self,
        form_id: i64,
        question_id: u32,
        properties: &BTreeMap<String, String>,
    ) -> Result<Vec<u8>> {
        self.dispatch(
            &format!("form/{form_id}/question/{question_id}"),
            RequestParams::Form(FormFields::question(properties)),
        )
    }

    pub fn set_form_properties(&self, form_id: i64, properties: &BTreeMap<String, String>) -> Result<Vec<u8>> {
        self.dispatch(
            &format!("form/{form_id}/properties"),
            RequestParams::Form(FormFields::properties(properties)),
        )
    }

    pub fn set_multiple_form_properties(&self, form_id: i64, properties: Vec<u8>) -> Result<Vec<u8>> {
        self.dispatch(&format!("form/{form_id}/properties"), RequestParams::Raw(properties))
    }

    pub fn delete_form(&self, form_id: i64) -> Result<Vec<u8>> {
        self.dispatch(&format!("form/{form_id}"), RequestParams::None)
    }

    // --- submission ---

    pub fn delete_submission(&self, submission_id: i64) -> Result<Vec<u8>> {
        self.dispatch(&format!("submission/{submission_id}"), RequestParams::None)
    }

    pub fn edit_submission(&self, submission_id: i64, submission: &BTreeMap<String, String>) -> Result<Vec<u8>> {
        self.dispatch(
            &format!("submission/{submission_id}"),
            RequestParams::Form(FormFields::submission(submission)),
        )
    }
}
