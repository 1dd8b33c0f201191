//! Form component types.
//!
//! A [`FormSchema`] is a list of [`FormField`] descriptors. The same schema
//! drives three steps of every create/edit screen:
//!
//! 1. [`FormSchema::prepare`] normalises a raw submission (trim, lower-case
//!    emails, fill derived slugs on create, drop derived fields on edit).
//! 2. [`FormSchema::validate`] checks the prepared input and returns
//!    [`ValidationErrors`] keyed by field.
//! 3. [`FormSchema::fields_view`] produces template-ready fields carrying the
//!    submitted values and inline errors.
//!
//! Uniqueness needs the database and is checked by the submission services for
//! every field marked [`FormField::unique`].

use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDate, Utc};
use serde::Serialize;

use shopdesk_core::{Email, Price, Slug};

use crate::models::SelectOption;

/// Input widget and value format of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    /// Multi-line markdown source.
    Markdown,
    Email,
    /// Absolute `http`/`https` URL.
    Url,
    /// `#RRGGBB`.
    Color,
    Integer,
    /// Up to six integer and two fractional digits.
    Price,
    /// `YYYY-MM-DD`.
    Date,
    Toggle,
    Select,
    MultiSelect,
}

impl FieldKind {
    /// Widget name used by the form template.
    #[must_use]
    pub const fn widget(self) -> &'static str {
        match self {
            Self::Text | Self::Integer | Self::Price | Self::Email | Self::Url | Self::Date => {
                "input"
            }
            Self::Color => "color",
            Self::Markdown => "textarea",
            Self::Toggle => "checkbox",
            Self::Select => "select",
            Self::MultiSelect => "multiselect",
        }
    }

    /// HTML `type` attribute for `input` widgets.
    #[must_use]
    pub const fn input_type(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Url => "url",
            Self::Integer => "number",
            Self::Date => "date",
            _ => "text",
        }
    }
}

/// How a field's value is computed from another field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Derivation {
    /// Slug of the named field, computed on create only.
    SlugFrom(&'static str),
}

/// Whether a submission creates a record or edits one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit,
}

/// A single form field descriptor.
#[derive(Debug, Clone)]
pub struct FormField {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    /// Checked against the database before persisting.
    pub unique: bool,
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub max_length: Option<usize>,
    pub options: Vec<SelectOption>,
    /// Initial value on the create form.
    pub default: Option<String>,
    pub derivation: Option<Derivation>,
    /// Dates only: reject values after today.
    pub not_in_future: bool,
    pub help: Option<&'static str>,
}

impl FormField {
    /// Create a field of the given kind.
    #[must_use]
    pub const fn new(key: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            label,
            kind,
            required: false,
            unique: false,
            min: None,
            max: None,
            max_length: None,
            options: Vec::new(),
            default: None,
            derivation: None,
            not_in_future: false,
            help: None,
        }
    }

    #[must_use]
    pub const fn text(key: &'static str, label: &'static str) -> Self {
        Self::new(key, label, FieldKind::Text)
    }

    /// A write-once slug derived from `source`.
    #[must_use]
    pub const fn slug(key: &'static str, label: &'static str, source: &'static str) -> Self {
        let mut field = Self::new(key, label, FieldKind::Text);
        field.required = true;
        field.unique = true;
        field.derivation = Some(Derivation::SlugFrom(source));
        field
    }

    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    #[must_use]
    pub const fn range(mut self, min: i64, max: i64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    #[must_use]
    pub const fn min(mut self, min: i64) -> Self {
        self.min = Some(min);
        self
    }

    #[must_use]
    pub const fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    #[must_use]
    pub fn options(mut self, options: Vec<SelectOption>) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    #[must_use]
    pub const fn not_in_future(mut self) -> Self {
        self.not_in_future = true;
        self
    }

    #[must_use]
    pub const fn help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }

    /// Derived fields are computed server-side and never edited by hand.
    #[must_use]
    pub const fn is_derived(&self) -> bool {
        self.derivation.is_some()
    }

    fn allows(&self, value: &str) -> bool {
        self.options.iter().any(|o| o.value == value)
    }
}

// =============================================================================
// Submitted values
// =============================================================================

/// Submitted form values. Keys may repeat (multi-selects, repeaters).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormInput {
    values: BTreeMap<String, Vec<String>>,
}

impl FormInput {
    /// Collect `application/x-www-form-urlencoded` pairs, keeping order per key.
    #[must_use]
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut values: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (key, value) in pairs {
            values.entry(key.into()).or_default().push(value.into());
        }
        Self { values }
    }

    /// First value of a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .and_then(|v| v.first())
            .map(String::as_str)
    }

    /// First value of a key, or `""`.
    #[must_use]
    pub fn value(&self, key: &str) -> &str {
        self.get(key).unwrap_or_default()
    }

    /// Every value of a key, in submission order.
    #[must_use]
    pub fn all(&self, key: &str) -> &[String] {
        self.values.get(key).map_or(&[], Vec::as_slice)
    }

    /// Non-empty trimmed value.
    #[must_use]
    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(ToString::to_string)
    }

    /// Parse the first value.
    #[must_use]
    pub fn parse<T: std::str::FromStr>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(|v| v.trim().parse().ok())
    }

    /// Checkbox state: browsers omit unchecked boxes.
    #[must_use]
    pub fn is_checked(&self, key: &str) -> bool {
        matches!(self.get(key), Some("on" | "true" | "1"))
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(key.to_string(), vec![value.into()]);
    }

    pub fn set_all(&mut self, key: &str, values: Vec<String>) {
        self.values.insert(key.to_string(), values);
    }

    pub fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Field errors of one submission, at most one message per field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: BTreeMap<String, String>,
}

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error; the first error for a field wins.
    pub fn add(&mut self, key: &str, message: impl Into<String>) {
        self.errors
            .entry(key.to_string())
            .or_insert_with(|| message.into());
    }

    /// Fold in another set of errors, keeping existing messages.
    pub fn merge(&mut self, other: Self) {
        for (key, message) in other.errors {
            self.errors.entry(key).or_insert(message);
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.errors.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `Ok(())` when no errors were recorded.
    ///
    /// # Errors
    ///
    /// Returns `self` if any field failed.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.errors.keys().map(String::as_str).collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

// =============================================================================
// Schema
// =============================================================================

/// The ordered fields of one create/edit form.
#[derive(Debug, Clone)]
pub struct FormSchema {
    pub fields: Vec<FormField>,
}

impl FormSchema {
    #[must_use]
    pub const fn new(fields: Vec<FormField>) -> Self {
        Self { fields }
    }

    #[must_use]
    pub fn field(&self, key: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// Fields checked against the database for uniqueness in this mode.
    pub fn unique_fields(&self, mode: FormMode) -> impl Iterator<Item = &FormField> {
        self.fields
            .iter()
            .filter(move |f| f.unique && !(mode == FormMode::Edit && f.is_derived()))
    }

    /// Initial values of the create form.
    #[must_use]
    pub fn defaults(&self) -> FormInput {
        let mut input = FormInput::default();
        for field in &self.fields {
            if let Some(default) = &field.default {
                input.set(field.key, default.clone());
            }
        }
        input
    }

    /// Normalise a raw submission.
    ///
    /// Only schema fields are kept. Values are trimmed and emails lower-cased.
    /// Derived fields are recomputed on create and dropped on edit, so a
    /// submitted slug never reaches the database.
    #[must_use]
    pub fn prepare(&self, raw: &FormInput, mode: FormMode) -> FormInput {
        let mut input = FormInput::default();
        for field in &self.fields {
            let values: Vec<String> = raw
                .all(field.key)
                .iter()
                .map(|v| {
                    let v = v.trim();
                    if field.kind == FieldKind::Email {
                        v.to_lowercase()
                    } else {
                        v.to_string()
                    }
                })
                .filter(|v| field.kind != FieldKind::MultiSelect || !v.is_empty())
                .collect();
            if !values.is_empty() {
                input.set_all(field.key, values);
            }
        }
        self.apply_derivations(&mut input, mode);
        input
    }

    /// Fill derived fields on create; remove them on edit.
    pub fn apply_derivations(&self, input: &mut FormInput, mode: FormMode) {
        for field in &self.fields {
            let Some(Derivation::SlugFrom(source)) = field.derivation else {
                continue;
            };
            match mode {
                FormMode::Create => {
                    let slug = Slug::derive(input.value(source));
                    input.set(field.key, slug.as_str());
                }
                FormMode::Edit => input.remove(field.key),
            }
        }
    }

    /// Validate a prepared submission against today's date (UTC).
    ///
    /// # Errors
    ///
    /// Returns the per-field errors if any field is invalid.
    pub fn validate(&self, input: &FormInput, mode: FormMode) -> Result<(), ValidationErrors> {
        self.validate_on(input, mode, Utc::now().date_naive())
    }

    /// Validate a prepared submission against a given date.
    ///
    /// # Errors
    ///
    /// Returns the per-field errors if any field is invalid.
    pub fn validate_on(
        &self,
        input: &FormInput,
        mode: FormMode,
        today: NaiveDate,
    ) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        for field in &self.fields {
            if mode == FormMode::Edit && field.is_derived() {
                continue;
            }
            if let Some(message) = check_field(field, input, today) {
                errors.add(field.key, message);
            }
        }
        errors.into_result()
    }

    /// Template-ready fields with values and errors.
    #[must_use]
    pub fn fields_view(&self, input: &FormInput, errors: &ValidationErrors) -> Vec<FieldView> {
        self.fields
            .iter()
            .map(|field| {
                let selected = input.all(field.key);
                FieldView {
                    key: field.key,
                    label: field.label,
                    widget: field.kind.widget(),
                    input_type: field.kind.input_type(),
                    value: input.value(field.key).to_string(),
                    checked: input.is_checked(field.key),
                    required: field.required,
                    read_only: field.is_derived(),
                    error: errors.get(field.key).map(ToString::to_string),
                    options: field
                        .options
                        .iter()
                        .map(|o| OptionView {
                            value: o.value.clone(),
                            label: o.label.clone(),
                            selected: selected.contains(&o.value),
                        })
                        .collect(),
                    min: field.min,
                    max: field.max,
                    max_length: field.max_length,
                    help: field.help,
                }
            })
            .collect()
    }
}

fn check_field(field: &FormField, input: &FormInput, today: NaiveDate) -> Option<String> {
    let label = field.label;

    match field.kind {
        FieldKind::Toggle => return None,
        FieldKind::MultiSelect => {
            let values = input.all(field.key);
            if values.is_empty() {
                return field
                    .required
                    .then(|| format!("The {label} field is required."));
            }
            return values
                .iter()
                .any(|v| !field.allows(v))
                .then(|| format!("The selected {label} is invalid."));
        }
        _ => {}
    }

    let value = input.value(field.key);
    if value.is_empty() {
        return field
            .required
            .then(|| format!("The {label} field is required."));
    }
    if let Some(max) = field.max_length
        && value.chars().count() > max
    {
        return Some(format!("The {label} may not be greater than {max} characters."));
    }

    match field.kind {
        FieldKind::Text if field.is_derived() => {
            (!Slug::is_valid(value)).then(|| format!("The {label} format is invalid."))
        }
        FieldKind::Email => Email::parse(value)
            .err()
            .map(|_| format!("The {label} must be a valid email address.")),
        FieldKind::Url => (!is_web_url(value)).then(|| format!("The {label} must be a valid URL.")),
        FieldKind::Color => {
            (!is_hex_color(value)).then(|| format!("The {label} must be a color such as #1A2B3C."))
        }
        FieldKind::Integer => match value.parse::<i64>() {
            Err(_) => Some(format!("The {label} must be an integer.")),
            Ok(n) if field.min.is_some_and(|min| n < min) => Some(format!(
                "The {label} must be at least {}.",
                field.min.unwrap_or_default()
            )),
            Ok(n) if field.max.is_some_and(|max| n > max) => Some(format!(
                "The {label} may not be greater than {}.",
                field.max.unwrap_or_default()
            )),
            Ok(_) => None,
        },
        FieldKind::Price => Price::parse(value)
            .err()
            .map(|e| format!("The {label} is invalid: {e}.")),
        FieldKind::Date => match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
            Err(_) => Some(format!("The {label} is not a valid date.")),
            Ok(date) if field.not_in_future && date > today => {
                Some(format!("The {label} cannot be in the future."))
            }
            Ok(_) => None,
        },
        FieldKind::Select => {
            (!field.allows(value)).then(|| format!("The selected {label} is invalid."))
        }
        FieldKind::Text | FieldKind::Markdown | FieldKind::Toggle | FieldKind::MultiSelect => None,
    }
}

/// Absolute URL with an `http` or `https` scheme and a host.
#[must_use]
pub fn is_web_url(value: &str) -> bool {
    url::Url::parse(value)
        .is_ok_and(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
}

/// `#` followed by six hex digits.
#[must_use]
pub fn is_hex_color(value: &str) -> bool {
    value
        .strip_prefix('#')
        .is_some_and(|hex| hex.len() == 6 && hex.bytes().all(|b| b.is_ascii_hexdigit()))
}

// =============================================================================
// Views
// =============================================================================

/// A select option as rendered.
#[derive(Debug, Clone, Serialize)]
pub struct OptionView {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// A field as rendered.
#[derive(Debug, Clone, Serialize)]
pub struct FieldView {
    pub key: &'static str,
    pub label: &'static str,
    pub widget: &'static str,
    pub input_type: &'static str,
    pub value: String,
    pub checked: bool,
    pub required: bool,
    pub read_only: bool,
    pub error: Option<String>,
    pub options: Vec<OptionView>,
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub max_length: Option<usize>,
    pub help: Option<&'static str>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn schema() -> FormSchema {
        FormSchema::new(vec![
            FormField::text("name", "name").required().unique().max_length(50),
            FormField::slug("slug", "slug", "name"),
            FormField::new("email", "email", FieldKind::Email),
            FormField::new("url", "website URL", FieldKind::Url),
            FormField::new("primary_hex", "color", FieldKind::Color),
            FormField::new("quantity", "quantity", FieldKind::Integer).range(0, 100),
            FormField::new("price", "price", FieldKind::Price),
            FormField::new("born", "date of birth", FieldKind::Date).not_in_future(),
            FormField::new("is_visible", "visibility", FieldKind::Toggle).default_value("on"),
            FormField::new("kind", "type", FieldKind::Select)
                .options(vec![SelectOption::new("a", "A"), SelectOption::new("b", "B")]),
            FormField::new("tags", "tags", FieldKind::MultiSelect)
                .required()
                .options(vec![SelectOption::new(1, "One"), SelectOption::new(2, "Two")]),
        ])
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 15).unwrap()
    }

    fn errors_for(pairs: &[(&str, &str)], mode: FormMode) -> ValidationErrors {
        let schema = schema();
        let input = schema.prepare(&FormInput::from_pairs(pairs.iter().copied()), mode);
        schema
            .validate_on(&input, mode, today())
            .err()
            .unwrap_or_default()
    }

    #[test]
    fn test_prepare_derives_slug_on_create() {
        let schema = schema();
        let raw = FormInput::from_pairs([("name", "  Acme Shoes!  "), ("slug", "ignored")]);
        let input = schema.prepare(&raw, FormMode::Create);
        assert_eq!(input.get("name"), Some("Acme Shoes!"));
        assert_eq!(input.get("slug"), Some("acme-shoes"));
    }

    #[test]
    fn test_prepare_drops_slug_on_edit() {
        let schema = schema();
        let raw = FormInput::from_pairs([("name", "Renamed"), ("slug", "hand-edited")]);
        let input = schema.prepare(&raw, FormMode::Edit);
        assert_eq!(input.get("slug"), None);
        assert_eq!(input.get("name"), Some("Renamed"));
    }

    #[test]
    fn test_prepare_lowercases_email_and_drops_unknown_keys() {
        let schema = schema();
        let raw = FormInput::from_pairs([("email", " Ada@Example.COM "), ("admin", "1")]);
        let input = schema.prepare(&raw, FormMode::Edit);
        assert_eq!(input.get("email"), Some("ada@example.com"));
        assert_eq!(input.get("admin"), None);
    }

    #[test]
    fn test_required_fields() {
        let errors = errors_for(&[], FormMode::Create);
        assert_eq!(errors.get("name"), Some("The name field is required."));
        assert_eq!(errors.get("slug"), Some("The slug field is required."));
        assert_eq!(errors.get("tags"), Some("The tags field is required."));
        assert_eq!(errors.get("email"), None);
        assert_eq!(errors.get("is_visible"), None);
    }

    #[test]
    fn test_name_without_alphanumerics_fails_slug() {
        let errors = errors_for(&[("name", "!!!"), ("tags", "1")], FormMode::Create);
        assert_eq!(errors.get("name"), None);
        assert_eq!(errors.get("slug"), Some("The slug field is required."));
    }

    #[test]
    fn test_slug_not_validated_on_edit() {
        let errors = errors_for(&[("name", "!!!"), ("tags", "1")], FormMode::Edit);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_format_checks() {
        let errors = errors_for(
            &[
                ("name", "x"),
                ("tags", "1"),
                ("email", "not-an-email"),
                ("url", "ftp://example.com"),
                ("primary_hex", "#12345"),
                ("quantity", "101"),
                ("price", "1.999"),
                ("born", "2026-03-16"),
                ("kind", "c"),
            ],
            FormMode::Create,
        );
        assert_eq!(errors.len(), 7);
        assert!(errors.get("email").is_some());
        assert!(errors.get("url").is_some());
        assert!(errors.get("primary_hex").is_some());
        assert_eq!(
            errors.get("quantity"),
            Some("The quantity may not be greater than 100.")
        );
        assert!(errors.get("price").is_some());
        assert_eq!(errors.get("born"), Some("The date of birth cannot be in the future."));
        assert_eq!(errors.get("kind"), Some("The selected type is invalid."));
    }

    #[test]
    fn test_valid_submission_passes() {
        let errors = errors_for(
            &[
                ("name", "Acme"),
                ("tags", "1"),
                ("tags", "2"),
                ("email", "ada@example.com"),
                ("url", "https://acme.test/shop"),
                ("primary_hex", "#a1B2c3"),
                ("quantity", "0"),
                ("price", "999999.99"),
                ("born", "2026-03-15"),
                ("kind", "b"),
            ],
            FormMode::Create,
        );
        assert!(errors.is_empty(), "{errors}");
    }

    #[test]
    fn test_max_length_counts_characters() {
        let long = "é".repeat(51);
        let errors = errors_for(&[("name", long.as_str()), ("tags", "1")], FormMode::Create);
        assert_eq!(
            errors.get("name"),
            Some("The name may not be greater than 50 characters.")
        );
    }

    #[test]
    fn test_multiselect_rejects_unknown_option() {
        let errors = errors_for(&[("name", "x"), ("tags", "1"), ("tags", "9")], FormMode::Create);
        assert_eq!(errors.get("tags"), Some("The selected tags is invalid."));
    }

    #[test]
    fn test_unique_fields_skip_slug_on_edit() {
        let schema = schema();
        let create: Vec<&str> = schema.unique_fields(FormMode::Create).map(|f| f.key).collect();
        let edit: Vec<&str> = schema.unique_fields(FormMode::Edit).map(|f| f.key).collect();
        assert_eq!(create, vec!["name", "slug"]);
        assert_eq!(edit, vec!["name"]);
    }

    #[test]
    fn test_fields_view_marks_selection_and_errors() {
        let schema = schema();
        let input = FormInput::from_pairs([("tags", "2"), ("is_visible", "on")]);
        let mut errors = ValidationErrors::new();
        errors.add("name", "bad");
        errors.add("name", "ignored");

        let view = schema.fields_view(&input, &errors);
        let name = view.iter().find(|f| f.key == "name").unwrap();
        assert_eq!(name.error.as_deref(), Some("bad"));
        let slug = view.iter().find(|f| f.key == "slug").unwrap();
        assert!(slug.read_only);
        let tags = view.iter().find(|f| f.key == "tags").unwrap();
        assert!(!tags.options[0].selected);
        assert!(tags.options[1].selected);
        assert!(view.iter().find(|f| f.key == "is_visible").unwrap().checked);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(schema().defaults().get("is_visible"), Some("on"));
    }

    #[test]
    fn test_helpers() {
        assert!(is_hex_color("#FFaa00"));
        assert!(!is_hex_color("FFaa00"));
        assert!(is_web_url("http://localhost:8080"));
        assert!(!is_web_url("example.com"));
        assert!(!is_web_url("mailto:ada@example.com"));
    }
}
