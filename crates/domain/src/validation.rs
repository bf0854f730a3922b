use serde::Serialize;
use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

/// A field-level problem with user input. `label` is a translation key for
/// the field's human name.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldError {
    Enter {
        label: &'static str,
    },
    Select {
        label: &'static str,
    },
    StringTooLong {
        label: &'static str,
        length: usize,
    },
    DateMustBeReal {
        label: &'static str,
    },
    DateMustBePast {
        label: &'static str,
    },
    DateMissing {
        label: &'static str,
        missing_day: bool,
        missing_month: bool,
        missing_year: bool,
    },
    Email {
        label: &'static str,
    },
    Custom {
        label: &'static str,
    },
}

impl FieldError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Enter { .. } => "errorEnter",
            Self::Select { .. } => "errorSelect",
            Self::StringTooLong { .. } => "errorStringTooLong",
            Self::DateMustBeReal { .. } => "errorDateMustBeReal",
            Self::DateMustBePast { .. } => "errorDateMustBePast",
            Self::DateMissing { .. } => "errorDateMissing",
            Self::Email { .. } => "errorEmail",
            Self::Custom { label } => *label,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Enter { label }
            | Self::Select { label }
            | Self::StringTooLong { label, .. }
            | Self::DateMustBeReal { label }
            | Self::DateMustBePast { label }
            | Self::DateMissing { label, .. }
            | Self::Email { label }
            | Self::Custom { label } => *label,
        }
    }
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub error: FieldError,
}

/// Field-keyed errors, at most one per field, in the order they were found.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ValidationList(Vec<Field>);

impl ValidationList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(name: &'static str, error: FieldError) -> Self {
        let mut list = Self::new();
        list.add(name, error);
        list
    }

    pub fn and(mut self, name: &'static str, error: FieldError) -> Self {
        self.add(name, error);
        self
    }

    pub fn add(&mut self, name: &'static str, error: FieldError) {
        if self.has(name) {
            return;
        }
        self.0.push(Field { name, error });
    }

    pub fn has(&self, name: &str) -> bool {
        self.0.iter().any(|field| field.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&FieldError> {
        self.0
            .iter()
            .find(|field| field.name == name)
            .map(|field| &field.error)
    }

    pub fn any(&self) -> bool {
        !self.0.is_empty()
    }

    pub fn none(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        self.0.iter()
    }

    /// Collects the errors raised by a `#[derive(Validate)]` form, keeping
    /// the order of `fields`. A blank required field reports `Enter` even
    /// when another rule on it also failed.
    pub(crate) fn from_validator(
        result: Result<(), ValidationErrors>,
        fields: &[DerivedField],
    ) -> Self {
        let mut list = Self::new();
        let Err(errors) = result else {
            return list;
        };

        let raised_by = errors.errors();
        for field in fields {
            // Keys follow a serde rename when validator picks one up.
            let kind = raised_by.get(field.field).or_else(|| raised_by.get(field.name));
            let Some(ValidationErrorsKind::Field(raised)) = kind else {
                continue;
            };
            let error = raised
                .iter()
                .map(|error| field_error(error, field.label))
                .min_by_key(|error| !matches!(error, FieldError::Enter { .. }));
            if let Some(error) = error {
                list.add(field.name, error);
            }
        }
        list
    }
}

/// A struct field checked by `validator`, with the posted name and label it
/// is reported under.
pub(crate) struct DerivedField {
    pub field: &'static str,
    pub name: &'static str,
    pub label: &'static str,
}

impl DerivedField {
    pub(crate) const fn new(field: &'static str, name: &'static str, label: &'static str) -> Self {
        Self { field, name, label }
    }
}

fn field_error(error: &ValidationError, label: &'static str) -> FieldError {
    match error.code.as_ref() {
        "email" => FieldError::Email { label },
        "length" => {
            let blank = error
                .params
                .get("value")
                .and_then(serde_json::Value::as_str)
                .is_some_and(str::is_empty);
            match error.params.get("max").and_then(serde_json::Value::as_u64) {
                Some(max) if !blank => FieldError::StringTooLong {
                    label,
                    length: max as usize,
                },
                _ => FieldError::Enter { label },
            }
        }
        _ => FieldError::Custom { label },
    }
}

pub(crate) fn check_required(
    errors: &mut ValidationList,
    name: &'static str,
    label: &'static str,
    value: &str,
) {
    if value.trim().is_empty() {
        errors.add(name, FieldError::Enter { label });
    }
}

pub(crate) fn check_max_length(
    errors: &mut ValidationList,
    name: &'static str,
    label: &'static str,
    value: &str,
    length: usize,
) {
    if value.chars().count() > length {
        errors.add(name, FieldError::StringTooLong { label, length });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn only_the_first_error_per_field_is_kept() {
        let list = ValidationList::with("first-names", FieldError::Enter { label: "firstNames" })
            .and(
                "first-names",
                FieldError::StringTooLong {
                    label: "firstNames",
                    length: 53,
                },
            )
            .and("email", FieldError::Email { label: "email" });

        assert_eq!(list.iter().count(), 2);
        assert_eq!(
            list.get("first-names"),
            Some(&FieldError::Enter { label: "firstNames" })
        );
        assert!(list.has("email"));
        assert!(list.any());
    }

    #[derive(Validate)]
    struct Named {
        #[validate(length(min = 1, max = 5))]
        first: String,
        #[validate(length(min = 1), email)]
        email: String,
        #[validate(length(max = 3))]
        other: String,
    }

    const NAMED: [DerivedField; 3] = [
        DerivedField::new("first", "first-names", "firstNames"),
        DerivedField::new("email", "email", "email"),
        DerivedField::new("other", "other-names", "otherNames"),
    ];

    #[test]
    fn derived_errors_are_keyed_by_posted_name() {
        let named = Named {
            first: "abcdef".to_string(),
            email: String::new(),
            other: "abcd".to_string(),
        };

        assert_eq!(
            ValidationList::from_validator(named.validate(), &NAMED),
            ValidationList::with(
                "first-names",
                FieldError::StringTooLong {
                    label: "firstNames",
                    length: 5
                }
            )
            .and("email", FieldError::Enter { label: "email" })
            .and(
                "other-names",
                FieldError::StringTooLong {
                    label: "otherNames",
                    length: 3
                }
            )
        );
    }

    #[test]
    fn derived_errors_map_blank_and_bad_email() {
        let named = Named {
            first: String::new(),
            email: "person@".to_string(),
            other: String::new(),
        };

        assert_eq!(
            ValidationList::from_validator(named.validate(), &NAMED),
            ValidationList::with("first-names", FieldError::Enter { label: "firstNames" })
                .and("email", FieldError::Email { label: "email" })
        );
    }

    #[test]
    fn custom_errors_use_their_label_as_code() {
        let error = FieldError::Custom {
            label: "bothBoxesToSignAndApply",
        };
        assert_eq!(error.code(), "bothBoxesToSignAndApply");
        assert_eq!(FieldError::Email { label: "email" }.code(), "errorEmail");
    }
}
