//! Posted wizard forms. Field names match the posted `kebab-case` keys, and
//! each form validates into a [`ValidationList`] rather than failing.

use serde::Deserialize;
use time::Date;
use validator::{Validate, ValidateEmail};

use crate::actor::{Address, Relationship, RelationshipLength};
use crate::date::{DateParts, DobWarning};
use crate::lpa::{DecisionMode, IdentityOption, LpaType, StepIn, WhenCanTheLpaBeUsed, YesNo};
use crate::validation::{
    DerivedField, FieldError, ValidationList, check_max_length, check_required,
};

pub const FIRST_NAMES_MAX: usize = 53;
pub const LAST_NAME_MAX: usize = 61;
pub const RESTRICTIONS_MAX: usize = 10_000;
pub const DETAILS_MAX: usize = 10_000;

fn checked(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|value| !value.is_empty())
}

const FIRST_NAMES: DerivedField = DerivedField::new("first_names", "first-names", "firstNames");
const LAST_NAME: DerivedField = DerivedField::new("last_name", "last-name", "lastName");
const EMAIL: DerivedField = DerivedField::new("email", "email", "email");

const ACTOR_FIELDS: [DerivedField; 3] = [FIRST_NAMES, LAST_NAME, EMAIL];
const DONOR_FIELDS: [DerivedField; 3] = [
    FIRST_NAMES,
    LAST_NAME,
    DerivedField::new("other_names", "other-names", "otherNamesYouAreKnownBy"),
];
const CERTIFICATE_PROVIDER_FIELDS: [DerivedField; 3] = [
    FIRST_NAMES,
    LAST_NAME,
    DerivedField::new("mobile", "mobile", "mobile"),
];
const MANUAL_ADDRESS_FIELDS: [DerivedField; 5] = [
    DerivedField::new("line1", "address-line-1", "addressLine1"),
    DerivedField::new("line2", "address-line-2", "addressLine2"),
    DerivedField::new("line3", "address-line-3", "addressLine3"),
    DerivedField::new("town_or_city", "address-town", "townOrCity"),
    DerivedField::new("postcode", "address-postcode", "postcode"),
];
const RESTRICTIONS_FIELDS: [DerivedField; 1] =
    [DerivedField::new("restrictions", "restrictions", "restrictions")];

/// Details of an attorney or replacement attorney. Validated after
/// [`ActorDetailsForm::trimmed`].
#[derive(Clone, Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "kebab-case")]
pub struct ActorDetailsForm {
    #[validate(length(min = 1, max = 53))]
    pub first_names: String,
    #[validate(length(min = 1, max = 61))]
    pub last_name: String,
    #[validate(length(min = 1), email)]
    pub email: String,
    pub date_of_birth_day: String,
    pub date_of_birth_month: String,
    pub date_of_birth_year: String,
    pub ignore_name_warning: Option<String>,
    pub ignore_dob_warning: Option<String>,
    pub from: Option<String>,
}

impl ActorDetailsForm {
    pub fn trimmed(mut self) -> Self {
        self.first_names = self.first_names.trim().to_string();
        self.last_name = self.last_name.trim().to_string();
        self.email = self.email.trim().to_string();
        self
    }

    pub fn date_of_birth_parts(&self) -> DateParts {
        DateParts::new(
            &self.date_of_birth_day,
            &self.date_of_birth_month,
            &self.date_of_birth_year,
        )
    }

    pub fn date_of_birth(&self) -> Option<Date> {
        self.date_of_birth_parts().parse()
    }

    pub fn validate(&self, today: Date) -> ValidationList {
        let mut errors = ValidationList::from_validator(Validate::validate(self), &ACTOR_FIELDS);
        self.date_of_birth_parts()
            .validate_past(&mut errors, "date-of-birth", "dateOfBirth", today);
        errors
    }

    pub fn dob_warning(&self, today: Date) -> Option<DobWarning> {
        self.date_of_birth()
            .and_then(|dob| DobWarning::for_attorney(dob, today))
    }
}

#[derive(Clone, Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "kebab-case")]
pub struct DonorDetailsForm {
    #[validate(length(min = 1, max = 53))]
    pub first_names: String,
    #[validate(length(min = 1, max = 61))]
    pub last_name: String,
    #[validate(length(max = 50))]
    pub other_names: String,
    pub date_of_birth_day: String,
    pub date_of_birth_month: String,
    pub date_of_birth_year: String,
    pub ignore_dob_warning: Option<String>,
}

impl DonorDetailsForm {
    pub fn trimmed(mut self) -> Self {
        self.first_names = self.first_names.trim().to_string();
        self.last_name = self.last_name.trim().to_string();
        self.other_names = self.other_names.trim().to_string();
        self
    }

    fn date_of_birth_parts(&self) -> DateParts {
        DateParts::new(
            &self.date_of_birth_day,
            &self.date_of_birth_month,
            &self.date_of_birth_year,
        )
    }

    pub fn date_of_birth(&self) -> Option<Date> {
        self.date_of_birth_parts().parse()
    }

    pub fn validate(&self, today: Date) -> ValidationList {
        let mut errors = ValidationList::from_validator(Validate::validate(self), &DONOR_FIELDS);
        self.date_of_birth_parts()
            .validate_past(&mut errors, "date-of-birth", "dateOfBirth", today);
        errors
    }

    pub fn dob_warning(&self, today: Date) -> Option<DobWarning> {
        self.date_of_birth()
            .and_then(|dob| DobWarning::for_donor(dob, today))
    }
}

#[derive(Clone, Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "kebab-case")]
pub struct PersonToNotifyForm {
    #[validate(length(min = 1, max = 53))]
    pub first_names: String,
    #[validate(length(min = 1, max = 61))]
    pub last_name: String,
    #[validate(length(min = 1), email)]
    pub email: String,
    pub ignore_name_warning: Option<String>,
    pub from: Option<String>,
}

impl PersonToNotifyForm {
    pub fn trimmed(mut self) -> Self {
        self.first_names = self.first_names.trim().to_string();
        self.last_name = self.last_name.trim().to_string();
        self.email = self.email.trim().to_string();
        self
    }

    pub fn validate(&self) -> ValidationList {
        ValidationList::from_validator(Validate::validate(self), &ACTOR_FIELDS)
    }
}

#[derive(Clone, Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "kebab-case")]
pub struct CertificateProviderForm {
    #[validate(length(min = 1, max = 53))]
    pub first_names: String,
    #[validate(length(min = 1, max = 61))]
    pub last_name: String,
    pub email: String,
    #[validate(length(min = 1))]
    pub mobile: String,
    pub date_of_birth_day: String,
    pub date_of_birth_month: String,
    pub date_of_birth_year: String,
    pub relationship: String,
    pub relationship_description: String,
    pub relationship_length: String,
    pub ignore_name_warning: Option<String>,
    pub from: Option<String>,
}

impl CertificateProviderForm {
    pub fn trimmed(mut self) -> Self {
        self.first_names = self.first_names.trim().to_string();
        self.last_name = self.last_name.trim().to_string();
        self.email = self.email.trim().to_string();
        self.mobile = self.mobile.trim().to_string();
        self.relationship_description = self.relationship_description.trim().to_string();
        self
    }

    fn date_of_birth_parts(&self) -> DateParts {
        DateParts::new(
            &self.date_of_birth_day,
            &self.date_of_birth_month,
            &self.date_of_birth_year,
        )
    }

    pub fn date_of_birth(&self) -> Option<Date> {
        self.date_of_birth_parts().parse()
    }

    pub fn validate(&self, today: Date) -> ValidationList {
        let mut errors =
            ValidationList::from_validator(Validate::validate(self), &CERTIFICATE_PROVIDER_FIELDS);
        if !self.email.is_empty() && !self.email.validate_email() {
            errors.add("email", FieldError::Email { label: "email" });
        }
        self.date_of_birth_parts()
            .validate_past(&mut errors, "date-of-birth", "dateOfBirth", today);

        match Relationship::parse(&self.relationship) {
            None => errors.add(
                "relationship",
                FieldError::Select {
                    label: "howYouKnowCertificateProvider",
                },
            ),
            Some(Relationship::Professionally) => check_required(
                &mut errors,
                "relationship-description",
                "relationshipDescription",
                &self.relationship_description,
            ),
            Some(Relationship::Personally) => {
                match RelationshipLength::parse(&self.relationship_length) {
                    None => errors.add(
                        "relationship-length",
                        FieldError::Select {
                            label: "howLongYouHaveKnownCertificateProvider",
                        },
                    ),
                    Some(RelationshipLength::LessThanTwoYears) => errors.add(
                        "relationship-length",
                        FieldError::Custom {
                            label: "mustHaveKnownCertificateProviderTwoYears",
                        },
                    ),
                    Some(RelationshipLength::TwoYearsOrMore) => {}
                }
            }
        }
        errors
    }
}

#[derive(Validate)]
struct ManualAddress {
    #[validate(length(min = 1, max = 50))]
    line1: String,
    #[validate(length(max = 50))]
    line2: String,
    #[validate(length(max = 50))]
    line3: String,
    #[validate(length(min = 1))]
    town_or_city: String,
    #[validate(length(min = 1))]
    postcode: String,
}

impl From<Address> for ManualAddress {
    fn from(address: Address) -> Self {
        Self {
            line1: address.line1,
            line2: address.line2,
            line3: address.line3,
            town_or_city: address.town_or_city,
            postcode: address.postcode,
        }
    }
}

/// What the user asked the address page to do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AddressAction {
    Lookup { postcode: String },
    Select { postcode: String, address: Option<Address> },
    Manual(Address),
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AddressForm {
    pub action: String,
    pub lookup_postcode: String,
    /// A JSON encoded address chosen from the lookup results.
    pub select_address: String,
    pub address_line_1: String,
    pub address_line_2: String,
    pub address_line_3: String,
    pub address_town: String,
    pub address_postcode: String,
    pub from: Option<String>,
}

impl AddressForm {
    pub fn action(&self) -> Option<AddressAction> {
        match self.action.as_str() {
            "lookup" => Some(AddressAction::Lookup {
                postcode: self.lookup_postcode.trim().to_string(),
            }),
            "select" => Some(AddressAction::Select {
                postcode: self.lookup_postcode.trim().to_string(),
                address: serde_json::from_str(&self.select_address).ok(),
            }),
            "manual" => Some(AddressAction::Manual(Address {
                line1: self.address_line_1.trim().to_string(),
                line2: self.address_line_2.trim().to_string(),
                line3: self.address_line_3.trim().to_string(),
                town_or_city: self.address_town.trim().to_string(),
                postcode: self.address_postcode.trim().to_string(),
            })),
            _ => None,
        }
    }

    pub fn validate(&self) -> ValidationList {
        let mut errors = ValidationList::new();
        match self.action() {
            None => errors.add("action", FieldError::Select { label: "action" }),
            Some(AddressAction::Lookup { postcode }) => {
                check_required(&mut errors, "lookup-postcode", "postcode", &postcode)
            }
            Some(AddressAction::Select { address, .. }) => {
                if address.is_none() {
                    errors.add("select-address", FieldError::Select { label: "address" });
                }
            }
            Some(AddressAction::Manual(address)) => {
                let manual = ManualAddress::from(address);
                errors = ValidationList::from_validator(manual.validate(), &MANUAL_ADDRESS_FIELDS);
            }
        }
        errors
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DecisionsForm {
    pub decision_type: String,
    pub mixed_details: String,
}

impl DecisionsForm {
    pub fn decision_mode(&self) -> Option<DecisionMode> {
        match self.decision_type.as_str() {
            "jointly" => Some(DecisionMode::Jointly),
            "jointly-and-severally" => Some(DecisionMode::JointlyAndSeverally),
            "mixed" => Some(DecisionMode::Mixed(self.mixed_details.trim().to_string())),
            _ => None,
        }
    }

    pub fn validate(&self, label: &'static str) -> ValidationList {
        let mut errors = ValidationList::new();
        match self.decision_mode() {
            None => errors.add("decision-type", FieldError::Select { label }),
            Some(DecisionMode::Mixed(details)) => {
                check_required(&mut errors, "mixed-details", "details", &details);
                check_max_length(&mut errors, "mixed-details", "details", &details, DETAILS_MAX);
            }
            Some(_) => {}
        }
        errors
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct StepInForm {
    pub when_to_step_in: String,
    pub other_details: String,
}

impl StepInForm {
    pub fn step_in(&self) -> Option<StepIn> {
        match self.when_to_step_in.as_str() {
            "one" => Some(StepIn::WhenOneCanNoLongerAct),
            "all" => Some(StepIn::WhenAllCanNoLongerAct),
            "other" => Some(StepIn::SomeOtherWay(self.other_details.trim().to_string())),
            _ => None,
        }
    }

    pub fn validate(&self) -> ValidationList {
        let mut errors = ValidationList::new();
        match self.step_in() {
            None => errors.add(
                "when-to-step-in",
                FieldError::Select {
                    label: "whenYourReplacementAttorneysStepIn",
                },
            ),
            Some(StepIn::SomeOtherWay(details)) => {
                let label = "detailsOfWhenToStepIn";
                check_required(&mut errors, "other-details", label, &details);
                check_max_length(&mut errors, "other-details", label, &details, DETAILS_MAX);
            }
            Some(_) => {}
        }
        errors
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct YesNoForm {
    pub yes_no: String,
}

impl YesNoForm {
    pub fn answer(&self) -> Option<YesNo> {
        YesNo::parse(&self.yes_no)
    }

    pub fn validate(&self, label: &'static str) -> ValidationList {
        match self.answer() {
            Some(_) => ValidationList::new(),
            None => ValidationList::with("yes-no", FieldError::Select { label }),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LpaTypeForm {
    pub lpa_type: String,
}

impl LpaTypeForm {
    pub fn lpa_type(&self) -> Option<LpaType> {
        LpaType::parse(&self.lpa_type)
    }

    pub fn validate(&self) -> ValidationList {
        match self.lpa_type() {
            Some(_) => ValidationList::new(),
            None => ValidationList::with(
                "lpa-type",
                FieldError::Select {
                    label: "theTypeOfLpaToMake",
                },
            ),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "kebab-case")]
pub struct RestrictionsForm {
    #[validate(length(max = 10000))]
    pub restrictions: String,
    pub answer_later: Option<String>,
}

impl RestrictionsForm {
    pub fn answer_later(&self) -> bool {
        checked(&self.answer_later)
    }

    pub fn validate(&self) -> ValidationList {
        ValidationList::from_validator(Validate::validate(self), &RESTRICTIONS_FIELDS)
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct WhenCanTheLpaBeUsedForm {
    pub when: String,
    pub answer_later: Option<String>,
}

impl WhenCanTheLpaBeUsedForm {
    pub fn when(&self) -> Option<WhenCanTheLpaBeUsed> {
        WhenCanTheLpaBeUsed::parse(&self.when)
    }

    pub fn answer_later(&self) -> bool {
        checked(&self.answer_later)
    }

    pub fn validate(&self) -> ValidationList {
        if self.answer_later() || self.when().is_some() {
            ValidationList::new()
        } else {
            ValidationList::with(
                "when",
                FieldError::Select {
                    label: "whenYourAttorneysCanUseYourLpa",
                },
            )
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CheckYourLpaForm {
    pub checked: Option<String>,
    pub happy: Option<String>,
}

impl CheckYourLpaForm {
    pub fn validate(&self) -> ValidationList {
        let mut errors = ValidationList::new();
        if !checked(&self.checked) {
            errors.add("checked", FieldError::Custom { label: "selectCheckedLpa" });
        }
        if !checked(&self.happy) {
            errors.add("happy", FieldError::Custom { label: "selectHappyToShareLpa" });
        }
        errors
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct IdentityOptionForm {
    pub option: String,
}

impl IdentityOptionForm {
    pub fn option(&self) -> Option<IdentityOption> {
        IdentityOption::parse(&self.option)
    }

    pub fn validate(&self) -> ValidationList {
        match self.option() {
            Some(_) => ValidationList::new(),
            None => ValidationList::with(
                "option",
                FieldError::Select {
                    label: "fromTheListedOptions",
                },
            ),
        }
    }
}

/// Names vouched for by the identity provider on its callback.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct IdentityCallbackForm {
    pub first_names: String,
    pub last_name: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SignForm {
    pub want_to_sign: Option<String>,
    pub want_to_apply: Option<String>,
}

impl SignForm {
    pub fn want_to_sign(&self) -> bool {
        checked(&self.want_to_sign)
    }

    pub fn want_to_apply(&self) -> bool {
        checked(&self.want_to_apply)
    }

    pub fn validate(&self) -> ValidationList {
        if self.want_to_sign() && self.want_to_apply() {
            ValidationList::new()
        } else {
            ValidationList::with(
                "sign-lpa",
                FieldError::Custom {
                    label: "bothBoxesToSignAndApply",
                },
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    const TODAY: Date = date!(2024 - 06 - 15);

    fn attorney_form() -> ActorDetailsForm {
        ActorDetailsForm {
            first_names: "John".to_string(),
            last_name: "Doe".to_string(),
            email: "john@example.com".to_string(),
            date_of_birth_day: "2".to_string(),
            date_of_birth_month: "1".to_string(),
            date_of_birth_year: "1990".to_string(),
            ..ActorDetailsForm::default()
        }
    }

    #[test]
    fn valid_attorney_details() {
        assert!(attorney_form().validate(TODAY).none());
        assert_eq!(attorney_form().date_of_birth(), Some(date!(1990 - 01 - 02)));
    }

    #[test]
    fn missing_attorney_details() {
        let errors = ActorDetailsForm::default().validate(TODAY);
        assert_eq!(
            errors,
            ValidationList::with("first-names", FieldError::Enter { label: "firstNames" })
                .and("last-name", FieldError::Enter { label: "lastName" })
                .and("email", FieldError::Enter { label: "email" })
                .and("date-of-birth", FieldError::Enter { label: "dateOfBirth" })
        );
    }

    #[test]
    fn attorney_names_at_and_over_the_limit() {
        let mut form = attorney_form();
        form.first_names = "x".repeat(FIRST_NAMES_MAX);
        form.last_name = "x".repeat(LAST_NAME_MAX);
        assert!(form.validate(TODAY).none());

        form.first_names.push('x');
        form.last_name.push('x');
        assert_eq!(
            form.validate(TODAY),
            ValidationList::with(
                "first-names",
                FieldError::StringTooLong {
                    label: "firstNames",
                    length: FIRST_NAMES_MAX
                }
            )
            .and(
                "last-name",
                FieldError::StringTooLong {
                    label: "lastName",
                    length: LAST_NAME_MAX
                }
            )
        );
    }

    #[test]
    fn invalid_email_is_reported() {
        let mut form = attorney_form();
        form.email = "person@".to_string();
        assert_eq!(
            form.validate(TODAY),
            ValidationList::with("email", FieldError::Email { label: "email" })
        );
    }

    #[test]
    fn trimmed_strips_whitespace() {
        let mut form = attorney_form();
        form.first_names = "  John ".to_string();
        assert_eq!(form.trimmed().first_names, "John");
    }

    #[test]
    fn address_actions() {
        let form = AddressForm {
            action: "manual".to_string(),
            address_line_1: "1 Road".to_string(),
            ..AddressForm::default()
        };
        assert_eq!(
            form.validate(),
            ValidationList::with("address-town", FieldError::Enter { label: "townOrCity" })
                .and("address-postcode", FieldError::Enter { label: "postcode" })
        );

        let address = Address {
            line1: "1 Road".to_string(),
            town_or_city: "Town".to_string(),
            postcode: "B14 7ED".to_string(),
            ..Address::default()
        };
        let form = AddressForm {
            action: "select".to_string(),
            select_address: serde_json::to_string(&address).expect("json"),
            ..AddressForm::default()
        };
        assert!(form.validate().none());
        assert_eq!(
            form.action(),
            Some(AddressAction::Select {
                postcode: String::new(),
                address: Some(address)
            })
        );

        let form = AddressForm {
            action: "select".to_string(),
            select_address: "not json".to_string(),
            ..AddressForm::default()
        };
        assert!(form.validate().has("select-address"));

        let form = AddressForm {
            action: "lookup".to_string(),
            ..AddressForm::default()
        };
        assert!(form.validate().has("lookup-postcode"));
    }

    #[test]
    fn manual_address_line_limits() {
        let form = AddressForm {
            action: "manual".to_string(),
            address_line_1: " ".to_string(),
            address_line_3: "x".repeat(51),
            address_town: "Town".to_string(),
            address_postcode: "B14 7ED".to_string(),
            ..AddressForm::default()
        };
        assert_eq!(
            form.validate(),
            ValidationList::with("address-line-1", FieldError::Enter { label: "addressLine1" })
                .and(
                    "address-line-3",
                    FieldError::StringTooLong {
                        label: "addressLine3",
                        length: 50
                    }
                )
        );
    }

    #[test]
    fn donor_other_names_are_limited() {
        let form = DonorDetailsForm {
            first_names: "Jamie".to_string(),
            last_name: "Smith".to_string(),
            other_names: "x".repeat(51),
            date_of_birth_day: "2".to_string(),
            date_of_birth_month: "1".to_string(),
            date_of_birth_year: "1990".to_string(),
            ..DonorDetailsForm::default()
        };
        assert_eq!(
            form.validate(TODAY),
            ValidationList::with(
                "other-names",
                FieldError::StringTooLong {
                    label: "otherNamesYouAreKnownBy",
                    length: 50
                }
            )
        );
    }

    #[test]
    fn certificate_provider_email_is_optional_but_mobile_is_not() {
        let form = CertificateProviderForm {
            first_names: "Carol".to_string(),
            last_name: "Jones".to_string(),
            date_of_birth_day: "1".to_string(),
            date_of_birth_month: "1".to_string(),
            date_of_birth_year: "1970".to_string(),
            relationship: "professionally".to_string(),
            relationship_description: "Solicitor".to_string(),
            ..CertificateProviderForm::default()
        };
        assert_eq!(
            form.validate(TODAY),
            ValidationList::with("mobile", FieldError::Enter { label: "mobile" })
        );

        let form = CertificateProviderForm {
            mobile: "07535111111".to_string(),
            email: "carol@".to_string(),
            ..form
        };
        assert_eq!(
            form.validate(TODAY),
            ValidationList::with("email", FieldError::Email { label: "email" })
        );
    }

    #[test]
    fn mixed_decisions_need_details() {
        let form = DecisionsForm {
            decision_type: "mixed".to_string(),
            mixed_details: " ".to_string(),
        };
        assert!(form.validate("howAttorneysShouldMakeDecisions").has("mixed-details"));

        let form = DecisionsForm {
            decision_type: "sometimes".to_string(),
            ..DecisionsForm::default()
        };
        assert_eq!(
            form.validate("howAttorneysShouldMakeDecisions"),
            ValidationList::with(
                "decision-type",
                FieldError::Select {
                    label: "howAttorneysShouldMakeDecisions"
                }
            )
        );
    }

    #[test]
    fn step_in_other_needs_details() {
        let form = StepInForm {
            when_to_step_in: "other".to_string(),
            other_details: String::new(),
        };
        assert!(form.validate().has("other-details"));
        assert_eq!(
            StepInForm {
                when_to_step_in: "one".to_string(),
                other_details: "ignored".to_string(),
            }
            .step_in(),
            Some(StepIn::WhenOneCanNoLongerAct)
        );
    }

    #[test]
    fn sign_needs_both_boxes() {
        let form = SignForm {
            want_to_sign: Some("1".to_string()),
            want_to_apply: None,
        };
        assert_eq!(
            form.validate(),
            ValidationList::with(
                "sign-lpa",
                FieldError::Custom {
                    label: "bothBoxesToSignAndApply"
                }
            )
        );
    }

    #[test]
    fn restrictions_length_limit() {
        let form = RestrictionsForm {
            restrictions: "x".repeat(RESTRICTIONS_MAX + 1),
            answer_later: None,
        };
        assert!(form.validate().has("restrictions"));
    }

    #[test]
    fn certificate_provider_known_for_under_two_years_is_rejected() {
        let form = CertificateProviderForm {
            first_names: "Carol".to_string(),
            last_name: "Jones".to_string(),
            mobile: "07535111111".to_string(),
            date_of_birth_day: "1".to_string(),
            date_of_birth_month: "1".to_string(),
            date_of_birth_year: "1970".to_string(),
            relationship: "personally".to_string(),
            relationship_length: "lt-2-years".to_string(),
            ..CertificateProviderForm::default()
        };
        assert_eq!(
            form.validate(TODAY).get("relationship-length").map(FieldError::code),
            Some("mustHaveKnownCertificateProviderTwoYears")
        );
    }
}
