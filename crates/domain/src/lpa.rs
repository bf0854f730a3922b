use serde::{Deserialize, Serialize};

use crate::actor::{
    ActorKind, Attorney, Attorneys, CertificateProvider, Collection, PeopleToNotify, Person,
};
use crate::tasks::{Section, Tasks};

pub const COST_OF_LPA_PENCE: u32 = 8_200;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum YesNo {
    Yes,
    No,
}

impl YesNo {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "yes" => Some(Self::Yes),
            "no" => Some(Self::No),
            _ => None,
        }
    }
}

/// How a group of attorneys acts. Details for a mixed arrangement live in the
/// variant, so switching away from `Mixed` drops them.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "how", content = "details", rename_all = "kebab-case")]
pub enum DecisionMode {
    Jointly,
    JointlyAndSeverally,
    Mixed(String),
}

impl DecisionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jointly => "jointly",
            Self::JointlyAndSeverally => "jointly-and-severally",
            Self::Mixed(_) => "mixed",
        }
    }

    pub fn is_complete(&self) -> bool {
        match self {
            Self::Jointly | Self::JointlyAndSeverally => true,
            Self::Mixed(details) => !details.trim().is_empty(),
        }
    }
}

/// When replacement attorneys begin acting.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "when", content = "details", rename_all = "kebab-case")]
pub enum StepIn {
    WhenOneCanNoLongerAct,
    WhenAllCanNoLongerAct,
    SomeOtherWay(String),
}

impl StepIn {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WhenOneCanNoLongerAct => "one",
            Self::WhenAllCanNoLongerAct => "all",
            Self::SomeOtherWay(_) => "other",
        }
    }

    pub fn is_complete(&self) -> bool {
        match self {
            Self::WhenOneCanNoLongerAct | Self::WhenAllCanNoLongerAct => true,
            Self::SomeOtherWay(details) => !details.trim().is_empty(),
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum LpaType {
    PropertyAndAffairs,
    HealthAndWelfare,
}

impl LpaType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "property-and-affairs" => Some(Self::PropertyAndAffairs),
            "health-and-welfare" => Some(Self::HealthAndWelfare),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum WhenCanTheLpaBeUsed {
    WhenRegistered,
    WhenCapacityLost,
}

impl WhenCanTheLpaBeUsed {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "when-registered" => Some(Self::WhenRegistered),
            "when-capacity-lost" => Some(Self::WhenCapacityLost),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum IdentityOption {
    OneLogin,
    EasyId,
    Passport,
    DrivingLicencePhotocard,
    DrivingLicencePaper,
    BiometricResidencePermit,
    OnlineBankAccount,
}

impl IdentityOption {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "one-login" => Some(Self::OneLogin),
            "easy-id" => Some(Self::EasyId),
            "passport" => Some(Self::Passport),
            "driving-licence-photocard" => Some(Self::DrivingLicencePhotocard),
            "driving-licence-paper" => Some(Self::DrivingLicencePaper),
            "biometric-residence-permit" => Some(Self::BiometricResidencePermit),
            "online-bank-account" => Some(Self::OnlineBankAccount),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaymentDetails {
    pub payment_reference: String,
    pub payment_id: String,
}

/// What an identity provider vouched for. Only presence matters here.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct IdentityUserData {
    pub ok: bool,
    pub first_names: String,
    pub last_name: String,
    pub retrieved_at_ms: i64,
}

/// Selects between the two attorney collections, which share one flow.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AttorneyRole {
    Primary,
    Replacement,
}

impl AttorneyRole {
    pub fn collection(&self) -> Collection {
        match self {
            Self::Primary => Collection::Attorneys,
            Self::Replacement => Collection::ReplacementAttorneys,
        }
    }

    pub fn kind(&self) -> ActorKind {
        self.collection().kind()
    }

    pub fn section(&self) -> Section {
        match self {
            Self::Primary => Section::ChooseAttorneys,
            Self::Replacement => Section::ChooseReplacementAttorneys,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Lpa {
    pub id: String,
    pub version: u64,
    pub donor: Person,
    pub lpa_type: Option<LpaType>,
    pub attorneys: Attorneys,
    pub how_attorneys_make_decisions: Option<DecisionMode>,
    pub want_replacement_attorneys: Option<YesNo>,
    pub replacement_attorneys: Attorneys,
    pub how_replacement_attorneys_make_decisions: Option<DecisionMode>,
    pub how_replacement_attorneys_step_in: Option<StepIn>,
    pub when_can_the_lpa_be_used: Option<WhenCanTheLpaBeUsed>,
    pub restrictions: String,
    pub certificate_provider: CertificateProvider,
    pub do_you_want_to_notify_people: Option<YesNo>,
    pub people_to_notify: PeopleToNotify,
    pub checked: bool,
    pub happy_to_share: bool,
    pub payment_details: Option<PaymentDetails>,
    pub identity_option: Option<IdentityOption>,
    pub identity_user_data: Option<IdentityUserData>,
    pub want_to_sign: bool,
    pub want_to_apply: bool,
    pub submitted_at_ms: Option<i64>,
    pub tasks: Tasks,
}

impl Lpa {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn attorneys_for(&self, role: AttorneyRole) -> &Attorneys {
        match role {
            AttorneyRole::Primary => &self.attorneys,
            AttorneyRole::Replacement => &self.replacement_attorneys,
        }
    }

    pub fn attorneys_for_mut(&mut self, role: AttorneyRole) -> &mut Attorneys {
        match role {
            AttorneyRole::Primary => &mut self.attorneys,
            AttorneyRole::Replacement => &mut self.replacement_attorneys,
        }
    }

    /// Number of actors in a collection.
    pub fn actor_count(&self, collection: Collection) -> usize {
        match collection {
            Collection::Attorneys => self.attorneys.len(),
            Collection::ReplacementAttorneys => self.replacement_attorneys.len(),
            Collection::PeopleToNotify => self.people_to_notify.len(),
        }
    }

    pub fn contains_actor(&self, collection: Collection, id: &str) -> bool {
        match collection {
            Collection::Attorneys => self.attorneys.contains(id),
            Collection::ReplacementAttorneys => self.replacement_attorneys.contains(id),
            Collection::PeopleToNotify => self.people_to_notify.contains(id),
        }
    }

    /// Complete when every attorney has a name and address and, with more
    /// than one attorney, a complete decision mode has been chosen.
    pub fn attorneys_task_complete(&self) -> bool {
        if self.attorneys.is_empty() {
            return false;
        }
        if !self
            .attorneys
            .iter()
            .all(|attorney| attorney.has_name() && attorney.has_address())
        {
            return false;
        }
        if self.attorneys.len() == 1 {
            return true;
        }
        self.how_attorneys_make_decisions
            .as_ref()
            .is_some_and(DecisionMode::is_complete)
    }

    pub fn replacement_attorneys_task_complete(&self) -> bool {
        if !self
            .replacement_attorneys
            .iter()
            .all(replacement_attorney_details_complete)
        {
            return false;
        }

        match self.want_replacement_attorneys {
            None => false,
            Some(YesNo::No) => self.replacement_attorneys.is_empty(),
            Some(YesNo::Yes) => self.wanted_replacement_attorneys_complete(),
        }
    }

    fn wanted_replacement_attorneys_complete(&self) -> bool {
        let replacements = self.replacement_attorneys.len();
        if replacements == 0 {
            return false;
        }

        let replacement_decisions_complete = self
            .how_replacement_attorneys_make_decisions
            .as_ref()
            .is_some_and(DecisionMode::is_complete);

        if self.attorneys.len() == 1 {
            return replacements == 1 || replacement_decisions_complete;
        }

        match &self.how_attorneys_make_decisions {
            None => replacements > 1 && replacement_decisions_complete,
            Some(DecisionMode::JointlyAndSeverally) => self
                .how_replacement_attorneys_step_in
                .as_ref()
                .is_some_and(StepIn::is_complete),
            Some(DecisionMode::Jointly) => {
                self.how_replacement_attorneys_step_in.is_none()
                    && (replacements == 1 || replacement_decisions_complete)
            }
            // the step-in question is never asked for a mixed arrangement
            Some(DecisionMode::Mixed(_)) => self.how_replacement_attorneys_step_in.is_none(),
        }
    }

    pub fn people_to_notify_task_complete(&self) -> bool {
        match self.do_you_want_to_notify_people {
            None => false,
            Some(YesNo::No) => self.people_to_notify.is_empty(),
            Some(YesNo::Yes) => {
                !self.people_to_notify.is_empty()
                    && self
                        .people_to_notify
                        .iter()
                        .all(|person| person.has_address())
            }
        }
    }

    pub fn certificate_provider_complete(&self) -> bool {
        let provider = &self.certificate_provider;
        !provider.first_names.is_empty()
            && !provider.last_name.is_empty()
            && provider.relationship.is_some()
            && !provider.address.line1.is_empty()
    }

    /// Whether the replacement attorneys must say how they step in: only when
    /// several attorneys act jointly and severally.
    pub fn step_in_question_applies(&self) -> bool {
        self.attorneys.len() > 1
            && matches!(
                self.how_attorneys_make_decisions,
                Some(DecisionMode::JointlyAndSeverally)
            )
    }

    /// Changes the attorneys' decision mode. Leaving jointly-and-severally
    /// makes the step-in answer meaningless, so it is cleared.
    pub fn set_how_attorneys_make_decisions(&mut self, mode: Option<DecisionMode>) {
        if !matches!(mode, Some(DecisionMode::JointlyAndSeverally)) {
            self.how_replacement_attorneys_step_in = None;
        }
        self.how_attorneys_make_decisions = mode;
    }

    /// Drops answers that no longer apply after the collections shrink.
    pub fn prune_decisions(&mut self) {
        if self.attorneys.len() <= 1 {
            self.set_how_attorneys_make_decisions(None);
        }
        if self.replacement_attorneys.len() <= 1 {
            self.how_replacement_attorneys_make_decisions = None;
        }
    }

    pub fn clear_replacement_attorneys(&mut self) {
        self.replacement_attorneys.clear();
        self.how_replacement_attorneys_make_decisions = None;
        self.how_replacement_attorneys_step_in = None;
    }

    /// Settles the attorney and replacement-attorney sections after a write
    /// to either. `touched` is settled outright; the other is only
    /// reevaluated if already started.
    pub fn settle_attorney_tasks(&mut self, touched: Section) {
        let attorneys_complete = self.attorneys_task_complete();
        let replacements_complete = self.replacement_attorneys_task_complete();
        match touched {
            Section::ChooseReplacementAttorneys => {
                self.tasks
                    .settle(Section::ChooseReplacementAttorneys, replacements_complete);
                self.tasks
                    .reevaluate(Section::ChooseAttorneys, attorneys_complete);
            }
            _ => {
                self.tasks.settle(Section::ChooseAttorneys, attorneys_complete);
                self.tasks
                    .reevaluate(Section::ChooseReplacementAttorneys, replacements_complete);
            }
        }
    }

    pub fn identity_confirmed(&self) -> bool {
        self.identity_user_data.as_ref().is_some_and(|data| data.ok)
    }
}

fn replacement_attorney_details_complete(attorney: &Attorney) -> bool {
    attorney.has_name() && attorney.has_address() && attorney.date_of_birth.is_some()
}
