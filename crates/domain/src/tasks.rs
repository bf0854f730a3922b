use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl TaskState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    /// State after the first write to a section, valid or not.
    pub fn started(self) -> Self {
        match self {
            Self::NotStarted => Self::InProgress,
            other => other,
        }
    }

    /// State after a successful write, given the section's completion rule.
    pub fn settle(self, complete: bool) -> Self {
        if complete {
            Self::Completed
        } else {
            Self::InProgress
        }
    }

    /// Like `settle`, but leaves an untouched section alone. Used when a
    /// write to one section changes the completion of another.
    pub fn reevaluate(self, complete: bool) -> Self {
        match self {
            Self::NotStarted => Self::NotStarted,
            current => current.settle(complete),
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Wizard sections in task-list order.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    ChooseAttorneys,
    ChooseReplacementAttorneys,
    WhenCanTheLpaBeUsed,
    Restrictions,
    CertificateProvider,
    PeopleToNotify,
    CheckYourLpa,
    PayForLpa,
    ConfirmYourIdentityAndSign,
}

impl Section {
    pub const ALL: [Section; 9] = [
        Section::ChooseAttorneys,
        Section::ChooseReplacementAttorneys,
        Section::WhenCanTheLpaBeUsed,
        Section::Restrictions,
        Section::CertificateProvider,
        Section::PeopleToNotify,
        Section::CheckYourLpa,
        Section::PayForLpa,
        Section::ConfirmYourIdentityAndSign,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ChooseAttorneys => "choose_attorneys",
            Self::ChooseReplacementAttorneys => "choose_replacement_attorneys",
            Self::WhenCanTheLpaBeUsed => "when_can_the_lpa_be_used",
            Self::Restrictions => "restrictions",
            Self::CertificateProvider => "certificate_provider",
            Self::PeopleToNotify => "people_to_notify",
            Self::CheckYourLpa => "check_your_lpa",
            Self::PayForLpa => "pay_for_lpa",
            Self::ConfirmYourIdentityAndSign => "confirm_your_identity_and_sign",
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tasks {
    pub choose_attorneys: TaskState,
    pub choose_replacement_attorneys: TaskState,
    pub when_can_the_lpa_be_used: TaskState,
    pub restrictions: TaskState,
    pub certificate_provider: TaskState,
    pub people_to_notify: TaskState,
    pub check_your_lpa: TaskState,
    pub pay_for_lpa: TaskState,
    pub confirm_your_identity_and_sign: TaskState,
}

impl Tasks {
    pub fn get(&self, section: Section) -> TaskState {
        match section {
            Section::ChooseAttorneys => self.choose_attorneys,
            Section::ChooseReplacementAttorneys => self.choose_replacement_attorneys,
            Section::WhenCanTheLpaBeUsed => self.when_can_the_lpa_be_used,
            Section::Restrictions => self.restrictions,
            Section::CertificateProvider => self.certificate_provider,
            Section::PeopleToNotify => self.people_to_notify,
            Section::CheckYourLpa => self.check_your_lpa,
            Section::PayForLpa => self.pay_for_lpa,
            Section::ConfirmYourIdentityAndSign => self.confirm_your_identity_and_sign,
        }
    }

    pub fn set(&mut self, section: Section, state: TaskState) {
        let slot = match section {
            Section::ChooseAttorneys => &mut self.choose_attorneys,
            Section::ChooseReplacementAttorneys => &mut self.choose_replacement_attorneys,
            Section::WhenCanTheLpaBeUsed => &mut self.when_can_the_lpa_be_used,
            Section::Restrictions => &mut self.restrictions,
            Section::CertificateProvider => &mut self.certificate_provider,
            Section::PeopleToNotify => &mut self.people_to_notify,
            Section::CheckYourLpa => &mut self.check_your_lpa,
            Section::PayForLpa => &mut self.pay_for_lpa,
            Section::ConfirmYourIdentityAndSign => &mut self.confirm_your_identity_and_sign,
        };
        if *slot != state {
            tracing::debug!(
                section = section.as_str(),
                from = slot.as_str(),
                to = state.as_str(),
                "task state changed"
            );
        }
        *slot = state;
    }

    pub fn start(&mut self, section: Section) {
        self.set(section, self.get(section).started());
    }

    pub fn settle(&mut self, section: Section, complete: bool) {
        self.set(section, self.get(section).settle(complete));
    }

    pub fn reevaluate(&mut self, section: Section, complete: bool) {
        self.set(section, self.get(section).reevaluate(complete));
    }
}
