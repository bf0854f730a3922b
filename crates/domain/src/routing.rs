use serde::Serialize;

use crate::actor::Collection;
use crate::lpa::{AttorneyRole, Lpa, StepIn, YesNo};
use crate::tasks::{Section, TaskState};

macro_rules! pages {
    ($($variant:ident => $path:literal,)+) => {
        /// Every wizard page, addressed relative to `/lpa/{id}`.
        #[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq, Hash)]
        pub enum Page {
            $($variant,)+
        }

        impl Page {
            pub const ALL: &'static [Page] = &[$(Page::$variant,)+];

            pub fn path(&self) -> &'static str {
                match self {
                    $(Self::$variant => $path,)+
                }
            }
        }
    };
}

pages! {
    TaskList => "/task-list",
    YourDetails => "/your-details",
    YourAddress => "/your-address",
    LpaType => "/lpa-type",
    ChooseAttorneys => "/choose-attorneys",
    ChooseAttorneysAddress => "/choose-attorneys-address",
    ChooseAttorneysSummary => "/choose-attorneys-summary",
    RemoveAttorney => "/remove-attorney",
    HowShouldAttorneysMakeDecisions => "/how-should-attorneys-make-decisions",
    DoYouWantReplacementAttorneys => "/do-you-want-replacement-attorneys",
    ChooseReplacementAttorneys => "/choose-replacement-attorneys",
    ChooseReplacementAttorneysAddress => "/choose-replacement-attorneys-address",
    ChooseReplacementAttorneysSummary => "/choose-replacement-attorneys-summary",
    RemoveReplacementAttorney => "/remove-replacement-attorney",
    HowShouldReplacementAttorneysStepIn => "/how-should-replacement-attorneys-step-in",
    HowShouldReplacementAttorneysMakeDecisions => "/how-should-replacement-attorneys-make-decisions",
    WhenCanTheLpaBeUsed => "/when-can-the-lpa-be-used",
    Restrictions => "/restrictions",
    CertificateProviderDetails => "/certificate-provider-details",
    CertificateProviderAddress => "/certificate-provider-address",
    DoYouWantToNotifyPeople => "/do-you-want-to-notify-people",
    ChoosePeopleToNotify => "/choose-people-to-notify",
    ChoosePeopleToNotifyAddress => "/choose-people-to-notify-address",
    ChoosePeopleToNotifySummary => "/choose-people-to-notify-summary",
    RemovePersonToNotify => "/remove-person-to-notify",
    CheckYourLpa => "/check-your-lpa",
    AboutPayment => "/about-payment",
    PaymentConfirmation => "/payment-confirmation",
    SelectYourIdentityOptions => "/select-your-identity-options",
    YourChosenIdentityOptions => "/your-chosen-identity-options",
    IdentityConfirmed => "/identity-confirmed",
    SignYourLpa => "/sign-your-lpa",
    YouHaveSubmittedYourLpa => "/you-have-submitted-your-lpa",
}

impl Page {
    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|page| page.path() == path)
    }
}

impl Collection {
    pub fn details_page(&self) -> Page {
        match self {
            Self::Attorneys => Page::ChooseAttorneys,
            Self::ReplacementAttorneys => Page::ChooseReplacementAttorneys,
            Self::PeopleToNotify => Page::ChoosePeopleToNotify,
        }
    }

    pub fn address_page(&self) -> Page {
        match self {
            Self::Attorneys => Page::ChooseAttorneysAddress,
            Self::ReplacementAttorneys => Page::ChooseReplacementAttorneysAddress,
            Self::PeopleToNotify => Page::ChoosePeopleToNotifyAddress,
        }
    }

    pub fn summary_page(&self) -> Page {
        match self {
            Self::Attorneys => Page::ChooseAttorneysSummary,
            Self::ReplacementAttorneys => Page::ChooseReplacementAttorneysSummary,
            Self::PeopleToNotify => Page::ChoosePeopleToNotifySummary,
        }
    }

    pub fn remove_page(&self) -> Page {
        match self {
            Self::Attorneys => Page::RemoveAttorney,
            Self::ReplacementAttorneys => Page::RemoveReplacementAttorney,
            Self::PeopleToNotify => Page::RemovePersonToNotify,
        }
    }

    /// Where the user lands once the collection is empty again.
    pub fn entry_page(&self) -> Page {
        match self {
            Self::Attorneys => Page::ChooseAttorneys,
            Self::ReplacementAttorneys => Page::DoYouWantReplacementAttorneys,
            Self::PeopleToNotify => Page::DoYouWantToNotifyPeople,
        }
    }
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Destination {
    pub page: Page,
    pub id: Option<String>,
    pub add_another: bool,
}

impl Destination {
    pub fn page(page: Page) -> Self {
        Self {
            page,
            id: None,
            add_another: false,
        }
    }

    pub fn with_id(page: Page, id: impl Into<String>) -> Self {
        Self {
            page,
            id: Some(id.into()),
            add_another: false,
        }
    }

    pub fn add_another(page: Page) -> Self {
        Self {
            page,
            id: None,
            add_another: true,
        }
    }

    pub fn url(&self, lpa_id: &str) -> String {
        let mut url = format!("/lpa/{lpa_id}{}", self.page.path());
        let mut separator = '?';
        if let Some(id) = &self.id {
            url.push(separator);
            url.push_str("id=");
            url.push_str(id);
            separator = '&';
        }
        if self.add_another {
            url.push(separator);
            url.push_str("addAnother=1");
        }
        url
    }
}

/// Accepts a `from` hint only when it names a wizard page, so a crafted
/// value can never send the user off-site.
pub fn resolve_from(from: Option<&str>) -> Option<Destination> {
    let from = from?.trim();
    if from.is_empty() {
        return None;
    }
    match Page::from_path(from) {
        Some(page) => Some(Destination::page(page)),
        None => {
            tracing::debug!(from, "ignoring unknown from hint");
            None
        }
    }
}

/// After an actor's details were saved: the hint wins, a new actor goes on to
/// its address, an edited one back to the summary.
pub fn after_details_saved(
    collection: Collection,
    id: &str,
    was_new: bool,
    from: Option<&str>,
) -> Destination {
    if let Some(destination) = resolve_from(from) {
        return destination;
    }
    if was_new {
        Destination::with_id(collection.address_page(), id)
    } else {
        Destination::page(collection.summary_page())
    }
}

/// GET of a details page for an id that is not in a non-empty collection is
/// sent to the summary unless the user asked to add another.
pub fn details_get_redirect(
    collection: Collection,
    found: bool,
    collection_len: usize,
    add_another: bool,
) -> Option<Destination> {
    if !found && collection_len > 0 && !add_another {
        Some(Destination::page(collection.summary_page()))
    } else {
        None
    }
}

/// Address pages need an existing actor.
pub fn address_get_redirect(collection: Collection, found: bool) -> Option<Destination> {
    (!found).then(|| Destination::page(collection.details_page()))
}

/// A summary of an empty collection has nothing to show.
pub fn summary_get_redirect(collection: Collection, collection_len: usize) -> Option<Destination> {
    (collection_len == 0).then(|| Destination::page(collection.details_page()))
}

pub fn remove_get_redirect(collection: Collection, found: bool) -> Option<Destination> {
    (!found).then(|| Destination::page(collection.summary_page()))
}

pub fn after_address_saved(collection: Collection, from: Option<&str>) -> Destination {
    resolve_from(from).unwrap_or_else(|| Destination::page(collection.summary_page()))
}

pub fn after_removal(collection: Collection, remaining: usize) -> Destination {
    if remaining == 0 {
        Destination::page(collection.entry_page())
    } else {
        Destination::page(collection.summary_page())
    }
}

pub fn after_summary(collection: Collection, add_another: YesNo, lpa: &Lpa) -> Destination {
    if add_another == YesNo::Yes {
        return Destination::add_another(collection.details_page());
    }

    match collection {
        Collection::Attorneys if lpa.attorneys.len() > 1 => {
            Destination::page(Page::HowShouldAttorneysMakeDecisions)
        }
        Collection::Attorneys => Destination::page(Page::DoYouWantReplacementAttorneys),
        Collection::ReplacementAttorneys if lpa.step_in_question_applies() => {
            Destination::page(Page::HowShouldReplacementAttorneysStepIn)
        }
        Collection::ReplacementAttorneys if lpa.replacement_attorneys.len() > 1 => {
            Destination::page(Page::HowShouldReplacementAttorneysMakeDecisions)
        }
        Collection::ReplacementAttorneys | Collection::PeopleToNotify => {
            Destination::page(Page::TaskList)
        }
    }
}

pub fn after_decisions(role: AttorneyRole) -> Destination {
    match role {
        AttorneyRole::Primary => Destination::page(Page::DoYouWantReplacementAttorneys),
        AttorneyRole::Replacement => Destination::page(Page::TaskList),
    }
}

pub fn after_want_replacement_attorneys(answer: YesNo) -> Destination {
    match answer {
        YesNo::Yes => Destination::page(Page::ChooseReplacementAttorneys),
        YesNo::No => Destination::page(Page::TaskList),
    }
}

pub fn after_want_to_notify_people(answer: YesNo) -> Destination {
    match answer {
        YesNo::Yes => Destination::page(Page::ChoosePeopleToNotify),
        YesNo::No => Destination::page(Page::TaskList),
    }
}

pub fn after_step_in(lpa: &Lpa) -> Destination {
    match lpa.how_replacement_attorneys_step_in {
        Some(StepIn::WhenAllCanNoLongerAct) if lpa.replacement_attorneys.len() > 1 => {
            Destination::page(Page::HowShouldReplacementAttorneysMakeDecisions)
        }
        _ => Destination::page(Page::TaskList),
    }
}

/// First page of each section as linked from the task list.
pub fn section_page(section: Section) -> Page {
    match section {
        Section::ChooseAttorneys => Page::ChooseAttorneys,
        Section::ChooseReplacementAttorneys => Page::DoYouWantReplacementAttorneys,
        Section::WhenCanTheLpaBeUsed => Page::WhenCanTheLpaBeUsed,
        Section::Restrictions => Page::Restrictions,
        Section::CertificateProvider => Page::CertificateProviderDetails,
        Section::PeopleToNotify => Page::DoYouWantToNotifyPeople,
        Section::CheckYourLpa => Page::CheckYourLpa,
        Section::PayForLpa => Page::AboutPayment,
        Section::ConfirmYourIdentityAndSign => Page::SelectYourIdentityOptions,
    }
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct TaskListItem {
    pub section: Section,
    pub state: TaskState,
    /// Actors recorded in the section, for sections that collect them.
    pub count: Option<usize>,
    pub path: String,
}

pub fn task_list(lpa: &Lpa) -> Vec<TaskListItem> {
    Section::ALL
        .iter()
        .map(|&section| {
            let count = match section {
                Section::ChooseAttorneys => Some(lpa.attorneys.len()),
                Section::ChooseReplacementAttorneys => Some(lpa.replacement_attorneys.len()),
                Section::PeopleToNotify => Some(lpa.people_to_notify.len()),
                _ => None,
            };
            TaskListItem {
                section,
                state: lpa.tasks.get(section),
                count,
                path: Destination::page(section_page(section)).url(&lpa.id),
            }
        })
        .collect()
}
