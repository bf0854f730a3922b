//! One operation per wizard step. Every POST follows the same flow: load the
//! aggregate, validate, mutate, settle task state, persist, then pick the
//! next page.

use std::sync::Arc;

use serde::Serialize;

use crate::DomainResult;
use crate::actor::{Address, Attorney, Collection, PersonToNotify};
use crate::date::DobWarning;
use crate::error::DomainError;
use crate::lpa::{AttorneyRole, Lpa};
use crate::matching::{NameMatch, NameWarning, acknowledged};
use crate::ports::address::AddressLookup;
use crate::ports::random::RandomSource;
use crate::ports::store::LpaStore;
use crate::routing::{self, Destination, TaskListItem};
use crate::validation::ValidationList;

mod address;
mod attorneys;
mod notify;
mod steps;

pub use address::AddressTarget;

pub const ACTOR_ID_LENGTH: usize = 8;

/// Result of a POST.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StepOutcome {
    Redirect(Destination),
    Invalid(FormErrors),
    /// Postcode lookup succeeded; the user now picks an address.
    Addresses { addresses: Vec<Address> },
}

/// Everything the page needs to re-render a rejected submission.
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct FormErrors {
    pub errors: ValidationList,
    pub name_warning: Option<NameWarning>,
    pub dob_warning: Option<DobWarning>,
    pub addresses: Vec<Address>,
}

impl FormErrors {
    pub fn from_errors(errors: ValidationList) -> Self {
        Self {
            errors,
            ..Self::default()
        }
    }
}

/// Result of a GET.
#[derive(Clone, Debug, PartialEq)]
pub enum PageOutcome<T> {
    Redirect(Destination),
    Show(T),
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(untagged)]
pub enum ActorRecord {
    Attorney(Attorney),
    PersonToNotify(PersonToNotify),
}

/// An actor page: the aggregate plus the actor named in the query, if any.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ActorPage {
    pub lpa: Lpa,
    pub actor: Option<ActorRecord>,
}

fn find_actor(lpa: &Lpa, collection: Collection, id: Option<&str>) -> Option<ActorRecord> {
    let id = id?;
    match collection {
        Collection::Attorneys => lpa.attorneys.get(id).cloned().map(ActorRecord::Attorney),
        Collection::ReplacementAttorneys => lpa
            .replacement_attorneys
            .get(id)
            .cloned()
            .map(ActorRecord::Attorney),
        Collection::PeopleToNotify => lpa
            .people_to_notify
            .get(id)
            .cloned()
            .map(ActorRecord::PersonToNotify),
    }
}

/// Warnings the user has not acknowledged for this exact submission.
///
/// Both are always shown alongside field errors so the user sees everything
/// at once.
fn pending_warnings(
    errors: &ValidationList,
    name_match: Option<&NameMatch>,
    ignore_name: Option<&str>,
    first_names: &str,
    last_name: &str,
    dob_warning: Option<DobWarning>,
    ignore_dob: Option<&str>,
) -> (Option<NameWarning>, Option<DobWarning>) {
    let name_warning = name_match
        .filter(|found| errors.any() || !acknowledged(found, ignore_name))
        .map(|found| NameWarning::new(found, first_names, last_name));
    let dob_warning =
        dob_warning.filter(|warning| errors.any() || ignore_dob != Some(warning.code()));
    (name_warning, dob_warning)
}

#[derive(Clone)]
pub struct LpaService {
    store: Arc<dyn LpaStore>,
    random: Arc<dyn RandomSource>,
    address_lookup: Arc<dyn AddressLookup>,
    lpa_id: Option<Arc<str>>,
}

impl LpaService {
    pub fn new(
        store: Arc<dyn LpaStore>,
        random: Arc<dyn RandomSource>,
        address_lookup: Arc<dyn AddressLookup>,
    ) -> Self {
        Self {
            store,
            random,
            address_lookup,
            lpa_id: None,
        }
    }

    /// The same service, restricted to the LPA named in the URL. Every
    /// operation then fails with `NotFound` when the session holds another
    /// LPA, or none at all.
    pub fn scoped_to(&self, lpa_id: &str) -> Self {
        Self {
            lpa_id: Some(Arc::from(lpa_id)),
            ..self.clone()
        }
    }

    /// Loads the session's LPA with a single store read. An unscoped service
    /// creates and persists an empty one on first use so its id stays stable.
    pub async fn load(&self, session_id: &str) -> DomainResult<Lpa> {
        let stored = self.store.get(session_id).await?;
        match (stored, self.lpa_id.as_deref()) {
            (Some(lpa), Some(lpa_id)) if lpa.id != lpa_id => {
                tracing::debug!(lpa_id, session_lpa_id = %lpa.id, "lpa id does not match session");
                Err(DomainError::NotFound)
            }
            (Some(lpa), _) => Ok(lpa),
            (None, Some(lpa_id)) => {
                tracing::debug!(lpa_id, "session has no lpa");
                Err(DomainError::NotFound)
            }
            (None, None) => {
                let mut lpa = Lpa::new(crate::util::uuid_v7_without_dashes());
                lpa.version = self.store.put(session_id, &lpa).await?;
                tracing::info!(lpa_id = %lpa.id, "lpa created");
                Ok(lpa)
            }
        }
    }

    async fn save(&self, session_id: &str, lpa: &mut Lpa) -> DomainResult<()> {
        lpa.version = self.store.put(session_id, lpa).await?;
        tracing::debug!(lpa_id = %lpa.id, version = lpa.version, "lpa saved");
        Ok(())
    }

    /// An id not currently used in the collection.
    fn new_actor_id(&self, taken: &[&str]) -> String {
        loop {
            let id = self.random.string(ACTOR_ID_LENGTH);
            if !taken.contains(&id.as_str()) {
                return id;
            }
        }
    }

    pub async fn task_list(&self, session_id: &str) -> DomainResult<(Lpa, Vec<TaskListItem>)> {
        let lpa = self.load(session_id).await?;
        let items = routing::task_list(&lpa);
        Ok((lpa, items))
    }

    /// GET of an attorney or person-to-notify details page.
    pub async fn details_page(
        &self,
        session_id: &str,
        collection: Collection,
        id: Option<&str>,
        add_another: bool,
    ) -> DomainResult<PageOutcome<ActorPage>> {
        let lpa = self.load(session_id).await?;
        let actor = find_actor(&lpa, collection, id);
        if let Some(destination) = routing::details_get_redirect(
            collection,
            actor.is_some(),
            lpa.actor_count(collection),
            add_another,
        ) {
            return Ok(PageOutcome::Redirect(destination));
        }
        Ok(PageOutcome::Show(ActorPage { lpa, actor }))
    }

    pub async fn address_page(
        &self,
        session_id: &str,
        collection: Collection,
        id: Option<&str>,
    ) -> DomainResult<PageOutcome<ActorPage>> {
        let lpa = self.load(session_id).await?;
        let actor = find_actor(&lpa, collection, id);
        if let Some(destination) = routing::address_get_redirect(collection, actor.is_some()) {
            return Ok(PageOutcome::Redirect(destination));
        }
        Ok(PageOutcome::Show(ActorPage { lpa, actor }))
    }

    pub async fn summary_page(
        &self,
        session_id: &str,
        collection: Collection,
    ) -> DomainResult<PageOutcome<ActorPage>> {
        let lpa = self.load(session_id).await?;
        if let Some(destination) =
            routing::summary_get_redirect(collection, lpa.actor_count(collection))
        {
            return Ok(PageOutcome::Redirect(destination));
        }
        Ok(PageOutcome::Show(ActorPage { lpa, actor: None }))
    }

    pub async fn remove_page(
        &self,
        session_id: &str,
        collection: Collection,
        id: Option<&str>,
    ) -> DomainResult<PageOutcome<ActorPage>> {
        let lpa = self.load(session_id).await?;
        let actor = find_actor(&lpa, collection, id);
        if let Some(destination) = routing::remove_get_redirect(collection, actor.is_some()) {
            return Ok(PageOutcome::Redirect(destination));
        }
        Ok(PageOutcome::Show(ActorPage { lpa, actor }))
    }
}

fn role_of(collection: Collection) -> Option<AttorneyRole> {
    match collection {
        Collection::Attorneys => Some(AttorneyRole::Primary),
        Collection::ReplacementAttorneys => Some(AttorneyRole::Replacement),
        Collection::PeopleToNotify => None,
    }
}
