use super::{FormErrors, LpaService, StepOutcome, role_of};
use crate::DomainResult;
use crate::actor::{Address, Collection};
use crate::forms::{AddressAction, AddressForm};
use crate::lpa::Lpa;
use crate::ports::address::LookupError;
use crate::routing::{self, Destination, Page};
use crate::tasks::Section;
use crate::validation::{FieldError, ValidationList};

/// Whose address a form is for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AddressTarget {
    Donor,
    CertificateProvider,
    Actor { collection: Collection, id: String },
}

impl AddressTarget {
    fn address_mut<'a>(&self, lpa: &'a mut Lpa) -> Option<&'a mut Address> {
        match self {
            Self::Donor => Some(&mut lpa.donor.address),
            Self::CertificateProvider => Some(&mut lpa.certificate_provider.address),
            Self::Actor { collection, id } => match role_of(*collection) {
                Some(role) => lpa
                    .attorneys_for_mut(role)
                    .get_mut(id)
                    .map(|attorney| &mut attorney.address),
                None => lpa
                    .people_to_notify
                    .get_mut(id)
                    .map(|person| &mut person.address),
            },
        }
    }

    fn settle(&self, lpa: &mut Lpa) {
        match self {
            Self::Donor => {}
            Self::CertificateProvider => {
                let complete = lpa.certificate_provider_complete();
                lpa.tasks.settle(Section::CertificateProvider, complete);
            }
            Self::Actor { collection, .. } => match role_of(*collection) {
                Some(role) => lpa.settle_attorney_tasks(role.section()),
                None => {
                    let complete = lpa.people_to_notify_task_complete();
                    lpa.tasks.settle(Section::PeopleToNotify, complete);
                }
            },
        }
    }

    fn next(&self, from: Option<&str>) -> Destination {
        match self {
            Self::Donor => {
                routing::resolve_from(from).unwrap_or_else(|| Destination::page(Page::LpaType))
            }
            Self::CertificateProvider => {
                routing::resolve_from(from).unwrap_or_else(|| Destination::page(Page::TaskList))
            }
            Self::Actor { collection, .. } => routing::after_address_saved(*collection, from),
        }
    }
}

impl LpaService {
    pub async fn save_address(
        &self,
        session_id: &str,
        target: AddressTarget,
        form: AddressForm,
    ) -> DomainResult<StepOutcome> {
        let mut lpa = self.load(session_id).await?;
        if let AddressTarget::Actor { collection, id } = &target {
            if !lpa.contains_actor(*collection, id) {
                return Ok(StepOutcome::Redirect(Destination::page(
                    collection.details_page(),
                )));
            }
        }

        let errors = form.validate();
        match form.action() {
            Some(AddressAction::Lookup { postcode }) if errors.none() => {
                self.lookup(&postcode, ValidationList::new()).await
            }
            Some(AddressAction::Select { postcode, .. }) if errors.any() => {
                self.lookup(&postcode, errors).await
            }
            Some(AddressAction::Select {
                address: Some(address),
                ..
            })
            | Some(AddressAction::Manual(address))
                if errors.none() =>
            {
                if let Some(slot) = target.address_mut(&mut lpa) {
                    *slot = address;
                }
                target.settle(&mut lpa);
                self.save(session_id, &mut lpa).await?;
                tracing::info!(lpa_id = %lpa.id, target = ?target, "address saved");
                Ok(StepOutcome::Redirect(target.next(form.from.as_deref())))
            }
            _ => Ok(StepOutcome::Invalid(FormErrors::from_errors(errors))),
        }
    }

    /// A rejected postcode becomes a field error; any other lookup failure is
    /// the caller's problem.
    async fn lookup(&self, postcode: &str, errors: ValidationList) -> DomainResult<StepOutcome> {
        if postcode.is_empty() {
            let errors = errors.and("lookup-postcode", FieldError::Enter { label: "postcode" });
            return Ok(StepOutcome::Invalid(FormErrors::from_errors(errors)));
        }

        let addresses = match self.address_lookup.lookup_postcode(postcode).await {
            Ok(addresses) => addresses,
            Err(LookupError::BadRequest(reason)) => {
                tracing::debug!(%reason, "postcode rejected");
                let errors = errors.and(
                    "lookup-postcode",
                    FieldError::Custom {
                        label: "invalidPostcode",
                    },
                );
                return Ok(StepOutcome::Invalid(FormErrors::from_errors(errors)));
            }
            Err(err) => {
                tracing::warn!(error = %err, "address lookup failed");
                return Err(err.into());
            }
        };

        if addresses.is_empty() {
            let errors = errors.and(
                "lookup-postcode",
                FieldError::Custom {
                    label: "noAddressesFound",
                },
            );
            return Ok(StepOutcome::Invalid(FormErrors::from_errors(errors)));
        }
        if errors.any() {
            return Ok(StepOutcome::Invalid(FormErrors {
                errors,
                addresses,
                ..FormErrors::default()
            }));
        }
        Ok(StepOutcome::Addresses { addresses })
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use crate::actor::{Attorney, Attorneys};
    use crate::error::DomainError;
    use crate::ports::store::LpaStore;
    use crate::store::InMemoryLpaStore;
    use crate::tasks::TaskState;

    fn manual() -> AddressForm {
        AddressForm {
            action: "manual".to_string(),
            address_line_1: "2 RICHMOND PLACE".to_string(),
            address_town: "BIRMINGHAM".to_string(),
            address_postcode: "B14 7ED".to_string(),
            ..AddressForm::default()
        }
    }

    fn lookup_form(postcode: &str) -> AddressForm {
        AddressForm {
            action: "lookup".to_string(),
            lookup_postcode: postcode.to_string(),
            ..AddressForm::default()
        }
    }

    async fn store_with_attorney() -> InMemoryLpaStore {
        let store = InMemoryLpaStore::new();
        let mut lpa = Lpa::new("lpa-id");
        lpa.attorneys = Attorneys::from(vec![Attorney {
            id: "a1".to_string(),
            first_names: "John".to_string(),
            last_name: "Doe".to_string(),
            ..Attorney::default()
        }]);
        seed(&store, "session", lpa).await;
        store
    }

    fn attorney_target(id: &str) -> AddressTarget {
        AddressTarget::Actor {
            collection: Collection::Attorneys,
            id: id.to_string(),
        }
    }

    #[tokio::test]
    async fn manual_address_completes_single_attorney() {
        let store = store_with_attorney().await;
        let service = service(store.clone(), &[]);

        let outcome = service
            .save_address("session", attorney_target("a1"), manual())
            .await
            .expect("save");

        assert_eq!(
            outcome,
            StepOutcome::Redirect(Destination::page(Page::ChooseAttorneysSummary))
        );
        let lpa = store.get("session").await.expect("get").expect("lpa");
        assert_eq!(lpa.attorneys.get("a1").map(|a| a.address.clone()), Some(address()));
        assert_eq!(lpa.tasks.choose_attorneys, TaskState::Completed);
    }

    #[tokio::test]
    async fn unknown_actor_goes_back_to_details() {
        let store = store_with_attorney().await;
        let service = service(store, &[]);

        let outcome = service
            .save_address("session", attorney_target("zz"), manual())
            .await
            .expect("save");

        assert_eq!(
            outcome,
            StepOutcome::Redirect(Destination::page(Page::ChooseAttorneys))
        );
    }

    #[tokio::test]
    async fn lookup_returns_addresses() {
        let store = store_with_attorney().await;
        let service = service_with(store, &[], Ok(vec![address()]));

        let outcome = service
            .save_address("session", attorney_target("a1"), lookup_form("B14 7ED"))
            .await
            .expect("lookup");

        assert_eq!(
            outcome,
            StepOutcome::Addresses {
                addresses: vec![address()]
            }
        );
    }

    #[tokio::test]
    async fn rejected_postcode_is_a_field_error() {
        let store = store_with_attorney().await;
        let service = service_with(
            store,
            &[],
            Err(LookupError::BadRequest("postcode invalid".to_string())),
        );

        let outcome = service
            .save_address("session", attorney_target("a1"), lookup_form("XYZ"))
            .await
            .expect("lookup");

        let StepOutcome::Invalid(rejected) = outcome else {
            panic!("expected invalid, got {outcome:?}");
        };
        assert_eq!(
            rejected.errors.get("lookup-postcode").map(FieldError::code),
            Some("invalidPostcode")
        );
    }

    #[tokio::test]
    async fn other_lookup_failures_propagate() {
        let store = store_with_attorney().await;
        let service = service_with(
            store,
            &[],
            Err(LookupError::Unavailable("timeout".to_string())),
        );

        let result = service
            .save_address("session", attorney_target("a1"), lookup_form("B14 7ED"))
            .await;

        assert!(matches!(
            result,
            Err(DomainError::Lookup(LookupError::Unavailable(_)))
        ));
    }

    #[tokio::test]
    async fn select_without_choice_shows_addresses_again() {
        let store = store_with_attorney().await;
        let service = service_with(store, &[], Ok(vec![address()]));

        let outcome = service
            .save_address(
                "session",
                attorney_target("a1"),
                AddressForm {
                    action: "select".to_string(),
                    lookup_postcode: "B14 7ED".to_string(),
                    ..AddressForm::default()
                },
            )
            .await
            .expect("select");

        let StepOutcome::Invalid(rejected) = outcome else {
            panic!("expected invalid, got {outcome:?}");
        };
        assert!(rejected.errors.has("select-address"));
        assert_eq!(rejected.addresses, vec![address()]);
    }
}
