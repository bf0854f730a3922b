use super::{FormErrors, LpaService, StepOutcome, pending_warnings};
use crate::DomainResult;
use crate::actor::{ActorKind, Relationship, RelationshipLength};
use crate::forms::{
    CertificateProviderForm, CheckYourLpaForm, DonorDetailsForm, IdentityCallbackForm,
    IdentityOptionForm, LpaTypeForm, RestrictionsForm, SignForm, WhenCanTheLpaBeUsedForm,
};
use crate::lpa::{IdentityUserData, PaymentDetails};
use crate::matching::find_name_match;
use crate::routing::{self, Destination, Page};
use crate::tasks::{Section, TaskState};
use crate::util::{now_ms, today};
use crate::validation::FieldError;

const PAYMENT_REFERENCE_LENGTH: usize = 12;

impl LpaService {
    pub async fn save_donor_details(
        &self,
        session_id: &str,
        form: DonorDetailsForm,
    ) -> DomainResult<StepOutcome> {
        let mut lpa = self.load(session_id).await?;
        let form = form.trimmed();
        let today = today();
        let errors = form.validate(today);
        let (_, dob_warning) = pending_warnings(
            &errors,
            None,
            None,
            &form.first_names,
            &form.last_name,
            form.dob_warning(today),
            form.ignore_dob_warning.as_deref(),
        );
        if errors.any() || dob_warning.is_some() {
            return Ok(StepOutcome::Invalid(FormErrors {
                errors,
                dob_warning,
                ..FormErrors::default()
            }));
        }

        lpa.donor.date_of_birth = form.date_of_birth();
        lpa.donor.first_names = form.first_names;
        lpa.donor.last_name = form.last_name;
        lpa.donor.other_names = form.other_names;
        self.save(session_id, &mut lpa).await?;

        Ok(StepOutcome::Redirect(Destination::page(Page::YourAddress)))
    }

    pub async fn choose_lpa_type(
        &self,
        session_id: &str,
        form: LpaTypeForm,
    ) -> DomainResult<StepOutcome> {
        let mut lpa = self.load(session_id).await?;
        let errors = form.validate();
        let Some(lpa_type) = form.lpa_type().filter(|_| errors.none()) else {
            return Ok(StepOutcome::Invalid(FormErrors::from_errors(errors)));
        };

        lpa.lpa_type = Some(lpa_type);
        self.save(session_id, &mut lpa).await?;

        Ok(StepOutcome::Redirect(Destination::page(Page::TaskList)))
    }

    pub async fn save_certificate_provider(
        &self,
        session_id: &str,
        form: CertificateProviderForm,
    ) -> DomainResult<StepOutcome> {
        let mut lpa = self.load(session_id).await?;
        let form = form.trimmed();
        let errors = form.validate(today());

        let name_match = find_name_match(
            &lpa,
            ActorKind::CertificateProvider,
            None,
            &form.first_names,
            &form.last_name,
        );
        let (name_warning, _) = pending_warnings(
            &errors,
            name_match.as_ref(),
            form.ignore_name_warning.as_deref(),
            &form.first_names,
            &form.last_name,
            None,
            None,
        );
        if errors.any() || name_warning.is_some() {
            return Ok(StepOutcome::Invalid(FormErrors {
                errors,
                name_warning,
                ..FormErrors::default()
            }));
        }

        let relationship = Relationship::parse(&form.relationship);
        let provider = &mut lpa.certificate_provider;
        provider.date_of_birth = form.date_of_birth();
        provider.relationship = relationship;
        provider.relationship_description = match relationship {
            Some(Relationship::Professionally) => form.relationship_description.clone(),
            _ => String::new(),
        };
        provider.relationship_length = match relationship {
            Some(Relationship::Personally) => RelationshipLength::parse(&form.relationship_length),
            _ => None,
        };
        provider.first_names = form.first_names;
        provider.last_name = form.last_name;
        provider.email = form.email;
        provider.mobile = form.mobile;

        let complete = lpa.certificate_provider_complete();
        lpa.tasks.settle(Section::CertificateProvider, complete);
        self.save(session_id, &mut lpa).await?;

        Ok(StepOutcome::Redirect(
            routing::resolve_from(form.from.as_deref())
                .unwrap_or_else(|| Destination::page(Page::CertificateProviderAddress)),
        ))
    }

    pub async fn when_can_the_lpa_be_used(
        &self,
        session_id: &str,
        form: WhenCanTheLpaBeUsedForm,
    ) -> DomainResult<StepOutcome> {
        let mut lpa = self.load(session_id).await?;
        let errors = form.validate();
        if errors.any() {
            return Ok(StepOutcome::Invalid(FormErrors::from_errors(errors)));
        }

        match form.when() {
            Some(when) if !form.answer_later() => {
                lpa.when_can_the_lpa_be_used = Some(when);
                lpa.tasks
                    .set(Section::WhenCanTheLpaBeUsed, TaskState::Completed);
            }
            _ => lpa.tasks.set(Section::WhenCanTheLpaBeUsed, TaskState::InProgress),
        }
        self.save(session_id, &mut lpa).await?;

        Ok(StepOutcome::Redirect(Destination::page(Page::TaskList)))
    }

    pub async fn restrictions(
        &self,
        session_id: &str,
        form: RestrictionsForm,
    ) -> DomainResult<StepOutcome> {
        let mut lpa = self.load(session_id).await?;
        let errors = form.validate();
        if errors.any() {
            return Ok(StepOutcome::Invalid(FormErrors::from_errors(errors)));
        }

        lpa.restrictions = form.restrictions.trim().to_string();
        let state = if form.answer_later() {
            TaskState::InProgress
        } else {
            TaskState::Completed
        };
        lpa.tasks.set(Section::Restrictions, state);
        self.save(session_id, &mut lpa).await?;

        Ok(StepOutcome::Redirect(Destination::page(Page::TaskList)))
    }

    pub async fn check_your_lpa(
        &self,
        session_id: &str,
        form: CheckYourLpaForm,
    ) -> DomainResult<StepOutcome> {
        let mut lpa = self.load(session_id).await?;
        let errors = form.validate();
        if errors.any() {
            return Ok(StepOutcome::Invalid(FormErrors::from_errors(errors)));
        }

        lpa.checked = true;
        lpa.happy_to_share = true;
        lpa.tasks.set(Section::CheckYourLpa, TaskState::Completed);
        self.save(session_id, &mut lpa).await?;

        Ok(StepOutcome::Redirect(Destination::page(Page::AboutPayment)))
    }

    /// Records a payment the gateway reported as successful.
    pub async fn confirm_payment(
        &self,
        session_id: &str,
        payment_id: &str,
    ) -> DomainResult<PaymentDetails> {
        let mut lpa = self.load(session_id).await?;
        let details = PaymentDetails {
            payment_reference: self.random.string(PAYMENT_REFERENCE_LENGTH),
            payment_id: payment_id.to_string(),
        };
        lpa.payment_details = Some(details.clone());
        lpa.tasks.set(Section::PayForLpa, TaskState::Completed);
        self.save(session_id, &mut lpa).await?;

        tracing::info!(lpa_id = %lpa.id, payment_id, "payment recorded");
        Ok(details)
    }

    pub async fn select_identity_option(
        &self,
        session_id: &str,
        form: IdentityOptionForm,
    ) -> DomainResult<StepOutcome> {
        let mut lpa = self.load(session_id).await?;
        let errors = form.validate();
        let Some(option) = form.option().filter(|_| errors.none()) else {
            return Ok(StepOutcome::Invalid(FormErrors::from_errors(errors)));
        };

        lpa.identity_option = Some(option);
        lpa.tasks.start(Section::ConfirmYourIdentityAndSign);
        self.save(session_id, &mut lpa).await?;

        Ok(StepOutcome::Redirect(Destination::page(
            Page::YourChosenIdentityOptions,
        )))
    }

    /// Stores what the identity provider returned. Identity is confirmed only
    /// when the vouched-for names are the donor's.
    pub async fn confirm_identity(
        &self,
        session_id: &str,
        callback: IdentityCallbackForm,
    ) -> DomainResult<StepOutcome> {
        let mut lpa = self.load(session_id).await?;
        let ok = !callback.first_names.is_empty()
            && callback.first_names == lpa.donor.first_names
            && callback.last_name == lpa.donor.last_name;
        lpa.identity_user_data = Some(IdentityUserData {
            ok,
            first_names: callback.first_names,
            last_name: callback.last_name,
            retrieved_at_ms: now_ms(),
        });
        lpa.tasks.start(Section::ConfirmYourIdentityAndSign);
        self.save(session_id, &mut lpa).await?;

        tracing::info!(lpa_id = %lpa.id, ok, "identity result recorded");
        Ok(StepOutcome::Redirect(Destination::page(Page::IdentityConfirmed)))
    }

    pub async fn sign(&self, session_id: &str, form: SignForm) -> DomainResult<StepOutcome> {
        let mut lpa = self.load(session_id).await?;
        let mut errors = form.validate();
        if !lpa.identity_confirmed() {
            errors.add(
                "identity",
                FieldError::Custom {
                    label: "confirmYourIdentityBeforeSigning",
                },
            );
        }
        if errors.any() {
            return Ok(StepOutcome::Invalid(FormErrors::from_errors(errors)));
        }

        lpa.want_to_sign = true;
        lpa.want_to_apply = true;
        lpa.submitted_at_ms = Some(now_ms());
        lpa.tasks
            .set(Section::ConfirmYourIdentityAndSign, TaskState::Completed);
        self.save(session_id, &mut lpa).await?;

        tracing::info!(lpa_id = %lpa.id, "lpa signed");
        Ok(StepOutcome::Redirect(Destination::page(
            Page::YouHaveSubmittedYourLpa,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use crate::lpa::Lpa;
    use crate::ports::store::LpaStore;
    use crate::store::InMemoryLpaStore;

    async fn stored(store: &InMemoryLpaStore) -> Lpa {
        store.get("session").await.expect("get").expect("lpa")
    }

    #[tokio::test]
    async fn donor_details_are_stored() {
        let store = InMemoryLpaStore::new();
        let service = service(store.clone(), &[]);

        let outcome = service
            .save_donor_details(
                "session",
                DonorDetailsForm {
                    first_names: " Dave ".to_string(),
                    last_name: "Smith".to_string(),
                    other_names: "Davey".to_string(),
                    date_of_birth_day: "2".to_string(),
                    date_of_birth_month: "3".to_string(),
                    date_of_birth_year: "1970".to_string(),
                    ..DonorDetailsForm::default()
                },
            )
            .await
            .expect("donor");

        assert_eq!(
            outcome,
            StepOutcome::Redirect(Destination::page(Page::YourAddress))
        );
        let donor = stored(&store).await.donor;
        assert_eq!(donor.first_names, "Dave");
        assert_eq!(donor.last_name, "Smith");
        assert_eq!(donor.other_names, "Davey");
        assert_eq!(
            donor.date_of_birth,
            Some(time::macros::date!(1970 - 03 - 02))
        );
    }

    #[tokio::test]
    async fn restrictions_answered_later_stay_in_progress() {
        let store = InMemoryLpaStore::new();
        let service = service(store.clone(), &[]);

        service
            .restrictions(
                "session",
                RestrictionsForm {
                    restrictions: String::new(),
                    answer_later: Some("1".to_string()),
                },
            )
            .await
            .expect("restrictions");
        assert_eq!(stored(&store).await.tasks.restrictions, TaskState::InProgress);

        service
            .restrictions(
                "session",
                RestrictionsForm {
                    restrictions: "No selling the house".to_string(),
                    answer_later: None,
                },
            )
            .await
            .expect("restrictions");
        let lpa = stored(&store).await;
        assert_eq!(lpa.tasks.restrictions, TaskState::Completed);
        assert_eq!(lpa.restrictions, "No selling the house");
    }

    #[tokio::test]
    async fn payment_completes_its_task() {
        let store = InMemoryLpaStore::new();
        let service = service(store.clone(), &["ref123456789"]);

        let details = service
            .confirm_payment("session", "pay-1")
            .await
            .expect("payment");

        assert_eq!(details.payment_reference, "ref123456789");
        let lpa = stored(&store).await;
        assert_eq!(lpa.payment_details, Some(details));
        assert_eq!(lpa.tasks.pay_for_lpa, TaskState::Completed);
    }

    #[tokio::test]
    async fn signing_needs_identity_and_both_boxes() {
        let store = InMemoryLpaStore::new();
        let mut lpa = Lpa::new("lpa-id");
        lpa.donor.first_names = "Dave".to_string();
        lpa.donor.last_name = "Smith".to_string();
        seed(&store, "session", lpa).await;
        let service = service(store.clone(), &[]);
        let both = SignForm {
            want_to_sign: Some("1".to_string()),
            want_to_apply: Some("1".to_string()),
        };

        let outcome = service.sign("session", both.clone()).await.expect("sign");
        assert!(matches!(outcome, StepOutcome::Invalid(ref e) if e.errors.has("identity")));

        service
            .select_identity_option(
                "session",
                IdentityOptionForm {
                    option: "passport".to_string(),
                },
            )
            .await
            .expect("option");
        assert_eq!(
            stored(&store).await.tasks.confirm_your_identity_and_sign,
            TaskState::InProgress
        );

        service
            .confirm_identity(
                "session",
                IdentityCallbackForm {
                    first_names: "Dave".to_string(),
                    last_name: "Smith".to_string(),
                },
            )
            .await
            .expect("identity");

        let outcome = service
            .sign(
                "session",
                SignForm {
                    want_to_sign: Some("1".to_string()),
                    want_to_apply: None,
                },
            )
            .await
            .expect("sign");
        assert!(matches!(outcome, StepOutcome::Invalid(ref e) if e.errors.has("sign-lpa")));

        let outcome = service.sign("session", both).await.expect("sign");
        assert_eq!(
            outcome,
            StepOutcome::Redirect(Destination::page(Page::YouHaveSubmittedYourLpa))
        );
        let lpa = stored(&store).await;
        assert_eq!(
            lpa.tasks.confirm_your_identity_and_sign,
            TaskState::Completed
        );
        assert!(lpa.submitted_at_ms.is_some());
    }

    #[tokio::test]
    async fn rejected_certificate_provider_leaves_task_not_started() {
        let store = InMemoryLpaStore::new();
        seed(&store, "session", Lpa::new("lpa-id")).await;
        let service = service(store.clone(), &[]);

        let outcome = service
            .save_certificate_provider(
                "session",
                CertificateProviderForm {
                    first_names: "Carol".to_string(),
                    last_name: "Jones".to_string(),
                    ..CertificateProviderForm::default()
                },
            )
            .await
            .expect("save");

        assert!(matches!(outcome, StepOutcome::Invalid(_)));
        let lpa = stored(&store).await;
        assert_eq!(lpa.tasks.certificate_provider, TaskState::NotStarted);
        assert!(lpa.certificate_provider.first_names.is_empty());
    }

    #[tokio::test]
    async fn certificate_provider_matching_donor_is_warned() {
        let store = InMemoryLpaStore::new();
        let mut lpa = Lpa::new("lpa-id");
        lpa.donor.first_names = "Dave".to_string();
        lpa.donor.last_name = "Smith".to_string();
        seed(&store, "session", lpa).await;
        let service = service(store, &[]);

        let outcome = service
            .save_certificate_provider(
                "session",
                CertificateProviderForm {
                    first_names: "Dave".to_string(),
                    last_name: "Smith".to_string(),
                    mobile: "07535111111".to_string(),
                    date_of_birth_day: "1".to_string(),
                    date_of_birth_month: "1".to_string(),
                    date_of_birth_year: "1970".to_string(),
                    relationship: "professionally".to_string(),
                    relationship_description: "Solicitor".to_string(),
                    ..CertificateProviderForm::default()
                },
            )
            .await
            .expect("save");

        let StepOutcome::Invalid(rejected) = outcome else {
            panic!("expected warning, got {outcome:?}");
        };
        assert_eq!(
            rejected.name_warning.map(|warning| warning.code),
            Some("errorDonorMatchesActor".to_string())
        );
    }
}
