use super::{FormErrors, LpaService, StepOutcome, pending_warnings};
use crate::DomainResult;
use crate::actor::Attorney;
use crate::forms::{ActorDetailsForm, DecisionsForm, StepInForm, YesNoForm};
use crate::lpa::{AttorneyRole, YesNo};
use crate::matching::find_name_match;
use crate::routing::{self, Destination};
use crate::tasks::Section;
use crate::util::today;

impl LpaService {
    /// Adds an attorney (`id` is `None` or unknown) or edits one in place.
    pub async fn save_attorney_details(
        &self,
        session_id: &str,
        role: AttorneyRole,
        id: Option<&str>,
        form: ActorDetailsForm,
    ) -> DomainResult<StepOutcome> {
        let mut lpa = self.load(session_id).await?;
        let form = form.trimmed();
        let today = today();
        let errors = form.validate(today);

        let existing = id.and_then(|id| lpa.attorneys_for(role).get(id).cloned());
        let name_match = find_name_match(
            &lpa,
            role.kind(),
            existing.as_ref().map(|attorney| attorney.id.as_str()),
            &form.first_names,
            &form.last_name,
        );
        let (name_warning, dob_warning) = pending_warnings(
            &errors,
            name_match.as_ref(),
            form.ignore_name_warning.as_deref(),
            &form.first_names,
            &form.last_name,
            form.dob_warning(today),
            form.ignore_dob_warning.as_deref(),
        );

        if errors.any() || name_warning.is_some() || dob_warning.is_some() {
            tracing::debug!(
                lpa_id = %lpa.id,
                role = ?role,
                errors = errors.iter().count(),
                name_warning = name_warning.is_some(),
                dob_warning = dob_warning.is_some(),
                "attorney details rejected"
            );
            return Ok(StepOutcome::Invalid(FormErrors {
                errors,
                name_warning,
                dob_warning,
                addresses: Vec::new(),
            }));
        }

        let was_new = existing.is_none();
        let attorney = match existing {
            Some(existing) => Attorney {
                first_names: form.first_names.clone(),
                last_name: form.last_name.clone(),
                email: form.email.clone(),
                date_of_birth: form.date_of_birth(),
                ..existing
            },
            None => Attorney {
                id: self.new_actor_id(&lpa.attorneys_for(role).ids()),
                first_names: form.first_names.clone(),
                last_name: form.last_name.clone(),
                email: form.email.clone(),
                date_of_birth: form.date_of_birth(),
                address: Default::default(),
            },
        };
        let attorney_id = attorney.id.clone();

        let attorneys = lpa.attorneys_for_mut(role);
        if !attorneys.put(attorney.clone()) {
            attorneys.push(attorney);
        }
        lpa.settle_attorney_tasks(role.section());
        self.save(session_id, &mut lpa).await?;

        tracing::info!(
            lpa_id = %lpa.id,
            role = ?role,
            attorney_id = %attorney_id,
            was_new,
            "attorney saved"
        );
        Ok(StepOutcome::Redirect(routing::after_details_saved(
            role.collection(),
            &attorney_id,
            was_new,
            form.from.as_deref(),
        )))
    }

    pub async fn attorney_summary(
        &self,
        session_id: &str,
        role: AttorneyRole,
        form: YesNoForm,
    ) -> DomainResult<StepOutcome> {
        let lpa = self.load(session_id).await?;
        let label = match role {
            AttorneyRole::Primary => "yesToAddAnotherAttorney",
            AttorneyRole::Replacement => "yesToAddAnotherReplacementAttorney",
        };
        let errors = form.validate(label);
        match form.answer() {
            Some(answer) if errors.none() => Ok(StepOutcome::Redirect(routing::after_summary(
                role.collection(),
                answer,
                &lpa,
            ))),
            _ => Ok(StepOutcome::Invalid(FormErrors::from_errors(errors))),
        }
    }

    /// Removing can leave a single attorney, whose decision answers then no
    /// longer apply, or none at all, which reopens the section.
    pub async fn remove_attorney(
        &self,
        session_id: &str,
        role: AttorneyRole,
        id: &str,
        form: YesNoForm,
    ) -> DomainResult<StepOutcome> {
        let mut lpa = self.load(session_id).await?;
        let collection = role.collection();
        let Some(attorney) = lpa.attorneys_for(role).get(id).cloned() else {
            return Ok(StepOutcome::Redirect(Destination::page(
                collection.summary_page(),
            )));
        };

        let errors = form.validate("removeAttorney");
        let Some(answer) = form.answer().filter(|_| errors.none()) else {
            return Ok(StepOutcome::Invalid(FormErrors::from_errors(errors)));
        };
        if answer == YesNo::No {
            return Ok(StepOutcome::Redirect(Destination::page(
                collection.summary_page(),
            )));
        }

        lpa.attorneys_for_mut(role).delete(&attorney);
        lpa.prune_decisions();
        lpa.settle_attorney_tasks(role.section());
        self.save(session_id, &mut lpa).await?;

        let remaining = lpa.attorneys_for(role).len();
        tracing::info!(
            lpa_id = %lpa.id,
            role = ?role,
            attorney_id = %id,
            remaining,
            "attorney removed"
        );
        Ok(StepOutcome::Redirect(routing::after_removal(
            collection, remaining,
        )))
    }

    pub async fn attorney_decisions(
        &self,
        session_id: &str,
        role: AttorneyRole,
        form: DecisionsForm,
    ) -> DomainResult<StepOutcome> {
        let mut lpa = self.load(session_id).await?;
        let label = match role {
            AttorneyRole::Primary => "howAttorneysShouldMakeDecisions",
            AttorneyRole::Replacement => "howReplacementAttorneysShouldMakeDecisions",
        };
        let errors = form.validate(label);
        let Some(mode) = form.decision_mode().filter(|_| errors.none()) else {
            return Ok(StepOutcome::Invalid(FormErrors::from_errors(errors)));
        };

        match role {
            AttorneyRole::Primary => lpa.set_how_attorneys_make_decisions(Some(mode)),
            AttorneyRole::Replacement => lpa.how_replacement_attorneys_make_decisions = Some(mode),
        }
        lpa.settle_attorney_tasks(role.section());
        self.save(session_id, &mut lpa).await?;

        Ok(StepOutcome::Redirect(routing::after_decisions(role)))
    }

    pub async fn want_replacement_attorneys(
        &self,
        session_id: &str,
        form: YesNoForm,
    ) -> DomainResult<StepOutcome> {
        let mut lpa = self.load(session_id).await?;
        let errors = form.validate("yesToAddReplacementAttorneys");
        let Some(answer) = form.answer().filter(|_| errors.none()) else {
            return Ok(StepOutcome::Invalid(FormErrors::from_errors(errors)));
        };

        lpa.want_replacement_attorneys = Some(answer);
        if answer == YesNo::No {
            lpa.clear_replacement_attorneys();
        }
        lpa.settle_attorney_tasks(Section::ChooseReplacementAttorneys);
        self.save(session_id, &mut lpa).await?;

        Ok(StepOutcome::Redirect(routing::after_want_replacement_attorneys(answer)))
    }

    pub async fn replacement_step_in(
        &self,
        session_id: &str,
        form: StepInForm,
    ) -> DomainResult<StepOutcome> {
        let mut lpa = self.load(session_id).await?;
        let errors = form.validate();
        let Some(step_in) = form.step_in().filter(|_| errors.none()) else {
            return Ok(StepOutcome::Invalid(FormErrors::from_errors(errors)));
        };

        lpa.how_replacement_attorneys_step_in = Some(step_in);
        lpa.settle_attorney_tasks(Section::ChooseReplacementAttorneys);
        self.save(session_id, &mut lpa).await?;

        Ok(StepOutcome::Redirect(routing::after_step_in(&lpa)))
    }
}
