use super::{FormErrors, LpaService, StepOutcome, pending_warnings};
use crate::DomainResult;
use crate::actor::{ActorKind, Collection, PersonToNotify};
use crate::forms::{PersonToNotifyForm, YesNoForm};
use crate::lpa::{Lpa, YesNo};
use crate::matching::find_name_match;
use crate::routing::{self, Destination};
use crate::tasks::Section;

fn settle(lpa: &mut Lpa) {
    let complete = lpa.people_to_notify_task_complete();
    lpa.tasks.settle(Section::PeopleToNotify, complete);
}

impl LpaService {
    pub async fn want_to_notify_people(
        &self,
        session_id: &str,
        form: YesNoForm,
    ) -> DomainResult<StepOutcome> {
        let mut lpa = self.load(session_id).await?;
        let errors = form.validate("yesToNotifySomeoneAboutYourLpa");
        let Some(answer) = form.answer().filter(|_| errors.none()) else {
            return Ok(StepOutcome::Invalid(FormErrors::from_errors(errors)));
        };

        lpa.do_you_want_to_notify_people = Some(answer);
        if answer == YesNo::No {
            lpa.people_to_notify.clear();
        }
        settle(&mut lpa);
        self.save(session_id, &mut lpa).await?;

        Ok(StepOutcome::Redirect(routing::after_want_to_notify_people(answer)))
    }

    pub async fn save_person_to_notify(
        &self,
        session_id: &str,
        id: Option<&str>,
        form: PersonToNotifyForm,
    ) -> DomainResult<StepOutcome> {
        let mut lpa = self.load(session_id).await?;
        let form = form.trimmed();
        let errors = form.validate();

        let existing = id.and_then(|id| lpa.people_to_notify.get(id).cloned());
        let name_match = find_name_match(
            &lpa,
            ActorKind::PersonToNotify,
            existing.as_ref().map(|person| person.id.as_str()),
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

        let was_new = existing.is_none();
        let person = match existing {
            Some(existing) => PersonToNotify {
                first_names: form.first_names.clone(),
                last_name: form.last_name.clone(),
                email: form.email.clone(),
                ..existing
            },
            None => PersonToNotify {
                id: self.new_actor_id(&lpa.people_to_notify.ids()),
                first_names: form.first_names.clone(),
                last_name: form.last_name.clone(),
                email: form.email.clone(),
                address: Default::default(),
            },
        };
        let person_id = person.id.clone();
        if !lpa.people_to_notify.put(person.clone()) {
            lpa.people_to_notify.push(person);
        }
        settle(&mut lpa);
        self.save(session_id, &mut lpa).await?;

        tracing::info!(lpa_id = %lpa.id, person_id = %person_id, was_new, "person to notify saved");
        Ok(StepOutcome::Redirect(routing::after_details_saved(
            Collection::PeopleToNotify,
            &person_id,
            was_new,
            form.from.as_deref(),
        )))
    }

    pub async fn people_to_notify_summary(
        &self,
        session_id: &str,
        form: YesNoForm,
    ) -> DomainResult<StepOutcome> {
        let lpa = self.load(session_id).await?;
        let errors = form.validate("yesToAddAnotherPersonToNotify");
        match form.answer() {
            Some(answer) if errors.none() => Ok(StepOutcome::Redirect(routing::after_summary(
                Collection::PeopleToNotify,
                answer,
                &lpa,
            ))),
            _ => Ok(StepOutcome::Invalid(FormErrors::from_errors(errors))),
        }
    }

    pub async fn remove_person_to_notify(
        &self,
        session_id: &str,
        id: &str,
        form: YesNoForm,
    ) -> DomainResult<StepOutcome> {
        let mut lpa = self.load(session_id).await?;
        let summary = Destination::page(Collection::PeopleToNotify.summary_page());
        let Some(person) = lpa.people_to_notify.get(id).cloned() else {
            return Ok(StepOutcome::Redirect(summary));
        };

        let errors = form.validate("removePersonToNotify");
        let Some(answer) = form.answer().filter(|_| errors.none()) else {
            return Ok(StepOutcome::Invalid(FormErrors::from_errors(errors)));
        };
        if answer == YesNo::No {
            return Ok(StepOutcome::Redirect(summary));
        }

        lpa.people_to_notify.delete(&person);
        settle(&mut lpa);
        self.save(session_id, &mut lpa).await?;

        let remaining = lpa.people_to_notify.len();
        tracing::info!(lpa_id = %lpa.id, person_id = %id, remaining, "person to notify removed");
        Ok(StepOutcome::Redirect(routing::after_removal(
            Collection::PeopleToNotify,
            remaining,
        )))
    }
}
