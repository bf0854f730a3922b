//! Wizard pages under `/lpa/:lpa_id`. GET returns the page's view model as
//! JSON; POST takes the page's form.

use axum::extract::{Extension, Form, Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use lpa_domain::actor::Collection;
use lpa_domain::forms::{
    ActorDetailsForm, AddressForm, CertificateProviderForm, CheckYourLpaForm, DecisionsForm,
    DonorDetailsForm, IdentityCallbackForm, IdentityOptionForm, LpaTypeForm, PersonToNotifyForm,
    RestrictionsForm, SignForm, StepInForm, WhenCanTheLpaBeUsedForm, YesNoForm,
};
use lpa_domain::lpa::{AttorneyRole, COST_OF_LPA_PENCE, Lpa, PaymentDetails};
use lpa_domain::routing::{Destination, Page, TaskListItem};
use lpa_domain::wizard::{AddressTarget, PageOutcome};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{redirect_to, step_response};
use crate::error::ApiError;
use crate::middleware::Session;
use crate::state::AppState;
use crate::validation;

/// A page backed by one of the actor collections.
trait CollectionRoute: Send + Sync + 'static {
    const COLLECTION: Collection;
}

trait AttorneyRoute: CollectionRoute {
    const ROLE: AttorneyRole;
}

struct AttorneysRoute;
struct ReplacementAttorneysRoute;
struct PeopleToNotifyRoute;

impl CollectionRoute for AttorneysRoute {
    const COLLECTION: Collection = Collection::Attorneys;
}

impl AttorneyRoute for AttorneysRoute {
    const ROLE: AttorneyRole = AttorneyRole::Primary;
}

impl CollectionRoute for ReplacementAttorneysRoute {
    const COLLECTION: Collection = Collection::ReplacementAttorneys;
}

impl AttorneyRoute for ReplacementAttorneysRoute {
    const ROLE: AttorneyRole = AttorneyRole::Replacement;
}

impl CollectionRoute for PeopleToNotifyRoute {
    const COLLECTION: Collection = Collection::PeopleToNotify;
}

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route(Page::TaskList.path(), get(task_list))
        .route(Page::YourDetails.path(), get(show_lpa).post(donor_details))
        .route(Page::YourAddress.path(), get(show_lpa).post(donor_address))
        .route(Page::LpaType.path(), get(show_lpa).post(lpa_type))
        .route(
            Page::ChooseAttorneys.path(),
            get(actor_details_page::<AttorneysRoute>).post(attorney_details::<AttorneysRoute>),
        )
        .route(
            Page::ChooseAttorneysAddress.path(),
            get(actor_address_page::<AttorneysRoute>).post(actor_address::<AttorneysRoute>),
        )
        .route(
            Page::ChooseAttorneysSummary.path(),
            get(actor_summary_page::<AttorneysRoute>).post(attorney_summary::<AttorneysRoute>),
        )
        .route(
            Page::RemoveAttorney.path(),
            get(actor_remove_page::<AttorneysRoute>).post(remove_attorney::<AttorneysRoute>),
        )
        .route(
            Page::HowShouldAttorneysMakeDecisions.path(),
            get(show_lpa).post(attorney_decisions::<AttorneysRoute>),
        )
        .route(
            Page::DoYouWantReplacementAttorneys.path(),
            get(show_lpa).post(want_replacement_attorneys),
        )
        .route(
            Page::ChooseReplacementAttorneys.path(),
            get(actor_details_page::<ReplacementAttorneysRoute>)
                .post(attorney_details::<ReplacementAttorneysRoute>),
        )
        .route(
            Page::ChooseReplacementAttorneysAddress.path(),
            get(actor_address_page::<ReplacementAttorneysRoute>)
                .post(actor_address::<ReplacementAttorneysRoute>),
        )
        .route(
            Page::ChooseReplacementAttorneysSummary.path(),
            get(actor_summary_page::<ReplacementAttorneysRoute>)
                .post(attorney_summary::<ReplacementAttorneysRoute>),
        )
        .route(
            Page::RemoveReplacementAttorney.path(),
            get(actor_remove_page::<ReplacementAttorneysRoute>)
                .post(remove_attorney::<ReplacementAttorneysRoute>),
        )
        .route(
            Page::HowShouldReplacementAttorneysStepIn.path(),
            get(show_lpa).post(replacement_step_in),
        )
        .route(
            Page::HowShouldReplacementAttorneysMakeDecisions.path(),
            get(show_lpa).post(attorney_decisions::<ReplacementAttorneysRoute>),
        )
        .route(
            Page::WhenCanTheLpaBeUsed.path(),
            get(show_lpa).post(when_can_the_lpa_be_used),
        )
        .route(Page::Restrictions.path(), get(show_lpa).post(restrictions))
        .route(
            Page::CertificateProviderDetails.path(),
            get(show_lpa).post(certificate_provider_details),
        )
        .route(
            Page::CertificateProviderAddress.path(),
            get(show_lpa).post(certificate_provider_address),
        )
        .route(
            Page::DoYouWantToNotifyPeople.path(),
            get(show_lpa).post(want_to_notify_people),
        )
        .route(
            Page::ChoosePeopleToNotify.path(),
            get(actor_details_page::<PeopleToNotifyRoute>).post(person_to_notify_details),
        )
        .route(
            Page::ChoosePeopleToNotifyAddress.path(),
            get(actor_address_page::<PeopleToNotifyRoute>)
                .post(actor_address::<PeopleToNotifyRoute>),
        )
        .route(
            Page::ChoosePeopleToNotifySummary.path(),
            get(actor_summary_page::<PeopleToNotifyRoute>).post(people_to_notify_summary),
        )
        .route(
            Page::RemovePersonToNotify.path(),
            get(actor_remove_page::<PeopleToNotifyRoute>).post(remove_person_to_notify),
        )
        .route(Page::CheckYourLpa.path(), get(show_lpa).post(check_your_lpa))
        .route(Page::AboutPayment.path(), get(about_payment))
        .route(Page::PaymentConfirmation.path(), get(payment_confirmation))
        .route(
            Page::SelectYourIdentityOptions.path(),
            get(show_lpa).post(select_identity_option),
        )
        .route(
            Page::YourChosenIdentityOptions.path(),
            get(show_lpa).post(identity_callback),
        )
        .route(Page::IdentityConfirmed.path(), get(show_lpa))
        .route(Page::SignYourLpa.path(), get(show_lpa).post(sign))
        .route(Page::YouHaveSubmittedYourLpa.path(), get(show_lpa))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ActorQuery {
    id: Option<String>,
    add_another: Option<String>,
}

impl ActorQuery {
    fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    fn adding_another(&self) -> bool {
        self.add_another.as_deref() == Some("1")
    }
}

fn page_response<T: Serialize>(lpa_id: &str, outcome: PageOutcome<T>) -> Response {
    match outcome {
        PageOutcome::Redirect(destination) => redirect_to(lpa_id, &destination),
        PageOutcome::Show(view) => Json(view).into_response(),
    }
}

#[derive(Serialize)]
struct LpaView {
    lpa: Lpa,
}

async fn show_lpa(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(lpa_id): Path<String>,
) -> Result<Json<LpaView>, ApiError> {
    let lpa = state
        .service
        .scoped_to(&lpa_id)
        .load(&session.session_id)
        .await?;
    Ok(Json(LpaView { lpa }))
}

#[derive(Serialize)]
struct TaskListView {
    lpa: Lpa,
    tasks: Vec<TaskListItem>,
}

async fn task_list(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(lpa_id): Path<String>,
) -> Result<Json<TaskListView>, ApiError> {
    let (lpa, tasks) = state
        .service
        .scoped_to(&lpa_id)
        .task_list(&session.session_id)
        .await?;
    Ok(Json(TaskListView { lpa, tasks }))
}

async fn actor_details_page<C: CollectionRoute>(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(lpa_id): Path<String>,
    Query(query): Query<ActorQuery>,
) -> Result<Response, ApiError> {
    let outcome = state
        .service
        .scoped_to(&lpa_id)
        .details_page(
            &session.session_id,
            C::COLLECTION,
            query.id(),
            query.adding_another(),
        )
        .await?;
    Ok(page_response(&lpa_id, outcome))
}

async fn actor_address_page<C: CollectionRoute>(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(lpa_id): Path<String>,
    Query(query): Query<ActorQuery>,
) -> Result<Response, ApiError> {
    let outcome = state
        .service
        .scoped_to(&lpa_id)
        .address_page(&session.session_id, C::COLLECTION, query.id())
        .await?;
    Ok(page_response(&lpa_id, outcome))
}

async fn actor_summary_page<C: CollectionRoute>(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(lpa_id): Path<String>,
) -> Result<Response, ApiError> {
    let outcome = state
        .service
        .scoped_to(&lpa_id)
        .summary_page(&session.session_id, C::COLLECTION)
        .await?;
    Ok(page_response(&lpa_id, outcome))
}

async fn actor_remove_page<C: CollectionRoute>(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(lpa_id): Path<String>,
    Query(query): Query<ActorQuery>,
) -> Result<Response, ApiError> {
    let outcome = state
        .service
        .scoped_to(&lpa_id)
        .remove_page(&session.session_id, C::COLLECTION, query.id())
        .await?;
    Ok(page_response(&lpa_id, outcome))
}

async fn attorney_details<R: AttorneyRoute>(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(lpa_id): Path<String>,
    Query(query): Query<ActorQuery>,
    Form(form): Form<ActorDetailsForm>,
) -> Result<Response, ApiError> {
    let outcome = state
        .service
        .scoped_to(&lpa_id)
        .save_attorney_details(&session.session_id, R::ROLE, query.id(), form)
        .await?;
    Ok(step_response(R::COLLECTION.details_page(), &lpa_id, outcome))
}

async fn actor_address<C: CollectionRoute>(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(lpa_id): Path<String>,
    Query(query): Query<ActorQuery>,
    Form(form): Form<AddressForm>,
) -> Result<Response, ApiError> {
    let target = AddressTarget::Actor {
        collection: C::COLLECTION,
        id: query.id().unwrap_or_default().to_string(),
    };
    let outcome = state
        .service
        .scoped_to(&lpa_id)
        .save_address(&session.session_id, target, form)
        .await?;
    Ok(step_response(C::COLLECTION.address_page(), &lpa_id, outcome))
}

async fn attorney_summary<R: AttorneyRoute>(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(lpa_id): Path<String>,
    Form(form): Form<YesNoForm>,
) -> Result<Response, ApiError> {
    let outcome = state
        .service
        .scoped_to(&lpa_id)
        .attorney_summary(&session.session_id, R::ROLE, form)
        .await?;
    Ok(step_response(R::COLLECTION.summary_page(), &lpa_id, outcome))
}

async fn remove_attorney<R: AttorneyRoute>(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(lpa_id): Path<String>,
    Query(query): Query<ActorQuery>,
    Form(form): Form<YesNoForm>,
) -> Result<Response, ApiError> {
    let outcome = state
        .service
        .scoped_to(&lpa_id)
        .remove_attorney(
            &session.session_id,
            R::ROLE,
            query.id().unwrap_or_default(),
            form,
        )
        .await?;
    Ok(step_response(R::COLLECTION.remove_page(), &lpa_id, outcome))
}

async fn attorney_decisions<R: AttorneyRoute>(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(lpa_id): Path<String>,
    Form(form): Form<DecisionsForm>,
) -> Result<Response, ApiError> {
    let outcome = state
        .service
        .scoped_to(&lpa_id)
        .attorney_decisions(&session.session_id, R::ROLE, form)
        .await?;
    let page = match R::ROLE {
        AttorneyRole::Primary => Page::HowShouldAttorneysMakeDecisions,
        AttorneyRole::Replacement => Page::HowShouldReplacementAttorneysMakeDecisions,
    };
    Ok(step_response(page, &lpa_id, outcome))
}

async fn want_replacement_attorneys(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(lpa_id): Path<String>,
    Form(form): Form<YesNoForm>,
) -> Result<Response, ApiError> {
    let outcome = state
        .service
        .scoped_to(&lpa_id)
        .want_replacement_attorneys(&session.session_id, form)
        .await?;
    Ok(step_response(
        Page::DoYouWantReplacementAttorneys,
        &lpa_id,
        outcome,
    ))
}

async fn replacement_step_in(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(lpa_id): Path<String>,
    Form(form): Form<StepInForm>,
) -> Result<Response, ApiError> {
    let outcome = state
        .service
        .scoped_to(&lpa_id)
        .replacement_step_in(&session.session_id, form)
        .await?;
    Ok(step_response(
        Page::HowShouldReplacementAttorneysStepIn,
        &lpa_id,
        outcome,
    ))
}

async fn donor_details(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(lpa_id): Path<String>,
    Form(form): Form<DonorDetailsForm>,
) -> Result<Response, ApiError> {
    let outcome = state
        .service
        .scoped_to(&lpa_id)
        .save_donor_details(&session.session_id, form)
        .await?;
    Ok(step_response(Page::YourDetails, &lpa_id, outcome))
}

async fn donor_address(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(lpa_id): Path<String>,
    Form(form): Form<AddressForm>,
) -> Result<Response, ApiError> {
    let outcome = state
        .service
        .scoped_to(&lpa_id)
        .save_address(&session.session_id, AddressTarget::Donor, form)
        .await?;
    Ok(step_response(Page::YourAddress, &lpa_id, outcome))
}

async fn lpa_type(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(lpa_id): Path<String>,
    Form(form): Form<LpaTypeForm>,
) -> Result<Response, ApiError> {
    let outcome = state
        .service
        .scoped_to(&lpa_id)
        .choose_lpa_type(&session.session_id, form)
        .await?;
    Ok(step_response(Page::LpaType, &lpa_id, outcome))
}

async fn when_can_the_lpa_be_used(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(lpa_id): Path<String>,
    Form(form): Form<WhenCanTheLpaBeUsedForm>,
) -> Result<Response, ApiError> {
    let outcome = state
        .service
        .scoped_to(&lpa_id)
        .when_can_the_lpa_be_used(&session.session_id, form)
        .await?;
    Ok(step_response(Page::WhenCanTheLpaBeUsed, &lpa_id, outcome))
}

async fn restrictions(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(lpa_id): Path<String>,
    Form(form): Form<RestrictionsForm>,
) -> Result<Response, ApiError> {
    let outcome = state
        .service
        .scoped_to(&lpa_id)
        .restrictions(&session.session_id, form)
        .await?;
    Ok(step_response(Page::Restrictions, &lpa_id, outcome))
}

async fn certificate_provider_details(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(lpa_id): Path<String>,
    Form(form): Form<CertificateProviderForm>,
) -> Result<Response, ApiError> {
    let outcome = state
        .service
        .scoped_to(&lpa_id)
        .save_certificate_provider(&session.session_id, form)
        .await?;
    Ok(step_response(
        Page::CertificateProviderDetails,
        &lpa_id,
        outcome,
    ))
}

async fn certificate_provider_address(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(lpa_id): Path<String>,
    Form(form): Form<AddressForm>,
) -> Result<Response, ApiError> {
    let outcome = state
        .service
        .scoped_to(&lpa_id)
        .save_address(&session.session_id, AddressTarget::CertificateProvider, form)
        .await?;
    Ok(step_response(
        Page::CertificateProviderAddress,
        &lpa_id,
        outcome,
    ))
}

async fn want_to_notify_people(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(lpa_id): Path<String>,
    Form(form): Form<YesNoForm>,
) -> Result<Response, ApiError> {
    let outcome = state
        .service
        .scoped_to(&lpa_id)
        .want_to_notify_people(&session.session_id, form)
        .await?;
    Ok(step_response(Page::DoYouWantToNotifyPeople, &lpa_id, outcome))
}

async fn person_to_notify_details(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(lpa_id): Path<String>,
    Query(query): Query<ActorQuery>,
    Form(form): Form<PersonToNotifyForm>,
) -> Result<Response, ApiError> {
    let outcome = state
        .service
        .scoped_to(&lpa_id)
        .save_person_to_notify(&session.session_id, query.id(), form)
        .await?;
    Ok(step_response(Page::ChoosePeopleToNotify, &lpa_id, outcome))
}

async fn people_to_notify_summary(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(lpa_id): Path<String>,
    Form(form): Form<YesNoForm>,
) -> Result<Response, ApiError> {
    let outcome = state
        .service
        .scoped_to(&lpa_id)
        .people_to_notify_summary(&session.session_id, form)
        .await?;
    Ok(step_response(
        Page::ChoosePeopleToNotifySummary,
        &lpa_id,
        outcome,
    ))
}

async fn remove_person_to_notify(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(lpa_id): Path<String>,
    Query(query): Query<ActorQuery>,
    Form(form): Form<YesNoForm>,
) -> Result<Response, ApiError> {
    let outcome = state
        .service
        .scoped_to(&lpa_id)
        .remove_person_to_notify(&session.session_id, query.id().unwrap_or_default(), form)
        .await?;
    Ok(step_response(Page::RemovePersonToNotify, &lpa_id, outcome))
}

async fn check_your_lpa(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(lpa_id): Path<String>,
    Form(form): Form<CheckYourLpaForm>,
) -> Result<Response, ApiError> {
    let outcome = state
        .service
        .scoped_to(&lpa_id)
        .check_your_lpa(&session.session_id, form)
        .await?;
    Ok(step_response(Page::CheckYourLpa, &lpa_id, outcome))
}

#[derive(Serialize)]
struct AboutPaymentView {
    lpa: Lpa,
    cost_pence: u32,
}

async fn about_payment(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(lpa_id): Path<String>,
) -> Result<Json<AboutPaymentView>, ApiError> {
    let lpa = state
        .service
        .scoped_to(&lpa_id)
        .load(&session.session_id)
        .await?;
    Ok(Json(AboutPaymentView {
        lpa,
        cost_pence: COST_OF_LPA_PENCE,
    }))
}

/// What the payment gateway appends when it sends the donor back.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
struct PaymentReturnQuery {
    #[validate(length(min = 1, max = 64))]
    payment_id: String,
}

#[derive(Serialize)]
struct PaymentConfirmationView {
    payment: PaymentDetails,
    next: String,
}

async fn payment_confirmation(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(lpa_id): Path<String>,
    Query(query): Query<PaymentReturnQuery>,
) -> Result<Json<PaymentConfirmationView>, ApiError> {
    validation::validate(&query)?;
    let payment = state
        .service
        .scoped_to(&lpa_id)
        .confirm_payment(&session.session_id, &query.payment_id)
        .await?;
    Ok(Json(PaymentConfirmationView {
        payment,
        next: Destination::page(Page::TaskList).url(&lpa_id),
    }))
}

async fn select_identity_option(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(lpa_id): Path<String>,
    Form(form): Form<IdentityOptionForm>,
) -> Result<Response, ApiError> {
    let outcome = state
        .service
        .scoped_to(&lpa_id)
        .select_identity_option(&session.session_id, form)
        .await?;
    Ok(step_response(
        Page::SelectYourIdentityOptions,
        &lpa_id,
        outcome,
    ))
}

async fn identity_callback(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(lpa_id): Path<String>,
    Form(form): Form<IdentityCallbackForm>,
) -> Result<Response, ApiError> {
    let outcome = state
        .service
        .scoped_to(&lpa_id)
        .confirm_identity(&session.session_id, form)
        .await?;
    Ok(step_response(
        Page::YourChosenIdentityOptions,
        &lpa_id,
        outcome,
    ))
}

async fn sign(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(lpa_id): Path<String>,
    Form(form): Form<SignForm>,
) -> Result<Response, ApiError> {
    let outcome = state
        .service
        .scoped_to(&lpa_id)
        .sign(&session.session_id, form)
        .await?;
    Ok(step_response(Page::SignYourLpa, &lpa_id, outcome))
}
