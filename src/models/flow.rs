//! Visitor tap flow state machine
//!
//! [`transition`] is the single place where steps change. It is pure: it
//! takes the current state, an event and the business settings, and returns
//! the next state together with the side effects the caller has to run.
//! Nothing is persisted here, so a failed effect simply means the next state
//! is dropped and the stored one stays untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::business::{EngagementPrompt, FlowSettings, PromptKind};
use super::contact::{CapturedContact, Contact, ContactForm};
use super::feedback::FeedbackForm;
use super::loyalty::{self, RewardProgress};
use super::redemption::{RedemptionRequest, RedemptionSnapshot, RedemptionStatus};

/// Steps of a tap session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowStep {
    SelectType,
    Scanning,
    Identifying,
    SuccessLinked,
    ErrorNotFound,
    Welcome,
    WelcomeBack,
    Privacy,
    Form,
    Outcome,
    Survey,
    FinalSuccess,
}

/// Persisted state of one visitor session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CustomerFlowState {
    pub session_id: Uuid,
    pub business_id: Option<i64>,
    pub current_step: FlowStep,
    /// Identifier the device presented on tap, if any
    pub presented_id: Option<String>,
    pub user_data: Option<CapturedContact>,
    pub visit_count: i32,
    pub is_returning: bool,
    pub privacy_accepted: bool,
    pub redemption: Option<RedemptionSnapshot>,
    pub answered_prompts: Vec<PromptKind>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CustomerFlowState {
    /// Fresh session; a pre-loaded business skips type selection
    pub fn new(session_id: Uuid, business_id: Option<i64>) -> Self {
        let now = Utc::now();
        Self {
            session_id,
            business_id,
            current_step: if business_id.is_some() {
                FlowStep::Scanning
            } else {
                FlowStep::SelectType
            },
            presented_id: None,
            user_data: None,
            visit_count: 1,
            is_returning: false,
            privacy_accepted: false,
            redemption: None,
            answered_prompts: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Clear per-visit fields; the business context survives
    pub fn reset(&mut self) {
        self.current_step = FlowStep::SelectType;
        self.presented_id = None;
        self.user_data = None;
        self.visit_count = 1;
        self.is_returning = false;
        self.privacy_accepted = false;
        self.redemption = None;
        self.answered_prompts.clear();
    }

    /// Count this tap as a visit
    pub fn record_visit(&mut self) {
        self.visit_count += 1;
        self.is_returning = true;
    }

    pub fn threshold_crossed(&self, settings: &FlowSettings) -> bool {
        loyalty::threshold_crossed(self.visit_count, settings.reward_visit_threshold)
    }

    pub fn unique_id(&self) -> Option<&str> {
        self.user_data.as_ref().and_then(|c| c.unique_id.as_deref())
    }

    pub fn has_pending_redemption(&self) -> bool {
        self.redemption
            .as_ref()
            .is_some_and(|r| r.status == RedemptionStatus::Pending)
    }

    /// Id of the request still waiting for a merchant decision
    pub fn pending_redemption_id(&self) -> Option<i64> {
        self.redemption
            .as_ref()
            .filter(|r| r.status == RedemptionStatus::Pending)
            .map(|r| r.id)
    }

    /// Take in a merchant decision on the pending request.
    ///
    /// `visit_count` is the contact's count after the decision; it replaces
    /// the session count only on approval. Returns true when the session
    /// changed.
    pub fn apply_redemption_update(&mut self, current: &RedemptionRequest, visit_count: Option<i32>) -> bool {
        if self.pending_redemption_id() != Some(current.id) || current.status == RedemptionStatus::Pending {
            return false;
        }

        if current.status == RedemptionStatus::Approved {
            if let Some(count) = visit_count {
                self.visit_count = count;
            }
        }
        self.redemption = Some(current.into());
        true
    }
}

/// Actions a visitor client can send
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FlowAction {
    ChooseBusiness { business_id: i64 },
    Tap { unique_id: Option<String> },
    Continue,
    AcceptPrivacy,
    SubmitForm { form: ContactForm },
    RequestRedemption { reward_title: String, reward_id: Option<i64> },
    AnswerPrompt { kind: PromptKind },
    SubmitFeedback { feedback: FeedbackForm },
    Retry,
    Reset,
}

impl FlowAction {
    pub fn name(&self) -> &'static str {
        match self {
            FlowAction::ChooseBusiness { .. } => "choose_business",
            FlowAction::Tap { .. } => "tap",
            FlowAction::Continue => "continue",
            FlowAction::AcceptPrivacy => "accept_privacy",
            FlowAction::SubmitForm { .. } => "submit_form",
            FlowAction::RequestRedemption { .. } => "request_redemption",
            FlowAction::AnswerPrompt { .. } => "answer_prompt",
            FlowAction::SubmitFeedback { .. } => "submit_feedback",
            FlowAction::Retry => "retry",
            FlowAction::Reset => "reset",
        }
    }
}

/// Input to [`transition`]: a client action or a resolved lookup
#[derive(Debug, Clone, PartialEq)]
pub enum FlowEvent {
    Action(FlowAction),
    ContactResolved(Option<Contact>),
}

impl From<FlowAction> for FlowEvent {
    fn from(action: FlowAction) -> Self {
        FlowEvent::Action(action)
    }
}

impl FlowEvent {
    fn name(&self) -> &'static str {
        match self {
            FlowEvent::Action(a) => a.name(),
            FlowEvent::ContactResolved(_) => "contact_resolved",
        }
    }
}

/// Side effects requested by a transition
#[derive(Debug, Clone, PartialEq)]
pub enum FlowEffect {
    LookupContact { unique_id: Option<String> },
    RecordVisit { unique_id: String },
    StoreContact(CapturedContact),
    CreateRedemption { reward_title: String, reward_id: Option<i64> },
    StoreFeedback(FeedbackForm),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FlowError {
    #[error("'{event}' is not allowed in step {step:?}")]
    InvalidTransition { step: FlowStep, event: &'static str },

    #[error("{0}")]
    Validation(String),

    #[error("No business selected for this session")]
    MissingBusiness,

    #[error("Privacy notice must be accepted before contact details are collected")]
    ConsentRequired,

    #[error("{0}")]
    RewardUnavailable(String),

    #[error("Prompt {0:?} is not enabled for this business")]
    PromptDisabled(PromptKind),
}

/// Next state plus the effects needed to commit it
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: CustomerFlowState,
    pub effects: Vec<FlowEffect>,
}

impl Transition {
    fn to(state: CustomerFlowState) -> Self {
        Self {
            state,
            effects: Vec::new(),
        }
    }

    fn with(mut self, effect: FlowEffect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Compute the next state for `event`
pub fn transition(
    state: &CustomerFlowState,
    event: FlowEvent,
    settings: Option<&FlowSettings>,
) -> Result<Transition, FlowError> {
    let invalid = |event: &FlowEvent| FlowError::InvalidTransition {
        step: state.current_step,
        event: event.name(),
    };
    let mut next = state.clone();

    // Reset is accepted from every step
    if matches!(event, FlowEvent::Action(FlowAction::Reset)) {
        next.reset();
        return Ok(Transition::to(next));
    }

    if state.current_step == FlowStep::SelectType {
        return match event {
            FlowEvent::Action(FlowAction::ChooseBusiness { business_id }) => {
                match settings {
                    Some(s) if s.business_id == business_id => {}
                    _ => return Err(FlowError::MissingBusiness),
                }
                next.business_id = Some(business_id);
                next.current_step = FlowStep::Scanning;
                Ok(Transition::to(next))
            }
            other => Err(invalid(&other)),
        };
    }

    let settings = settings.ok_or(FlowError::MissingBusiness)?;

    match (state.current_step, event) {
        (FlowStep::Scanning, FlowEvent::Action(FlowAction::Tap { unique_id })) => {
            let unique_id = unique_id
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty());
            next.presented_id = unique_id.clone();
            next.current_step = FlowStep::Identifying;
            Ok(Transition::to(next).with(FlowEffect::LookupContact { unique_id }))
        }

        (FlowStep::Identifying, FlowEvent::ContactResolved(Some(contact))) => {
            next.user_data = Some(CapturedContact::from(&contact));
            next.visit_count = contact.visit_count;
            next.record_visit();
            next.current_step = FlowStep::SuccessLinked;
            Ok(Transition::to(next).with(FlowEffect::RecordVisit {
                unique_id: contact.unique_id,
            }))
        }

        (FlowStep::Identifying, FlowEvent::ContactResolved(None)) => {
            next.current_step = if state.presented_id.is_some() {
                FlowStep::ErrorNotFound
            } else {
                FlowStep::Welcome
            };
            Ok(Transition::to(next))
        }

        (FlowStep::ErrorNotFound, FlowEvent::Action(FlowAction::Retry)) => {
            next.presented_id = None;
            next.current_step = FlowStep::Scanning;
            Ok(Transition::to(next))
        }

        (FlowStep::SuccessLinked, FlowEvent::Action(FlowAction::Continue)) => {
            next.current_step = FlowStep::WelcomeBack;
            Ok(Transition::to(next))
        }

        (FlowStep::Welcome | FlowStep::WelcomeBack, FlowEvent::Action(FlowAction::Continue)) => {
            next.current_step = FlowStep::Privacy;
            Ok(Transition::to(next))
        }

        (FlowStep::Privacy, FlowEvent::Action(FlowAction::AcceptPrivacy)) => {
            next.privacy_accepted = true;
            next.current_step = FlowStep::Form;
            Ok(Transition::to(next))
        }

        (FlowStep::Form, FlowEvent::Action(FlowAction::SubmitForm { form })) => {
            if !state.privacy_accepted {
                return Err(FlowError::ConsentRequired);
            }
            let form = form.normalized();
            form.validate()
                .map_err(|e| FlowError::Validation(e.to_string()))?;

            let captured = CapturedContact::from_form(&form, state.user_data.as_ref());
            next.user_data = Some(captured.clone());
            next.current_step = FlowStep::Outcome;
            Ok(Transition::to(next).with(FlowEffect::StoreContact(captured)))
        }

        (
            FlowStep::Outcome,
            FlowEvent::Action(FlowAction::RequestRedemption {
                reward_title,
                reward_id,
            }),
        ) => {
            if !settings.has_reward_setup {
                return Err(FlowError::RewardUnavailable(
                    "Rewards are not enabled for this business".to_string(),
                ));
            }
            if !state.threshold_crossed(settings) {
                return Err(FlowError::RewardUnavailable(format!(
                    "{} more visit(s) needed before a reward can be redeemed",
                    loyalty::visits_remaining(state.visit_count, settings.reward_visit_threshold)
                )));
            }
            if state.unique_id().is_none() {
                return Err(FlowError::RewardUnavailable(
                    "Contact details must be saved before redeeming".to_string(),
                ));
            }
            if state.has_pending_redemption() {
                return Ok(Transition::to(next));
            }
            let reward_title = reward_title.trim().to_string();
            if reward_title.is_empty() {
                return Err(FlowError::Validation("Reward title is required".to_string()));
            }
            Ok(Transition::to(next).with(FlowEffect::CreateRedemption {
                reward_title,
                reward_id,
            }))
        }

        (FlowStep::Outcome, FlowEvent::Action(FlowAction::Continue)) => {
            next.current_step = if settings.has_survey() {
                FlowStep::Survey
            } else {
                FlowStep::FinalSuccess
            };
            Ok(Transition::to(next))
        }

        (FlowStep::Survey, FlowEvent::Action(FlowAction::AnswerPrompt { kind })) => {
            if kind == PromptKind::Feedback || !settings.offers_prompt(kind) {
                return Err(FlowError::PromptDisabled(kind));
            }
            mark_answered(&mut next, kind);
            Ok(Transition::to(next))
        }

        (FlowStep::Survey, FlowEvent::Action(FlowAction::SubmitFeedback { feedback })) => {
            if !settings.offers_prompt(PromptKind::Feedback) {
                return Err(FlowError::PromptDisabled(PromptKind::Feedback));
            }
            feedback
                .validate()
                .map_err(|e| FlowError::Validation(e.to_string()))?;
            mark_answered(&mut next, PromptKind::Feedback);
            Ok(Transition::to(next).with(FlowEffect::StoreFeedback(feedback)))
        }

        (FlowStep::Survey, FlowEvent::Action(FlowAction::Continue)) => {
            next.current_step = FlowStep::FinalSuccess;
            Ok(Transition::to(next))
        }

        (_, other) => Err(invalid(&other)),
    }
}

fn mark_answered(state: &mut CustomerFlowState, kind: PromptKind) {
    if !state.answered_prompts.contains(&kind) {
        state.answered_prompts.push(kind);
    }
}

/// What the visitor client should render for the current step
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FlowView {
    pub step: FlowStep,
    pub business_name: Option<String>,
    pub logo_url: Option<String>,
    pub title: Option<String>,
    pub message: Option<String>,
    /// Present on welcome screens of returning visitors when rewards are on
    pub reward_progress: Option<RewardProgress>,
    pub offer_redemption: bool,
    pub reward_label: Option<String>,
    /// Unanswered survey prompts
    pub prompts: Vec<EngagementPrompt>,
}

impl FlowView {
    pub fn build(state: &CustomerFlowState, settings: Option<&FlowSettings>) -> Self {
        let mut view = FlowView {
            step: state.current_step,
            business_name: None,
            logo_url: None,
            title: None,
            message: None,
            reward_progress: None,
            offer_redemption: false,
            reward_label: None,
            prompts: Vec::new(),
        };
        let Some(settings) = settings else {
            return view;
        };
        let template = settings.business_type.template();

        view.business_name = Some(settings.display_name.clone());
        view.logo_url = settings.logo_url.clone();
        if settings.has_reward_setup {
            view.reward_label = Some(settings.reward_message.clone());
        }

        match state.current_step {
            FlowStep::Welcome => {
                view.title = Some(template.welcome_title.to_string());
                view.message = Some(settings.welcome_message.clone());
            }
            FlowStep::WelcomeBack => {
                view.title = Some(settings.welcome_back_message.clone());
                view.message = Some(settings.welcome_message.clone());
                if settings.has_reward_setup && state.is_returning {
                    view.reward_progress = Some(RewardProgress::new(
                        state.visit_count,
                        settings.reward_visit_threshold,
                    ));
                }
            }
            FlowStep::Privacy => {
                view.message = Some(settings.privacy_message.clone());
            }
            FlowStep::Form => {
                view.title = Some(template.form_title.to_string());
            }
            FlowStep::Outcome => {
                view.offer_redemption =
                    settings.has_reward_setup && state.threshold_crossed(settings);
                view.title = Some(template.success_title.to_string());
                view.message = Some(if view.offer_redemption {
                    settings.reward_message.clone()
                } else {
                    settings.success_message.clone()
                });
            }
            FlowStep::Survey => {
                view.prompts = settings
                    .prompts
                    .iter()
                    .filter(|p| !state.answered_prompts.contains(&p.kind))
                    .cloned()
                    .collect();
            }
            FlowStep::FinalSuccess => {
                view.title = Some(template.success_title.to_string());
                view.message = Some(settings.success_message.clone());
            }
            _ => {}
        }
        view
    }
}
