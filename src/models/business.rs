//! Business profile, engagement toggles and the validated flow settings

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use super::business_type::{BusinessTemplate, BusinessType};
use super::loyalty;

/// Business profile row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BusinessProfile {
    pub id: i64,
    pub display_name: String,
    pub business_type: BusinessType,
    pub logo_url: Option<String>,
    pub welcome_message: Option<String>,
    pub success_message: Option<String>,
    pub privacy_message: Option<String>,
    pub reward_message: Option<String>,
    pub reward_enabled: bool,
    pub reward_visit_threshold: i32,
    #[sqlx(flatten)]
    pub engagement: EngagementSettings,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Optional post-visit prompts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow, Validate, ToSchema)]
#[validate(schema(function = "validate_prompt_urls"))]
pub struct EngagementSettings {
    pub show_review: bool,
    pub review_url: Option<String>,
    pub show_social: bool,
    pub social_url: Option<String>,
    pub show_feedback: bool,
    pub feedback_url: Option<String>,
}

// An enabled link prompt needs a URL to send the visitor to
fn validate_prompt_urls(settings: &EngagementSettings) -> Result<(), ValidationError> {
    let missing = |enabled: bool, url: &Option<String>| enabled && url.is_none();
    if missing(settings.show_review, &settings.review_url) {
        let mut err = ValidationError::new("review_url_required");
        err.message = Some("A review URL is required to show the review prompt".into());
        return Err(err);
    }
    if missing(settings.show_social, &settings.social_url) {
        let mut err = ValidationError::new("social_url_required");
        err.message = Some("A social URL is required to show the social prompt".into());
        return Err(err);
    }
    Ok(())
}

/// Survey sub-prompt kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PromptKind {
    Review,
    Social,
    Feedback,
}

/// A survey prompt the visitor may answer or skip
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EngagementPrompt {
    pub kind: PromptKind,
    pub url: Option<String>,
}

impl EngagementSettings {
    /// Enabled prompts only; a disabled prompt never exposes its URL
    pub fn prompts(&self) -> Vec<EngagementPrompt> {
        [
            (PromptKind::Review, self.show_review, &self.review_url),
            (PromptKind::Social, self.show_social, &self.social_url),
            (PromptKind::Feedback, self.show_feedback, &self.feedback_url),
        ]
        .into_iter()
        .filter(|(_, enabled, _)| *enabled)
        .map(|(kind, _, url)| EngagementPrompt {
            kind,
            url: url.clone(),
        })
        .collect()
    }
}

/// Typed settings consulted by the visitor flow, built once per request
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct FlowSettings {
    pub business_id: i64,
    pub business_type: BusinessType,
    pub display_name: String,
    pub logo_url: Option<String>,
    pub has_reward_setup: bool,
    pub reward_visit_threshold: i32,
    pub welcome_message: String,
    pub welcome_back_message: String,
    pub success_message: String,
    pub privacy_message: String,
    pub reward_message: String,
    pub prompts: Vec<EngagementPrompt>,
}

impl FlowSettings {
    pub fn from_profile(profile: &BusinessProfile) -> Self {
        let template: &BusinessTemplate = profile.business_type.template();
        let or_template = |value: &Option<String>, fallback: &str| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .unwrap_or(fallback)
                .to_string()
        };

        Self {
            business_id: profile.id,
            business_type: profile.business_type,
            display_name: profile.display_name.clone(),
            logo_url: profile.logo_url.clone(),
            has_reward_setup: profile.reward_enabled,
            reward_visit_threshold: loyalty::effective_threshold(profile.reward_visit_threshold),
            welcome_message: or_template(&profile.welcome_message, template.welcome_title),
            welcome_back_message: template.welcome_back_title.to_string(),
            success_message: or_template(&profile.success_message, template.success_title),
            privacy_message: or_template(
                &profile.privacy_message,
                "We only use your details to send you updates and rewards. You can unsubscribe at any time.",
            ),
            reward_message: or_template(&profile.reward_message, template.reward_label),
            prompts: profile.engagement.prompts(),
        }
    }

    pub fn has_survey(&self) -> bool {
        !self.prompts.is_empty()
    }

    pub fn offers_prompt(&self, kind: PromptKind) -> bool {
        self.prompts.iter().any(|p| p.kind == kind)
    }
}

/// Merchant view of the settings: stored values plus what visitors will see
#[derive(Debug, Serialize, ToSchema)]
pub struct BusinessSettingsView {
    pub profile: BusinessProfile,
    pub flow: FlowSettings,
}

impl From<BusinessProfile> for BusinessSettingsView {
    fn from(profile: BusinessProfile) -> Self {
        let flow = FlowSettings::from_profile(&profile);
        Self { profile, flow }
    }
}

/// Create business request (onboarding)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBusiness {
    #[validate(length(min = 1, max = 120, message = "Display name is required"))]
    pub display_name: String,
    pub business_type: BusinessType,
    #[validate(url(message = "Invalid logo URL"))]
    pub logo_url: Option<String>,
    #[validate(range(min = 1, message = "Reward threshold must be at least 1"))]
    pub reward_visit_threshold: Option<i32>,
}

/// Merchant settings update; absent fields keep their current value.
///
/// Prompt URLs are checked on the merged [`EngagementSettings`], so a URL
/// saved earlier satisfies a later `show_review`/`show_social`.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBusinessSettings {
    #[validate(length(min = 1, max = 120))]
    pub display_name: Option<String>,
    pub business_type: Option<BusinessType>,
    #[validate(url(message = "Invalid logo URL"))]
    pub logo_url: Option<String>,
    #[validate(length(max = 500))]
    pub welcome_message: Option<String>,
    #[validate(length(max = 500))]
    pub success_message: Option<String>,
    #[validate(length(max = 2000))]
    pub privacy_message: Option<String>,
    #[validate(length(max = 500))]
    pub reward_message: Option<String>,
    pub reward_enabled: Option<bool>,
    #[validate(range(min = 1, message = "Reward threshold must be at least 1"))]
    pub reward_visit_threshold: Option<i32>,
    pub show_review: Option<bool>,
    #[validate(url(message = "Invalid review URL"))]
    pub review_url: Option<String>,
    pub show_social: Option<bool>,
    #[validate(url(message = "Invalid social URL"))]
    pub social_url: Option<String>,
    pub show_feedback: Option<bool>,
    #[validate(url(message = "Invalid feedback URL"))]
    pub feedback_url: Option<String>,
}

impl UpdateBusinessSettings {
    /// Merge onto an existing profile
    pub fn apply_to(&self, profile: &mut BusinessProfile) {
        if let Some(ref v) = self.display_name {
            profile.display_name = v.clone();
        }
        if let Some(v) = self.business_type {
            profile.business_type = v;
        }
        if self.logo_url.is_some() {
            profile.logo_url = self.logo_url.clone();
        }
        if self.welcome_message.is_some() {
            profile.welcome_message = self.welcome_message.clone();
        }
        if self.success_message.is_some() {
            profile.success_message = self.success_message.clone();
        }
        if self.privacy_message.is_some() {
            profile.privacy_message = self.privacy_message.clone();
        }
        if self.reward_message.is_some() {
            profile.reward_message = self.reward_message.clone();
        }
        if let Some(v) = self.reward_enabled {
            profile.reward_enabled = v;
        }
        if let Some(v) = self.reward_visit_threshold {
            profile.reward_visit_threshold = v;
        }

        let engagement = &mut profile.engagement;
        if let Some(v) = self.show_review {
            engagement.show_review = v;
        }
        if self.review_url.is_some() {
            engagement.review_url = self.review_url.clone();
        }
        if let Some(v) = self.show_social {
            engagement.show_social = v;
        }
        if self.social_url.is_some() {
            engagement.social_url = self.social_url.clone();
        }
        if let Some(v) = self.show_feedback {
            engagement.show_feedback = v;
        }
        if self.feedback_url.is_some() {
            engagement.feedback_url = self.feedback_url.clone();
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_profile() -> BusinessProfile {
    BusinessProfile {
        id: 7,
        display_name: "Bean There".to_string(),
        business_type: BusinessType::Cafe,
        logo_url: None,
        welcome_message: None,
        success_message: Some("Cheers!".to_string()),
        privacy_message: None,
        reward_message: None,
        reward_enabled: true,
        reward_visit_threshold: 5,
        engagement: EngagementSettings::default(),
        created_at: Utc::now(),
        updated_at: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_prompt_hides_url() {
        let settings = EngagementSettings {
            show_review: false,
            review_url: Some("https://reviews.example.com/x".into()),
            show_social: true,
            social_url: Some("https://instagram.com/x".into()),
            show_feedback: false,
            feedback_url: None,
        };
        let prompts = settings.prompts();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].kind, PromptKind::Social);
        assert!(prompts
            .iter()
            .all(|p| p.url.as_deref() != Some("https://reviews.example.com/x")));
    }

    #[test]
    fn test_flow_settings_fall_back_to_template() {
        let settings = FlowSettings::from_profile(&sample_profile());
        assert_eq!(settings.welcome_message, "Welcome to the cafe");
        assert_eq!(settings.success_message, "Cheers!");
        assert_eq!(settings.reward_message, "Free coffee");
        assert!(!settings.has_survey());
    }

    #[test]
    fn test_flow_settings_clamp_threshold() {
        let mut profile = sample_profile();
        profile.reward_visit_threshold = 0;
        assert_eq!(FlowSettings::from_profile(&profile).reward_visit_threshold, 1);
    }

    #[test]
    fn test_update_rejects_zero_threshold() {
        let update = UpdateBusinessSettings {
            reward_visit_threshold: Some(0),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn test_enabling_review_requires_a_url() {
        let mut profile = sample_profile();
        let update = UpdateBusinessSettings {
            show_review: Some(true),
            ..Default::default()
        };
        assert!(update.validate().is_ok());
        update.apply_to(&mut profile);
        assert!(profile.engagement.validate().is_err());

        let mut profile = sample_profile();
        let update = UpdateBusinessSettings {
            show_review: Some(true),
            review_url: Some("https://g.page/r/abc".into()),
            ..Default::default()
        };
        update.apply_to(&mut profile);
        assert!(profile.engagement.validate().is_ok());
    }

    #[test]
    fn test_stored_url_allows_enabling_prompt_later() {
        let mut profile = sample_profile();
        profile.engagement.review_url = Some("https://g.page/r/abc".into());
        profile.engagement.social_url = Some("https://instagram.com/beanthere".into());

        let update = UpdateBusinessSettings {
            show_review: Some(true),
            show_social: Some(true),
            ..Default::default()
        };
        update.apply_to(&mut profile);
        assert!(profile.engagement.validate().is_ok());
        assert_eq!(profile.engagement.prompts().len(), 2);
    }

    #[test]
    fn test_apply_merges_fields() {
        let mut profile = sample_profile();
        let update = UpdateBusinessSettings {
            show_feedback: Some(true),
            reward_visit_threshold: Some(8),
            ..Default::default()
        };
        update.apply_to(&mut profile);
        assert!(profile.engagement.show_feedback);
        assert_eq!(profile.reward_visit_threshold, 8);
        assert_eq!(profile.display_name, "Bean There");
    }
}
