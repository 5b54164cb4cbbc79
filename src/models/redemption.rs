//! Reward redemption requests and their verification rules

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};

use super::reward::Reward;

pub const INVALID_CODE: &str = "Invalid redemption code";
pub const ALREADY_REDEEMED: &str = "already redeemed";
pub const NETWORK_ERROR: &str = "Network error during verification";

// Ambiguous glyphs (0/O, 1/I) are left out of generated codes
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

static CODE_FORMAT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z0-9]{4,12}$").unwrap());

/// Redemption lifecycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RedemptionStatus {
    #[default]
    None,
    Pending,
    Approved,
    Declined,
}

impl RedemptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RedemptionStatus::None => "none",
            RedemptionStatus::Pending => "pending",
            RedemptionStatus::Approved => "approved",
            RedemptionStatus::Declined => "declined",
        }
    }
}

impl std::fmt::Display for RedemptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RedemptionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(RedemptionStatus::None),
            "pending" => Ok(RedemptionStatus::Pending),
            "approved" => Ok(RedemptionStatus::Approved),
            "declined" => Ok(RedemptionStatus::Declined),
            _ => Err(format!("Invalid redemption status: {}", s)),
        }
    }
}

impl sqlx::Type<Postgres> for RedemptionStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for RedemptionStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for RedemptionStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <String as Encode<Postgres>>::encode(self.as_str().to_string(), buf)
    }
}

/// Redemption request row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RedemptionRequest {
    /// Timestamp-derived (snowflake) id
    pub id: i64,
    pub business_id: i64,
    /// Unique id of the visitor who asked for the reward
    pub visitor_id: String,
    pub reward_id: Option<i64>,
    pub reward_title: String,
    /// Code the visitor shows to staff
    pub code: String,
    pub status: RedemptionStatus,
    /// Optimistic concurrency counter, bumped on every resolution
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Why a code cannot be redeemed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyFailure {
    InvalidCode,
    AlreadyRedeemed,
}

impl VerifyFailure {
    pub fn message(&self) -> &'static str {
        match self {
            VerifyFailure::InvalidCode => INVALID_CODE,
            VerifyFailure::AlreadyRedeemed => ALREADY_REDEEMED,
        }
    }
}

impl RedemptionRequest {
    /// Read-only check run before staff confirm a redemption
    pub fn check_redeemable(&self) -> Result<(), VerifyFailure> {
        match self.status {
            RedemptionStatus::Pending => Ok(()),
            RedemptionStatus::Approved | RedemptionStatus::Declined => {
                Err(VerifyFailure::AlreadyRedeemed)
            }
            RedemptionStatus::None => Err(VerifyFailure::InvalidCode),
        }
    }

    /// Move a pending request to its final status
    pub fn resolve(&mut self, status: RedemptionStatus, now: DateTime<Utc>) -> Result<(), VerifyFailure> {
        self.check_redeemable()?;
        self.status = status;
        self.version += 1;
        self.resolved_at = Some(now);
        Ok(())
    }
}

/// Normalize a human-typed code; `None` when it cannot be a valid code
pub fn normalize_code(raw: &str) -> Option<String> {
    let code: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect::<String>()
        .to_uppercase();
    CODE_FORMAT.is_match(&code).then_some(code)
}

/// Random code of `len` characters from an unambiguous alphabet
pub fn generate_code(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

static ID_GENERATOR: snowflaked::sync::Generator = snowflaked::sync::Generator::new(0);

/// Timestamp-derived unique id for a new request
pub fn next_redemption_id() -> i64 {
    ID_GENERATOR.generate()
}

/// Merchant verification request body
#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyRedemptionRequest {
    pub code: String,
}

/// Verification preview; nothing is mutated by producing it
#[derive(Debug, Serialize, ToSchema)]
pub struct VerifyRedemptionResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redemption: Option<RedemptionRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reward: Option<Reward>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VerifyRedemptionResponse {
    pub fn preview(redemption: RedemptionRequest, reward: Option<Reward>) -> Self {
        Self {
            success: true,
            redemption: Some(redemption),
            reward,
            error: None,
        }
    }

    pub fn failure(reason: VerifyFailure) -> Self {
        Self {
            success: false,
            redemption: None,
            reward: None,
            error: Some(reason.message().to_string()),
        }
    }
}

/// Filter for the merchant redemption queue
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct RedemptionQuery {
    pub status: Option<RedemptionStatus>,
}

/// Snapshot of the visitor's latest request kept in the session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RedemptionSnapshot {
    pub id: i64,
    pub code: String,
    pub reward_title: String,
    pub status: RedemptionStatus,
}

impl From<&RedemptionRequest> for RedemptionSnapshot {
    fn from(r: &RedemptionRequest) -> Self {
        Self {
            id: r.id,
            code: r.code.clone(),
            reward_title: r.reward_title.clone(),
            status: r.status,
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_request(status: RedemptionStatus) -> RedemptionRequest {
    RedemptionRequest {
        id: next_redemption_id(),
        business_id: 7,
        visitor_id: "visitor-1".to_string(),
        reward_id: Some(3),
        reward_title: "Free coffee".to_string(),
        code: "K7QX2M".to_string(),
        status,
        version: 0,
        created_at: Utc::now(),
        resolved_at: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code(" k7qx-2m ").as_deref(), Some("K7QX2M"));
        assert_eq!(normalize_code("zzzzzz").as_deref(), Some("ZZZZZZ"));
        assert_eq!(normalize_code("ab"), None);
        assert_eq!(normalize_code("ab!cd"), None);
    }

    #[test]
    fn test_generated_code_shape() {
        let code = generate_code(6);
        assert_eq!(code.len(), 6);
        assert_eq!(normalize_code(&code).as_deref(), Some(code.as_str()));
        assert!(!code.contains('0') && !code.contains('O'));
    }

    #[test]
    fn test_ids_are_unique_and_increasing() {
        let a = next_redemption_id();
        let b = next_redemption_id();
        assert!(b > a);
    }

    #[test]
    fn test_ids_are_unique_across_threads() {
        let handles: Vec<_> = (0..4)
            .map(|_| std::thread::spawn(|| (0..250).map(|_| next_redemption_id()).collect::<Vec<_>>()))
            .collect();

        let mut ids: Vec<i64> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_status_decodes_from_varchar_column() {
        use sqlx::postgres::PgTypeInfo;

        assert!(<RedemptionStatus as sqlx::Type<Postgres>>::compatible(
            &PgTypeInfo::with_name("VARCHAR")
        ));
        assert!(<RedemptionStatus as sqlx::Type<Postgres>>::compatible(
            &PgTypeInfo::with_name("TEXT")
        ));
    }

    #[test]
    fn test_pending_is_redeemable() {
        assert!(sample_request(RedemptionStatus::Pending).check_redeemable().is_ok());
    }

    #[test]
    fn test_no_double_approval() {
        let mut request = sample_request(RedemptionStatus::Pending);
        request.resolve(RedemptionStatus::Approved, Utc::now()).unwrap();
        assert_eq!(request.status, RedemptionStatus::Approved);
        assert_eq!(request.version, 1);
        assert_eq!(
            request.check_redeemable(),
            Err(VerifyFailure::AlreadyRedeemed)
        );
        assert_eq!(
            request.resolve(RedemptionStatus::Approved, Utc::now()),
            Err(VerifyFailure::AlreadyRedeemed)
        );
        assert_eq!(request.version, 1);
    }

    #[test]
    fn test_declined_counts_as_redeemed() {
        let request = sample_request(RedemptionStatus::Declined);
        let response = match request.check_redeemable() {
            Ok(()) => VerifyRedemptionResponse::preview(request, None),
            Err(e) => VerifyRedemptionResponse::failure(e),
        };
        assert!(!response.success);
        assert_eq!(response.error.as_deref(), Some(ALREADY_REDEEMED));
    }

    #[test]
    fn test_invalid_code_message() {
        let response = VerifyRedemptionResponse::failure(VerifyFailure::InvalidCode);
        assert_eq!(response.error.as_deref(), Some("Invalid redemption code"));
        assert!(response.redemption.is_none());
    }
}
