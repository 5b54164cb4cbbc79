//! Business types and their static copy templates

use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, Postgres};
use utoipa::ToSchema;

/// Kind of business a tap device is deployed at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BusinessType {
    Restaurant,
    Cafe,
    Retail,
    Salon,
    Gym,
    Hotel,
    Other,
}

impl BusinessType {
    pub const ALL: [BusinessType; 7] = [
        BusinessType::Restaurant,
        BusinessType::Cafe,
        BusinessType::Retail,
        BusinessType::Salon,
        BusinessType::Gym,
        BusinessType::Hotel,
        BusinessType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BusinessType::Restaurant => "restaurant",
            BusinessType::Cafe => "cafe",
            BusinessType::Retail => "retail",
            BusinessType::Salon => "salon",
            BusinessType::Gym => "gym",
            BusinessType::Hotel => "hotel",
            BusinessType::Other => "other",
        }
    }

    /// Static copy for this business type
    pub fn template(&self) -> &'static BusinessTemplate {
        &TEMPLATES[*self as usize]
    }
}

impl std::fmt::Display for BusinessType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BusinessType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BusinessType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Invalid business type: {}", s))
    }
}

impl sqlx::Type<Postgres> for BusinessType {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for BusinessType {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for BusinessType {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <String as Encode<Postgres>>::encode(self.as_str().to_string(), buf)
    }
}

/// Immutable boilerplate copy shown to visitors
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BusinessTemplate {
    pub label: &'static str,
    pub icon: &'static str,
    pub welcome_title: &'static str,
    pub welcome_back_title: &'static str,
    pub form_title: &'static str,
    pub success_title: &'static str,
    pub reward_label: &'static str,
}

/// Registry entry as returned by the API
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BusinessTypeEntry {
    pub business_type: BusinessType,
    pub template: BusinessTemplate,
}

// Indexed by `BusinessType as usize`
static TEMPLATES: [BusinessTemplate; 7] = [
    BusinessTemplate {
        label: "Restaurant",
        icon: "utensils",
        welcome_title: "Welcome! Enjoy your meal",
        welcome_back_title: "Great to see you again!",
        form_title: "Join our guest list",
        success_title: "Thanks for dining with us",
        reward_label: "Free dessert",
    },
    BusinessTemplate {
        label: "Cafe",
        icon: "coffee",
        welcome_title: "Welcome to the cafe",
        welcome_back_title: "Your usual?",
        form_title: "Get your loyalty card",
        success_title: "Enjoy your coffee",
        reward_label: "Free coffee",
    },
    BusinessTemplate {
        label: "Retail Store",
        icon: "shopping-bag",
        welcome_title: "Welcome to our store",
        welcome_back_title: "Welcome back, shopper!",
        form_title: "Get exclusive offers",
        success_title: "Happy shopping",
        reward_label: "10% off your next purchase",
    },
    BusinessTemplate {
        label: "Salon & Spa",
        icon: "scissors",
        welcome_title: "Relax, you're in good hands",
        welcome_back_title: "Welcome back, beautiful!",
        form_title: "Book faster next time",
        success_title: "See you at your next appointment",
        reward_label: "Free treatment upgrade",
    },
    BusinessTemplate {
        label: "Gym & Fitness",
        icon: "dumbbell",
        welcome_title: "Let's get moving",
        welcome_back_title: "Back for another session!",
        form_title: "Track your check-ins",
        success_title: "Have a great workout",
        reward_label: "Free guest pass",
    },
    BusinessTemplate {
        label: "Hotel",
        icon: "bed",
        welcome_title: "Welcome to your stay",
        welcome_back_title: "Welcome back to the hotel",
        form_title: "Join our guest program",
        success_title: "Enjoy your stay",
        reward_label: "Late checkout",
    },
    BusinessTemplate {
        label: "Business",
        icon: "store",
        welcome_title: "Welcome!",
        welcome_back_title: "Welcome back!",
        form_title: "Stay in touch",
        success_title: "Thank you!",
        reward_label: "Reward",
    },
];

/// All registry entries, in declaration order
pub fn registry() -> Vec<BusinessTypeEntry> {
    BusinessType::ALL
        .into_iter()
        .map(|business_type| BusinessTypeEntry {
            business_type,
            template: business_type.template().clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_type_has_template() {
        for t in BusinessType::ALL {
            assert!(!t.template().label.is_empty());
        }
        assert_eq!(BusinessType::Cafe.template().reward_label, "Free coffee");
        assert_eq!(BusinessType::Other.template().label, "Business");
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("SALON".parse::<BusinessType>(), Ok(BusinessType::Salon));
        assert!("bakery".parse::<BusinessType>().is_err());
    }

    #[test]
    fn test_registry_order() {
        let entries = registry();
        assert_eq!(entries.len(), BusinessType::ALL.len());
        assert_eq!(entries[0].business_type, BusinessType::Restaurant);
    }

    #[test]
    fn test_decodes_from_varchar_and_text_columns() {
        use sqlx::postgres::PgTypeInfo;

        for name in ["VARCHAR", "TEXT"] {
            assert!(
                <BusinessType as sqlx::Type<Postgres>>::compatible(&PgTypeInfo::with_name(name)),
                "business_type should read from {}",
                name
            );
        }
        assert!(!<BusinessType as sqlx::Type<Postgres>>::compatible(
            &PgTypeInfo::with_name("INT4")
        ));
    }
}
