use serde::{Deserialize, Serialize};

/// Sexual orientation as reported on member and creator profiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Straight,
    Gay,
    Lesbian,
    #[serde(alias = "bi")]
    Bisexual,
    #[serde(alias = "pan")]
    Pansexual,
}

impl Orientation {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "straight" => Some(Self::Straight),
            "gay" => Some(Self::Gay),
            "lesbian" => Some(Self::Lesbian),
            "bi" | "bisexual" => Some(Self::Bisexual),
            "pan" | "pansexual" => Some(Self::Pansexual),
            _ => None,
        }
    }
}

/// Creator profile as stored in the Appwrite creator collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatorProfile {
    #[serde(rename = "creatorId")]
    pub creator_id: String,
    #[serde(rename = "displayName", default)]
    pub display_name: String,
    pub gender: String,
    pub orientation: Orientation,
    #[serde(default)]
    pub age: Option<u8>,
    #[serde(rename = "bodyType", default)]
    pub body_type: Option<String>,
    #[serde(default)]
    pub ethnicity: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(rename = "isActive", default = "default_true")]
    pub is_active: bool,
    #[serde(rename = "isBrowsable", default = "default_true")]
    pub is_browsable: bool,
    #[serde(rename = "isVerified", default)]
    pub is_verified: Option<bool>,
    #[serde(rename = "autoConnectEnabled", default)]
    pub auto_connect_enabled: bool,
    #[serde(rename = "lastActive", default)]
    pub last_active: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(rename = "lastContentAt", default)]
    pub last_content_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl CreatorProfile {
    /// Helper to get is_verified as a bool, defaulting to false
    pub fn verified(&self) -> bool {
        self.is_verified.unwrap_or(false)
    }

    /// Whether the creator was seen within the given window
    pub fn active_within(&self, now: chrono::DateTime<chrono::Utc>, window: chrono::Duration) -> bool {
        self.last_active
            .map(|seen| now.signed_duration_since(seen) < window)
            .unwrap_or(false)
    }
}

fn default_true() -> bool { true }

/// Member profile data used for discovery and compatibility
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberProfile {
    #[serde(rename = "memberId")]
    pub member_id: String,
    pub gender: String,
    pub orientation: Orientation,
    #[serde(default)]
    pub age: Option<u8>,
    #[serde(default)]
    pub interests: Vec<String>,
}

/// Hard filters a member applies while browsing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrowseFilters {
    #[serde(default)]
    pub orientations: Vec<Orientation>,
    #[serde(rename = "minAge", default)]
    pub min_age: Option<u8>,
    #[serde(rename = "maxAge", default)]
    pub max_age: Option<u8>,
    #[serde(rename = "bodyTypes", default)]
    pub body_types: Vec<String>,
    #[serde(default)]
    pub ethnicities: Vec<String>,
}

/// Compatibility result with the factors that produced it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityScore {
    pub score: u8,
    pub factors: CompatibilityFactors,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityFactors {
    pub base: u8,
    #[serde(rename = "orientationMatch")]
    pub orientation_match: u8,
    #[serde(rename = "sharedInterests")]
    pub shared_interests: u8,
    #[serde(rename = "ageProximity")]
    pub age_proximity: u8,
}

/// Creator entry in a member's browse stack
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredCreator {
    #[serde(rename = "creatorId")]
    pub creator_id: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    #[serde(rename = "rankScore")]
    pub rank_score: f64,
    pub compatibility: CompatibilityScore,
    #[serde(rename = "successPrediction")]
    pub success_prediction: u8,
    #[serde(rename = "sharedInterests")]
    pub shared_interests: Vec<String>,
    #[serde(rename = "isVerified")]
    pub is_verified: bool,
    #[serde(rename = "isOnline")]
    pub is_online: bool,
}

/// Discovery ranking parameters
#[derive(Debug, Clone, Copy)]
pub struct RankingParams {
    pub candidate_limit: usize,
    pub stack_size: usize,
    pub active_window_mins: i64,
    pub new_content_days: i64,
    pub active_bonus: f64,
    pub verified_bonus: f64,
    pub new_content_bonus: f64,
    pub max_diversity_bonus: f64,
    pub top_pick_probability: f64,
    pub shuffle_window: usize,
}

impl Default for RankingParams {
    fn default() -> Self {
        Self {
            candidate_limit: 50,
            stack_size: 20,
            active_window_mins: 15,
            new_content_days: 7,
            active_bonus: 50.0,
            verified_bonus: 30.0,
            new_content_bonus: 40.0,
            max_diversity_bonus: 20.0,
            top_pick_probability: 0.7,
            shuffle_window: 5,
        }
    }
}
