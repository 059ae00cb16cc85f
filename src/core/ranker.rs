use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use crate::core::{
    compatibility::{compatibility, connection_success_prediction},
    filters::{is_eligible, shared_interests},
};
use crate::models::{BrowseFilters, CreatorProfile, MemberProfile, RankingParams, ScoredCreator};

/// Result of building a browse stack
#[derive(Debug)]
pub struct BrowseStack {
    pub creators: Vec<ScoredCreator>,
    pub total_candidates: usize,
    pub eligible_candidates: usize,
}

/// Discovery ranker - builds the browse stack shown to a member
///
/// # Pipeline Stages
/// 1. Eligibility (activity, browsability, exclusions, orientation, hard filters)
/// 2. Ranking score with a bounded random diversity term
/// 3. Sort descending
/// 4. Weighted shuffle over a sliding top window
/// 5. Compatibility annotation
#[derive(Debug, Clone)]
pub struct DiscoveryRanker {
    params: RankingParams,
}

impl DiscoveryRanker {
    pub fn new(params: RankingParams) -> Self {
        Self { params }
    }

    pub fn with_default_params() -> Self {
        Self {
            params: RankingParams::default(),
        }
    }

    pub fn params(&self) -> &RankingParams {
        &self.params
    }

    /// Ranking score before shuffling
    ///
    /// score = 50 * active_last_15_min + 30 * verified + 40 * content_last_7_days + U[0, 20]
    pub fn ranking_score<R: Rng + ?Sized>(
        &self,
        creator: &CreatorProfile,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> f64 {
        let mut score = 0.0;

        if creator.active_within(now, Duration::minutes(self.params.active_window_mins)) {
            score += self.params.active_bonus;
        }

        if creator.verified() {
            score += self.params.verified_bonus;
        }

        let recent_content = creator
            .last_content_at
            .map(|posted| now.signed_duration_since(posted) < Duration::days(self.params.new_content_days))
            .unwrap_or(false);
        if recent_content {
            score += self.params.new_content_bonus;
        }

        if self.params.max_diversity_bonus > 0.0 {
            score += rng.gen_range(0.0..=self.params.max_diversity_bonus);
        }

        score
    }

    /// Build a browse stack for a member
    ///
    /// # Arguments
    /// * `member` - The browsing member
    /// * `filters` - Hard filters chosen by the member
    /// * `candidates` - Creators fetched from the profile directory
    /// * `exclude_ids` - Creators the member already has a record with
    /// * `now` - Reference time for activity windows
    /// * `rng` - Randomness source; seed it to reproduce an ordering
    pub fn build_stack<R: Rng + ?Sized>(
        &self,
        member: &MemberProfile,
        filters: &BrowseFilters,
        candidates: Vec<CreatorProfile>,
        exclude_ids: &HashSet<String>,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> BrowseStack {
        let total_candidates = candidates.len();

        // Stage 1: eligibility
        let eligible: Vec<CreatorProfile> = candidates
            .into_iter()
            .filter(|creator| creator.creator_id != member.member_id)
            .filter(|creator| is_eligible(creator, member, filters, exclude_ids))
            .take(self.params.candidate_limit)
            .collect();
        let eligible_candidates = eligible.len();

        // Stage 2: ranking score
        let mut ranked: Vec<(f64, CreatorProfile)> = eligible
            .into_iter()
            .map(|creator| (self.ranking_score(&creator, now, rng), creator))
            .collect();

        // Stage 3: sort by score (descending), ties by id for a stable order
        ranked.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.1.creator_id.cmp(&b.1.creator_id))
        });

        // Stage 4: weighted shuffle
        let mut shuffled = weighted_shuffle(
            ranked,
            self.params.top_pick_probability,
            self.params.shuffle_window,
            rng,
        );
        shuffled.truncate(self.params.stack_size);

        // Stage 5: compatibility annotation
        let online_window = Duration::minutes(self.params.active_window_mins);
        let creators = shuffled
            .into_iter()
            .map(|(rank_score, creator)| {
                let compat = compatibility(member, &creator);
                let success_prediction = connection_success_prediction(member, &creator, now, rng);
                let is_online = creator.active_within(now, online_window);
                let is_verified = creator.verified();
                ScoredCreator {
                    shared_interests: shared_interests(member, &creator),
                    creator_id: creator.creator_id,
                    display_name: creator.display_name,
                    rank_score,
                    compatibility: compat,
                    success_prediction,
                    is_verified,
                    is_online,
                }
            })
            .collect();

        BrowseStack {
            creators,
            total_candidates,
            eligible_candidates,
        }
    }
}

impl Default for DiscoveryRanker {
    fn default() -> Self {
        Self::with_default_params()
    }
}

/// Pop the head with probability `top_pick_probability`, otherwise a uniform
/// pick among the first `window` remaining items, until the input is drained.
pub fn weighted_shuffle<T, R: Rng + ?Sized>(
    mut items: Vec<T>,
    top_pick_probability: f64,
    window: usize,
    rng: &mut R,
) -> Vec<T> {
    let mut out = Vec::with_capacity(items.len());
    let probability = top_pick_probability.clamp(0.0, 1.0);

    while !items.is_empty() {
        let index = if rng.gen_bool(probability) {
            0
        } else {
            rng.gen_range(0..items.len().min(window.max(1)))
        };
        out.push(items.remove(index));
    }

    out
}
