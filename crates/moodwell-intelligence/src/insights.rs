// ABOUTME: Rule-based dashboard insights derived from lifetime, weekly, and daily mood counters
// ABOUTME: Evaluates welcome, weekly, positive, consistency, growth, support, and milestone rules in order
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Moodwell Contributors

//! Insight generation for the mood dashboard

use moodwell_core::constants::insights::{
    CONSISTENCY_MIN_ACTIVE_DAYS, MAX_INSIGHTS, MILESTONES, SUPPORT_MIN_TOTAL, WEEK_LEN,
};
use moodwell_core::models::{DailyMoodCounter, MoodCounts};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A transient observation shown on the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    /// Which rule produced the insight
    #[serde(rename = "type")]
    pub kind: InsightKind,
    /// Short headline
    pub title: String,
    /// Body text
    pub message: String,
    /// Icon hint for the client (Bootstrap icon name)
    pub icon: String,
}

/// Insight rules, in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    /// First visit, no conversations yet
    Welcome,
    /// Dominant mood over the trailing week
    Weekly,
    /// Lifetime positive outweighs negative
    Positive,
    /// Active on most of the recent days
    Consistency,
    /// More positive conversations recently than at the start
    Growth,
    /// Lifetime negative outweighs positive
    Support,
    /// Lifetime conversation count hit a threshold
    Milestone,
}

/// Inputs to the insight rules
#[derive(Debug, Clone, Copy)]
pub struct InsightInput<'a> {
    /// Tallies over every counter the user has
    pub lifetime: MoodCounts,
    /// Tallies over the trailing seven days
    pub weekly: MoodCounts,
    /// Daily counters, newest first
    pub counters: &'a [DailyMoodCounter],
}

/// Configuration for insight generation
#[derive(Debug, Clone)]
pub struct InsightConfig {
    /// Maximum number of insights returned
    pub max_insights: usize,
    /// Counters examined by the consistency and growth rules
    pub window_len: usize,
    /// Active counters required in the recent window for consistency
    pub consistency_min_active: usize,
    /// Lifetime total required before offering support
    pub support_min_total: i64,
    /// Lifetime totals that count as milestones, ascending
    pub milestones: Vec<i64>,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            max_insights: MAX_INSIGHTS,
            window_len: WEEK_LEN,
            consistency_min_active: CONSISTENCY_MIN_ACTIVE_DAYS,
            support_min_total: SUPPORT_MIN_TOTAL,
            milestones: MILESTONES.to_vec(),
        }
    }
}

/// Produces the prioritized insight list for one user
#[derive(Debug, Clone, Default)]
pub struct InsightGenerator {
    config: InsightConfig,
}

impl InsightGenerator {
    /// Create a generator with default rules
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a generator with custom configuration
    #[must_use]
    pub const fn with_config(config: InsightConfig) -> Self {
        Self { config }
    }

    /// Evaluate every rule in priority order and keep the first `max_insights`
    #[must_use]
    pub fn generate(&self, input: &InsightInput<'_>) -> Vec<Insight> {
        if input.lifetime.total == 0 {
            return vec![welcome()];
        }

        let mut insights: Vec<Insight> = [
            Self::weekly(input),
            Self::positive(input),
            self.consistency(input),
            self.growth(input),
            self.support(input),
            self.milestone(input),
        ]
        .into_iter()
        .flatten()
        .collect();

        insights.truncate(self.config.max_insights);
        debug!(
            count = insights.len(),
            lifetime_total = input.lifetime.total,
            "Generated mood insights"
        );
        insights
    }

    fn weekly(input: &InsightInput<'_>) -> Option<Insight> {
        let weekly = input.weekly;
        (weekly.total > 0).then(|| Insight {
            kind: InsightKind::Weekly,
            title: "This Week's Mood Trend".to_owned(),
            message: format!(
                "You've been mostly {} this week with {} conversations. Keep up the great work on self-reflection!",
                weekly.dominant(),
                weekly.total
            ),
            icon: "bi-calendar-week".to_owned(),
        })
    }

    fn positive(input: &InsightInput<'_>) -> Option<Insight> {
        let lifetime = input.lifetime;
        (lifetime.positive > lifetime.negative).then(|| {
            let pct = (lifetime.positive as f64 / lifetime.total as f64 * 100.0).round_ties_even();
            Insight {
                kind: InsightKind::Positive,
                title: "Positive Outlook! 😊".to_owned(),
                message: format!(
                    "Great news! {pct:.0}% of your conversations have been positive. You're doing amazing!"
                ),
                icon: "bi-emoji-smile".to_owned(),
            }
        })
    }

    fn consistency(&self, input: &InsightInput<'_>) -> Option<Insight> {
        let window = self.config.window_len;
        if input.counters.len() < window {
            return None;
        }

        let active_days = input.counters[..window]
            .iter()
            .filter(|c| c.counts.total > 0)
            .count();

        (active_days >= self.config.consistency_min_active).then(|| Insight {
            kind: InsightKind::Consistency,
            title: "Consistency Champion! 🏆".to_owned(),
            message: format!(
                "You've been active {active_days} out of the last {window} days. Regular check-ins are key to mental wellness!"
            ),
            icon: "bi-trophy".to_owned(),
        })
    }

    fn growth(&self, input: &InsightInput<'_>) -> Option<Insight> {
        let window = self.config.window_len;
        let counters = input.counters;
        if counters.len() < window * 2 {
            return None;
        }

        // Newest first: the head is the latest week, the tail is the earliest.
        let latest: i64 = counters[..window].iter().map(|c| c.counts.positive).sum();
        let earliest: i64 = counters[counters.len() - window..]
            .iter()
            .map(|c| c.counts.positive)
            .sum();

        (latest > earliest).then(|| Insight {
            kind: InsightKind::Growth,
            title: "Positive Growth! 📈".to_owned(),
            message: "Your positive conversations have increased compared to earlier. You're making great progress!".to_owned(),
            icon: "bi-graph-up-arrow".to_owned(),
        })
    }

    fn support(&self, input: &InsightInput<'_>) -> Option<Insight> {
        let lifetime = input.lifetime;
        (lifetime.negative > lifetime.positive && lifetime.total >= self.config.support_min_total)
            .then(|| Insight {
                kind: InsightKind::Support,
                title: "We're Here for You 💙".to_owned(),
                message: "It seems like you've been going through some challenges. Remember, it's okay to not be okay. Consider reaching out to a professional counselor for additional support.".to_owned(),
                icon: "bi-heart".to_owned(),
            })
    }

    fn milestone(&self, input: &InsightInput<'_>) -> Option<Insight> {
        self.config
            .milestones
            .iter()
            .find(|&&m| input.lifetime.total == m)
            .map(|milestone| Insight {
                kind: InsightKind::Milestone,
                title: "Milestone Achieved! 🎉".to_owned(),
                message: format!(
                    "Congratulations! You've had {milestone} conversations with Moodwell. Your commitment to mental health is inspiring!"
                ),
                icon: "bi-award".to_owned(),
            })
    }
}

fn welcome() -> Insight {
    Insight {
        kind: InsightKind::Welcome,
        title: "Welcome to Moodwell! 🌟".to_owned(),
        message: "Start your mental health journey by having your first conversation with Moodwell."
            .to_owned(),
        icon: "bi-chat-heart".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    /// Build newest-first counters from chronological (positive, negative, neutral) tuples
    fn counters(chronological: &[(i64, i64, i64)]) -> Vec<DailyMoodCounter> {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let mut rows: Vec<DailyMoodCounter> = chronological
            .iter()
            .enumerate()
            .map(|(i, &(p, n, u))| DailyMoodCounter {
                user_id: "user-1".to_owned(),
                date: start + Duration::days(i64::try_from(i).unwrap()),
                counts: MoodCounts::new(p, n, u),
            })
            .collect();
        rows.reverse();
        rows
    }

    fn kinds(insights: &[Insight]) -> Vec<InsightKind> {
        insights.iter().map(|i| i.kind).collect()
    }

    #[test]
    fn test_welcome_is_returned_alone() {
        let rows = counters(&[(0, 0, 0); 20]);
        let input = InsightInput {
            lifetime: MoodCounts::default(),
            weekly: MoodCounts::new(3, 0, 0),
            counters: &rows,
        };

        let insights = InsightGenerator::new().generate(&input);
        assert_eq!(kinds(&insights), vec![InsightKind::Welcome]);
    }

    #[test]
    fn test_milestone_mentions_threshold() {
        // 25 neutral conversations, none this week: only the milestone fires
        let input = InsightInput {
            lifetime: MoodCounts::new(0, 0, 25),
            weekly: MoodCounts::default(),
            counters: &[],
        };

        let insights = InsightGenerator::new().generate(&input);
        assert_eq!(kinds(&insights), vec![InsightKind::Milestone]);
        assert!(insights[0].message.contains("25"));
        assert_eq!(insights[0].icon, "bi-award");
    }

    #[test]
    fn test_cap_keeps_rule_order() {
        // Weekly, positive, consistency, growth and milestone all qualify
        let mut days = vec![(0, 0, 0); 7];
        days.extend(vec![(1, 0, 0); 3]);
        days.extend(vec![(0, 0, 0); 1]);
        days.extend(vec![(1, 0, 0); 6]);
        let rows = counters(&days);

        // Lifetime includes older history outside the counters; 10 also hits a milestone
        let input = InsightInput {
            lifetime: MoodCounts::new(10, 0, 0),
            weekly: MoodCounts::new(6, 0, 0),
            counters: &rows,
        };

        let insights = InsightGenerator::new().generate(&input);
        assert_eq!(insights.len(), 4);
        assert_eq!(
            kinds(&insights),
            vec![
                InsightKind::Weekly,
                InsightKind::Positive,
                InsightKind::Consistency,
                InsightKind::Growth,
            ]
        );
    }

    #[test]
    fn test_growth_compares_latest_week_to_earliest_week() {
        // Chronological: quiet first week, positive last week
        let mut days = vec![(0, 1, 0); 7];
        days.extend(vec![(2, 0, 0); 7]);
        let rows = counters(&days);
        let input = InsightInput {
            lifetime: rows.iter().map(|c| c.counts).sum(),
            weekly: MoodCounts::new(14, 0, 0),
            counters: &rows,
        };
        let insights = InsightGenerator::new().generate(&input);
        assert!(kinds(&insights).contains(&InsightKind::Growth));

        // Reversed history: positive early, quiet lately. No growth.
        let mut days = vec![(2, 0, 0); 7];
        days.extend(vec![(0, 1, 0); 7]);
        let rows = counters(&days);
        let input = InsightInput {
            lifetime: rows.iter().map(|c| c.counts).sum(),
            weekly: MoodCounts::new(0, 7, 0),
            counters: &rows,
        };
        let insights = InsightGenerator::new().generate(&input);
        assert!(!kinds(&insights).contains(&InsightKind::Growth));
    }

    #[test]
    fn test_consistency_counts_recent_active_days() {
        // Chronological: 4 idle days, then 3 idle + 4 active among the latest 7
        let mut days = vec![(0, 0, 1); 4];
        days.extend(vec![(0, 0, 0); 3]);
        days.extend(vec![(0, 0, 1); 4]);
        let rows = counters(&days);
        let input = InsightInput {
            lifetime: MoodCounts::new(0, 0, 8),
            weekly: MoodCounts::new(0, 0, 4),
            counters: &rows,
        };
        let insights = InsightGenerator::new().generate(&input);
        assert!(!kinds(&insights).contains(&InsightKind::Consistency));

        let mut days = vec![(0, 0, 0); 2];
        days.extend(vec![(0, 0, 1); 5]);
        let rows = counters(&days);
        let input = InsightInput {
            lifetime: MoodCounts::new(0, 0, 5),
            weekly: MoodCounts::new(0, 0, 5),
            counters: &rows,
        };
        let insights = InsightGenerator::new().generate(&input);
        let consistency = insights
            .iter()
            .find(|i| i.kind == InsightKind::Consistency)
            .unwrap();
        assert!(consistency.message.contains("active 5 out of the last 7 days"));
    }

    #[test]
    fn test_weekly_names_dominant_mood() {
        let input = InsightInput {
            lifetime: MoodCounts::new(2, 3, 3),
            weekly: MoodCounts::new(2, 3, 3),
            counters: &[],
        };
        let insights = InsightGenerator::new().generate(&input);
        assert_eq!(insights[0].kind, InsightKind::Weekly);
        assert!(insights[0].message.contains("mostly negative this week with 8 conversations"));
        assert!(kinds(&insights).contains(&InsightKind::Support));
    }

    #[test]
    fn test_positive_percentage_rounds_half_to_even() {
        // 5 of 8 positive = 62.5% -> 62
        let input = InsightInput {
            lifetime: MoodCounts::new(5, 1, 2),
            weekly: MoodCounts::default(),
            counters: &[],
        };
        let insights = InsightGenerator::new().generate(&input);
        assert_eq!(kinds(&insights), vec![InsightKind::Positive]);
        assert!(insights[0].message.starts_with("Great news! 62% "));
    }

    #[test]
    fn test_support_requires_minimum_history() {
        let input = InsightInput {
            lifetime: MoodCounts::new(0, 4, 0),
            weekly: MoodCounts::default(),
            counters: &[],
        };
        assert!(InsightGenerator::new().generate(&input).is_empty());
    }

    #[test]
    fn test_insight_serializes_kind_as_type() {
        let json = serde_json::to_value(welcome()).unwrap();
        assert_eq!(json["type"], "welcome");
        assert_eq!(json["icon"], "bi-chat-heart");
    }
}
