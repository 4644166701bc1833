// ABOUTME: Dashboard read model combining mood counters, recent conversations, and insights
// ABOUTME: Produces the 30-day chart, weekly and lifetime totals, percentages, and days tracked
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Moodwell Contributors

use chrono::{Duration, NaiveDate};
use moodwell_core::constants::dashboard::{
    CHART_WINDOW_DAYS, RECENT_CONVERSATIONS, WEEKLY_WINDOW_DAYS,
};
use moodwell_core::models::{ConversationRecord, MoodCounts, SentimentLabel};
use moodwell_intelligence::{Insight, InsightGenerator, InsightInput};
use serde::Serialize;
use tracing::debug;

use crate::database::Database;
use crate::errors::AppResult;

/// One day on the mood chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartPoint {
    /// Calendar day, `YYYY-MM-DD`
    pub date: String,
    /// Positive messages that day
    pub positive: i64,
    /// Negative messages that day
    pub negative: i64,
    /// Neutral messages that day
    pub neutral: i64,
    /// All messages that day
    pub total: i64,
}

/// Share of each label over the chart window, one decimal place
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MoodPercentages {
    /// Positive share
    pub positive: f64,
    /// Negative share
    pub negative: f64,
    /// Neutral share
    pub neutral: f64,
}

impl MoodPercentages {
    fn from_counts(counts: &MoodCounts) -> Self {
        Self {
            positive: counts.percentage(SentimentLabel::Positive),
            negative: counts.percentage(SentimentLabel::Negative),
            neutral: counts.percentage(SentimentLabel::Neutral),
        }
    }
}

/// Everything the dashboard shows
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    /// Daily counters in the chart window, oldest first
    pub chart_data: Vec<ChartPoint>,
    /// Totals over the chart window
    pub total_stats: MoodCounts,
    /// Totals over the trailing week
    pub weekly_stats: MoodCounts,
    /// Totals over every day on record
    pub lifetime_stats: MoodCounts,
    /// Label shares over the chart window
    pub mood_percentages: MoodPercentages,
    /// Most recent conversations, newest first
    pub recent_chats: Vec<ConversationRecord>,
    /// Prioritised insights
    pub insights: Vec<Insight>,
    /// Days with activity inside the chart window
    pub days_tracked: usize,
}

/// Build the dashboard for `user_id` as of `today`.
///
/// The chart covers `today - 30` through `today` inclusive. The weekly summary covers
/// every day from `today - 7` on.
///
/// # Errors
///
/// Returns database errors from any of the reads
pub async fn build_dashboard(
    database: &Database,
    generator: &InsightGenerator,
    user_id: &str,
    today: NaiveDate,
) -> AppResult<DashboardView> {
    let moods = database.moods();
    let chart_start = today - Duration::days(CHART_WINDOW_DAYS);
    let week_start = today - Duration::days(WEEKLY_WINDOW_DAYS);

    let window = moods.range(user_id, chart_start, today).await?;
    let weekly_stats = moods.totals_since(user_id, week_start).await?;
    let lifetime_stats = moods.lifetime_totals(user_id).await?;
    let history = moods.all_newest_first(user_id).await?;
    let recent_chats = database
        .conversations()
        .recent(user_id, RECENT_CONVERSATIONS)
        .await?;

    let total_stats: MoodCounts = window.iter().map(|counter| counter.counts).sum();
    let chart_data: Vec<ChartPoint> = window
        .iter()
        .map(|counter| ChartPoint {
            date: counter.date.format("%Y-%m-%d").to_string(),
            positive: counter.counts.positive,
            negative: counter.counts.negative,
            neutral: counter.counts.neutral,
            total: counter.counts.total,
        })
        .collect();

    let insights = generator.generate(&InsightInput {
        lifetime: lifetime_stats,
        weekly: weekly_stats,
        counters: &history,
    });

    debug!(
        user.id = %user_id,
        days = chart_data.len(),
        insights = insights.len(),
        "Built dashboard"
    );

    Ok(DashboardView {
        days_tracked: chart_data.len(),
        mood_percentages: MoodPercentages::from_counts(&total_stats),
        chart_data,
        total_stats,
        weekly_stats,
        lifetime_stats,
        recent_chats,
        insights,
    })
}
