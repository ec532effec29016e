// ============================================
// src/stats.rs
// 学習の統計 (日ごとの集計、連続日数)
// ============================================

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};

use crate::mode::StudyMode;
use crate::save_data::PlayerData;

/// 統計画面に出す数値
#[derive(Debug, Clone, PartialEq)]
pub struct Statistics {
    pub today_words: u32,
    pub today_minutes: u32,
    pub weekly_words: u32,
    pub weekly_minutes: u32,
    pub current_streak: u32,
    pub best_streak: u32,
    pub average_accuracy: f64,
    pub learned_words: usize,
    pub rounds_played: u32,
    /// クイズと並べ替えの回数
    pub practice_sessions: u32,
}

impl Statistics {
    /// `today` を含む直近7日間を「今週」とする
    pub fn collect(data: &PlayerData, today: NaiveDate) -> Self {
        let week_start = today - Duration::days(6);
        let (mut today_words, mut weekly_words) = (0, 0);
        let (mut today_secs, mut weekly_secs) = (0.0, 0.0);

        for record in &data.history {
            let day = record.timestamp.date_naive();
            if day == today {
                today_words += record.pairs;
                today_secs += record.duration_sec;
            }
            if (week_start..=today).contains(&day) {
                weekly_words += record.pairs;
                weekly_secs += record.duration_sec;
            }
        }

        Self {
            today_words,
            today_minutes: (today_secs / 60.0) as u32,
            weekly_words,
            weekly_minutes: (weekly_secs / 60.0) as u32,
            current_streak: current_streak(data, today),
            best_streak: longest_daily_streak(data),
            average_accuracy: data.progress().average_score,
            learned_words: data.learned_words.len(),
            rounds_played: data.rounds_played,
            practice_sessions: data
                .history
                .iter()
                .filter(|r| r.mode != StudyMode::Matching)
                .count() as u32,
        }
    }
}

/// 日付ごとに揃えたペア数
pub fn pairs_per_day(data: &PlayerData) -> BTreeMap<NaiveDate, u32> {
    let mut days = BTreeMap::new();
    for record in &data.history {
        *days.entry(record.timestamp.date_naive()).or_insert(0) += record.pairs;
    }
    days
}

pub fn best_day_pairs(data: &PlayerData) -> u32 {
    pairs_per_day(data).into_values().max().unwrap_or(0)
}

/// 連続してプレイした日数の最大
pub fn longest_daily_streak(data: &PlayerData) -> u32 {
    let mut best = 0;
    let mut run = 0;
    let mut prev: Option<NaiveDate> = None;
    for day in pairs_per_day(data).into_keys() {
        run = match prev {
            Some(p) if day - p == Duration::days(1) => run + 1,
            _ => 1,
        };
        best = best.max(run);
        prev = Some(day);
    }
    best
}

/// 今日 (まだなら昨日) まで続いている連続日数
pub fn current_streak(data: &PlayerData, today: NaiveDate) -> u32 {
    let days = pairs_per_day(data);
    let mut day = if days.contains_key(&today) {
        today
    } else {
        today - Duration::days(1)
    };
    let mut run = 0;
    while days.contains_key(&day) {
        run += 1;
        day -= Duration::days(1);
    }
    run
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::save_data::RoundRecord;
    use chrono::{TimeZone, Utc};

    fn record_on(day: u32, pairs: u32, secs: f64) -> RoundRecord {
        let ts = Utc.with_ymd_and_hms(2026, 3, day, 9, 0, 0).unwrap();
        RoundRecord::at(ts, "Gia đình", pairs, pairs, secs)
    }

    fn march(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
    }

    #[test]
    fn empty_history() {
        let stats = Statistics::collect(&PlayerData::default(), march(10));
        assert_eq!(stats.today_words, 0);
        assert_eq!(stats.current_streak, 0);
        assert_eq!(stats.best_streak, 0);
        assert_eq!(stats.practice_sessions, 0);
    }

    #[test]
    fn today_and_week_totals() {
        let mut data = PlayerData::default();
        data.record_round(record_on(1, 6, 600.0), &[]);
        data.record_round(record_on(8, 4, 120.0), &[]);
        data.record_round(record_on(10, 3, 90.0), &[]);
        data.record_round(record_on(10, 2, 60.0).with_mode(StudyMode::Quiz), &[]);

        let stats = Statistics::collect(&data, march(10));
        assert_eq!(stats.today_words, 5);
        assert_eq!(stats.today_minutes, 2);
        // 3/1 は7日より前
        assert_eq!(stats.weekly_words, 9);
        assert_eq!(stats.weekly_minutes, 4);
        assert_eq!(stats.rounds_played, 4);
        assert_eq!(stats.practice_sessions, 1);
    }

    #[test]
    fn streak_survives_until_today_is_played() {
        let mut data = PlayerData::default();
        for day in [2, 3, 5, 6, 7] {
            data.record_round(record_on(day, 2, 30.0), &[]);
        }
        assert_eq!(current_streak(&data, march(7)), 3);
        assert_eq!(current_streak(&data, march(8)), 3);
        assert_eq!(current_streak(&data, march(9)), 0);
        assert_eq!(longest_daily_streak(&data), 3);
        assert_eq!(best_day_pairs(&data), 2);
    }
}
