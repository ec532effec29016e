// ============================================
// src/achievements.rs
// 実績 (バッジ)
// ============================================

use crate::i18n::{Locale, Text};
use crate::save_data::PlayerData;
use crate::stats::{best_day_pairs, longest_daily_streak};

/// 実績の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Achievement {
    FirstRound,
    PerfectRound,
    WeekStreak,
    VocabularyMaster,
    SpeedLearner,
    MatchMaster,
}

/// 表示側が絵文字や色に変換するアイコンのキー
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IconKey {
    Trophy,
    Star,
    Target,
    Award,
    Zap,
    Medal,
}

pub const ALL_ACHIEVEMENTS: [Achievement; 6] = [
    Achievement::FirstRound,
    Achievement::PerfectRound,
    Achievement::WeekStreak,
    Achievement::VocabularyMaster,
    Achievement::SpeedLearner,
    Achievement::MatchMaster,
];

impl Achievement {
    pub fn icon(self) -> IconKey {
        match self {
            Achievement::FirstRound => IconKey::Trophy,
            Achievement::PerfectRound => IconKey::Star,
            Achievement::WeekStreak => IconKey::Target,
            Achievement::VocabularyMaster => IconKey::Award,
            Achievement::SpeedLearner => IconKey::Zap,
            Achievement::MatchMaster => IconKey::Medal,
        }
    }

    pub fn name(self, locale: Locale) -> &'static str {
        let key = match self {
            Achievement::FirstRound => Text::FirstRound,
            Achievement::PerfectRound => Text::PerfectRound,
            Achievement::WeekStreak => Text::WeekStreak,
            Achievement::VocabularyMaster => Text::VocabularyMaster,
            Achievement::SpeedLearner => Text::SpeedLearner,
            Achievement::MatchMaster => Text::MatchMaster,
        };
        locale.text(key)
    }

    /// 達成に必要な値
    pub fn target(self) -> u32 {
        match self {
            Achievement::FirstRound => 1,
            Achievement::PerfectRound => 1,
            Achievement::WeekStreak => 7,
            Achievement::VocabularyMaster => 500,
            Achievement::SpeedLearner => 50,
            Achievement::MatchMaster => 100,
        }
    }

    /// 現在の進み具合 (target で頭打ち)
    pub fn progress(self, data: &PlayerData) -> u32 {
        let current = match self {
            Achievement::FirstRound | Achievement::MatchMaster => data.rounds_played,
            Achievement::PerfectRound => data.history.iter().any(|r| r.is_perfect()) as u32,
            Achievement::WeekStreak => longest_daily_streak(data),
            Achievement::VocabularyMaster => data.learned_words.len() as u32,
            Achievement::SpeedLearner => best_day_pairs(data),
        };
        current.min(self.target())
    }

    pub fn is_unlocked(self, data: &PlayerData) -> bool {
        self.progress(data) >= self.target()
    }
}

/// 達成済みの実績一覧
pub fn unlocked(data: &PlayerData) -> Vec<Achievement> {
    ALL_ACHIEVEMENTS
        .iter()
        .copied()
        .filter(|a| a.is_unlocked(data))
        .collect()
}

/// `before` になかった実績
pub fn newly_unlocked(before: &[Achievement], data: &PlayerData) -> Vec<Achievement> {
    unlocked(data)
        .into_iter()
        .filter(|a| !before.contains(a))
        .collect()
}
