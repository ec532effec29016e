// ============================================
// src/i18n.rs
// 画面の文言 (ベトナム語 / 英語)
// ============================================

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Vi,
    En,
}

impl Locale {
    pub fn toggle(self) -> Self {
        match self {
            Locale::Vi => Locale::En,
            Locale::En => Locale::Vi,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Locale::Vi => "vi",
            Locale::En => "en",
        }
    }
}

/// 文言のキー
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Text {
    Title,
    Matching,
    Attempts,
    Correct,
    Incorrect,
    GameComplete,
    YouMatched,
    PairsIn,
    NextRandom,
    Controls,
    Level,
    LevelUp,
    Guest,
    NewAchievement,
    ChooseTopic,
    Words,
    StudyModes,
    RandomQuiz,
    WordScramble,
    Statistics,
    CorrectAnswer,
    Hint,
    TodayProgress,
    WeeklyProgress,
    Streak,
    Best,
    Days,
    MinutesStudied,
    Accuracy,
    WordsLearned,
    RoundsPlayed,
    PracticeSessions,
    Achievements,
    MenuControls,
    QuizControls,
    ScrambleControls,
    StatsControls,
    FirstRound,
    PerfectRound,
    WeekStreak,
    VocabularyMaster,
    SpeedLearner,
    MatchMaster,
}

impl Locale {
    /// 静的な対応表から文言を引く
    pub fn text(self, key: Text) -> &'static str {
        use Text::*;
        match self {
            Locale::Vi => match key {
                Title => "Ghép từ vựng",
                Matching => "Ghép từ",
                Attempts => "Lần thử",
                Correct => "Chính xác!",
                Incorrect => "Chưa chính xác",
                GameComplete => "Hoàn thành!",
                YouMatched => "Bạn đã ghép đúng",
                PairsIn => "cặp từ trong",
                NextRandom => "Tiếp theo",
                Controls => "←↑↓→ di chuyển · Enter chọn · n ván mới · m chế độ · l ngôn ngữ · Esc thoát",
                Level => "Cấp",
                LevelUp => "Lên cấp!",
                Guest => "Khách",
                NewAchievement => "Thành tích mới",
                ChooseTopic => "Chọn chủ đề",
                Words => "từ",
                StudyModes => "Chế độ học",
                RandomQuiz => "Quiz ngẫu nhiên",
                WordScramble => "Sắp xếp từ ngẫu nhiên",
                Statistics => "Thống kê",
                CorrectAnswer => "Đáp án đúng",
                Hint => "Gợi ý",
                TodayProgress => "Tiến độ hôm nay",
                WeeklyProgress => "Tiến độ tuần",
                Streak => "Chuỗi ngày học",
                Best => "Kỷ lục",
                Days => "ngày",
                MinutesStudied => "phút học",
                Accuracy => "Độ chính xác",
                WordsLearned => "Từ đã học",
                RoundsPlayed => "Số lượt đã chơi",
                PracticeSessions => "Bài luyện tập",
                Achievements => "Thành tích",
                MenuControls => "↑↓ chọn · Enter bắt đầu · s thống kê · l ngôn ngữ · q thoát",
                QuizControls => "A-D trả lời · Enter tiếp · n bộ mới · m chế độ · q thoát",
                ScrambleControls => "Gõ từ · Enter kiểm tra · Backspace xóa · Esc chế độ",
                StatsControls => "Enter / m quay lại · l ngôn ngữ · q thoát",
                FirstRound => "Ván đầu tiên",
                PerfectRound => "Điểm tuyệt đối",
                WeekStreak => "Chuỗi 7 ngày",
                VocabularyMaster => "Bậc thầy từ vựng",
                SpeedLearner => "Học nhanh",
                MatchMaster => "Bậc thầy ghép từ",
            },
            Locale::En => match key {
                Title => "Vocabulary Match",
                Matching => "Matching",
                Attempts => "Attempts",
                Correct => "Correct!",
                Incorrect => "Incorrect",
                GameComplete => "Complete!",
                YouMatched => "You matched",
                PairsIn => "pairs in",
                NextRandom => "Next",
                Controls => "←↑↓→ move · Enter select · n new round · m modes · l language · Esc quit",
                Level => "Lv",
                LevelUp => "Level up!",
                Guest => "Guest",
                NewAchievement => "New achievement",
                ChooseTopic => "Choose a topic",
                Words => "words",
                StudyModes => "Study Modes",
                RandomQuiz => "Random Quiz",
                WordScramble => "Random Word Scramble",
                Statistics => "Statistics",
                CorrectAnswer => "Correct Answer",
                Hint => "Hint",
                TodayProgress => "Today's Progress",
                WeeklyProgress => "Weekly Progress",
                Streak => "Study Streak",
                Best => "Best",
                Days => "days",
                MinutesStudied => "min studied",
                Accuracy => "Accuracy",
                WordsLearned => "Words Learned",
                RoundsPlayed => "Rounds Played",
                PracticeSessions => "Practice Sessions",
                Achievements => "Achievements",
                MenuControls => "↑↓ choose · Enter start · s statistics · l language · q quit",
                QuizControls => "A-D answer · Enter next · n new set · m modes · q quit",
                ScrambleControls => "Type the word · Enter check · Backspace delete · Esc modes",
                StatsControls => "Enter / m back · l language · q quit",
                FirstRound => "First Round",
                PerfectRound => "Perfect Score",
                WeekStreak => "Week Streak",
                VocabularyMaster => "Vocabulary Master",
                SpeedLearner => "Speed Learner",
                MatchMaster => "Match Master",
            },
        }
    }
}
