// ============================================
// src/practice.rs
// クイズ (4択) と並べ替えの練習問題
// ============================================

use std::collections::HashSet;

use log::{debug, info};
use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};

use crate::error::RoundError;
use crate::pairs::Pair;

/// 選択肢の数 (正解 + 3つの誤答)
pub const OPTION_COUNT: usize = 4;
pub const OPTION_LABELS: [char; OPTION_COUNT] = ['A', 'B', 'C', 'D'];

/// 1問分の練習問題
pub trait Exercise {
    /// 正解した単語 (学習済みとして記録される)
    fn word(&self) -> &str;
}

// --------------------------------------------------
// クイズ
// --------------------------------------------------

/// 単語を見て意味を選ぶ問題
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizQuestion {
    pub word: String,
    pub options: Vec<String>,
    /// `options` のうち正解の位置
    pub answer: usize,
}

impl QuizQuestion {
    /// 誤答は同じトピックの別の意味から選ぶ
    pub fn build<R: Rng + ?Sized>(pair: &Pair, pool: &[Pair], rng: &mut R) -> Self {
        let mut distractors: Vec<&str> = pool
            .iter()
            .filter(|p| p.id != pair.id && p.meaning != pair.meaning)
            .map(|p| p.meaning.as_str())
            .collect();
        distractors.sort_unstable();
        distractors.dedup();

        let mut options: Vec<String> = distractors
            .choose_multiple(rng, OPTION_COUNT - 1)
            .map(|m| m.to_string())
            .collect();
        options.push(pair.meaning.clone());
        options.shuffle(rng);
        let answer = options.iter().position(|o| *o == pair.meaning).unwrap_or(0);

        Self {
            word: pair.word.clone(),
            options,
            answer,
        }
    }

    pub fn is_correct(&self, choice: usize) -> bool {
        choice == self.answer
    }

    pub fn correct_option(&self) -> &str {
        &self.options[self.answer]
    }
}

impl Exercise for QuizQuestion {
    fn word(&self) -> &str {
        &self.word
    }
}

// --------------------------------------------------
// 並べ替え
// --------------------------------------------------

/// 文字がばらばらになった単語を元に戻す問題
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrambleItem {
    pub word: String,
    /// ヒントとして出す意味
    pub meaning: String,
    pub scrambled: String,
}

impl ScrambleItem {
    pub fn build<R: Rng + ?Sized>(pair: &Pair, rng: &mut R) -> Self {
        let letters: Vec<char> = pair.word.chars().collect();
        let mut shuffled = letters.clone();
        // 全部同じ文字なら並べ替えようがない
        let distinct: HashSet<&char> = letters.iter().collect();
        if distinct.len() > 1 {
            while shuffled == letters {
                shuffled.shuffle(rng);
            }
        }

        Self {
            word: pair.word.clone(),
            meaning: pair.meaning.clone(),
            scrambled: shuffled.into_iter().collect(),
        }
    }

    /// 前後の空白と大文字小文字は無視する
    pub fn is_correct(&self, guess: &str) -> bool {
        guess.trim().to_lowercase() == self.word.trim().to_lowercase()
    }
}

impl Exercise for ScrambleItem {
    fn word(&self) -> &str {
        &self.word
    }
}

// --------------------------------------------------
// 問題の進行
// --------------------------------------------------

/// 問題を1問ずつ出し、正解数を数える
#[derive(Debug, Clone)]
pub struct Drill<E> {
    items: Vec<E>,
    current: usize,
    /// 今の問題の結果 (未回答なら None)
    outcome: Option<bool>,
    answered: u32,
    correct_words: Vec<String>,
}

impl<E: Exercise> Drill<E> {
    pub fn new(items: Vec<E>) -> Result<Self, RoundError> {
        if items.is_empty() {
            return Err(RoundError::EmptyRound);
        }
        Ok(Self {
            items,
            current: 0,
            outcome: None,
            answered: 0,
            correct_words: Vec::new(),
        })
    }

    pub fn current(&self) -> Option<&E> {
        self.items.get(self.current)
    }

    /// 今の問題の番号 (0始まり)
    pub fn position(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn outcome(&self) -> Option<bool> {
        self.outcome
    }

    pub fn answered(&self) -> u32 {
        self.answered
    }

    pub fn correct(&self) -> u32 {
        self.correct_words.len() as u32
    }

    pub fn correct_words(&self) -> &[String] {
        &self.correct_words
    }

    pub fn is_finished(&self) -> bool {
        self.answered as usize >= self.items.len()
    }

    /// 今の問題に答える。回答済みなら何もしない
    pub fn answer(&mut self, check: impl FnOnce(&E) -> bool) -> Option<bool> {
        if self.outcome.is_some() {
            return None;
        }
        let item = self.items.get(self.current)?;
        let correct = check(item);
        if correct {
            self.correct_words.push(item.word().to_string());
        }
        self.outcome = Some(correct);
        self.answered += 1;
        debug!(
            "Question {}/{}: {}",
            self.current + 1,
            self.items.len(),
            if correct { "correct" } else { "wrong" }
        );
        Some(correct)
    }

    /// 回答済みなら次の問題へ。最後の問題の後は進まない
    pub fn advance(&mut self) -> bool {
        if self.outcome.is_none() || self.current + 1 >= self.items.len() {
            return false;
        }
        self.current += 1;
        self.outcome = None;
        true
    }
}

/// ペアごとに4択問題を作る。誤答は `pool` から
pub fn quiz<R: Rng + ?Sized>(
    pairs: &[Pair],
    pool: &[Pair],
    rng: &mut R,
) -> Result<Drill<QuizQuestion>, RoundError> {
    let questions = pairs
        .iter()
        .map(|p| QuizQuestion::build(p, pool, &mut *rng))
        .collect();
    let drill = Drill::new(questions)?;
    info!("Quiz started with {} questions", drill.len());
    Ok(drill)
}

pub fn scramble<R: Rng + ?Sized>(pairs: &[Pair], rng: &mut R) -> Result<Drill<ScrambleItem>, RoundError> {
    let items = pairs.iter().map(|p| ScrambleItem::build(p, &mut *rng)).collect();
    let drill = Drill::new(items)?;
    info!("Scramble started with {} words", drill.len());
    Ok(drill)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pairs::builtin_topics;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn family() -> Vec<Pair> {
        builtin_topics().remove(0).pairs
    }

    fn pair(id: u32, word: &str, meaning: &str) -> Pair {
        Pair {
            id,
            word: word.to_string(),
            meaning: meaning.to_string(),
        }
    }

    #[test]
    fn quiz_question_has_one_correct_option() {
        let pool = family();
        let mut rng = StdRng::seed_from_u64(3);
        for p in &pool {
            let q = QuizQuestion::build(p, &pool, &mut rng);
            assert_eq!(q.options.len(), OPTION_COUNT);
            assert_eq!(q.correct_option(), p.meaning);
            assert_eq!(q.options.iter().filter(|o| **o == p.meaning).count(), 1);
            let unique: HashSet<&String> = q.options.iter().collect();
            assert_eq!(unique.len(), OPTION_COUNT);
        }
    }

    #[test]
    fn small_pool_gives_fewer_options() {
        let pool = vec![pair(1, "cat", "con mèo"), pair(2, "dog", "con chó")];
        let mut rng = StdRng::seed_from_u64(1);
        let q = QuizQuestion::build(&pool[0], &pool, &mut rng);
        assert_eq!(q.options.len(), 2);
        assert!(q.is_correct(q.answer));
        assert!(!q.is_correct((q.answer + 1) % 2));
    }

    #[test]
    fn scramble_differs_from_word() {
        let mut rng = StdRng::seed_from_u64(9);
        for p in family() {
            let item = ScrambleItem::build(&p, &mut rng);
            assert_ne!(item.scrambled, item.word);
            let mut a: Vec<char> = item.scrambled.chars().collect();
            let mut b: Vec<char> = item.word.chars().collect();
            a.sort_unstable();
            b.sort_unstable();
            assert_eq!(a, b);
        }
        // 並べ替えられない単語はそのまま
        let same = ScrambleItem::build(&pair(9, "aaa", "a"), &mut rng);
        assert_eq!(same.scrambled, "aaa");
    }

    #[test]
    fn scramble_answer_ignores_case_and_spaces() {
        let mut rng = StdRng::seed_from_u64(2);
        let item = ScrambleItem::build(&pair(1, "Hotel", "khách sạn"), &mut rng);
        assert!(item.is_correct(" hotel "));
        assert!(!item.is_correct("hote"));
    }

    #[test]
    fn drill_walks_through_questions() {
        let pairs = family()[..3].to_vec();
        let mut rng = StdRng::seed_from_u64(4);
        let mut drill = scramble(&pairs, &mut rng).unwrap();
        assert_eq!(drill.len(), 3);

        // 未回答では進めない
        assert!(!drill.advance());

        assert_eq!(drill.answer(|item| item.is_correct("father")), Some(true));
        assert_eq!(drill.answer(|_| false), None);
        assert!(drill.advance());

        assert_eq!(drill.answer(|item| item.is_correct("wrong")), Some(false));
        assert!(drill.advance());
        assert!(!drill.is_finished());

        assert_eq!(drill.answer(|item| item.is_correct("brother")), Some(true));
        assert!(drill.is_finished());
        assert!(!drill.advance());
        assert_eq!(drill.position(), 2);
        assert_eq!(drill.answered(), 3);
        assert_eq!(drill.correct(), 2);
        assert_eq!(drill.correct_words(), ["father".to_string(), "brother".to_string()]);
    }

    #[test]
    fn empty_drill_is_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(quiz(&[], &family(), &mut rng).unwrap_err(), RoundError::EmptyRound);
    }
}
