// ============================================
// src/matching.rs
// 単語と意味のカードを組み合わせるゲームの状態管理
// ============================================

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use log::{debug, info, trace};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::error::RoundError;
use crate::pairs::Pair;

// --------------------------------------------------
// データ構造
// --------------------------------------------------

/// カードの面 (単語側 / 意味側)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Face {
    Word,
    Meaning,
}

impl Face {
    pub fn as_str(self) -> &'static str {
        match self {
            Face::Word => "word",
            Face::Meaning => "meaning",
        }
    }
}

/// カードID。`(pair_id, face)` から決定的に作られる ("word-3", "meaning-3")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CardId(String);

impl CardId {
    pub fn new(pair_id: u32, face: Face) -> Self {
        Self(format!("{}-{}", face.as_str(), pair_id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 画面に並ぶ1枚のカード
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub id: CardId,
    pub text: String,
    pub face: Face,
    /// 元のペアへの参照 (読み取り専用)
    pub pair_id: u32,
    pub matched: bool,
}

impl Card {
    fn from_pair(pair: &Pair, face: Face) -> Self {
        let text = match face {
            Face::Word => pair.word.clone(),
            Face::Meaning => pair.meaning.clone(),
        };
        Self {
            id: CardId::new(pair.id, face),
            text,
            face,
            pair_id: pair.id,
            matched: false,
        }
    }
}

/// ラウンドごとに一意なID (古いラウンドの遅延処理を見分けるため)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoundId(u64);

static NEXT_ROUND_ID: AtomicU64 = AtomicU64::new(1);

impl RoundId {
    fn next() -> Self {
        Self(NEXT_ROUND_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// 2枚選んだときの判定結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Match,
    Mismatch,
}

/// ラウンドの段階
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// 0枚 または 1枚選択中
    Ready,
    /// 2枚選択済み、フィードバック表示中
    Evaluating(Verdict),
    /// 全ペア完成
    Complete,
}

/// 選択状態
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundState {
    pub selected_card_ids: Vec<CardId>,
    pub match_count: u32,
    pub attempt_count: u32,
}

/// フィードバックの表示時間
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// 正解の2枚を緑で見せてから `matched` にするまで
    pub match_confirm: Duration,
    /// 不正解の2枚を赤で見せてから選択を解除するまで
    pub mismatch_reset: Duration,
    /// 最後のペアが揃ってから完了通知まで
    pub completion: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            match_confirm: Duration::from_millis(500),
            mismatch_reset: Duration::from_millis(1000),
            completion: Duration::from_millis(1000),
        }
    }
}

impl Timing {
    /// 待ち時間なし (テストや `--instant` 用)
    pub fn instant() -> Self {
        Self {
            match_confirm: Duration::ZERO,
            mismatch_reset: Duration::ZERO,
            completion: Duration::ZERO,
        }
    }
}

/// 遅延して適用する処理の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    ConfirmMatch,
    ResetSelection,
    Complete,
}

/// 予約された遅延処理
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scheduled {
    pub round: RoundId,
    pub effect: Effect,
    pub due: Instant,
}

/// 描画用のスナップショット
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundSnapshot {
    pub cards: Vec<Card>,
    pub selected_card_ids: Vec<CardId>,
    pub match_count: u32,
    pub attempt_count: u32,
    pub pair_count: usize,
    pub is_complete: bool,
    pub feedback: Option<Verdict>,
}

/// 状態変化と完了の通知先
pub trait RoundObserver {
    fn on_change(&mut self, _snapshot: &RoundSnapshot) {}
    fn on_complete(&mut self) {}
}

// --------------------------------------------------
// MatchingRound
// --------------------------------------------------

/// 1ラウンド分のゲーム
#[derive(Debug, Clone)]
pub struct MatchingRound {
    id: RoundId,
    pair_count: usize,
    cards: Vec<Card>,
    state: RoundState,
    phase: Phase,
    timing: Timing,
    completion_notified: bool,
}

impl MatchingRound {
    /// ペアのリストからラウンドを開始する。カードの並びはシャッフルされる
    pub fn start<R: Rng + ?Sized>(
        pairs: &[Pair],
        timing: Timing,
        rng: &mut R,
    ) -> Result<Self, RoundError> {
        if pairs.is_empty() {
            return Err(RoundError::EmptyRound);
        }

        let mut seen = HashSet::with_capacity(pairs.len());
        for pair in pairs {
            if !seen.insert(pair.id) {
                return Err(RoundError::DuplicatePair(pair.id));
            }
        }

        let mut cards = Vec::with_capacity(pairs.len() * 2);
        for pair in pairs {
            cards.push(Card::from_pair(pair, Face::Word));
            cards.push(Card::from_pair(pair, Face::Meaning));
        }
        // Fisher–Yates
        cards.shuffle(rng);

        let round = Self {
            id: RoundId::next(),
            pair_count: pairs.len(),
            cards,
            state: RoundState::default(),
            phase: Phase::Ready,
            timing,
            completion_notified: false,
        };
        info!("Round {:?} started with {} pairs", round.id, round.pair_count);
        Ok(round)
    }

    pub fn id(&self) -> RoundId {
        self.id
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn card(&self, card_id: &CardId) -> Option<&Card> {
        self.cards.iter().find(|c| &c.id == card_id)
    }

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn pair_count(&self) -> usize {
        self.pair_count
    }

    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }

    pub fn is_selected(&self, card_id: &CardId) -> bool {
        self.state.selected_card_ids.contains(card_id)
    }

    /// カードを選択する。
    ///
    /// 無効な選択 (存在しない・選択済み・揃い済み・判定中・完了後) は何もしない。
    /// 2枚目の選択で判定が行われ、その結果の遅延処理が返る。
    pub fn select<O: RoundObserver + ?Sized>(
        &mut self,
        card_id: &CardId,
        now: Instant,
        observer: &mut O,
    ) -> Option<Scheduled> {
        if self.phase != Phase::Ready || self.state.selected_card_ids.len() >= 2 {
            trace!("Ignoring {card_id}: round is not accepting input");
            return None;
        }
        let Some(card) = self.card(card_id) else {
            trace!("Ignoring unknown card {card_id}");
            return None;
        };
        if card.matched || self.is_selected(card_id) {
            trace!("Ignoring {card_id}: already matched or selected");
            return None;
        }

        self.state.selected_card_ids.push(card_id.clone());
        debug!("Selected {card_id}");

        if self.state.selected_card_ids.len() < 2 {
            observer.on_change(&self.snapshot());
            return None;
        }

        self.state.attempt_count += 1;
        let verdict = self.evaluate();
        self.phase = Phase::Evaluating(verdict);
        debug!(
            "Attempt {} on {:?}: {:?}",
            self.state.attempt_count, self.state.selected_card_ids, verdict
        );
        observer.on_change(&self.snapshot());

        let (effect, delay) = match verdict {
            Verdict::Match => (Effect::ConfirmMatch, self.timing.match_confirm),
            Verdict::Mismatch => (Effect::ResetSelection, self.timing.mismatch_reset),
        };
        Some(self.schedule(effect, now + delay))
    }

    /// 選ばれた2枚が同じペアの別の面かどうか
    fn evaluate(&self) -> Verdict {
        let [first, second] = self.state.selected_card_ids.as_slice() else {
            return Verdict::Mismatch;
        };
        match (self.card(first), self.card(second)) {
            (Some(a), Some(b)) if a.pair_id == b.pair_id && a.face != b.face => Verdict::Match,
            _ => Verdict::Mismatch,
        }
    }

    fn schedule(&self, effect: Effect, due: Instant) -> Scheduled {
        Scheduled {
            round: self.id,
            effect,
            due,
        }
    }

    /// 予約された遅延処理を適用する。
    ///
    /// 別ラウンドのものや、今の段階に合わないものは無視する。
    /// 最後のペアが揃ったときは完了通知の予約が返る。
    pub fn apply<O: RoundObserver + ?Sized>(
        &mut self,
        scheduled: Scheduled,
        observer: &mut O,
    ) -> Option<Scheduled> {
        if scheduled.round != self.id {
            trace!(
                "Dropping {:?} from superseded round {:?}",
                scheduled.effect, scheduled.round
            );
            return None;
        }

        match (scheduled.effect, self.phase) {
            (Effect::ConfirmMatch, Phase::Evaluating(Verdict::Match)) => {
                let selected = std::mem::take(&mut self.state.selected_card_ids);
                for card in self.cards.iter_mut().filter(|c| selected.contains(&c.id)) {
                    card.matched = true;
                }
                self.state.match_count += 1;

                if self.state.match_count as usize == self.pair_count {
                    self.phase = Phase::Complete;
                    info!(
                        "Round {:?} complete: {} pairs in {} attempts",
                        self.id, self.pair_count, self.state.attempt_count
                    );
                    observer.on_change(&self.snapshot());
                    return Some(self.schedule(Effect::Complete, scheduled.due + self.timing.completion));
                }

                self.phase = Phase::Ready;
                observer.on_change(&self.snapshot());
                None
            }
            (Effect::ResetSelection, Phase::Evaluating(Verdict::Mismatch)) => {
                self.state.selected_card_ids.clear();
                self.phase = Phase::Ready;
                observer.on_change(&self.snapshot());
                None
            }
            (Effect::Complete, Phase::Complete) if !self.completion_notified => {
                self.completion_notified = true;
                observer.on_complete();
                None
            }
            (effect, phase) => {
                trace!("Ignoring {effect:?} while {phase:?}");
                None
            }
        }
    }

    pub fn snapshot(&self) -> RoundSnapshot {
        let feedback = match self.phase {
            Phase::Evaluating(verdict) => Some(verdict),
            _ => None,
        };
        RoundSnapshot {
            cards: self.cards.clone(),
            selected_card_ids: self.state.selected_card_ids.clone(),
            match_count: self.state.match_count,
            attempt_count: self.state.attempt_count,
            pair_count: self.pair_count,
            is_complete: self.is_complete(),
            feedback,
        }
    }
}

// --------------------------------------------------
// 遅延処理のキュー
// --------------------------------------------------

/// イベントループが持つ遅延処理の待ち行列
#[derive(Debug, Default)]
pub struct FeedbackQueue {
    pending: Vec<Scheduled>,
}

impl FeedbackQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, scheduled: Scheduled) {
        self.pending.push(scheduled);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// 期限切れのうち最も早いものを取り出す
    pub fn pop_due(&mut self, now: Instant) -> Option<Scheduled> {
        self.pop_earliest(Some(now))
    }

    fn pop_earliest(&mut self, until: Option<Instant>) -> Option<Scheduled> {
        let idx = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, s)| until.is_none_or(|now| s.due <= now))
            .min_by_key(|(_, s)| s.due)
            .map(|(i, _)| i)?;
        Some(self.pending.remove(idx))
    }

    /// 期限切れの処理をすべて `round` に適用する。適用を試みた件数を返す
    pub fn run_due<O: RoundObserver + ?Sized>(
        &mut self,
        now: Instant,
        round: &mut MatchingRound,
        observer: &mut O,
    ) -> usize {
        let mut count = 0;
        while let Some(scheduled) = self.pop_due(now) {
            count += 1;
            if let Some(next) = round.apply(scheduled, observer) {
                self.push(next);
            }
        }
        count
    }

    /// 期限を待たずに残りの処理をすべて適用する (ラウンドを離れる前に使う)
    pub fn flush<O: RoundObserver + ?Sized>(
        &mut self,
        round: &mut MatchingRound,
        observer: &mut O,
    ) -> usize {
        let mut count = 0;
        while let Some(scheduled) = self.pop_earliest(None) {
            count += 1;
            if let Some(next) = round.apply(scheduled, observer) {
                self.push(next);
            }
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[derive(Default)]
    struct Recorder {
        changes: usize,
        completions: usize,
    }

    impl RoundObserver for Recorder {
        fn on_change(&mut self, _snapshot: &RoundSnapshot) {
            self.changes += 1;
        }

        fn on_complete(&mut self) {
            self.completions += 1;
        }
    }

    fn pair(id: u32, word: &str, meaning: &str) -> Pair {
        Pair {
            id,
            word: word.to_string(),
            meaning: meaning.to_string(),
        }
    }

    fn animals() -> Vec<Pair> {
        vec![
            pair(1, "cat", "con mèo"),
            pair(2, "dog", "con chó"),
            pair(3, "bird", "con chim"),
        ]
    }

    fn word(id: u32) -> CardId {
        CardId::new(id, Face::Word)
    }

    fn meaning(id: u32) -> CardId {
        CardId::new(id, Face::Meaning)
    }

    fn start(pairs: &[Pair]) -> MatchingRound {
        let mut rng = StdRng::seed_from_u64(7);
        MatchingRound::start(pairs, Timing::instant(), &mut rng).unwrap()
    }

    /// 2枚選び、遅延処理を即座に流す
    fn attempt(
        round: &mut MatchingRound,
        queue: &mut FeedbackQueue,
        rec: &mut Recorder,
        a: CardId,
        b: CardId,
    ) {
        let now = Instant::now();
        assert!(round.select(&a, now, rec).is_none());
        let scheduled = round.select(&b, now, rec).expect("second pick schedules feedback");
        queue.push(scheduled);
        queue.run_due(now, round, rec);
    }

    #[test]
    fn start_builds_two_cards_per_pair() {
        let pairs = animals();
        let round = start(&pairs);

        assert_eq!(round.cards().len(), 6);
        assert!(round.cards().iter().all(|c| !c.matched));
        for p in &pairs {
            let faces: Vec<Face> = round
                .cards()
                .iter()
                .filter(|c| c.pair_id == p.id)
                .map(|c| c.face)
                .collect();
            assert_eq!(faces.len(), 2);
            assert!(faces.contains(&Face::Word));
            assert!(faces.contains(&Face::Meaning));
        }
        assert_eq!(round.state(), &RoundState::default());
        assert_eq!(round.phase(), Phase::Ready);
    }

    #[test]
    fn card_ids_follow_face_and_pair() {
        let round = start(&animals());
        let cat = round.card(&word(1)).unwrap();
        assert_eq!(cat.text, "cat");
        assert_eq!(cat.id.as_str(), "word-1");
        assert_eq!(round.card(&meaning(1)).unwrap().text, "con mèo");
    }

    #[test]
    fn start_rejects_empty_and_duplicate_input() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            MatchingRound::start(&[], Timing::instant(), &mut rng).unwrap_err(),
            RoundError::EmptyRound
        );
        let dup = vec![pair(4, "sun", "mặt trời"), pair(4, "moon", "mặt trăng")];
        assert_eq!(
            MatchingRound::start(&dup, Timing::instant(), &mut rng).unwrap_err(),
            RoundError::DuplicatePair(4)
        );
    }

    #[test]
    fn shuffle_changes_display_order_across_seeds() {
        let pairs: Vec<Pair> = (1..=8).map(|i| pair(i, &format!("w{i}"), &format!("m{i}"))).collect();
        let orders: HashSet<Vec<CardId>> = (0..10)
            .map(|seed| {
                let mut rng = StdRng::seed_from_u64(seed);
                let round = MatchingRound::start(&pairs, Timing::instant(), &mut rng).unwrap();
                round.cards().iter().map(|c| c.id.clone()).collect()
            })
            .collect();
        assert!(orders.len() > 1);
    }

    #[test]
    fn scenario_three_pairs() {
        let mut round = start(&animals());
        let mut queue = FeedbackQueue::new();
        let mut rec = Recorder::default();

        attempt(&mut round, &mut queue, &mut rec, word(1), meaning(1));
        assert_eq!(round.state().match_count, 1);
        assert_eq!(round.state().attempt_count, 1);
        assert!(round.card(&word(1)).unwrap().matched);
        assert!(round.card(&meaning(1)).unwrap().matched);

        // 同じ面同士
        attempt(&mut round, &mut queue, &mut rec, word(2), word(3));
        assert_eq!(round.state().match_count, 1);
        assert_eq!(round.state().attempt_count, 2);
        assert!(!round.card(&word(2)).unwrap().matched);
        assert!(!round.card(&word(3)).unwrap().matched);
        assert!(round.state().selected_card_ids.is_empty());

        // 別のペア
        attempt(&mut round, &mut queue, &mut rec, word(2), meaning(3));
        assert_eq!(round.state().attempt_count, 3);
        assert_eq!(round.state().match_count, 1);

        attempt(&mut round, &mut queue, &mut rec, word(2), meaning(2));
        assert_eq!(round.state().match_count, 2);
        assert_eq!(round.state().attempt_count, 4);
        assert_eq!(rec.completions, 0);

        attempt(&mut round, &mut queue, &mut rec, word(3), meaning(3));
        assert_eq!(round.state().match_count, 3);
        assert_eq!(round.state().attempt_count, 5);
        assert!(round.is_complete());
        assert_eq!(rec.completions, 1);
        assert!(queue.is_empty());
    }

    #[test]
    fn match_works_in_either_order() {
        let mut round = start(&animals());
        let mut queue = FeedbackQueue::new();
        let mut rec = Recorder::default();

        attempt(&mut round, &mut queue, &mut rec, meaning(2), word(2));
        assert_eq!(round.state().match_count, 1);
        assert!(round.card(&word(2)).unwrap().matched);
    }

    #[test]
    fn invalid_selections_are_ignored() {
        let mut round = start(&animals());
        let mut queue = FeedbackQueue::new();
        let mut rec = Recorder::default();
        let now = Instant::now();

        attempt(&mut round, &mut queue, &mut rec, word(1), meaning(1));
        let before = round.state().clone();

        // 揃い済み
        assert!(round.select(&word(1), now, &mut rec).is_none());
        assert_eq!(round.state(), &before);

        // 存在しない
        assert!(round.select(&word(99), now, &mut rec).is_none());
        assert_eq!(round.state(), &before);

        // 選択済み
        round.select(&word(2), now, &mut rec);
        let one_selected = round.state().clone();
        assert!(round.select(&word(2), now, &mut rec).is_none());
        assert_eq!(round.state(), &one_selected);
    }

    #[test]
    fn third_pick_during_feedback_is_ignored() {
        let pairs = animals();
        let mut rng = StdRng::seed_from_u64(3);
        let mut round = MatchingRound::start(&pairs, Timing::default(), &mut rng).unwrap();
        let mut queue = FeedbackQueue::new();
        let mut rec = Recorder::default();
        let now = Instant::now();

        round.select(&word(1), now, &mut rec);
        let scheduled = round.select(&meaning(2), now, &mut rec).unwrap();
        assert_eq!(scheduled.effect, Effect::ResetSelection);
        assert_eq!(scheduled.due, now + Timing::default().mismatch_reset);
        queue.push(scheduled);

        let evaluating = round.state().clone();
        assert!(round.select(&word(3), now, &mut rec).is_none());
        assert_eq!(round.state(), &evaluating);
        assert_eq!(round.phase(), Phase::Evaluating(Verdict::Mismatch));

        // 期限前は何も起きない
        assert_eq!(queue.run_due(now, &mut round, &mut rec), 0);
        assert_eq!(round.state().selected_card_ids.len(), 2);

        queue.run_due(now + Duration::from_secs(1), &mut round, &mut rec);
        assert!(round.state().selected_card_ids.is_empty());
        assert_eq!(round.phase(), Phase::Ready);
        assert_eq!(round.state().attempt_count, 1);
    }

    #[test]
    fn completion_waits_for_its_own_delay() {
        let pairs = vec![pair(1, "cat", "con mèo")];
        let mut rng = StdRng::seed_from_u64(5);
        let mut round = MatchingRound::start(&pairs, Timing::default(), &mut rng).unwrap();
        let mut queue = FeedbackQueue::new();
        let mut rec = Recorder::default();
        let now = Instant::now();

        round.select(&word(1), now, &mut rec);
        queue.push(round.select(&meaning(1), now, &mut rec).unwrap());

        queue.run_due(now + Duration::from_millis(500), &mut round, &mut rec);
        assert!(round.is_complete());
        assert_eq!(rec.completions, 0);
        assert_eq!(queue.len(), 1);

        // 完了後はすべてのカードがロックされる
        assert!(round.select(&word(1), now, &mut rec).is_none());

        queue.run_due(now + Duration::from_millis(1500), &mut round, &mut rec);
        assert_eq!(rec.completions, 1);
    }

    #[test]
    fn flush_applies_pending_feedback_early() {
        let pairs = vec![pair(1, "cat", "con mèo")];
        let mut rng = StdRng::seed_from_u64(5);
        let mut round = MatchingRound::start(&pairs, Timing::default(), &mut rng).unwrap();
        let mut queue = FeedbackQueue::new();
        let mut rec = Recorder::default();
        let now = Instant::now();

        round.select(&word(1), now, &mut rec);
        queue.push(round.select(&meaning(1), now, &mut rec).unwrap());
        assert_eq!(queue.run_due(now, &mut round, &mut rec), 0);

        // 確定と完了通知の2件
        assert_eq!(queue.flush(&mut round, &mut rec), 2);
        assert!(round.is_complete());
        assert_eq!(rec.completions, 1);
        assert!(queue.is_empty());
    }

    #[test]
    fn completion_fires_once_even_if_replayed() {
        let pairs = vec![pair(1, "cat", "con mèo")];
        let mut round = start(&pairs);
        let mut rec = Recorder::default();
        let now = Instant::now();

        round.select(&word(1), now, &mut rec);
        let confirm = round.select(&meaning(1), now, &mut rec).unwrap();
        let complete = round.apply(confirm, &mut rec).unwrap();
        assert!(round.apply(complete, &mut rec).is_none());
        assert!(round.apply(complete, &mut rec).is_none());
        assert!(round.apply(confirm, &mut rec).is_none());
        assert_eq!(rec.completions, 1);
        assert_eq!(round.state().match_count, 1);
    }

    #[test]
    fn stale_feedback_from_previous_round_is_dropped() {
        let pairs = animals();
        let mut old = start(&pairs);
        let mut queue = FeedbackQueue::new();
        let mut rec = Recorder::default();
        let now = Instant::now();

        old.select(&word(1), now, &mut rec);
        queue.push(old.select(&meaning(1), now, &mut rec).unwrap());

        let mut fresh = start(&pairs);
        assert_ne!(old.id(), fresh.id());
        fresh.select(&word(2), now, &mut rec);
        queue.push(fresh.select(&meaning(2), now, &mut rec).unwrap());

        queue.run_due(now, &mut fresh, &mut rec);
        assert_eq!(fresh.state().match_count, 1);
        assert!(!fresh.card(&word(1)).unwrap().matched);
        assert!(fresh.card(&word(2)).unwrap().matched);
        assert!(queue.is_empty());
    }

    #[test]
    fn observer_sees_every_change() {
        let mut round = start(&animals());
        let mut rec = Recorder::default();
        let now = Instant::now();

        round.select(&word(1), now, &mut rec);
        assert_eq!(rec.changes, 1);
        let reset = round.select(&word(2), now, &mut rec).unwrap();
        assert_eq!(rec.changes, 2);
        assert_eq!(round.snapshot().feedback, Some(Verdict::Mismatch));
        round.apply(reset, &mut rec);
        assert_eq!(rec.changes, 3);
        assert_eq!(round.snapshot().feedback, None);

        // 無視された選択は通知しない
        round.select(&word(42), now, &mut rec);
        assert_eq!(rec.changes, 3);
    }

    #[test]
    fn counters_stay_bounded_under_random_clicks() {
        let pairs: Vec<Pair> = (1..=6).map(|i| pair(i, &format!("w{i}"), &format!("m{i}"))).collect();
        let mut round = start(&pairs);
        let mut queue = FeedbackQueue::new();
        let mut rec = Recorder::default();
        let mut rng = StdRng::seed_from_u64(11);
        let ids: Vec<CardId> = round.cards().iter().map(|c| c.id.clone()).collect();

        let mut last_matches = 0;
        for _ in 0..2000 {
            let now = Instant::now();
            let id = &ids[rng.random_range(0..ids.len())];
            let attempts_before = round.state().attempt_count;
            let selected_before = round.state().selected_card_ids.len();
            if let Some(s) = round.select(id, now, &mut rec) {
                assert_eq!(selected_before, 1);
                assert_eq!(round.state().attempt_count, attempts_before + 1);
                queue.push(s);
            } else {
                assert_eq!(round.state().attempt_count, attempts_before);
            }
            queue.run_due(now, &mut round, &mut rec);

            let matches = round.state().match_count;
            assert!(matches >= last_matches);
            assert!(matches as usize <= pairs.len());
            last_matches = matches;
            for c in round.cards() {
                let twin = round
                    .cards()
                    .iter()
                    .find(|o| o.pair_id == c.pair_id && o.face != c.face)
                    .unwrap();
                assert_eq!(c.matched, twin.matched);
            }
        }
        assert!(rec.completions <= 1);
        assert_eq!(rec.completions == 1, round.is_complete());
    }
}
