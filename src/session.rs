/*
 * src/session.rs
 * 画面遷移 (グループ選択 <-> クイズ) の状態機械
 */

use std::collections::BTreeSet;

use rand::Rng;
use tracing::{debug, info, warn};

use crate::catalog::{Catalog, KanjiItem};
use crate::engine::{self, Question, QuizEngine, Verdict};

/// 選択画面に出すお知らせ
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// 選択中の漢字が足りない
    InsufficientPool { available: usize },
}

/// 回答済みの選択肢と判定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub chosen: String,
    pub verdict: Verdict,
}

/// クイズ中の状態
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Round {
    /// 戻ったときに復元する選択
    pub selected: BTreeSet<String>,
    pub pool: Vec<KanjiItem>,
    /// `None` はプールが空のときだけ (読み込み中の表示)
    pub question: Option<Question>,
    /// `None` なら未回答
    pub answer: Option<Answer>,
    /// 何問目か (1 から)
    pub number: u32,
    pub answered: u32,
    pub correct: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State {
    Selecting {
        selected: BTreeSet<String>,
        notice: Option<Notice>,
    },
    Playing(Round),
}

impl Default for State {
    fn default() -> Self {
        State::Selecting {
            selected: BTreeSet::new(),
            notice: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    ToggleGroup(String),
    StartQuiz,
    SelectOption(String),
    NextQuestion,
    BackToSelection,
}

/// 状態遷移。該当しないイベントは状態を変えない
pub fn transition<R: Rng>(
    catalog: &Catalog,
    engine: &mut QuizEngine<R>,
    state: State,
    event: Event,
) -> State {
    debug!(?event, "session event");

    match (state, event) {
        (State::Selecting { mut selected, .. }, Event::ToggleGroup(id)) => {
            if !catalog.contains(&id) {
                warn!(%id, "ignoring unknown group id");
            } else if !selected.remove(&id) {
                selected.insert(id);
            }
            State::Selecting {
                selected,
                notice: None,
            }
        }

        (State::Selecting { selected, .. }, Event::StartQuiz) => {
            let pool = engine::build_pool(catalog, &selected);
            if !engine::can_start_quiz(&pool) {
                warn!(available = pool.len(), "not enough kanji selected to start");
                return State::Selecting {
                    selected,
                    notice: Some(Notice::InsufficientPool {
                        available: pool.len(),
                    }),
                };
            }

            info!(groups = selected.len(), pool = pool.len(), "quiz started");
            let question = engine.generate_question(&pool);
            State::Playing(Round {
                selected,
                pool,
                question,
                answer: None,
                number: 1,
                answered: 0,
                correct: 0,
            })
        }

        (State::Playing(mut round), Event::SelectOption(chosen)) => {
            // 1問につき採点は1回だけ
            if round.answer.is_some() {
                return State::Playing(round);
            }
            let Some(question) = round.question.as_ref() else {
                return State::Playing(round);
            };

            let verdict = engine::evaluate(question, &chosen);
            debug!(prompt = %question.prompt, %chosen, ?verdict, "answered");
            round.answered += 1;
            if verdict.is_correct() {
                round.correct += 1;
            }
            round.answer = Some(Answer { chosen, verdict });
            State::Playing(round)
        }

        (State::Playing(mut round), Event::NextQuestion) => {
            // 未回答のうちは次へ進めない
            if round.answer.is_none() {
                return State::Playing(round);
            }
            round.question = engine.generate_question(&round.pool);
            round.answer = None;
            round.number += 1;
            State::Playing(round)
        }

        (State::Playing(round), Event::BackToSelection) => {
            info!(
                answered = round.answered,
                correct = round.correct,
                "back to selection"
            );
            State::Selecting {
                selected: round.selected,
                notice: None,
            }
        }

        (state, _) => state,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Group;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    struct Harness {
        catalog: Catalog,
        engine: QuizEngine,
        state: State,
    }

    impl Harness {
        fn new(catalog: Catalog) -> Self {
            Self {
                catalog,
                engine: QuizEngine::new(StdRng::seed_from_u64(17)),
                state: State::default(),
            }
        }

        fn send(&mut self, event: Event) -> &State {
            let state = std::mem::take(&mut self.state);
            self.state = transition(&self.catalog, &mut self.engine, state, event);
            &self.state
        }

        fn round(&self) -> &Round {
            match &self.state {
                State::Playing(round) => round,
                other => panic!("expected Playing, got {other:?}"),
            }
        }
    }

    fn toggle(id: &str) -> Event {
        Event::ToggleGroup(id.to_string())
    }

    #[test]
    fn starts_in_selecting() {
        let h = Harness::new(Catalog::builtin());
        assert_eq!(h.state, State::default());
    }

    #[test]
    fn toggle_adds_and_removes() {
        let mut h = Harness::new(Catalog::builtin());

        h.send(toggle("n5_days"));
        h.send(toggle("n5_people"));
        h.send(toggle("n5_days"));

        let State::Selecting { selected, .. } = &h.state else {
            panic!("expected Selecting");
        };
        assert_eq!(selected.iter().collect::<Vec<_>>(), ["n5_people"]);
    }

    #[test]
    fn unknown_group_is_ignored() {
        let mut h = Harness::new(Catalog::builtin());
        h.send(toggle("missing"));
        assert_eq!(h.state, State::default());
    }

    #[test]
    fn start_without_selection_is_blocked() {
        let mut h = Harness::new(Catalog::builtin());

        let state = h.send(Event::StartQuiz);
        assert_eq!(
            *state,
            State::Selecting {
                selected: BTreeSet::new(),
                notice: Some(Notice::InsufficientPool { available: 0 }),
            }
        );

        // 選択を変えるとお知らせは消える
        let state = h.send(toggle("n5_people"));
        assert!(matches!(state, State::Selecting { notice: None, .. }));
    }

    #[test]
    fn start_with_two_items_is_blocked() {
        let catalog = Catalog::new(vec![Group {
            id: "pair".into(),
            label: "Pair".into(),
            items: vec![KanjiItem::new("月", "つき"), KanjiItem::new("日", "にち")],
        }])
        .unwrap();
        let mut h = Harness::new(catalog);

        h.send(toggle("pair"));
        let state = h.send(Event::StartQuiz);
        assert!(matches!(
            state,
            State::Selecting {
                notice: Some(Notice::InsufficientPool { available: 2 }),
                ..
            }
        ));
    }

    #[test]
    fn start_with_three_items_plays() {
        let mut h = Harness::new(Catalog::builtin());

        h.send(toggle("n5_people"));
        h.send(Event::StartQuiz);

        let round = h.round();
        assert_eq!(round.number, 1);
        assert_eq!(round.pool.len(), 3);
        assert!(round.answer.is_none());
        assert_eq!(round.question.as_ref().unwrap().options.len(), 3);
    }

    #[test]
    fn answer_is_scored_once() {
        let mut h = Harness::new(Catalog::builtin());
        h.send(toggle("n5_numbers"));
        h.send(Event::StartQuiz);

        let question = h.round().question.clone().unwrap();
        let wrong = question
            .options
            .iter()
            .find(|o| **o != question.correct_reading)
            .unwrap()
            .clone();

        h.send(Event::SelectOption(wrong.clone()));
        assert_eq!(
            h.round().answer,
            Some(Answer {
                chosen: wrong,
                verdict: Verdict::Wrong,
            })
        );

        // 2回目の回答は無視される
        h.send(Event::SelectOption(question.correct_reading.clone()));
        let round = h.round();
        assert_eq!(round.answer.as_ref().unwrap().verdict, Verdict::Wrong);
        assert_eq!((round.answered, round.correct), (1, 0));
    }

    #[test]
    fn next_requires_an_answer() {
        let mut h = Harness::new(Catalog::builtin());
        h.send(toggle("n5_numbers"));
        h.send(Event::StartQuiz);

        let before = h.round().clone();
        h.send(Event::NextQuestion);
        assert_eq!(*h.round(), before);

        let correct = before.question.unwrap().correct_reading;
        h.send(Event::SelectOption(correct));
        h.send(Event::NextQuestion);

        let round = h.round();
        assert_eq!(round.number, 2);
        assert!(round.answer.is_none());
        assert!(round.question.is_some());
        assert_eq!((round.answered, round.correct), (1, 1));
    }

    #[test]
    fn playing_loops_until_back() {
        let mut h = Harness::new(Catalog::builtin());
        h.send(toggle("n5_days"));
        h.send(toggle("n5_school"));
        h.send(Event::StartQuiz);

        for n in 1..=25 {
            let correct = h.round().question.as_ref().unwrap().correct_reading.clone();
            assert_eq!(h.round().number, n);
            h.send(Event::SelectOption(correct));
            h.send(Event::NextQuestion);
        }
        assert_eq!(h.round().correct, 25);

        let state = h.send(Event::BackToSelection);
        let State::Selecting { selected, notice } = state else {
            panic!("expected Selecting");
        };
        assert!(notice.is_none());
        assert_eq!(selected.iter().collect::<Vec<_>>(), ["n5_days", "n5_school"]);
    }

    #[test]
    fn events_outside_their_state_are_ignored() {
        let mut h = Harness::new(Catalog::builtin());

        h.send(Event::NextQuestion);
        h.send(Event::SelectOption("いち".into()));
        h.send(Event::BackToSelection);
        assert_eq!(h.state, State::default());

        h.send(toggle("n5_numbers"));
        h.send(Event::StartQuiz);
        let before = h.round().clone();
        h.send(toggle("n5_days"));
        h.send(Event::StartQuiz);
        assert_eq!(*h.round(), before);
    }
}
