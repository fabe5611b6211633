use std::sync::mpsc::{self, Receiver};

use assert_matches::assert_matches;
use rand::rngs::StdRng;
use rand::SeedableRng;

use keydrill::corpus::{self, Tier, MAX_WORDS, MIN_WORDS};
use keydrill::engine::{Engine, EngineError, EngineEvent, SessionConfig, Status};
use keydrill::rating::{classify, RatingTier};
use keydrill::score::score;

fn seeded_engine(seed: u64) -> (Engine, Receiver<EngineEvent>) {
    let (tx, rx) = mpsc::channel();
    (Engine::with_rng(tx, StdRng::seed_from_u64(seed)), rx)
}

#[test]
fn generated_text_is_in_bounds_for_every_tier() {
    let mut rng = StdRng::seed_from_u64(11);

    for tier in [Tier::Easy, Tier::Medium, Tier::Hard] {
        let list = tier.word_list();
        for _ in 0..25 {
            let text = corpus::generate(tier, &mut rng);
            let words: Vec<&str> = text.split(' ').collect();

            assert!((MIN_WORDS..=MAX_WORDS).contains(&words.len()));
            for word in words {
                assert!(list.words.iter().any(|w| w == word));
            }
        }
    }
}

#[test]
fn classifier_table_matches_the_contract() {
    assert_eq!(classify(60, 95), RatingTier::Excellent);
    assert_eq!(classify(59, 95), RatingTier::Great);
    assert_eq!(classify(0, 0), RatingTier::Beginner);
    // Fails Great's accuracy bar, falls to Good since 40 >= 25 and 89 >= 80
    assert_eq!(classify(40, 89), RatingTier::Good);
}

#[test]
fn first_ten_correct_chars_at_five_seconds_score_24_wpm() {
    let mut rng = StdRng::seed_from_u64(5);
    let target = corpus::generate(Tier::Easy, &mut rng);
    let typed: String = target.chars().take(10).collect();

    let snapshot = score(&target, &typed, 5.0);
    assert_eq!(snapshot.wpm, 24);
    assert_eq!(snapshot.accuracy, 100);
}

#[test]
fn commands_in_the_wrong_state_are_rejected_with_a_reason() {
    let (mut engine, _rx) = seeded_engine(1);

    assert_matches!(
        engine.submit_input("hello"),
        Err(EngineError::InvalidTransition {
            command: "submit_input",
            status: Status::Idle,
        })
    );

    engine.start().unwrap();
    assert_matches!(
        engine.start(),
        Err(EngineError::InvalidTransition {
            command: "start",
            status: Status::Active,
        })
    );

    let config = SessionConfig::new(Tier::Medium, 180).unwrap();
    assert_matches!(
        engine.configure(config),
        Err(EngineError::InvalidTransition {
            command: "configure",
            ..
        })
    );
}

#[test]
fn configure_start_type_flow_reports_live_progress() {
    let (mut engine, rx) = seeded_engine(77);
    engine
        .configure(SessionConfig::new(Tier::Easy, 120).unwrap())
        .unwrap();
    engine.start().unwrap();

    let target = match rx.recv().unwrap() {
        EngineEvent::Started { target } => target,
        other => panic!("expected Started, got {other:?}"),
    };

    let prefix: String = target.chars().take(10).collect();
    engine.submit_input(&prefix).unwrap();

    assert_matches!(rx.recv().unwrap(), EngineEvent::Progress(snapshot) => {
        assert_eq!(snapshot.accuracy, 100);
        assert!(snapshot.progress < 100);
    });
}

#[test]
fn expiry_emits_exactly_one_finished_and_no_negative_ticks() {
    let (mut engine, rx) = seeded_engine(13);
    engine
        .configure(SessionConfig::new(Tier::Medium, 120).unwrap())
        .unwrap();
    engine.start().unwrap();

    // Tick well past expiry; the extra ticks must land on a stopped countdown
    for _ in 0..150 {
        engine.on_tick();
    }

    let events: Vec<EngineEvent> = rx.try_iter().collect();
    let finished = events
        .iter()
        .filter(|ev| matches!(ev, EngineEvent::Finished(_)))
        .count();
    assert_eq!(finished, 1);

    let ticks: Vec<u32> = events
        .iter()
        .filter_map(|ev| match ev {
            EngineEvent::Tick { remaining_secs } => Some(*remaining_secs),
            _ => None,
        })
        .collect();
    assert_eq!(ticks.len(), 120);
    assert!(ticks.windows(2).all(|w| w[0] > w[1]));
    assert_eq!(*ticks.last().unwrap(), 0);
}

#[test]
fn finishing_the_text_beats_the_clock() {
    let (mut engine, rx) = seeded_engine(29);
    engine.start().unwrap();

    let target = match rx.recv().unwrap() {
        EngineEvent::Started { target } => target,
        other => panic!("expected Started, got {other:?}"),
    };

    // Exhaust the text, then let the "same round" tick arrive anyway
    engine.submit_input(&target).unwrap();
    engine.on_tick();

    let finished = rx
        .try_iter()
        .filter(|ev| matches!(ev, EngineEvent::Finished(_)))
        .count();
    assert_eq!(finished, 1);
    assert_eq!(engine.status(), Status::Finished);
}

#[test]
fn a_new_attempt_discards_the_previous_session_entirely() {
    let (mut engine, rx) = seeded_engine(31);
    engine.start().unwrap();
    let first = engine.session().unwrap().target.clone();
    engine.submit_input(&first).unwrap();

    engine
        .configure(SessionConfig::new(Tier::Hard, 180).unwrap())
        .unwrap();
    engine.start().unwrap();

    let session = engine.session().unwrap();
    assert_eq!(session.status, Status::Active);
    assert!(session.typed.is_empty());
    assert_eq!(session.correct_chars, 0);
    assert_ne!(session.target, first);

    // Hard-tier target only contains hard-tier words
    let list = Tier::Hard.word_list();
    for word in session.target.split(' ') {
        assert!(list.words.iter().any(|w| w == word));
    }

    let started = rx
        .try_iter()
        .filter(|ev| matches!(ev, EngineEvent::Started { .. }))
        .count();
    assert_eq!(started, 2);
}

#[test]
fn session_invariants_hold_while_typing() {
    let (mut engine, _rx) = seeded_engine(101);
    engine.start().unwrap();
    let target = engine.session().unwrap().target.clone();

    let mut typed = String::new();
    for (i, c) in target.chars().take(30).enumerate() {
        // Mistype every fifth character
        typed.push(if i % 5 == 4 { '#' } else { c });
        engine.submit_input(&typed).unwrap();

        let session = engine.session().unwrap();
        assert_eq!(session.total_chars, typed.chars().count());
        assert!(session.correct_chars <= session.total_chars);
    }
}
