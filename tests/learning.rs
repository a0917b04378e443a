//! End-to-end learning behavior.
//!
//! Streams labeled decisions through a model and checks:
//! - the policy learns to prefer the rewarding action,
//! - replayed learn sequences are bit-identical,
//! - exploration produces valid, seeded, reproducible distributions,
//! - action masks hold end to end,
//! - predictions feed the decision-service ranking event.

use bandits::{
    ActionMask, CbAdfConfig, CbAdfModel, Example, ExplorationPolicy, Interaction, MultiExample,
    Namespace, RankingEvent,
};

fn config(epsilon: f32) -> CbAdfConfig {
    CbAdfConfig {
        interactions: vec![Interaction::Quadratic("User".into(), "Action".into())],
        exploration: ExplorationPolicy::EpsilonGreedy { epsilon },
        seed: 11,
        ..CbAdfConfig::default()
    }
}

fn decision(user: &str, labeled: Option<(usize, f32, f32)>) -> MultiExample {
    let mut decision = MultiExample::new().with_shared(
        Example::new().with_namespace(Namespace::new("User").with_feature(format!("user={user}"))),
    );
    for (row, article) in ["sports", "politics", "music"].iter().enumerate() {
        let mut action = Example::new()
            .with_namespace(Namespace::new("Action").with_feature(format!("article={article}")));
        if let Some((labeled_row, cost, probability)) = labeled {
            if labeled_row == row {
                action = action.with_label(cost, probability);
            }
        }
        decision = decision.with_action(action);
    }
    decision
}

#[test]
fn policy_learns_to_prefer_rewarding_action() {
    // Greedy model; politics keeps paying off (negative cost).
    let mut model = CbAdfModel::new(config(0.0)).unwrap();
    for _ in 0..30 {
        model.learn(&decision("Anna", Some((1, -1.0, 0.5)))).unwrap();
    }

    let prediction = model.predict(&decision("Anna", None)).unwrap();
    assert_eq!(prediction.chosen, 1);
    assert!(prediction.scores[1] < prediction.scores[0]);
    assert!(prediction.scores[1] < prediction.scores[2]);
    assert_eq!(prediction.chosen_probability(), 1.0);
}

#[test]
fn replayed_stream_is_bit_identical() {
    let stream = || {
        let mut model = CbAdfModel::new(config(0.1)).unwrap();
        for step in 0..25 {
            let cost = if step % 3 == 0 { -1.0 } else { 0.25 };
            model
                .learn(&decision("Tom", Some((step % 3, cost, 0.4))))
                .unwrap();
        }
        model
    };
    assert_eq!(stream().weights(), stream().weights());
}

#[test]
fn exploration_distribution_is_valid_and_covers_actions() {
    let mut model = CbAdfModel::new(config(1.0)).unwrap();
    model.learn(&decision("Tom", Some((0, 0.5, 0.8)))).unwrap();

    let mut seen = [false; 3];
    for _ in 0..200 {
        let prediction = model.predict(&decision("Tom", None)).unwrap();
        let total: f32 = prediction.probabilities.iter().sum();
        approx::assert_relative_eq!(total, 1.0, epsilon = 1e-6);
        assert!(prediction.chosen_probability() > 0.0);
        seen[prediction.chosen] = true;
    }
    assert_eq!(seen, [true; 3]);
}

#[test]
fn same_seed_same_choices() {
    let choices = |seed: u64| {
        let mut model = CbAdfModel::new(CbAdfConfig {
            seed,
            ..config(0.5)
        })
        .unwrap();
        model.learn(&decision("Tom", Some((2, -0.5, 0.6)))).unwrap();
        (0..50)
            .map(|_| model.predict(&decision("Tom", None)).unwrap().chosen)
            .collect::<Vec<_>>()
    };
    assert_eq!(choices(3), choices(3));
    assert_ne!(choices(3), choices(4));
}

#[test]
fn masked_actions_are_never_chosen() {
    let mut model = CbAdfModel::new(config(1.0)).unwrap();
    model.learn(&decision("Anna", Some((0, -1.0, 0.9)))).unwrap();

    for _ in 0..100 {
        let masked = decision("Anna", None).with_mask(ActionMask::new([0, 2]));
        let prediction = model.predict(&masked).unwrap();
        assert_eq!(prediction.chosen, 1);
        assert_eq!(prediction.probabilities[0], 0.0);
        assert_eq!(prediction.probabilities[2], 0.0);
        approx::assert_relative_eq!(prediction.probabilities[1], 1.0);
    }
}

#[test]
fn prediction_feeds_the_ranking_event() {
    let mut model = CbAdfModel::new(config(0.3)).unwrap();
    for _ in 0..10 {
        model.learn(&decision("Tom", Some((2, -1.0, 0.7)))).unwrap();
    }
    let prediction = model.predict(&decision("Tom", None)).unwrap();

    // Rank actions by descending probability, chosen action first.
    let mut ranking: Vec<(u32, f32)> = prediction
        .probabilities
        .iter()
        .enumerate()
        .map(|(action, &probability)| (action as u32, probability))
        .collect();
    ranking.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());

    let event = RankingEvent::new("uuid-1", r#"{"User":{"user=Tom":""}}"#, ranking, "model-7");
    let wire = event.serialize();

    // The context is valid JSON here, so the whole event parses back.
    let value: serde_json::Value = serde_json::from_str(&wire).unwrap();
    assert_eq!(value["Version"], "1");
    assert_eq!(value["EventId"], "uuid-1");
    assert_eq!(value["a"].as_array().unwrap().len(), 3);
    assert_eq!(value["p"].as_array().unwrap().len(), 3);
    assert_eq!(value["a"][0], 2);
    assert_eq!(value["VWState"]["m"], "model-7");
}
