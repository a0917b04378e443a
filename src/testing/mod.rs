//! Canned example fixtures for unit and integration tests.
//!
//! The news-article set: a shared user context, three article actions,
//! a click feedback row, and a logged label on the chosen article. The
//! same decisions drive the contextual-bandit tests, the decoder tests,
//! and the interleaved-vs-independent equivalence tests.

use crate::data::{Example, MultiExample, Namespace};
use crate::error::BanditError;
use crate::learner::Interaction;

/// Policy-side interactions for the news fixtures (context × action).
pub fn news_policy_interactions() -> Vec<Interaction> {
    vec![Interaction::Quadratic("User".into(), "Action".into())]
}

/// Decoder-side interactions for the news fixtures
/// (context × action × feedback).
pub fn news_decoder_interactions() -> Vec<Interaction> {
    vec![Interaction::Cubic(
        "User".into(),
        "Action".into(),
        "Feedback".into(),
    )]
}

fn article_action(article: &str) -> Example {
    Example::new()
        .with_namespace(Namespace::new("Action").with_feature(format!("article={article}")))
}

fn news_decision(
    user: &str,
    time_of_day: &str,
    labeled: (usize, f32, f32),
    feedback: &str,
) -> MultiExample {
    let (labeled_row, cost, probability) = labeled;
    let mut decision = MultiExample::new().with_shared(
        Example::new().with_namespace(
            Namespace::new("User")
                .with_feature(format!("user={user}"))
                .with_feature(format!("time_of_day={time_of_day}")),
        ),
    );
    for (row, article) in ["sports", "politics", "music"].iter().enumerate() {
        let mut action = article_action(article);
        if row == labeled_row {
            action = action.with_label(cost, probability);
        }
        decision = decision.with_action(action);
    }
    decision.with_feedback(
        Example::new().with_namespace(Namespace::new("Feedback").with_weighted(feedback, 1.0)),
    )
}

/// The first `num` canned news decisions (at most 2 exist).
///
/// Decision 1: Tom in the morning, sports chosen with cost 0.5 at
/// probability 0.8. Decision 2: Anna in the afternoon, politics chosen
/// with cost −1 at probability 0.1. Both carry a click feedback row.
///
/// Requesting more decisions than exist fails with a validation error;
/// no partial result is returned.
pub fn multiline_examples(num: usize) -> Result<Vec<MultiExample>, BanditError> {
    let all = vec![
        news_decision("Tom", "morning", (0, 0.5, 0.8), "click"),
        news_decision("Anna", "afternoon", (1, -1.0, 0.1), "click"),
    ];
    if num > all.len() {
        return Err(BanditError::FixtureOutOfRange {
            requested: num,
            available: all.len(),
        });
    }
    Ok(all.into_iter().take(num).collect())
}
