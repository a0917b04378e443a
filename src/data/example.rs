//! Example containers.

use super::mask::ActionMask;

/// One named namespace holding a multiset of weighted feature tokens.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Namespace {
    /// Namespace name; hashed to seed the token hashes.
    pub name: String,
    /// Tokens with values. Repeated tokens are legal (multiset semantics).
    pub features: Vec<(String, f32)>,
}

impl Namespace {
    /// Create an empty namespace.
    pub fn new(name: impl Into<String>) -> Self {
        Namespace {
            name: name.into(),
            features: Vec::new(),
        }
    }

    /// Add a token with value 1.0.
    pub fn with_feature(mut self, token: impl Into<String>) -> Self {
        self.features.push((token.into(), 1.0));
        self
    }

    /// Add a token with an explicit value.
    pub fn with_weighted(mut self, token: impl Into<String>, value: f32) -> Self {
        self.features.push((token.into(), value));
        self
    }
}

/// Logged contextual-bandit label, attached to the chosen action row.
///
/// The chosen index is implied by which action row carries the label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CbLabel {
    /// Observed cost of the chosen action (lower is better).
    pub cost: f32,
    /// Probability with which the logging policy chose the action.
    /// Must be positive for valid importance weighting; the core does not
    /// validate it (a zero propagates as inf/NaN, a data issue).
    pub probability: f32,
}

/// One feature row: namespaces, an optional label, an importance weight.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Example {
    /// Ordered namespaces of this row.
    pub namespaces: Vec<Namespace>,
    /// Contextual-bandit label; present on at most one action row per
    /// decision.
    pub label: Option<CbLabel>,
    /// Importance weight. `None` means 1.0.
    pub importance: Option<f32>,
}

impl Example {
    /// Create an empty row.
    pub fn new() -> Self {
        Example::default()
    }

    /// Append a namespace.
    pub fn with_namespace(mut self, namespace: Namespace) -> Self {
        self.namespaces.push(namespace);
        self
    }

    /// Attach a contextual-bandit label.
    pub fn with_label(mut self, cost: f32, probability: f32) -> Self {
        self.label = Some(CbLabel { cost, probability });
        self
    }

    /// Set the importance weight.
    pub fn with_importance(mut self, importance: f32) -> Self {
        self.importance = Some(importance);
        self
    }

    /// Importance weight, defaulting to 1.0.
    #[inline]
    pub fn importance(&self) -> f32 {
        self.importance.unwrap_or(1.0)
    }
}

/// One decision: shared context, action candidates, optional feedback and
/// action mask.
///
/// Created per decision, passed through learn()/predict(), then released
/// by the caller. The feedback row is only consumed by
/// interaction-grounded learning; contextual-bandit training ignores it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultiExample {
    /// Shared, action-independent context row.
    pub shared: Option<Example>,
    /// Ordered action candidate rows.
    pub actions: Vec<Example>,
    /// Feedback row (interaction-grounded learning only).
    pub feedback: Option<Example>,
    /// Actions excluded at prediction time.
    pub mask: Option<ActionMask>,
}

impl MultiExample {
    /// Create an empty decision.
    pub fn new() -> Self {
        MultiExample::default()
    }

    /// Set the shared context row.
    pub fn with_shared(mut self, shared: Example) -> Self {
        self.shared = Some(shared);
        self
    }

    /// Append an action candidate row.
    pub fn with_action(mut self, action: Example) -> Self {
        self.actions.push(action);
        self
    }

    /// Set the feedback row.
    pub fn with_feedback(mut self, feedback: Example) -> Self {
        self.feedback = Some(feedback);
        self
    }

    /// Attach an action mask.
    pub fn with_mask(mut self, mask: ActionMask) -> Self {
        self.mask = Some(mask);
        self
    }

    /// Number of action candidate rows.
    #[inline]
    pub fn n_actions(&self) -> usize {
        self.actions.len()
    }

    /// The labeled (chosen) action row, if any: `(row index, label)`.
    pub fn cb_label(&self) -> Option<(usize, CbLabel)> {
        self.actions
            .iter()
            .enumerate()
            .find_map(|(row, action)| action.label.map(|label| (row, label)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_row_is_found() {
        let decision = MultiExample::new()
            .with_action(Example::new())
            .with_action(Example::new().with_label(0.5, 0.8))
            .with_action(Example::new());

        let (row, label) = decision.cb_label().unwrap();
        assert_eq!(row, 1);
        assert_eq!(label.cost, 0.5);
        assert_eq!(label.probability, 0.8);
    }

    #[test]
    fn unlabeled_decision_has_no_label() {
        let decision = MultiExample::new().with_action(Example::new());
        assert!(decision.cb_label().is_none());
    }

    #[test]
    fn importance_defaults_to_one() {
        assert_eq!(Example::new().importance(), 1.0);
        assert_eq!(Example::new().with_importance(0.6).importance(), 0.6);
    }
}
