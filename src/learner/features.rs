//! Hashed feature assembly for one action candidate.

use crate::data::Example;
use crate::hashing::{FeatureHasher, SubModel};

/// A namespace interaction term.
///
/// Namespaces are matched by full name across every contributing row; an
/// interaction over an absent namespace simply contributes nothing.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Interaction {
    /// Cross every feature of the first namespace with every feature of
    /// the second (e.g. context × action).
    Quadratic(String, String),
    /// Three-way cross (e.g. context × action × feedback, the decoder's
    /// feature space).
    Cubic(String, String, String),
}

/// Hash the features of one action candidate into `(index, value)` pairs.
///
/// Base features come from every row in `rows` (shared context, the action
/// row, and for the decoder the feedback row); interaction terms cross
/// the hashed features of the named namespaces, multiplying values and
/// combining hashes with the commutative combinator. Raw hashes keep full
/// width until the final addressing step so interaction entropy is not
/// lost to early masking.
pub(crate) fn assemble_features(
    hasher: &FeatureHasher,
    rows: &[&Example],
    interactions: &[Interaction],
    sub_model: Option<SubModel>,
) -> Vec<(u32, f32)> {
    let mut raw: Vec<(u32, f32)> = Vec::new();
    // Hashed features grouped by namespace name, merged across rows.
    let mut by_namespace: Vec<(&str, Vec<(u32, f32)>)> = Vec::new();

    for row in rows {
        for namespace in &row.namespaces {
            let seed = hasher.namespace_seed(&namespace.name);
            let mut hashed = Vec::with_capacity(namespace.features.len());
            for (token, value) in &namespace.features {
                let hash = hasher.token(seed, token);
                hashed.push((hash, *value));
                raw.push((hash, *value));
            }
            match by_namespace
                .iter_mut()
                .find(|(name, _)| *name == namespace.name)
            {
                Some((_, existing)) => existing.extend(hashed),
                None => by_namespace.push((namespace.name.as_str(), hashed)),
            }
        }
    }

    let lookup = |name: &str| -> &[(u32, f32)] {
        by_namespace
            .iter()
            .find(|(n, _)| *n == name)
            .map_or(&[], |(_, features)| features.as_slice())
    };

    for interaction in interactions {
        match interaction {
            Interaction::Quadratic(a, b) => {
                for &(hash_a, value_a) in lookup(a) {
                    for &(hash_b, value_b) in lookup(b) {
                        raw.push((FeatureHasher::combine(hash_a, hash_b), value_a * value_b));
                    }
                }
            }
            Interaction::Cubic(a, b, c) => {
                for &(hash_a, value_a) in lookup(a) {
                    for &(hash_b, value_b) in lookup(b) {
                        let pair = FeatureHasher::combine(hash_a, hash_b);
                        for &(hash_c, value_c) in lookup(c) {
                            raw.push((
                                FeatureHasher::combine(pair, hash_c),
                                value_a * value_b * value_c,
                            ));
                        }
                    }
                }
            }
        }
    }

    raw.into_iter()
        .map(|(hash, value)| (hasher.address(hash, sub_model), value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Namespace;
    use crate::hashing::WeightKey;

    fn context() -> Example {
        Example::new().with_namespace(Namespace::new("User").with_feature("user=Tom"))
    }

    fn action() -> Example {
        Example::new().with_namespace(Namespace::new("Action").with_feature("article=sports"))
    }

    #[test]
    fn base_features_from_all_rows() {
        let hasher = FeatureHasher::new(18);
        let (context, action) = (context(), action());
        let features = assemble_features(&hasher, &[&context, &action], &[], None);
        assert_eq!(features.len(), 2);
        assert!(features.iter().all(|&(index, _)| index < 1 << 18));
    }

    #[test]
    fn quadratic_adds_cross_terms() {
        let hasher = FeatureHasher::new(18);
        let (context, action) = (context(), action());
        let interactions = vec![Interaction::Quadratic("User".into(), "Action".into())];
        let features = assemble_features(&hasher, &[&context, &action], &interactions, None);
        // 2 base + 1 cross.
        assert_eq!(features.len(), 3);
    }

    #[test]
    fn interaction_over_absent_namespace_is_empty() {
        let hasher = FeatureHasher::new(18);
        let context = context();
        let interactions = vec![Interaction::Quadratic("User".into(), "Missing".into())];
        let features = assemble_features(&hasher, &[&context], &interactions, None);
        assert_eq!(features.len(), 1);
    }

    #[test]
    fn cubic_multiplies_values() {
        let hasher = FeatureHasher::new(18);
        let a = Example::new().with_namespace(Namespace::new("A").with_weighted("x", 2.0));
        let b = Example::new().with_namespace(Namespace::new("B").with_weighted("y", 3.0));
        let c = Example::new().with_namespace(Namespace::new("C").with_weighted("z", 0.5));
        let interactions = vec![Interaction::Cubic("A".into(), "B".into(), "C".into())];
        let features = assemble_features(&hasher, &[&a, &b, &c], &interactions, None);
        // 3 base + 1 cubic with value 2 × 3 × 0.5.
        assert_eq!(features.len(), 4);
        assert_eq!(features[3].1, 3.0);
    }

    #[test]
    fn sub_model_addressing_tags_every_index() {
        let hasher = FeatureHasher::new(18);
        let (context, action) = (context(), action());
        let rows: [&Example; 2] = [&context, &action];

        let policy = assemble_features(&hasher, &rows, &[], Some(SubModel::Policy));
        let plain = assemble_features(&hasher, &rows, &[], None);

        assert!(policy.iter().all(|&(index, _)| index & 1 == 0));
        for (&(tagged, _), &(base, _)) in policy.iter().zip(&plain) {
            assert_eq!(WeightKey::decode(tagged).base, base);
        }
    }
}
