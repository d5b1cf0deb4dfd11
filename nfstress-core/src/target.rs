//! Uniform target selection over an immutable candidate snapshot

use rand::Rng;
use std::fmt;
use std::sync::Arc;

use crate::error::{CoreError, Result};
use crate::types::NfKind;

/// An immutable, non-empty set of candidates resolved once per run
///
/// Cloning is cheap; every job reads the same snapshot.
#[derive(Debug, Clone)]
pub struct CandidateSet<T> {
    label: &'static str,
    items: Arc<[T]>,
}

impl<T: Clone + PartialEq> CandidateSet<T> {
    /// Build a snapshot, dropping duplicates while keeping first-seen order
    pub fn new(label: &'static str, items: impl IntoIterator<Item = T>) -> Result<Self> {
        let mut unique: Vec<T> = Vec::new();
        for item in items {
            if !unique.contains(&item) {
                unique.push(item);
            }
        }

        if unique.is_empty() {
            return Err(CoreError::NoCandidates(label.to_string()));
        }

        Ok(Self {
            label,
            items: unique.into(),
        })
    }
}

impl<T> CandidateSet<T> {
    /// Pick one candidate uniformly at random
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> &T {
        let index = rng.random_range(0..self.items.len());
        &self.items[index]
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

impl<T: fmt::Display> fmt::Display for CandidateSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.items.iter().map(ToString::to_string).collect();
        write!(f, "{}", names.join(","))
    }
}

/// Sender contexts, requester kinds and target kinds for a run
#[derive(Debug, Clone)]
pub struct TargetSelector {
    senders: CandidateSet<String>,
    targets: CandidateSet<NfKind>,
    requesters: Option<CandidateSet<NfKind>>,
}

/// What the selector chose for one job
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub sender: String,
    pub target: NfKind,
    pub requester: Option<NfKind>,
}

impl TargetSelector {
    pub fn new(
        senders: CandidateSet<String>,
        targets: CandidateSet<NfKind>,
        requesters: Option<CandidateSet<NfKind>>,
    ) -> Self {
        Self {
            senders,
            targets,
            requesters,
        }
    }

    /// Independent uniform picks of sender, target and requester
    pub fn select<R: Rng + ?Sized>(&self, rng: &mut R) -> Selection {
        Selection {
            sender: self.senders.pick(rng).clone(),
            target: self.targets.pick(rng).clone(),
            requester: self.requesters.as_ref().map(|r| r.pick(rng).clone()),
        }
    }

    pub fn senders(&self) -> &CandidateSet<String> {
        &self.senders
    }

    pub fn targets(&self) -> &CandidateSet<NfKind> {
        &self.targets
    }

    pub fn requesters(&self) -> Option<&CandidateSet<NfKind>> {
        self.requesters.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    #[test]
    fn test_empty_set_is_no_candidates() {
        let err = CandidateSet::<String>::new("sender", Vec::new()).unwrap_err();
        assert!(err.is_no_candidates());
        assert_eq!(err.to_string(), "No sender candidates available");
    }

    #[test]
    fn test_duplicates_are_collapsed() {
        let set = CandidateSet::new(
            "sender",
            vec!["oai-amf".to_string(), "oai-smf".into(), "oai-amf".into()],
        )
        .unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.to_string(), "oai-amf,oai-smf");
    }

    #[test]
    fn test_pick_is_roughly_uniform() {
        let set = CandidateSet::new("target", vec![NfKind::Amf, NfKind::Smf, NfKind::Udm]).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let mut counts: HashMap<NfKind, usize> = HashMap::new();

        for _ in 0..9_000 {
            *counts.entry(set.pick(&mut rng).clone()).or_default() += 1;
        }

        assert_eq!(counts.len(), 3);
        for count in counts.values() {
            assert!(*count > 2_500 && *count < 3_500, "skewed count {}", count);
        }
    }

    #[test]
    fn test_selector_only_picks_requester_when_configured() {
        let senders = CandidateSet::new("sender", vec!["oai-amf".to_string()]).unwrap();
        let targets = CandidateSet::new("target", vec![NfKind::Udm]).unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        let plain = TargetSelector::new(senders.clone(), targets.clone(), None);
        let selection = plain.select(&mut rng);
        assert_eq!(selection.sender, "oai-amf");
        assert_eq!(selection.target, NfKind::Udm);
        assert!(selection.requester.is_none());

        let requesters = CandidateSet::new("requester", vec![NfKind::Smf]).unwrap();
        let with_requester = TargetSelector::new(senders, targets, Some(requesters));
        assert_eq!(
            with_requester.select(&mut rng).requester,
            Some(NfKind::Smf)
        );
    }
}
