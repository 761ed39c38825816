//! Randomized checks of review-set invariants over generated clusters

mod common;

use cluster_review::{
    CaseStore, ClusterPartitioner, DescendantResolver, ItemRecord, MemberRecord, MemoryCase,
};
use common::id;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;

const STATUSES: [Option<&str>; 6] = [
    Some("endpoint"),
    Some("endpoint-attach"),
    Some("thread-attach"),
    Some("thread"),
    Some("duplicate"),
    None,
];

/// A case with one cluster of random members, each with up to three
/// attachments drawn from a small digest pool so duplicates occur.
fn random_case(rng: &mut StdRng, cluster: i64) -> MemoryCase {
    let mut case = MemoryCase::new();
    let size = rng.gen_range(0..12);
    let mut members = Vec::with_capacity(size);
    for m in 0..size {
        let guid = format!("m{}", m);
        for a in 0..rng.gen_range(0..4) {
            let mut attachment =
                ItemRecord::new(format!("{}-a{}", guid, a)).with_parent(guid.as_str());
            if rng.gen_bool(0.7) {
                attachment = attachment.with_md5(format!("d{}", rng.gen_range(0..5)));
            }
            case.add_item(attachment);
        }
        members.push(MemberRecord {
            item: id(&guid),
            status: STATUSES[rng.gen_range(0..STATUSES.len())].map(str::to_string),
        });
    }
    case.add_cluster("R", cluster, members).unwrap();
    case
}

fn status_set(case: &MemoryCase, status: &str) -> HashSet<String> {
    let cluster = case.list_clusters("R").unwrap().remove(0);
    let key = cluster_review::ClusterKey::new("R", cluster.id);
    cluster
        .members
        .iter()
        .filter(|m| case.endpoint_status(m, &key).unwrap().as_deref() == Some(status))
        .map(|m| m.to_string())
        .collect()
}

#[test]
fn review_set_stays_within_cluster_and_attachments() {
    let mut rng = StdRng::seed_from_u64(0x5EED);
    for round in 0..200 {
        let case = random_case(&mut rng, round);
        let cluster = case.list_clusters("R").unwrap().remove(0);
        let review = ClusterPartitioner::new(&case, &case, &case)
            .review("R", &cluster)
            .unwrap();

        let mut allowed: HashSet<_> = cluster.members.iter().cloned().collect();
        allowed.extend(case.find_descendants(&cluster.members).unwrap());
        for item in review.items() {
            assert!(allowed.contains(item), "round {}: foreign item {}", round, item);
        }
    }
}

#[test]
fn gating_and_membership_follow_statuses() {
    let mut rng = StdRng::seed_from_u64(42);
    for round in 0..200 {
        let case = random_case(&mut rng, round);
        let cluster = case.list_clusters("R").unwrap().remove(0);
        let review = ClusterPartitioner::new(&case, &case, &case)
            .review("R", &cluster)
            .unwrap();

        let endpoints = status_set(&case, "endpoint");
        let endpoint_attach = status_set(&case, "endpoint-attach");
        let split = review.endpoints() + review.endpoint_attachments();
        let direct: HashSet<String> = review.items()[..split]
            .iter()
            .map(|i| i.to_string())
            .collect();

        assert_eq!(review.endpoints(), endpoints.len());
        assert_eq!(
            direct,
            endpoints.union(&endpoint_attach).cloned().collect::<HashSet<_>>()
        );

        if endpoint_attach.is_empty() {
            assert_eq!(review.descendants(), 0, "round {}", round);
            assert_eq!(review.len(), endpoints.len());
        }

        let expansion = &review.items()[split..];
        let unique: HashSet<_> = expansion.iter().collect();
        assert_eq!(unique.len(), expansion.len(), "round {}: repeated descendant", round);
    }
}
