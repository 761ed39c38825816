//! End-to-end review selection and tagging over the in-memory case

mod common;

use cluster_review::{
    CaseStore, ClusterPartitioner, ClusterTagger, ItemRecord, MemoryCase, RunStatus, Selection,
};
use common::{bare, id, ids, member, Call, Recording};

fn run_a() -> MemoryCase {
    let mut case = MemoryCase::new();
    case.add_item(ItemRecord::new("a1").with_parent("e2").with_md5("md5-a1"));
    case.add_item(ItemRecord::new("a2").with_parent("t1").with_md5("md5-a2"));
    case.add_cluster(
        "RunA",
        5,
        vec![
            member("e1", "endpoint"),
            member("e2", "endpoint-attach"),
            member("t1", "thread-attach"),
        ],
    )
    .unwrap();
    case.add_cluster("RunA", -1, vec![member("u1", "endpoint")]).unwrap();
    case
}

#[test]
fn endpoint_attach_cluster_tags_members_and_attachments() {
    let case = run_a();
    let recording = Recording::new(&case);
    let clusters = Selection::new("RunA", vec![5.into()])
        .resolve(&case)
        .unwrap();

    let report = ClusterTagger::new(&recording).tag_all("RunA", &clusters).unwrap();

    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(
        recording.tag_calls(),
        vec![(
            "ClusterReview|RunA|5".to_string(),
            ids(&["e1", "e2", "a1", "a2"])
        )]
    );
    assert_eq!(
        case.items_tagged("ClusterReview|RunA|5"),
        ids(&["a1", "a2", "e1", "e2"])
    );
    assert!(case.tags_for(&id("t1")).is_empty());
}

#[test]
fn descendants_come_from_both_attach_buckets() {
    let case = run_a();
    let recording = Recording::new(&case);
    let cluster = case.list_clusters("RunA").unwrap().remove(1);
    ClusterPartitioner::new(&recording, &recording, &recording)
        .review("RunA", &cluster)
        .unwrap();

    let calls = recording.calls.borrow();
    assert_eq!(calls[0], Call::FindDescendants(ids(&["e2", "t1"])));
    assert_eq!(calls[1], Call::Deduplicate(ids(&["a1", "a2"])));
}

#[test]
fn unclusterable_pseudo_cluster_gets_named_label() {
    let case = run_a();
    let clusters = Selection::new("RunA", vec![(-1).into()])
        .resolve(&case)
        .unwrap();
    let report = ClusterTagger::new(&case).tag_all("RunA", &clusters).unwrap();
    assert_eq!(report.clusters[0].label, "ClusterReview|RunA|unclusterable");
    assert_eq!(
        case.items_tagged("ClusterReview|RunA|unclusterable"),
        ids(&["u1"])
    );
}

#[test]
fn thread_attach_without_endpoint_attach_never_resolves_descendants() {
    let mut case = MemoryCase::new();
    case.add_item(ItemRecord::new("att").with_parent("t1"));
    case.add_cluster("R", 1, vec![member("t1", "thread-attach"), bare("x")])
        .unwrap();
    let recording = Recording::new(&case);
    let clusters = case.list_clusters("R").unwrap();

    let report = ClusterTagger::new(&recording).tag_all("R", &clusters).unwrap();

    assert_eq!(report.clusters[0].tagged, 0);
    assert!(recording.calls.borrow().is_empty());
    assert!(case.labels().is_empty());
}

#[test]
fn rerunning_tags_the_same_items() {
    let case = run_a();
    let clusters = Selection::all(&case, "RunA")
        .unwrap()
        .resolve(&case)
        .unwrap();

    ClusterTagger::new(&case).tag_all("RunA", &clusters).unwrap();
    let first: Vec<_> = case
        .labels()
        .into_iter()
        .map(|l| (l.clone(), case.items_tagged(&l)))
        .collect();

    ClusterTagger::new(&case).tag_all("RunA", &clusters).unwrap();
    let second: Vec<_> = case
        .labels()
        .into_iter()
        .map(|l| (l.clone(), case.items_tagged(&l)))
        .collect();

    assert_eq!(first, second);
    assert_eq!(case.tags_for(&id("e1")), vec!["ClusterReview|RunA|5".to_string()]);
}

#[test]
fn default_selection_leaves_pseudo_clusters_untagged() {
    let case = run_a();
    let clusters = Selection::default_for(&case, "RunA")
        .unwrap()
        .resolve(&case)
        .unwrap();
    ClusterTagger::new(&case).tag_all("RunA", &clusters).unwrap();
    assert!(case.tags_for(&id("u1")).is_empty());
    assert_eq!(case.labels(), vec!["ClusterReview|RunA|5".to_string()]);
}

#[test]
fn attachment_shared_between_sources_is_added_once() {
    let mut case = MemoryCase::new();
    case.add_item(ItemRecord::new("copy1").with_parent("e1").with_md5("same"));
    case.add_item(ItemRecord::new("copy2").with_parent("t1").with_md5("same"));
    case.add_cluster(
        "R",
        9,
        vec![member("e1", "endpoint-attach"), member("t1", "thread-attach")],
    )
    .unwrap();
    let clusters = case.list_clusters("R").unwrap();
    let report = ClusterTagger::new(&case).tag_all("R", &clusters).unwrap();
    assert_eq!(report.clusters[0].tagged, 2);
    assert_eq!(case.items_tagged("ClusterReview|R|9"), ids(&["copy1", "e1"]));
}

#[test]
fn runs_with_overlapping_key_text_tag_independently() {
    let mut case = MemoryCase::new();
    case.add_cluster("R", -1, vec![member("x", "endpoint")]).unwrap();
    case.add_cluster("R-", 1, vec![member("x", "thread")]).unwrap();
    let clusters = case.list_clusters("R").unwrap();

    let report = ClusterTagger::new(&case).tag_all("R", &clusters).unwrap();

    assert_eq!(report.clusters[0].tagged, 1);
    assert_eq!(
        case.tags_for(&id("x")),
        vec!["ClusterReview|R|unclusterable".to_string()]
    );
}
