//! Community detection scenarios
//!
//! Run with: `cargo test --test communities`

mod common;

use common::graph_builder::id;
use common::{component_sizes, random_graph, reference_components, GraphBuilder, RandomGraphConfig};
use socialgraph::{SocialGraph, UserId};

fn sorted(components: Vec<Vec<UserId>>) -> Vec<Vec<String>> {
    let mut out: Vec<Vec<String>> = components
        .into_iter()
        .map(|c| {
            let mut members: Vec<String> = c.into_iter().map(|u| u.to_string()).collect();
            members.sort();
            members
        })
        .collect();
    out.sort();
    out
}

fn largest_handles(graph: &SocialGraph) -> Vec<String> {
    let mut out: Vec<String> = graph
        .most_social_community()
        .unwrap()
        .into_iter()
        .map(|u| u.id.to_string())
        .collect();
    out.sort();
    out
}

#[test]
fn empty_graph_has_no_communities() {
    let graph = GraphBuilder::new().build();
    assert_eq!(graph.count_communities().unwrap(), 0);
    assert!(graph.most_social_community().unwrap().is_empty());
}

#[test]
fn isolated_users_each_form_a_community() {
    let graph = GraphBuilder::new().users(&["alice", "bobby", "carol"]).build();
    assert_eq!(graph.count_communities().unwrap(), 3);
    assert_eq!(graph.most_social_community().unwrap().len(), 1);
}

#[test]
fn pending_requests_do_not_connect() {
    let graph = GraphBuilder::new()
        .users(&["alice", "bobby", "carol"])
        .request("alice", "bobby")
        .request("carol", "bobby")
        .build();
    assert_eq!(graph.count_communities().unwrap(), 3);
}

#[test]
fn fully_connected_is_one_community() {
    let names = ["alice", "bobby", "carol", "derek"];
    let mut builder = GraphBuilder::new().users(&names);
    for (i, a) in names.iter().enumerate() {
        for b in &names[i + 1..] {
            builder = builder.friends(a, b);
        }
    }
    let graph = builder.build();

    assert_eq!(graph.count_communities().unwrap(), 1);
    assert_eq!(largest_handles(&graph), vec!["alice", "bobby", "carol", "derek"]);
}

#[test]
fn two_disjoint_pairs() {
    let graph = GraphBuilder::new()
        .users(&["alice", "bobby", "carol", "derek"])
        .friends("alice", "bobby")
        .friends("carol", "derek")
        .build();

    assert_eq!(graph.count_communities().unwrap(), 2);
    let largest = largest_handles(&graph);
    assert!(
        largest == vec!["alice", "bobby"] || largest == vec!["carol", "derek"],
        "unexpected community {:?}",
        largest
    );
}

#[test]
fn two_pairs_and_a_loner() {
    let graph = GraphBuilder::new()
        .users(&["alice", "bobby", "carol", "derek", "ellen"])
        .friends("alice", "bobby")
        .friends("carol", "derek")
        .build();

    assert_eq!(graph.count_communities().unwrap(), 3);
    // tie between the two pairs: the first found wins, which is alice's
    assert_eq!(largest_handles(&graph), vec!["alice", "bobby"]);
}

#[test]
fn chain_of_friends_is_one_community() {
    let graph = GraphBuilder::new()
        .users(&["alice", "bobby", "carol", "derek"])
        .friends("alice", "bobby")
        .friends("bobby", "carol")
        .friends("carol", "derek")
        .build();
    assert_eq!(graph.count_communities().unwrap(), 1);
}

#[test]
fn unfriending_splits_a_community() {
    let graph = GraphBuilder::new()
        .users(&["alice", "bobby", "carol"])
        .friends("alice", "bobby")
        .friends("bobby", "carol")
        .build();
    assert_eq!(graph.count_communities().unwrap(), 1);

    graph.unfriend(&id("carol"), &id("bobby")).unwrap();
    assert_eq!(graph.count_communities().unwrap(), 2);
    assert_eq!(largest_handles(&graph), vec!["alice", "bobby"]);
}

#[test]
fn communities_partition_users() {
    let (graph, _) = random_graph(&RandomGraphConfig::default());
    let components = graph.communities().unwrap();

    let total: usize = components.iter().map(Vec::len).sum();
    assert_eq!(total, graph.all_users().unwrap().len());

    let mut all: Vec<UserId> = components.into_iter().flatten().collect();
    all.sort();
    all.dedup();
    assert_eq!(all.len(), total);
}

#[test]
fn random_graphs_match_reference() {
    for seed in 0..10 {
        let config = RandomGraphConfig {
            seed,
            ..RandomGraphConfig::default()
        };
        let (graph, accepted) = random_graph(&config);
        let users: Vec<String> = graph
            .all_users()
            .unwrap()
            .into_iter()
            .map(|u| u.id.to_string())
            .collect();

        let expected = reference_components(&users, &accepted);
        let actual = sorted(graph.communities().unwrap());
        assert_eq!(actual, expected, "seed {}", seed);

        let largest = graph.most_social_community().unwrap().len();
        assert_eq!(largest, component_sizes(&expected)[0], "seed {}", seed);
    }
}

#[test]
fn friends_are_always_in_the_same_community() {
    let (graph, accepted) = random_graph(&RandomGraphConfig {
        friend_probability: 0.08,
        ..RandomGraphConfig::default()
    });
    let components = graph.communities().unwrap();
    let community_of = |u: &str| {
        components
            .iter()
            .position(|c| c.contains(&id(u)))
            .expect("every user is in a community")
    };
    for (a, b) in &accepted {
        assert_eq!(community_of(a), community_of(b));
    }
}
