//! Reference graph metrics for cross-checking the engine
//!
//! Deliberately independent of the crate's own community code: a plain
//! union-find over the accepted pairs.

use std::collections::{BTreeMap, HashMap};

fn find(parent: &mut HashMap<String, String>, x: &str) -> String {
    let p = parent[x].clone();
    if p == x {
        return p;
    }
    let root = find(parent, &p);
    parent.insert(x.to_string(), root.clone());
    root
}

/// Components as sorted member lists, sorted by their first member
pub fn reference_components(users: &[String], pairs: &[(String, String)]) -> Vec<Vec<String>> {
    let mut parent: HashMap<String, String> =
        users.iter().map(|u| (u.clone(), u.clone())).collect();
    for (a, b) in pairs {
        let ra = find(&mut parent, a);
        let rb = find(&mut parent, b);
        if ra != rb {
            parent.insert(ra, rb);
        }
    }

    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for u in users {
        let root = find(&mut parent, u);
        groups.entry(root).or_default().push(u.clone());
    }
    let mut components: Vec<Vec<String>> = groups
        .into_values()
        .map(|mut members| {
            members.sort();
            members
        })
        .collect();
    components.sort();
    components
}

/// Sizes in descending order
pub fn component_sizes(components: &[Vec<String>]) -> Vec<usize> {
    let mut sizes: Vec<usize> = components.iter().map(Vec::len).collect();
    sizes.sort_unstable_by(|a, b| b.cmp(a));
    sizes
}
