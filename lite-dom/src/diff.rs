//! Structural diff between two [`VNode`] snapshots.
//!
//! Used to check that a live tree reached the same shape as a freshly built
//! one. An empty patch list means the snapshots are structurally identical.

use crate::{Props, VNode};

#[derive(Debug, Clone, PartialEq)]
pub enum Patch {
    Replace(VNode),
    SetData(String),
    SetAttr(String, String),
    RemoveAttr(String),
    UpdateChild(usize, Vec<Patch>),
    InsertChild(usize, VNode),
    RemoveChild(usize),
}

pub fn diff(old: &VNode, new: &VNode) -> Vec<Patch> {
    match (old, new) {
        (VNode::Text(a), VNode::Text(b)) | (VNode::Comment(a), VNode::Comment(b)) => {
            if a == b { vec![] } else { vec![Patch::SetData(b.clone())] }
        }
        (
            VNode::Element { tag: tag_a, props: props_a, children: children_a },
            VNode::Element { tag: tag_b, props: props_b, children: children_b },
        ) if tag_a == tag_b => {
            let mut patches = diff_props(props_a, props_b);
            patches.extend(diff_children(children_a, children_b));
            patches
        }
        _ => vec![Patch::Replace(new.clone())],
    }
}

pub fn is_identical(a: &VNode, b: &VNode) -> bool {
    diff(a, b).is_empty()
}

fn diff_props(a: &Props, b: &Props) -> Vec<Patch> {
    let mut changed: Vec<Patch> = b
        .attrs
        .iter()
        .filter(|(k, v)| a.attrs.get(*k) != Some(*v))
        .map(|(k, v)| Patch::SetAttr(k.clone(), v.clone()))
        .collect();
    changed.extend(
        a.attrs
            .keys()
            .filter(|k| !b.attrs.contains_key(*k))
            .map(|k| Patch::RemoveAttr(k.clone())),
    );
    changed
}

fn diff_children(a: &[VNode], b: &[VNode]) -> Vec<Patch> {
    let mut patches: Vec<Patch> = a
        .iter()
        .zip(b)
        .enumerate()
        .filter_map(|(i, (old, new))| {
            let child = diff(old, new);
            (!child.is_empty()).then_some(Patch::UpdateChild(i, child))
        })
        .collect();
    patches.extend(b.iter().enumerate().skip(a.len()).map(|(i, n)| Patch::InsertChild(i, n.clone())));
    // Removes, highest index first
    patches.extend((b.len()..a.len()).rev().map(Patch::RemoveChild));
    patches
}
