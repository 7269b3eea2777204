//! Candidate bone names for root and tip pickers.
//!
//! Both walks are iterative: skeleton depth is caller-controlled and a deep
//! rig must not exhaust the call stack.

use lightik_core::traits::SkeletonProvider;
use lightik_core::types::BoneId;

/// Bones that may be picked as root for the given tip.
///
/// With no tip every bone qualifies, in skeleton order. Otherwise only the
/// tip's ancestors qualify, ordered from the structural root down to the
/// tip's parent.
pub fn root_candidates(skeleton: &impl SkeletonProvider, tip: Option<BoneId>) -> Vec<String> {
    let Some(tip) = tip else {
        return skeleton.all_bone_names();
    };

    let mut names = Vec::new();
    let mut current = skeleton.bone_parent(tip);
    while let Some(bone) = current {
        if names.len() >= skeleton.bone_count() {
            break;
        }
        if let Some(name) = skeleton.bone_name(bone) {
            names.push(name.to_owned());
        }
        current = skeleton.bone_parent(bone);
    }
    names.reverse();
    names
}

/// Bones that may be picked as tip for the given root.
///
/// With no root every bone qualifies, in skeleton order. Otherwise every
/// descendant of the root qualifies (the root itself excluded), collected
/// depth-first with an explicit stack. Children are pushed in reverse so
/// they pop in skeleton order, which keeps the listing stable.
pub fn tip_candidates(skeleton: &impl SkeletonProvider, root: Option<BoneId>) -> Vec<String> {
    let Some(root) = root else {
        return skeleton.all_bone_names();
    };

    let mut names = Vec::new();
    let mut pending: Vec<BoneId> = skeleton.bone_children(root).iter().rev().copied().collect();
    while let Some(bone) = pending.pop() {
        if names.len() >= skeleton.bone_count() {
            break;
        }
        if let Some(name) = skeleton.bone_name(bone) {
            names.push(name.to_owned());
        }
        pending.extend(skeleton.bone_children(bone).iter().rev().copied());
    }
    names
}

/// Comma-joined picker string, as editor enum hints expect.
pub fn enum_hint(names: &[String]) -> String {
    names.join(",")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
