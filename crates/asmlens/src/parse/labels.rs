//! Two-level label registration and deferred edge resolution.
//!
//! Global labels (any name not starting with `.L`) open a scope; local
//! labels are recorded in the dictionary of the most recent global. Branch
//! and jump targets are deferred during the parse and resolved once all
//! declarations are known, at which point mirrored inbound/outbound edge
//! pairs are installed on the blocks.

use std::collections::HashMap;

use super::types::{AsmBlock, AsmEdge, AsmEdgeKind, AsmLineRef};

/// Prefix identifying a local label.
const LOCAL_PREFIX: &str = ".L";

/// Sentinel for a deferred target recorded before any global label.
const NO_GLOBAL: u32 = u32::MAX;

struct GlobalLabel<'a> {
    global_ref: AsmLineRef,
    locals: HashMap<&'a str, AsmLineRef>,
}

/// A branch/jump operand waiting for the declaration pass to finish.
struct DeferredTarget<'a> {
    /// Block of the global label in scope at the branch site; local names
    /// resolve through that global's dictionary.
    global_block: u32,
    /// The branch/jump line itself.
    origin: AsmLineRef,
    /// Conditional branches additionally fall through to the next block.
    fall_through: bool,
    /// `None` when the branch had no label-shaped operand (a Wasm depth
    /// number, say); only the fall-through edge can come of it then.
    name: Option<&'a str>,
}

/// Label state accumulated during a single parse.
///
/// Keys are `&str` slices of the input buffer, so lookup hashes and
/// compares label names by content, never by buffer position. The table
/// only lives until [`LabelTable::resolve_edges`] runs.
pub(crate) struct LabelTable<'a> {
    globals: HashMap<&'a str, GlobalLabel<'a>>,
    /// Reverse map: block of a global-label declaration to its name.
    block_globals: HashMap<u32, &'a str>,
    current: Option<&'a str>,
    current_block: u32,
    deferred: Vec<DeferredTarget<'a>>,
}

impl<'a> LabelTable<'a> {
    pub fn new() -> Self {
        LabelTable {
            globals: HashMap::new(),
            block_globals: HashMap::new(),
            current: None,
            current_block: NO_GLOBAL,
            deferred: Vec::new(),
        }
    }

    /// Register a label declaration at `at`. The name must already have its
    /// trailing colon stripped.
    pub fn declare(&mut self, name: &'a str, at: AsmLineRef) {
        if name.starts_with(LOCAL_PREFIX) {
            // A local before any global has no scope to land in.
            if let Some(global) = self.current.and_then(|g| self.globals.get_mut(g)) {
                global.locals.insert(name, at);
            }
            return;
        }
        let entry = self.globals.entry(name).or_insert_with(|| GlobalLabel {
            global_ref: at,
            locals: HashMap::new(),
        });
        entry.global_ref = at;
        self.current = Some(name);
        self.current_block = at.block;
        self.block_globals.insert(at.block, name);
    }

    /// Record a branch/jump target for post-parse resolution.
    pub fn defer(&mut self, name: Option<&'a str>, origin: AsmLineRef, fall_through: bool) {
        self.deferred.push(DeferredTarget {
            global_block: self.current_block,
            origin,
            fall_through,
            name,
        });
    }

    /// Resolve all deferred targets and install sorted edge pairs.
    ///
    /// Unknown targets are skipped silently: listings routinely branch to
    /// runtime helpers (`__divsi3`) that are not declared in the text. A
    /// conditional branch on the final block has no fall-through block, and
    /// that edge is skipped as well.
    pub fn resolve_edges(self, blocks: &mut [AsmBlock]) {
        for deferred in &self.deferred {
            if let Some(target) = self.resolve(deferred) {
                install_edge_pair(blocks, deferred.origin, target);
            }
            if deferred.fall_through {
                let next = deferred.origin.block + 1;
                if (next as usize) < blocks.len() {
                    install_edge_pair(blocks, deferred.origin, AsmLineRef::new(next, 0));
                }
            }
        }
        for block in blocks {
            block
                .edges
                .sort_by_key(|e| (e.kind, e.target, e.origin));
        }
    }

    fn resolve(&self, deferred: &DeferredTarget<'a>) -> Option<AsmLineRef> {
        let name = deferred.name?;
        if name.starts_with(LOCAL_PREFIX) {
            let global = self.block_globals.get(&deferred.global_block)?;
            self.globals.get(global)?.locals.get(name).copied()
        } else {
            self.globals.get(name).map(|g| g.global_ref)
        }
    }
}

fn install_edge_pair(blocks: &mut [AsmBlock], origin: AsmLineRef, target: AsmLineRef) {
    if let Some(block) = blocks.get_mut(origin.block as usize) {
        block.edges.push(AsmEdge {
            kind: AsmEdgeKind::OutBound,
            origin,
            target,
        });
    }
    if let Some(block) = blocks.get_mut(target.block as usize) {
        block.edges.push(AsmEdge {
            kind: AsmEdgeKind::InBound,
            origin,
            target,
        });
    }
}
