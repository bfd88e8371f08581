//! Block-graph construction scenarios: block boundaries, label
//! resolution, and edge symmetry across dialects.

use asmlens::{
    AsmBlockKind, AsmEdgeKind, AsmLineKind, AsmLineRef, AsmTokenKind, Dialect, Disassembler,
    NullSourceReader, RenderOptions,
};

fn analyze(input: &str, dialect: Dialect) -> Disassembler {
    let mut disasm = Disassembler::new();
    let options = RenderOptions {
        dark_theme: true,
        colored: false,
    };
    assert!(
        disasm.initialize(input, dialect, &NullSourceReader, options),
        "listing should parse"
    );
    disasm
}

#[test]
fn trivial_block() {
    let disasm = analyze("While compiling job: demo\nmain:\n  ret\n", Dialect::Intel);

    assert_eq!(disasm.blocks().len(), 1);
    assert_eq!(disasm.blocks()[0].kind, AsmBlockKind::Code);
    assert_eq!(disasm.lines().len(), 2);
    assert_eq!(disasm.lines()[0].kind(), AsmLineKind::LabelDeclaration);
    assert_eq!(disasm.lines()[1].kind(), AsmLineKind::CodeReturn);
    assert!(disasm.blocks()[0].edges.is_empty());
}

#[test]
fn unconditional_jump() {
    let input = "banner\nL1:\n  jmp L2\nL2:\n  ret\n";
    let disasm = analyze(input, Dialect::Intel);

    assert_eq!(disasm.blocks().len(), 2);
    // Each block starts at its label.
    assert_eq!(disasm.blocks()[0].line_index, 0);
    assert_eq!(disasm.blocks()[1].line_index, 2);

    let out: Vec<_> = disasm.blocks()[0].outbound_edges().collect();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].origin, AsmLineRef::new(0, 1));
    assert_eq!(out[0].target, AsmLineRef::new(1, 0));
    assert_eq!(disasm.blocks()[0].inbound_edges().count(), 0);

    let inbound: Vec<_> = disasm.blocks()[1].inbound_edges().collect();
    assert_eq!(inbound.len(), 1);
    assert_eq!(inbound[0].origin, AsmLineRef::new(0, 1));
    assert_eq!(disasm.blocks()[1].outbound_edges().count(), 0);
}

#[test]
fn conditional_branch_forks() {
    let input = "banner\nL1:\n  je L3\n  nop\nL3:\n  ret\n";
    let disasm = analyze(input, Dialect::Intel);

    // The branch closes the first block, the label opens the third.
    assert_eq!(disasm.blocks().len(), 3);

    let out: Vec<_> = disasm.blocks()[0].outbound_edges().cloned().collect();
    assert_eq!(out.len(), 2);
    // Edge order: by target block, so the fall-through edge comes first.
    assert_eq!(out[0].target, AsmLineRef::new(1, 0));
    assert_eq!(out[1].target, AsmLineRef::new(2, 0));
    assert!(out.iter().all(|e| e.origin == AsmLineRef::new(0, 1)));

    assert_eq!(disasm.blocks()[1].inbound_edges().count(), 1);
    assert_eq!(disasm.blocks()[1].outbound_edges().count(), 0);
    assert_eq!(disasm.blocks()[2].inbound_edges().count(), 1);
}

#[test]
fn unresolved_runtime_symbol_on_arm() {
    let input = "banner\ndivide:\n  bl __divsi3\n  ret\n";
    let disasm = analyze(input, Dialect::Arm);

    assert_eq!(disasm.lines()[1].kind(), AsmLineKind::CodeCall);
    let upgraded = (0..disasm.tokens().len())
        .find(|&i| disasm.token_text(i) == Some("__divsi3"))
        .map(|i| disasm.tokens()[i])
        .expect("operand token");
    assert_eq!(upgraded.kind, AsmTokenKind::Label);

    // No edge, no error.
    assert!(disasm.blocks().iter().all(|b| b.edges.is_empty()));
}

#[test]
fn local_labels_resolve_within_their_function() {
    let input = "banner\n\
        alpha:\n\
        .LBB0_1:\n\
        \tb.ne .LBB0_1\n\
        \tret\n\
        beta:\n\
        .LBB0_1:\n\
        \tb.ne .LBB0_1\n\
        \tret\n";
    let disasm = analyze(input, Dialect::Arm);

    // Blocks: [alpha], [.LBB0_1 + b.ne], [ret], [beta], [.LBB0_1 + b.ne], [ret]
    assert_eq!(disasm.blocks().len(), 6);

    let first: Vec<_> = disasm.blocks()[1].outbound_edges().cloned().collect();
    assert_eq!(first.len(), 2);
    assert!(first.iter().any(|e| e.target == AsmLineRef::new(1, 0)));

    let second: Vec<_> = disasm.blocks()[4].outbound_edges().cloned().collect();
    assert_eq!(second.len(), 2);
    // Beta's branch lands on beta's own local label, not alpha's.
    assert!(second.iter().any(|e| e.target == AsmLineRef::new(4, 0)));
    assert!(second.iter().all(|e| e.target.block >= 4));
}

#[test]
fn conditional_branch_on_the_final_block_skips_the_fall_through() {
    // There is no block after the branch to fall through into; the edge is
    // dropped rather than fabricated.
    let input = "banner\nL1:\n  je L1\n";
    let disasm = analyze(input, Dialect::Intel);

    assert_eq!(disasm.blocks().len(), 1);
    let edges = &disasm.blocks()[0].edges;
    assert_eq!(edges.len(), 2);
    assert!(edges.iter().all(|e| e.target == AsmLineRef::new(0, 0)));
    assert_eq!(
        edges.iter().filter(|e| e.kind == AsmEdgeKind::OutBound).count(),
        1
    );
    assert_eq!(
        edges.iter().filter(|e| e.kind == AsmEdgeKind::InBound).count(),
        1
    );
}

#[test]
fn blocks_partition_all_lines() {
    let input = "banner\n\
        .text\n\
        .globl compute\n\
        compute:\n\
        \tmov eax, edi\n\
        \ttest eax, eax\n\
        \tje .LBB0_2\n\
        \timul eax, eax\n\
        .LBB0_2:\n\
        \tret\n\
        .data\n\
        table:\n\
        \t.long 1\n\
        \t.long 2\n";
    let disasm = analyze(input, Dialect::Intel);

    let mut next = 0u32;
    for block in disasm.blocks() {
        assert_eq!(block.line_index, next);
        assert!(block.line_count > 0);
        next += block.line_count;
    }
    assert_eq!(next as usize, disasm.lines().len());
}

#[test]
fn every_outbound_edge_has_a_mirroring_inbound_edge() {
    let input = "banner\n\
        top:\n\
        \tcmp eax, 10\n\
        \tje done\n\
        \tinc eax\n\
        \tjmp top\n\
        done:\n\
        \tret\n";
    let disasm = analyze(input, Dialect::Intel);

    for block in disasm.blocks() {
        for edge in block.outbound_edges() {
            let mirror = &disasm.blocks()[edge.target.block as usize];
            assert!(
                mirror
                    .inbound_edges()
                    .any(|e| e.origin == edge.origin && e.target == edge.target),
                "outbound edge {edge:?} has no inbound mirror"
            );
        }
        for edge in block.inbound_edges() {
            let origin = &disasm.blocks()[edge.origin.block as usize];
            assert!(
                origin
                    .outbound_edges()
                    .any(|e| e.origin == edge.origin && e.target == edge.target),
                "inbound edge {edge:?} has no outbound mirror"
            );
        }
    }
}

#[test]
fn line_refs_always_dereference() {
    let input = "banner\nf:\n  je f\n  nop\ng:\n  jmp f\n";
    let disasm = analyze(input, Dialect::Intel);

    for block in disasm.blocks() {
        for edge in &block.edges {
            for r in [edge.origin, edge.target] {
                let owner = &disasm.blocks()[r.block as usize];
                assert!(
                    r.line < owner.line_count,
                    "ref {r:?} exceeds block of {} lines",
                    owner.line_count
                );
            }
        }
    }
}

#[test]
fn token_slices_cover_everything_after_the_banner() {
    let input = "banner line\nf:\n  mov eax, 1 # half\n  ret\n";
    let disasm = analyze(input, Dialect::Intel);

    let rebuilt: String = (0..disasm.tokens().len())
        .map(|i| disasm.token_text(i).unwrap())
        .collect();
    assert_eq!(rebuilt, &input["banner line\n".len()..]);
}

#[test]
fn wasm_structured_branches() {
    let input = "banner\n\
        func:\n\
        \tblock\n\
        \tlocal.get 0\n\
        \tbr_if 0\n\
        \ti32.const 1\n\
        \tdrop\n\
        \tend\n\
        \treturn\n";
    let disasm = analyze(input, Dialect::Wasm);

    // `br_if` is a conditional branch: it closes its block and, with a
    // numeric depth operand, resolves no label — only the fall-through
    // edge remains.
    assert_eq!(disasm.lines()[3].kind(), AsmLineKind::CodeBranch);
    assert_eq!(disasm.blocks().len(), 2);
    let out: Vec<_> = disasm.blocks()[0].outbound_edges().cloned().collect();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].target, AsmLineRef::new(1, 0));
}
