//! Per-dialect token classification.
//!
//! Each dialect owns a set of static, sorted keyword tables and refines an
//! identifier-shaped lexeme into an instruction/register/qualifier kind by
//! binary search. The four classifiers are process-wide constants; there is
//! no lazy initialization and no state.

use std::cmp::Ordering;

use super::token::AsmTokenKind;

/// Assembly dialect of the input listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// x86-64, Intel syntax. Mnemonic lookup folds ASCII case.
    Intel,
    /// AArch64 ARM syntax.
    Arm,
    /// WebAssembly text format.
    Wasm,
    /// LLVM IR.
    LlvmIr,
}

impl Dialect {
    /// Parse a dialect from its CLI/display name.
    /// Returns `None` for unrecognized names.
    pub fn from_name(name: &str) -> Option<Dialect> {
        match name {
            "intel" | "x86" | "x64" => Some(Dialect::Intel),
            "arm" | "arm64" | "aarch64" => Some(Dialect::Arm),
            "wasm" | "wat" => Some(Dialect::Wasm),
            "llvm-ir" | "llvm" | "ir" => Some(Dialect::LlvmIr),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Dialect::Intel => "intel",
            Dialect::Arm => "arm",
            Dialect::Wasm => "wasm",
            Dialect::LlvmIr => "llvm-ir",
        }
    }

    /// The process-wide classifier instance for this dialect.
    pub fn classifier(&self) -> &'static TokenClassifier {
        match self {
            Dialect::Intel => &INTEL,
            Dialect::Arm => &ARM,
            Dialect::Wasm => &WASM,
            Dialect::LlvmIr => &LLVM_IR,
        }
    }

    /// Comment introducers, longest first.
    pub(crate) fn comment_starts(&self) -> &'static [&'static str] {
        match self {
            Dialect::Intel => &["#", ";"],
            Dialect::Arm => &["//", ";"],
            Dialect::Wasm => &[";;", ";"],
            Dialect::LlvmIr => &[";"],
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Maps a raw lexeme to a refined [`AsmTokenKind`].
///
/// Tables must be sorted; Intel's are lowercase and compared with ASCII case
/// folding (x86 mnemonics are case-insensitive, the other dialects are not —
/// `ADD` is an instruction under Intel and a plain identifier under LLVM IR).
pub struct TokenClassifier {
    fold_case: bool,
    instructions: &'static [&'static str],
    simd: &'static [&'static str],
    registers: &'static [&'static str],
    branches: &'static [&'static str],
    jumps: &'static [&'static str],
    calls: &'static [&'static str],
    returns: &'static [&'static str],
    qualifiers: &'static [&'static str],
    /// Pattern fallback for register files too regular to enumerate.
    register_pattern: Option<fn(&str) -> bool>,
}

impl TokenClassifier {
    /// Refine an identifier-shaped lexeme. Returns
    /// [`AsmTokenKind::Identifier`] when no table matches.
    pub fn classify(&self, lexeme: &str) -> AsmTokenKind {
        if self.lookup(self.branches, lexeme) {
            AsmTokenKind::BranchInstruction
        } else if self.lookup(self.jumps, lexeme) {
            AsmTokenKind::JumpInstruction
        } else if self.lookup(self.calls, lexeme) {
            AsmTokenKind::CallInstruction
        } else if self.lookup(self.returns, lexeme) {
            AsmTokenKind::ReturnInstruction
        } else if self.lookup(self.simd, lexeme) {
            AsmTokenKind::InstructionSimd
        } else if self.lookup(self.instructions, lexeme) {
            AsmTokenKind::Instruction
        } else if self.is_register(lexeme) {
            AsmTokenKind::Register
        } else if self.lookup(self.qualifiers, lexeme) {
            AsmTokenKind::Qualifier
        } else {
            AsmTokenKind::Identifier
        }
    }

    fn lookup(&self, table: &[&str], lexeme: &str) -> bool {
        if self.fold_case {
            table
                .binary_search_by(|probe| cmp_fold_case(probe, lexeme))
                .is_ok()
        } else {
            table.binary_search(&lexeme).is_ok()
        }
    }

    fn is_register(&self, lexeme: &str) -> bool {
        self.lookup(self.registers, lexeme)
            || self.register_pattern.is_some_and(|matches| matches(lexeme))
    }
}

/// `w0`-`w30`, `x0`-`x30`, and the `v`/`q`/`d`/`s`/`h`/`b` FP and vector
/// banks, with an optional `.8b`-style arrangement suffix.
fn is_arm_numbered_register(lexeme: &str) -> bool {
    let mut chars = lexeme.as_bytes().iter().copied();
    match chars.next() {
        Some(b'w') | Some(b'x') | Some(b'v') | Some(b'q') | Some(b'd') | Some(b's')
        | Some(b'h') | Some(b'b') => {}
        _ => return false,
    }
    let rest = &lexeme[1..];
    let digits_end = rest
        .as_bytes()
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count();
    if digits_end == 0 || digits_end > 2 {
        return false;
    }
    let number: u32 = rest[..digits_end].parse().unwrap_or(u32::MAX);
    if number > 31 {
        return false;
    }
    let suffix = &rest[digits_end..];
    // Bare register, or a vector arrangement like `.4s` / `.16b`.
    suffix.is_empty()
        || (suffix.starts_with('.')
            && suffix.len() >= 2
            && suffix[1..]
                .bytes()
                .all(|b| b.is_ascii_digit() || matches!(b, b'b' | b'h' | b's' | b'd')))
}

fn cmp_fold_case(a: &str, b: &str) -> Ordering {
    let mut ai = a.bytes().map(|b| b.to_ascii_lowercase());
    let mut bi = b.bytes().map(|b| b.to_ascii_lowercase());
    loop {
        match (ai.next(), bi.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => match x.cmp(&y) {
                Ordering::Equal => continue,
                other => return other,
            },
        }
    }
}

/// Directives introducing data, shared by all dialects.
const DATA_DIRECTIVES: &[&str] = &[
    ".ascii", ".asciz", ".byte", ".double", ".float", ".hword", ".long", ".octa", ".quad",
    ".short", ".single", ".skip", ".space", ".string", ".word", ".xword", ".zero",
];

/// Classify a `.`-leading lexeme. Shared by all dialects; the tokenizer
/// calls this instead of the keyword tables for directive-shaped tokens.
pub(crate) fn classify_directive(lexeme: &str) -> AsmTokenKind {
    if lexeme == ".file" || lexeme == ".cv_file" {
        AsmTokenKind::SourceFile
    } else if lexeme == ".loc" || lexeme == ".cv_loc" {
        AsmTokenKind::SourceLocation
    } else if lexeme.starts_with(".Lfunc_begin") {
        AsmTokenKind::FunctionBegin
    } else if lexeme.starts_with(".Lfunc_end") {
        AsmTokenKind::FunctionEnd
    } else if DATA_DIRECTIVES.binary_search(&lexeme).is_ok() {
        AsmTokenKind::DataDirective
    } else {
        AsmTokenKind::Directive
    }
}

static INTEL: TokenClassifier = TokenClassifier {
    fold_case: true,
    instructions: &[
        "adc", "add", "and", "bsf", "bsr", "bswap", "bt", "btc", "btr", "bts", "cdq", "cdqe",
        "cmova", "cmovae", "cmovb", "cmovbe", "cmove", "cmovg", "cmovge", "cmovl", "cmovle",
        "cmovne", "cmovns", "cmovs", "cmp", "cmpxchg", "cpuid", "cqo", "cwd", "dec", "div",
        "idiv", "imul", "inc", "int3", "lea", "lock", "mov", "movabs", "movsx", "movsxd",
        "movzx", "mul", "neg", "nop", "not", "or", "pop", "push", "rcl", "rcr", "rol", "ror",
        "sar", "sbb", "seta", "setae", "setb", "setbe", "sete", "setg", "setge", "setl",
        "setle", "setne", "setns", "sets", "shl", "shld", "shr", "shrd", "sub", "test",
        "tzcnt", "xadd", "xchg", "xor",
    ],
    simd: &[
        "addpd", "addps", "addsd", "addss", "andnps", "andpd", "andps", "comisd", "comiss",
        "cvtdq2ps", "cvtps2dq", "cvtsd2ss", "cvtsi2sd", "cvtsi2ss", "cvtss2sd", "cvttps2dq",
        "cvttsd2si", "cvttss2si", "divpd", "divps", "divsd", "divss", "maxpd", "maxps",
        "maxsd", "maxss", "minpd", "minps", "minsd", "minss", "movapd", "movaps", "movd",
        "movdqa", "movdqu", "movhlps", "movhpd", "movhps", "movlhps", "movlpd", "movlps",
        "movq", "movsd", "movss", "movupd", "movups", "mulpd", "mulps", "mulsd", "mulss",
        "orpd", "orps", "paddb", "paddd", "paddq", "paddw", "pand", "pcmpeqb", "pcmpeqd",
        "pcmpgtd", "pextrd", "pinsrd", "pmaddwd", "pmulld", "pmullw", "pshufb", "pshufd",
        "pslld", "psllq", "psllw", "psrad", "psrld", "psrlq", "psrlw", "psubb", "psubd",
        "psubq", "psubw", "punpckhdq", "punpckldq", "pxor", "rcpps", "rsqrtps", "shufpd",
        "shufps", "sqrtpd", "sqrtps", "sqrtsd", "sqrtss", "subpd", "subps", "subsd", "subss",
        "ucomisd", "ucomiss", "unpckhpd", "unpckhps", "unpcklpd", "unpcklps", "xorpd",
        "xorps",
    ],
    registers: &[
        "ah", "al", "ax", "bh", "bl", "bp", "bpl", "bx", "ch", "cl", "cx", "dh", "di", "dil",
        "dl", "dx", "eax", "ebp", "ebx", "ecx", "edi", "edx", "esi", "esp", "r10", "r10b",
        "r10d", "r10w", "r11", "r11b", "r11d", "r11w", "r12", "r12b", "r12d", "r12w", "r13",
        "r13b", "r13d", "r13w", "r14", "r14b", "r14d", "r14w", "r15", "r15b", "r15d", "r15w",
        "r8", "r8b", "r8d", "r8w", "r9", "r9b", "r9d", "r9w", "rax", "rbp", "rbx", "rcx",
        "rdi", "rdx", "rip", "rsi", "rsp", "si", "sil", "sp", "spl", "xmm0", "xmm1", "xmm10",
        "xmm11", "xmm12", "xmm13", "xmm14", "xmm15", "xmm2", "xmm3", "xmm4", "xmm5", "xmm6",
        "xmm7", "xmm8", "xmm9", "ymm0", "ymm1", "ymm2", "ymm3", "ymm4", "ymm5", "ymm6",
        "ymm7",
    ],
    branches: &[
        "ja", "jae", "jb", "jbe", "jc", "je", "jecxz", "jg", "jge", "jl", "jle", "jna",
        "jnae", "jnb", "jnbe", "jnc", "jne", "jng", "jnge", "jnl", "jnle", "jno", "jnp",
        "jns", "jnz", "jo", "jp", "jrcxz", "js", "jz", "loop", "loope", "loopne",
    ],
    jumps: &["jmp"],
    calls: &["call"],
    returns: &["ret", "retn", "retq"],
    qualifiers: &[
        "byte", "dword", "offset", "oword", "ptr", "qword", "short", "tbyte", "word",
        "xmmword", "ymmword",
    ],
    register_pattern: None,
};

static ARM: TokenClassifier = TokenClassifier {
    fold_case: false,
    instructions: &[
        "adc", "add", "adds", "adr", "adrp", "and", "ands", "asr", "bfi", "bfxil", "bic",
        "ccmp", "cinc", "clz", "cmn", "cmp", "cneg", "csel", "cset", "csetm", "csinc",
        "csinv", "csneg", "eon", "eor", "extr", "ldp", "ldr", "ldrb", "ldrh", "ldrsb",
        "ldrsh", "ldrsw", "ldur", "ldurb", "ldurh", "lsl", "lsr", "madd", "mneg", "mov",
        "movk", "movn", "movz", "msub", "mul", "mvn", "neg", "negs", "nop", "orn", "orr",
        "rbit", "rev", "rev16", "rev32", "ror", "sbfx", "sdiv", "smaddl", "smulh", "smull",
        "stp", "str", "strb", "strh", "stur", "sturb", "sturh", "sub", "subs", "sxtb",
        "sxth", "sxtw", "tst", "ubfx", "udiv", "umaddl", "umulh", "umull", "uxtb", "uxth",
    ],
    simd: &[
        "dup", "ext", "fabs", "fadd", "fccmp", "fcmp", "fcmpe", "fcsel", "fcvt", "fcvtzs",
        "fcvtzu", "fdiv", "fmadd", "fmax", "fmaxnm", "fmin", "fminnm", "fmla", "fmls",
        "fmov", "fmsub", "fmul", "fneg", "fnmadd", "fnmsub", "fnmul", "frinta", "frintm",
        "frintp", "frintz", "fsqrt", "fsub", "ins", "ld1", "ld2", "mla", "mls", "movi",
        "mvni", "scvtf", "st1", "st2", "tbl", "trn1", "trn2", "ucvtf", "umov", "uzp1",
        "uzp2", "zip1", "zip2",
    ],
    registers: &["fp", "lr", "sp", "wsp", "wzr", "xzr"],
    branches: &[
        "b.al", "b.cc", "b.cs", "b.eq", "b.ge", "b.gt", "b.hi", "b.hs", "b.le", "b.lo",
        "b.ls", "b.lt", "b.mi", "b.ne", "b.pl", "b.vc", "b.vs", "cbnz", "cbz", "tbnz",
        "tbz",
    ],
    jumps: &["b", "br"],
    calls: &["bl", "blr"],
    returns: &["ret"],
    qualifiers: &[],
    register_pattern: Some(is_arm_numbered_register),
};

static WASM: TokenClassifier = TokenClassifier {
    fold_case: false,
    instructions: &[
        "block", "drop", "else", "end", "f32.abs", "f32.add", "f32.const",
        "f32.convert_i32_s", "f32.div", "f32.eq", "f32.ge", "f32.gt", "f32.le", "f32.load",
        "f32.lt", "f32.max", "f32.min", "f32.mul", "f32.ne", "f32.neg", "f32.sqrt",
        "f32.store", "f32.sub", "f64.abs", "f64.add", "f64.const", "f64.div", "f64.eq",
        "f64.load", "f64.mul", "f64.neg", "f64.promote_f32", "f64.sqrt", "f64.store",
        "f64.sub", "global.get", "global.set", "i32.add", "i32.and", "i32.const",
        "i32.div_s", "i32.div_u", "i32.eq", "i32.eqz", "i32.ge_s", "i32.ge_u", "i32.gt_s",
        "i32.gt_u", "i32.le_s", "i32.le_u", "i32.load", "i32.load16_s", "i32.load16_u",
        "i32.load8_s", "i32.load8_u", "i32.lt_s", "i32.lt_u", "i32.mul", "i32.ne", "i32.or",
        "i32.rem_s", "i32.rem_u", "i32.shl", "i32.shr_s", "i32.shr_u", "i32.store",
        "i32.store16", "i32.store8", "i32.sub", "i32.wrap_i64", "i32.xor", "i64.add",
        "i64.and", "i64.const", "i64.div_s", "i64.extend_i32_s", "i64.extend_i32_u",
        "i64.load", "i64.mul", "i64.or", "i64.shl", "i64.shr_s", "i64.shr_u", "i64.store",
        "i64.sub", "i64.xor", "local.get", "local.set", "local.tee", "loop", "memory.grow",
        "memory.size", "nop", "select", "unreachable",
    ],
    simd: &[
        "f32x4.add", "f32x4.mul", "f32x4.splat", "f32x4.sub", "i16x8.add", "i16x8.mul",
        "i16x8.splat", "i16x8.sub", "i32x4.add", "i32x4.mul", "i32x4.splat", "i32x4.sub",
        "i8x16.add", "i8x16.shuffle", "i8x16.splat", "i8x16.sub", "v128.and", "v128.const",
        "v128.load", "v128.or", "v128.store", "v128.xor",
    ],
    registers: &[],
    branches: &["br_if", "br_table"],
    jumps: &["br"],
    calls: &["call", "call_indirect"],
    returns: &["return"],
    qualifiers: &[
        "align", "export", "func", "import", "memory", "module", "mut", "offset", "param",
        "result", "table", "type",
    ],
    register_pattern: None,
};

static LLVM_IR: TokenClassifier = TokenClassifier {
    fold_case: false,
    instructions: &[
        "add", "addrspacecast", "alloca", "and", "ashr", "atomicrmw", "bitcast", "cmpxchg",
        "extractvalue", "fadd", "fcmp", "fdiv", "fence", "fmul", "fneg", "fpext", "fptosi",
        "fptoui", "fptrunc", "freeze", "frem", "fsub", "getelementptr", "icmp",
        "insertvalue", "inttoptr", "landingpad", "load", "lshr", "mul", "or", "phi",
        "ptrtoint", "sdiv", "select", "sext", "shl", "sitofp", "srem", "store", "sub",
        "trunc", "udiv", "uitofp", "unreachable", "urem", "va_arg", "xor", "zext",
    ],
    simd: &["extractelement", "insertelement", "shufflevector"],
    registers: &[],
    branches: &["br", "switch"],
    jumps: &[],
    calls: &["call", "invoke", "musttail", "tail"],
    returns: &["resume", "ret"],
    qualifiers: &[
        "align", "common", "constant", "declare", "define", "double", "dso_local",
        "external", "fastcc", "float", "global", "i1", "i16", "i32", "i64", "i8",
        "inbounds", "inlinehint", "internal", "label", "linkonce", "linkonce_odr",
        "noalias", "nocapture", "noinline", "nonnull", "noundef", "nounwind", "nsw", "nuw",
        "private", "ptr", "readnone", "readonly", "void", "volatile",
    ],
    register_pattern: None,
};
