//! Built-in functions provided by the VM.
//!
//! The position of a built-in in [`BUILTINS`] is the operand of its
//! `GET_BUILTIN` instruction, so the order must match the VM.

/// A built-in function and the number of arguments it takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Builtin {
    pub name: &'static str,
    pub arity: usize,
}

/// All built-ins, in VM index order.
pub const BUILTINS: &[Builtin] = &[
    Builtin { name: "len", arity: 1 },
    Builtin { name: "puts", arity: 1 },
    Builtin { name: "first", arity: 1 },
    Builtin { name: "last", arity: 1 },
    Builtin { name: "rest", arity: 1 },
    Builtin { name: "push", arity: 2 },
];
