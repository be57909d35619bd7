//! Atom identity and interning.

use drjson::Context;

#[test]
fn same_bytes_atomize_to_the_same_atom() {
    let mut ctx = Context::new();
    let a = ctx.atomize(b"hello");
    let b = ctx.atomize(b"hello");
    assert_eq!(a, b);
}

#[test]
fn different_bytes_atomize_to_different_atoms() {
    let mut ctx = Context::new();
    let a = ctx.atomize(b"hello");
    let b = ctx.atomize(b"world");
    assert_ne!(a, b);
}

#[test]
fn atom_resolves_back_to_its_original_bytes() {
    let mut ctx = Context::new();
    let a = ctx.atomize(b"round-trip");
    assert_eq!(ctx.resolve(a), b"round-trip");
}

#[test]
fn atom_table_grows_past_its_initial_capacity() {
    let mut ctx = Context::new();
    let mut atoms = Vec::new();
    for i in 0..500u32 {
        let bytes = i.to_string();
        atoms.push(ctx.atomize(bytes.as_bytes()));
    }
    for (i, atom) in atoms.iter().enumerate() {
        assert_eq!(ctx.resolve(*atom), i.to_string().as_bytes());
    }
}
