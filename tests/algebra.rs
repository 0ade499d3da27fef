//! Algebraic laws of the synthesis surface. Canonicity turns every law
//! into a bit-equality of handles.

use test_log::test;

use sbdd_rs::bdd::{Bdd, Branch};
use sbdd_rs::reference::Ref;

fn manager() -> (Bdd, Ref, Ref, Ref) {
    let bdd = Bdd::new(4, 521, 521);
    let a = bdd.create_variable(1);
    let b = bdd.create_variable(2);
    let c = bdd.create_variable(3);
    (bdd, a, b, c)
}

#[test]
fn involution() {
    let (_, a, _, _) = manager();
    assert_eq!(-(-a), a);
}

#[test]
fn idempotence() {
    let (mut bdd, a, _, _) = manager();
    assert_eq!(bdd.apply_and(a, a), a);
    assert_eq!(bdd.apply_or(a, a), a);
}

#[test]
fn absorption_with_constants() {
    let (mut bdd, a, _, _) = manager();
    assert_eq!(bdd.apply_and(a, bdd.one), a);
    assert_eq!(bdd.apply_or(a, bdd.zero), a);
    assert_eq!(bdd.apply_and(a, bdd.zero), bdd.zero);
    assert_eq!(bdd.apply_or(a, bdd.one), bdd.one);
}

#[test]
fn complementation() {
    let (mut bdd, a, _, _) = manager();
    assert_eq!(bdd.apply_and(a, -a), bdd.zero);
    assert_eq!(bdd.apply_or(a, -a), bdd.one);
}

#[test]
fn commutativity() {
    let (mut bdd, a, b, _) = manager();
    assert_eq!(bdd.apply_and(a, b), bdd.apply_and(b, a));
    assert_eq!(bdd.apply_or(a, b), bdd.apply_or(b, a));
    assert_eq!(bdd.apply_xor(a, b), bdd.apply_xor(b, a));
}

#[test]
fn associativity() {
    let (mut bdd, a, b, c) = manager();

    let ab = bdd.apply_and(a, b);
    let left = bdd.apply_and(ab, c);
    let bc = bdd.apply_and(b, c);
    let right = bdd.apply_and(a, bc);
    assert_eq!(left, right);

    let ab = bdd.apply_or(a, b);
    let left = bdd.apply_or(ab, c);
    let bc = bdd.apply_or(b, c);
    let right = bdd.apply_or(a, bc);
    assert_eq!(left, right);

    let ab = bdd.apply_xor(a, b);
    let left = bdd.apply_xor(ab, c);
    let bc = bdd.apply_xor(b, c);
    let right = bdd.apply_xor(a, bc);
    assert_eq!(left, right);
}

#[test]
fn distributivity() {
    let (mut bdd, a, b, c) = manager();
    let bc = bdd.apply_or(b, c);
    let left = bdd.apply_and(a, bc);
    let ab = bdd.apply_and(a, b);
    let ac = bdd.apply_and(a, c);
    let right = bdd.apply_or(ab, ac);
    assert_eq!(left, right);
}

#[test]
fn de_morgan() {
    let (mut bdd, a, b, _) = manager();

    let and = bdd.apply_and(a, b);
    let or_neg = bdd.apply_or(-a, -b);
    assert_eq!(-and, or_neg);

    let or = bdd.apply_or(a, b);
    let and_neg = bdd.apply_and(-a, -b);
    assert_eq!(-or, and_neg);
}

#[test]
fn xor_identity() {
    let (mut bdd, a, b, _) = manager();
    let xor = bdd.apply_xor(a, b);
    let a_not_b = bdd.apply_and(a, -b);
    let not_a_b = bdd.apply_and(-a, b);
    let expanded = bdd.apply_or(a_not_b, not_a_b);
    assert_eq!(xor, expanded);
}

#[test]
fn negated_operators_share_nodes() {
    let (mut bdd, a, b, _) = manager();
    // NAND and AND are the same node reached through opposite edges,
    // bit-for-bit; likewise NOR/OR and XNOR/XOR.
    let and = bdd.apply_and(a, b);
    let nand = bdd.apply_nand(a, b);
    assert_eq!(nand, -and);
    assert_eq!(nand.index(), and.index());

    let or = bdd.apply_or(a, b);
    let nor = bdd.apply_nor(a, b);
    assert_eq!(nor, -or);

    let xor = bdd.apply_xor(a, b);
    let xnor = bdd.apply_xnor(a, b);
    assert_eq!(xnor, -xor);
}

#[test]
fn cofactor_consistency() {
    let (mut bdd, a, b, c) = manager();
    let d = bdd.create_variable(4);

    // f = (a·b) ⊕ (c + ¬d), which depends on every variable.
    let ab = bdd.apply_and(a, b);
    let cd = bdd.apply_or(c, -d);
    let f = bdd.apply_xor(ab, cd);

    for i in 1..=4 {
        let x = bdd.create_variable(i);
        let hi = bdd.cofactor(f, i, Branch::High);
        let lo = bdd.cofactor(f, i, Branch::Low);
        let x_hi = bdd.apply_and(x, hi);
        let nx_lo = bdd.apply_and(-x, lo);
        let shannon = bdd.apply_or(x_hi, nx_lo);
        assert_eq!(shannon, f, "Shannon expansion failed on variable {}", i);
    }

    bdd.check_invariants();
}

#[test]
fn exist_is_disjunction_of_cofactors() {
    let (mut bdd, a, b, c) = manager();
    let d = bdd.create_variable(4);

    let ab = bdd.apply_and(a, b);
    let cd = bdd.apply_xor(c, d);
    let f = bdd.apply_or(ab, cd);

    for i in 1..=4 {
        let hi = bdd.cofactor(f, i, Branch::High);
        let lo = bdd.cofactor(f, i, Branch::Low);
        let expected = bdd.apply_or(lo, hi);
        assert_eq!(bdd.exist(f, i), expected, "Quantification failed on variable {}", i);
    }

    bdd.check_invariants();
}
