//! Gate-by-gate synthesis of a parsed trace module.
//!
//! Primary inputs are bound to variables `1..=n` in declaration order, so
//! the first declared input sits deepest in the ordering and the last one
//! is tested first. Gates are synthesized in declaration order; n-ary
//! gates fold left through ITE and negate at the end for `nand`/`nor`.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;

use log::debug;

use crate::bdd::Bdd;
use crate::reference::Ref;
use crate::trace::{Gate, Module, NaryType};

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum CircuitError {
    /// A gate or output refers to an identifier that no input or earlier
    /// gate defines.
    Undefined { id: String },
}

impl fmt::Display for CircuitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CircuitError::Undefined { id } => write!(f, "undefined identifier `{}`", id),
        }
    }
}

impl Error for CircuitError {}

/// Build the BDD of every primary output of `module`, in declaration
/// order. The returned handles are acquired; callers release them when
/// done. The manager must have been created with at least
/// `module.inputs.len()` variables.
pub fn synthesize(bdd: &mut Bdd, module: &Module) -> Result<Vec<Ref>, CircuitError> {
    let mut env: HashMap<&str, Ref> = HashMap::new();
    for (i, name) in module.inputs.iter().enumerate() {
        env.insert(name, bdd.create_variable(i as u32 + 1));
    }

    for gate in &module.gates {
        let result = match gate {
            Gate::Not { input, .. } => {
                let x = lookup(&env, input)?;
                bdd.apply_not(x)
            }
            Gate::Xor { inputs: [a, b], .. } => {
                let fa = lookup(&env, a)?;
                let fb = lookup(&env, b)?;
                bdd.apply_xor(fa, fb)
            }
            Gate::Nary { op, inputs, .. } => {
                let mut acc = lookup(&env, &inputs[0])?;
                for id in &inputs[1..] {
                    let x = lookup(&env, id)?;
                    acc = match op {
                        NaryType::And | NaryType::Nand => bdd.apply_and(acc, x),
                        NaryType::Or | NaryType::Nor => bdd.apply_or(acc, x),
                    };
                }
                match op {
                    NaryType::Nand | NaryType::Nor => bdd.apply_not(acc),
                    _ => acc,
                }
            }
            Gate::Alias { input, .. } => lookup(&env, input)?,
        };
        debug!("synthesize: {} = {}", gate.output(), result);
        env.insert(gate.output(), result);
    }

    module
        .outputs
        .iter()
        .map(|name| {
            let f = lookup(&env, name)?;
            Ok(bdd.acquire(f))
        })
        .collect()
}

fn lookup(env: &HashMap<&str, Ref>, id: &str) -> Result<Ref, CircuitError> {
    env.get(id)
        .copied()
        .ok_or_else(|| CircuitError::Undefined { id: id.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(text: &str) -> (Bdd, Module, Vec<Ref>) {
        let module = Module::parse(text).unwrap();
        let mut bdd = Bdd::new(module.inputs.len() as u32, 521, 521);
        let outputs = synthesize(&mut bdd, &module).unwrap();
        (bdd, module, outputs)
    }

    #[test]
    fn test_half_adder() {
        let (mut bdd, _, outputs) = build(
            "\
MODULE half_adder
INPUT a, b;
OUTPUT sum, carry;
STRUCTURE
  sum = xor(a, b);
  carry = and(a, b);
ENDMODULE
",
        );
        let [sum, carry] = outputs[..] else { panic!() };
        for (va, vb) in [(false, false), (false, true), (true, false), (true, true)] {
            assert_eq!(bdd.eval(sum, &[va, vb]), va ^ vb);
            assert_eq!(bdd.eval(carry, &[va, vb]), va && vb);
        }
        bdd.check_invariants();
        bdd.release(sum);
        bdd.release(carry);
    }

    #[test]
    fn test_nary_and_alias() {
        let (bdd, _, outputs) = build(
            "\
MODULE sample
INPUT a, b, c;
OUTPUT f, g;
STRUCTURE
  t = nor(a, b, c);
  u = not(t);
  f = u;
  g = nand(a, b, c);
ENDMODULE
",
        );
        let [f, g] = outputs[..] else { panic!() };
        for bits in 0..8u32 {
            let assignment = [bits & 1 != 0, bits & 2 != 0, bits & 4 != 0];
            let [va, vb, vc] = assignment;
            assert_eq!(bdd.eval(f, &assignment), va || vb || vc);
            assert_eq!(bdd.eval(g, &assignment), !(va && vb && vc));
        }
    }

    #[test]
    fn test_output_may_be_an_input() {
        let (bdd, _, outputs) = build(
            "\
MODULE wire
INPUT a;
OUTPUT a;
STRUCTURE
  t = not(a);
ENDMODULE
",
        );
        assert_eq!(outputs[0], bdd.create_variable(1));
    }

    #[test]
    fn test_undefined_identifier() {
        let module = Module::parse(
            "\
MODULE bad
INPUT a;
OUTPUT f;
STRUCTURE
  f = and(a, ghost);
ENDMODULE
",
        )
        .unwrap();
        let mut bdd = Bdd::new(1, 521, 521);
        assert_eq!(
            synthesize(&mut bdd, &module),
            Err(CircuitError::Undefined { id: "ghost".to_string() })
        );
    }
}
