use transim_matrix::MnaSystem;

use crate::elements::{Element, IntegrationRule, Stamp};
use crate::error::{Error, Result};
use crate::symtab::SymbolTable;

/// A fully resolved circuit: the element list plus the integration rule and
/// total unknown count (`nv`) the symbol table settled on. Constructing one
/// validates the Forward Euler restriction; a circuit with mutual inductance
/// or a node reachable from ground only through inductors cannot be built
/// with `ForwardEuler` selected.
pub struct Circuit {
    pub rule: IntegrationRule,
    pub nv: usize,
    pub elements: Vec<Element>,
}

impl Circuit {
    pub fn new(rule: IntegrationRule, symtab: &SymbolTable, elements: Vec<Element>) -> Result<Self> {
        if rule == IntegrationRule::ForwardEuler {
            log::debug!("validating Forward Euler eligibility for {} element(s)", elements.len());
            validate_forward_euler(symtab, &elements)?;
        }
        Ok(Self { rule, nv: symtab.nv(), elements })
    }

    pub fn stamp_all(&self, sys: &mut MnaSystem, ctx: &crate::elements::StepContext, k: usize) {
        for e in &self.elements {
            e.stamp(sys, ctx, k);
        }
    }

    pub fn on_step_start_all(&mut self, ctx: &crate::elements::StepContext) {
        for e in &mut self.elements {
            e.on_step_start(ctx);
        }
    }

    pub fn has_nonlinear(&self) -> bool {
        self.elements.iter().any(|e| e.is_nonlinear())
    }
}

/// Node `a` is reachable from ground through a non-inductive branch, or through
/// a chain of such branches. Inductive-only branches cannot carry this path:
/// under Forward Euler an inductor's companion current lags by one step, so a
/// node fed *only* by inductors has no well-defined voltage at step zero.
struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self { parent: (0..n).collect() }
    }

    fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            self.parent[x] = self.find(self.parent[x]);
        }
        self.parent[x]
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            self.parent[ra] = rb;
        }
    }
}

fn validate_forward_euler(symtab: &SymbolTable, elements: &[Element]) -> Result<()> {
    if elements.iter().any(|e| matches!(e, Element::MutualInductance(_))) {
        return Err(Error::ForwardEulerUnsupported(
            "mutual inductance (K) requires a non-Forward-Euler integration rule".to_string(),
        ));
    }

    let nn = symtab.nn();
    let mut uf = UnionFind::new(nn + 1);
    let mut inductive_edges = Vec::new();

    for e in elements {
        match e {
            Element::Inductor(l) => inductive_edges.push((l.plus, l.minus)),
            Element::NodalInductor(l) => inductive_edges.push((l.plus, l.minus)),
            Element::Resistor(r) => uf.union(r.plus, r.minus),
            Element::Capacitor(c) => uf.union(c.plus, c.minus),
            Element::Diode(d) => uf.union(d.anode, d.cathode),
            Element::CurrentSource(i) => uf.union(i.plus, i.minus),
            Element::VoltageSource(v) => uf.union(v.plus, v.minus),
            Element::Vccs(g) => {
                uf.union(g.out_plus, g.out_minus);
                uf.union(g.ctrl_plus, g.ctrl_minus);
            }
            Element::Vcvs(e_) => {
                uf.union(e_.out_plus, e_.out_minus);
                uf.union(e_.ctrl_plus, e_.ctrl_minus);
            }
            Element::Cccs(f) => {
                uf.union(f.out_plus, f.out_minus);
                uf.union(f.ctrl_plus, f.ctrl_minus);
            }
            Element::Ccvs(h) => {
                uf.union(h.out_plus, h.out_minus);
                uf.union(h.ctrl_plus, h.ctrl_minus);
            }
            Element::OpAmp(o) => uf.union(o.out_plus, o.out_minus),
            Element::Bjt(q) => {
                uf.union(q.base, q.emitter);
                uf.union(q.base, q.collector);
            }
            Element::Mosfet(m) => {
                uf.union(m.gate, m.source);
                uf.union(m.drain, m.source);
            }
            Element::MutualInductance(_) => unreachable!("handled above"),
        }
    }

    for (a, b) in inductive_edges {
        let grounded = |uf: &mut UnionFind, n: usize| uf.find(n) == uf.find(0);
        if !grounded(&mut uf, a) && !grounded(&mut uf, b) {
            return Err(Error::ForwardEulerUnsupported(format!(
                "node '{}' is reachable from ground only through inductive branches",
                symtab.name(a)
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::resistor::Resistor;
    use crate::elements::reactive::Inductor;

    #[test]
    fn forward_euler_rejects_pure_inductive_loop() {
        let mut symtab = SymbolTable::new(16);
        let n1 = symtab.intern_node("n1").unwrap();
        symtab.finalize_nodes();
        let jl = symtab.intern_current("jL1").unwrap();
        symtab.finalize_currents();

        let elements = vec![Element::Inductor(Inductor {
            name: "1".into(),
            plus: n1,
            minus: 0,
            current: jl,
            inductance: 1e-3,
            ic: 0.0,
        })];
        let result = Circuit::new(IntegrationRule::ForwardEuler, &symtab, elements);
        assert!(result.is_err());
    }

    #[test]
    fn forward_euler_accepts_resistor_grounded_node() {
        let mut symtab = SymbolTable::new(16);
        let n1 = symtab.intern_node("n1").unwrap();
        symtab.finalize_nodes();
        symtab.finalize_currents();

        let elements = vec![Element::Resistor(Resistor { name: "1".into(), plus: n1, minus: 0, resistance: 1000.0 })];
        let result = Circuit::new(IntegrationRule::ForwardEuler, &symtab, elements);
        assert!(result.is_ok());
    }
}
