//! Line-oriented netlist reader, grounded in the teacher's parser-combinator
//! approach but cut down to the small fixed grammar: one element per
//! non-blank, non-comment (`*`) line, whitespace-separated tokens — a name
//! whose leading letter selects the kind, then node names, then
//! kind-specific parameters. Not a SPICE-compatible dialect.

use std::collections::HashMap;

use crate::elements::bjt::{Bjt, Polarity as BjtPolarity};
use crate::elements::controlled::{Cccs, Ccvs, Vccs, Vcvs};
use crate::elements::diode::Diode;
use crate::elements::mosfet::{Mosfet, Polarity as MosfetPolarity};
use crate::elements::mutual_inductance::MutualInductance;
use crate::elements::opamp::OpAmp;
use crate::elements::reactive::{Capacitor, Inductor};
use crate::elements::resistor::Resistor;
use crate::elements::sources::{CurrentSource, VoltageSource};
use crate::elements::Element;
use crate::error::{Error, Result};
use crate::symtab::SymbolTable;
use crate::utils::parse_value;
use crate::waveform::Waveform;

struct RawLine {
    line_no: usize,
    name: String,
    kind: char,
    tokens: Vec<String>,
}

/// A netlist record with node names already resolved to symbol-table indices,
/// queued for the second pass that assigns auxiliary branch currents.
enum Parsed {
    Resistor { bare: String, a: usize, b: usize, resistance: f64 },
    Capacitor { bare: String, a: usize, b: usize, capacitance: f64, ic: f64 },
    Inductor { bare: String, a: usize, b: usize, inductance: f64, ic: f64 },
    MutualInductance { bare: String, li_name: String, lj_name: String, coupling: f64 },
    Vccs { bare: String, a: usize, b: usize, c: usize, d: usize, transconductance: f64 },
    Vcvs { bare: String, a: usize, b: usize, c: usize, d: usize, gain: f64 },
    Cccs { bare: String, a: usize, b: usize, c: usize, d: usize, gain: f64 },
    Ccvs { bare: String, a: usize, b: usize, c: usize, d: usize, transresistance: f64 },
    OpAmp { bare: String, a: usize, b: usize, c: usize, d: usize },
    CurrentSource { bare: String, a: usize, b: usize, waveform: Waveform },
    VoltageSource { bare: String, a: usize, b: usize, waveform: Waveform },
    Diode { bare: String, a: usize, b: usize },
    Bjt { bare: String, c: usize, b: usize, e: usize, polarity: BjtPolarity },
    Mosfet { bare: String, d: usize, g: usize, s: usize, length: f64, width: f64, polarity: MosfetPolarity },
}

fn malformed(line_no: usize, message: impl Into<String>) -> Error {
    Error::MalformedElement { line: line_no, message: message.into() }
}

fn tokenize(input: &str) -> Vec<RawLine> {
    input
        .lines()
        .enumerate()
        .filter_map(|(i, raw)| {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('*') {
                return None;
            }
            let mut parts = line.split_whitespace();
            let name = parts.next()?.to_string();
            let kind = name.chars().next()?.to_ascii_uppercase();
            Some(RawLine { line_no: i + 1, name, kind, tokens: parts.map(str::to_string).collect() })
        })
        .collect()
}

fn need(tokens: &[String], n: usize, line: &RawLine) -> Result<()> {
    if tokens.len() < n {
        return Err(malformed(line.line_no, format!("'{}' expects at least {n} fields, found {}", line.name, tokens.len())));
    }
    Ok(())
}

fn value(tok: &str, line: &RawLine) -> Result<f64> {
    parse_value(tok).map_err(|e| malformed(line.line_no, e.to_string()))
}

fn parse_waveform(tokens: &[String], line: &RawLine) -> Result<Waveform> {
    if tokens.is_empty() {
        return Err(malformed(line.line_no, "missing waveform specification"));
    }
    match tokens[0].to_ascii_uppercase().as_str() {
        "DC" => {
            need(tokens, 2, line)?;
            Ok(Waveform::Dc(value(&tokens[1], line)?))
        }
        "SIN" => {
            need(tokens, 4, line)?;
            Ok(Waveform::Sin { offset: value(&tokens[1], line)?, amplitude: value(&tokens[2], line)?, freq: value(&tokens[3], line)? })
        }
        "PULSE" => {
            need(tokens, 4, line)?;
            Ok(Waveform::Pulse { initial: value(&tokens[1], line)?, pulsed: value(&tokens[2], line)?, delay: value(&tokens[3], line)? })
        }
        // A bare numeric token with no keyword is a DC level.
        _ => Ok(Waveform::Dc(value(&tokens[0], line)?)),
    }
}

fn four_nodes(symtab: &mut SymbolTable, tokens: &[String]) -> Result<(usize, usize, usize, usize)> {
    Ok((symtab.intern_node(&tokens[0])?, symtab.intern_node(&tokens[1])?, symtab.intern_node(&tokens[2])?, symtab.intern_node(&tokens[3])?))
}

/// Reads a netlist into a symbol table and element list. Does not select an
/// integration rule or validate Forward Euler eligibility; callers combine
/// the result with a rule via `Circuit::new`.
pub fn parse(input: &str, capacity: usize) -> Result<(SymbolTable, Vec<Element>)> {
    let lines = tokenize(input);
    let mut symtab = SymbolTable::new(capacity);
    let mut records = Vec::with_capacity(lines.len());

    for line in &lines {
        let bare = line.name[1..].to_string();
        let record = match line.kind {
            'R' => {
                need(&line.tokens, 3, line)?;
                let (a, b) = (symtab.intern_node(&line.tokens[0])?, symtab.intern_node(&line.tokens[1])?);
                Parsed::Resistor { bare, a, b, resistance: value(&line.tokens[2], line)? }
            }
            'C' => {
                need(&line.tokens, 3, line)?;
                let (a, b) = (symtab.intern_node(&line.tokens[0])?, symtab.intern_node(&line.tokens[1])?);
                let ic = match line.tokens.get(3) {
                    Some(t) => value(t, line)?,
                    None => 0.0,
                };
                Parsed::Capacitor { bare, a, b, capacitance: value(&line.tokens[2], line)?, ic }
            }
            'L' => {
                need(&line.tokens, 3, line)?;
                let (a, b) = (symtab.intern_node(&line.tokens[0])?, symtab.intern_node(&line.tokens[1])?);
                let ic = match line.tokens.get(3) {
                    Some(t) => value(t, line)?,
                    None => 0.0,
                };
                Parsed::Inductor { bare, a, b, inductance: value(&line.tokens[2], line)?, ic }
            }
            'K' => {
                need(&line.tokens, 3, line)?;
                Parsed::MutualInductance { bare, li_name: line.tokens[0].clone(), lj_name: line.tokens[1].clone(), coupling: value(&line.tokens[2], line)? }
            }
            'D' => {
                need(&line.tokens, 2, line)?;
                let (a, b) = (symtab.intern_node(&line.tokens[0])?, symtab.intern_node(&line.tokens[1])?);
                Parsed::Diode { bare, a, b }
            }
            'I' => {
                need(&line.tokens, 2, line)?;
                let (a, b) = (symtab.intern_node(&line.tokens[0])?, symtab.intern_node(&line.tokens[1])?);
                let waveform = parse_waveform(&line.tokens[2..], line)?;
                Parsed::CurrentSource { bare, a, b, waveform }
            }
            'V' => {
                need(&line.tokens, 2, line)?;
                let (a, b) = (symtab.intern_node(&line.tokens[0])?, symtab.intern_node(&line.tokens[1])?);
                let waveform = parse_waveform(&line.tokens[2..], line)?;
                Parsed::VoltageSource { bare, a, b, waveform }
            }
            'G' => {
                need(&line.tokens, 5, line)?;
                let (a, b, c, d) = four_nodes(&mut symtab, &line.tokens)?;
                Parsed::Vccs { bare, a, b, c, d, transconductance: value(&line.tokens[4], line)? }
            }
            'E' => {
                need(&line.tokens, 5, line)?;
                let (a, b, c, d) = four_nodes(&mut symtab, &line.tokens)?;
                Parsed::Vcvs { bare, a, b, c, d, gain: value(&line.tokens[4], line)? }
            }
            'F' => {
                need(&line.tokens, 5, line)?;
                let (a, b, c, d) = four_nodes(&mut symtab, &line.tokens)?;
                Parsed::Cccs { bare, a, b, c, d, gain: value(&line.tokens[4], line)? }
            }
            'H' => {
                need(&line.tokens, 5, line)?;
                let (a, b, c, d) = four_nodes(&mut symtab, &line.tokens)?;
                Parsed::Ccvs { bare, a, b, c, d, transresistance: value(&line.tokens[4], line)? }
            }
            'O' => {
                need(&line.tokens, 4, line)?;
                let (a, b, c, d) = four_nodes(&mut symtab, &line.tokens)?;
                Parsed::OpAmp { bare, a, b, c, d }
            }
            'Q' => {
                need(&line.tokens, 4, line)?;
                let (c, b, e) = (symtab.intern_node(&line.tokens[0])?, symtab.intern_node(&line.tokens[1])?, symtab.intern_node(&line.tokens[2])?);
                let polarity = match line.tokens[3].to_ascii_uppercase().as_str() {
                    "N" | "NPN" => BjtPolarity::Npn,
                    "P" | "PNP" => BjtPolarity::Pnp,
                    other => return Err(malformed(line.line_no, format!("unknown BJT polarity '{other}'"))),
                };
                Parsed::Bjt { bare, c, b, e, polarity }
            }
            'M' => {
                need(&line.tokens, 6, line)?;
                let (d, g, s) = (symtab.intern_node(&line.tokens[0])?, symtab.intern_node(&line.tokens[1])?, symtab.intern_node(&line.tokens[2])?);
                let length = value(&line.tokens[3], line)?;
                let width = value(&line.tokens[4], line)?;
                let polarity = match line.tokens[5].to_ascii_uppercase().as_str() {
                    "N" | "NMOS" => MosfetPolarity::N,
                    "P" | "PMOS" => MosfetPolarity::P,
                    other => return Err(malformed(line.line_no, format!("unknown MOSFET polarity '{other}'"))),
                };
                Parsed::Mosfet { bare, d, g, s, length, width, polarity }
            }
            other => return Err(malformed(line.line_no, format!("unknown element kind '{other}'"))),
        };
        records.push((line.line_no, line.name.clone(), record));
    }

    symtab.finalize_nodes();

    let mut elements = Vec::with_capacity(records.len());
    let mut inductors: HashMap<String, (usize, f64, f64)> = HashMap::new();
    let mut pending_mutual = Vec::new();

    for (line_no, full_name, record) in records {
        match record {
            Parsed::Resistor { bare, a, b, resistance } => {
                elements.push(Element::from(Resistor { name: bare, plus: a, minus: b, resistance }));
            }
            Parsed::Capacitor { bare, a, b, capacitance, ic } => {
                elements.push(Element::from(Capacitor::new(bare, a, b, capacitance, ic)));
            }
            Parsed::Inductor { bare, a, b, inductance, ic } => {
                let current = symtab.intern_current(&format!("j{full_name}"))?;
                inductors.insert(bare.clone(), (current, ic, inductance));
                elements.push(Element::from(Inductor { name: bare, plus: a, minus: b, current, inductance, ic }));
            }
            Parsed::MutualInductance { bare, li_name, lj_name, coupling } => {
                pending_mutual.push((line_no, bare, li_name, lj_name, coupling));
            }
            Parsed::Diode { bare, a, b } => {
                elements.push(Element::from(Diode { name: bare, anode: a, cathode: b }));
            }
            Parsed::CurrentSource { bare, a, b, waveform } => {
                elements.push(Element::from(CurrentSource { name: bare, plus: a, minus: b, waveform }));
            }
            Parsed::VoltageSource { bare, a, b, waveform } => {
                let current = symtab.intern_current(&format!("j{full_name}"))?;
                elements.push(Element::from(VoltageSource { name: bare, plus: a, minus: b, current, waveform }));
            }
            Parsed::Vccs { bare, a, b, c, d, transconductance } => {
                elements.push(Element::from(Vccs { name: bare, out_plus: a, out_minus: b, ctrl_plus: c, ctrl_minus: d, transconductance }));
            }
            Parsed::Vcvs { bare, a, b, c, d, gain } => {
                let current = symtab.intern_current(&format!("j{full_name}"))?;
                elements.push(Element::from(Vcvs { name: bare, out_plus: a, out_minus: b, ctrl_plus: c, ctrl_minus: d, current, gain }));
            }
            Parsed::Cccs { bare, a, b, c, d, gain } => {
                let current = symtab.intern_current(&format!("j{full_name}"))?;
                elements.push(Element::from(Cccs { name: bare, out_plus: a, out_minus: b, ctrl_plus: c, ctrl_minus: d, current, gain }));
            }
            Parsed::Ccvs { bare, a, b, c, d, transresistance } => {
                let current = symtab.intern_current(&format!("jx{full_name}"))?;
                let control_current = symtab.intern_current(&format!("jy{full_name}"))?;
                elements.push(Element::from(Ccvs {
                    name: bare,
                    out_plus: a,
                    out_minus: b,
                    ctrl_plus: c,
                    ctrl_minus: d,
                    current,
                    control_current,
                    transresistance,
                }));
            }
            Parsed::OpAmp { bare, a, b, c, d } => {
                let current = symtab.intern_current(&format!("j{full_name}"))?;
                elements.push(Element::from(OpAmp { name: bare, out_plus: a, out_minus: b, ctrl_plus: c, ctrl_minus: d, current }));
            }
            Parsed::Bjt { bare, c, b, e, polarity } => {
                elements.push(Element::from(Bjt { name: bare, collector: c, base: b, emitter: e, polarity }));
            }
            Parsed::Mosfet { bare, d, g, s, length, width, polarity } => {
                elements.push(Element::from(Mosfet { name: bare, drain: d, gate: g, source: s, length, width, polarity }));
            }
        }
    }

    for (line_no, bare, li_name, lj_name, coupling) in pending_mutual {
        let (current_i, ic_i, li) = *inductors
            .get(&li_name)
            .ok_or_else(|| malformed(line_no, format!("K references undeclared inductor '{li_name}'")))?;
        let (current_j, ic_j, lj) = *inductors
            .get(&lj_name)
            .ok_or_else(|| malformed(line_no, format!("K references undeclared inductor '{lj_name}'")))?;
        elements.push(Element::from(MutualInductance::new(bare, current_i, ic_i, current_j, ic_j, coupling, li, lj)));
    }

    symtab.finalize_currents();

    log::info!("parsed {} element(s), {} node(s) from netlist", elements.len(), symtab.nn());

    Ok((symtab, elements))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rc_low_pass() {
        let netlist = "* rc low pass\nV1 n1 0 DC 1\nR1 n1 n2 1k\nC1 n2 0 1u";
        let (symtab, elements) = parse(netlist, 64).unwrap();
        assert_eq!(elements.len(), 3);
        assert!(symtab.get("n1").is_some());
        assert!(symtab.get("n2").is_some());
    }

    #[test]
    fn rejects_unknown_kind() {
        let netlist = "Z1 n1 n2 1";
        assert!(parse(netlist, 64).is_err());
    }

    #[test]
    fn resolves_mutual_inductance_by_element_name() {
        let netlist = "L1 n1 0 1m\nL2 n2 0 4m\nK1 1 2 0.5";
        let (_, elements) = parse(netlist, 64).unwrap();
        assert!(elements.iter().any(|e| matches!(e, Element::MutualInductance(_))));
    }
}
