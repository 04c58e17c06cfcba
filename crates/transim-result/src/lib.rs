pub mod error;

use std::io::Write;

pub use error::{Error, Result};

use transim_elements::symtab::SymbolTable;
use transim_solver::transient::TransientReport;

/// Writes the completed transient run as a whitespace-separated text stream:
/// one row per emitted sample, first column `t`, remaining columns
/// `x[1]..x[nv]` in the order the symbol table assigned them.
pub fn write_trajectory<W: Write>(
    out: &mut W,
    symtab: &SymbolTable,
    report: &TransientReport,
    include_header: bool,
) -> Result<()> {
    if include_header {
        write!(out, "t")?;
        for i in 1..=symtab.nv() {
            write!(out, " {}", symtab.name(i))?;
        }
        writeln!(out)?;
    }

    for sample in &report.samples {
        write!(out, "{:e}", sample.t)?;
        for &v in &sample.x[1..] {
            write!(out, " {v:e}")?;
        }
        writeln!(out)?;
    }

    log::info!(
        "wrote {} trajectory row(s); peak_iterations={} peak_restarts={}",
        report.samples.len(),
        report.peak_iterations,
        report.peak_restarts
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use transim_solver::transient::Sample;

    fn symtab_with_two_nodes() -> SymbolTable {
        let mut s = SymbolTable::new(8);
        s.intern_node("n1").unwrap();
        s.intern_node("n2").unwrap();
        s.finalize_nodes();
        s.finalize_currents();
        s
    }

    #[test]
    fn header_names_columns_in_symbol_table_order() {
        let symtab = symtab_with_two_nodes();
        let report = TransientReport {
            samples: vec![Sample { t: 0.0, x: vec![0.0, 1.0, 2.0] }],
            peak_iterations: 1,
            peak_restarts: 0,
            last_randomization_time: None,
        };

        let mut buf = Vec::new();
        write_trajectory(&mut buf, &symtab, &report, true).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), "t n1 n2");
        assert!(lines.next().unwrap().starts_with("0"));
    }

    #[test]
    fn omits_header_when_disabled() {
        let symtab = symtab_with_two_nodes();
        let report = TransientReport {
            samples: vec![Sample { t: 0.0, x: vec![0.0, 1.0, 2.0] }],
            peak_iterations: 1,
            peak_restarts: 0,
            last_randomization_time: None,
        };

        let mut buf = Vec::new();
        write_trajectory(&mut buf, &symtab, &report, false).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 1);
    }
}
