//! Style binding.
//!
//! The read side extracts the two pieces of `xl/styles.xml` the codec binds
//! to cells: the custom `numFmts` (registered into the per-call
//! [`FormatTable`]) and the `cellXfs` array mapping a cell's `s` attribute
//! to a numFmtId. The write side assigns xf indices for the formats cells
//! carry and emits the minimal stylesheet extended with those formats.

use gridbook_xml::styles::{CellXfs, NumFmt, NumFmts, StyleSheet, Xf};

use crate::cell::NumberFormat;
use crate::error::Result;
use crate::numfmt::FormatTable;

/// Parsed style information from a styles part.
#[derive(Debug, Clone, Default)]
pub struct StyleTable {
    /// numFmtId per cellXfs index.
    xf_num_fmt: Vec<u32>,
    /// Custom number formats declared by the part.
    pub num_fmts: Vec<(u32, String)>,
}

impl StyleTable {
    pub fn from_stylesheet(ss: &StyleSheet) -> Self {
        let num_fmts = ss
            .num_fmts
            .as_ref()
            .map(|f| {
                f.num_fmts
                    .iter()
                    .map(|nf| (nf.num_fmt_id, nf.format_code.clone()))
                    .collect()
            })
            .unwrap_or_default();

        let xf_num_fmt = ss
            .cell_xfs
            .as_ref()
            .map(|xfs| {
                xfs.xfs
                    .iter()
                    .map(|xf| xf.num_fmt_id.unwrap_or(0))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            xf_num_fmt,
            num_fmts,
        }
    }

    /// Register this part's custom formats into a format table, preserving
    /// their ids.
    pub fn load_into(&self, table: &mut FormatTable) {
        for (id, code) in &self.num_fmts {
            table.insert(*id, code);
        }
    }

    /// The numFmtId bound to a cell's style index.
    pub fn num_fmt_id_for_xf(&self, style_index: u32) -> Option<u32> {
        self.xf_num_fmt.get(style_index as usize).copied()
    }

    pub fn xf_count(&self) -> usize {
        self.xf_num_fmt.len()
    }
}

/// Write-side style assignment: one xf per distinct number format id.
#[derive(Debug)]
pub struct StyleBuilder {
    /// numFmtId per emitted cellXfs index; slots 0 and 1 are the defaults.
    xf_num_fmt: Vec<u32>,
}

impl StyleBuilder {
    pub fn new() -> Self {
        Self {
            xf_num_fmt: vec![0, 0],
        }
    }

    /// Resolve a cell's format to a cellXfs index, registering the format
    /// code in the table when needed. Returns 0 (the default xf) for
    /// `General`.
    pub fn xf_for(&mut self, fmt: &NumberFormat, table: &mut FormatTable) -> Result<u32> {
        let id = match fmt {
            NumberFormat::Id(id) => *id,
            NumberFormat::Code(code) => table.register(code)?,
        };
        if id == 0 {
            return Ok(0);
        }
        if let Some(pos) = self.xf_num_fmt.iter().position(|&f| f == id) {
            return Ok(pos as u32);
        }
        self.xf_num_fmt.push(id);
        Ok((self.xf_num_fmt.len() - 1) as u32)
    }

    /// Emit the stylesheet: the minimal skeleton plus one numFmt per custom
    /// format and one cellXf per assigned format.
    pub fn build(&self, table: &FormatTable) -> StyleSheet {
        let mut ss = StyleSheet::default();

        let custom = table.custom_formats();
        if !custom.is_empty() {
            let mut fmts: Vec<NumFmt> = custom
                .into_iter()
                .map(|(num_fmt_id, format_code)| NumFmt {
                    num_fmt_id,
                    format_code,
                })
                .collect();
            fmts.sort_by_key(|f| f.num_fmt_id);
            ss.num_fmts = Some(NumFmts {
                count: Some(fmts.len() as u32),
                num_fmts: fmts,
            });
        }

        let xfs: Vec<Xf> = self
            .xf_num_fmt
            .iter()
            .map(|&num_fmt_id| Xf {
                num_fmt_id: Some(num_fmt_id),
                font_id: Some(0),
                fill_id: Some(0),
                border_id: Some(0),
                xf_id: Some(0),
                apply_number_format: (num_fmt_id != 0).then_some(true),
            })
            .collect();
        ss.cell_xfs = Some(CellXfs {
            count: Some(xfs.len() as u32),
            xfs,
        });

        ss
    }
}

impl Default for StyleBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_table_from_default_stylesheet() {
        let st = StyleTable::from_stylesheet(&StyleSheet::default());
        assert_eq!(st.xf_count(), 2);
        assert_eq!(st.num_fmt_id_for_xf(0), Some(0));
        assert_eq!(st.num_fmts.len(), 1);
        assert_eq!(st.num_fmts[0].1, "General");
    }

    #[test]
    fn test_style_table_loads_custom_formats() {
        let mut table = FormatTable::new();
        let st = StyleTable {
            xf_num_fmt: vec![0, 164],
            num_fmts: vec![(164, "0.000".to_string())],
        };
        st.load_into(&mut table);
        assert_eq!(table.code_for(164).as_deref(), Some("0.000"));
        assert_eq!(st.num_fmt_id_for_xf(1), Some(164));
        assert_eq!(st.num_fmt_id_for_xf(9), None);
    }

    #[test]
    fn test_builder_assigns_and_dedups_xfs() {
        let mut table = FormatTable::new();
        let mut b = StyleBuilder::new();

        let a = b.xf_for(&NumberFormat::Id(14), &mut table).unwrap();
        let c = b.xf_for(&NumberFormat::Code("0.00".to_string()), &mut table).unwrap();
        let again = b.xf_for(&NumberFormat::Id(14), &mut table).unwrap();
        assert_eq!(a, 2);
        assert_eq!(c, 3);
        assert_eq!(again, a);

        let general = b
            .xf_for(&NumberFormat::Code("General".to_string()), &mut table)
            .unwrap();
        assert_eq!(general, 0);
    }

    #[test]
    fn test_builder_emits_custom_num_fmts() {
        let mut table = FormatTable::new();
        let mut b = StyleBuilder::new();
        b.xf_for(&NumberFormat::Code("0.000".to_string()), &mut table)
            .unwrap();
        let ss = b.build(&table);

        let fmts = ss.num_fmts.unwrap().num_fmts;
        assert!(fmts.iter().any(|f| f.format_code == "0.000"));

        let xfs = ss.cell_xfs.unwrap().xfs;
        assert_eq!(xfs.len(), 3);
        assert_eq!(xfs[2].apply_number_format, Some(true));
    }

    #[test]
    fn test_roundtrip_write_then_read_binding() {
        let mut table = FormatTable::new();
        let mut b = StyleBuilder::new();
        let xf = b
            .xf_for(&NumberFormat::Code("yyyy-mm-dd".to_string()), &mut table)
            .unwrap();
        let ss = b.build(&table);

        let st = StyleTable::from_stylesheet(&ss);
        let id = st.num_fmt_id_for_xf(xf).unwrap();
        let mut table2 = FormatTable::new();
        st.load_into(&mut table2);
        assert_eq!(table2.code_for(id).as_deref(), Some("yyyy-mm-dd"));
    }
}
