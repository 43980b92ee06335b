//! End-to-end scenarios: write a workbook, read it back, check what
//! survived.

use gridbook::utils::{column_index_to_name, column_name_to_index, decode_range, encode_cell_ref, CellRef};
use gridbook::{
    read, sheet_from_aoa, sheet_to_csv, sheet_to_records, write, AoaCell, AoaOptions, BookType,
    Cell, CellComment, CellValue, CsvOptions, DefinedName, Error, HeaderMode, Hyperlink,
    NumberFormat, OutputKind, ReadOptions, RecordsOptions, Visibility, Workbook, Worksheet,
    WriteOptions, WriteOutput,
};
use pretty_assertions::assert_eq;

fn roundtrip(wb: &Workbook, write_opts: &WriteOptions, read_opts: &ReadOptions) -> Workbook {
    let bytes = write(wb, write_opts).unwrap().into_bytes();
    read(&bytes, read_opts).unwrap()
}

fn aoa_workbook(name: &str, rows: &[Vec<AoaCell>]) -> Workbook {
    let ws = sheet_from_aoa(rows, &AoaOptions::default()).unwrap();
    let mut wb = Workbook::new();
    wb.append_sheet(Some(name), ws, false).unwrap();
    wb
}

// ----- E1: single boolean ------------------------------------------------

#[test]
fn e1_single_boolean_roundtrip() {
    let wb = aoa_workbook("S", &[vec![true.into()]]);
    let back = roundtrip(&wb, &WriteOptions::default(), &ReadOptions::default());

    let cell = back.sheet("S").unwrap().cell("A1").unwrap().unwrap();
    assert_eq!(cell.value.type_code(), 'b');
    assert_eq!(cell.value, CellValue::Bool(true));
}

// ----- E2: #DIV/0! error -------------------------------------------------

#[test]
fn e2_div0_error_roundtrip() {
    let mut ws = Worksheet::new();
    ws.set_cell("A1", Cell::new(CellValue::Error(0x07))).unwrap();
    let mut wb = Workbook::new();
    wb.append_sheet(Some("S"), ws, false).unwrap();

    let back = roundtrip(&wb, &WriteOptions::default(), &ReadOptions::default());
    let cell = back.sheet("S").unwrap().cell("A1").unwrap().unwrap();
    assert_eq!(cell.value.type_code(), 'e');
    assert_eq!(cell.value, CellValue::Error(7));
}

// ----- E3: CJK and accented strings --------------------------------------

#[test]
fn e3_international_strings_roundtrip() {
    let wb = aoa_workbook(
        "S",
        &[
            vec!["日本語".into()],
            vec!["café".into()],
            vec!["über".into()],
        ],
    );

    for book_sst in [false, true] {
        let opts = WriteOptions {
            book_sst,
            ..WriteOptions::default()
        };
        let back = roundtrip(&wb, &opts, &ReadOptions::default());
        let records = sheet_to_records(
            back.sheet("S").unwrap(),
            &RecordsOptions {
                header: HeaderMode::Letters,
                ..RecordsOptions::default()
            },
        )
        .unwrap();

        let values: Vec<&CellValue> = records.iter().map(|r| &r.fields["A"]).collect();
        assert_eq!(
            values,
            vec![
                &CellValue::Text("日本語".into()),
                &CellValue::Text("café".into()),
                &CellValue::Text("über".into()),
            ],
            "book_sst={book_sst}"
        );
    }
}

// ----- E4: array formula -------------------------------------------------

#[test]
fn e4_array_formula_roundtrip() {
    let mut wb = Workbook::new();
    wb.append_sheet(Some("S"), Worksheet::new(), false).unwrap();
    wb.set_array_formula("S", "C1:C2", "A1:A2*B1:B2", false)
        .unwrap();

    let back = roundtrip(&wb, &WriteOptions::default(), &ReadOptions::default());
    let ws = back.sheet("S").unwrap();

    let c1 = ws.cell("C1").unwrap().unwrap();
    assert_eq!(c1.formula.as_deref(), Some("A1:A2*B1:B2"));
    assert_eq!(c1.array_range.as_deref(), Some("C1:C2"));

    let c2 = ws.cell("C2").unwrap().unwrap();
    assert_eq!(c2.array_range.as_deref(), Some("C1:C2"));
    assert!(c2.formula.is_none());
}

// ----- E5: very hidden sheet ---------------------------------------------

#[test]
fn e5_very_hidden_sheet() {
    let mut wb = Workbook::new();
    for name in ["V", "H", "H2"] {
        wb.append_sheet(Some(name), Worksheet::new(), false).unwrap();
    }
    wb.set_sheet_visibility("H", Visibility::Hidden).unwrap();
    wb.set_sheet_visibility("H2", Visibility::VeryHidden).unwrap();

    let bytes = write(&wb, &WriteOptions::default()).unwrap().into_bytes();

    // The workbook part still lists all three sheets.
    let back = read(&bytes, &ReadOptions::default()).unwrap();
    assert_eq!(back.sheet_names(), vec!["V", "H", "H2"]);
    assert_eq!(back.sheet_info()[1].visibility.as_code(), 1);
    assert_eq!(back.sheet_info()[2].visibility.as_code(), 2);

    // The extended-properties titles vector excludes the very hidden one.
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
    let mut app = String::new();
    std::io::Read::read_to_string(&mut archive.by_name("docProps/app.xml").unwrap(), &mut app)
        .unwrap();
    assert!(app.contains("<vt:lpstr>V</vt:lpstr>"));
    assert!(app.contains("<vt:lpstr>H</vt:lpstr>"));
    assert!(!app.contains("<vt:lpstr>H2</vt:lpstr>"));
    assert!(app.contains("<vt:i4>2</vt:i4>"));
}

// ----- E6: sheet_rows clamp ----------------------------------------------

#[test]
fn e6_sheet_rows_clamps_used_range() {
    let rows: Vec<Vec<AoaCell>> = (0..50).map(|i| vec![f64::from(i).into()]).collect();
    let wb = aoa_workbook("S", &rows);

    let bytes = write(&wb, &WriteOptions::default()).unwrap().into_bytes();
    let back = read(
        &bytes,
        &ReadOptions {
            sheet_rows: Some(5),
            ..ReadOptions::default()
        },
    )
    .unwrap();

    let ws = back.sheet("S").unwrap();
    assert_eq!(ws.dimension.unwrap(), decode_range("A1:A5").unwrap());
    assert_eq!(ws.full_dimension.unwrap(), decode_range("A1:A50").unwrap());
    assert!(ws.cell("A5").unwrap().is_some());
    assert!(ws.cell("A6").unwrap().is_none());
}

// ----- invariant 1: column algebra ---------------------------------------

#[test]
fn property_column_roundtrip_and_composition() {
    for c in (0u32..16384).step_by(37).chain([0, 25, 26, 16383]) {
        let name = column_index_to_name(c).unwrap();
        assert_eq!(column_name_to_index(&name).unwrap(), c);
        assert_eq!(
            encode_cell_ref(CellRef::new(c, 0)).unwrap(),
            format!("{name}1")
        );
    }
}

// ----- invariant 2: per-cell type/value round trip ------------------------

#[test]
fn property_cell_values_roundtrip() {
    let wb = aoa_workbook(
        "S",
        &[
            vec![1.5.into(), (-3).into(), "text".into()],
            vec![true.into(), false.into(), AoaCell::Null],
            vec![
                AoaCell::Cell(Cell::new(CellValue::Error(0x2A))),
                "".into(),
                0.0.into(),
            ],
        ],
    );

    for compression in [false, true] {
        let opts = WriteOptions {
            compression,
            book_sst: true,
            ..WriteOptions::default()
        };
        let back = roundtrip(&wb, &opts, &ReadOptions::default());
        let (orig, new) = (wb.sheet("S").unwrap(), back.sheet("S").unwrap());
        for (at, cell) in orig.iter() {
            let read_back = new.get(at);
            assert_eq!(
                read_back.map(|c| &c.value),
                Some(&cell.value),
                "cell {at} with compression={compression}"
            );
        }
    }
}

// ----- invariant 4: sheet order ------------------------------------------

#[test]
fn property_sheet_order_survives() {
    let mut wb = Workbook::new();
    for name in ["Zeta", "alpha", "Middle Sheet", "日本語"] {
        wb.append_sheet(Some(name), Worksheet::new(), false).unwrap();
    }
    let back = roundtrip(&wb, &WriteOptions::default(), &ReadOptions::default());
    assert_eq!(back.sheet_names(), vec!["Zeta", "alpha", "Middle Sheet", "日本語"]);
}

// ----- invariant 5: special characters -----------------------------------

#[test]
fn property_special_characters_survive() {
    let nasty = "a<b>c&d\"e'f";
    let control = "ctrl\u{01}\u{1F}end";
    let newline = "line1\nline2";

    for book_sst in [false, true] {
        let wb = aoa_workbook(
            "S",
            &[vec![nasty.into(), control.into(), newline.into()]],
        );
        let opts = WriteOptions {
            book_sst,
            ..WriteOptions::default()
        };
        let back = roundtrip(&wb, &opts, &ReadOptions::default());
        let ws = back.sheet("S").unwrap();
        for (col, expected) in [nasty, control, newline].iter().enumerate() {
            let at = CellRef::new(col as u32, 0);
            assert_eq!(
                ws.get(at).unwrap().value,
                CellValue::Text(expected.to_string()),
                "col {col} book_sst={book_sst}"
            );
        }
    }
}

// ----- invariant 6: defined names ----------------------------------------

#[test]
fn property_defined_names_survive() {
    let mut wb = aoa_workbook("Data", &[vec![1.0.into()]]);
    wb.defined_names.push(DefinedName {
        name: "MyRange".to_string(),
        refers_to: "Data!$A$1:$B$2".to_string(),
        sheet: None,
        hidden: false,
    });
    wb.defined_names.push(DefinedName {
        name: "Scoped".to_string(),
        refers_to: "Data!$C$3".to_string(),
        sheet: Some(0),
        hidden: true,
    });

    let back = roundtrip(&wb, &WriteOptions::default(), &ReadOptions::default());
    assert_eq!(back.defined_names, wb.defined_names);
}

// ----- invariant 7: sheet-level metadata ----------------------------------

#[test]
fn property_sheet_metadata_survives() {
    let mut ws = sheet_from_aoa(
        &[
            vec!["a".into(), "b".into(), "c".into()],
            vec![1.0.into(), 2.0.into(), 3.0.into()],
        ],
        &AoaOptions::default(),
    )
    .unwrap();
    ws.merges.push(decode_range("A1:B1").unwrap());
    ws.autofilter = Some(decode_range("A1:C1").unwrap());
    ws.margins = Some(gridbook::SheetMargins {
        left: 1.0,
        right: 1.0,
        top: 0.5,
        bottom: 0.5,
        header: 0.25,
        footer: 0.25,
    });
    ws.rows.insert(
        1,
        gridbook::RowInfo {
            height: Some(30.0),
            hidden: true,
        },
    );
    ws.col_info_mut(1).width = Some(18.5);
    ws.col_info_mut(1).hidden = true;

    let mut wb = Workbook::new();
    wb.append_sheet(Some("S"), ws, false).unwrap();

    let back = roundtrip(
        &wb,
        &WriteOptions::default(),
        &ReadOptions {
            cell_styles: true,
            ..ReadOptions::default()
        },
    );
    let ws = back.sheet("S").unwrap();
    assert_eq!(ws.merges, vec![decode_range("A1:B1").unwrap()]);
    assert_eq!(ws.autofilter, Some(decode_range("A1:C1").unwrap()));
    let margins = ws.margins.as_ref().unwrap();
    assert_eq!(margins.left, 1.0);
    assert_eq!(margins.header, 0.25);
    let row = ws.rows.get(&1).unwrap();
    assert_eq!(row.height, Some(30.0));
    assert!(row.hidden);
    let col = ws.cols[1].as_ref().unwrap();
    assert_eq!(col.width, Some(18.5));
    assert!(col.hidden);
}

// ----- invariant 8: CSV grid fidelity ------------------------------------

#[test]
fn property_csv_grid_fidelity() {
    let wb = aoa_workbook(
        "S",
        &[
            vec!["x".into(), 1.0.into()],
            vec!["y".into(), 2.5.into()],
        ],
    );
    let csv = sheet_to_csv(wb.sheet("S").unwrap(), &CsvOptions::default()).unwrap();
    let grid: Vec<Vec<&str>> = csv
        .lines()
        .map(|line| line.split(',').collect())
        .collect();
    assert_eq!(grid, vec![vec!["x", "1"], vec!["y", "2.5"]]);
}

// ----- dates ---------------------------------------------------------------

#[test]
fn dates_roundtrip_as_serials_and_iso() {
    let dt = chrono::NaiveDate::from_ymd_opt(2023, 6, 15)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap();
    // utc keeps the wall-clock components out of the local-zone shift, so
    // the expectations hold in any environment.
    let make_wb = |cell_dates: bool| {
        let ws = sheet_from_aoa(
            &[vec![dt.into()]],
            &AoaOptions {
                cell_dates,
                utc: true,
                ..AoaOptions::default()
            },
        )
        .unwrap();
        let mut wb = Workbook::new();
        wb.append_sheet(Some("S"), ws, false).unwrap();
        wb
    };
    let wb = make_wb(false);

    // Default: serial number with the short-date format bound via styles.
    let back = roundtrip(&wb, &WriteOptions::default(), &ReadOptions::default());
    let cell = back.sheet("S").unwrap().cell("A1").unwrap().unwrap();
    match cell.value {
        CellValue::Number(n) => assert!((n - 45092.395833).abs() < 1e-5),
        ref other => panic!("expected serial, got {other:?}"),
    }

    // cell_dates on both sides: a live date value.
    let write_opts = WriteOptions {
        cell_dates: true,
        ..WriteOptions::default()
    };
    let wb2 = make_wb(true);
    let back = roundtrip(&wb2, &write_opts, &ReadOptions::default());
    let cell = back.sheet("S").unwrap().cell("A1").unwrap().unwrap();
    assert_eq!(cell.value, CellValue::DateTime(dt));

    // Serial on disk, promoted on read via the bound date format.
    let back = roundtrip(
        &wb,
        &WriteOptions::default(),
        &ReadOptions {
            cell_dates: true,
            ..ReadOptions::default()
        },
    );
    let cell = back.sheet("S").unwrap().cell("A1").unwrap().unwrap();
    assert_eq!(cell.value, CellValue::DateTime(dt));
}

// ----- number formats -----------------------------------------------------

#[test]
fn number_formats_roundtrip_through_styles() {
    let mut ws = Worksheet::new();
    let mut cell = Cell::from(0.345);
    cell.num_fmt = Some(NumberFormat::Code("0.00%".to_string()));
    ws.set_cell("A1", cell).unwrap();
    let mut wb = Workbook::new();
    wb.append_sheet(Some("S"), ws, false).unwrap();

    let back = roundtrip(
        &wb,
        &WriteOptions::default(),
        &ReadOptions {
            cell_nf: true,
            ..ReadOptions::default()
        },
    );
    let cell = back.sheet("S").unwrap().cell("A1").unwrap().unwrap();
    assert_eq!(
        cell.num_fmt,
        Some(NumberFormat::Code("0.00%".to_string()))
    );
    assert_eq!(cell.display.as_deref(), Some("34.50%"));
}

// ----- hyperlinks ----------------------------------------------------------

#[test]
fn hyperlinks_roundtrip() {
    let mut wb = aoa_workbook("S", &[vec!["site".into(), "jump".into()]]);
    wb.set_hyperlink(
        "S",
        "A1",
        Hyperlink {
            target: "https://example.com/page".to_string(),
            tooltip: Some("visit".to_string()),
        },
    )
    .unwrap();
    wb.set_hyperlink(
        "S",
        "B1",
        Hyperlink {
            target: "#Sheet2!B2".to_string(),
            tooltip: None,
        },
    )
    .unwrap();

    let back = roundtrip(&wb, &WriteOptions::default(), &ReadOptions::default());
    let ws = back.sheet("S").unwrap();
    let link = ws.cell("A1").unwrap().unwrap().hyperlink.as_ref().unwrap();
    assert_eq!(link.target, "https://example.com/page");
    assert_eq!(link.tooltip.as_deref(), Some("visit"));
    let internal = ws.cell("B1").unwrap().unwrap().hyperlink.as_ref().unwrap();
    assert_eq!(internal.target, "#Sheet2!B2");
}

// ----- comments -----------------------------------------------------------

#[test]
fn comments_roundtrip_with_visibility() {
    let mut wb = aoa_workbook("S", &[vec![1.0.into()]]);
    wb.add_comment(
        "S",
        "A1",
        CellComment {
            author: "Reviewer".to_string(),
            text: "check this".to_string(),
            hidden: true,
            threaded: false,
        },
    )
    .unwrap();

    let back = roundtrip(&wb, &WriteOptions::default(), &ReadOptions::default());
    let cell = back.sheet("S").unwrap().cell("A1").unwrap().unwrap();
    assert_eq!(cell.comments.len(), 1);
    assert_eq!(cell.comments[0].author, "Reviewer");
    assert_eq!(cell.comments[0].text, "check this");
    assert!(cell.comments[0].hidden);
}

#[test]
fn threaded_comments_roundtrip() {
    let mut wb = aoa_workbook("S", &[vec![1.0.into()]]);
    for (author, text) in [("Alice", "root note"), ("Bob", "reply")] {
        wb.add_comment(
            "S",
            "A1",
            CellComment {
                author: author.to_string(),
                text: text.to_string(),
                hidden: false,
                threaded: true,
            },
        )
        .unwrap();
    }

    let bytes = write(&wb, &WriteOptions::default()).unwrap().into_bytes();

    // The GUID patterns land in the part.
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes.clone())).unwrap();
    let mut part = String::new();
    std::io::Read::read_to_string(
        &mut archive
            .by_name("xl/threadedComments/threadedComment1.xml")
            .unwrap(),
        &mut part,
    )
    .unwrap();
    assert!(part.contains("{54EE7951-7262-4200-6969-000000000001}"));
    assert!(part.contains("parentId=\"{54EE7951-7262-4200-6969-000000000001}\""));
    let mut persons = String::new();
    std::io::Read::read_to_string(
        &mut archive.by_name("xl/persons/person.xml").unwrap(),
        &mut persons,
    )
    .unwrap();
    assert!(persons.contains("{54EE7950-7262-4200-6969-000000000001}"));

    let back = read(&bytes, &ReadOptions::default()).unwrap();
    let cell = back.sheet("S").unwrap().cell("A1").unwrap().unwrap();
    assert_eq!(cell.comments.len(), 2);
    assert!(cell.comments.iter().all(|c| c.threaded));
    assert_eq!(cell.comments[0].author, "Alice");
    assert_eq!(cell.comments[1].author, "Bob");
}

// ----- document properties -------------------------------------------------

#[test]
fn doc_properties_roundtrip() {
    use gridbook_xml::doc_props::{CoreProperties, CustomProperty, VariantValue};

    let mut wb = aoa_workbook("S", &[vec![1.0.into()]]);
    wb.core_props = Some(CoreProperties {
        title: Some("Quarterly".to_string()),
        creator: Some("ada".to_string()),
        created: Some("2024-01-01T00:00:00Z".to_string()),
        modified: Some("2024-02-01T00:00:00Z".to_string()),
        ..CoreProperties::default()
    });
    wb.custom_props = vec![
        CustomProperty {
            name: "Reviewed".to_string(),
            value: VariantValue::Bool(true),
        },
        CustomProperty {
            name: "Version".to_string(),
            value: VariantValue::Int(3),
        },
    ];

    let back = roundtrip(&wb, &WriteOptions::default(), &ReadOptions::default());
    let core = back.core_props.as_ref().unwrap();
    assert_eq!(core.title.as_deref(), Some("Quarterly"));
    assert_eq!(core.creator.as_deref(), Some("ada"));
    assert_eq!(back.custom_props, wb.custom_props);
}

// ----- workbook props -------------------------------------------------------

#[test]
fn date1904_flag_roundtrips() {
    let mut wb = aoa_workbook("S", &[vec![1.0.into()]]);
    wb.props.date1904 = true;
    let back = roundtrip(&wb, &WriteOptions::default(), &ReadOptions::default());
    assert!(back.props.date1904);
}

// ----- input sniffing -------------------------------------------------------

#[test]
fn non_spreadsheet_inputs_fail_fast() {
    assert!(matches!(
        read(b"%PDF-1.4 junk", &ReadOptions::default()),
        Err(Error::NotASpreadsheet { kind: "pdf" })
    ));
    assert!(matches!(
        read(b"\x89PNG\r\n\x1a\njunk", &ReadOptions::default()),
        Err(Error::NotASpreadsheet { kind: "png" })
    ));
    assert!(matches!(
        read(b"plain text", &ReadOptions::default()),
        Err(Error::UnsupportedFormat)
    ));
}

// ----- alternate book types -------------------------------------------------

#[test]
fn csv_and_tsv_book_types() {
    let wb = aoa_workbook("S", &[vec!["a".into(), 1.0.into()]]);
    let opts = WriteOptions {
        book_type: BookType::Csv,
        output: OutputKind::String,
        ..WriteOptions::default()
    };
    assert_eq!(write(&wb, &opts).unwrap(), WriteOutput::Text("a,1\n".into()));

    let opts = WriteOptions {
        book_type: BookType::Tsv,
        output: OutputKind::String,
        ..WriteOptions::default()
    };
    assert_eq!(
        write(&wb, &opts).unwrap(),
        WriteOutput::Text("a\t1\n".into())
    );
}

#[test]
fn html_book_type() {
    let wb = aoa_workbook("S", &[vec!["x".into()]]);
    let opts = WriteOptions {
        book_type: BookType::Html,
        output: OutputKind::String,
        ..WriteOptions::default()
    };
    let WriteOutput::Text(html) = write(&wb, &opts).unwrap() else {
        panic!("expected text");
    };
    assert!(html.contains("<table>"));
    assert!(html.contains(">x</td>"));
}

// ----- sheet modes ----------------------------------------------------------

#[test]
fn book_sheets_mode_lists_names_only() {
    let mut wb = Workbook::new();
    wb.append_sheet(Some("One"), Worksheet::new(), false).unwrap();
    let mut data = Worksheet::new();
    data.set_cell("A1", Cell::from(5.0)).unwrap();
    wb.append_sheet(Some("Two"), data, false).unwrap();

    let back = roundtrip(
        &wb,
        &WriteOptions::default(),
        &ReadOptions {
            book_sheets: true,
            ..ReadOptions::default()
        },
    );
    assert_eq!(back.sheet_names(), vec!["One", "Two"]);
    assert!(back.sheet("Two").unwrap().is_empty());
}

#[test]
fn sheet_selector_limits_parsing() {
    let mut wb = Workbook::new();
    for name in ["A", "B"] {
        let mut ws = Worksheet::new();
        ws.set_cell("A1", Cell::from(name)).unwrap();
        wb.append_sheet(Some(name), ws, false).unwrap();
    }

    let back = roundtrip(
        &wb,
        &WriteOptions::default(),
        &ReadOptions {
            sheets: Some(gridbook::SheetSelector::Names(vec!["B".to_string()])),
            ..ReadOptions::default()
        },
    );
    assert!(back.sheet("A").unwrap().is_empty());
    assert_eq!(
        back.sheet("B").unwrap().cell("A1").unwrap().unwrap().value,
        CellValue::Text("B".into())
    );
}

// ----- dense mode -----------------------------------------------------------

#[test]
fn dense_read_matches_sparse_read() {
    let wb = aoa_workbook(
        "S",
        &[vec![1.0.into(), "x".into()], vec![true.into(), 2.5.into()]],
    );
    let bytes = write(&wb, &WriteOptions::default()).unwrap().into_bytes();

    let sparse = read(&bytes, &ReadOptions::default()).unwrap();
    let dense = read(
        &bytes,
        &ReadOptions {
            dense: true,
            ..ReadOptions::default()
        },
    )
    .unwrap();

    assert!(dense.sheet("S").unwrap().is_dense());
    let sparse_cells: Vec<_> = sparse
        .sheet("S")
        .unwrap()
        .iter()
        .map(|(at, c)| (at, c.value.clone()))
        .collect();
    let dense_cells: Vec<_> = dense
        .sheet("S")
        .unwrap()
        .iter()
        .map(|(at, c)| (at, c.value.clone()))
        .collect();
    assert_eq!(sparse_cells, dense_cells);
}

// ----- file round trip -------------------------------------------------------

#[test]
fn file_roundtrip_via_tempdir() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("out.xlsx");

    let wb = aoa_workbook("S", &[vec!["persisted".into()]]);
    gridbook::write_file(&wb, &path, &WriteOptions::default()).unwrap();
    assert!(path.exists());

    let back = gridbook::read_file(&path, &ReadOptions::default()).unwrap();
    assert_eq!(
        back.sheet("S").unwrap().cell("A1").unwrap().unwrap().value,
        CellValue::Text("persisted".into())
    );
}
