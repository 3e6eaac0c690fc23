//! Full pipeline runs against PDFs generated on the fly with lopdf.

use std::path::Path;

use lopdf::content::{Content, Operation};
use calamine::{Reader, Xlsx, open_workbook};
use lopdf::{Document, Object, Stream, StringFormat, dictionary};

use timeclock_extract::{ExtractionMethod, ExtractionService, ExtractorConfig};

const COLUMNS: [f32; 7] = [40.0, 150.0, 230.0, 300.0, 370.0, 440.0, 510.0];

/// Header labels sit a little right of the data they label.
const HEADER_OFFSETS: [f32; 7] = [12.0, 18.0, 8.0, 20.0, 10.0, 14.0, 16.0];

const HEADER: [&str; 7] = ["Nome", "Data", "Entr.Manha", "Saíd.Manha", "Entr.Tarde", "Said.Tarde", "Total"];

/// Encodes text for the WinAnsi test font. Accented letters share their
/// Latin-1 code points; the right single quote lives at 0x92.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{2019}' => 0x92,
            c => c as u32 as u8,
        })
        .collect()
}

/// Writes a one-page PDF where each entry is a baseline and the text runs
/// drawn on it at the given x positions.
fn write_pdf(path: &Path, lines: &[(f32, Vec<(f32, &str)>)]) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut operations = Vec::new();
    for (y, runs) in lines {
        for (x, text) in runs {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new("Tf", vec!["F1".into(), 9.into()]));
            operations.push(Operation::new("Td", vec![(*x).into(), (*y).into()]));
            operations.push(Operation::new(
                "Tj",
                vec![Object::String(win_ansi(text), StringFormat::Literal)],
            ));
            operations.push(Operation::new("ET", vec![]));
        }
    }

    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    });

    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    doc.save(path).unwrap();
}

fn row<'a>(y: f32, cells: [&'a str; 7]) -> (f32, Vec<(f32, &'a str)>) {
    let runs = COLUMNS
        .iter()
        .zip(cells)
        .filter(|(_, text)| !text.is_empty())
        .map(|(x, text)| (*x, text))
        .collect();
    (y, runs)
}

fn header_row(y: f32) -> (f32, Vec<(f32, &'static str)>) {
    let runs = COLUMNS
        .iter()
        .zip(HEADER_OFFSETS)
        .zip(HEADER)
        .map(|((x, offset), text)| (x + offset, text))
        .collect();
    (y, runs)
}

fn report_with_table(path: &Path) {
    write_pdf(
        path,
        &[
            (760.0, vec![(40.0, "RELAÇÃO DE REGISTRO DE PONTO")]),
            header_row(700.0),
            row(
                686.0,
                ["JOÃO SILVA", "01/03/2024", "07:00:00", "11:00:00", "13:00:00", "17:00:00", "08:00:00"],
            ),
            row(
                672.0,
                ["MARIA SOUZA", "01/03/2024", "07:30:00", "11:30:00", "13:30:00", "17:30:00", "08:00:00"],
            ),
            row(
                658.0,
                ["PEDRO ALVES", "02/03/2024", "08:00:00", "12:00:00", "", "", "04:00:00"],
            ),
            row(644.0, ["Página 1 de 1", "", "", "", "", "", "Emissão 05/04/2024"]),
        ],
    );
}

fn config_for(dir: &Path, output: &str) -> ExtractorConfig {
    ExtractorConfig {
        input: dir.join("entrada.pdf"),
        output: dir.join(output),
        ..Default::default()
    }
}

fn read_sheet(path: &Path) -> Vec<Vec<String>> {
    let mut workbook: Xlsx<_> = open_workbook(path).unwrap();
    let range = workbook.worksheet_range("Sheet1").unwrap();
    range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect()
}

#[test]
fn table_report_exports_only_data_rows() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(dir.path(), "saida.xlsx");
    report_with_table(&config.input);

    let service = ExtractionService::new(config);
    let extraction = service.extract().expect("records extracted");

    assert_eq!(extraction.method, ExtractionMethod::Tables);
    let names: Vec<&str> = extraction.records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["JOÃO SILVA", "MARIA SOUZA", "PEDRO ALVES"]);

    let pedro = &extraction.records.records()[2];
    assert_eq!(pedro.date, "02/03/2024");
    assert_eq!(pedro.morning_out, "12:00:00");
    assert_eq!(pedro.afternoon_in, "");
    assert_eq!(pedro.total, "04:00:00");

    service.export(&extraction).unwrap();

    let rows = read_sheet(&service.config.output);
    assert_eq!(rows.len(), 4);
    assert_eq!(
        rows[0],
        ["Name", "Date", "MorningIn", "MorningOut", "AfternoonIn", "AfternoonOut", "Total"]
    );
    assert!(rows.iter().all(|r| r.len() == 7));
    assert_eq!(rows[1][0], "JOÃO SILVA");
    assert_eq!(rows[2][2], "07:30:00");
    assert_eq!(rows[3][4], "");
}

#[test]
fn csv_output_has_header_and_data_rows() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(dir.path(), "saida.csv");
    report_with_table(&config.input);

    let service = ExtractionService::new(config);
    let extraction = service.extract().expect("records extracted");
    service.export(&extraction).unwrap();

    let mut reader = csv::Reader::from_path(&service.config.output).unwrap();
    let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    assert_eq!(rows.len(), 3);
    assert_eq!(&rows[1][0], "MARIA SOUZA");

    let raw = std::fs::read_to_string(&service.config.output).unwrap();
    assert_eq!(raw.lines().count(), 4);
}

#[test]
fn typographic_quote_in_a_name_keeps_its_row() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(dir.path(), "saida.xlsx");
    write_pdf(
        &config.input,
        &[
            header_row(700.0),
            row(
                686.0,
                ["ANA LIMA", "01/03/2024", "07:00:00", "11:00:00", "13:00:00", "17:00:00", "08:00:00"],
            ),
            row(
                672.0,
                ["JOANA D\u{2019}ARC", "01/03/2024", "07:30:00", "11:30:00", "13:30:00", "17:30:00", "08:00:00"],
            ),
        ],
    );

    let service = ExtractionService::new(config);
    let extraction = service.extract().expect("records extracted");

    assert_eq!(extraction.method, ExtractionMethod::Tables);
    let names: Vec<&str> = extraction.records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["ANA LIMA", "JOANA D ARC"]);
    assert_eq!(extraction.records.records()[1].morning_in, "07:30:00");
}

#[test]
fn line_per_record_report_falls_back_to_text() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(dir.path(), "saida.csv");
    write_pdf(
        &config.input,
        &[
            (700.0, vec![(40.0, "ANA LIMA 07:00:00 11:00:00 13:00:00 17:00:00 08:00:00 01/03/2024")]),
            (686.0, vec![(40.0, "BRUNO DIAS 07:10:00 11:10:00 13:10:00 17:10:00 08:00:00 02/03/2024")]),
        ],
    );

    let service = ExtractionService::new(config);
    let extraction = service.extract().expect("records extracted");

    assert_eq!(extraction.method, ExtractionMethod::Text);
    assert_eq!(extraction.records.len(), 2);

    let ana = &extraction.records.records()[0];
    assert_eq!(ana.name, "ANA LIMA");
    assert_eq!(ana.date, "01/03/2024");
    assert_eq!(ana.morning_in, "07:00:00");
    assert_eq!(ana.afternoon_out, "17:00:00");
    assert_eq!(ana.total, "08:00:00");
    assert_eq!(extraction.records.records()[1].name, "BRUNO DIAS");
}

#[test]
fn disabled_tables_use_text_even_for_tabular_reports() {
    let dir = tempfile::tempdir().unwrap();
    let config = ExtractorConfig {
        enable_tables: false,
        ..config_for(dir.path(), "saida.json")
    };
    report_with_table(&config.input);

    let service = ExtractionService::new(config);
    let extraction = service.extract().expect("records extracted");

    assert_eq!(extraction.method, ExtractionMethod::Text);

    // Page text puts every cell on its own line with the punches after the
    // date, so each date's lookback holds the previous row's punches.
    let rows: Vec<[&str; 7]> = extraction.records.iter().map(|r| r.fields()).collect();
    assert_eq!(
        rows,
        vec![
            ["JOÃO SILVA 01 03 2024", "01/03/2024", "", "", "", "", ""],
            ["", "01/03/2024", "07:00:00", "11:00:00", "13:00:00", "17:00:00", "08:00:00"],
            ["", "02/03/2024", "07:30:00", "11:30:00", "13:30:00", "17:30:00", "08:00:00"],
        ]
    );

    service.export(&extraction).unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&service.config.output).unwrap()).unwrap();
    assert_eq!(json.as_array().unwrap().len(), extraction.records.len());
}

#[test]
fn missing_report_yields_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let service = ExtractionService::new(config_for(dir.path(), "saida.csv"));
    assert!(service.extract().is_none());
    assert!(!service.config.output.exists());
}

#[test]
fn export_failure_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_for(dir.path(), "saida.csv");
    report_with_table(&config.input);
    config.output = dir.path().join("no-such-dir").join("saida.csv");

    let service = ExtractionService::new(config);
    let extraction = service.extract().expect("records extracted");
    assert!(service.export(&extraction).is_err());
    assert_eq!(extraction.records.len(), 3);
}
