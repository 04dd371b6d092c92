//! End-to-end tests filling real .docx archives.
//!
//! Fixtures are built on the fly with `zip::ZipWriter` into temporary
//! directories, so the suite needs no checked-in documents.

use std::fs::File;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};
use docx_template::{
    fill_file, fill_file_with_options, list_variables, DocxTemplate, Error, Part,
    TemplateOptions, Variables,
};
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>"#;

fn body(inner: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
        inner
    )
}

/// Creates a DOCX with the given parts next to a content types entry.
fn create_docx(dir: &Path, name: &str, parts: &[(&str, &str)]) -> PathBuf {
    let mut buffer = Vec::new();
    let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
    let options = SimpleFileOptions::default();

    zip.start_file("[Content_Types].xml", options).unwrap();
    zip.write_all(CONTENT_TYPES.as_bytes()).unwrap();
    for (entry, content) in parts {
        zip.start_file(*entry, options).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap();

    let path = dir.join(name);
    std::fs::write(&path, buffer).unwrap();
    path
}

fn read_entry(path: &Path, entry: &str) -> Option<String> {
    let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut file = archive.by_name(entry).ok()?;
    let mut content = String::new();
    file.read_to_string(&mut content).unwrap();
    Some(content)
}

fn leftover_temp_files(dir: &Path) -> Vec<String> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with("docx") && name.ends_with(".tmp"))
        .collect()
}

fn vars(pairs: &[(&str, &str)]) -> Variables {
    pairs.iter().copied().collect()
}

#[test]
fn test_open_missing_file_leaves_no_temp_file() {
    let temp = tempfile::tempdir().unwrap();
    let options = TemplateOptions::new().with_temp_dir(temp.path()).unwrap();

    let result = DocxTemplate::open_with_options(temp.path().join("absent.docx"), &options);

    assert!(matches!(result, Err(Error::FileNotFound(_))));
    assert!(leftover_temp_files(temp.path()).is_empty());
}

#[test]
fn test_open_corrupt_file_leaves_no_temp_file() {
    let source = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();
    let path = source.path().join("corrupt.docx");
    std::fs::write(&path, b"PK\x03\x04 but not really").unwrap();

    let options = TemplateOptions::new().with_temp_dir(work.path()).unwrap();
    let result = DocxTemplate::open_with_options(&path, &options);

    assert!(matches!(result, Err(Error::UnpackFailed { .. })));
    assert!(leftover_temp_files(work.path()).is_empty());
}

#[test]
fn test_fill_body_placeholder() {
    let temp = tempfile::tempdir().unwrap();
    let input = create_docx(
        temp.path(),
        "letter.docx",
        &[("word/document.xml", body("<w:p><w:r><w:t>Dear {name},</w:t></w:r></w:p>").as_str())],
    );
    let output = temp.path().join("out.docx");

    fill_file(&input, &output, &vars(&[("name", "Alice")])).unwrap();

    let document = read_entry(&output, "word/document.xml").unwrap();
    assert!(document.contains("Dear Alice,"));
    assert!(!document.contains("{name}"));

    // The template itself is left alone.
    let original = read_entry(&input, "word/document.xml").unwrap();
    assert!(original.contains("{name}"));
}

#[test]
fn test_fill_split_placeholder() {
    let temp = tempfile::tempdir().unwrap();
    let split = "<w:p><w:r><w:t>{</w:t></w:r><w:r><w:rPr><w:i/></w:rPr><w:t>na</w:t></w:r><w:r><w:t>me}</w:t></w:r></w:p>";
    let input = create_docx(temp.path(), "split.docx", &[("word/document.xml", body(split).as_str())]);
    let output = temp.path().join("out.docx");

    fill_file(&input, &output, &vars(&[("name", "Alice")])).unwrap();

    let document = read_entry(&output, "word/document.xml").unwrap();
    assert!(document.contains("<w:p><w:r><w:t>Alice</w:t></w:r></w:p>"));
}

#[test]
fn test_fill_headers_and_footers() {
    let temp = tempfile::tempdir().unwrap();
    let input = create_docx(
        temp.path(),
        "report.docx",
        &[
            ("word/document.xml", body("<w:t>{title}</w:t>").as_str()),
            ("word/header1.xml", "<w:hdr><w:t>{title}</w:t></w:hdr>"),
            ("word/header2.xml", "<w:hdr><w:t>{author}</w:t></w:hdr>"),
            ("word/footer1.xml", "<w:ftr><w:t>{author}, {year}</w:t></w:ftr>"),
            ("word/footer2.xml", "<w:ftr><w:t>{year}</w:t></w:ftr>"),
        ],
    );
    let output = temp.path().join("out.docx");

    fill_file(
        &input,
        &output,
        &vars(&[("title", "Q3"), ("author", "Bo"), ("year", "2024")]),
    )
    .unwrap();

    assert!(read_entry(&output, "word/document.xml").unwrap().contains("<w:t>Q3</w:t>"));
    assert_eq!(
        read_entry(&output, "word/header1.xml").unwrap(),
        "<w:hdr><w:t>Q3</w:t></w:hdr>"
    );
    assert_eq!(
        read_entry(&output, "word/header2.xml").unwrap(),
        "<w:hdr><w:t>Bo</w:t></w:hdr>"
    );
    assert_eq!(
        read_entry(&output, "word/footer1.xml").unwrap(),
        "<w:ftr><w:t>Bo, 2024</w:t></w:ftr>"
    );
    assert_eq!(
        read_entry(&output, "word/footer2.xml").unwrap(),
        "<w:ftr><w:t>2024</w:t></w:ftr>"
    );
}

#[test]
fn test_fill_all_gaps_blanks_unknown_placeholders() {
    let temp = tempfile::tempdir().unwrap();
    let input = create_docx(
        temp.path(),
        "gaps.docx",
        &[
            ("word/document.xml", body("<w:t>{a}{b}</w:t>").as_str()),
            ("word/footer1.xml", "<w:ftr>{c}</w:ftr>"),
        ],
    );
    let output = temp.path().join("out.docx");
    let options = TemplateOptions::new()
        .with_temp_dir(temp.path())
        .unwrap()
        .with_fill_all_gaps(true);

    fill_file_with_options(&input, &output, &vars(&[("a", "X")]), &options).unwrap();

    let document = read_entry(&output, "word/document.xml").unwrap();
    assert!(document.contains("<w:t>X</w:t>"));
    assert!(!document.contains("{b}"));
    assert_eq!(read_entry(&output, "word/footer1.xml").unwrap(), "<w:ftr></w:ftr>");
}

#[test]
fn test_without_fill_all_gaps_unknown_placeholders_remain() {
    let temp = tempfile::tempdir().unwrap();
    let input = create_docx(
        temp.path(),
        "gaps.docx",
        &[("word/document.xml", body("<w:t>{a}{b}</w:t>").as_str())],
    );
    let output = temp.path().join("out.docx");

    fill_file(&input, &output, &vars(&[("a", "X")])).unwrap();

    let document = read_entry(&output, "word/document.xml").unwrap();
    assert!(document.contains("<w:t>X{b}</w:t>"));
}

#[test]
fn test_other_entries_survive_and_missing_parts_stay_missing() {
    let temp = tempfile::tempdir().unwrap();
    let input = create_docx(
        temp.path(),
        "plain.docx",
        &[
            ("word/document.xml", body("<w:t>{x}</w:t>").as_str()),
            ("word/styles.xml", "<w:styles>{x}</w:styles>"),
        ],
    );
    let output = temp.path().join("out.docx");

    fill_file(&input, &output, &vars(&[("x", "1")])).unwrap();

    assert_eq!(
        read_entry(&output, "word/styles.xml").unwrap(),
        "<w:styles>{x}</w:styles>"
    );
    assert_eq!(read_entry(&output, "[Content_Types].xml").unwrap(), CONTENT_TYPES);
    assert!(read_entry(&output, "word/header1.xml").is_none());
    assert!(read_entry(&output, "word/footer2.xml").is_none());
}

#[test]
fn test_save_without_matches_is_byte_identical() {
    let temp = tempfile::tempdir().unwrap();
    let input = create_docx(
        temp.path(),
        "static.docx",
        &[("word/document.xml", body("<w:t>no placeholders</w:t>").as_str())],
    );
    let output = temp.path().join("out.docx");
    let options = TemplateOptions::new().with_temp_dir(temp.path()).unwrap();

    // Never touching a part means nothing is buffered for the archive.
    let template = DocxTemplate::open_with_options(&input, &options).unwrap();
    template.save(&output).unwrap();

    assert_eq!(std::fs::read(&output).unwrap(), std::fs::read(&input).unwrap());
    assert!(leftover_temp_files(temp.path()).is_empty());
}

#[test]
fn test_unmatched_parts_keep_their_text() {
    let temp = tempfile::tempdir().unwrap();
    let document = body("<w:t>static</w:t>");
    let input = create_docx(
        temp.path(),
        "static.docx",
        &[
            ("word/document.xml", document.as_str()),
            ("word/header1.xml", "<w:hdr>{x}</w:hdr>"),
        ],
    );
    let output = temp.path().join("out.docx");

    fill_file(&input, &output, &vars(&[("x", "1")])).unwrap();

    assert_eq!(read_entry(&output, "word/document.xml").unwrap(), document);
    assert_eq!(read_entry(&output, "word/header1.xml").unwrap(), "<w:hdr>1</w:hdr>");
}

#[test]
fn test_chained_part_edits() {
    let temp = tempfile::tempdir().unwrap();
    let input = create_docx(
        temp.path(),
        "chain.docx",
        &[("word/document.xml", body("<w:t>{a}</w:t>").as_str())],
    );
    let output = temp.path().join("out.docx");
    let options = TemplateOptions::new().with_temp_dir(temp.path()).unwrap();

    let mut template = DocxTemplate::open_with_options(&input, &options).unwrap();
    template
        .set_data(&vars(&[("a", "{b}")]), false)
        .unwrap()
        .set_data(&vars(&[("b", "done")]), false)
        .unwrap()
        .set_part(Part::Header1, "<w:hdr>added</w:hdr>")
        .unwrap();
    template.save(&output).unwrap();

    let document = read_entry(&output, "word/document.xml").unwrap();
    assert!(document.contains("<w:t>done</w:t>"));
    assert_eq!(
        read_entry(&output, "word/header1.xml").unwrap(),
        "<w:hdr>added</w:hdr>"
    );
    assert!(leftover_temp_files(temp.path()).is_empty());
}

#[test]
fn test_save_failure_reports_destination() {
    let temp = tempfile::tempdir().unwrap();
    let input = create_docx(
        temp.path(),
        "t.docx",
        &[("word/document.xml", body("<w:t>{a}</w:t>").as_str())],
    );
    let destination = temp.path().join("no-such-dir").join("out.docx");
    let options = TemplateOptions::new().with_temp_dir(temp.path()).unwrap();

    let mut template = DocxTemplate::open_with_options(&input, &options).unwrap();
    template.set_data(&vars(&[("a", "1")]), false).unwrap();
    let result = template.save(&destination);

    assert!(matches!(result, Err(Error::SaveFailed { path, .. }) if path == destination));
    assert!(leftover_temp_files(temp.path()).is_empty());
}

#[test]
fn test_dropping_unsaved_template_removes_working_copy() {
    let temp = tempfile::tempdir().unwrap();
    let input = create_docx(
        temp.path(),
        "t.docx",
        &[("word/document.xml", body("<w:t>{a}</w:t>").as_str())],
    );
    let options = TemplateOptions::new().with_temp_dir(temp.path()).unwrap();

    let template = DocxTemplate::open_with_options(&input, &options).unwrap();
    assert_eq!(leftover_temp_files(temp.path()).len(), 1);
    drop(template);
    assert!(leftover_temp_files(temp.path()).is_empty());
}

#[test]
fn test_list_variables_across_parts() {
    let temp = tempfile::tempdir().unwrap();
    let input = create_docx(
        temp.path(),
        "vars.docx",
        &[
            ("word/document.xml", body("<w:t>{name} {<w:b/>date}</w:t>").as_str()),
            ("word/footer1.xml", "<w:ftr>{page} {name}</w:ftr>"),
        ],
    );

    let vars = list_variables(&input).unwrap();
    assert_eq!(vars.keys().collect::<Vec<_>>(), vec!["name", "date", "page"]);
}

#[test]
fn test_utf16_part_is_filled_as_utf8() {
    let temp = tempfile::tempdir().unwrap();
    let xml = r#"<?xml version="1.0" encoding="UTF-16"?><w:document><w:t>{name}</w:t></w:document>"#;
    let mut utf16 = vec![0xFF, 0xFE];
    utf16.extend(xml.encode_utf16().flat_map(|u| u.to_le_bytes()));

    let mut buffer = Vec::new();
    let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
    zip.start_file("word/document.xml", SimpleFileOptions::default()).unwrap();
    zip.write_all(&utf16).unwrap();
    zip.finish().unwrap();
    let input = temp.path().join("utf16.docx");
    std::fs::write(&input, buffer).unwrap();
    let output = temp.path().join("out.docx");

    fill_file(&input, &output, &vars(&[("name", "Ærlig")])).unwrap();

    assert_eq!(
        read_entry(&output, "word/document.xml").unwrap(),
        r#"<?xml version="1.0" encoding="UTF-8"?><w:document><w:t>Ærlig</w:t></w:document>"#
    );
}
