//! Benchmarks for untrack scanning and resolution performance.
//!
//! Run with: cargo bench
//!
//! These benchmarks test tracked-change processing at various change counts.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::io::{Cursor, Write};
use untrack::Resolution;

/// Creates a synthetic DOCX document with the given number of tracked
/// changes (one insertion and one deletion per tracked paragraph).
fn create_tracked_docx(change_pairs: usize) -> Vec<u8> {
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);

    // [Content_Types].xml
    zip.start_file("[Content_Types].xml", options).unwrap();
    zip.write_all(
        br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>"#,
    )
    .unwrap();

    // _rels/.rels
    zip.start_file("_rels/.rels", options).unwrap();
    zip.write_all(
        br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#,
    )
    .unwrap();

    // Generate document content with alternating tracked insertions and
    // deletions between plain runs.
    let mut content = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>"#,
    );

    for i in 0..change_pairs {
        content.push_str(&format!(
            r#"
    <w:p>
      <w:r><w:t>Paragraph {i} baseline content.</w:t></w:r>
      <w:ins w:id="{ins_id}" w:author="Reviewer"><w:r><w:t>inserted span {i}</w:t></w:r></w:ins>
      <w:del w:id="{del_id}" w:author="Reviewer"><w:r><w:delText>deleted span {i}</w:delText></w:r></w:del>
    </w:p>"#,
            i = i,
            ins_id = i * 2 + 1,
            del_id = i * 2 + 2,
        ));
    }

    content.push_str(
        r#"
  </w:body>
</w:document>"#,
    );

    zip.start_file("word/document.xml", options).unwrap();
    zip.write_all(content.as_bytes()).unwrap();

    zip.finish().unwrap().into_inner()
}

fn bench_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan");

    for &count in &[10usize, 100, 1000] {
        let data = create_tracked_docx(count);
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &data, |b, data| {
            b.iter(|| untrack::scan_bytes(black_box(data.clone())).unwrap());
        });
    }

    group.finish();
}

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");

    for &count in &[10usize, 100, 1000] {
        let data = create_tracked_docx(count);
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("accept", count),
            &data,
            |b, data| {
                b.iter(|| {
                    untrack::resolve_bytes(black_box(data.clone()), Resolution::Accept).unwrap()
                });
            },
        );
        group.bench_with_input(
            BenchmarkId::new("reject", count),
            &data,
            |b, data| {
                b.iter(|| {
                    untrack::resolve_bytes(black_box(data.clone()), Resolution::Reject).unwrap()
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_scan, bench_resolve);
criterion_main!(benches);
