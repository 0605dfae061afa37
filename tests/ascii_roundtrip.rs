//! Render to ASCII, reconstruct, and compare the binary bytes.

mod common;

use std::sync::Arc;

use common::{header_for, records_for_all_kinds, registry, sample_trailer, write_trace};
use mpitrace::codec::TraceReader;
use mpitrace::{AsciiConverter, AsciiRenderer, ConvertOptions, Registry};

fn render(registry: &Arc<Registry>, bytes: &[u8]) -> String {
    let reader = TraceReader::open(bytes, registry.clone()).unwrap();
    let mut out = Vec::new();
    AsciiRenderer::new(registry.clone())
        .render_stream(reader, &mut out)
        .unwrap();
    String::from_utf8(out).unwrap()
}

fn reconstruct(registry: &Arc<Registry>, text: &str) -> Vec<u8> {
    let mut converter =
        AsciiConverter::new(registry.clone(), || Ok(Vec::new()), ConvertOptions::default())
            .unwrap();
    converter.convert(text.as_bytes()).unwrap();
    let (bytes, summary) = converter.finish().unwrap();
    assert_eq!(summary.unmatched, 0, "unmatched lines in:\n{text}");
    bytes
}

#[test]
fn test_every_kind_survives_ascii() {
    let registry = registry();
    for seed in [11, 12] {
        let records = records_for_all_kinds(&registry, seed, 2);
        let original = write_trace(
            &registry,
            header_for(&records),
            &records,
            sample_trailer(&registry),
        );
        let text = render(&registry, &original);
        let rebuilt = reconstruct(&registry, &text);
        if rebuilt != original {
            // Narrow the failure down to a record before giving up.
            let a = TraceReader::open(&original[..], registry.clone()).unwrap();
            let b = TraceReader::open(&rebuilt[..], registry.clone()).unwrap();
            for (x, y) in a.zip(b) {
                assert_eq!(x.unwrap(), y.unwrap());
            }
            panic!("seed {seed}: trailer differs after ASCII round trip");
        }
    }
}

#[test]
fn test_rendering_is_stable() {
    let registry = registry();
    let records = records_for_all_kinds(&registry, 21, 1);
    let original = write_trace(
        &registry,
        header_for(&records),
        &records,
        sample_trailer(&registry),
    );
    let text = render(&registry, &original);
    let again = render(&registry, &reconstruct(&registry, &text));
    assert_eq!(text, again);
}

#[test]
fn test_inputs_accumulate_into_one_trace() {
    let registry = registry();
    let records = records_for_all_kinds(&registry, 31, 1);
    let original = write_trace(
        &registry,
        header_for(&records),
        &records,
        sample_trailer(&registry),
    );
    let text = render(&registry, &original);

    // Split between two records, as two per-file inputs would be.
    let cut = text
        .match_indices("MPI_Barrier entering")
        .map(|(at, _)| at)
        .next()
        .unwrap();
    let mut converter =
        AsciiConverter::new(registry.clone(), || Ok(Vec::new()), ConvertOptions::default())
            .unwrap();
    converter.convert(text[..cut].as_bytes()).unwrap();
    converter.convert(text[cut..].as_bytes()).unwrap();
    let (rebuilt, summary) = converter.finish().unwrap();
    assert_eq!(summary.inputs, 2);
    assert_eq!(summary.records, records.len() as u64);
    assert_eq!(rebuilt, original);
}

#[test]
fn test_empty_trace_uses_header_start_time() {
    let registry = registry();
    let text = "version=0.7.0\nstarttime=1234\nhostname=h\nusername=u\nmeshdim=0\n";
    let bytes = reconstruct(&registry, text);
    let reader = TraceReader::open(&bytes[..], registry.clone()).unwrap();
    assert_eq!(reader.header().start_time, 1234);
    assert_eq!(render(&registry, &bytes), text);
}

#[test]
fn test_same_rendering_twice_doubles_footer() {
    let registry = registry();
    let records = records_for_all_kinds(&registry, 41, 1);
    let original = write_trace(
        &registry,
        header_for(&records),
        &records,
        sample_trailer(&registry),
    );
    let text = render(&registry, &original);

    let mut converter =
        AsciiConverter::new(registry.clone(), || Ok(Vec::new()), ConvertOptions::default())
            .unwrap();
    converter.convert(text.as_bytes()).unwrap();
    converter.convert(text.as_bytes()).unwrap();
    let (rebuilt, summary) = converter.finish().unwrap();
    assert_eq!(summary.unmatched, 0);
    assert!(summary.is_success());
    assert_eq!(summary.records, 2 * records.len() as u64);

    let mut reader = TraceReader::open(&rebuilt[..], registry.clone()).unwrap();
    let decoded = reader.by_ref().collect::<mpitrace::Result<Vec<_>>>().unwrap();
    assert_eq!(decoded.len(), 2 * records.len());
    let trailer = reader.finish().unwrap();
    for layout in registry.kinds() {
        assert_eq!(trailer.footer.get(layout.kind).unwrap().calls, 2);
    }
    assert_eq!(trailer.keyvals, sample_trailer(&registry).keyvals);
    assert_eq!(trailer.labels, sample_trailer(&registry).labels);
}
