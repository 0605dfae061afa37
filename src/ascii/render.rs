//! Binary to ASCII (and JSON lines) rendering, in the grammar the reconstructor accepts.

use std::io::{Read, Write};
use std::sync::Arc;

use serde_json::json;

use super::literal::IGNORED;
use crate::codec::{Header, TraceReader, Trailer};
use crate::error::Result;
use crate::registry::{KindLayout, Registry};
use crate::schema::FieldType;
use crate::trace::{CallRecord, HandleKind, Status, Timestamp, Value};

pub struct AsciiRenderer {
    registry: Arc<Registry>,
}

impl AsciiRenderer {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    pub fn render_header<W: Write>(&self, out: &mut W, header: &Header) -> Result<()> {
        writeln!(out, "version={}", header.version)?;
        writeln!(out, "starttime={}", header.start_time)?;
        writeln!(out, "hostname={}", header.hostname)?;
        writeln!(out, "username={}", header.username)?;
        writeln!(out, "meshdim={}", header.meshdim)?;
        if header.meshdim > 0 {
            writeln!(out, "meshsize={}", list(header.meshsize.iter()))?;
            writeln!(out, "meshcrd={}", list(header.meshcrd.iter()))?;
        }
        Ok(())
    }

    pub fn render_record<W: Write>(&self, out: &mut W, record: &CallRecord) -> Result<()> {
        let layout = self.registry.layout(record.kind)?;
        let env = &record.envelope;
        writeln!(
            out,
            "{} entering at walltime {}, cputime {} seconds in thread {}.",
            layout.name(),
            clock(env.wall.start),
            clock(env.cpu.start),
            env.thread
        )?;
        for (idx, (spec, value)) in layout.fields().iter().zip(&record.fields).enumerate() {
            if value.is_absent() {
                continue;
            }
            let dims = self.dims(layout, idx, spec.ty, value, &record.fields)?;
            writeln!(
                out,
                "{} {}{}={}",
                spec.ty.token(),
                spec.name,
                dims,
                self.value(value)
            )?;
        }
        writeln!(
            out,
            "{} returning at walltime {}, cputime {} seconds in thread {}.",
            layout.name(),
            clock(env.wall.stop),
            clock(env.cpu.stop),
            env.thread
        )?;
        if !env.perf.is_empty() {
            let counters: Vec<String> = env
                .perf
                .iter()
                .map(|p| format!("{}={}->{}", p.name, p.before, p.after))
                .collect();
            writeln!(out, "Perfcounters: [{}]", counters.join(", "))?;
        }
        Ok(())
    }

    pub fn render_trailer<W: Write>(&self, out: &mut W, trailer: &Trailer) -> Result<()> {
        for (kind, count) in trailer.footer.nonzero() {
            let name = self.registry.layout(kind)?.name();
            writeln!(
                out,
                "{name} called {} times and ignored {} times",
                count.calls, count.ignored
            )?;
        }
        if !trailer.keyvals.is_empty() {
            writeln!(out, "Keyval pairs: {}", trailer.keyvals.len())?;
            for (key, value) in trailer.keyvals.iter() {
                writeln!(out, "{key}={value}")?;
            }
        }
        if !trailer.perf_labels.is_empty() {
            writeln!(out, "Performance counters: {}", trailer.perf_labels.len())?;
            for name in trailer.perf_labels.iter() {
                writeln!(out, "{name}")?;
            }
        }
        for (index, size) in trailer.datatype_sizes.as_slice().iter().enumerate() {
            if *size != 0 {
                writeln!(out, "Datatype {index} has size {size}")?;
            }
        }
        for (address, label) in trailer.labels.iter() {
            writeln!(out, "Address {address:#x} has label \"{label}\"")?;
        }
        Ok(())
    }

    /// Render a whole binary trace.
    pub fn render_stream<R: Read, W: Write>(&self, mut reader: TraceReader<R>, out: &mut W) -> Result<()> {
        self.render_header(out, reader.header())?;
        for record in reader.by_ref() {
            self.render_record(out, &record?)?;
        }
        let trailer = reader.finish()?;
        self.render_trailer(out, &trailer)
    }

    /// Emit a whole binary trace as JSON lines: header, one line per record, trailer.
    pub fn json_stream<R: Read, W: Write>(&self, mut reader: TraceReader<R>, out: &mut W) -> Result<()> {
        writeln!(out, "{}", json!({ "header": reader.header() }))?;
        for record in reader.by_ref() {
            writeln!(out, "{}", self.record_json(&record?)?)?;
        }
        let trailer = reader.finish()?;
        writeln!(out, "{}", json!({ "trailer": trailer }))?;
        Ok(())
    }

    pub fn record_json(&self, record: &CallRecord) -> Result<serde_json::Value> {
        let layout = self.registry.layout(record.kind)?;
        let fields: Vec<serde_json::Value> = layout
            .fields()
            .iter()
            .zip(&record.fields)
            .map(|(spec, value)| json!({ "name": spec.name, "field": value }))
            .collect();
        Ok(json!({
            "call": layout.name(),
            "envelope": record.envelope,
            "fields": fields,
        }))
    }

    fn dims(
        &self,
        layout: &KindLayout,
        idx: usize,
        ty: FieldType,
        value: &Value,
        fields: &[Value],
    ) -> Result<String> {
        let len = |own: Option<usize>| -> Result<usize> {
            match own {
                Some(n) => Ok(n),
                None => Ok(layout.sibling_count(idx, fields)?.unwrap_or(0)),
            }
        };
        let rendered = match (ty, value) {
            (FieldType::IntMatrix(_, cols), Value::IntMatrix(rows)) => {
                format!("[{}][{cols}]", rows.len())
            }
            (FieldType::Scalar(_) | FieldType::Status | FieldType::Str, _) => String::new(),
            (_, Value::IntArray(v) | Value::HandleArray(_, v)) => format!("[{}]", v.len()),
            (_, Value::LongArray(v)) => format!("[{}]", v.len()),
            (_, Value::OptIntArray(v)) => format!("[{}]", len(v.as_ref().map(Vec::len))?),
            (_, Value::StatusArray(v)) => format!("[{}]", len(v.as_ref().map(Vec::len))?),
            (_, Value::StrArray(v)) => format!("[{}]", v.len()),
            (_, Value::StrTable(v)) => format!("[{}]", v.len()),
            _ => String::new(),
        };
        Ok(rendered)
    }

    fn value(&self, value: &Value) -> String {
        match value {
            Value::Int(v) => v.to_string(),
            Value::Long(v) => v.to_string(),
            Value::Handle(h) => self.handle(h.kind, h.id),
            Value::IntArray(v) => list(v.iter()),
            Value::LongArray(v) => list(v.iter()),
            Value::HandleArray(kind, ids) => list(ids.iter().map(|id| self.handle(*kind, *id))),
            Value::OptIntArray(None) | Value::Status(None) | Value::StatusArray(None) => {
                IGNORED.to_string()
            }
            Value::OptIntArray(Some(v)) => list(v.iter()),
            Value::IntMatrix(rows) => list(rows.iter().map(|r| list(r.iter()))),
            Value::Status(Some(st)) => status(st),
            Value::StatusArray(Some(v)) => list(v.iter().map(status)),
            Value::Str(s) => quoted(s),
            Value::StrArray(v) => list(v.iter().map(|s| quoted(s))),
            Value::StrTable(rows) => list(rows.iter().map(|r| list(r.iter().map(|s| quoted(s))))),
            Value::Absent => String::new(),
        }
    }

    fn handle(&self, kind: HandleKind, id: i32) -> String {
        match self.registry.handle_name(kind, id) {
            Some(name) => format!("{id} ({name})"),
            None => id.to_string(),
        }
    }
}

/// `S.NS` with the nanosecond count unpadded.
fn clock(ts: Timestamp) -> String {
    format!("{}.{}", ts.seconds, ts.nanos)
}

fn quoted(s: &str) -> String {
    format!("\"{s}\"")
}

fn status(st: &Status) -> String {
    format!(
        "{{bytes={}, cancelled={}, source={}, tag={}, error={}}}",
        st.bytes, st.cancelled, st.source, st.tag, st.error
    )
}

fn list<T: std::fmt::Display>(items: impl Iterator<Item = T>) -> String {
    let items: Vec<String> = items.map(|item| item.to_string()).collect();
    format!("[{}]", items.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{CallCount, TraceWriter};
    use crate::trace::{ClockPair, Envelope, Handle, PerfReading};

    fn renderer() -> (Arc<Registry>, AsciiRenderer) {
        let registry = Arc::new(Registry::new().unwrap());
        (registry.clone(), AsciiRenderer::new(registry))
    }

    fn rendered(f: impl FnOnce(&mut Vec<u8>) -> Result<()>) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_render_send() {
        let (registry, r) = renderer();
        let record = CallRecord::new(
            registry.lookup("MPI_Send").unwrap(),
            Envelope {
                thread: 0,
                wall: ClockPair {
                    start: Timestamp::new(10, 125),
                    stop: Timestamp::new(10, 990),
                },
                cpu: ClockPair::default(),
                perf: vec![PerfReading {
                    name: "PAPI_TOT_CYC".into(),
                    before: 100,
                    after: 250,
                }],
            },
            vec![
                Value::Int(100),
                Value::Handle(Handle::new(HandleKind::Datatype, 9)),
                Value::Int(1),
                Value::Int(42),
                Value::Handle(Handle::new(HandleKind::Comm, 77)),
            ],
        );
        let text = rendered(|out| r.render_record(out, &record));
        assert_eq!(
            text,
            "MPI_Send entering at walltime 10.125, cputime 0.0 seconds in thread 0.\n\
             int count=100\n\
             MPI_Datatype datatype=9 (MPI_INT)\n\
             int dest=1\n\
             int tag=42\n\
             MPI_Comm comm=77\n\
             MPI_Send returning at walltime 10.990, cputime 0.0 seconds in thread 0.\n\
             Perfcounters: [PAPI_TOT_CYC=100->250]\n"
        );
    }

    #[test]
    fn test_render_arrays_and_ignored() {
        let (registry, r) = renderer();
        let record = CallRecord::new(
            registry.lookup("MPI_Waitall").unwrap(),
            Envelope::default(),
            vec![
                Value::Int(2),
                Value::HandleArray(HandleKind::Request, vec![3, 4]),
                Value::StatusArray(None),
            ],
        );
        let text = rendered(|out| r.render_record(out, &record));
        assert!(text.contains("MPI_Request requests[2]=[3, 4]\n"));
        assert!(text.contains("MPI_Status statuses[2]=<IGNORED>\n"));
    }

    #[test]
    fn test_render_trailer() {
        let (registry, r) = renderer();
        let mut trailer = Trailer::new(registry.len());
        let barrier = registry.lookup("MPI_Barrier").unwrap();
        trailer.footer.set(barrier, 12, 0).unwrap();
        trailer.keyvals.push("app", "lulesh");
        trailer.datatype_sizes.set(2, 4).unwrap();
        trailer.labels.push(0x7fff10, "halo");
        let text = rendered(|out| r.render_trailer(out, &trailer));
        assert_eq!(
            text,
            "MPI_Barrier called 12 times and ignored 0 times\n\
             Keyval pairs: 1\n\
             app=lulesh\n\
             Datatype 2 has size 4\n\
             Address 0x7fff10 has label \"halo\"\n"
        );
        assert_eq!(
            trailer.footer.get(barrier),
            Some(CallCount {
                calls: 12,
                ignored: 0
            })
        );
    }

    #[test]
    fn test_json_stream() {
        let (registry, r) = renderer();
        let header = Header {
            hostname: "node01".into(),
            ..Header::default()
        };
        let mut writer = TraceWriter::create(Vec::new(), registry.clone(), header).unwrap();
        writer
            .write_record(&CallRecord::new(
                registry.lookup("MPI_Barrier").unwrap(),
                Envelope::default(),
                vec![Value::Handle(Handle::new(HandleKind::Comm, 1))],
            ))
            .unwrap();
        let bytes = writer.finish().unwrap();
        let reader = TraceReader::open(&bytes[..], registry).unwrap();
        let text = rendered(|out| r.json_stream(reader, out));
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["header"]["hostname"], "node01");
        assert_eq!(lines[1]["call"], "MPI_Barrier");
        assert_eq!(lines[1]["fields"][0]["name"], "comm");
        assert_eq!(lines[1]["fields"][0]["field"]["value"]["id"], 1);
        assert!(lines[2]["trailer"]["footer"].is_object());
    }
}
