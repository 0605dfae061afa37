//! ASCII to binary reconstruction.
//!
//! [`AsciiConverter`] reads the textual rendering line by line, rebuilds each call record from
//! its kind's descriptor list, and feeds it to a [`TraceWriter`]. The output is opened lazily
//! at the first entering banner because that record's wall-clock seconds become the stream's
//! time bias.

use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::lines::LineSource;
use super::literal::{parse_handle, parse_string, split_list, IGNORED};
use super::patterns::{number, Banner, FieldLine, LinePatterns, LineShape};
use crate::codec::{Header, TraceWriter, Trailer};
use crate::error::{Result, TraceError};
use crate::registry::{KindLayout, Registry};
use crate::schema::{FieldSpec, FieldType, Len, Presence, Scalar};
use crate::trace::{CallRecord, ClockPair, Envelope, Handle, Kind, Status, Value, Version};

/// Converter tunables.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConvertOptions {
    /// Treat unmatched top-level lines as success. They are still logged.
    pub allow_unmatched: bool,
}

/// Outcome of a conversion run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ConversionSummary {
    pub inputs: usize,
    pub lines: usize,
    pub records: u64,
    pub unmatched: usize,
    pub allow_unmatched: bool,
}

impl ConversionSummary {
    /// Whether the run should count as a success.
    pub fn is_success(&self) -> bool {
        self.unmatched == 0 || self.allow_unmatched
    }
}

type Opener<W> = Box<dyn FnOnce() -> io::Result<W>>;

pub struct AsciiConverter<W: Write> {
    registry: Arc<Registry>,
    patterns: LinePatterns,
    header: Header,
    opener: Option<Opener<W>>,
    writer: Option<TraceWriter<W>>,
    trailer: Trailer,
    footer_overrides: HashMap<Kind, (u32, u32)>,
    summary: ConversionSummary,
}

impl<W: Write> AsciiConverter<W> {
    /// `open` is called at most once, when the first record (or the trailer of an empty trace)
    /// needs to be written.
    pub fn new<F>(registry: Arc<Registry>, open: F, options: ConvertOptions) -> Result<Self>
    where
        F: FnOnce() -> io::Result<W> + 'static,
    {
        Ok(Self {
            patterns: LinePatterns::new()?,
            header: Header::default(),
            opener: Some(Box::new(open)),
            writer: None,
            trailer: Trailer::new(registry.len()),
            footer_overrides: HashMap::new(),
            summary: ConversionSummary {
                allow_unmatched: options.allow_unmatched,
                ..ConversionSummary::default()
            },
            registry,
        })
    }

    /// Header as parsed so far. Its version is what the input declared, not what is written.
    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn summary(&self) -> ConversionSummary {
        self.summary
    }

    /// Consume one ASCII input. May be called once per input file.
    pub fn convert<R: BufRead>(&mut self, input: R) -> Result<()> {
        let mut lines = LineSource::new(input);
        self.summary.inputs += 1;

        while let Some(line) = lines.next_line()? {
            let line_no = lines.line_number();
            if line.trim().is_empty() {
                continue;
            }
            match self.patterns.classify(line_no, line.trim_end())? {
                Some(LineShape::Header { key, value }) => self.header_line(line_no, key, value)?,
                Some(LineShape::Entering(banner)) => self.record(&mut lines, line_no, banner)?,
                Some(LineShape::KeyvalCount(n)) => {
                    for _ in 0..n {
                        let (no, kv) = block_line(&mut lines, "keyval")?;
                        let (key, value) = kv.split_once('=').ok_or_else(|| {
                            TraceError::grammar(no, format!("expected key=value, got {kv:?}"))
                        })?;
                        // Per-rank inputs repeat the same pairs.
                        if !self.trailer.keyvals.iter().any(|pair| pair == (key, value)) {
                            self.trailer.keyvals.push(key, value);
                        }
                    }
                }
                Some(LineShape::CallCount {
                    name,
                    calls,
                    ignored,
                }) => {
                    let kind = self.registry.lookup(name)?;
                    let (total_calls, total_ignored) =
                        self.footer_overrides.entry(kind).or_default();
                    let overflow =
                        || TraceError::range(format!("line {line_no}: {name} count overflows"));
                    *total_calls = total_calls.checked_add(calls).ok_or_else(overflow)?;
                    *total_ignored = total_ignored.checked_add(ignored).ok_or_else(overflow)?;
                }
                Some(LineShape::PerfCount(n)) => {
                    for _ in 0..n {
                        let (_, name) = block_line(&mut lines, "performance counter")?;
                        let name = name.trim();
                        if !self.trailer.perf_labels.iter().any(|known| known == name) {
                            self.trailer.perf_labels.push(name)?;
                        }
                    }
                }
                Some(LineShape::Label { address, label }) => {
                    if !self.trailer.labels.iter().any(|l| l == (address, label)) {
                        self.trailer.labels.push(address, label)
                    }
                }
                Some(LineShape::DatatypeSize { index, size }) => {
                    self.trailer.datatype_sizes.set(index, size)?
                }
                None => self.unmatched(line_no, &line),
            }
        }
        self.summary.lines += lines.line_number();
        Ok(())
    }

    /// Write the trailer and index and return the output sink.
    pub fn finish(mut self) -> Result<(W, ConversionSummary)> {
        let start_time = self.header.start_time;
        self.ensure_writer(start_time)?;
        let Some(mut writer) = self.writer.take() else {
            return Err(TraceError::desync("output was not opened"));
        };

        let Trailer {
            footer: _,
            keyvals,
            perf_labels,
            datatype_sizes,
            labels,
        } = self.trailer;
        *writer.keyvals_mut() = keyvals;
        *writer.perf_labels_mut() = perf_labels;
        *writer.datatype_sizes_mut() = datatype_sizes;
        *writer.labels_mut() = labels;
        for (kind, (calls, ignored)) in self.footer_overrides {
            writer.footer_mut().set(kind, calls, ignored)?;
        }

        self.summary.records = writer.records();
        let sink = writer.finish()?;
        Ok((sink, self.summary))
    }

    fn unmatched(&mut self, line_no: usize, line: &str) {
        warn!("line {line_no}: unmatched line: {line}");
        self.summary.unmatched += 1;
    }

    fn header_line(&mut self, line_no: usize, key: &str, value: &str) -> Result<()> {
        // Later inputs carry their own rank's header; the written one is already fixed.
        if self.writer.is_some() {
            debug!("line {line_no}: header {key} ignored, output already open");
            return Ok(());
        }
        let h = &mut self.header;
        match key {
            "version" => h.version = parse_version(line_no, value)?,
            "starttime" => h.start_time = number(line_no, value)?,
            "hostname" => h.hostname = value.to_string(),
            "username" => h.username = value.to_string(),
            "meshdim" => h.meshdim = number(line_no, value)?,
            "meshsize" => h.meshsize = int_list(line_no, value)?,
            "meshcrd" => h.meshcrd = int_list(line_no, value)?,
            other => return Err(TraceError::grammar(line_no, format!("unknown header key {other}"))),
        }
        Ok(())
    }

    fn ensure_writer(&mut self, time_bias: i64) -> Result<()> {
        if self.writer.is_some() {
            return Ok(());
        }
        let open = self
            .opener
            .take()
            .ok_or_else(|| TraceError::desync("output already consumed"))?;
        let sink = open()?;
        let mut header = self.header.clone();
        header.start_time = time_bias;
        info!(
            "opened output, time bias {time_bias}, declared version {}",
            self.header.version
        );
        self.writer = Some(TraceWriter::create(sink, self.registry.clone(), header)?);
        Ok(())
    }

    fn record<R: BufRead>(
        &mut self,
        lines: &mut LineSource<R>,
        line_no: usize,
        entering: Banner<'_>,
    ) -> Result<()> {
        let registry = self.registry.clone();
        let kind = registry.lookup(entering.name)?;
        let layout = registry.layout(kind)?;

        let mut fields = Vec::with_capacity(layout.fields().len());
        for (idx, spec) in layout.fields().iter().enumerate() {
            if spec.presence == Presence::RootOnly && !layout.root_fields_present(&fields)? {
                fields.push(Value::Absent);
                continue;
            }
            let line = lines.next_nonblank()?.ok_or_else(|| {
                TraceError::grammar(
                    lines.line_number(),
                    format!("input ends inside {} (expecting {})", layout.name(), spec.name),
                )
            })?;
            let no = lines.line_number();
            let field = self.patterns.field(no, line.trim_end())?.ok_or_else(|| {
                TraceError::grammar(
                    no,
                    format!("expected field {}.{}, got {line:?}", layout.name(), spec.name),
                )
            })?;
            if field.ty != spec.ty.token() || field.name != spec.name {
                return Err(TraceError::grammar(
                    no,
                    format!(
                        "expected {} {} in {}, got {} {}",
                        spec.ty.token(),
                        spec.name,
                        layout.name(),
                        field.ty,
                        field.name
                    ),
                ));
            }
            let count = layout.sibling_count(idx, &fields)?;
            fields.push(self.field_value(layout, spec, &field, count, no)?);
        }

        let line = lines.next_nonblank()?.ok_or_else(|| {
            TraceError::grammar(
                lines.line_number(),
                format!("input ends before {} returns", layout.name()),
            )
        })?;
        let exit_no = lines.line_number();
        let exiting = self.patterns.returning(exit_no, line.trim_end())?.ok_or_else(|| {
            TraceError::grammar(exit_no, format!("expected {} returning banner", layout.name()))
        })?;
        if exiting.name != entering.name {
            return Err(TraceError::desync(format!(
                "line {exit_no}: {} returns inside {} entered at line {line_no}",
                exiting.name, entering.name
            )));
        }
        if exiting.thread != entering.thread {
            return Err(TraceError::desync(format!(
                "line {exit_no}: {} entered in thread {} but returns in thread {}",
                entering.name, entering.thread, exiting.thread
            )));
        }

        // Counter values are not carried back into the binary form.
        if let Some(next) = lines.peek()? {
            if self.patterns.is_perfcounters(next.trim_end()) {
                lines.next_line()?;
            }
        }

        let envelope = Envelope {
            thread: entering.thread,
            wall: ClockPair {
                start: entering.wall,
                stop: exiting.wall,
            },
            cpu: ClockPair {
                start: entering.cpu,
                stop: exiting.cpu,
            },
            perf: Vec::new(),
        };
        let record = CallRecord::new(kind, envelope, fields);

        self.ensure_writer(entering.wall.seconds)?;
        let Some(writer) = self.writer.as_mut() else {
            return Err(TraceError::desync("output was not opened"));
        };
        writer.write_record(&record)?;
        debug!("line {line_no}: {}", layout.name());
        Ok(())
    }

    fn field_value(
        &self,
        layout: &KindLayout,
        spec: &FieldSpec,
        field: &FieldLine<'_>,
        count: Option<usize>,
        line_no: usize,
    ) -> Result<Value> {
        let registry = self.registry.as_ref();
        let text = field.value.trim();
        let dims = |want: usize| -> Result<()> {
            if field.dims.len() != want {
                return Err(TraceError::grammar(
                    line_no,
                    format!(
                        "{}.{}: expected {want} dimension(s), got {}",
                        layout.name(),
                        spec.name,
                        field.dims.len()
                    ),
                ));
            }
            Ok(())
        };
        // Declared `[n]` and the element count both have to agree with the sibling.
        let length = |declared: i64, actual: usize| -> Result<()> {
            let expected = count.map_or(declared, |c| c as i64);
            if declared != expected || actual as i64 != expected {
                return Err(TraceError::desync(format!(
                    "line {line_no}: {}.{}: declared {declared}, listed {actual}, expected {expected}",
                    layout.name(),
                    spec.name
                )));
            }
            Ok(())
        };

        let value = match spec.ty {
            FieldType::Scalar(scalar) => {
                dims(0)?;
                scalar_value(registry, scalar, line_no, text)?
            }
            FieldType::Array(scalar, _) => {
                dims(1)?;
                let items = split_list(line_no, text)?;
                length(field.dims[0], items.len())?;
                array_value(registry, scalar, line_no, &items)?
            }
            FieldType::OptIntArray(_) => {
                dims(1)?;
                if text == IGNORED {
                    length(field.dims[0], count.unwrap_or(0))?;
                    Value::OptIntArray(None)
                } else {
                    let items = split_list(line_no, text)?;
                    length(field.dims[0], items.len())?;
                    Value::OptIntArray(Some(ints(line_no, &items)?))
                }
            }
            FieldType::IntMatrix(_, cols) => {
                dims(2)?;
                let rows = split_list(line_no, text)?;
                length(field.dims[0], rows.len())?;
                if field.dims[1] != cols as i64 {
                    return Err(TraceError::desync(format!(
                        "line {line_no}: {}.{} declares {} columns, expected {cols}",
                        layout.name(),
                        spec.name,
                        field.dims[1]
                    )));
                }
                let mut matrix = Vec::with_capacity(rows.len());
                for row in rows {
                    let row = ints(line_no, &split_list(line_no, row)?)?;
                    if row.len() != cols {
                        return Err(TraceError::desync(format!(
                            "line {line_no}: {}.{} row has {} columns, expected {cols}",
                            layout.name(),
                            spec.name,
                            row.len()
                        )));
                    }
                    matrix.push(row);
                }
                Value::IntMatrix(matrix)
            }
            FieldType::Status => {
                dims(0)?;
                if text == IGNORED {
                    Value::Status(None)
                } else {
                    Value::Status(Some(self.patterns.status(line_no, text)?))
                }
            }
            FieldType::StatusArray(_) => {
                dims(1)?;
                if text == IGNORED {
                    length(field.dims[0], count.unwrap_or(0))?;
                    Value::StatusArray(None)
                } else {
                    let items = split_list(line_no, text)?;
                    length(field.dims[0], items.len())?;
                    let statuses = items
                        .iter()
                        .map(|s| self.patterns.status(line_no, s))
                        .collect::<Result<Vec<Status>>>()?;
                    Value::StatusArray(Some(statuses))
                }
            }
            FieldType::Str => {
                dims(0)?;
                Value::Str(parse_string(line_no, text)?)
            }
            FieldType::StrArray(len) => {
                dims(1)?;
                let items = split_list(line_no, text)?;
                match len {
                    Len::Prefixed if field.dims[0] != items.len() as i64 => {
                        return Err(TraceError::desync(format!(
                            "line {line_no}: {}.{} declares {} strings, lists {}",
                            layout.name(),
                            spec.name,
                            field.dims[0],
                            items.len()
                        )));
                    }
                    Len::Prefixed => {}
                    Len::Field(_) => length(field.dims[0], items.len())?,
                }
                Value::StrArray(strings(line_no, &items)?)
            }
            FieldType::StrTable(_) => {
                dims(1)?;
                let rows = split_list(line_no, text)?;
                length(field.dims[0], rows.len())?;
                let table = rows
                    .into_iter()
                    .map(|row| strings(line_no, &split_list(line_no, row)?))
                    .collect::<Result<Vec<_>>>()?;
                Value::StrTable(table)
            }
        };
        Ok(value)
    }
}

fn block_line<R: BufRead>(lines: &mut LineSource<R>, what: &str) -> Result<(usize, String)> {
    let line = lines.next_nonblank()?.ok_or_else(|| {
        TraceError::grammar(lines.line_number(), format!("input ends inside {what} block"))
    })?;
    Ok((lines.line_number(), line))
}

fn parse_version(line_no: usize, text: &str) -> Result<Version> {
    let parts: Vec<&str> = text.trim().split('.').collect();
    let ambiguous = || TraceError::VersionAmbiguity(format!("line {line_no}: version {text:?}"));
    let [major, minor, patch] = parts[..] else {
        return Err(ambiguous());
    };
    let part = |p: &str| p.parse::<u8>().map_err(|_| ambiguous());
    Ok(Version::new(part(major)?, part(minor)?, part(patch)?))
}

fn int_list(line_no: usize, text: &str) -> Result<Vec<i32>> {
    ints(line_no, &split_list(line_no, text)?)
}

fn ints(line_no: usize, items: &[&str]) -> Result<Vec<i32>> {
    items.iter().map(|s| number(line_no, s)).collect()
}

fn strings(line_no: usize, items: &[&str]) -> Result<Vec<String>> {
    items.iter().map(|s| parse_string(line_no, s)).collect()
}

fn scalar_value(registry: &Registry, scalar: Scalar, line_no: usize, text: &str) -> Result<Value> {
    Ok(match scalar {
        Scalar::Int => Value::Int(number(line_no, text)?),
        Scalar::Aint | Scalar::Offset => Value::Long(number(line_no, text)?),
        Scalar::Handle(kind) => {
            Value::Handle(Handle::new(kind, parse_handle(registry, kind, line_no, text)?))
        }
    })
}

fn array_value(registry: &Registry, scalar: Scalar, line_no: usize, items: &[&str]) -> Result<Value> {
    Ok(match scalar {
        Scalar::Int => Value::IntArray(ints(line_no, items)?),
        Scalar::Aint | Scalar::Offset => Value::LongArray(
            items
                .iter()
                .map(|s| number(line_no, s))
                .collect::<Result<_>>()?,
        ),
        Scalar::Handle(kind) => Value::HandleArray(
            kind,
            items
                .iter()
                .map(|s| parse_handle(registry, kind, line_no, s))
                .collect::<Result<_>>()?,
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::TraceReader;
    use crate::trace::{HandleKind, Timestamp};

    fn registry() -> Arc<Registry> {
        Arc::new(Registry::new().unwrap())
    }

    fn convert(registry: &Arc<Registry>, text: &str) -> Result<(Vec<u8>, ConversionSummary)> {
        let mut conv =
            AsciiConverter::new(registry.clone(), || Ok(Vec::new()), ConvertOptions::default())?;
        conv.convert(text.as_bytes())?;
        conv.finish()
    }

    fn decode(registry: &Arc<Registry>, bytes: &[u8]) -> (Vec<CallRecord>, Trailer) {
        let mut reader = TraceReader::open(bytes, registry.clone()).unwrap();
        let records = reader.by_ref().collect::<Result<Vec<_>>>().unwrap();
        let trailer = reader.finish().unwrap();
        (records, trailer)
    }

    const SEND: &str = "\
MPI_Send entering at walltime 1700000010.125, cputime 0.5000 seconds in thread 0.
int count=100
MPI_Datatype datatype=0
int dest=1
int tag=42
MPI_Comm comm=0
MPI_Send returning at walltime 1700000010.990, cputime 0.9000 seconds in thread 0.
";

    #[test]
    fn test_header_lines_parse() {
        let registry = registry();
        let mut conv =
            AsciiConverter::new(registry.clone(), || Ok(Vec::new()), ConvertOptions::default())
                .unwrap();
        conv.convert(&b"version=1.2.3\nmeshdim=2\nmeshsize=[4, 4]\nmeshcrd=[1, 2]\n"[..])
            .unwrap();
        let h = conv.header();
        assert_eq!(h.version, Version::new(1, 2, 3));
        assert_eq!(h.meshdim, 2);
        assert_eq!(h.meshsize, vec![4, 4]);
        assert_eq!(h.meshcrd, vec![1, 2]);

        // The written stream always carries the current version.
        let (bytes, _) = conv.finish().unwrap();
        let reader = TraceReader::open(&bytes[..], registry).unwrap();
        assert_eq!(reader.header().version, crate::trace::constants::FORMAT_VERSION);
        assert_eq!(reader.header().meshsize, vec![4, 4]);
    }

    #[test]
    fn test_bad_version_is_ambiguous() {
        let registry = registry();
        assert!(matches!(
            convert(&registry, "version=1.2\n"),
            Err(TraceError::VersionAmbiguity(_))
        ));
    }

    #[test]
    fn test_send_round_trip() {
        let registry = registry();
        let (bytes, summary) = convert(&registry, SEND).unwrap();
        assert_eq!(summary.records, 1);
        assert!(summary.is_success());

        let (records, trailer) = decode(&registry, &bytes);
        let send = &records[0];
        assert_eq!(send.kind, registry.lookup("MPI_Send").unwrap());
        assert_eq!(
            send.fields,
            vec![
                Value::Int(100),
                Value::Handle(Handle::new(HandleKind::Datatype, 0)),
                Value::Int(1),
                Value::Int(42),
                Value::Handle(Handle::new(HandleKind::Comm, 0)),
            ]
        );
        assert_eq!(send.envelope.wall.start, Timestamp::new(1_700_000_010, 125));
        assert_eq!(send.envelope.wall.stop, Timestamp::new(1_700_000_010, 990));
        assert_eq!(trailer.footer.get(send.kind).unwrap().calls, 1);
    }

    #[test]
    fn test_ignored_status_distinct_from_zero() {
        let registry = registry();
        let text = |status: &str| {
            format!(
                "MPI_Wait entering at walltime 5.0, cputime 0.0 seconds in thread 0.\n\
                 MPI_Request request=4\n\
                 MPI_Status status={status}\n\
                 MPI_Wait returning at walltime 5.1, cputime 0.1 seconds in thread 0.\n"
            )
        };
        let (ignored, _) = convert(&registry, &text("<IGNORED>")).unwrap();
        let (zero, _) = convert(
            &registry,
            &text("{bytes=0, cancelled=0, source=0, tag=0, error=0}"),
        )
        .unwrap();
        let (ignored, _) = decode(&registry, &ignored);
        let (zero, _) = decode(&registry, &zero);
        assert_eq!(ignored[0].fields[1], Value::Status(None));
        assert_eq!(zero[0].fields[1], Value::Status(Some(Status::default())));
    }

    #[test]
    fn test_waitall_lengths() {
        let registry = registry();
        let text = "\
MPI_Waitall entering at walltime 7.0, cputime 0.0 seconds in thread 2.
int count=3
MPI_Request requests[3]=[10, 11, 12]
MPI_Status statuses[3]=[{bytes=4, cancelled=0, source=1, tag=0, error=0}, {bytes=4, cancelled=0, source=2, tag=0, error=0}, {bytes=4, cancelled=0, source=3, tag=0, error=0}]
MPI_Waitall returning at walltime 7.2, cputime 0.1 seconds in thread 2.
";
        let (bytes, _) = convert(&registry, text).unwrap();
        let (records, _) = decode(&registry, &bytes);
        let Value::HandleArray(_, requests) = &records[0].fields[1] else {
            panic!("requests not decoded as a handle array");
        };
        assert_eq!(requests.len(), 3);
        let Value::StatusArray(Some(statuses)) = &records[0].fields[2] else {
            panic!("statuses not present");
        };
        assert_eq!(statuses.len(), 3);
        assert_eq!(statuses[2].source, 3);
    }

    #[test]
    fn test_declared_length_must_match_sibling() {
        let registry = registry();
        let text = "\
MPI_Waitall entering at walltime 7.0, cputime 0.0 seconds in thread 2.
int count=3
MPI_Request requests[2]=[10, 11]
MPI_Status statuses[3]=<IGNORED>
MPI_Waitall returning at walltime 7.2, cputime 0.1 seconds in thread 2.
";
        assert!(matches!(
            convert(&registry, text),
            Err(TraceError::FormatDesync(_))
        ));
    }

    #[test]
    fn test_datatype_sizes_zero_filled() {
        let registry = registry();
        let (bytes, _) =
            convert(&registry, "Datatype 5 has size 8\nDatatype 2 has size 4\n").unwrap();
        let (_, trailer) = decode(&registry, &bytes);
        assert_eq!(trailer.datatype_sizes.as_slice(), &[0, 0, 4, 0, 0, 8]);
    }

    #[test]
    fn test_call_count_overrides_footer() {
        let registry = registry();
        let text = format!("{SEND}MPI_Barrier called 12 times and ignored 0 times\n");
        let (bytes, _) = convert(&registry, &text).unwrap();
        let (_, trailer) = decode(&registry, &bytes);
        let barrier = registry.lookup("MPI_Barrier").unwrap();
        assert_eq!(trailer.footer.get(barrier).unwrap().calls, 12);
        // Kinds without a summary line keep the automatic count.
        let send = registry.lookup("MPI_Send").unwrap();
        assert_eq!(trailer.footer.get(send).unwrap().calls, 1);
    }

    #[test]
    fn test_per_rank_inputs_accumulate() {
        let registry = registry();
        let rank = |host: &str| {
            format!(
                "version=0.7.0\nstarttime=1700000000\nhostname={host}\nusername=u\nmeshdim=0\n\
                 {SEND}MPI_Send called 1 times and ignored 0 times\n\
                 Keyval pairs: 1\nMPICH_VERSION=3.4.1\n\
                 Performance counters: 1\nPAPI_TOT_CYC\n"
            )
        };
        let mut conv =
            AsciiConverter::new(registry.clone(), || Ok(Vec::new()), ConvertOptions::default())
                .unwrap();
        conv.convert(rank("node00").as_bytes()).unwrap();
        conv.convert(rank("node01").as_bytes()).unwrap();
        let (bytes, summary) = conv.finish().unwrap();
        assert_eq!(summary.inputs, 2);
        assert_eq!(summary.records, 2);
        assert_eq!(summary.unmatched, 0);
        assert!(summary.is_success());

        let reader = TraceReader::open(&bytes[..], registry.clone()).unwrap();
        assert_eq!(reader.header().hostname, "node00");
        let (records, trailer) = decode(&registry, &bytes);
        assert_eq!(records.len(), 2);
        let send = registry.lookup("MPI_Send").unwrap();
        assert_eq!(trailer.footer.get(send).unwrap().calls, 2);
        assert_eq!(trailer.keyvals.len(), 1);
        assert_eq!(trailer.perf_labels.len(), 1);
    }

    #[test]
    fn test_type_token_mismatch() {
        let registry = registry();
        let text = SEND.replace("int dest=1", "MPI_Comm dest=1");
        assert!(matches!(
            convert(&registry, &text),
            Err(TraceError::GrammarMismatch { line: 4, .. })
        ));
        let text = SEND.replace("int dest=1", "int source=1");
        assert!(matches!(
            convert(&registry, &text),
            Err(TraceError::GrammarMismatch { line: 4, .. })
        ));
    }

    #[test]
    fn test_thread_mismatch() {
        let registry = registry();
        let text = SEND.replace(
            "cputime 0.9000 seconds in thread 0.",
            "cputime 0.9000 seconds in thread 1.",
        );
        assert!(matches!(
            convert(&registry, &text),
            Err(TraceError::FormatDesync(_))
        ));
    }

    #[test]
    fn test_unknown_kind() {
        let registry = registry();
        let text = SEND.replace("MPI_Send", "MPI_Sendd");
        assert!(matches!(
            convert(&registry, &text),
            Err(TraceError::UnknownKind(_))
        ));
    }

    #[test]
    fn test_unmatched_lines_counted() {
        let registry = registry();
        let text = format!("# produced by a test\n{SEND}\nnoise\n");
        let (_, summary) = convert(&registry, &text).unwrap();
        assert_eq!(summary.unmatched, 2);
        assert_eq!(summary.records, 1);
        assert!(!summary.is_success());

        let mut conv = AsciiConverter::new(
            registry.clone(),
            || Ok(Vec::new()),
            ConvertOptions {
                allow_unmatched: true,
            },
        )
        .unwrap();
        conv.convert(text.as_bytes()).unwrap();
        assert!(conv.finish().unwrap().1.is_success());
    }

    #[test]
    fn test_perfcounters_line_consumed() {
        let registry = registry();
        let text = format!("{SEND}Perfcounters: [PAPI_TOT_CYC=100->250]\n");
        let (bytes, summary) = convert(&registry, &text).unwrap();
        assert_eq!(summary.unmatched, 0);
        let (records, _) = decode(&registry, &bytes);
        assert!(records[0].envelope.perf.is_empty());
    }

    #[test]
    fn test_first_record_sets_time_bias() {
        let registry = registry();
        let text = format!("starttime=42\n{SEND}");
        let (bytes, _) = convert(&registry, &text).unwrap();
        let reader = TraceReader::open(&bytes[..], registry).unwrap();
        assert_eq!(reader.header().start_time, 1_700_000_010);
    }

    #[test]
    fn test_output_not_opened_before_first_record() {
        let registry = registry();
        let opened = std::rc::Rc::new(std::cell::Cell::new(false));
        let flag = opened.clone();
        let mut conv = AsciiConverter::new(
            registry,
            move || {
                flag.set(true);
                Ok(Vec::new())
            },
            ConvertOptions::default(),
        )
        .unwrap();
        conv.convert(&b"hostname=node01\nusername=alice\n"[..]).unwrap();
        assert!(!opened.get());
        conv.convert(SEND.as_bytes()).unwrap();
        assert!(opened.get());
    }
}
