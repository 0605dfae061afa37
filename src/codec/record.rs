//! Generic per-record encode/decode driven by the kind descriptor lists.

use std::io::{Read, Write};
use std::sync::Arc;

use tracing::trace;

use super::wire::{prealloc, WireReader, WireWriter};
use crate::error::{Result, TraceError};
use crate::registry::{KindLayout, Registry};
use crate::schema::{FieldSpec, FieldType, Legacy, Len, Presence, Scalar};
use crate::trace::constants::{FORMAT_VERSION, MAX_PERF_COUNTERS};
use crate::trace::{
    CallRecord, ClockPair, Envelope, Handle, PerfReading, Status, Timestamp, Value, Version,
};

/// Encodes and decodes framed call records for one stream.
///
/// The stream version selects legacy decode paths; the time bias is subtracted from wall-clock
/// seconds on the wire so they fit in 32 bits.
#[derive(Clone, Debug)]
pub struct RecordCodec {
    registry: Arc<Registry>,
    version: Version,
    time_bias: i64,
}

impl RecordCodec {
    pub fn new(registry: Arc<Registry>, version: Version, time_bias: i64) -> Self {
        Self {
            registry,
            version,
            time_bias,
        }
    }

    /// Codec for newly written streams, which always carry [`FORMAT_VERSION`].
    pub fn current(registry: Arc<Registry>, time_bias: i64) -> Self {
        Self::new(registry, FORMAT_VERSION, time_bias)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn time_bias(&self) -> i64 {
        self.time_bias
    }

    pub fn encode<W: Write>(&self, w: &mut WireWriter<W>, record: &CallRecord) -> Result<()> {
        let layout = self.registry.layout(record.kind)?;
        let specs = layout.fields();
        if record.fields.len() != specs.len() {
            return Err(TraceError::desync(format!(
                "{}: expected {} fields, got {}",
                layout.name(),
                specs.len(),
                record.fields.len()
            )));
        }

        w.u16(record.kind.0)?;
        self.encode_envelope(w, &record.envelope)?;

        let mut root_present = None;
        for (idx, (spec, value)) in specs.iter().zip(&record.fields).enumerate() {
            if spec.presence == Presence::RootOnly {
                let present = match root_present {
                    Some(p) => p,
                    None => {
                        let p = layout.root_fields_present(&record.fields)?;
                        root_present = Some(p);
                        p
                    }
                };
                if present == value.is_absent() {
                    return Err(TraceError::desync(format!(
                        "{}.{}: root-only field {} but commrank {} root",
                        layout.name(),
                        spec.name,
                        if present { "missing" } else { "supplied" },
                        if present { "equals" } else { "differs from" },
                    )));
                }
                if !present {
                    continue;
                }
            } else if value.is_absent() {
                return Err(TraceError::desync(format!(
                    "{}.{}: field is required",
                    layout.name(),
                    spec.name
                )));
            }
            let count = layout.sibling_count(idx, &record.fields)?;
            encode_field(w, layout, spec, value, count)?;
        }

        w.u16(record.kind.0)?;
        trace!("encoded {} ({} bytes so far)", layout.name(), w.position());
        Ok(())
    }

    /// Read one record including its start tag.
    pub fn decode<R: Read>(&self, r: &mut WireReader<R>) -> Result<CallRecord> {
        let tag = r.u16()?;
        self.decode_tagged(r, tag)
    }

    /// Read one record whose start tag the caller has already consumed.
    pub fn decode_tagged<R: Read>(&self, r: &mut WireReader<R>, tag: u16) -> Result<CallRecord> {
        let layout = self.registry.layout_for_tag(tag)?;
        let envelope = self.decode_envelope(r)?;

        let specs = layout.fields();
        let mut fields: Vec<Value> = Vec::with_capacity(specs.len());
        for (idx, spec) in specs.iter().enumerate() {
            if spec.presence == Presence::RootOnly && !layout.root_fields_present(&fields)? {
                fields.push(Value::Absent);
                continue;
            }
            let count = layout.sibling_count(idx, &fields)?;
            let value = self.decode_field(r, layout, spec, count)?;
            fields.push(value);
        }

        let end = r.u16()?;
        if end != tag {
            return Err(TraceError::desync(format!(
                "{}: end tag {end} does not match start tag {tag}",
                layout.name()
            )));
        }
        Ok(CallRecord::new(layout.kind, envelope, fields))
    }

    pub fn encode_to_vec(&self, record: &CallRecord) -> Result<Vec<u8>> {
        let mut w = WireWriter::new(Vec::new());
        self.encode(&mut w, record)?;
        Ok(w.into_inner())
    }

    /// Decode exactly one record occupying all of `bytes`.
    pub fn decode_from_slice(&self, bytes: &[u8]) -> Result<CallRecord> {
        let mut r = WireReader::new(bytes);
        let record = self.decode(&mut r)?;
        if r.position() != bytes.len() as u64 {
            return Err(TraceError::desync(format!(
                "{} trailing bytes after record",
                bytes.len() as u64 - r.position()
            )));
        }
        Ok(record)
    }

    fn encode_envelope<W: Write>(&self, w: &mut WireWriter<W>, env: &Envelope) -> Result<()> {
        w.u32(env.thread)?;
        self.encode_wall(w, env.wall.start)?;
        self.encode_wall(w, env.wall.stop)?;
        encode_clock(w, env.cpu.start, 0)?;
        encode_clock(w, env.cpu.stop, 0)?;

        if env.perf.len() > MAX_PERF_COUNTERS {
            return Err(TraceError::range(format!(
                "{} performance counters, at most {MAX_PERF_COUNTERS} allowed",
                env.perf.len()
            )));
        }
        w.u8(env.perf.len() as u8)?;
        for reading in &env.perf {
            w.string(&reading.name)?;
            w.i64(reading.before)?;
            w.i64(reading.after)?;
        }
        Ok(())
    }

    fn encode_wall<W: Write>(&self, w: &mut WireWriter<W>, ts: Timestamp) -> Result<()> {
        encode_clock(w, ts, self.time_bias)
    }

    fn decode_envelope<R: Read>(&self, r: &mut WireReader<R>) -> Result<Envelope> {
        let thread = r.u32()?;
        let wall = ClockPair {
            start: decode_clock(r, self.time_bias)?,
            stop: decode_clock(r, self.time_bias)?,
        };
        let cpu = ClockPair {
            start: decode_clock(r, 0)?,
            stop: decode_clock(r, 0)?,
        };

        let n = r.u8()? as usize;
        if n > MAX_PERF_COUNTERS {
            return Err(TraceError::range(format!(
                "{n} performance counters, at most {MAX_PERF_COUNTERS} allowed"
            )));
        }
        let mut perf = Vec::with_capacity(n);
        for _ in 0..n {
            perf.push(PerfReading {
                name: r.string()?,
                before: r.i64()?,
                after: r.i64()?,
            });
        }
        Ok(Envelope {
            thread,
            wall,
            cpu,
            perf,
        })
    }

    fn decode_field<R: Read>(
        &self,
        r: &mut WireReader<R>,
        layout: &KindLayout,
        spec: &FieldSpec,
        count: Option<usize>,
    ) -> Result<Value> {
        let n = count.unwrap_or(0);
        let value = match spec.ty {
            FieldType::Scalar(scalar) => {
                let v = decode_scalar(r, scalar)?;
                if let Some(Legacy::DoubleWrittenBefore(fixed)) = spec.legacy {
                    if self.version < fixed {
                        let dup = r.i32()?;
                        trace!("{}.{}: dropped duplicate {dup}", layout.name(), spec.name);
                    }
                }
                v
            }
            FieldType::Array(scalar, _) => {
                let n = match spec.legacy {
                    Some(Legacy::SingleElementBefore(fixed)) if self.version < fixed => n.min(1),
                    _ => n,
                };
                decode_array(r, scalar, n)?
            }
            FieldType::OptIntArray(_) => {
                if r.presence()? {
                    Value::OptIntArray(Some(read_ints(r, n)?))
                } else {
                    Value::OptIntArray(None)
                }
            }
            FieldType::IntMatrix(_, cols) => {
                let mut rows = prealloc(n);
                for _ in 0..n {
                    rows.push(read_ints(r, cols)?);
                }
                Value::IntMatrix(rows)
            }
            FieldType::Status => {
                if r.presence()? {
                    Value::Status(Some(r.status()?))
                } else {
                    Value::Status(None)
                }
            }
            FieldType::StatusArray(_) => {
                if r.presence()? {
                    let mut statuses = prealloc(n);
                    for _ in 0..n {
                        statuses.push(r.status()?);
                    }
                    Value::StatusArray(Some(statuses))
                } else {
                    Value::StatusArray(None)
                }
            }
            FieldType::Str => Value::Str(r.string()?),
            FieldType::StrArray(Len::Prefixed) => Value::StrArray(read_prefixed_strings(r)?),
            FieldType::StrArray(Len::Field(_)) => {
                let mut strings = prealloc(n);
                for _ in 0..n {
                    strings.push(r.string()?);
                }
                Value::StrArray(strings)
            }
            FieldType::StrTable(_) => {
                let mut rows = prealloc(n);
                for _ in 0..n {
                    rows.push(read_prefixed_strings(r)?);
                }
                Value::StrTable(rows)
            }
        };
        Ok(value)
    }
}

fn encode_clock<W: Write>(w: &mut WireWriter<W>, ts: Timestamp, bias: i64) -> Result<()> {
    let seconds = ts
        .seconds
        .checked_sub(bias)
        .and_then(|s| i32::try_from(s).ok())
        .ok_or_else(|| {
            TraceError::range(format!(
                "timestamp {} does not fit the wire width (bias {bias})",
                ts.seconds
            ))
        })?;
    w.i32(seconds)?;
    w.u32(ts.nanos)
}

fn decode_clock<R: Read>(r: &mut WireReader<R>, bias: i64) -> Result<Timestamp> {
    let seconds = r.i32()? as i64 + bias;
    let nanos = r.u32()?;
    Ok(Timestamp::new(seconds, nanos))
}

fn decode_scalar<R: Read>(r: &mut WireReader<R>, scalar: Scalar) -> Result<Value> {
    Ok(match scalar {
        Scalar::Int => Value::Int(r.i32()?),
        Scalar::Aint | Scalar::Offset => Value::Long(r.i64()?),
        Scalar::Handle(kind) => Value::Handle(Handle::new(kind, r.i32()?)),
    })
}

fn decode_array<R: Read>(r: &mut WireReader<R>, scalar: Scalar, n: usize) -> Result<Value> {
    Ok(match scalar {
        Scalar::Int => Value::IntArray(read_ints(r, n)?),
        Scalar::Aint | Scalar::Offset => {
            let mut values = prealloc(n);
            for _ in 0..n {
                values.push(r.i64()?);
            }
            Value::LongArray(values)
        }
        Scalar::Handle(kind) => Value::HandleArray(kind, read_ints(r, n)?),
    })
}

fn read_ints<R: Read>(r: &mut WireReader<R>, n: usize) -> Result<Vec<i32>> {
    let mut values = prealloc(n);
    for _ in 0..n {
        values.push(r.i32()?);
    }
    Ok(values)
}

fn read_prefixed_strings<R: Read>(r: &mut WireReader<R>) -> Result<Vec<String>> {
    let n = r.count("string array")?;
    let mut strings = prealloc(n);
    for _ in 0..n {
        strings.push(r.string()?);
    }
    Ok(strings)
}

fn check_len(layout: &KindLayout, spec: &FieldSpec, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(TraceError::desync(format!(
            "{}.{}: {actual} elements but length source says {expected}",
            layout.name(),
            spec.name
        )));
    }
    Ok(())
}

fn mismatch(layout: &KindLayout, spec: &FieldSpec, value: &Value) -> TraceError {
    TraceError::desync(format!(
        "{}.{}: value {value:?} does not fit field type {:?}",
        layout.name(),
        spec.name,
        spec.ty
    ))
}

fn encode_field<W: Write>(
    w: &mut WireWriter<W>,
    layout: &KindLayout,
    spec: &FieldSpec,
    value: &Value,
    count: Option<usize>,
) -> Result<()> {
    let n = count.unwrap_or(0);
    match (spec.ty, value) {
        (FieldType::Scalar(Scalar::Int), Value::Int(v)) => w.i32(*v),
        (FieldType::Scalar(Scalar::Aint | Scalar::Offset), Value::Long(v)) => w.i64(*v),
        (FieldType::Scalar(Scalar::Handle(kind)), Value::Handle(h)) if h.kind == kind => w.i32(h.id),

        (FieldType::Array(Scalar::Int, _), Value::IntArray(values)) => {
            check_len(layout, spec, n, values.len())?;
            values.iter().try_for_each(|v| w.i32(*v))
        }
        (FieldType::Array(Scalar::Aint | Scalar::Offset, _), Value::LongArray(values)) => {
            check_len(layout, spec, n, values.len())?;
            values.iter().try_for_each(|v| w.i64(*v))
        }
        (FieldType::Array(Scalar::Handle(kind), _), Value::HandleArray(hk, ids)) if *hk == kind => {
            check_len(layout, spec, n, ids.len())?;
            ids.iter().try_for_each(|v| w.i32(*v))
        }

        (FieldType::OptIntArray(_), Value::OptIntArray(opt)) => {
            w.presence(opt.is_some())?;
            match opt {
                Some(values) => {
                    check_len(layout, spec, n, values.len())?;
                    values.iter().try_for_each(|v| w.i32(*v))
                }
                None => Ok(()),
            }
        }
        (FieldType::IntMatrix(_, cols), Value::IntMatrix(rows)) => {
            check_len(layout, spec, n, rows.len())?;
            for row in rows {
                if row.len() != cols {
                    return Err(TraceError::desync(format!(
                        "{}.{}: row of {} columns, expected {cols}",
                        layout.name(),
                        spec.name,
                        row.len()
                    )));
                }
                row.iter().try_for_each(|v| w.i32(*v))?;
            }
            Ok(())
        }
        (FieldType::Status, Value::Status(opt)) => {
            w.presence(opt.is_some())?;
            match opt {
                Some(st) => w.status(st),
                None => Ok(()),
            }
        }
        (FieldType::StatusArray(_), Value::StatusArray(opt)) => {
            w.presence(opt.is_some())?;
            match opt {
                Some(statuses) => {
                    check_len(layout, spec, n, statuses.len())?;
                    statuses.iter().try_for_each(|st: &Status| w.status(st))
                }
                None => Ok(()),
            }
        }
        (FieldType::Str, Value::Str(s)) => w.string(s),
        (FieldType::StrArray(Len::Prefixed), Value::StrArray(strings)) => {
            write_prefixed_strings(w, strings)
        }
        (FieldType::StrArray(Len::Field(_)), Value::StrArray(strings)) => {
            check_len(layout, spec, n, strings.len())?;
            strings.iter().try_for_each(|s| w.string(s))
        }
        (FieldType::StrTable(_), Value::StrTable(rows)) => {
            check_len(layout, spec, n, rows.len())?;
            rows.iter().try_for_each(|row| write_prefixed_strings(w, row))
        }
        _ => Err(mismatch(layout, spec, value)),
    }
}

fn write_prefixed_strings<W: Write>(w: &mut WireWriter<W>, strings: &[String]) -> Result<()> {
    w.count(strings.len())?;
    strings.iter().try_for_each(|s| w.string(s))
}
