//! Common test utilities for mpitrace integration tests.
//!
//! [`RecordGen`] builds call records for any kind straight from the descriptor tables, using a
//! seeded RNG so failures reproduce.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;

use mpitrace::codec::{Header, TraceWriter, Trailer};
use mpitrace::registry::{CountSource, KindLayout, Registry};
use mpitrace::schema::{FieldType, Len, Presence, Scalar};
use mpitrace::trace::{
    CallRecord, ClockPair, Envelope, Handle, HandleKind, Status, Timestamp, Value,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const BASE_SECONDS: i64 = 1_700_000_000;

pub fn registry() -> Arc<Registry> {
    Arc::new(Registry::new().expect("registry builds"))
}

pub struct RecordGen {
    rng: StdRng,
    clock: i64,
}

impl RecordGen {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            clock: BASE_SECONDS,
        }
    }

    pub fn envelope(&mut self) -> Envelope {
        let start = self.clock;
        self.clock += self.rng.random_range(0..3);
        let cpu = self.rng.random_range(0..100);
        Envelope {
            thread: self.rng.random_range(0..4),
            wall: ClockPair {
                start: Timestamp::new(start, self.rng.random_range(0..1_000_000_000)),
                stop: Timestamp::new(self.clock, self.rng.random_range(0..1_000_000_000)),
            },
            cpu: ClockPair {
                start: Timestamp::new(cpu, self.rng.random_range(0..1_000_000_000)),
                stop: Timestamp::new(cpu + 1, self.rng.random_range(0..1_000_000_000)),
            },
            perf: Vec::new(),
        }
    }

    /// A record of `layout`'s kind with plausible values in every field.
    pub fn record(&mut self, layout: &KindLayout) -> CallRecord {
        let length_sources: HashSet<usize> = (0..layout.fields().len())
            .filter_map(|idx| match layout.count_source(idx) {
                Some(CountSource::Sibling(s)) => Some(s),
                _ => None,
            })
            .collect();

        let mut fields: Vec<Value> = Vec::with_capacity(layout.fields().len());
        for (idx, spec) in layout.fields().iter().enumerate() {
            if spec.presence == Presence::RootOnly
                && !layout.root_fields_present(&fields).expect("rank and root decoded")
            {
                fields.push(Value::Absent);
                continue;
            }
            let count = layout.sibling_count(idx, &fields).expect("valid length source");
            let value = match spec.ty {
                FieldType::Scalar(Scalar::Int) if length_sources.contains(&idx) => {
                    Value::Int(self.rng.random_range(0..4))
                }
                FieldType::Scalar(Scalar::Int) if matches!(spec.name, "commrank" | "root") => {
                    Value::Int(self.rng.random_range(0..2))
                }
                FieldType::Scalar(scalar) => self.scalar(scalar),
                FieldType::Array(scalar, _) => self.array(scalar, count.unwrap_or(0)),
                FieldType::OptIntArray(_) => Value::OptIntArray(
                    self.maybe(|g| g.ints(count.unwrap_or(0))),
                ),
                FieldType::IntMatrix(_, cols) => Value::IntMatrix(
                    (0..count.unwrap_or(0)).map(|_| self.ints(cols)).collect(),
                ),
                FieldType::Status => Value::Status(self.maybe(|g| g.status())),
                FieldType::StatusArray(_) => Value::StatusArray(
                    self.maybe(|g| (0..count.unwrap_or(0)).map(|_| g.status()).collect()),
                ),
                FieldType::Str => Value::Str(self.word()),
                FieldType::StrArray(Len::Prefixed) => {
                    let n = self.rng.random_range(0..4);
                    Value::StrArray(self.words(n))
                }
                FieldType::StrArray(Len::Field(_)) => Value::StrArray(self.words(count.unwrap_or(0))),
                FieldType::StrTable(_) => {
                    let rows = (0..count.unwrap_or(0))
                        .map(|_| {
                            let n = self.rng.random_range(0..3);
                            self.words(n)
                        })
                        .collect();
                    Value::StrTable(rows)
                }
            };
            fields.push(value);
        }
        let envelope = self.envelope();
        CallRecord::new(layout.kind, envelope, fields)
    }

    fn scalar(&mut self, scalar: Scalar) -> Value {
        match scalar {
            Scalar::Int => Value::Int(self.rng.random_range(-5..100_000)),
            Scalar::Aint | Scalar::Offset => Value::Long(self.rng.random_range(-1..1 << 40)),
            Scalar::Handle(kind) => Value::Handle(Handle::new(kind, self.handle_id(kind))),
        }
    }

    fn array(&mut self, scalar: Scalar, n: usize) -> Value {
        match scalar {
            Scalar::Int => Value::IntArray(self.ints(n)),
            Scalar::Aint | Scalar::Offset => Value::LongArray(
                (0..n).map(|_| self.rng.random_range(0..1 << 40)).collect(),
            ),
            Scalar::Handle(kind) => {
                Value::HandleArray(kind, (0..n).map(|_| self.handle_id(kind)).collect())
            }
        }
    }

    /// Mostly small ids so predefined names show up, some user-created ones.
    fn handle_id(&mut self, kind: HandleKind) -> i32 {
        if self.rng.random_bool(0.7) {
            self.rng.random_range(0..30)
        } else if kind == HandleKind::Request {
            -1
        } else {
            self.rng.random_range(100..5000)
        }
    }

    fn ints(&mut self, n: usize) -> Vec<i32> {
        (0..n).map(|_| self.rng.random_range(-10..1000)).collect()
    }

    fn status(&mut self) -> Status {
        Status {
            bytes: self.rng.random_range(0..4096),
            cancelled: self.rng.random_range(0..2),
            source: self.rng.random_range(-2..64),
            tag: self.rng.random_range(-1..100),
            error: 0,
        }
    }

    fn word(&mut self) -> String {
        const WORDS: &[&str] = &["", "a.out", "input data", "/tmp/x-1", "native", "Z9"];
        WORDS[self.rng.random_range(0..WORDS.len())].to_string()
    }

    fn words(&mut self, n: usize) -> Vec<String> {
        (0..n).map(|_| self.word()).collect()
    }

    fn maybe<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> Option<T> {
        if self.rng.random_bool(0.25) {
            None
        } else {
            Some(f(self))
        }
    }
}

/// `per_kind` generated records for every kind, in kind order.
pub fn records_for_all_kinds(registry: &Registry, seed: u64, per_kind: usize) -> Vec<CallRecord> {
    let mut gen = RecordGen::new(seed);
    registry
        .kinds()
        .flat_map(|layout| (0..per_kind).map(|_| gen.record(layout)).collect::<Vec<_>>())
        .collect()
}

/// A header whose start time is the wall-clock bias of `records`.
pub fn header_for(records: &[CallRecord]) -> Header {
    Header {
        start_time: records
            .first()
            .map_or(0, |r| r.envelope.wall.start.seconds),
        hostname: "node017".into(),
        username: "mpiuser".into(),
        meshdim: 3,
        meshsize: vec![2, 2, 4],
        meshcrd: vec![1, 0, 3],
        ..Header::default()
    }
}

/// Write `records` and `trailer` tables to an in-memory binary trace.
pub fn write_trace(
    registry: &Arc<Registry>,
    header: Header,
    records: &[CallRecord],
    trailer: Trailer,
) -> Vec<u8> {
    let mut writer = TraceWriter::create(Vec::new(), registry.clone(), header).expect("header");
    for record in records {
        writer.write_record(record).expect("record encodes");
    }
    *writer.keyvals_mut() = trailer.keyvals;
    *writer.perf_labels_mut() = trailer.perf_labels;
    *writer.datatype_sizes_mut() = trailer.datatype_sizes;
    *writer.labels_mut() = trailer.labels;
    writer.finish().expect("trailer")
}

/// Small but non-empty trailer tables.
pub fn sample_trailer(registry: &Registry) -> Trailer {
    let mut trailer = Trailer::new(registry.len());
    trailer.keyvals.push("MPICH_VERSION", "3.4.1");
    trailer.keyvals.push("run", "strong scaling, 64 ranks");
    trailer.perf_labels.push("PAPI_TOT_CYC").expect("label");
    trailer.datatype_sizes.set(9, 4).expect("size");
    trailer.datatype_sizes.set(14, 8).expect("size");
    trailer.labels.push(0x7ffd_1000, "send buffer");
    trailer
}
