//! The once-per-trace tables: header, footer, keyvals, performance-counter labels, datatype
//! sizes, address labels and the trailing index.

use std::io::{Read, Write};

use serde::Serialize;

use super::wire::{prealloc, WireReader, WireWriter};
use crate::error::{Result, TraceError};
use crate::trace::constants::{
    INDEX_ENTRIES, MAGIC, MAX_DATATYPE_INDEX, MAX_PERF_COUNTERS, MAX_TABLE_LEN,
};
use crate::trace::{Kind, Version};

/// Stream header. `start_time` doubles as the bias subtracted from every wall-clock second.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Header {
    pub version: Version,
    pub start_time: i64,
    pub hostname: String,
    pub username: String,
    pub meshdim: i32,
    pub meshsize: Vec<i32>,
    pub meshcrd: Vec<i32>,
}

impl Header {
    pub fn write<W: Write>(&self, w: &mut WireWriter<W>) -> Result<()> {
        if self.meshdim < 0 {
            return Err(TraceError::range(format!("negative meshdim {}", self.meshdim)));
        }
        let dims = self.meshdim as usize;
        let shaped = if dims == 0 {
            self.meshsize.is_empty() && self.meshcrd.is_empty()
        } else {
            self.meshsize.len() == dims && self.meshcrd.len() == dims
        };
        if !shaped {
            return Err(TraceError::desync(format!(
                "meshdim {} but meshsize has {} and meshcrd {} entries",
                self.meshdim,
                self.meshsize.len(),
                self.meshcrd.len()
            )));
        }

        w.bytes(&MAGIC)?;
        w.u8(self.version.major)?;
        w.u8(self.version.minor)?;
        w.u8(self.version.patch)?;
        w.i64(self.start_time)?;
        w.string(&self.hostname)?;
        w.string(&self.username)?;
        w.i32(self.meshdim)?;
        for v in self.meshsize.iter().chain(&self.meshcrd) {
            w.i32(*v)?;
        }
        Ok(())
    }

    pub fn read<R: Read>(r: &mut WireReader<R>) -> Result<Self> {
        let magic = r.bytes(MAGIC.len()).map_err(|e| {
            TraceError::VersionAmbiguity(format!("cannot read stream magic: {e}"))
        })?;
        if magic != MAGIC {
            return Err(TraceError::VersionAmbiguity(format!(
                "bad stream magic {magic:02x?}"
            )));
        }
        let version = Version::new(r.u8()?, r.u8()?, r.u8()?);
        let start_time = r.i64()?;
        let hostname = r.string()?;
        let username = r.string()?;
        let meshdim = r.i32()?;
        if meshdim < 0 || meshdim as usize > MAX_TABLE_LEN {
            return Err(TraceError::range(format!("meshdim {meshdim} out of range")));
        }
        let dims = meshdim as usize;
        let mut mesh = prealloc(dims * 2);
        for _ in 0..dims * 2 {
            mesh.push(r.i32()?);
        }
        let meshcrd = mesh.split_off(dims);
        Ok(Self {
            version,
            start_time,
            hostname,
            username,
            meshdim,
            meshsize: mesh,
            meshcrd,
        })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CallCount {
    pub calls: u32,
    pub ignored: u32,
}

/// Per-kind call and ignored counts, indexed by kind.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Footer {
    counts: Vec<CallCount>,
}

impl Footer {
    pub fn new(kinds: usize) -> Self {
        Self {
            counts: vec![CallCount::default(); kinds],
        }
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Count one written call.
    pub fn record(&mut self, kind: Kind) -> Result<()> {
        let entry = self.entry(kind)?;
        entry.calls = entry.calls.saturating_add(1);
        Ok(())
    }

    /// Replace a kind's counts, as a call-count summary line does.
    pub fn set(&mut self, kind: Kind, calls: u32, ignored: u32) -> Result<()> {
        *self.entry(kind)? = CallCount { calls, ignored };
        Ok(())
    }

    pub fn get(&self, kind: Kind) -> Option<CallCount> {
        self.counts.get(kind.index()).copied()
    }

    /// Kinds with a non-zero call or ignored count, in kind order.
    pub fn nonzero(&self) -> impl Iterator<Item = (Kind, CallCount)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, c)| c.calls != 0 || c.ignored != 0)
            .map(|(idx, c)| (Kind(idx as u16), *c))
    }

    fn entry(&mut self, kind: Kind) -> Result<&mut CallCount> {
        let len = self.counts.len();
        self.counts.get_mut(kind.index()).ok_or_else(|| {
            TraceError::UnknownKind(format!("footer index {} of {len}", kind.index()))
        })
    }

    pub fn write<W: Write>(&self, w: &mut WireWriter<W>) -> Result<()> {
        w.count(self.counts.len())?;
        for c in &self.counts {
            w.u32(c.calls)?;
            w.u32(c.ignored)?;
        }
        Ok(())
    }

    /// Read a footer that must hold exactly `kinds` entries.
    pub fn read<R: Read>(r: &mut WireReader<R>, kinds: usize) -> Result<Self> {
        let n = r.count("footer")?;
        if n != kinds {
            return Err(TraceError::desync(format!(
                "footer has {n} entries, registry has {kinds} kinds"
            )));
        }
        let mut counts = prealloc(n);
        for _ in 0..n {
            counts.push(CallCount {
                calls: r.u32()?,
                ignored: r.u32()?,
            });
        }
        Ok(Self { counts })
    }
}

/// Ordered key/value string pairs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Keyvals {
    pairs: Vec<(String, String)>,
}

impl Keyvals {
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn write<W: Write>(&self, w: &mut WireWriter<W>) -> Result<()> {
        w.count(self.pairs.len())?;
        for (k, v) in &self.pairs {
            w.string(k)?;
            w.string(v)?;
        }
        Ok(())
    }

    pub fn read<R: Read>(r: &mut WireReader<R>) -> Result<Self> {
        let n = r.count("keyvals")?;
        let mut pairs = prealloc(n);
        for _ in 0..n {
            pairs.push((r.string()?, r.string()?));
        }
        Ok(Self { pairs })
    }
}

/// Names of the performance counters sampled during the run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PerfLabels {
    names: Vec<String>,
}

impl PerfLabels {
    pub fn push(&mut self, name: impl Into<String>) -> Result<()> {
        if self.names.len() >= MAX_PERF_COUNTERS {
            return Err(TraceError::range(format!(
                "more than {MAX_PERF_COUNTERS} performance counters"
            )));
        }
        self.names.push(name.into());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn write<W: Write>(&self, w: &mut WireWriter<W>) -> Result<()> {
        w.count(self.names.len())?;
        self.names.iter().try_for_each(|n| w.string(n))
    }

    pub fn read<R: Read>(r: &mut WireReader<R>) -> Result<Self> {
        let n = r.count("performance counter labels")?;
        if n > MAX_PERF_COUNTERS {
            return Err(TraceError::range(format!(
                "{n} performance counter labels, at most {MAX_PERF_COUNTERS}"
            )));
        }
        let mut names = prealloc(n);
        for _ in 0..n {
            names.push(r.string()?);
        }
        Ok(Self { names })
    }
}

/// Datatype sizes indexed by datatype id. Grows on demand; unset entries are zero.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DatatypeSizes {
    sizes: Vec<i32>,
}

impl DatatypeSizes {
    pub fn set(&mut self, index: i64, size: i32) -> Result<()> {
        if !(0..=MAX_DATATYPE_INDEX as i64).contains(&index) {
            return Err(TraceError::range(format!(
                "datatype index {index} outside [0, {MAX_DATATYPE_INDEX}]"
            )));
        }
        let index = index as usize;
        if index >= self.sizes.len() {
            self.sizes.resize(index + 1, 0);
        }
        self.sizes[index] = size;
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<i32> {
        self.sizes.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    pub fn as_slice(&self) -> &[i32] {
        &self.sizes
    }

    pub fn write<W: Write>(&self, w: &mut WireWriter<W>) -> Result<()> {
        w.count(self.sizes.len())?;
        self.sizes.iter().try_for_each(|s| w.i32(*s))
    }

    pub fn read<R: Read>(r: &mut WireReader<R>) -> Result<Self> {
        let n = r.count("datatype sizes")?;
        if n > MAX_DATATYPE_INDEX + 1 {
            return Err(TraceError::range(format!(
                "{n} datatype sizes, indices stop at {MAX_DATATYPE_INDEX}"
            )));
        }
        let mut sizes = prealloc(n);
        for _ in 0..n {
            sizes.push(r.i32()?);
        }
        Ok(Self { sizes })
    }
}

/// Address to label pairs, kept as parallel arrays in insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LabelTable {
    addresses: Vec<u64>,
    labels: Vec<String>,
}

impl LabelTable {
    pub fn push(&mut self, address: u64, label: impl Into<String>) {
        self.addresses.push(address);
        self.labels.push(label.into());
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, &str)> {
        self.addresses
            .iter()
            .copied()
            .zip(self.labels.iter().map(String::as_str))
    }

    /// Writes the presence flag and, when there are labels, the table.
    pub fn write<W: Write>(&self, w: &mut WireWriter<W>) -> Result<()> {
        w.presence(!self.is_empty())?;
        if self.is_empty() {
            return Ok(());
        }
        w.count(self.len())?;
        for (address, label) in self.iter() {
            w.u64(address)?;
            w.string(label)?;
        }
        Ok(())
    }

    pub fn read<R: Read>(r: &mut WireReader<R>) -> Result<Self> {
        let mut table = Self::default();
        if !r.presence()? {
            return Ok(table);
        }
        let n = r.count("labels")?;
        for _ in 0..n {
            let address = r.u64()?;
            table.push(address, r.string()?);
        }
        Ok(table)
    }
}

/// Byte offsets of each stream section. `labels` is 0 when the label table is absent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TraceIndex {
    pub header: u64,
    pub body: u64,
    pub footer: u64,
    pub keyvals: u64,
    pub perf_labels: u64,
    pub datatype_sizes: u64,
    pub labels: u64,
}

impl TraceIndex {
    fn entries(&self) -> [u64; INDEX_ENTRIES] {
        [
            self.header,
            self.body,
            self.footer,
            self.keyvals,
            self.perf_labels,
            self.datatype_sizes,
            self.labels,
        ]
    }

    pub fn write<W: Write>(&self, w: &mut WireWriter<W>) -> Result<()> {
        self.entries().iter().try_for_each(|v| w.u64(*v))?;
        w.bytes(&MAGIC)
    }

    pub fn read<R: Read>(r: &mut WireReader<R>) -> Result<Self> {
        let mut e = [0u64; INDEX_ENTRIES];
        for slot in e.iter_mut() {
            *slot = r.u64()?;
        }
        if r.bytes(MAGIC.len())? != MAGIC {
            return Err(TraceError::desync("index is not followed by the stream magic"));
        }
        Ok(Self {
            header: e[0],
            body: e[1],
            footer: e[2],
            keyvals: e[3],
            perf_labels: e[4],
            datatype_sizes: e[5],
            labels: e[6],
        })
    }

    /// Compare a stored index against the offsets observed while reading.
    pub fn verify(&self, observed: &TraceIndex) -> Result<()> {
        if self != observed {
            return Err(TraceError::desync(format!(
                "stored index {:?} disagrees with observed offsets {:?}",
                self.entries(),
                observed.entries()
            )));
        }
        Ok(())
    }
}

/// Everything written after the last record.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Trailer {
    pub footer: Footer,
    pub keyvals: Keyvals,
    pub perf_labels: PerfLabels,
    pub datatype_sizes: DatatypeSizes,
    pub labels: LabelTable,
}

impl Trailer {
    pub fn new(kinds: usize) -> Self {
        Self {
            footer: Footer::new(kinds),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> Header {
        Header {
            version: Version::new(1, 2, 3),
            start_time: 1_700_000_000,
            hostname: "node01".into(),
            username: "alice".into(),
            meshdim: 2,
            meshsize: vec![4, 4],
            meshcrd: vec![1, 2],
        }
    }

    #[test]
    fn test_header_round_trip() {
        let mut w = WireWriter::new(Vec::new());
        header().write(&mut w).unwrap();
        let bytes = w.into_inner();
        assert_eq!(&bytes[..8], &MAGIC);
        assert_eq!(&bytes[8..11], &[1, 2, 3]);
        let decoded = Header::read(&mut WireReader::new(&bytes[..])).unwrap();
        assert_eq!(decoded, header());
    }

    #[test]
    fn test_header_without_mesh() {
        let h = Header {
            meshdim: 0,
            meshsize: Vec::new(),
            meshcrd: Vec::new(),
            ..header()
        };
        let mut w = WireWriter::new(Vec::new());
        h.write(&mut w).unwrap();
        let bytes = w.into_inner();
        assert_eq!(Header::read(&mut WireReader::new(&bytes[..])).unwrap(), h);
    }

    #[test]
    fn test_header_mesh_shape_checked() {
        let h = Header {
            meshsize: vec![4],
            ..header()
        };
        let mut w = WireWriter::new(Vec::new());
        assert!(matches!(h.write(&mut w), Err(TraceError::FormatDesync(_))));
    }

    #[test]
    fn test_header_huge_meshdim_rejected() {
        let h = Header {
            meshdim: 0,
            meshsize: Vec::new(),
            meshcrd: Vec::new(),
            ..header()
        };
        let mut w = WireWriter::new(Vec::new());
        h.write(&mut w).unwrap();
        let mut bytes = w.into_inner();
        let at = bytes.len() - 4;
        bytes[at..].copy_from_slice(&i32::MAX.to_be_bytes());
        assert!(matches!(
            Header::read(&mut WireReader::new(&bytes[..])),
            Err(TraceError::RangeViolation(_))
        ));
    }

    #[test]
    fn test_missing_magic_is_version_ambiguity() {
        let mut r = WireReader::new(&b"not a trace"[..]);
        assert!(matches!(
            Header::read(&mut r),
            Err(TraceError::VersionAmbiguity(_))
        ));
        let mut r = WireReader::new(&[0xFFu8, b'M'][..]);
        assert!(matches!(
            Header::read(&mut r),
            Err(TraceError::VersionAmbiguity(_))
        ));
    }

    #[test]
    fn test_datatype_sizes_grow_with_zero_fill() {
        let mut sizes = DatatypeSizes::default();
        sizes.set(5, 8).unwrap();
        sizes.set(2, 4).unwrap();
        assert_eq!(sizes.as_slice(), &[0, 0, 4, 0, 0, 8]);
        assert_eq!(sizes.len(), 6);
    }

    #[test]
    fn test_datatype_index_bounds() {
        let mut sizes = DatatypeSizes::default();
        assert!(matches!(sizes.set(-1, 4), Err(TraceError::RangeViolation(_))));
        assert!(matches!(
            sizes.set(MAX_DATATYPE_INDEX as i64 + 1, 4),
            Err(TraceError::RangeViolation(_))
        ));
        sizes.set(MAX_DATATYPE_INDEX as i64, 4).unwrap();
        assert_eq!(sizes.len(), MAX_DATATYPE_INDEX + 1);
    }

    #[test]
    fn test_footer_counts() {
        let mut footer = Footer::new(4);
        footer.record(Kind(1)).unwrap();
        footer.record(Kind(1)).unwrap();
        footer.set(Kind(3), 12, 1).unwrap();
        assert!(matches!(footer.record(Kind(4)), Err(TraceError::UnknownKind(_))));
        let nonzero: Vec<_> = footer.nonzero().collect();
        assert_eq!(
            nonzero,
            vec![
                (Kind(1), CallCount { calls: 2, ignored: 0 }),
                (Kind(3), CallCount { calls: 12, ignored: 1 }),
            ]
        );

        let mut w = WireWriter::new(Vec::new());
        footer.write(&mut w).unwrap();
        let bytes = w.into_inner();
        assert_eq!(Footer::read(&mut WireReader::new(&bytes[..]), 4).unwrap(), footer);
        assert!(matches!(
            Footer::read(&mut WireReader::new(&bytes[..]), 5),
            Err(TraceError::FormatDesync(_))
        ));
    }

    #[test]
    fn test_label_table_flag() {
        let mut w = WireWriter::new(Vec::new());
        LabelTable::default().write(&mut w).unwrap();
        assert_eq!(w.into_inner(), vec![0]);

        let mut labels = LabelTable::default();
        labels.push(0x7fff_0010, "buffer");
        let mut w = WireWriter::new(Vec::new());
        labels.write(&mut w).unwrap();
        let bytes = w.into_inner();
        assert_eq!(LabelTable::read(&mut WireReader::new(&bytes[..])).unwrap(), labels);
    }

    #[test]
    fn test_perf_label_capacity() {
        let mut labels = PerfLabels::default();
        for i in 0..MAX_PERF_COUNTERS {
            labels.push(format!("PAPI_{i}")).unwrap();
        }
        assert!(matches!(labels.push("one more"), Err(TraceError::RangeViolation(_))));
    }

    #[test]
    fn test_index_verify() {
        let index = TraceIndex {
            body: 40,
            footer: 100,
            ..TraceIndex::default()
        };
        let mut w = WireWriter::new(Vec::new());
        index.write(&mut w).unwrap();
        let bytes = w.into_inner();
        let read = TraceIndex::read(&mut WireReader::new(&bytes[..])).unwrap();
        read.verify(&index).unwrap();
        let other = TraceIndex { footer: 101, ..index };
        assert!(matches!(read.verify(&other), Err(TraceError::FormatDesync(_))));
    }
}
