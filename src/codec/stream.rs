//! Whole-stream writer and reader: header, framed records, trailer and index.

use std::io::{Read, Write};
use std::sync::Arc;

use tracing::{debug, info};

use super::record::RecordCodec;
use super::tables::{
    DatatypeSizes, Footer, Header, Keyvals, LabelTable, PerfLabels, TraceIndex, Trailer,
};
use super::wire::{WireReader, WireWriter};
use crate::error::{Result, TraceError};
use crate::registry::Registry;
use crate::trace::constants::{FOOTER_TAG, FORMAT_VERSION};
use crate::trace::CallRecord;

/// Writes one binary trace.
///
/// The header goes out on construction; records are appended one at a time and counted into
/// the footer; [`TraceWriter::finish`] writes the trailer and index.
pub struct TraceWriter<W: Write> {
    wire: WireWriter<W>,
    codec: RecordCodec,
    header: Header,
    trailer: Trailer,
    index: TraceIndex,
    records: u64,
}

impl<W: Write> TraceWriter<W> {
    /// Start a stream. The header's `start_time` becomes the wall-clock bias and its version
    /// is replaced by [`FORMAT_VERSION`].
    pub fn create(inner: W, registry: Arc<Registry>, mut header: Header) -> Result<Self> {
        header.version = FORMAT_VERSION;
        Self::create_versioned(inner, registry, header)
    }

    /// Start a stream stamped with the header's own version. Record encoding is unaffected;
    /// only readers see the declared version.
    pub fn create_versioned(inner: W, registry: Arc<Registry>, header: Header) -> Result<Self> {
        let mut wire = WireWriter::new(inner);
        let header_at = wire.position();
        header.write(&mut wire)?;
        let codec = RecordCodec::current(registry.clone(), header.start_time);
        debug!(
            "wrote header version {} start_time {}",
            header.version, header.start_time
        );
        Ok(Self {
            index: TraceIndex {
                header: header_at,
                body: wire.position(),
                ..TraceIndex::default()
            },
            wire,
            codec,
            trailer: Trailer::new(registry.len()),
            header,
            records: 0,
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn registry(&self) -> &Registry {
        self.codec.registry()
    }

    /// Number of records written so far.
    pub fn records(&self) -> u64 {
        self.records
    }

    pub fn write_record(&mut self, record: &CallRecord) -> Result<()> {
        self.codec.encode(&mut self.wire, record)?;
        self.trailer.footer.record(record.kind)?;
        self.records += 1;
        Ok(())
    }

    pub fn footer_mut(&mut self) -> &mut Footer {
        &mut self.trailer.footer
    }

    pub fn keyvals_mut(&mut self) -> &mut Keyvals {
        &mut self.trailer.keyvals
    }

    pub fn perf_labels_mut(&mut self) -> &mut PerfLabels {
        &mut self.trailer.perf_labels
    }

    pub fn datatype_sizes_mut(&mut self) -> &mut DatatypeSizes {
        &mut self.trailer.datatype_sizes
    }

    pub fn labels_mut(&mut self) -> &mut LabelTable {
        &mut self.trailer.labels
    }

    /// Write the trailer and index, flush, and hand back the sink.
    pub fn finish(mut self) -> Result<W> {
        let w = &mut self.wire;
        let trailer = &self.trailer;
        let index = &mut self.index;

        w.u16(FOOTER_TAG)?;
        index.footer = w.position();
        trailer.footer.write(w)?;
        index.keyvals = w.position();
        trailer.keyvals.write(w)?;
        index.perf_labels = w.position();
        trailer.perf_labels.write(w)?;
        index.datatype_sizes = w.position();
        trailer.datatype_sizes.write(w)?;
        let labels_at = w.position();
        trailer.labels.write(w)?;
        index.labels = if trailer.labels.is_empty() { 0 } else { labels_at };
        index.write(w)?;
        w.flush()?;

        info!(
            "finished trace: {} records, {} bytes",
            self.records,
            w.position()
        );
        Ok(self.wire.into_inner())
    }
}

/// Reads one binary trace front to back. No seeking is needed.
///
/// Iterating yields the records in stream order. Once the footer tag is reached the trailer
/// and index are read and checked, and iteration ends. The first error also ends iteration.
pub struct TraceReader<R: Read> {
    wire: WireReader<R>,
    codec: RecordCodec,
    header: Header,
    index: TraceIndex,
    trailer: Option<Trailer>,
    failed: bool,
}

impl<R: Read> TraceReader<R> {
    pub fn open(inner: R, registry: Arc<Registry>) -> Result<Self> {
        let mut wire = WireReader::new(inner);
        let header = Header::read(&mut wire)?;
        debug!(
            "trace version {} host {:?} start_time {}",
            header.version, header.hostname, header.start_time
        );
        let codec = RecordCodec::new(registry, header.version, header.start_time);
        Ok(Self {
            index: TraceIndex {
                header: 0,
                body: wire.position(),
                ..TraceIndex::default()
            },
            wire,
            codec,
            header,
            trailer: None,
            failed: false,
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn registry(&self) -> &Registry {
        self.codec.registry()
    }

    /// The trailer, once the record stream has been read to its end.
    pub fn trailer(&self) -> Option<&Trailer> {
        self.trailer.as_ref()
    }

    /// Next record, or `None` after the trailer has been read and verified.
    pub fn next_record(&mut self) -> Result<Option<CallRecord>> {
        if self.trailer.is_some() {
            return Ok(None);
        }
        let tag = self.wire.try_u16()?.ok_or_else(|| {
            TraceError::desync("stream ends before the footer")
        })?;
        if tag == FOOTER_TAG {
            self.read_trailer()?;
            return Ok(None);
        }
        self.codec.decode_tagged(&mut self.wire, tag).map(Some)
    }

    /// Skip any remaining records and return the trailer.
    pub fn finish(mut self) -> Result<Trailer> {
        while self.next_record()?.is_some() {}
        self.trailer
            .ok_or_else(|| TraceError::desync("trailer missing after record stream"))
    }

    fn read_trailer(&mut self) -> Result<()> {
        let r = &mut self.wire;
        let observed = &mut self.index;
        let kinds = self.codec.registry().len();

        observed.footer = r.position();
        let footer = Footer::read(r, kinds)?;
        observed.keyvals = r.position();
        let keyvals = Keyvals::read(r)?;
        observed.perf_labels = r.position();
        let perf_labels = PerfLabels::read(r)?;
        observed.datatype_sizes = r.position();
        let datatype_sizes = DatatypeSizes::read(r)?;
        let labels_at = r.position();
        let labels = LabelTable::read(r)?;
        observed.labels = if labels.is_empty() { 0 } else { labels_at };

        TraceIndex::read(r)?.verify(observed)?;
        self.trailer = Some(Trailer {
            footer,
            keyvals,
            perf_labels,
            datatype_sizes,
            labels,
        });
        Ok(())
    }
}

impl<R: Read> Iterator for TraceReader<R> {
    type Item = Result<CallRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => None,
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
