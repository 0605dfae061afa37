//! Line-shape recognizers for the ASCII rendering.
//!
//! All regexes are compiled once per [`LinePatterns`] and owned by it.

use std::str::FromStr;

use regex::{Captures, Regex};

use crate::error::{Result, TraceError};
use crate::trace::{Status, Timestamp};

/// Header keys, in the order the renderer prints them.
pub const HEADER_KEYS: &[&str] = &[
    "version",
    "starttime",
    "hostname",
    "username",
    "meshdim",
    "meshsize",
    "meshcrd",
];

/// An entering or returning banner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Banner<'a> {
    pub name: &'a str,
    pub wall: Timestamp,
    pub cpu: Timestamp,
    pub thread: u32,
}

/// What a top-level line introduces.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LineShape<'a> {
    Header { key: &'a str, value: &'a str },
    Entering(Banner<'a>),
    KeyvalCount(usize),
    CallCount { name: &'a str, calls: u32, ignored: u32 },
    PerfCount(usize),
    Label { address: u64, label: &'a str },
    DatatypeSize { index: i64, size: i32 },
}

/// `<type> <name>[d0][d1]=<value>` split into its parts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldLine<'a> {
    pub ty: &'a str,
    pub name: &'a str,
    pub dims: Vec<i64>,
    pub value: &'a str,
}

pub struct LinePatterns {
    header: Regex,
    entering: Regex,
    returning: Regex,
    keyval_count: Regex,
    call_count: Regex,
    perf_count: Regex,
    label: Regex,
    datatype_size: Regex,
    field: Regex,
    dim: Regex,
    status: Regex,
    perfcounters: Regex,
}

fn banner_regex(verb: &str) -> std::result::Result<Regex, regex::Error> {
    Regex::new(&format!(
        r"^(\w+) {verb} at walltime (-?\d+)\.(\d+), cputime (-?\d+)\.(\d+) seconds in thread (\d+)\.$"
    ))
}

impl LinePatterns {
    pub fn new() -> Result<Self> {
        let build = || -> std::result::Result<Self, regex::Error> {
            Ok(Self {
                header: Regex::new(&format!(r"^({})=(.*)$", HEADER_KEYS.join("|")))?,
                entering: banner_regex("entering")?,
                returning: banner_regex("returning")?,
                keyval_count: Regex::new(r"^Keyval pairs: (\d+)$")?,
                call_count: Regex::new(r"^(\w+) called (\d+) times and ignored (\d+) times$")?,
                perf_count: Regex::new(r"^Performance counters: (\d+)$")?,
                label: Regex::new(r#"^Address 0x([0-9a-fA-F]+) has label "(.*)"$"#)?,
                datatype_size: Regex::new(r"^Datatype (-?\d+) has size (-?\d+)$")?,
                field: Regex::new(r"^(\S+) (\w+)((?:\[-?\d+\])*)=(.*)$")?,
                dim: Regex::new(r"\[(-?\d+)\]")?,
                status: Regex::new(
                    r"^\{bytes=(-?\d+), cancelled=(-?\d+), source=(-?\d+), tag=(-?\d+), error=(-?\d+)\}$",
                )?,
                perfcounters: Regex::new(r"^Perfcounters: \[.*\]$")?,
            })
        };
        build().map_err(|e| TraceError::grammar(0, format!("bad line pattern: {e}")))
    }

    /// Classify a top-level line. The first matching shape wins; `None` means no shape
    /// matched.
    pub fn classify<'t>(&self, line_no: usize, line: &'t str) -> Result<Option<LineShape<'t>>> {
        if let Some(c) = self.header.captures(line) {
            return Ok(Some(LineShape::Header {
                key: group(&c, 1),
                value: group(&c, 2),
            }));
        }
        if let Some(banner) = self.banner(&self.entering, line_no, line)? {
            return Ok(Some(LineShape::Entering(banner)));
        }
        if let Some(c) = self.keyval_count.captures(line) {
            return Ok(Some(LineShape::KeyvalCount(number(line_no, group(&c, 1))?)));
        }
        if let Some(c) = self.call_count.captures(line) {
            return Ok(Some(LineShape::CallCount {
                name: group(&c, 1),
                calls: number(line_no, group(&c, 2))?,
                ignored: number(line_no, group(&c, 3))?,
            }));
        }
        if let Some(c) = self.perf_count.captures(line) {
            return Ok(Some(LineShape::PerfCount(number(line_no, group(&c, 1))?)));
        }
        if let Some(c) = self.label.captures(line) {
            let address = u64::from_str_radix(group(&c, 1), 16).map_err(|e| {
                TraceError::range(format!("line {line_no}: label address: {e}"))
            })?;
            return Ok(Some(LineShape::Label {
                address,
                label: group(&c, 2),
            }));
        }
        if let Some(c) = self.datatype_size.captures(line) {
            return Ok(Some(LineShape::DatatypeSize {
                index: number(line_no, group(&c, 1))?,
                size: number(line_no, group(&c, 2))?,
            }));
        }
        Ok(None)
    }

    pub fn returning<'t>(&self, line_no: usize, line: &'t str) -> Result<Option<Banner<'t>>> {
        self.banner(&self.returning, line_no, line)
    }

    pub fn field<'t>(&self, line_no: usize, line: &'t str) -> Result<Option<FieldLine<'t>>> {
        let Some(c) = self.field.captures(line) else {
            return Ok(None);
        };
        let dims = self
            .dim
            .captures_iter(group(&c, 3))
            .map(|d| number(line_no, group(&d, 1)))
            .collect::<Result<Vec<i64>>>()?;
        Ok(Some(FieldLine {
            ty: group(&c, 1),
            name: group(&c, 2),
            dims,
            value: group(&c, 4),
        }))
    }

    /// Parse a `{bytes=N, ...}` status literal.
    pub fn status(&self, line_no: usize, text: &str) -> Result<Status> {
        let c = self.status.captures(text.trim()).ok_or_else(|| {
            TraceError::grammar(line_no, format!("bad status literal {text:?}"))
        })?;
        Ok(Status {
            bytes: number(line_no, group(&c, 1))?,
            cancelled: number(line_no, group(&c, 2))?,
            source: number(line_no, group(&c, 3))?,
            tag: number(line_no, group(&c, 4))?,
            error: number(line_no, group(&c, 5))?,
        })
    }

    pub fn is_perfcounters(&self, line: &str) -> bool {
        self.perfcounters.is_match(line)
    }

    fn banner<'t>(&self, re: &Regex, line_no: usize, line: &'t str) -> Result<Option<Banner<'t>>> {
        let Some(c) = re.captures(line) else {
            return Ok(None);
        };
        Ok(Some(Banner {
            name: group(&c, 1),
            wall: Timestamp::new(number(line_no, group(&c, 2))?, number(line_no, group(&c, 3))?),
            cpu: Timestamp::new(number(line_no, group(&c, 4))?, number(line_no, group(&c, 5))?),
            thread: number(line_no, group(&c, 6))?,
        }))
    }
}

fn group<'t>(c: &Captures<'t>, idx: usize) -> &'t str {
    c.get(idx).map_or("", |m| m.as_str())
}

/// Parse a decimal token that the pattern already vetted; overflow is a range violation.
pub(crate) fn number<T: FromStr>(line_no: usize, text: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    text.trim().parse().map_err(|e| {
        TraceError::range(format!("line {line_no}: {text:?}: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns() -> LinePatterns {
        LinePatterns::new().unwrap()
    }

    #[test]
    fn test_header_lines() {
        let p = patterns();
        assert_eq!(
            p.classify(1, "meshsize=[4, 4]").unwrap(),
            Some(LineShape::Header {
                key: "meshsize",
                value: "[4, 4]"
            })
        );
        assert_eq!(p.classify(1, "colour=blue").unwrap(), None);
    }

    #[test]
    fn test_banner_keeps_nanosecond_token() {
        let p = patterns();
        let line = "MPI_Send entering at walltime 1700000010.125, cputime 0.5000 seconds in thread 3.";
        let Some(LineShape::Entering(b)) = p.classify(1, line).unwrap() else {
            panic!("not a banner");
        };
        assert_eq!(b.name, "MPI_Send");
        assert_eq!(b.wall, Timestamp::new(1_700_000_010, 125));
        assert_eq!(b.cpu, Timestamp::new(0, 5000));
        assert_eq!(b.thread, 3);

        let exit = line.replace("entering", "returning");
        assert!(p.classify(1, &exit).unwrap().is_none());
        assert_eq!(p.returning(1, &exit).unwrap().unwrap().name, "MPI_Send");
    }

    #[test]
    fn test_trailer_lines() {
        let p = patterns();
        assert_eq!(
            p.classify(1, "MPI_Barrier called 12 times and ignored 0 times").unwrap(),
            Some(LineShape::CallCount {
                name: "MPI_Barrier",
                calls: 12,
                ignored: 0
            })
        );
        assert_eq!(
            p.classify(1, "Keyval pairs: 2").unwrap(),
            Some(LineShape::KeyvalCount(2))
        );
        assert_eq!(
            p.classify(1, "Performance counters: 1").unwrap(),
            Some(LineShape::PerfCount(1))
        );
        assert_eq!(
            p.classify(1, r#"Address 0x7fff10 has label "halo buffer""#).unwrap(),
            Some(LineShape::Label {
                address: 0x7f_ff10,
                label: "halo buffer"
            })
        );
        assert_eq!(
            p.classify(1, "Datatype 5 has size 8").unwrap(),
            Some(LineShape::DatatypeSize { index: 5, size: 8 })
        );
    }

    #[test]
    fn test_call_count_overflow() {
        let p = patterns();
        assert!(matches!(
            p.classify(4, "MPI_Send called 99999999999 times and ignored 0 times"),
            Err(TraceError::RangeViolation(_))
        ));
    }

    #[test]
    fn test_field_line() {
        let p = patterns();
        let f = p.field(1, "int ranges[2][3]=[[0, 3, 1], [4, 7, 1]]").unwrap().unwrap();
        assert_eq!(f.ty, "int");
        assert_eq!(f.name, "ranges");
        assert_eq!(f.dims, vec![2, 3]);
        assert_eq!(f.value, "[[0, 3, 1], [4, 7, 1]]");

        let f = p.field(1, "MPI_Datatype datatype=9 (MPI_INT)").unwrap().unwrap();
        assert!(f.dims.is_empty());
        assert_eq!(f.value, "9 (MPI_INT)");

        let f = p.field(1, r#"char* filename="a=b""#).unwrap().unwrap();
        assert_eq!(f.ty, "char*");
        assert_eq!(f.value, r#""a=b""#);
    }

    #[test]
    fn test_status_literal() {
        let p = patterns();
        let st = p
            .status(1, "{bytes=8, cancelled=0, source=1, tag=-1, error=0}")
            .unwrap();
        assert_eq!(st.bytes, 8);
        assert_eq!(st.tag, -1);
        assert!(matches!(
            p.status(1, "{bytes=8}"),
            Err(TraceError::GrammarMismatch { line: 1, .. })
        ));
    }
}
