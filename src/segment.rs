//! Splitting label sequences on boundary symbols such as `pau` / `sil`.
use crate::unicode::is_any_whitespace;
use smallvec::SmallVec;

/// The boundary symbols of one session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delimiters {
    symbols: SmallVec<[String; 2]>,
}

impl Delimiters {
    pub fn new<I>(symbols: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let mut out = SmallVec::<[String; 2]>::new();
        for symbol in symbols {
            let symbol = symbol.into();
            if !symbol.is_empty() && !out.contains(&symbol) {
                out.push(symbol);
            }
        }
        Self { symbols: out }
    }

    #[inline]
    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.iter().any(|s| s == symbol)
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.symbols.iter().map(String::as_str)
    }
}

/// A maximal run of labels containing no delimiter.
#[derive(Debug, PartialEq, Eq)]
pub struct Segment<'a, S> {
    pub labels: &'a [S],
    /// Index of the first label in the full sequence.
    pub offset: usize,
}

// derive would require `S: Clone`
impl<S> Clone for Segment<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<S> Copy for Segment<'_, S> {}

impl<S: AsRef<str>> Segment<'_, S> {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// The labels written back to back.
    pub fn concat(&self) -> String {
        let mut out = String::with_capacity(self.labels.iter().map(|l| l.as_ref().len()).sum());
        for label in self.labels {
            out.push_str(label.as_ref());
        }
        out
    }
}

/// Groups `labels` into segments separated by delimiter labels. Delimiters
/// never appear in a segment and empty runs are dropped.
pub fn split_on_delimiters<'a, S: AsRef<str>>(
    labels: &'a [S],
    delimiters: &Delimiters,
) -> Vec<Segment<'a, S>> {
    let mut segments = Vec::new();
    let mut start = 0;
    for (i, label) in labels.iter().enumerate() {
        if delimiters.contains(label.as_ref()) {
            if i > start {
                segments.push(Segment {
                    labels: &labels[start..i],
                    offset: start,
                });
            }
            start = i + 1;
        }
    }
    if labels.len() > start {
        segments.push(Segment {
            labels: &labels[start..],
            offset: start,
        });
    }
    segments
}

/// Splits a whitespace-separated label string (`"k o N n i ch i w a"`).
pub fn split_labels(text: &str) -> Vec<&str> {
    text.split(is_any_whitespace)
        .filter(|l| !l.is_empty())
        .collect()
}

/// Drops one trailing stress digit (`AH0` → `AH`).
#[inline]
pub fn strip_stress(label: &str) -> &str {
    label
        .strip_suffix(['0', '1', '2'])
        .filter(|rest| !rest.is_empty())
        .unwrap_or(label)
}

/// Joins per-segment outputs with `separator`; a single result is returned
/// as is.
pub fn join<I>(results: I, separator: &str) -> String
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut out = String::new();
    for (i, result) in results.into_iter().enumerate() {
        if i > 0 {
            out.push_str(separator);
        }
        out.push_str(result.as_ref());
    }
    out
}
