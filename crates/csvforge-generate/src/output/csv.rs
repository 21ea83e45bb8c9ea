use std::io::Write;

use tracing::info;

use csvforge_core::ResolvedOrdering;

use crate::errors::GenerationError;
use crate::row::Row;

/// Writes the header and rows as delimited text, one `\n`-terminated line each.
///
/// Fields containing the delimiter, a quote or a line break are quoted.
#[derive(Debug, Clone, Copy)]
pub struct CsvSerializer {
    delimiter: u8,
}

impl CsvSerializer {
    pub fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }

    /// Column labels in resolved order, without the line terminator.
    pub fn header_line(&self, ordering: &ResolvedOrdering) -> Result<String, GenerationError> {
        self.line(ordering.labels())
    }

    /// Row values in resolved order, without the line terminator.
    ///
    /// A label missing from the row is written as an empty field.
    pub fn row_line(&self, row: &Row, ordering: &ResolvedOrdering) -> Result<String, GenerationError> {
        self.line(record(row, ordering))
    }

    /// Stream the header followed by `rows`, returning the bytes written.
    ///
    /// `total` is the expected row count, used for progress logging at every
    /// tenth of the run.
    pub fn write<W, I>(
        &self,
        rows: I,
        total: u64,
        ordering: &ResolvedOrdering,
        writer: W,
    ) -> Result<u64, GenerationError>
    where
        W: Write,
        I: IntoIterator<Item = Row>,
    {
        let mut writer = self.writer(CountingWriter::new(writer));
        writer.write_record(ordering.labels())?;

        let mut progress = Progress::new(total);
        for row in rows {
            writer.write_record(record(&row, ordering))?;
            progress.advance();
        }

        writer.flush()?;
        let counting = writer.into_inner().map_err(|err| err.into_error())?;
        Ok(counting.bytes_written())
    }

    fn writer<W: Write>(&self, inner: W) -> ::csv::Writer<W> {
        ::csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .quote_style(::csv::QuoteStyle::Necessary)
            .terminator(::csv::Terminator::Any(b'\n'))
            .from_writer(inner)
    }

    fn line<'r, I>(&self, fields: I) -> Result<String, GenerationError>
    where
        I: IntoIterator<Item = &'r str>,
    {
        let mut writer = self.writer(Vec::new());
        writer.write_record(fields)?;
        let bytes = writer.into_inner().map_err(|err| err.into_error())?;
        let mut line = String::from_utf8(bytes)
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))?;
        if line.ends_with('\n') {
            line.pop();
        }
        Ok(line)
    }
}

fn record<'r>(row: &'r Row, ordering: &ResolvedOrdering) -> Vec<&'r str> {
    ordering
        .iter()
        .map(|column| row.get(&column.label).unwrap_or_default())
        .collect()
}

/// Logs once per crossed tenth of the expected row count.
struct Progress {
    total: u64,
    written: u64,
    decile: u64,
}

impl Progress {
    fn new(total: u64) -> Self {
        Self {
            total,
            written: 0,
            decile: 0,
        }
    }

    fn advance(&mut self) {
        self.written += 1;
        if self.total == 0 {
            return;
        }
        let decile = self.written.saturating_mul(10) / self.total;
        if decile > self.decile {
            self.decile = decile;
            info!(
                rows_written = self.written,
                rows_total = self.total,
                percent = decile * 10,
                "generation progress"
            );
        }
    }
}

struct CountingWriter<W: Write> {
    inner: W,
    bytes: u64,
}

impl<W: Write> CountingWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner, bytes: 0 }
    }

    fn bytes_written(&self) -> u64 {
        self.bytes
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let size = self.inner.write(buf)?;
        self.bytes = self.bytes.saturating_add(size as u64);
        Ok(size)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use csvforge_core::{Column, Source, resolve_order};

    fn ordering(labels: &[&str]) -> ResolvedOrdering {
        let columns: Vec<Column> = labels
            .iter()
            .map(|label| Column::new(*label, Source::String))
            .collect();
        resolve_order(&columns).unwrap()
    }

    fn row(values: &[(&str, &str)]) -> Row {
        let mut row = Row::default();
        for (label, value) in values {
            row.insert(*label, *value);
        }
        row
    }

    #[test]
    fn header_follows_ordering() {
        let serializer = CsvSerializer::new(b',');
        let header = serializer.header_line(&ordering(&["C", "B", "A"])).unwrap();
        assert_eq!(header, "C,B,A");
    }

    #[test]
    fn row_uses_delimiter_and_order() {
        let serializer = CsvSerializer::new(b'|');
        let ordering = ordering(&["a", "b"]);
        let line = serializer
            .row_line(&row(&[("b", "2"), ("a", "1")]), &ordering)
            .unwrap();
        assert_eq!(line, "1|2");
    }

    #[test]
    fn empty_values_keep_their_position() {
        let serializer = CsvSerializer::new(b',');
        let ordering = ordering(&["a", "b", "c"]);
        let line = serializer
            .row_line(&row(&[("a", "x"), ("b", ""), ("c", "z")]), &ordering)
            .unwrap();
        assert_eq!(line, "x,,z");
    }

    #[test]
    fn values_with_delimiter_or_quotes_are_quoted() {
        let serializer = CsvSerializer::new(b',');
        let ordering = ordering(&["a", "b"]);
        let line = serializer
            .row_line(&row(&[("a", "Smith, John"), ("b", "say \"hi\"")]), &ordering)
            .unwrap();
        assert_eq!(line, "\"Smith, John\",\"say \"\"hi\"\"\"");
    }

    #[test]
    fn write_streams_header_and_rows() {
        let serializer = CsvSerializer::new(b',');
        let ordering = ordering(&["a", "b"]);
        let rows = vec![row(&[("a", "1"), ("b", "2")]), row(&[("a", "3"), ("b", "4")])];
        let mut out = Vec::new();
        let bytes = serializer.write(rows, 2, &ordering, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "a,b\n1,2\n3,4\n");
        assert_eq!(bytes, text.len() as u64);
    }
}
