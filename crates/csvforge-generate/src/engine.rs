use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use csvforge_core::{ResolvedOrdering, Schema, Source, ValueConstraint, resolve_order, validate_schema};

use crate::errors::GenerationError;
use crate::faker::FakerRegistry;
use crate::generators::{ValueGenerator, check_format};
use crate::model::{GenerateOptions, GenerationReport};
use crate::output::CsvSerializer;
use crate::row::RowBuilder;

/// Entry point for turning a schema into a CSV stream.
#[derive(Debug, Clone, Default)]
pub struct GenerationEngine {
    options: GenerateOptions,
}

/// A validated schema with its resolved column layout, ready to stream.
struct PreparedRun {
    ordering: ResolvedOrdering,
    delimiter: u8,
    rows: u64,
}

impl GenerationEngine {
    pub fn new(options: GenerateOptions) -> Self {
        Self { options }
    }

    /// Validate `schema` in place and write header plus rows to `writer`.
    pub fn run<W: Write>(
        &self,
        schema: &mut Schema,
        writer: W,
    ) -> Result<GenerationReport, GenerationError> {
        self.run_with_fakers(schema, FakerRegistry::new(), writer)
    }

    /// Same as [`GenerationEngine::run`] with a caller-supplied faker registry.
    pub fn run_with_fakers<W: Write>(
        &self,
        schema: &mut Schema,
        fakers: FakerRegistry,
        writer: W,
    ) -> Result<GenerationReport, GenerationError> {
        let start = Instant::now();
        let prepared = self.prepare(schema)?;
        self.execute(prepared, fakers, writer, start)
    }

    /// Generate into a file, creating missing parent directories.
    ///
    /// Nothing is created when the schema is rejected.
    pub fn run_to_path(
        &self,
        schema: &mut Schema,
        path: &Path,
    ) -> Result<GenerationReport, GenerationError> {
        let start = Instant::now();
        let prepared = self.prepare(schema)?;

        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let writer = BufWriter::new(File::create(path)?);
        let report = self.execute(prepared, FakerRegistry::new(), writer, start)?;
        info!(path = %path.display(), bytes_written = report.bytes_written, "output written");
        Ok(report)
    }

    fn prepare(&self, schema: &mut Schema) -> Result<PreparedRun, GenerationError> {
        validate_schema(schema)?;

        for column in &schema.columns {
            if let Some(general) = column.general.filter(|general| general.skip_chance > 1.0) {
                warn!(
                    column = %column.label,
                    skip_chance = general.skip_chance,
                    "skipChance above 1.0; every value in this column will be empty"
                );
            }
            if column.source_kind() == Some(Source::Timestamp) {
                if let Some(ValueConstraint::Timestamp(timestamp)) = &column.constraint {
                    check_format(&timestamp.format).map_err(|err| match err {
                        GenerationError::InvalidFormat(format) => GenerationError::InvalidFormat(
                            format!("column {}: {format}", column.label),
                        ),
                        other => other,
                    })?;
                }
            }
        }

        let multiple_files = &schema.metadata.multiple_files;
        if multiple_files.enabled {
            warn!(
                file_count = multiple_files.file_count,
                "multipleFiles is not supported; writing a single output"
            );
        }

        let ordering = resolve_order(&schema.columns)?;
        for column in &ordering {
            debug!(
                position = column.order.unwrap_or_default(),
                column = %column.label,
                source = %column.source,
                "column placed"
            );
        }

        Ok(PreparedRun {
            ordering,
            delimiter: schema.metadata.delimiter_byte()?,
            rows: schema.metadata.rows(),
        })
    }

    fn execute<W: Write>(
        &self,
        prepared: PreparedRun,
        fakers: FakerRegistry,
        writer: W,
        start: Instant,
    ) -> Result<GenerationReport, GenerationError> {
        let PreparedRun {
            ordering,
            delimiter,
            rows,
        } = prepared;

        let seed = self.options.seed.unwrap_or_else(|| rand::rng().random());
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut generator = ValueGenerator::new(fakers, self.options.reference_time);
        let builder = RowBuilder::new(ordering.columns())?;
        let serializer = CsvSerializer::new(delimiter);

        let labels: Vec<String> = ordering.labels().into_iter().map(str::to_string).collect();
        let mut report = GenerationReport::new(seed, labels, delimiter, rows);

        info!(
            columns = ordering.len(),
            rows,
            seed,
            delimiter = %char::from(delimiter),
            "generation started"
        );

        let mut rows_written = 0_u64;
        let generated = (0..rows).map(|_| {
            rows_written += 1;
            builder.build_row(&mut generator, &mut rng)
        });
        let bytes_written = serializer.write(generated, rows, &ordering, writer)?;

        report.rows_written = rows_written;
        report.bytes_written = bytes_written;
        report.record_cells(generator.stats());
        report.duration_ms = start.elapsed().as_millis() as u64;

        info!(
            rows_written = report.rows_written,
            bytes_written = report.bytes_written,
            omitted_cells = report.omitted_cells,
            sentinel_cells = report.sentinel_cells,
            duration_ms = report.duration_ms,
            "generation completed"
        );

        Ok(report)
    }
}
